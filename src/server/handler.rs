use std::convert::Infallible;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Instant;
use hyper::{header, Request, Response, StatusCode};
use hyper::body::{Body, Bytes};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use tracing::{error, warn};

use crate::{
    logging::{log_request, RequestLog},
    proxy::{self, ProxyBody, ProxyConfig},
    routing::{resolve_route, FallbackTarget, RouteDecision, ServiceRegistry},
};

pub const HEALTH_CHECK_BODY: &str = "OK";
pub const INVALID_PATH_BODY: &str = "Invalid request path";

/// 요청 하나를 처리합니다: 헬스 체크, 경로 검증, 백엔드 전달.
///
/// 레지스트리는 시작 시 한 번 만들어져 모든 연결이 잠금 없이 공유합니다.
pub struct RequestHandler {
    registry: Arc<ServiceRegistry>,
    fallback: FallbackTarget,
    proxy_config: ProxyConfig,
}

impl RequestHandler {
    pub fn new(
        registry: Arc<ServiceRegistry>,
        fallback: FallbackTarget,
        proxy_config: ProxyConfig,
    ) -> Self {
        Self {
            registry,
            fallback,
            proxy_config,
        }
    }

    pub async fn handle_request<B>(
        &self,
        req: Request<B>,
    ) -> Result<Response<ProxyBody>, Infallible>
    where
        B: Body,
        B::Error: Display,
    {
        let start_time = Instant::now();
        let mut log = RequestLog::new();
        log.with_request(&req);

        let decision = resolve_route(
            req.uri().path(),
            req.uri().query(),
            &self.registry,
            &self.fallback,
        );

        let response = match decision {
            Ok(RouteDecision::HealthCheck) => text_response(StatusCode::OK, HEALTH_CHECK_BODY),
            Ok(RouteDecision::Forward(target)) => {
                log.with_target(&target);
                match proxy::forward(&self.proxy_config, &target, req).await {
                    Ok(response) => response,
                    Err(e) => {
                        log.with_error(&e);
                        text_response(e.status_code(), e.to_string())
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "라우팅 실패");
                text_response(StatusCode::BAD_REQUEST, INVALID_PATH_BODY)
            }
        };

        // 본문 전달 전, 헤더가 준비된 시점까지의 시간
        log.with_response(response.status());
        log.duration_ms = start_time.elapsed().as_millis() as u64;
        log_request(&log);

        Ok(response)
    }

    pub async fn handle_connection<I>(&self, io: I) -> std::result::Result<(), hyper::Error>
    where
        I: hyper::rt::Read + hyper::rt::Write + Send + Unpin + 'static,
    {
        http1::Builder::new()
            .serve_connection(
                io,
                service_fn(|req| self.handle_request(req)),
            )
            .await
    }
}

fn text_response(status: StatusCode, body: impl Into<Bytes>) -> Response<ProxyBody> {
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(proxy::full(body))
        .unwrap_or_else(|e| {
            error!(error = %e, "에러 응답 생성 실패");
            let mut response = Response::new(proxy::full("Internal Server Error"));
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            response
        })
}
