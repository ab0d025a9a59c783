use std::fmt::Display;
use std::time::Duration;
use hyper::{header, Request, Response};
use bytes::Bytes;
use hyper::body::Body;
use hyper::http::request::Parts;
use http_body_util::{BodyExt, Either, Empty, Full};
use http_body_util::combinators::UnsyncBoxBody;
use hyper_util::client::legacy;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use tracing::{debug, info, instrument};

use crate::routing::ProxyTarget;
use crate::settings::UpstreamSettings;

mod body;
mod error;

pub use body::{RelayBody, RELAY_BUFFER_SIZE};
pub use error::ProxyError;

/// 백엔드로 보내는 요청 본문. 비어 있으면 본문 없이 전송합니다.
pub type OutboundBody = Either<Full<Bytes>, Empty<Bytes>>;

/// 클라이언트에게 돌려주는 응답 본문
pub type ProxyBody = UnsyncBoxBody<Bytes, hyper::Error>;

// 프록시 요청을 위한 불변 설정 구조체
#[derive(Clone)]
pub struct ProxyConfig {
    client: legacy::Client<HttpConnector, OutboundBody>,
}

impl ProxyConfig {
    pub fn new() -> Self {
        Self::with_connect_timeout(None)
    }

    pub fn from_settings(settings: &UpstreamSettings) -> Self {
        Self::with_connect_timeout(settings.connect_timeout())
    }

    /// 요청마다 새 연결을 열고 응답이 끝나면 닫습니다 (유휴 연결을 보관하지 않음).
    pub fn with_connect_timeout(timeout: Option<Duration>) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(timeout);

        let client = legacy::Client::builder(TokioExecutor::new())
            .pool_max_idle_per_host(0)
            .build::<_, OutboundBody>(connector);

        Self { client }
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// 요청을 대상 백엔드로 전달하고, 백엔드 응답(상태, 헤더, 본문)을 그대로 돌려줍니다.
///
/// 요청 본문은 백엔드 연결을 열기 전에 모두 읽습니다. 리다이렉트는 따라가지 않습니다.
#[instrument(skip(config, target, req), fields(target_url = %target.url()))]
pub async fn forward<B>(
    config: &ProxyConfig,
    target: &ProxyTarget,
    req: Request<B>,
) -> Result<Response<ProxyBody>, ProxyError>
where
    B: Body,
    B::Error: Display,
{
    let (parts, body) = req.into_parts();
    let body = collect_body(body).await?;
    let outbound = build_outbound_request(&parts, body, target)?;

    let url = target.url();
    info!(url = %url, fallback = target.is_fallback, "Forwarding request to backend");

    let response = config.client.request(outbound).await.map_err(|e| ProxyError::Upstream {
        url: url.clone(),
        source: e,
    })?;
    info!(status = %response.status(), "Response code from backend");

    let (parts, body) = response.into_parts();
    Ok(Response::from_parts(parts, RelayBody::new(body, url).boxed_unsync()))
}

pub async fn collect_body<B>(body: B) -> Result<Bytes, ProxyError>
where
    B: Body,
    B::Error: Display,
{
    let bytes = body
        .collect()
        .await
        .map_err(|e| ProxyError::RequestBody { reason: e.to_string() })?
        .to_bytes();
    debug!(bytes_size = bytes.len(), "Request body collected");
    Ok(bytes)
}

/// 원본 요청의 메서드와 헤더를 그대로 옮긴 백엔드 요청을 만듭니다.
///
/// `transfer-encoding` 헤더만 제외합니다 (본문은 이미 모두 읽었으므로 청크 전송을 하지 않음).
pub fn build_outbound_request(
    parts: &Parts,
    body: Bytes,
    target: &ProxyTarget,
) -> Result<Request<OutboundBody>, ProxyError> {
    let body = if body.is_empty() {
        Either::Right(Empty::new())
    } else {
        Either::Left(Full::new(body))
    };

    let mut outbound = Request::new(body);
    *outbound.method_mut() = parts.method.clone();
    *outbound.uri_mut() = target.uri()?;

    let headers = outbound.headers_mut();
    for (name, value) in parts.headers.iter() {
        if name != header::TRANSFER_ENCODING {
            headers.append(name.clone(), value.clone());
        }
    }

    Ok(outbound)
}

/// 로컬에서 만든 응답 본문
pub fn full<T: Into<Bytes>>(chunk: T) -> ProxyBody {
    Full::new(chunk.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}
