use tracing::{debug, warn};

use crate::routing::{FallbackTarget, ProxyTarget, RoutingError, ServiceRegistry};

/// 요청 경로에 대한 라우팅 결정
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// `/` 또는 빈 경로: 프록시하지 않고 200 "OK"로 응답
    HealthCheck,
    Forward(ProxyTarget),
}

/// 경로를 `/` 기준으로 나눕니다. 끝에 붙은 빈 세그먼트는 버립니다.
///
/// 선행 `/`로 생기는 빈 세그먼트는 인덱스 0에 남으므로 서비스 이름은 항상 `segments[1]`입니다.
///
/// ```
/// use path_proxy::routing::split_segments;
///
/// assert_eq!(split_segments("/svc/a/b"), vec!["", "svc", "a", "b"]);
/// assert_eq!(split_segments("/svc/"), vec!["", "svc"]);
/// assert!(split_segments("//").is_empty());
/// ```
pub fn split_segments(path: &str) -> Vec<&str> {
    let mut segments: Vec<&str> = path.split('/').collect();
    while segments.last().map_or(false, |s| s.is_empty()) {
        segments.pop();
    }
    segments
}

fn join_segments(segments: &[&str]) -> String {
    segments.iter().fold(String::new(), |mut path, segment| {
        path.push('/');
        path.push_str(segment);
        path
    })
}

/// 경로와 레지스트리만으로 전달 대상을 결정하는 순수 함수입니다.
///
/// - 등록된 서비스: 서비스 세그먼트를 제거한 나머지 경로 (없으면 `/`)
/// - 등록되지 않은 서비스: fallback 대상에 원래 경로를 그대로 전달
pub fn resolve_route(
    path: &str,
    query: Option<&str>,
    registry: &ServiceRegistry,
    fallback: &FallbackTarget,
) -> Result<RouteDecision, RoutingError> {
    if path.is_empty() || path == "/" {
        return Ok(RouteDecision::HealthCheck);
    }

    let segments = split_segments(path);
    if segments.len() < 2 {
        return Err(RoutingError::MissingServiceSegment {
            path: path.to_string(),
        });
    }

    let service = segments[1];
    let query = query.map(str::to_string);

    let target = match registry.port(service) {
        Some(port) => {
            let rest = join_segments(&segments[2..]);
            debug!(service = %service, port, "등록된 서비스로 라우팅");
            ProxyTarget {
                host: service.to_string(),
                port,
                path: if rest.is_empty() { "/".to_string() } else { rest },
                query,
                is_fallback: false,
            }
        }
        None => {
            warn!(
                service = %service,
                fallback = %fallback.service,
                "서비스를 찾을 수 없음, fallback 대상으로 전달"
            );
            ProxyTarget {
                host: fallback.service.clone(),
                port: fallback.port,
                path: join_segments(&segments[1..]),
                query,
                is_fallback: true,
            }
        }
    };

    Ok(RouteDecision::Forward(target))
}
