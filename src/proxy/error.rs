use std::fmt;
use hyper::StatusCode;

use crate::routing::RoutingError;

#[derive(Debug)]
pub enum ProxyError {
    /// 클라이언트 요청 본문을 끝까지 읽지 못함
    RequestBody {
        reason: String,
    },
    /// 대상 URI를 만들 수 없음
    InvalidTarget(RoutingError),
    /// 백엔드 연결 또는 응답 헤더 수신 실패
    Upstream {
        url: String,
        source: hyper_util::client::legacy::Error,
    },
}

impl ProxyError {
    /// 응답이 시작되기 전에 발생한 에러를 클라이언트에게 돌려줄 상태 코드
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::RequestBody { .. } => StatusCode::BAD_REQUEST,
            ProxyError::InvalidTarget(_) | ProxyError::Upstream { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

impl fmt::Display for ProxyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyError::RequestBody { reason } =>
                write!(f, "Failed to read request body: {}", reason),
            ProxyError::InvalidTarget(e) =>
                write!(f, "Failed to build request: {}", e),
            ProxyError::Upstream { url, source } =>
                write!(f, "Backend request to {} failed: {}", url, source),
        }
    }
}

impl std::error::Error for ProxyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProxyError::InvalidTarget(e) => Some(e),
            ProxyError::Upstream { source, .. } => Some(source),
            ProxyError::RequestBody { .. } => None,
        }
    }
}

impl From<RoutingError> for ProxyError {
    fn from(err: RoutingError) -> Self {
        ProxyError::InvalidTarget(err)
    }
}
