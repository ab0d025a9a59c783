use std::fmt;

/// 경로 해석 및 대상 URL 생성 중 발생하는 에러입니다.
#[derive(Debug, PartialEq)]
pub enum RoutingError {
    /// 경로에 서비스 세그먼트가 없음
    MissingServiceSegment {
        path: String,
    },
    /// 대상 URI 생성 실패 (서비스 이름이 호스트로 사용할 수 없는 경우 등)
    InvalidTarget {
        url: String,
        reason: String,
    },
}

impl fmt::Display for RoutingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingError::MissingServiceSegment { path } =>
                write!(f, "서비스 세그먼트가 없는 경로: {:?}", path),
            RoutingError::InvalidTarget { url, reason } =>
                write!(f, "유효하지 않은 대상 URL {}: {}", url, reason),
        }
    }
}

impl std::error::Error for RoutingError {}

/// 서비스 레지스트리(port map) 로드 에러입니다.
#[derive(Debug)]
pub enum RegistryError {
    FileError {
        path: String,
        error: std::io::Error,
    },
    ParseError {
        source: serde_json::Error,
    },
    /// 최상위 값이 JSON 객체가 아님
    NotAnObject {
        found: String,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::FileError { path, error } =>
                write!(f, "포트 맵 파일 {} 읽기 실패: {}", path, error),
            RegistryError::ParseError { source } =>
                write!(f, "포트 맵 파싱 실패: {}", source),
            RegistryError::NotAnObject { found } =>
                write!(f, "포트 맵은 JSON 객체여야 합니다 (발견: {})", found),
        }
    }
}

impl std::error::Error for RegistryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RegistryError::FileError { error, .. } => Some(error),
            RegistryError::ParseError { source } => Some(source),
            RegistryError::NotAnObject { .. } => None,
        }
    }
}
