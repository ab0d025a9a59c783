use std::collections::HashMap;
use std::fs;
use std::path::Path;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::routing::RegistryError;

/// 서비스 이름 -> 백엔드 포트 매핑입니다.
///
/// 시작 시 한 번 만들어지고 이후에는 읽기 전용으로만 공유됩니다.
/// 조회는 대소문자를 구분하는 정확한 일치이며, 항목이 없는 것은 에러가 아닙니다.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceRegistry {
    services: HashMap<String, u16>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, service: impl Into<String>, port: u16) {
        self.services.insert(service.into(), port);
    }

    pub fn port(&self, service: &str) -> Option<u16> {
        self.services.get(service).copied()
    }

    pub fn contains(&self, service: &str) -> bool {
        self.services.contains_key(service)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// 로그 출력용으로 정렬된 서비스 이름 목록
    pub fn service_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.services.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// `{"service": port, ...}` 형태의 JSON 문자열을 파싱합니다.
    ///
    /// 포트는 JSON 정수 또는 숫자 문자열을 허용합니다. 유효한 포트(1-65535)가
    /// 아닌 항목은 경고를 남기고 건너뜁니다. 빈 문자열은 빈 레지스트리입니다.
    ///
    /// ```
    /// use path_proxy::routing::ServiceRegistry;
    ///
    /// let registry = ServiceRegistry::from_json_str(r#"{"nginx": 80, "tmpserver": "8000"}"#).unwrap();
    /// assert_eq!(registry.port("nginx"), Some(80));
    /// assert_eq!(registry.port("tmpserver"), Some(8000));
    /// assert_eq!(registry.port("Nginx"), None);
    /// ```
    pub fn from_json_str(content: &str) -> Result<Self, RegistryError> {
        if content.trim().is_empty() {
            return Ok(Self::new());
        }

        let value: Value = serde_json::from_str(content)
            .map_err(|e| RegistryError::ParseError { source: e })?;

        let entries = match value {
            Value::Object(entries) => entries,
            other => {
                return Err(RegistryError::NotAnObject {
                    found: json_kind(&other).to_string(),
                })
            }
        };

        let mut registry = Self::new();
        for (service, raw_port) in entries {
            match parse_port(&raw_port) {
                Some(port) => {
                    debug!(service = %service, port, "서비스 포트 등록");
                    registry.insert(service, port);
                }
                None => warn!(
                    service = %service,
                    value = %raw_port,
                    "유효하지 않은 포트 값, 항목을 건너뜁니다"
                ),
            }
        }

        Ok(registry)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, RegistryError> {
        let content = fs::read_to_string(&path).map_err(|e| RegistryError::FileError {
            path: path.as_ref().to_string_lossy().to_string(),
            error: e,
        })?;

        Self::from_json_str(&content)
    }

    /// 파일을 읽지 못하거나 형식이 잘못된 경우 빈 레지스트리로 계속 진행합니다.
    /// 이 경우 모든 요청은 fallback 대상으로 전달됩니다.
    pub fn load_or_empty<P: AsRef<Path>>(path: P) -> Self {
        match Self::from_json_file(&path) {
            Ok(registry) => {
                info!(
                    path = %path.as_ref().display(),
                    count = registry.len(),
                    services = ?registry.service_names(),
                    "포트 맵 로드 완료"
                );
                registry
            }
            Err(e) => {
                warn!(
                    path = %path.as_ref().display(),
                    error = %e,
                    "포트 맵 로드 실패, 빈 레지스트리로 시작합니다"
                );
                Self::new()
            }
        }
    }
}

impl<S: Into<String>> FromIterator<(S, u16)> for ServiceRegistry {
    fn from_iter<I: IntoIterator<Item = (S, u16)>>(iter: I) -> Self {
        let mut registry = Self::new();
        for (service, port) in iter {
            registry.insert(service, port);
        }
        registry
    }
}

fn parse_port(value: &Value) -> Option<u16> {
    let port = match value {
        Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u16>().ok(),
        _ => None,
    }?;

    (port != 0).then_some(port)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// 레지스트리에 일치하는 서비스가 없을 때 사용하는 대상입니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackTarget {
    pub service: String,
    pub port: u16,
}

impl FallbackTarget {
    pub const DEFAULT_SERVICE: &'static str = "tmpserver";
    pub const DEFAULT_PORT: u16 = 8000;

    /// 레지스트리에 fallback 서비스의 포트가 있으면 그 포트를, 없으면 `default_port`를 사용합니다.
    pub fn resolve(registry: &ServiceRegistry, service: impl Into<String>, default_port: u16) -> Self {
        let service = service.into();
        let port = registry.port(&service).unwrap_or(default_port);
        Self { service, port }
    }
}

impl Default for FallbackTarget {
    fn default() -> Self {
        Self {
            service: Self::DEFAULT_SERVICE.to_string(),
            port: Self::DEFAULT_PORT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_entries_are_skipped() {
        let registry = ServiceRegistry::from_json_str(
            r#"{"a": 8080, "b": "x", "c": 70000, "d": -1, "e": null, "f": 0, "g": " 9000 "}"#,
        )
        .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.port("a"), Some(8080));
        assert_eq!(registry.port("g"), Some(9000));
        assert!(!registry.contains("f"));
    }

    #[test]
    fn test_non_object_is_rejected() {
        let err = ServiceRegistry::from_json_str("[1, 2]").unwrap_err();
        assert!(matches!(err, RegistryError::NotAnObject { ref found } if found == "array"));
    }

    #[test]
    fn test_empty_content() {
        assert!(ServiceRegistry::from_json_str("  \n").unwrap().is_empty());
    }

    #[test]
    fn test_fallback_resolution() {
        let registry: ServiceRegistry = [("tmpserver", 9100)].into_iter().collect();
        let fallback = FallbackTarget::resolve(&registry, "tmpserver", FallbackTarget::DEFAULT_PORT);
        assert_eq!(fallback.port, 9100);

        let fallback = FallbackTarget::resolve(&ServiceRegistry::new(), "tmpserver", 8000);
        assert_eq!(fallback, FallbackTarget::default());
    }
}
