use std::env;
use std::path::PathBuf;
use serde::Deserialize;

use crate::routing::{FallbackTarget, ServiceRegistry};
use super::server::parse_port;
use super::SettingsError;

/// 포트 맵 위치와 fallback 대상 설정
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrySettings {
    /// 서비스 이름 -> 포트 JSON 파일 경로
    #[serde(default = "default_port_map_path")]
    pub port_map_path: PathBuf,

    #[serde(default = "default_fallback_service")]
    pub fallback_service: String,

    /// 포트 맵에 fallback 서비스가 없을 때 사용할 포트
    #[serde(default = "default_fallback_port")]
    pub fallback_port: u16,
}

fn default_port_map_path() -> PathBuf { PathBuf::from("/app/port_map.json") }
fn default_fallback_service() -> String { FallbackTarget::DEFAULT_SERVICE.to_string() }
fn default_fallback_port() -> u16 { FallbackTarget::DEFAULT_PORT }

impl RegistrySettings {
    pub fn from_env() -> Result<Self, SettingsError> {
        // 빈 값은 설정되지 않은 것으로 취급
        let port_map_path = env::var("PORT_MAP_PATH")
            .ok()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_port_map_path);

        let fallback_service = env::var("PROXY_FALLBACK_SERVICE")
            .unwrap_or_else(|_| default_fallback_service());

        let fallback_port = match env::var("PROXY_FALLBACK_PORT") {
            Ok(value) => parse_port("PROXY_FALLBACK_PORT", &value)?,
            Err(_) => default_fallback_port(),
        };

        let settings = Self {
            port_map_path,
            fallback_service,
            fallback_port,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let service = self.fallback_service.trim();
        if service.is_empty() || service.contains('/') {
            return Err(SettingsError::InvalidConfig(format!(
                "유효하지 않은 fallback 서비스 이름: {:?}",
                self.fallback_service
            )));
        }
        if self.fallback_port == 0 {
            return Err(SettingsError::InvalidConfig(
                "registry.fallback_port는 0이 될 수 없습니다".to_string(),
            ));
        }
        Ok(())
    }

    /// 포트 맵을 로드하고 fallback 대상을 결정합니다. 포트 맵 로드 실패는 치명적이지 않습니다.
    pub fn load(&self) -> (ServiceRegistry, FallbackTarget) {
        let registry = ServiceRegistry::load_or_empty(&self.port_map_path);
        let fallback = FallbackTarget::resolve(&registry, self.fallback_service.as_str(), self.fallback_port);
        (registry, fallback)
    }
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            port_map_path: default_port_map_path(),
            fallback_service: default_fallback_service(),
            fallback_port: default_fallback_port(),
        }
    }
}
