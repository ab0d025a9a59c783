use std::{env, path::Path};
use serde::Deserialize;
use tracing::debug;

mod server;
pub mod logging;
mod registry;
mod upstream;
mod error;

pub use server::ServerSettings;
pub use logging::{LogFormat, LogOutput, LogSettings};
pub use registry::RegistrySettings;
pub use upstream::UpstreamSettings;
pub use error::SettingsError;

pub type Result<T> = std::result::Result<T, SettingsError>;
pub use server::parse_env_var;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    // 서버 설정
    #[serde(default)]
    pub server: ServerSettings,

    // 로깅 설정
    #[serde(default)]
    pub logging: LogSettings,

    /// 포트 맵 및 fallback 설정
    #[serde(default)]
    pub registry: RegistrySettings,

    /// 백엔드 연결 설정
    #[serde(default)]
    pub upstream: UpstreamSettings,
}

impl Settings {
    /// `PROXY_CONFIG_FILE`이 있으면 TOML 파일에서, 없으면 환경 변수에서 설정을 읽습니다.
    pub async fn load() -> Result<Self> {
        if let Ok(config_path) = env::var("PROXY_CONFIG_FILE") {
            Self::from_toml_file(&config_path).await
        } else {
            Self::from_env().await
        }
    }

    pub async fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        debug!(path = %path.as_ref().display(), "TOML 설정 파일 로드");
        let content = tokio::fs::read_to_string(&path).await.map_err(|e| SettingsError::FileError {
            path: path.as_ref().to_string_lossy().to_string(),
            error: e,
        })?;

        let settings: Self = toml::from_str(&content)
            .map_err(|e| SettingsError::ParseError { source: e })?;

        settings.validate()?;
        Ok(settings)
    }

    pub async fn from_env() -> Result<Self> {
        let settings = Self {
            server: ServerSettings::from_env()?,
            logging: LogSettings::from_env()?,
            registry: RegistrySettings::from_env()?,
            upstream: UpstreamSettings::from_env()?,
        };

        // 설정 생성 시점에 바로 검증
        settings.validate()?;
        Ok(settings)
    }

    /// 설정 유효성 검증
    pub fn validate(&self) -> Result<()> {
        self.server.validate()?;
        self.registry.validate()?;
        self.upstream.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_toml() {
        let toml_content = r#"
            [server]
            http_port = 9090
            bind_address = "127.0.0.1"

            [logging]
            format = "json"
            level = "debug"
            output = "/tmp/path_proxy.log"

            [registry]
            port_map_path = "/etc/proxy/port_map.json"
            fallback_service = "catchall"

            [upstream]
            connect_timeout_ms = 1500
        "#;

        let settings: Settings = toml::from_str(toml_content).unwrap();
        assert_eq!(settings.server.socket_addr().to_string(), "127.0.0.1:9090");
        assert_eq!(settings.logging.format, LogFormat::Json);
        assert_eq!(settings.logging.level, tracing::Level::DEBUG);
        assert_eq!(settings.logging.output, LogOutput::File("/tmp/path_proxy.log".to_string()));
        assert_eq!(settings.registry.fallback_service, "catchall");
        assert_eq!(settings.registry.fallback_port, 8000);
        assert_eq!(
            settings.upstream.connect_timeout(),
            Some(std::time::Duration::from_millis(1500))
        );
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings.server.http_port, 8080);
        assert_eq!(settings.registry.port_map_path, Path::new("/app/port_map.json"));
        assert_eq!(settings.registry.fallback_service, "tmpserver");
        assert!(settings.upstream.connect_timeout().is_none());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(toml::from_str::<Settings>("[logging]\nlevel = \"loud\"").is_err());

        let settings: Settings = toml::from_str("[registry]\nfallback_service = \"\"").unwrap();
        assert!(settings.validate().is_err());

        let settings: Settings = toml::from_str("[upstream]\nconnect_timeout_ms = 0").unwrap();
        assert!(settings.validate().is_err());
    }
}
