use std::env;
use std::time::Duration;
use serde::Deserialize;
use super::SettingsError;

/// 백엔드 연결 설정. 기본값은 타임아웃 없음입니다.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamSettings {
    #[serde(default)]
    pub connect_timeout_ms: Option<u64>,
}

impl UpstreamSettings {
    pub fn from_env() -> Result<Self, SettingsError> {
        let connect_timeout_ms = env::var("PROXY_CONNECT_TIMEOUT_MS")
            .ok()
            .map(|value| {
                value.trim().parse::<u64>().map_err(|e| SettingsError::EnvVarInvalid {
                    var_name: "PROXY_CONNECT_TIMEOUT_MS".to_string(),
                    reason: e.to_string(),
                    value,
                })
            })
            .transpose()?;

        let settings = Self { connect_timeout_ms };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.connect_timeout_ms == Some(0) {
            return Err(SettingsError::InvalidConfig(
                "upstream.connect_timeout_ms는 0보다 커야 합니다".to_string(),
            ));
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }
}
