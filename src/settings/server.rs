use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use serde::Deserialize;
use super::SettingsError;

#[derive(Clone, Debug, Deserialize)]
pub struct ServerSettings {
    /// HTTP 포트 (기본값: 8080)
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// 바인딩 주소 (기본값: 0.0.0.0)
    #[serde(default = "default_bind_address")]
    pub bind_address: IpAddr,
}

fn default_http_port() -> u16 { 8080 }
fn default_bind_address() -> IpAddr { IpAddr::V4(Ipv4Addr::UNSPECIFIED) }

pub fn parse_env_var<T: std::str::FromStr, F: FnOnce() -> T>(name: &str, default: F) -> Result<T, SettingsError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) => val.parse().map_err(|e: T::Err| SettingsError::EnvVarInvalid {
            var_name: name.to_string(),
            value: val,
            reason: e.to_string(),
        }),
        Err(env::VarError::NotPresent) => Ok(default()),
        Err(e) => Err(SettingsError::EnvVarInvalid {
            var_name: name.to_string(),
            value: "".to_string(),
            reason: e.to_string(),
        }),
    }
}

/// 0이 아닌 포트 번호를 파싱합니다.
pub(crate) fn parse_port(name: &str, value: &str) -> Result<u16, SettingsError> {
    let port = value.trim().parse::<u16>().map_err(|_| SettingsError::EnvVarInvalid {
        var_name: name.to_string(),
        value: value.to_string(),
        reason: "포트는 1-65535 범위여야 합니다".to_string(),
    })?;

    if port == 0 {
        return Err(SettingsError::EnvVarInvalid {
            var_name: name.to_string(),
            value: value.to_string(),
            reason: "포트는 0이 될 수 없습니다".to_string(),
        });
    }

    Ok(port)
}

impl ServerSettings {
    pub fn from_env() -> Result<Self, SettingsError> {
        let http_port = match env::var("PROXY_HTTP_PORT") {
            Ok(value) => parse_port("PROXY_HTTP_PORT", &value)?,
            Err(_) => default_http_port(),
        };

        let settings = Self {
            http_port,
            bind_address: parse_env_var("PROXY_BIND_ADDRESS", default_bind_address)?,
        };

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.http_port == 0 {
            return Err(SettingsError::InvalidConfig(
                "server.http_port는 0이 될 수 없습니다".to_string(),
            ));
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.http_port)
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            http_port: default_http_port(),
            bind_address: default_bind_address(),
        }
    }
}
