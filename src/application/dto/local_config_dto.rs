use serde::{Deserialize, Serialize};

use crate::domain::config::local::{LocalConfig, Provider};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_SIGNED_URL_TTL_SECS: u64 = 60;

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct LocalConfigDTO {
    pub provider: Option<Provider>,
    pub port: Option<u16>,
    #[serde(rename = "corsAllowedOrigins")]
    pub cors_allowed_origins: Option<String>,
    #[serde(rename = "signedUrlTtlSecs")]
    pub signed_url_ttl_secs: Option<u64>,
    #[serde(rename = "maxUploadBytes")]
    pub max_upload_bytes: Option<usize>,
}

impl LocalConfigDTO {
    /// Reads `DRIVE_PROVIDER`, `PORT`, `CORS_ALLOWED_ORIGINS`,
    /// `SIGNED_URL_TTL_SECS` and `MAX_UPLOAD_BYTES` through the given lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let provider = lookup("DRIVE_PROVIDER")
            .map(|p| p.parse::<Provider>())
            .transpose()?;
        let port = lookup("PORT")
            .map(|p| {
                p.parse::<u16>()
                    .map_err(|_| format!("PORT must be a valid u16, got '{}'", p))
            })
            .transpose()?;
        let signed_url_ttl_secs = lookup("SIGNED_URL_TTL_SECS")
            .map(|t| {
                t.parse::<u64>()
                    .map_err(|_| format!("SIGNED_URL_TTL_SECS must be a number, got '{}'", t))
            })
            .transpose()?;
        let max_upload_bytes = lookup("MAX_UPLOAD_BYTES")
            .map(|m| {
                m.parse::<usize>()
                    .map_err(|_| format!("MAX_UPLOAD_BYTES must be a number, got '{}'", m))
            })
            .transpose()?;

        Ok(Self {
            provider,
            port,
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS"),
            signed_url_ttl_secs,
            max_upload_bytes,
        })
    }

    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(env_var)
    }
}

impl From<LocalConfigDTO> for LocalConfig {
    fn from(value: LocalConfigDTO) -> Self {
        LocalConfig {
            provider: value.provider.unwrap_or(Provider::Supabase),
            port: value.port.unwrap_or(DEFAULT_PORT),
            cors_allowed_origins: value.cors_allowed_origins,
            signed_url_ttl_secs: value
                .signed_url_ttl_secs
                .unwrap_or(DEFAULT_SIGNED_URL_TTL_SECS),
            max_upload_bytes: value.max_upload_bytes,
        }
    }
}

/// Trimmed environment variable; empty values count as unset.
pub fn env_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
