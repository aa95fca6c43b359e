use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    #[serde(rename = "supabase")]
    Supabase,
    #[serde(rename = "firebase")]
    Firebase,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Supabase => write!(f, "supabase"),
            Provider::Firebase => write!(f, "firebase"),
        }
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "supabase" => Ok(Provider::Supabase),
            "firebase" => Ok(Provider::Firebase),
            other => Err(format!("Unknown provider '{}'", other)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LocalConfig {
    pub provider: Provider,
    pub port: u16,
    #[serde(rename = "corsAllowedOrigins")]
    pub cors_allowed_origins: Option<String>,
    #[serde(rename = "signedUrlTtlSecs")]
    pub signed_url_ttl_secs: u64,
    /// Ceiling for a queue request body; unlimited when unset.
    #[serde(rename = "maxUploadBytes")]
    pub max_upload_bytes: Option<usize>,
}
