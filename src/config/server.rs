use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub auth: AuthConfig,
    pub extract: ExtractConfig,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Token signing secrets. The first entry signs new tokens; every entry
    /// verifies, so tokens issued under a retired secret stay valid while a
    /// rotation is phased in.
    pub secrets: Vec<String>,
    pub token_ttl_hours: i64,
}

#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Program invoked as `<program> --file <input> --output <output>`.
    pub program: PathBuf,
    pub timeout: Duration,
    pub attempts: u32,
}

fn parse_secrets(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

impl ServerConfig {
    /// Builds the runtime configuration from CLI-provided basics plus
    /// environment knobs. `SPECHUB_AUTH_SECRET` is required; everything
    /// else has a default.
    pub fn from_env(host: String, port: u16, data_dir: PathBuf) -> Result<Self> {
        let secrets = env::var("SPECHUB_AUTH_SECRET")
            .ok()
            .map(|raw| parse_secrets(&raw))
            .unwrap_or_default();
        if secrets.is_empty() {
            return Err(Error::Config(
                "SPECHUB_AUTH_SECRET must be set to at least one signing secret".to_string(),
            ));
        }

        let token_ttl_hours = env::var("SPECHUB_TOKEN_TTL_HOURS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3);

        let program = env::var("SPECHUB_EXTRACT_PROGRAM")
            .map_or_else(|_| data_dir.join("scripts").join("extract.py"), PathBuf::from);
        let timeout_secs: u64 = env::var("SPECHUB_EXTRACT_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(120);
        let attempts: u32 = env::var("SPECHUB_EXTRACT_ATTEMPTS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(2);

        Ok(Self {
            host,
            port,
            data_dir,
            auth: AuthConfig {
                secrets,
                token_ttl_hours,
            },
            extract: ExtractConfig {
                program,
                timeout: Duration::from_secs(timeout_secs),
                attempts: attempts.max(1),
            },
        })
    }

    pub fn socket_addr(&self) -> std::result::Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("spechub.db")
    }

    /// Root of the per-repository upload tree.
    #[must_use]
    pub fn uploads_dir(&self) -> PathBuf {
        self.data_dir.join("uploads")
    }

    /// Root of the per-repository extraction output tree; served read-only
    /// under `/extracted`.
    #[must_use]
    pub fn extracted_dir(&self) -> PathBuf {
        self.data_dir.join("extracted")
    }
}
