use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;
use std::env;

/// Public Gemini REST endpoint; overridable for tests and proxies.
const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default timeout for the upstream call. Generation with large thinking
/// budgets can run long, so this is deliberately generous.
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub server: ServerConfig,
    pub google: GoogleConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// Process-wide default credential. Optional: deployments may require
    /// every caller to supply its own key in the request body instead.
    pub api_key: Option<String>,
    pub api_base: String,
    pub timeout_secs: u64,
}

fn default_port() -> u16 {
    8080
}

impl RelayConfig {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let server = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?
            .try_deserialize()?;

        Ok(RelayConfig {
            server,
            google: GoogleConfig {
                api_key: env::var("GOOGLE_API_KEY").ok().filter(|k| !k.is_empty()),
                api_base: env::var("GEMINI_API_BASE")
                    .unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
                timeout_secs: env::var("GEMINI_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_UPSTREAM_TIMEOUT_SECS),
            },
        })
    }
}
