//! Application settings loaded from environment variables
//!
//! Binaries call `dotenv::dotenv()` first so a local `.env` file is honoured.

use crate::error::AgentError;
use crate::Result;
use std::env;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_XERO_BASE_URL: &str = "https://api.xero.com/api.xro/2.0";

#[derive(Debug, Clone)]
pub struct Settings {
    pub google_ai_api_key: String,
    pub google_ai_model: String,

    pub xero_client_id: String,
    pub xero_client_secret: String,
    pub xero_tenant_id: Option<String>,
    pub xero_access_token: Option<String>,
    pub xero_base_url: String,

    pub app_name: String,
    pub app_version: String,
    pub debug: bool,

    pub host: String,
    pub port: u16,

    pub max_retries: u32,
    pub timeout_seconds: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            google_ai_api_key: String::new(),
            google_ai_model: DEFAULT_MODEL.to_string(),
            xero_client_id: String::new(),
            xero_client_secret: String::new(),
            xero_tenant_id: None,
            xero_access_token: None,
            xero_base_url: DEFAULT_XERO_BASE_URL.to_string(),
            app_name: "Advanced Accounts Agent".to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            debug: false,
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_retries: 3,
            timeout_seconds: 30,
        }
    }
}

impl Settings {
    /// Read settings from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through an arbitrary lookup (the environment in production)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Settings::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            google_ai_api_key: get("GOOGLE_AI_STUDIO_API_KEY").unwrap_or_default(),
            google_ai_model: get("GOOGLE_AI_MODEL").unwrap_or(defaults.google_ai_model),
            xero_client_id: get("XERO_CLIENT_ID").unwrap_or_default(),
            xero_client_secret: get("XERO_CLIENT_SECRET").unwrap_or_default(),
            xero_tenant_id: get("XERO_TENANT_ID"),
            xero_access_token: get("XERO_ACCESS_TOKEN"),
            xero_base_url: get("XERO_API_BASE_URL").unwrap_or(defaults.xero_base_url),
            app_name: get("APP_NAME").unwrap_or(defaults.app_name),
            app_version: get("APP_VERSION").unwrap_or(defaults.app_version),
            debug: get("DEBUG")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
                .unwrap_or(defaults.debug),
            host: get("HOST").unwrap_or(defaults.host),
            port: parse_or("PORT", get("PORT"), defaults.port)?,
            max_retries: parse_or("MAX_RETRIES", get("MAX_RETRIES"), defaults.max_retries)?,
            timeout_seconds: parse_or(
                "TIMEOUT_SECONDS",
                get("TIMEOUT_SECONDS"),
                defaults.timeout_seconds,
            )?,
        })
    }

    /// Names of required credentials that are not set
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.google_ai_api_key.is_empty() {
            missing.push("GOOGLE_AI_STUDIO_API_KEY");
        }
        if self.xero_client_id.is_empty() {
            missing.push("XERO_CLIENT_ID");
        }
        if self.xero_client_secret.is_empty() {
            missing.push("XERO_CLIENT_SECRET");
        }
        missing
    }

    /// Fail with `ConfigurationMissing` when a required credential is absent
    pub fn validate(&self) -> Result<()> {
        let missing = self.missing_credentials();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(AgentError::ConfigurationMissing(missing))
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Default log filter when `RUST_LOG` is not set
    pub fn log_level(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "info"
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T> {
    match raw {
        Some(value) => value.trim().parse().map_err(|_| {
            AgentError::InvalidConfiguration(format!("{} has invalid value '{}'", key, value))
        }),
        None => Ok(default),
    }
}
