//! Configuration.
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;

/// Stoker - data entry and reporting engine for plant operational metrics
#[derive(Parser, Debug, Clone)]
#[command(name = "stoker")]
#[command(about = "Configuration-driven data entry and reporting engine")]
pub struct Args {
    /// Base URL of the reporting backend
    #[arg(long, env = "API_URL", default_value = "http://localhost:8080")]
    pub api_url: String,

    /// Bearer token attached to every request (the backend enforces it)
    #[arg(long, env = "AUTH_TOKEN")]
    pub auth_token: Option<String>,

    /// Request timeout in milliseconds
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value = "30000")]
    pub request_timeout_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Fetch the aggregate report for this date (YYYY-MM-DD) and exit
    #[arg(long, env = "REPORT_DATE")]
    pub report_date: Option<String>,
}

impl Args {
    /// Validate configuration at startup.
    pub fn validate(&self) -> Result<(), String> {
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Err(format!("API_URL must be http(s), got '{}'", self.api_url));
        }
        if self.request_timeout_ms == 0 {
            return Err("REQUEST_TIMEOUT_MS must be positive".to_string());
        }
        if let Some(date) = &self.report_date {
            if chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
                return Err(format!("REPORT_DATE must be YYYY-MM-DD, got '{date}'"));
            }
        }
        Ok(())
    }

    pub fn api_config(&self) -> crate::client::ApiConfig {
        crate::client::ApiConfig {
            base_url: self.api_url.trim_end_matches('/').to_string(),
            auth_token: self.auth_token.clone(),
            request_timeout: std::time::Duration::from_millis(self.request_timeout_ms),
        }
    }
}
