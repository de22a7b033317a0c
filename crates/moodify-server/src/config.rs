//! Server configuration loaded from environment variables.
//!
//! Everything has a default so the server starts with zero configuration for
//! local development. Without API keys the AI endpoints answer with their
//! fallback payloads and feedback relay fails with 500.

use std::net::SocketAddr;

use moodify_shared::constants::DEFAULT_HTTP_PORT;

/// Server configuration.
#[derive(Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP (axum) API server.
    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:8080`
    pub http_addr: SocketAddr,

    /// Generative-language API key.
    /// Env: `GEMINI_API_KEY`
    pub gemini_api_key: Option<String>,

    /// Env: `GEMINI_MODEL`
    /// Default: `gemini-2.0-flash`
    pub gemini_model: String,

    /// Env: `GEMINI_BASE_URL`
    /// Default: `https://generativelanguage.googleapis.com`
    pub gemini_base_url: String,

    /// E-mail relay API key.
    /// Env: `RESEND_API_KEY`
    pub resend_api_key: Option<String>,

    /// Env: `RESEND_BASE_URL`
    /// Default: `https://api.resend.com`
    pub resend_base_url: String,

    /// Sender of feedback mails.
    /// Env: `FEEDBACK_FROM`
    pub feedback_from: String,

    /// Recipient of feedback mails.
    /// Env: `FEEDBACK_TO`
    pub feedback_to: String,

    /// Sustained requests per second per client IP.
    /// Env: `RATE_LIMIT_PER_SEC`
    /// Default: `5`
    pub rate_limit_per_sec: f64,

    /// Burst capacity per client IP.
    /// Env: `RATE_LIMIT_BURST`
    /// Default: `20`
    pub rate_limit_burst: f64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], DEFAULT_HTTP_PORT).into(),
            gemini_api_key: None,
            gemini_model: "gemini-2.0-flash".to_string(),
            gemini_base_url: "https://generativelanguage.googleapis.com".to_string(),
            resend_api_key: None,
            resend_base_url: "https://api.resend.com".to_string(),
            feedback_from: "Moodify Feedback <onboarding@resend.dev>".to_string(),
            feedback_to: "moodifykonnect@gmail.com".to_string(),
            rate_limit_per_sec: 5.0,
            rate_limit_burst: 20.0,
        }
    }
}

// API keys stay out of logs.
impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("http_addr", &self.http_addr)
            .field("gemini_configured", &self.gemini_api_key.is_some())
            .field("gemini_model", &self.gemini_model)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("resend_configured", &self.resend_api_key.is_some())
            .field("resend_base_url", &self.resend_base_url)
            .field("feedback_from", &self.feedback_from)
            .field("feedback_to", &self.feedback_to)
            .field("rate_limit_per_sec", &self.rate_limit_per_sec)
            .field("rate_limit_burst", &self.rate_limit_burst)
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("HTTP_ADDR") {
            if let Ok(parsed) = addr.parse::<SocketAddr>() {
                config.http_addr = parsed;
            } else {
                tracing::warn!(value = %addr, "Invalid HTTP_ADDR, using default");
            }
        }

        config.gemini_api_key = non_empty_var("GEMINI_API_KEY");
        if let Some(model) = non_empty_var("GEMINI_MODEL") {
            config.gemini_model = model;
        }
        if let Some(url) = non_empty_var("GEMINI_BASE_URL") {
            config.gemini_base_url = url.trim_end_matches('/').to_string();
        }

        config.resend_api_key = non_empty_var("RESEND_API_KEY");
        if let Some(url) = non_empty_var("RESEND_BASE_URL") {
            config.resend_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(from) = non_empty_var("FEEDBACK_FROM") {
            config.feedback_from = from;
        }
        if let Some(to) = non_empty_var("FEEDBACK_TO") {
            config.feedback_to = to;
        }

        if let Some(rate) = parse_positive("RATE_LIMIT_PER_SEC") {
            config.rate_limit_per_sec = rate;
        }
        if let Some(burst) = parse_positive("RATE_LIMIT_BURST") {
            config.rate_limit_burst = burst;
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter.

        config
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_positive(name: &str) -> Option<f64> {
    let raw = non_empty_var(name)?;
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Some(v),
        _ => {
            tracing::warn!(var = name, value = %raw, "Invalid rate limit setting, using default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.http_addr, ([0, 0, 0, 0], 8080).into());
        assert_eq!(config.gemini_model, "gemini-2.0-flash");
        assert!(config.gemini_api_key.is_none());
        assert_eq!(config.rate_limit_per_sec, 5.0);
        assert_eq!(config.rate_limit_burst, 20.0);
    }

    #[test]
    fn test_debug_hides_keys() {
        let config = ServerConfig {
            gemini_api_key: Some("AIzaSecret".into()),
            resend_api_key: Some("re_secret".into()),
            ..ServerConfig::default()
        };
        let shown = format!("{config:?}");
        assert!(!shown.contains("AIzaSecret"));
        assert!(!shown.contains("re_secret"));
        assert!(shown.contains("gemini_configured: true"));
    }
}
