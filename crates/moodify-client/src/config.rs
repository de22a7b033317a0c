//! Client configuration loaded from environment variables.

use std::path::PathBuf;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the Moodify API server.
    /// Env: `MOODIFY_API_URL`
    /// Default: `http://127.0.0.1:8080`
    pub api_base_url: String,

    /// Project URL of the hosted research database.
    /// Env: `SUPABASE_URL`
    pub mirror_url: Option<String>,

    /// Anonymous (insert-only) key for the hosted database.
    /// Env: `SUPABASE_ANON_KEY`
    pub mirror_key: Option<String>,

    /// Directory holding `moodify.db`.
    /// Env: `MOODIFY_DATA_DIR`
    /// Default: the platform data directory.
    pub data_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8080".to_string(),
            mirror_url: None,
            mirror_key: None,
            data_dir: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("MOODIFY_API_URL") {
            if url.starts_with("http://") || url.starts_with("https://") {
                config.api_base_url = url.trim_end_matches('/').to_string();
            } else {
                tracing::warn!(value = %url, "Invalid MOODIFY_API_URL, using default");
            }
        }

        config.mirror_url = non_empty_var("SUPABASE_URL");
        config.mirror_key = non_empty_var("SUPABASE_ANON_KEY");

        if let Some(dir) = non_empty_var("MOODIFY_DATA_DIR") {
            config.data_dir = Some(PathBuf::from(dir));
        }

        config
    }

    /// Mirror credentials, when they look like real ones rather than the
    /// template placeholders.
    pub fn mirror_credentials(&self) -> Option<(&str, &str)> {
        let url = self.mirror_url.as_deref()?;
        let key = self.mirror_key.as_deref()?;

        let url_ok = url.starts_with("https://") && !url.contains("your_supabase");
        let key_ok = key.len() > 20 && !key.contains("your_supabase");

        (url_ok && key_ok).then_some((url, key))
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
