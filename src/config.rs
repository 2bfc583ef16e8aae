use std::env;
use log::{info, warn};

use crate::error::CompletionError;

pub const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

// Settings read once at startup
#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub api_url: String,
    pub referer: String,
    pub title: String,
    pub host: String,
    pub port: u16,
    pub template_dir: String,
    pub static_dir: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("referer", &self.referer)
            .field("title", &self.title)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("template_dir", &self.template_dir)
            .field("static_dir", &self.static_dir)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, CompletionError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, CompletionError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("OPENROUTER_API_KEY")
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                CompletionError::Configuration(
                    "OPENROUTER_API_KEY is not set. Add it to the environment or a .env file.".to_string(),
                )
            })?;

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                CompletionError::Configuration(format!("PORT must be a number between 0 and 65535, got '{}'", raw))
            })?,
            None => 8080,
        };

        let api_url = lookup("OPENROUTER_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        if api_url != DEFAULT_API_URL {
            warn!("Using non-default completion endpoint: {}", api_url);
        }

        let config = Self {
            api_key,
            api_url,
            referer: lookup("APP_REFERER").unwrap_or_else(|| "http://localhost:8080".to_string()),
            title: lookup("APP_TITLE").unwrap_or_else(|| "Sportify".to_string()),
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            template_dir: lookup("TEMPLATE_DIR").unwrap_or_else(|| "templates".to_string()),
            static_dir: lookup("STATIC_DIR").unwrap_or_else(|| "./static".to_string()),
        };

        info!("Configuration loaded: {:?}", config);
        Ok(config)
    }
}
