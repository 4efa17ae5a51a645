use std::fs;
use std::path::Path;

use log::{debug, info, warn};
use serde::Deserialize;

/// Application configuration loaded from kb2md.yaml (or fallback paths)
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub user_agent: Option<String>,
    pub request_timeout_secs: Option<u64>,
    /// Default for rehoming embedded images when the CLI flag is absent
    pub fetch_images: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            user_agent: Some("kb2md/0.1".into()),
            request_timeout_secs: Some(30),
            fetch_images: Some(false),
        }
    }
}

impl AppConfig {
    pub fn user_agent(&self) -> String {
        self.user_agent.clone().unwrap_or_else(|| "kb2md/0.1".into())
    }

    pub fn request_timeout_secs(&self) -> u64 {
        self.request_timeout_secs.unwrap_or(30)
    }
}

/// Try loading the app config from common candidate paths.
/// On any error or missing file it returns the default config.
pub fn load_app_config() -> AppConfig {
    let candidates = ["kb2md.yaml", "config/kb2md.yaml"];
    for p in &candidates {
        if Path::new(p).exists() {
            match fs::read_to_string(p) {
                Ok(s) => match serde_yaml::from_str::<AppConfig>(&s) {
                    Ok(cfg) => {
                        info!("Loaded configuration from {}", p);
                        return cfg;
                    }
                    Err(e) => {
                        warn!("Failed to parse {}: {}", p, e);
                    }
                },
                Err(e) => {
                    warn!("Failed to read {}: {}", p, e);
                }
            }
        }
    }
    debug!("Using default app config");
    AppConfig::default()
}
