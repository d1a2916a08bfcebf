use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub api: ApiSettings,
    #[serde(default)]
    pub display: DisplaySettings,
    #[serde(default)]
    pub downloads: DownloadSettings,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ApiSettings {
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DisplaySettings {
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DownloadSettings {
    #[serde(default = "default_download_dir")]
    pub dir: String,
}

impl Config {
    /// Configured base URL, overridable per-invocation via ERPCLI_API_URL.
    pub fn api_base_url(&self) -> String {
        std::env::var("ERPCLI_API_URL").unwrap_or_else(|_| self.api.base_url.clone())
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        DisplaySettings {
            currency_symbol: default_currency_symbol(),
            per_page: default_per_page(),
        }
    }
}

impl Default for DownloadSettings {
    fn default() -> Self {
        DownloadSettings {
            dir: default_download_dir(),
        }
    }
}

fn default_timeout() -> u64 {
    10
}

fn default_currency_symbol() -> String {
    "₹".to_string()
}

fn default_per_page() -> u32 {
    20
}

fn default_download_dir() -> String {
    "~/.erpcli/downloads".to_string()
}
