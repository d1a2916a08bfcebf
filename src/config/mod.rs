mod session;
mod settings;

pub use session::Session;
pub use settings::{ApiSettings, Config, DisplaySettings, DownloadSettings};

use crate::error::{ErpError, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (~/.erpcli/ or XDG equivalent)
pub fn config_dir() -> Result<PathBuf> {
    // First try XDG-style directories
    if let Some(proj_dirs) = ProjectDirs::from("", "", "erpcli") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    // Fallback to ~/.erpcli/
    let home = dirs_home().ok_or_else(|| {
        ErpError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".erpcli"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Expand ~ in paths
pub fn expand_path(path: &str) -> PathBuf {
    if path.starts_with("~/") {
        if let Some(home) = dirs_home() {
            return home.join(&path[2..]);
        }
    }
    PathBuf::from(path)
}

/// Load the main config.toml
pub fn load_config(config_dir: &Path) -> Result<Config> {
    let path = config_dir.join("config.toml");
    if !path.exists() {
        return Err(ErpError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| ErpError::ConfigParse { path, source: e })
}

/// Resolve the download directory, relative paths landing under config_dir
pub fn resolve_download_dir(dir: &str, config_dir: &Path) -> PathBuf {
    let expanded = expand_path(dir);
    if expanded.is_relative() {
        config_dir.join(expanded)
    } else {
        expanded
    }
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[api]
base_url = "http://localhost:5000/api"   # override per-run with ERPCLI_API_URL
timeout_secs = 10

[display]
currency_symbol = "₹"
per_page = 20

[downloads]
dir = "~/.erpcli/downloads"
"#;
