use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ErpError, Result};

/// An authenticated session: bearer token plus cached identity, persisted
/// beside the config file. Constructed by `login`, handed explicitly to the
/// API client, deleted by `logout`. Never ambient global state.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub role: String,
}

fn session_file(config_dir: &Path) -> PathBuf {
    config_dir.join("session.toml")
}

impl Session {
    /// Hydrate from disk; Ok(None) when no one is logged in.
    pub fn load(config_dir: &Path) -> Result<Option<Session>> {
        let path = session_file(config_dir);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        let session =
            toml::from_str(&content).map_err(|e| ErpError::ConfigParse { path, source: e })?;
        Ok(Some(session))
    }

    pub fn save(&self, config_dir: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| {
            ErpError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                e.to_string(),
            ))
        })?;
        fs::write(session_file(config_dir), content)?;
        Ok(())
    }

    /// Teardown on logout. Returns whether a session existed.
    pub fn clear(config_dir: &Path) -> Result<bool> {
        let path = session_file(config_dir);
        if path.exists() {
            fs::remove_file(path)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_round_trips_and_clears() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().to_path_buf();

        assert!(Session::load(&dir).unwrap().is_none());

        let session = Session {
            access_token: "tok-123".to_string(),
            refresh_token: None,
            email: "admin@example.com".to_string(),
            full_name: "Admin".to_string(),
            role: "admin".to_string(),
        };
        session.save(&dir).unwrap();

        let loaded = Session::load(&dir).unwrap().unwrap();
        assert_eq!(loaded.access_token, "tok-123");
        assert_eq!(loaded.email, "admin@example.com");

        assert!(Session::clear(&dir).unwrap());
        assert!(!Session::clear(&dir).unwrap());
        assert!(Session::load(&dir).unwrap().is_none());
    }
}
