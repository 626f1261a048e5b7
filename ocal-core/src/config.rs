//! Global ocal configuration.
//!
//! Stored at ~/.config/ocal/config.toml. Environment variables OCAL_TZ and
//! OCAL_TOKEN override the file, which keeps scripted invocations from
//! depending on local state.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{OcalError, OcalResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Default timezone (IANA name) applied to naive input.
    pub timezone: Option<String>,

    /// Calendar to operate on; the account's primary calendar if unset.
    pub calendar_id: Option<String>,

    /// Bearer token for the calendar service. Acquiring and refreshing it
    /// is out of scope; paste one here or export OCAL_TOKEN.
    pub access_token: Option<String>,
}

impl GlobalConfig {
    pub fn config_path() -> OcalResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| OcalError::Config("could not determine config directory".into()))?
            .join("ocal");

        Ok(config_dir.join("config.toml"))
    }

    pub fn load() -> OcalResult<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(GlobalConfig::default());
        }

        let raw = fs::read_to_string(&path)?;
        toml::from_str(&raw).map_err(|e| OcalError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn save(&self) -> OcalResult<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let raw = toml::to_string_pretty(self)
            .map_err(|e| OcalError::Serialization(e.to_string()))?;
        fs::write(&path, raw)?;
        Ok(())
    }

    /// Configured timezone, with the OCAL_TZ environment override applied.
    pub fn resolved_timezone(&self) -> Option<String> {
        std::env::var("OCAL_TZ").ok().or_else(|| self.timezone.clone())
    }

    /// Bearer token, with the OCAL_TOKEN environment override applied.
    pub fn resolved_token(&self) -> Option<String> {
        std::env::var("OCAL_TOKEN")
            .ok()
            .or_else(|| self.access_token.clone())
    }
}
