//! Container engine configuration.

use serde::{Deserialize, Serialize};

use crate::record::CURRENT_VERSION;
use sealbox_common::{Error, Result};
use sealbox_crypto::CalibrationParams;

/// Settings for a [`Container`](crate::Container) engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Version tag written into sealed records.
    pub version: String,
    /// Iteration-count calibration settings.
    pub calibration: CalibrationParams,
}

impl ContainerConfig {
    /// Configuration with the iteration count capped at `max_iterations`.
    pub fn bounded(max_iterations: u32) -> Self {
        Self {
            calibration: CalibrationParams::bounded(max_iterations),
            ..Self::default()
        }
    }

    /// Serialize configuration to JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize configuration from JSON. Missing keys take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidInput(e.to_string()))
    }
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION.to_string(),
            calibration: CalibrationParams::default(),
        }
    }
}
