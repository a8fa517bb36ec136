//! Tunable tables for the inference heuristics and diagnostics.

use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::error::MdmKitError;

/// Settings for a [`crate::MobileDeviceManager`].
///
/// Every field falls back to the built-in table when omitted from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, uniffi::Record)]
#[serde(default)]
pub struct MdmSettings {
    /// Installer packages treated as enterprise distribution channels.
    pub enterprise_installers: Vec<String>,
    /// Installer packages treated as the public store or a generic installer.
    pub public_installers: Vec<String>,
    /// Case-insensitive key fragments reported by diagnostics.
    pub search_terms: Vec<String>,
    /// Key names scanned by diagnostics.
    pub well_known_keys: Vec<String>,
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

impl Default for MdmSettings {
    fn default() -> Self {
        Self {
            enterprise_installers: owned(defaults::ENTERPRISE_INSTALLERS),
            public_installers: owned(defaults::PUBLIC_INSTALLERS),
            search_terms: owned(defaults::DIAGNOSTIC_SEARCH_TERMS),
            well_known_keys: owned(defaults::WELL_KNOWN_KEYS),
        }
    }
}

impl MdmSettings {
    /// Parses settings from JSON; missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the JSON is malformed or an installer
    /// appears in both the enterprise and public lists.
    pub fn from_json(json: &str) -> Result<Self, MdmKitError> {
        let settings: Self =
            serde_json::from_str(json).map_err(|e| MdmKitError::InvalidInput {
                attribute: "settings".to_string(),
                reason: e.to_string(),
            })?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), MdmKitError> {
        if let Some(installer) = self
            .enterprise_installers
            .iter()
            .find(|installer| self.public_installers.contains(installer))
        {
            return Err(MdmKitError::InvalidInput {
                attribute: "enterprise_installers".to_string(),
                reason: format!("{installer} is also listed as a public installer"),
            });
        }
        Ok(())
    }
}

/// Parses [`MdmSettings`] from a JSON document supplied by the host.
///
/// # Errors
///
/// See [`MdmSettings::from_json`].
#[uniffi::export]
pub fn mdm_settings_from_json(json: &str) -> Result<MdmSettings, MdmKitError> {
    MdmSettings::from_json(json)
}

/// Returns the built-in settings.
#[uniffi::export]
#[must_use]
pub fn default_mdm_settings() -> MdmSettings {
    MdmSettings::default()
}
