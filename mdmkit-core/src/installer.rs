//! Classification of the agent that installed the app.

use serde::Serialize;
use strum::{Display, EnumString};

use crate::defaults::{ENTERPRISE_INSTALLER_HINTS, PLAY_STORE_PACKAGE};
use crate::settings::MdmSettings;

/// Distribution channel inferred from the installer package name.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString, uniffi::Enum,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstallerIdentity {
    /// The public store or a generic package installer.
    PlayStore,
    /// An enterprise portal, store or work-profile provisioning agent.
    EnterpriseStore,
    /// No installer was recorded.
    Sideloaded,
    /// An installer outside every known list.
    Unknown,
}

impl InstallerIdentity {
    /// Classifies `installer` against the lists in `settings`.
    ///
    /// The enterprise list is consulted first. A missing or empty installer
    /// name is a side-load.
    #[must_use]
    pub fn classify(installer: Option<&str>, settings: &MdmSettings) -> Self {
        let Some(installer) = installer.filter(|name| !name.is_empty()) else {
            return Self::Sideloaded;
        };
        if settings
            .enterprise_installers
            .iter()
            .any(|known| known == installer)
        {
            Self::EnterpriseStore
        } else if settings
            .public_installers
            .iter()
            .any(|known| known == installer)
        {
            Self::PlayStore
        } else {
            Self::Unknown
        }
    }
}

/// Loose substring check used by enrollment diagnostics only.
pub(crate) fn looks_like_enterprise(installer: &str) -> bool {
    ENTERPRISE_INSTALLER_HINTS
        .iter()
        .any(|hint| installer.contains(hint))
}

pub(crate) fn is_play_store(installer: &str) -> bool {
    installer == PLAY_STORE_PACKAGE
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use test_case::test_case;

    use super::*;

    #[test_case(Some("com.microsoft.windowsintune.companyportal"), InstallerIdentity::EnterpriseStore ; "company portal")]
    #[test_case(Some("com.google.android.apps.work.clouddpc"), InstallerIdentity::EnterpriseStore ; "android device policy")]
    #[test_case(Some("com.android.vending"), InstallerIdentity::PlayStore ; "play store")]
    #[test_case(Some("com.google.android.packageinstaller"), InstallerIdentity::PlayStore ; "generic installer")]
    #[test_case(Some("com.amazon.venezia"), InstallerIdentity::Unknown ; "other store")]
    #[test_case(Some(""), InstallerIdentity::Sideloaded ; "empty name")]
    #[test_case(None, InstallerIdentity::Sideloaded ; "no installer")]
    fn test_classify(installer: Option<&str>, expected: InstallerIdentity) {
        assert_eq!(
            InstallerIdentity::classify(installer, &MdmSettings::default()),
            expected
        );
    }

    #[test]
    fn test_custom_enterprise_list() {
        let settings = MdmSettings {
            enterprise_installers: vec!["com.acme.portal".to_string()],
            ..MdmSettings::default()
        };
        assert_eq!(
            InstallerIdentity::classify(Some("com.acme.portal"), &settings),
            InstallerIdentity::EnterpriseStore
        );
        assert_eq!(
            InstallerIdentity::classify(
                Some("com.microsoft.windowsintune.companyportal"),
                &settings
            ),
            InstallerIdentity::Unknown
        );
    }

    #[test]
    fn test_string_form() {
        assert_eq!(InstallerIdentity::EnterpriseStore.to_string(), "ENTERPRISE_STORE");
        assert_eq!(
            InstallerIdentity::from_str("SIDELOADED").unwrap(),
            InstallerIdentity::Sideloaded
        );
    }

    #[test]
    fn test_enterprise_hints() {
        assert!(looks_like_enterprise("com.example.work.installer"));
        assert!(looks_like_enterprise("com.microsoft.intune"));
        assert!(!looks_like_enterprise("com.android.vending"));
        assert!(is_play_store("com.android.vending"));
    }
}
