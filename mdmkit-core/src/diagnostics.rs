//! Read-only reports for support and debugging.
//!
//! Nothing here feeds back into the inference results. Unexpected platform
//! failures are reported in an `error` field instead of failing the query.

use std::collections::HashMap;

use serde::{Serialize, Serializer};
use strum::Display;

use crate::defaults::COMPANY_DOMAIN_METADATA_KEY;
use crate::error::CapabilityResult;
use crate::inference::EnrollmentSignal;
use crate::installer::{is_play_store, looks_like_enterprise, InstallerIdentity};
use crate::platform::Capabilities;
use crate::restrictions::RestrictionSet;
use crate::settings::MdmSettings;
use crate::types::{ordered, BundleInfo, KeyValue};

/// What the configuration store currently holds, seen through the
/// diagnostic key tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationProbe {
    /// The configuration store exists.
    pub has_config_store: bool,
    /// Number of configuration keys.
    pub total_keys: u64,
    /// Keys containing one of the search terms, in key order.
    pub relevant_keys: Vec<KeyValue>,
    /// Well-known keys that are present.
    #[serde(serialize_with = "ordered")]
    pub well_known: HashMap<String, String>,
    /// At least one well-known key is present.
    pub found_mdm_config: bool,
}

impl ConfigurationProbe {
    pub(crate) fn scan(
        has_config_store: bool,
        restrictions: &RestrictionSet,
        settings: &MdmSettings,
    ) -> Self {
        let terms: Vec<String> = settings
            .search_terms
            .iter()
            .map(|term| term.to_lowercase())
            .collect();
        let relevant_keys = restrictions
            .iter()
            .filter(|(key, _)| {
                let key = key.to_lowercase();
                terms.iter().any(|term| key.contains(term.as_str()))
            })
            .map(|(key, value)| KeyValue {
                key: key.to_string(),
                value: value.to_string(),
            })
            .collect();
        let well_known: HashMap<String, String> = settings
            .well_known_keys
            .iter()
            .filter_map(|key| {
                restrictions
                    .get(key)
                    .map(|value| (key.clone(), value.to_string()))
            })
            .collect();

        Self {
            has_config_store,
            total_keys: restrictions.len() as u64,
            relevant_keys,
            found_mdm_config: !well_known.is_empty(),
            well_known,
        }
    }
}

/// Which management frameworks exist and what they say about this app.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityReport {
    /// The configuration store exists.
    pub has_config_store: bool,
    /// The device policy service exists.
    pub has_device_policy: bool,
    /// Managed configuration can be delivered to the app.
    pub has_managed_config_framework: bool,
    /// Device administration is supported.
    pub has_device_management_framework: bool,
    /// Result of the distribution-channel heuristic.
    pub downloaded_from_managed_channel: bool,
    /// Installed with an active device administrator present.
    pub is_work_profile: bool,
    /// This app is the device owner.
    pub is_device_owner: bool,
    /// `CompanyDomain` entry from the app's manifest metadata.
    pub company_domain: Option<String>,
    /// Failure that reset the download-source flags.
    pub error: Option<String>,
}

pub(crate) fn capability_report(
    caps: &Capabilities,
    signal: &EnrollmentSignal,
) -> CapabilityReport {
    let has_config_store = caps.config.is_available();
    let has_device_policy = caps.admin.is_available();

    let ownership = || -> CapabilityResult<(bool, bool)> {
        if !has_device_policy {
            return Ok((false, false));
        }
        Ok((
            caps.admin.has_active_administrators()?,
            caps.admin.is_device_owner()?,
        ))
    };
    let (is_work_profile, is_device_owner, downloaded, error) = match ownership() {
        Ok((work_profile, owner)) => {
            (work_profile, owner, signal.downloaded_from_managed_channel(), None)
        }
        Err(err) => {
            log::warn!("error checking app source: {err}");
            (false, false, false, Some(err.to_string()))
        }
    };

    let company_domain = caps
        .package
        .metadata_value(COMPANY_DOMAIN_METADATA_KEY.to_string())
        .unwrap_or_else(|err| {
            log::debug!("no company domain in metadata: {err}");
            None
        });

    CapabilityReport {
        has_config_store,
        has_device_policy,
        has_managed_config_framework: has_config_store,
        has_device_management_framework: has_device_policy,
        downloaded_from_managed_channel: downloaded,
        is_work_profile,
        is_device_owner,
        company_domain,
        error,
    }
}

/// Enrollment and installation source of the app.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentStatus {
    /// Identity and version of the app.
    pub bundle: BundleInfo,
    /// This app is device or profile owner.
    pub is_supervised: bool,
    /// Some device administrator is active.
    pub has_system_management: bool,
    /// Installer package name, `Unknown` when none was recorded.
    pub installer_package: String,
    /// Classified installer.
    pub installer_identity: InstallerIdentity,
    /// The installer name hints at enterprise distribution.
    pub is_enterprise: bool,
    /// Installed from the public store.
    pub is_play_store: bool,
    /// Installed with an active device administrator present.
    pub is_in_work_profile: bool,
    /// Failure that cut the status short.
    pub error: Option<String>,
}

impl EnrollmentStatus {
    fn failed(error: String) -> Self {
        Self {
            bundle: BundleInfo::default(),
            is_supervised: false,
            has_system_management: false,
            installer_package: UNKNOWN_INSTALLER.to_string(),
            installer_identity: InstallerIdentity::Unknown,
            is_enterprise: false,
            is_play_store: false,
            is_in_work_profile: false,
            error: Some(error),
        }
    }
}

const UNKNOWN_INSTALLER: &str = "Unknown";

pub(crate) fn enrollment_status(caps: &Capabilities, settings: &MdmSettings) -> EnrollmentStatus {
    let read = || -> CapabilityResult<EnrollmentStatus> {
        let bundle = BundleInfo::read(caps.package.as_ref())?;
        let (has_system_management, is_supervised) = if caps.admin.is_available() {
            (
                caps.admin.has_active_administrators()?,
                caps.admin.is_device_owner()? || caps.admin.is_profile_owner()?,
            )
        } else {
            (false, false)
        };
        let installer = caps.package.installer_package()?;
        let installer_identity = InstallerIdentity::classify(installer.as_deref(), settings);
        let installer = installer.filter(|name| !name.is_empty());

        Ok(EnrollmentStatus {
            bundle,
            is_supervised,
            has_system_management,
            is_enterprise: installer.as_deref().is_some_and(looks_like_enterprise),
            is_play_store: installer.as_deref().is_some_and(is_play_store),
            installer_package: installer.unwrap_or_else(|| UNKNOWN_INSTALLER.to_string()),
            installer_identity,
            is_in_work_profile: has_system_management,
            error: None,
        })
    };
    read().unwrap_or_else(|err| {
        log::error!("error getting enrollment status: {err}");
        EnrollmentStatus::failed(err.to_string())
    })
}

/// Outcome of a forced configuration re-read.
#[derive(Debug, Clone, PartialEq, Eq, Display, uniffi::Enum)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RefreshOutcome {
    /// Configuration was found.
    Success,
    /// The store answered with no configuration.
    NoConfig,
    /// The device has no configuration store.
    NoConfigStore,
    /// The re-read failed.
    #[strum(to_string = "FAILED: {reason}")]
    Failed {
        /// Platform message.
        reason: String,
    },
}

impl Serialize for RefreshOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Result of a forced configuration re-read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    /// Identity and version of the app, when readable.
    pub bundle: Option<BundleInfo>,
    /// `managed.<bundle id>` is present.
    pub bundle_specific_config: bool,
    /// Vendor keys found after the re-read.
    #[serde(serialize_with = "ordered")]
    pub post_refresh_findings: HashMap<String, String>,
    /// The full configuration after the re-read.
    #[serde(serialize_with = "ordered")]
    pub configuration: HashMap<String, String>,
    /// How the re-read went.
    pub refresh_attempt: RefreshOutcome,
}

pub(crate) fn force_sync(caps: &Capabilities) -> SyncReport {
    let bundle = match BundleInfo::read(caps.package.as_ref()) {
        Ok(bundle) => bundle,
        Err(err) => {
            log::error!("error in force sync: {err}");
            return SyncReport {
                bundle: None,
                bundle_specific_config: false,
                post_refresh_findings: HashMap::new(),
                configuration: HashMap::new(),
                refresh_attempt: RefreshOutcome::Failed {
                    reason: err.to_string(),
                },
            };
        }
    };
    let bundle_id = bundle.bundle_id.as_str();

    let (restrictions, refresh_attempt) = match RestrictionSet::try_read(caps.config.as_ref()) {
        Ok(set) if set.is_empty() => (set, RefreshOutcome::NoConfig),
        Ok(set) => (set, RefreshOutcome::Success),
        Err(err) if err.is_unavailable() => (RestrictionSet::default(), RefreshOutcome::NoConfigStore),
        Err(err) => (
            RestrictionSet::default(),
            RefreshOutcome::Failed {
                reason: err.to_string(),
            },
        ),
    };

    let bundle_key = format!("managed.{bundle_id}");
    let target_keys = [
        "com.google.android.work.configuration.managed".to_string(),
        "com.android.managed.configuration".to_string(),
        bundle_key.clone(),
        format!("IntuneMAM-{bundle_id}"),
    ];
    let post_refresh_findings = target_keys
        .into_iter()
        .filter_map(|key| {
            let value = restrictions.get(&key)?.to_string();
            log::debug!("post-refresh: found {key}");
            Some((key, value))
        })
        .collect();

    SyncReport {
        bundle_specific_config: restrictions.contains_key(&bundle_key),
        bundle: Some(bundle),
        post_refresh_findings,
        configuration: restrictions.to_map(),
        refresh_attempt,
    }
}

/// The inference steps behind `is_managed`.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct DetectionSteps {
    /// Managed configuration is present.
    pub restrictions_present: bool,
    /// This app is device or profile owner.
    pub app_owner: bool,
    /// The distribution-channel heuristic matched.
    pub managed_channel: bool,
    /// The resulting `is_managed`.
    pub final_decision: bool,
}

impl From<&EnrollmentSignal> for DetectionSteps {
    fn from(signal: &EnrollmentSignal) -> Self {
        Self {
            restrictions_present: signal.has_non_empty_restrictions,
            app_owner: signal.is_app_owner(),
            managed_channel: signal.downloaded_from_managed_channel(),
            final_decision: signal.is_managed(),
        }
    }
}

/// Everything the diagnostics know, in one report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct DetailedDiagnostics {
    /// Identity of the running app, read independently of the enrollment
    /// status so it survives enrollment read failures.
    pub bundle: Option<BundleInfo>,
    /// Configuration seen through the diagnostic key tables.
    pub configuration: ConfigurationProbe,
    /// Enrollment and installation source.
    pub enrollment: EnrollmentStatus,
    /// How `is_managed` was reached.
    pub detection: DetectionSteps,
}
