use std::collections::{BTreeMap, HashMap};

use serde::{Serialize, Serializer};

use crate::error::CapabilityResult;
use crate::platform::PackageMeta;

/// Serializes a map with its keys in order, so repeated queries print
/// identical output.
pub(crate) fn ordered<S: Serializer>(
    map: &HashMap<String, String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    map.iter().collect::<BTreeMap<_, _>>().serialize(serializer)
}

/// Everything the host needs to know about the management state.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    /// Package name of the app.
    #[serde(rename = "bundleID")]
    pub bundle_id: String,
    /// Whether the device or this app's profile is managed.
    pub is_managed: bool,
    /// Whether the app was distributed through an enterprise channel.
    pub downloaded_from_managed_channel: bool,
    /// The managed configuration service exists.
    pub has_managed_config_framework: bool,
    /// The device administration service exists.
    pub has_device_management_framework: bool,
    /// The managed configuration pairs.
    #[serde(serialize_with = "ordered")]
    pub organization_info: HashMap<String, String>,
    /// Organization domain, if one can be derived.
    pub company_domain: Option<String>,
}

/// Identity and version of the running app.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct BundleInfo {
    /// Package name.
    #[serde(rename = "bundleID")]
    pub bundle_id: String,
    /// User-visible version.
    pub version_name: String,
    /// Internal version number.
    pub version_code: i64,
    /// Application label.
    pub display_name: String,
}

impl BundleInfo {
    pub(crate) fn read(package: &dyn PackageMeta) -> CapabilityResult<Self> {
        Ok(Self {
            bundle_id: package.bundle_id()?,
            version_name: package.version_name()?,
            version_code: package.version_code()?,
            display_name: package.display_name()?,
        })
    }
}

/// A configuration pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, uniffi::Record)]
pub struct KeyValue {
    /// Configuration key.
    pub key: String,
    /// Its value.
    pub value: String,
}
