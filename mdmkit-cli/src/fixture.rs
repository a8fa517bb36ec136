//! JSON description of a simulated device.

use std::collections::HashMap;
use std::path::Path;

use eyre::WrapErr;
use mdmkit_core::platform::memory::MemoryPlatform;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceFixture {
    pub config_store_available: bool,
    pub configuration: HashMap<String, String>,
    pub admin: AdminFixture,
    pub lock: LockFixture,
    pub package: PackageFixture,
}

impl Default for DeviceFixture {
    fn default() -> Self {
        Self {
            config_store_available: true,
            configuration: HashMap::new(),
            admin: AdminFixture::default(),
            lock: LockFixture::default(),
            package: PackageFixture::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(clippy::struct_excessive_bools)]
pub struct AdminFixture {
    pub available: bool,
    pub active_administrators: bool,
    pub device_owner: bool,
    pub profile_owner: bool,
}

impl Default for AdminFixture {
    fn default() -> Self {
        Self {
            available: true,
            active_administrators: false,
            device_owner: false,
            profile_owner: false,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(clippy::struct_excessive_bools)]
pub struct LockFixture {
    pub available: bool,
    pub permitted: bool,
    pub locked: bool,
    pub foreground: bool,
}

impl Default for LockFixture {
    fn default() -> Self {
        Self {
            available: true,
            permitted: false,
            locked: false,
            foreground: true,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PackageFixture {
    pub bundle_id: String,
    pub installer: Option<String>,
    pub version_name: String,
    pub version_code: u64,
    pub display_name: String,
    pub metadata: HashMap<String, String>,
}

impl Default for PackageFixture {
    fn default() -> Self {
        Self {
            bundle_id: "com.example.app".to_string(),
            installer: Some("com.android.vending".to_string()),
            version_name: "1.0.0".to_string(),
            version_code: 1,
            display_name: "Example".to_string(),
            metadata: HashMap::new(),
        }
    }
}

impl DeviceFixture {
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("reading fixture {}", path.display()))?;
        serde_json::from_str(&raw).wrap_err("parsing device fixture")
    }

    pub fn into_platform(self) -> MemoryPlatform {
        let platform = MemoryPlatform::new();

        platform.config.set_available(self.config_store_available);
        platform.config.set_configuration(self.configuration);

        platform.admin.set_available(self.admin.available);
        platform
            .admin
            .set_active_administrators(self.admin.active_administrators);
        platform.admin.set_device_owner(self.admin.device_owner);
        platform.admin.set_profile_owner(self.admin.profile_owner);

        platform.lock.set_available(self.lock.available);
        platform.lock.set_permitted(self.lock.permitted);
        platform.lock.set_locked(self.lock.locked);
        platform.lock.set_foreground(self.lock.foreground);

        let package = &self.package;
        platform.package.set_bundle_id(&package.bundle_id);
        platform.package.set_installer(package.installer.as_deref());
        platform
            .package
            .set_version(&package.version_name, package.version_code);
        platform.package.set_display_name(&package.display_name);
        for (key, value) in &package.metadata {
            platform.package.set_metadata(key, value);
        }

        platform
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use mdmkit_core::platform::{AdminCapability, ConfigStore, PackageMeta};

    use super::*;

    #[test]
    fn test_partial_fixture_uses_defaults() {
        let fixture: DeviceFixture =
            serde_json::from_str(r#"{"admin": {"deviceOwner": true}}"#).unwrap();
        assert!(fixture.config_store_available);
        assert!(fixture.admin.available);
        assert!(fixture.admin.device_owner);
        assert_eq!(fixture.package.installer.as_deref(), Some("com.android.vending"));
    }

    #[test]
    fn test_load_builds_platform() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "configuration": {{"AccountEmail": "jane@acme.com"}},
                "admin": {{"profileOwner": true}},
                "package": {{"bundleId": "com.acme.app", "installer": null}}
            }}"#
        )
        .unwrap();

        let platform = DeviceFixture::load(file.path()).unwrap().into_platform();
        assert_eq!(platform.config.read().unwrap()["AccountEmail"], "jane@acme.com");
        assert!(platform.admin.is_profile_owner().unwrap());
        assert_eq!(platform.package.bundle_id().unwrap(), "com.acme.app");
        assert_eq!(platform.package.installer_package().unwrap(), None);
    }

    #[test]
    fn test_load_reports_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = DeviceFixture::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("parsing device fixture"));
    }
}
