//! Device info, organization and support queries against simulated devices.

use std::sync::Arc;

use mdmkit_core::platform::memory::{MemoryEventSink, MemoryPlatform};
use mdmkit_core::{DeviceInfo, MobileDeviceManager};
use test_case::test_case;

fn manager(platform: &Arc<MemoryPlatform>) -> MobileDeviceManager {
    MobileDeviceManager::new(platform.clone(), Arc::new(MemoryEventSink::new()))
}

async fn device_info(platform: &Arc<MemoryPlatform>) -> DeviceInfo {
    manager(platform).get_device_info().await.unwrap()
}

#[test_case(Some("com.android.vending") ; "public store")]
#[test_case(Some("com.microsoft.windowsintune.companyportal") ; "company portal")]
#[test_case(Some("com.amazon.venezia") ; "unknown store")]
#[test_case(None ; "sideloaded")]
#[tokio::test]
async fn test_configuration_implies_managed(installer: Option<&str>) {
    let platform = Arc::new(MemoryPlatform::new());
    platform.package.set_installer(installer);
    platform.config.set_configuration([("theme", "dark")]);
    assert!(device_info(&platform).await.is_managed);
}

#[tokio::test]
async fn test_public_store_without_ownership_is_unmanaged() {
    let platform = Arc::new(MemoryPlatform::new());
    platform.admin.set_active_administrators(true);
    let info = device_info(&platform).await;
    assert!(!info.is_managed);
    assert!(!info.downloaded_from_managed_channel);
}

#[tokio::test]
async fn test_enterprise_installer_is_managed_channel() {
    let platform = Arc::new(MemoryPlatform::new());
    platform
        .package
        .set_installer(Some("com.google.android.apps.work.clouddpc"));
    let info = device_info(&platform).await;
    assert!(info.downloaded_from_managed_channel);
    assert!(info.is_managed);
}

#[tokio::test]
async fn test_public_store_device_owner() {
    let platform = Arc::new(MemoryPlatform::new());
    platform.admin.set_device_owner(true);
    let info = device_info(&platform).await;
    assert!(!info.downloaded_from_managed_channel);
    assert!(info.is_managed);
}

#[tokio::test]
async fn test_sideload_asymmetry() {
    let platform = Arc::new(MemoryPlatform::new());
    platform.package.set_installer(None);
    let info = device_info(&platform).await;
    assert!(!info.is_managed);
    assert!(!info.downloaded_from_managed_channel);

    platform.config.set_configuration([("AccountName", "Jane")]);
    let info = device_info(&platform).await;
    assert!(info.is_managed);
    assert!(info.downloaded_from_managed_channel);
}

#[test_case(&[("AccountDomain", "acme.com")], Some("acme.com") ; "account domain")]
#[test_case(&[("AccountEmail", "a@b.com")], Some("b.com") ; "account email")]
#[test_case(&[("IntuneMAMUPN", "u@c.org")], Some("c.org") ; "enrollment upn")]
#[test_case(&[], None ; "nothing")]
#[tokio::test]
async fn test_company_domain(pairs: &[(&str, &str)], expected: Option<&str>) {
    let platform = Arc::new(MemoryPlatform::new());
    platform.config.set_configuration(pairs.iter().copied());
    assert_eq!(device_info(&platform).await.company_domain.as_deref(), expected);
}

#[tokio::test]
async fn test_device_without_capabilities() {
    let platform = Arc::new(MemoryPlatform::without_capabilities());
    platform.config.set_configuration([("AccountName", "Jane")]);
    let manager = manager(&platform);

    assert!(!manager.is_supported().await);
    assert!(manager.get_configuration().await.is_empty());
    assert!(!manager.is_app_locking_allowed().await);
    assert!(!manager.is_app_locked().await.unwrap());

    let info = manager.get_device_info().await.unwrap();
    assert!(!info.has_managed_config_framework);
    assert!(!info.has_device_management_framework);
    assert!(!info.is_managed);
}

#[tokio::test]
async fn test_failing_reads_degrade_to_unmanaged() {
    let platform = Arc::new(MemoryPlatform::new());
    platform.config.set_configuration([("AccountName", "Jane")]);
    platform.config.fail_reads("binder died");
    platform.admin.set_device_owner(true);
    platform.admin.fail_reads("dpm crashed");
    let manager = manager(&platform);

    assert!(manager.get_configuration().await.is_empty());
    let info = manager.get_device_info().await.unwrap();
    assert!(!info.is_managed);
}

#[tokio::test]
async fn test_device_info_is_idempotent() {
    let platform = Arc::new(MemoryPlatform::new());
    platform.config.set_configuration([
        ("AccountEmail", "jane@acme.com"),
        ("AccountName", "Jane"),
        ("IntuneMAMUPN", "jane@acme.com"),
        ("theme", "dark"),
    ]);
    let manager = manager(&platform);

    let first = manager.get_device_info().await.unwrap();
    let second = manager.refresh_configuration().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[tokio::test]
async fn test_reads_are_never_cached() {
    let platform = Arc::new(MemoryPlatform::new());
    let manager = manager(&platform);
    assert!(!manager.get_device_info().await.unwrap().is_managed);

    platform.admin.set_profile_owner(true);
    assert!(manager.get_device_info().await.unwrap().is_managed);
}

#[tokio::test]
async fn test_device_info_json_shape() {
    let platform = Arc::new(MemoryPlatform::new());
    platform.config.set_configuration([("AccountDomain", "acme.com")]);
    let json = serde_json::to_value(device_info(&platform).await).unwrap();
    assert_eq!(json["bundleID"], "com.example.app");
    assert_eq!(json["isManaged"], true);
    assert_eq!(json["companyDomain"], "acme.com");
    assert_eq!(json["organizationInfo"]["AccountDomain"], "acme.com");
}
