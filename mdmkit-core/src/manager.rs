//! The object exported to the host application.

use std::collections::HashMap;
use std::sync::Arc;

use crate::defaults::MODULE_NAME;
use crate::diagnostics::{
    capability_report, enrollment_status, force_sync, CapabilityReport, ConfigurationProbe,
    DetailedDiagnostics, DetectionSteps, EnrollmentStatus, SyncReport,
};
use crate::error::MdmKitError;
use crate::events::{event_channels, EventSink};
use crate::inference::{company_domain, EnrollmentSignal};
use crate::lock::LockController;
use crate::notifications::ConfigChangeNotifier;
use crate::platform::{Capabilities, PlatformProvider};
use crate::restrictions::RestrictionSet;
use crate::settings::MdmSettings;
use crate::types::{BundleInfo, DeviceInfo};

/// Mobile device management state of the running app.
///
/// Every query reads the OS afresh; nothing is cached between calls. The
/// host forwards its lifecycle to [`Self::on_host_resume`] and
/// [`Self::on_host_pause`] so configuration changes are only listened for
/// while the app is in the foreground.
#[derive(uniffi::Object)]
pub struct MobileDeviceManager {
    caps: Capabilities,
    settings: MdmSettings,
    lock: LockController,
    notifier: ConfigChangeNotifier,
}

impl std::fmt::Debug for MobileDeviceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MobileDeviceManager")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl MobileDeviceManager {
    fn build(
        provider: &dyn PlatformProvider,
        events: Arc<dyn EventSink>,
        settings: MdmSettings,
    ) -> Self {
        let caps = Capabilities::from_provider(provider);
        Self {
            lock: LockController::new(Arc::clone(&caps.lock), Arc::clone(&events)),
            notifier: ConfigChangeNotifier::new(Arc::clone(&caps.config), events),
            caps,
            settings,
        }
    }

    fn restrictions(&self) -> RestrictionSet {
        RestrictionSet::read(self.caps.config.as_ref())
    }

    fn signal(&self, restrictions: &RestrictionSet) -> EnrollmentSignal {
        EnrollmentSignal::gather(&self.caps, restrictions, &self.settings)
    }

    fn device_info(&self) -> Result<DeviceInfo, MdmKitError> {
        let bundle_id = self.caps.package.bundle_id()?;
        let restrictions = self.restrictions();
        let signal = self.signal(&restrictions);
        Ok(DeviceInfo {
            bundle_id,
            is_managed: signal.is_managed(),
            downloaded_from_managed_channel: signal.downloaded_from_managed_channel(),
            has_managed_config_framework: self.caps.config.is_available(),
            has_device_management_framework: self.caps.admin.is_available(),
            company_domain: company_domain(&restrictions),
            organization_info: restrictions.to_map(),
        })
    }

    fn configuration_probe(&self, restrictions: &RestrictionSet) -> ConfigurationProbe {
        ConfigurationProbe::scan(self.caps.config.is_available(), restrictions, &self.settings)
    }
}

#[uniffi::export(async_runtime = "tokio")]
#[allow(clippy::unused_async)] // queries are synchronous reads exposed as promises
impl MobileDeviceManager {
    /// Creates the module with the built-in settings.
    #[uniffi::constructor]
    #[allow(clippy::needless_pass_by_value)]
    #[must_use]
    pub fn new(provider: Arc<dyn PlatformProvider>, events: Arc<dyn EventSink>) -> Self {
        Self::build(provider.as_ref(), events, MdmSettings::default())
    }

    /// Creates the module with custom settings.
    #[uniffi::constructor]
    #[allow(clippy::needless_pass_by_value)]
    #[must_use]
    pub fn with_settings(
        provider: Arc<dyn PlatformProvider>,
        events: Arc<dyn EventSink>,
        settings: MdmSettings,
    ) -> Self {
        Self::build(provider.as_ref(), events, settings)
    }

    /// Name the module registers under in the host bridge.
    #[allow(clippy::unused_self)] // associated functions are not supported with Uniffi exports
    #[must_use]
    pub fn module_name(&self) -> String {
        MODULE_NAME.to_string()
    }

    /// Constants exported to the host: the event channel names.
    #[allow(clippy::unused_self)]
    #[must_use]
    pub fn constants(&self) -> HashMap<String, String> {
        event_channels()
    }

    /// Whether managed configuration is supported and currently present.
    pub async fn is_supported(&self) -> bool {
        self.caps.config.is_available() && !self.restrictions().is_empty()
    }

    /// The managed configuration; empty when unsupported, never an error.
    pub async fn get_configuration(&self) -> HashMap<String, String> {
        self.restrictions().to_map()
    }

    /// Management state, distribution channel and organization of the app.
    ///
    /// # Errors
    ///
    /// Returns `UnexpectedPlatformError` if the bundle id cannot be read.
    pub async fn get_device_info(&self) -> Result<DeviceInfo, MdmKitError> {
        self.device_info()
    }

    /// The organization configuration pairs.
    pub async fn get_organization_info(&self) -> HashMap<String, String> {
        self.restrictions().to_map()
    }

    /// Re-reads the configuration and returns the device info.
    ///
    /// # Errors
    ///
    /// See [`Self::get_device_info`].
    pub async fn refresh_configuration(&self) -> Result<DeviceInfo, MdmKitError> {
        log::debug!("refreshing managed configuration");
        self.device_info()
    }

    /// Well-known and term-matching configuration keys.
    pub async fn probe_configuration(&self) -> ConfigurationProbe {
        self.configuration_probe(&self.restrictions())
    }

    /// Framework presence and download-source flags.
    pub async fn check_capabilities(&self) -> CapabilityReport {
        let restrictions = self.restrictions();
        capability_report(&self.caps, &self.signal(&restrictions))
    }

    /// Enrollment and installation source of the app.
    pub async fn get_enrollment_status(&self) -> EnrollmentStatus {
        enrollment_status(&self.caps, &self.settings)
    }

    /// Re-reads the configuration and reports vendor keys found.
    pub async fn force_sync(&self) -> SyncReport {
        force_sync(&self.caps)
    }

    /// Probe, enrollment status and inference steps in one report.
    pub async fn get_detailed_diagnostics(&self) -> DetailedDiagnostics {
        let restrictions = self.restrictions();
        let bundle = BundleInfo::read(self.caps.package.as_ref())
            .inspect_err(|err| log::warn!("bundle info unreadable: {err}"))
            .ok();
        DetailedDiagnostics {
            bundle,
            configuration: self.configuration_probe(&restrictions),
            enrollment: enrollment_status(&self.caps, &self.settings),
            detection: DetectionSteps::from(&self.signal(&restrictions)),
        }
    }

    /// Whether this app may enter lock-task mode.
    pub async fn is_app_locking_allowed(&self) -> bool {
        self.lock.is_locking_permitted()
    }

    /// Whether lock-task mode is active.
    ///
    /// # Errors
    ///
    /// Returns `UnexpectedPlatformError` if the state query fails.
    pub async fn is_app_locked(&self) -> Result<bool, MdmKitError> {
        self.lock.is_locked()
    }

    /// Enters lock-task mode.
    ///
    /// # Errors
    ///
    /// Returns `OperationFailed` with "Unable to lock app" when the app is
    /// already locked or has no foreground window.
    pub async fn lock_app(&self) -> Result<bool, MdmKitError> {
        self.lock.lock()
    }

    /// Leaves lock-task mode.
    ///
    /// # Errors
    ///
    /// Returns `OperationFailed` with "Unable to unlock app" when the app is
    /// not locked or has no foreground window.
    pub async fn unlock_app(&self) -> Result<bool, MdmKitError> {
        self.lock.unlock()
    }

    /// Module initialisation; starts listening if the app is foregrounded.
    pub fn initialize(&self) {
        self.notifier.register();
    }

    /// The app came to the foreground.
    pub fn on_host_resume(&self) {
        self.notifier.register();
    }

    /// The app went to the background.
    pub fn on_host_pause(&self) {
        self.notifier.unregister();
    }

    /// The host is tearing the module down.
    pub fn on_host_destroy(&self) {
        self.notifier.unregister();
    }

    /// Whether configuration changes are currently being listened for.
    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.notifier.is_registered()
    }
}
