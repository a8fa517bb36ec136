//! Platform capabilities consumed by the module.
//!
//! Each trait stands in for one OS service. The host implements them on top
//! of the native APIs:
//!
//! - [`ConfigStore`]: `RestrictionsManager` and the
//!   `ACTION_APPLICATION_RESTRICTIONS_CHANGED` broadcast
//! - [`AdminCapability`]: `DevicePolicyManager`
//! - [`LockCapability`]: `ActivityManager` lock-task state and the current
//!   `Activity` ([`ForegroundContext`])
//! - [`PackageMeta`]: `PackageManager` data about the running app
//!
//! Capabilities report whether the backing service exists through
//! `is_available`. A capability that is absent must not be queried further.
//!
//! [`memory`] contains in-memory implementations for tests and tooling.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::CapabilityResult;
use crate::notifications::ConfigChangeReceiver;

pub mod memory;

/// Token identifying one broadcast subscription on the [`ConfigStore`].
pub type SubscriptionHandle = u64;

/// Managed configuration published to the app by the OS.
#[uniffi::export(with_foreign)]
pub trait ConfigStore: Send + Sync {
    /// Whether the managed configuration service exists on this device.
    fn is_available(&self) -> bool;

    /// Reads the current managed configuration as flat string pairs.
    ///
    /// # Errors
    ///
    /// Returns an error if the service cannot be queried.
    fn read(&self) -> CapabilityResult<HashMap<String, String>>;

    /// Starts delivering configuration-change broadcasts to `receiver`.
    ///
    /// # Errors
    ///
    /// Returns an error if the broadcast receiver cannot be registered.
    fn subscribe(
        &self,
        receiver: Arc<ConfigChangeReceiver>,
    ) -> CapabilityResult<SubscriptionHandle>;

    /// Stops the subscription identified by `handle`.
    ///
    /// # Errors
    ///
    /// Returns an error if the broadcast receiver cannot be unregistered.
    fn unsubscribe(&self, handle: SubscriptionHandle) -> CapabilityResult<()>;
}

/// Device administration state relevant to this app.
#[uniffi::export(with_foreign)]
pub trait AdminCapability: Send + Sync {
    /// Whether the device policy service exists on this device.
    fn is_available(&self) -> bool;

    /// Whether any device administrator is active, this app or another.
    ///
    /// # Errors
    ///
    /// Returns an error if the service cannot be queried.
    fn has_active_administrators(&self) -> CapabilityResult<bool>;

    /// Whether this app is the device owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the service cannot be queried.
    fn is_device_owner(&self) -> CapabilityResult<bool>;

    /// Whether this app is the profile owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the service cannot be queried.
    fn is_profile_owner(&self) -> CapabilityResult<bool>;
}

/// OS single-app lock mode.
#[uniffi::export(with_foreign)]
pub trait LockCapability: Send + Sync {
    /// Whether the OS supports lock-task mode at all.
    fn is_available(&self) -> bool;

    /// Whether device policy allows this app to enter lock-task mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the service cannot be queried.
    fn is_lock_permitted(&self) -> CapabilityResult<bool>;

    /// Whether lock-task mode is currently active.
    ///
    /// # Errors
    ///
    /// Returns an error if the service cannot be queried.
    fn is_locked(&self) -> CapabilityResult<bool>;

    /// The foreground window, if the app currently has one.
    fn foreground_context(&self) -> Option<Arc<dyn ForegroundContext>>;
}

/// A foreground window able to start and stop lock-task mode.
#[uniffi::export(with_foreign)]
pub trait ForegroundContext: Send + Sync {
    /// Enters lock-task mode. Returns whether the OS accepted the request.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS rejected the call.
    fn start_lock(&self) -> CapabilityResult<bool>;

    /// Leaves lock-task mode. Returns whether the OS accepted the request.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS rejected the call.
    fn stop_lock(&self) -> CapabilityResult<bool>;
}

/// Package metadata of the running app.
#[uniffi::export(with_foreign)]
pub trait PackageMeta: Send + Sync {
    /// The application package name.
    ///
    /// # Errors
    ///
    /// Returns an error if the package manager cannot be queried.
    fn bundle_id(&self) -> CapabilityResult<String>;

    /// Package name of the agent that installed this app, if recorded.
    ///
    /// # Errors
    ///
    /// Returns an error if the package manager cannot be queried.
    fn installer_package(&self) -> CapabilityResult<Option<String>>;

    /// User-visible version string.
    ///
    /// # Errors
    ///
    /// Returns an error if the package manager cannot be queried.
    fn version_name(&self) -> CapabilityResult<String>;

    /// Internal version number.
    ///
    /// # Errors
    ///
    /// Returns an error if the package manager cannot be queried.
    fn version_code(&self) -> CapabilityResult<i64>;

    /// Application label.
    ///
    /// # Errors
    ///
    /// Returns an error if the package manager cannot be queried.
    fn display_name(&self) -> CapabilityResult<String>;

    /// A string entry from the app's manifest metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the package manager cannot be queried.
    fn metadata_value(&self, key: String) -> CapabilityResult<Option<String>>;
}

/// Hands out the platform capabilities.
#[uniffi::export(with_foreign)]
pub trait PlatformProvider: Send + Sync {
    /// Returns the managed configuration store.
    fn config_store(&self) -> Arc<dyn ConfigStore>;

    /// Returns the device administration capability.
    fn admin(&self) -> Arc<dyn AdminCapability>;

    /// Returns the lock-task capability.
    fn lock(&self) -> Arc<dyn LockCapability>;

    /// Returns the package metadata of the running app.
    fn package(&self) -> Arc<dyn PackageMeta>;
}

/// The capabilities resolved once from a [`PlatformProvider`].
#[derive(Clone)]
pub(crate) struct Capabilities {
    pub config: Arc<dyn ConfigStore>,
    pub admin: Arc<dyn AdminCapability>,
    pub lock: Arc<dyn LockCapability>,
    pub package: Arc<dyn PackageMeta>,
}

impl Capabilities {
    pub fn from_provider(provider: &dyn PlatformProvider) -> Self {
        Self {
            config: provider.config_store(),
            admin: provider.admin(),
            lock: provider.lock(),
            package: provider.package(),
        }
    }
}
