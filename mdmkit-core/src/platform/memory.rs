//! In-memory implementations of the platform capabilities.
//!
//! Deterministic stand-ins for the OS services, used by the test suites and
//! by the developer CLI to replay device fixtures. Every setter takes effect
//! on the next read, which mirrors the live-read behaviour of the real
//! services.

#![allow(clippy::missing_panics_doc)]
#![allow(clippy::significant_drop_tightening)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use crate::error::{CapabilityError, CapabilityResult};
use crate::events::{EventSink, MdmEvent};
use crate::notifications::ConfigChangeReceiver;

use super::{
    AdminCapability, ConfigStore, ForegroundContext, LockCapability, PackageMeta,
    PlatformProvider, SubscriptionHandle,
};

fn check(failure: &Mutex<Option<String>>) -> CapabilityResult<()> {
    match failure.lock().unwrap().as_ref() {
        Some(message) => Err(CapabilityError::Platform(message.clone())),
        None => Ok(()),
    }
}

// =============================================================================
// Config Store
// =============================================================================

/// Managed configuration held in a `HashMap`, with broadcast delivery to
/// subscribed receivers.
pub struct MemoryConfigStore {
    available: AtomicBool,
    configuration: RwLock<HashMap<String, String>>,
    failure: Mutex<Option<String>>,
    unsubscribe_failure: Mutex<Option<String>>,
    subscribers: Mutex<HashMap<SubscriptionHandle, Arc<ConfigChangeReceiver>>>,
    next_handle: AtomicU64,
    subscribe_calls: AtomicUsize,
    unsubscribe_calls: AtomicUsize,
}

impl MemoryConfigStore {
    /// An available store with no configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            available: AtomicBool::new(true),
            configuration: RwLock::new(HashMap::new()),
            failure: Mutex::new(None),
            unsubscribe_failure: Mutex::new(None),
            subscribers: Mutex::new(HashMap::new()),
            next_handle: AtomicU64::new(1),
            subscribe_calls: AtomicUsize::new(0),
            unsubscribe_calls: AtomicUsize::new(0),
        }
    }

    /// A store on an OS version without managed configuration.
    #[must_use]
    pub fn unavailable() -> Self {
        let store = Self::new();
        store.set_available(false);
        store
    }

    /// Sets whether the store reports itself available.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Replaces the published configuration.
    pub fn set_configuration<K, V>(&self, pairs: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        *self.configuration.write().unwrap() = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
    }

    /// Makes every read fail with `message` until [`Self::recover`].
    pub fn fail_reads(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    /// Makes `unsubscribe` fail with `message`, keeping the subscription
    /// live, until [`Self::recover`].
    pub fn fail_unsubscribe(&self, message: &str) {
        *self.unsubscribe_failure.lock().unwrap() = Some(message.to_string());
    }

    /// Clears every injected failure.
    pub fn recover(&self) {
        *self.failure.lock().unwrap() = None;
        *self.unsubscribe_failure.lock().unwrap() = None;
    }

    /// Delivers a change broadcast to every subscriber. Returns how many
    /// receivers were notified.
    #[allow(clippy::must_use_candidate)]
    pub fn broadcast(&self) -> usize {
        let receivers: Vec<_> = self.subscribers.lock().unwrap().values().cloned().collect();
        for receiver in &receivers {
            receiver.on_configuration_changed();
        }
        receivers.len()
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().unwrap().len()
    }

    /// Total `subscribe` calls received.
    #[must_use]
    pub fn subscribe_calls(&self) -> usize {
        self.subscribe_calls.load(Ordering::SeqCst)
    }

    /// Total `unsubscribe` calls received.
    #[must_use]
    pub fn unsubscribe_calls(&self) -> usize {
        self.unsubscribe_calls.load(Ordering::SeqCst)
    }
}

impl Default for MemoryConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for MemoryConfigStore {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn read(&self) -> CapabilityResult<HashMap<String, String>> {
        check(&self.failure)?;
        Ok(self.configuration.read().unwrap().clone())
    }

    fn subscribe(
        &self,
        receiver: Arc<ConfigChangeReceiver>,
    ) -> CapabilityResult<SubscriptionHandle> {
        self.subscribe_calls.fetch_add(1, Ordering::SeqCst);
        let handle = self.next_handle.fetch_add(1, Ordering::SeqCst);
        self.subscribers.lock().unwrap().insert(handle, receiver);
        Ok(handle)
    }

    fn unsubscribe(&self, handle: SubscriptionHandle) -> CapabilityResult<()> {
        self.unsubscribe_calls.fetch_add(1, Ordering::SeqCst);
        check(&self.unsubscribe_failure)?;
        self.subscribers
            .lock()
            .unwrap()
            .remove(&handle)
            .map(|_| ())
            .ok_or_else(|| CapabilityError::Platform(format!("unknown subscription {handle}")))
    }
}

// =============================================================================
// Admin
// =============================================================================

/// Device policy state held in flags.
pub struct MemoryAdmin {
    available: AtomicBool,
    active_administrators: AtomicBool,
    device_owner: AtomicBool,
    profile_owner: AtomicBool,
    failure: Mutex<Option<String>>,
}

impl MemoryAdmin {
    /// An available capability with no administrator and no ownership.
    #[must_use]
    pub fn new() -> Self {
        Self {
            available: AtomicBool::new(true),
            active_administrators: AtomicBool::new(false),
            device_owner: AtomicBool::new(false),
            profile_owner: AtomicBool::new(false),
            failure: Mutex::new(None),
        }
    }

    /// Sets whether the device policy service exists.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Sets whether any administrator is active.
    pub fn set_active_administrators(&self, active: bool) {
        self.active_administrators.store(active, Ordering::SeqCst);
    }

    /// Sets whether this app is the device owner.
    pub fn set_device_owner(&self, owner: bool) {
        self.device_owner.store(owner, Ordering::SeqCst);
    }

    /// Sets whether this app is the profile owner.
    pub fn set_profile_owner(&self, owner: bool) {
        self.profile_owner.store(owner, Ordering::SeqCst);
    }

    /// Makes every query fail with `message`.
    pub fn fail_reads(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }
}

impl Default for MemoryAdmin {
    fn default() -> Self {
        Self::new()
    }
}

impl AdminCapability for MemoryAdmin {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn has_active_administrators(&self) -> CapabilityResult<bool> {
        check(&self.failure)?;
        Ok(self.active_administrators.load(Ordering::SeqCst))
    }

    fn is_device_owner(&self) -> CapabilityResult<bool> {
        check(&self.failure)?;
        Ok(self.device_owner.load(Ordering::SeqCst))
    }

    fn is_profile_owner(&self) -> CapabilityResult<bool> {
        check(&self.failure)?;
        Ok(self.profile_owner.load(Ordering::SeqCst))
    }
}

// =============================================================================
// Lock
// =============================================================================

/// Lock-task state shared between the capability and its foreground window.
pub struct MemoryLock {
    available: AtomicBool,
    permitted: AtomicBool,
    locked: Arc<AtomicBool>,
    foreground: AtomicBool,
    failure: Mutex<Option<String>>,
}

impl MemoryLock {
    /// Available, not permitted, unlocked, with a foreground window.
    #[must_use]
    pub fn new() -> Self {
        Self {
            available: AtomicBool::new(true),
            permitted: AtomicBool::new(false),
            locked: Arc::new(AtomicBool::new(false)),
            foreground: AtomicBool::new(true),
            failure: Mutex::new(None),
        }
    }

    /// Sets whether the OS supports lock-task mode.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Sets whether policy allows this app to lock.
    pub fn set_permitted(&self, permitted: bool) {
        self.permitted.store(permitted, Ordering::SeqCst);
    }

    /// Forces the current lock state.
    pub fn set_locked(&self, locked: bool) {
        self.locked.store(locked, Ordering::SeqCst);
    }

    /// Sets whether the app has a foreground window.
    pub fn set_foreground(&self, foreground: bool) {
        self.foreground.store(foreground, Ordering::SeqCst);
    }

    /// Makes state queries fail with `message`.
    pub fn fail_reads(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }
}

impl Default for MemoryLock {
    fn default() -> Self {
        Self::new()
    }
}

impl LockCapability for MemoryLock {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn is_lock_permitted(&self) -> CapabilityResult<bool> {
        check(&self.failure)?;
        Ok(self.permitted.load(Ordering::SeqCst))
    }

    fn is_locked(&self) -> CapabilityResult<bool> {
        check(&self.failure)?;
        Ok(self.locked.load(Ordering::SeqCst))
    }

    fn foreground_context(&self) -> Option<Arc<dyn ForegroundContext>> {
        if !self.foreground.load(Ordering::SeqCst) {
            return None;
        }
        Some(Arc::new(MemoryForegroundContext {
            locked: Arc::clone(&self.locked),
        }))
    }
}

struct MemoryForegroundContext {
    locked: Arc<AtomicBool>,
}

impl ForegroundContext for MemoryForegroundContext {
    fn start_lock(&self) -> CapabilityResult<bool> {
        self.locked.store(true, Ordering::SeqCst);
        Ok(true)
    }

    fn stop_lock(&self) -> CapabilityResult<bool> {
        self.locked.store(false, Ordering::SeqCst);
        Ok(true)
    }
}

// =============================================================================
// Package
// =============================================================================

/// Package metadata of a simulated app.
pub struct MemoryPackage {
    bundle_id: Mutex<String>,
    installer: Mutex<Option<String>>,
    version_name: Mutex<String>,
    version_code: AtomicU64,
    display_name: Mutex<String>,
    metadata: Mutex<HashMap<String, String>>,
    installer_failure: Mutex<Option<String>>,
    failure: Mutex<Option<String>>,
}

impl MemoryPackage {
    /// `com.example.app` 1.0.0 (1), installed from the public store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bundle_id: Mutex::new("com.example.app".to_string()),
            installer: Mutex::new(Some("com.android.vending".to_string())),
            version_name: Mutex::new("1.0.0".to_string()),
            version_code: AtomicU64::new(1),
            display_name: Mutex::new("Example".to_string()),
            metadata: Mutex::new(HashMap::new()),
            installer_failure: Mutex::new(None),
            failure: Mutex::new(None),
        }
    }

    /// Sets the package name.
    pub fn set_bundle_id(&self, bundle_id: &str) {
        *self.bundle_id.lock().unwrap() = bundle_id.to_string();
    }

    /// Sets the recorded installer; `None` for a side-load.
    pub fn set_installer(&self, installer: Option<&str>) {
        *self.installer.lock().unwrap() = installer.map(ToString::to_string);
    }

    /// Sets the version name and code.
    pub fn set_version(&self, name: &str, code: u64) {
        *self.version_name.lock().unwrap() = name.to_string();
        self.version_code.store(code, Ordering::SeqCst);
    }

    /// Sets the application label.
    pub fn set_display_name(&self, name: &str) {
        *self.display_name.lock().unwrap() = name.to_string();
    }

    /// Adds a manifest metadata entry.
    pub fn set_metadata(&self, key: &str, value: &str) {
        self.metadata
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    /// Makes only the installer lookup fail with `message`.
    pub fn fail_installer(&self, message: &str) {
        *self.installer_failure.lock().unwrap() = Some(message.to_string());
    }

    /// Makes every lookup fail with `message`.
    pub fn fail_reads(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }
}

impl Default for MemoryPackage {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageMeta for MemoryPackage {
    fn bundle_id(&self) -> CapabilityResult<String> {
        check(&self.failure)?;
        Ok(self.bundle_id.lock().unwrap().clone())
    }

    fn installer_package(&self) -> CapabilityResult<Option<String>> {
        check(&self.failure)?;
        check(&self.installer_failure)?;
        Ok(self.installer.lock().unwrap().clone())
    }

    fn version_name(&self) -> CapabilityResult<String> {
        check(&self.failure)?;
        Ok(self.version_name.lock().unwrap().clone())
    }

    fn version_code(&self) -> CapabilityResult<i64> {
        check(&self.failure)?;
        i64::try_from(self.version_code.load(Ordering::SeqCst))
            .map_err(|e| CapabilityError::Platform(e.to_string()))
    }

    fn display_name(&self) -> CapabilityResult<String> {
        check(&self.failure)?;
        Ok(self.display_name.lock().unwrap().clone())
    }

    fn metadata_value(&self, key: String) -> CapabilityResult<Option<String>> {
        check(&self.failure)?;
        Ok(self.metadata.lock().unwrap().get(&key).cloned())
    }
}

// =============================================================================
// Platform + Events
// =============================================================================

/// All four capabilities, individually reachable for configuration.
pub struct MemoryPlatform {
    /// Managed configuration.
    pub config: Arc<MemoryConfigStore>,
    /// Device administration.
    pub admin: Arc<MemoryAdmin>,
    /// Lock-task mode.
    pub lock: Arc<MemoryLock>,
    /// Package metadata.
    pub package: Arc<MemoryPackage>,
}

impl MemoryPlatform {
    /// A device where every capability is present and nothing is managed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: Arc::new(MemoryConfigStore::new()),
            admin: Arc::new(MemoryAdmin::new()),
            lock: Arc::new(MemoryLock::new()),
            package: Arc::new(MemoryPackage::new()),
        }
    }

    /// A device on an OS version predating every capability.
    #[must_use]
    pub fn without_capabilities() -> Self {
        let platform = Self::new();
        platform.config.set_available(false);
        platform.admin.set_available(false);
        platform.lock.set_available(false);
        platform
    }
}

impl Default for MemoryPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformProvider for MemoryPlatform {
    fn config_store(&self) -> Arc<dyn ConfigStore> {
        self.config.clone()
    }

    fn admin(&self) -> Arc<dyn AdminCapability> {
        self.admin.clone()
    }

    fn lock(&self) -> Arc<dyn LockCapability> {
        self.lock.clone()
    }

    fn package(&self) -> Arc<dyn PackageMeta> {
        self.package.clone()
    }
}

/// Records every emitted event.
pub struct MemoryEventSink {
    active: AtomicBool,
    events: Mutex<Vec<(String, MdmEvent)>>,
}

impl MemoryEventSink {
    /// A sink with an attached runtime.
    #[must_use]
    pub fn new() -> Self {
        Self {
            active: AtomicBool::new(true),
            events: Mutex::new(Vec::new()),
        }
    }

    /// A sink whose runtime is not attached yet.
    #[must_use]
    pub fn inactive() -> Self {
        let sink = Self::new();
        sink.set_active(false);
        sink
    }

    /// Attaches or detaches the runtime.
    pub fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::SeqCst);
    }

    /// Events received so far, with their channel names.
    #[must_use]
    pub fn events(&self) -> Vec<(String, MdmEvent)> {
        self.events.lock().unwrap().clone()
    }
}

impl Default for MemoryEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for MemoryEventSink {
    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn emit(&self, channel: String, event: MdmEvent) {
        self.events.lock().unwrap().push((channel, event));
    }
}
