//! Single-app lock ("kiosk") mode.
//!
//! The OS owns the lock state; every call reads it fresh.

use std::sync::Arc;

use crate::error::MdmKitError;
use crate::events::{emit_if_active, EventSink, MdmEvent};
use crate::platform::LockCapability;

const LOCK_FAILED: &str = "Unable to lock app";
const UNLOCK_FAILED: &str = "Unable to unlock app";

/// Requests lock-task transitions and reports lock state.
pub struct LockController {
    lock: Arc<dyn LockCapability>,
    events: Arc<dyn EventSink>,
}

impl LockController {
    /// Creates a controller over `lock`, announcing transitions on `events`.
    #[must_use]
    pub fn new(lock: Arc<dyn LockCapability>, events: Arc<dyn EventSink>) -> Self {
        Self { lock, events }
    }

    /// Whether the OS supports lock-task mode and policy permits this app to
    /// use it. Fails closed.
    #[must_use]
    pub fn is_locking_permitted(&self) -> bool {
        if !self.lock.is_available() {
            return false;
        }
        self.lock.is_lock_permitted().unwrap_or_else(|err| {
            log::warn!("lock permission check failed: {err}");
            false
        })
    }

    /// Whether lock-task mode is active. `false` where unsupported.
    ///
    /// # Errors
    ///
    /// Returns `UnexpectedPlatformError` if the state query fails.
    pub fn is_locked(&self) -> Result<bool, MdmKitError> {
        if !self.lock.is_available() {
            return Ok(false);
        }
        match self.lock.is_locked() {
            Ok(locked) => Ok(locked),
            Err(err) if err.is_unavailable() => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    /// Enters lock-task mode.
    ///
    /// # Errors
    ///
    /// Returns `OperationFailed` if the app is already locked, lock-task mode
    /// is unsupported or there is no foreground window, and
    /// `UnexpectedPlatformError` if the OS call fails.
    pub fn lock(&self) -> Result<bool, MdmKitError> {
        self.transition(true)
    }

    /// Leaves lock-task mode.
    ///
    /// # Errors
    ///
    /// Returns `OperationFailed` if the app is not locked, lock-task mode is
    /// unsupported or there is no foreground window, and
    /// `UnexpectedPlatformError` if the OS call fails.
    pub fn unlock(&self) -> Result<bool, MdmKitError> {
        self.transition(false)
    }

    fn transition(&self, lock: bool) -> Result<bool, MdmKitError> {
        let failure = if lock { LOCK_FAILED } else { UNLOCK_FAILED };
        if !self.lock.is_available() || self.is_locked()? == lock {
            return Err(MdmKitError::operation_failed(failure));
        }
        let Some(context) = self.lock.foreground_context() else {
            log::warn!("no foreground window for lock transition");
            return Err(MdmKitError::operation_failed(failure));
        };
        let accepted = if lock {
            context.start_lock()?
        } else {
            context.stop_lock()?
        };
        if !accepted {
            return Err(MdmKitError::operation_failed(failure));
        }
        log::info!("lock-task mode {}", if lock { "entered" } else { "left" });
        emit_if_active(self.events.as_ref(), MdmEvent::LockStatusChanged { locked: lock });
        Ok(true)
    }
}
