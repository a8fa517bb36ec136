//! Outbound events delivered to the host runtime.

use std::collections::HashMap;

use crate::defaults::{APP_CONFIG_CHANGED, APP_LOCK_STATUS_CHANGED};

/// An event pushed to the host.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum MdmEvent {
    /// The managed configuration changed; carries the current snapshot.
    ConfigurationChanged {
        /// Every configuration pair currently published by the OS.
        configuration: HashMap<String, String>,
    },
    /// Lock-task mode was entered or left.
    LockStatusChanged {
        /// Whether the app is now locked.
        locked: bool,
    },
}

impl MdmEvent {
    /// The channel name consumers subscribe to.
    #[must_use]
    pub const fn channel(&self) -> &'static str {
        match self {
            Self::ConfigurationChanged { .. } => APP_CONFIG_CHANGED,
            Self::LockStatusChanged { .. } => APP_LOCK_STATUS_CHANGED,
        }
    }
}

/// Delivers events to the host runtime (the JS event emitter).
#[uniffi::export(with_foreign)]
pub trait EventSink: Send + Sync {
    /// Whether a runtime is attached that can receive events right now.
    fn is_active(&self) -> bool;

    /// Emits `event` on `channel`.
    fn emit(&self, channel: String, event: MdmEvent);
}

/// Emits `event` if the sink is active. Returns whether it was delivered.
pub(crate) fn emit_if_active(sink: &dyn EventSink, event: MdmEvent) -> bool {
    if !sink.is_active() {
        log::debug!("no active runtime, dropping {} event", event.channel());
        return false;
    }
    sink.emit(event.channel().to_string(), event);
    true
}

/// Event channel names keyed by the constant names the host exports.
#[uniffi::export]
#[must_use]
pub fn event_channels() -> HashMap<String, String> {
    HashMap::from([
        ("APP_CONFIG_CHANGED".to_string(), APP_CONFIG_CHANGED.to_string()),
        (
            "APP_LOCK_STATUS_CHANGED".to_string(),
            APP_LOCK_STATUS_CHANGED.to_string(),
        ),
    ])
}
