//! Turns OS configuration-change broadcasts into host events.
//!
//! The subscription only lives while the app is in the foreground: the host
//! calls [`ConfigChangeNotifier::register`] on resume and
//! [`ConfigChangeNotifier::unregister`] on pause. Broadcasts missed while
//! unregistered are lost; hosts re-query on resume.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::events::{emit_if_active, EventSink, MdmEvent};
use crate::platform::{ConfigStore, SubscriptionHandle};
use crate::restrictions::RestrictionSet;

/// Receiver handed to [`ConfigStore::subscribe`]. The host calls
/// [`ConfigChangeReceiver::on_configuration_changed`] for each broadcast.
#[derive(uniffi::Object)]
pub struct ConfigChangeReceiver {
    store: Arc<dyn ConfigStore>,
    events: Arc<dyn EventSink>,
}

impl std::fmt::Debug for ConfigChangeReceiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigChangeReceiver").finish()
    }
}

#[uniffi::export]
impl ConfigChangeReceiver {
    /// Emits the current configuration snapshot, if a runtime is attached.
    pub fn on_configuration_changed(&self) {
        let snapshot = RestrictionSet::read(self.store.as_ref());
        log::debug!("configuration changed, {} keys", snapshot.len());
        emit_if_active(
            self.events.as_ref(),
            MdmEvent::ConfigurationChanged {
                configuration: snapshot.to_map(),
            },
        );
    }
}

/// Owner of the single broadcast subscription.
pub struct ConfigChangeNotifier {
    store: Arc<dyn ConfigStore>,
    events: Arc<dyn EventSink>,
    handle: Mutex<Option<SubscriptionHandle>>,
}

impl ConfigChangeNotifier {
    /// Creates an unregistered notifier.
    #[must_use]
    pub fn new(store: Arc<dyn ConfigStore>, events: Arc<dyn EventSink>) -> Self {
        Self {
            store,
            events,
            handle: Mutex::new(None),
        }
    }

    fn handle(&self) -> MutexGuard<'_, Option<SubscriptionHandle>> {
        // the guarded value is a plain handle, a poisoned lock still holds a valid one
        self.handle
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Whether a subscription is currently held.
    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.handle().is_some()
    }

    /// Subscribes to configuration changes. No-op if already registered or
    /// if the store is unavailable. Returns whether a subscription is held.
    #[allow(clippy::must_use_candidate)] // outcome is logged
    pub fn register(&self) -> bool {
        let mut handle = self.handle();
        if handle.is_some() {
            return true;
        }
        if !self.store.is_available() {
            log::debug!("config store unavailable, not subscribing");
            return false;
        }
        let receiver = Arc::new(ConfigChangeReceiver {
            store: Arc::clone(&self.store),
            events: Arc::clone(&self.events),
        });
        match self.store.subscribe(receiver) {
            Ok(subscription) => {
                log::info!("subscribed to configuration changes ({subscription})");
                *handle = Some(subscription);
                true
            }
            Err(err) => {
                log::warn!("failed to subscribe to configuration changes: {err}");
                false
            }
        }
    }

    /// Drops the subscription, if any. A failed unsubscribe keeps the handle
    /// so the next [`Self::register`] does not add a second subscription.
    pub fn unregister(&self) {
        let mut handle = self.handle();
        let Some(subscription) = *handle else {
            return;
        };
        match self.store.unsubscribe(subscription) {
            Ok(()) => {
                log::info!("unsubscribed from configuration changes ({subscription})");
                *handle = None;
            }
            Err(err) => log::warn!("failed to unsubscribe {subscription}: {err}"),
        }
    }
}

impl Drop for ConfigChangeNotifier {
    fn drop(&mut self) {
        self.unregister();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::APP_CONFIG_CHANGED;
    use crate::platform::memory::{MemoryConfigStore, MemoryEventSink};

    fn notifier() -> (Arc<MemoryConfigStore>, Arc<MemoryEventSink>, ConfigChangeNotifier) {
        let store = Arc::new(MemoryConfigStore::new());
        let sink = Arc::new(MemoryEventSink::new());
        let notifier = ConfigChangeNotifier::new(store.clone(), sink.clone());
        (store, sink, notifier)
    }

    #[test]
    fn test_register_is_idempotent() {
        let (store, _, notifier) = notifier();
        assert!(notifier.register());
        assert!(notifier.register());
        assert!(notifier.is_registered());
        assert_eq!(store.subscribe_calls(), 1);
        assert_eq!(store.subscriber_count(), 1);
    }

    #[test]
    fn test_unregister_is_idempotent() {
        let (store, _, notifier) = notifier();
        notifier.unregister();
        assert_eq!(store.unsubscribe_calls(), 0);

        notifier.register();
        notifier.unregister();
        notifier.unregister();
        assert!(!notifier.is_registered());
        assert_eq!(store.unsubscribe_calls(), 1);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn test_unavailable_store_is_never_subscribed() {
        let store = Arc::new(MemoryConfigStore::unavailable());
        let notifier = ConfigChangeNotifier::new(store.clone(), Arc::new(MemoryEventSink::new()));
        assert!(!notifier.register());
        assert_eq!(store.subscribe_calls(), 0);
    }

    #[test]
    fn test_broadcast_emits_snapshot() {
        let (store, sink, notifier) = notifier();
        notifier.register();
        store.set_configuration([("AccountEmail", "jane@acme.com")]);
        assert_eq!(store.broadcast(), 1);

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, APP_CONFIG_CHANGED);
        match &events[0].1 {
            MdmEvent::ConfigurationChanged { configuration } => {
                assert_eq!(configuration["AccountEmail"], "jane@acme.com");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_broadcast_without_runtime_is_dropped() {
        let (store, sink, notifier) = notifier();
        sink.set_active(false);
        notifier.register();
        store.broadcast();
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_missed_broadcasts_are_not_replayed() {
        let (store, sink, notifier) = notifier();
        notifier.register();
        notifier.unregister();
        store.set_configuration([("AccountName", "jane")]);
        assert_eq!(store.broadcast(), 0);
        notifier.register();
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_failed_unsubscribe_keeps_single_subscription() {
        let (store, _, notifier) = notifier();
        notifier.register();
        store.fail_unsubscribe("receiver not registered");
        notifier.unregister();
        assert!(notifier.is_registered());
        assert_eq!(store.subscriber_count(), 1);

        notifier.register();
        assert_eq!(store.subscribe_calls(), 1);
        assert_eq!(store.subscriber_count(), 1);

        store.recover();
        notifier.unregister();
        assert!(!notifier.is_registered());
        assert_eq!(store.subscriber_count(), 0);
        assert_eq!(store.unsubscribe_calls(), 2);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let (store, _, notifier) = notifier();
        notifier.register();
        drop(notifier);
        assert_eq!(store.subscriber_count(), 0);
    }
}
