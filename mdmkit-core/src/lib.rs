#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
//! `MDMKit` exposes mobile device management state to a cross-platform host.
//!
//! The host implements the [`platform`] capabilities on top of the OS services
//! and drives a [`MobileDeviceManager`]. Queries combine the managed
//! configuration, device administration and installer signals into the
//! answers in [`DeviceInfo`].

pub mod defaults;

mod diagnostics;
pub use diagnostics::*;

mod error;
pub use error::*;

mod events;
pub use events::*;

pub mod inference;

mod installer;
pub use installer::InstallerIdentity;

mod lock;
pub use lock::LockController;

pub mod logger;

mod manager;
pub use manager::MobileDeviceManager;

pub mod notifications;

pub mod platform;

mod restrictions;
pub use restrictions::RestrictionSet;

mod settings;
pub use settings::*;

mod types;
pub use types::{BundleInfo, DeviceInfo, KeyValue};

uniffi::setup_scaffolding!("mdmkit_core");
