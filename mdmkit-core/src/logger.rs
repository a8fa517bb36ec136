//! Forwarding of `log` records to a host-provided logger.
//!
//! The host installs its logger once (typically from `Application.onCreate`)
//! and every record emitted by this crate is handed to it.
//!
//! ## Kotlin
//!
//! ```kotlin
//! object MdmKitLogger : Logger {
//!     override fun log(level: LogLevel, message: String) {
//!         Log.println(level.toPriority(), "MobileDeviceManager", message)
//!     }
//! }
//!
//! setLogger(MdmKitLogger)
//! ```

use std::sync::{Arc, OnceLock};

/// Receives log messages from `MDMKit`. Implemented by the host.
///
/// ```rust
/// use mdmkit_core::logger::{LogLevel, Logger};
///
/// struct StderrLogger;
///
/// impl Logger for StderrLogger {
///     fn log(&self, level: LogLevel, message: String) {
///         eprintln!("[{level:?}] {message}");
///     }
/// }
/// ```
#[uniffi::export(with_foreign)]
pub trait Logger: Sync + Send {
    /// Records `message` at `level`.
    fn log(&self, level: LogLevel, message: String);
}

/// Severity of a forwarded log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum LogLevel {
    /// Very detailed tracing output.
    Trace,
    /// Debugging information.
    Debug,
    /// Progress of the module (registrations, lock transitions).
    Info,
    /// Degraded signals and recoverable platform failures.
    Warn,
    /// Failures surfaced to the host.
    Error,
}

impl From<log::Level> for LogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Self::Error,
            log::Level::Warn => Self::Warn,
            log::Level::Info => Self::Info,
            log::Level::Debug => Self::Debug,
            log::Level::Trace => Self::Trace,
        }
    }
}

static LOGGER_INSTANCE: OnceLock<Arc<dyn Logger>> = OnceLock::new();

struct ForeignLogger;

/// Debug and trace records are only forwarded when they come from this crate,
/// dependencies are limited to info and above.
fn should_forward(module_path: Option<&str>, level: log::Level) -> bool {
    let from_mdmkit = module_path.is_some_and(|path| path.starts_with("mdmkit"));
    from_mdmkit || level <= log::Level::Info
}

impl log::Log for ForeignLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        if !should_forward(record.module_path(), record.level()) {
            return;
        }
        if let Some(logger) = LOGGER_INSTANCE.get() {
            logger.log(record.level().into(), record.args().to_string());
        } else {
            eprintln!("Logger not set: {}", record.args());
        }
    }

    fn flush(&self) {}
}

/// Installs the host logger. Only the first call has an effect.
#[uniffi::export]
pub fn set_logger(logger: Arc<dyn Logger>) {
    if LOGGER_INSTANCE.set(logger).is_err() {
        eprintln!("Logger already set");
        return;
    }

    static LOGGER: ForeignLogger = ForeignLogger;
    if let Err(e) = log::set_logger(&LOGGER) {
        eprintln!("Failed to set logger: {e}");
        return;
    }
    log::set_max_level(log::LevelFilter::Trace);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_records_from_dependencies_are_dropped() {
        assert!(!should_forward(Some("serde_json::de"), log::Level::Debug));
        assert!(!should_forward(None, log::Level::Trace));
        assert!(should_forward(Some("serde_json::de"), log::Level::Warn));
    }

    #[test]
    fn test_own_records_are_always_forwarded() {
        assert!(should_forward(Some("mdmkit_core::notifications"), log::Level::Trace));
        assert!(should_forward(Some("mdmkit_core::lock"), log::Level::Error));
    }

    #[test]
    fn test_level_conversion() {
        assert_eq!(LogLevel::from(log::Level::Warn), LogLevel::Warn);
        assert_eq!(LogLevel::from(log::Level::Trace), LogLevel::Trace);
    }
}
