// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Logging facade for the virtual file provider crates
//!
//! Usage:
//! - `VFP_LOG=off` (default) - no logs
//! - `VFP_LOG=error` / `warn` - failures and cleanup problems only
//! - `VFP_LOG=info` - provider construction
//! - `VFP_LOG=debug` - every mutating file and directory operation

use std::sync::Once;

// Re-export emit so macros can use it
pub use emit;

/// Environment variable holding the minimum log level
pub const LOG_ENV: &str = "VFP_LOG";

static INIT: Once = Once::new();

/// Minimum level for a `VFP_LOG` value; `None` means logging is off.
///
/// Unknown values map to `Info`.
#[must_use]
pub fn level_for(value: &str) -> Option<emit::Level> {
    match value.trim().to_ascii_lowercase().as_str() {
        "off" | "" => None,
        "debug" => Some(emit::Level::Debug),
        "warn" => Some(emit::Level::Warn),
        "error" => Some(emit::Level::Error),
        _ => Some(emit::Level::Info),
    }
}

/// Initialize diagnostics from the `VFP_LOG` environment variable
///
/// Call once at application startup. Later calls are ignored.
pub fn init_diagnostics() {
    INIT.call_once(|| {
        let value = std::env::var(LOG_ENV).unwrap_or_else(|_| "off".to_string());
        let Some(level) = level_for(&value) else {
            return;
        };

        let rt = emit::setup()
            .emit_to(emit_term::stderr())
            .emit_when(emit::level::min_filter(level))
            .init();

        if !matches!(value.trim().to_ascii_lowercase().as_str(), "debug" | "info" | "warn" | "error") {
            emit::warn!("unknown {env} value {value}, using info", env: LOG_ENV, value: value);
        }

        // The runtime must outlive every emitting thread
        std::mem::forget(rt);
    });
}

/// Log provider-level events (construction, configuration)
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

/// Log individual operations (creates, writes, deletes)
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

/// Log recoverable problems (leftover temporaries, skipped entries)
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

/// Log failures
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}

/// Re-export the init function for convenience
pub use init_diagnostics as init;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for() {
        assert_eq!(level_for("off"), None);
        assert_eq!(level_for(""), None);
        assert_eq!(level_for("debug"), Some(emit::Level::Debug));
        assert_eq!(level_for("WARN"), Some(emit::Level::Warn));
        assert_eq!(level_for("error"), Some(emit::Level::Error));
        assert_eq!(level_for("info"), Some(emit::Level::Info));
        assert_eq!(level_for("chatty"), Some(emit::Level::Info));
    }

    #[test]
    fn test_init_is_safe_to_call_multiple_times() {
        init_diagnostics();
        init();
    }

    #[test]
    fn test_macros_compile() {
        log_info!("Test message");
        log_debug!("Debug message with {value}", value: 42);
        log_warn!("Warning message");
        log_error!("Error message");

        info!("Test message");
        debug!("Debug message with {value}", value: 42);
        warn!("Warning message");
        error!("Error message");
    }
}
