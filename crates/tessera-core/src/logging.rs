//! Logging facilities for Tessera.
//!
//! Tessera uses the `tracing` crate for instrumentation and never installs a
//! subscriber itself. To see logs, install one in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("tessera_core::store=debug")
//!         .init();
//! }
//! ```
//!
//! Write paths log at `debug`, reads at `trace`.

/// Span names used throughout Tessera for tracing.
pub mod span_names {
    /// Entity save (create or update) span.
    pub const SAVE: &str = "tessera::save";
    /// Entity delete span.
    pub const DELETE: &str = "tessera::delete";
    /// Query span.
    pub const QUERY: &str = "tessera::query";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core storage target.
    pub const CORE: &str = "tessera_core";
    /// Entity store target.
    pub const STORE: &str = "tessera_core::store";
    /// Interceptor target, for hooks implemented outside this crate.
    pub const INTERCEPTOR: &str = "tessera_core::interceptor";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// This is useful for tracking the duration of an operation.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create and enter a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "tessera::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

/// Macros for common tracing patterns.
///
/// These are thin wrappers around the `tracing` macros with the store target.
#[macro_export]
macro_rules! store_trace {
    ($($arg:tt)*) => {
        tracing::trace!(target: "tessera_core::store", $($arg)*)
    };
}

#[macro_export]
macro_rules! store_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: "tessera_core::store", $($arg)*)
    };
}
