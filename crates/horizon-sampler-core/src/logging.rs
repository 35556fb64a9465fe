//! Logging facilities for Horizon Sampler.
//!
//! Horizon Sampler uses the `tracing` crate for instrumentation and never
//! installs a subscriber itself. To see logs, install one in your
//! application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("horizon_sampler_core=debug")
//!         .init();
//!
//!     // Your application code...
//! }
//! ```

/// Span names used throughout Horizon Sampler for tracing.
pub mod span_names {
    /// A complete locate-then-read sampling call.
    pub const MAP: &str = "horizon_sampler::map";
    /// A forward or backward value search.
    pub const SEARCH: &str = "horizon_sampler::search";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core engine target.
    pub const CORE: &str = "horizon_sampler_core";
    /// Streamable positioning and search.
    pub const STREAM: &str = "horizon_sampler_core::stream";
    /// Tabular addressing.
    pub const SPSDS: &str = "horizon_sampler_core::spsds";
    /// Linear interpolation.
    pub const LNRDS: &str = "horizon_sampler_core::lnrds";
    /// Localization.
    pub const STMDL: &str = "horizon_sampler_core::stmdl";
    /// Sampler composition.
    pub const SAMPLER: &str = "horizon_sampler_core::sampler";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// This is useful for tracking the duration of a sampling call.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::trace_span!(target: "horizon_sampler::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}
