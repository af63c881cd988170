//! conform-core
//!
//! Core library for heuristic compliance auditing of Solidity token entry points.
//!
//! This crate holds the function extractor, signature matcher, call-graph resolver,
//! condition harvester, per-standard requirement verifiers, the audit orchestrator,
//! audit-spec parsing, and the project database.
//!
//! All substantive logic lives here so it is fully testable and reusable from
//! multiple frontends (CLI, batch jobs, etc.).

/// Compile a hard-coded pattern once and hand back a `&'static Regex`.
macro_rules! regex {
    ($re:expr $(,)?) => {{
        static RE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
        RE.get_or_init(|| regex::Regex::new($re).expect("hard-coded regex must compile"))
    }};
}

pub mod model;
pub mod analysis;
pub mod audits;
pub mod selectors;
pub mod services;
pub mod db;

/// Returns the library version as encoded at compile time.
///
/// Useful for tests and for frontends to report consistent version info.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
