//! Source-text analysis: function extraction, signature matching, call-graph
//! resolution, and condition harvesting.
//!
//! None of this builds an AST. Every stage works on raw text with
//! best-effort patterns, so a corrupt file degrades to fewer records
//! rather than an error.

pub mod callgraph;
pub mod conditions;
pub mod extract;
pub mod signature;
pub mod text;

pub use callgraph::{resolve_calls, CallClosure};
pub use conditions::{harvest_conditions, if_revert_conditions, length_aliases, require_conditions};
pub use extract::extract_functions;
pub use signature::{
    match_signature, normalize_signature, parameter_list, selector, selector_hex, signature_hash,
};
pub use text::contains_assembly;
