//! Services: requirement verifiers, source providers, and the audit orchestrator.

pub mod audit;
pub mod sources;
pub mod verifiers;
