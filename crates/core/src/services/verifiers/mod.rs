//! Per-standard requirement verifiers.
//!
//! Each verifier is a pure function from a target function plus its resolved
//! callees to a typed [`RequirementReport`]. Verifiers are looked up by
//! [`Standard`] through a [`VerifierRegistry`].

mod approval;
mod erc1155;
mod erc2612;
mod erc3643;
mod erc5267;

use std::collections::HashMap;

pub use approval::ApprovalVerifier;
pub use erc1155::BatchTransferVerifier;
pub use erc2612::PermitVerifier;
pub use erc3643::{BatchBurnVerifier, BatchForcedTransferVerifier, BatchMintVerifier, BatchTransfer3643Verifier};
pub use erc5267::DomainVerifier;

use crate::model::{CodeUnit, FunctionRecord, Profile, RequirementReport, Standard};

/// Everything a verifier may look at for one analysis target.
#[derive(Debug, Clone, Copy)]
pub struct VerificationContext<'a> {
    /// The matched target, with `parameters` attached.
    pub target: &'a FunctionRecord,
    /// Transitive internal callees, in discovery order.
    pub callees: &'a [FunctionRecord],
    /// Full source of the file the target came from.
    pub source: &'a str,
    pub profile: Profile,
}

impl<'a> VerificationContext<'a> {
    pub fn new(target: &'a FunctionRecord, callees: &'a [FunctionRecord], source: &'a str) -> Self {
        Self { target, callees, source, profile: Profile::Standard }
    }

    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    /// Target body first, then each callee whose body differs from the target's.
    pub fn code_units(&self) -> Vec<CodeUnit<'a>> {
        let mut units = vec![CodeUnit::main(self.target.body.as_str())];
        units.extend(
            self.callees
                .iter()
                .filter(|f| f.body != self.target.body)
                .map(|f| CodeUnit::internal(f.body.as_str(), f.name.clone())),
        );
        units
    }

    /// Declared parameter name at `index` of the target.
    pub fn param(&self, index: usize) -> Option<&'a str> {
        self.target.parameters.name_at(index)
    }
}

/// Trait implemented by every requirement verifier.
pub trait Verifier: Send + Sync {
    /// Standard this verifier scores.
    fn standard(&self) -> Standard;

    /// Score the target and its callees.
    fn verify(&self, ctx: &VerificationContext<'_>) -> RequirementReport;

    /// Post-pass keyed on callee names alone.
    ///
    /// A callee named after a well-known guard stands in for that guard even
    /// when its body cannot be inspected further.
    fn apply_callee_shortcuts(
        &self,
        _report: &mut RequirementReport,
        _callees: &[FunctionRecord],
        _profile: Profile,
    ) {
    }
}

/// Registry for verifiers; callers select by standard.
#[derive(Default)]
pub struct VerifierRegistry {
    verifiers: HashMap<Standard, Box<dyn Verifier>>,
}

impl VerifierRegistry {
    pub fn new() -> Self {
        Self { verifiers: HashMap::new() }
    }

    pub fn register<V: Verifier + 'static>(&mut self, verifier: V) -> &mut Self {
        self.verifiers.insert(verifier.standard(), Box::new(verifier));
        self
    }

    pub fn get(&self, standard: Standard) -> Option<&dyn Verifier> {
        self.verifiers.get(&standard).map(|v| &**v)
    }

    /// Sorted list of registered standard names for error messages/help.
    pub fn names(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.verifiers.keys().map(|s| s.as_str().to_string()).collect();
        keys.sort();
        keys
    }
}

/// Registry populated with a verifier for every known standard.
pub fn default_verifier_registry() -> VerifierRegistry {
    let mut registry = VerifierRegistry::new();
    registry
        .register(BatchTransferVerifier)
        .register(BatchTransfer3643Verifier)
        .register(BatchForcedTransferVerifier)
        .register(BatchMintVerifier)
        .register(BatchBurnVerifier)
        .register(ApprovalVerifier)
        .register(PermitVerifier)
        .register(DomainVerifier);
    registry
}
