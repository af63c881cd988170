use serde::Serialize;

/// Requirement report for ERC-1155 `safeBatchTransferFrom`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchTransferReport {
    pub sender_check: bool,
    pub approval_check: bool,
    pub zero_address_check: bool,
    pub length_matching_check: bool,
    pub event_emission_order: bool,
    pub transfer_batch_event_found: bool,
    #[serde(rename = "to_isContract_check")]
    pub to_is_contract_check: bool,
    pub on_received_check: bool,
    /// Only present under the gas-family profile.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_family_errors: Option<bool>,
}

/// Requirement report for ERC-3643 `batchTransfer`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Erc3643TransferReport {
    pub erc3643_zero_address_check_from: bool,
    pub erc3643_zero_address_check_to: bool,
    pub erc3643_frozen_wallet_check: bool,
    pub erc3643_balance_check: bool,
    pub erc3643_identity_registry_check: bool,
    pub erc3643_compliance_check: bool,
    pub erc3643_event_emission_check: bool,
}

/// Requirement report for ERC-3643 `batchForcedTransfer`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Erc3643ForcedTransferReport {
    pub length_matching_check: bool,
    pub zero_address_check_from: bool,
    pub zero_address_check_to: bool,
    pub frozen_tokens_unfreeze_check: bool,
    pub frozen_tokens_balance_check: bool,
    pub identity_registry_check: bool,
    pub compliance_check: bool,
    pub unfreeze_event_check: bool,
    pub transfer_event_check: bool,
}

/// Requirement report for ERC-3643 `batchBurn`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Erc3643BurnReport {
    pub length_matching_check: bool,
    pub zero_address_check: bool,
    pub balance_check: bool,
    pub frozen_unfreeze_check: bool,
    pub frozen_balance_check: bool,
    pub unfreeze_event_check: bool,
    pub burn_event_check: bool,
    pub compliance_destroyed_check: bool,
}

/// Requirement report for ERC-3643 `batchMint`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Erc3643MintReport {
    pub length_matching_check: bool,
    pub zero_address_check: bool,
    pub identity_registry_check: bool,
    pub compliance_check: bool,
    pub mint_event_check: bool,
    pub compliance_created_check: bool,
}

/// Requirement report for `setApprovalForAll`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApprovalReport {
    pub self_approval_check: bool,
    pub status_change_check: bool,
    pub event_emission: bool,
}

/// Requirement report for ERC-2612 `permit`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PermitReport {
    pub deadline_check: bool,
    pub timestamp_check: bool,
    pub signature_validation: bool,
    pub nonce_usage: bool,
    pub domain_separator_usage: bool,
    pub permit_function_exists: bool,
    pub owner_check: bool,
    pub spender_approval: bool,
}

/// Advisory report for ERC-5267 `eip712Domain`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DomainReport {
    #[serde(rename = "eip712Domain_function_exists")]
    pub eip712_domain_function_exists: bool,
    pub returns_correct_fields: bool,
    pub typehash_declared: bool,
    pub domain_separator_usage: bool,
    pub fields: FieldsCheck,
    pub name: NameCheck,
    pub version: VersionCheck,
    #[serde(rename = "chainId")]
    pub chain_id: ChainIdCheck,
    #[serde(rename = "verifyingContract")]
    pub verifying_contract: VerifyingContractCheck,
    pub salt: SaltCheck,
    pub extensions: ExtensionsCheck,
    pub warnings: Vec<String>,
    pub critical_issues: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldsCheck {
    pub valid: bool,
    pub value: Option<u8>,
    pub required_bits: RequiredBits,
}

/// Which domain fields the `fields` bitmap must advertise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequiredBits {
    pub name: bool,
    pub version: bool,
    #[serde(rename = "chainId")]
    pub chain_id: bool,
    #[serde(rename = "verifyingContract")]
    pub verifying_contract: bool,
    pub salt: bool,
    pub extensions: bool,
}

impl Default for RequiredBits {
    fn default() -> Self {
        Self {
            name: true,
            version: true,
            chain_id: true,
            verifying_contract: true,
            salt: false,
            extensions: false,
        }
    }
}

impl RequiredBits {
    /// Bitmask over the ERC-5267 field order (name is bit 0).
    pub fn mask(&self) -> u8 {
        [self.name, self.version, self.chain_id, self.verifying_contract, self.salt, self.extensions]
            .iter()
            .enumerate()
            .filter(|(_, on)| **on)
            .fold(0u8, |acc, (bit, _)| acc | (1 << bit))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NameCheck {
    pub valid: bool,
    pub immutable: bool,
    pub non_empty: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VersionCheck {
    pub valid: bool,
    pub immutable: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChainIdCheck {
    pub valid: bool,
    pub uses_block_chainid: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerifyingContractCheck {
    pub valid: bool,
    pub uses_address_this: bool,
    pub proxy_safe: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SaltCheck {
    pub valid: bool,
    pub non_zero: bool,
    pub immutable: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtensionsCheck {
    pub valid: bool,
    pub non_empty: bool,
}

/// Per-standard requirement report.
///
/// Serializes as the bare inner record so the persisted document is a plain
/// mapping of requirement names to values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RequirementReport {
    BatchTransfer(BatchTransferReport),
    Erc3643Transfer(Erc3643TransferReport),
    Erc3643ForcedTransfer(Erc3643ForcedTransferReport),
    Erc3643Burn(Erc3643BurnReport),
    Erc3643Mint(Erc3643MintReport),
    SetApprovalForAll(ApprovalReport),
    Permit(PermitReport),
    Eip712Domain(DomainReport),
}

impl RequirementReport {
    /// The fixed requirement list that drives the all/some rollups, in report order.
    pub fn checklist(&self) -> Vec<(&'static str, bool)> {
        match self {
            RequirementReport::BatchTransfer(r) => vec![
                ("sender_check", r.sender_check),
                ("approval_check", r.approval_check),
                ("zero_address_check", r.zero_address_check),
                ("length_matching_check", r.length_matching_check),
                ("event_emission_order", r.event_emission_order),
                ("transfer_batch_event_found", r.transfer_batch_event_found),
                ("to_isContract_check", r.to_is_contract_check),
                ("on_received_check", r.on_received_check),
            ],
            RequirementReport::Erc3643Transfer(r) => vec![
                ("erc3643_zero_address_check_from", r.erc3643_zero_address_check_from),
                ("erc3643_zero_address_check_to", r.erc3643_zero_address_check_to),
                ("erc3643_frozen_wallet_check", r.erc3643_frozen_wallet_check),
                ("erc3643_balance_check", r.erc3643_balance_check),
                ("erc3643_identity_registry_check", r.erc3643_identity_registry_check),
                ("erc3643_compliance_check", r.erc3643_compliance_check),
                ("erc3643_event_emission_check", r.erc3643_event_emission_check),
            ],
            RequirementReport::Erc3643ForcedTransfer(r) => vec![
                ("length_matching_check", r.length_matching_check),
                ("zero_address_check_from", r.zero_address_check_from),
                ("zero_address_check_to", r.zero_address_check_to),
                ("frozen_tokens_unfreeze_check", r.frozen_tokens_unfreeze_check),
                ("frozen_tokens_balance_check", r.frozen_tokens_balance_check),
                ("identity_registry_check", r.identity_registry_check),
                ("compliance_check", r.compliance_check),
                ("unfreeze_event_check", r.unfreeze_event_check),
                ("transfer_event_check", r.transfer_event_check),
            ],
            RequirementReport::Erc3643Burn(r) => vec![
                ("length_matching_check", r.length_matching_check),
                ("zero_address_check", r.zero_address_check),
                ("balance_check", r.balance_check),
                ("frozen_unfreeze_check", r.frozen_unfreeze_check),
                ("frozen_balance_check", r.frozen_balance_check),
                ("unfreeze_event_check", r.unfreeze_event_check),
                ("burn_event_check", r.burn_event_check),
                ("compliance_destroyed_check", r.compliance_destroyed_check),
            ],
            RequirementReport::Erc3643Mint(r) => vec![
                ("length_matching_check", r.length_matching_check),
                ("zero_address_check", r.zero_address_check),
                ("identity_registry_check", r.identity_registry_check),
                ("compliance_check", r.compliance_check),
                ("mint_event_check", r.mint_event_check),
                ("compliance_created_check", r.compliance_created_check),
            ],
            RequirementReport::SetApprovalForAll(r) => vec![
                ("self_approval_check", r.self_approval_check),
                ("status_change_check", r.status_change_check),
                ("event_emission", r.event_emission),
            ],
            RequirementReport::Permit(r) => vec![
                ("deadline_check", r.deadline_check),
                ("timestamp_check", r.timestamp_check),
                ("signature_validation", r.signature_validation),
                ("nonce_usage", r.nonce_usage),
                ("domain_separator_usage", r.domain_separator_usage),
                ("permit_function_exists", r.permit_function_exists),
                ("owner_check", r.owner_check),
                ("spender_approval", r.spender_approval),
            ],
            RequirementReport::Eip712Domain(r) => vec![
                ("eip712Domain_function_exists", r.eip712_domain_function_exists),
                ("returns_correct_fields", r.returns_correct_fields),
                ("typehash_declared", r.typehash_declared),
                ("domain_separator_usage", r.domain_separator_usage),
            ],
        }
    }

    /// Logical AND over the checklist.
    pub fn all_met(&self) -> bool {
        self.checklist().iter().all(|(_, met)| *met)
    }

    /// Logical OR over the checklist.
    pub fn some_met(&self) -> bool {
        self.checklist().iter().any(|(_, met)| *met)
    }

    /// Look up a single checklist entry by its serialized name.
    pub fn get(&self, requirement: &str) -> Option<bool> {
        self.checklist().into_iter().find(|(name, _)| *name == requirement).map(|(_, met)| met)
    }
}
