//! ERC-3643 (T-REX) batch operation verifiers.
//!
//! These match the standard's canonical identifiers (`_to`, `_amount`,
//! `_userAddress`, `_fromList`, ...) literally against every body, rather
//! than reading the target's declared parameter names.

use regex::Regex;

use crate::model::{
    CodeUnit, Erc3643BurnReport, Erc3643ForcedTransferReport, Erc3643MintReport,
    Erc3643TransferReport, RequirementReport, Standard,
};
use crate::services::verifiers::{VerificationContext, Verifier};

/// True if any unit matches any of `patterns`.
fn found(units: &[CodeUnit<'_>], patterns: &[&Regex]) -> bool {
    units.iter().any(|unit| patterns.iter().any(|re| re.is_match(unit.code)))
}

/// True if a single unit matches all of `patterns`.
fn found_together(units: &[CodeUnit<'_>], patterns: &[&Regex]) -> bool {
    units.iter().any(|unit| patterns.iter().all(|re| re.is_match(unit.code)))
}

fn transfer_event() -> &'static Regex {
    regex!(r"emit\s+Transfer\(")
}

fn unfrozen_event() -> &'static Regex {
    regex!(r"emit\s+TokensUnfrozen\(")
}

fn free_balance_branch() -> &'static Regex {
    regex!(r"if\s*\(\s*_amount\s*>\s*freeBalance\s*\)")
}

pub struct BatchTransfer3643Verifier;

impl Verifier for BatchTransfer3643Verifier {
    fn standard(&self) -> Standard {
        Standard::Erc3643BatchTransfer
    }

    fn verify(&self, ctx: &VerificationContext<'_>) -> RequirementReport {
        let units = ctx.code_units();
        RequirementReport::Erc3643Transfer(Erc3643TransferReport {
            erc3643_zero_address_check_from: found(
                &units,
                &[regex!(r"(?:msg\.sender|from)\s*!=\s*(?:address\(0\)|0x0)")],
            ),
            erc3643_zero_address_check_to: found(
                &units,
                &[regex!(r"to(?:\[i\])?\s*!=\s*(?:address\(0\)|0x0)")],
            ),
            erc3643_frozen_wallet_check: found(
                &units,
                &[regex!(r"!\s*_?frozen\[\s*(?:msg\.sender|_from|_to)\s*\]")],
            ),
            erc3643_balance_check: found(
                &units,
                &[regex!(r"_balances\[\s*msg\.sender\s*\]\s*>=\s*_?amount")],
            ),
            erc3643_identity_registry_check: found(
                &units,
                &[regex!(r"tokenIdentityRegistry\.isVerified\(\s*_?to\s*\)")],
            ),
            erc3643_compliance_check: found(
                &units,
                &[regex!(r"tokenCompliance\.canTransfer\(\s*msg\.sender\s*,\s*_?to\s*,\s*_?amount\s*\)")],
            ),
            erc3643_event_emission_check: found(&units, &[transfer_event()]),
        })
    }
}

pub struct BatchForcedTransferVerifier;

impl Verifier for BatchForcedTransferVerifier {
    fn standard(&self) -> Standard {
        Standard::Erc3643BatchForcedTransfer
    }

    fn verify(&self, ctx: &VerificationContext<'_>) -> RequirementReport {
        let units = ctx.code_units();
        RequirementReport::Erc3643ForcedTransfer(Erc3643ForcedTransferReport {
            length_matching_check: found(
                &units,
                &[regex!(r"_?from(?:List)?\.length\s*==\s*_?to(?:List)?\.length")],
            ),
            zero_address_check_from: found(
                &units,
                &[regex!(r"_?from(?:List)?\[i\]\s*!=\s*(?:address\(0\)|0x0)")],
            ),
            zero_address_check_to: found(
                &units,
                &[regex!(r"_?to(?:List)?\[i\]\s*!=\s*(?:address\(0\)|0x0)")],
            ),
            frozen_tokens_unfreeze_check: found_together(
                &units,
                &[
                    free_balance_branch(),
                    regex!(
                        r"frozenTokens\[\s*_from\s*\]\s*=\s*frozenTokens\[\s*_from\s*\]\s*-\s*tokensToUnfreeze"
                    ),
                ],
            ),
            frozen_tokens_balance_check: found(
                &units,
                &[regex!(r"frozenTokens\[\s*_from\s*\]\s*>=\s*tokensToUnfreeze")],
            ),
            identity_registry_check: found(
                &units,
                &[regex!(r"tokenIdentityRegistry\.isVerified\(\s*_to\s*\)")],
            ),
            compliance_check: found(
                &units,
                &[regex!(r"tokenCompliance\.transferred\(\s*_from\s*,\s*_to\s*,\s*_amount\s*\)")],
            ),
            unfreeze_event_check: found(&units, &[unfrozen_event()]),
            transfer_event_check: found(&units, &[transfer_event()]),
        })
    }
}

pub struct BatchBurnVerifier;

impl Verifier for BatchBurnVerifier {
    fn standard(&self) -> Standard {
        Standard::Erc3643BatchBurn
    }

    fn verify(&self, ctx: &VerificationContext<'_>) -> RequirementReport {
        let units = ctx.code_units();
        RequirementReport::Erc3643Burn(Erc3643BurnReport {
            length_matching_check: found(
                &units,
                &[regex!(r"_userAddresses\.length\s*==\s*_amounts\.length")],
            ),
            zero_address_check: found(&units, &[regex!(r"_userAddress\s*!=\s*address\(0\)")]),
            balance_check: found(&units, &[regex!(r"_balances\[\s*_userAddress\s*\]\s*>=\s*_amount")]),
            frozen_unfreeze_check: found(&units, &[free_balance_branch()]),
            frozen_balance_check: found(
                &units,
                &[regex!(r"frozenTokens\[\s*_userAddress\s*\]\s*>=\s*tokensToUnfreeze")],
            ),
            unfreeze_event_check: found(&units, &[unfrozen_event()]),
            burn_event_check: found(
                &units,
                &[regex!(r"emit\s+Transfer\(\s*_userAddress\s*,\s*address\(0\)\s*,")],
            ),
            compliance_destroyed_check: found(
                &units,
                &[regex!(r"tokenCompliance\.destroyed\(\s*_userAddress\s*,\s*_amount\s*\)")],
            ),
        })
    }
}

pub struct BatchMintVerifier;

impl Verifier for BatchMintVerifier {
    fn standard(&self) -> Standard {
        Standard::Erc3643BatchMint
    }

    fn verify(&self, ctx: &VerificationContext<'_>) -> RequirementReport {
        let units = ctx.code_units();
        RequirementReport::Erc3643Mint(Erc3643MintReport {
            length_matching_check: found(&units, &[regex!(r"_toList\.length\s*==\s*_amounts\.length")]),
            zero_address_check: found(&units, &[regex!(r"_userAddress\s*!=\s*address\(0\)")]),
            identity_registry_check: found(
                &units,
                &[regex!(r"tokenIdentityRegistry\.isVerified\(\s*_to\s*\)")],
            ),
            compliance_check: found(
                &units,
                &[regex!(r"tokenCompliance\.canTransfer\(\s*msg\.sender\s*,\s*_to\s*,\s*_amount\s*\)")],
            ),
            mint_event_check: found(
                &units,
                &[regex!(r"emit\s+Transfer\(\s*address\(0\)\s*,\s*_userAddress\s*,")],
            ),
            compliance_created_check: found(
                &units,
                &[regex!(r"tokenCompliance\.created\(\s*_to\s*,\s*_amount\s*\)")],
            ),
        })
    }
}
