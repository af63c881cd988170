//! ERC-2612 `permit` verifier.

use crate::analysis::conditions::harvest_conditions;
use crate::analysis::text::{esc, PatternSet};
use crate::model::{ConditionKind, PermitReport, RequirementReport, Standard};
use crate::services::verifiers::{VerificationContext, Verifier};

/// Positional parameters of `permit(owner, spender, value, deadline, v, r, s)`.
struct PermitParams<'a> {
    owner: &'a str,
    spender: &'a str,
    deadline: &'a str,
}

impl<'a> PermitParams<'a> {
    fn from_context(ctx: &VerificationContext<'a>) -> Self {
        Self {
            owner: ctx.param(0).unwrap_or("owner"),
            spender: ctx.param(1).unwrap_or("spender"),
            deadline: ctx.param(3).unwrap_or("deadline"),
        }
    }
}

pub struct PermitVerifier;

impl Verifier for PermitVerifier {
    fn standard(&self) -> Standard {
        Standard::Erc2612Permit
    }

    fn verify(&self, ctx: &VerificationContext<'_>) -> RequirementReport {
        let params = PermitParams::from_context(ctx);
        let units = ctx.code_units();
        let mut report = PermitReport::default();

        let d = esc(params.deadline);
        // `if (...) revert` guards state the expired case; `require` states the live case.
        let expired = PatternSet::new([
            format!(r"{d}\s*<\s*block\.timestamp"),
            format!(r"block\.timestamp\s*>\s*{d}"),
            format!(r"isExpired\(\s*{d}\s*\)"),
            format!(r"!isValid\(\s*{d}\s*\)"),
        ]);
        let live = PatternSet::new([
            format!(r"{d}\s*>=\s*block\.timestamp"),
            format!(r"block\.timestamp\s*<=\s*{d}"),
            format!(r"!isExpired\(\s*{d}\s*\)"),
            format!(r"isValid\(\s*{d}\s*\)"),
        ]);
        let timestamp = regex!(r"block\.timestamp|now\s*[<>=]|timestamp\s*[<>=]");
        let recovery =
            regex!(r"ecrecover\s*\(|ECDSA\.recover\s*\(|signature\s*=\s*abi\.encodePacked\s*\(|\.verify\s*\(");
        let nonce = regex!(r"nonces\[|incrementNonce\s*\(");

        for condition in harvest_conditions(&units) {
            let content = condition.content.as_str();
            if !report.deadline_check {
                let rules = match condition.kind {
                    ConditionKind::IfRevert => &expired,
                    ConditionKind::Require => &live,
                };
                report.deadline_check = rules.any_match(content);
            }
            report.timestamp_check |= timestamp.is_match(content);
            report.signature_validation |= recovery.is_match(content);
            report.nonce_usage |= nonce.is_match(content);
        }

        let o = esc(params.owner);
        let owner = PatternSet::new([
            format!(r"{o}\s*==\s*msg\.sender"),
            format!(r"msg\.sender\s*==\s*{o}"),
            format!(r"isOwner\(\s*{o}\s*\)"),
            format!(r"ownerOf\(\s*{o}\s*\)"),
            // The recovered signer compared against the owner.
            format!(r"\b(?:signer|recovered\w*)\s*[!=]=\s*{o}\b"),
            format!(r"\b{o}\s*[!=]=\s*(?:signer|recovered\w*)\b"),
        ]);
        let sp = esc(params.spender);
        let approve = PatternSet::new([
            format!(r"approve\(\s*(?:{o}\s*,\s*)?{sp}\s*,"),
            format!(r"allowance\[[^\]]+\]\[\s*{sp}\s*\]\s*="),
        ]);

        for unit in &units {
            let code = unit.code;
            report.domain_separator_usage |=
                regex!(r"DOMAIN_SEPARATOR|domainSeparator\s*\(|_domainSeparatorV4\s*\(").is_match(code);
            report.permit_function_exists |= regex!(r"function\s+permit\s*\(").is_match(code);
            report.owner_check |= owner.any_match(code);
            report.spender_approval |= approve.any_match(code);
            // Recovery and nonce consumption usually sit in assignments, not guards.
            report.signature_validation |= regex!(r"(?:ecrecover|\.recover|\.verify)\s*\(").is_match(code);
            report.nonce_usage |= regex!(r"nonces\[|incrementNonce\s*\(|_useNonce\s*\(").is_match(code);
        }

        RequirementReport::Permit(report)
    }
}
