//! `setApprovalForAll` verifier.

use crate::analysis::conditions::harvest_conditions;
use crate::analysis::text::{esc, PatternSet};
use crate::model::{ApprovalReport, RequirementReport, Standard};
use crate::services::verifiers::{VerificationContext, Verifier};

/// Ways the approving account shows up in a self-approval guard.
const OWNER_REPRS: &[&str] =
    &["msg.sender", "_msgSender()", "sender", "owner", "owner_", "_account", "account"];

/// Positional parameters of `setApprovalForAll`.
///
/// Positions are read the way deployed analyses always read them: `operator`
/// comes from index 0 whenever there are at least two parameters, and
/// `approved` from index 1 only when there are three or more.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ApprovalParams<'a> {
    pub owner: Option<&'a str>,
    pub operator: &'a str,
    pub approved: Option<&'a str>,
}

impl<'a> ApprovalParams<'a> {
    pub(crate) fn from_context(ctx: &VerificationContext<'a>) -> Self {
        let len = ctx.target.parameters.len();
        Self {
            owner: if len > 0 { ctx.param(0) } else { None },
            operator: if len > 1 { ctx.param(0).unwrap_or("operator") } else { "operator" },
            approved: if len > 2 { ctx.param(1) } else { None },
        }
    }
}

pub struct ApprovalVerifier;

impl Verifier for ApprovalVerifier {
    fn standard(&self) -> Standard {
        Standard::SetApprovalForAll
    }

    fn verify(&self, ctx: &VerificationContext<'_>) -> RequirementReport {
        let params = ApprovalParams::from_context(ctx);
        tracing::trace!(
            owner = ?params.owner,
            operator = params.operator,
            approved = ?params.approved,
            "setApprovalForAll parameters"
        );
        let units = ctx.code_units();
        let mut report = ApprovalReport::default();

        let operator = esc(params.operator);
        let self_approval = PatternSet::new(OWNER_REPRS.iter().flat_map(|repr| {
            let s = esc(repr);
            [
                format!(r"{s}\s*==\s*{operator}"),
                format!(r"{operator}\s*==\s*{s}"),
                format!(r"{s}\s*!=\s*{operator}"),
                format!(r"{operator}\s*!=\s*{s}"),
                format!(r"{s}\s*\(\s*\)\s*!=\s*{operator}"),
                format!(r"{operator}\s*!=\s*{s}\s*\(\s*\)"),
            ]
        }));
        report.self_approval_check = harvest_conditions(&units)
            .iter()
            .any(|condition| self_approval.any_match(&condition.content));

        let guard = regex!(r"require\s*\(|if\s*\(|revert\s*\(");
        for unit in &units {
            if let Some(m) = regex!(r"emit\s+ApprovalForAll\s*\(").find(unit.code) {
                report.event_emission = true;
                if guard.is_match(&unit.code[..m.start()]) {
                    report.status_change_check = true;
                }
            }
        }

        RequirementReport::SetApprovalForAll(report)
    }
}
