//! ERC-1155 `safeBatchTransferFrom` verifier.

use crate::analysis::conditions::{harvest_conditions, length_aliases};
use crate::analysis::text::{ceil_boundary, esc, floor_boundary, normalize_code, PatternSet};
use crate::model::{
    BatchTransferReport, ConditionKind, FunctionRecord, Profile, RequirementReport, SourceLabel,
    Standard,
};
use crate::services::verifiers::{VerificationContext, Verifier};

/// Ways the caller shows up in a guard.
const SENDER_REPRS: &[&str] = &["msg.sender", "_msgSender()", "sender"];

/// Byte window searched around a receiver call for type evidence.
const TYPE_CONTEXT_WINDOW: usize = 100;

/// Positional parameters of `safeBatchTransferFrom(from, to, ids, amounts, data)`.
#[derive(Debug, Clone, Copy, Default)]
struct BatchParams<'a> {
    from: Option<&'a str>,
    to: Option<&'a str>,
    ids: Option<&'a str>,
    amounts: Option<&'a str>,
    data: Option<&'a str>,
}

pub struct BatchTransferVerifier;

impl Verifier for BatchTransferVerifier {
    fn standard(&self) -> Standard {
        Standard::Erc1155BatchTransfer
    }

    fn verify(&self, ctx: &VerificationContext<'_>) -> RequirementReport {
        let params = BatchParams {
            from: ctx.param(0),
            to: ctx.param(1),
            ids: ctx.param(2),
            amounts: ctx.param(3),
            data: ctx.param(4),
        };
        let units = ctx.code_units();
        let mut report = BatchTransferReport {
            gas_family_errors: (ctx.profile == Profile::GasFamily).then_some(false),
            ..Default::default()
        };

        let aliases = params.ids.map(|ids| length_aliases(&units, ids)).unwrap_or_default();
        let rules = ConditionRules::new(&params, &aliases);
        for condition in harvest_conditions(&units) {
            rules.apply(&condition.content, condition.kind, &mut report);
        }

        let contract_guards = ContractGuards::new(params.to);
        let mut event: Option<(SourceLabel, usize)> = None;
        for unit in &units {
            if !report.transfer_batch_event_found {
                if let Some(m) = regex!(r"emit\s+TransferBatch\s*\(").find(unit.code) {
                    report.transfer_batch_event_found = true;
                    event = Some((unit.label.clone(), m.start()));
                }
            }
            if let Some((label, pos)) = &event {
                if *label == unit.label {
                    let after = &unit.code[*pos..];
                    report.event_emission_order =
                        !(after.contains("safeTransferFrom(") || after.contains("safeBatchTransferFrom("));
                }
            }

            let normalized = normalize_code(unit.code);
            if contract_guards.code_length.any_match(&normalized) {
                report.to_is_contract_check = true;
            }
            if contract_guards.ternary.any_match(&normalized) {
                // The code-length ternary replaces a plain zero-address guard.
                report.zero_address_check = false;
                report.to_is_contract_check = true;
                report.on_received_check = true;
            }
            if contract_guards.is_contract.any_match(&normalized) {
                report.to_is_contract_check = true;
            }

            if let Some((label, _)) = &event {
                if *label != unit.label
                    && receiver_check_verified(unit.code, &params, report.to_is_contract_check)
                {
                    report.on_received_check = true;
                }
            }
        }

        RequirementReport::BatchTransfer(report)
    }

    fn apply_callee_shortcuts(
        &self,
        report: &mut RequirementReport,
        callees: &[FunctionRecord],
        profile: Profile,
    ) {
        let RequirementReport::BatchTransfer(report) = report else {
            return;
        };
        // Substring matches, so `_msgSender` or `_isApprovedOrOwner` count too.
        for callee in callees {
            let name = callee.name.as_str();
            if name.contains("onERC1155BatchReceived") {
                report.on_received_check = true;
            }
            if name.contains("isContract") {
                report.to_is_contract_check = true;
            }
            if name.contains("isApprovedForAll") {
                report.approval_check = true;
            }
            if name.contains("msgSender") {
                report.sender_check = true;
            }
            if name.contains("isOperatable") || name.contains("isApprovedOrOwner") {
                report.sender_check = true;
                report.approval_check = true;
            }
            if name.contains("isSameLength") {
                report.length_matching_check = true;
            }
            if name == "safeTransferFrom" && profile == Profile::GasFamily {
                report.gas_family_errors = Some(true);
            }
        }
    }
}

/// Polarity-specific patterns for the condition-driven requirements.
struct ConditionRules {
    sender_if_revert: PatternSet,
    sender_require: PatternSet,
    approval_if_revert: PatternSet,
    approval_require: PatternSet,
    /// `(sender, from)` pairs for the loose "mentions approval" fallback.
    approval_fallback: Vec<(String, String)>,
    zero_if_revert: PatternSet,
    zero_require: PatternSet,
    length: PatternSet,
}

impl ConditionRules {
    fn new(params: &BatchParams<'_>, aliases: &[String]) -> Self {
        let mut sender_if_revert = Vec::new();
        let mut sender_require = Vec::new();
        let mut approval_if_revert = Vec::new();
        let mut approval_require = Vec::new();
        let mut approval_fallback = Vec::new();
        if let Some(from) = params.from {
            let f = esc(from);
            for sender in SENDER_REPRS {
                let s = esc(sender);
                sender_if_revert.push(format!(r"{s}\s*!=\s*{f}"));
                sender_if_revert.push(format!(r"{f}\s*!=\s*{s}"));
                sender_require.push(format!(r"{s}\s*==\s*{f}"));
                sender_require.push(format!(r"{f}\s*==\s*{s}"));

                approval_if_revert.push(format!(r"!\s*isApprovedForAll\(\s*{f}\s*,\s*{s}\s*\)"));
                approval_if_revert.push(format!(r"(?i)operatorApproval\[{f}\]\[{s}\]\s*==\s*false"));
                approval_if_revert.push(format!(r"!\s*isApprovedForAll\[{f}\]\[{s}\]"));
                approval_require.push(format!(r"isApprovedForAll\(\s*{f}\s*,\s*{s}\s*\)"));
                approval_require.push(format!(r"(?i)operatorApproval\[{f}\]\[{s}\]\s*==\s*true"));
                approval_require.push(format!(r"isApprovedForAll\[{f}\]\[{s}\]"));
                approval_fallback.push((sender.to_string(), from.to_string()));
            }
        }

        let mut zero_if_revert = Vec::new();
        let mut zero_require = Vec::new();
        if let Some(to) = params.to {
            let t = esc(to);
            for recipient in [t.as_str(), "recipient"] {
                for zero in [r"address\(0\)", r"address\(0x0\)"] {
                    zero_if_revert.push(format!(r"{recipient}\s*==\s*{zero}"));
                    zero_if_revert.push(format!(r"{zero}\s*==\s*{recipient}"));
                    zero_require.push(format!(r"{recipient}\s*!=\s*{zero}"));
                    zero_require.push(format!(r"{zero}\s*!=\s*{recipient}"));
                }
            }
        }

        let mut length = Vec::new();
        if let (Some(ids), Some(amounts)) = (params.ids, params.amounts) {
            let (i, a) = (esc(ids), esc(amounts));
            length.push(format!(r"{i}\.length\s*[!=]=\s*{a}\.length"));
            length.push(format!(r"{a}\.length\s*[!=]=\s*{i}\.length"));
            for alias in aliases {
                let v = esc(alias);
                length.push(format!(r"\b{v}\s*[!=]=\s*{a}\.length"));
                length.push(format!(r"{a}\.length\s*[!=]=\s*{v}\b"));
            }
        }

        Self {
            sender_if_revert: PatternSet::new(sender_if_revert),
            sender_require: PatternSet::new(sender_require),
            approval_if_revert: PatternSet::new(approval_if_revert),
            approval_require: PatternSet::new(approval_require),
            approval_fallback,
            zero_if_revert: PatternSet::new(zero_if_revert),
            zero_require: PatternSet::new(zero_require),
            length: PatternSet::new(length),
        }
    }

    fn apply(&self, content: &str, kind: ConditionKind, report: &mut BatchTransferReport) {
        let if_revert = kind == ConditionKind::IfRevert;

        if !report.sender_check {
            let set = if if_revert { &self.sender_if_revert } else { &self.sender_require };
            report.sender_check = set.any_match(content);
        }

        if !report.approval_check {
            let set = if if_revert { &self.approval_if_revert } else { &self.approval_require };
            let polarity = if if_revert { "false" } else { "true" };
            report.approval_check = set.any_match(content)
                || self.approval_fallback.iter().any(|(sender, from)| {
                    let lowered = content.to_ascii_lowercase();
                    lowered.contains("approval")
                        && content.contains(from.as_str())
                        && content.contains(sender.as_str())
                        && lowered.contains(polarity)
                });
        }

        if !report.zero_address_check {
            let set = if if_revert { &self.zero_if_revert } else { &self.zero_require };
            report.zero_address_check = set.any_match(content);
        }

        if !report.length_matching_check {
            report.length_matching_check = self.length.any_match(content);
        }
    }
}

/// Body-level guards showing the recipient is checked for contract code.
struct ContractGuards {
    code_length: PatternSet,
    ternary: PatternSet,
    is_contract: PatternSet,
}

impl ContractGuards {
    fn new(to: Option<&str>) -> Self {
        let Some(to) = to else {
            return Self {
                code_length: PatternSet::default(),
                ternary: PatternSet::default(),
                is_contract: PatternSet::default(),
            };
        };
        let t = esc(to);
        Self {
            code_length: PatternSet::new([
                format!(r"if\s*\(\s*{t}\s*\.\s*code\s*\.\s*length\s*[!=]=\s*0\s*\)"),
                format!(r"if\s*\(\s*{t}\s*\.\s*code\s*\.\s*length\s*>\s*0\s*\)"),
            ]),
            ternary: PatternSet::new([
                format!(
                    r"require\s*\(\s*{t}\s*\.\s*code\s*\.\s*length\s*==\s*0\s*\?\s*{t}\s*!=\s*address\s*\(\s*0(?:x0)?\s*\)"
                ),
                format!(r"require\s*\(\s*{t}\s*\.\s*code\s*\.\s*length\s*==\s*0\s*\?\s*{t}\s*!=\s*0x0\b"),
            ]),
            is_contract: PatternSet::new([is_contract_guard(&t)]),
        }
    }
}

fn is_contract_guard(escaped_to: &str) -> String {
    format!(r"if\s*\(\s*{escaped_to}\s*\.\s*isContract\s*\(\s*\)\s*\)")
}

/// Whether `code` invokes `onERC1155BatchReceived` and checks the magic value it returns.
///
/// Without a prior contract-ness guard the body must carry its own
/// `if (to.isContract())`. The call's arguments are matched by exact names,
/// then by nearby type evidence, then by argument count; the return value
/// counts as checked when the call sits inside a `require`/`if`, when a
/// captured `bytes4` is later compared, or when a `try ... returns (bytes4 x)`
/// value is later tested.
fn receiver_check_verified(code: &str, params: &BatchParams<'_>, is_contract: bool) -> bool {
    let operator_var = regex!(r"address\s+(\w+)\s*=\s*(?:msg\.sender|_msgSender\(\))\s*;")
        .captures(code)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string());
    let normalized = normalize_code(code);

    if !is_contract {
        let Some(to) = params.to else {
            return false;
        };
        if !PatternSet::new([is_contract_guard(&esc(to))]).any_match(&normalized) {
            return false;
        }
    }

    let params_matched = receiver_params_matched(&normalized, params, operator_var.as_deref());
    if !params_matched {
        tracing::debug!("receiver call arguments not recognized");
    }

    let inline_check = regex!(
        r"(?:require|if)\s*\([^)]*?(?:[a-zA-Z_][\w.]*\s*\(\s*[^)]*\s*\)\s*\.)?onERC1155BatchReceived\s*\([^)]*\s*\)[^)]*\)"
    );
    if params_matched && inline_check.is_match(&normalized) {
        return true;
    }

    let captured = regex!(
        r"bytes4\s+(\w+)\s*=\s*[^;]*?\.onERC1155BatchReceived(?:\s*\{[^}]*\})?\([^)]+\)\s*;"
    );
    if let Some(name) = captured.captures(&normalized).and_then(|c| c.get(1)) {
        let compared = format!(r"(?:require|if)\s*\(\s*{}\s*(?:==|!=)\s*[^)]+\s*\)", esc(name.as_str()));
        if PatternSet::new([compared]).any_match(&normalized) {
            return true;
        }
    }

    let try_returns = regex!(
        r"try\s+[^.]*\.onERC1155BatchReceived(?:\s*\{[^}]*\})?\([^)]+\)\s+returns\s*\(\s*bytes4\s+(\w+)\s*\)"
    );
    if let Some(name) = try_returns.captures(&normalized).and_then(|c| c.get(1)) {
        let used = format!(r"(?:require|if)\s*\(\s*[^)]*?{}[^)]*\)", esc(name.as_str()));
        if PatternSet::new([used]).any_match(&normalized) {
            return true;
        }
    }

    false
}

fn receiver_params_matched(normalized: &str, params: &BatchParams<'_>, operator_var: Option<&str>) -> bool {
    const CALL_PREFIX: &str = r"\.onERC1155BatchReceived(?:\s*\{[^}]*\})?\s*\(\s*";
    let any_name = r"_\w+".to_string();
    let operator = esc(operator_var.unwrap_or("operator"));
    let exact = [
        operator,
        params.from.map(esc).unwrap_or_else(|| any_name.clone()),
        params.ids.map(esc).unwrap_or_else(|| any_name.clone()),
        params.amounts.map(esc).unwrap_or_else(|| any_name.clone()),
        params.data.map(esc).unwrap_or_else(|| any_name.clone()),
    ];
    let exact_call = format!(r"{CALL_PREFIX}{}\s*\)", exact.join(r"\s*,\s*"));
    if PatternSet::new([exact_call]).any_match(normalized) {
        return true;
    }

    let nested = regex!(
        r"\.onERC1155BatchReceived(?:\s*\{[^}]*\})?\s*\(\s*(?:(?:[^,()]|\([^()]*\))+,\s*){4}(?:[^,()]|\([^()]*\))+\)"
    );
    if let Some(call) = nested.find(normalized) {
        let lo = floor_boundary(normalized, call.start().saturating_sub(TYPE_CONTEXT_WINDOW));
        let hi = ceil_boundary(normalized, call.end() + TYPE_CONTEXT_WINDOW);
        let context = &normalized[lo..hi];
        if context.contains("address") && context.contains("uint256[]") && context.contains("bytes") {
            return true;
        }
    }

    regex!(r"\.onERC1155BatchReceived(?:\s*\{[^}]*\})?\s*\(\s*(?:[^,)]+\s*,\s*){4}[^)]+\s*\)")
        .is_match(normalized)
}
