//! ERC-5267 `eip712Domain` verifier.
//!
//! Unlike the other verifiers this one is advisory: alongside the four
//! checklist booleans it classifies each expression of the `return (...)`
//! tuple and collects warnings and critical issues.

use crate::analysis::text::normalize_code;
use crate::model::{CodeUnit, DomainReport, RequirementReport, Standard};
use crate::services::verifiers::{VerificationContext, Verifier};

/// Positional expressions of the domain `return (...)` tuple.
struct DomainTuple<'a> {
    fields: &'a str,
    name: &'a str,
    version: &'a str,
    chain_id: &'a str,
    verifying_contract: &'a str,
    salt: &'a str,
    extensions: &'a str,
}

pub struct DomainVerifier;

impl Verifier for DomainVerifier {
    fn standard(&self) -> Standard {
        Standard::Erc5267Domain
    }

    fn verify(&self, ctx: &VerificationContext<'_>) -> RequirementReport {
        let units = ctx.code_units();
        let mut report = DomainReport::default();

        let signature = regex!(
            r"function\s+eip712Domain\s*\(\s*\)\s*(?:public|external)\s+view(?:\s+(?:virtual|override(?:\s*\([^)]*\))?))*\s+returns\s*\(\s*bytes1\s+\w+\s*,\s*string\s+(?:memory\s+)?\w+\s*,\s*string\s+(?:memory\s+)?\w+\s*,\s*uint256\s+\w+\s*,\s*address\s+\w+\s*,\s*bytes32\s+\w+\s*,\s*uint256\[\]\s+(?:memory\s+)?\w+\s*\)"
        );
        for unit in &units {
            if !signature.is_match(unit.code) {
                continue;
            }
            report.eip712_domain_function_exists = true;
            let normalized = normalize_code(unit.code);
            if let Some(tuple) = return_tuple(&normalized) {
                classify(&tuple, &units, &mut report);
            }
        }

        mark_immutables(ctx.source, &mut report);

        report.typehash_declared = regex!(
            r#"bytes32\s+(?:\w+\s+)*[A-Z_][A-Z0-9_]*\s*=\s*keccak256\s*\(\s*"EIP712Domain\s*\([^"]*\)\s*"\s*\)"#
        )
        .is_match(ctx.source);
        report.domain_separator_usage = regex!(r"_domainSeparatorV4\(\)|DOMAIN_SEPARATOR").is_match(ctx.source);

        if report.eip712_domain_function_exists {
            report.returns_correct_fields = report.fields.valid
                && report.name.valid
                && report.version.valid
                && report.chain_id.valid
                && report.verifying_contract.valid
                && report.salt.valid
                && report.extensions.valid;
            if !report.name.immutable {
                report.critical_issues.push("name parameter should be immutable".to_string());
            }
            if !report.version.immutable {
                report.warnings.push("version parameter should be immutable for security".to_string());
            }
        }

        RequirementReport::Eip712Domain(report)
    }
}

fn return_tuple(normalized: &str) -> Option<DomainTuple<'_>> {
    let re = regex!(
        r#"return\s*\(\s*(bytes1\([^)]*\)|hex"[0-9a-fA-F]+"|\w+)\s*,\s*("[^"]*"|_\w+\.toString\(\)|\w+\s*\(\s*\)|\w+)\s*,\s*("[^"]*"|_\w+\.toString\(\)|\w+\s*\(\s*\)|\w+)\s*,\s*(block\.chainid|_\w+|\d+)\s*,\s*(address\(this\)|\w+)\s*,\s*(bytes32\([^)]*\)|0x[0-9a-fA-F]+|\w+)\s*,\s*(new\s*uint256\[\]\([^)]*\)|\[\]|\w+)\s*\)\s*;"#
    );
    let caps = re.captures(normalized)?;
    let group = |i: usize| caps.get(i).map_or("", |m| m.as_str());
    Some(DomainTuple {
        fields: group(1),
        name: group(2),
        version: group(3),
        chain_id: group(4),
        verifying_contract: group(5),
        salt: group(6),
        extensions: group(7),
    })
}

fn classify(tuple: &DomainTuple<'_>, units: &[CodeUnit<'_>], report: &mut DomainReport) {
    if let Some(value) = fields_value(tuple.fields) {
        report.fields.value = Some(value);
        let required = report.fields.required_bits.mask();
        if value & required == required {
            report.fields.valid = true;
        } else {
            report
                .critical_issues
                .push(format!("Fields bitmap 0x{value:x} missing required bits (needs 0x{required:x})"));
        }
    }

    let name = tuple.name;
    if (name.starts_with('"') && name.len() > 2)
        || (name.contains("toString()") && name.contains("_name"))
        || is_accessor_for(name, "name")
    {
        report.name.valid = true;
        report.name.non_empty = true;
    }

    let version = tuple.version;
    if version.starts_with('"')
        || (version.contains("toString()") && version.contains("_version"))
        || is_accessor_for(version, "version")
    {
        report.version.valid = true;
    }

    if tuple.chain_id.eq_ignore_ascii_case("block.chainid") {
        report.chain_id.valid = true;
        report.chain_id.uses_block_chainid = true;
    } else {
        report.warnings.push("chainId should use block.chainid for fork safety".to_string());
    }

    if tuple.verifying_contract.eq_ignore_ascii_case("address(this)") {
        report.verifying_contract.valid = true;
        report.verifying_contract.uses_address_this = true;
        let proxied = units.iter().any(|u| {
            u.code.contains(".delegatecall") || u.code.to_ascii_lowercase().contains("proxy")
        });
        report.verifying_contract.proxy_safe = !proxied;
        if proxied {
            report.critical_issues.push("Proxy pattern detected but no proxy address handling".to_string());
        }
    }

    let salt = tuple.salt;
    let salt_literal = regex!(r"^bytes32\(\s*([^)]*?)\s*\)$")
        .captures(salt)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str());
    if salt_literal.is_some() || regex!(r"^0x[0-9a-fA-F]{64}$").is_match(salt) {
        report.salt.valid = true;
        report.salt.non_zero = !regex!(r"^(?:0x)?0*$").is_match(salt_literal.unwrap_or(salt));
    }

    let extensions = tuple.extensions;
    if extensions.starts_with("new") || extensions == "[]" {
        report.extensions.valid = true;
        let length = regex!(r"\(\s*([^)]*?)\s*\)$")
            .captures(extensions)
            .and_then(|c| c.get(1))
            .map_or("", |m| m.as_str());
        report.extensions.non_empty = !length.is_empty() && length != "0";
    }
}

/// Numeric bitmap from `hex"0f"` or `bytes1(0x0f)`.
fn fields_value(fields: &str) -> Option<u8> {
    let digits = regex!(r#"^hex"([0-9a-fA-F]{1,2})"$"#)
        .captures(fields)
        .or_else(|| regex!(r"^bytes1\(\s*0x([0-9a-fA-F]{1,2})\s*\)$").captures(fields))?
        .get(1)?
        .as_str();
    u8::from_str_radix(digits, 16).ok()
}

/// `_EIP712Name()`-style accessor whose identifier mentions `what`.
fn is_accessor_for(expr: &str, what: &str) -> bool {
    expr.ends_with(')') && !expr.starts_with('"') && expr.to_ascii_lowercase().contains(what)
}

/// Mark name/version/salt immutable when their backing storage is declared
/// `immutable` or `constant` anywhere in the file.
fn mark_immutables(source: &str, report: &mut DomainReport) {
    let leading = regex!(
        r"(?:immutable|constant)\s+(?:string|bytes32|ShortString)\s+(_name|_version|_hashedName|_salt)\b"
    );
    let trailing = regex!(
        r"(?:string|bytes32|ShortString)\s+(?:(?:private|internal|public)\s+)?(?:immutable|constant)\s+(_name|_version|_hashedName|_salt)\b"
    );
    for caps in leading.captures_iter(source).chain(trailing.captures_iter(source)) {
        match caps.get(1).map(|m| m.as_str()) {
            Some("_name") | Some("_hashedName") => report.name.immutable = true,
            Some("_version") => report.version.immutable = true,
            Some("_salt") => report.salt.immutable = true,
            _ => {}
        }
    }
}
