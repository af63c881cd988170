//! Signature normalization, hashing, and target matching.

use alloy_primitives::{keccak256, B256};

use crate::analysis::text::collapse_whitespace;
use crate::model::{FunctionRecord, ParameterList};

/// Reduce a signature to `name(type,type,...)`.
///
/// Parameter names and data-location keywords are dropped and bare `uint`
/// becomes `uint256`; sized integers keep their width. Anything after the
/// parameter list (e.g. `returns (bool)`) is ignored. Idempotent.
pub fn normalize_signature(signature: &str) -> String {
    let Some(open) = signature.find('(') else {
        return signature.trim().to_string();
    };
    let name = signature[..open].trim();
    let close = matching_paren(signature, open).unwrap_or(signature.len());
    let inner = &signature[open + 1..close];

    let types: Vec<String> = if inner.trim().is_empty() {
        Vec::new()
    } else {
        split_top_level(inner).into_iter().map(normalize_param).collect()
    };
    format!("{name}({})", types.join(","))
}

fn normalize_param(param: &str) -> String {
    let without_location = regex!(r"\b(?:memory|calldata|storage|payable)\b").replace_all(param, " ");
    let collapsed = collapse_whitespace(&without_location);
    let ty = match collapsed.rsplit_once(' ') {
        Some((ty, _name)) => ty,
        None => collapsed.as_str(),
    };
    let ty: String = ty.chars().filter(|c| !c.is_whitespace()).collect();
    regex!(r"\buint\b").replace_all(&ty, "uint256").into_owned()
}

/// Split on commas that are not nested inside parentheses (tuple types).
fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut last = 0;
    for (i, ch) in text.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&text[last..i]);
                last = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[last..]);
    parts
}

fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0i32;
    for (i, ch) in text[open..].char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

/// keccak256 of the normalized signature.
pub fn signature_hash(signature: &str) -> B256 {
    keccak256(normalize_signature(signature).as_bytes())
}

/// 4-byte function selector of the normalized signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = signature_hash(signature).0;
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Selector rendered as `0x` + 8 lowercase hex digits.
pub fn selector_hex(signature: &str) -> String {
    let bytes = selector(signature);
    format!("0x{:02x}{:02x}{:02x}{:02x}", bytes[0], bytes[1], bytes[2], bytes[3])
}

/// Parse a raw parameter list into an ordered name → type mapping.
///
/// Entries without a name (a bare type) are skipped.
pub fn parameter_list(params: &str) -> ParameterList {
    let mut list = ParameterList::new();
    for param in params.split(',') {
        let parts: Vec<&str> = param.split_whitespace().collect();
        if let [ty @ .., name] = parts.as_slice() {
            if !ty.is_empty() {
                list.insert(*name, ty.join(" "));
            }
        }
    }
    list
}

/// Every record whose normalized signature hashes identically to `target`.
///
/// Matches are returned as copies with `parameters` attached. Stubs match too.
pub fn match_signature(functions: &[FunctionRecord], target: &str) -> Vec<FunctionRecord> {
    let wanted = signature_hash(target);
    functions
        .iter()
        .filter(|f| signature_hash(&f.declared_signature()) == wanted)
        .map(|f| {
            let mut matched = f.clone();
            matched.parameters = parameter_list(&f.params);
            matched
        })
        .collect()
}
