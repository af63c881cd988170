//! Guard-condition harvesting: `require(...)` arguments and `if (...) revert` guards.

use crate::analysis::text::{collapse_whitespace, esc};
use crate::model::{CodeUnit, ConditionKind, ConditionRecord};

/// Deepest parenthesis nesting accepted inside a `require(...)` argument,
/// counting the call's own parentheses.
const MAX_REQUIRE_DEPTH: usize = 3;

/// Harvest both condition shapes from every unit, tagged with the unit's label.
///
/// Within a unit, `require` conditions come first, then `if`-revert guards.
pub fn harvest_conditions(units: &[CodeUnit<'_>]) -> Vec<ConditionRecord> {
    let mut out = Vec::new();
    for unit in units {
        for content in require_conditions(unit.code) {
            out.push(ConditionRecord { content, source: unit.label.clone(), kind: ConditionKind::Require });
        }
        for content in if_revert_conditions(unit.code) {
            out.push(ConditionRecord { content, source: unit.label.clone(), kind: ConditionKind::IfRevert });
        }
    }
    out
}

/// Argument text of every `require(...)` whose parentheses balance within the depth cap.
pub fn require_conditions(code: &str) -> Vec<String> {
    let mut out = Vec::new();
    for m in regex!(r"\brequire\s*\(").find_iter(code) {
        let open = m.end() - 1;
        if let Some(close) = balanced_close(code, open, Some(MAX_REQUIRE_DEPTH)) {
            out.push(collapse_whitespace(&code[open + 1..close]));
        }
    }
    out
}

/// Condition text of every `if (...)` whose guarded block mentions `revert`.
///
/// A `{` right after the condition guards up to its matching `}`; otherwise the
/// guarded statement runs to the next `;`. Scanning resumes just after the
/// condition, so nested guards are found too.
pub fn if_revert_conditions(code: &str) -> Vec<String> {
    let bytes = code.as_bytes();
    let mut out = Vec::new();
    let mut pos = 0;

    while let Some(found) = code[pos..].find("if") {
        let at = pos + found;
        pos = at + 2;
        let before_ok = at == 0 || !is_ident_byte(bytes[at - 1]);
        let after_ok = bytes.get(at + 2).map_or(true, |b| !is_ident_byte(*b));
        if !before_ok || !after_ok {
            continue;
        }
        let open = skip_whitespace(bytes, at + 2);
        if bytes.get(open) != Some(&b'(') {
            continue;
        }
        let Some(close) = balanced_close(code, open, None) else {
            continue;
        };
        pos = close + 1;

        let block_start = skip_whitespace(bytes, close + 1);
        let block_end = if bytes.get(block_start) == Some(&b'{') {
            closing_brace(bytes, block_start)
        } else {
            code[block_start..].find(';').map(|i| block_start + i)
        };
        let Some(block_end) = block_end else {
            continue;
        };
        if code[block_start..block_end].contains("revert") {
            out.push(collapse_whitespace(&code[open + 1..close]));
        }
    }
    out
}

/// Names bound to `<ids>.length` by a `uint256 X = ids.length;` declaration, across all units.
pub fn length_aliases(units: &[CodeUnit<'_>], ids_param: &str) -> Vec<String> {
    let pattern = format!(r"uint(?:256)?\s+(\w+)\s*=\s*{}\s*\.\s*length\s*;", esc(ids_param));
    let Ok(re) = regex::Regex::new(&pattern) else {
        return Vec::new();
    };
    let mut aliases: Vec<String> = Vec::new();
    for unit in units {
        for caps in re.captures_iter(unit.code) {
            if let Some(name) = caps.get(1) {
                if !aliases.iter().any(|a| a == name.as_str()) {
                    aliases.push(name.as_str().to_string());
                }
            }
        }
    }
    aliases
}

/// Byte offset of the `)` matching the `(` at `open`.
fn balanced_close(code: &str, open: usize, max_depth: Option<usize>) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, byte) in code.as_bytes()[open..].iter().enumerate() {
        match byte {
            b'(' => {
                depth += 1;
                if max_depth.is_some_and(|max| depth > max) {
                    return None;
                }
            }
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// Byte offset of the `}` matching the `{` at `open`.
fn closing_brace(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, byte) in bytes[open..].iter().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
    }
    None
}

fn skip_whitespace(bytes: &[u8], mut at: usize) -> usize {
    while bytes.get(at).is_some_and(|b| b.is_ascii_whitespace()) {
        at += 1;
    }
    at
}

fn is_ident_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'$'
}
