//! Function extraction from raw Solidity source.

use crate::model::{FunctionRecord, ParameterList};

/// Enumerate every `function name(params) ...` declaration in `source`.
///
/// Declarations ending in `{` are walked forward by brace depth until the
/// body closes; a body that never closes is dropped. Declarations ending in
/// `;` become interface stubs whose `end` is just past the semicolon.
///
/// Braces inside strings and comments are counted like any other brace.
pub fn extract_functions(source: &str) -> Vec<FunctionRecord> {
    let declaration = regex!(r"\bfunction\s+([A-Za-z_$][A-Za-z0-9_$]*)\s*\(([^){};]*)\)([^{;]*)([{;])");
    let bytes = source.as_bytes();
    let mut functions = Vec::new();

    for caps in declaration.captures_iter(source) {
        let (Some(whole), Some(name), Some(params), Some(modifiers), Some(terminator)) =
            (caps.get(0), caps.get(1), caps.get(2), caps.get(3), caps.get(4))
        else {
            continue;
        };
        let start = whole.start();
        let (end, is_implementation) = if terminator.as_str() == "{" {
            match closing_brace(bytes, terminator.start()) {
                Some(end) => (end, true),
                None => {
                    tracing::debug!(function = name.as_str(), start, "unbalanced braces; dropping record");
                    continue;
                }
            }
        } else {
            (whole.end(), false)
        };

        functions.push(FunctionRecord {
            name: name.as_str().to_string(),
            params: params.as_str().trim().to_string(),
            modifiers: modifiers.as_str().trim().to_string(),
            start,
            end,
            body: source[start..end].to_string(),
            is_implementation,
            parameters: ParameterList::new(),
        });
    }

    functions
}

/// Offset one past the `}` matching the `{` at `open`, if the walk balances.
fn closing_brace(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, byte) in bytes[open..].iter().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + offset + 1);
                }
            }
            _ => {}
        }
    }
    None
}
