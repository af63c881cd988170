//! Internal call-graph resolution over extracted function records.

use std::collections::HashSet;

use crate::model::FunctionRecord;

/// Lower-cased words that look like calls but are control flow or statements.
const KEYWORDS: &[&str] = &[
    "require", "assert", "revert", "emit", "new", "return", "returns", "if", "try", "iscontract",
    "continue", "break", "for", "while", "do", "else", "catch", "delete", "length",
];

/// Globals and builtins that are never user-defined functions.
const BUILTINS: &[&str] = &[
    "gasleft", "msg", "block", "tx", "abi", "type", "this", "selfdestruct", "sha3", "keccak256",
    "ripemd160", "ecrecover", "addmod", "mulmod", "balance", "sub", "add",
];

/// Outcome of resolving the callees of one function body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallClosure {
    /// No call in the body names a known function.
    NoCalls,
    /// The only resolvable calls point back at the scanned body itself.
    SelfRecursive,
    /// Transitive callees in depth-first discovery order, each name expanded once.
    Callees(Vec<FunctionRecord>),
}

impl CallClosure {
    pub fn callees(&self) -> &[FunctionRecord] {
        match self {
            CallClosure::Callees(callees) => callees,
            _ => &[],
        }
    }
}

/// Resolve the transitive internal callees of `body` against `functions`.
///
/// Member and library calls (`x.f(...)`) are not resolved. A callee whose body
/// is identical to the body being scanned is never collected, and a visited
/// name set keeps mutual recursion finite.
pub fn resolve_calls(body: &str, functions: &[FunctionRecord]) -> CallClosure {
    let mut walk = Walk { functions, visited: HashSet::new(), found: Vec::new(), self_hit: false };
    walk.descend(body);

    if !walk.found.is_empty() {
        CallClosure::Callees(walk.found)
    } else if walk.self_hit {
        CallClosure::SelfRecursive
    } else {
        CallClosure::NoCalls
    }
}

struct Walk<'a> {
    functions: &'a [FunctionRecord],
    visited: HashSet<String>,
    found: Vec<FunctionRecord>,
    self_hit: bool,
}

impl<'a> Walk<'a> {
    fn descend(&mut self, body: &str) {
        for name in call_candidates(body) {
            if self.visited.contains(name) {
                continue;
            }
            let functions = self.functions;
            for func in functions.iter().filter(|f| f.name == name) {
                if func.body == body {
                    self.self_hit = true;
                    continue;
                }
                self.visited.insert(name.to_string());
                self.found.push(func.clone());
                self.descend(&func.body);
            }
        }
    }
}

/// Identifiers immediately followed by `(`, in source order.
///
/// Skips keywords, builtins, member calls, the name in a `function` /
/// `event` / `modifier` declaration, and the operand of `emit` / `new`.
pub(crate) fn call_candidates(body: &str) -> Vec<&str> {
    let tokens = tokenize(body);
    let mut names = Vec::new();
    for (i, token) in tokens.iter().enumerate() {
        let Token::Ident(name) = token else { continue };
        if tokens.get(i + 1) != Some(&Token::Punct('(')) {
            continue;
        }
        let previous = i.checked_sub(1).and_then(|p| tokens.get(p));
        match previous {
            Some(Token::Punct('.')) => continue,
            Some(Token::Ident(prev))
                if matches!(*prev, "function" | "event" | "modifier" | "error" | "emit" | "new") =>
            {
                continue
            }
            _ => {}
        }
        if KEYWORDS.contains(&name.to_ascii_lowercase().as_str()) || BUILTINS.contains(name) {
            continue;
        }
        names.push(*name);
    }
    names
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Ident(&'a str),
    Number,
    Punct(char),
}

/// Split on non-word characters; whitespace is dropped.
fn tokenize(body: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut chars = body.char_indices().peekable();
    while let Some((start, ch)) = chars.next() {
        if ch.is_whitespace() {
            continue;
        }
        if is_word(ch) {
            let mut end = start + ch.len_utf8();
            while let Some(&(i, next)) = chars.peek() {
                if !is_word(next) {
                    break;
                }
                end = i + next.len_utf8();
                chars.next();
            }
            if ch.is_ascii_digit() {
                tokens.push(Token::Number);
            } else {
                tokens.push(Token::Ident(&body[start..end]));
            }
        } else {
            tokens.push(Token::Punct(ch));
        }
    }
    tokens
}

fn is_word(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}
