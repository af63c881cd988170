use regex::Regex;

/// Collapse every whitespace run to a single space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip `//` and `/* */` comments, then collapse whitespace.
pub fn normalize_code(code: &str) -> String {
    let stripped = regex!(r"(?s)/\*.*?\*/|//[^\n]*").replace_all(code, " ");
    collapse_whitespace(&stripped)
}

/// True if the code carries an inline-assembly cue.
///
/// Matches an `assembly {` block (optionally with a dialect string or flags),
/// a Yul `let x :=` declaration, or raw `mload(`/`sload(` opcodes.
pub fn contains_assembly(code: &str) -> bool {
    regex!(r#"(?i)\bassembly\s*(?:"[^"]*"|\w+)?\s*(?:\(\s*"[^"]*"\s*\))?\s*\{"#).is_match(code)
        || regex!(r"(?i)\blet\s+\w+\s*:=").is_match(code)
        || regex!(r"(?i)mload\(|sload\(").is_match(code)
}

/// Largest char boundary at or below `index`.
pub fn floor_boundary(text: &str, index: usize) -> usize {
    let mut i = index.min(text.len());
    while !text.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Smallest char boundary at or above `index`.
pub fn ceil_boundary(text: &str, index: usize) -> usize {
    let mut i = index.min(text.len());
    while !text.is_char_boundary(i) {
        i += 1;
    }
    i
}

/// Patterns compiled at verification time, typically with parameter names spliced in.
///
/// Patterns that fail to compile are dropped, so a pathological identifier can
/// only make a rule match less, never abort the pass.
#[derive(Debug, Default)]
pub struct PatternSet {
    patterns: Vec<Regex>,
}

impl PatternSet {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .filter_map(|p| match Regex::new(p.as_ref()) {
                Ok(re) => Some(re),
                Err(err) => {
                    tracing::debug!(pattern = p.as_ref(), %err, "dropping pattern that failed to compile");
                    None
                }
            })
            .collect();
        Self { patterns }
    }

    /// True if any pattern matches `text`; patterns are tried in order.
    pub fn any_match(&self, text: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(text))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Escape an identifier or expression for splicing into a pattern.
pub fn esc(text: &str) -> String {
    regex::escape(text)
}
