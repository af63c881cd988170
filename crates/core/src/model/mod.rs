//! Core data model for extracted Solidity functions, harvested conditions,
//! standards, and requirement reports.
//!
//! Everything here is plain data. The extractor and matcher produce
//! [`FunctionRecord`]s, the harvester produces [`ConditionRecord`]s, and the
//! verifiers produce [`RequirementReport`]s.

mod report;
mod standard;

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

pub use report::*;
pub use standard::*;

/// One declared function, either an implementation or an interface stub.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FunctionRecord {
    /// Identifier. Not unique: overloads and shadowed copies are common in flattened sources.
    pub name: String,
    /// Raw parameter-list text, trimmed.
    pub params: String,
    /// Raw text between the parameter list and the body (visibility, modifiers, returns).
    pub modifiers: String,
    /// Byte offset of the `function` keyword.
    pub start: usize,
    /// Byte offset one past the closing `}` (implementations) or `;` (stubs).
    pub end: usize,
    /// Source text in `[start, end)`.
    pub body: String,
    /// True iff a brace-balanced body was found.
    pub is_implementation: bool,
    /// Declared parameters, attached when the record is selected as an analysis target.
    #[serde(skip_serializing_if = "ParameterList::is_empty")]
    pub parameters: ParameterList,
}

impl FunctionRecord {
    /// `name(params)` exactly as declared.
    pub fn declared_signature(&self) -> String {
        format!("{}({})", self.name, self.params)
    }
}

/// Ordered parameter name → type mapping, in declaration order.
///
/// Serializes as a JSON object. Re-declaring a name replaces its type in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterList {
    entries: Vec<(String, String)>,
}

impl ParameterList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, ty: impl Into<String>) {
        let name = name.into();
        let ty = ty.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = ty,
            None => self.entries.push((name, ty)),
        }
    }

    /// Parameter name at a declaration position.
    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|(name, _)| name.as_str())
    }

    pub fn type_of(&self, name: &str) -> Option<&str> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, ty)| ty.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, t)| (n.as_str(), t.as_str()))
    }
}

impl Serialize for ParameterList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, ty) in &self.entries {
            map.serialize_entry(name, ty)?;
        }
        map.end()
    }
}

/// Which body a condition or code fragment came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceLabel {
    /// The analysis target itself.
    Main,
    /// A resolved callee, by name.
    Internal(String),
}

impl fmt::Display for SourceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceLabel::Main => write!(f, "main function"),
            SourceLabel::Internal(name) => write!(f, "internal function {name}"),
        }
    }
}

/// Shape a harvested condition was found in.
///
/// `IfRevert` conditions have inverted polarity relative to `Require`:
/// `if (a != b) revert` guards the same property as `require(a == b)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionKind {
    Require,
    IfRevert,
}

impl ConditionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionKind::Require => "require",
            ConditionKind::IfRevert => "if-revert",
        }
    }
}

/// A guard condition pulled out of a function body, whitespace-collapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionRecord {
    pub content: String,
    pub source: SourceLabel,
    pub kind: ConditionKind,
}

/// A labelled piece of code handed to the harvester and verifiers.
#[derive(Debug, Clone)]
pub struct CodeUnit<'a> {
    pub code: &'a str,
    pub label: SourceLabel,
}

impl<'a> CodeUnit<'a> {
    pub fn main(code: &'a str) -> Self {
        Self { code, label: SourceLabel::Main }
    }

    pub fn internal(code: &'a str, name: impl Into<String>) -> Self {
        Self { code, label: SourceLabel::Internal(name.into()) }
    }
}
