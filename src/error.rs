use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Issue severity level.
///
/// Every issue starts at `Error`; exclusion patterns demote matching
/// issues to `Warning` without removing them from the report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "Error"),
            Severity::Warning => write!(f, "Warning"),
        }
    }
}

/// A single validation finding.
///
/// `schema` and `resource` are flat document keys; either may be absent
/// (missing-key issues name only one side, criterion errors name only the
/// schema side). `criterion` and `value` keep their document types so
/// reporters can render numbers as numbers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub schema: Option<String>,
    pub resource: Option<String>,
    pub criterion: Option<Value>,
    pub value: Option<Value>,
    pub message: String,
    pub severity: Severity,
    /// True when the criterion was resolved through a cross-field reference.
    #[serde(rename = "ref")]
    pub reference: bool,
}

/// Result of a validation run: every issue found, in evaluation order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// True iff at least one issue remains at `Error` severity after
    /// exclusion-based demotion.
    pub has_errors: bool,
    pub issues: Vec<Issue>,
}

/// Which input document an error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentRole {
    Schema,
    Resource,
}

impl fmt::Display for DocumentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentRole::Schema => write!(f, "schema"),
            DocumentRole::Resource => write!(f, "resource"),
        }
    }
}

/// Produced when an input document cannot be parsed as YAML.
///
/// Fatal for the run: no issues are produced for a document that never
/// became a tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseError {
    pub role: DocumentRole,
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error in {}: {}", self.role, self.message)
    }
}

impl std::error::Error for ParseError {}

/// Internal marker for a malformed or unrecognized criterion.
///
/// Never escapes the rule engine: it is converted into a single
/// `"Error in given criterion"` issue and the run continues.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleError;

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error in given criterion")
    }
}

impl std::error::Error for RuleError {}
