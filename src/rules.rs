//! The rule DSL and its evaluation engine.
//!
//! A schema value is a chain of rule expressions separated by ` | `, each
//! a `<token> <criterion>` pair:
//!
//! ```text
//! key_a: "~ ^ab+c"        # regex match
//! key_b: "@ num | > 15"   # predefined pattern, then arithmetic bound
//! key_c: "> root:key_b"   # cross-field reference
//! ```
//!
//! Before evaluation, most rule kinds try to reinterpret their criterion
//! as a start-anchored regex over every key of the resource document; a
//! hit turns the rule into one check per referenced key/value pair. The
//! regex-based kinds skip that step, since their criterion is already a
//! pattern in its own right.

use crate::arith;
use crate::error::{Issue, RuleError, Severity};
use crate::flatten::FlatDocument;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Message for issues produced by a malformed or unrecognized criterion.
pub const ERROR_IN_CRITERION: &str = "Error in given criterion";

/// Rule-chain separator: whitespace, pipe, whitespace.
static RULE_SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+\|\s+").unwrap());

static BOOLEAN_TRUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:true|yes|on)$").unwrap());

static BOOLEAN_FALSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:false|no|off)$").unwrap());

// ─── Predefined patterns ────────────────────────────────────────────────────

const IPV4: &str = r"(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)";

const IPV6: &str = concat!(
    r"(?:",
    r"(?:[0-9a-fA-F]{1,4}:){7}[0-9a-fA-F]{1,4}|",
    r"(?:[0-9a-fA-F]{1,4}:){1,7}:|",
    r"(?:[0-9a-fA-F]{1,4}:){1,6}:[0-9a-fA-F]{1,4}|",
    r"(?:[0-9a-fA-F]{1,4}:){1,5}(?::[0-9a-fA-F]{1,4}){1,2}|",
    r"(?:[0-9a-fA-F]{1,4}:){1,4}(?::[0-9a-fA-F]{1,4}){1,3}|",
    r"(?:[0-9a-fA-F]{1,4}:){1,3}(?::[0-9a-fA-F]{1,4}){1,4}|",
    r"(?:[0-9a-fA-F]{1,4}:){1,2}(?::[0-9a-fA-F]{1,4}){1,5}|",
    r"[0-9a-fA-F]{1,4}:(?::[0-9a-fA-F]{1,4}){1,6}|",
    r":(?:(?::[0-9a-fA-F]{1,4}){1,7}|:)|",
    r"fe80:(?::[0-9a-fA-F]{0,4}){0,4}%[0-9a-zA-Z]+|",
    r"::(?:ffff(?::0{1,4})?:)?",
    r"(?:(?:25[0-5]|(?:2[0-4]|1?[0-9])?[0-9])\.){3}",
    r"(?:25[0-5]|(?:2[0-4]|1?[0-9])?[0-9])|",
    r"(?:[0-9a-fA-F]{1,4}:){1,4}:",
    r"(?:(?:25[0-5]|(?:2[0-4]|1?[0-9])?[0-9])\.){3}",
    r"(?:25[0-5]|(?:2[0-4]|1?[0-9])?[0-9])",
    r")",
);

const CIDR_32: &str = r"/(?:[0-9]|[1-2][0-9]|3[0-2])";
const CIDR_128: &str = r"/(?:[0-9]{1,2}|1[0-1][0-9]|12[0-8])";

static NUM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-?\d+$").unwrap());

static IPV4_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("^(?:{})$", IPV4)).unwrap());

static IPV4_CIDR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("^(?:{}){}$", IPV4, CIDR_32)).unwrap());

static IPV6_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("^(?:{})$", IPV6)).unwrap());

static IPV6_CIDR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("^(?:{}){}$", IPV6, CIDR_128)).unwrap());

/// Built-in pattern registry for the `@` rule.
fn predefined_pattern(name: &str) -> Option<&'static Regex> {
    match name {
        "num" => Some(&NUM_RE),
        "ipv4" => Some(&IPV4_RE),
        "ipv4_cidr" => Some(&IPV4_CIDR_RE),
        "ipv6" => Some(&IPV6_RE),
        "ipv6_cidr" => Some(&IPV6_CIDR_RE),
        _ => None,
    }
}

// ─── Rule kinds ─────────────────────────────────────────────────────────────

/// Behavior variant behind each rule token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuleKind {
    /// `*` — always passes; silences a key from validation.
    Omit,
    /// `?` — value must equal the boolean named by the criterion.
    Boolean,
    /// `>` — value must be arithmetically greater than the criterion.
    GreaterThan,
    /// `<` — value must be arithmetically less than the criterion.
    LessThan,
    /// `~` — value must match the criterion regex from its start.
    RegExp,
    /// `@` — value must match a named built-in pattern.
    PredefinedRegExp,
    /// `!` — value must differ from the (usually referenced) criterion.
    Uniqueness,
}

/// Token registry. Unknown tokens fall back to [`RuleKind::Omit`] at
/// parse time.
pub fn kind_for_token(token: &str) -> Option<RuleKind> {
    match token {
        "*" => Some(RuleKind::Omit),
        "?" => Some(RuleKind::Boolean),
        ">" => Some(RuleKind::GreaterThan),
        "<" => Some(RuleKind::LessThan),
        "~" => Some(RuleKind::RegExp),
        "@" => Some(RuleKind::PredefinedRegExp),
        "!" => Some(RuleKind::Uniqueness),
        _ => None,
    }
}

impl RuleKind {
    fn error_message(self) -> &'static str {
        match self {
            RuleKind::Omit => "",
            RuleKind::Boolean => "Boolean mismatch",
            RuleKind::GreaterThan => "Value must be greater than criterion",
            RuleKind::LessThan => "Value must be less than criterion",
            RuleKind::RegExp => "Regular expression mismatch",
            RuleKind::PredefinedRegExp => "Predefined regular expression mismatch",
            RuleKind::Uniqueness => "Duplicated value",
        }
    }

    /// Whether the criterion should be tried as a cross-field reference.
    /// The regex kinds treat their criterion as a literal pattern, and
    /// Omit never looks at it.
    fn resolves_references(self) -> bool {
        !matches!(
            self,
            RuleKind::Omit | RuleKind::RegExp | RuleKind::PredefinedRegExp
        )
    }

    fn evaluate(self, criterion: &str, value: Option<&Value>) -> Result<bool, RuleError> {
        match self {
            RuleKind::Omit => Ok(true),
            RuleKind::Boolean => {
                let expected = if BOOLEAN_TRUE_RE.is_match(criterion) {
                    true
                } else if BOOLEAN_FALSE_RE.is_match(criterion) {
                    false
                } else {
                    return Err(RuleError);
                };
                Ok(matches!(value, Some(Value::Bool(b)) if *b == expected))
            }
            RuleKind::GreaterThan => {
                let bound = arith::eval(criterion).map_err(|_| RuleError)?;
                let actual = arith::eval(&text_of(value)).map_err(|_| RuleError)?;
                Ok(bound < actual)
            }
            RuleKind::LessThan => {
                let bound = arith::eval(criterion).map_err(|_| RuleError)?;
                let actual = arith::eval(&text_of(value)).map_err(|_| RuleError)?;
                Ok(bound > actual)
            }
            RuleKind::RegExp => {
                let re =
                    Regex::new(&format!("^(?:{})", criterion)).map_err(|_| RuleError)?;
                Ok(re.is_match(&text_of(value)))
            }
            RuleKind::PredefinedRegExp => {
                let re = predefined_pattern(criterion).ok_or(RuleError)?;
                Ok(re.is_match(&text_of(value)))
            }
            RuleKind::Uniqueness => Ok(criterion != text_of(value)),
        }
    }
}

// ─── Rules ──────────────────────────────────────────────────────────────────

/// One parsed rule, bound to a schema key and a resource key.
///
/// Constructed per (schema key, resource key, expression) triple; not
/// reused across matches.
#[derive(Clone, Debug)]
pub struct Rule {
    pub schema_key: String,
    pub resource_key: String,
    pub kind: RuleKind,
    pub criterion: String,
}

impl Rule {
    /// Parse one `<token> <criterion>` expression. Empty or malformed
    /// expressions and unknown tokens default to the Omit rule.
    pub fn parse(schema_key: &str, resource_key: &str, expression: &str) -> Rule {
        let (kind, criterion) = match expression.split_once(' ') {
            Some((token, criterion)) => match kind_for_token(token) {
                Some(kind) => (kind, criterion.to_string()),
                None => (RuleKind::Omit, String::new()),
            },
            None => (RuleKind::Omit, String::new()),
        };
        Rule {
            schema_key: schema_key.to_string(),
            resource_key: resource_key.to_string(),
            kind,
            criterion,
        }
    }

    /// Evaluate the rule against the full resource document.
    ///
    /// The whole document is needed because a criterion may reference any
    /// resource key. Returns `None` when the rule passes.
    pub fn matches(&self, resource: &FlatDocument) -> Option<Issue> {
        let value = resource.get(&self.resource_key).cloned();

        if self.kind.resolves_references() {
            let references = self.resolve_references(resource);
            if !references.is_empty() {
                // First failing reference wins; all passing means pass.
                for (referred_key, referred_value) in references {
                    let criterion = value_text(&referred_value);
                    match self.kind.evaluate(&criterion, value.as_ref()) {
                        Ok(true) => {}
                        Ok(false) => {
                            return Some(Issue {
                                schema: Some(referred_key),
                                resource: Some(self.resource_key.clone()),
                                criterion: Some(referred_value),
                                value,
                                message: self.kind.error_message().to_string(),
                                severity: Severity::Error,
                                reference: true,
                            });
                        }
                        Err(RuleError) => {
                            return Some(Issue {
                                schema: Some(referred_key),
                                resource: None,
                                criterion: Some(referred_value),
                                value: None,
                                message: ERROR_IN_CRITERION.to_string(),
                                severity: Severity::Error,
                                reference: true,
                            });
                        }
                    }
                }
                return None;
            }
        }

        match self.kind.evaluate(&self.criterion, value.as_ref()) {
            Ok(true) => None,
            Ok(false) => Some(Issue {
                schema: Some(self.schema_key.clone()),
                resource: Some(self.resource_key.clone()),
                criterion: Some(Value::String(self.criterion.clone())),
                value,
                message: self.kind.error_message().to_string(),
                severity: Severity::Error,
                reference: false,
            }),
            Err(RuleError) => Some(Issue {
                schema: Some(self.schema_key.clone()),
                resource: None,
                criterion: Some(Value::String(self.criterion.clone())),
                value: None,
                message: ERROR_IN_CRITERION.to_string(),
                severity: Severity::Error,
                reference: false,
            }),
        }
    }

    /// Keys of the resource document matched by the criterion when read
    /// as a start-anchored regex, minus the rule's own resource key. A
    /// criterion that does not compile references nothing and stays
    /// literal.
    fn resolve_references(&self, resource: &FlatDocument) -> Vec<(String, Value)> {
        let Ok(re) = Regex::new(&format!("^(?:{})", self.criterion)) else {
            return Vec::new();
        };
        resource
            .iter()
            .filter(|entry| entry.key != self.resource_key && re.is_match(&entry.key))
            .map(|entry| (entry.key.clone(), entry.value.clone()))
            .collect()
    }
}

/// Split a schema value into its ordered rule-chain expressions.
pub fn split_chain(chain: &str) -> Vec<&str> {
    RULE_SEPARATOR_RE.split(chain).collect()
}

/// String form of a document value, used for regex matching, arithmetic
/// parsing, and uniqueness comparison.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

fn text_of(value: Option<&Value>) -> String {
    value.map(value_text).unwrap_or_else(|| "null".to_string())
}
