//! Validation orchestrator.
//!
//! Pairs a schema flat document with a resource flat document: reports
//! keys missing on either side, runs rule chains for matched scalar keys,
//! validates list items against schema prototypes, and finally demotes
//! excluded issues from Error to Warning. Every check appends issues and
//! the run continues; only a YAML parse failure aborts.

use crate::error::{DocumentRole, Issue, ParseError, Report, Severity};
use crate::flatten::{FlatDocument, flatten};
use crate::group::{ListGroups, Prototype};
use crate::parse::parse;
use crate::path::{INDEX_PATTERN, full_match};
use crate::rules::{Rule, split_chain};
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;

/// Default path separator for flat keys.
pub const DEFAULT_SEPARATOR: char = ':';

pub const MISSING_RESOURCE: &str = "Item is missing from resource";
pub const MISSING_SCHEMA: &str = "No rules were found for resource";
pub const MISSING_PROTOTYPE: &str = "No matching prototype was found";

/// Validate `resource` against `schema`, both YAML text.
///
/// `exclusions` is an optional newline-separated list of start-anchored
/// regex patterns; issues whose schema or resource key matches one are
/// demoted to Warning.
///
/// # Errors
///
/// Returns [`ParseError`] if either document is not valid YAML.
pub fn validate(
    schema: &str,
    resource: &str,
    exclusions: Option<&str>,
) -> Result<Report, ParseError> {
    validate_with(schema, resource, exclusions, DEFAULT_SEPARATOR)
}

/// [`validate`] with a custom flat-key separator.
pub fn validate_with(
    schema: &str,
    resource: &str,
    exclusions: Option<&str>,
    separator: char,
) -> Result<Report, ParseError> {
    let schema_tree = parse(schema, DocumentRole::Schema)?;
    let resource_tree = parse(resource, DocumentRole::Resource)?;

    let schema_doc = flatten(&schema_tree, separator);
    let resource_doc = flatten(&resource_tree, separator);
    let schema_lists = ListGroups::build(&schema_doc, true);
    let resource_lists = ListGroups::build(&resource_doc, false);

    let mut issues = Vec::new();
    find_missing_scalars(&schema_doc, &resource_doc, DocumentRole::Schema, &mut issues);
    find_missing_scalars(&resource_doc, &schema_doc, DocumentRole::Resource, &mut issues);
    validate_scalars(&schema_doc, &resource_doc, &mut issues);
    validate_lists(&schema_lists, &resource_lists, &resource_doc, &mut issues);

    let has_errors = apply_exclusions(exclusions, &mut issues);
    Ok(Report { has_errors, issues })
}

/// Scalar keys of `outer` absent from the scalar keys of `inner`.
fn find_missing_scalars(
    outer: &FlatDocument,
    inner: &FlatDocument,
    outer_role: DocumentRole,
    issues: &mut Vec<Issue>,
) {
    let inner_keys: HashSet<&str> = inner.scalars().map(|e| e.key.as_str()).collect();
    for entry in outer.scalars() {
        if inner_keys.contains(entry.key.as_str()) {
            continue;
        }
        let (schema, resource, message) = match outer_role {
            DocumentRole::Schema => (Some(entry.key.clone()), None, MISSING_RESOURCE),
            DocumentRole::Resource => (None, Some(entry.key.clone()), MISSING_SCHEMA),
        };
        issues.push(Issue {
            schema,
            resource,
            criterion: None,
            value: None,
            message: message.to_string(),
            severity: Severity::Error,
            reference: false,
        });
    }
}

/// Step 4: run every schema rule chain whose index-generalized key
/// matches a resource scalar key.
fn validate_scalars(schema: &FlatDocument, resource: &FlatDocument, issues: &mut Vec<Issue>) {
    let separator = schema.separator();
    for resource_entry in resource.scalars() {
        for schema_entry in schema.scalars() {
            if full_match(&schema_entry.path.generalized(separator), &resource_entry.key) {
                run_chain(
                    &schema_entry.key,
                    &schema_entry.value,
                    &resource_entry.key,
                    resource,
                    issues,
                );
            }
        }
    }
}

/// Step 5: match resource list items against schema prototypes.
fn validate_lists(
    schema_lists: &ListGroups,
    resource_lists: &ListGroups,
    resource_doc: &FlatDocument,
    issues: &mut Vec<Issue>,
) {
    for group in resource_lists.groups() {
        let field_patterns = group.field_patterns();
        let matched = schema_lists.matching_prototypes(&group.pattern, &field_patterns);

        // A shape that is a bare list of scalars (all fields generalize
        // to the index pattern) checks each element independently.
        let selected: Vec<Prototype> = matched
            .into_iter()
            .flat_map(|shape| expand_scalar_shape(shape))
            .collect();

        if selected.is_empty() {
            issues.push(Issue {
                schema: None,
                resource: Some(group.item_key.clone()),
                criterion: None,
                value: None,
                message: MISSING_PROTOTYPE.to_string(),
                severity: Severity::Error,
                reference: false,
            });
            continue;
        }

        // A list item is valid if any one selected shape fully matches;
        // failures surface only when every shape rejected the item.
        let mut failing_shapes = 0;
        let mut failures = Vec::new();
        for shape in &selected {
            let mut shape_failures = Vec::new();
            for resource_field in &group.fields {
                for shape_field in &shape.fields {
                    if full_match(&shape_field.pattern, &resource_field.name) {
                        run_chain(
                            &shape_field.full_key,
                            &shape_field.value,
                            &resource_field.full_key,
                            resource_doc,
                            &mut shape_failures,
                        );
                    }
                }
            }
            if !shape_failures.is_empty() {
                failing_shapes += 1;
                failures.append(&mut shape_failures);
            }
        }
        if failing_shapes >= selected.len() {
            issues.append(&mut failures);
        }
    }
}

fn expand_scalar_shape(shape: &Prototype) -> Vec<Prototype> {
    let patterns = shape.field_patterns();
    if patterns.len() == 1 && patterns.contains(INDEX_PATTERN) {
        shape
            .fields
            .iter()
            .map(|field| Prototype {
                item_key: shape.item_key.clone(),
                fields: vec![field.clone()],
            })
            .collect()
    } else {
        vec![shape.clone()]
    }
}

/// Run one schema value's rule chain against one resource key. Every
/// rule in the chain runs; every failure is reported. Non-string schema
/// values carry no rules.
fn run_chain(
    schema_key: &str,
    schema_value: &Value,
    resource_key: &str,
    resource: &FlatDocument,
    issues: &mut Vec<Issue>,
) {
    let Value::String(chain) = schema_value else {
        return;
    };
    for expression in split_chain(chain) {
        let rule = Rule::parse(schema_key, resource_key, expression);
        if let Some(issue) = rule.matches(resource) {
            issues.push(issue);
        }
    }
}

/// Step 6: demote issues matched by an exclusion pattern to Warning.
/// Returns whether any Error-severity issue remains.
fn apply_exclusions(exclusions: Option<&str>, issues: &mut [Issue]) -> bool {
    let patterns: Vec<Regex> = exclusions
        .unwrap_or_default()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        // Non-compiling exclusion lines match nothing.
        .filter_map(|line| Regex::new(&format!("^(?:{})", line)).ok())
        .collect();

    for issue in issues.iter_mut() {
        if is_excluded(&patterns, issue.schema.as_deref())
            || is_excluded(&patterns, issue.resource.as_deref())
        {
            issue.severity = Severity::Warning;
        }
    }
    issues.iter().any(|issue| issue.severity == Severity::Error)
}

fn is_excluded(patterns: &[Regex], key: Option<&str>) -> bool {
    match key {
        Some(key) => patterns.iter().any(|re| re.is_match(key)),
        None => false,
    }
}
