//! List grouping and schema prototype derivation.
//!
//! Every flat key containing an index segment belongs to exactly one
//! [`ListGroup`], keyed by its nearest enclosing list-item path. For
//! schema documents, groups sharing an index-generalized item path are
//! collected into a [`PrototypeSet`]: the distinct field shapes a list
//! may legally hold at that location. A schema list with several
//! differently-shaped items thereby declares a list of heterogeneous
//! record types.

use crate::flatten::FlatDocument;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};

/// One field of a list item, local to the item.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldEntry {
    /// Rendered field path relative to the item (e.g. `name`, or `0` for
    /// a bare list element).
    pub name: String,
    /// Index-generalized pattern for `name`.
    pub pattern: String,
    /// Full rendered key of the field in its flat document.
    pub full_key: String,
    pub value: Value,
}

/// The fields of one concrete list item.
#[derive(Clone, Debug, PartialEq)]
pub struct ListGroup {
    /// Rendered item path (e.g. `root:servers:0`, or `root:list` for a
    /// bare list of scalars).
    pub item_key: String,
    /// Index-generalized pattern for `item_key`.
    pub pattern: String,
    pub fields: Vec<FieldEntry>,
}

impl ListGroup {
    /// Index-generalized field-name set, for shape comparison.
    pub fn field_patterns(&self) -> BTreeSet<&str> {
        self.fields.iter().map(|f| f.pattern.as_str()).collect()
    }
}

/// One legal field shape at a generalized list location.
#[derive(Clone, Debug, PartialEq)]
pub struct Prototype {
    /// Item path of the first schema item that declared this shape.
    pub item_key: String,
    pub fields: Vec<FieldEntry>,
}

impl Prototype {
    pub fn field_patterns(&self) -> BTreeSet<&str> {
        self.fields.iter().map(|f| f.pattern.as_str()).collect()
    }
}

/// All shapes observed for one index-generalized list location.
#[derive(Clone, Debug, PartialEq)]
pub struct PrototypeSet {
    pub pattern: String,
    pub shapes: Vec<Prototype>,
}

/// Result of grouping a flat document's list-type keys.
#[derive(Clone, Debug, Default)]
pub struct ListGroups {
    groups: Vec<ListGroup>,
    prototypes: Vec<PrototypeSet>,
}

impl ListGroups {
    /// Group the indexed keys of `doc` by enclosing list item.
    /// Prototypes are derived only for schema documents.
    pub fn build(doc: &FlatDocument, want_prototypes: bool) -> ListGroups {
        let separator = doc.separator();
        let mut groups: Vec<ListGroup> = Vec::new();
        let mut by_item: HashMap<String, usize> = HashMap::new();

        for entry in doc.list_entries() {
            // Indexed keys always split.
            let Some((item, field)) = entry.path.split_at_item() else {
                continue;
            };
            let item_key = item.render(separator);
            let slot = *by_item.entry(item_key.clone()).or_insert_with(|| {
                groups.push(ListGroup {
                    item_key,
                    pattern: item.generalized(separator),
                    fields: Vec::new(),
                });
                groups.len() - 1
            });
            groups[slot].fields.push(FieldEntry {
                name: field.render(separator),
                pattern: field.generalized(separator),
                full_key: entry.key.clone(),
                value: entry.value.clone(),
            });
        }

        let prototypes = if want_prototypes {
            derive_prototypes(&groups)
        } else {
            Vec::new()
        };

        ListGroups { groups, prototypes }
    }

    /// Concrete list groups, in document order.
    pub fn groups(&self) -> &[ListGroup] {
        &self.groups
    }

    /// Every shape declared at the generalized list location `pattern`.
    pub fn prototypes_for_path(&self, pattern: &str) -> &[Prototype] {
        self.prototypes
            .iter()
            .find(|set| set.pattern == pattern)
            .map(|set| set.shapes.as_slice())
            .unwrap_or(&[])
    }

    /// The subset of [`Self::prototypes_for_path`] whose index-generalized
    /// field-name set exactly equals `field_patterns`.
    pub fn matching_prototypes(
        &self,
        pattern: &str,
        field_patterns: &BTreeSet<&str>,
    ) -> Vec<&Prototype> {
        self.prototypes_for_path(pattern)
            .iter()
            .filter(|shape| &shape.field_patterns() == field_patterns)
            .collect()
    }

    pub fn prototype_sets(&self) -> &[PrototypeSet] {
        &self.prototypes
    }
}

fn derive_prototypes(groups: &[ListGroup]) -> Vec<PrototypeSet> {
    let mut sets: Vec<PrototypeSet> = Vec::new();
    let mut by_pattern: HashMap<String, usize> = HashMap::new();
    let mut seen_shapes: HashMap<String, BTreeSet<Vec<(String, String)>>> = HashMap::new();

    for group in groups {
        let slot = *by_pattern.entry(group.pattern.clone()).or_insert_with(|| {
            sets.push(PrototypeSet {
                pattern: group.pattern.clone(),
                shapes: Vec::new(),
            });
            sets.len() - 1
        });

        // Identical field maps at one location collapse into one shape.
        let fingerprint = shape_fingerprint(group);
        let seen = seen_shapes.entry(group.pattern.clone()).or_default();
        if seen.insert(fingerprint) {
            sets[slot].shapes.push(Prototype {
                item_key: group.item_key.clone(),
                fields: group.fields.clone(),
            });
        }
    }

    sets
}

fn shape_fingerprint(group: &ListGroup) -> Vec<(String, String)> {
    let mut fields: Vec<(String, String)> = group
        .fields
        .iter()
        .map(|f| (f.pattern.clone(), f.value.to_string()))
        .collect();
    fields.sort();
    fields
}
