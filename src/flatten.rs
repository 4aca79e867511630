//! Flattening of a parsed value tree into a path-keyed scalar mapping.
//!
//! ```text
//! root:               root:scalars:key_a = "value_a"
//!   scalars:          root:list          = []      (list marker)
//!     key_a: value_a  root:list:0        = "item1"
//!   list:             root:list:1        = "item2"
//!     - item1
//!     - item2
//! ```
//!
//! Scalars keep their document types (booleans, numbers, strings are never
//! stringified) because rule evaluation later needs typed comparison.

use crate::path::Path;
use serde_json::Value;
use std::collections::HashMap;

/// One flattened leaf or list marker.
#[derive(Clone, Debug, PartialEq)]
pub struct FlatEntry {
    pub path: Path,
    /// Rendered key, cached because matching and reference resolution
    /// work on the rendered form.
    pub key: String,
    pub value: Value,
}

impl FlatEntry {
    /// True iff the entry marks a list container rather than a leaf.
    pub fn is_list_marker(&self) -> bool {
        matches!(&self.value, Value::Array(items) if items.is_empty())
    }
}

/// A flattened document: ordered path → scalar entries with rendered-key
/// lookup. Entry order follows document order.
#[derive(Clone, Debug, Default)]
pub struct FlatDocument {
    separator: char,
    entries: Vec<FlatEntry>,
    lookup: HashMap<String, usize>,
}

impl FlatDocument {
    pub fn separator(&self) -> char {
        self.separator
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in document order.
    pub fn iter(&self) -> impl Iterator<Item = &FlatEntry> {
        self.entries.iter()
    }

    /// Entries whose path contains no index segment. List markers at
    /// non-indexed paths count as scalars; everything inside a list does
    /// not.
    pub fn scalars(&self) -> impl Iterator<Item = &FlatEntry> {
        self.entries.iter().filter(|e| !e.path.is_indexed())
    }

    /// Entries whose path contains at least one index segment.
    pub fn list_entries(&self) -> impl Iterator<Item = &FlatEntry> {
        self.entries.iter().filter(|e| e.path.is_indexed())
    }

    /// Value lookup by rendered key.
    ///
    /// Distinct paths can render to the same key when a field name
    /// contains the separator; the first occurrence in document order
    /// wins here, while [`Self::iter`] still yields every entry.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.lookup.get(key).map(|&i| &self.entries[i].value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.lookup.contains_key(key)
    }

    fn push(&mut self, path: Path, value: Value) {
        let key = path.render(self.separator);
        self.lookup.entry(key.clone()).or_insert(self.entries.len());
        self.entries.push(FlatEntry { path, key, value });
    }
}

/// Flatten a parsed tree into a [`FlatDocument`].
///
/// Maps recurse with a name segment per field; sequences record an
/// empty-list marker at the container path and recurse each element with
/// its zero-based index as a segment; scalars terminate recursion. A
/// top-level scalar lands under the empty path.
pub fn flatten(tree: &Value, separator: char) -> FlatDocument {
    let mut doc = FlatDocument {
        separator,
        ..FlatDocument::default()
    };
    walk(&Path::root(), tree, &mut doc);
    doc
}

fn walk(path: &Path, value: &Value, doc: &mut FlatDocument) {
    match value {
        Value::Object(map) => {
            for (name, child) in map {
                walk(&path.child_name(name), child, doc);
            }
        }
        Value::Array(items) => {
            doc.push(path.clone(), Value::Array(Vec::new()));
            for (index, child) in items.iter().enumerate() {
                walk(&path.child_index(index), child, doc);
            }
        }
        scalar => doc.push(path.clone(), scalar.clone()),
    }
}
