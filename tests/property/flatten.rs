use proptest::prelude::*;
use rulebook::flatten::{FlatDocument, flatten};
use rulebook::path::{Path, Segment, full_match};
use serde_json::{Map, Value};
use std::collections::HashSet;

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "[a-z0-9 ]{0,12}".prop_map(Value::String),
    ]
}

/// Nested maps with scalar leaves; no sequences, so flattening is
/// invertible (list markers would not round-trip).
fn map_tree() -> impl Strategy<Value = Value> {
    scalar().prop_recursive(4, 32, 6, |inner| {
        prop::collection::btree_map("[a-z]{1,8}", inner, 1..6)
            .prop_map(|map| Value::Object(map.into_iter().collect()))
    })
}

fn unflatten(doc: &FlatDocument) -> Value {
    let mut root = Value::Object(Map::new());
    for entry in doc.iter() {
        if entry.path.is_empty() {
            return entry.value.clone();
        }
        let mut cursor = &mut root;
        for segment in entry.path.segments() {
            let Segment::Name(name) = segment else {
                unreachable!("map-only trees have no index segments");
            };
            cursor = &mut cursor[name.as_str()];
        }
        *cursor = entry.value.clone();
    }
    root
}

fn leaf_count(tree: &Value) -> usize {
    match tree {
        Value::Object(map) => map.values().map(leaf_count).sum(),
        _ => 1,
    }
}

fn segment() -> impl Strategy<Value = Segment> {
    prop_oneof![
        // Names may carry regex metacharacters; generalization must
        // escape them.
        "[a-z.+*()\\[\\]]{1,6}".prop_map(Segment::Name),
        (0usize..100).prop_map(Segment::Index),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn flatten_unflatten_roundtrip(tree in map_tree()) {
        let doc = flatten(&tree, ':');
        prop_assert_eq!(unflatten(&doc), tree);
    }

    #[test]
    fn one_entry_per_leaf(tree in map_tree()) {
        let doc = flatten(&tree, ':');
        prop_assert_eq!(doc.len(), leaf_count(&tree));
    }

    #[test]
    fn rendered_keys_are_unique(tree in map_tree()) {
        let doc = flatten(&tree, ':');
        let keys: HashSet<&str> = doc.iter().map(|e| e.key.as_str()).collect();
        prop_assert_eq!(keys.len(), doc.len());
    }

    #[test]
    fn every_rendered_key_resolves_to_its_value(tree in map_tree()) {
        let doc = flatten(&tree, ':');
        for entry in doc.iter() {
            prop_assert_eq!(doc.get(&entry.key), Some(&entry.value));
        }
    }

    #[test]
    fn map_only_trees_have_no_list_entries(tree in map_tree()) {
        let doc = flatten(&tree, ':');
        prop_assert_eq!(doc.list_entries().count(), 0);
        prop_assert_eq!(doc.scalars().count(), doc.len());
    }

    #[test]
    fn generalized_pattern_matches_its_own_key(segments in prop::collection::vec(segment(), 0..6)) {
        let path = Path::from_segments(segments);
        let key = path.render(':');
        let pattern = path.generalized(':');
        prop_assert!(full_match(&pattern, &key), "{} !~ {}", key, pattern);
    }

    #[test]
    fn split_at_item_reassembles_the_path(segments in prop::collection::vec(segment(), 1..6)) {
        let path = Path::from_segments(segments);
        if let Some((item, field)) = path.split_at_item() {
            prop_assert_eq!(item.join(&field), path);
            prop_assert!(!field.is_empty());
        } else {
            prop_assert!(!path.is_indexed());
        }
    }
}
