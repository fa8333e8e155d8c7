//! Property-based tests for fx-editor
//!
//! Uses proptest to verify the resolver and store invariants across
//! arbitrary documents, paths and replacement values.

use fx_editor::{
    editor_path, Action, EditorPath, EditorStore, KeyRegistry, Node, PathResolver, PathSegment,
    Value,
};
use proptest::prelude::*;

/// Generate arbitrary JSON documents
fn arb_json() -> impl Strategy<Value = serde_json::Value> {
    let leaf = prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::from),
        (-1000i64..1000).prop_map(serde_json::Value::from),
        "[a-z]{0,6}".prop_map(serde_json::Value::from),
    ];
    leaf.prop_recursive(4, 48, 5, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(serde_json::Value::Array),
            prop::collection::vec(("[a-z]{1,3}", inner), 0..5)
                .prop_map(|entries| serde_json::Value::Object(entries.into_iter().collect())),
        ]
    })
}

/// Path choices paired with a replacement value
fn arb_edit() -> impl Strategy<Value = (Vec<usize>, serde_json::Value)> {
    (prop::collection::vec(any::<usize>(), 0..6), arb_json())
}

/// Walk `doc` following `choices`, producing a path to an existing value
fn path_into(doc: &Value, choices: &[usize]) -> EditorPath {
    let mut path = EditorPath::root();
    let mut node = doc.clone();
    for &choice in choices {
        let next = match node.node() {
            Node::Map(entries) if !entries.is_empty() => {
                let Some((key, child)) = entries.get_index(choice % entries.len()) else {
                    break;
                };
                path.push(key.clone());
                child.clone()
            }
            Node::List(items) if !items.is_empty() => {
                let index = choice % items.len();
                path.push(index);
                items[index].clone()
            }
            _ => break,
        };
        node = next;
    }
    path
}

/// Every subtree off `path` must be the same allocation in both documents
fn assert_siblings_shared(old: &Value, new: &Value, path: &[PathSegment]) {
    let Some((head, rest)) = path.split_first() else {
        return;
    };
    match (old.node(), new.node(), head) {
        (Node::Map(before), Node::Map(after), PathSegment::Field(field)) => {
            for (key, value) in before {
                if key != field {
                    assert!(
                        after.get(key).is_some_and(|other| other.ptr_eq(value)),
                        "sibling '{key}' was copied"
                    );
                }
            }
            if let (Some(a), Some(b)) = (before.get(field), after.get(field)) {
                assert_siblings_shared(a, b, rest);
            }
        }
        (Node::List(before), Node::List(after), PathSegment::Index(index)) => {
            assert_eq!(before.len(), after.len());
            for (i, (a, b)) in before.iter().zip(after).enumerate() {
                if i != *index {
                    assert!(a.ptr_eq(b), "sibling {i} was copied");
                }
            }
            assert_siblings_shared(&before[*index], &after[*index], rest);
        }
        _ => panic!("path does not match document shape"),
    }
}

proptest! {
    #[test]
    fn prop_write_then_read_round_trips(
        doc in arb_json(),
        choices in prop::collection::vec(any::<usize>(), 0..6),
        replacement in arb_json(),
    ) {
        let doc = Value::from(doc);
        let replacement = Value::from(replacement);
        let path = path_into(&doc, &choices);

        let mut registry = KeyRegistry::new();
        let mut resolver = PathResolver::new(&mut registry);
        let written = resolver.write(&doc, &path, &replacement).unwrap();
        prop_assert_eq!(resolver.read(&written, &path).unwrap(), replacement);
    }

    #[test]
    fn prop_writing_current_value_is_identity(
        doc in arb_json(),
        choices in prop::collection::vec(any::<usize>(), 0..6),
    ) {
        let doc = Value::from(doc);
        let path = path_into(&doc, &choices);

        let mut registry = KeyRegistry::new();
        let mut resolver = PathResolver::new(&mut registry);
        let current = resolver.read(&doc, &path).unwrap();
        // A deep copy, so only equality can short-circuit the write
        let copy = Value::from(current.to_json());
        prop_assert!(resolver.write(&doc, &path, &copy).unwrap().ptr_eq(&doc));
    }

    #[test]
    fn prop_siblings_are_shared(
        doc in arb_json(),
        choices in prop::collection::vec(any::<usize>(), 1..6),
        replacement in arb_json(),
    ) {
        let doc = Value::from(doc);
        let replacement = Value::from(replacement);
        let path = path_into(&doc, &choices);

        let mut registry = KeyRegistry::new();
        let mut resolver = PathResolver::new(&mut registry);
        let written = resolver.write(&doc, &path, &replacement).unwrap();
        assert_siblings_shared(&doc, &written, path.segments());
    }

    #[test]
    fn prop_stable_path_reads_same_value(
        doc in arb_json(),
        choices in prop::collection::vec(any::<usize>(), 0..6),
    ) {
        let doc = Value::from(doc);
        let path = path_into(&doc, &choices);

        let mut registry = KeyRegistry::new();
        let mut resolver = PathResolver::new(&mut registry);
        let stable = resolver.stabilize(&doc, &path).unwrap();
        prop_assert!(!stable.iter().any(|segment| matches!(segment, PathSegment::Index(_))));
        let by_index = resolver.read(&doc, &path).unwrap();
        prop_assert!(resolver.read(&doc, &stable).unwrap().ptr_eq(&by_index));
    }

    #[test]
    fn prop_undo_restores_document(
        doc in arb_json(),
        edits in prop::collection::vec(arb_edit(), 1..5),
    ) {
        let original = Value::from(doc);
        let mut store = EditorStore::new(original.clone());

        for (choices, value) in &edits {
            let path = path_into(store.document(), choices);
            store.dispatch(Action::edit(path, value.clone())).unwrap();
        }
        for _ in &edits {
            store.dispatch(Action::Undo).unwrap();
        }

        prop_assert_eq!(store.document(), &original);
        prop_assert!(!store.state().can_undo);
        prop_assert_eq!(store.history_stats().redo_count, edits.len());
    }

    #[test]
    fn prop_multi_undoes_in_one_step(
        doc in arb_json(),
        edits in prop::collection::vec(arb_edit(), 0..5),
    ) {
        let original = Value::from(doc);
        let mut store = EditorStore::new(original.clone());

        // Build paths against the document each edit will see
        let mut registry = KeyRegistry::new();
        let mut resolver = PathResolver::new(&mut registry);
        let mut preview = original.clone();
        let mut actions = Vec::new();
        for (choices, value) in &edits {
            let path = path_into(&preview, choices);
            let value = Value::from(value.clone());
            preview = resolver.write(&preview, &path, &value).unwrap();
            actions.push(Action::edit(path, value));
        }

        store.dispatch(Action::multi(actions)).unwrap();
        prop_assert_eq!(store.document(), &preview);
        prop_assert_eq!(store.history_stats().undo_count, 1);

        store.dispatch(Action::Undo).unwrap();
        prop_assert_eq!(store.document(), &original);
    }
}

#[test]
fn root_edit_replaces_whole_document() {
    let mut store = EditorStore::new(Value::from(serde_json::json!({"a": 1})));
    store.dispatch(Action::edit(editor_path![], Value::from("scalar"))).unwrap();
    assert_eq!(store.document().as_str(), Some("scalar"));
    store.dispatch(Action::Undo).unwrap();
    assert_eq!(store.document().to_json(), serde_json::json!({"a": 1}));
}
