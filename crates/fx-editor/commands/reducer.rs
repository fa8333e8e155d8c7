//! Compiles actions into reversible history entries

use super::alias::{self, AliasConfig};
use super::Action;
use crate::core::errors::{EditorError, PathResolutionError, Result};
use crate::core::history::HistoryEntry;
use crate::core::keys::KeyRegistry;
use crate::core::path::EditorPath;
use crate::core::resolver::{expect_list, expect_map, PathResolver};
use crate::core::value::Value;

/// A compiled action: the entry to record and the document it produces
#[derive(Debug, Clone)]
pub struct Compiled {
    pub entry: HistoryEntry,
    pub document: Value,
}

/// Turns mutating actions into history entries
///
/// Every path is resolved against the document passed to [`compile`], and
/// every validation happens before the new document is built, so a failed
/// compile has no effect beyond registering stable keys.
///
/// [`compile`]: Reducer::compile
#[derive(Debug)]
pub struct Reducer<'a> {
    registry: &'a mut KeyRegistry,
    aliases: &'a AliasConfig,
}

impl<'a> Reducer<'a> {
    pub fn new(registry: &'a mut KeyRegistry, aliases: &'a AliasConfig) -> Self {
        Self { registry, aliases }
    }

    pub fn compile(&mut self, action: &Action, document: &Value) -> Result<Compiled> {
        let description = action.description();
        match action {
            Action::Edit { path, value } => self.edit(document, path, value, description),
            Action::Push { path, value } => self.splice_list(document, path, description, |items| {
                items.push(value.clone());
                Ok(())
            }),
            Action::InsertAt {
                path,
                index,
                values,
            } => {
                let depth = path.len();
                self.splice_list(document, path, description, |items| {
                    if *index > items.len() {
                        return Err(out_of_bounds(*index, items.len(), depth));
                    }
                    let tail = items.split_off(*index);
                    items.extend(values.iter().cloned());
                    items.extend(tail);
                    Ok(())
                })
            }
            Action::DeleteAt { path, index } => {
                let depth = path.len();
                self.splice_list(document, path, description, |items| {
                    if *index >= items.len() {
                        return Err(out_of_bounds(*index, items.len(), depth));
                    }
                    items.remove(*index);
                    Ok(())
                })
            }
            Action::DeleteValue { path, value } => {
                self.splice_list(document, path, description, |items| {
                    let position = items
                        .iter()
                        .position(|item| item == value)
                        .ok_or_else(|| EditorError::ValueNotFound {
                            path: path.to_string(),
                        })?;
                    items.remove(position);
                    Ok(())
                })
            }
            Action::Delete { path } => self.delete(document, path, description),
            Action::RenameAlias {
                kind,
                old_name,
                new_name,
            } => {
                let renamed = alias::rename(
                    document,
                    *kind,
                    old_name,
                    new_name,
                    self.aliases,
                    self.registry,
                )?;
                Ok(Compiled {
                    entry: HistoryEntry::replace(
                        EditorPath::root(),
                        document.clone(),
                        renamed.clone(),
                        description,
                    ),
                    document: renamed,
                })
            }
            Action::Multi { actions } => self.multi(document, actions, description),
            Action::Undo | Action::Redo | Action::Open { .. } => {
                Err(EditorError::invalid_action(format!(
                    "'{description}' cannot be recorded as an edit"
                )))
            }
        }
    }

    fn edit(
        &mut self,
        document: &Value,
        path: &EditorPath,
        value: &Value,
        description: String,
    ) -> Result<Compiled> {
        let mut resolver = PathResolver::new(self.registry);

        // A missing final field is added, so the entry covers the parent map
        let target = match path.split_last() {
            Some((parent, segment)) if !segment.is_positional() => {
                let parent_value = resolver.read(document, &parent)?;
                let has_field = segment
                    .as_field()
                    .is_some_and(|field| parent_value.get(field).is_some());
                if has_field || parent_value.as_map().is_none() {
                    path.clone()
                } else {
                    parent
                }
            }
            _ => path.clone(),
        };

        let before = resolver.read(document, &target)?;
        let edited = resolver.write(document, path, value)?;
        let after = resolver.read(&edited, &target)?;
        Ok(Compiled {
            entry: HistoryEntry::replace(target, before, after, description),
            document: edited,
        })
    }

    /// Rebuild the list at `path` through `change`, carrying its stable keys
    fn splice_list<F>(
        &mut self,
        document: &Value,
        path: &EditorPath,
        description: String,
        change: F,
    ) -> Result<Compiled>
    where
        F: FnOnce(&mut Vec<Value>) -> Result<()>,
    {
        let mut resolver = PathResolver::new(self.registry);
        let before = resolver.read(document, path)?;
        let mut items = expect_list(&before, path.len())?.to_vec();
        change(&mut items)?;

        let after = Value::from_list(items);
        resolver.registry().inherit(&before, &after);
        let edited = resolver.write(document, path, &after)?;
        Ok(Compiled {
            entry: HistoryEntry::replace(path.clone(), before, after, description),
            document: edited,
        })
    }

    fn delete(
        &mut self,
        document: &Value,
        path: &EditorPath,
        description: String,
    ) -> Result<Compiled> {
        let Some((parent, segment)) = path.split_last() else {
            return Err(EditorError::invalid_action("cannot delete the document root"));
        };
        let Some(field) = segment.as_field() else {
            return Err(EditorError::invalid_action(format!(
                "delete path must end in a field, got '{segment}'"
            )));
        };

        let mut resolver = PathResolver::new(self.registry);
        let before = resolver.read(document, &parent)?;
        let mut entries = expect_map(&before, parent.len())?.clone();
        if entries.shift_remove(field).is_none() {
            return Err(PathResolutionError::MissingField {
                field: field.to_string(),
                depth: parent.len(),
            }
            .into());
        }

        let after = Value::from_map(entries);
        let edited = resolver.write(document, &parent, &after)?;
        Ok(Compiled {
            entry: HistoryEntry::replace(parent, before, after, description),
            document: edited,
        })
    }

    fn multi(
        &mut self,
        document: &Value,
        actions: &[Action],
        description: String,
    ) -> Result<Compiled> {
        let mut current = document.clone();
        let mut entries = Vec::with_capacity(actions.len());
        for action in actions {
            if !action.is_mutating() {
                return Err(EditorError::invalid_action(format!(
                    "'{}' is not allowed inside multi",
                    action.description()
                )));
            }
            let compiled = self.compile(action, &current)?;
            entries.push(compiled.entry);
            current = compiled.document;
        }
        Ok(Compiled {
            entry: HistoryEntry::batch(entries, description),
            document: current,
        })
    }
}

fn out_of_bounds(index: usize, len: usize, depth: usize) -> EditorError {
    PathResolutionError::IndexOutOfBounds { index, len, depth }.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::AliasKind;
    use crate::core::history::Operation;
    use crate::core::value::NodeKind;
    use crate::editor_path;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn compile(registry: &mut KeyRegistry, action: &Action, document: &Value) -> Result<Compiled> {
        let aliases = AliasConfig::default();
        Reducer::new(registry, &aliases).compile(action, document)
    }

    fn doc() -> Value {
        Value::from(json!({
            "effects": {"a": [true, "X", [], []]},
            "filters": {"grain": [true, "noise", []]},
            "list": ["x", "y", "z"]
        }))
    }

    #[test]
    fn edit_records_old_and_new_values() {
        let mut registry = KeyRegistry::new();
        let d = doc();
        let action = Action::edit(editor_path!["effects", "a", 0], false);
        let compiled = compile(&mut registry, &action, &d).unwrap();

        assert_eq!(compiled.document.to_json()["effects"]["a"], json!([false, "X", [], []]));
        match &compiled.entry.operation {
            Operation::Replace { path, before, after } => {
                assert_eq!(path, &editor_path!["effects", "a", 0]);
                assert_eq!(before, &Value::bool(true));
                assert_eq!(after, &Value::bool(false));
            }
            Operation::Batch(_) => panic!("expected a replace entry"),
        }
        assert_eq!(compiled.entry.description, "edit effects/a/0");
    }

    #[test]
    fn edit_of_new_field_records_parent_map() {
        let mut registry = KeyRegistry::new();
        let d = doc();
        let action = Action::edit(editor_path!["filters", "blur"], json!([true, "blur", []]));
        let compiled = compile(&mut registry, &action, &d).unwrap();

        match &compiled.entry.operation {
            Operation::Replace { path, before, .. } => {
                assert_eq!(path, &editor_path!["filters"]);
                assert!(before.ptr_eq(d.get("filters").unwrap()));
            }
            Operation::Batch(_) => panic!("expected a replace entry"),
        }
    }

    #[test]
    fn list_operations() {
        let mut registry = KeyRegistry::new();
        let d = doc();
        let list = |c: &Compiled| c.document.to_json()["list"].clone();

        let pushed = compile(&mut registry, &Action::push(editor_path!["list"], "w"), &d).unwrap();
        assert_eq!(list(&pushed), json!(["x", "y", "z", "w"]));

        let values = vec![Value::from("p"), Value::from("q")];
        let action = Action::insert_at(editor_path!["list"], 3, values);
        let inserted = compile(&mut registry, &action, &d).unwrap();
        assert_eq!(list(&inserted), json!(["x", "y", "z", "p", "q"]));

        let deleted =
            compile(&mut registry, &Action::delete_at(editor_path!["list"], 0), &d).unwrap();
        assert_eq!(list(&deleted), json!(["y", "z"]));

        let action = Action::delete_value(editor_path!["list"], "z");
        let removed = compile(&mut registry, &action, &d).unwrap();
        assert_eq!(list(&removed), json!(["x", "y"]));
    }

    #[test]
    fn list_operation_failures() {
        let mut registry = KeyRegistry::new();
        let d = doc();

        assert_eq!(
            compile(&mut registry, &Action::insert_at(editor_path!["list"], 4, Vec::new()), &d)
                .unwrap_err(),
            EditorError::Path(PathResolutionError::IndexOutOfBounds { index: 4, len: 3, depth: 1 })
        );
        assert_eq!(
            compile(&mut registry, &Action::delete_at(editor_path!["list"], 3), &d).unwrap_err(),
            EditorError::Path(PathResolutionError::IndexOutOfBounds { index: 3, len: 3, depth: 1 })
        );
        assert_eq!(
            compile(&mut registry, &Action::delete_value(editor_path!["list"], "nope"), &d)
                .unwrap_err(),
            EditorError::ValueNotFound { path: "list".to_string() }
        );
        assert_eq!(
            compile(&mut registry, &Action::push(editor_path!["effects"], 1_i64), &d).unwrap_err(),
            EditorError::Path(PathResolutionError::UnexpectedKind {
                expected: NodeKind::List,
                found: NodeKind::Map,
                depth: 1
            })
        );
    }

    #[test]
    fn middle_insert_relabels_trailing_keys() {
        let mut registry = KeyRegistry::new();
        let d = doc();
        let old_list = d.get("list").unwrap().clone();
        let keys = registry.keys(&old_list).to_vec();

        let action = Action::insert_at(editor_path!["list"], 1, vec![Value::from("w")]);
        let compiled = compile(&mut registry, &action, &d).unwrap();
        let new_list = compiled.document.get("list").unwrap().clone();
        let new_keys = registry.keys(&new_list).to_vec();

        assert_eq!(&new_keys[..3], keys.as_slice());
        assert_eq!(registry.index_of_key(&new_list, keys[1]), Some(1));
        assert_eq!(new_list.at(1).unwrap().as_str(), Some("w"));
    }

    #[test]
    fn delete_removes_field_in_place() {
        let mut registry = KeyRegistry::new();
        let d = Value::from(json!({"m": {"a": 1, "b": 2, "c": 3}}));
        let compiled = compile(&mut registry, &Action::delete(editor_path!["m", "b"]), &d).unwrap();
        assert_eq!(compiled.document.to_string(), r#"{"m":{"a":1,"c":3}}"#);

        let root = compile(&mut registry, &Action::delete(editor_path![]), &d).unwrap_err();
        assert!(root.to_string().contains("root"));
        assert_eq!(
            compile(&mut registry, &Action::delete(editor_path!["m", "zzz"]), &d).unwrap_err(),
            EditorError::Path(PathResolutionError::MissingField {
                field: "zzz".to_string(),
                depth: 1
            })
        );
    }

    #[test]
    fn rename_records_whole_document() {
        let mut registry = KeyRegistry::new();
        let d = doc();
        let action = Action::rename_alias(AliasKind::Filter, "grain", "film");
        let compiled = compile(&mut registry, &action, &d).unwrap();
        match &compiled.entry.operation {
            Operation::Replace { path, before, after } => {
                assert!(path.is_root());
                assert!(before.ptr_eq(&d));
                assert!(after.ptr_eq(&compiled.document));
            }
            Operation::Batch(_) => panic!("expected a replace entry"),
        }
    }

    #[test]
    fn multi_compiles_sequentially() {
        let mut registry = KeyRegistry::new();
        let d = doc();
        let action = Action::multi(vec![
            Action::push(editor_path!["list"], "w"),
            Action::delete_at(editor_path!["list"], 3),
            Action::edit(editor_path!["effects", "a", 1], "Y"),
        ]);
        let compiled = compile(&mut registry, &action, &d).unwrap();
        assert_eq!(compiled.document.to_json()["list"], json!(["x", "y", "z"]));
        assert_eq!(compiled.document.to_json()["effects"]["a"][1], json!("Y"));
        assert_eq!(compiled.entry.step_count(), 3);
    }

    #[test]
    fn multi_rejects_history_actions() {
        let mut registry = KeyRegistry::new();
        let err = compile(&mut registry, &Action::multi(vec![Action::Undo]), &doc()).unwrap_err();
        assert!(matches!(err, EditorError::InvalidAction { .. }));
        let err = compile(&mut registry, &Action::Redo, &doc()).unwrap_err();
        assert!(matches!(err, EditorError::InvalidAction { .. }));
    }
}
