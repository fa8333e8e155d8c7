//! Path resolution with copy-on-write writes
//!
//! `read` walks an [`EditorPath`] down a document. `write` returns a new root
//! in which the addressed value is replaced: every ancestor of the target is
//! rebuilt, every other subtree is reused by reference, and a write that would
//! not change anything returns the original root itself.

use crate::core::errors::PathResolutionError;
use crate::core::keys::KeyRegistry;
use crate::core::path::{EditorPath, PathSegment};
use crate::core::value::{Node, NodeKind, Value};

type Resolved<T> = core::result::Result<T, PathResolutionError>;

/// Reads and writes values at paths, translating stable references through a
/// key registry
///
/// # Examples
///
/// ```
/// use fx_editor::{editor_path, KeyRegistry, PathResolver, Value};
/// use serde_json::json;
///
/// let mut registry = KeyRegistry::new();
/// let mut resolver = PathResolver::new(&mut registry);
///
/// let doc = Value::from(json!({"effects": {"a": [true, "X"]}, "filters": {}}));
/// let path = editor_path!["effects", "a", 0];
///
/// let edited = resolver.write(&doc, &path, &Value::bool(false)).unwrap();
/// assert_eq!(resolver.read(&edited, &path).unwrap(), Value::bool(false));
///
/// // The untouched sibling is shared with the previous snapshot
/// assert!(edited.get("filters").unwrap().ptr_eq(doc.get("filters").unwrap()));
/// ```
#[derive(Debug)]
pub struct PathResolver<'r> {
    registry: &'r mut KeyRegistry,
}

impl<'r> PathResolver<'r> {
    pub fn new(registry: &'r mut KeyRegistry) -> Self {
        Self { registry }
    }

    /// Registry used for stable references
    pub fn registry(&mut self) -> &mut KeyRegistry {
        self.registry
    }

    /// Value at `path`
    pub fn read(&mut self, document: &Value, path: &EditorPath) -> Resolved<Value> {
        let mut node = document.clone();
        for (depth, segment) in path.iter().enumerate() {
            node = self.child(&node, segment, depth)?;
        }
        Ok(node)
    }

    /// New document with `value` stored at `path`
    ///
    /// A field segment naming an absent entry is accepted as the final
    /// segment, in which case the entry is created.
    pub fn write(&mut self, document: &Value, path: &EditorPath, value: &Value) -> Resolved<Value> {
        self.write_at(document, path.segments(), value, 0)
    }

    /// Same path with every index segment replaced by a stable reference
    pub fn stabilize(&mut self, document: &Value, path: &EditorPath) -> Resolved<EditorPath> {
        let mut node = document.clone();
        let mut stable = EditorPath::root();
        for (depth, segment) in path.iter().enumerate() {
            let next = self.child(&node, segment, depth)?;
            match segment {
                PathSegment::Index(index) => {
                    let key = self.registry.key_at(&node, *index).ok_or(
                        PathResolutionError::IndexOutOfBounds {
                            index: *index,
                            len: node.as_list().map_or(0, <[Value]>::len),
                            depth,
                        },
                    )?;
                    stable.push(key);
                }
                other => stable.push(other.clone()),
            }
            node = next;
        }
        Ok(stable)
    }

    /// Position in `list` addressed by a positional segment
    pub fn position(
        &mut self,
        list: &Value,
        segment: &PathSegment,
        depth: usize,
    ) -> Resolved<usize> {
        let len = list.as_list().map_or(0, <[Value]>::len);
        match segment {
            PathSegment::Index(index) if *index < len => Ok(*index),
            PathSegment::Index(index) => Err(PathResolutionError::IndexOutOfBounds {
                index: *index,
                len,
                depth,
            }),
            PathSegment::StableRef { key } => self
                .registry
                .index_of_key(list, *key)
                .ok_or(PathResolutionError::UnknownStableKey { key: *key, depth }),
            PathSegment::Field(field) => Err(PathResolutionError::FieldOnList {
                field: field.clone(),
                depth,
            }),
        }
    }

    fn child(&mut self, node: &Value, segment: &PathSegment, depth: usize) -> Resolved<Value> {
        match (node.node(), segment) {
            (Node::Map(entries), PathSegment::Field(field)) => {
                entries
                    .get(field)
                    .cloned()
                    .ok_or_else(|| PathResolutionError::MissingField {
                        field: field.clone(),
                        depth,
                    })
            }
            (Node::Map(_), _) => Err(PathResolutionError::PositionOnMap { depth }),
            (Node::List(items), _) => {
                let position = self.position(node, segment, depth)?;
                Ok(items[position].clone())
            }
            _ => Err(PathResolutionError::ScalarDescent {
                kind: node.kind(),
                depth,
            }),
        }
    }

    fn write_at(
        &mut self,
        node: &Value,
        segments: &[PathSegment],
        value: &Value,
        depth: usize,
    ) -> Resolved<Value> {
        let Some((head, rest)) = segments.split_first() else {
            return Ok(if node == value {
                node.clone()
            } else {
                value.clone()
            });
        };

        match (node.node(), head) {
            (Node::Map(entries), PathSegment::Field(field)) => {
                let updated = match entries.get(field) {
                    Some(child) => {
                        let updated = self.write_at(child, rest, value, depth + 1)?;
                        if updated.ptr_eq(child) {
                            return Ok(node.clone());
                        }
                        updated
                    }
                    None if rest.is_empty() => value.clone(),
                    None => {
                        return Err(PathResolutionError::MissingField {
                            field: field.clone(),
                            depth,
                        })
                    }
                };
                let mut copy = entries.clone();
                copy.insert(field.clone(), updated);
                Ok(Value::from_map(copy))
            }
            (Node::Map(_), _) => Err(PathResolutionError::PositionOnMap { depth }),
            (Node::List(items), _) => {
                let position = self.position(node, head, depth)?;
                let child = &items[position];
                let updated = self.write_at(child, rest, value, depth + 1)?;
                if updated.ptr_eq(child) {
                    return Ok(node.clone());
                }
                let mut copy = items.clone();
                copy[position] = updated;
                let copy = Value::from_list(copy);
                self.registry.inherit(node, &copy);
                Ok(copy)
            }
            _ => Err(PathResolutionError::ScalarDescent {
                kind: node.kind(),
                depth,
            }),
        }
    }
}

/// Fail with `UnexpectedKind` unless `value` is a list
pub(crate) fn expect_list<'v>(value: &'v Value, depth: usize) -> Resolved<&'v [Value]> {
    value.as_list().ok_or(PathResolutionError::UnexpectedKind {
        expected: NodeKind::List,
        found: value.kind(),
        depth,
    })
}

/// Fail with `UnexpectedKind` unless `value` is a map
pub(crate) fn expect_map(value: &Value, depth: usize) -> Resolved<&crate::core::value::Map> {
    value.as_map().ok_or(PathResolutionError::UnexpectedKind {
        expected: NodeKind::Map,
        found: value.kind(),
        depth,
    })
}
