//! Named effect and filter aliases
//!
//! A document keeps its reusable effects and filters in two root tables. Any
//! node elsewhere in the graph can point at a table entry with a reference
//! node, a single-entry map such as `{"$filter": "grain"}`. Renaming an alias
//! therefore touches the table key and every reference to it in one step.

use crate::core::errors::{EditorError, Result};
use crate::core::keys::KeyRegistry;
use crate::core::value::{Map, Node, Value};
use core::fmt;
use serde::{Deserialize, Serialize};

/// Which alias table a rename targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AliasKind {
    #[serde(alias = "effects")]
    Effect,
    #[serde(alias = "filters")]
    Filter,
}

impl AliasKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Effect => "effect",
            Self::Filter => "filter",
        }
    }
}

impl fmt::Display for AliasKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where alias tables and reference nodes live in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasConfig {
    /// Root field holding the effect table
    pub effects_field: String,
    /// Root field holding the filter table
    pub filters_field: String,
    /// Single key of an effect reference node
    pub effect_reference_field: String,
    /// Single key of a filter reference node
    pub filter_reference_field: String,
}

impl Default for AliasConfig {
    fn default() -> Self {
        Self {
            effects_field: "effects".to_string(),
            filters_field: "filters".to_string(),
            effect_reference_field: "$effect".to_string(),
            filter_reference_field: "$filter".to_string(),
        }
    }
}

impl AliasConfig {
    #[must_use]
    pub fn table_field(&self, kind: AliasKind) -> &str {
        match kind {
            AliasKind::Effect => &self.effects_field,
            AliasKind::Filter => &self.filters_field,
        }
    }

    #[must_use]
    pub fn reference_field(&self, kind: AliasKind) -> &str {
        match kind {
            AliasKind::Effect => &self.effect_reference_field,
            AliasKind::Filter => &self.filter_reference_field,
        }
    }

    /// Alias name if `value` is a reference node of `kind`
    #[must_use]
    pub fn reference_target<'v>(&self, kind: AliasKind, value: &'v Value) -> Option<&'v str> {
        let entries = value.as_map()?;
        if entries.len() != 1 {
            return None;
        }
        entries.get(self.reference_field(kind))?.as_str()
    }

    /// Names in the alias table of `kind`, in table order
    #[must_use]
    pub fn alias_names<'v>(&self, kind: AliasKind, document: &'v Value) -> Vec<&'v str> {
        document
            .get(self.table_field(kind))
            .and_then(Value::as_map)
            .map(|table| table.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

/// Document with alias `old_name` renamed to `new_name`
///
/// The table entry keeps its position and every reference node naming
/// `old_name` is rewritten. Subtrees without references are shared with the
/// input. Validation happens before anything is built.
pub fn rename(
    document: &Value,
    kind: AliasKind,
    old_name: &str,
    new_name: &str,
    config: &AliasConfig,
    registry: &mut KeyRegistry,
) -> Result<Value> {
    let table_field = config.table_field(kind);
    let table = document
        .get(table_field)
        .and_then(Value::as_map)
        .ok_or_else(|| EditorError::AliasTableMissing {
            field: table_field.to_string(),
        })?;

    if !table.contains_key(old_name) {
        return Err(EditorError::AliasNotFound {
            kind,
            name: old_name.to_string(),
        });
    }
    if table.contains_key(new_name) {
        return Err(EditorError::RenameCollision {
            kind,
            name: new_name.to_string(),
        });
    }

    let rewriter = ReferenceRewriter {
        field: config.reference_field(kind),
        old_name,
        new_name,
    };
    let rewritten = rewriter.rewrite(document, registry);

    let Some(root) = rewritten.as_map() else {
        return Err(EditorError::AliasTableMissing {
            field: table_field.to_string(),
        });
    };
    let Some(table) = root.get(table_field).and_then(Value::as_map) else {
        return Err(EditorError::AliasTableMissing {
            field: table_field.to_string(),
        });
    };

    let renamed: Map = table
        .iter()
        .map(|(name, entry)| {
            let name = if name == old_name { new_name } else { name.as_str() };
            (name.to_string(), entry.clone())
        })
        .collect();

    let mut root = root.clone();
    root.insert(table_field.to_string(), Value::from_map(renamed));
    Ok(Value::from_map(root))
}

struct ReferenceRewriter<'a> {
    field: &'a str,
    old_name: &'a str,
    new_name: &'a str,
}

impl ReferenceRewriter<'_> {
    fn is_target(&self, entries: &Map) -> bool {
        entries.len() == 1
            && entries
                .get(self.field)
                .and_then(Value::as_str)
                .is_some_and(|name| name == self.old_name)
    }

    /// `value` with references rewritten; the same handle when none were found
    fn rewrite(&self, value: &Value, registry: &mut KeyRegistry) -> Value {
        match value.node() {
            Node::Map(entries) if self.is_target(entries) => {
                Value::map([(self.field, Value::string(self.new_name))])
            }
            Node::Map(entries) => {
                let mut copy: Option<Map> = None;
                for (index, child) in entries.values().enumerate() {
                    let updated = self.rewrite(child, registry);
                    if updated.ptr_eq(child) {
                        continue;
                    }
                    let copy = copy.get_or_insert_with(|| entries.clone());
                    if let Some((_, slot)) = copy.get_index_mut(index) {
                        *slot = updated;
                    }
                }
                copy.map_or_else(|| value.clone(), Value::from_map)
            }
            Node::List(items) => {
                let mut copy: Option<Vec<Value>> = None;
                for (index, child) in items.iter().enumerate() {
                    let updated = self.rewrite(child, registry);
                    if updated.ptr_eq(child) {
                        continue;
                    }
                    copy.get_or_insert_with(|| items.clone())[index] = updated;
                }
                match copy {
                    Some(items) => {
                        let list = Value::from_list(items);
                        registry.inherit(value, &list);
                        list
                    }
                    None => value.clone(),
                }
            }
            _ => value.clone(),
        }
    }
}
