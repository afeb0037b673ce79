//! Schema flattener: expands nested object/list fields into a flat,
//! dotted-path addressable field list.
//!
//! Expansion is guarded two ways, both mandatory behavior rather than
//! optimizations:
//! - a per-path `visited` set of type names truncates cycles: a
//!   self-referential field is kept once as an unexpanded leaf placeholder
//!   instead of recursing forever;
//! - `MAX_FLATTEN_DEPTH` bounds recursion on deep (non-cyclic) graphs.
//!
//! List fields are expanded one level: the element type's fields become
//! addressable under the list's dotted path but are marked non-aggregatable,
//! since list cardinality breaks simple dotted addressing. The list field
//! itself is kept in the output with its element fields as `sub_fields`, so
//! the projection engine can resolve `unwind` stages without another schema
//! round trip.

use std::collections::HashSet;

use tracing::{debug, instrument};

use mosaic_api::{FieldDescriptor, FieldKind, ScalarType};

use crate::catalog::TypeCatalog;

/// Recursion bound for pathological (deep but acyclic) type graphs.
pub const MAX_FLATTEN_DEPTH: usize = 8;

/// Flatten the named type into a dotted-path field list. Unknown types yield
/// an empty list.
#[instrument(skip(catalog))]
pub fn flatten_type(catalog: &TypeCatalog, type_name: &str) -> Vec<FieldDescriptor> {
    let fields = catalog.resolve_type(type_name);
    let mut visited = HashSet::new();
    flatten_fields(catalog, &fields, &mut visited)
}

/// Flatten a field list, threading the set of type names already descended
/// into along the current path.
pub fn flatten_fields(
    catalog: &TypeCatalog,
    fields: &[FieldDescriptor],
    visited: &mut HashSet<String>,
) -> Vec<FieldDescriptor> {
    let mut out = Vec::new();
    flatten_into(catalog, fields, "", visited, 0, &mut out);
    out
}

fn flatten_into(
    catalog: &TypeCatalog,
    fields: &[FieldDescriptor],
    prefix: &str,
    visited: &mut HashSet<String>,
    depth: usize,
    out: &mut Vec<FieldDescriptor>,
) {
    for field in fields {
        if is_relation_reference(field) {
            debug!(field = %field.name, "excluding relation reference from selectable set");
            continue;
        }

        let path = dotted(prefix, &field.name);
        match &field.kind {
            FieldKind::Scalar(_) => {
                let mut leaf = field.clone();
                leaf.name = path.clone();
                leaf.source_path = path;
                leaf.aggregatable = true;
                out.push(leaf);
            }
            FieldKind::Object { type_name } => {
                let expandable = !visited.contains(type_name) && depth < MAX_FLATTEN_DEPTH;
                let nested = if expandable {
                    catalog.resolve_type(type_name)
                } else {
                    std::sync::Arc::new(Vec::new())
                };

                if nested.is_empty() {
                    // Cycle, depth bound or unresolved nested type: keep the
                    // field as an unexpanded leaf placeholder.
                    out.push(placeholder(field, path, true));
                } else {
                    visited.insert(type_name.clone());
                    flatten_into(catalog, &nested, &path, visited, depth + 1, out);
                    visited.remove(type_name);
                }
            }
            FieldKind::List { type_name } => {
                let expandable = !visited.contains(type_name) && depth < MAX_FLATTEN_DEPTH;
                let element_fields: Vec<FieldDescriptor> = if expandable {
                    catalog
                        .resolve_type(type_name)
                        .iter()
                        .filter(|f| !is_relation_reference(f))
                        .cloned()
                        .collect()
                } else {
                    Vec::new()
                };

                // The list container stays addressable and carries the
                // element fields for the projection engine's unwind stage.
                let mut container = field.clone();
                container.name = path.clone();
                container.source_path = path.clone();
                container.sub_fields = element_fields.clone();
                container.aggregatable = true;
                out.push(container);

                // Element fields are addressable one level down, but list
                // cardinality makes them non-aggregatable.
                for element in &element_fields {
                    let element_path = dotted(&path, &element.name);
                    out.push(placeholder(element, element_path, false));
                }
            }
        }
    }
}

fn placeholder(field: &FieldDescriptor, path: String, aggregatable: bool) -> FieldDescriptor {
    let mut leaf = field.clone();
    leaf.name = path.clone();
    leaf.source_path = path;
    leaf.sub_fields = Vec::new();
    leaf.aggregatable = aggregatable;
    leaf
}

fn dotted(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

/// Explicit predicate for ID-reference fields that merely encode a relation:
/// they duplicate the expanded relation and are not independently meaningful
/// to an end user building a view, so the flattener excludes them.
///
/// A field is a relation reference when it is an `Id`-typed scalar other
/// than the row's own `id`, a scalar whose name carries an identifier suffix
/// (`_id`, `_ids`, `Id`, `Ids`), or a list of `Id`.
pub fn is_relation_reference(field: &FieldDescriptor) -> bool {
    match &field.kind {
        FieldKind::Scalar(ScalarType::Id) => !is_primary_key_name(&field.name),
        FieldKind::Scalar(_) => has_identifier_suffix(&field.name),
        FieldKind::List { type_name } => {
            type_name.eq_ignore_ascii_case("id") || has_identifier_suffix(&field.name)
        }
        FieldKind::Object { .. } => false,
    }
}

fn is_primary_key_name(name: &str) -> bool {
    last_segment(name).eq_ignore_ascii_case("id")
}

fn has_identifier_suffix(name: &str) -> bool {
    let last = last_segment(name);
    if last.eq_ignore_ascii_case("id") {
        // The row's own primary key stays selectable.
        return false;
    }
    last.ends_with("_id")
        || last.ends_with("_ids")
        || (last.len() > 2 && last.ends_with("Id"))
        || (last.len() > 3 && last.ends_with("Ids"))
}

fn last_segment(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{SchemaSnapshot, TypeCatalog};
    use std::sync::Arc;

    fn catalog(snapshot: SchemaSnapshot) -> TypeCatalog {
        TypeCatalog::new(Arc::new(snapshot))
    }

    fn names(fields: &[FieldDescriptor]) -> Vec<&str> {
        fields.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_self_referential_type_truncates_at_cycle() {
        let snapshot = SchemaSnapshot::new().with_type(
            "Person",
            vec![
                FieldDescriptor::scalar("name", ScalarType::Text),
                FieldDescriptor::scalar("age", ScalarType::Integer),
                FieldDescriptor::object("manager", "Person"),
            ],
        );
        let catalog = catalog(snapshot);

        let flat = flatten_type(&catalog, "Person");
        let flat_names = names(&flat);

        assert_eq!(
            flat_names,
            vec!["name", "age", "manager.name", "manager.age", "manager.manager"]
        );

        // The cycle point is a leaf placeholder, not an expandable path.
        let truncated = FieldDescriptor::find(&flat, "manager.manager").unwrap();
        assert!(truncated.is_object());
        assert!(truncated.sub_fields.is_empty());
        assert!(!flat_names.contains(&"manager.manager.name"));
    }

    #[test]
    fn test_mutual_recursion_terminates() {
        let snapshot = SchemaSnapshot::new()
            .with_type(
                "A",
                vec![
                    FieldDescriptor::scalar("a_name", ScalarType::Text),
                    FieldDescriptor::object("b", "B"),
                ],
            )
            .with_type(
                "B",
                vec![
                    FieldDescriptor::scalar("b_name", ScalarType::Text),
                    FieldDescriptor::object("a", "A"),
                ],
            );
        let catalog = catalog(snapshot);

        let flat = flatten_type(&catalog, "A");
        assert_eq!(names(&flat), vec!["a_name", "b.b_name", "b.a.a_name", "b.a.b"]);
    }

    #[test]
    fn test_list_expands_one_level_non_aggregatable() {
        let snapshot = SchemaSnapshot::new()
            .with_type(
                "Order",
                vec![
                    FieldDescriptor::scalar("id", ScalarType::Id),
                    FieldDescriptor::scalar("country", ScalarType::Text),
                    FieldDescriptor::list("items", "LineItem"),
                ],
            )
            .with_type(
                "LineItem",
                vec![
                    FieldDescriptor::scalar("sku", ScalarType::Text),
                    FieldDescriptor::scalar("price", ScalarType::Float),
                ],
            );
        let catalog = catalog(snapshot);

        let flat = flatten_type(&catalog, "Order");
        assert_eq!(
            names(&flat),
            vec!["id", "country", "items", "items.sku", "items.price"]
        );

        let container = FieldDescriptor::find(&flat, "items").unwrap();
        assert!(container.is_list());
        assert_eq!(container.sub_fields.len(), 2);
        assert!(container.aggregatable);

        let price = FieldDescriptor::find(&flat, "items.price").unwrap();
        assert!(!price.aggregatable);
        assert!(FieldDescriptor::find(&flat, "country").unwrap().aggregatable);
    }

    #[test]
    fn test_unresolved_nested_type_becomes_placeholder() {
        let snapshot = SchemaSnapshot::new().with_type(
            "Task",
            vec![
                FieldDescriptor::scalar("title", ScalarType::Text),
                FieldDescriptor::object("assignee", "GhostType"),
            ],
        );
        let catalog = catalog(snapshot);

        let flat = flatten_type(&catalog, "Task");
        assert_eq!(names(&flat), vec!["title", "assignee"]);
        assert!(FieldDescriptor::find(&flat, "assignee").unwrap().is_object());
    }

    #[test]
    fn test_depth_bound_on_deep_acyclic_graph() {
        // T0 -> T1 -> ... -> T11, each nesting the next.
        let mut snapshot = SchemaSnapshot::new();
        for i in 0..12 {
            snapshot.insert_type(
                format!("T{}", i),
                vec![
                    FieldDescriptor::scalar("v", ScalarType::Integer),
                    FieldDescriptor::object("next", format!("T{}", i + 1)),
                ],
            );
        }
        snapshot.insert_type("T12", vec![FieldDescriptor::scalar("v", ScalarType::Integer)]);
        let catalog = catalog(snapshot);

        let flat = flatten_type(&catalog, "T0");
        let max_dots = flat
            .iter()
            .map(|f| f.name.matches('.').count())
            .max()
            .unwrap_or(0);
        assert!(max_dots <= MAX_FLATTEN_DEPTH);
    }

    #[test]
    fn test_relation_reference_predicate() {
        // Foreign-key style scalars are relations.
        assert!(is_relation_reference(&FieldDescriptor::scalar(
            "project_id",
            ScalarType::Text
        )));
        assert!(is_relation_reference(&FieldDescriptor::scalar(
            "ownerId",
            ScalarType::Text
        )));
        assert!(is_relation_reference(&FieldDescriptor::scalar(
            "memberIds",
            ScalarType::Text
        )));
        assert!(is_relation_reference(&FieldDescriptor::scalar(
            "assignee",
            ScalarType::Id
        )));
        // The row's own primary key is not.
        assert!(!is_relation_reference(&FieldDescriptor::scalar(
            "id",
            ScalarType::Id
        )));
        // Ordinary fields are not.
        assert!(!is_relation_reference(&FieldDescriptor::scalar(
            "paid",
            ScalarType::Boolean
        )));
        assert!(!is_relation_reference(&FieldDescriptor::object(
            "owner", "Person"
        )));
        // Lists of ids are.
        assert!(is_relation_reference(&FieldDescriptor::list("tags", "ID")));
        assert!(is_relation_reference(&FieldDescriptor::list(
            "tag_ids",
            "Tag"
        )));
        assert!(!is_relation_reference(&FieldDescriptor::list("tags", "Tag")));
    }

    #[test]
    fn test_relation_fields_excluded_from_flattened_set() {
        let snapshot = SchemaSnapshot::new().with_type(
            "Task",
            vec![
                FieldDescriptor::scalar("id", ScalarType::Id),
                FieldDescriptor::scalar("title", ScalarType::Text),
                FieldDescriptor::scalar("project_id", ScalarType::Id),
                FieldDescriptor::object("project", "GhostProject"),
            ],
        );
        let catalog = catalog(snapshot);

        let flat = flatten_type(&catalog, "Task");
        assert_eq!(names(&flat), vec!["id", "title", "project"]);
    }
}
