//! End-to-end view compilation: schema snapshot JSON in, view plan out.

use std::sync::Arc;

use mosaic_api::{FieldDescriptor, FilterNode, Operator, WidgetSettings};
use mosaic_query::{build_view, SchemaSnapshot, TypeCatalog};

const SCHEMA: &str = r#"{
    "version": 1,
    "types": {
        "Person": {"fields": [
            {"name": "id", "type": "id"},
            {"name": "name", "type": "text"},
            {"name": "age", "type": "integer"},
            {"name": "manager", "object": "Person"},
            {"name": "team_id", "type": "id"}
        ]},
        "Order": {"fields": [
            {"name": "id", "type": "id"},
            {"name": "country", "type": "text"},
            {"name": "amount", "type": "float"},
            {"name": "date", "type": "date"},
            {"name": "items", "list": "LineItem"}
        ]},
        "LineItem": {"fields": [
            {"name": "sku", "type": "text"},
            {"name": "price", "type": "float"}
        ]}
    }
}"#;

fn catalog() -> TypeCatalog {
    TypeCatalog::new(Arc::new(SchemaSnapshot::from_json(SCHEMA).unwrap()))
}

#[test]
fn self_referential_type_flattens_finitely() {
    let catalog = catalog();
    let flat = catalog.flattened("Person");
    let names: Vec<&str> = flat.iter().map(|f| f.name.as_str()).collect();

    assert_eq!(
        names,
        vec![
            "id",
            "name",
            "age",
            "manager.id",
            "manager.name",
            "manager.age",
            "manager.manager"
        ]
    );
    // team_id is a relation reference and never selectable.
    assert!(!names.contains(&"team_id"));
}

#[test]
fn settings_document_compiles_against_live_schema() {
    let catalog = catalog();
    let settings = WidgetSettings::from_json(
        r#"{
            "type_name": "Person",
            "fields": ["name", "manager.name", "defunct_field"],
            "filter": {"logic": "and", "filters": [
                {"field": "age", "operator": "gte", "value": 18},
                {"field": "age", "operator": "contains", "value": "x"}
            ]},
            "sort": [{"field": "name"}]
        }"#,
    )
    .unwrap();

    let plan = build_view(&catalog, &settings);

    let selected: Vec<&str> = plan
        .descriptor
        .selection
        .iter()
        .map(|f| f.name.as_str())
        .collect();
    assert_eq!(selected, vec!["name", "manager.name"]);

    // The contains leaf is invalid for a numeric field and was pruned; the
    // sibling and the enclosing logic survive.
    match plan.descriptor.filter.as_ref().unwrap() {
        FilterNode::Group { filters, .. } => {
            assert_eq!(filters.len(), 1);
            assert!(matches!(
                &filters[0],
                FilterNode::Leaf { operator: Operator::Gte, .. }
            ));
        }
        _ => panic!("expected group"),
    }
}

#[test]
fn aggregated_settings_project_group_and_unwind() {
    let catalog = catalog();
    let settings = WidgetSettings::from_json(
        r#"{
            "type_name": "Order",
            "aggregation": {
                "source_fields": ["country", "amount", "items"],
                "pipeline": [
                    {"stage": "unwind", "field": "items"},
                    {"stage": "group",
                     "keys": ["country"],
                     "accumulators": [
                        {"name": "revenue", "function": "sum", "source_field": "items.price"}
                     ]}
                ]
            }
        }"#,
    )
    .unwrap();

    let plan = build_view(&catalog, &settings);
    let display: Vec<&str> = plan
        .display_fields
        .iter()
        .map(|f| f.field.name.as_str())
        .collect();
    assert_eq!(display, vec!["country", "revenue"]);
    assert!(plan.warnings.is_empty());
}

#[test]
fn recompiling_unchanged_settings_yields_equal_descriptors() {
    let catalog = catalog();
    let settings = WidgetSettings::from_json(
        r#"{"type_name": "Order", "fields": ["country", "amount"],
            "sort": [{"field": "amount", "order": "desc"}]}"#,
    )
    .unwrap();

    let first = build_view(&catalog, &settings).descriptor;
    let second = build_view(&catalog, &settings).descriptor;
    assert_eq!(first, second);
    assert_eq!(first.fingerprint(), second.fingerprint());
}

#[test]
fn unknown_type_yields_empty_but_working_plan() {
    let catalog = catalog();
    let settings = WidgetSettings::new("Renamed").with_fields(vec!["name".to_string()]);
    let plan = build_view(&catalog, &settings);
    assert!(plan.available_fields.is_empty());
    assert_eq!(plan.descriptor.type_name, "Renamed");
    assert!(plan.descriptor.selection.is_empty());
}

#[test]
fn list_descendants_are_marked_non_aggregatable() {
    let catalog = catalog();
    let flat = catalog.flattened("Order");
    let price = FieldDescriptor::find(&flat, "items.price").unwrap();
    assert!(!price.aggregatable);
    let country = FieldDescriptor::find(&flat, "country").unwrap();
    assert!(country.aggregatable);
}
