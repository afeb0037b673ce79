//! Query descriptor compiler.
//!
//! Pure function of (settings, flattened fields): no hidden counters or
//! timestamps, so compiling the same inputs twice yields structurally equal
//! descriptors. Widgets rely on that to recompile only when settings change.
//!
//! The compiler is fail-soft by design: settings may reference fields whose
//! type changed or disappeared upstream, so unknown selections, unknown
//! filter/sort fields and operators outside a field's capability set are
//! dropped (with a debug trace) while the rest of the configuration is
//! preserved.

use tracing::{debug, instrument};

use mosaic_api::{
    FieldDescriptor, FilterNode, Operator, QueryDescriptor, ScalarType, SortSpec, WidgetSettings,
};

use crate::capability::capability;

/// Page size used when the settings document does not carry one.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Compile a widget's settings against the flattened field list of its type.
#[instrument(skip(settings, fields), fields(type_name = %settings.type_name))]
pub fn compile(settings: &WidgetSettings, fields: &[FieldDescriptor]) -> QueryDescriptor {
    let selection: Vec<FieldDescriptor> = settings
        .fields
        .iter()
        .filter_map(|name| {
            let found = FieldDescriptor::find(fields, name);
            if found.is_none() {
                debug!(field = %name, "dropping unknown selected field");
            }
            found.cloned()
        })
        .collect();

    let filter = settings
        .filter
        .as_ref()
        .and_then(|node| prune_filter(node, fields));

    let sort: Vec<SortSpec> = settings
        .sort
        .iter()
        .filter(|spec| {
            let known = FieldDescriptor::find(fields, &spec.field).is_some();
            if !known {
                debug!(field = %spec.field, "dropping sort on unknown field");
            }
            known
        })
        .cloned()
        .collect();

    QueryDescriptor {
        type_name: settings.type_name.clone(),
        selection,
        filter,
        sort,
        page_size: settings.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        after_cursor: None,
    }
}

/// Prune a filter tree: invalid leaves are dropped, composite logic is
/// preserved, and groups left empty collapse away entirely.
fn prune_filter(node: &FilterNode, fields: &[FieldDescriptor]) -> Option<FilterNode> {
    match node {
        FilterNode::Group { logic, filters } => {
            let kept: Vec<FilterNode> = filters
                .iter()
                .filter_map(|child| prune_filter(child, fields))
                .collect();
            if kept.is_empty() {
                None
            } else {
                Some(FilterNode::Group {
                    logic: *logic,
                    filters: kept,
                })
            }
        }
        FilterNode::Leaf {
            field,
            operator,
            value,
        } => {
            let Some(descriptor) = FieldDescriptor::find(fields, field) else {
                debug!(field = %field, "dropping filter on unknown field");
                return None;
            };
            let Some(kind) = descriptor.editor_kind() else {
                debug!(field = %field, "dropping filter on non-scalar field");
                return None;
            };
            if !capability(kind).operators.contains(operator) {
                debug!(field = %field, operator = ?operator, "dropping filter with operator outside capability set");
                return None;
            }
            if !value_is_plausible(descriptor, *operator, value) {
                debug!(field = %field, "dropping filter with unparseable value");
                return None;
            }
            Some(node.clone())
        }
    }
}

/// Local datetime forms accepted on filter leaves alongside RFC 3339: the
/// display format with and without seconds, and the `T`-separated forms that
/// `datetime-local` inputs emit.
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
];

/// Light structural check of a leaf's value against the field's scalar type.
/// Temporal values must parse with the field's display format, RFC 3339 or a
/// local `T`-separated form; everything else is left to the backend.
fn value_is_plausible(
    descriptor: &FieldDescriptor,
    operator: Operator,
    value: &serde_json::Value,
) -> bool {
    if !operator.takes_value() {
        return true;
    }
    let Some(text) = value.as_str() else {
        return true;
    };
    match descriptor.scalar_type() {
        Some(ScalarType::Date) => {
            chrono::NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok()
                || chrono::DateTime::parse_from_rfc3339(text).is_ok()
        }
        Some(ScalarType::DateTime) => {
            chrono::DateTime::parse_from_rfc3339(text).is_ok()
                || DATETIME_FORMATS
                    .iter()
                    .any(|f| chrono::NaiveDateTime::parse_from_str(text, f).is_ok())
                || chrono::NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok()
        }
        Some(ScalarType::Time) => {
            chrono::NaiveTime::parse_from_str(text, "%H:%M").is_ok()
                || chrono::NaiveTime::parse_from_str(text, "%H:%M:%S").is_ok()
        }
        _ => true,
    }
}
