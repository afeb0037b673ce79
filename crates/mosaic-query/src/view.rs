//! View facade: everything a widget needs, compiled in one call.
//!
//! Wires the catalog, flattener, compiler and projection engine together:
//! settings + type name → flattened field list → query descriptor (raw
//! widgets) or projected field set (aggregated widgets), plus per-field
//! capability metadata for the UI's field pickers and editors.

use tracing::{debug, instrument};

use mosaic_api::{FieldDescriptor, QueryDescriptor, WidgetSettings};

use crate::capability::{capability, FieldCapability};
use crate::catalog::TypeCatalog;
use crate::compile::compile;
use crate::project::{fields_after, ProjectionWarning};

/// A display field paired with its UI capabilities. `capability` is `None`
/// for object/list containers, which have no scalar editor.
#[derive(Debug, Clone)]
pub struct FieldView {
    pub field: FieldDescriptor,
    pub capability: Option<&'static FieldCapability>,
}

impl FieldView {
    fn new(field: FieldDescriptor) -> Self {
        let capability = field.editor_kind().map(capability);
        Self { field, capability }
    }
}

/// Compiled view of one widget: what to ask for and what the answer will
/// look like.
#[derive(Debug, Clone)]
pub struct ViewPlan {
    /// Flattened selectable fields of the widget's type, for field pickers.
    pub available_fields: Vec<FieldDescriptor>,
    /// Fields that will actually exist in the widget's output: the
    /// selection for raw widgets, the post-pipeline set for aggregated ones.
    pub display_fields: Vec<FieldView>,
    /// Descriptor for the external executor.
    pub descriptor: QueryDescriptor,
    /// Advisory projection warnings (aggregated widgets only).
    pub warnings: Vec<ProjectionWarning>,
}

/// Build the view plan for a widget.
#[instrument(skip(catalog, settings), fields(type_name = %settings.type_name))]
pub fn build_view(catalog: &TypeCatalog, settings: &WidgetSettings) -> ViewPlan {
    let available = catalog.flattened(&settings.type_name);

    match &settings.aggregation {
        None => {
            let descriptor = compile(settings, &available);
            let display_fields = descriptor
                .selection
                .iter()
                .cloned()
                .map(FieldView::new)
                .collect();
            ViewPlan {
                available_fields: available.to_vec(),
                display_fields,
                descriptor,
                warnings: Vec::new(),
            }
        }
        Some(aggregation) => {
            // The backing query selects the pipeline's source fields; the
            // pipeline then reshapes them into the display field set.
            let source_fields: Vec<FieldDescriptor> = if aggregation.source_fields.is_empty() {
                available
                    .iter()
                    .filter(|f| f.aggregatable)
                    .cloned()
                    .collect()
            } else {
                aggregation
                    .source_fields
                    .iter()
                    .filter_map(|name| {
                        let found = FieldDescriptor::find(&available, name);
                        if found.is_none() {
                            debug!(field = %name, "dropping unknown aggregation source field");
                        }
                        found.cloned()
                    })
                    .collect()
            };

            let mut backing = settings.clone();
            backing.fields = source_fields.iter().map(|f| f.name.clone()).collect();
            let descriptor = compile(&backing, &available);

            let projection = fields_after(&source_fields, &aggregation.pipeline);
            let display_fields = projection
                .fields
                .into_iter()
                .map(FieldView::new)
                .collect();

            ViewPlan {
                available_fields: available.to_vec(),
                display_fields,
                descriptor,
                warnings: projection.warnings,
            }
        }
    }
}
