//! Aggregation projection engine.
//!
//! A forward dataflow pass over the pipeline stages: starting from the
//! source field set, each stage transforms the running set of fields the
//! same way the executed aggregation would, with zero backend round trips.
//! The UI uses the result to populate "available fields" pickers before
//! anything runs.
//!
//! Only field shape is tracked, never row count: `unwind` changes
//! cardinality but here it only swaps a list field for its element fields.

use indexmap::IndexMap;
use tracing::{instrument, warn};

use mosaic_api::{Accumulator, AccumulatorFn, FieldDescriptor, PipelineStage, ScalarType};

/// Field set surviving a pipeline, plus advisory warnings about stages whose
/// effect on field availability could not be determined exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub fields: Vec<FieldDescriptor>,
    pub warnings: Vec<ProjectionWarning>,
}

impl Projection {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

/// Advisory conditions met while projecting. None of these is fatal; the
/// pipeline stays field-set-neutral at the flagged stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectionWarning {
    /// A `custom` stage passed through; downstream field availability may be
    /// inaccurate.
    UnrecognizedStage { name: String },
    /// `unwind` targeted a field that is not list-kind; treated as a no-op.
    UnwindNotAList { field: String },
    /// `unwind` targeted a field absent from the running set.
    UnwindUnknownField { field: String },
}

/// Compute the field set available after the pipeline runs.
///
/// An empty pipeline returns `source_fields` unchanged.
#[instrument(skip(source_fields, pipeline), fields(stages = pipeline.len()))]
pub fn fields_after(
    source_fields: &[FieldDescriptor],
    pipeline: &[PipelineStage],
) -> Projection {
    let mut running: IndexMap<String, FieldDescriptor> = source_fields
        .iter()
        .map(|f| (f.name.clone(), f.clone()))
        .collect();
    let mut warnings = Vec::new();

    for stage in pipeline {
        match stage {
            PipelineStage::Group { keys, accumulators } => {
                // Grouping is lossy by design: provenance before the stage is
                // discarded and the output is exactly keys + accumulators.
                let mut grouped = IndexMap::new();
                for key in keys {
                    let field = running
                        .get(key)
                        .cloned()
                        .unwrap_or_else(|| FieldDescriptor::scalar(key.clone(), ScalarType::Text));
                    grouped.insert(field.name.clone(), field);
                }
                for acc in accumulators {
                    let field =
                        FieldDescriptor::scalar(acc.name.clone(), accumulator_type(acc, &running));
                    grouped.insert(field.name.clone(), field);
                }
                running = grouped;
            }
            PipelineStage::Unwind { field } => match running.get(field).map(|f| f.is_list()) {
                Some(true) => {
                    let Some(unwound) = running.shift_remove(field) else {
                        continue;
                    };
                    for element in unwound.sub_fields {
                        let mut merged = element;
                        merged.name = format!("{}.{}", field, merged.name);
                        merged.source_path = merged.name.clone();
                        // One-to-many became one-to-one.
                        merged.aggregatable = true;
                        running.insert(merged.name.clone(), merged);
                    }
                }
                Some(false) => {
                    warn!(field = %field, "unwind on non-list field, passing through");
                    warnings.push(ProjectionWarning::UnwindNotAList {
                        field: field.clone(),
                    });
                }
                None => {
                    warn!(field = %field, "unwind on unknown field, passing through");
                    warnings.push(ProjectionWarning::UnwindUnknownField {
                        field: field.clone(),
                    });
                }
            },
            PipelineStage::AddFields { fields } => {
                for computed in fields {
                    let scalar_type = computed.output_type.unwrap_or(ScalarType::Text);
                    let field = FieldDescriptor::scalar(computed.name.clone(), scalar_type);
                    running.insert(field.name.clone(), field);
                }
            }
            // Row-level stages never change the field set.
            PipelineStage::Sort { .. } | PipelineStage::Filter { .. } => {}
            PipelineStage::Custom { name, .. } => {
                warn!(stage = %name, "unrecognized pipeline stage, field availability may be inaccurate");
                warnings.push(ProjectionWarning::UnrecognizedStage { name: name.clone() });
            }
        }
    }

    Projection {
        fields: running.into_values().collect(),
        warnings,
    }
}

/// Output type of an accumulator: the declared type wins; otherwise counting
/// and arithmetic accumulators are numeric and picking accumulators inherit
/// the source field's type.
fn accumulator_type(
    acc: &Accumulator,
    running: &IndexMap<String, FieldDescriptor>,
) -> ScalarType {
    if let Some(declared) = acc.output_type {
        return declared;
    }
    match acc.function {
        AccumulatorFn::Count | AccumulatorFn::Sum | AccumulatorFn::Avg => ScalarType::Float,
        AccumulatorFn::Min | AccumulatorFn::Max | AccumulatorFn::First | AccumulatorFn::Last => {
            acc.source_field
                .as_deref()
                .and_then(|f| running.get(f))
                .and_then(FieldDescriptor::scalar_type)
                .unwrap_or(ScalarType::Text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mosaic_api::{ComputedField, SortSpec};

    fn source() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::scalar("country", ScalarType::Text),
            FieldDescriptor::scalar("amount", ScalarType::Float),
            FieldDescriptor::scalar("date", ScalarType::Date),
        ]
    }

    #[test]
    fn test_empty_pipeline_is_identity() {
        let fields = source();
        let projection = fields_after(&fields, &[]);
        assert_eq!(projection.fields, fields);
        assert!(!projection.has_warnings());
    }

    #[test]
    fn test_group_is_lossy_by_design() {
        let projection = fields_after(
            &source(),
            &[PipelineStage::Group {
                keys: vec!["country".to_string()],
                accumulators: vec![Accumulator::sum("total", "amount")],
            }],
        );
        assert_eq!(projection.field_names(), vec!["country", "total"]);

        // Key type is carried from the running set; accumulator is numeric.
        assert_eq!(projection.fields[0].scalar_type(), Some(ScalarType::Text));
        assert_eq!(projection.fields[1].scalar_type(), Some(ScalarType::Float));
    }

    #[test]
    fn test_group_then_add_fields_scenario() {
        let projection = fields_after(
            &source(),
            &[
                PipelineStage::Group {
                    keys: vec!["country".to_string()],
                    accumulators: vec![],
                },
                PipelineStage::AddFields {
                    fields: vec![ComputedField {
                        name: "total".to_string(),
                        expression: serde_json::json!({"sum": "amount"}),
                        output_type: Some(ScalarType::Float),
                    }],
                },
            ],
        );
        // date is dropped by the lossy group stage; total is added after.
        assert_eq!(projection.field_names(), vec!["country", "total"]);
    }

    #[test]
    fn test_group_with_unknown_key_defaults_to_generic_scalar() {
        let projection = fields_after(
            &source(),
            &[PipelineStage::Group {
                keys: vec!["bucket".to_string()],
                accumulators: vec![Accumulator::count("n")],
            }],
        );
        assert_eq!(projection.field_names(), vec!["bucket", "n"]);
        assert_eq!(projection.fields[0].scalar_type(), Some(ScalarType::Text));
    }

    #[test]
    fn test_min_accumulator_inherits_source_type() {
        let projection = fields_after(
            &source(),
            &[PipelineStage::Group {
                keys: vec![],
                accumulators: vec![Accumulator {
                    name: "earliest".to_string(),
                    function: AccumulatorFn::Min,
                    source_field: Some("date".to_string()),
                    output_type: None,
                }],
            }],
        );
        assert_eq!(projection.fields[0].scalar_type(), Some(ScalarType::Date));
    }

    #[test]
    fn test_add_fields_replaces_existing_name_in_place() {
        let projection = fields_after(
            &source(),
            &[PipelineStage::AddFields {
                fields: vec![ComputedField {
                    name: "amount".to_string(),
                    expression: serde_json::Value::Null,
                    output_type: Some(ScalarType::Integer),
                }],
            }],
        );
        assert_eq!(projection.field_names(), vec!["country", "amount", "date"]);
        assert_eq!(projection.fields[1].scalar_type(), Some(ScalarType::Integer));
    }

    #[test]
    fn test_unwind_replaces_list_with_element_fields() {
        let items = FieldDescriptor::list("items", "LineItem").with_sub_fields(vec![
            FieldDescriptor::scalar("sku", ScalarType::Text),
            FieldDescriptor::scalar("price", ScalarType::Float),
        ]);
        let fields = vec![FieldDescriptor::scalar("country", ScalarType::Text), items];

        let projection = fields_after(
            &fields,
            &[PipelineStage::Unwind {
                field: "items".to_string(),
            }],
        );
        assert_eq!(
            projection.field_names(),
            vec!["country", "items.sku", "items.price"]
        );
        assert!(projection.fields.iter().all(|f| f.aggregatable));
        assert!(!projection.has_warnings());
    }

    #[test]
    fn test_unwind_on_non_list_is_advisory_no_op() {
        let fields = source();
        let projection = fields_after(
            &fields,
            &[PipelineStage::Unwind {
                field: "country".to_string(),
            }],
        );
        assert_eq!(projection.fields, fields);
        assert_eq!(
            projection.warnings,
            vec![ProjectionWarning::UnwindNotAList {
                field: "country".to_string()
            }]
        );
    }

    #[test]
    fn test_sort_and_filter_are_field_set_neutral() {
        let fields = source();
        let projection = fields_after(
            &fields,
            &[
                PipelineStage::Sort {
                    sort: vec![SortSpec::desc("amount")],
                },
                PipelineStage::Filter {
                    filter: mosaic_api::FilterNode::leaf(
                        "amount",
                        mosaic_api::Operator::Gt,
                        serde_json::json!(0),
                    ),
                },
            ],
        );
        assert_eq!(projection.fields, fields);
        assert!(!projection.has_warnings());
    }

    #[test]
    fn test_custom_stage_passes_through_with_flag() {
        let fields = source();
        let projection = fields_after(
            &fields,
            &[PipelineStage::Custom {
                name: "geo_near".to_string(),
                params: serde_json::Value::Null,
            }],
        );
        assert_eq!(projection.fields, fields);
        assert_eq!(
            projection.warnings,
            vec![ProjectionWarning::UnrecognizedStage {
                name: "geo_near".to_string()
            }]
        );
    }
}
