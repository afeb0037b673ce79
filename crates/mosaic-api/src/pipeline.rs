//! Aggregation pipeline stages.
//!
//! A widget's aggregation settings own an ordered list of stages. Stages are
//! value objects, never shared across widgets. Modeling the stage kinds as a
//! tagged union keeps the projection engine's match exhaustive, so adding a
//! stage kind is a compile-time-checked, localized change.

use serde::{Deserialize, Serialize};

use crate::filter::FilterNode;
use crate::query::SortSpec;
use crate::schema::ScalarType;

/// One stage of an aggregation pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum PipelineStage {
    /// Group rows by key fields; the output field set becomes exactly the
    /// keys plus the accumulator outputs.
    Group {
        keys: Vec<String>,
        #[serde(default)]
        accumulators: Vec<Accumulator>,
    },
    /// Unnest a list field: its element fields replace it in the field set.
    Unwind { field: String },
    /// Add computed fields by name without removing existing ones.
    AddFields { fields: Vec<ComputedField> },
    /// Order rows; field-set-neutral.
    Sort { sort: Vec<SortSpec> },
    /// Constrain rows; field-set-neutral.
    Filter { filter: FilterNode },
    /// Backend-specific stage the compiler does not understand. Field-set
    /// neutral, but flagged so callers can warn that downstream field
    /// availability may be inaccurate.
    Custom {
        name: String,
        #[serde(default)]
        params: serde_json::Value,
    },
}

/// Accumulator expression inside a `group` stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Accumulator {
    /// Output field name this accumulator produces.
    pub name: String,
    pub function: AccumulatorFn,
    /// Field the accumulator reads from; `count` needs none.
    #[serde(default)]
    pub source_field: Option<String>,
    /// Declared output type; inferred from the function when absent.
    #[serde(default)]
    pub output_type: Option<ScalarType>,
}

impl Accumulator {
    pub fn count(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            function: AccumulatorFn::Count,
            source_field: None,
            output_type: None,
        }
    }

    pub fn sum(name: impl Into<String>, source_field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            function: AccumulatorFn::Sum,
            source_field: Some(source_field.into()),
            output_type: None,
        }
    }
}

/// Aggregation function of an accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccumulatorFn {
    Count,
    Sum,
    Avg,
    Min,
    Max,
    First,
    Last,
}

/// Computed field declared by an `add_fields` stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputedField {
    /// Output field name.
    pub name: String,
    /// Backend expression; opaque to the compiler, which only tracks shape.
    #[serde(default)]
    pub expression: serde_json::Value,
    #[serde(default)]
    pub output_type: Option<ScalarType>,
}
