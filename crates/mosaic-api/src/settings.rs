//! Widget settings: the JSON-shaped configuration document.
//!
//! Settings are produced by the UI layer and are untrusted relative to the
//! current schema: they may name fields that no longer exist or operators
//! that stopped being valid after a type changed upstream. The compiler
//! handles that fail-soft; only input that is not a settings document at all
//! is a hard error here.

use serde::{Deserialize, Serialize};

use crate::filter::FilterNode;
use crate::pipeline::PipelineStage;
use crate::query::SortSpec;

/// Declarative configuration of one widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetSettings {
    /// Schema type the widget reads from.
    pub type_name: String,
    /// Selected field names (dotted paths into the flattened type).
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub filter: Option<FilterNode>,
    #[serde(default)]
    pub sort: Vec<SortSpec>,
    #[serde(default)]
    pub page_size: Option<u32>,
    /// Present only on aggregated widgets.
    #[serde(default)]
    pub aggregation: Option<AggregationSettings>,
}

/// Aggregation part of a widget's settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationSettings {
    /// Fields fed into the pipeline; empty means every aggregatable field of
    /// the flattened type.
    #[serde(default)]
    pub source_fields: Vec<String>,
    #[serde(default)]
    pub pipeline: Vec<PipelineStage>,
}

impl WidgetSettings {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
            filter: None,
            sort: Vec::new(),
            page_size: None,
            aggregation: None,
        }
    }

    pub fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_filter(mut self, filter: FilterNode) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_sort(mut self, sort: Vec<SortSpec>) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_aggregation(mut self, aggregation: AggregationSettings) -> Self {
        self.aggregation = Some(aggregation);
        self
    }

    /// Parse a settings document. Unknown members are ignored; only
    /// structurally invalid JSON fails.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn is_aggregated(&self) -> bool {
        self.aggregation.is_some()
    }
}

/// Hard errors on the settings boundary.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("malformed widget settings: {0}")]
    Malformed(#[from] serde_json::Error),
}
