//! Shared data model for the mosaic dashboard compiler.
//!
//! This crate holds the pure, serde-serializable types exchanged between the
//! widget settings layer, the query/view compiler and the pagination runtime:
//! - `FieldDescriptor`: normalized view of one schema type's fields
//! - `FilterNode`, `SortSpec`: the declarative filter/sort model
//! - `QueryDescriptor`: the compiled, immutable query description
//! - `PipelineStage`: aggregation pipeline stages as a tagged union
//! - `WidgetSettings`: the JSON-shaped widget configuration document
//! - `PageWindow`: one widget's fetched result window
//!
//! No behavior lives here beyond constructors, accessors and traversal
//! helpers; compilation and merging live in `mosaic-query` and `mosaic-data`.

pub mod filter;
pub mod page;
pub mod pipeline;
pub mod query;
pub mod schema;
pub mod settings;

pub use filter::{FilterLogic, FilterNode, Operator, ALL_OPERATORS};
pub use page::PageWindow;
pub use pipeline::{Accumulator, AccumulatorFn, ComputedField, PipelineStage};
pub use query::{QueryDescriptor, SortOrder, SortSpec};
pub use schema::{EditorKind, FieldDescriptor, FieldKind, ScalarType};
pub use settings::{AggregationSettings, SettingsError, WidgetSettings};
