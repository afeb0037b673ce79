//! Dynamic query/view compiler for mosaic dashboards.
//!
//! Turns a live, introspectable type schema plus a declarative widget
//! configuration into three things:
//! 1. an executable [`QueryDescriptor`](mosaic_api::QueryDescriptor),
//! 2. the exact field set available for display after any aggregation
//!    pipeline runs, and
//! 3. per-field UI capability metadata (editor kind, comparison operators,
//!    display format).
//!
//! The compiler never executes a query. It only determines what to ask for
//! and what the answer will look like; executing the descriptor is the
//! external executor's job (see `mosaic-data`).
//!
//! # Modules
//! - [`catalog`]: injected schema source + per-type descriptor cache
//! - [`capability`]: static editor-kind → operator/editor/format table
//! - [`flatten`]: recursive schema flattening with cycle guard
//! - [`compile`]: settings + flattened fields → `QueryDescriptor`
//! - [`project`]: forward dataflow pass over pipeline stages
//! - [`view`]: one-call facade wiring the above together for a widget

pub mod capability;
pub mod catalog;
pub mod compile;
pub mod flatten;
pub mod project;
pub mod view;

pub use capability::{capability, CellEditor, ClientFilterKind, FieldCapability};
pub use catalog::{SchemaSnapshot, SchemaSource, TypeCatalog};
pub use compile::{compile, DEFAULT_PAGE_SIZE};
pub use flatten::{flatten_fields, flatten_type, is_relation_reference, MAX_FLATTEN_DEPTH};
pub use project::{fields_after, Projection, ProjectionWarning};
pub use view::{build_view, FieldView, ViewPlan};
