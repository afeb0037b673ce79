//! Pagination runtime for mosaic widgets.
//!
//! The compiler side (`mosaic-query`) is synchronous and pure; this crate
//! owns the one asynchronous boundary of the system: executing a compiled
//! [`QueryDescriptor`](mosaic_api::QueryDescriptor) against the external
//! query executor and merging the pages that come back, possibly long after
//! the widget's settings have moved on.
//!
//! Staleness is explicit: every page request carries the descriptor's
//! fingerprint stamp, and a response whose stamp no longer matches the
//! widget's current descriptor is discarded instead of merged.

pub mod executor;
pub mod merge;
pub mod window;

pub use executor::{FetchError, QueryExecutor, Row};
pub use merge::{merge_page, Identify};
pub use window::{MergeOutcome, PageRequest, PageResponse, WidgetWindow};
