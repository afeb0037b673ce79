//! Compiled query descriptors.
//!
//! A `QueryDescriptor` is the output of the compiler and the input of the
//! external query executor. It is immutable once produced: settings changes
//! produce a new descriptor rather than mutating the old one.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::filter::FilterNode;
use crate::schema::FieldDescriptor;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Asc
    }
}

/// One sort term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    #[serde(default)]
    pub order: SortOrder,
}

impl SortSpec {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Desc,
        }
    }
}

/// Executable query description for one widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryDescriptor {
    pub type_name: String,
    pub selection: Vec<FieldDescriptor>,
    #[serde(default)]
    pub filter: Option<FilterNode>,
    #[serde(default)]
    pub sort: Vec<SortSpec>,
    pub page_size: u32,
    #[serde(default)]
    pub after_cursor: Option<String>,
}

impl QueryDescriptor {
    /// Stable identity stamp over the parts that define result-set membership
    /// and order: type name, filter and sort. Selection, page size and cursor
    /// are excluded: changing them does not make the query semantically new,
    /// so an existing result window stays valid.
    ///
    /// Compiling identical settings twice yields equal descriptors and equal
    /// stamps; there is no hidden counter or timestamp. The stamp is carried
    /// alongside in-flight page requests so a response for a superseded
    /// descriptor can be detected and discarded.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.type_name.hash(&mut hasher);
        if let Some(filter) = &self.filter {
            // FilterNode carries arbitrary JSON values, so hash its canonical
            // serialized form instead of requiring Hash on the value type.
            serde_json::to_string(filter)
                .unwrap_or_default()
                .hash(&mut hasher);
        }
        self.sort.hash(&mut hasher);
        hasher.finish()
    }

    /// New descriptor positioned after the given cursor.
    pub fn after(&self, cursor: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.after_cursor = Some(cursor.into());
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Operator;
    use crate::schema::{FieldDescriptor, ScalarType};
    use serde_json::json;

    fn descriptor() -> QueryDescriptor {
        QueryDescriptor {
            type_name: "Task".to_string(),
            selection: vec![FieldDescriptor::scalar("title", ScalarType::Text)],
            filter: Some(FilterNode::leaf("title", Operator::Contains, json!("a"))),
            sort: vec![SortSpec::desc("title")],
            page_size: 25,
            after_cursor: None,
        }
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let d = descriptor();
        assert_eq!(d.fingerprint(), d.fingerprint());
        assert_eq!(d.fingerprint(), d.clone().fingerprint());
    }

    #[test]
    fn test_fingerprint_ignores_pagination_and_selection() {
        let d = descriptor();
        let mut paged = d.after("cursor-1");
        paged.page_size = 100;
        paged.selection.clear();
        assert_eq!(d.fingerprint(), paged.fingerprint());
    }

    #[test]
    fn test_fingerprint_changes_with_filter_and_sort() {
        let d = descriptor();

        let mut refiltered = d.clone();
        refiltered.filter = Some(FilterNode::leaf("title", Operator::Eq, json!("b")));
        assert_ne!(d.fingerprint(), refiltered.fingerprint());

        let mut resorted = d.clone();
        resorted.sort = vec![SortSpec::asc("title")];
        assert_ne!(d.fingerprint(), resorted.fingerprint());
    }
}
