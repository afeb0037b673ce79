//! Result windows for cursor pagination.

use serde::{Deserialize, Serialize};

/// One widget's fetched window of an ordered edge list.
///
/// `nodes` ordering is stable and append-only within a widget's lifetime;
/// merging in a new page never reorders what was already fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageWindow<T> {
    pub nodes: Vec<T>,
    #[serde(default)]
    pub end_cursor: Option<String>,
    #[serde(default)]
    pub has_next_page: bool,
}

impl<T> PageWindow<T> {
    pub fn new(nodes: Vec<T>, end_cursor: Option<String>, has_next_page: bool) -> Self {
        Self {
            nodes,
            end_cursor,
            has_next_page,
        }
    }

    pub fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            end_cursor: None,
            has_next_page: false,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl<T> Default for PageWindow<T> {
    fn default() -> Self {
        Self::empty()
    }
}
