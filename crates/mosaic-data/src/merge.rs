//! Cursor pagination merger.

use std::collections::HashSet;
use std::hash::Hash;

use mosaic_api::PageWindow;

/// Merge a newly fetched page into an existing window.
///
/// Incoming nodes are appended in order, skipping any node whose identity key
/// already appears in the window, which de-duplicates against
/// overlapping pages caused by concurrent mutation on the backend between
/// fetches. `end_cursor` and `has_next_page` are taken from the incoming
/// page. Re-delivering an already-merged page leaves the node list unchanged.
pub fn merge_page<T, K, F>(existing: &PageWindow<T>, incoming: PageWindow<T>, key_of: F) -> PageWindow<T>
where
    T: Clone,
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen: HashSet<K> = existing.nodes.iter().map(&key_of).collect();
    let mut nodes = existing.nodes.clone();
    for node in incoming.nodes {
        if seen.insert(key_of(&node)) {
            nodes.push(node);
        }
    }
    PageWindow {
        nodes,
        end_cursor: incoming.end_cursor,
        has_next_page: incoming.has_next_page,
    }
}

/// Identity key of a fetched node, used for de-duplication across pages.
pub trait Identify {
    fn identity(&self) -> String;
}

impl Identify for serde_json::Value {
    /// Rows are identified by their `id` member; a row without one falls
    /// back to its full serialized form, which de-duplicates exact repeats
    /// without ever conflating distinct rows.
    fn identity(&self) -> String {
        match self.get("id") {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => self.to_string(),
        }
    }
}
