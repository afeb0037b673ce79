//! Staleness-aware fetch coordination for one widget's result window.
//!
//! Fetching is modeled as explicit request/response message passing rather
//! than subscriptions: `begin_fetch` hands out a `PageRequest` carrying the
//! current descriptor's fingerprint stamp, the caller executes it however it
//! likes, and `apply_response` merges the result only if the stamp still
//! matches. Switching the widget's filter/sort resets the window and makes
//! every outstanding request stale, so cancellation needs no teardown
//! choreography: stale responses are simply discarded on arrival.

use tracing::{debug, warn};

use mosaic_api::{PageWindow, QueryDescriptor};

use crate::executor::{FetchError, QueryExecutor, Row};
use crate::merge::{merge_page, Identify};

/// One page request handed to the executor. Carries the descriptor stamp it
/// was issued under.
#[derive(Debug, Clone)]
pub struct PageRequest {
    pub descriptor: QueryDescriptor,
    pub after_cursor: Option<String>,
    pub stamp: u64,
}

/// A fetched page, tagged with the stamp of the request that produced it.
#[derive(Debug, Clone)]
pub struct PageResponse<T> {
    pub stamp: u64,
    pub page: PageWindow<T>,
}

/// Result of offering a response to the window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The page was merged; `appended` nodes were new.
    Merged { appended: usize },
    /// The response was issued under a superseded descriptor and discarded.
    StaleDiscarded,
    /// Nothing to do: a fetch is already in flight or no page remains.
    Skipped,
}

/// One widget's paginated result window and fetch state.
///
/// The window owns its descriptor; settings changes arrive as a freshly
/// compiled descriptor via [`set_descriptor`](WidgetWindow::set_descriptor).
/// Node ordering is stable and append-only for the life of one descriptor
/// identity.
#[derive(Debug)]
pub struct WidgetWindow<T> {
    descriptor: QueryDescriptor,
    stamp: u64,
    window: PageWindow<T>,
    /// Stamp of the single outstanding request, if any. At most one fetch is
    /// in flight per window, so rapid scroll events cannot duplicate pages.
    in_flight: Option<u64>,
    /// False until the first page for the current descriptor has landed;
    /// before that, `has_next_page` of the empty window is meaningless.
    fetched_any: bool,
}

impl<T: Identify + Clone> WidgetWindow<T> {
    pub fn new(descriptor: QueryDescriptor) -> Self {
        let stamp = descriptor.fingerprint();
        Self {
            descriptor,
            stamp,
            window: PageWindow::empty(),
            in_flight: None,
            fetched_any: false,
        }
    }

    pub fn descriptor(&self) -> &QueryDescriptor {
        &self.descriptor
    }

    pub fn stamp(&self) -> u64 {
        self.stamp
    }

    pub fn window(&self) -> &PageWindow<T> {
        &self.window
    }

    pub fn nodes(&self) -> &[T] {
        &self.window.nodes
    }

    /// Replace the descriptor after a settings change. When the semantic
    /// identity (type, filter, sort) changed, the window resets to empty and
    /// any in-flight fetch becomes stale; selection or page-size changes
    /// keep the fetched window.
    pub fn set_descriptor(&mut self, descriptor: QueryDescriptor) {
        let new_stamp = descriptor.fingerprint();
        if new_stamp != self.stamp {
            debug!(
                old_stamp = self.stamp,
                new_stamp, "semantically new query, resetting window"
            );
            self.window = PageWindow::empty();
            self.in_flight = None;
            self.fetched_any = false;
            self.stamp = new_stamp;
        }
        self.descriptor = descriptor;
    }

    /// True when another page can be requested.
    pub fn has_more(&self) -> bool {
        !self.fetched_any || self.window.has_next_page
    }

    /// Issue a page request, or `None` when a fetch is already in flight or
    /// no page remains.
    pub fn begin_fetch(&mut self) -> Option<PageRequest> {
        if self.in_flight.is_some() || !self.has_more() {
            return None;
        }
        self.in_flight = Some(self.stamp);
        Some(PageRequest {
            descriptor: self.descriptor.clone(),
            after_cursor: self.window.end_cursor.clone(),
            stamp: self.stamp,
        })
    }

    /// Offer a fetched page. Responses tagged with a superseded stamp are
    /// discarded without touching the window.
    pub fn apply_response(&mut self, response: PageResponse<T>) -> MergeOutcome {
        if response.stamp != self.stamp {
            warn!(
                response_stamp = response.stamp,
                current_stamp = self.stamp,
                "discarding stale page response"
            );
            return MergeOutcome::StaleDiscarded;
        }
        self.in_flight = None;
        self.fetched_any = true;

        let before = self.window.len();
        self.window = merge_page(&self.window, response.page, T::identity);
        MergeOutcome::Merged {
            appended: self.window.len() - before,
        }
    }

    /// Record a failed fetch: the in-flight slot is freed so the fetch can
    /// be retried, and the existing window is left untouched.
    pub fn apply_error(&mut self, stamp: u64, error: &FetchError) {
        if stamp == self.stamp {
            self.in_flight = None;
        }
        warn!(%error, stamp, "page fetch failed, window left untouched");
    }
}

impl WidgetWindow<Row> {
    /// Drive one fetch round against an executor: begin, execute, apply.
    /// Safe to call from scroll handlers: it does nothing while a fetch is
    /// outstanding or once the result set is exhausted.
    pub async fn fetch_more(
        &mut self,
        executor: &dyn QueryExecutor,
    ) -> Result<MergeOutcome, FetchError> {
        let Some(request) = self.begin_fetch() else {
            return Ok(MergeOutcome::Skipped);
        };
        match executor
            .fetch_page(&request.descriptor, request.after_cursor.as_deref())
            .await
        {
            Ok(page) => Ok(self.apply_response(PageResponse {
                stamp: request.stamp,
                page,
            })),
            Err(error) => {
                self.apply_error(request.stamp, &error);
                Err(error)
            }
        }
    }
}
