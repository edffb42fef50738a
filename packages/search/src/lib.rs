#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Search-box session state.
//!
//! [`SearchSession`] turns keystrokes into a result list with at most one
//! search reflected in the UI at a time. It owns no timers and performs no
//! I/O: every transition returns what the caller should schedule next.
//!
//! * A keystroke returns a [`DebounceTicket`]. The caller sleeps for the
//!   debounce window and hands the ticket back via
//!   [`SearchSession::on_timer_fired`]. Only the most recent ticket is
//!   honored, so a burst of keystrokes yields one search.
//! * A honored ticket returns a [`SearchRequest`] tagged with a monotonic
//!   id. Results are applied only if they answer the latest request, so a
//!   slow response cannot overwrite a newer one.

use std::time::Duration;

use placemap_geocoder_models::SearchResult;

/// Quiet period after the last keystroke before a search is issued.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(500);

/// Identifies one scheduled debounce timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceTicket {
    /// Monotonic timer generation.
    pub generation: u64,
}

/// A search the caller should send to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Monotonic request id; echo it back with the results.
    pub request_id: u64,
    /// Trimmed query text.
    pub query: String,
}

/// Outcome of a query text change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryUpdate {
    /// The query is blank: results were cleared and no search will run.
    Cleared,
    /// Start (or restart) the debounce timer for this ticket.
    Debounce(DebounceTicket),
}

/// State of a single search box.
#[derive(Debug, Default)]
pub struct SearchSession {
    query: String,
    results: Vec<SearchResult>,
    is_searching: bool,
    last_generation: u64,
    pending_timer: Option<u64>,
    last_request_id: u64,
    in_flight: Option<u64>,
}

impl SearchSession {
    /// Creates an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current query text as typed.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Current results in provider order.
    #[must_use]
    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    /// Whether the latest issued search has not resolved yet.
    #[must_use]
    pub const fn is_searching(&self) -> bool {
        self.is_searching
    }

    /// The debounce timer that is allowed to fire, if any.
    #[must_use]
    pub fn pending_timer(&self) -> Option<DebounceTicket> {
        self.pending_timer
            .map(|generation| DebounceTicket { generation })
    }

    /// Records new query text.
    ///
    /// Blank text clears the results, cancels the pending timer, and
    /// detaches any in-flight search. Otherwise a fresh ticket supersedes
    /// the previous one.
    pub fn on_text_change(&mut self, text: &str) -> QueryUpdate {
        self.query = text.to_string();

        if text.trim().is_empty() {
            log::debug!("Search query cleared");
            self.reset_results();
            return QueryUpdate::Cleared;
        }

        self.last_generation += 1;
        self.pending_timer = Some(self.last_generation);
        QueryUpdate::Debounce(DebounceTicket {
            generation: self.last_generation,
        })
    }

    /// Handles an elapsed debounce timer.
    ///
    /// Returns the request to issue when `ticket` is still the pending
    /// one; a superseded ticket returns `None`.
    pub fn on_timer_fired(&mut self, ticket: DebounceTicket) -> Option<SearchRequest> {
        if self.pending_timer != Some(ticket.generation) {
            log::debug!(
                "Ignoring superseded debounce timer {} (pending: {:?})",
                ticket.generation,
                self.pending_timer
            );
            return None;
        }
        self.pending_timer = None;

        let query = self.query.trim();
        if query.is_empty() {
            return None;
        }

        self.last_request_id += 1;
        self.in_flight = Some(self.last_request_id);
        self.is_searching = true;

        log::debug!("Issuing search {} for {query:?}", self.last_request_id);

        Some(SearchRequest {
            request_id: self.last_request_id,
            query: query.to_string(),
        })
    }

    /// Applies provider results for `request_id`.
    ///
    /// Returns `false` (and changes nothing) when the response is stale:
    /// a newer request was issued, or the session was cleared or a result
    /// selected since.
    pub fn on_results(&mut self, request_id: u64, results: Vec<SearchResult>) -> bool {
        if self.in_flight != Some(request_id) {
            log::debug!(
                "Discarding stale search response {request_id} (latest: {:?})",
                self.in_flight
            );
            return false;
        }

        self.results = results;
        self.in_flight = None;
        self.is_searching = false;
        true
    }

    /// Applies a failed search as an empty result list.
    ///
    /// Provider failures never reach the UI; the box simply shows nothing.
    pub fn on_search_failed(&mut self, request_id: u64, error: &dyn std::fmt::Display) -> bool {
        log::warn!("Search {request_id} failed: {error}");
        self.on_results(request_id, Vec::new())
    }

    /// Selects `result`: the list is cleared and the query reflects the
    /// choice. Returns the result for the caller to act on.
    pub fn select(&mut self, result: SearchResult) -> SearchResult {
        self.reset_results();
        self.query.clone_from(&result.display_name);
        result
    }

    /// Selects the result at `index` in the current list.
    pub fn select_index(&mut self, index: usize) -> Option<SearchResult> {
        let result = self.results.get(index).cloned()?;
        Some(self.select(result))
    }

    /// Clears the query and results, cancelling the pending timer.
    pub fn clear(&mut self) {
        self.query.clear();
        self.reset_results();
    }

    fn reset_results(&mut self) {
        self.results.clear();
        self.pending_timer = None;
        self.in_flight = None;
        self.is_searching = false;
    }
}
