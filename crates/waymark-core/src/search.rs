// ── Address search state ──
//
// State machine behind the search box: debounced querying, stale-response
// discard, highlight movement and selection. No I/O happens here; callers
// arm timers and run lookups, then feed the outcomes back in.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::error::CoreError;
use crate::model::Suggestion;
use crate::sequence::{RequestKind, RequestSequencer, Ticket};

/// Outcome of the latest suggestion query, or `Pending` while one is in
/// flight.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SuggestionStatus {
    #[default]
    Idle,
    Pending,
    Ok,
    ZeroResults,
    Failed(String),
}

/// A lookup the caller should run now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionQuery {
    pub ticket: Ticket,
    pub input: String,
    pub session_token: String,
}

#[derive(Debug)]
pub struct AddressSearch {
    text: String,
    enabled: bool,
    /// Bumped on every edit; a debounce timer only fires for the latest.
    generation: u64,
    sequencer: RequestSequencer,
    suggestions: Arc<Vec<Suggestion>>,
    /// Status of the last applied response. Never `Pending`.
    response: SuggestionStatus,
    pending: bool,
    highlighted: Option<usize>,
    session_token: String,
}

impl Default for AddressSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl AddressSearch {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            enabled: false,
            generation: 0,
            sequencer: RequestSequencer::new(),
            suggestions: Arc::new(Vec::new()),
            response: SuggestionStatus::Idle,
            pending: false,
            highlighted: None,
            session_token: new_session_token(),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn status(&self) -> SuggestionStatus {
        if self.pending {
            SuggestionStatus::Pending
        } else {
            self.response.clone()
        }
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn session_token(&self) -> &str {
        &self.session_token
    }

    /// Rows to show. Empty unless the latest response was `OK`; the
    /// previous rows stay up while a newer query is in flight.
    pub fn visible_suggestions(&self) -> &[Suggestion] {
        if self.response == SuggestionStatus::Ok {
            &self.suggestions
        } else {
            &[]
        }
    }

    // ── Input ────────────────────────────────────────────────────────

    /// The box accepts input only once the provider is ready.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Record an edit. Returns the generation to arm a debounce timer
    /// for, or `None` when nothing should be queried.
    pub fn on_input(&mut self, text: &str) -> Option<u64> {
        if !self.enabled || text == self.text {
            return None;
        }
        self.text = text.to_owned();
        self.generation += 1;

        if self.text.is_empty() {
            self.sequencer.invalidate(RequestKind::Suggestions);
            self.clear_list();
            return None;
        }
        Some(self.generation)
    }

    /// A debounce timer fired. Returns the query to run if `generation`
    /// is still the latest edit.
    pub fn debounce_elapsed(&mut self, generation: u64) -> Option<SuggestionQuery> {
        if !self.enabled || generation != self.generation || self.text.is_empty() {
            return None;
        }
        let ticket = self.sequencer.issue(RequestKind::Suggestions);
        self.pending = true;
        debug!(input = %self.text, seq = ticket.seq(), "suggestion query");
        Some(SuggestionQuery {
            ticket,
            input: self.text.clone(),
            session_token: self.session_token.clone(),
        })
    }

    /// Apply a lookup result. Returns `false` if it was stale and dropped.
    pub fn apply(
        &mut self,
        ticket: Ticket,
        result: Result<Arc<Vec<Suggestion>>, CoreError>,
    ) -> bool {
        if !self.sequencer.is_current(ticket) {
            debug!(seq = ticket.seq(), "dropping stale suggestions");
            return false;
        }
        self.pending = false;
        match result {
            Ok(items) if items.is_empty() => {
                self.suggestions = items;
                self.response = SuggestionStatus::ZeroResults;
                self.highlighted = None;
            }
            Ok(items) => {
                self.suggestions = items;
                self.response = SuggestionStatus::Ok;
                self.highlighted = Some(0);
            }
            Err(e) => {
                self.suggestions = Arc::new(Vec::new());
                self.response = SuggestionStatus::Failed(e.to_string());
                self.highlighted = None;
            }
        }
        true
    }

    // ── List navigation ──────────────────────────────────────────────

    pub fn highlight_next(&mut self) {
        let len = self.visible_suggestions().len();
        if len == 0 {
            return;
        }
        self.highlighted = Some(self.highlighted.map_or(0, |i| (i + 1) % len));
    }

    pub fn highlight_prev(&mut self) {
        let len = self.visible_suggestions().len();
        if len == 0 {
            return;
        }
        self.highlighted = Some(self.highlighted.map_or(len - 1, |i| (i + len - 1) % len));
    }

    /// Select the highlighted row.
    pub fn select_highlighted(&mut self) -> Option<String> {
        self.select(self.highlighted?)
    }

    /// Select row `index`. The text becomes the row's description, the list
    /// closes, pending work is invalidated and a new session begins.
    /// Returns the description for the selection callback.
    pub fn select(&mut self, index: usize) -> Option<String> {
        let description = self.visible_suggestions().get(index)?.description.clone();

        self.text.clone_from(&description);
        self.generation += 1;
        self.sequencer.invalidate(RequestKind::Suggestions);
        self.clear_list();
        self.session_token = new_session_token();

        debug!(%description, "suggestion selected");
        Some(description)
    }

    /// Close the list without selecting. Pending work is dropped.
    pub fn dismiss(&mut self) {
        self.generation += 1;
        self.sequencer.invalidate(RequestKind::Suggestions);
        self.clear_list();
    }

    fn clear_list(&mut self) {
        self.suggestions = Arc::new(Vec::new());
        self.response = SuggestionStatus::Idle;
        self.pending = false;
        self.highlighted = None;
    }
}

fn new_session_token() -> String {
    Uuid::new_v4().to_string()
}
