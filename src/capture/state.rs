use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::models::{CommentHistory, MIN_WORDS};
use crate::utils::text::word_count;

use super::exclusion::InsertedSuggestions;

/// Host-assigned identity of an editable field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(String);

impl FieldId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FieldId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for FieldId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One stretch of continuous editing on a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub id: String,
    pub field: FieldId,
    /// Latest trimmed text seen for the field
    pub text: String,
    /// History slot this session writes to, once it has committed
    pub sample_index: Option<usize>,
    /// Inserted suggestion currently sitting in the field. Re-evaluating the
    /// same text stays excluded until the user edits it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excluded: Option<String>,
}

impl SessionState {
    fn begin(field: FieldId) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            field,
            text: String::new(),
            sample_index: None,
            excluded: None,
        }
    }
}

/// What a text change did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// A capture should be evaluated once `generation` is still current after
    /// the debounce delay.
    Pending { generation: u64 },
    /// The field was emptied; the session is over and nothing is pending.
    SessionEnded,
}

/// Result of evaluating a stable snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureDecision {
    /// Text matched an inserted suggestion and was skipped.
    Excluded,
    /// Nothing to do: too short with no owned sample, stale field, or
    /// identical text.
    Ignored,
    Captured { index: usize, evicted: bool },
    Updated { index: usize },
    Retracted { index: usize },
}

impl CaptureDecision {
    pub fn mutated_history(&self) -> bool {
        matches!(
            self,
            CaptureDecision::Captured { .. }
                | CaptureDecision::Updated { .. }
                | CaptureDecision::Retracted { .. }
        )
    }
}

/// Everything the tracker mutates, kept behind one lock by the controller.
#[derive(Debug)]
pub struct TrackerState {
    session: Option<SessionState>,
    history: CommentHistory,
    inserted: InsertedSuggestions,
    /// Bumped whenever a pending debounce must no longer apply
    generation: u64,
}

impl TrackerState {
    pub fn new(history: CommentHistory, exclusion_capacity: usize) -> Self {
        Self {
            session: None,
            history,
            inserted: InsertedSuggestions::new(exclusion_capacity),
            generation: 0,
        }
    }

    pub fn history(&self) -> &CommentHistory {
        &self.history
    }

    pub fn session(&self) -> Option<&SessionState> {
        self.session.as_ref()
    }

    #[cfg(test)]
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_tracking(&self, field: &FieldId) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| &session.field == field)
    }

    pub fn note_inserted(&mut self, text: &str) {
        self.inserted.insert(text);
    }

    /// Records the latest text for `field`, switching sessions when the
    /// field changes. Any previously pending evaluation becomes stale.
    pub fn observe(&mut self, field: &FieldId, text: &str) -> Observation {
        self.generation += 1;

        if !self.is_tracking(field) {
            self.session = Some(SessionState::begin(field.clone()));
        }

        let text = text.trim();
        if text.is_empty() {
            // Emptying a field is not a retraction: the committed sample stays.
            self.session = None;
            return Observation::SessionEnded;
        }

        if let Some(session) = self.session.as_mut() {
            session.text = text.to_string();
        }
        Observation::Pending {
            generation: self.generation,
        }
    }

    /// Debounce expiry. Returns `None` when the firing is stale.
    pub fn fire(&mut self, generation: u64) -> Option<CaptureDecision> {
        if generation != self.generation {
            return None;
        }
        let (field, text) = {
            let session = self.session.as_ref()?;
            (session.field.clone(), session.text.clone())
        };
        Some(self.evaluate(&field, &text))
    }

    /// Blur. Cancels anything pending for the tracked field and commits
    /// immediately when the text is long enough.
    pub fn focus_lost(&mut self, field: &FieldId, text: &str) -> Option<CaptureDecision> {
        if !self.is_tracking(field) {
            return None;
        }
        self.generation += 1;

        let text = text.trim();
        if let Some(session) = self.session.as_mut() {
            session.text = text.to_string();
        }
        if word_count(text) < MIN_WORDS {
            return None;
        }
        Some(self.evaluate(field, text))
    }

    pub fn evaluate(&mut self, field: &FieldId, text: &str) -> CaptureDecision {
        let Some(session) = self.session.as_mut().filter(|s| &s.field == field) else {
            return CaptureDecision::Ignored;
        };
        let text = text.trim();

        if session.excluded.as_deref() == Some(text) {
            return CaptureDecision::Excluded;
        }
        session.excluded = None;
        if self.inserted.take(text) {
            session.excluded = Some(text.to_string());
            return CaptureDecision::Excluded;
        }

        if word_count(text) < MIN_WORDS {
            return match session.sample_index.take() {
                Some(index) if self.history.remove(index).is_some() => {
                    CaptureDecision::Retracted { index }
                }
                _ => CaptureDecision::Ignored,
            };
        }

        if let Some(index) = session.sample_index {
            if self.history.get(index) == Some(text) {
                return CaptureDecision::Ignored;
            }
            if self.history.replace(index, text.to_string()) {
                return CaptureDecision::Updated { index };
            }
            // The slot vanished underneath us; fall through and append.
        }

        let outcome = self.history.push(text.to_string());
        session.sample_index = Some(outcome.index);
        CaptureDecision::Captured {
            index: outcome.index,
            evicted: outcome.evicted,
        }
    }

    /// Swaps in a history edited elsewhere. Indexes held by the current
    /// session would no longer be meaningful, so the session ends.
    pub fn replace_history(&mut self, history: CommentHistory) {
        self.generation += 1;
        self.session = None;
        self.history = history;
    }

    pub fn reset(&mut self) {
        self.generation += 1;
        self.session = None;
        self.history.clear();
        self.inserted.clear();
    }
}
