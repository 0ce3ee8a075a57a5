//! Builder-side question list editing.
//!
//! The editor owns the list and returns a verdict for every mutation instead
//! of touching UI state; the builder renders verdicts as inline validation
//! marks or blocking prompts. The invariant it protects: a qa-mode field
//! must keep at least one question/answer pair that is non-empty on both
//! sides at every point the configuration is persisted.

use captcha_common::{QaPair, QuestionList};
use tracing::{debug, warn};

use crate::messages::Messages;

/// Outcome of an interactive removal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// Entry removed; the builder refreshes the preview label
    Removed { removed: QaPair },
    /// Removal rejected: it would leave zero non-empty questions. The
    /// builder shows a blocking prompt with the message.
    Blocked { message: String },
}

/// Outcome of a question edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// Edit applied; `invalid` marks the input when the text is blank
    Applied { invalid: bool },
    /// Edit rejected and the previous text kept: it would leave zero
    /// non-empty questions
    Reverted { message: String },
}

/// Outcome of the pre-save validation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreSaveOutcome {
    /// Incomplete entries dropped silently; the list is safe to persist
    Saved { dropped: usize },
    /// Zero complete entries: the save is cancelled and the builder
    /// navigates back to the field's options panel
    Blocked { message: String },
}

/// Editing session over one field's question list
#[derive(Debug, Clone)]
pub struct QuestionEditor {
    list: QuestionList,
    preview: String,
    messages: Messages,
}

impl QuestionEditor {
    pub fn new(list: QuestionList, messages: Messages) -> Self {
        let preview = list
            .first()
            .map(|(_, pair)| pair.question.clone())
            .unwrap_or_default();

        Self {
            list,
            preview,
            messages,
        }
    }

    /// Editor over a fresh list holding the default seed question
    pub fn seeded(messages: Messages) -> Self {
        Self::new(QuestionList::seeded(), messages)
    }

    pub fn list(&self) -> &QuestionList {
        &self.list
    }

    pub fn into_list(self) -> QuestionList {
        self.list
    }

    /// Text shown in the builder's live field preview
    pub fn preview_label(&self) -> &str {
        &self.preview
    }

    /// Insert a new empty pair right after the reference entry.
    ///
    /// New entries start empty and are expected to be filled in, so no
    /// validation happens here. Returns the assigned key.
    pub fn add_after(&mut self, reference: u32) -> u32 {
        let key = self.list.insert_after(reference, QaPair::default());
        debug!(key, reference, "Question added");
        key
    }

    /// Remove an entry, provided at least one non-empty question remains.
    ///
    /// The gate counts trimmed question text only; answers do not
    /// participate. Returns `None` for an unknown key.
    pub fn remove(&mut self, key: u32) -> Option<RemoveOutcome> {
        let entry = self.list.get(key)?;
        let entry_is_empty = entry.question.trim().is_empty();
        let total = self.list.non_empty_question_count();

        if total > 1 || (total == 1 && entry_is_empty) {
            let removed = self.list.remove(key)?;
            self.refresh_preview();
            debug!(key, "Question removed");
            return Some(RemoveOutcome::Removed { removed });
        }

        warn!(key, "Removal blocked: last non-empty question");
        Some(RemoveOutcome::Blocked {
            message: self.messages.not_empty_question.clone(),
        })
    }

    /// Apply a keystroke-level question edit.
    ///
    /// Blanking the only non-empty question is rejected and the stored text
    /// kept, so the builder can restore the input from it. Editing the first
    /// entry drives the live preview label. Returns `None` for an unknown
    /// key.
    pub fn edit_question(&mut self, key: u32, new_text: &str) -> Option<EditOutcome> {
        if !self.list.contains(key) {
            return None;
        }

        let trimmed = new_text.trim();
        if trimmed.is_empty() {
            let non_empty_elsewhere = self
                .list
                .iter()
                .filter(|(k, pair)| *k != key && !pair.question.trim().is_empty())
                .count();

            if non_empty_elsewhere == 0 {
                warn!(key, "Edit reverted: would leave zero non-empty questions");
                return Some(EditOutcome::Reverted {
                    message: self.messages.not_empty_question.clone(),
                });
            }
        }

        if let Some(pair) = self.list.get_mut(key) {
            pair.question = new_text.to_string();
        }

        if self.list.first().map(|(k, _)| k) == Some(key) {
            self.preview = trimmed.to_string();
        }

        Some(EditOutcome::Applied {
            invalid: trimmed.is_empty(),
        })
    }

    /// Apply an answer edit. Answers are free text and never blocked;
    /// emptiness only matters at pre-save. Returns `false` for an unknown
    /// key.
    pub fn edit_answer(&mut self, key: u32, new_text: &str) -> bool {
        match self.list.get_mut(key) {
            Some(pair) => {
                pair.answer = new_text.to_string();
                true
            }
            None => false,
        }
    }

    /// Validate before the field loses editing focus or the form is saved.
    ///
    /// With at least one complete pair, incomplete entries are dropped
    /// silently and the result may be persisted. With none, the list is left
    /// untouched and the save must be cancelled.
    pub fn pre_save(&mut self) -> PreSaveOutcome {
        if self.list.complete_keys().is_empty() {
            warn!("Save blocked: no complete question/answer pair");
            return PreSaveOutcome::Blocked {
                message: self.messages.not_empty_question.clone(),
            };
        }

        let dropped = self.list.retain_complete();
        self.refresh_preview();

        if dropped > 0 {
            debug!(dropped, "Incomplete questions dropped before save");
        }

        PreSaveOutcome::Saved { dropped }
    }

    fn refresh_preview(&mut self) {
        self.preview = self
            .list
            .first()
            .map(|(_, pair)| pair.question.clone())
            .unwrap_or_default();
    }
}
