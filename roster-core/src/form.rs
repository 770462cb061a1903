//! Creation-form state machine
//!
//! Tracks the modal form's phase and the suggestion list shown under the
//! location field. The "picked vs typed" distinction is an explicit
//! two-variant state rather than a boolean latch: picking a suggestion arms
//! `PickPending`, and the very next change notification for the location
//! field consumes it and is suppressed instead of triggering a query. The
//! caller is the notification source, so the pending state is consumed
//! exactly once.

use crate::suggest::Suggestion;
use crate::user::User;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormPhase {
    Closed,
    /// Open, no suggestions visible.
    Editing,
    /// Open with a non-empty suggestion list under the location field.
    ShowingSuggestions,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LocationEdit {
    Typing,
    /// A suggestion was just applied; suppress the next change notification.
    PickPending,
}

/// What the UI should do with the provider after a location-field change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryAction {
    Refresh(String),
    Suppressed,
}

pub struct FormFlow {
    open: bool,
    suggestions: Vec<Suggestion>,
    edit: LocationEdit,
}

impl FormFlow {
    pub fn new() -> Self {
        Self {
            open: false,
            suggestions: Vec::new(),
            edit: LocationEdit::Typing,
        }
    }

    pub fn open(&mut self) {
        self.open = true;
        self.suggestions.clear();
        self.edit = LocationEdit::Typing;
    }

    pub fn dismiss(&mut self) {
        self.open = false;
        self.suggestions.clear();
        self.edit = LocationEdit::Typing;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn phase(&self) -> FormPhase {
        if !self.open {
            FormPhase::Closed
        } else if self.suggestions.is_empty() {
            FormPhase::Editing
        } else {
            FormPhase::ShowingSuggestions
        }
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    /// Replace the suggestion list with a provider delivery. Ignored while
    /// the form is closed, so a late async result cannot resurrect the list
    /// of a dismissed form.
    pub fn set_suggestions(&mut self, list: Vec<Suggestion>) {
        if self.open {
            self.suggestions = list;
        }
    }

    /// The location field's value changed. Returns whether the provider
    /// should be refreshed with the new fragment or the change came from a
    /// pick and must be suppressed.
    ///
    /// An empty fragment clears the visible list immediately (no round-trip)
    /// but is still forwarded so an in-flight query is superseded by an
    /// empty delivery.
    pub fn location_changed(&mut self, value: &str) -> QueryAction {
        if self.edit == LocationEdit::PickPending {
            self.edit = LocationEdit::Typing;
            return QueryAction::Suppressed;
        }
        if value.is_empty() {
            self.suggestions.clear();
        }
        QueryAction::Refresh(value.to_string())
    }

    /// Apply the suggestion at `index`: returns the value to assign to the
    /// location field, clears the list, and arms the suppression state for
    /// the change notification that assignment will produce.
    pub fn pick(&mut self, index: usize) -> Option<String> {
        let title = self.suggestions.get(index)?.title.clone();
        self.suggestions.clear();
        self.edit = LocationEdit::PickPending;
        Some(title)
    }

    pub fn can_submit(name: &str, title: &str, localisation: &str) -> bool {
        !name.is_empty() && !title.is_empty() && !localisation.is_empty()
    }

    /// Validate and mint the new user, closing the form. `None` leaves the
    /// form untouched.
    pub fn submit(&mut self, name: &str, title: &str, localisation: &str) -> Option<User> {
        if !Self::can_submit(name, title, localisation) {
            return None;
        }
        self.dismiss();
        Some(User::new(name, title, localisation))
    }
}

impl Default for FormFlow {
    fn default() -> Self {
        Self::new()
    }
}
