/// A single reversible unit of history.
use anyhow::Result;

use crate::change::{AppStateChange, DeltaSide, ElementsChange};
use crate::snapshot::Snapshot;

/// Pairs a content change with an app-state change so they undo and redo
/// as one step.
///
/// Entries are values: `inverse` and `apply_latest_changes` build new
/// entries and never touch `self`.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry<E, A> {
    app_state_change: A,
    elements_change: E,
}

impl<E, A> HistoryEntry<E, A>
where
    E: ElementsChange,
    A: AppStateChange<E::Elements>,
{
    /// Creates an entry from its two changes.
    pub fn create(app_state_change: A, elements_change: E) -> Self {
        Self {
            app_state_change,
            elements_change,
        }
    }

    /// The app-state half of the entry.
    pub fn app_state_change(&self) -> &A {
        &self.app_state_change
    }

    /// The content half of the entry.
    pub fn elements_change(&self) -> &E {
        &self.elements_change
    }

    /// Returns the entry that undoes this one.
    pub fn inverse(&self) -> Self {
        Self::create(
            self.app_state_change.inverse(),
            self.elements_change.inverse(),
        )
    }

    /// Applies the entry and reports whether anything visible changed.
    ///
    /// The app-state change sees the elements produced by the content
    /// change, so selections can be checked against what actually exists.
    ///
    /// # Errors
    ///
    /// Propagates failures from either change.
    pub fn apply_to(
        &self,
        elements: &E::Elements,
        app_state: &A::AppState,
        snapshot: &Snapshot<E::Elements, A::AppState>,
    ) -> Result<(E::Elements, A::AppState, bool)> {
        let (next_elements, elements_visible) =
            self.elements_change.apply_to(elements, &snapshot.elements)?;
        let (next_app_state, app_state_visible) =
            self.app_state_change.apply_to(app_state, &next_elements)?;

        Ok((
            next_elements,
            next_app_state,
            elements_visible || app_state_visible,
        ))
    }

    /// Rebases the content change against the live `elements`.
    /// The app-state change is carried over as is.
    pub fn apply_latest_changes(&self, elements: &E::Elements, side: DeltaSide) -> Self {
        Self::create(
            self.app_state_change.clone(),
            self.elements_change.apply_latest_changes(elements, side),
        )
    }

    /// True when neither change does anything.
    pub fn is_empty(&self) -> bool {
        self.app_state_change.is_empty() && self.elements_change.is_empty()
    }

    /// True when the content change does nothing.
    pub fn is_elements_change_empty(&self) -> bool {
        self.elements_change.is_empty()
    }
}
