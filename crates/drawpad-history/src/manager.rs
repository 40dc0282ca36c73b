/// Undo/redo stacks with rebase-on-replay traversal.
///
/// The document may be changed by other actors (remote collaborators)
/// between recording an entry and replaying it. Every popped entry is
/// therefore rebased against the live elements before it is applied or
/// shelved on the opposite stack, and entries that turn out to change
/// nothing visible are skipped.
use std::ops::{Deref, DerefMut};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::change::{AppStateChange, DeltaSide, ElementsChange};
use crate::config::HistoryConfig;
use crate::emitter::Emitter;
use crate::entry::HistoryEntry;
use crate::snapshot::Snapshot;

/// Sent whenever history may have changed, so front ends can enable or
/// disable their undo/redo controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HistoryChangedEvent {
    pub is_undo_stack_empty: bool,
    pub is_redo_stack_empty: bool,
}

impl HistoryChangedEvent {
    pub fn new(is_undo_stack_empty: bool, is_redo_stack_empty: bool) -> Self {
        Self {
            is_undo_stack_empty,
            is_redo_stack_empty,
        }
    }
}

/// Pops, rebases and shelves one entry, returning the entry to apply.
type Step<E, A> = fn(
    &mut History<E, A>,
    &<E as ElementsChange>::Elements,
) -> Option<HistoryEntry<E, A>>;

/// Manages undo/redo history for a single document.
pub struct History<E, A> {
    /// Entries to undo, most recent last.
    undo_stack: Vec<HistoryEntry<E, A>>,
    /// Entries to redo, most recently undone last.
    redo_stack: Vec<HistoryEntry<E, A>>,
    on_history_changed: Emitter<HistoryChangedEvent>,
    config: HistoryConfig,
}

impl<E, A> std::fmt::Debug for History<E, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("History")
            .field("undo_len", &self.undo_stack.len())
            .field("redo_len", &self.redo_stack.len())
            .field("listeners", &self.on_history_changed.len())
            .field("config", &self.config)
            .finish()
    }
}

impl<E, A> Default for History<E, A>
where
    E: ElementsChange,
    A: AppStateChange<E::Elements>,
{
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl<E, A> History<E, A>
where
    E: ElementsChange,
    A: AppStateChange<E::Elements>,
{
    /// Creates a history with both stacks empty.
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            on_history_changed: Emitter::new(),
            config,
        }
    }

    /// Channel notified after every `record`, `undo` and `redo` that
    /// reaches the stacks.
    pub fn on_history_changed(&mut self) -> &mut Emitter<HistoryChangedEvent> {
        &mut self.on_history_changed
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    pub fn is_undo_stack_empty(&self) -> bool {
        self.undo_stack.is_empty()
    }

    pub fn is_redo_stack_empty(&self) -> bool {
        self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Entries on the undo stack, oldest first.
    pub fn undo_entries(&self) -> &[HistoryEntry<E, A>] {
        &self.undo_stack
    }

    /// Entries on the redo stack, next to redo last.
    pub fn redo_entries(&self) -> &[HistoryEntry<E, A>] {
        &self.redo_stack
    }

    /// Current stack state as an event payload.
    pub fn state(&self) -> HistoryChangedEvent {
        HistoryChangedEvent::new(self.undo_stack.is_empty(), self.redo_stack.is_empty())
    }

    /// Records a completed edit.
    ///
    /// Empty edits are dropped without notifying. The redo stack is only
    /// invalidated by content changes: a selection change alone (a click
    /// to deselect) must not throw away pending redo entries.
    pub fn record(&mut self, elements_change: E, app_state_change: A) {
        let entry = HistoryEntry::create(app_state_change, elements_change);
        if entry.is_empty() {
            return;
        }

        let clears_redo = !entry.is_elements_change_empty();
        self.undo_stack.push(entry);

        if clears_redo && !self.redo_stack.is_empty() {
            tracing::debug!("Discarding {} redo entries", self.redo_stack.len());
            self.redo_stack.clear();
        }

        let excess = self.config.excess(self.undo_stack.len());
        if excess > 0 {
            self.undo_stack.drain(..excess);
            tracing::debug!("Evicted {excess} oldest undo entries");
        }

        tracing::debug!(
            undo_len = self.undo_stack.len(),
            redo_len = self.redo_stack.len(),
            "Recorded history entry"
        );
        self.emit_changed();
    }

    /// Undoes the most recent visible edit.
    ///
    /// Returns `None` if there's nothing to undo.
    ///
    /// # Errors
    ///
    /// Propagates failures from applying an entry. Listeners are notified
    /// either way.
    pub fn undo(
        &mut self,
        elements: &E::Elements,
        app_state: &A::AppState,
        snapshot: &Snapshot<E::Elements, A::AppState>,
    ) -> Result<Option<(E::Elements, A::AppState)>> {
        self.perform(Self::undo_once, elements, app_state, snapshot)
    }

    /// Redoes the most recently undone visible edit.
    ///
    /// Returns `None` if there's nothing to redo.
    ///
    /// # Errors
    ///
    /// Propagates failures from applying an entry. Listeners are notified
    /// either way.
    pub fn redo(
        &mut self,
        elements: &E::Elements,
        app_state: &A::AppState,
        snapshot: &Snapshot<E::Elements, A::AppState>,
    ) -> Result<Option<(E::Elements, A::AppState)>> {
        self.perform(Self::redo_once, elements, app_state, snapshot)
    }

    /// Empties both stacks without notifying.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    fn perform(
        &mut self,
        step: Step<E, A>,
        elements: &E::Elements,
        app_state: &A::AppState,
        snapshot: &Snapshot<E::Elements, A::AppState>,
    ) -> Result<Option<(E::Elements, A::AppState)>> {
        let mut history = NotifyOnDrop { history: self };

        let Some(mut entry) = step(&mut history, elements) else {
            return Ok(None);
        };

        let mut skipped = 0usize;
        loop {
            let (next_elements, next_app_state, visible) = entry
                .apply_to(elements, app_state, snapshot)
                .inspect_err(|e| tracing::warn!("Failed to apply history entry: {e}"))?;

            if visible {
                tracing::debug!(skipped, "Applied history entry");
                return Ok(Some((next_elements, next_app_state)));
            }

            tracing::trace!("History entry has no visible effect, skipping");
            skipped += 1;

            match step(&mut history, elements) {
                Some(next) => entry = next,
                None => {
                    tracing::debug!(skipped, "History exhausted without a visible change");
                    return Ok(Some((next_elements, next_app_state)));
                }
            }
        }
    }

    fn undo_once(&mut self, elements: &E::Elements) -> Option<HistoryEntry<E, A>> {
        let entry = self.undo_stack.pop()?;

        let redo_entry = entry.apply_latest_changes(elements, DeltaSide::Inserted);
        if !redo_entry.is_empty() {
            self.redo_stack.push(redo_entry);
        }

        Some(entry.inverse())
    }

    fn redo_once(&mut self, elements: &E::Elements) -> Option<HistoryEntry<E, A>> {
        let entry = self.redo_stack.pop()?;

        let undo_entry = entry.apply_latest_changes(elements, DeltaSide::Deleted);
        if !undo_entry.is_empty() {
            self.undo_stack.push(undo_entry);
        }

        Some(entry)
    }

    fn emit_changed(&mut self) {
        let event = self.state();
        self.on_history_changed.trigger(&event);
    }
}

/// Emits a `HistoryChangedEvent` when dropped, on every exit path of a
/// traversal including errors and unwinding.
struct NotifyOnDrop<'a, E, A>
where
    E: ElementsChange,
    A: AppStateChange<E::Elements>,
{
    history: &'a mut History<E, A>,
}

impl<E, A> Deref for NotifyOnDrop<'_, E, A>
where
    E: ElementsChange,
    A: AppStateChange<E::Elements>,
{
    type Target = History<E, A>;

    fn deref(&self) -> &Self::Target {
        self.history
    }
}

impl<E, A> DerefMut for NotifyOnDrop<'_, E, A>
where
    E: ElementsChange,
    A: AppStateChange<E::Elements>,
{
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.history
    }
}

impl<E, A> Drop for NotifyOnDrop<'_, E, A>
where
    E: ElementsChange,
    A: AppStateChange<E::Elements>,
{
    fn drop(&mut self) {
        self.history.emit_changed();
    }
}
