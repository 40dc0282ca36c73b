/// Snapshot keeping and increment capture.
///
/// The store remembers the last committed scene. Local edits are diffed
/// against it to produce history increments; remote edits and undo/redo
/// results only move the snapshot forward.
use drawpad_history::{AppStateChange, ElementsChange, Snapshot};

use crate::app_state::AppState;
use crate::app_state_delta::AppStateDelta;
use crate::element::SceneElements;
use crate::elements_delta::ElementsDelta;

/// The scene snapshot type used as the history merge base.
pub type SceneSnapshot = Snapshot<SceneElements, AppState>;

/// How a commit affects history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreAction {
    /// Diff against the snapshot, emit an increment and update the snapshot.
    Capture,
    /// Update the snapshot without emitting an increment.
    Update,
    /// Leave the snapshot alone.
    None,
}

/// A captured local change, ready to be recorded in history.
#[derive(Debug, Clone, PartialEq)]
pub struct Increment {
    pub elements_change: ElementsDelta,
    pub app_state_change: AppStateDelta,
}

impl Increment {
    pub fn is_empty(&self) -> bool {
        self.elements_change.is_empty() && self.app_state_change.is_empty()
    }
}

/// Holds the current snapshot.
#[derive(Debug, Clone, Default)]
pub struct Store {
    snapshot: SceneSnapshot,
}

impl Store {
    pub fn new(elements: SceneElements, app_state: AppState) -> Self {
        Self {
            snapshot: Snapshot::new(elements, app_state),
        }
    }

    pub fn snapshot(&self) -> &SceneSnapshot {
        &self.snapshot
    }

    /// Commits the given scene.
    ///
    /// Returns an increment only for `StoreAction::Capture` when something
    /// changed since the last snapshot.
    pub fn commit(
        &mut self,
        elements: &SceneElements,
        app_state: &AppState,
        action: StoreAction,
    ) -> Option<Increment> {
        match action {
            StoreAction::None => None,
            StoreAction::Update => {
                self.snapshot = Snapshot::new(elements.clone(), app_state.clone());
                None
            }
            StoreAction::Capture => {
                let increment = Increment {
                    elements_change: ElementsDelta::calculate(&self.snapshot.elements, elements),
                    app_state_change: AppStateDelta::calculate(&self.snapshot.app_state, app_state),
                };
                self.snapshot = Snapshot::new(elements.clone(), app_state.clone());

                (!increment.is_empty()).then_some(increment)
            }
        }
    }

    /// Resets the snapshot to an empty scene.
    pub fn clear(&mut self) {
        self.snapshot = SceneSnapshot::default();
    }
}
