/// An editing session: scene state, snapshot store and history together.
///
/// Local edits are captured into history. Remote edits only move the
/// snapshot, so undo never reverts a collaborator's work.
use std::collections::BTreeSet;

use anyhow::Result;
use drawpad_history::{History, HistoryChangedEvent, HistoryConfig, SubscriptionId};

use crate::app_state::AppState;
use crate::app_state_delta::AppStateDelta;
use crate::element::{Element, ElementId, SceneElements};
use crate::elements_delta::ElementsDelta;
use crate::store::{Store, StoreAction};

/// History over the scene model.
pub type SceneHistory = History<ElementsDelta, AppStateDelta>;

/// Who made an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// The local user; captured into history.
    Local,
    /// A collaborator; applied without history.
    Remote,
}

impl Origin {
    fn store_action(self) -> StoreAction {
        match self {
            Self::Local => StoreAction::Capture,
            Self::Remote => StoreAction::Update,
        }
    }
}

#[derive(Debug)]
pub struct Session {
    elements: SceneElements,
    app_state: AppState,
    store: Store,
    history: SceneHistory,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl Session {
    /// Creates an empty session.
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            elements: SceneElements::new(),
            app_state: AppState::default(),
            store: Store::default(),
            history: History::new(config),
        }
    }

    pub fn elements(&self) -> &SceneElements {
        &self.elements
    }

    pub fn app_state(&self) -> &AppState {
        &self.app_state
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn history(&self) -> &SceneHistory {
        &self.history
    }

    /// Registers a history-changed listener.
    pub fn subscribe(
        &mut self,
        handler: impl FnMut(&HistoryChangedEvent) + 'static,
    ) -> SubscriptionId {
        self.history.on_history_changed().on(handler)
    }

    /// Replaces the whole scene (opening a document). History is cleared
    /// without notifying, so callers refresh their own controls.
    pub fn load(&mut self, elements: SceneElements, app_state: AppState) {
        self.history.clear();
        self.store = Store::new(elements.clone(), app_state.clone());
        self.elements = elements;
        self.app_state = app_state;
        tracing::debug!(elements = self.elements.len(), "Loaded scene");
    }

    /// Replaces the scene state and commits it with `action`.
    pub fn update_scene(
        &mut self,
        elements: SceneElements,
        app_state: AppState,
        action: StoreAction,
    ) {
        self.elements = elements;
        self.app_state = app_state;
        if let Some(increment) = self.store.commit(&self.elements, &self.app_state, action) {
            self.history
                .record(increment.elements_change, increment.app_state_change);
        }
    }

    /// Inserts an element or merges its props into the existing one.
    pub fn upsert_element(&mut self, element: Element, origin: Origin) {
        let mut elements = self.elements.clone();
        match elements.get_mut(&element.id) {
            Some(existing) => {
                existing.props.extend(element.props);
                existing.props.retain(|_, v| !v.is_null());
                existing.is_deleted = element.is_deleted;
                existing.version = existing.version.wrapping_add(1);
            }
            None => {
                let mut element = element;
                element.version = element.version.max(1);
                element.props.retain(|_, v| !v.is_null());
                elements.insert(element.id.clone(), element);
            }
        }
        let app_state = self.app_state.clone();
        self.update_scene(elements, app_state, origin.store_action());
    }

    /// Soft-deletes an element. Local deletions also drop it from the
    /// selection. Returns `false` if there was nothing to delete.
    pub fn delete_element(&mut self, id: &ElementId, origin: Origin) -> bool {
        let mut elements = self.elements.clone();
        let Some(element) = elements.get_mut(id).filter(|e| !e.is_deleted) else {
            return false;
        };
        element.is_deleted = true;
        element.version = element.version.wrapping_add(1);

        let mut app_state = self.app_state.clone();
        if origin == Origin::Local {
            app_state.selected_element_ids.remove(id);
        }
        self.update_scene(elements, app_state, origin.store_action());
        true
    }

    /// Replaces the selection with the live elements among `ids`.
    pub fn select(&mut self, ids: impl IntoIterator<Item = ElementId>) {
        let mut app_state = self.app_state.clone();
        app_state.selected_element_ids = ids.into_iter().collect::<BTreeSet<_>>();
        app_state.selected_element_ids = app_state.visible_selection(&self.elements);
        let elements = self.elements.clone();
        self.update_scene(elements, app_state, StoreAction::Capture);
    }

    pub fn set_background(&mut self, color: &str) {
        let mut app_state = self.app_state.clone();
        app_state.view_background_color = color.to_string();
        let elements = self.elements.clone();
        self.update_scene(elements, app_state, StoreAction::Capture);
    }

    /// Undoes the last visible local edit. Returns `false` if there was
    /// nothing to undo.
    ///
    /// # Errors
    ///
    /// Propagates failures from applying history entries.
    pub fn undo(&mut self) -> Result<bool> {
        let result = self
            .history
            .undo(&self.elements, &self.app_state, self.store.snapshot())?;
        Ok(self.apply_history_result(result))
    }

    /// Redoes the last undone edit. Returns `false` if there was nothing
    /// to redo.
    ///
    /// # Errors
    ///
    /// Propagates failures from applying history entries.
    pub fn redo(&mut self) -> Result<bool> {
        let result = self
            .history
            .redo(&self.elements, &self.app_state, self.store.snapshot())?;
        Ok(self.apply_history_result(result))
    }

    /// Drops all history entries.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    fn apply_history_result(&mut self, result: Option<(SceneElements, AppState)>) -> bool {
        match result {
            Some((elements, app_state)) => {
                self.update_scene(elements, app_state, StoreAction::Update);
                true
            }
            None => false,
        }
    }
}
