/// Editor state that is not part of the scene content.
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::element::{is_live, ElementId, SceneElements};

/// Auxiliary editor state.
///
/// Only the fields mirrored in `AppStatePartial` take part in history;
/// `zoom` is local view state and never undone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppState {
    pub selected_element_ids: BTreeSet<ElementId>,
    pub view_background_color: String,
    pub name: String,
    pub zoom: f64,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            selected_element_ids: BTreeSet::new(),
            view_background_color: "#ffffff".to_string(),
            name: String::new(),
            zoom: 1.0,
        }
    }
}

impl AppState {
    /// Selection restricted to elements that exist and are not deleted.
    pub fn visible_selection(&self, elements: &SceneElements) -> BTreeSet<ElementId> {
        self.selected_element_ids
            .iter()
            .filter(|id| is_live(elements, id))
            .cloned()
            .collect()
    }
}

/// Optional copy of the history-observed `AppState` fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppStatePartial {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_element_ids: Option<BTreeSet<ElementId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl AppStatePartial {
    pub fn is_empty(&self) -> bool {
        self.selected_element_ids.is_none()
            && self.view_background_color.is_none()
            && self.name.is_none()
    }

    /// Writes the present fields onto `state`.
    pub fn apply(&self, state: &mut AppState) {
        if let Some(ids) = &self.selected_element_ids {
            state.selected_element_ids = ids.clone();
        }
        if let Some(color) = &self.view_background_color {
            state.view_background_color = color.clone();
        }
        if let Some(name) = &self.name {
            state.name = name.clone();
        }
    }
}
