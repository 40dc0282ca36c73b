/// Reversible changes to the history-observed app state.
use anyhow::Result;
use drawpad_history::AppStateChange;
use serde::{Deserialize, Serialize};

use crate::app_state::{AppState, AppStatePartial};
use crate::delta::Delta;
use crate::element::SceneElements;

/// Change to selection, background color or scene name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppStateDelta(pub Delta<AppStatePartial>);

impl AppStateDelta {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Computes the change that turns `prev` into `next`.
    pub fn calculate(prev: &AppState, next: &AppState) -> Self {
        let mut delta = Delta::<AppStatePartial>::default();

        if prev.selected_element_ids != next.selected_element_ids {
            delta.deleted.selected_element_ids = Some(prev.selected_element_ids.clone());
            delta.inserted.selected_element_ids = Some(next.selected_element_ids.clone());
        }
        if prev.view_background_color != next.view_background_color {
            delta.deleted.view_background_color = Some(prev.view_background_color.clone());
            delta.inserted.view_background_color = Some(next.view_background_color.clone());
        }
        if prev.name != next.name {
            delta.deleted.name = Some(prev.name.clone());
            delta.inserted.name = Some(next.name.clone());
        }

        Self(delta)
    }
}

/// Observed state as seen on screen: selection limited to live elements.
fn observed(state: &AppState, elements: &SceneElements) -> AppStatePartial {
    AppStatePartial {
        selected_element_ids: Some(state.visible_selection(elements)),
        view_background_color: Some(state.view_background_color.clone()),
        name: Some(state.name.clone()),
    }
}

impl AppStateChange<SceneElements> for AppStateDelta {
    type AppState = AppState;

    fn inverse(&self) -> Self {
        Self(self.0.inverse())
    }

    fn is_empty(&self) -> bool {
        self.0.deleted.is_empty() && self.0.inserted.is_empty()
    }

    fn apply_to(
        &self,
        app_state: &AppState,
        elements: &SceneElements,
    ) -> Result<(AppState, bool)> {
        let mut next = app_state.clone();
        self.0.inserted.apply(&mut next);
        if self.0.inserted.selected_element_ids.is_some() {
            next.selected_element_ids = next.visible_selection(elements);
        }

        let visible = observed(app_state, elements) != observed(&next, elements);
        Ok((next, visible))
    }
}
