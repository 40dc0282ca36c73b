/// Read-only view of the last known-good document state.
use serde::{Deserialize, Serialize};

/// The document state used as the merge base when history entries are
/// applied. Owned by the store; history only reads it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot<Elements, AppState> {
    /// Content at the time of the last commit.
    pub elements: Elements,
    /// Auxiliary state at the time of the last commit.
    pub app_state: AppState,
}

impl<Elements, AppState> Snapshot<Elements, AppState> {
    /// Creates a snapshot from the given state.
    pub fn new(elements: Elements, app_state: AppState) -> Self {
        Self {
            elements,
            app_state,
        }
    }
}
