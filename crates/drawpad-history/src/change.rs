/// Capability traits for the reversible changes stored in history.
///
/// The history engine never looks inside elements or app state. It only
/// inverts, applies and rebases changes through these traits, so any scene
/// model that implements them can be plugged in.
use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Which side of a stored change gets refreshed from the live document
/// when an entry is rebased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeltaSide {
    /// The state the change produces. Used while building a redo entry
    /// during undo.
    Inserted,
    /// The state the change replaces. Used while building an undo entry
    /// during redo.
    Deleted,
}

impl fmt::Display for DeltaSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inserted => write!(f, "inserted"),
            Self::Deleted => write!(f, "deleted"),
        }
    }
}

/// A reversible change to document content.
pub trait ElementsChange: Clone + fmt::Debug {
    /// The content container the change applies to.
    type Elements: Clone;

    /// Returns the change that undoes this one.
    fn inverse(&self) -> Self;

    /// Whether applying the change would do nothing.
    fn is_empty(&self) -> bool;

    /// Applies the change to `elements`, using `snapshot` as the merge base
    /// for anything missing from the live elements.
    ///
    /// Returns the new elements and whether the application produced a
    /// visible difference.
    ///
    /// # Errors
    ///
    /// Implementations may fail when the change cannot be applied at all.
    fn apply_to(
        &self,
        elements: &Self::Elements,
        snapshot: &Self::Elements,
    ) -> Result<(Self::Elements, bool)>;

    /// Returns a copy of this change whose `side` reflects the current
    /// values in `elements`.
    fn apply_latest_changes(&self, elements: &Self::Elements, side: DeltaSide) -> Self;
}

/// A reversible change to auxiliary state (selection, view settings).
///
/// Applied after the content change, so `apply_to` receives the already
/// updated elements as context.
pub trait AppStateChange<Elements>: Clone + fmt::Debug {
    /// The auxiliary state container the change applies to.
    type AppState: Clone;

    /// Returns the change that undoes this one.
    fn inverse(&self) -> Self;

    /// Whether applying the change would do nothing.
    fn is_empty(&self) -> bool;

    /// Applies the change to `app_state` in the context of `elements`.
    ///
    /// # Errors
    ///
    /// Implementations may fail when the change cannot be applied at all.
    fn apply_to(
        &self,
        app_state: &Self::AppState,
        elements: &Elements,
    ) -> Result<(Self::AppState, bool)>;
}
