/// Scene elements keyed by stable identifiers.
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stable identifier of an element, shared by all collaborators.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random identifier.
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// All elements of a scene, including soft-deleted ones.
pub type SceneElements = BTreeMap<ElementId, Element>;

/// A drawable element.
///
/// Deletion is soft: a deleted element stays in the scene with
/// `is_deleted` set so that collaborators and history can restore it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    /// Bumped on every change.
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub is_deleted: bool,
    /// Shape properties (position, size, colors...).
    #[serde(default)]
    pub props: BTreeMap<String, Value>,
}

impl Element {
    /// Creates a visible element with no properties.
    pub fn new(id: impl Into<ElementId>) -> Self {
        Self {
            id: id.into(),
            version: 1,
            is_deleted: false,
            props: BTreeMap::new(),
        }
    }

    /// Builder-style property setter.
    pub fn with_prop(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.props.insert(key.to_string(), value.into());
        self
    }

    /// Returns a property, treating `null` as absent.
    pub fn prop(&self, key: &str) -> Option<&Value> {
        self.props.get(key).filter(|v| !v.is_null())
    }

    /// Whether two versions of an element look different on screen.
    ///
    /// Changes to an element that is deleted both before and after are
    /// not visible.
    pub fn is_visibly_different(before: Option<&Element>, after: &Element) -> bool {
        match before {
            None => !after.is_deleted,
            Some(before) if before.is_deleted && after.is_deleted => false,
            Some(before) => before.is_deleted != after.is_deleted || before.props != after.props,
        }
    }
}

/// Collects elements into a scene map keyed by id.
pub fn scene_from(elements: impl IntoIterator<Item = Element>) -> SceneElements {
    elements.into_iter().map(|e| (e.id.clone(), e)).collect()
}

/// Whether `id` refers to a live, non-deleted element.
pub fn is_live(elements: &SceneElements, id: &ElementId) -> bool {
    elements.get(id).is_some_and(|e| !e.is_deleted)
}
