/// Two-sided deltas: the state a change replaces and the state it produces.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::element::Element;

/// A pair of partial states. Inverting swaps the sides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Delta<T> {
    pub deleted: T,
    pub inserted: T,
}

impl<T: Clone + PartialEq> Delta<T> {
    pub fn new(deleted: T, inserted: T) -> Self {
        Self { deleted, inserted }
    }

    pub fn inverse(&self) -> Self {
        Self::new(self.inserted.clone(), self.deleted.clone())
    }

    /// Whether applying the delta would change anything.
    pub fn is_different(&self) -> bool {
        self.deleted != self.inserted
    }
}

/// A subset of an element's fields. A `null` prop means the prop is absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementPartial {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_deleted: Option<bool>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub props: BTreeMap<String, Value>,
}

impl ElementPartial {
    /// Partial carrying only the deletion flag.
    pub fn deleted_flag(is_deleted: bool) -> Self {
        Self {
            is_deleted: Some(is_deleted),
            props: BTreeMap::new(),
        }
    }

    /// Partial carrying every field of `element`.
    pub fn full(element: &Element) -> Self {
        Self {
            is_deleted: Some(element.is_deleted),
            props: element.props.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.is_deleted.is_none() && self.props.is_empty()
    }

    /// Same keys as `self`, values read from `element`.
    pub fn refreshed_from(&self, element: &Element) -> Self {
        Self {
            is_deleted: self.is_deleted.map(|_| element.is_deleted),
            props: self
                .props
                .keys()
                .map(|key| (key.clone(), element.prop(key).cloned().unwrap_or(Value::Null)))
                .collect(),
        }
    }

    /// Writes the partial onto `element`. Returns whether anything changed.
    pub fn apply(&self, element: &mut Element) -> bool {
        let mut changed = false;

        if let Some(is_deleted) = self.is_deleted {
            if element.is_deleted != is_deleted {
                element.is_deleted = is_deleted;
                changed = true;
            }
        }

        for (key, value) in &self.props {
            if value.is_null() {
                changed |= element.props.remove(key).is_some();
            } else if element.props.get(key) != Some(value) {
                element.props.insert(key.clone(), value.clone());
                changed = true;
            }
        }

        changed
    }
}

/// Props that differ between two elements, as a pair of partials.
pub(crate) fn diff_props(prev: &Element, next: &Element) -> Delta<ElementPartial> {
    let mut delta = Delta::<ElementPartial>::default();

    for key in prev.props.keys().chain(next.props.keys()) {
        let before = prev.prop(key);
        let after = next.prop(key);
        if before != after {
            delta
                .deleted
                .props
                .insert(key.clone(), before.cloned().unwrap_or(Value::Null));
            delta
                .inserted
                .props
                .insert(key.clone(), after.cloned().unwrap_or(Value::Null));
        }
    }

    delta
}
