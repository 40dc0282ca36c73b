/// Reversible changes to scene elements.
use std::collections::BTreeMap;

use anyhow::Result;
use drawpad_history::{DeltaSide, ElementsChange};
use serde::{Deserialize, Serialize};

use crate::delta::{diff_props, Delta, ElementPartial};
use crate::element::{Element, ElementId, SceneElements};

/// Per-element deltas keyed by id.
pub type Deltas = BTreeMap<ElementId, Delta<ElementPartial>>;

/// Element changes grouped by kind.
///
/// - `added`: elements that became visible (created or restored).
/// - `removed`: elements that were deleted.
/// - `updated`: property edits on elements that stayed in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementsDelta {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub added: Deltas,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub removed: Deltas,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub updated: Deltas,
}

impl ElementsDelta {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Computes the change that turns `prev` into `next`.
    pub fn calculate(prev: &SceneElements, next: &SceneElements) -> Self {
        let mut delta = Self::empty();

        for (id, next_element) in next {
            match prev.get(id) {
                None => {
                    if !next_element.is_deleted {
                        delta.added.insert(
                            id.clone(),
                            Delta::new(
                                ElementPartial::deleted_flag(true),
                                ElementPartial::full(next_element),
                            ),
                        );
                    }
                }
                Some(prev_element) => {
                    let mut props = diff_props(prev_element, next_element);
                    if prev_element.is_deleted != next_element.is_deleted {
                        props.deleted.is_deleted = Some(prev_element.is_deleted);
                        props.inserted.is_deleted = Some(next_element.is_deleted);
                        let target = if next_element.is_deleted {
                            &mut delta.removed
                        } else {
                            &mut delta.added
                        };
                        target.insert(id.clone(), props);
                    } else if props.is_different() {
                        delta.updated.insert(id.clone(), props);
                    }
                }
            }
        }

        // Hard removals are recorded as soft deletions so they can be undone.
        for (id, prev_element) in prev {
            if !next.contains_key(id) && !prev_element.is_deleted {
                delta.removed.insert(
                    id.clone(),
                    Delta::new(
                        ElementPartial::full(prev_element),
                        ElementPartial::deleted_flag(true),
                    ),
                );
            }
        }

        delta
    }

    /// Ids touched by this change.
    pub fn element_ids(&self) -> impl Iterator<Item = &ElementId> {
        self.added
            .keys()
            .chain(self.removed.keys())
            .chain(self.updated.keys())
    }

    fn apply_deltas(
        deltas: &Deltas,
        elements: &mut SceneElements,
        snapshot: &SceneElements,
        materialize: bool,
    ) -> bool {
        let mut visible = false;

        for (id, delta) in deltas {
            let before = elements.get(id).cloned();
            let base = before.clone().or_else(|| snapshot.get(id).cloned());

            let mut element = match base {
                Some(element) => element,
                None if materialize => Element::new(id.clone()),
                None => {
                    tracing::trace!(%id, "Skipping update of unknown element");
                    continue;
                }
            };

            let changed = delta.inserted.apply(&mut element);
            if !changed && before.is_some() {
                continue;
            }
            if changed {
                element.version = element.version.wrapping_add(1);
            }

            visible |= Element::is_visibly_different(before.as_ref(), &element);
            elements.insert(id.clone(), element);
        }

        visible
    }

    fn refresh(deltas: &Deltas, elements: &SceneElements, side: DeltaSide) -> Deltas {
        deltas
            .iter()
            .map(|(id, delta)| {
                let refreshed = match (elements.get(id), side) {
                    (Some(live), DeltaSide::Inserted) => {
                        Delta::new(delta.deleted.clone(), delta.inserted.refreshed_from(live))
                    }
                    (Some(live), DeltaSide::Deleted) => {
                        Delta::new(delta.deleted.refreshed_from(live), delta.inserted.clone())
                    }
                    (None, _) => delta.clone(),
                };
                (id.clone(), refreshed)
            })
            .filter(|(_, delta)| delta.is_different())
            .collect()
    }

    fn invert(deltas: &Deltas) -> Deltas {
        deltas
            .iter()
            .map(|(id, delta)| (id.clone(), delta.inverse()))
            .collect()
    }
}

impl ElementsChange for ElementsDelta {
    type Elements = SceneElements;

    fn inverse(&self) -> Self {
        Self {
            added: Self::invert(&self.removed),
            removed: Self::invert(&self.added),
            updated: Self::invert(&self.updated),
        }
    }

    fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.updated.is_empty()
    }

    fn apply_to(
        &self,
        elements: &SceneElements,
        snapshot: &SceneElements,
    ) -> Result<(SceneElements, bool)> {
        let mut next = elements.clone();

        let mut visible = Self::apply_deltas(&self.removed, &mut next, snapshot, true);
        visible |= Self::apply_deltas(&self.added, &mut next, snapshot, true);
        visible |= Self::apply_deltas(&self.updated, &mut next, snapshot, false);

        Ok((next, visible))
    }

    fn apply_latest_changes(&self, elements: &SceneElements, side: DeltaSide) -> Self {
        Self {
            added: Self::refresh(&self.added, elements, side),
            removed: Self::refresh(&self.removed, elements, side),
            updated: Self::refresh(&self.updated, elements, side),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::scene_from;
    use serde_json::json;

    fn id(s: &str) -> ElementId {
        ElementId::from(s)
    }

    fn rect(id: &str, x: i64) -> Element {
        Element::new(id).with_prop("x", x)
    }

    fn deleted(mut element: Element) -> Element {
        element.is_deleted = true;
        element
    }

    #[test]
    fn test_calculate_classifies_changes() {
        let prev = scene_from([rect("moved", 1), rect("gone", 1), deleted(rect("back", 1))]);
        let next = scene_from([
            rect("moved", 2),
            deleted(rect("gone", 1)),
            rect("back", 1),
            rect("new", 0),
        ]);

        let delta = ElementsDelta::calculate(&prev, &next);

        assert_eq!(delta.updated.len(), 1);
        assert!(delta.updated.contains_key(&id("moved")));
        assert_eq!(delta.removed.len(), 1);
        assert!(delta.removed.contains_key(&id("gone")));
        assert_eq!(delta.added.len(), 2);
        assert!(delta.added.contains_key(&id("back")));
        assert!(delta.added.contains_key(&id("new")));
    }

    #[test]
    fn test_calculate_unchanged_is_empty() {
        let scene = scene_from([rect("a", 1)]);
        assert!(ElementsDelta::calculate(&scene, &scene).is_empty());
    }

    #[test]
    fn test_calculate_hard_removal_becomes_soft_delete() {
        let prev = scene_from([rect("a", 1)]);
        let next = SceneElements::new();

        let delta = ElementsDelta::calculate(&prev, &next);
        let (applied, visible) = delta.apply_to(&prev, &prev).expect("apply");

        assert!(visible);
        assert!(applied[&id("a")].is_deleted);
    }

    #[test]
    fn test_inverse_swaps_added_and_removed() {
        let prev = SceneElements::new();
        let next = scene_from([rect("a", 1)]);
        let delta = ElementsDelta::calculate(&prev, &next);

        let inverse = delta.inverse();
        assert!(inverse.added.is_empty());
        assert_eq!(inverse.removed.len(), 1);
        assert_eq!(inverse.inverse(), delta);
    }

    #[test]
    fn test_apply_creates_then_undo_deletes() {
        let prev = SceneElements::new();
        let next = scene_from([rect("a", 1)]);
        let delta = ElementsDelta::calculate(&prev, &next);

        let (undone, visible) = delta.inverse().apply_to(&next, &next).expect("undo");
        assert!(visible);
        let element = &undone[&id("a")];
        assert!(element.is_deleted);
        assert_eq!(element.version, 2);

        let (redone, visible) = delta.apply_to(&undone, &next).expect("redo");
        assert!(visible);
        assert!(!redone[&id("a")].is_deleted);
        assert_eq!(redone[&id("a")].prop("x"), Some(&json!(1)));
    }

    #[test]
    fn test_apply_wraps_version_at_max() {
        let mut element = rect("a", 1);
        element.version = u32::MAX;
        let live = scene_from([element]);
        let delta = ElementsDelta::calculate(&live, &scene_from([rect("a", 2)]));

        let (applied, visible) = delta.apply_to(&live, &live).expect("apply");
        assert!(visible);
        assert_eq!(applied[&id("a")].version, 0);
        assert_eq!(applied[&id("a")].prop("x"), Some(&json!(2)));
    }

    #[test]
    fn test_apply_falls_back_to_snapshot() {
        let snapshot = scene_from([deleted(rect("a", 1))]);
        let live = SceneElements::new();
        let delta = ElementsDelta::calculate(&snapshot, &scene_from([rect("a", 1)]));

        let (applied, visible) = delta.apply_to(&live, &snapshot).expect("apply");
        assert!(visible);
        assert!(!applied[&id("a")].is_deleted);
    }

    #[test]
    fn test_update_of_deleted_element_is_invisible() {
        let prev = scene_from([rect("a", 1)]);
        let next = scene_from([rect("a", 2)]);
        let delta = ElementsDelta::calculate(&prev, &next);

        // A collaborator deleted the element in the meantime.
        let live = scene_from([deleted(rect("a", 2))]);
        let (applied, visible) = delta.inverse().apply_to(&live, &live).expect("apply");

        assert!(!visible);
        assert_eq!(applied[&id("a")].prop("x"), Some(&json!(1)));
    }

    #[test]
    fn test_update_of_unknown_element_is_skipped() {
        let prev = scene_from([rect("a", 1)]);
        let next = scene_from([rect("a", 2)]);
        let delta = ElementsDelta::calculate(&prev, &next);

        let empty = SceneElements::new();
        let (applied, visible) = delta.apply_to(&empty, &empty).expect("apply");
        assert!(!visible);
        assert!(applied.is_empty());
    }

    #[test]
    fn test_apply_already_in_target_state_is_invisible() {
        let prev = scene_from([rect("a", 1)]);
        let next = scene_from([rect("a", 2)]);
        let delta = ElementsDelta::calculate(&prev, &next);

        let (applied, visible) = delta.apply_to(&next, &next).expect("apply");
        assert!(!visible);
        assert_eq!(applied, next);
    }

    #[test]
    fn test_apply_latest_changes_refreshes_chosen_side() {
        let prev = scene_from([rect("a", 1)]);
        let next = scene_from([rect("a", 2)]);
        let delta = ElementsDelta::calculate(&prev, &next);

        let live = scene_from([rect("a", 7)]);

        let rebased = delta.apply_latest_changes(&live, DeltaSide::Inserted);
        let updated = &rebased.updated[&id("a")];
        assert_eq!(updated.deleted.props["x"], json!(1));
        assert_eq!(updated.inserted.props["x"], json!(7));

        let rebased = delta.apply_latest_changes(&live, DeltaSide::Deleted);
        let updated = &rebased.updated[&id("a")];
        assert_eq!(updated.deleted.props["x"], json!(7));
        assert_eq!(updated.inserted.props["x"], json!(2));
    }

    #[test]
    fn test_apply_latest_changes_drops_converged_deltas() {
        let prev = scene_from([rect("a", 1)]);
        let next = scene_from([rect("a", 2)]);
        let delta = ElementsDelta::calculate(&prev, &next);

        let live = scene_from([rect("a", 1)]);
        assert!(delta
            .apply_latest_changes(&live, DeltaSide::Inserted)
            .is_empty());
    }

    #[test]
    fn test_apply_latest_changes_keeps_unknown_elements() {
        let prev = scene_from([rect("a", 1)]);
        let next = scene_from([rect("a", 2)]);
        let delta = ElementsDelta::calculate(&prev, &next);

        let rebased = delta.apply_latest_changes(&SceneElements::new(), DeltaSide::Inserted);
        assert_eq!(rebased, delta);
    }
}
