// Small change algebras used by the unit tests: a document is a map of
// named integers, app state is an optional selected key.
use std::collections::BTreeMap;

use anyhow::{bail, Result};

use crate::change::{AppStateChange, DeltaSide, ElementsChange};
use crate::snapshot::Snapshot;

pub(crate) type Doc = BTreeMap<String, i64>;
pub(crate) type Selection = Option<String>;

pub(crate) fn doc(pairs: &[(&str, i64)]) -> Doc {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

pub(crate) fn snapshot(elements: &Doc) -> Snapshot<Doc, Selection> {
    Snapshot::new(elements.clone(), None)
}

/// `(key, deleted, inserted)` triples.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ValueChange {
    pub entries: Vec<(String, i64, i64)>,
    pub fail: bool,
    pub panics: bool,
}

pub(crate) fn set(key: &str, from: i64, to: i64) -> ValueChange {
    ValueChange {
        entries: vec![(key.to_string(), from, to)],
        ..ValueChange::default()
    }
}

pub(crate) fn failing() -> ValueChange {
    ValueChange {
        entries: vec![("boom".to_string(), 0, 1)],
        fail: true,
        panics: false,
    }
}

pub(crate) fn panicking() -> ValueChange {
    ValueChange {
        entries: vec![("boom".to_string(), 0, 1)],
        fail: false,
        panics: true,
    }
}

impl ElementsChange for ValueChange {
    type Elements = Doc;

    fn inverse(&self) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .map(|(k, deleted, inserted)| (k.clone(), *inserted, *deleted))
                .collect(),
            fail: self.fail,
            panics: self.panics,
        }
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn apply_to(&self, elements: &Doc, _snapshot: &Doc) -> Result<(Doc, bool)> {
        if self.fail {
            bail!("value change is corrupted");
        }
        assert!(!self.panics, "value change blew up");
        let mut next = elements.clone();
        let mut visible = false;
        for (key, _, inserted) in &self.entries {
            if let Some(value) = next.get_mut(key) {
                if *value != *inserted {
                    *value = *inserted;
                    visible = true;
                }
            }
        }
        Ok((next, visible))
    }

    fn apply_latest_changes(&self, elements: &Doc, side: DeltaSide) -> Self {
        let entries = self
            .entries
            .iter()
            .map(|(key, deleted, inserted)| match (elements.get(key), side) {
                (Some(live), DeltaSide::Inserted) => (key.clone(), *deleted, *live),
                (Some(live), DeltaSide::Deleted) => (key.clone(), *live, *inserted),
                (None, _) => (key.clone(), *deleted, *inserted),
            })
            .filter(|(_, deleted, inserted)| deleted != inserted)
            .collect();
        Self {
            entries,
            fail: self.fail,
            panics: self.panics,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct SelectionChange {
    pub deleted: Selection,
    pub inserted: Selection,
}

pub(crate) fn select(from: Option<&str>, to: Option<&str>) -> SelectionChange {
    SelectionChange {
        deleted: from.map(str::to_string),
        inserted: to.map(str::to_string),
    }
}

impl AppStateChange<Doc> for SelectionChange {
    type AppState = Selection;

    fn inverse(&self) -> Self {
        Self {
            deleted: self.inserted.clone(),
            inserted: self.deleted.clone(),
        }
    }

    fn is_empty(&self) -> bool {
        self.deleted == self.inserted
    }

    fn apply_to(&self, app_state: &Selection, elements: &Doc) -> Result<(Selection, bool)> {
        let next = self
            .inserted
            .clone()
            .filter(|key| elements.contains_key(key));
        let visible = next != *app_state;
        Ok((next, visible))
    }
}
