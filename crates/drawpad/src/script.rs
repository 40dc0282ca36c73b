/// Replay scripts: a JSON list of editing steps run against a session.
use std::path::Path;

use anyhow::{Context, Result};
use drawpad_history::HistoryChangedEvent;
use drawpad_scene::{AppState, Element, ElementId, Origin, SceneElements, Session};
use serde::{Deserialize, Serialize};

/// A replay script.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Script {
    /// Scene to start from. History starts empty.
    #[serde(default)]
    pub initial: Vec<Element>,
    pub steps: Vec<Step>,
}

/// One scripted action.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Upsert { element: Element },
    Delete { id: ElementId },
    Select { ids: Vec<ElementId> },
    Background { color: String },
    RemoteUpsert { element: Element },
    RemoteDelete { id: ElementId },
    Undo,
    Redo,
    Clear,
}

/// Final state printed after a replay.
#[derive(Debug, Serialize)]
pub struct Outcome {
    pub elements: SceneElements,
    pub app_state: AppState,
    pub history: HistoryChangedEvent,
}

impl Script {
    /// Reads a script from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse script {}", path.display()))
    }

    /// Runs every step against `session`.
    ///
    /// # Errors
    ///
    /// Returns an error if an undo or redo step fails.
    pub fn run(&self, session: &mut Session) -> Result<Outcome> {
        if !self.initial.is_empty() {
            let elements = self.initial.iter().cloned().map(|e| (e.id.clone(), e)).collect();
            session.load(elements, AppState::default());
        }

        for (index, step) in self.steps.iter().enumerate() {
            tracing::debug!(index, ?step, "Running step");
            run_step(session, step).with_context(|| format!("Step {index} failed"))?;
        }

        Ok(Outcome {
            elements: session.elements().clone(),
            app_state: session.app_state().clone(),
            history: session.history().state(),
        })
    }
}

fn with_id(mut element: Element) -> Element {
    if element.id.as_str().is_empty() {
        element.id = ElementId::random();
    }
    element
}

fn run_step(session: &mut Session, step: &Step) -> Result<()> {
    match step {
        Step::Upsert { element } => {
            session.upsert_element(with_id(element.clone()), Origin::Local)
        }
        Step::RemoteUpsert { element } => {
            session.upsert_element(with_id(element.clone()), Origin::Remote)
        }
        Step::Delete { id } => {
            if !session.delete_element(id, Origin::Local) {
                tracing::warn!("Nothing to delete for {id}");
            }
        }
        Step::RemoteDelete { id } => {
            if !session.delete_element(id, Origin::Remote) {
                tracing::warn!("Nothing to delete for {id}");
            }
        }
        Step::Select { ids } => session.select(ids.iter().cloned()),
        Step::Background { color } => session.set_background(color),
        Step::Undo => {
            if !session.undo()? {
                tracing::info!("Nothing to undo");
            }
        }
        Step::Redo => {
            if !session.redo()? {
                tracing::info!("Nothing to redo");
            }
        }
        Step::Clear => session.clear_history(),
    }
    Ok(())
}
