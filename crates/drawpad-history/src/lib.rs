/// Undo/redo history for collaboratively edited documents.
///
/// Provides a `History` that keeps reversible entries on undo and redo
/// stacks and replays them against the live document. Entries are rebased
/// before use so that edits made by other actors in the meantime are
/// respected, and entries that no longer change anything are skipped.
pub mod change;
pub mod config;
pub mod emitter;
pub mod entry;
pub mod manager;
pub mod snapshot;

#[cfg(test)]
mod testing;

pub use change::{AppStateChange, DeltaSide, ElementsChange};
pub use config::HistoryConfig;
pub use emitter::{Emitter, SubscriptionId};
pub use entry::HistoryEntry;
pub use manager::{History, HistoryChangedEvent};
pub use snapshot::Snapshot;
