/// Scene model for drawpad: elements, app state and their reversible
/// deltas, plus the store and session that feed them into history.
pub mod app_state;
pub mod app_state_delta;
pub mod delta;
pub mod element;
pub mod elements_delta;
pub mod session;
pub mod store;

pub use app_state::{AppState, AppStatePartial};
pub use app_state_delta::AppStateDelta;
pub use delta::{Delta, ElementPartial};
pub use element::{scene_from, Element, ElementId, SceneElements};
pub use elements_delta::ElementsDelta;
pub use session::{Origin, SceneHistory, Session};
pub use store::{Increment, SceneSnapshot, Store, StoreAction};
