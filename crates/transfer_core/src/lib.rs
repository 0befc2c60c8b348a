//! Transfer core: pure polling state machine and view-model helpers.
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::{CycleOutcome, Msg};
pub use state::{AppState, NetworkStatus, PollingState};
pub use update::update;
pub use view_model::AppViewModel;
