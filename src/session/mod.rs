//! Generation session: the single-flight state machine and the controller
//! that drives it

mod builder;
mod controller;
mod state;

pub use builder::ControllerBuilder;
pub use controller::{GenerationController, SubmitOutcome};
pub use state::GenerationSession;
