//! Timed jigsaw session: the setup stage, the phase/timer state machine and
//! the countdown that drives it.

mod controller;
mod countdown;
mod runner;
mod setup;
mod snapshot;
mod state;

pub use controller::{Advance, PhaseController, TickOutcome, EXTEND_SECONDS};
pub use countdown::Countdown;
pub use runner::SessionRunner;
pub use setup::{SessionSetup, MIN_LEARNERS, MIN_TOPICS};
pub use snapshot::SessionSnapshot;
pub use state::SessionState;
