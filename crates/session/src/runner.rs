use std::{future, time::Duration};

use shared::{
    domain::{PhaseTimer, Seed},
    error::Result,
};
use tracing::debug;

use crate::{Advance, Countdown, PhaseController, SessionSetup, SessionSnapshot, TickOutcome};

/// Countdown state as seen by the runner.
#[derive(Debug)]
enum CountdownSlot {
    Idle,
    /// Running, but the interval is only armed on the next poll so that the
    /// mutators stay usable outside a tokio runtime.
    Due,
    Armed(Countdown),
}

/// Owns a [`PhaseController`] together with the single countdown feeding it.
///
/// A countdown is pending exactly while the controller's timer is running and
/// is replaced on every phase transition, so two tick streams never act on
/// the same session.
#[derive(Debug)]
pub struct SessionRunner {
    controller: PhaseController,
    countdown: CountdownSlot,
    period: Duration,
}

impl SessionRunner {
    pub fn new(controller: PhaseController, period: Duration) -> Self {
        Self {
            controller,
            countdown: CountdownSlot::Idle,
            period,
        }
    }

    pub fn controller(&self) -> &PhaseController {
        &self.controller
    }

    pub fn timer(&self) -> PhaseTimer {
        self.controller.timer()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.controller.snapshot()
    }

    pub fn has_pending_tick(&self) -> bool {
        !matches!(self.countdown, CountdownSlot::Idle)
    }

    /// Resolves after the next period and applies it to the controller.
    ///
    /// Pends forever while the timer is paused. Cancel-safe, so it can sit in
    /// a `tokio::select!` next to operator input.
    pub async fn next_tick(&mut self) -> TickOutcome {
        if matches!(self.countdown, CountdownSlot::Due) {
            debug!(period_ms = self.period.as_millis() as u64, "countdown armed");
            self.countdown = CountdownSlot::Armed(Countdown::start(self.period));
        }
        match &mut self.countdown {
            CountdownSlot::Armed(countdown) => countdown.tick().await,
            CountdownSlot::Idle | CountdownSlot::Due => future::pending::<()>().await,
        }
        let outcome = self.controller.tick();
        self.sync_countdown();
        outcome
    }

    pub fn toggle_run(&mut self) -> bool {
        let running = self.controller.toggle_run();
        self.sync_countdown();
        running
    }

    pub fn extend(&mut self) -> u32 {
        self.controller.extend()
    }

    pub fn advance_phase(&mut self) -> Advance {
        if self.controller.phase().next().is_some() {
            self.cancel_countdown();
        }
        let advance = self.controller.advance_phase();
        self.sync_countdown();
        advance
    }

    pub fn reassign(&mut self, learner: &str, topic: &str) -> Result<()> {
        self.controller.reassign(learner, topic)
    }

    pub fn reshuffle_all(&mut self) -> Result<Seed> {
        self.controller.reshuffle_all()
    }

    pub fn restart(mut self) -> SessionSetup {
        self.cancel_countdown();
        self.controller.restart()
    }

    fn sync_countdown(&mut self) {
        let running = self.controller.is_running();
        match (&self.countdown, running) {
            (CountdownSlot::Idle, true) => {
                debug!("countdown scheduled");
                self.countdown = CountdownSlot::Due;
            }
            (CountdownSlot::Due | CountdownSlot::Armed(_), false) => self.cancel_countdown(),
            _ => {}
        }
    }

    fn cancel_countdown(&mut self) {
        let previous = std::mem::replace(&mut self.countdown, CountdownSlot::Idle);
        if !matches!(previous, CountdownSlot::Idle) {
            debug!("countdown cancelled");
        }
    }
}

#[cfg(test)]
#[path = "tests/runner_tests.rs"]
mod tests;
