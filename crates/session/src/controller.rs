use grouping::assign_topics_evenly;
use shared::{
    domain::{Assignment, ExpertGroups, HomeGroups, Phase, PhaseTimer, Seed},
    error::{JigsawError, Result},
};
use tracing::{debug, info};

use crate::{SessionSetup, SessionSnapshot, SessionState};

/// Seconds added by one [`PhaseController::extend`].
pub const EXTEND_SECONDS: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The timer is paused; nothing changed.
    Idle,
    Counting { seconds_left: u32 },
    /// The phase ran out; the timer stopped itself at zero.
    Elapsed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Entered(Phase),
    /// Already in the last phase; nothing changed.
    SessionComplete,
}

/// Phase/timer state machine over exactly one [`SessionState`].
///
/// Phases only move forward: reading → expert → home. Assignment edits are
/// accepted during the reading phase only, and every edit rebuilds the
/// expert and home groups from scratch.
#[derive(Debug, Clone)]
pub struct PhaseController {
    state: SessionState,
}

impl PhaseController {
    pub fn start(setup: SessionSetup) -> Result<Self> {
        setup.validate()?;

        let SessionSetup {
            class_name,
            roster,
            topics,
            durations,
            seed,
        } = setup;
        let assignment = assign_topics_evenly(roster.as_slice(), topics.as_slice(), seed)?;
        let mut state = SessionState {
            class_name,
            roster,
            topics,
            durations,
            seed,
            assignment,
            experts: ExpertGroups::default(),
            home_groups: HomeGroups::default(),
            timer: PhaseTimer::entering(Phase::Reading, &durations),
        };
        state.regroup();

        info!(
            class = %state.class_name,
            learners = state.roster.len(),
            topics = state.topics.len(),
            seed = %state.seed,
            "jigsaw session started"
        );
        Ok(Self { state })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.timer.phase
    }

    pub fn timer(&self) -> PhaseTimer {
        self.state.timer
    }

    pub fn is_running(&self) -> bool {
        self.state.timer.running
    }

    pub fn assignment(&self) -> &Assignment {
        &self.state.assignment
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::capture(&self.state)
    }

    /// Starts or pauses the countdown; the remaining time is kept.
    pub fn toggle_run(&mut self) -> bool {
        let timer = &mut self.state.timer;
        timer.running = !timer.running;
        debug!(
            phase = timer.phase.number(),
            running = timer.running,
            seconds_left = timer.seconds_left,
            "timer toggled"
        );
        timer.running
    }

    /// One elapsed second. Stops the timer once it reaches zero.
    pub fn tick(&mut self) -> TickOutcome {
        let timer = &mut self.state.timer;
        if !timer.running {
            return TickOutcome::Idle;
        }

        timer.seconds_left = timer.seconds_left.saturating_sub(1);
        if timer.seconds_left > 0 {
            return TickOutcome::Counting {
                seconds_left: timer.seconds_left,
            };
        }

        timer.running = false;
        info!(phase = timer.phase.number(), "phase time elapsed");
        TickOutcome::Elapsed
    }

    /// Adds [`EXTEND_SECONDS`] in any phase, running or not.
    pub fn extend(&mut self) -> u32 {
        let timer = &mut self.state.timer;
        timer.seconds_left = timer.seconds_left.saturating_add(EXTEND_SECONDS);
        debug!(
            phase = timer.phase.number(),
            seconds_left = timer.seconds_left,
            "phase extended"
        );
        timer.seconds_left
    }

    /// Moves to the next phase, paused with its full duration, and rebuilds
    /// the groups from the live assignment.
    pub fn advance_phase(&mut self) -> Advance {
        let Some(next) = self.state.timer.phase.next() else {
            info!("jigsaw session complete");
            return Advance::SessionComplete;
        };

        self.state.timer = PhaseTimer::entering(next, &self.state.durations);
        self.state.regroup();
        info!(
            phase = next.number(),
            seconds_left = self.state.timer.seconds_left,
            home_groups = self.state.home_groups.len(),
            "entered {next}"
        );
        Advance::Entered(next)
    }

    pub fn reassign(&mut self, learner: &str, topic: &str) -> Result<()> {
        self.ensure_reading_phase("reassignment")?;
        if !self.state.roster.contains(learner) {
            return Err(JigsawError::invalid_operation(format!(
                "'{learner}' is not on the roster"
            )));
        }
        if !self.state.topics.contains(topic) {
            return Err(JigsawError::invalid_operation(format!(
                "'{topic}' is not one of the session topics"
            )));
        }

        let previous = self.state.assignment.insert(learner, topic);
        self.state.regroup();
        info!(
            learner,
            topic,
            previous = previous.as_deref().unwrap_or("-"),
            "learner reassigned"
        );
        Ok(())
    }

    /// Draws a new seed and reassigns every learner.
    pub fn reshuffle_all(&mut self) -> Result<Seed> {
        self.reshuffle_with_seed(Seed::random())
    }

    pub fn reshuffle_with_seed(&mut self, seed: Seed) -> Result<Seed> {
        self.ensure_reading_phase("reshuffling")?;
        let assignment = assign_topics_evenly(
            self.state.roster.as_slice(),
            self.state.topics.as_slice(),
            seed,
        )?;

        self.state.seed = seed;
        self.state.assignment = assignment;
        self.state.regroup();
        info!(seed = %seed, "assignment reshuffled");
        Ok(seed)
    }

    /// Discards the session and hands back an empty setup stage.
    pub fn restart(self) -> SessionSetup {
        info!(
            class = %self.state.class_name,
            phase = self.state.timer.phase.number(),
            "jigsaw session restarted"
        );
        SessionSetup::default()
    }

    fn ensure_reading_phase(&self, action: &str) -> Result<()> {
        match self.state.timer.phase {
            Phase::Reading => Ok(()),
            phase => Err(JigsawError::invalid_operation(format!(
                "{action} is only possible in phase 1 (current: phase {})",
                phase.number()
            ))),
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
