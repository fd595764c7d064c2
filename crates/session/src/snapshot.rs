use serde::Serialize;
use shared::{
    domain::{Assignment, ExpertGroup, HomeGroups, Phase, Seed, TopicList},
    text::format_clock,
};

use crate::SessionState;

/// Read-only view of a session for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub class_name: String,
    pub seed: Seed,
    pub phase: Phase,
    pub phase_number: u8,
    pub phase_title: String,
    pub seconds_left: u32,
    /// `seconds_left` as `MM:SS`.
    pub clock: String,
    pub running: bool,
    pub topics: TopicList,
    pub assignment: Assignment,
    /// One entry per listed topic, empty buckets included.
    pub experts: Vec<ExpertGroup>,
    pub home_groups: HomeGroups,
}

impl SessionSnapshot {
    pub(crate) fn capture(state: &SessionState) -> Self {
        let timer = state.timer();
        Self {
            class_name: state.class_name().to_string(),
            seed: state.seed(),
            phase: timer.phase,
            phase_number: timer.phase.number(),
            phase_title: timer.phase.title().to_string(),
            seconds_left: timer.seconds_left,
            clock: format_clock(timer.seconds_left),
            running: timer.running,
            topics: state.topics().clone(),
            assignment: state.assignment().clone(),
            experts: state.experts().covering(state.topics()),
            home_groups: state.home_groups().clone(),
        }
    }
}
