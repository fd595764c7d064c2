use grouping::{derive_groupings, Groupings};
use shared::domain::{
    Assignment, Durations, ExpertGroups, HomeGroups, PhaseTimer, Roster, Seed, TopicList,
};

/// Everything one running session knows. Owned by [`crate::PhaseController`].
#[derive(Debug, Clone)]
pub struct SessionState {
    pub(crate) class_name: String,
    pub(crate) roster: Roster,
    pub(crate) topics: TopicList,
    pub(crate) durations: Durations,
    pub(crate) seed: Seed,
    pub(crate) assignment: Assignment,
    pub(crate) experts: ExpertGroups,
    pub(crate) home_groups: HomeGroups,
    pub(crate) timer: PhaseTimer,
}

impl SessionState {
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn topics(&self) -> &TopicList {
        &self.topics
    }

    pub fn durations(&self) -> Durations {
        self.durations
    }

    pub fn seed(&self) -> Seed {
        self.seed
    }

    pub fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    pub fn experts(&self) -> &ExpertGroups {
        &self.experts
    }

    pub fn home_groups(&self) -> &HomeGroups {
        &self.home_groups
    }

    pub fn timer(&self) -> PhaseTimer {
        self.timer
    }

    /// Rebuilds expert and home groups from the current assignment.
    pub(crate) fn regroup(&mut self) {
        let Groupings { experts, home } = derive_groupings(&self.assignment);
        self.experts = experts;
        self.home_groups = home;
    }
}
