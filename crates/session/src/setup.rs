use grouping::build_simple_groups;
use shared::{
    domain::{ClassConfig, Durations, Roster, Seed, SimpleGroups, TopicList},
    error::{JigsawError, Result},
};

use crate::PhaseController;

pub const MIN_LEARNERS: usize = 2;
pub const MIN_TOPICS: usize = 2;

/// The pre-session configuration stage.
///
/// Nothing here is validated until [`SessionSetup::start`]; a rejected start
/// leaves the setup as it was so the operator can fix it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSetup {
    pub class_name: String,
    pub roster: Roster,
    pub topics: TopicList,
    pub durations: Durations,
    pub seed: Seed,
}

impl Default for SessionSetup {
    fn default() -> Self {
        Self {
            class_name: String::new(),
            roster: Roster::default(),
            topics: TopicList::default(),
            durations: Durations::default(),
            seed: Seed::random(),
        }
    }
}

impl SessionSetup {
    pub fn new(roster: Roster, topics: TopicList) -> Self {
        Self {
            roster,
            topics,
            ..Self::default()
        }
    }

    /// Loads a saved class. The seed is drawn fresh on every load.
    pub fn from_class(name: &str, config: &ClassConfig) -> Self {
        Self {
            class_name: name.trim().to_string(),
            roster: Roster::from_names(&config.students),
            topics: TopicList::from_names(&config.topics),
            durations: config.durations(),
            seed: Seed::random(),
        }
    }

    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = class_name.into();
        self
    }

    pub fn with_durations(mut self, durations: Durations) -> Self {
        self.durations = durations;
        self
    }

    pub fn with_seed(mut self, seed: Seed) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.roster.len() < MIN_LEARNERS {
            return Err(JigsawError::configuration(format!(
                "at least {MIN_LEARNERS} learners are required, got {}",
                self.roster.len()
            )));
        }
        if self.topics.len() < MIN_TOPICS {
            return Err(JigsawError::configuration(format!(
                "at least {MIN_TOPICS} topics are required, got {}",
                self.topics.len()
            )));
        }
        self.durations.validate()
    }

    pub fn start(self) -> Result<PhaseController> {
        PhaseController::start(self)
    }

    /// Random groups over the current roster, ignoring topics.
    ///
    /// Without `seed` a fresh one is drawn per call. The seed used is returned
    /// alongside the groups so they can be reproduced.
    pub fn simple_groups(
        &self,
        group_count: usize,
        seed: Option<Seed>,
    ) -> Result<(SimpleGroups, Seed)> {
        let seed = seed.unwrap_or_else(Seed::random);
        let groups = build_simple_groups(self.roster.as_slice(), group_count, Some(seed))?;
        Ok((groups, seed))
    }
}
