use std::{collections::BTreeMap, fmt};

use rand::Rng;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{JigsawError, Result};

pub const DEFAULT_DUR_READ: u32 = 8;
pub const DEFAULT_DUR_EXPERT: u32 = 12;
pub const DEFAULT_DUR_STAMM: u32 = 15;

/// Largest seed handed out by [`Seed::random`]; keeps seeds short enough to
/// read aloud in class.
pub const MAX_SEED: u64 = 999_999;

macro_rules! name_list {
    ($name:ident) => {
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
        #[serde(transparent)]
        pub struct $name(Vec<String>);

        impl $name {
            /// Trims every entry, drops blanks and keeps the first occurrence
            /// of each duplicate.
            pub fn from_names<I, S>(names: I) -> Self
            where
                I: IntoIterator<Item = S>,
                S: AsRef<str>,
            {
                let mut out: Vec<String> = Vec::new();
                for name in names {
                    let name = name.as_ref().trim();
                    if !name.is_empty() && !out.iter().any(|seen| seen == name) {
                        out.push(name.to_string());
                    }
                }
                Self(out)
            }

            pub fn as_slice(&self) -> &[String] {
                &self.0
            }

            pub fn len(&self) -> usize {
                self.0.len()
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            pub fn contains(&self, name: &str) -> bool {
                self.0.iter().any(|entry| entry == name)
            }

            pub fn iter(&self) -> impl Iterator<Item = &str> {
                self.0.iter().map(String::as_str)
            }
        }
    };
}

name_list!(Roster);
name_list!(TopicList);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Seed(pub u64);

impl Seed {
    pub fn random() -> Self {
        Self(rand::thread_rng().gen_range(0..=MAX_SEED))
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06}", self.0)
    }
}

/// Learner → topic mapping.
///
/// Entries keep the order in which the engine assigned them; reassigning a
/// learner updates the entry in place. Serialized as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    entries: Vec<(String, String)>,
}

impl Assignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the learner's topic, returning the previous one.
    pub fn insert(&mut self, learner: impl Into<String>, topic: impl Into<String>) -> Option<String> {
        let learner = learner.into();
        let topic = topic.into();
        match self.entries.iter_mut().find(|(name, _)| *name == learner) {
            Some((_, current)) => Some(std::mem::replace(current, topic)),
            None => {
                self.entries.push((learner, topic));
                None
            }
        }
    }

    pub fn topic_of(&self, learner: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == learner)
            .map(|(_, topic)| topic.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(learner, topic)| (learner.as_str(), topic.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Assignment {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpertGroup {
    pub topic: String,
    /// Alphabetically sorted.
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExpertGroups(Vec<ExpertGroup>);

impl ExpertGroups {
    pub fn from_groups(groups: Vec<ExpertGroup>) -> Self {
        Self(groups)
    }

    pub fn get(&self, topic: &str) -> Option<&[String]> {
        self.0
            .iter()
            .find(|group| group.topic == topic)
            .map(|group| group.members.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExpertGroup> {
        self.0.iter()
    }

    /// Number of topics with at least one member.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Size of the largest bucket, 0 when there are no buckets.
    pub fn largest(&self) -> usize {
        self.0
            .iter()
            .map(|group| group.members.len())
            .max()
            .unwrap_or(0)
    }

    pub fn member_count(&self) -> usize {
        self.0.iter().map(|group| group.members.len()).sum()
    }

    /// One bucket per listed topic, in list order; topics nobody was assigned
    /// to show up empty.
    pub fn covering(&self, topics: &TopicList) -> Vec<ExpertGroup> {
        topics
            .iter()
            .map(|topic| ExpertGroup {
                topic: topic.to_string(),
                members: self.get(topic).map(<[String]>::to_vec).unwrap_or_default(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HomeMember {
    pub learner: String,
    pub topic: String,
}

pub type HomeGroup = Vec<HomeMember>;

/// Mixed "Stammgruppen": at most one learner per topic in each group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HomeGroups(Vec<HomeGroup>);

impl HomeGroups {
    pub fn from_groups(groups: Vec<HomeGroup>) -> Self {
        Self(groups)
    }

    pub fn as_slice(&self) -> &[HomeGroup] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &HomeGroup> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Topic-independent random groups, built on demand outside the timed session.
pub type SimpleGroups = Vec<Vec<String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Reading,
    Expert,
    Home,
}

impl Phase {
    pub fn number(self) -> u8 {
        match self {
            Self::Reading => 1,
            Self::Expert => 2,
            Self::Home => 3,
        }
    }

    pub fn next(self) -> Option<Self> {
        match self {
            Self::Reading => Some(Self::Expert),
            Self::Expert => Some(Self::Home),
            Self::Home => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Reading => "Individual reading",
            Self::Expert => "Expert groups",
            Self::Home => "Home groups",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Phase {} - {}", self.number(), self.title())
    }
}

/// Phase lengths in whole minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Durations {
    pub read: u32,
    pub expert: u32,
    pub stamm: u32,
}

impl Default for Durations {
    fn default() -> Self {
        Self {
            read: DEFAULT_DUR_READ,
            expert: DEFAULT_DUR_EXPERT,
            stamm: DEFAULT_DUR_STAMM,
        }
    }
}

impl Durations {
    pub fn minutes(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Reading => self.read,
            Phase::Expert => self.expert,
            Phase::Home => self.stamm,
        }
    }

    pub fn seconds(&self, phase: Phase) -> u32 {
        self.minutes(phase).saturating_mul(60)
    }

    pub fn validate(&self) -> Result<()> {
        for phase in [Phase::Reading, Phase::Expert, Phase::Home] {
            if self.minutes(phase) == 0 {
                return Err(JigsawError::configuration(format!(
                    "duration for phase {} must be at least 1 minute",
                    phase.number()
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhaseTimer {
    pub phase: Phase,
    pub seconds_left: u32,
    pub running: bool,
}

impl PhaseTimer {
    /// Timer state on entry into `phase`: full duration, paused.
    pub fn entering(phase: Phase, durations: &Durations) -> Self {
        Self {
            phase,
            seconds_left: durations.seconds(phase),
            running: false,
        }
    }
}

/// A saved class as kept by the class store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassConfig {
    pub students: Vec<String>,
    pub topics: Vec<String>,
    pub dur_read: u32,
    pub dur_expert: u32,
    pub dur_stamm: u32,
}

impl ClassConfig {
    pub fn new(students: &Roster, topics: &TopicList, durations: Durations) -> Self {
        Self {
            students: students.as_slice().to_vec(),
            topics: topics.as_slice().to_vec(),
            dur_read: durations.read,
            dur_expert: durations.expert,
            dur_stamm: durations.stamm,
        }
    }

    pub fn durations(&self) -> Durations {
        Durations {
            read: self.dur_read,
            expert: self.dur_expert,
            stamm: self.dur_stamm,
        }
    }
}

/// Saved classes keyed by class name, sorted by name.
pub type SavedClasses = BTreeMap<String, ClassConfig>;

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
