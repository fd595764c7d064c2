//! Pure grouping functions: topic assignment, expert groups, home groups and
//! topic-independent random groups.
//!
//! Every function here is deterministic given its inputs (and seed); callers
//! recompute derived groupings from scratch after each assignment change.

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use shared::{
    domain::{
        Assignment, ExpertGroup, ExpertGroups, HomeGroup, HomeGroups, HomeMember, Seed,
        SimpleGroups,
    },
    error::{JigsawError, Result},
};

/// Expert and home groups derived from one assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Groupings {
    pub experts: ExpertGroups,
    pub home: HomeGroups,
}

/// Assigns every learner one topic, spreading learners as evenly as possible.
///
/// The roster is permuted with a generator seeded only by `seed`, then the
/// i-th learner of the permutation gets `topics[i % topics.len()]`. Bucket
/// sizes therefore differ by at most one; the first topics take the remainder.
pub fn assign_topics_evenly(roster: &[String], topics: &[String], seed: Seed) -> Result<Assignment> {
    if topics.is_empty() {
        return Err(JigsawError::configuration(
            "at least one topic is required to assign learners",
        ));
    }

    let mut shuffled = roster.to_vec();
    shuffled.shuffle(&mut StdRng::seed_from_u64(seed.0));

    let mut assignment = Assignment::new();
    for (index, learner) in shuffled.into_iter().enumerate() {
        assignment.insert(learner, topics[index % topics.len()].clone());
    }
    Ok(assignment)
}

/// Inverts an assignment into topic buckets with alphabetically sorted members.
///
/// Buckets appear in the order their topic is first seen in the assignment;
/// topics nobody holds are absent.
pub fn invert_to_experts(assignment: &Assignment) -> ExpertGroups {
    let mut groups: Vec<ExpertGroup> = Vec::new();
    for (learner, topic) in assignment.iter() {
        match groups.iter_mut().find(|group| group.topic == topic) {
            Some(group) => group.members.push(learner.to_string()),
            None => groups.push(ExpertGroup {
                topic: topic.to_string(),
                members: vec![learner.to_string()],
            }),
        }
    }
    for group in &mut groups {
        group.members.sort();
    }
    ExpertGroups::from_groups(groups)
}

/// Deals each topic's experts round-robin across as many home groups as the
/// largest expert group has members.
///
/// No home group receives two experts of the same topic; smaller topics leave
/// the trailing groups without a representative.
pub fn build_home_groups(experts: &ExpertGroups) -> HomeGroups {
    let count = experts.largest();
    if count == 0 {
        return HomeGroups::default();
    }

    let mut groups: Vec<HomeGroup> = vec![Vec::new(); count];
    for group in experts.iter() {
        for (index, learner) in group.members.iter().enumerate() {
            groups[index % count].push(HomeMember {
                learner: learner.clone(),
                topic: group.topic.clone(),
            });
        }
    }
    HomeGroups::from_groups(groups)
}

/// Expert groups and the home groups dealt from them, rebuilt from scratch.
pub fn derive_groupings(assignment: &Assignment) -> Groupings {
    let experts = invert_to_experts(assignment);
    let home = build_home_groups(&experts);
    Groupings { experts, home }
}

/// Splits the roster into `group_count` random groups, ignoring topics.
///
/// More groups than learners clamps to one learner per group. Without a seed
/// the thread-local generator is used and the result is not reproducible.
pub fn build_simple_groups(
    roster: &[String],
    group_count: usize,
    seed: Option<Seed>,
) -> Result<SimpleGroups> {
    if group_count < 1 {
        return Err(JigsawError::configuration(
            "group count must be at least 1",
        ));
    }
    if roster.is_empty() {
        return Err(JigsawError::configuration(
            "at least one learner is required to build groups",
        ));
    }

    let count = group_count.min(roster.len());
    let mut shuffled = roster.to_vec();
    match seed {
        Some(seed) => shuffled.shuffle(&mut StdRng::seed_from_u64(seed.0)),
        None => shuffled.shuffle(&mut rand::thread_rng()),
    }

    let mut groups: SimpleGroups = vec![Vec::new(); count];
    for (index, learner) in shuffled.into_iter().enumerate() {
        groups[index % count].push(learner);
    }
    Ok(groups)
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
