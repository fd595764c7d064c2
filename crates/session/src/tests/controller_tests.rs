use std::collections::HashSet;

use shared::{
    domain::{Durations, Roster, TopicList},
    error::ErrorCode,
};

use super::*;

fn setup(learners: &[&str], topics: &[&str]) -> SessionSetup {
    SessionSetup::new(Roster::from_names(learners), TopicList::from_names(topics))
        .with_class_name("7b")
        .with_seed(Seed(1))
        .with_durations(Durations {
            read: 2,
            expert: 3,
            stamm: 4,
        })
}

fn started() -> PhaseController {
    setup(&["Ada", "Ben", "Cem", "Dora", "Emil"], &["Water", "Fire"])
        .start()
        .expect("session")
}

fn home_has_no_duplicate_topic(controller: &PhaseController) -> bool {
    controller.state().home_groups().iter().all(|group| {
        let topics: HashSet<&str> = group.iter().map(|m| m.topic.as_str()).collect();
        topics.len() == group.len()
    })
}

#[test]
fn starts_paused_in_reading_phase_with_full_duration() {
    let controller = started();
    let timer = controller.timer();
    assert_eq!(timer.phase, Phase::Reading);
    assert_eq!(timer.seconds_left, 120);
    assert!(!timer.running);
    assert_eq!(controller.assignment().len(), 5);
    assert_eq!(controller.state().experts().member_count(), 5);
    assert_eq!(
        controller.state().home_groups().len(),
        controller.state().experts().largest()
    );
}

#[test]
fn start_rejects_too_few_learners_or_topics() {
    let err = setup(&["Ada"], &["Water", "Fire"])
        .start()
        .expect_err("one learner");
    assert_eq!(err.code, ErrorCode::Configuration);

    let err = setup(&["Ada", "Ben"], &["Water"])
        .start()
        .expect_err("one topic");
    assert_eq!(err.code, ErrorCode::Configuration);

    let err = setup(&["Ada", "Ben"], &["Water", "Water"])
        .start()
        .expect_err("duplicate topics collapse to one");
    assert_eq!(err.code, ErrorCode::Configuration);
}

#[test]
fn start_rejects_zero_minute_phase() {
    let err = setup(&["Ada", "Ben"], &["Water", "Fire"])
        .with_durations(Durations {
            read: 1,
            expert: 1,
            stamm: 0,
        })
        .start()
        .expect_err("zero minutes");
    assert_eq!(err.code, ErrorCode::Configuration);
}

#[test]
fn same_seed_gives_same_session() {
    let first = started();
    let second = started();
    assert_eq!(first.assignment(), second.assignment());
    assert_eq!(first.state().home_groups(), second.state().home_groups());
}

#[test]
fn toggle_keeps_remaining_time() {
    let mut controller = started();
    assert!(controller.toggle_run());
    assert_eq!(
        controller.tick(),
        TickOutcome::Counting { seconds_left: 119 }
    );
    assert!(!controller.toggle_run());
    assert_eq!(controller.timer().seconds_left, 119);
    assert_eq!(controller.tick(), TickOutcome::Idle);
    assert_eq!(controller.timer().seconds_left, 119);
}

#[test]
fn ticking_down_stops_at_zero() {
    let mut controller = started();
    controller.toggle_run();
    let total = controller.timer().seconds_left;

    for _ in 1..total {
        assert!(matches!(controller.tick(), TickOutcome::Counting { .. }));
    }
    assert_eq!(controller.tick(), TickOutcome::Elapsed);
    assert_eq!(controller.timer().seconds_left, 0);
    assert!(!controller.is_running());

    assert_eq!(controller.tick(), TickOutcome::Idle);
    assert_eq!(controller.timer().seconds_left, 0);
}

#[test]
fn starting_at_zero_elapses_on_first_tick() {
    let mut controller = started();
    controller.toggle_run();
    while controller.tick() != TickOutcome::Elapsed {}
    assert!(controller.toggle_run());
    assert_eq!(controller.tick(), TickOutcome::Elapsed);
    assert_eq!(controller.timer().seconds_left, 0);
    assert!(!controller.is_running());
}

#[test]
fn extend_at_zero_while_paused_adds_a_minute_and_stays_paused() {
    let mut controller = started();
    controller.toggle_run();
    while controller.tick() != TickOutcome::Elapsed {}

    assert_eq!(controller.extend(), 60);
    assert_eq!(controller.timer().seconds_left, 60);
    assert!(!controller.is_running());
}

#[test]
fn extend_while_running_keeps_running() {
    let mut controller = started();
    controller.toggle_run();
    assert_eq!(controller.extend(), 180);
    assert!(controller.is_running());
}

#[test]
fn extend_works_in_later_phases_paused_or_running() {
    let mut controller = started();
    controller.advance_phase();
    assert_eq!(controller.phase(), Phase::Expert);
    assert_eq!(controller.extend(), 240);
    assert!(!controller.is_running());

    controller.advance_phase();
    assert_eq!(controller.phase(), Phase::Home);
    controller.toggle_run();
    controller.tick();
    assert_eq!(controller.extend(), 299);
    assert!(controller.is_running());
    assert_eq!(
        controller.tick(),
        TickOutcome::Counting { seconds_left: 298 }
    );
}

#[test]
fn advance_walks_phases_and_resets_timer() {
    let mut controller = started();
    controller.toggle_run();
    controller.tick();

    assert_eq!(controller.advance_phase(), Advance::Entered(Phase::Expert));
    let timer = controller.timer();
    assert_eq!(timer.seconds_left, 180);
    assert!(!timer.running);

    controller.toggle_run();
    assert_eq!(controller.advance_phase(), Advance::Entered(Phase::Home));
    let timer = controller.timer();
    assert_eq!(timer.seconds_left, 240);
    assert!(!timer.running);
}

#[test]
fn advance_from_home_phase_changes_nothing() {
    let mut controller = started();
    controller.advance_phase();
    controller.advance_phase();
    controller.toggle_run();
    controller.tick();
    let before = controller.snapshot();

    assert_eq!(controller.advance_phase(), Advance::SessionComplete);
    assert_eq!(controller.snapshot(), before);
}

#[test]
fn reassign_moves_learner_and_rebuilds_groups() {
    let mut controller = started();
    let current = controller.assignment().topic_of("Ada").expect("assigned").to_string();
    let target = if current == "Water" { "Fire" } else { "Water" };

    controller.reassign("Ada", target).expect("reassign");

    assert_eq!(controller.assignment().topic_of("Ada"), Some(target));
    let experts = controller.state().experts();
    assert!(experts.get(target).expect("bucket").iter().any(|m| m == "Ada"));
    assert_eq!(experts.member_count(), 5);
    assert_eq!(controller.state().home_groups().len(), experts.largest());
    assert!(home_has_no_duplicate_topic(&controller));
}

#[test]
fn moving_everyone_to_one_topic_empties_the_other_bucket() {
    let mut controller = started();
    for learner in ["Ada", "Ben", "Cem", "Dora", "Emil"] {
        controller.reassign(learner, "Fire").expect("reassign");
    }
    let experts = controller.state().experts();
    assert_eq!(experts.len(), 1);
    assert_eq!(controller.state().home_groups().len(), 5);

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.experts.len(), 2);
    assert!(snapshot.experts[0].members.is_empty());
}

#[test]
fn reassign_to_unknown_topic_or_learner_leaves_assignment_untouched() {
    let mut controller = started();
    let before = controller.assignment().clone();

    let err = controller.reassign("Ada", "Air").expect_err("unknown topic");
    assert_eq!(err.code, ErrorCode::InvalidOperation);
    let err = controller.reassign("Zoe", "Fire").expect_err("unknown learner");
    assert_eq!(err.code, ErrorCode::InvalidOperation);

    assert_eq!(controller.assignment(), &before);
}

#[test]
fn reading_phase_only_edits_are_rejected_later() {
    let mut controller = started();
    controller.advance_phase();
    let before = controller.snapshot();

    let err = controller.reassign("Ada", "Fire").expect_err("phase 2");
    assert_eq!(err.code, ErrorCode::InvalidOperation);
    let err = controller.reshuffle_all().expect_err("phase 2");
    assert_eq!(err.code, ErrorCode::InvalidOperation);

    assert_eq!(controller.snapshot(), before);
}

#[test]
fn reshuffle_uses_new_seed_and_keeps_buckets_even() {
    let mut controller = started();
    let seed = controller.reshuffle_with_seed(Seed(777)).expect("reshuffle");

    assert_eq!(seed, Seed(777));
    assert_eq!(controller.state().seed(), Seed(777));
    let expected = grouping::assign_topics_evenly(
        controller.state().roster().as_slice(),
        controller.state().topics().as_slice(),
        Seed(777),
    )
    .expect("assignment");
    assert_eq!(controller.assignment(), &expected);

    let sizes: Vec<usize> = controller
        .state()
        .experts()
        .iter()
        .map(|group| group.members.len())
        .collect();
    assert_eq!(sizes.iter().sum::<usize>(), 5);
    assert!(sizes.iter().all(|&size| size == 2 || size == 3));
}

#[test]
fn random_reshuffle_keeps_every_learner() {
    let mut controller = started();
    let seed = controller.reshuffle_all().expect("reshuffle");
    assert_eq!(controller.state().seed(), seed);
    assert_eq!(controller.assignment().len(), 5);
    assert!(home_has_no_duplicate_topic(&controller));
}

#[test]
fn restart_returns_an_empty_setup() {
    let mut controller = started();
    controller.advance_phase();
    let setup = controller.restart();

    assert!(setup.roster.is_empty());
    assert!(setup.topics.is_empty());
    assert!(setup.class_name.is_empty());
    assert_eq!(setup.durations, Durations::default());
}

#[test]
fn snapshot_exposes_clock_and_groups() {
    let controller = started();
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.clock, "02:00");
    assert_eq!(snapshot.phase_number, 1);
    assert_eq!(snapshot.class_name, "7b");

    let json = serde_json::to_value(&snapshot).expect("json");
    assert_eq!(json["phase"], "reading");
    assert_eq!(json["seed"], 1);
    assert_eq!(json["assignment"].as_object().map(|m| m.len()), Some(5));
}
