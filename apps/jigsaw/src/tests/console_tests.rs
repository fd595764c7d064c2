use std::time::Duration;

use session::{SessionRunner, SessionSetup};
use shared::domain::{ClassConfig, Durations, Phase, Roster, SavedClasses, Seed, TopicList};
use tokio::io::AsyncBufReadExt;

use super::*;

fn runner() -> SessionRunner {
    let setup = SessionSetup::new(
        Roster::from_names(["Ada", "Ben", "Cleo", "Dev"]),
        TopicList::from_names(["Water", "Fire"]),
    )
    .with_seed(Seed(7));
    let controller = setup.start().expect("valid setup");
    SessionRunner::new(controller, Duration::from_secs(1))
}

#[test]
fn parses_command_words_case_insensitively() {
    assert_eq!(ConsoleCommand::parse("Start"), Ok(Some(ConsoleCommand::Toggle)));
    assert_eq!(ConsoleCommand::parse("s"), Ok(Some(ConsoleCommand::Toggle)));
    assert_eq!(ConsoleCommand::parse(" + "), Ok(Some(ConsoleCommand::Extend)));
    assert_eq!(ConsoleCommand::parse("N"), Ok(Some(ConsoleCommand::Next)));
    assert_eq!(ConsoleCommand::parse("quit"), Ok(Some(ConsoleCommand::Quit)));
    assert_eq!(ConsoleCommand::parse("   "), Ok(None));
}

#[test]
fn rejects_unknown_words() {
    let err = ConsoleCommand::parse("dance").unwrap_err();
    assert!(err.contains("dance"));
}

#[test]
fn assign_accepts_names_with_spaces() {
    assert_eq!(
        ConsoleCommand::parse("assign Anna Maria = Solar Power"),
        Ok(Some(ConsoleCommand::Assign {
            learner: "Anna Maria".into(),
            topic: "Solar Power".into(),
        }))
    );
    assert_eq!(
        ConsoleCommand::parse("assign Ben Fire"),
        Ok(Some(ConsoleCommand::Assign {
            learner: "Ben".into(),
            topic: "Fire".into(),
        }))
    );
    assert!(ConsoleCommand::parse("assign").is_err());
    assert!(ConsoleCommand::parse("assign = Fire").is_err());
}

#[test]
fn toggle_and_extend_report_timer_state() {
    let mut runner = runner();
    assert_eq!(apply(&mut runner, ConsoleCommand::Toggle), "Timer running.");
    assert!(runner.has_pending_tick());
    assert_eq!(apply(&mut runner, ConsoleCommand::Toggle), "Timer paused.");

    let message = apply(&mut runner, ConsoleCommand::Extend);
    assert_eq!(message, "Added one minute, 09:00 left.");
}

#[test]
fn next_walks_through_all_phases() {
    let mut runner = runner();
    assert_eq!(
        apply(&mut runner, ConsoleCommand::Next),
        format!("Entered {}.", Phase::Expert)
    );
    apply(&mut runner, ConsoleCommand::Next);
    assert_eq!(runner.timer().phase, Phase::Home);
    assert_eq!(
        apply(&mut runner, ConsoleCommand::Next),
        "Jigsaw round complete."
    );
}

#[test]
fn assignment_errors_are_shown_not_raised() {
    let mut runner = runner();
    let message = apply(
        &mut runner,
        ConsoleCommand::Assign {
            learner: "Ada".into(),
            topic: "Earth".into(),
        },
    );
    assert!(message.contains("Earth"), "{message}");

    apply(&mut runner, ConsoleCommand::Next);
    let message = apply(&mut runner, ConsoleCommand::Shuffle);
    assert!(message.contains("phase 1"), "{message}");
}

#[test]
fn assign_moves_the_learner() {
    let mut runner = runner();
    let message = apply(
        &mut runner,
        ConsoleCommand::Assign {
            learner: "Ada".into(),
            topic: "Fire".into(),
        },
    );
    assert_eq!(message, "Ada now works on Fire.");
    assert_eq!(
        runner.controller().assignment().topic_of("Ada"),
        Some("Fire")
    );
}

fn saved() -> SavedClasses {
    let mut classes = SavedClasses::new();
    classes.insert(
        "9a".into(),
        ClassConfig::new(
            &Roster::from_names(["Ada", "Ben", "Cem"]),
            &TopicList::from_names(["Water", "Fire"]),
            Durations {
                read: 5,
                expert: 10,
                stamm: 20,
            },
        ),
    );
    classes
}

#[test]
fn parses_setup_commands() {
    assert_eq!(
        SetupCommand::parse("class  9a "),
        Ok(Some(SetupCommand::Class("9a".into())))
    );
    assert_eq!(
        SetupCommand::parse("minutes 5 10 20"),
        Ok(Some(SetupCommand::Minutes(Durations {
            read: 5,
            expert: 10,
            stamm: 20,
        })))
    );
    assert_eq!(
        SetupCommand::parse("seed 42"),
        Ok(Some(SetupCommand::Seed(Seed(42))))
    );
    assert_eq!(SetupCommand::parse(""), Ok(None));
    assert!(SetupCommand::parse("class").is_err());
    assert!(SetupCommand::parse("minutes 5 10").is_err());
    assert!(SetupCommand::parse("seed abc").is_err());
}

#[test]
fn setup_edits_build_a_startable_session() {
    let mut setup = SessionSetup::default();
    let classes = SavedClasses::new();

    assert!(apply_setup(&mut setup, SetupCommand::Start, &classes).is_err());
    apply_setup(
        &mut setup,
        SetupCommand::Students("Ada, Ben; Ada\nCem".into()),
        &classes,
    )
    .expect("students");
    apply_setup(&mut setup, SetupCommand::Topics("Water, Fire".into()), &classes)
        .expect("topics");
    apply_setup(&mut setup, SetupCommand::Seed(Seed(3)), &classes).expect("seed");

    assert_eq!(setup.roster.as_slice(), ["Ada", "Ben", "Cem"]);
    assert_eq!(setup.topics.len(), 2);
    assert_eq!(
        describe_setup(&setup),
        "Class: - | Learners: 3 | Topics: 2 | Minutes: 8/12/15 | Seed: 000003"
    );
    assert!(apply_setup(&mut setup, SetupCommand::Start, &classes).is_ok());
}

#[test]
fn setup_loads_saved_classes_and_rejects_unknown_ones() {
    let mut setup = SessionSetup::default();
    let message = apply_setup(&mut setup, SetupCommand::Class("9a".into()), &saved())
        .expect("class");
    assert_eq!(message, "Loaded class '9a'.");
    assert_eq!(setup.roster.len(), 3);
    assert_eq!(setup.durations.stamm, 20);

    let err = apply_setup(&mut setup, SetupCommand::Class("7b".into()), &saved()).unwrap_err();
    assert!(err.contains("7b"));
    assert_eq!(setup.class_name, "9a");
}

#[test]
fn zero_minutes_are_refused_in_setup() {
    let mut setup = SessionSetup::default();
    let zero = Durations {
        read: 0,
        expert: 1,
        stamm: 1,
    };
    assert!(apply_setup(&mut setup, SetupCommand::Minutes(zero), &saved()).is_err());
    assert_eq!(setup.durations, Durations::default());
}

#[tokio::test(start_paused = true)]
async fn restart_hands_back_an_empty_setup() {
    let mut lines = (&b"start\nnext\nrestart\nshow\n"[..]).lines();
    let exit = run_console(runner(), &mut lines, false).await.expect("console");
    let ConsoleExit::Restart(setup) = exit else {
        panic!("expected a restart");
    };
    assert!(setup.roster.is_empty());
    assert!(setup.topics.is_empty());

    // the rest of the input is left for the setup stage
    assert_eq!(lines.next_line().await.expect("read"), Some("show".into()));
}

#[tokio::test(start_paused = true)]
async fn restart_leads_back_into_a_new_session() {
    let input = b"restart\nclass 9a\nseed 11\nstart\nquit\n";
    let mut lines = (&input[..]).lines();

    let ConsoleExit::Restart(fresh) = run_console(runner(), &mut lines, true)
        .await
        .expect("console")
    else {
        panic!("expected a restart");
    };
    let SetupOutcome::Ready(setup) = configure(fresh, &mut lines, &saved())
        .await
        .expect("setup")
    else {
        panic!("expected a ready setup");
    };
    assert_eq!(setup.class_name, "9a");
    assert_eq!(setup.seed, Seed(11));

    let runner = SessionRunner::new(setup.start().expect("start"), Duration::from_secs(1));
    assert_eq!(runner.snapshot().class_name, "9a");
    assert!(matches!(
        run_console(runner, &mut lines, true).await.expect("console"),
        ConsoleExit::Quit
    ));
}

#[tokio::test]
async fn setup_stage_ends_with_the_input() {
    let mut lines = (&b"students Ada, Ben\nstart\n"[..]).lines();
    let outcome = configure(SessionSetup::default(), &mut lines, &SavedClasses::new())
        .await
        .expect("setup");
    assert!(matches!(outcome, SetupOutcome::Quit));
}
