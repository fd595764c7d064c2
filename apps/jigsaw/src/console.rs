//! Line-oriented operator console: the setup stage and the running session.

use std::io::{self, Write};

use anyhow::{Context, Result};
use serde_json::json;
use session::{Advance, SessionRunner, SessionSetup, TickOutcome};
use shared::{
    domain::{Durations, Roster, SavedClasses, Seed, TopicList},
    text::{clean_lines, format_clock},
};
use tokio::io::{AsyncBufRead, Lines};
use tracing::debug;

use crate::render::render_snapshot;

pub const HELP: &str = "\
Commands:
  start | pause | s          start or pause the countdown
  +                          add one minute
  next | n                   go to the next phase
  assign <learner> = <topic> move a learner (phase 1 only)
  shuffle                    reassign everyone with a new seed (phase 1 only)
  show                       print the current state
  restart                    discard the session and set up a new one
  quit | q                   leave";

pub const SETUP_HELP: &str = "\
Setup:
  class <name>                    load a saved class
  students <names>                names separated by commas or semicolons
  topics <topics>                 topics separated by commas or semicolons
  minutes <read> <expert> <home>  phase durations
  seed <number>                   fix the assignment seed
  start                           start the session
  quit | q                        leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Toggle,
    Extend,
    Next,
    Assign { learner: String, topic: String },
    Shuffle,
    Show,
    Help,
    Restart,
    Quit,
}

impl ConsoleCommand {
    /// `Ok(None)` for blank input.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map(|(word, rest)| (word, rest.trim()))
            .unwrap_or((line, ""));

        let command = match word.to_ascii_lowercase().as_str() {
            "start" | "pause" | "s" => Self::Toggle,
            "+" => Self::Extend,
            "next" | "n" => Self::Next,
            "shuffle" => Self::Shuffle,
            "show" => Self::Show,
            "help" | "?" => Self::Help,
            "restart" => Self::Restart,
            "quit" | "q" | "exit" => Self::Quit,
            "assign" => return parse_assign(rest).map(Some),
            other => return Err(format!("unknown command '{other}', type 'help'")),
        };
        Ok(Some(command))
    }
}

/// `<learner> = <topic>` allows spaces in names; without `=` the last word
/// is the topic.
fn parse_assign(rest: &str) -> Result<ConsoleCommand, String> {
    let split = rest
        .split_once('=')
        .or_else(|| rest.rsplit_once(char::is_whitespace));
    match split {
        Some((learner, topic)) if !learner.trim().is_empty() && !topic.trim().is_empty() => {
            Ok(ConsoleCommand::Assign {
                learner: learner.trim().to_string(),
                topic: topic.trim().to_string(),
            })
        }
        _ => Err("usage: assign <learner> = <topic>".to_string()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupCommand {
    Class(String),
    Students(String),
    Topics(String),
    Minutes(Durations),
    Seed(Seed),
    Start,
    Help,
    Quit,
}

impl SetupCommand {
    /// `Ok(None)` for blank input.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map(|(word, rest)| (word, rest.trim()))
            .unwrap_or((line, ""));

        let command = match word.to_ascii_lowercase().as_str() {
            "class" if !rest.is_empty() => Self::Class(rest.to_string()),
            "students" => Self::Students(rest.to_string()),
            "topics" => Self::Topics(rest.to_string()),
            "minutes" => Self::Minutes(parse_minutes(rest)?),
            "seed" => Self::Seed(Seed(
                rest.parse()
                    .map_err(|_| format!("'{rest}' is not a seed number"))?,
            )),
            "start" => Self::Start,
            "help" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            "class" => return Err("usage: class <name>".to_string()),
            other => return Err(format!("unknown setup command '{other}', type 'help'")),
        };
        Ok(Some(command))
    }
}

fn parse_minutes(rest: &str) -> Result<Durations, String> {
    let values = rest
        .split_whitespace()
        .map(str::parse::<u32>)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| "minutes must be whole numbers".to_string())?;
    match values.as_slice() {
        [read, expert, stamm] => Ok(Durations {
            read: *read,
            expert: *expert,
            stamm: *stamm,
        }),
        _ => Err("usage: minutes <read> <expert> <home>".to_string()),
    }
}

/// Applies one setup edit. `Err` carries the message to show; the setup is
/// left unchanged then.
pub fn apply_setup(
    setup: &mut SessionSetup,
    command: SetupCommand,
    classes: &SavedClasses,
) -> Result<String, String> {
    match command {
        SetupCommand::Class(name) => {
            let Some(config) = classes.get(name.trim()) else {
                return Err(format!("no saved class named '{}'", name.trim()));
            };
            *setup = SessionSetup::from_class(&name, config);
            Ok(format!("Loaded class '{}'.", setup.class_name))
        }
        SetupCommand::Students(block) => {
            setup.roster = Roster::from_names(clean_lines(&block));
            Ok(format!("{} learners.", setup.roster.len()))
        }
        SetupCommand::Topics(block) => {
            setup.topics = TopicList::from_names(clean_lines(&block));
            Ok(format!("{} topics.", setup.topics.len()))
        }
        SetupCommand::Minutes(durations) => {
            durations.validate().map_err(|err| err.to_string())?;
            setup.durations = durations;
            Ok("Durations updated.".to_string())
        }
        SetupCommand::Seed(seed) => {
            setup.seed = seed;
            Ok(format!("Seed set to {seed}."))
        }
        SetupCommand::Start => setup
            .validate()
            .map(|()| "Starting.".to_string())
            .map_err(|err| err.to_string()),
        SetupCommand::Help => Ok(SETUP_HELP.to_string()),
        SetupCommand::Quit => Ok(String::new()),
    }
}

pub fn describe_setup(setup: &SessionSetup) -> String {
    let class = if setup.class_name.is_empty() {
        "-"
    } else {
        setup.class_name.as_str()
    };
    let Durations {
        read,
        expert,
        stamm,
    } = setup.durations;
    format!(
        "Class: {class} | Learners: {} | Topics: {} | Minutes: {read}/{expert}/{stamm} | Seed: {}",
        setup.roster.len(),
        setup.topics.len(),
        setup.seed
    )
}

pub enum SetupOutcome {
    Ready(SessionSetup),
    Quit,
}

/// Pre-session stage: edits `setup` line by line until it starts or the
/// operator leaves. End of input counts as leaving.
pub async fn configure<R>(
    mut setup: SessionSetup,
    lines: &mut Lines<R>,
    classes: &SavedClasses,
) -> Result<SetupOutcome>
where
    R: AsyncBufRead + Unpin,
{
    println!("{SETUP_HELP}\n\n{}", describe_setup(&setup));
    while let Some(line) = lines
        .next_line()
        .await
        .context("failed to read operator input")?
    {
        let command = match SetupCommand::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };
        debug!(?command, "setup command");

        let starting = command == SetupCommand::Start;
        if command == SetupCommand::Quit {
            return Ok(SetupOutcome::Quit);
        }
        match apply_setup(&mut setup, command, classes) {
            Ok(_) if starting => return Ok(SetupOutcome::Ready(setup)),
            Ok(message) => println!("{message}\n{}", describe_setup(&setup)),
            Err(message) => println!("{message}"),
        }
    }
    Ok(SetupOutcome::Quit)
}

pub enum ConsoleExit {
    Quit,
    Restart(SessionSetup),
    InputClosed,
}

/// Applies one operator command and returns the line to show for it.
pub fn apply(runner: &mut SessionRunner, command: ConsoleCommand) -> String {
    match command {
        ConsoleCommand::Toggle => {
            if runner.toggle_run() {
                "Timer running.".to_string()
            } else {
                "Timer paused.".to_string()
            }
        }
        ConsoleCommand::Extend => {
            let seconds_left = runner.extend();
            format!("Added one minute, {} left.", format_clock(seconds_left))
        }
        ConsoleCommand::Next => match runner.advance_phase() {
            Advance::Entered(phase) => format!("Entered {phase}."),
            Advance::SessionComplete => "Jigsaw round complete.".to_string(),
        },
        ConsoleCommand::Assign { learner, topic } => match runner.reassign(&learner, &topic) {
            Ok(()) => format!("{learner} now works on {topic}."),
            Err(err) => err.to_string(),
        },
        ConsoleCommand::Shuffle => match runner.reshuffle_all() {
            Ok(seed) => format!("Reassigned everyone with seed {seed}."),
            Err(err) => err.to_string(),
        },
        ConsoleCommand::Show => String::new(),
        ConsoleCommand::Help => HELP.to_string(),
        // handled by the loop, which owns the runner
        ConsoleCommand::Restart | ConsoleCommand::Quit => String::new(),
    }
}

pub async fn run_console<R>(
    mut runner: SessionRunner,
    lines: &mut Lines<R>,
    json_output: bool,
) -> Result<ConsoleExit>
where
    R: AsyncBufRead + Unpin,
{
    print_state(&runner, json_output, "")?;
    if !json_output {
        println!("{HELP}");
    }

    loop {
        tokio::select! {
            outcome = runner.next_tick() => match outcome {
                TickOutcome::Counting { seconds_left } => print_tick(seconds_left, json_output)?,
                TickOutcome::Elapsed => {
                    let message = format!("\x07Time is up for {}.", runner.timer().phase);
                    print_state(&runner, json_output, &message)?;
                }
                TickOutcome::Idle => {}
            },
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read operator input")? else {
                    return Ok(ConsoleExit::InputClosed);
                };
                let command = match ConsoleCommand::parse(&line) {
                    Ok(Some(command)) => command,
                    Ok(None) => continue,
                    Err(message) => {
                        println!("{message}");
                        continue;
                    }
                };
                debug!(?command, "operator command");

                match command {
                    ConsoleCommand::Quit => return Ok(ConsoleExit::Quit),
                    ConsoleCommand::Restart => return Ok(ConsoleExit::Restart(runner.restart())),
                    ConsoleCommand::Help => println!("{HELP}"),
                    command => {
                        let message = apply(&mut runner, command);
                        print_state(&runner, json_output, &message)?;
                    }
                }
            }
        }
    }
}

fn print_state(runner: &SessionRunner, json_output: bool, message: &str) -> Result<()> {
    let snapshot = runner.snapshot();
    if json_output {
        let line = json!({ "event": "state", "message": message, "session": snapshot });
        println!("{line}");
    } else {
        if !message.is_empty() {
            println!("\n{message}");
        }
        println!("\n{}", render_snapshot(&snapshot));
    }
    Ok(())
}

fn print_tick(seconds_left: u32, json_output: bool) -> Result<()> {
    if json_output {
        println!("{}", json!({ "event": "tick", "seconds_left": seconds_left }));
        return Ok(());
    }
    let mut stdout = io::stdout();
    write!(stdout, "\r{}  ", format_clock(seconds_left)).context("failed to write clock")?;
    stdout.flush().context("failed to flush clock")?;
    Ok(())
}

#[cfg(test)]
#[path = "tests/console_tests.rs"]
mod tests;
