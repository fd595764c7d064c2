//! Plain-text views for the terminal.

use session::SessionSnapshot;
use shared::domain::{Phase, Seed, SimpleGroups};

fn hint(phase: Phase) -> &'static str {
    match phase {
        Phase::Reading => "Assignments can still be changed: assign <learner> = <topic>, shuffle.",
        Phase::Expert => "Prepare a short summary sheet per topic.",
        Phase::Home => "Ideally every home group has one expert per topic.",
    }
}

pub fn render_snapshot(snapshot: &SessionSnapshot) -> String {
    let class = if snapshot.class_name.is_empty() {
        "-"
    } else {
        snapshot.class_name.as_str()
    };
    let state = if snapshot.running { "running" } else { "paused" };

    let mut out = format!(
        "Phase {} of 3 - {}   {}  [{state}]\n",
        snapshot.phase_number, snapshot.phase_title, snapshot.clock
    );
    out.push_str(&format!(
        "Class: {class} | Topics: {} | Seed: {}\n",
        snapshot.topics.len(),
        snapshot.seed
    ));

    match snapshot.phase {
        Phase::Reading | Phase::Expert => {
            for group in &snapshot.experts {
                out.push_str(&format!("\n{} ({})\n", group.topic, group.members.len()));
                if group.members.is_empty() {
                    out.push_str("  (nobody)\n");
                }
                for member in &group.members {
                    out.push_str(&format!("  - {member}\n"));
                }
            }
        }
        Phase::Home => {
            for (index, group) in snapshot.home_groups.iter().enumerate() {
                out.push_str(&format!("\nHome group {}\n", index + 1));
                for member in group {
                    out.push_str(&format!("  - {} ({})\n", member.learner, member.topic));
                }
            }
        }
    }

    out.push_str(&format!("\n{}\n", hint(snapshot.phase)));
    out
}

pub fn render_simple_groups(groups: &SimpleGroups, seed: Seed) -> String {
    let mut out = format!("Groups: {} | Seed: {seed}\n", groups.len());
    for (index, group) in groups.iter().enumerate() {
        out.push_str(&format!("\nGroup {}\n", index + 1));
        for learner in group {
            out.push_str(&format!("  - {learner}\n"));
        }
    }
    out
}
