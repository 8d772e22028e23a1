//! TUI rendering traits for plantomeet-core types.
//!
//! Extension traits that add colored terminal rendering using owo_colors.

use std::collections::HashMap;

use owo_colors::OwoColorize;
use plantomeet_core::{
    Availability, FinalizedPollInfo, Participant, Poll, PollSummary, Slot, SlotTally,
};

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for Availability {
    fn render(&self) -> String {
        match self {
            Availability::Yes => "yes".green().to_string(),
            Availability::Maybe => "maybe".yellow().to_string(),
            Availability::No => "no".red().to_string(),
        }
    }
}

impl Render for Slot {
    fn render(&self) -> String {
        format!("{} {}", self.to_string().bold(), format!("({})", self.slot_id).dimmed())
    }
}

impl Render for Poll {
    fn render(&self) -> String {
        let mut lines = vec![format!("🗳  {}", self.display_title().bold())];
        for slot in &self.slots {
            lines.push(format!("   {}", slot.render()));
        }
        lines.join("\n")
    }
}

impl Render for FinalizedPollInfo {
    fn render(&self) -> String {
        format!(
            "📅 {}\n   {} {}–{} ({} min)",
            self.display_title().bold(),
            self.day,
            self.start_time,
            self.end_time,
            self.duration_minutes
        )
    }
}

fn render_counts(tally: &SlotTally) -> String {
    format!(
        "{} {} {}",
        format!("{} yes", tally.yes).green(),
        format!("{} maybe", tally.maybe).yellow(),
        format!("{} no", tally.no).red()
    )
}

/// Render a poll's tally, marking the best slots and naming who answered.
pub fn render_summary(summary: &PollSummary, participants: &[Participant]) -> String {
    let names: HashMap<&str, &str> = participants
        .iter()
        .map(|p| (p.session_id.as_str(), p.label()))
        .collect();
    let best: Vec<&str> = summary
        .best_slots()
        .into_iter()
        .map(|t| t.slot.slot_id.as_str())
        .collect();

    let mut lines = Vec::new();
    for tally in &summary.slots {
        let marker = if best.contains(&tally.slot.slot_id.as_str()) {
            "★".yellow().to_string()
        } else {
            " ".to_string()
        };
        lines.push(format!("{marker}  {}  {}", tally.slot.render(), render_counts(tally)));

        for (session, answer) in &tally.votes {
            let name = names.get(session.as_str()).copied().unwrap_or(session.as_str());
            lines.push(format!("      {} {}", name.dimmed(), answer.render()));
        }
    }

    let pending = summary.pending(participants);
    if !pending.is_empty() {
        let labels: Vec<&str> = pending.into_iter().map(Participant::label).collect();
        lines.push(format!("   {} {}", "Waiting on:".dimmed(), labels.join(", ")));
    }

    if summary.orphaned > 0 {
        lines.push(
            format!("   {} responses point at slots this poll does not have", summary.orphaned)
                .red()
                .to_string(),
        );
    }

    lines.join("\n")
}
