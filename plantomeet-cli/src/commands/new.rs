use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use plantomeet_core::{AppConfig, PollDraft, PollState, Slot};

use crate::render::Render;

pub fn run(cfg: &AppConfig, title: &str, slot_args: &[String]) -> Result<()> {
    let mut draft = PollDraft::new(title);
    for arg in slot_args {
        draft.add_slot(parse_slot(arg)?);
    }

    let poll = draft.publish()?;
    let codec = cfg.codec()?;

    cfg.local_polls().save(&PollState::Open(poll.clone()))?;
    tracing::info!(poll_id = %poll.id, slots = poll.slots.len(), "poll published");

    println!("{}", poll.render());
    println!();
    println!("{}", format!("  {}", poll.summary_text()).green());
    println!("  {}", codec.poll_url(&poll));

    Ok(())
}

/// Parse `"DAY START MINUTES"`. The day may contain spaces; the last two
/// words are the start time and the duration.
fn parse_slot(arg: &str) -> Result<Slot> {
    let words: Vec<&str> = arg.split_whitespace().collect();
    let [day @ .., start, minutes] = words.as_slice() else {
        anyhow::bail!("Slot \"{arg}\" should look like \"Mon 14:00 60\"");
    };
    if day.is_empty() {
        anyhow::bail!("Slot \"{arg}\" is missing its day");
    }

    let minutes: u32 = minutes
        .parse()
        .with_context(|| format!("Slot \"{arg}\": duration must be whole minutes"))?;

    Ok(Slot::starting_at(&day.join(" "), start, minutes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_day_start_and_minutes() {
        let slot = parse_slot("Mon 14:00 60").unwrap();
        assert_eq!(
            (slot.day.as_str(), slot.start_time.as_str(), slot.end_time.as_str()),
            ("Mon", "14:00", "15:00")
        );

        let slot = parse_slot("Lun. 3 mars 9am 30").unwrap();
        assert_eq!(slot.day, "Lun. 3 mars");
        assert_eq!(slot.end_time, "09:30");
    }

    #[test]
    fn rejects_malformed_slots() {
        assert!(parse_slot("14:00 60").is_err());
        assert!(parse_slot("Mon 14:00 an-hour").is_err());
        assert!(parse_slot("Mon").is_err());
    }
}
