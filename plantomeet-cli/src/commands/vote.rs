use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use plantomeet_core::{AppConfig, Availability};

use super::load_poll;

pub async fn run(
    cfg: &AppConfig,
    session_id: &str,
    poll_id: &str,
    slot_id: &str,
    answer: &str,
) -> Result<()> {
    let availability: Availability = answer
        .to_ascii_lowercase()
        .parse()
        .with_context(|| format!("Answer with yes, no or maybe (got \"{answer}\")"))?;

    let state = load_poll(cfg, poll_id)?;
    let ctx = cfg.context(poll_id, session_id)?;
    ctx.set_availability(&state, slot_id, availability).await?;
    tracing::debug!(poll_id, slot_id, availability = availability.as_str(), "vote recorded");

    let slot = state.open()?.require_slot(slot_id)?;
    println!(
        "  {} {}",
        format!("{slot}:").green(),
        availability.as_str().green()
    );
    Ok(())
}
