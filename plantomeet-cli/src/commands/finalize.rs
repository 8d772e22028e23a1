use anyhow::Result;
use owo_colors::OwoColorize;
use plantomeet_core::{AppConfig, PollState};

use super::load_poll;

pub fn run(cfg: &AppConfig, poll_id: &str, slot_id: &str) -> Result<()> {
    let poll = match load_poll(cfg, poll_id)? {
        PollState::Open(poll) => poll,
        PollState::Finalized(finalized) => {
            anyhow::bail!(
                "Poll '{poll_id}' is already finalized on {}",
                finalized.slot()
            );
        }
        PollState::Composing(_) => anyhow::bail!("Poll '{poll_id}' was never published"),
    };

    let codec = cfg.codec()?;
    let finalized = poll.finalize(slot_id)?;
    let info = finalized.info();

    cfg.local_polls().save(&PollState::Finalized(finalized))?;
    tracing::info!(poll_id, slot_id, "poll finalized");

    println!("{}", format!("  {}", info.summary_text()).green());
    println!("  {}", codec.encode_finalized(&info));
    Ok(())
}
