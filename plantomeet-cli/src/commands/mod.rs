pub mod calendar;
pub mod finalize;
pub mod join;
pub mod new;
pub mod open;
pub mod rename;
pub mod results;
pub mod vote;

use anyhow::{Context, Result};
use plantomeet_core::{AppConfig, PollState};

/// Load a poll created on this machine.
fn load_poll(cfg: &AppConfig, poll_id: &str) -> Result<PollState> {
    let polls = cfg.local_polls();
    polls.load(poll_id).with_context(|| {
        format!(
            "Poll '{poll_id}' is not in {}. Only polls created here can be voted on or finalized.",
            polls.dir().display()
        )
    })
}
