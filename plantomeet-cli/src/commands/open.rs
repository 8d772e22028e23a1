use anyhow::Result;
use owo_colors::OwoColorize;
use plantomeet_core::{AppConfig, PollState, Route, Trigger, route};

use super::results::print_tallies;
use crate::render::Render;

pub async fn run(cfg: &AppConfig, url: &str) -> Result<()> {
    let route = route(Trigger::SelectedMessage, Some(url));
    tracing::debug!(?route, "message routed");

    match route {
        Route::Composer => {
            println!("{}", "Not a poll link.".dimmed());
            println!("Start a poll with: plantomeet new --title <title> --slot \"Mon 14:00 60\"");
        }
        Route::PollDetail { poll_id } => show_poll(cfg, &poll_id).await?,
        Route::AddToCalendar(info) => {
            println!("{}", info.render());
            println!("{}", format!("  {}", info.summary_text()).green());
            println!();
            println!("Add it to your calendar with: plantomeet calendar \"{url}\"");
        }
    }

    Ok(())
}

async fn show_poll(cfg: &AppConfig, poll_id: &str) -> Result<()> {
    let state = match cfg.local_polls().load(poll_id) {
        Ok(state) => state,
        Err(e) if e.is_not_found() => {
            tracing::debug!(poll_id, "no local poll file");
            println!("Poll {poll_id}");
            println!("{}", missing_poll_hint(poll_id).dimmed());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    match state {
        PollState::Open(poll) => {
            // Responses live in the store; without one there is nothing to tally
            if cfg.store().is_ok() {
                print_tallies(cfg, std::slice::from_ref(&poll)).await?;
            } else {
                println!("{}", poll.render());
            }
        }
        PollState::Finalized(finalized) => {
            println!("{}", finalized.info().render());
            println!("{}", "   Voting is closed.".dimmed());
        }
        PollState::Composing(_) => {}
    }

    Ok(())
}

/// Shown when a poll link points at a poll whose slots were never saved here.
fn missing_poll_hint(poll_id: &str) -> String {
    format!(
        "   This poll was created on another machine, so its slots are not stored here.\n   \
         Join it with: plantomeet join {poll_id}\n   \
         Voting and finalizing need the poll file from the machine that created it."
    )
}
