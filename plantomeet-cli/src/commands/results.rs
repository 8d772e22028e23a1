use std::collections::HashMap;

use anyhow::Result;
use owo_colors::OwoColorize;
use plantomeet_core::aggregate::group_by_poll;
use plantomeet_core::repository::{ParticipantRepository, ResponseRepository};
use plantomeet_core::{AppConfig, Poll, PollState, PollSummary};

use super::load_poll;
use crate::render::{Render, render_summary};
use crate::utils::tui::create_spinner;

pub async fn run(cfg: &AppConfig, poll_ids: &[String]) -> Result<()> {
    let mut polls = Vec::with_capacity(poll_ids.len());
    for poll_id in poll_ids {
        match load_poll(cfg, poll_id)? {
            PollState::Open(poll) => polls.push(poll),
            PollState::Finalized(finalized) => {
                println!("{}", finalized.info().render());
                println!("{}", "   Voting is closed.".dimmed());
                println!();
            }
            PollState::Composing(_) => {}
        }
    }

    print_tallies(cfg, &polls).await
}

/// Fetch every poll's responses in one request, then tally each poll.
pub async fn print_tallies(cfg: &AppConfig, polls: &[Poll]) -> Result<()> {
    if polls.is_empty() {
        return Ok(());
    }

    let store = cfg.store()?;
    let responses = ResponseRepository::new(store.clone(), cfg.upsert_strategy);
    let participants = ParticipantRepository::new(store, cfg.upsert_strategy);

    let ids: Vec<&str> = polls.iter().map(|p| p.id.as_str()).collect();
    let spinner = create_spinner(format!("Fetching responses for {} poll(s)", ids.len()));
    let fetched = responses.list_responses_for_polls(&ids).await;
    spinner.finish_and_clear();

    let fetched = fetched?;
    tracing::debug!(polls = ids.len(), responses = fetched.len(), "responses fetched");
    let mut by_poll: HashMap<String, _> = group_by_poll(fetched);

    for (i, poll) in polls.iter().enumerate() {
        let poll_responses = by_poll.remove(&poll.id).unwrap_or_default();
        let summary = PollSummary::tally(poll, &poll_responses);

        println!("{}", poll.render());
        match participants.list_participants(&poll.id).await {
            Ok(joined) => println!("{}", render_summary(&summary, &joined)),
            Err(e) => println!("   {}", e.to_string().red()),
        }

        // Add spacing between polls (but not after the last one)
        if i < polls.len() - 1 {
            println!();
        }
    }

    Ok(())
}
