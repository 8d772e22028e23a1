use std::path::Path;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use plantomeet_core::ics::generate_ics;
use plantomeet_core::message_url::decode_finalized;

pub fn run(url: &str, output: Option<&Path>) -> Result<()> {
    let info = decode_finalized(url).context("Not a finalized poll link")?;
    let today = chrono::Local::now().date_naive();
    let ics = generate_ics(&info, today)?;
    tracing::debug!(poll_id = %info.poll_id, slot_id = %info.slot_id, "calendar event built");

    match output {
        Some(path) => {
            std::fs::write(path, ics)
                .with_context(|| format!("Could not write {}", path.display()))?;
            eprintln!(
                "{}",
                format!("  Saved {} to {}", info.display_title(), path.display()).green()
            );
        }
        None => print!("{ics}"),
    }

    Ok(())
}
