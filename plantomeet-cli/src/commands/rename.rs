use anyhow::Result;
use owo_colors::OwoColorize;
use plantomeet_core::AppConfig;
use plantomeet_core::repository::ParticipantRepository;

pub async fn run(cfg: &AppConfig, session_id: &str, name: &str) -> Result<()> {
    let participants = ParticipantRepository::new(cfg.store()?, cfg.upsert_strategy);
    participants
        .update_display_name_for_session(session_id, name)
        .await?;

    println!("{}", format!("  You now appear as {name}").green());
    Ok(())
}
