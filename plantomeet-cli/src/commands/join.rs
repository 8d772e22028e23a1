use anyhow::Result;
use owo_colors::OwoColorize;
use plantomeet_core::AppConfig;

pub async fn run(
    cfg: &AppConfig,
    session_id: &str,
    poll_id: &str,
    name: Option<String>,
) -> Result<()> {
    let ctx = cfg.context(poll_id, session_id)?;
    let participant = ctx.join(name).await?;

    println!(
        "{}",
        format!("  Joined {} as {}", poll_id, participant.label()).green()
    );
    Ok(())
}
