mod commands;
mod render;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use plantomeet_core::AppConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "plantomeet")]
#[command(about = "Schedule meetings by voting on time slots shared as message links")]
struct Cli {
    /// Act as this session instead of the configured session_id
    #[arg(long, global = true)]
    session: Option<String>,

    /// Log store requests and routing decisions
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose and share a new poll
    New {
        #[arg(short, long, default_value = "")]
        title: String,

        /// Candidate slot as "DAY START MINUTES", e.g. "Mon 14:00 60" (repeatable)
        #[arg(short, long = "slot", required = true)]
        slots: Vec<String>,
    },
    /// Resolve a message link the way the host does when it is tapped
    Open { url: String },
    /// Join a poll under the current session
    Join {
        poll_id: String,

        #[arg(short, long)]
        name: Option<String>,
    },
    /// Change the current session's display name on every poll
    Rename { name: String },
    /// Answer yes, no or maybe for one slot
    Vote {
        poll_id: String,
        slot_id: String,
        answer: String,
    },
    /// Tally responses for one or more polls
    Results {
        #[arg(required = true)]
        poll_ids: Vec<String>,
    },
    /// Pick the winning slot and print the finalized link
    Finalize { poll_id: String, slot_id: String },
    /// Export a finalized link as an .ics file
    Calendar {
        url: String,

        /// Write here instead of stdout
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("PLANTOMEET_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cfg = AppConfig::load()?;
    let session = cli.session.as_deref();

    match cli.command {
        Commands::New { title, slots } => commands::new::run(&cfg, &title, &slots),
        Commands::Open { url } => commands::open::run(&cfg, &url).await,
        Commands::Join { poll_id, name } => {
            commands::join::run(&cfg, cfg.session(session)?, &poll_id, name).await
        }
        Commands::Rename { name } => {
            commands::rename::run(&cfg, cfg.session(session)?, &name).await
        }
        Commands::Vote {
            poll_id,
            slot_id,
            answer,
        } => commands::vote::run(&cfg, cfg.session(session)?, &poll_id, &slot_id, &answer).await,
        Commands::Results { poll_ids } => commands::results::run(&cfg, &poll_ids).await,
        Commands::Finalize { poll_id, slot_id } => {
            commands::finalize::run(&cfg, &poll_id, &slot_id)
        }
        Commands::Calendar { url, output } => commands::calendar::run(&url, output.as_deref()),
    }
}
