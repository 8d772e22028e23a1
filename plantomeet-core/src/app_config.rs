//! Global plantomeet configuration.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_WEB_BASE_URL;
use crate::error::{PlanToMeetError, PlanToMeetResult};
use crate::message_url::MessageUrlCodec;
use crate::poll::LocalPolls;
use crate::repository::UpsertStrategy;
use crate::routing::PollContext;
use crate::store::{HttpStore, RecordStore};

static DEFAULT_POLL_DIR: &str = "~/.plantomeet/polls";

/// Prefix for environment overrides, e.g. `PLANTOMEET_STORE_URL`.
pub const ENV_PREFIX: &str = "PLANTOMEET";

fn default_web_base_url() -> String {
    DEFAULT_WEB_BASE_URL.to_string()
}

fn default_poll_dir() -> PathBuf {
    PathBuf::from(DEFAULT_POLL_DIR)
}

/// Global configuration at ~/.config/plantomeet/config.toml, overridable
/// through `PLANTOMEET_*` environment variables.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub store_url: Option<String>,

    pub store_key: Option<String>,

    #[serde(default = "default_web_base_url")]
    pub web_base_url: String,

    /// Supplied by the host platform; the CLI's `--session` wins over this.
    pub session_id: Option<String>,

    #[serde(default = "default_poll_dir")]
    pub poll_dir: PathBuf,

    #[serde(default)]
    pub upsert_strategy: UpsertStrategy,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            store_url: None,
            store_key: None,
            web_base_url: default_web_base_url(),
            session_id: None,
            poll_dir: default_poll_dir(),
            upsert_strategy: UpsertStrategy::default(),
        }
    }
}

impl AppConfig {
    pub fn config_path() -> PlanToMeetResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| PlanToMeetError::Config("Could not determine config directory".into()))?
            .join("plantomeet");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default path, writing a commented default file first
    /// if there is none.
    pub fn load() -> PlanToMeetResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> PlanToMeetResult<Self> {
        Self::build(path, Environment::with_prefix(ENV_PREFIX))
    }

    fn build(path: &Path, env: Environment) -> PlanToMeetResult<Self> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(env)
            .build()
            .map_err(|e| PlanToMeetError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| PlanToMeetError::Config(e.to_string()))
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> PlanToMeetResult<()> {
        let contents = format!(
            "\
# plantomeet configuration

# Backing store (the REST root is <store_url>/rest/v1):
# store_url = \"https://your-project.example.co\"
# store_key = \"your-anon-key\"

# Where poll links point:
# web_base_url = \"{DEFAULT_WEB_BASE_URL}\"

# Session id supplied by your messaging platform:
# session_id = \"...\"

# Where polls you create are kept:
# poll_dir = \"{DEFAULT_POLL_DIR}\"

# on_conflict (single atomic write) or insert_then_update:
# upsert_strategy = \"on_conflict\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                PlanToMeetError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| PlanToMeetError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    pub fn poll_dir(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.poll_dir.to_string_lossy()).into_owned();
        PathBuf::from(full_path_str)
    }

    pub fn local_polls(&self) -> LocalPolls {
        LocalPolls::new(self.poll_dir())
    }

    pub fn codec(&self) -> PlanToMeetResult<MessageUrlCodec> {
        MessageUrlCodec::new(&self.web_base_url)
    }

    /// Build the HTTP record store. Only commands that talk to the store
    /// need `store_url` and `store_key`.
    pub fn store(&self) -> PlanToMeetResult<Arc<dyn RecordStore>> {
        let url = required(&self.store_url, "store_url")?;
        let key = required(&self.store_key, "store_key")?;
        Ok(Arc::new(HttpStore::new(url, key)?))
    }

    /// The session to act as: `explicit` if given, else the configured one.
    pub fn session<'a>(&'a self, explicit: Option<&'a str>) -> PlanToMeetResult<&'a str> {
        explicit
            .or(self.session_id.as_deref())
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| {
                PlanToMeetError::Config(
                    "No session id: pass --session or set session_id in the config".into(),
                )
            })
    }

    pub fn context(&self, poll_id: &str, session_id: &str) -> PlanToMeetResult<PollContext> {
        Ok(PollContext::new(
            poll_id,
            session_id,
            self.store()?,
            self.upsert_strategy,
        ))
    }
}

fn required<'a>(value: &'a Option<String>, key: &str) -> PlanToMeetResult<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| {
            PlanToMeetError::Config(format!(
                "Missing '{key}' (set it in the config file or {ENV_PREFIX}_{})",
                key.to_ascii_uppercase()
            ))
        })
}
