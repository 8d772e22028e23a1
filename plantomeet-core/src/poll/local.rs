//! Published polls on disk, one TOML file per poll.
//!
//! The backing store only knows participants and responses, so slot
//! definitions for polls created on this machine live here.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PlanToMeetError, PlanToMeetResult};
use crate::poll::{Poll, PollState, PollStatus, Slot};

#[derive(Debug, Serialize, Deserialize)]
struct PollRecord {
    id: String,
    #[serde(default)]
    title: String,
    status: PollStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    finalized_slot_id: Option<String>,
    #[serde(default)]
    slots: Vec<Slot>,
}

impl PollRecord {
    fn from_state(state: &PollState) -> PlanToMeetResult<Self> {
        let (poll, status, finalized_slot_id) = match state {
            PollState::Composing(_) => {
                return Err(PlanToMeetError::InvalidDraft(
                    "Only published polls can be saved".into(),
                ));
            }
            PollState::Open(poll) => (poll, PollStatus::Open, None),
            PollState::Finalized(finalized) => (
                finalized.poll(),
                PollStatus::Finalized,
                Some(finalized.slot().slot_id.clone()),
            ),
        };

        Ok(PollRecord {
            id: poll.id.clone(),
            title: poll.title.clone(),
            status,
            finalized_slot_id,
            slots: poll.slots.clone(),
        })
    }

    fn into_state(self) -> PlanToMeetResult<PollState> {
        let poll = Poll {
            id: self.id,
            title: self.title,
            slots: self.slots,
        };

        match (self.status, self.finalized_slot_id) {
            (PollStatus::Open, _) => Ok(PollState::Open(poll)),
            (PollStatus::Finalized, Some(slot_id)) => {
                Ok(PollState::Finalized(poll.finalize(&slot_id)?))
            }
            (PollStatus::Finalized, None) => Err(PlanToMeetError::Serialization(format!(
                "Poll '{}' is finalized but names no slot",
                poll.id
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LocalPolls {
    dir: PathBuf,
}

impl LocalPolls {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        LocalPolls { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, poll_id: &str) -> PathBuf {
        let file_stem: String = poll_id
            .chars()
            .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
            .collect();
        self.dir.join(format!("{file_stem}.toml"))
    }

    /// Write a published poll. Once a poll file records a finalized slot,
    /// saving a different outcome for it is refused.
    pub fn save(&self, state: &PollState) -> PlanToMeetResult<()> {
        let record = PollRecord::from_state(state)?;

        if let Ok(PollState::Finalized(existing)) = self.load(&record.id) {
            if record.finalized_slot_id.as_deref() != Some(existing.slot().slot_id.as_str()) {
                return Err(PlanToMeetError::PollFinalized(record.id));
            }
        }

        std::fs::create_dir_all(&self.dir)?;
        let content = toml::to_string_pretty(&record)
            .map_err(|e| PlanToMeetError::Serialization(e.to_string()))?;
        std::fs::write(self.path_for(&record.id), content)?;

        tracing::debug!(poll_id = %record.id, status = ?record.status, "saved poll file");
        Ok(())
    }

    pub fn load(&self, poll_id: &str) -> PlanToMeetResult<PollState> {
        let path = self.path_for(poll_id);
        if !path.exists() {
            return Err(PlanToMeetError::PollNotFound(poll_id.to_string()));
        }

        let content = std::fs::read_to_string(&path)?;
        let record: PollRecord = toml::from_str(&content)
            .map_err(|e| PlanToMeetError::Serialization(format!("{}: {e}", path.display())))?;

        record.into_state()
    }

    /// Ids of every poll file in the directory, sorted.
    pub fn poll_ids(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(&self.dir) else {
            return Vec::new();
        };

        let mut ids: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "toml"))
            .filter_map(|path| {
                path.file_stem()
                    .and_then(|stem| stem.to_str())
                    .map(str::to_string)
            })
            .collect();

        ids.sort();
        ids
    }
}
