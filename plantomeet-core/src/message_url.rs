//! Poll state carried inside message URLs.
//!
//! Open polls travel as `{base}/poll/{pollId}?pollId=...&title=...`. A
//! finalized poll carries its whole [`FinalizedPollInfo`] in the query:
//!
//! ```text
//! {base}/poll/{pollId}?finalized=true&v=1&pollId=..&title=..&slotId=..
//!     &day=..&startTime=..&endTime=..&duration=<minutes>
//! ```
//!
//! Every value is form-encoded on its own and decoded exactly once. Decoding
//! is all-or-nothing: any missing or malformed field rejects the whole URL.

use std::collections::HashMap;

use percent_encoding::percent_decode_str;
use url::Url;

use crate::constants::MESSAGE_URL_VERSION;
use crate::error::{PlanToMeetError, PlanToMeetResult};
use crate::poll::{FinalizedPollInfo, Poll};

const POLL_SEGMENT: &str = "poll";

mod param {
    pub const FINALIZED: &str = "finalized";
    pub const VERSION: &str = "v";
    pub const POLL_ID: &str = "pollId";
    pub const TITLE: &str = "title";
    pub const SLOT_ID: &str = "slotId";
    pub const DAY: &str = "day";
    pub const START_TIME: &str = "startTime";
    pub const END_TIME: &str = "endTime";
    pub const DURATION: &str = "duration";
}

/// Builds outgoing message URLs under a fixed web base.
#[derive(Debug, Clone)]
pub struct MessageUrlCodec {
    base: Url,
}

impl MessageUrlCodec {
    pub fn new(web_base_url: &str) -> PlanToMeetResult<Self> {
        let base = Url::parse(web_base_url).map_err(|e| {
            PlanToMeetError::Config(format!("Invalid web_base_url '{web_base_url}': {e}"))
        })?;

        if base.cannot_be_a_base() {
            return Err(PlanToMeetError::Config(format!(
                "web_base_url '{web_base_url}' cannot hold a path"
            )));
        }

        Ok(MessageUrlCodec { base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn poll_path(&self, poll_id: &str) -> Url {
        let mut url = self.base.clone();
        url.set_query(None);
        url.set_fragment(None);
        // Checked in new()
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(POLL_SEGMENT).push(poll_id);
        }
        url
    }

    /// Link for an open poll.
    pub fn poll_url(&self, poll: &Poll) -> Url {
        let mut url = self.poll_path(&poll.id);
        url.query_pairs_mut()
            .append_pair(param::POLL_ID, &poll.id)
            .append_pair(param::TITLE, &poll.title);
        url
    }

    /// Link for a finalized poll, carrying the full snapshot.
    pub fn encode_finalized(&self, info: &FinalizedPollInfo) -> Url {
        let mut url = self.poll_path(&info.poll_id);
        url.query_pairs_mut()
            .append_pair(param::FINALIZED, "true")
            .append_pair(param::VERSION, &MESSAGE_URL_VERSION.to_string())
            .append_pair(param::POLL_ID, &info.poll_id)
            .append_pair(param::TITLE, &info.title)
            .append_pair(param::SLOT_ID, &info.slot_id)
            .append_pair(param::DAY, &info.day)
            .append_pair(param::START_TIME, &info.start_time)
            .append_pair(param::END_TIME, &info.end_time)
            .append_pair(param::DURATION, &info.duration_minutes.to_string());
        url
    }
}

/// Decoded query parameters. The first occurrence of a key wins.
fn query_map(url: &Url) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for (key, value) in url.query_pairs() {
        params.entry(key.into_owned()).or_insert_with(|| value.into_owned());
    }
    params
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Find the poll a URL points at: the `pollId` query parameter, or else the
/// path segment after `poll`. `None` means "not a poll URL".
pub fn extract_poll_id(url: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;

    if let Some(id) = query_map(&url).get(param::POLL_ID).and_then(|v| non_blank(v)) {
        return Some(id);
    }

    let mut segments = url.path_segments()?;
    segments.find(|segment| *segment == POLL_SEGMENT)?;
    let raw = segments.next()?;
    let decoded = percent_decode_str(raw).decode_utf8().ok()?;
    non_blank(&decoded)
}

/// True iff the URL carries `finalized=true`.
pub fn is_finalized(url: &str) -> bool {
    Url::parse(url)
        .map(|url| query_map(&url).get(param::FINALIZED).map(String::as_str) == Some("true"))
        .unwrap_or(false)
}

/// Rebuild the finalized snapshot from a message URL.
pub fn decode_finalized(url: &str) -> PlanToMeetResult<FinalizedPollInfo> {
    let url =
        Url::parse(url).map_err(|e| PlanToMeetError::Decode(format!("Unparseable URL: {e}")))?;
    let params = query_map(&url);

    if params.get(param::FINALIZED).map(String::as_str) != Some("true") {
        return Err(PlanToMeetError::Decode("URL is not a finalized poll".into()));
    }

    if let Some(version) = params.get(param::VERSION) {
        if version.parse::<u32>().ok() != Some(MESSAGE_URL_VERSION) {
            return Err(PlanToMeetError::Decode(format!(
                "Unsupported message URL version '{version}'"
            )));
        }
    }

    let field = |name: &str| {
        params
            .get(name)
            .cloned()
            .ok_or_else(|| PlanToMeetError::Decode(format!("Missing '{name}'")))
    };

    let duration = field(param::DURATION)?;
    let duration_minutes = duration
        .parse::<u32>()
        .map_err(|_| PlanToMeetError::Decode(format!("Invalid duration '{duration}'")))?;

    Ok(FinalizedPollInfo {
        poll_id: field(param::POLL_ID)?,
        title: field(param::TITLE)?,
        slot_id: field(param::SLOT_ID)?,
        day: field(param::DAY)?,
        start_time: field(param::START_TIME)?,
        end_time: field(param::END_TIME)?,
        duration_minutes,
    })
}
