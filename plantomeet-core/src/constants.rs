//! Shared constants.

/// Where poll links point when no `web_base_url` is configured.
pub const DEFAULT_WEB_BASE_URL: &str = "https://plantomeet.app";

/// REST root appended to the configured store URL.
pub const REST_PATH: &str = "rest/v1";

/// Version of the finalized-poll URL schema written by this crate.
pub const MESSAGE_URL_VERSION: u32 = 1;

/// Caption used when a poll has no title.
pub const UNTITLED_POLL: &str = "PlanToMeet Poll";

/// Caption used when a finalized poll has no title.
pub const UNTITLED_EVENT: &str = "Event";
