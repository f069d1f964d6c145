//! Application constants
//!
//! Centralized location for the Steam endpoints and timing defaults.

use std::time::Duration;

/// Listing page for all game server accounts (locale pinned so the
/// scraper always sees the same markup)
pub const LIST_URL: &str = "https://steamcommunity.com/dev/managegameservers?l=english";

/// Endpoint for creating a new game server account
pub const CREATE_URL: &str = "https://steamcommunity.com/dev/creategsaccount?l=english";

/// Endpoint for deleting a game server account
pub const DELETE_URL: &str = "https://steamcommunity.com/dev/deletegsaccount?l=english";

/// Endpoint for updating the memo of a game server account
pub const MEMO_URL: &str = "https://steamcommunity.com/dev/updategsmemo?l=english";

/// Endpoint for regenerating the token of a game server account
pub const REGENERATE_URL: &str = "https://steamcommunity.com/dev/resetgstoken?l=english";

/// How long to wait between listing fetches while Steam reports us
/// as not logged in
pub const LOGIN_RETRY_INTERVAL: Duration = Duration::from_millis(3000);

/// How long a finished action queue stays visible before removing
/// itself from the registry
pub const QUEUE_REMOVE_DELAY: Duration = Duration::from_millis(3000);

/// Timeout applied to every request against Steam
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
