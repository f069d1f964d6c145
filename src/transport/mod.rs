//! Transport layer - talks to the Steam community site

pub mod client;
pub mod parser;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Listing;

pub use client::SteamTransport;

/// The narrow contract the store consumes. Kept as a trait so the
/// store can be exercised against a scripted transport in tests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch the management page and scrape every token plus the
    /// current session id.
    async fn fetch_all(&self) -> Result<Listing>;

    /// Delete a game server account.
    async fn remove(&self, session_id: &str, steam_id: &str) -> Result<()>;

    /// Issue a fresh token for an (usually expired) account.
    async fn regenerate(&self, session_id: &str, steam_id: &str) -> Result<()>;

    /// Replace the memo of an account.
    async fn change_memo(&self, session_id: &str, steam_id: &str, memo: &str) -> Result<()>;

    /// Create a new game server account for the given app.
    async fn create(&self, session_id: &str, app_id: u32, memo: &str) -> Result<()>;
}
