//! # GSLT Manager
//!
//! Core of a manager for Steam Game Server Login Tokens (GSLTs):
//! listing, creating, deleting, regenerating, memo editing and export.
//! Steam offers no API for these, so everything goes through the
//! community site - scraping the management page and posting the same
//! forms its own UI submits.
//!
//! ## Architecture
//! Layered, with channels at the view seam:
//! - Transport layer (reqwest) - scrapes and posts against Steam
//! - Store layer (`GsltStore`) - owns the account collection,
//!   reconciles every refresh by steam id, retries through logouts
//! - Queue layer (`ActionQueueState`) - progress accounting for
//!   batched operations, consumed by a notification surface
//!
//! A view layer reads snapshots (`token_accounts`, `is_logged_in`,
//! `is_initialized`, `running`) and re-reads whenever the store's
//! watch channel ticks.

pub mod constants;
pub mod error;
pub mod export;
pub mod models;
pub mod queue;
pub mod store;
pub mod transport;

// Re-export commonly used types
pub use error::{Error, Result};
pub use export::{export_accounts, ExportColumns};
pub use models::{GsltToken, Listing};
pub use queue::{ActionQueue, ActionQueueRef, ActionQueueState};
pub use store::{AccountRef, GameServerAccount, GsltStore};
pub use transport::{SteamTransport, Transport};
