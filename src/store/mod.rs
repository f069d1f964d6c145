//! Account store - the observable core of the manager

pub mod account;
#[allow(clippy::module_inception)]
pub mod store;

pub use account::{AccountRef, GameServerAccount};
pub use store::GsltStore;
