//! The in-memory game server account entity

use std::sync::{Arc, RwLock};

use crate::models::GsltToken;

/// Shared handle to one account. The store owns the collection and
/// updates entries in place, so a view holding one of these sees every
/// refresh without re-resolving by steam id.
pub type AccountRef = Arc<GameServerAccount>;

/// One game server login token as the store tracks it.
///
/// The steam id is the immutable identity; everything else is updated
/// in place on every listing refresh. `locked` is a transient UI flag
/// that never leaves the process.
pub struct GameServerAccount {
    steam_id: String,
    fields: RwLock<Fields>,
}

#[derive(Clone)]
struct Fields {
    app_id: u32,
    token: String,
    memo: String,
    last_logon: Option<String>,
    expired: bool,
    locked: bool,
}

impl GameServerAccount {
    pub fn new(token: &GsltToken) -> AccountRef {
        Arc::new(GameServerAccount {
            steam_id: token.steam_id.clone(),
            fields: RwLock::new(Fields {
                app_id: token.app_id,
                token: token.token.clone(),
                memo: token.memo.clone(),
                last_logon: token.last_logon.clone(),
                expired: token.expired,
                locked: false,
            }),
        })
    }

    pub fn steam_id(&self) -> &str {
        &self.steam_id
    }

    pub fn app_id(&self) -> u32 {
        self.read().app_id
    }

    pub fn token(&self) -> String {
        self.read().token.clone()
    }

    pub fn memo(&self) -> String {
        self.read().memo.clone()
    }

    pub fn last_logon(&self) -> Option<String> {
        self.read().last_logon.clone()
    }

    pub fn is_expired(&self) -> bool {
        self.read().expired
    }

    pub fn is_locked(&self) -> bool {
        self.read().locked
    }

    /// Mark the account as busy while a batch operation is in flight.
    pub fn set_locked(&self, locked: bool) {
        self.write().locked = locked;
    }

    /// Overwrite the mutable fields from a freshly scraped row. The
    /// lock flag survives a refresh on purpose.
    pub(crate) fn update_from(&self, token: &GsltToken) {
        let mut fields = self.write();
        fields.app_id = token.app_id;
        fields.token = token.token.clone();
        fields.memo = token.memo.clone();
        fields.last_logon = token.last_logon.clone();
        fields.expired = token.expired;
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Fields> {
        self.fields.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Fields> {
        self.fields.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for GameServerAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields = self.read();
        f.debug_struct("GameServerAccount")
            .field("steam_id", &self.steam_id)
            .field("app_id", &fields.app_id)
            .field("token", &fields.token)
            .field("memo", &fields.memo)
            .field("last_logon", &fields.last_logon)
            .field("expired", &fields.expired)
            .field("locked", &fields.locked)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GsltToken;

    fn sample_token() -> GsltToken {
        GsltToken {
            app_id: 730,
            token: "7FJS3VY2273L".into(),
            expired: false,
            last_logon: None,
            memo: "CSGO".into(),
            steam_id: "212V16ECZ4HE".into(),
        }
    }

    #[test]
    fn test_update_from_keeps_lock_flag() {
        let account = GameServerAccount::new(&sample_token());
        account.set_locked(true);

        let mut refreshed = sample_token();
        refreshed.token = "NEWTOKEN".into();
        refreshed.expired = true;
        account.update_from(&refreshed);

        assert_eq!(account.token(), "NEWTOKEN");
        assert!(account.is_expired());
        assert!(account.is_locked());
    }

    #[test]
    fn test_identity_is_immutable() {
        let account = GameServerAccount::new(&sample_token());
        let mut other = sample_token();
        other.steam_id = "SOMETHING-ELSE".into();
        account.update_from(&other);
        assert_eq!(account.steam_id(), "212V16ECZ4HE");
    }
}
