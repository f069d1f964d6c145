//! The account store - reconciles CRUD operations against the listing
//!
//! All mutation funnels through this type: operations call the
//! transport, then fold the authoritative listing back into the shared
//! collection. Readers get snapshot clones plus a watch-channel version
//! counter to know when to re-read; nothing outside the store ever
//! mutates an account.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use futures_util::future::join_all;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::constants::LOGIN_RETRY_INTERVAL;
use crate::error::{Error, Result};
use crate::models::GsltToken;
use crate::store::account::{AccountRef, GameServerAccount};
use crate::transport::Transport;

struct State {
    accounts: Vec<AccountRef>,
    session_id: String,
}

struct Inner {
    transport: Arc<dyn Transport>,
    state: Mutex<State>,
    logged_in: AtomicBool,
    initialized: AtomicBool,
    changed: watch::Sender<u64>,
    closed: watch::Sender<bool>,
}

/// Observable store over the remote game server account listing.
///
/// Cheap to clone; all clones share the same state. The collection and
/// session id are only touched from inside store methods, under the
/// state lock, which is never held across an await.
#[derive(Clone)]
pub struct GsltStore {
    inner: Arc<Inner>,
}

impl GsltStore {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        let (changed, _) = watch::channel(0u64);
        let (closed, _) = watch::channel(false);

        GsltStore {
            inner: Arc::new(Inner {
                transport,
                state: Mutex::new(State {
                    accounts: Vec::new(),
                    session_id: String::new(),
                }),
                logged_in: AtomicBool::new(true),
                initialized: AtomicBool::new(false),
                changed,
                closed,
            }),
        }
    }

    /// Current accounts, in first-seen order.
    pub fn token_accounts(&self) -> Vec<AccountRef> {
        self.lock_state().accounts.clone()
    }

    /// Session id from the most recent listing fetch.
    pub fn session_id(&self) -> String {
        self.lock_state().session_id.clone()
    }

    /// False only while the most recent listing fetch hit the login
    /// prompt; flips back to true on the next successful fetch.
    pub fn is_logged_in(&self) -> bool {
        self.inner.logged_in.load(Ordering::SeqCst)
    }

    /// True once the first full listing fetch has succeeded. Never
    /// reverts.
    pub fn is_initialized(&self) -> bool {
        self.inner.initialized.load(Ordering::SeqCst)
    }

    /// Version counter bumped on every visible mutation. A view layer
    /// awaits `changed()` and re-reads the snapshots.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.changed.subscribe()
    }

    /// Stop the login retry loop. Waiting `load_accounts` calls
    /// resolve with [`Error::Closed`].
    pub fn close(&self) {
        let _ = self.inner.closed.send(true);
    }

    /// Fetch the listing and reconcile it into the collection.
    ///
    /// A `NeedsLogin` failure is not surfaced: the store flags
    /// `is_logged_in` false and keeps polling until the user logs in
    /// (or the store is closed). Every other error propagates and
    /// leaves the flags untouched.
    pub async fn load_accounts(&self) -> Result<()> {
        let mut closed = self.inner.closed.subscribe();
        loop {
            match self.refresh().await {
                Ok(()) => return Ok(()),
                Err(Error::NeedsLogin) => {
                    self.inner.logged_in.store(false, Ordering::SeqCst);
                    self.notify();
                    tracing::warn!(
                        retry_in = ?LOGIN_RETRY_INTERVAL,
                        "steam reports not logged in, polling until login"
                    );
                    tokio::select! {
                        _ = sleep(LOGIN_RETRY_INTERVAL) => {}
                        _ = closed.wait_for(|closed| *closed) => return Err(Error::Closed),
                    }
                }
                Err(error) => {
                    tracing::error!(%error, "failed to load accounts");
                    return Err(error);
                }
            }
        }
    }

    /// Remove a single account; resolves after the trailing refresh.
    pub async fn remove_account(&self, account: AccountRef) -> Result<AccountRef> {
        for result in join_all(self.remove_accounts(vec![account.clone()])).await {
            result??;
        }
        Ok(account)
    }

    /// Remove a batch of accounts. One listing refresh fires after the
    /// last item settles; each returned handle resolves to its own
    /// account as soon as its remote call finishes.
    pub fn remove_accounts(&self, accounts: Vec<AccountRef>) -> Vec<JoinHandle<Result<AccountRef>>> {
        let store = self.clone();
        self.spawn_batch(accounts, move |account: AccountRef| {
            let store = store.clone();
            async move {
                let session_id = store.session_id();
                store
                    .inner
                    .transport
                    .remove(&session_id, account.steam_id())
                    .await?;
                store.drop_local(account.steam_id());
                Ok(account)
            }
        })
    }

    /// Regenerate the token of a single account; resolves after the
    /// trailing refresh.
    pub async fn regenerate_token(&self, account: AccountRef) -> Result<AccountRef> {
        for result in join_all(self.regenerate_tokens(vec![account.clone()])).await {
            result??;
        }
        Ok(account)
    }

    /// Regenerate a batch of tokens. The collection is not touched
    /// eagerly; only the trailing refresh updates token and expiry.
    pub fn regenerate_tokens(
        &self,
        accounts: Vec<AccountRef>,
    ) -> Vec<JoinHandle<Result<AccountRef>>> {
        let store = self.clone();
        self.spawn_batch(accounts, move |account: AccountRef| {
            let store = store.clone();
            async move {
                let session_id = store.session_id();
                store
                    .inner
                    .transport
                    .regenerate(&session_id, account.steam_id())
                    .await?;
                Ok(account)
            }
        })
    }

    /// Replace the memo of an account and refresh before resolving.
    pub async fn update_memo(&self, account: AccountRef, memo: &str) -> Result<AccountRef> {
        let session_id = self.session_id();
        self.inner
            .transport
            .change_memo(&session_id, account.steam_id(), memo)
            .await?;
        self.load_accounts().await?;
        Ok(account)
    }

    /// Issue `amount` independent create calls. One refresh fires
    /// after the last call settles, which is also what materializes
    /// the new accounts in the collection.
    pub fn create_accounts(
        &self,
        amount: usize,
        app_id: u32,
        memo: &str,
    ) -> Vec<JoinHandle<Result<()>>> {
        let store = self.clone();
        let memo = memo.to_string();
        self.spawn_batch(vec![(); amount], move |(): ()| {
            let store = store.clone();
            let memo = memo.clone();
            async move {
                let session_id = store.session_id();
                store.inner.transport.create(&session_id, app_id, &memo).await
            }
        })
    }

    /// Resolve-all-then-refresh: run every item concurrently and fire
    /// exactly one `load_accounts` when the last one settles. Failed
    /// items count toward completion, so one bad item never blocks the
    /// refresh; a failed refresh is logged rather than folded into an
    /// item result.
    fn spawn_batch<T, F, Fut>(&self, items: Vec<T>, run: F) -> Vec<JoinHandle<Result<T>>>
    where
        T: Send + 'static,
        F: Fn(T) -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let total = items.len();
        let settled = Arc::new(AtomicUsize::new(0));

        items
            .into_iter()
            .map(|item| {
                let store = self.clone();
                let settled = settled.clone();
                let future = run(item);
                tokio::spawn(async move {
                    let result = future.await;
                    if settled.fetch_add(1, Ordering::SeqCst) + 1 == total {
                        if let Err(error) = store.load_accounts().await {
                            tracing::warn!(%error, "refresh after batch failed");
                        }
                    }
                    result
                })
            })
            .collect()
    }

    async fn refresh(&self) -> Result<()> {
        let listing = self.inner.transport.fetch_all().await?;
        {
            let mut state = self.lock_state();
            state.session_id = listing.session_id;
            reconcile(&mut state.accounts, &listing.tokens);
        }
        self.inner.initialized.store(true, Ordering::SeqCst);
        self.inner.logged_in.store(true, Ordering::SeqCst);
        self.notify();
        tracing::debug!(accounts = listing.tokens.len(), "listing reconciled");
        Ok(())
    }

    /// Eager removal between a successful delete and the trailing
    /// refresh, so the UI does not keep showing a dead account.
    fn drop_local(&self, steam_id: &str) {
        {
            let mut state = self.lock_state();
            state.accounts.retain(|a| a.steam_id() != steam_id);
        }
        self.notify();
    }

    fn notify(&self) {
        self.inner.changed.send_modify(|version| *version += 1);
    }

    fn lock_state(&self) -> MutexGuard<'_, State> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Merge a fresh listing into the collection by steam id: matched
/// accounts are updated in place so held references stay live, new
/// rows are appended in page order, and accounts the listing no longer
/// mentions are dropped.
fn reconcile(accounts: &mut Vec<AccountRef>, tokens: &[GsltToken]) {
    for token in tokens {
        match accounts.iter().find(|a| a.steam_id() == token.steam_id) {
            Some(existing) => existing.update_from(token),
            None => accounts.push(GameServerAccount::new(token)),
        }
    }
    accounts.retain(|account| {
        tokens
            .iter()
            .any(|token| token.steam_id == account.steam_id())
    });
}
