//! Live transport - HTTP against the Steam community site
//!
//! Steam has no API for game server accounts, so every operation is
//! either a scrape of the management page or a form POST against the
//! endpoints its own UI submits to.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::cookie::Jar;
use reqwest::redirect::Policy;
use reqwest::Url;

use crate::constants::{
    CREATE_URL, DELETE_URL, LIST_URL, MEMO_URL, REGENERATE_URL, REQUEST_TIMEOUT,
};
use crate::error::Result;
use crate::models::Listing;
use crate::transport::parser::parse_listing;
use crate::transport::Transport;

/// Transport adapter backed by reqwest.
///
/// Two clients share one cookie jar: listing fetches follow redirects
/// like a browser navigation would, while mutating POSTs must not -
/// Steam answers them with a redirect and following it would only
/// refetch the page we are about to refresh anyway.
pub struct SteamTransport {
    jar: Arc<Jar>,
    get_client: reqwest::Client,
    post_client: reqwest::Client,
}

impl SteamTransport {
    pub fn new() -> Result<Self> {
        let jar = Arc::new(Jar::default());
        let get_client = reqwest::Client::builder()
            .cookie_provider(jar.clone())
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let post_client = reqwest::Client::builder()
            .cookie_provider(jar.clone())
            .redirect(Policy::none())
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(SteamTransport {
            jar,
            get_client,
            post_client,
        })
    }

    /// Seed the jar with a `name=value` session cookie. Outside a
    /// browser extension the ambient Steam login has to come from
    /// somewhere; callers hand over the cookies they obtained through
    /// a regular login.
    pub fn add_session_cookie(&self, cookie: &str) {
        static COMMUNITY_URL: &str = "https://steamcommunity.com";
        let url = Url::parse(COMMUNITY_URL).expect("static url");
        self.jar.add_cookie_str(cookie, &url);
    }

    /// POST a form and treat completion as success. Confirmation of
    /// effect comes from the next listing refresh, not from whatever
    /// status or body Steam sends back here.
    async fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<()> {
        let response = self.post_client.post(url).form(form).send().await?;
        tracing::debug!(url, status = %response.status(), "form posted");
        Ok(())
    }
}

#[async_trait]
impl Transport for SteamTransport {
    async fn fetch_all(&self) -> Result<Listing> {
        tracing::debug!(url = LIST_URL, "fetching token listing");
        let response = self.get_client.get(LIST_URL).send().await?;
        let html = response.text().await?;
        parse_listing(&html)
    }

    async fn remove(&self, session_id: &str, steam_id: &str) -> Result<()> {
        tracing::info!(steam_id, "removing account");
        self.post_form(DELETE_URL, &[("steamid", steam_id), ("sessionid", session_id)])
            .await
    }

    async fn regenerate(&self, session_id: &str, steam_id: &str) -> Result<()> {
        tracing::info!(steam_id, "regenerating token");
        self.post_form(
            REGENERATE_URL,
            &[("steamid", steam_id), ("sessionid", session_id)],
        )
        .await
    }

    async fn change_memo(&self, session_id: &str, steam_id: &str, memo: &str) -> Result<()> {
        tracing::info!(steam_id, "updating memo");
        self.post_form(
            MEMO_URL,
            &[("steamid", steam_id), ("sessionid", session_id), ("memo", memo)],
        )
        .await
    }

    async fn create(&self, session_id: &str, app_id: u32, memo: &str) -> Result<()> {
        tracing::info!(app_id, "creating account");
        let app_id = app_id.to_string();
        self.post_form(
            CREATE_URL,
            &[("sessionid", session_id), ("appid", &app_id), ("memo", memo)],
        )
        .await
    }
}
