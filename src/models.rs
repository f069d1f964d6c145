//! Wire types parsed from the Steam management page

use serde::{Deserialize, Serialize};

/// One token row scraped from the listing page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GsltToken {
    /// Steam AppID the token was issued for
    pub app_id: u32,
    /// The login token itself
    pub token: String,
    /// True when Steam marks the token as expired
    pub expired: bool,
    /// Last logon text as rendered by Steam; `None` when the page
    /// reads "Never"
    pub last_logon: Option<String>,
    /// Free-form memo attached to the token
    pub memo: String,
    /// Unique identity of the game server account
    pub steam_id: String,
}

/// Result of a full listing fetch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    /// Session id embedded in the create form; required on every
    /// mutating request. Empty when the form is absent.
    pub session_id: String,
    /// All token rows, in page order
    pub tokens: Vec<GsltToken>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_roundtrips_through_serde() {
        let listing = Listing {
            session_id: "3D6M733LPVJ1".into(),
            tokens: vec![GsltToken {
                app_id: 730,
                token: "7FJS3VY2273L".into(),
                expired: false,
                last_logon: None,
                memo: "CSGO".into(),
                steam_id: "212V16ECZ4HE".into(),
            }],
        };
        let json = serde_json::to_string(&listing).unwrap();
        assert_eq!(serde_json::from_str::<Listing>(&json).unwrap(), listing);
    }
}
