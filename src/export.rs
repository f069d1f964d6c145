//! CSV export of token accounts
//!
//! Mirrors the extension's export dialog: the caller picks which
//! columns to include and gets one comma-separated line per account.

use chrono::{DateTime, NaiveDateTime};

use crate::store::AccountRef;

/// Column selection for [`export_accounts`]. Everything is exported by
/// default.
#[derive(Clone, Copy, Debug)]
pub struct ExportColumns {
    pub steam_id: bool,
    pub token: bool,
    pub app_id: bool,
    pub last_logon: bool,
    pub memo: bool,
}

impl Default for ExportColumns {
    fn default() -> Self {
        ExportColumns {
            steam_id: true,
            token: true,
            app_id: true,
            last_logon: true,
            memo: true,
        }
    }
}

/// Render the selected columns of every account, one line each, in
/// collection order.
pub fn export_accounts(accounts: &[AccountRef], columns: &ExportColumns) -> String {
    accounts
        .iter()
        .map(|account| build_columns(account, columns).join(","))
        .collect::<Vec<_>>()
        .join("\n")
}

fn build_columns(account: &AccountRef, columns: &ExportColumns) -> Vec<String> {
    let mut line = Vec::new();
    if columns.steam_id {
        line.push(account.steam_id().to_string());
    }
    if columns.token {
        line.push(account.token());
    }
    if columns.app_id {
        line.push(account.app_id().to_string());
    }
    if columns.last_logon {
        line.push(account.last_logon().map(format_logon).unwrap_or_default());
    }
    if columns.memo {
        line.push(account.memo());
    }
    line
}

/// Steam renders logon times as free-form text. Normalize to RFC 3339
/// when the text happens to parse as a timestamp, otherwise export it
/// as scraped.
fn format_logon(text: String) -> String {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&text) {
        return parsed.to_rfc3339();
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(&text, "%Y-%m-%dT%H:%M:%S") {
        return parsed.and_utc().to_rfc3339();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GsltToken;
    use crate::store::GameServerAccount;

    fn account(steam_id: &str, last_logon: Option<&str>) -> AccountRef {
        GameServerAccount::new(&GsltToken {
            app_id: 730,
            token: "7FJS3VY2273L".into(),
            expired: false,
            last_logon: last_logon.map(Into::into),
            memo: "CSGO".into(),
            steam_id: steam_id.into(),
        })
    }

    #[test]
    fn test_exports_all_columns_by_default() {
        let accounts = vec![account("STEAM-A", None)];
        let output = export_accounts(&accounts, &ExportColumns::default());
        assert_eq!(output, "STEAM-A,7FJS3VY2273L,730,,CSGO");
    }

    #[test]
    fn test_exports_one_line_per_account() {
        let accounts = vec![account("STEAM-A", None), account("STEAM-B", None)];
        let columns = ExportColumns {
            token: false,
            app_id: false,
            last_logon: false,
            memo: false,
            ..ExportColumns::default()
        };
        assert_eq!(export_accounts(&accounts, &columns), "STEAM-A\nSTEAM-B");
    }

    #[test]
    fn test_parseable_logon_is_normalized() {
        let accounts = vec![account("STEAM-A", Some("1995-12-17T03:24:00"))];
        let columns = ExportColumns {
            steam_id: false,
            token: false,
            app_id: false,
            memo: false,
            ..ExportColumns::default()
        };
        assert_eq!(
            export_accounts(&accounts, &columns),
            "1995-12-17T03:24:00+00:00"
        );
    }

    #[test]
    fn test_unparseable_logon_is_verbatim() {
        let accounts = vec![account("STEAM-A", Some("Mar 3 @ 4:17pm"))];
        let columns = ExportColumns {
            steam_id: false,
            token: false,
            app_id: false,
            memo: false,
            ..ExportColumns::default()
        };
        assert_eq!(export_accounts(&accounts, &columns), "Mar 3 @ 4:17pm");
    }
}
