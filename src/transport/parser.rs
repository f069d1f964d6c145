//! Listing page parser - scrapes the token table out of Steam markup
//!
//! The management page is the only HTML shape we understand: a
//! `#serverList` container holding a `gstable` table with one row per
//! token, plus a `createAccountForm` carrying the session id. Anything
//! else is either a login prompt (no table at all) or a markup change
//! we refuse to guess about.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::models::{GsltToken, Listing};

/// Parse the full management page.
///
/// A page without the token table means Steam rendered the login
/// prompt instead, which surfaces as [`Error::NeedsLogin`].
pub fn parse_listing(html: &str) -> Result<Listing> {
    let table = find_token_table(html).ok_or(Error::NeedsLogin)?;
    let tokens = parse_tokens(table)?;
    tracing::debug!(count = tokens.len(), "parsed token listing");

    Ok(Listing {
        session_id: parse_session_id(html),
        tokens,
    })
}

/// Locate the `gstable` inside the `#serverList` container and return
/// its inner markup.
fn find_token_table(html: &str) -> Option<&str> {
    static TABLE_REGEX: OnceLock<Regex> = OnceLock::new();
    let table_re = TABLE_REGEX.get_or_init(|| {
        Regex::new(r#"(?s)<table[^>]*class="[^"]*\bgstable\b[^"]*"[^>]*>(.*?)</table>"#).unwrap()
    });

    let server_list = html.find(r#"id="serverList""#)?;
    let capture = table_re.captures(&html[server_list..])?;
    Some(capture.get(1).unwrap().as_str())
}

/// Decompose every row of the table body into a token record.
fn parse_tokens(table: &str) -> Result<Vec<GsltToken>> {
    static TBODY_REGEX: OnceLock<Regex> = OnceLock::new();
    static THEAD_REGEX: OnceLock<Regex> = OnceLock::new();
    static ROW_REGEX: OnceLock<Regex> = OnceLock::new();

    let tbody_re = TBODY_REGEX
        .get_or_init(|| Regex::new(r"(?s)<tbody[^>]*>(.*?)</tbody>").unwrap());
    let thead_re = THEAD_REGEX
        .get_or_init(|| Regex::new(r"(?s)<thead[^>]*>.*?</thead>").unwrap());
    let row_re = ROW_REGEX.get_or_init(|| Regex::new(r"(?s)<tr[^>]*>(.*?)</tr>").unwrap());

    // Source markup may omit `<tbody>`; a DOM parser inserts one
    // around stray rows, so a regex scan has to fall back to the table
    // itself (minus any header section) or it would drop every row.
    let body = match tbody_re.captures(table) {
        Some(tbody) => std::borrow::Cow::Borrowed(tbody.get(1).unwrap().as_str()),
        None => thead_re.replace(table, ""),
    };

    row_re
        .captures_iter(&body)
        .map(|row| parse_token(row.get(1).unwrap().as_str()))
        .collect()
}

/// Parse one `<tr>` into a token record.
///
/// Cell layout is fixed: app id, token, last logon, memo, actions. The
/// actions cell embeds a hidden `steamid` input which is the only
/// stable identity the page exposes.
fn parse_token(row: &str) -> Result<GsltToken> {
    static CELL_REGEX: OnceLock<Regex> = OnceLock::new();
    let cell_re =
        CELL_REGEX.get_or_init(|| Regex::new(r"(?s)<td([^>]*)>(.*?)</td>").unwrap());

    let cells: Vec<(&str, &str)> = cell_re
        .captures_iter(row)
        .map(|c| (c.get(1).unwrap().as_str(), c.get(2).unwrap().as_str()))
        .collect();
    if cells.len() != 5 {
        return Err(Error::MalformedPage(format!(
            "expected 5 cells per token row, found {}",
            cells.len()
        )));
    }

    let app_id_text = text_content(cells[0].1);
    let app_id = app_id_text.parse::<u32>().map_err(|_| {
        Error::MalformedPage(format!("app id is not numeric: {app_id_text:?}"))
    })?;

    let token_text = text_content(cells[1].1);
    let token = token_text.split_whitespace().next().unwrap_or("").to_string();

    let last_logon_text = text_content(cells[2].1);
    let last_logon = (last_logon_text != "Never").then_some(last_logon_text);

    Ok(GsltToken {
        app_id,
        token,
        expired: has_class(cells[1].0, "expired"),
        last_logon,
        memo: text_content(cells[3].1),
        steam_id: input_value(row, "steamid").ok_or_else(|| {
            Error::MalformedPage("token row without a steamid input".into())
        })?,
    })
}

/// Read the session id out of the create-account form. An absent form
/// yields an empty string; some page variants omit it even when the
/// listing renders.
fn parse_session_id(html: &str) -> String {
    static FORM_REGEX: OnceLock<Regex> = OnceLock::new();
    let form_re = FORM_REGEX.get_or_init(|| {
        Regex::new(r#"(?s)<(?:form|div)[^>]*id="createAccountForm"[^>]*>(.*?)</(?:form|div)>"#)
            .unwrap()
    });

    form_re
        .captures(html)
        .and_then(|form| input_value(form.get(1).unwrap().as_str(), "sessionid"))
        .unwrap_or_default()
}

/// Value of the first `<input>` with the given name inside `fragment`.
fn input_value(fragment: &str, name: &str) -> Option<String> {
    static INPUT_REGEX: OnceLock<Regex> = OnceLock::new();
    static VALUE_REGEX: OnceLock<Regex> = OnceLock::new();

    let input_re = INPUT_REGEX.get_or_init(|| Regex::new(r"<input[^>]*>").unwrap());
    let value_re =
        VALUE_REGEX.get_or_init(|| Regex::new(r#"\bvalue="([^"]*)""#).unwrap());

    let name_attr = format!(r#"name="{name}""#);
    input_re
        .find_iter(fragment)
        .find(|tag| tag.as_str().contains(&name_attr))
        .and_then(|tag| value_re.captures(tag.as_str()))
        .map(|c| decode_entities(&c[1]))
}

/// Equivalent of DOM `textContent` for the narrow markup we scrape:
/// drop tags, decode entities, trim the surrounding whitespace.
fn text_content(fragment: &str) -> String {
    static TAG_REGEX: OnceLock<Regex> = OnceLock::new();
    let tag_re = TAG_REGEX.get_or_init(|| Regex::new(r"<[^>]+>").unwrap());

    decode_entities(tag_re.replace_all(fragment, "").trim())
}

fn has_class(attrs: &str, class: &str) -> bool {
    static CLASS_REGEX: OnceLock<Regex> = OnceLock::new();
    let class_re = CLASS_REGEX
        .get_or_init(|| Regex::new(r#"class="([^"]*)""#).unwrap());

    class_re
        .captures(attrs)
        .map(|c| c[1].split_whitespace().any(|name| name == class))
        .unwrap_or(false)
}

/// The handful of entities Steam actually emits in memos and tokens.
fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
