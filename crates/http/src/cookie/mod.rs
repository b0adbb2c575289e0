//! Cookie values as described in <https://www.rfc-editor.org/rfc/rfc6265>
//!
//! Cookie values have no safe universal wire form, so every [Cookie]
//! carries the [CookieEncoding] its value is written with. The chosen
//! encoding is round-tripped through the private `$x-enc` attribute,
//! which never shows up in [Cookie::extensions].

pub mod date;

use std::fmt;

use base64ct::{Base64, Encoding as _};
use thiserror::Error;
use url::percent::{decode_url_query_component, encode_url_parameter_value};

use crate::{
    cookie::date::{parse_cookie_date, InvalidCookieDate},
    date::GmtDate,
};

/// Attribute names that belong to the cookie itself rather than to its
/// extensions, matched case-insensitively
const KNOWN_ATTRIBUTES: &[&str] = &[
    "max-age", "expires", "domain", "path", "secure", "httponly", "$x-enc",
];

const ENCODING_ATTRIBUTE: &str = "$x-enc";

/// Error produced when encoding, decoding or parsing cookies.
#[derive(Clone, Debug, Error)]
pub enum CookieError {
    #[error("cookie name {0:?} contains characters that cannot appear in a cookie")]
    InvalidName(String),

    #[error("cookie value {0:?} needs escaping, which the raw encoding cannot provide")]
    UnsafeRawValue(String),

    #[error("cookie value {0:?} contains a double quote and cannot be quoted")]
    UnquotableValue(String),

    #[error("set-cookie header {0:?} carries no cookie pair")]
    NoCookiePair(String),

    #[error("cookie value is not valid percent-encoding")]
    Decode(#[from] url::DecodeError),

    #[error("cookie value is not valid base64")]
    Base64(#[from] base64ct::Error),

    #[error("base64 cookie value does not decode to utf-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error(transparent)]
    Date(#[from] InvalidCookieDate),
}

/// Strategy for writing a cookie value onto the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CookieEncoding {
    /// Pass the value through untouched; fails on unsafe characters
    Raw,
    /// Wrap values containing unsafe characters in double quotes
    DQuotes,
    /// Percent-encode like a query component, `+` for space
    #[default]
    UriEncoding,
    /// Base64, unconditionally safe
    Base64Encoding,
}

impl CookieEncoding {
    fn wire_name(&self) -> &'static str {
        match self {
            Self::Raw => "RAW",
            Self::DQuotes => "DQUOTES",
            Self::UriEncoding => "URI_ENCODING",
            Self::Base64Encoding => "BASE64_ENCODING",
        }
    }

    fn from_wire_name(name: &str) -> Option<Self> {
        let encoding = match name {
            "RAW" => Self::Raw,
            "DQUOTES" => Self::DQuotes,
            "URI_ENCODING" => Self::UriEncoding,
            "BASE64_ENCODING" => Self::Base64Encoding,
            _ => return None,
        };
        Some(encoding)
    }
}

/// A cookie with the attributes of a `Set-Cookie` header.
///
/// `max_age` of zero and empty `domain`/`path` mean "not set".
#[derive(Clone, Debug, PartialEq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub encoding: CookieEncoding,
    pub max_age: i32,
    pub expires: Option<GmtDate>,
    pub domain: String,
    pub path: String,
    pub secure: bool,
    pub http_only: bool,

    /// Unrecognized attributes, in wire order; `None` for flag-only
    /// attributes
    pub extensions: Vec<(String, Option<String>)>,
}

impl Cookie {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            encoding: CookieEncoding::default(),
            max_age: 0,
            expires: None,
            domain: String::new(),
            path: String::new(),
            secure: false,
            http_only: false,
            extensions: Vec::new(),
        }
    }
}

/// Characters a cookie value cannot contain without being escaped
fn should_escape_in_cookies(c: char) -> bool {
    c.is_whitespace() || c.is_control() || matches!(c, ';' | ',' | '"')
}

/// Encode a cookie value with the given strategy.
pub fn encode_cookie_value(value: &str, encoding: CookieEncoding) -> Result<String, CookieError> {
    match encoding {
        CookieEncoding::Raw => {
            if value.chars().any(should_escape_in_cookies) {
                return Err(CookieError::UnsafeRawValue(value.to_owned()));
            }
            Ok(value.to_owned())
        },
        CookieEncoding::DQuotes => {
            if value.contains('"') {
                return Err(CookieError::UnquotableValue(value.to_owned()));
            }
            if value.chars().any(should_escape_in_cookies) {
                Ok(format!("\"{value}\""))
            } else {
                Ok(value.to_owned())
            }
        },
        CookieEncoding::UriEncoding => Ok(encode_url_parameter_value(value)),
        CookieEncoding::Base64Encoding => Ok(Base64::encode_string(value.as_bytes())),
    }
}

/// Reverse [encode_cookie_value].
pub fn decode_cookie_value(value: &str, encoding: CookieEncoding) -> Result<String, CookieError> {
    match encoding {
        CookieEncoding::Raw | CookieEncoding::DQuotes => Ok(strip_quotes(value).to_owned()),
        CookieEncoding::UriEncoding => Ok(decode_url_query_component(value)?),
        CookieEncoding::Base64Encoding => Ok(String::from_utf8(Base64::decode_vec(value)?)?),
    }
}

fn strip_quotes(value: &str) -> &str {
    let trimmed = value.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        &trimmed[1..trimmed.len() - 1]
    } else {
        value
    }
}

/// Split a cookie header on `;`, leaving `;` inside quoted values alone.
fn split_cookie_pairs(header: &str) -> Vec<&str> {
    let mut pairs = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;

    for (position, c) in header.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                pairs.push(&header[start..position]);
                start = position + 1;
            },
            _ => {},
        }
    }
    pairs.push(&header[start..]);

    pairs
}

/// `(name, value)` for `name=value` tokens, `(name, None)` for flags
fn split_pair(token: &str) -> Option<(&str, Option<&str>)> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }

    match token.split_once('=') {
        Some((name, value)) => Some((name.trim(), Some(value.trim()))),
        None => Some((token, None)),
    }
}

/// Parse a request `Cookie` header into ordered `name=value` pairs, with
/// surrounding quotes stripped. Pairs with a `$`-prefixed name are
/// internal markers and skipped unless `include_escaped` is set.
#[must_use]
pub fn parse_client_cookies_header(header: &str, include_escaped: bool) -> Vec<(String, String)> {
    split_cookie_pairs(header)
        .into_iter()
        .filter_map(split_pair)
        .filter(|(name, _)| include_escaped || !name.starts_with('$'))
        .map(|(name, value)| {
            (
                name.to_owned(),
                strip_quotes(value.unwrap_or_default()).to_owned(),
            )
        })
        .collect()
}

/// Parse a `Set-Cookie` header.
///
/// The first pair without a `$`-prefixed name is the cookie itself; its
/// value is decoded with the encoding recovered from `$x-enc`, defaulting
/// to URI encoding.
pub fn parse_server_set_cookie_header(header: &str) -> Result<Cookie, CookieError> {
    let pairs: Vec<(&str, Option<&str>)> = split_cookie_pairs(header)
        .into_iter()
        .filter_map(split_pair)
        .collect();

    let cookie_index = pairs
        .iter()
        .position(|(name, _)| !name.starts_with('$'))
        .ok_or_else(|| CookieError::NoCookiePair(header.to_owned()))?;
    let (name, raw_value) = {
        let (name, value) = &pairs[cookie_index];
        (*name, strip_quotes(value.unwrap_or_default()))
    };

    let encoding = pairs
        .iter()
        .find(|(attribute, _)| attribute.eq_ignore_ascii_case(ENCODING_ATTRIBUTE))
        .and_then(|(_, value)| value.as_deref())
        .map(|value| match CookieEncoding::from_wire_name(value) {
            Some(encoding) => encoding,
            None => {
                log::warn!("unknown cookie encoding {value:?}, assuming uri encoding");
                CookieEncoding::UriEncoding
            },
        })
        .unwrap_or_default();

    let mut cookie = Cookie::new(name, decode_cookie_value(raw_value, encoding)?);
    cookie.encoding = encoding;

    let attribute = |wanted: &str| {
        pairs
            .iter()
            .enumerate()
            .find(|&(index, (name, _))| index != cookie_index && name.eq_ignore_ascii_case(wanted))
            .map(|(_, (_, value))| strip_quotes(value.unwrap_or_default()))
    };

    if let Some(max_age) = attribute("max-age") {
        cookie.max_age = clamp_parse_max_age(max_age);
    }
    if let Some(expires) = attribute("expires") {
        cookie.expires = Some(parse_cookie_date(expires)?);
    }
    if let Some(domain) = attribute("domain") {
        cookie.domain = domain.to_owned();
    }
    if let Some(path) = attribute("path") {
        cookie.path = path.to_owned();
    }
    cookie.secure = attribute("secure").is_some();
    cookie.http_only = attribute("httponly").is_some();

    cookie.extensions = pairs
        .iter()
        .enumerate()
        .filter(|&(index, (name, _))| {
            index != cookie_index
                && !name.starts_with('$')
                && !KNOWN_ATTRIBUTES
                    .iter()
                    .any(|known| name.eq_ignore_ascii_case(known))
        })
        .map(|(_, (name, value))| {
            (
                (*name).to_owned(),
                value.map(|value| strip_quotes(value).to_owned()),
            )
        })
        .collect();

    Ok(cookie)
}

/// Render a `Set-Cookie` header, appending the `$x-enc` marker so the
/// encoding survives a round trip.
pub fn render_set_cookie_header(cookie: &Cookie) -> Result<String, CookieError> {
    validate_cookie_name(&cookie.name)?;

    let mut parts = vec![format!(
        "{}={}",
        cookie.name,
        encode_cookie_value(&cookie.value, cookie.encoding)?
    )];

    if cookie.max_age > 0 {
        parts.push(format!("Max-Age={}", cookie.max_age));
    }
    if let Some(expires) = &cookie.expires {
        parts.push(format!("Expires={}", expires.to_http_date()));
    }
    if !cookie.domain.is_empty() {
        parts.push(format!("Domain={}", cookie.domain));
    }
    if !cookie.path.is_empty() {
        parts.push(format!("Path={}", cookie.path));
    }
    if cookie.secure {
        parts.push("Secure".to_owned());
    }
    if cookie.http_only {
        parts.push("HttpOnly".to_owned());
    }

    for (name, value) in &cookie.extensions {
        match value {
            Some(value) => parts.push(format!(
                "{name}={}",
                encode_cookie_value(value, cookie.encoding)?
            )),
            None => parts.push(name.clone()),
        }
    }

    parts.push(format!(
        "{ENCODING_ATTRIBUTE}={}",
        cookie.encoding.wire_name()
    ));

    Ok(parts.join("; "))
}

/// Render the request-side `name=value` form for a `Cookie` header.
pub fn render_cookie_header(cookie: &Cookie) -> Result<String, CookieError> {
    validate_cookie_name(&cookie.name)?;

    Ok(format!(
        "{}={}",
        cookie.name,
        encode_cookie_value(&cookie.value, cookie.encoding)?
    ))
}

fn validate_cookie_name(name: &str) -> Result<(), CookieError> {
    if name.is_empty() || name.chars().any(|c| should_escape_in_cookies(c) || c == '=') {
        return Err(CookieError::InvalidName(name.to_owned()));
    }
    Ok(())
}

fn clamp_parse_max_age(value: &str) -> i32 {
    value
        .parse::<i64>()
        .map(|seconds| seconds.clamp(0, i64::from(i32::MAX)) as i32)
        .unwrap_or(0)
}

impl fmt::Display for CookieEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.wire_name().fmt(f)
    }
}
