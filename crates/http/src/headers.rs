//! Header value grammar as described in
//! <https://www.rfc-editor.org/rfc/rfc7231#section-5.3>
//!
//! Values are comma-separated, each optionally followed by `;`-separated
//! `name=value` parameters. Parameter values may be quoted strings with
//! backslash escapes. The parser is deliberately legacy-tolerant: an
//! unterminated quote degrades to a literal `"` instead of failing.

use std::{cmp::Ordering, fmt};

/// Characters that force a parameter value to be rendered as a quoted
/// string, per <https://www.rfc-editor.org/rfc/rfc7230#section-3.2.6>
const FIELD_VALUE_SEPARATORS: &[char] = &[
    '(', ')', '<', '>', '@', ',', ';', ':', '\\', '"', '/', '[', ']', '?', '=', '{', '}', ' ',
    '\t', '\n', '\r',
];

/// A single `name=value` parameter of a header value.
#[derive(Clone, Debug, Eq)]
pub struct HeaderValueParam {
    pub name: String,
    pub value: String,

    /// Force quoting when rendering, even if the value would not need it
    pub escape_value: bool,
}

impl HeaderValueParam {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            escape_value: false,
        }
    }

    #[must_use]
    pub fn new_escaped(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            escape_value: true,
        }
    }
}

impl PartialEq for HeaderValueParam {
    fn eq(&self, other: &Self) -> bool {
        self.name.eq_ignore_ascii_case(&other.name) && self.value == other.value
    }
}

/// One element of a comma-separated header, with its parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct HeaderValue {
    pub value: String,
    pub params: Vec<HeaderValueParam>,
}

impl HeaderValue {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            params: Vec::new(),
        }
    }

    /// The `q` parameter, clamped to the grammar: a missing, unparsable
    /// or out-of-range quality counts as `1.0`.
    #[must_use]
    pub fn quality(&self) -> f64 {
        self.params
            .iter()
            .find(|param| param.name.eq_ignore_ascii_case("q"))
            .and_then(|param| param.value.parse::<f64>().ok())
            .filter(|quality| (0.0..=1.0).contains(quality))
            .unwrap_or(1.0)
    }
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut result = self.value.clone();
        append_header_parameters(&mut result, &self.params);
        result.fmt(f)
    }
}

/// Parse a comma-separated header into its values.
#[must_use]
pub fn parse_header_value(text: &str) -> Vec<HeaderValue> {
    parse(text, false)
}

/// Parse a pure parameter string, like the part of a `Content-Disposition`
/// after the disposition token. The returned values carry empty `value`
/// fields.
#[must_use]
pub fn parse_header_value_parameters(text: &str) -> Vec<HeaderValue> {
    parse(text, true)
}

/// Parse and sort by descending quality; ties keep their original order.
#[must_use]
pub fn parse_and_sort_header(header: &str) -> Vec<HeaderValue> {
    let mut values = parse_header_value(header);
    values.sort_by(|a, b| {
        b.quality()
            .partial_cmp(&a.quality())
            .unwrap_or(Ordering::Equal)
    });
    values
}

/// Like [parse_and_sort_header], breaking quality ties by specificity:
/// exact types beat `type/*` beats `*/*`, and among equals more
/// parameters rank higher.
#[must_use]
pub fn parse_and_sort_content_type_header(header: &str) -> Vec<HeaderValue> {
    let mut values = parse_header_value(header);
    values.sort_by(|a, b| {
        b.quality()
            .partial_cmp(&a.quality())
            .unwrap_or(Ordering::Equal)
            .then_with(|| wildcard_rank(&a.value).cmp(&wildcard_rank(&b.value)))
            .then_with(|| b.params.len().cmp(&a.params.len()))
    });
    values
}

fn wildcard_rank(value: &str) -> u8 {
    let (main_type, subtype) = value.split_once('/').unwrap_or((value, ""));

    let mut rank = 0;
    if main_type.trim() == "*" {
        rank += 2;
    }
    if subtype.trim() == "*" {
        rank += 1;
    }
    rank
}

fn parse(text: &str, parameters_only: bool) -> Vec<HeaderValue> {
    let mut values = Vec::new();
    let mut position = 0;

    while position < text.len() {
        position = parse_item(text, position, parameters_only, &mut values);
    }

    values
}

/// Parse one comma-delimited item starting at `start`, returning the
/// position after its terminating `,` (or the end of the input).
fn parse_item(
    text: &str,
    start: usize,
    parameters_only: bool,
    values: &mut Vec<HeaderValue>,
) -> usize {
    let bytes = text.as_bytes();
    let mut position = start;

    if !parameters_only {
        while position < bytes.len() && !matches!(bytes[position], b';' | b',') {
            position += 1;
        }
    }

    let value = text[start..position].trim().to_owned();
    let mut params = Vec::new();

    loop {
        match bytes.get(position) {
            Some(b';') => position = parse_parameter(text, position + 1, &mut params),
            Some(b',') => {
                position += 1;
                break;
            },
            Some(b' ') => position += 1,
            Some(_) if parameters_only && params.is_empty() => {
                position = parse_parameter(text, position, &mut params);
            },
            // Stray text after a quoted parameter value
            Some(_) => position += 1,
            None => {
                position = bytes.len();
                break;
            },
        }
    }

    values.push(HeaderValue { value, params });
    position
}

/// Parse one `name` or `name=value` parameter, returning the position of
/// the delimiter that ended it.
fn parse_parameter(text: &str, start: usize, params: &mut Vec<HeaderValueParam>) -> usize {
    let bytes = text.as_bytes();
    let mut position = start;

    while position < bytes.len() && bytes[position] == b' ' {
        position += 1;
    }

    let name_start = position;
    while position < bytes.len() && !matches!(bytes[position], b'=' | b';' | b',') {
        position += 1;
    }
    let name = text[name_start..position].trim();

    if bytes.get(position) != Some(&b'=') {
        if !name.is_empty() {
            params.push(HeaderValueParam::new(name, ""));
        }
        return position;
    }

    position += 1;
    while position < bytes.len() && bytes[position] == b' ' {
        position += 1;
    }

    let (value, next) = if bytes.get(position) == Some(&b'"') {
        parse_quoted_value(text, position + 1)
    } else {
        let value_start = position;
        while position < bytes.len() && !matches!(bytes[position], b';' | b',') {
            position += 1;
        }
        (text[value_start..position].trim().to_owned(), position)
    };

    if !name.is_empty() {
        params.push(HeaderValueParam::new(name, value));
    }

    next
}

/// Read a quoted string starting right after the opening `"`.
///
/// `\X` always escapes the next character when one exists. A `"` only
/// terminates the string if, after optional spaces, a `;`, `,` or the end
/// of input follows; any other `"` is literal. If no terminator is ever
/// found the opening quote itself is demoted to a literal character.
fn parse_quoted_value(text: &str, start: usize) -> (String, usize) {
    let mut value = String::new();
    let mut chars = text[start..].char_indices();

    while let Some((offset, c)) = chars.next() {
        match c {
            '"' if closes_quoted_value(text, start + offset + 1) => {
                return (value, start + offset + 1);
            },
            '\\' => match chars.next() {
                Some((_, escaped)) => value.push(escaped),
                None => value.push('\\'),
            },
            _ => value.push(c),
        }
    }

    (format!("\"{value}"), text.len())
}

fn closes_quoted_value(text: &str, position: usize) -> bool {
    let rest = text[position..].trim_start_matches(' ');
    rest.is_empty() || rest.starts_with([';', ','])
}

/// Append `; name=value` parameter pairs, quoting values that need it.
pub(crate) fn append_header_parameters(out: &mut String, params: &[HeaderValueParam]) {
    for param in params {
        out.push_str("; ");
        out.push_str(&param.name);
        out.push('=');

        if param.escape_value || needs_quoting(&param.value) {
            quote_into(out, &param.value);
        } else {
            out.push_str(&param.value);
        }
    }
}

fn needs_quoting(value: &str) -> bool {
    value.is_empty() || value.contains(FIELD_VALUE_SEPARATORS)
}

fn quote_into(out: &mut String, value: &str) {
    out.push('"');
    for c in value.chars() {
        if matches!(c, '\\' | '"') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
}
