//! Cookie date parsing as described in
//! <https://www.rfc-editor.org/rfc/rfc6265#section-5.1.1>
//!
//! The grammar is deliberately loose: the input is split into tokens on a
//! delimiter character class, and every token is tried against the
//! not-yet-found fields in the order time, day, month, year.

use thiserror::Error;

use crate::date::{GmtDate, Month};

/// Error produced when a cookie `Expires` date cannot be parsed,
/// naming the first offending field.
#[derive(Clone, Debug, Error)]
#[error("invalid cookie date {input:?}: bad or missing {field}")]
pub struct InvalidCookieDate {
    pub input: String,
    pub field: &'static str,
}

/// Delimiter class from RFC 6265 §5.1.1: `%x09 / %x20-2F / %x3B-40 /
/// %x5B-60 / %x7B-7E`
fn is_delimiter(c: char) -> bool {
    matches!(c, '\t' | ' '..='/' | ';'..='@' | '['..='`' | '{'..='~')
}

/// Parse a cookie `Expires` date.
pub fn parse_cookie_date(input: &str) -> Result<GmtDate, InvalidCookieDate> {
    let mut time: Option<(u8, u8, u8)> = None;
    let mut day_of_month: Option<u8> = None;
    let mut month: Option<Month> = None;
    let mut year: Option<i32> = None;

    for token in input.split(is_delimiter).filter(|token| !token.is_empty()) {
        if time.is_none() {
            if let Some(parsed) = parse_time(token) {
                time = Some(parsed);
                continue;
            }
        }
        if day_of_month.is_none() {
            if let Some(parsed) = parse_day_of_month(token) {
                day_of_month = Some(parsed);
                continue;
            }
        }
        if month.is_none() {
            if let Some(parsed) = parse_month(token) {
                month = Some(parsed);
                continue;
            }
        }
        if year.is_none() {
            if let Some(parsed) = parse_year(token) {
                year = Some(parsed);
            }
        }
    }

    let invalid = |field| InvalidCookieDate {
        input: input.to_owned(),
        field,
    };

    let (hours, minutes, seconds) = time.ok_or_else(|| invalid("time"))?;
    let day_of_month = day_of_month.ok_or_else(|| invalid("day of month"))?;
    let month = month.ok_or_else(|| invalid("month"))?;
    let mut year = year.ok_or_else(|| invalid("year"))?;

    // Two-digit years straddle the century boundary
    if (70..=99).contains(&year) {
        year += 1900;
    } else if (0..=69).contains(&year) {
        year += 2000;
    }

    if !(1..=31).contains(&day_of_month) {
        return Err(invalid("day of month"));
    }
    if year < 1601 {
        return Err(invalid("year"));
    }
    if hours > 23 {
        return Err(invalid("hours"));
    }
    if minutes > 59 {
        return Err(invalid("minutes"));
    }
    if seconds > 59 {
        return Err(invalid("seconds"));
    }

    Ok(GmtDate::from_date_time(
        year,
        month,
        day_of_month,
        hours,
        minutes,
        seconds,
    ))
}

/// `HH:MM:SS` with 1-2 digits per field, optionally followed by a
/// non-digit suffix
fn parse_time(token: &str) -> Option<(u8, u8, u8)> {
    let bytes = token.as_bytes();
    let mut position = 0;

    let mut fields = [0u8; 3];
    for (index, field) in fields.iter_mut().enumerate() {
        let (value, length) = leading_digits(&bytes[position..], 2)?;
        *field = value as u8;
        position += length;

        if index < 2 {
            if bytes.get(position) != Some(&b':') {
                return None;
            }
            position += 1;
        }
    }

    // Anything after the seconds must start with a non-digit
    match bytes.get(position) {
        Some(next) if next.is_ascii_digit() => None,
        _ => Some((fields[0], fields[1], fields[2])),
    }
}

/// 1-2 digits followed by a non-digit or the end of the token
fn parse_day_of_month(token: &str) -> Option<u8> {
    let bytes = token.as_bytes();
    let (value, length) = leading_digits(bytes, 2)?;

    match bytes.get(length) {
        Some(next) if next.is_ascii_digit() => None,
        _ => Some(value as u8),
    }
}

/// Token whose first three characters name a month
fn parse_month(token: &str) -> Option<Month> {
    Month::from_abbreviation(token.get(..3)?)
}

/// 2-4 digits followed by a non-digit or the end of the token
fn parse_year(token: &str) -> Option<i32> {
    let bytes = token.as_bytes();
    let (value, length) = leading_digits(bytes, 4)?;

    if length < 2 {
        return None;
    }
    match bytes.get(length) {
        Some(next) if next.is_ascii_digit() => None,
        _ => Some(value as i32),
    }
}

/// Up to `max` leading ASCII digits, returning the value and digit count
fn leading_digits(bytes: &[u8], max: usize) -> Option<(u32, usize)> {
    let mut value = 0u32;
    let mut length = 0;

    while length < max {
        match bytes.get(length) {
            Some(byte) if byte.is_ascii_digit() => {
                value = value * 10 + u32::from(byte - b'0');
                length += 1;
            },
            _ => break,
        }
    }

    if length == 0 {
        return None;
    }
    Some((value, length))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::Weekday;

    #[test]
    fn rfc_preferred_format() {
        let date = parse_cookie_date("Wed, 09 Jun 2021 10:18:14 GMT").unwrap();

        assert_eq!(date.year, 2021);
        assert_eq!(date.month, Month::June);
        assert_eq!(date.day_of_month, 9);
        assert_eq!(date.hours, 10);
        assert_eq!(date.minutes, 18);
        assert_eq!(date.seconds, 14);
        assert_eq!(date.day_of_week, Weekday::Wednesday);
    }

    #[test]
    fn legacy_netscape_format() {
        let date = parse_cookie_date("Sun, 06-Nov-1994 08:49:37 GMT").unwrap();

        assert_eq!(date.year, 1994);
        assert_eq!(date.month, Month::November);
        assert_eq!(date.day_of_month, 6);
    }

    #[test]
    fn field_order_does_not_matter() {
        let date = parse_cookie_date("2021 10:18:14 9 Jun").unwrap();

        assert_eq!(date.year, 2021);
        assert_eq!(date.month, Month::June);
        assert_eq!(date.day_of_month, 9);
    }

    #[test]
    fn two_digit_years_map_around_the_century() {
        assert_eq!(parse_cookie_date("1 Jan 70 00:00:00").unwrap().year, 1970);
        assert_eq!(parse_cookie_date("1 Jan 69 00:00:00").unwrap().year, 2069);
        assert_eq!(parse_cookie_date("1 Jan 99 00:00:00").unwrap().year, 1999);
        assert_eq!(parse_cookie_date("1 Jan 00 00:00:00").unwrap().year, 2000);
    }

    #[test]
    fn missing_fields_are_named() {
        let error = parse_cookie_date("09 Jun 2021").unwrap_err();
        assert_eq!(error.field, "time");

        let error = parse_cookie_date("10:18:14 Jun 2021").unwrap_err();
        assert_eq!(error.field, "day of month");

        let error = parse_cookie_date("09 10:18:14 2021").unwrap_err();
        assert_eq!(error.field, "month");
    }

    #[test]
    fn out_of_range_fields_are_rejected()  {
        assert_eq!(parse_cookie_date("1 Jan 1500 00:00:00").unwrap_err().field, "year");
        assert_eq!(parse_cookie_date("1 Jan 2021 25:00:00").unwrap_err().field, "hours");
        assert_eq!(parse_cookie_date("1 Jan 2021 10:60:00").unwrap_err().field, "minutes");
        assert_eq!(parse_cookie_date("32 Jan 2021 10:00:00").unwrap_err().field, "day of month");
    }
}
