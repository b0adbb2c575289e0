//! HTTP dates as described in
//! <https://www.rfc-editor.org/rfc/rfc9110#section-5.6.7>
//!
//! [GmtDate] is a broken-down UTC timestamp; the wire format is the
//! fixed 29-character `<Day>, DD <Mon> YYYY HH:MM:SS GMT` form.

use std::{
    cmp::Ordering,
    fmt,
    time::{SystemTime, UNIX_EPOCH},
};

use thiserror::Error;

/// Error produced when parsing a malformed HTTP date.
#[derive(Clone, Debug, Error)]
#[error("invalid http date {0:?}")]
pub struct HttpDateError(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    #[must_use]
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Self::Monday => "Mon",
            Self::Tuesday => "Tue",
            Self::Wednesday => "Wed",
            Self::Thursday => "Thu",
            Self::Friday => "Fri",
            Self::Saturday => "Sat",
            Self::Sunday => "Sun",
        }
    }

    #[must_use]
    pub fn from_abbreviation(name: &str) -> Option<Self> {
        let weekday = match name.to_ascii_lowercase().as_str() {
            "mon" => Self::Monday,
            "tue" => Self::Tuesday,
            "wed" => Self::Wednesday,
            "thu" => Self::Thursday,
            "fri" => Self::Friday,
            "sat" => Self::Saturday,
            "sun" => Self::Sunday,
            _ => return None,
        };
        Some(weekday)
    }

    /// Day zero of the unix epoch was a Thursday.
    fn from_epoch_days(days: i64) -> Self {
        match (days + 3).rem_euclid(7) {
            0 => Self::Monday,
            1 => Self::Tuesday,
            2 => Self::Wednesday,
            3 => Self::Thursday,
            4 => Self::Friday,
            5 => Self::Saturday,
            _ => Self::Sunday,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    /// One-based month number
    #[must_use]
    pub fn ordinal(&self) -> u8 {
        *self as u8 + 1
    }

    #[must_use]
    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        let month = match ordinal {
            1 => Self::January,
            2 => Self::February,
            3 => Self::March,
            4 => Self::April,
            5 => Self::May,
            6 => Self::June,
            7 => Self::July,
            8 => Self::August,
            9 => Self::September,
            10 => Self::October,
            11 => Self::November,
            12 => Self::December,
            _ => return None,
        };
        Some(month)
    }

    #[must_use]
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Self::January => "Jan",
            Self::February => "Feb",
            Self::March => "Mar",
            Self::April => "Apr",
            Self::May => "May",
            Self::June => "Jun",
            Self::July => "Jul",
            Self::August => "Aug",
            Self::September => "Sep",
            Self::October => "Oct",
            Self::November => "Nov",
            Self::December => "Dec",
        }
    }

    #[must_use]
    pub fn from_abbreviation(name: &str) -> Option<Self> {
        let month = match name.to_ascii_lowercase().as_str() {
            "jan" => Self::January,
            "feb" => Self::February,
            "mar" => Self::March,
            "apr" => Self::April,
            "may" => Self::May,
            "jun" => Self::June,
            "jul" => Self::July,
            "aug" => Self::August,
            "sep" => Self::September,
            "oct" => Self::October,
            "nov" => Self::November,
            "dec" => Self::December,
            _ => return None,
        };
        Some(month)
    }
}

/// A broken-down UTC timestamp.
///
/// All fields are derived from the unix timestamp at construction time;
/// ordering and equality use the timestamp alone.
#[derive(Clone, Copy, Debug)]
pub struct GmtDate {
    pub seconds: u8,
    pub minutes: u8,
    pub hours: u8,
    pub day_of_week: Weekday,
    pub day_of_month: u8,
    pub day_of_year: u16,
    pub month: Month,
    pub year: i32,

    /// Seconds since the unix epoch
    pub timestamp: i64,
}

impl GmtDate {
    #[must_use]
    pub fn from_unix_seconds(timestamp: i64) -> Self {
        let days = timestamp.div_euclid(86_400);
        let seconds_of_day = timestamp.rem_euclid(86_400);
        let (year, month, day_of_month) = civil_from_days(days);

        // from_ordinal cannot fail for a value civil_from_days produced
        let month = Month::from_ordinal(month).unwrap_or(Month::January);
        let day_of_year = (days - days_from_civil(year, 1, 1) + 1) as u16;

        Self {
            seconds: (seconds_of_day % 60) as u8,
            minutes: (seconds_of_day / 60 % 60) as u8,
            hours: (seconds_of_day / 3600) as u8,
            day_of_week: Weekday::from_epoch_days(days),
            day_of_month,
            day_of_year,
            month,
            year,
            timestamp,
        }
    }

    /// Build a date from broken-down fields; out-of-range time fields
    /// wrap into the following day, like `mktime`.
    #[must_use]
    pub fn from_date_time(
        year: i32,
        month: Month,
        day_of_month: u8,
        hours: u8,
        minutes: u8,
        seconds: u8,
    ) -> Self {
        let days = days_from_civil(year, month.ordinal(), day_of_month);
        let timestamp =
            days * 86_400 + i64::from(hours) * 3600 + i64::from(minutes) * 60 + i64::from(seconds);
        Self::from_unix_seconds(timestamp)
    }

    /// The current time, truncated to whole seconds.
    #[must_use]
    pub fn now() -> Self {
        let timestamp = match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(since_epoch) => since_epoch.as_secs() as i64,
            Err(before_epoch) => -(before_epoch.duration().as_secs() as i64),
        };
        Self::from_unix_seconds(timestamp)
    }

    /// Render the fixed 29-character wire form.
    #[must_use]
    pub fn to_http_date(&self) -> String {
        format!(
            "{}, {:02} {} {:04} {:02}:{:02}:{:02} GMT",
            self.day_of_week.abbreviation(),
            self.day_of_month,
            self.month.abbreviation(),
            self.year,
            self.hours,
            self.minutes,
            self.seconds,
        )
    }

    /// Strictly parse the 29-character wire form.
    pub fn from_http_date(input: &str) -> Result<Self, HttpDateError> {
        let error = || HttpDateError(input.to_owned());

        let bytes = input.as_bytes();
        if bytes.len() != 29 || !input.is_ascii() {
            return Err(error());
        }
        if &bytes[3..5] != b", "
            || bytes[7] != b' '
            || bytes[11] != b' '
            || bytes[16] != b' '
            || bytes[19] != b':'
            || bytes[22] != b':'
            || &bytes[25..] != b" GMT"
        {
            return Err(error());
        }

        Weekday::from_abbreviation(&input[..3]).ok_or_else(error)?;
        let month = Month::from_abbreviation(&input[8..11]).ok_or_else(error)?;

        let day_of_month: u8 = input[5..7].parse().map_err(|_| error())?;
        let year: i32 = input[12..16].parse().map_err(|_| error())?;
        let hours: u8 = input[17..19].parse().map_err(|_| error())?;
        let minutes: u8 = input[20..22].parse().map_err(|_| error())?;
        let seconds: u8 = input[23..25].parse().map_err(|_| error())?;

        if day_of_month == 0 || day_of_month > 31 || hours > 23 || minutes > 59 || seconds > 59 {
            return Err(error());
        }

        Ok(Self::from_date_time(
            year,
            month,
            day_of_month,
            hours,
            minutes,
            seconds,
        ))
    }
}

impl PartialEq for GmtDate {
    fn eq(&self, other: &Self) -> bool {
        self.timestamp == other.timestamp
    }
}

impl Eq for GmtDate {}

impl PartialOrd for GmtDate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GmtDate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.timestamp.cmp(&other.timestamp)
    }
}

impl fmt::Display for GmtDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_http_date().fmt(f)
    }
}

/// Days since the unix epoch for a proleptic-gregorian civil date
fn days_from_civil(year: i32, month: u8, day: u8) -> i64 {
    let year = i64::from(year) - i64::from(month <= 2);
    let era = if year >= 0 { year } else { year - 399 } / 400;
    let year_of_era = year - era * 400;
    let month = i64::from(month);
    let shifted_month = if month > 2 { month - 3 } else { month + 9 };
    let day_of_year = (153 * shifted_month + 2) / 5 + i64::from(day) - 1;
    let day_of_era = year_of_era * 365 + year_of_era / 4 - year_of_era / 100 + day_of_year;

    era * 146_097 + day_of_era - 719_468
}

/// Inverse of [days_from_civil], producing `(year, month, day)`
fn civil_from_days(days: i64) -> (i32, u8, u8) {
    let shifted = days + 719_468;
    let era = if shifted >= 0 { shifted } else { shifted - 146_096 } / 146_097;
    let day_of_era = shifted - era * 146_097;
    let year_of_era =
        (day_of_era - day_of_era / 1460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
    let year = year_of_era + era * 400;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let shifted_month = (5 * day_of_year + 2) / 153;
    let day = day_of_year - (153 * shifted_month + 2) / 5 + 1;
    let month = if shifted_month < 10 {
        shifted_month + 3
    } else {
        shifted_month - 9
    };
    let year = if month <= 2 { year + 1 } else { year };

    (year as i32, month as u8, day as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch() {
        let date = GmtDate::from_unix_seconds(0);

        assert_eq!(date.year, 1970);
        assert_eq!(date.month, Month::January);
        assert_eq!(date.day_of_month, 1);
        assert_eq!(date.day_of_week, Weekday::Thursday);
        assert_eq!(date.day_of_year, 1);
        assert_eq!(date.to_http_date(), "Thu, 01 Jan 1970 00:00:00 GMT");
    }

    #[test]
    fn known_timestamp() {
        let date = GmtDate::from_unix_seconds(1_475_419_451);
        assert_eq!(date.to_http_date(), "Sun, 02 Oct 2016 14:44:11 GMT");
    }

    #[test]
    fn leap_year_day_of_year() {
        let date = GmtDate::from_date_time(2020, Month::March, 1, 0, 0, 0);
        assert_eq!(date.day_of_year, 61);

        let date = GmtDate::from_date_time(2021, Month::March, 1, 0, 0, 0);
        assert_eq!(date.day_of_year, 60);
    }

    #[test]
    fn parse_roundtrip() {
        let date = GmtDate::from_http_date("Wed, 09 Jun 2021 10:18:14 GMT").unwrap();

        assert_eq!(date.year, 2021);
        assert_eq!(date.month, Month::June);
        assert_eq!(date.day_of_month, 9);
        assert_eq!(date.hours, 10);
        assert_eq!(date.to_http_date(), "Wed, 09 Jun 2021 10:18:14 GMT");
    }

    #[test]
    fn parse_rejects_malformed_dates() {
        assert!(GmtDate::from_http_date("Wed, 09 Jun 2021 10:18:14").is_err());
        assert!(GmtDate::from_http_date("Xxx, 09 Jun 2021 10:18:14 GMT").is_err());
        assert!(GmtDate::from_http_date("Wed, 09 Pie 2021 10:18:14 GMT").is_err());
        assert!(GmtDate::from_http_date("Wed, 09 Jun 2021 25:18:14 GMT").is_err());
        assert!(GmtDate::from_http_date("not a date").is_err());
    }

    #[test]
    fn ordering_uses_the_timestamp() {
        let earlier = GmtDate::from_unix_seconds(100);
        let later = GmtDate::from_unix_seconds(200);

        assert!(earlier < later);
        assert_eq!(earlier, GmtDate::from_unix_seconds(100));
    }

    #[test]
    fn timestamps_before_the_epoch() {
        let date = GmtDate::from_unix_seconds(-1);
        assert_eq!(date.to_http_date(), "Wed, 31 Dec 1969 23:59:59 GMT");
    }
}
