//! Byte ranges as described in <https://www.rfc-editor.org/rfc/rfc7233>
//!
//! `Range` headers are advisory: an unparsable specifier yields `None`
//! instead of an error, since the RFC asks servers to ignore bad range
//! requests rather than fail them.

use std::{fmt, ops::RangeInclusive};

/// The only range unit in widespread use.
pub const RANGE_UNITS_BYTES: &str = "bytes";

/// One element of a `Range` header range list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentRange {
    /// `from-to`, both inclusive
    Bounded { from: i64, to: i64 },
    /// `from-`, running to the end of the content
    TailFrom { from: i64 },
    /// `-last_count`, the final bytes of the content
    Suffix { last_count: i64 },
}

impl ContentRange {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        match *self {
            Self::Bounded { from, to } => from >= 0 && to >= from,
            Self::TailFrom { from } => from >= 0,
            Self::Suffix { last_count } => last_count >= 0,
        }
    }

    /// Resolve against a concrete content length. The result may be
    /// empty, e.g. a `TailFrom` past the end.
    fn resolve(&self, length: i64) -> RangeInclusive<i64> {
        match *self {
            Self::Bounded { from, to } => from..=to.min(length - 1),
            Self::TailFrom { from } => from..=length - 1,
            Self::Suffix { last_count } => (length - last_count).max(0)..=length - 1,
        }
    }
}

impl fmt::Display for ContentRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Bounded { from, to } => write!(f, "{from}-{to}"),
            Self::TailFrom { from } => write!(f, "{from}-"),
            Self::Suffix { last_count } => write!(f, "-{last_count}"),
        }
    }
}

/// A parsed `Range` header: a unit and a non-empty range list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RangesSpecifier {
    pub unit: String,
    pub ranges: Vec<ContentRange>,
}

impl RangesSpecifier {
    /// Resolve all ranges against the content length, merging overlapping
    /// and adjacent intervals while keeping the caller's order.
    ///
    /// More than `max_range_count` ranges collapse into one covering
    /// range, so a request listing hundreds of tiny ranges cannot force
    /// an equally fragmented response.
    #[must_use]
    pub fn merge(&self, length: i64, max_range_count: usize) -> Vec<RangeInclusive<i64>> {
        if self.ranges.len() > max_range_count {
            return self.merge_to_single(length).into_iter().collect();
        }

        let resolved: Vec<RangeInclusive<i64>> = self
            .ranges
            .iter()
            .map(|range| range.resolve(length))
            .filter(|range| !range.is_empty() && *range.start() >= 0)
            .collect();

        merge_ranges_keep_order(&resolved)
    }

    /// The single range covering every listed range, if any of them
    /// intersects the content at all.
    #[must_use]
    pub fn merge_to_single(&self, length: i64) -> Option<RangeInclusive<i64>> {
        let start = self
            .ranges
            .iter()
            .map(|range| *range.resolve(length).start())
            .min()?
            .max(0);
        let end = self
            .ranges
            .iter()
            .map(|range| *range.resolve(length).end())
            .max()?
            .min(length - 1);

        if start > end {
            return None;
        }
        Some(start..=end)
    }
}

impl fmt::Display for RangesSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=", self.unit)?;
        for (index, range) in self.ranges.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            range.fmt(f)?;
        }
        Ok(())
    }
}

/// Parse a `Range` header value like `bytes=0-499,600-,-100`.
///
/// Returns `None` for anything malformed or invalid.
#[must_use]
pub fn parse_ranges_specifier(range_spec: &str) -> Option<RangesSpecifier> {
    let (unit, ranges_text) = range_spec.split_once('=')?;
    if unit.is_empty() {
        return None;
    }

    let mut ranges = Vec::new();
    for entry in ranges_text.split(',') {
        let entry = entry.trim();

        let range = if let Some(last_count) = entry.strip_prefix('-') {
            ContentRange::Suffix {
                last_count: last_count.parse().ok()?,
            }
        } else if let Some(from) = entry.strip_suffix('-') {
            ContentRange::TailFrom {
                from: from.parse().ok()?,
            }
        } else {
            let (from, to) = entry.split_once('-')?;
            ContentRange::Bounded {
                from: from.parse().ok()?,
                to: to.parse().ok()?,
            }
        };

        ranges.push(range);
    }

    if ranges.is_empty() || ranges.iter().any(|range| !range.is_valid()) {
        return None;
    }

    Some(RangesSpecifier {
        unit: unit.to_owned(),
        ranges,
    })
}

/// Whether the start positions appear in non-decreasing order; suffix
/// ranges have no position and are skipped.
#[must_use]
pub fn is_ascending(ranges: &[ContentRange]) -> bool {
    let mut previous = 0;

    ranges.iter().all(|range| match *range {
        ContentRange::Bounded { from, .. } | ContentRange::TailFrom { from } => {
            let ascending = from >= previous;
            previous = from;
            ascending
        },
        ContentRange::Suffix { .. } => true,
    })
}

/// Merge overlapping and adjacent intervals, emitting the merged
/// intervals in the order their first member appeared in the input.
#[must_use]
pub fn merge_ranges_keep_order(ranges: &[RangeInclusive<i64>]) -> Vec<RangeInclusive<i64>> {
    let mut sorted = ranges.to_vec();
    sorted.sort_by_key(|range| *range.start());

    let mut merged: Vec<RangeInclusive<i64>> = Vec::with_capacity(sorted.len());
    for range in sorted {
        match merged.last_mut() {
            Some(last) if *last.end() >= *range.start() - 1 => {
                if range.end() > last.end() {
                    *last = *last.start()..=*range.end();
                }
            },
            _ => merged.push(range),
        }
    }

    let mut result = Vec::with_capacity(merged.len());
    for original in ranges {
        let containing = merged
            .iter()
            .find(|candidate| candidate.start() <= original.start() && original.end() <= candidate.end());

        if let Some(containing) = containing {
            if !result.contains(containing) {
                result.push(containing.clone());
            }
        }
    }

    result
}

/// Render a `Content-Range` header value, with `*` for an unsatisfied
/// range or an unknown length.
#[must_use]
pub fn content_range_header_value(
    range: Option<&RangeInclusive<i64>>,
    full_length: Option<i64>,
    unit: &str,
) -> String {
    let mut result = String::new();
    result.push_str(unit);
    result.push(' ');

    match range {
        Some(range) => {
            result.push_str(&range.start().to_string());
            result.push('-');
            result.push_str(&range.end().to_string());
        },
        None => result.push('*'),
    }

    result.push('/');
    match full_length {
        Some(length) => result.push_str(&length.to_string()),
        None => result.push('*'),
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_all_range_forms() {
        let specifier = parse_ranges_specifier("bytes=0-499,600-,-100").unwrap();

        assert_eq!(specifier.unit, "bytes");
        assert_eq!(
            specifier.ranges,
            [
                ContentRange::Bounded { from: 0, to: 499 },
                ContentRange::TailFrom { from: 600 },
                ContentRange::Suffix { last_count: 100 },
            ]
        );
    }

    #[test]
    fn malformed_specifiers_are_ignored() {
        assert!(parse_ranges_specifier("bytes").is_none());
        assert!(parse_ranges_specifier("bytes=").is_none());
        assert!(parse_ranges_specifier("bytes=abc").is_none());
        assert!(parse_ranges_specifier("bytes=500-100").is_none());
        assert!(parse_ranges_specifier("=0-1").is_none());
        assert!(parse_ranges_specifier("bytes=--5").is_none());
    }

    #[test]
    fn adjacent_ranges_merge() {
        let specifier = RangesSpecifier {
            unit: RANGE_UNITS_BYTES.to_owned(),
            ranges: vec![
                ContentRange::Bounded { from: 0, to: 499 },
                ContentRange::Bounded { from: 500, to: 999 },
            ],
        };

        assert_eq!(specifier.merge(1000, 50), [0..=999]);
    }

    #[test]
    fn tail_and_suffix_resolve_against_the_length() {
        let specifier = parse_ranges_specifier("bytes=500-").unwrap();
        assert_eq!(specifier.merge(1000, 50), [500..=999]);

        let specifier = parse_ranges_specifier("bytes=-100").unwrap();
        assert_eq!(specifier.merge(1000, 50), [900..=999]);
    }

    #[test]
    fn bounded_end_is_clamped_to_the_length() {
        let specifier = parse_ranges_specifier("bytes=0-5000").unwrap();
        assert_eq!(specifier.merge(1000, 50), [0..=999]);
    }

    #[test]
    fn empty_resolved_ranges_are_dropped() {
        let specifier = parse_ranges_specifier("bytes=2000-,0-10").unwrap();
        assert_eq!(specifier.merge(1000, 50), [0..=10]);
    }

    #[test]
    fn merged_output_keeps_request_order() {
        let specifier = parse_ranges_specifier("bytes=600-700,0-100").unwrap();
        assert_eq!(specifier.merge(1000, 50), [600..=700, 0..=100]);

        let specifier = parse_ranges_specifier("bytes=600-700,0-100,650-800").unwrap();
        assert_eq!(specifier.merge(1000, 50), [600..=800, 0..=100]);
    }

    #[test]
    fn too_many_ranges_collapse_to_one() {
        let specifier = parse_ranges_specifier("bytes=0-1,10-11,20-21").unwrap();
        assert_eq!(specifier.merge(1000, 2), [0..=21]);
    }

    #[test]
    fn ascending_check() {
        let ranges = parse_ranges_specifier("bytes=0-1,5-6,-3").unwrap().ranges;
        assert!(is_ascending(&ranges));

        let ranges = parse_ranges_specifier("bytes=5-6,0-1").unwrap().ranges;
        assert!(!is_ascending(&ranges));
    }

    #[test]
    fn content_range_rendering() {
        assert_eq!(
            content_range_header_value(Some(&(0..=499)), Some(1234), RANGE_UNITS_BYTES),
            "bytes 0-499/1234"
        );
        assert_eq!(
            content_range_header_value(None, Some(1234), RANGE_UNITS_BYTES),
            "bytes */1234"
        );
        assert_eq!(
            content_range_header_value(Some(&(0..=499)), None, RANGE_UNITS_BYTES),
            "bytes 0-499/*"
        );
        assert_eq!(
            content_range_header_value(None, None, RANGE_UNITS_BYTES),
            "bytes */*"
        );
    }

    #[test]
    fn specifier_display_roundtrip() {
        let specifier = parse_ranges_specifier("bytes=0-499,600-,-100").unwrap();
        assert_eq!(specifier.to_string(), "bytes=0-499,600-,-100");
    }
}
