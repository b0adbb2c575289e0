//! Percent-encoding primitives as described in
//! <https://www.rfc-editor.org/rfc/rfc3986#section-2.1>
//!
//! The codec itself has no notion of *where* in a URL it is being used;
//! callers pick the [AsciiSet] matching their component.

use thiserror::Error;

use crate::set::{self, AsciiSet};

/// Error produced when percent-decoding malformed input.
///
/// Escapes that cannot be decoded are a hard error rather than being
/// passed through, since silently mis-decoding is exactly the kind of bug
/// that enables header smuggling.
#[derive(Clone, Debug, Error)]
pub enum DecodeError {
    /// A `%` near the end of the input without two characters after it
    #[error("incomplete percent escape {escape:?} at offset {position}")]
    IncompleteEscape { position: usize, escape: String },

    /// A `%` followed by characters that are not hex digits
    #[error("invalid percent escape {escape:?} at offset {position}")]
    InvalidEscape { position: usize, escape: String },

    /// The decoded bytes do not form valid UTF-8
    #[error("percent-decoded bytes are not valid utf-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Percent-encode every byte of `input` that is not in `allowed`.
///
/// Operates on the UTF-8 *bytes* of the input, so characters outside of
/// ASCII become one `%XX` triplet per byte. If `space_to_plus` is set,
/// a space is written as `+` instead of `%20`.
#[must_use]
pub fn percent_encode(input: &str, allowed: &AsciiSet, space_to_plus: bool) -> String {
    let mut result = String::with_capacity(input.len());

    for &byte in input.as_bytes() {
        if byte == b' ' && space_to_plus {
            result.push('+');
        } else if allowed.contains(byte) {
            result.push(byte as char);
        } else {
            result.push('%');
            result.push(HEX_DIGITS[(byte >> 4) as usize] as char);
            result.push(HEX_DIGITS[(byte & 0xF) as usize] as char);
        }
    }

    result
}

/// Reverse [percent_encode].
///
/// Raw bytes accumulate in a buffer that is decoded as UTF-8 only once the
/// whole input has been consumed, so multi-byte sequences split across
/// several escapes survive intact. If `plus_is_space` is set, `+` decodes
/// to a space.
pub fn percent_decode(input: &str, plus_is_space: bool) -> Result<String, DecodeError> {
    let bytes = input.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());

    let mut position = 0;
    while position < bytes.len() {
        match bytes[position] {
            b'%' => {
                if position + 2 >= bytes.len() {
                    return Err(DecodeError::IncompleteEscape {
                        position,
                        escape: input[position..].to_owned(),
                    });
                }

                let escape = &input[position..position + 3];
                let high = hex_value(bytes[position + 1]);
                let low = hex_value(bytes[position + 2]);

                match (high, low) {
                    (Some(high), Some(low)) => decoded.push(high << 4 | low),
                    _ => {
                        return Err(DecodeError::InvalidEscape {
                            position,
                            escape: escape.to_owned(),
                        })
                    },
                }

                position += 3;
            },
            b'+' if plus_is_space => {
                decoded.push(b' ');
                position += 1;
            },
            other => {
                decoded.push(other);
                position += 1;
            },
        }
    }

    Ok(String::from_utf8(decoded)?)
}

#[inline]
fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Encode a single path segment, escaping `/`.
#[must_use]
pub fn encode_url_path_part(input: &str) -> String {
    percent_encode(input, &set::PATH_SEGMENT, false)
}

/// Encode a whole path, keeping `/` as a separator.
#[must_use]
pub fn encode_url_path(input: &str) -> String {
    percent_encode(input, &set::PATH_SEGMENT_WITH_SLASH, false)
}

/// Encode a query key or other strict component (space becomes `%20`).
#[must_use]
pub fn encode_url_parameter(input: &str) -> String {
    percent_encode(input, &set::QUERY_COMPONENT, false)
}

/// Encode a query value per the form convention (space becomes `+`).
#[must_use]
pub fn encode_url_parameter_value(input: &str) -> String {
    percent_encode(input, &set::QUERY_COMPONENT, true)
}

/// Encode a fragment.
#[must_use]
pub fn encode_url_fragment(input: &str) -> String {
    percent_encode(input, &set::FRAGMENT, false)
}

/// Decode any URL component that does not use `+` for spaces.
pub fn decode_url_part(input: &str) -> Result<String, DecodeError> {
    percent_decode(input, false)
}

/// Decode a query component, turning `+` into a space.
pub fn decode_url_query_component(input: &str) -> Result<String, DecodeError> {
    percent_decode(input, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_multibyte_utf8_is_split_per_byte() {
        assert_eq!(encode_url_path_part("ü"), "%C3%BC");
        assert_eq!(encode_url_path_part("日"), "%E6%97%A5");
    }

    #[test]
    fn encode_uses_uppercase_hex() {
        assert_eq!(encode_url_parameter(" "), "%20");
        assert_eq!(encode_url_parameter("\x7F"), "%7F");
    }

    #[test]
    fn space_to_plus_only_when_asked() {
        assert_eq!(encode_url_parameter_value("a b"), "a+b");
        assert_eq!(encode_url_parameter("a b"), "a%20b");
    }

    #[test]
    fn decode_roundtrips_multibyte_split_escapes() {
        assert_eq!(percent_decode("%C3%BC", false).unwrap(), "ü");
        assert_eq!(percent_decode("gr%C3%BC%C3%9Fe", false).unwrap(), "grüße");
    }

    #[test]
    fn decode_plus_is_space_only_when_asked() {
        assert_eq!(percent_decode("a+b", true).unwrap(), "a b");
        assert_eq!(percent_decode("a+b", false).unwrap(), "a+b");
    }

    #[test]
    fn incomplete_escape_is_an_error() {
        // "100%" must not silently truncate
        assert!(matches!(
            percent_decode("100%", false),
            Err(DecodeError::IncompleteEscape { position: 3, .. })
        ));
        assert!(matches!(
            percent_decode("%A", false),
            Err(DecodeError::IncompleteEscape { .. })
        ));
    }

    #[test]
    fn invalid_escape_is_an_error() {
        assert!(matches!(
            percent_decode("%GG", false),
            Err(DecodeError::InvalidEscape { position: 0, .. })
        ));
    }

    #[test]
    fn invalid_utf8_after_decoding_is_an_error() {
        assert!(matches!(
            percent_decode("%FF", false),
            Err(DecodeError::InvalidUtf8(_))
        ));
    }

    #[test]
    fn encode_decode_inverse() {
        let inputs = ["hello world", "a/b?c=d&e", "grüße", "100% sure", "~-._"];

        for input in inputs {
            let encoded = encode_url_parameter(input);
            assert_eq!(decode_url_part(&encoded).unwrap(), input);

            let encoded = encode_url_parameter_value(input);
            assert_eq!(decode_url_query_component(&encoded).unwrap(), input);
        }
    }
}
