//! The `application/x-www-form-urlencoded` query string grammar
//!
//! Pairs are `&`-separated and split on the first `=`. By form convention
//! `+` means space in *values* only; keys are decoded without plus
//! handling so that a literal `+` in a key survives.

use crate::{
    params::{Parameters, ParametersBuilder},
    percent::{
        decode_url_part, decode_url_query_component, encode_url_parameter,
        encode_url_parameter_value, DecodeError,
    },
};

/// Parse a query string (without the leading `?`) into parameters.
pub fn parse_query_string(query: &str) -> Result<ParametersBuilder, DecodeError> {
    let mut builder = ParametersBuilder::new();

    for pair in query.split('&') {
        if pair.is_empty() {
            continue;
        }

        match pair.split_once('=') {
            Some((key, value)) => {
                let key = decode_url_part(key)?;
                let value = decode_url_query_component(value)?;
                builder.append(&key, value);
            },
            None => {
                let key = decode_url_part(pair)?;
                builder.append_name(&key);
            },
        }
    }

    Ok(builder)
}

/// Render parameters back into a query string (without the leading `?`).
#[must_use]
pub fn format_query_string(parameters: &Parameters) -> String {
    let mut result = String::new();

    for (name, values) in parameters.entries() {
        let encoded_name = encode_url_parameter(name);

        if values.is_empty() {
            push_pair(&mut result, &encoded_name, None);
        }

        for value in values {
            push_pair(&mut result, &encoded_name, Some(value));
        }
    }

    result
}

fn push_pair(out: &mut String, encoded_name: &str, value: Option<&str>) {
    if !out.is_empty() {
        out.push('&');
    }
    out.push_str(encoded_name);

    if let Some(value) = value {
        out.push('=');
        out.push_str(&encode_url_parameter_value(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_pairs() {
        let params = parse_query_string("a=1&b=2").unwrap().build();
        assert_eq!(params.get("a"), Some("1"));
        assert_eq!(params.get("b"), Some("2"));
    }

    #[test]
    fn plus_means_space_in_values_only() {
        let params = parse_query_string("a+b=c+d").unwrap().build();
        assert_eq!(params.get("a+b"), Some("c d"));
    }

    #[test]
    fn value_less_entry() {
        let params = parse_query_string("flag&a=1").unwrap().build();
        assert!(params.contains("flag"));
        assert_eq!(params.get_all("flag").unwrap().len(), 0);
        assert_eq!(params.get("a"), Some("1"));
    }

    #[test]
    fn empty_value_is_kept() {
        let params = parse_query_string("a=").unwrap().build();
        assert_eq!(params.get("a"), Some(""));
    }

    #[test]
    fn roundtrip() {
        let params = parse_query_string("a=1&b=x+y&b=%2B").unwrap().build();
        assert_eq!(format_query_string(&params), "a=1&b=x+y&b=%2B");
    }

    #[test]
    fn bad_escape_propagates() {
        assert!(parse_query_string("a=%GG").is_err());
        assert!(parse_query_string("a=100%").is_err());
    }
}
