//! Media types as described in
//! <https://www.rfc-editor.org/rfc/rfc2045#section-5>

use std::fmt;

use thiserror::Error;

use crate::headers::{append_header_parameters, parse_header_value, HeaderValueParam};

/// Error produced when parsing a malformed `Content-Type` value.
#[derive(Clone, Debug, Error)]
#[error("bad content type format: {0:?}")]
pub struct BadContentTypeFormat(pub String);

/// A media type with optional parameters, like `text/html; charset=utf-8`.
///
/// Type and subtype compare case-insensitively; the parameter list
/// compares in order.
#[derive(Clone, Debug, Eq)]
pub struct ContentType {
    content_type: String,
    content_subtype: String,
    parameters: Vec<HeaderValueParam>,
}

impl ContentType {
    #[must_use]
    pub fn new(content_type: impl Into<String>, content_subtype: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            content_subtype: content_subtype.into(),
            parameters: Vec::new(),
        }
    }

    /// `*/*`
    #[must_use]
    pub fn any() -> Self {
        Self::new("*", "*")
    }

    #[must_use]
    pub fn application_json() -> Self {
        Self::new("application", "json")
    }

    #[must_use]
    pub fn application_xml() -> Self {
        Self::new("application", "xml")
    }

    #[must_use]
    pub fn application_octet_stream() -> Self {
        Self::new("application", "octet-stream")
    }

    #[must_use]
    pub fn application_form_url_encoded() -> Self {
        Self::new("application", "x-www-form-urlencoded")
    }

    #[must_use]
    pub fn text_plain() -> Self {
        Self::new("text", "plain")
    }

    #[must_use]
    pub fn text_html() -> Self {
        Self::new("text", "html")
    }

    #[must_use]
    pub fn text_css() -> Self {
        Self::new("text", "css")
    }

    #[must_use]
    pub fn text_javascript() -> Self {
        Self::new("text", "javascript")
    }

    #[must_use]
    pub fn image_png() -> Self {
        Self::new("image", "png")
    }

    #[must_use]
    pub fn image_jpeg() -> Self {
        Self::new("image", "jpeg")
    }

    #[must_use]
    pub fn image_svg() -> Self {
        Self::new("image", "svg+xml")
    }

    #[must_use]
    pub fn multipart_form_data() -> Self {
        Self::new("multipart", "form-data")
    }

    /// Parse a `Content-Type` value. Blank input maps to `*/*`.
    pub fn parse(value: &str) -> Result<Self, BadContentTypeFormat> {
        if value.trim().is_empty() {
            return Ok(Self::any());
        }

        let bad = || BadContentTypeFormat(value.to_owned());

        let mut header_values = parse_header_value(value);
        if header_values.len() != 1 {
            return Err(bad());
        }
        let header_value = header_values.remove(0);

        let Some((content_type, content_subtype)) = header_value.value.split_once('/') else {
            if header_value.value.trim() == "*" {
                return Ok(Self::any());
            }
            return Err(bad());
        };

        let content_type = content_type.trim();
        let content_subtype = content_subtype.trim();

        if content_type.is_empty() || content_subtype.is_empty() {
            return Err(bad());
        }
        if content_type.contains(' ') || content_subtype.contains(' ') {
            return Err(bad());
        }
        if content_subtype.contains('/') {
            return Err(bad());
        }

        Ok(Self {
            content_type: content_type.to_owned(),
            content_subtype: content_subtype.to_owned(),
            parameters: header_value.params,
        })
    }

    #[inline]
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    #[inline]
    #[must_use]
    pub fn content_subtype(&self) -> &str {
        &self.content_subtype
    }

    #[inline]
    #[must_use]
    pub fn parameters(&self) -> &[HeaderValueParam] {
        &self.parameters
    }

    /// First parameter value with the given (case-insensitive) name
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|param| param.name.eq_ignore_ascii_case(name))
            .map(|param| param.value.as_str())
    }

    /// A copy with the parameter appended; a no-op if the exact pair is
    /// already present.
    #[must_use]
    pub fn with_parameter(&self, name: &str, value: &str) -> Self {
        if self.has_parameter(name, value) {
            return self.clone();
        }

        let mut result = self.clone();
        result.parameters.push(HeaderValueParam::new(name, value));
        result
    }

    #[must_use]
    pub fn without_parameters(&self) -> Self {
        Self::new(self.content_type.clone(), self.content_subtype.clone())
    }

    #[must_use]
    pub fn with_charset(&self, charset: &str) -> Self {
        self.with_parameter("charset", charset)
    }

    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.parameter("charset")
    }

    fn has_parameter(&self, name: &str, value: &str) -> bool {
        self.parameters.iter().any(|param| {
            param.name.eq_ignore_ascii_case(name) && param.value.eq_ignore_ascii_case(value)
        })
    }

    /// Check whether this (concrete) type matches a pattern that may use
    /// `*` placeholders, like `text/*` or `*/*; charset=utf-8`.
    ///
    /// Every pattern parameter must be satisfied: a `*` name with a
    /// specific value matches if *any* parameter carries that value, a
    /// specific name with a `*` value only requires the name to be
    /// present.
    #[must_use]
    pub fn matches(&self, pattern: &ContentType) -> bool {
        if pattern.content_type != "*"
            && !pattern.content_type.eq_ignore_ascii_case(&self.content_type)
        {
            return false;
        }

        if pattern.content_subtype != "*"
            && !pattern
                .content_subtype
                .eq_ignore_ascii_case(&self.content_subtype)
        {
            return false;
        }

        for pattern_param in &pattern.parameters {
            let matches = match (pattern_param.name.as_str(), pattern_param.value.as_str()) {
                ("*", "*") => true,
                ("*", value) => self
                    .parameters
                    .iter()
                    .any(|param| param.value.eq_ignore_ascii_case(value)),
                (name, "*") => self.parameter(name).is_some(),
                (name, value) => self
                    .parameter(name)
                    .is_some_and(|own| own.eq_ignore_ascii_case(value)),
            };

            if !matches {
                return false;
            }
        }

        true
    }
}

impl PartialEq for ContentType {
    fn eq(&self, other: &Self) -> bool {
        self.content_type.eq_ignore_ascii_case(&other.content_type)
            && self
                .content_subtype
                .eq_ignore_ascii_case(&other.content_subtype)
            && self.parameters == other.parameters
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut result = format!("{}/{}", self.content_type, self.content_subtype);
        append_header_parameters(&mut result, &self.parameters);
        result.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_with_parameter() {
        let content_type = ContentType::parse("text/html; charset=utf-8").unwrap();

        assert_eq!(content_type.content_type(), "text");
        assert_eq!(content_type.content_subtype(), "html");
        assert_eq!(content_type.charset(), Some("utf-8"));
    }

    #[test]
    fn parse_rejects_malformed_values() {
        assert!(ContentType::parse("not-a-mime").is_err());
        assert!(ContentType::parse("/json").is_err());
        assert!(ContentType::parse("application/").is_err());
        assert!(ContentType::parse("a/b/c").is_err());
        assert!(ContentType::parse("te xt/plain").is_err());
    }

    #[test]
    fn blank_and_star_map_to_any() {
        assert_eq!(ContentType::parse("").unwrap(), ContentType::any());
        assert_eq!(ContentType::parse("  ").unwrap(), ContentType::any());
        assert_eq!(ContentType::parse("*").unwrap(), ContentType::any());
    }

    #[test]
    fn equality_ignores_case_of_types() {
        assert_eq!(
            ContentType::parse("Text/HTML").unwrap(),
            ContentType::text_html()
        );
    }

    #[test]
    fn parse_display_roundtrip() {
        let inputs = ["text/html", "text/html; charset=utf-8", "*/*"];

        for input in inputs {
            let content_type = ContentType::parse(input).unwrap();
            assert_eq!(content_type.to_string(), input);
            assert_eq!(
                ContentType::parse(&content_type.to_string()).unwrap(),
                content_type
            );
        }
    }

    #[test]
    fn wildcard_matching() {
        let html = ContentType::parse("text/html; charset=utf-8").unwrap();

        assert!(html.matches(&ContentType::parse("text/*").unwrap()));
        assert!(html.matches(&ContentType::any()));
        assert!(html.matches(&ContentType::text_html()));
        assert!(!ContentType::text_html().matches(&ContentType::text_plain()));
        assert!(!html.matches(&ContentType::parse("image/*").unwrap()));
    }

    #[test]
    fn parameter_matching() {
        let html = ContentType::parse("text/html; charset=utf-8").unwrap();

        assert!(html.matches(&ContentType::parse("text/html; charset=utf-8").unwrap()));
        assert!(html.matches(&ContentType::parse("text/html; charset=*").unwrap()));
        assert!(html.matches(&ContentType::parse("*/*; *=utf-8").unwrap()));
        assert!(!html.matches(&ContentType::parse("text/html; charset=koi8-r").unwrap()));
        assert!(!ContentType::text_html()
            .matches(&ContentType::parse("text/html; charset=utf-8").unwrap()));
    }

    #[test]
    fn with_parameter_is_immutable_and_idempotent() {
        let plain = ContentType::text_plain();
        let with_charset = plain.with_parameter("charset", "utf-8");

        assert!(plain.parameters().is_empty());
        assert_eq!(with_charset.charset(), Some("utf-8"));
        assert_eq!(
            with_charset.with_parameter("charset", "utf-8"),
            with_charset
        );
        assert_eq!(with_charset.without_parameters(), plain);
    }
}
