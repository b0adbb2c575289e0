//! URL schemes and their default ports

use std::fmt;

/// Port value meaning "no port was specified, use the protocol default".
pub const DEFAULT_PORT: u16 = 0;

/// A URL scheme together with its default port.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UrlProtocol {
    name: String,
    default_port: u16,
}

impl UrlProtocol {
    #[must_use]
    pub fn new(name: impl Into<String>, default_port: u16) -> Self {
        Self {
            name: name.into(),
            default_port,
        }
    }

    #[must_use]
    pub fn http() -> Self {
        Self::new("http", 80)
    }

    #[must_use]
    pub fn https() -> Self {
        Self::new("https", 443)
    }

    #[must_use]
    pub fn ws() -> Self {
        Self::new("ws", 80)
    }

    #[must_use]
    pub fn wss() -> Self {
        Self::new("wss", 443)
    }

    #[must_use]
    pub fn socks() -> Self {
        Self::new("socks", 1080)
    }

    /// Look up a well-known protocol by its (case-insensitive) name.
    #[must_use]
    pub fn by_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "http" => Some(Self::http()),
            "https" => Some(Self::https()),
            "ws" => Some(Self::ws()),
            "wss" => Some(Self::wss()),
            "socks" => Some(Self::socks()),
            _ => None,
        }
    }

    /// Like [UrlProtocol::by_name], but unknown names produce a custom
    /// protocol without a default port.
    #[must_use]
    pub fn create_or_default(name: &str) -> Self {
        Self::by_name(name).unwrap_or_else(|| Self::new(name.to_ascii_lowercase(), DEFAULT_PORT))
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn default_port(&self) -> u16 {
        self.default_port
    }

    #[must_use]
    pub fn is_secure(&self) -> bool {
        matches!(self.name.as_str(), "https" | "wss")
    }

    #[must_use]
    pub fn is_websocket(&self) -> bool {
        matches!(self.name.as_str(), "ws" | "wss")
    }
}

impl fmt::Display for UrlProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.name.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_known_ports() {
        assert_eq!(UrlProtocol::http().default_port(), 80);
        assert_eq!(UrlProtocol::https().default_port(), 443);
        assert_eq!(UrlProtocol::wss().default_port(), 443);
    }

    #[test]
    fn create_or_default_lowercases() {
        assert_eq!(UrlProtocol::create_or_default("HTTPS"), UrlProtocol::https());

        let custom = UrlProtocol::create_or_default("Gopher");
        assert_eq!(custom.name(), "gopher");
        assert_eq!(custom.default_port(), DEFAULT_PORT);
    }

    #[test]
    fn secure_and_websocket_classification() {
        assert!(UrlProtocol::https().is_secure());
        assert!(!UrlProtocol::ws().is_secure());
        assert!(UrlProtocol::wss().is_websocket());
        assert!(!UrlProtocol::http().is_websocket());
    }
}
