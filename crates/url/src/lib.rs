//! URL value model, percent codec and reference parser
//!
//! A [Url] is an immutable snapshot of its components plus the exact
//! string it renders to; [UrlBuilder] is the only way to construct or
//! modify one. Percent-encoding policy lives in [set] and [percent]:
//! every URL component picks its own allowed-character set instead of
//! the codec guessing from context.

mod builder;
mod params;
mod parser;
pub mod percent;
mod protocol;
pub mod query;
pub mod set;
mod url;

pub use builder::UrlBuilder;
pub use params::{Parameters, ParametersBuilder};
pub use parser::UrlParserError;
pub use percent::DecodeError;
pub use protocol::{UrlProtocol, DEFAULT_PORT};
pub use url::Url;
