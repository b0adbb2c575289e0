//! HTTP value types and their wire forms.
//!
//! This crate covers the textual side of HTTP that is independent of any
//! particular client or server: media types, header values with
//! parameters, dates, cookies and byte ranges. Parsing is lenient where
//! interoperability demands it and strict where the format is owned by
//! this crate.

pub mod cookie;
pub mod headers;
pub mod range;

mod content_type;
mod date;
mod mime;

pub use content_type::{BadContentTypeFormat, ContentType};
pub use date::{GmtDate, HttpDateError, Month, Weekday};
