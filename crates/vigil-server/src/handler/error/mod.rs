//! HTTP error types used by all handlers.

mod http_error;

pub use http_error::{Error, ErrorKind, Result};
