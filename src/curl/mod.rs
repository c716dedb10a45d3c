//! C1: cURL Template Parser.
//!
//! Turns the raw text of a cURL invocation into a [`RequestTemplate`] that
//! C5 virtual users replay against the target.

mod parse;
mod template;
mod tokenize;

pub use parse::parse_curl;
pub use template::{BasicAuth, HttpMethod, RequestTemplate};
