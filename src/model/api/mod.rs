//! API-compatible types.
//!
//! The types in this module are what clients send and receive as JSON.
//! Incoming fields are optional so that missing values are reported as
//! validation errors rather than rejected by the JSON parser.

mod message;
mod option;
mod poll;
mod results;
mod vote;

pub use message::{ErrorMessage, Message};
pub use option::OptionSpec;
pub use poll::{PollDescription, PollSpec};
pub use results::OptionResult;
pub use vote::VoteRequest;

use crate::error::{Error, Result};

/// Extract a required text field, rejecting missing or empty values.
fn required_text(value: Option<String>, field: &str) -> Result<String> {
    match value {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(Error::validation(format!("`{field}` is required"))),
    }
}
