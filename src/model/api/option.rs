use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::required_text;

/// A request to add an option to a poll.
///
/// Clients send the text as `opcao`; `text` is accepted as well.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSpec {
    #[serde(default, rename = "opcao", alias = "text")]
    pub text: Option<String>,
}

impl OptionSpec {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }

    /// The validated option text.
    pub fn into_text(self) -> Result<String> {
        required_text(self.text, "opcao")
    }
}
