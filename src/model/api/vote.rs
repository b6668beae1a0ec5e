use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::common::OptionId;

/// A request to vote for one option.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRequest {
    #[serde(default)]
    pub option_id: Option<OptionId>,
}

impl VoteRequest {
    pub fn new(option_id: OptionId) -> Self {
        Self {
            option_id: Some(option_id),
        }
    }

    /// The option being voted for.
    ///
    /// IDs start at 1, so 0 counts as missing.
    pub fn option_id(&self) -> Result<OptionId> {
        self.option_id
            .filter(|&id| id != 0)
            .ok_or_else(|| Error::validation("`option_id` is required"))
    }
}
