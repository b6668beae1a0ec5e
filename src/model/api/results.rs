use serde::{Deserialize, Serialize};

use crate::model::db::PollOption;

/// The current tally of one option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionResult {
    pub option: String,
    pub votes: u32,
}

impl OptionResult {
    pub fn new(option: impl Into<String>, votes: u32) -> Self {
        Self {
            option: option.into(),
            votes,
        }
    }
}

impl From<PollOption> for OptionResult {
    fn from(option: PollOption) -> Self {
        Self {
            option: option.option.text,
            votes: option.option.vote_count,
        }
    }
}
