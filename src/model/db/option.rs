use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use crate::model::common::{OptionId, PollId};

/// Core option data, as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollOptionCore {
    /// The poll this option answers.
    pub poll_id: PollId,
    pub text: String,
    /// Only ever changed by an atomic `$inc`.
    pub vote_count: u32,
}

impl PollOptionCore {
    /// Create a new option with no votes.
    pub fn new(poll_id: PollId, text: String) -> Self {
        Self {
            poll_id,
            text,
            vote_count: 0,
        }
    }
}

/// An option from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollOption {
    #[serde(rename = "_id")]
    pub id: OptionId,
    #[serde(flatten)]
    pub option: PollOptionCore,
}

impl PollOption {
    pub fn new(id: OptionId, option: PollOptionCore) -> Self {
        Self { id, option }
    }
}

impl Deref for PollOption {
    type Target = PollOptionCore;

    fn deref(&self) -> &Self::Target {
        &self.option
    }
}

impl DerefMut for PollOption {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.option
    }
}
