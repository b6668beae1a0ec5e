use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use crate::model::common::PollId;

/// Core poll data, as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollCore {
    pub title: String,
    pub description: String,
}

/// A poll from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poll {
    #[serde(rename = "_id")]
    pub id: PollId,
    #[serde(flatten)]
    pub poll: PollCore,
}

impl Poll {
    pub fn new(id: PollId, poll: PollCore) -> Self {
        Self { id, poll }
    }
}

impl Deref for Poll {
    type Target = PollCore;

    fn deref(&self) -> &Self::Target {
        &self.poll
    }
}

impl DerefMut for Poll {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.poll
    }
}
