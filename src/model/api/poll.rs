use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    common::PollId,
    db::{Poll, PollCore},
};

use super::required_text;

/// A request to create a poll.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollSpec {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl PollSpec {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            description: Some(description.into()),
        }
    }
}

impl TryFrom<PollSpec> for PollCore {
    type Error = Error;

    fn try_from(spec: PollSpec) -> Result<Self> {
        Ok(Self {
            title: required_text(spec.title, "title")?,
            description: required_text(spec.description, "description")?,
        })
    }
}

/// API-friendly view of a poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollDescription {
    pub id: PollId,
    pub title: String,
    pub description: String,
}

impl From<Poll> for PollDescription {
    fn from(poll: Poll) -> Self {
        Self {
            id: poll.id,
            title: poll.poll.title,
            description: poll.poll.description,
        }
    }
}
