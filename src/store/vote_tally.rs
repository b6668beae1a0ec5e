use std::sync::Arc;

use mongodb::{bson::doc, Database};
use rocket::{
    outcome::try_outcome,
    request::{self, FromRequest, Request},
    State,
};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::RequestId;
use crate::model::{
    api::{OptionResult, VoteRequest},
    common::{PollId, ReferencePolicy},
    db::{Poll, PollOption},
    mongodb::{option_filter, Coll},
};

use super::{options_for_poll, Lease};

/// Atomic increments and reads of per-option vote counts.
#[derive(Clone)]
pub struct VoteTally {
    polls: Coll<Poll>,
    options: Coll<PollOption>,
    policy: ReferencePolicy,
    lease: Arc<Lease>,
}

impl VoteTally {
    const NAME: &'static str = "vote tally";

    /// Get a vote tally on the given database.
    pub fn new(db: &Database, policy: ReferencePolicy) -> Self {
        Self::leased(db, policy, Lease::detached(Self::NAME))
    }

    fn leased(db: &Database, policy: ReferencePolicy, lease: Arc<Lease>) -> Self {
        Self {
            polls: Coll::from_db(db),
            options: Coll::from_db(db),
            policy,
            lease,
        }
    }

    /// The request this tally was acquired for, if any.
    pub fn request_id(&self) -> Option<RequestId> {
        self.lease.request_id
    }

    /// Add exactly one vote to the requested option.
    ///
    /// The increment is a single `$inc` on the option document, so concurrent
    /// votes are never lost. Under [`ReferencePolicy::Strict`] the option must
    /// belong to `poll_id`; otherwise it is matched on its own ID alone.
    pub async fn cast_vote(&self, poll_id: PollId, request: VoteRequest) -> Result<()> {
        let option_id = request.option_id()?;
        let scope = self.policy.is_strict().then_some(poll_id);
        let update = doc! {
            "$inc": { "vote_count": 1 }
        };
        let result = self
            .options
            .update_one(option_filter(option_id, scope), update, None)
            .await?;
        if result.matched_count == 0 {
            return Err(match scope {
                Some(poll_id) => {
                    Error::not_found(format!("Option {option_id} of poll {poll_id}"))
                }
                None => Error::not_found(format!("Option {option_id}")),
            });
        }
        debug!("Counted vote for option {option_id} of poll {poll_id}");
        Ok(())
    }

    /// The current tally of every option of a poll, oldest option first.
    pub async fn results(&self, poll_id: PollId) -> Result<Vec<OptionResult>> {
        let options = options_for_poll(&self.polls, &self.options, poll_id).await?;
        Ok(options.into_iter().map(Into::into).collect())
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for VoteTally {
    type Error = ();

    /// Build a tally from the managed database and config.
    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let db = try_outcome!(req.guard::<&State<Database>>().await);
        let config = try_outcome!(req.guard::<&State<Config>>().await);
        let request_id = try_outcome!(req.guard::<&RequestId>().await);

        let lease = Lease::acquire(request_id, VoteTally::NAME);
        request::Outcome::Success(VoteTally::leased(db, config.reference_policy(), lease))
    }
}
