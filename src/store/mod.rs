//! The poll store and vote tally.
//!
//! Both are cheap handles onto the managed database. Endpoints receive a fresh
//! handle per request via a request guard; it is dropped, and logged as
//! released, when the request finishes, whether it succeeded or not.

use std::sync::Arc;

use mongodb::{
    bson::{doc, Document},
    options::FindOptions,
};
use rocket::futures::TryStreamExt;

use crate::error::{Error, Result};
use crate::logging::RequestId;
use crate::model::{
    common::PollId,
    db::{Poll, PollOption},
    mongodb::{u32_id_filter, Coll},
};

mod poll_store;
mod vote_tally;

pub use poll_store::PollStore;
pub use vote_tally::VoteTally;

/// Ties a store handle to the request that acquired it, logging its release.
///
/// Clones of a store share one lease, so the release is logged once.
#[derive(Debug)]
struct Lease {
    request_id: Option<RequestId>,
    store: &'static str,
}

impl Lease {
    fn acquire(request_id: &RequestId, store: &'static str) -> Arc<Self> {
        debug!("req{request_id} acquired {store}");
        Arc::new(Self {
            request_id: Some(*request_id),
            store,
        })
    }

    /// A handle used outside of any request, e.g. in tests.
    fn detached(store: &'static str) -> Arc<Self> {
        Arc::new(Self {
            request_id: None,
            store,
        })
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        if let Some(id) = self.request_id {
            debug!("req{id} released {}", self.store);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_one_lease() {
        let lease = Lease::acquire(&RequestId::next(), "poll store");
        let copy = Arc::clone(&lease);
        assert_eq!(Arc::strong_count(&lease), 2);
        drop(copy);
        assert_eq!(Arc::strong_count(&lease), 1);
    }
}

/// Options are listed in the order they were created.
fn creation_order() -> FindOptions {
    FindOptions::builder().sort(doc! {"_id": 1}).build()
}

fn options_of(poll_id: PollId) -> Document {
    doc! {
        "poll_id": poll_id,
    }
}

/// Fetch all options of a poll in creation order.
///
/// A poll with no options is reported as not found, but the message says
/// whether the poll itself exists.
async fn options_for_poll(
    polls: &Coll<Poll>,
    options: &Coll<PollOption>,
    poll_id: PollId,
) -> Result<Vec<PollOption>> {
    let found = options
        .find(options_of(poll_id), creation_order())
        .await?
        .try_collect::<Vec<_>>()
        .await?;
    if !found.is_empty() {
        return Ok(found);
    }

    let poll_exists = polls.find_one(u32_id_filter(poll_id), None).await?.is_some();
    if poll_exists {
        Err(Error::not_found(format!("Options for poll {poll_id}")))
    } else {
        Err(Error::not_found(format!("Poll {poll_id}")))
    }
}
