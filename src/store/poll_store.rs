use std::sync::Arc;

use mongodb::{Client, Database};
use rocket::{
    futures::TryStreamExt,
    outcome::try_outcome,
    request::{self, FromRequest, Request},
    State,
};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::RequestId;
use crate::model::{
    api::{OptionSpec, PollSpec},
    common::{OptionId, PollId, ReferencePolicy},
    db::{Poll, PollCore, PollOption, PollOptionCore},
    mongodb::{
        option_filter, u32_id_filter, Coll, Counter, OPTION_ID_COUNTER_ID, POLL_ID_COUNTER_ID,
    },
};

use super::{creation_order, options_for_poll, options_of, Lease};

/// Durable storage of polls and their options.
#[derive(Clone)]
pub struct PollStore {
    client: Client,
    polls: Coll<Poll>,
    options: Coll<PollOption>,
    counters: Coll<Counter>,
    policy: ReferencePolicy,
    lease: Arc<Lease>,
}

impl PollStore {
    const NAME: &'static str = "poll store";

    /// Get a poll store on the given database.
    ///
    /// The client must be the one `db` was obtained from; it is used to run
    /// transactions.
    pub fn new(client: Client, db: &Database, policy: ReferencePolicy) -> Self {
        Self::leased(client, db, policy, Lease::detached(Self::NAME))
    }

    fn leased(client: Client, db: &Database, policy: ReferencePolicy, lease: Arc<Lease>) -> Self {
        Self {
            client,
            polls: Coll::from_db(db),
            options: Coll::from_db(db),
            counters: Coll::from_db(db),
            policy,
            lease,
        }
    }

    /// The request this store was acquired for, if any.
    pub fn request_id(&self) -> Option<RequestId> {
        self.lease.request_id
    }

    /// Create a poll, returning its newly allocated ID.
    pub async fn create_poll(&self, spec: PollSpec) -> Result<PollId> {
        let core = PollCore::try_from(spec)?;
        let id = Counter::next(&self.counters, POLL_ID_COUNTER_ID).await?;
        self.polls.insert_one(Poll::new(id, core), None).await?;
        info!("Created poll {id}");
        Ok(id)
    }

    /// All polls, oldest first.
    pub async fn list_polls(&self) -> Result<Vec<Poll>> {
        let polls: Vec<Poll> = self
            .polls
            .find(None, creation_order())
            .await?
            .try_collect()
            .await?;
        Ok(polls)
    }

    pub async fn get_poll(&self, poll_id: PollId) -> Result<Poll> {
        self.polls
            .find_one(u32_id_filter(poll_id), None)
            .await?
            .ok_or_else(|| Error::not_found(format!("Poll {poll_id}")))
    }

    /// Delete a poll along with all of its options.
    ///
    /// Either the poll and every option referencing it are removed, or
    /// nothing is.
    pub async fn delete_poll(&self, poll_id: PollId) -> Result<()> {
        let mut session = self.client.start_session(None).await?;
        session.start_transaction(None).await?;

        let options = self
            .options
            .delete_many_with_session(options_of(poll_id), None, &mut session)
            .await?;
        let poll = self
            .polls
            .delete_one_with_session(u32_id_filter(poll_id), None, &mut session)
            .await?;
        if poll.deleted_count == 0 {
            session.abort_transaction().await?;
            return Err(Error::not_found(format!("Poll {poll_id}")));
        }

        session.commit_transaction().await?;
        info!(
            "Deleted poll {poll_id} and its {} option(s)",
            options.deleted_count
        );
        Ok(())
    }

    /// Add an option to a poll, returning its newly allocated ID.
    ///
    /// Under [`ReferencePolicy::Strict`] the poll must exist; otherwise the
    /// option is attached to `poll_id` unchecked.
    pub async fn add_option(&self, poll_id: PollId, spec: OptionSpec) -> Result<OptionId> {
        let text = spec.into_text()?;
        if self.policy.is_strict() {
            self.get_poll(poll_id).await?;
        }

        let id = Counter::next(&self.counters, OPTION_ID_COUNTER_ID).await?;
        let option = PollOption::new(id, PollOptionCore::new(poll_id, text));
        self.options.insert_one(option, None).await?;
        info!("Added option {id} to poll {poll_id}");
        Ok(id)
    }

    /// The texts of a poll's options, oldest first.
    pub async fn list_options(&self, poll_id: PollId) -> Result<Vec<String>> {
        let options = options_for_poll(&self.polls, &self.options, poll_id).await?;
        Ok(options
            .into_iter()
            .map(|option| option.option.text)
            .collect())
    }

    /// Delete an option, which must belong to the given poll.
    pub async fn delete_option(&self, poll_id: PollId, option_id: OptionId) -> Result<()> {
        let result = self
            .options
            .delete_one(option_filter(option_id, Some(poll_id)), None)
            .await?;
        if result.deleted_count == 0 {
            return Err(Error::not_found(format!(
                "Option {option_id} of poll {poll_id}"
            )));
        }
        info!("Deleted option {option_id} of poll {poll_id}");
        Ok(())
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for PollStore {
    type Error = ();

    /// Build a store from the managed database and config.
    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let client = try_outcome!(req.guard::<&State<Client>>().await);
        let db = try_outcome!(req.guard::<&State<Database>>().await);
        let config = try_outcome!(req.guard::<&State<Config>>().await);
        let request_id = try_outcome!(req.guard::<&RequestId>().await);

        let lease = Lease::acquire(request_id, PollStore::NAME);
        let policy = config.reference_policy();
        request::Outcome::Success(PollStore::leased(client.inner().clone(), db, policy, lease))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use mongodb::bson::doc;

    use crate::model::api::VoteRequest;
    use crate::store::VoteTally;

    async fn poll_with_options(store: &PollStore, texts: &[&str]) -> (PollId, Vec<OptionId>) {
        let poll_id = store.create_poll(PollSpec::example()).await.unwrap();
        let mut option_ids = Vec::new();
        for text in texts {
            option_ids.push(store.add_option(poll_id, OptionSpec::new(*text)).await.unwrap());
        }
        (poll_id, option_ids)
    }

    #[backend_test]
    async fn create_and_get_poll(store: PollStore) {
        assert_eq!(store.request_id(), None);
        let id = store.create_poll(PollSpec::example()).await.unwrap();
        assert_eq!(id, 1);

        let poll = store.get_poll(id).await.unwrap();
        assert_eq!(poll.id, id);
        assert_eq!(poll.title, "Lunch?");
        assert_eq!(poll.description, "Pick a place");
    }

    #[backend_test]
    async fn create_poll_requires_fields(store: PollStore, polls: Coll<Poll>) {
        for spec in [
            PollSpec::new("", "Pick a place"),
            PollSpec::new("Lunch?", ""),
            PollSpec {
                title: Some("Lunch?".to_string()),
                description: None,
            },
            PollSpec::default(),
        ] {
            let result = store.create_poll(spec).await;
            assert!(matches!(result, Err(Error::Validation(_))));
        }

        // Nothing was inserted, and no IDs were used up.
        assert_eq!(polls.count_documents(None, None).await.unwrap(), 0);
        assert_eq!(store.create_poll(PollSpec::example()).await.unwrap(), 1);
    }

    #[backend_test]
    async fn get_missing_poll(store: PollStore) {
        let result = store.get_poll(999).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[backend_test]
    async fn list_polls_in_creation_order(store: PollStore) {
        assert!(store.list_polls().await.unwrap().is_empty());

        let first = store.create_poll(PollSpec::example()).await.unwrap();
        let second = store.create_poll(PollSpec::example2()).await.unwrap();

        let polls = store.list_polls().await.unwrap();
        let ids = polls.iter().map(|poll| poll.id).collect::<Vec<_>>();
        assert_eq!(ids, vec![first, second]);
        assert_eq!(polls[1].title, "Holiday");
    }

    #[backend_test]
    async fn ids_are_never_reused(store: PollStore) {
        let (poll_id, option_ids) = poll_with_options(&store, &["Pizza"]).await;
        store.delete_poll(poll_id).await.unwrap();

        let (new_poll_id, new_option_ids) = poll_with_options(&store, &["Pizza"]).await;
        assert!(new_poll_id > poll_id);
        assert!(new_option_ids[0] > option_ids[0]);
    }

    #[backend_test]
    async fn delete_poll_cascades(store: PollStore, tally: VoteTally, options: Coll<PollOption>) {
        let (doomed, _) = poll_with_options(&store, &["Pizza", "Sushi"]).await;
        let (kept, _) = poll_with_options(&store, &["Tacos"]).await;

        store.delete_poll(doomed).await.unwrap();

        let remaining = store.list_polls().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, kept);
        assert!(matches!(store.get_poll(doomed).await, Err(Error::NotFound(_))));
        assert!(matches!(
            store.list_options(doomed).await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(tally.results(doomed).await, Err(Error::NotFound(_))));

        // No orphans are left behind, and other polls are untouched.
        let orphans = options
            .count_documents(doc! { "poll_id": doomed }, None)
            .await
            .unwrap();
        assert_eq!(orphans, 0);
        assert_eq!(store.list_options(kept).await.unwrap(), vec!["Tacos"]);
    }

    #[backend_test]
    async fn delete_missing_poll(store: PollStore) {
        let result = store.delete_poll(42).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[backend_test(permissive)]
    async fn failed_delete_keeps_options(store: PollStore, options: Coll<PollOption>) {
        // Without a poll, the options deleted in the transaction must come back.
        store.add_option(999, OptionSpec::new("Pizza")).await.unwrap();

        let result = store.delete_poll(999).await;
        assert!(matches!(result, Err(Error::NotFound(_))));

        assert_eq!(store.list_options(999).await.unwrap(), vec!["Pizza"]);
        assert_eq!(options.count_documents(None, None).await.unwrap(), 1);
    }

    #[backend_test]
    async fn add_and_list_options(store: PollStore) {
        let (poll_id, option_ids) = poll_with_options(&store, &["Pizza", "Sushi"]).await;
        assert_eq!(option_ids, vec![1, 2]);

        let texts = store.list_options(poll_id).await.unwrap();
        assert_eq!(texts, vec!["Pizza", "Sushi"]);
    }

    #[backend_test]
    async fn add_option_requires_text(store: PollStore) {
        let poll_id = store.create_poll(PollSpec::example()).await.unwrap();
        for spec in [OptionSpec::new(""), OptionSpec::default()] {
            let result = store.add_option(poll_id, spec).await;
            assert!(matches!(result, Err(Error::Validation(_))));
        }
    }

    #[backend_test]
    async fn list_options_distinguishes_missing_poll(store: PollStore) {
        let poll_id = store.create_poll(PollSpec::example()).await.unwrap();

        let empty = store.list_options(poll_id).await.unwrap_err();
        assert_eq!(
            empty.to_string(),
            format!("Not found: Options for poll {poll_id}")
        );

        let missing = store.list_options(999).await.unwrap_err();
        assert_eq!(missing.to_string(), "Not found: Poll 999");
    }

    #[backend_test]
    async fn strict_add_option_needs_poll(store: PollStore, options: Coll<PollOption>) {
        let result = store.add_option(999, OptionSpec::new("Pizza")).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
        assert_eq!(options.count_documents(None, None).await.unwrap(), 0);
    }

    #[backend_test(permissive)]
    async fn permissive_add_option_to_missing_poll(store: PollStore) {
        let option_id = store
            .add_option(999, OptionSpec::new("Pizza"))
            .await
            .unwrap();
        assert_eq!(option_id, 1);
        assert_eq!(store.list_options(999).await.unwrap(), vec!["Pizza"]);
    }

    #[backend_test]
    async fn delete_option_scoped_to_poll(store: PollStore) {
        let (first, first_options) = poll_with_options(&store, &["Pizza", "Sushi"]).await;
        let (second, _) = poll_with_options(&store, &["Tacos"]).await;

        // The option exists, but not on the second poll.
        let result = store.delete_option(second, first_options[0]).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
        assert_eq!(store.list_options(first).await.unwrap(), vec!["Pizza", "Sushi"]);

        store.delete_option(first, first_options[0]).await.unwrap();
        assert_eq!(store.list_options(first).await.unwrap(), vec!["Sushi"]);

        // Deleting it again fails.
        let result = store.delete_option(first, first_options[0]).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[backend_test]
    async fn deleted_option_loses_its_votes(store: PollStore, tally: VoteTally) {
        let (poll_id, option_ids) = poll_with_options(&store, &["Pizza", "Sushi"]).await;
        tally
            .cast_vote(poll_id, VoteRequest::new(option_ids[0]))
            .await
            .unwrap();

        store.delete_option(poll_id, option_ids[0]).await.unwrap();
        let re_added = store
            .add_option(poll_id, OptionSpec::new("Pizza"))
            .await
            .unwrap();

        let results = tally.results(poll_id).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|result| result.votes == 0));
        assert_ne!(re_added, option_ids[0]);
    }
}
