use mongodb::{
    bson::doc,
    error::Error as DbError,
    options::{FindOneAndUpdateOptions, ReturnDocument, UpdateOptions},
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::mongodb::Coll;

/// ID of the counter that allocates poll IDs.
pub const POLL_ID_COUNTER_ID: &str = "poll_id";
/// ID of the counter that allocates option IDs.
pub const OPTION_ID_COUNTER_ID: &str = "option_id";

/// A counter object used to implement auto-increment fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Counter {
    #[serde(rename = "_id")]
    pub id: String,
    pub next: u32,
}

impl Counter {
    /// Create a new `Counter` starting at the given value.
    pub fn new(id: impl Into<String>, start: u32) -> Self {
        Self {
            id: id.into(),
            next: start,
        }
    }

    /// Atomically retrieve the next value of the counter with the given ID.
    ///
    /// Values handed out are never handed out again, even if the entity they
    /// were allocated for is later deleted.
    pub async fn next(counters: &Coll<Counter>, id: &str) -> Result<u32> {
        let update = doc! {
            "$inc": { "next": 1 }
        };
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::Before)
            .build();
        let counter = counters
            .find_one_and_update(doc! { "_id": id }, update, options)
            .await?
            .ok_or_else(|| Error::Internal(format!("Failed to find counter with ID {id}")))?;
        Ok(counter.next)
    }
}

/// Ensure the poll and option ID counters exist, starting at 1.
///
/// This operation is idempotent: existing counters are left untouched.
pub async fn ensure_counters_exist(counters: &Coll<Counter>) -> std::result::Result<(), DbError> {
    debug!("Ensuring ID counters exist");
    let upsert = UpdateOptions::builder().upsert(true).build();
    for id in [POLL_ID_COUNTER_ID, OPTION_ID_COUNTER_ID] {
        let update = doc! {
            "$setOnInsert": { "next": 1 }
        };
        counters
            .update_one(doc! { "_id": id }, update, upsert.clone())
            .await?;
    }
    Ok(())
}
