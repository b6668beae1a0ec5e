mod bson;
mod collection;
mod counter;

pub use bson::{option_filter, u32_id_filter};
pub use collection::{ensure_indexes_exist, Coll, MongoCollection};
pub use counter::{ensure_counters_exist, Counter, OPTION_ID_COUNTER_ID, POLL_ID_COUNTER_ID};
