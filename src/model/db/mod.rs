//! DB-compatible (e.g. de/serialisable) types.
//!
//! Each entity is split into a `*Core` holding its data and a wrapper that
//! adds the unique `_id`. IDs are allocated from the counters collection
//! before insertion, so the wrapper is what gets inserted.

mod option;
pub use option::{PollOption, PollOptionCore};

mod poll;
pub use poll::{Poll, PollCore};
