//! Types shared between the API and DB representations.

mod reference_policy;

pub use reference_policy::ReferencePolicy;

/// Our poll IDs are auto-incremented integers.
pub type PollId = u32;
/// Our option IDs are auto-incremented integers, unique across all polls.
pub type OptionId = u32;
