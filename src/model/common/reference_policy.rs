use serde::{Deserialize, Serialize};

/// How strictly the relationship between a poll and its options is enforced
/// when adding options and casting votes.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferencePolicy {
    /// Options can only be added to polls that exist, and a vote only counts
    /// if the option belongs to the poll it was cast on.
    #[default]
    Strict,
    /// Options are attached to whatever poll ID is given, and votes are
    /// matched on the option ID alone.
    Permissive,
}

impl ReferencePolicy {
    pub fn is_strict(self) -> bool {
        self == Self::Strict
    }
}
