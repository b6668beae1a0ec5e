use mongodb::bson::{doc, Document};

use crate::model::common::{OptionId, PollId};

/// A filter matching the document with the given integer `_id`.
pub fn u32_id_filter(id: u32) -> Document {
    doc! {
        "_id": id,
    }
}

/// A filter matching an option, optionally scoped to the poll that owns it.
pub fn option_filter(option_id: OptionId, poll_id: Option<PollId>) -> Document {
    let mut filter = u32_id_filter(option_id);
    if let Some(poll_id) = poll_id {
        filter.insert("poll_id", poll_id);
    }
    filter
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_filter_scoping() {
        assert_eq!(option_filter(7, None), doc! { "_id": 7_u32 });
        assert_eq!(
            option_filter(7, Some(2)),
            doc! { "_id": 7_u32, "poll_id": 2_u32 }
        );
    }
}
