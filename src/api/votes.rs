use rocket::{serde::json::Json, Route};

use crate::error::Result;
use crate::model::{
    api::{Message, OptionResult, VoteRequest},
    common::PollId,
};
use crate::store::VoteTally;

pub fn routes() -> Vec<Route> {
    routes![cast_vote, results]
}

#[post("/polls/<poll_id>/vote", data = "<request>", format = "json")]
async fn cast_vote(
    poll_id: PollId,
    request: Json<VoteRequest>,
    tally: VoteTally,
) -> Result<Json<Message>> {
    tally.cast_vote(poll_id, request.0).await?;
    Ok(Json(Message::new("Vote recorded")))
}

#[get("/polls/<poll_id>/results")]
async fn results(poll_id: PollId, tally: VoteTally) -> Result<Json<Vec<OptionResult>>> {
    let results = tally.results(poll_id).await?;
    Ok(Json(results))
}
