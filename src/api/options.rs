use rocket::{http::Status, serde::json::Json, Route};

use crate::error::Result;
use crate::model::{
    api::{Message, OptionSpec},
    common::{OptionId, PollId},
};
use crate::store::PollStore;

pub fn routes() -> Vec<Route> {
    routes![list_options, add_option, delete_option]
}

#[get("/polls/<poll_id>/options")]
async fn list_options(poll_id: PollId, store: PollStore) -> Result<Json<Vec<String>>> {
    let texts = store.list_options(poll_id).await?;
    Ok(Json(texts))
}

#[post("/polls/<poll_id>/options", data = "<spec>", format = "json")]
async fn add_option(
    poll_id: PollId,
    spec: Json<OptionSpec>,
    store: PollStore,
) -> Result<(Status, Json<Message>)> {
    let id = store.add_option(poll_id, spec.0).await?;
    Ok((Status::Created, Json(Message::created("Option added", id))))
}

#[delete("/polls/<poll_id>/options/<option_id>")]
async fn delete_option(
    poll_id: PollId,
    option_id: OptionId,
    store: PollStore,
) -> Result<Json<Message>> {
    store.delete_option(poll_id, option_id).await?;
    Ok(Json(Message::new("Option deleted")))
}
