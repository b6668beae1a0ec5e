use rocket::{http::Status, serde::json::Json, Route};

use crate::error::Result;
use crate::model::{
    api::{Message, PollDescription, PollSpec},
    common::PollId,
};
use crate::store::PollStore;

pub fn routes() -> Vec<Route> {
    routes![create_poll, list_polls, get_poll, delete_poll]
}

#[post("/polls", data = "<spec>", format = "json")]
async fn create_poll(spec: Json<PollSpec>, store: PollStore) -> Result<(Status, Json<Message>)> {
    let id = store.create_poll(spec.0).await?;
    Ok((Status::Created, Json(Message::created("Poll created", id))))
}

#[get("/polls")]
async fn list_polls(store: PollStore) -> Result<Json<Vec<PollDescription>>> {
    let polls = store.list_polls().await?;
    Ok(Json(polls.into_iter().map(Into::into).collect()))
}

#[get("/polls/<poll_id>")]
async fn get_poll(poll_id: PollId, store: PollStore) -> Result<Json<PollDescription>> {
    let poll = store.get_poll(poll_id).await?;
    Ok(Json(poll.into()))
}

#[delete("/polls/<poll_id>")]
async fn delete_poll(poll_id: PollId, store: PollStore) -> Result<Json<Message>> {
    store.delete_poll(poll_id).await?;
    Ok(Json(Message::new("Poll deleted")))
}

#[cfg(test)]
mod tests {
    use mongodb::{bson::doc, Database};
    use rocket::{
        http::{ContentType, Status},
        local::asynchronous::Client,
        serde::json::serde_json,
    };

    use crate::model::{
        api::{ErrorMessage, OptionSpec},
        db::{Poll, PollOption},
        mongodb::Coll,
    };

    use super::*;

    #[backend_test]
    async fn create_then_get(client: Client, db: Database) {
        let id = create_poll_for_spec(&client, &PollSpec::example()).await;
        assert_eq!(id, 1);

        // Ensure it is present in the DB.
        let inserted = Coll::<Poll>::from_db(&db)
            .find_one(doc! { "_id": id }, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(inserted.title, "Lunch?");

        let response = client.get(uri!(get_poll(id))).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let raw_response = response.into_string().await.unwrap();
        let poll: PollDescription = serde_json::from_str(&raw_response).unwrap();
        assert_eq!(
            poll,
            PollDescription {
                id,
                title: "Lunch?".to_string(),
                description: "Pick a place".to_string(),
            }
        );
    }

    #[backend_test]
    async fn create_with_missing_fields(client: Client, polls: Coll<Poll>) {
        for body in [
            r#"{}"#,
            r#"{"title": "Lunch?"}"#,
            r#"{"description": "Pick a place"}"#,
            r#"{"title": "", "description": "Pick a place"}"#,
        ] {
            let response = client
                .post(uri!(create_poll))
                .header(ContentType::JSON)
                .body(body)
                .dispatch()
                .await;
            assert_eq!(Status::BadRequest, response.status());
        }

        // Syntactically broken JSON is also a bad request.
        let response = client
            .post(uri!(create_poll))
            .header(ContentType::JSON)
            .body("{\"title\": ")
            .dispatch()
            .await;
        assert_eq!(Status::BadRequest, response.status());

        // Ensure nothing was inserted.
        assert_eq!(polls.count_documents(None, None).await.unwrap(), 0);
    }

    #[backend_test]
    async fn list_in_creation_order(client: Client) {
        let response = client.get(uri!(list_polls)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        assert_eq!(response.into_string().await.unwrap(), "[]");

        create_poll_for_spec(&client, &PollSpec::example()).await;
        create_poll_for_spec(&client, &PollSpec::example2()).await;

        let response = client.get(uri!(list_polls)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let polls: Vec<PollDescription> =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        let titles = polls.iter().map(|p| p.title.as_str()).collect::<Vec<_>>();
        assert_eq!(titles, vec!["Lunch?", "Holiday"]);
        assert_eq!(polls[0].id, 1);
        assert_eq!(polls[1].id, 2);
    }

    #[backend_test]
    async fn get_missing(client: Client) {
        let response = client.get(uri!(get_poll(999_u32))).dispatch().await;
        assert_eq!(Status::NotFound, response.status());
        let error: ErrorMessage =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(error.error, "Not found: Poll 999");

        // Non-integer IDs don't match any route.
        let response = client.get("/polls/lunch").dispatch().await;
        assert_eq!(Status::NotFound, response.status());
    }

    #[backend_test]
    async fn delete_cascades(client: Client, store: PollStore, options: Coll<PollOption>) {
        let id = create_poll_for_spec(&client, &PollSpec::example()).await;
        for text in ["Pizza", "Sushi"] {
            store.add_option(id, OptionSpec::new(text)).await.unwrap();
        }

        let response = client.delete(uri!(delete_poll(id))).dispatch().await;
        assert_eq!(Status::Ok, response.status());

        let response = client.get(uri!(get_poll(id))).dispatch().await;
        assert_eq!(Status::NotFound, response.status());
        assert!(store.list_options(id).await.is_err());
        assert_eq!(options.count_documents(None, None).await.unwrap(), 0);

        // Deleting again fails.
        let response = client.delete(uri!(delete_poll(id))).dispatch().await;
        assert_eq!(Status::NotFound, response.status());
    }

    async fn create_poll_for_spec(client: &Client, spec: &PollSpec) -> PollId {
        let response = client
            .post(uri!(create_poll))
            .header(ContentType::JSON)
            .body(serde_json::to_string(spec).unwrap())
            .dispatch()
            .await;
        assert_eq!(Status::Created, response.status());
        let raw_response = response.into_string().await.unwrap();
        let message: Message = serde_json::from_str(&raw_response).unwrap();
        message.id.unwrap()
    }
}
