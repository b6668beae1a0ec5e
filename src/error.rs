use mongodb::error::Error as DbError;
use rocket::{
    http::{Status, StatusClass},
    response::{self, Responder},
    serde::json::Json,
    Request,
};
use thiserror::Error;

use crate::model::api::ErrorMessage;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// The HTTP status this error is reported with.
    pub fn status(&self) -> Status {
        match self {
            Self::Validation(_) => Status::BadRequest,
            Self::NotFound(_) => Status::NotFound,
            Self::Db(_) | Self::Internal(_) => Status::InternalServerError,
        }
    }

    /// The message shown to clients.
    ///
    /// Server-side failures are only described in the logs.
    pub fn public_message(&self) -> String {
        match self.status().class() {
            StatusClass::ServerError => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'o> {
        let status = self.status();
        match status.class() {
            StatusClass::ServerError => error!("{self}"),
            _ => warn!("{self}"),
        }
        let body = ErrorMessage {
            error: self.public_message(),
        };
        (status, Json(body)).respond_to(req)
    }
}
