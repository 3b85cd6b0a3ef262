use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use log::error;
use serde_json::json;
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

pub const LOGIN_URL: &str = "/accounts/login/";

/// Field path (e.g. `questions[0].text`) to the messages raised for it.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("dotenv error: {0}")]
    DotEnvError(#[from] dotenv::Error),

    #[error("jwt error: {0}")]
    JWTError(#[from] jsonwebtoken::errors::Error),

    #[error("io error: {0}")]
    IOError(#[from] std::io::Error),

    #[error("validation failed")]
    ValidationError(FieldErrors),

    #[error("{0} not found")]
    NotFoundError(&'static str),

    #[error("not the owner")]
    NotOwnerError,

    #[error("login required")]
    AnonymousRestrictedError,

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("business error: {0}")]
    BusinessError(String),

    #[error("server error: {0}")]
    ServerError(String),
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::ValidationError(_) | Error::BusinessError(_) => StatusCode::BAD_REQUEST,
            Error::NotFoundError(_) | Error::NotOwnerError => StatusCode::NOT_FOUND,
            Error::AnonymousRestrictedError => StatusCode::UNAUTHORIZED,
            Error::InvalidCredentials => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        match self {
            Error::ValidationError(fields) => builder.json(json!({ "error": self.to_string(), "fields": fields })),
            // same body as a missing survey, so ownership probes learn nothing
            Error::NotOwnerError => builder.json(json!({ "error": Error::NotFoundError("survey").to_string() })),
            Error::AnonymousRestrictedError => builder
                .insert_header((header::LOCATION, LOGIN_URL))
                .json(json!({ "error": self.to_string(), "login_url": LOGIN_URL })),
            Error::NotFoundError(_) | Error::InvalidCredentials | Error::BusinessError(_) => builder.json(json!({ "error": self.to_string() })),
            _ => {
                error!("{}", self);
                builder.json(json!({ "error": "internal server error" }))
            }
        }
    }
}
