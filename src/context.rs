use crate::error::Error;
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

/// The authenticated caller, put in the request extensions by the JWT middleware.
///
/// Extracting it from an anonymous request fails with a login-required error; handlers
/// open to everyone take `Option<UserInfo>` instead.
#[derive(Debug, Clone)]
pub struct UserInfo {
    pub id: i32,
}

impl FromRequest for UserInfo {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(req.extensions().get::<Self>().cloned().ok_or(Error::AnonymousRestrictedError))
    }
}
