use crate::context::UserInfo;
use crate::core::tokener::{Claim, Payload, Tokener};
use crate::impls::tokener::jwt::JWT;
use actix_web::dev::{Service, ServiceRequest, Transform};
use actix_web::http::header::AUTHORIZATION;
use actix_web::{Error, HttpMessage};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use log::warn;
use std::task::{Context, Poll};

pub static JWT_TOKEN: &str = "JWT_TOKEN";

/// Identifies the caller from a `JWT_TOKEN` cookie or an `Authorization` header.
///
/// Requests without a valid token pass through anonymously; handlers decide whether
/// they need a user.
pub struct JWTMiddleware {
    tokener: JWT,
}

impl JWTMiddleware {
    pub fn new(secret: Vec<u8>) -> Self {
        Self { tokener: JWT::new(secret) }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JWTMiddleware
where
    S: Service<ServiceRequest, Response = actix_web::dev::ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
{
    type Response = S::Response;
    type Error = Error;
    type Transform = JWTService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JWTService {
            tokener: self.tokener.clone(),
            next_service: service,
        }))
    }
}

pub struct JWTService<S> {
    tokener: JWT,
    next_service: S,
}

fn bearer(req: &ServiceRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(JWT_TOKEN) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_owned());
        }
    }
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?.trim();
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_owned())
}

impl<S, B> Service<ServiceRequest> for JWTService<S>
where
    S: Service<ServiceRequest, Response = actix_web::dev::ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
{
    type Response = S::Response;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.next_service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if let Some(token) = bearer(&req) {
            match <JWT as Tokener<Claim>>::verify_token(&self.tokener, &token) {
                Ok(claim) => match claim.user_id() {
                    Some(id) => {
                        req.extensions_mut().insert(UserInfo { id });
                    }
                    None => warn!("token subject {:?} is not a user id", claim.user),
                },
                Err(e) => warn!("ignoring invalid token on {}: {}", req.path(), e),
            }
        }
        let fut = self.next_service.call(req);
        Box::pin(fut)
    }
}
