pub mod answer;
pub mod result;
pub mod survey;

use crate::core::models::user::Credentials;
use crate::core::ports::repository::Manager;
use crate::core::services::user;
use crate::core::tokener::{Claim, Tokener};
use crate::error::Error;
use crate::impls::tokener::jwt::JWT;
use crate::middlewares::jwt::JWT_TOKEN;
use crate::response::{CreateResponse, TokenResponse};
use actix_web::cookie::{time::OffsetDateTime, Cookie, CookieBuilder};
use actix_web::web::{delete, get, post, put, resource, scope, Data, Json, ServiceConfig};
use actix_web::HttpResponse;
use chrono::Duration;
use log::info;

/// Issues login tokens.
pub struct Session {
    tokener: JWT,
    ttl: Duration,
}

impl Session {
    pub fn new(secret: Vec<u8>, ttl_days: i64) -> Self {
        Self {
            tokener: JWT::new(secret),
            ttl: Duration::days(ttl_days),
        }
    }
}

pub fn routes<M: Manager + 'static>(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/surveys")
            .route("/", get().to(survey::list::<M>))
            .route("/my-surveys/", get().to(survey::my_surveys::<M>))
            .route("/create/", post().to(survey::create::<M>))
            .service(resource("/{id}/").route(get().to(survey::detail::<M>)).route(delete().to(survey::delete::<M>)))
            .service(
                resource("/{id}/edit/")
                    .route(get().to(survey::edit_form::<M>))
                    .route(post().to(survey::edit::<M>))
                    .route(put().to(survey::edit::<M>)),
            )
            .route("/{id}/delete/", post().to(survey::delete::<M>))
            .service(resource("/{id}/respond/").route(get().to(survey::detail::<M>)).route(post().to(answer::submit::<M>)))
            .route("/{id}/results/", get().to(result::results::<M>)),
    )
    .service(
        scope("/accounts")
            .route("/signup/", post().to(signup::<M>))
            .route("/login/", post().to(login::<M>))
            .route("/logout/", post().to(logout)),
    );
}

pub async fn signup<M: Manager>(manager: Data<M>, Json(credentials): Json<Credentials>) -> Result<HttpResponse, Error> {
    let id = user::signup(manager.tx().await?, credentials).await?;
    Ok(HttpResponse::Created().json(CreateResponse { id }))
}

pub async fn login<M: Manager>(manager: Data<M>, session: Data<Session>, Json(credentials): Json<Credentials>) -> Result<HttpResponse, Error> {
    let mut store = manager.db().await?;
    let user = user::login(&mut store, credentials).await?;
    let token = session.tokener.gen_token(&Claim::new(user.id, session.ttl))?;
    info!("user {} logged in", user.id);
    Ok(HttpResponse::Ok()
        .cookie(CookieBuilder::new(JWT_TOKEN, token.clone()).path("/").http_only(true).finish())
        .json(TokenResponse { token }))
}

pub async fn logout() -> HttpResponse {
    let mut cookie = Cookie::new(JWT_TOKEN, "");
    cookie.set_path("/");
    cookie.set_expires(OffsetDateTime::now_utc());
    HttpResponse::Ok().cookie(cookie).finish()
}
