#![allow(async_fn_in_trait)]

mod config;
mod context;
mod core;
mod database;
mod error;
mod handlers;
mod impls;
mod middlewares;
mod request;
mod response;

use actix_web::middleware::Logger;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use config::Config;
use database::sqlx::PgSqlxManager;
use error::Error;
use handlers::Session;
use log::info;
use middlewares::jwt::JWTMiddleware;
use sqlx::postgres::PgPoolOptions;

#[actix_web::main]
async fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info,actix_web=info")).init();
    let config = Config::load()?;
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!().run(&pool).await?;
    let manager = Data::new(PgSqlxManager::new(pool));
    let session = Data::new(Session::new(config.jwt_secret.as_bytes().to_owned(), config.token_ttl_days));
    let secret = config.jwt_secret.clone();
    info!("listening on {}", config.bind_addr);
    HttpServer::new(move || {
        App::new()
            .wrap(JWTMiddleware::new(secret.as_bytes().to_owned()))
            .wrap(Logger::default())
            .app_data(manager.clone())
            .app_data(session.clone())
            .configure(handlers::routes::<PgSqlxManager>)
    })
    .bind(&config.bind_addr)?
    .run()
    .await?;
    Ok(())
}
