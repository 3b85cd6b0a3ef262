use crate::error::Error;
use chrono::{Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub trait Payload: Serialize + DeserializeOwned {
    /// Id of the authenticated user, if the payload names a valid one.
    fn user_id(&self) -> Option<i32>;
}

pub trait Tokener<P: Payload> {
    fn gen_token(&self, payload: &P) -> Result<String, Error>;
    fn verify_token(&self, token: &str) -> Result<P, Error>;
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Claim {
    pub user: String,
    pub exp: i64,
}

impl Claim {
    pub fn new(uid: i32, ttl: Duration) -> Self {
        Self {
            user: uid.to_string(),
            exp: (Utc::now() + ttl).timestamp(),
        }
    }
}

impl Payload for Claim {
    fn user_id(&self) -> Option<i32> {
        self.user.parse().ok()
    }
}
