use crate::core::models::user::{Credentials, Insert as UserInsert, User};
use crate::core::ports::repository::{Store, TxStore, UserCommon};
use crate::error::Error;
use hex::ToHex;
use log::info;
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use sha2::{Digest, Sha256};

const SALT_LEN: usize = 32;
const USERNAME_MAX_LEN: usize = 150;

pub fn hash_password(pass: &str, slt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(pass);
    hasher.update(slt);
    hasher.finalize().encode_hex()
}

fn random_salt() -> String {
    thread_rng().sample_iter(&Alphanumeric).take(SALT_LEN).map(char::from).collect()
}

pub async fn signup<T>(mut store: T, Credentials { username, password }: Credentials) -> Result<i32, Error>
where
    T: TxStore,
{
    let username = username.trim().to_owned();
    if username.is_empty() || username.chars().count() > USERNAME_MAX_LEN || password.is_empty() {
        return Err(Error::BusinessError("username and password are required".into()));
    }
    if UserCommon::exists(&mut store, &username).await? {
        return Err(Error::BusinessError("username already taken".into()));
    }
    let slt = random_salt();
    let id = UserCommon::insert(
        &mut store,
        UserInsert {
            password: hash_password(&password, &slt),
            salt: slt,
            username,
        },
    )
    .await?;
    store.commit().await?;
    info!("user {} signed up", id);
    Ok(id)
}

pub async fn login<S>(store: &mut S, Credentials { username, password }: Credentials) -> Result<User, Error>
where
    S: Store,
{
    match UserCommon::get_by_username(store, username.trim()).await? {
        Some(user) if hash_password(&password, &user.salt) == user.password => Ok(user),
        _ => Err(Error::InvalidCredentials),
    }
}
