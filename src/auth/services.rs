use anyhow::Context;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{
    dto::{LoginRequest, RegisterRequest},
    jwt::JwtKeys,
    password::{hash_password, verify_password},
    repo::UserStore,
    repo_types::{NewUser, User},
};
use crate::db::StoreError;
use crate::error::{ApiResult, AppError};

const INVALID_CREDENTIALS: &str = "invalid email/password";

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex =
            Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex compiles");
    }
    EMAIL_RE.is_match(email)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub async fn register(users: &dyn UserStore, payload: RegisterRequest) -> ApiResult<User> {
    let name = payload.name.trim().to_string();
    let email = normalize_email(&payload.email);

    if name.is_empty() {
        return Err(AppError::Validation("name is required".into()));
    }
    if !is_valid_email(&email) {
        warn!("registration with invalid email");
        return Err(AppError::Validation("invalid email".into()));
    }
    if payload.password.is_empty() {
        return Err(AppError::Validation("password is required".into()));
    }

    if users.find_by_email(&email).await?.is_some() {
        warn!("registration for an existing email");
        return Err(AppError::Conflict("email already registered".into()));
    }

    let password = payload.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .context("hash task")??;

    let user = users
        .create(NewUser {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash,
        })
        .await
        .map_err(|e| match e {
            // lost a race with a concurrent registration
            StoreError::UniqueViolation(_) => AppError::Conflict("email already registered".into()),
            other => other.into(),
        })?;

    info!(user_id = %user.id, "user registered");
    Ok(user)
}

/// Unknown email and wrong password are indistinguishable to the caller.
pub async fn login(
    users: &dyn UserStore,
    keys: &JwtKeys,
    payload: LoginRequest,
) -> ApiResult<String> {
    let email = normalize_email(&payload.email);

    let Some(user) = users.find_by_email(&email).await? else {
        warn!("login for unknown email");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS));
    };

    let password = payload.password;
    let hash = user.password_hash.clone();
    let ok = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .context("verify task")?;

    if !ok {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS));
    }

    let token = keys.issue(user.id)?;
    info!(user_id = %user.id, "user logged in");
    Ok(token)
}
