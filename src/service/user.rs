use chrono::{Duration, Utc};
use log::{info, warn};

use crate::db::{CreateUserOutcome, Store};
use crate::dto::{AuthResponse, LoginRequest, RegisterRequest};
use crate::errors::AppError;
use crate::models::{NewUser, User};

use super::crypto;

pub async fn register(dto: RegisterRequest, token_ttl_secs: i64, store: &dyn Store) -> Result<AuthResponse, AppError> {
    let input = dto.validate()?;
    if store.find_user_by_email(&input.email).await?.is_some() {
        return Err(AppError::bad_request("Email already in use"));
    }

    let new_user = NewUser {
        name: input.username,
        full_name: input.full_name,
        email: input.email,
        password: crypto::get_sha3_256_hash(&input.password),
        dni: input.dni,
    };
    let user = match store.create_user(new_user).await? {
        CreateUserOutcome::Created(user) => user,
        CreateUserOutcome::EmailTaken => return Err(AppError::bad_request("Email already in use")),
    };
    info!("registered user {}", user.id);

    let token = issue_token(&user, token_ttl_secs, store).await?;
    Ok(AuthResponse {
        success: true,
        user: user.into(),
        token,
    })
}

pub async fn login(dto: LoginRequest, token_ttl_secs: i64, store: &dyn Store) -> Result<AuthResponse, AppError> {
    let email = dto.email.unwrap_or_default();
    let password = dto.password.unwrap_or_default();

    let user = store
        .find_user_by_email(email.trim())
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    if !crypto::verify_password(&password, &user.password) {
        warn!("failed login for user {}", user.id);
        return Err(AppError::bad_request("Invalid password"));
    }

    let token = issue_token(&user, token_ttl_secs, store).await?;
    Ok(AuthResponse {
        success: true,
        user: user.into(),
        token,
    })
}

async fn issue_token(user: &User, token_ttl_secs: i64, store: &dyn Store) -> Result<String, AppError> {
    let expires_at = Utc::now() + Duration::seconds(token_ttl_secs);
    let token = store
        .create_token(user.id, &crypto::generate_token(), expires_at)
        .await?;
    Ok(token.token)
}
