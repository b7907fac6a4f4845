use chrono::{DateTime, Utc};

use crate::{db::CreateUserOutcome, models::{NewUser, Token, User}, PGPool};

const UNIQUE_VIOLATION: &str = "23505";

pub async fn create(user: NewUser, pool: &PGPool) -> Result<CreateUserOutcome, sqlx::Error> {
    let res = sqlx::query_as::<_, User>(
        "INSERT INTO users (name, full_name, email, password, dni)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, name, full_name, email, password, dni, balance, is_admin",
    )
    .bind(user.name)
    .bind(user.full_name)
    .bind(user.email)
    .bind(user.password)
    .bind(user.dni)
    .fetch_one(pool)
    .await;
    match res {
        Ok(user) => Ok(CreateUserOutcome::Created(user)),
        Err(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            Ok(CreateUserOutcome::EmailTaken)
        }
        Err(err) => Err(err),
    }
}

pub async fn get_by_id(id: i32, pool: &PGPool) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn get_by_email(email: &str, pool: &PGPool) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn credit_balance(id: i32, amount: f64, pool: &PGPool) -> Result<Option<f64>, sqlx::Error> {
    sqlx::query_scalar::<_, f64>("UPDATE users SET balance = balance + $1 WHERE id = $2 RETURNING balance")
        .bind(amount)
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create_token(
    user_id: i32,
    token: &str,
    expires_at: DateTime<Utc>,
    pool: &PGPool,
) -> Result<Token, sqlx::Error> {
    sqlx::query_as::<_, Token>(
        "INSERT INTO tokens (token, user_id, expires_at)
        VALUES ($1, $2, $3)
        RETURNING token, user_id, expires_at",
    )
    .bind(token)
    .bind(user_id)
    .bind(expires_at)
    .fetch_one(pool)
    .await
}

pub async fn get_token(token: &str, pool: &PGPool) -> Result<Option<Token>, sqlx::Error> {
    sqlx::query_as::<_, Token>("SELECT token, user_id, expires_at FROM tokens WHERE token = $1")
        .bind(token)
        .fetch_optional(pool)
        .await
}
