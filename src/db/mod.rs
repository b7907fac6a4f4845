pub mod user;
pub mod event;
pub mod attendance;
#[cfg(test)]
pub mod memory;
#[cfg(test)]
mod postgres_tests;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::info;
use sqlx::postgres::PgPoolOptions;

use crate::models::{Event, EventUser, NewEvent, NewUser, Token, User};
use crate::PGPool;

pub async fn init_db_pool(db_url: &str, max_connections: u32) -> Result<PGPool, sqlx::Error> {
    let pool: PGPool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(db_url)
        .await?;
    info!("connected to postgresql");
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("database migrations applied");
    Ok(pool)
}

#[derive(Debug, Clone, PartialEq)]
pub enum CreateUserOutcome {
    Created(User),
    EmailTaken,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JoinOutcome {
    Joined { event_user: EventUser, balance: f64 },
    /// Event missing or cancelled at the time of the write.
    EventUnavailable,
    UserMissing,
    AlreadyJoined,
    InsufficientBalance,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LeaveOutcome {
    Left { balance: f64 },
    NotRegistered,
}

/// Persistence operations used by the services.
///
/// Every method that touches more than one row is atomic: join and leave
/// move attendance and balance together, charge is a single increment.
#[async_trait]
pub trait Store: Send + Sync {
    async fn create_user(&self, user: NewUser) -> Result<CreateUserOutcome, sqlx::Error>;
    async fn find_user(&self, id: i32) -> Result<Option<User>, sqlx::Error>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error>;
    /// Adds `amount` to the balance. `None` when the user does not exist.
    async fn credit_balance(&self, user_id: i32, amount: f64) -> Result<Option<f64>, sqlx::Error>;

    async fn create_token(&self, user_id: i32, token: &str, expires_at: DateTime<Utc>) -> Result<Token, sqlx::Error>;
    async fn find_token(&self, token: &str) -> Result<Option<Token>, sqlx::Error>;

    async fn create_event(&self, event: NewEvent) -> Result<Event, sqlx::Error>;
    async fn find_event(&self, id: i32) -> Result<Option<Event>, sqlx::Error>;
    async fn find_active_event(&self, id: i32) -> Result<Option<Event>, sqlx::Error>;
    async fn list_events(&self) -> Result<Vec<Event>, sqlx::Error>;
    async fn list_events_by_creator(&self, user_id: i32) -> Result<Vec<Event>, sqlx::Error>;
    /// Flips `is_cancelled`; `false` when the event was already cancelled or missing.
    async fn cancel_event(&self, id: i32) -> Result<bool, sqlx::Error>;

    async fn count_attendees(&self, event_id: i32) -> Result<i64, sqlx::Error>;
    async fn find_attendance(&self, event_id: i32, user_id: i32) -> Result<Option<EventUser>, sqlx::Error>;
    async fn list_attendance_by_user(&self, user_id: i32) -> Result<Vec<EventUser>, sqlx::Error>;
    async fn join_event(&self, event_id: i32, user_id: i32) -> Result<JoinOutcome, sqlx::Error>;
    async fn leave_event(&self, event_id: i32, user_id: i32) -> Result<LeaveOutcome, sqlx::Error>;
}

/// `Store` backed by the PostgreSQL pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PGPool,
}

impl PgStore {
    pub fn new(pool: PGPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<CreateUserOutcome, sqlx::Error> {
        user::create(user, &self.pool).await
    }

    async fn find_user(&self, id: i32) -> Result<Option<User>, sqlx::Error> {
        user::get_by_id(id, &self.pool).await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        user::get_by_email(email, &self.pool).await
    }

    async fn credit_balance(&self, user_id: i32, amount: f64) -> Result<Option<f64>, sqlx::Error> {
        user::credit_balance(user_id, amount, &self.pool).await
    }

    async fn create_token(&self, user_id: i32, token: &str, expires_at: DateTime<Utc>) -> Result<Token, sqlx::Error> {
        user::create_token(user_id, token, expires_at, &self.pool).await
    }

    async fn find_token(&self, token: &str) -> Result<Option<Token>, sqlx::Error> {
        user::get_token(token, &self.pool).await
    }

    async fn create_event(&self, event: NewEvent) -> Result<Event, sqlx::Error> {
        event::create(event, &self.pool).await
    }

    async fn find_event(&self, id: i32) -> Result<Option<Event>, sqlx::Error> {
        event::get_by_id(id, &self.pool).await
    }

    async fn find_active_event(&self, id: i32) -> Result<Option<Event>, sqlx::Error> {
        event::get_active_by_id(id, &self.pool).await
    }

    async fn list_events(&self) -> Result<Vec<Event>, sqlx::Error> {
        event::get_all(&self.pool).await
    }

    async fn list_events_by_creator(&self, user_id: i32) -> Result<Vec<Event>, sqlx::Error> {
        event::get_by_creator(user_id, &self.pool).await
    }

    async fn cancel_event(&self, id: i32) -> Result<bool, sqlx::Error> {
        event::cancel(id, &self.pool).await
    }

    async fn count_attendees(&self, event_id: i32) -> Result<i64, sqlx::Error> {
        attendance::count(event_id, &self.pool).await
    }

    async fn find_attendance(&self, event_id: i32, user_id: i32) -> Result<Option<EventUser>, sqlx::Error> {
        attendance::get(event_id, user_id, &self.pool).await
    }

    async fn list_attendance_by_user(&self, user_id: i32) -> Result<Vec<EventUser>, sqlx::Error> {
        attendance::get_by_user(user_id, &self.pool).await
    }

    async fn join_event(&self, event_id: i32, user_id: i32) -> Result<JoinOutcome, sqlx::Error> {
        attendance::join(event_id, user_id, &self.pool).await
    }

    async fn leave_event(&self, event_id: i32, user_id: i32) -> Result<LeaveOutcome, sqlx::Error> {
        attendance::leave(event_id, user_id, &self.pool).await
    }
}
