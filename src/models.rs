use chrono::{DateTime, Utc};
use sqlx::prelude::FromRow;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub dni: i64,
    pub balance: f64,
    pub is_admin: bool,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Event {
    pub id: i32,
    pub id_user: i32,
    pub title: String,
    pub description: String,
    pub description_extended: Option<String>,
    pub date: DateTime<Utc>,
    pub location: String,
    pub image_url: String,
    pub price: f64,
    pub is_cancelled: bool,
}

impl Event {
    pub fn is_paid(&self) -> bool {
        self.price > 0.0
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.date < now
    }
}

/// Attendance record: one row per user attending one event.
#[derive(Debug, Clone, PartialEq, FromRow, serde::Serialize, serde::Deserialize)]
pub struct EventUser {
    pub id: i32,
    pub id_user: i32,
    pub id_event: i32,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Token {
    pub token: String,
    pub user_id: i32,
    pub expires_at: DateTime<Utc>,
}

impl Token {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Validated input for a new user row. `password` is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub dni: i64,
}

/// Validated input for a new event row.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub id_user: i32,
    pub title: String,
    pub description: String,
    pub description_extended: Option<String>,
    pub date: DateTime<Utc>,
    pub location: String,
    pub image_url: String,
    pub price: f64,
}
