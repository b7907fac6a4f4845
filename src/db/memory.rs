//! In-process `Store` for tests. Each operation holds the lock for its
//! whole duration, which gives the same atomicity as the SQL transactions.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{CreateUserOutcome, JoinOutcome, LeaveOutcome, Store};
use crate::models::{Event, EventUser, NewEvent, NewUser, Token, User};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    events: Vec<Event>,
    event_users: Vec<EventUser>,
    tokens: Vec<Token>,
    next_id: i32,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Overwrites a user's balance.
    pub fn set_balance(&self, user_id: i32, balance: f64) {
        if let Some(user) = self.tables().users.iter_mut().find(|u| u.id == user_id) {
            user.balance = balance;
        }
    }

    /// Inserts an event row as-is, bypassing request validation. Used to seed past events.
    pub fn insert_event(&self, event: NewEvent) -> Event {
        let mut tables = self.tables();
        let event = Event {
            id: tables.next_id(),
            id_user: event.id_user,
            title: event.title,
            description: event.description,
            description_extended: event.description_extended,
            date: event.date,
            location: event.location,
            image_url: event.image_url,
            price: event.price,
            is_cancelled: false,
        };
        tables.events.push(event.clone());
        event
    }

    pub fn attendance_rows(&self, event_id: i32, user_id: i32) -> usize {
        self.tables()
            .event_users
            .iter()
            .filter(|eu| eu.id_event == event_id && eu.id_user == user_id)
            .count()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<CreateUserOutcome, sqlx::Error> {
        let mut tables = self.tables();
        if tables.users.iter().any(|u| u.email == user.email) {
            return Ok(CreateUserOutcome::EmailTaken);
        }
        let user = User {
            id: tables.next_id(),
            name: user.name,
            full_name: user.full_name,
            email: user.email,
            password: user.password,
            dni: user.dni,
            balance: 0.0,
            is_admin: false,
        };
        tables.users.push(user.clone());
        Ok(CreateUserOutcome::Created(user))
    }

    async fn find_user(&self, id: i32) -> Result<Option<User>, sqlx::Error> {
        Ok(self.tables().users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        Ok(self.tables().users.iter().find(|u| u.email == email).cloned())
    }

    async fn credit_balance(&self, user_id: i32, amount: f64) -> Result<Option<f64>, sqlx::Error> {
        let mut tables = self.tables();
        Ok(tables.users.iter_mut().find(|u| u.id == user_id).map(|user| {
            user.balance += amount;
            user.balance
        }))
    }

    async fn create_token(&self, user_id: i32, token: &str, expires_at: DateTime<Utc>) -> Result<Token, sqlx::Error> {
        let token = Token {
            token: token.to_string(),
            user_id,
            expires_at,
        };
        self.tables().tokens.push(token.clone());
        Ok(token)
    }

    async fn find_token(&self, token: &str) -> Result<Option<Token>, sqlx::Error> {
        Ok(self.tables().tokens.iter().find(|t| t.token == token).cloned())
    }

    async fn create_event(&self, event: NewEvent) -> Result<Event, sqlx::Error> {
        Ok(self.insert_event(event))
    }

    async fn find_event(&self, id: i32) -> Result<Option<Event>, sqlx::Error> {
        Ok(self.tables().events.iter().find(|e| e.id == id).cloned())
    }

    async fn find_active_event(&self, id: i32) -> Result<Option<Event>, sqlx::Error> {
        Ok(self
            .tables()
            .events
            .iter()
            .find(|e| e.id == id && !e.is_cancelled)
            .cloned())
    }

    async fn list_events(&self) -> Result<Vec<Event>, sqlx::Error> {
        Ok(self.tables().events.clone())
    }

    async fn list_events_by_creator(&self, user_id: i32) -> Result<Vec<Event>, sqlx::Error> {
        Ok(self
            .tables()
            .events
            .iter()
            .filter(|e| e.id_user == user_id)
            .cloned()
            .collect())
    }

    async fn cancel_event(&self, id: i32) -> Result<bool, sqlx::Error> {
        let mut tables = self.tables();
        match tables.events.iter_mut().find(|e| e.id == id && !e.is_cancelled) {
            Some(event) => {
                event.is_cancelled = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count_attendees(&self, event_id: i32) -> Result<i64, sqlx::Error> {
        Ok(self
            .tables()
            .event_users
            .iter()
            .filter(|eu| eu.id_event == event_id)
            .count() as i64)
    }

    async fn find_attendance(&self, event_id: i32, user_id: i32) -> Result<Option<EventUser>, sqlx::Error> {
        Ok(self
            .tables()
            .event_users
            .iter()
            .find(|eu| eu.id_event == event_id && eu.id_user == user_id)
            .cloned())
    }

    async fn list_attendance_by_user(&self, user_id: i32) -> Result<Vec<EventUser>, sqlx::Error> {
        Ok(self
            .tables()
            .event_users
            .iter()
            .filter(|eu| eu.id_user == user_id)
            .cloned()
            .collect())
    }

    async fn join_event(&self, event_id: i32, user_id: i32) -> Result<JoinOutcome, sqlx::Error> {
        let mut tables = self.tables();
        let Some(price) = tables
            .events
            .iter()
            .find(|e| e.id == event_id && !e.is_cancelled)
            .map(|e| e.price)
        else {
            return Ok(JoinOutcome::EventUnavailable);
        };
        let Some(balance) = tables.users.iter().find(|u| u.id == user_id).map(|u| u.balance) else {
            return Ok(JoinOutcome::UserMissing);
        };
        if tables
            .event_users
            .iter()
            .any(|eu| eu.id_event == event_id && eu.id_user == user_id)
        {
            return Ok(JoinOutcome::AlreadyJoined);
        }
        if price > balance {
            return Ok(JoinOutcome::InsufficientBalance);
        }

        let event_user = EventUser {
            id: tables.next_id(),
            id_user: user_id,
            id_event: event_id,
        };
        tables.event_users.push(event_user.clone());
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(sqlx::Error::RowNotFound)?;
        user.balance -= price;
        Ok(JoinOutcome::Joined {
            event_user,
            balance: user.balance,
        })
    }

    async fn leave_event(&self, event_id: i32, user_id: i32) -> Result<LeaveOutcome, sqlx::Error> {
        let mut tables = self.tables();
        let Some(pos) = tables
            .event_users
            .iter()
            .position(|eu| eu.id_event == event_id && eu.id_user == user_id)
        else {
            return Ok(LeaveOutcome::NotRegistered);
        };
        tables.event_users.remove(pos);
        let price = tables
            .events
            .iter()
            .find(|e| e.id == event_id)
            .map(|e| e.price)
            .unwrap_or(0.0);
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(sqlx::Error::RowNotFound)?;
        user.balance += price;
        Ok(LeaveOutcome::Left { balance: user.balance })
    }
}
