use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{Event, EventUser, NewEvent, User};

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[\w.-]+@([\w-]+\.)+[\w-]{2,4}$").unwrap();
}

/// Returns the trimmed value when present and non-empty.
fn required(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CreateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub description_extended: Option<String>,
    pub date: Option<String>,
    pub location: Option<String>,
    pub image_url: Option<String>,
    pub price: Option<f64>,
}

impl CreateEventRequest {
    /// Checks every field in a fixed order; the first failure is returned.
    pub fn validate(self, id_user: i32, now: DateTime<Utc>) -> Result<NewEvent, AppError> {
        let title = required(self.title).ok_or_else(|| AppError::bad_request("Title is required"))?;
        let description =
            required(self.description).ok_or_else(|| AppError::bad_request("Description is required"))?;
        let date = required(self.date).ok_or_else(|| AppError::bad_request("Date is required"))?;
        let location = required(self.location).ok_or_else(|| AppError::bad_request("Location is required"))?;
        let image_url = required(self.image_url).ok_or_else(|| AppError::bad_request("Image url is required"))?;
        let price = self.price.ok_or_else(|| AppError::bad_request("Price is required"))?;

        let date = DateTime::parse_from_rfc3339(&date)
            .map(|d| d.with_timezone(&Utc))
            .map_err(|_| AppError::bad_request("Invalid date"))?;
        if date <= now {
            return Err(AppError::bad_request("Event date must be in the future"));
        }
        if !price.is_finite() {
            return Err(AppError::bad_request("Price is required"));
        }
        if price < 0.0 {
            return Err(AppError::bad_request("Price cannot be negative"));
        }

        Ok(NewEvent {
            id_user,
            title,
            description,
            description_extended: required(self.description_extended),
            date,
            location,
            image_url,
            price,
        })
    }
}

/// Body shared by join, unjoin and cancel.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct EventIdRequest {
    #[serde(rename = "eventId")]
    pub event_id: Option<i32>,
}

impl EventIdRequest {
    pub fn event_id(&self) -> Result<i32, AppError> {
        match self.event_id {
            Some(id) if id > 0 => Ok(id),
            _ => Err(AppError::bad_request("Event id is required")),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ChargeBalanceRequest {
    pub amount: Option<f64>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "DNI")]
    pub dni: Option<i64>,
    pub password: Option<String>,
}

/// Register input after field checks. The password is still plain text.
#[derive(Debug, Clone)]
pub struct ValidRegistration {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub dni: i64,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(self) -> Result<ValidRegistration, AppError> {
        let missing = || AppError::bad_request("Missing required fields");
        let email = required(self.email).ok_or_else(missing)?;
        let password = self.password.filter(|p| !p.is_empty()).ok_or_else(missing)?;
        let username = required(self.username).ok_or_else(missing)?;
        let full_name = required(self.full_name).ok_or_else(missing)?;
        let dni = self.dni.filter(|d| *d != 0).ok_or_else(missing)?;

        if dni < 0 {
            return Err(AppError::bad_request("Invalid DNI"));
        }
        if !EMAIL_RE.is_match(&email) {
            return Err(AppError::bad_request("Invalid email"));
        }

        Ok(ValidRegistration {
            username,
            full_name,
            email,
            dni,
            password,
        })
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Event as returned to clients, with the computed projections.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EventView {
    pub id: i32,
    pub id_user: i32,
    pub title: String,
    pub description: String,
    pub description_extended: Option<String>,
    pub date: DateTime<Utc>,
    pub location: String,
    pub image_url: String,
    pub price: f64,
    pub is_paid: bool,
    pub is_cancelled: bool,
    pub attendees: i64,
}

impl EventView {
    pub fn new(event: Event, attendees: i64) -> Self {
        let is_paid = event.is_paid();
        Self {
            id: event.id,
            id_user: event.id_user,
            title: event.title,
            description: event.description,
            description_extended: event.description_extended,
            date: event.date,
            location: event.location,
            image_url: event.image_url,
            price: event.price,
            is_paid,
            is_cancelled: event.is_cancelled,
            attendees,
        }
    }
}

/// Attendance row expanded with the event it points to.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct JoinedEvent {
    pub id: i32,
    pub id_user: i32,
    pub id_event: i32,
    pub event: EventView,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UserView {
    pub id: i32,
    pub name: String,
    pub full_name: String,
    pub email: String,
    pub dni: i64,
    pub balance: f64,
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            full_name: user.full_name,
            email: user.email,
            dni: user.dni,
            balance: user.balance,
            is_admin: user.is_admin,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AuthResponse {
    pub success: bool,
    pub user: UserView,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JoinEventResponse {
    pub success: bool,
    pub event_user: EventUser,
    pub new_balance: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UnJoinEventResponse {
    pub success: bool,
    pub message: String,
    pub new_balance: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CancelEventResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChargeBalanceResponse {
    pub success: bool,
    pub new_balance: f64,
}
