use chrono::Utc;
use log::{info, warn};

use crate::db::{JoinOutcome, LeaveOutcome, Store};
use crate::dto::{
    CancelEventResponse, CreateEventRequest, EventView, JoinEventResponse, JoinedEvent, UnJoinEventResponse,
};
use crate::errors::AppError;
use crate::models::Event;

async fn with_attendees(event: Event, store: &dyn Store) -> Result<EventView, AppError> {
    let attendees = store.count_attendees(event.id).await?;
    Ok(EventView::new(event, attendees))
}

async fn with_attendees_all(events: Vec<Event>, store: &dyn Store) -> Result<Vec<EventView>, AppError> {
    let mut views = Vec::with_capacity(events.len());
    for event in events {
        views.push(with_attendees(event, store).await?);
    }
    Ok(views)
}

fn require_user_id(user_id: i32) -> Result<i32, AppError> {
    if user_id <= 0 {
        return Err(AppError::bad_request("User id is required"));
    }
    Ok(user_id)
}

fn require_event_id(event_id: i32) -> Result<i32, AppError> {
    if event_id <= 0 {
        return Err(AppError::bad_request("Event id is required"));
    }
    Ok(event_id)
}

pub async fn get_all(store: &dyn Store) -> Result<Vec<EventView>, AppError> {
    let events = store.list_events().await?;
    with_attendees_all(events, store).await
}

pub async fn get_by_id(id: i32, store: &dyn Store) -> Result<EventView, AppError> {
    let event = store
        .find_event(id)
        .await?
        .ok_or_else(|| AppError::not_found("Event not found"))?;
    with_attendees(event, store).await
}

pub async fn get_created(user_id: i32, store: &dyn Store) -> Result<Vec<EventView>, AppError> {
    let user_id = require_user_id(user_id)?;
    let events = store.list_events_by_creator(user_id).await?;
    with_attendees_all(events, store).await
}

pub async fn get_joined(user_id: i32, store: &dyn Store) -> Result<Vec<JoinedEvent>, AppError> {
    let user_id = require_user_id(user_id)?;
    let rows = store.list_attendance_by_user(user_id).await?;
    let mut joined = Vec::with_capacity(rows.len());
    for row in rows {
        // id_event is a foreign key; a miss means the row was removed outside the service
        let Some(event) = store.find_event(row.id_event).await? else {
            warn!("attendance {} points at missing event {}", row.id, row.id_event);
            continue;
        };
        joined.push(JoinedEvent {
            id: row.id,
            id_user: row.id_user,
            id_event: row.id_event,
            event: with_attendees(event, store).await?,
        });
    }
    Ok(joined)
}

pub async fn create(user_id: i32, dto: CreateEventRequest, store: &dyn Store) -> Result<EventView, AppError> {
    let new_event = dto.validate(user_id, Utc::now())?;
    let event = store.create_event(new_event).await?;
    info!("user {} created event {}", user_id, event.id);
    Ok(EventView::new(event, 0))
}

pub async fn join(event_id: i32, user_id: i32, store: &dyn Store) -> Result<JoinEventResponse, AppError> {
    let event_id = require_event_id(event_id)?;
    let event = store
        .find_active_event(event_id)
        .await?
        .ok_or_else(|| AppError::bad_request("Event not found"))?;
    if event.is_expired(Utc::now()) {
        return Err(AppError::bad_request("Cannot join expired event"));
    }
    let user = store
        .find_user(user_id)
        .await?
        .ok_or_else(|| AppError::bad_request("User not found"))?;
    if store.find_attendance(event_id, user_id).await?.is_some() {
        return Err(AppError::bad_request("User already joined event"));
    }
    if event.price > user.balance {
        return Err(AppError::bad_request("Insufficient balance to join event"));
    }

    // the checks above are repeated atomically by the store
    match store.join_event(event_id, user_id).await? {
        JoinOutcome::Joined { event_user, balance } => {
            info!("user {} joined event {}, balance now {}", user_id, event_id, balance);
            Ok(JoinEventResponse {
                success: true,
                event_user,
                new_balance: balance,
            })
        }
        JoinOutcome::EventUnavailable => Err(AppError::bad_request("Event not found")),
        JoinOutcome::UserMissing => Err(AppError::bad_request("User not found")),
        JoinOutcome::AlreadyJoined => Err(AppError::bad_request("User already joined event")),
        JoinOutcome::InsufficientBalance => Err(AppError::bad_request("Insufficient balance to join event")),
    }
}

pub async fn unjoin(event_id: i32, user_id: i32, store: &dyn Store) -> Result<UnJoinEventResponse, AppError> {
    let event_id = require_event_id(event_id)?;
    if store.find_event(event_id).await?.is_none() {
        return Err(AppError::bad_request("Event not found"));
    }
    if store.find_attendance(event_id, user_id).await?.is_none() {
        return Err(AppError::bad_request("User is not registered to this event"));
    }

    match store.leave_event(event_id, user_id).await? {
        LeaveOutcome::Left { balance } => {
            info!("user {} left event {}, balance now {}", user_id, event_id, balance);
            Ok(UnJoinEventResponse {
                success: true,
                message: "Successfully left the event".to_string(),
                new_balance: balance,
            })
        }
        LeaveOutcome::NotRegistered => Err(AppError::bad_request("User is not registered to this event")),
    }
}

/// Soft-cancels an event. Attendees are not refunded here; unjoining a
/// cancelled event still credits the price back.
pub async fn cancel(event_id: i32, user_id: i32, store: &dyn Store) -> Result<CancelEventResponse, AppError> {
    let event_id = require_event_id(event_id)?;
    let event = store
        .find_event(event_id)
        .await?
        .ok_or_else(|| AppError::bad_request("Event not found"))?;
    if event.id_user != user_id {
        warn!("user {} tried to cancel event {} owned by {}", user_id, event_id, event.id_user);
        return Err(AppError::bad_request("Only the event creator can cancel the event"));
    }
    if event.is_cancelled || !store.cancel_event(event_id).await? {
        return Err(AppError::bad_request("Event is already cancelled"));
    }
    info!("user {} cancelled event {}", user_id, event_id);
    Ok(CancelEventResponse {
        success: true,
        message: "Event cancelled successfully".to_string(),
    })
}
