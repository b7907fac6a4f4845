use crate::{db::{JoinOutcome, LeaveOutcome}, models::EventUser, PGPool};

pub async fn count(event_id: i32, pool: &PGPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM event_users WHERE id_event = $1")
        .bind(event_id)
        .fetch_one(pool)
        .await
}

pub async fn get(event_id: i32, user_id: i32, pool: &PGPool) -> Result<Option<EventUser>, sqlx::Error> {
    sqlx::query_as::<_, EventUser>(
        "SELECT id, id_user, id_event FROM event_users WHERE id_event = $1 AND id_user = $2",
    )
    .bind(event_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

// /events/joined
pub async fn get_by_user(user_id: i32, pool: &PGPool) -> Result<Vec<EventUser>, sqlx::Error> {
    sqlx::query_as::<_, EventUser>("SELECT id, id_user, id_event FROM event_users WHERE id_user = $1 ORDER BY id")
        .bind(user_id)
        .fetch_all(pool)
        .await
}

/// Inserts the attendance row and debits the event price in one transaction.
///
/// The event row is share-locked so a concurrent cancel waits, and the user
/// row is locked for update so concurrent debits and charges serialize.
/// A duplicate attendance row is reported before an insufficient balance.
pub async fn join(event_id: i32, user_id: i32, pool: &PGPool) -> Result<JoinOutcome, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let price = sqlx::query_scalar::<_, f64>(
        "SELECT price FROM events WHERE id = $1 AND is_cancelled = FALSE FOR SHARE",
    )
    .bind(event_id)
    .fetch_optional(&mut *tx)
    .await?;
    let Some(price) = price else {
        tx.rollback().await?;
        return Ok(JoinOutcome::EventUnavailable);
    };

    let balance = sqlx::query_scalar::<_, f64>("SELECT balance FROM users WHERE id = $1 FOR UPDATE")
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;
    let Some(balance) = balance else {
        tx.rollback().await?;
        return Ok(JoinOutcome::UserMissing);
    };
    let event_user = sqlx::query_as::<_, EventUser>(
        "INSERT INTO event_users (id_user, id_event) VALUES ($1, $2)
        ON CONFLICT (id_user, id_event) DO NOTHING
        RETURNING id, id_user, id_event",
    )
    .bind(user_id)
    .bind(event_id)
    .fetch_optional(&mut *tx)
    .await?;
    let Some(event_user) = event_user else {
        tx.rollback().await?;
        return Ok(JoinOutcome::AlreadyJoined);
    };

    if price > balance {
        tx.rollback().await?;
        return Ok(JoinOutcome::InsufficientBalance);
    }

    let balance = sqlx::query_scalar::<_, f64>(
        "UPDATE users SET balance = balance - $1 WHERE id = $2 RETURNING balance",
    )
    .bind(price)
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(JoinOutcome::Joined { event_user, balance })
}

/// Deletes the attendance row and credits the event price back in one transaction.
pub async fn leave(event_id: i32, user_id: i32, pool: &PGPool) -> Result<LeaveOutcome, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let deleted = sqlx::query_scalar::<_, i32>(
        "DELETE FROM event_users WHERE id_event = $1 AND id_user = $2 RETURNING id",
    )
    .bind(event_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;
    if deleted.is_none() {
        tx.rollback().await?;
        return Ok(LeaveOutcome::NotRegistered);
    }

    let balance = sqlx::query_scalar::<_, f64>(
        "UPDATE users SET balance = balance + (SELECT price FROM events WHERE id = $1)
        WHERE id = $2 RETURNING balance",
    )
    .bind(event_id)
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(LeaveOutcome::Left { balance })
}
