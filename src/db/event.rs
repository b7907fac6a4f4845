use crate::{models::{Event, NewEvent}, PGPool};

pub async fn create(event: NewEvent, pool: &PGPool) -> Result<Event, sqlx::Error> {
    sqlx::query_as::<_, Event>(
        "INSERT INTO events (id_user, title, description, description_extended, date, location, image_url, price)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *",
    )
    .bind(event.id_user)
    .bind(event.title)
    .bind(event.description)
    .bind(event.description_extended)
    .bind(event.date)
    .bind(event.location)
    .bind(event.image_url)
    .bind(event.price)
    .fetch_one(pool)
    .await
}

// /events/{id}
pub async fn get_by_id(id: i32, pool: &PGPool) -> Result<Option<Event>, sqlx::Error> {
    sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn get_active_by_id(id: i32, pool: &PGPool) -> Result<Option<Event>, sqlx::Error> {
    sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1 AND is_cancelled = FALSE")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn get_all(pool: &PGPool) -> Result<Vec<Event>, sqlx::Error> {
    sqlx::query_as::<_, Event>("SELECT * FROM events ORDER BY date, id")
        .fetch_all(pool)
        .await
}

// /events/created
pub async fn get_by_creator(creator: i32, pool: &PGPool) -> Result<Vec<Event>, sqlx::Error> {
    sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id_user = $1 ORDER BY date, id")
        .bind(creator)
        .fetch_all(pool)
        .await
}

pub async fn cancel(id: i32, pool: &PGPool) -> Result<bool, sqlx::Error> {
    let res = sqlx::query("UPDATE events SET is_cancelled = TRUE WHERE id = $1 AND is_cancelled = FALSE")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected() == 1)
}
