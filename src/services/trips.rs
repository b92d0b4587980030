use chrono::Utc;
use tracing::info;

use crate::{
    db::DbPool,
    error::AppError,
    models::trip::{NewTrip, Trip},
    validation::normalize,
};

const TRIP_COLUMNS: &str =
    "id, title, destination, timezone, status, start_date, created_at, updated_at";

#[derive(Clone)]
pub struct TripService {
    db: DbPool,
}

impl TripService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<Trip>, AppError> {
        let trips = sqlx::query_as::<_, Trip>(&format!(
            "SELECT {TRIP_COLUMNS} FROM trips ORDER BY start_date IS NULL, start_date, created_at"
        ))
        .fetch_all(&self.db)
        .await?;
        Ok(trips)
    }

    pub async fn get(&self, trip_id: &str) -> Result<Trip, AppError> {
        sqlx::query_as::<_, Trip>(&format!("SELECT {TRIP_COLUMNS} FROM trips WHERE id = ?1"))
            .bind(trip_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn create(&self, input: NewTrip) -> Result<Trip, AppError> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(AppError::BadRequest("title must not be empty".into()));
        }

        let mut trip = Trip::new(title);
        trip.destination = normalize_optional(input.destination);
        trip.timezone = normalize_optional(input.timezone);
        trip.start_date = normalize(input.start_date.as_deref().unwrap_or_default())?;

        sqlx::query(
            r#"INSERT INTO trips (id, title, destination, timezone, status, start_date, created_at, updated_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"#,
        )
        .bind(&trip.id)
        .bind(&trip.title)
        .bind(&trip.destination)
        .bind(&trip.timezone)
        .bind(&trip.status)
        .bind(&trip.start_date)
        .bind(trip.created_at)
        .bind(trip.updated_at)
        .execute(&self.db)
        .await?;

        info!(trip_id = %trip.id, "trip created");
        Ok(trip)
    }

    /// Stores the normalised date, or NULL when `new_date` is empty or absent.
    pub async fn update_start_date(
        &self,
        trip_id: &str,
        new_date: Option<&str>,
    ) -> Result<Trip, AppError> {
        let start_date = normalize(new_date.unwrap_or_default())?;
        let result = sqlx::query("UPDATE trips SET start_date = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(&start_date)
            .bind(Utc::now())
            .bind(trip_id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }

        info!(trip_id, ?start_date, "trip start date stored");
        self.get(trip_id).await
    }
}

fn normalize_optional(input: Option<String>) -> Option<String> {
    input.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
