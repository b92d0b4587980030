use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::debug;

use crate::{
    auth::BearerToken,
    error::AppError,
    models::trip::{NewTrip, Trip},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/trips", get(list_trips).post(create_trip))
        .route("/trips/:id", get(get_trip).patch(update_trip))
}

/// `start_date` missing leaves the date alone, `null` clears it.
#[derive(Debug, Deserialize)]
struct TripPatch {
    #[serde(default, with = "::serde_with::rust::double_option")]
    start_date: Option<Option<String>>,
}

async fn list_trips(State(state): State<AppState>) -> Result<Json<Vec<Trip>>, AppError> {
    Ok(Json(state.trips.list().await?))
}

async fn get_trip(
    State(state): State<AppState>,
    Path(trip_id): Path<String>,
) -> Result<Json<Trip>, AppError> {
    Ok(Json(state.trips.get(&trip_id).await?))
}

async fn create_trip(
    State(state): State<AppState>,
    token: BearerToken,
    Json(input): Json<NewTrip>,
) -> Result<(StatusCode, Json<Trip>), AppError> {
    debug!(token = token.is_present(), "create trip");
    let trip = state.trips.create(input).await?;
    Ok((StatusCode::CREATED, Json(trip)))
}

async fn update_trip(
    State(state): State<AppState>,
    Path(trip_id): Path<String>,
    token: BearerToken,
    Json(patch): Json<TripPatch>,
) -> Result<Json<Trip>, AppError> {
    debug!(%trip_id, token = token.is_present(), "update trip");
    let trip = match patch.start_date {
        Some(start_date) => {
            state
                .trips
                .update_start_date(&trip_id, start_date.as_deref())
                .await?
        }
        None => state.trips.get(&trip_id).await?,
    };
    Ok(Json(trip))
}
