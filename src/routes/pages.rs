use askama::Template;
use askama_axum::IntoResponse as AskamaTemplateResponse;
use axum::{extract::State, response::IntoResponse, routing::get, Router};

use crate::{
    dates::{format_date, is_in_past},
    error::AppError,
    models::trip::Trip,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(trips_page))
}

#[derive(Clone)]
struct TripRow {
    id: String,
    title: String,
    destination: String,
    status: String,
    date_label: String,
    raw_date: String,
    in_past: bool,
}

impl From<Trip> for TripRow {
    fn from(trip: Trip) -> Self {
        Self {
            date_label: format_date(trip.start_date.as_deref()),
            in_past: is_in_past(trip.start_date.as_deref()),
            destination: trip.destination_text().to_string(),
            raw_date: trip.start_date.unwrap_or_default(),
            id: trip.id,
            title: trip.title,
            status: trip.status,
        }
    }
}

#[derive(Template)]
#[template(path = "trips.html")]
struct TripsTemplate {
    trips: Vec<TripRow>,
}

async fn trips_page(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let trips = state
        .trips
        .list()
        .await?
        .into_iter()
        .map(TripRow::from)
        .collect();
    Ok(AskamaTemplateResponse::into_response(TripsTemplate {
        trips,
    }))
}
