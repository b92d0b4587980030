use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const DEFAULT_STATUS: &str = "planning";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Trip {
    pub id: String,
    pub title: String,
    pub destination: Option<String>,
    pub timezone: Option<String>,
    pub status: String,
    pub start_date: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Trip {
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            destination: None,
            timezone: None,
            status: DEFAULT_STATUS.into(),
            start_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_start_date(&self) -> bool {
        self.start_date
            .as_deref()
            .is_some_and(|value| !value.trim().is_empty())
    }

    pub fn destination_text(&self) -> &str {
        self.destination.as_deref().unwrap_or("somewhere")
    }
}

/// Payload for creating a trip.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTrip {
    pub title: String,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
}
