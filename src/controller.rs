//! Edit state for a trip's start date.
//!
//! The controller moves through `Closed -> Open -> Submitting` and back.
//! Submitting is split into [`TripDateController::begin_submit`], which hands
//! out the request to send, and [`TripDateController::finish_submit`], which
//! takes the API result and returns the updated trip on success. The host
//! swaps that trip into its own state; the controller never touches the
//! host's record.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    client::{ClientError, TripDateApi},
    dates::{format_date, is_in_past},
    models::trip::Trip,
    validation::{validate, DateError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateMode {
    /// Trip has no start date yet.
    Set,
    /// Trip already has one; clearing is allowed.
    Update,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Closed,
    Open,
    Submitting,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    #[error("date editor is not open")]
    NotOpen,
    #[error("an update is already in flight")]
    InFlight,
    #[error("no update is in flight")]
    NotSubmitting,
    #[error("trip has no start date to clear")]
    ClearUnavailable,
    #[error(transparent)]
    Invalid(#[from] DateError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct DateEditState {
    trip_id: String,
    mode: DateMode,
    draft_value: String,
    is_submitting: bool,
    error_message: Option<String>,
}

/// What to send to the API. `start_date: None` clears the date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRequest {
    pub trip_id: String,
    pub start_date: Option<String>,
}

#[derive(Debug, Default)]
pub struct TripDateController {
    state: Option<DateEditState>,
}

impl TripDateController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        match &self.state {
            None => Phase::Closed,
            Some(edit) if edit.is_submitting => Phase::Submitting,
            Some(_) => Phase::Open,
        }
    }

    pub fn mode(&self) -> Option<DateMode> {
        self.state.as_ref().map(|edit| edit.mode)
    }

    pub fn draft_value(&self) -> Option<&str> {
        self.state.as_ref().map(|edit| edit.draft_value.as_str())
    }

    pub fn error_message(&self) -> Option<&str> {
        self.state
            .as_ref()
            .and_then(|edit| edit.error_message.as_deref())
    }

    /// Opens the editor for `trip`, always reseeding from its current date.
    pub fn open(&mut self, trip: &Trip) -> Result<(), ControllerError> {
        if self.phase() == Phase::Submitting {
            return Err(ControllerError::InFlight);
        }
        let mode = if trip.has_start_date() {
            DateMode::Update
        } else {
            DateMode::Set
        };
        debug!(trip_id = %trip.id, ?mode, "opening start date editor");
        self.state = Some(DateEditState {
            trip_id: trip.id.clone(),
            mode,
            draft_value: trip.start_date.clone().unwrap_or_default(),
            is_submitting: false,
            error_message: None,
        });
        Ok(())
    }

    pub fn edit(&mut self, value: impl Into<String>) -> Result<(), ControllerError> {
        let edit = self.open_state_mut()?;
        edit.draft_value = value.into();
        edit.error_message = None;
        Ok(())
    }

    /// Live label for the current draft.
    pub fn preview(&self) -> Option<String> {
        self.state
            .as_ref()
            .map(|edit| format_date(Some(edit.draft_value.as_str())))
    }

    pub fn draft_in_past(&self) -> bool {
        self.state
            .as_ref()
            .is_some_and(|edit| is_in_past(Some(edit.draft_value.as_str())))
    }

    pub fn cancel(&mut self) -> Result<(), ControllerError> {
        self.open_state_mut()?;
        if let Some(edit) = self.state.take() {
            debug!(trip_id = %edit.trip_id, "start date edit cancelled");
        }
        Ok(())
    }

    /// Validates the draft and, if it passes, enters `Submitting`.
    pub fn begin_submit(&mut self) -> Result<UpdateRequest, ControllerError> {
        let edit = self.open_state_mut()?;
        edit.error_message = None;

        if let Err(err) = validate(&edit.draft_value) {
            debug!(trip_id = %edit.trip_id, draft = %edit.draft_value, "draft rejected");
            edit.error_message = Some(err.to_string());
            return Err(err.into());
        }

        let draft = edit.draft_value.trim();
        let start_date = (!draft.is_empty()).then(|| draft.to_string());
        edit.is_submitting = true;
        debug!(trip_id = %edit.trip_id, ?start_date, "submitting start date");
        Ok(UpdateRequest {
            trip_id: edit.trip_id.clone(),
            start_date,
        })
    }

    /// Submits an explicit clear. Only offered when the trip has a date.
    pub fn begin_clear(&mut self) -> Result<UpdateRequest, ControllerError> {
        let edit = self.open_state_mut()?;
        if edit.mode != DateMode::Update {
            return Err(ControllerError::ClearUnavailable);
        }
        edit.draft_value.clear();
        self.begin_submit()
    }

    /// Applies the API outcome. Returns the updated trip only on success.
    pub fn finish_submit(
        &mut self,
        result: Result<Trip, ClientError>,
    ) -> Result<Option<Trip>, ControllerError> {
        let edit = match self.state.as_mut() {
            Some(edit) if edit.is_submitting => edit,
            _ => return Err(ControllerError::NotSubmitting),
        };

        match result {
            Ok(trip) => {
                info!(trip_id = %trip.id, start_date = ?trip.start_date, "trip start date updated");
                self.state = None;
                Ok(Some(trip))
            }
            Err(err) => {
                warn!(trip_id = %edit.trip_id, "start date update failed: {err}");
                edit.is_submitting = false;
                edit.error_message = Some(err.to_string());
                Ok(None)
            }
        }
    }

    pub async fn submit<A>(&mut self, api: &A) -> Result<Option<Trip>, ControllerError>
    where
        A: TripDateApi + ?Sized,
    {
        let request = self.begin_submit()?;
        self.send(api, request).await
    }

    pub async fn clear<A>(&mut self, api: &A) -> Result<Option<Trip>, ControllerError>
    where
        A: TripDateApi + ?Sized,
    {
        let request = self.begin_clear()?;
        self.send(api, request).await
    }

    async fn send<A>(
        &mut self,
        api: &A,
        request: UpdateRequest,
    ) -> Result<Option<Trip>, ControllerError>
    where
        A: TripDateApi + ?Sized,
    {
        let result = api
            .update_start_date(&request.trip_id, request.start_date.as_deref())
            .await;
        self.finish_submit(result)
    }

    fn open_state_mut(&mut self) -> Result<&mut DateEditState, ControllerError> {
        match self.state.as_mut() {
            None => Err(ControllerError::NotOpen),
            Some(edit) if edit.is_submitting => Err(ControllerError::InFlight),
            Some(edit) => Ok(edit),
        }
    }
}
