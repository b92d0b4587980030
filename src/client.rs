use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::models::trip::{NewTrip, Trip};

pub const DEFAULT_FAILURE: &str = "Failed to update trip";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Server(String),
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error("invalid api url: {0}")]
    InvalidUrl(String),
}

/// Anything that can change a trip's start date.
///
/// `None` clears the date.
#[async_trait]
pub trait TripDateApi: Send + Sync {
    async fn update_start_date(
        &self,
        trip_id: &str,
        new_date: Option<&str>,
    ) -> Result<Trip, ClientError>;
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct StartDatePatch<'a> {
    start_date: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct HttpTripClient {
    base_url: Url,
    token: Option<String>,
    http: reqwest::Client,
}

impl HttpTripClient {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, ClientError> {
        let base_url =
            Url::parse(base_url).map_err(|err| ClientError::InvalidUrl(err.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(format!("{base_url} cannot be a base")));
        }
        Ok(Self {
            base_url,
            token,
            http: reqwest::Client::new(),
        })
    }

    pub async fn list_trips(&self) -> Result<Vec<Trip>, ClientError> {
        let res = self.request(Method::GET, &["trips"])?.send().await?;
        decode(res).await
    }

    pub async fn get_trip(&self, trip_id: &str) -> Result<Trip, ClientError> {
        let res = self
            .request(Method::GET, &["trips", trip_id])?
            .send()
            .await?;
        decode(res).await
    }

    pub async fn create_trip(&self, trip: &NewTrip) -> Result<Trip, ClientError> {
        let res = self
            .request(Method::POST, &["trips"])?
            .json(trip)
            .send()
            .await?;
        decode(res).await
    }

    /// Appends `segments` to the base path, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut endpoint = self.base_url.clone();
        endpoint
            .path_segments_mut()
            .map_err(|()| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(endpoint)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ClientError> {
        let endpoint = self.endpoint(segments)?;
        debug!(%method, %endpoint, "trip api request");
        let builder = self.http.request(method, endpoint);
        Ok(match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }
}

#[async_trait]
impl TripDateApi for HttpTripClient {
    async fn update_start_date(
        &self,
        trip_id: &str,
        new_date: Option<&str>,
    ) -> Result<Trip, ClientError> {
        let res = self
            .request(Method::PATCH, &["trips", trip_id])?
            .json(&StartDatePatch {
                start_date: new_date,
            })
            .send()
            .await?;
        decode(res).await
    }
}

async fn decode<T: DeserializeOwned>(res: Response) -> Result<T, ClientError> {
    if res.status().is_success() {
        return res.json::<T>().await.map_err(ClientError::Transport);
    }

    let status = res.status();
    let body = res
        .json::<ErrorResponse>()
        .await
        .map(|err| err.error)
        .unwrap_or_else(|_| DEFAULT_FAILURE.to_string());

    Err(match status {
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
        StatusCode::FORBIDDEN => ClientError::Forbidden,
        StatusCode::NOT_FOUND => ClientError::NotFound(body),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ClientError::Validation(body)
        }
        _ => ClientError::Server(body),
    })
}
