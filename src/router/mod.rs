//! HTTP API.
pub mod profiles;
pub mod status;

use axum::Json;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::ServerError;
use crate::profile::ProfileId;

/// JSON body whose rejection is reported as a [`ServerError`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Body<T>(pub T);

impl<T, S> FromRequest<S> for Body<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// `{profile_id}` path segment.
#[derive(Debug, Clone, Copy)]
pub struct ProfilePath(pub ProfileId);

impl<S> FromRequestParts<S> for ProfilePath
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<Uuid>::from_request_parts(parts, state).await?;
        Ok(Self(id.into()))
    }
}

/// In-memory state for handler tests.
#[cfg(test)]
pub fn state() -> crate::AppState {
    use std::sync::Arc;

    use crate::clock::SystemClock;
    use crate::profile::{MemoryProfileRepository, ProfileService};

    crate::AppState {
        config: Arc::new(crate::config::Configuration::default()),
        profiles: ProfileService::new(
            Arc::new(MemoryProfileRepository::new()),
            Arc::new(SystemClock),
        ),
        metrics: None,
    }
}
