//! Delete profile from storage, without retention.

use axum::extract::State;
use axum::http::StatusCode;

use crate::error::Result;
use crate::profile::ProfileService;
use crate::router::ProfilePath;

pub async fn handler(
    State(profiles): State<ProfileService>,
    ProfilePath(id): ProfilePath,
) -> Result<StatusCode> {
    profiles.delete_profile(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
