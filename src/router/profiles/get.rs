use axum::Json;
use axum::extract::State;

use crate::error::Result;
use crate::profile::{NotFound, Profile, ProfileError, ProfileService};
use crate::router::ProfilePath;

pub async fn handler(
    State(profiles): State<ProfileService>,
    ProfilePath(id): ProfilePath,
) -> Result<Json<Profile>> {
    profiles
        .get_profile(id)
        .await?
        .map(Json)
        .ok_or_else(|| ProfileError::from(NotFound::Profile).into())
}
