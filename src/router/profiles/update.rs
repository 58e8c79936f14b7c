//! Replace profile name and email.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::Result;
use crate::profile::{
    Profile, ProfileError, ProfileId, ProfileInput, ProfileService,
    ValidationError,
};
use crate::router::{Body, ProfilePath};

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
    /// Optional, must match the path when present.
    pub id: Option<Uuid>,
    pub name: Option<String>,
    pub email: Option<String>,
}

pub async fn handler(
    State(profiles): State<ProfileService>,
    ProfilePath(id): ProfilePath,
    Body(body): Body<UpdateBody>,
) -> Result<Json<Profile>> {
    if body.id.is_some_and(|body_id| ProfileId::from(body_id) != id) {
        return Err(ProfileError::from(ValidationError::IdMismatch).into());
    }

    let profile = profiles
        .update_profile(ProfileInput {
            id,
            name: body.name,
            email: body.email,
        })
        .await?;

    Ok(Json(profile))
}
