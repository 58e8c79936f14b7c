use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::error::Result;
use crate::profile::{Profile, ProfileInput, ProfileService};
use crate::router::Body;

#[derive(Debug, Deserialize)]
pub struct CreateBody {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Handler to create profile.
pub async fn handler(
    State(profiles): State<ProfileService>,
    Body(body): Body<CreateBody>,
) -> Result<(StatusCode, Json<Profile>)> {
    let profile = profiles
        .create_profile(ProfileInput {
            name: body.name,
            email: body.email,
            ..Default::default()
        })
        .await?;

    Ok((StatusCode::CREATED, Json(profile)))
}
