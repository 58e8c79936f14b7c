//! Profiles-related HTTP API.
mod create;
mod delete;
mod get;
mod update;

use axum::Router;
use axum::extract::FromRef;
use axum::routing::{get, post};

use crate::AppState;
use crate::profile::ProfileService;

impl FromRef<AppState> for ProfileService {
    fn from_ref(state: &AppState) -> ProfileService {
        state.profiles.clone()
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        // `POST /profiles` goes to `create`.
        .route("/", post(create::handler))
        // `GET`, `PUT` and `DELETE /profiles/:ID`.
        .route(
            "/{profile_id}",
            get(get::handler).put(update::handler).delete(delete::handler),
        )
}
