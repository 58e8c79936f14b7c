//! Profile entity and its management.
mod error;
mod memory;
mod postgres;
mod repository;
mod service;
mod validation;

pub use error::*;
pub use memory::*;
pub use postgres::*;
pub use repository::*;
pub use service::*;
pub use validation::*;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier of a [`Profile`].
///
/// The nil UUID is the empty sentinel and is never issued.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ProfileId(Uuid);

impl ProfileId {
    /// Generate a fresh random [`ProfileId`].
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// The empty sentinel.
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    /// Whether this is the empty sentinel.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_nil()
    }

    #[inline]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for ProfileId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Profile as persisted by a [`ProfileRepository`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: ProfileId,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Caller-supplied data for creation and update.
///
/// Fields are raw: nothing is trimmed or lowercased until [`validate`]
/// accepts them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileInput {
    /// Ignored on create, targeted profile on update.
    pub id: ProfileId,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl ProfileInput {
    /// Create a new [`ProfileInput`] without id.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: ProfileId::nil(),
            name: Some(name.into()),
            email: Some(email.into()),
        }
    }

    /// Update `id` of [`ProfileInput`].
    pub fn with_id(mut self, id: ProfileId) -> Self {
        self.id = id;
        self
    }
}
