//! Storage port consumed by [`crate::profile::ProfileService`].

use async_trait::async_trait;

use crate::profile::{Profile, ProfileId, StorageError};

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Port for profile persistence.
///
/// Implementations must serialize writes on a single profile and enforce
/// case-insensitive email uniqueness at write time, whatever was read
/// before.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Find a profile by its id.
    async fn find_by_id(&self, id: &ProfileId) -> StorageResult<Option<Profile>>;

    /// Find the profile owning a normalized email.
    async fn find_by_email(&self, email: &str) -> StorageResult<Option<Profile>>;

    /// Insert a new profile.
    ///
    /// Fails with [`StorageError::Conflict`] if the email is taken.
    async fn insert(&self, profile: Profile) -> StorageResult<Profile>;

    /// Replace an existing profile.
    ///
    /// Fails with [`StorageError::Conflict`] if the email is taken by
    /// another profile, [`StorageError::NotFound`] if the id is gone.
    async fn update(&self, profile: Profile) -> StorageResult<Profile>;

    /// Permanently remove a profile. No-op when absent.
    async fn delete(&self, id: &ProfileId) -> StorageResult<()>;
}
