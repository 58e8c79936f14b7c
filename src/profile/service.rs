use std::sync::Arc;

use crate::clock::Clock;
use crate::profile::{
    Conflict, NotFound, Profile, ProfileError, ProfileId, ProfileInput,
    ProfileRepository, Result, StorageError, ValidProfile, ValidationError,
    validate,
};

/// Profile manager.
///
/// Holds no state of its own; cheap to clone and share between tasks.
#[derive(Clone)]
pub struct ProfileService {
    repo: Arc<dyn ProfileRepository>,
    clock: Arc<dyn Clock>,
}

impl ProfileService {
    /// Create a new [`ProfileService`].
    pub fn new(repo: Arc<dyn ProfileRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// Create a profile from validated `input`.
    ///
    /// `input.id` is ignored, a fresh id is generated.
    pub async fn create_profile(&self, input: ProfileInput) -> Result<Profile> {
        let ValidProfile { name, email } = validate(&input)?;

        if self
            .repo
            .find_by_email(&email)
            .await
            .map_err(storage_error)?
            .is_some()
        {
            return Err(email_in_use());
        }

        let profile = Profile {
            id: ProfileId::generate(),
            name,
            email,
            created_at: self.clock.now(),
            updated_at: None,
        };

        let profile = self.repo.insert(profile).await.map_err(storage_error)?;

        tracing::info!(profile_id = %profile.id, "profile created");
        metrics::counter!("profiles_created_total").increment(1);

        Ok(profile)
    }

    /// Get a profile. An unknown id is `Ok(None)`.
    pub async fn get_profile(&self, id: ProfileId) -> Result<Option<Profile>> {
        if id.is_empty() {
            return Err(ValidationError::EmptyId.into());
        }

        self.repo.find_by_id(&id).await.map_err(storage_error)
    }

    /// Replace name and email of the profile targeted by `input.id`.
    ///
    /// The uniqueness lookup only runs when the normalized email actually
    /// changes, so a profile never conflicts with itself.
    pub async fn update_profile(&self, input: ProfileInput) -> Result<Profile> {
        let ValidProfile { name, email } = validate(&input)?;

        if input.id.is_empty() {
            return Err(ValidationError::EmptyId.into());
        }

        let existing = self
            .repo
            .find_by_id(&input.id)
            .await
            .map_err(storage_error)?
            .ok_or(NotFound::Profile)?;

        if email != existing.email.to_lowercase()
            && self
                .repo
                .find_by_email(&email)
                .await
                .map_err(storage_error)?
                .is_some_and(|owner| owner.id != existing.id)
        {
            return Err(email_in_use());
        }

        let profile = Profile {
            name,
            email,
            updated_at: Some(self.clock.now()),
            ..existing
        };

        let profile = self.repo.update(profile).await.map_err(storage_error)?;

        tracing::info!(profile_id = %profile.id, "profile updated");
        metrics::counter!("profiles_updated_total").increment(1);

        Ok(profile)
    }

    /// Permanently delete a profile.
    pub async fn delete_profile(&self, id: ProfileId) -> Result<()> {
        if id.is_empty() {
            return Err(ValidationError::EmptyId.into());
        }

        if self
            .repo
            .find_by_id(&id)
            .await
            .map_err(storage_error)?
            .is_none()
        {
            return Err(NotFound::Profile.into());
        }

        self.repo.delete(&id).await.map_err(storage_error)?;

        tracing::info!(profile_id = %id, "profile deleted");
        metrics::counter!("profiles_deleted_total").increment(1);

        Ok(())
    }
}

fn email_in_use() -> ProfileError {
    metrics::counter!("profiles_conflicts_total").increment(1);
    Conflict::EmailInUse.into()
}

/// Log and classify a storage failure.
fn storage_error(err: StorageError) -> ProfileError {
    match &err {
        StorageError::Conflict => {
            tracing::warn!("email uniqueness enforced by storage after pre-check");
            metrics::counter!("profiles_conflicts_total").increment(1);
        },
        StorageError::NotFound => {
            tracing::debug!("profile vanished between lookup and write");
        },
        StorageError::Internal(source) => {
            tracing::error!(error = %source, "storage failure");
        },
    }

    err.into()
}
