//! In-memory storage.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::profile::{
    Profile, ProfileId, ProfileRepository, StorageError, StorageResult,
};

#[derive(Debug, Default)]
struct Store {
    profiles: HashMap<ProfileId, Profile>,
    /// Case-folded email to owner.
    emails: HashMap<String, ProfileId>,
}

/// Process-local [`ProfileRepository`].
///
/// Every write holds the lock for its whole check-and-mutate step, which is
/// what makes the email index a real uniqueness constraint.
#[derive(Clone, Debug, Default)]
pub struct MemoryProfileRepository {
    store: Arc<RwLock<Store>>,
}

impl MemoryProfileRepository {
    /// Create a new, empty [`MemoryProfileRepository`].
    pub fn new() -> Self {
        Self::default()
    }
}

fn email_key(email: &str) -> String {
    email.to_lowercase()
}

#[async_trait]
impl ProfileRepository for MemoryProfileRepository {
    async fn find_by_id(&self, id: &ProfileId) -> StorageResult<Option<Profile>> {
        Ok(self.store.read().await.profiles.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StorageResult<Option<Profile>> {
        let store = self.store.read().await;

        Ok(store
            .emails
            .get(&email_key(email))
            .and_then(|id| store.profiles.get(id))
            .cloned())
    }

    async fn insert(&self, profile: Profile) -> StorageResult<Profile> {
        let mut store = self.store.write().await;
        let key = email_key(&profile.email);

        if store.emails.contains_key(&key) {
            return Err(StorageError::Conflict);
        }

        store.emails.insert(key, profile.id);
        store.profiles.insert(profile.id, profile.clone());

        Ok(profile)
    }

    async fn update(&self, profile: Profile) -> StorageResult<Profile> {
        let mut store = self.store.write().await;

        let Some(previous) = store.profiles.get(&profile.id) else {
            return Err(StorageError::NotFound);
        };
        let previous_key = email_key(&previous.email);
        let key = email_key(&profile.email);

        if store
            .emails
            .get(&key)
            .is_some_and(|owner| *owner != profile.id)
        {
            return Err(StorageError::Conflict);
        }

        store.emails.remove(&previous_key);
        store.emails.insert(key, profile.id);
        store.profiles.insert(profile.id, profile.clone());

        Ok(profile)
    }

    async fn delete(&self, id: &ProfileId) -> StorageResult<()> {
        let mut store = self.store.write().await;

        if let Some(profile) = store.profiles.remove(id) {
            store.emails.remove(&email_key(&profile.email));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn profile(email: &str) -> Profile {
        Profile {
            id: ProfileId::generate(),
            name: "John Doe".into(),
            email: email.into(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let repo = MemoryProfileRepository::new();
        let john = repo.insert(profile("john@example.com")).await.unwrap();

        assert_eq!(repo.find_by_id(&john.id).await.unwrap(), Some(john.clone()));
        assert_eq!(
            repo.find_by_email("JOHN@example.com").await.unwrap(),
            Some(john)
        );
        assert_eq!(repo.find_by_id(&ProfileId::generate()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_insert_enforces_uniqueness() {
        let repo = MemoryProfileRepository::new();
        repo.insert(profile("john@example.com")).await.unwrap();

        assert!(matches!(
            repo.insert(profile("John@Example.com")).await,
            Err(StorageError::Conflict)
        ));
    }

    #[tokio::test]
    async fn test_update() {
        let repo = MemoryProfileRepository::new();
        let mut john = repo.insert(profile("john@example.com")).await.unwrap();
        let jane = repo.insert(profile("jane@example.com")).await.unwrap();

        john.email = jane.email.clone();
        assert!(matches!(
            repo.update(john.clone()).await,
            Err(StorageError::Conflict)
        ));

        // Previous email is released once moved.
        john.email = "johnny@example.com".into();
        repo.update(john.clone()).await.unwrap();
        assert_eq!(repo.find_by_email("john@example.com").await.unwrap(), None);
        repo.insert(profile("john@example.com")).await.unwrap();

        assert!(matches!(
            repo.update(profile("ghost@example.com")).await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = MemoryProfileRepository::new();
        let john = repo.insert(profile("john@example.com")).await.unwrap();

        repo.delete(&john.id).await.unwrap();
        assert_eq!(repo.find_by_id(&john.id).await.unwrap(), None);
        assert_eq!(repo.find_by_email("john@example.com").await.unwrap(), None);

        // Deleting twice is not an error at this level.
        repo.delete(&john.id).await.unwrap();
    }
}
