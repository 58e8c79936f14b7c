//! Typed failures of profile management.

pub type Result<T> = std::result::Result<T, ProfileError>;

/// Malformed caller input. Never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name is required")]
    MissingName,
    #[error("email is required")]
    MissingEmail,
    #[error("invalid email formatting")]
    InvalidEmailFormat,
    #[error("name must be between 2 and 100 characters length")]
    NameLengthOutOfRange,
    #[error("email must not exceed 255 characters")]
    EmailTooLong,
    #[error("id must not be empty")]
    EmptyId,
    #[error("id does not match the targeted profile")]
    IdMismatch,
}

impl ValidationError {
    /// Input field the error relates to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingName | Self::NameLengthOutOfRange => "name",
            Self::MissingEmail | Self::InvalidEmailFormat | Self::EmailTooLong => {
                "email"
            },
            Self::EmptyId | Self::IdMismatch => "id",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Conflict {
    #[error("email address is already in use")]
    EmailInUse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NotFound {
    #[error("profile not found")]
    Profile,
}

/// Failures reported by a [`crate::profile::ProfileRepository`].
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("email uniqueness constraint violated")]
    Conflict,
    #[error("record does not exist")]
    NotFound,
    #[error("storage failure")]
    Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StorageError {
    pub fn internal<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Internal(Box::new(err))
    }
}

/// Enum representing every outcome a caller of
/// [`crate::profile::ProfileService`] must handle.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Conflict(#[from] Conflict),
    #[error(transparent)]
    NotFound(#[from] NotFound),

    /// Opaque: the source is kept for logs only.
    #[error("internal storage failure")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<StorageError> for ProfileError {
    fn from(err: StorageError) -> Self {
        match err {
            // Email is the only uniqueness constraint of the store.
            StorageError::Conflict => Self::Conflict(Conflict::EmailInUse),
            StorageError::NotFound => Self::NotFound(NotFound::Profile),
            StorageError::Internal(source) => Self::Storage(source),
        }
    }
}
