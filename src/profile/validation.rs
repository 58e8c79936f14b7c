//! Field-level checks and normalization of [`ProfileInput`].

use validator::ValidateEmail;

use crate::profile::{ProfileInput, ValidationError};

pub const NAME_MIN_LENGTH: usize = 2;
pub const NAME_MAX_LENGTH: usize = 100;
pub const EMAIL_MAX_LENGTH: usize = 255;

/// Normalized fields of an accepted [`ProfileInput`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidProfile {
    pub name: String,
    pub email: String,
}

/// Check `input` and return its normalized fields.
///
/// Reports the first violation only, in this order: missing name, missing
/// email, email format, name length, email length.
pub fn validate(input: &ProfileInput) -> Result<ValidProfile, ValidationError> {
    let name = non_blank(input.name.as_deref())
        .ok_or(ValidationError::MissingName)?;
    let email = non_blank(input.email.as_deref())
        .ok_or(ValidationError::MissingEmail)?;
    let email = normalize_email(email);

    if !email.validate_email() || !has_dotted_domain(&email) {
        return Err(ValidationError::InvalidEmailFormat);
    }

    if !(NAME_MIN_LENGTH..=NAME_MAX_LENGTH).contains(&name.chars().count()) {
        return Err(ValidationError::NameLengthOutOfRange);
    }

    if email.chars().count() > EMAIL_MAX_LENGTH {
        return Err(ValidationError::EmailTooLong);
    }

    Ok(ValidProfile {
        name: name.to_owned(),
        email,
    })
}

/// Canonical form used for storage and comparison.
#[inline]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Grammar alone accepts single-label domains such as `localhost`.
fn has_dotted_domain(email: &str) -> bool {
    email
        .rsplit_once('@')
        .is_some_and(|(_, domain)| domain.contains('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, email: &str) -> ProfileInput {
        ProfileInput::new(name, email)
    }

    #[test]
    fn test_normalization() {
        let valid = validate(&input(" Bob ", " BOB@X.COM ")).unwrap();
        assert_eq!(valid.name, "Bob");
        assert_eq!(valid.email, "bob@x.com");
    }

    #[test]
    fn test_missing_fields() {
        assert_eq!(
            validate(&ProfileInput::default()),
            Err(ValidationError::MissingName)
        );
        assert_eq!(
            validate(&input("   ", "john@example.com")),
            Err(ValidationError::MissingName)
        );
        assert_eq!(
            validate(&input("John", "")),
            Err(ValidationError::MissingEmail)
        );
        assert_eq!(
            validate(&input("John", " \t ")),
            Err(ValidationError::MissingEmail)
        );
    }

    #[test]
    fn test_email_format() {
        for email in ["john", "john@", "@example.com", "john@localhost", "a@b@c.com"] {
            assert_eq!(
                validate(&input("John", email)),
                Err(ValidationError::InvalidEmailFormat),
                "{email} must be rejected"
            );
        }
        assert!(validate(&input("John", "john.doe+tag@mail.example.org")).is_ok());
    }

    #[test]
    fn test_name_length() {
        assert_eq!(
            validate(&input("A", "x@y.com")),
            Err(ValidationError::NameLengthOutOfRange)
        );
        assert_eq!(
            validate(&input(&"a".repeat(101), "x@y.com")),
            Err(ValidationError::NameLengthOutOfRange)
        );
        // Trimmed before measuring.
        assert_eq!(
            validate(&input(" A ", "x@y.com")),
            Err(ValidationError::NameLengthOutOfRange)
        );
        assert!(validate(&input("Al", "x@y.com")).is_ok());
        assert!(validate(&input(&"a".repeat(100), "x@y.com")).is_ok());
        // Characters, not bytes.
        assert!(validate(&input(&"é".repeat(100), "x@y.com")).is_ok());
    }

    #[test]
    fn test_email_length() {
        let label = |c: &str| c.repeat(60);
        let domain = format!("{}.{}.{}.eee.com", label("a"), label("b"), label("c"));
        let local = "d".repeat(64);

        let longest = format!("{local}@{domain}");
        assert_eq!(longest.len(), 255);
        assert!(validate(&input("John", &longest)).is_ok());

        let too_long = format!("{local}@{}.{domain}", label("f"));
        assert!(too_long.len() > 255);
        assert_eq!(
            validate(&input("John", &too_long)),
            Err(ValidationError::EmailTooLong)
        );
    }

    #[test]
    fn test_first_violation_wins() {
        assert_eq!(
            validate(&input("", "not-an-email")),
            Err(ValidationError::MissingName)
        );
        assert_eq!(
            validate(&input("A", "not-an-email")),
            Err(ValidationError::InvalidEmailFormat)
        );
    }
}
