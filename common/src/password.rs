use std::{fmt::Display, ops::Deref};

use bcrypt::{hash, verify, BcryptError, DEFAULT_COST};
use thiserror::Error;

/// The minimum length accepted for a new password.
pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Error, PartialEq)]
pub enum PasswordError {
    /// The password was shorter than [MIN_PASSWORD_LENGTH] characters.
    #[error("password must be at least {MIN_PASSWORD_LENGTH} characters long")]
    TooShort,

    /// An unexpected error occurred in the underlying hashing library.
    ///
    /// The error string should only be logged on the server, never sent to
    /// the client.
    #[error("hashing failed: {0}")]
    HashingError(String),
}

/// A bcrypt hash of a user's password.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Create a hashed password from a validated password.
    ///
    /// # Errors
    ///
    /// This function will return an error if the password could not be hashed.
    pub fn new(raw_password: RawPassword) -> Result<Self, PasswordError> {
        hash(&raw_password, DEFAULT_COST)
            .map(Self)
            .map_err(|error| PasswordError::HashingError(error.to_string()))
    }

    /// Create a new `PasswordHash` without any validation.
    ///
    /// # Safety
    ///
    /// This function should only be called on strings coming out of a trusted
    /// source such as the application's database.
    pub unsafe fn new_unchecked(raw_password_hash: String) -> Self {
        Self(raw_password_hash)
    }

    /// Check that `raw_password` matches the stored password.
    pub fn verify(&self, raw_password: &RawPassword) -> Result<bool, BcryptError> {
        verify(raw_password, self)
    }
}

impl Display for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<[u8]> for PasswordHash {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl Deref for PasswordHash {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// A password that has been validated, but not yet hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPassword(String);

impl RawPassword {
    /// Create a new password from a string.
    ///
    /// # Errors
    ///
    /// This function will return an error if the password is shorter than
    /// [MIN_PASSWORD_LENGTH] characters.
    pub fn new(raw_password_string: String) -> Result<Self, PasswordError> {
        if raw_password_string.chars().count() < MIN_PASSWORD_LENGTH {
            Err(PasswordError::TooShort)
        } else {
            Ok(Self(raw_password_string))
        }
    }

    /// Create a new `RawPassword` without any validation.
    ///
    /// # Safety
    ///
    /// This function should only be called on strings coming out of a trusted
    /// source, or for tests where costly validation is unnecessary.
    pub unsafe fn new_unchecked(raw_password_string: String) -> Self {
        Self(raw_password_string)
    }
}

impl AsRef<str> for RawPassword {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<[u8]> for RawPassword {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}


#[cfg(test)]
mod raw_password_tests {
    use super::{PasswordError, RawPassword};

    #[test]
    fn new_fails_on_empty() {
        let result = RawPassword::new("".to_string());

        assert_eq!(result, Err(PasswordError::TooShort));
    }

    #[test]
    fn new_fails_on_seven_characters() {
        let result = RawPassword::new("test123".to_string());

        assert_eq!(result, Err(PasswordError::TooShort));
    }

    #[test]
    fn new_succeeds_on_eight_characters() {
        let result = RawPassword::new("testpass".to_string());

        assert!(result.is_ok());
    }
}
