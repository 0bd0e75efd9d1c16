//! User accounts and password hashing.
//!
//! Passwords are hashed with Argon2id (PHC string format) and stored in the
//! `passwordHash` field, which is never read back into a [`User`].

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use medtour_storage::DynStorage;
use serde_json::Value;

use crate::error::{CoreError, Result};
use crate::models::{NewUser, User};
use crate::record::Record;
use crate::repository::Repository;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Hash a password with Argon2id and a random salt.
///
/// # Example
///
/// ```
/// use medtour_core::users::{hash_password, verify_password};
///
/// let hash = hash_password("correct horse").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// assert!(verify_password("correct horse", &hash).unwrap());
/// ```
pub fn hash_password(password: &str) -> std::result::Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a stored Argon2 hash.
///
/// `Ok(false)` on mismatch; `Err` only if the hash is malformed.
pub fn verify_password(
    password: &str,
    hash: &str,
) -> std::result::Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    let result = Argon2::default().verify_password(password.as_bytes(), &parsed_hash);
    Ok(result.is_ok())
}

/// User operations that need more than generic CRUD.
#[derive(Clone)]
pub struct UserService {
    repo: Repository<User>,
}

impl UserService {
    pub fn new(storage: DynStorage) -> Self {
        Self {
            repo: Repository::new(storage),
        }
    }

    pub fn repository(&self) -> &Repository<User> {
        &self.repo
    }

    /// Creates a user from a raw request body. Any client `_id` is ignored.
    pub async fn create_from_value(&self, body: Value) -> Result<User> {
        if !body.is_object() {
            return Err(CoreError::validation("request body must be a JSON object"));
        }
        let new_user: NewUser = serde_json::from_value(body)?;
        self.create(new_user).await
    }

    /// Validates the profile and password, then stores the user with a hashed password.
    pub async fn create(&self, new_user: NewUser) -> Result<User> {
        let NewUser { user, password } = new_user;
        user.validate_profile(&password)?;

        // Argon2 is CPU-bound; hash on the blocking pool
        let hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| CoreError::internal(format!("password hashing task failed: {e}")))?
            .map_err(|e| CoreError::internal(format!("password hashing failed: {e}")))?;

        self.repo
            .create_with(user, |doc| {
                doc.insert("passwordHash".to_string(), Value::String(hash));
            })
            .await
    }
}

impl User {
    fn validate_profile(&self, password: &str) -> Result<()> {
        let mut errors = match self.validate() {
            Ok(()) => Vec::new(),
            Err(CoreError::Validation(errors)) => errors,
            Err(other) => return Err(other),
        };
        if password.chars().count() < MIN_PASSWORD_LEN {
            errors.push(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            ));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Validation(errors))
        }
    }
}
