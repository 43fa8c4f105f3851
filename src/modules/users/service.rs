//! Account registration and password checks.

use bookshelf_authz::Session;
use bookshelf_db::{Database, Filters, StoreError};
use bookshelf_http::AppError;
use thiserror::Error;

use super::models::{NewUser, User};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("username already exists")]
    DuplicateUsername,

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    #[error("password hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::DuplicateUsername => AppError::conflict(vec![], "username already exists"),
            AuthError::InvalidCredentials => AppError::unauthorized("invalid username or password"),
            AuthError::Store(store) => AppError::Store(store),
            other => AppError::Internal(other.into()),
        }
    }
}

/// Validated registration input.
pub struct Registration {
    pub username: String,
    pub password: String,
    pub email: String,
    pub full_name: String,
}

pub struct AuthService<'a> {
    db: &'a Database,
    password_cost: u32,
}

impl<'a> AuthService<'a> {
    pub fn new(db: &'a Database, password_cost: u32) -> Self {
        Self { db, password_cost }
    }

    /// Create an account with a salted hash of the password.
    ///
    /// A username taken between the lookup and the insert surfaces as the
    /// unique constraint and is reported the same way.
    pub async fn register(&self, registration: Registration) -> Result<User, AuthError> {
        let existing = self
            .db
            .fetch_one::<User>(&Filters::new().eq("username", registration.username.as_str()))
            .await?;
        if existing.is_some() {
            return Err(AuthError::DuplicateUsername);
        }

        let password_hash = hash_password(registration.password, self.password_cost).await?;
        let record = NewUser {
            username: registration.username,
            password_hash,
            email: registration.email,
            full_name: registration.full_name,
        };

        match self.db.add(&record).await {
            Ok(user) => {
                tracing::info!(user_id = user.id, username = %user.username, "user registered");
                Ok(user)
            }
            Err(err) if err.is_constraint_violation() => Err(AuthError::DuplicateUsername),
            Err(err) => Err(err.into()),
        }
    }

    /// Check a username/password pair. Unknown users and wrong passwords are
    /// indistinguishable to the caller.
    pub async fn sign_in(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let user = self
            .db
            .fetch_one::<User>(&Filters::new().eq("username", username))
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password.to_string(), user.password_hash.clone()).await? {
            tracing::debug!(username, "password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }

    /// The account behind `session`, if it still exists.
    pub async fn current_user(&self, session: &Session) -> Result<Option<User>, StoreError> {
        self.db
            .fetch_one::<User>(&Filters::by_id(session.user_id))
            .await
    }
}

// bcrypt is deliberately slow; keep it off the async workers.
async fn hash_password(password: String, cost: u32) -> Result<String, AuthError> {
    Ok(tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??)
}

async fn verify_password(password: String, hash: String) -> Result<bool, AuthError> {
    Ok(tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??)
}
