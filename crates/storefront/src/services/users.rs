//! User registration.

use sqlx::PgPool;
use thiserror::Error;

use shopcart_core::{Email, EmailError};

use crate::db::users::UserRepository;
use crate::db::{RepositoryError, RetryPolicy, Transient};
use crate::models::{CreateUserInput, User};

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UserError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// The email is already registered.
    #[error("email already registered")]
    EmailTaken,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl Transient for UserError {
    fn is_transient(&self) -> bool {
        matches!(self, Self::Repository(e) if e.is_transient())
    }
}

/// User service.
pub struct UserService<'a> {
    users: UserRepository<'a>,
    retry: RetryPolicy,
}

impl<'a> UserService<'a> {
    /// Create a new user service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, retry: RetryPolicy) -> Self {
        Self {
            users: UserRepository::new(pool),
            retry,
        }
    }

    /// Register a user.
    ///
    /// # Errors
    ///
    /// Returns `UserError::InvalidEmail` if the email format is invalid.
    /// Returns `UserError::EmailTaken` if the email is already registered.
    pub async fn register(&self, input: CreateUserInput) -> Result<User, UserError> {
        let email = Email::parse(&input.email)?;

        let user = self
            .retry
            .run("users.register", || async {
                self.users
                    .create(&input.name, &email)
                    .await
                    .map_err(|e| match e {
                        RepositoryError::Conflict(_) => UserError::EmailTaken,
                        other => UserError::Repository(other),
                    })
            })
            .await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// List all users.
    ///
    /// # Errors
    ///
    /// Returns `UserError::Repository` if the query fails.
    pub async fn list(&self) -> Result<Vec<User>, UserError> {
        self.retry
            .run("users.list", || async {
                self.users.list().await.map_err(UserError::from)
            })
            .await
    }
}
