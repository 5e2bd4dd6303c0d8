//! Port abstraction for user persistence adapters and their errors.

use crate::domain::user::{DisplayName, ExternalUserId, User};

/// Persistence errors raised by user repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserPersistenceError {
    /// A user row with the same external id already exists.
    ///
    /// Expected under concurrent first contact; callers resolve it by
    /// retrying the lookup.
    #[error("user with external id {external_id} already exists")]
    DuplicateExternalId { external_id: String },

    /// Repository connection could not be established.
    #[error("user repository connection failed: {message}")]
    Connection { message: String },

    /// Query or mutation failed during execution.
    #[error("user repository query failed: {message}")]
    Query { message: String },
}

impl UserPersistenceError {
    /// Create a duplicate-external-id error for the given handle.
    pub fn duplicate_external_id(external_id: impl Into<String>) -> Self {
        Self::DuplicateExternalId {
            external_id: external_id.into(),
        }
    }

    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Insert payload for first-contact user creation.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub external_id: ExternalUserId,
    pub display_name: DisplayName,
}

pub trait UserRepository: Send + Sync {
    /// Fetch a user by the stable external handle.
    fn find_by_external_id(
        &self,
        external_id: &ExternalUserId,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Insert a user created on first contact.
    ///
    /// The unique index on `external_id` is the backstop against concurrent
    /// first contact; a lost race surfaces as
    /// [`UserPersistenceError::DuplicateExternalId`].
    fn insert(&self, new_user: NewUser) -> Result<User, UserPersistenceError>;
}
