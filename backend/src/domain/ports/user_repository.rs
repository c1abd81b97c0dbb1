//! Port abstraction for reading users and their purchase facts.
use async_trait::async_trait;

use crate::domain::{EntitlementFacts, User, UserBan, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query failed during execution or row conversion.
        Query { message: String } => "user repository query failed: {message}",
    }
}

/// Read access to platform users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Purchase and subscription facts used by entitlement conditions.
    ///
    /// Users without purchases yield empty facts rather than an error.
    async fn entitlement_facts(
        &self,
        id: &UserId,
    ) -> Result<EntitlementFacts, UserRepositoryError>;

    /// Every ban ever issued to the user, lapsed ones included.
    async fn bans(&self, id: &UserId) -> Result<Vec<UserBan>, UserRepositoryError>;
}
