//! Port for reading the entitlement graph.

use async_trait::async_trait;

use crate::domain::{EntitlementGraph, EntitlementNode};

use super::define_port_error;

define_port_error! {
    /// Errors raised when reading entitlement edges.
    pub enum EntitlementRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "entitlement repository connection failed: {message}",
        /// Query failed during execution or row conversion.
        Query { message: String } =>
            "entitlement repository query failed: {message}",
    }
}

/// Read access to entitlement edges.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntitlementRepository: Send + Sync {
    /// Every edge reachable from `roots`, indexed for traversal.
    ///
    /// Adapters may return a superset, including the whole graph.
    async fn graph_from(
        &self,
        roots: &[EntitlementNode],
    ) -> Result<EntitlementGraph, EntitlementRepositoryError>;
}
