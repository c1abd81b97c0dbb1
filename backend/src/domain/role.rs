//! Roles group permissions and cosmetics under a rank.

use serde::{Deserialize, Serialize};

use super::Permissions;
use super::user::uuid_id;

/// Validation errors raised by role constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoleValidationError {
    #[error("role id must not be empty")]
    EmptyId,
    #[error("role id must be a valid UUID")]
    InvalidId,
}

uuid_id!(
    /// Role identifier.
    RoleId,
    RoleValidationError,
    RoleValidationError::EmptyId,
    RoleValidationError::InvalidId
);

/// Platform role. Higher `rank` wins when roles are merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub rank: i32,
    /// Packed RGBA name colour, if the role tints names.
    #[serde(default)]
    pub color: Option<u32>,
    #[serde(default)]
    pub permissions: Permissions,
}
