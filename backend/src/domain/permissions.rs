//! Role permissions as allow/deny bit masks per permission group.
//!
//! Roles are applied in ascending rank order with [`Permissions::merge`]; a
//! later allow clears an earlier deny for the same bit and vice versa. A
//! permission is effective when it is allowed and not denied, or when the
//! group's `ADMIN` bit is effective.

use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    /// Permissions over a user's own account.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct UserPermission: u32 {
        const ADMIN = 1 << 0;
        const LOGIN = 1 << 1;
        const INVITE_EDITORS = 1 << 2;
        const USE_CUSTOM_PROFILE_PICTURE = 1 << 3;
        const USE_PERSONAL_EMOTE_SET = 1 << 4;
        const USE_BADGE = 1 << 5;
        const USE_PAINT = 1 << 6;
        const MANAGE_ANY = 1 << 7;
        const MODERATE = 1 << 8;
        const VIEW_HIDDEN = 1 << 9;
    }
}

bitflags::bitflags! {
    /// Permissions over emotes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct EmotePermission: u32 {
        const ADMIN = 1 << 0;
        const UPLOAD = 1 << 1;
        const DELETE = 1 << 2;
        const EDIT = 1 << 3;
        const MANAGE_ANY = 1 << 4;
        const MERGE = 1 << 5;
        const VIEW_UNLISTED = 1 << 6;
    }
}

bitflags::bitflags! {
    /// Permissions over roles.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct RolePermission: u32 {
        const ADMIN = 1 << 0;
        const MANAGE = 1 << 1;
        const ASSIGN = 1 << 2;
    }
}

bitflags::bitflags! {
    /// Platform administration permissions.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct AdminPermission: u32 {
        const ADMIN = 1 << 0;
        const SUPER_ADMIN = 1 << 1;
        const BYPASS_RATE_LIMIT = 1 << 2;
    }
}

/// A bitflags group with a distinguished `ADMIN` bit.
pub trait PermissionGroup: bitflags::Flags + Copy + Default + PartialEq {
    /// Bit that grants every permission in the group.
    const ADMIN_BIT: Self;
}

impl PermissionGroup for UserPermission {
    const ADMIN_BIT: Self = Self::ADMIN;
}

impl PermissionGroup for EmotePermission {
    const ADMIN_BIT: Self = Self::ADMIN;
}

impl PermissionGroup for RolePermission {
    const ADMIN_BIT: Self = Self::ADMIN;
}

impl PermissionGroup for AdminPermission {
    const ADMIN_BIT: Self = Self::ADMIN;
}

/// Allow and deny masks for one permission group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(serialize = "T: Serialize", deserialize = "T: Deserialize<'de> + Default"))]
pub struct AllowDeny<T> {
    #[serde(default)]
    pub allow: T,
    #[serde(default)]
    pub deny: T,
}

impl<T: PermissionGroup> AllowDeny<T> {
    /// Effective permissions: allowed and not denied.
    pub fn effective(&self) -> T {
        self.allow.difference(self.deny)
    }

    /// Allow `permission`, clearing any deny for the same bits.
    pub fn allow(&mut self, permission: T) {
        self.allow.insert(permission);
        self.deny.remove(permission);
    }

    /// Deny `permission`, clearing any allow for the same bits.
    pub fn deny(&mut self, permission: T) {
        self.allow.remove(permission);
        self.deny.insert(permission);
    }

    /// Apply `other` on top of these masks.
    pub fn merge(&mut self, other: Self) {
        self.allow(other.allow);
        self.deny(other.deny);
    }

    /// Whether every bit in `permission` is effective, or the group admin bit
    /// is.
    pub fn has(&self, permission: T) -> bool {
        let effective = self.effective();
        effective.contains(T::ADMIN_BIT) || effective.contains(permission)
    }

    /// Whether neither mask has any bits set.
    pub fn is_empty(&self) -> bool {
        self.allow.is_empty() && self.deny.is_empty()
    }
}

/// A single permission check across groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    User(UserPermission),
    Emote(EmotePermission),
    Role(RolePermission),
    Admin(AdminPermission),
}

impl From<UserPermission> for Permission {
    fn from(value: UserPermission) -> Self {
        Self::User(value)
    }
}

impl From<EmotePermission> for Permission {
    fn from(value: EmotePermission) -> Self {
        Self::Emote(value)
    }
}

impl From<RolePermission> for Permission {
    fn from(value: RolePermission) -> Self {
        Self::Role(value)
    }
}

impl From<AdminPermission> for Permission {
    fn from(value: AdminPermission) -> Self {
        Self::Admin(value)
    }
}

/// Permission masks of a role, or of a user once roles are merged.
///
/// # Examples
/// ```
/// use emote_portal::domain::{Permissions, UserPermission};
///
/// let mut base = Permissions::default();
/// base.user.deny(UserPermission::USE_PAINT);
/// let mut subscriber = Permissions::default();
/// subscriber.user.allow(UserPermission::USE_PAINT);
///
/// base.merge(&subscriber);
/// assert!(base.has(UserPermission::USE_PAINT));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permissions {
    #[serde(default, skip_serializing_if = "AllowDeny::is_empty")]
    pub user: AllowDeny<UserPermission>,
    #[serde(default, skip_serializing_if = "AllowDeny::is_empty")]
    pub emote: AllowDeny<EmotePermission>,
    #[serde(default, skip_serializing_if = "AllowDeny::is_empty")]
    pub role: AllowDeny<RolePermission>,
    #[serde(default, skip_serializing_if = "AllowDeny::is_empty")]
    pub admin: AllowDeny<AdminPermission>,
}

impl Permissions {
    /// Apply `other` on top of `self`, group by group.
    pub fn merge(&mut self, other: &Self) {
        self.user.merge(other.user);
        self.emote.merge(other.emote);
        self.role.merge(other.role);
        self.admin.merge(other.admin);
    }

    /// Whether `permission` is effective. The platform `SUPER_ADMIN` bit
    /// grants everything.
    pub fn has(&self, permission: impl Into<Permission>) -> bool {
        if self
            .admin
            .effective()
            .contains(AdminPermission::SUPER_ADMIN)
        {
            return true;
        }
        match permission.into() {
            Permission::User(p) => self.user.has(p),
            Permission::Emote(p) => self.emote.has(p),
            Permission::Role(p) => self.role.has(p),
            Permission::Admin(p) => self.admin.has(p),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn allow_clears_an_earlier_deny() {
        let mut masks = AllowDeny::<UserPermission>::default();
        masks.deny(UserPermission::USE_BADGE);
        masks.allow(UserPermission::USE_BADGE);
        assert!(masks.deny.is_empty());
        assert!(masks.has(UserPermission::USE_BADGE));
    }

    #[rstest]
    fn deny_clears_an_earlier_allow() {
        let mut masks = AllowDeny::<EmotePermission>::default();
        masks.allow(EmotePermission::UPLOAD | EmotePermission::EDIT);
        masks.deny(EmotePermission::UPLOAD);
        assert!(!masks.has(EmotePermission::UPLOAD));
        assert!(masks.has(EmotePermission::EDIT));
    }

    #[rstest]
    fn group_admin_grants_the_whole_group_only() {
        let mut permissions = Permissions::default();
        permissions.emote.allow(EmotePermission::ADMIN);
        assert!(permissions.has(EmotePermission::MERGE));
        assert!(!permissions.has(UserPermission::USE_PAINT));
    }

    #[rstest]
    fn super_admin_grants_everything() {
        let mut permissions = Permissions::default();
        permissions.admin.allow(AdminPermission::SUPER_ADMIN);
        assert!(permissions.has(UserPermission::USE_PAINT));
        assert!(permissions.has(RolePermission::ASSIGN));
    }

    #[rstest]
    fn merge_applies_later_roles_on_top() {
        let mut base = Permissions::default();
        base.user.allow(UserPermission::LOGIN | UserPermission::USE_BADGE);
        let mut restricted = Permissions::default();
        restricted.user.deny(UserPermission::USE_BADGE);

        base.merge(&restricted);

        assert!(base.has(UserPermission::LOGIN));
        assert!(!base.has(UserPermission::USE_BADGE));
    }

    #[rstest]
    fn empty_groups_are_omitted_when_serialised() {
        let mut permissions = Permissions::default();
        permissions.user.allow(UserPermission::LOGIN);
        let value = serde_json::to_value(permissions).expect("serialise");
        assert_eq!(value["user"]["allow"], "LOGIN");
        assert!(value.get("emote").is_none());
        assert!(value.get("admin").is_none());
    }

    #[rstest]
    fn missing_masks_deserialise_as_empty() {
        let permissions: Permissions =
            serde_json::from_value(serde_json::json!({ "user": { "allow": "LOGIN" } }))
                .expect("deserialise");
        assert!(permissions.has(UserPermission::LOGIN));
        assert!(permissions.user.deny.is_empty());
        assert!(permissions.emote.is_empty());
    }
}
