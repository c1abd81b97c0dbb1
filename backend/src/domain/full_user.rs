//! A user with roles, permissions and visible cosmetics resolved.

use serde::{Deserialize, Serialize};

use super::{
    ActiveBans, BadgeId, CalculatedEntitlements, PaintId, Permissions, Role, User, UserPermission,
};

/// Rank reported for users without any role.
pub const NO_ROLE_RANK: i32 = -1;

/// Resolved view of a user.
///
/// `active_badge_id` and `active_paint_id` are only set when the user both
/// owns the cosmetic and holds the permission to wear it, so a selection
/// that lapsed (expired event, revoked role) is hidden without touching the
/// stored style. Active bans are applied over the role permissions before
/// cosmetics are resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullUser {
    pub user: User,
    /// Granted roles, lowest rank first.
    pub roles: Vec<Role>,
    pub permissions: Permissions,
    pub highest_role_rank: i32,
    pub highest_role_color: Option<u32>,
    pub active_badge_id: Option<BadgeId>,
    pub active_paint_id: Option<PaintId>,
    pub entitlements: CalculatedEntitlements,
    /// Whether any ban was in force when the profile was resolved.
    pub banned: bool,
}

impl FullUser {
    /// Resolve `user` against its calculated entitlements, the granted
    /// `roles` and its active `bans`. Roles not present in `entitlements` are
    /// ignored.
    pub fn assemble(
        user: User,
        entitlements: CalculatedEntitlements,
        roles: Vec<Role>,
        bans: Option<&ActiveBans>,
    ) -> Self {
        let mut roles: Vec<Role> = roles
            .into_iter()
            .filter(|role| entitlements.role_ids().any(|id| id == &role.id))
            .collect();
        roles.sort_by_key(|role| role.rank);

        let mut permissions = roles.iter().fold(Permissions::default(), |mut acc, role| {
            acc.merge(&role.permissions);
            acc
        });
        if let Some(bans) = bans {
            permissions.merge(&bans.permissions());
        }
        let highest_role_rank = roles.last().map_or(NO_ROLE_RANK, |role| role.rank);
        let highest_role_color = roles.iter().rev().find_map(|role| role.color);

        let active_badge_id = user.style.active_badge_id.clone().filter(|badge| {
            permissions.has(UserPermission::USE_BADGE) && entitlements.has_badge(badge)
        });
        let active_paint_id = user.style.active_paint_id.clone().filter(|paint| {
            permissions.has(UserPermission::USE_PAINT) && entitlements.has_paint(paint)
        });

        Self {
            user,
            roles,
            permissions,
            highest_role_rank,
            highest_role_color,
            active_badge_id,
            active_paint_id,
            entitlements,
            banned: bans.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::{
        DisplayName, EntitlementNode, Grant, RoleId, UserBan, UserBanId, UserId, UserStyle,
        Username,
    };

    struct Scenario {
        user: User,
        badge: BadgeId,
        paint: PaintId,
    }

    #[fixture]
    fn scenario() -> Scenario {
        let badge = BadgeId::random();
        let paint = PaintId::random();
        let user = User {
            id: UserId::random(),
            username: Username::new("ada").expect("valid username"),
            display_name: DisplayName::new("Ada").expect("valid display name"),
            style: UserStyle {
                active_badge_id: Some(badge.clone()),
                active_paint_id: Some(paint.clone()),
            },
            created_at: Utc::now(),
        };
        Scenario { user, badge, paint }
    }

    fn role(rank: i32, color: Option<u32>, permissions: Permissions) -> Role {
        Role {
            id: RoleId::random(),
            name: format!("rank {rank}"),
            rank,
            color,
            permissions,
        }
    }

    fn grant<T>(id: T) -> Grant<T> {
        Grant {
            id,
            via: EntitlementNode::GlobalDefaultEntitlementGroup,
            managed_by: None,
        }
    }

    fn entitled(
        roles: &[Role],
        badge: Option<&BadgeId>,
        paint: Option<&PaintId>,
    ) -> CalculatedEntitlements {
        CalculatedEntitlements {
            roles: roles.iter().map(|r| grant(r.id.clone())).collect(),
            badges: badge.into_iter().cloned().map(grant).collect(),
            paints: paint.into_iter().cloned().map(grant).collect(),
            ..CalculatedEntitlements::default()
        }
    }

    fn cosmetics_allowed() -> Permissions {
        let mut permissions = Permissions::default();
        permissions
            .user
            .allow(UserPermission::USE_BADGE | UserPermission::USE_PAINT);
        permissions
    }

    #[rstest]
    fn roles_merge_in_rank_order(scenario: Scenario) {
        let mut deny_paint = Permissions::default();
        deny_paint.user.deny(UserPermission::USE_PAINT);
        let staff = role(10, Some(0xff0000ff), cosmetics_allowed());
        let muted = role(1, Some(0x00ff00ff), deny_paint);
        let roles = vec![staff.clone(), muted.clone()];
        let entitlements = entitled(&roles, Some(&scenario.badge), Some(&scenario.paint));

        let full = FullUser::assemble(scenario.user, entitlements, roles, None);

        assert_eq!(full.roles.first().map(|r| r.rank), Some(1));
        assert!(full.permissions.has(UserPermission::USE_PAINT));
        assert_eq!(full.highest_role_rank, 10);
        assert_eq!(full.highest_role_color, Some(0xff0000ff));
        assert_eq!(full.active_paint_id, Some(scenario.paint));
    }

    #[rstest]
    fn colour_falls_back_to_the_highest_coloured_role(scenario: Scenario) {
        let roles = vec![
            role(5, Some(0x123456ff), Permissions::default()),
            role(9, None, Permissions::default()),
        ];
        let entitlements = entitled(&roles, None, None);

        let full = FullUser::assemble(scenario.user, entitlements, roles, None);

        assert_eq!(full.highest_role_rank, 9);
        assert_eq!(full.highest_role_color, Some(0x123456ff));
    }

    #[rstest]
    fn cosmetics_need_both_entitlement_and_permission(scenario: Scenario) {
        let roles = vec![role(1, None, cosmetics_allowed())];
        let entitlements = entitled(&roles, Some(&scenario.badge), None);

        let full = FullUser::assemble(scenario.user, entitlements, roles, None);

        assert_eq!(full.active_badge_id, Some(scenario.badge));
        assert_eq!(full.active_paint_id, None);
    }

    #[rstest]
    fn cosmetics_are_hidden_without_permission(scenario: Scenario) {
        let entitlements = entitled(&[], Some(&scenario.badge), Some(&scenario.paint));

        let full = FullUser::assemble(scenario.user, entitlements, vec![], None);

        assert_eq!(full.highest_role_rank, NO_ROLE_RANK);
        assert!(full.active_badge_id.is_none());
        assert!(full.active_paint_id.is_none());
    }

    #[rstest]
    fn roles_missing_from_entitlements_are_ignored(scenario: Scenario) {
        let stray = role(100, Some(1), cosmetics_allowed());

        let full =
            FullUser::assemble(scenario.user, CalculatedEntitlements::default(), vec![stray], None);

        assert!(full.roles.is_empty());
        assert_eq!(full.highest_role_color, None);
    }

    #[rstest]
    fn active_bans_override_role_permissions(scenario: Scenario) {
        let roles = vec![role(1, None, cosmetics_allowed())];
        let entitlements = entitled(&roles, Some(&scenario.badge), Some(&scenario.paint));
        let mut overrides = Permissions::default();
        overrides.user.deny(UserPermission::USE_PAINT);
        let now = Utc::now();
        let ban = UserBan {
            id: UserBanId::random(),
            user_id: scenario.user.id.clone(),
            created_by: None,
            reason: "paint abuse".to_owned(),
            permissions: overrides,
            created_at: now,
            expires_at: None,
        };
        let bans = ActiveBans::at([ban], now);

        let full = FullUser::assemble(scenario.user, entitlements, roles, bans.as_ref());

        assert!(full.banned);
        assert!(!full.permissions.has(UserPermission::USE_PAINT));
        assert_eq!(full.active_badge_id, Some(scenario.badge));
        assert!(full.active_paint_id.is_none());
    }
}
