//! Role checks gating kiosk, staff, report and configuration access.
//!
//! `None` is the anonymous user and is denied everything.

use crate::errors::{AppError, AppResult};
use crate::models::user::{ROLE_ADMIN, ROLE_GREETER, ROLE_PASTOR, User};

fn has_group(user: Option<&User>, groups: &[&str]) -> bool {
    match user {
        Some(u) if u.is_active => u.is_superuser || u.in_any_group(groups),
        _ => false,
    }
}

pub fn can_access_kiosk(user: Option<&User>) -> bool {
    has_group(user, &[ROLE_GREETER, ROLE_ADMIN])
}

pub fn can_access_admin_site(user: Option<&User>) -> bool {
    match user {
        Some(u) if u.is_active && u.is_staff => has_group(user, &[ROLE_ADMIN, ROLE_PASTOR]),
        _ => false,
    }
}

pub fn can_access_staff_views(user: Option<&User>) -> bool {
    can_access_admin_site(user)
}

pub fn can_view_confidential_notes(user: Option<&User>) -> bool {
    has_group(user, &[ROLE_PASTOR])
}

pub fn can_manage_configuration(user: Option<&User>) -> bool {
    has_group(user, &[ROLE_ADMIN])
}

pub fn can_print_labels(user: Option<&User>) -> bool {
    can_access_kiosk(user) || can_access_staff_views(user)
}

pub fn is_active_staff(user: Option<&User>) -> bool {
    matches!(user, Some(u) if u.is_active && u.is_staff)
}

/// Reports only need an active staff account.
pub fn can_view_reports(user: Option<&User>) -> bool {
    is_active_staff(user)
}

/// Turn a failed check into `PermissionDenied`.
pub fn require(allowed: bool, what: &str) -> AppResult<()> {
    if allowed {
        Ok(())
    } else {
        Err(AppError::PermissionDenied(what.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(groups: &[&str], staff: bool, superuser: bool) -> User {
        User {
            id: 1,
            username: "u".into(),
            is_staff: staff,
            is_superuser: superuser,
            is_active: true,
            groups: groups.iter().map(|g| g.to_string()).collect(),
        }
    }

    #[test]
    fn anonymous_is_denied_everything() {
        assert!(!can_access_kiosk(None));
        assert!(!can_access_admin_site(None));
        assert!(!can_print_labels(None));
        assert!(!can_view_reports(None));
    }

    #[test]
    fn greeter_gets_kiosk_only() {
        let g = user(&[ROLE_GREETER], false, false);
        assert!(can_access_kiosk(Some(&g)));
        assert!(can_print_labels(Some(&g)));
        assert!(!can_access_admin_site(Some(&g)));
        assert!(!can_manage_configuration(Some(&g)));
        assert!(!can_view_confidential_notes(Some(&g)));
    }

    #[test]
    fn admin_site_needs_staff_flag() {
        let pastor = user(&[ROLE_PASTOR], false, false);
        assert!(!can_access_admin_site(Some(&pastor)));
        assert!(can_view_confidential_notes(Some(&pastor)));

        let staff_pastor = user(&[ROLE_PASTOR], true, false);
        assert!(can_access_staff_views(Some(&staff_pastor)));
        assert!(!can_manage_configuration(Some(&staff_pastor)));
    }

    #[test]
    fn superuser_passes_group_checks_but_not_inactive() {
        let mut root = user(&[], true, true);
        assert!(can_manage_configuration(Some(&root)));
        assert!(can_view_confidential_notes(Some(&root)));
        root.is_active = false;
        assert!(!can_manage_configuration(Some(&root)));
        assert!(!can_access_admin_site(Some(&root)));
    }
}
