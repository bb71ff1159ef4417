//! Route table and role-based redirects

use crate::context::SessionState;
use medibook_core::types::Role;

pub const LOGIN_ROUTE: &str = "/auth/login";
pub const SIGNUP_ROUTE: &str = "/auth/signup";

/// Reachable without a session, sub-paths included
pub const PUBLIC_ROUTES: &[&str] = &[
    "/",
    LOGIN_ROUTE,
    SIGNUP_ROUTE,
    "/doctors",
    "/about",
    "/contact",
];

/// Entry points that send a signed-in user to their own home
const SHARED_ENTRIES: &[&str] = &["/", "/dashboard"];

/// Landing page of a role
pub const fn home_for(role: Role) -> &'static str {
    match role {
        Role::Patient => "/patient/dashboard",
        Role::Doctor => "/doctor/dashboard",
        Role::Admin => "/admin/dashboard",
    }
}

const fn area_of(role: Role) -> &'static str {
    match role {
        Role::Patient => "/patient",
        Role::Doctor => "/doctor",
        Role::Admin => "/admin",
    }
}

/// Whether `path` is `prefix` itself or one of its sub-paths.
///
/// Matching is per segment, so `/doctors` is not inside `/doctor`.
pub fn is_within(path: &str, prefix: &str) -> bool {
    let path = normalize(path);
    let prefix = normalize(prefix);
    if prefix == "/" {
        return path == "/";
    }
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

fn normalize(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}

pub fn is_public(path: &str) -> bool {
    PUBLIC_ROUTES.iter().any(|route| is_within(path, route))
}

/// The role whose area contains `path`, if any
pub fn role_area(path: &str) -> Option<Role> {
    Role::ALL
        .iter()
        .copied()
        .find(|role| is_within(path, area_of(*role)))
}

/// Where the session must go instead of `path`, if anywhere
pub fn redirect_for(state: &SessionState, path: &str) -> Option<&'static str> {
    match state {
        SessionState::Unknown => None,
        SessionState::Unauthenticated => (!is_public(path)).then_some(LOGIN_ROUTE),
        SessionState::Authenticated(user) => {
            let home = home_for(user.role);
            let normalized = normalize(path);
            if normalized == LOGIN_ROUTE
                || normalized == SIGNUP_ROUTE
                || SHARED_ENTRIES.contains(&normalized)
            {
                return Some(home);
            }
            match role_area(path) {
                Some(area) if area != user.role => Some(home),
                _ => None,
            }
        }
    }
}

/// One entry of the dashboard menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub label: &'static str,
    pub href: &'static str,
}

const fn item(label: &'static str, href: &'static str) -> NavItem {
    NavItem { label, href }
}

const BASE_NAVIGATION: [NavItem; 2] = [
    item("Dashboard", "/dashboard"),
    item("Profile", "/dashboard/profile"),
];

/// Dashboard menu for a role, base items first
pub fn navigation_for(role: Role) -> Vec<NavItem> {
    let role_items: &[NavItem] = match role {
        Role::Patient => &[
            item("My Appointments", "/dashboard/appointments"),
            item("Find Doctors", "/dashboard/doctors"),
            item("Clinics", "/dashboard/clinics"),
            item("Medical Records", "/dashboard/medical-records"),
        ],
        Role::Doctor => &[
            item("Appointments", "/dashboard/appointments"),
            item("Schedule", "/dashboard/schedule"),
            item("Patients", "/dashboard/patients"),
            item("My Clinics", "/dashboard/clinics"),
        ],
        Role::Admin => &[
            item("Users", "/dashboard/users"),
            item("Doctors", "/dashboard/doctors"),
            item("Clinics", "/dashboard/clinics"),
            item("Analytics", "/dashboard/analytics"),
        ],
    };
    BASE_NAVIGATION.iter().chain(role_items).copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use medibook_core::types::User;
    use serde_json::json;

    fn signed_in(role: &str) -> SessionState {
        let user: User = serde_json::from_value(json!({
            "_id": "u1",
            "fullName": "Salma Hany",
            "userName": "salma",
            "email": "salma@example.com",
            "role": role,
            "isActive": true
        }))
        .unwrap();
        SessionState::Authenticated(Box::new(user))
    }

    #[test]
    fn test_segment_aware_prefix() {
        assert!(is_within("/doctors", "/doctors"));
        assert!(is_within("/doctors/abc", "/doctors"));
        assert!(is_within("/doctors/", "/doctors"));
        assert!(!is_within("/doctors", "/doctor"));
        assert!(!is_within("/doctorate", "/doctor"));
        assert!(is_within("/doctor/dashboard?tab=1", "/doctor"));
    }

    #[test]
    fn test_root_only_matches_itself() {
        assert!(is_public("/"));
        assert!(is_public(""));
        assert!(!is_public("/patient/dashboard"));
        assert!(is_public("/doctors/d1"));
        assert!(is_public("/auth/login"));
    }

    #[test]
    fn test_unknown_never_redirects() {
        assert_eq!(redirect_for(&SessionState::Unknown, "/patient/dashboard"), None);
        assert_eq!(redirect_for(&SessionState::Unknown, "/auth/login"), None);
    }

    #[test]
    fn test_unauthenticated_redirects() {
        let state = SessionState::Unauthenticated;
        assert_eq!(redirect_for(&state, "/dashboard"), Some(LOGIN_ROUTE));
        assert_eq!(redirect_for(&state, "/admin/users"), Some(LOGIN_ROUTE));
        assert_eq!(redirect_for(&state, "/doctors"), None);
        assert_eq!(redirect_for(&state, "/auth/signup"), None);
        assert_eq!(redirect_for(&state, "/"), None);
    }

    #[test]
    fn test_authenticated_redirects() {
        let doctor = signed_in("doctor");
        assert_eq!(redirect_for(&doctor, "/auth/login"), Some("/doctor/dashboard"));
        assert_eq!(redirect_for(&doctor, "/auth/signup"), Some("/doctor/dashboard"));
        assert_eq!(redirect_for(&doctor, "/"), Some("/doctor/dashboard"));
        assert_eq!(redirect_for(&doctor, "/dashboard"), Some("/doctor/dashboard"));
        assert_eq!(redirect_for(&doctor, "/patient/dashboard"), Some("/doctor/dashboard"));
        assert_eq!(redirect_for(&doctor, "/doctor/schedule"), None);
        assert_eq!(redirect_for(&doctor, "/doctors/d2"), None);
        assert_eq!(redirect_for(&doctor, "/dashboard/profile"), None);

        let admin = signed_in("admin");
        assert_eq!(redirect_for(&admin, "/doctor/dashboard"), Some("/admin/dashboard"));
    }

    #[test]
    fn test_navigation() {
        let patient = navigation_for(Role::Patient);
        assert_eq!(patient.len(), 6);
        assert_eq!(patient[0], item("Dashboard", "/dashboard"));
        assert_eq!(patient[1].label, "Profile");
        assert_eq!(patient[5].href, "/dashboard/medical-records");

        let doctor = navigation_for(Role::Doctor);
        assert!(doctor.iter().any(|nav| nav.href == "/dashboard/schedule"));

        let admin = navigation_for(Role::Admin);
        assert!(admin.iter().any(|nav| nav.label == "Analytics"));
    }
}
