//! Route changes rendered as command hints

use medibook_session::{LOGIN_ROUTE, Navigator, SIGNUP_ROUTE};
use tracing::debug;

/// CLI command that shows a route, if there is one
pub fn command_for(path: &str) -> Option<&'static str> {
    match path {
        LOGIN_ROUTE => Some("medibook login"),
        SIGNUP_ROUTE => Some("medibook signup"),
        "/patient/dashboard" | "/doctor/dashboard" | "/admin/dashboard" | "/dashboard" => {
            Some("medibook dashboard")
        }
        "/dashboard/appointments" => Some("medibook appointments list"),
        "/dashboard/doctors" | "/doctors" => Some("medibook doctors list"),
        "/dashboard/clinics" => Some("medibook clinics list"),
        "/dashboard/schedule" => Some("medibook schedules list"),
        "/dashboard/medical-records" => Some("medibook patient summary"),
        "/dashboard/profile" => Some("medibook whoami"),
        _ => None,
    }
}

/// Tells the user which command to run next
#[derive(Debug, Default)]
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, path: &str) {
        debug!(route = path, "Navigate");
        if path == LOGIN_ROUTE {
            eprintln!("You are signed out. Run `medibook login` to sign in.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_routes_have_commands() {
        assert_eq!(command_for("/auth/login"), Some("medibook login"));
        assert_eq!(command_for("/doctor/dashboard"), Some("medibook dashboard"));
        assert_eq!(command_for("/dashboard/users"), None);
    }
}
