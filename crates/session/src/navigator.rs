//! Navigation effect

use std::sync::{Mutex, PoisonError};

/// Moves the user to another route
#[cfg_attr(test, mockall::automock)]
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Records every navigation in order
#[derive(Debug, Default)]
pub struct HistoryNavigator {
    visited: Mutex<Vec<String>>,
}

impl HistoryNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last route navigated to
    pub fn current(&self) -> Option<String> {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for HistoryNavigator {
    fn navigate(&self, path: &str) {
        debug!(path, "Navigating");
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_keeps_order() {
        let navigator = HistoryNavigator::new();
        assert!(navigator.current().is_none());

        navigator.navigate("/auth/login");
        navigator.navigate("/patient/dashboard");
        assert_eq!(navigator.current().as_deref(), Some("/patient/dashboard"));
        assert_eq!(navigator.visited(), ["/auth/login", "/patient/dashboard"]);
    }
}
