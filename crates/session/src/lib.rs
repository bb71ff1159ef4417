//! MediBook session layer
//!
//! Current-user state, role-based routing and the cached data-fetching layer
//! built on top of [`medibook_http::MedibookClient`].

#[macro_use]
extern crate tracing;

pub mod context;
pub mod error;
pub mod gate;
pub mod navigator;
pub mod queries;
pub mod routes;

pub use context::{SessionAction, SessionState, SessionStore};
pub use error::{SessionError, SessionResult};
pub use gate::SessionGate;
pub use navigator::{HistoryNavigator, Navigator};
pub use queries::{Mutation, Queries, QueryCache, QueryKey};
pub use routes::{LOGIN_ROUTE, NavItem, SIGNUP_ROUTE, home_for, navigation_for, redirect_for};
