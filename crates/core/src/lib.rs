//! MediBook core types and utilities

pub mod error;
pub mod labels;
pub mod types;
pub mod validation;

pub use error::{CoreError, CoreResult, ErrorContext};
pub use validation::{LoginForm, SignupForm, ValidationError};
