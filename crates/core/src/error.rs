//! Common error handling utilities and conventions

/// Extension trait for adding context to errors consistently across crates
pub trait ErrorContext<T> {
    /// Add operation context to an error result
    fn with_context<F>(self, f: F) -> Result<T, String>
    where
        F: FnOnce() -> String;

    /// Add operation context with a static string
    fn with_context_str(self, context: &'static str) -> Result<T, String>;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::fmt::Display,
{
    fn with_context<F>(self, f: F) -> Result<T, String>
    where
        F: FnOnce() -> String,
    {
        match self {
            Ok(val) => Ok(val),
            Err(err) => Err(format!("{}: {}", f(), err)),
        }
    }

    fn with_context_str(self, context: &'static str) -> Result<T, String> {
        self.with_context(|| context.to_string())
    }
}

/// Standard result type for core operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Core error types that can be shared across crates
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, thiserror::Error)]
pub enum CoreError {
    #[error("Unknown {kind} value: {value}")]
    UnknownVariant { kind: String, value: String },

    #[error("Response did not include a data payload")]
    MissingData,

    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl CoreError {
    /// Create an unknown enum value error
    pub fn unknown_variant(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self::UnknownVariant {
            kind: kind.into(),
            value: value.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization_error(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization_error(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_context_prefixes_message() {
        let result: Result<(), &str> = Err("boom");
        let err = result.with_context(|| "loading profile".to_string()).unwrap_err();
        assert_eq!(err, "loading profile: boom");
    }

    #[test]
    fn test_unknown_variant_display() {
        let err = CoreError::unknown_variant("Role", "nurse");
        assert_eq!(err.to_string(), "Unknown Role value: nurse");
    }
}
