//! Common error handling utilities and patterns

use std::fmt;

/// Trait for adding context to errors
///
/// This trait provides a consistent way to add context to errors
/// across all crates, similar to anyhow's context() but for custom error types.
pub trait ErrorContext<T> {
    /// Add context to an error
    ///
    /// # Errors
    ///
    /// Returns the original error message prefixed with `context`.
    fn context<C>(self, context: C) -> Result<T, String>
    where
        C: fmt::Display + Send + Sync + 'static;

    /// Add context with a closure (lazy evaluation)
    ///
    /// # Errors
    ///
    /// Returns the original error message prefixed with the closure result.
    fn with_context<C, F>(self, f: F) -> Result<T, String>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context<C>(self, context: C) -> Result<T, String>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| format!("{context}: {e}"))
    }

    fn with_context<C, F>(self, f: F) -> Result<T, String>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| format!("{}: {}", f(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_prefixes_the_original_error() {
        let result: Result<(), std::io::Error> = Err(std::io::Error::other("boom"));
        let with_context = result.context("while connecting to the store");
        assert!(with_context.is_err());
        let message = with_context.unwrap_err();
        assert!(message.starts_with("while connecting to the store"));
        assert!(message.contains("boom"));
    }
}
