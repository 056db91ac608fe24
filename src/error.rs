//! Error classification shared across the navigation boundary.

/// Stable machine-readable code for an error, used in structured logs.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}
