//! Error types shared across the domain and application layers.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;

/// Error kinds, one per failure class the pipeline can report.
///
/// The wire name (`as_str`) is part of the webhook contract; the HTTP
/// adapter owns the mapping from kind to status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The service is misconfigured (missing credential rows, bad env).
    ConfigurationError,
    /// Authentication failed; no external detail about which part mismatched.
    Unauthorized,
    /// The webhook endpoint only accepts POST.
    MethodNotAllowed,
    /// The request body is not valid JSON.
    InvalidPayload,
    /// The JSON parsed but required fields are missing or unusable.
    InvalidPayloadStructure,
    /// A fatal persistence failure.
    DatabaseError,
    /// Unexpected internal failure.
    ServerError,
    /// The referenced resource (credential row, duplicate match) does not exist.
    NotFound,
    /// Client misuse of an API (bad merge target, already-resolved match).
    ValidationFailed,
}

impl ErrorKind {
    /// Wire-format name used in error response bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ConfigurationError => "configuration_error",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::MethodNotAllowed => "method_not_allowed",
            ErrorKind::InvalidPayload => "invalid_payload",
            ErrorKind::InvalidPayloadStructure => "invalid_payload_structure",
            ErrorKind::DatabaseError => "database_error",
            ErrorKind::ServerError => "server_error",
            ErrorKind::NotFound => "not_found",
            ErrorKind::ValidationFailed => "validation_failed",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Standard domain error with kind, message, and optional details.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub kind: ErrorKind,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Creates a database error from an underlying failure.
    pub fn database(source: impl fmt::Display) -> Self {
        Self::new(ErrorKind::DatabaseError, format!("database error: {}", source))
    }

    /// Creates a not-found error for the named resource.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, format!("{} not found", resource.into()))
    }

    /// Creates a validation error for a specific field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ValidationFailed, message).with_detail("field", field)
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl Error for DomainError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_wire_names_match_taxonomy() {
        assert_eq!(ErrorKind::Unauthorized.as_str(), "unauthorized");
        assert_eq!(ErrorKind::MethodNotAllowed.as_str(), "method_not_allowed");
        assert_eq!(
            ErrorKind::InvalidPayloadStructure.as_str(),
            "invalid_payload_structure"
        );
        assert_eq!(ErrorKind::DatabaseError.as_str(), "database_error");
    }

    #[test]
    fn domain_error_displays_kind_and_message() {
        let err = DomainError::not_found("duplicate match");
        assert_eq!(format!("{}", err), "[not_found] duplicate match not found");
    }

    #[test]
    fn validation_error_carries_field_detail() {
        let err = DomainError::validation("primary_contact_id", "must be one of the matched pair");
        assert_eq!(err.kind, ErrorKind::ValidationFailed);
        assert_eq!(
            err.details.get("field"),
            Some(&"primary_contact_id".to_string())
        );
    }

    #[test]
    fn with_detail_accumulates() {
        let err = DomainError::new(ErrorKind::Unauthorized, "credential mismatch")
            .with_detail("account", "abc")
            .with_detail("reason", "password");
        assert_eq!(err.details.len(), 2);
    }
}
