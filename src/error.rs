//! Error model for the router core.
//!
//! Registration-time mistakes (malformed patterns, duplicate parameter names, a
//! `Use` call after routes exist) are programming bugs: the registration API
//! panics with a [`RouterError`] describing the mistake rather than returning a
//! `Result`, matching the rest of this crate's "registration bugs panic, request
//! failures return errors" split. Request-time failures (not-found, method not
//! allowed, a handler returning an error, a recovered panic) flow through
//! [`RouterError`] values handed to the configured error handler.

use std::fmt;

/// The closed set of request-time and registration-time error kinds the core
/// itself can raise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    MethodNotAllowed,
    NilResponse,
    InvalidMethod,
    InvalidPattern,
    WildcardPosition,
    DuplicateParam,
    ParamDelimiter,
    InvalidRegexp,
    NilSubrouter,
    PanicRecovered,
    Other,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::NotFound => "not found",
            ErrorKind::MethodNotAllowed => "method not allowed",
            ErrorKind::NilResponse => "handler returned no response",
            ErrorKind::InvalidMethod => "invalid method",
            ErrorKind::InvalidPattern => "invalid pattern",
            ErrorKind::WildcardPosition => "wildcard must be the final segment",
            ErrorKind::DuplicateParam => "duplicate parameter name in pattern",
            ErrorKind::ParamDelimiter => "unmatched '{' in pattern",
            ErrorKind::InvalidRegexp => "parameter regex failed to compile",
            ErrorKind::NilSubrouter => "mount target is nil",
            ErrorKind::PanicRecovered => "handler panicked",
            ErrorKind::Other => "handler error",
        };
        f.write_str(s)
    }
}

/// A request-time or registration-time error.
///
/// Carries an optional HTTP status override (see [`RouterError::status_code`])
/// so the default error handler can special-case errors the application wants
/// mapped to something other than 500, without requiring `RouterError` itself
/// to know about every possible status.
#[derive(Debug, Clone)]
pub struct RouterError {
    kind: ErrorKind,
    message: String,
    status: Option<u16>,
}

impl RouterError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Duck-typed status extraction used by the default error handler
    /// (spec §4.8 / §9): falls back to `None` so the caller can apply its own
    /// default (500) when the error carries no opinion.
    pub fn status_code(&self) -> Option<u16> {
        self.status.or(match self.kind {
            ErrorKind::NotFound => Some(404),
            ErrorKind::MethodNotAllowed => Some(405),
            _ => None,
        })
    }

    pub fn not_found() -> Self {
        Self::new(ErrorKind::NotFound, "no route matches this path")
    }

    pub fn method_not_allowed() -> Self {
        Self::new(ErrorKind::MethodNotAllowed, "method not allowed for this path")
    }

    pub fn panic_recovered(payload: String) -> Self {
        Self::new(ErrorKind::PanicRecovered, payload)
    }
}

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for RouterError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_status_mapping() {
        assert_eq!(RouterError::not_found().status_code(), Some(404));
        assert_eq!(RouterError::method_not_allowed().status_code(), Some(405));
        assert_eq!(
            RouterError::new(ErrorKind::Other, "boom").status_code(),
            None
        );
    }

    #[test]
    fn explicit_status_overrides_default() {
        let e = RouterError::new(ErrorKind::Other, "teapot").with_status(418);
        assert_eq!(e.status_code(), Some(418));
    }

    #[test]
    fn display_includes_kind_and_message() {
        let e = RouterError::new(ErrorKind::InvalidPattern, "missing leading /");
        assert_eq!(format!("{e}"), "invalid pattern: missing leading /");
    }
}
