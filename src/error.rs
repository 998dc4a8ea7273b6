use hyper::Method;
use thiserror::Error;

/// The boxed error type handlers' errors are converted into before they reach an error handler.
///
/// The original error can be recovered with `downcast_ref`.
pub type RouteError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors produced while registering routes or decoding request paths.
///
/// Registration errors are returned from [`RouterBuilder::build`](./struct.RouterBuilder.html#method.build)
/// and are meant to abort the startup of the server.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The route pattern could not be parsed.
    #[error("invalid route pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A handler is already registered for the same method and pattern.
    #[error("a handler for {method} {pattern:?} is already registered")]
    DuplicateRoute { method: Method, pattern: String },

    /// A parameter or catch-all with another name already lives at the same position in the tree.
    #[error("{kind} {found:?} in {pattern:?} conflicts with the existing {kind} {existing:?}")]
    ConflictingPlaceholder {
        kind: &'static str,
        pattern: String,
        existing: String,
        found: String,
    },

    /// A request path segment contained a malformed percent escape or invalid UTF-8.
    #[error("could not percent decode {0:?}")]
    Decode(String),
}

impl Error {
    pub(crate) fn invalid_pattern<P: Into<String>, R: Into<String>>(pattern: P, reason: R) -> Error {
        Error::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }

    /// Returns `true` for errors which make a route registration impossible.
    pub fn is_registration_error(&self) -> bool {
        !matches!(self, Error::Decode(_))
    }
}
