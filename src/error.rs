use http::Method;

use std::fmt;

/// Represents errors that can occur when registering hosts and routes.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum InsertError {
    /// The host pattern is not a sequence of DNS labels and `*` wildcards.
    InvalidHostPattern {
        /// The rejected host pattern.
        host: String,
    },
    /// The path template is malformed.
    InvalidPathPattern {
        /// The rejected path template.
        path: String,
        /// What is wrong with it.
        reason: &'static str,
    },
    /// The host pattern overlaps with a previously registered one.
    ConflictingHostRegistration {
        /// The rejected host pattern.
        host: String,
        /// The registered pattern it intersects with.
        with: String,
    },
    /// The route overlaps with a previously registered route.
    ConflictingRouteRegistration {
        /// The rejected path template.
        path: String,
        /// How the route conflicts.
        reason: &'static str,
    },
    /// The route references a host pattern that was never added.
    HostNotRegistered {
        /// The unknown host pattern.
        host: String,
    },
    /// A route must handle at least one method.
    MissingMethods,
    /// A route must have a handler.
    MissingHandler,
    /// The method token is not a valid HTTP method.
    InvalidMethod {
        /// The rejected token.
        method: String,
    },
}

impl fmt::Display for InsertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidHostPattern { host } => write!(f, "invalid host pattern: '{}'", host),
            Self::InvalidPathPattern { path, reason } => {
                write!(f, "invalid path pattern '{}': {}", path, reason)
            }
            Self::ConflictingHostRegistration { host, with } => write!(
                f,
                "host pattern '{}' intersects with previously registered pattern '{}'",
                host, with
            ),
            Self::ConflictingRouteRegistration { path, reason } => write!(
                f,
                "insertion of '{}' conflicts with a previously registered route: {}",
                path, reason
            ),
            Self::HostNotRegistered { host } => {
                write!(f, "host pattern '{}' must be registered before its routes", host)
            }
            Self::MissingMethods => write!(f, "routes must handle at least one method"),
            Self::MissingHandler => write!(f, "routes must be registered with a handler"),
            Self::InvalidMethod { method } => write!(f, "invalid method: '{}'", method),
        }
    }
}

impl std::error::Error for InsertError {}

impl InsertError {
    pub(crate) fn invalid_path(path: &str, reason: &'static str) -> Self {
        InsertError::InvalidPathPattern {
            path: path.to_owned(),
            reason,
        }
    }

    pub(crate) fn conflict(path: &str, reason: &'static str) -> Self {
        InsertError::ConflictingRouteRegistration {
            path: path.to_owned(),
            reason,
        }
    }
}

/// A failed match attempt.
///
/// ```
/// use hostmux::{MatchError, Router};
/// use http::Method;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut router = Router::new();
/// router.insert("", "/home", [Method::GET], "Welcome!")?;
/// router.compile()?;
///
/// // no routes match
/// assert_eq!(router.at("example.com", "/foobar").unwrap_err(), MatchError::NotFound);
///
/// // the path matches, but not the method
/// assert_eq!(
///     router.route(&Method::POST, "example.com", "/home").unwrap_err(),
///     MatchError::MethodNotAllowed { allowed: vec![Method::GET] }
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum MatchError {
    /// No matching route was found.
    NotFound,
    /// A route matched the path, but does not handle the requested method.
    MethodNotAllowed {
        /// The methods the matched route does handle, sorted by name.
        allowed: Vec<Method>,
    },
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "matching route not found"),
            Self::MethodNotAllowed { allowed } => {
                write!(f, "method not allowed, expected one of: ")?;
                for (i, method) in allowed.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", method)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for MatchError {}
