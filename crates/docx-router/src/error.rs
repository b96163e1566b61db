/// Errors raised while building a route tree or dispatching into it
///
/// "No route found" is not an error: dispatch reports it as `Ok(None)`.
/// Every variant is `Clone` so a failed lazy load can be cached on the
/// child and reported identically to each dispatch that reaches it.
use thiserror::Error;

pub type Result<T, E = RouteError> = std::result::Result<T, E>;

#[derive(Debug, Clone, Error)]
pub enum RouteError {
    /// A declared pattern did not produce a valid matching expression
    #[error("pattern `{pattern}` does not compile: {source}")]
    PatternCompile {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A route item was registered without any handler
    #[error("route `{pattern}` has an empty handler chain")]
    EmptyHandlerChain { pattern: String },

    /// An alias token cannot be used for substitution
    #[error("alias token `{token}` is invalid: {reason}")]
    InvalidAlias { token: String, reason: String },

    /// A readable route file whose contents cannot be parsed
    #[error("route file `{source_ref}` is malformed: {message}")]
    Manifest { source_ref: String, message: String },

    /// A registration callback reported its own failure
    #[error("module `{source_ref}` failed to register: {message}")]
    Registration { source_ref: String, message: String },
}

impl RouteError {
    /// Wraps an arbitrary failure coming out of user registration logic
    pub fn registration(source_ref: impl Into<String>, message: impl std::fmt::Display) -> Self {
        RouteError::Registration {
            source_ref: source_ref.into(),
            message: message.to_string(),
        }
    }
}
