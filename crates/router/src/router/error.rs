use thiserror::Error;

/// Configuration errors raised while registering a route.
///
/// A failed registration leaves the router exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("route pattern must not be empty")]
    EmptyPattern,

    #[error("route pattern '{pattern}' must start with '/'")]
    MissingLeadingSlash { pattern: String },

    #[error("segment '{segment}' of route pattern '{pattern}' has ':' or '*' after its first byte")]
    MisplacedMarker { pattern: String, segment: String },

    #[error("route pattern '{pattern}' has a parameter without a name")]
    EmptyParamName { pattern: String },

    #[error("segment '{segment}' of route pattern '{pattern}' is not a valid catch-all, use a single '*'")]
    InvalidCatchAll { pattern: String, segment: String },

    #[error("route pattern '{pattern}' has an empty segment")]
    EmptySegment { pattern: String },

    #[error("route pattern '{pattern}' has segments after the catch-all")]
    CatchAllNotLast { pattern: String },
}
