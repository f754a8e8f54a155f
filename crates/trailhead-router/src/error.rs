use thiserror::Error;

/// Errors raised while building a route table
#[derive(Debug, Error)]
pub enum RouterError {
    /// The verb is not one of GET, POST, PUT, DELETE
    #[error("Unrecognized verb: {0}")]
    InvalidVerb(String),

    /// A path template did not compile to a valid regex
    #[error("invalid route pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
