//! Resolver error types.

use thiserror::Error;

/// Errors raised while reading a priority schema or resolving against it.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Schema node is neither a candidate list nor a nested mapping.
    #[error("priority node at `{path}` must be a list of candidate paths or a mapping")]
    InvalidNode { path: String },

    /// A candidate entry is not a string.
    #[error("candidate #{index} at `{path}` is not a string")]
    InvalidCandidate { path: String, index: usize },

    /// A mapping key in the schema is not a string.
    #[error("priority keys under `{path}` must be strings")]
    InvalidKey { path: String },

    /// Schema text could not be parsed.
    #[error("priority schema parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Render a segment list the way it appears in schema files.
pub(crate) fn display_path(segments: &[String]) -> String {
    if segments.is_empty() {
        "<root>".to_string()
    } else {
        segments.join(".")
    }
}
