//! Errors of the tracker

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlowError {
    /// The endpoint could not be reached or answered with a bad status
    #[error("Failed on query the {endpoint} endpoint: {reason}")]
    Endpoint { endpoint: String, reason: String },
    /// The feature service answered with an error payload
    #[error("The {endpoint} endpoint returned error {code}: {message}")]
    Service {
        endpoint: String,
        code: i64,
        message: String,
    },
    /// The geocoding provider could not be reached
    #[error("Geocoding of `{query}` failed: {reason}")]
    Geocoder { query: String, reason: String },
    /// The geocoder answered but nothing matched
    #[error("Could not resolve location `{0}`")]
    Unresolved(String),
    #[error(
        "Address required. Pass one to `check` or set `default_address` in .snowplow.yaml"
    )]
    MissingAddress,
    #[error("Failed on export the route: {0}")]
    Export(String),
}

impl PlowError {
    pub(crate) fn endpoint(endpoint: &str, reason: impl ToString) -> Self {
        Self::Endpoint {
            endpoint: endpoint.to_string(),
            reason: reason.to_string(),
        }
    }
}
