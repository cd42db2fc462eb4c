//! Virtual network error types.

use minivalve_domain::id::EndpointId;
use minivalve_domain::status::ZclStatus;

/// Errors raised while setting up the virtual network.
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    /// Another endpoint already uses this id.
    #[error("endpoint {0} already registered")]
    DuplicateEndpoint(EndpointId),

    /// The id is outside the application endpoint range.
    #[error("endpoint {0} is not an application endpoint (1..=240)")]
    InvalidEndpoint(EndpointId),
}

impl NetworkError {
    /// The status a real stack would report for this failure.
    #[must_use]
    pub fn status(&self) -> ZclStatus {
        match self {
            Self::DuplicateEndpoint(_) => ZclStatus::Failure,
            Self::InvalidEndpoint(_) => ZclStatus::InvalidValue,
        }
    }
}
