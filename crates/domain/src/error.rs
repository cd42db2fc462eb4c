//! Error types shared by the valve controller and its collaborators.

use crate::attribute::AttributeType;
use crate::id::{AttributeId, ClusterId};
use crate::status::ZclStatus;

/// Type-erased source error coming from a port implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Everything that can go wrong while driving the valve.
#[derive(Debug, thiserror::Error)]
pub enum ValveError {
    /// An inbound write addressed a cluster the valve does not serve.
    #[error("cluster {0} not supported by the valve")]
    UnsupportedCluster(ClusterId),

    /// An inbound write addressed an unknown attribute, or carried the wrong type.
    #[error("attribute {attribute} ({value_type}) not supported on cluster {cluster}")]
    UnsupportedAttribute {
        cluster: ClusterId,
        attribute: AttributeId,
        value_type: AttributeType,
    },

    /// The network layer refused to store the new on/off value.
    #[error("network rejected attribute write ({0})")]
    NetworkWriteRejected(ZclStatus),

    /// The turn-off timer could not be created.
    #[error("failed to create turn-off timer")]
    TimerCreationFailed(#[source] BoxError),

    /// The turn-off timer could not be re-armed.
    #[error("failed to reschedule turn-off timer")]
    TimerRescheduleFailed(#[source] BoxError),
}

impl ValveError {
    /// Whether this error only means the inbound update was ignored.
    #[must_use]
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedCluster(_) | Self::UnsupportedAttribute { .. }
        )
    }
}
