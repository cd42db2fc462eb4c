//! What the network layer dispatches inbound writes to.

use minivalve_domain::attribute::AttributeWrite;
use minivalve_domain::endpoint::EndpointDescriptor;
use minivalve_domain::error::ValveError;

/// An endpoint served by this device.
///
/// The network layer registers endpoints by their [`EndpointDescriptor`] and
/// calls [`on_attribute_write`](Self::on_attribute_write) every time a remote
/// party writes one of their attributes. The stored value is already updated
/// by then.
pub trait Endpoint: Send + Sync {
    fn descriptor(&self) -> &EndpointDescriptor;

    /// Fold an inbound attribute write into local state.
    ///
    /// Unsupported clusters and attributes are dropped, never reported.
    ///
    /// # Errors
    ///
    /// Returns an error when the resulting state change cannot be honored.
    fn on_attribute_write(&self, write: AttributeWrite) -> Result<(), ValveError>;
}
