//! Network port — the attribute store of the protocol stack.

use minivalve_domain::attribute::AttributeValue;
use minivalve_domain::id::{AttributeId, ClusterId, EndpointId};
use minivalve_domain::status::ZclStatus;

/// The network layer's attribute store, seen from an endpoint.
///
/// Writes are synchronous and bounded: the implementation takes its own
/// lock for the duration of the call and reports the stack's status code.
/// Remote reads are answered by the network layer from this store, so an
/// endpoint keeps it in sync by writing every value it changes locally.
pub trait AttributeStore: Send + Sync {
    /// Store `value` for the given attribute of `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns the non-success [`ZclStatus`] reported by the stack.
    fn write_attribute(
        &self,
        endpoint: EndpointId,
        cluster: ClusterId,
        attribute: AttributeId,
        value: AttributeValue,
    ) -> Result<(), ZclStatus>;
}

impl<T: AttributeStore + ?Sized> AttributeStore for std::sync::Arc<T> {
    fn write_attribute(
        &self,
        endpoint: EndpointId,
        cluster: ClusterId,
        attribute: AttributeId,
        value: AttributeValue,
    ) -> Result<(), ZclStatus> {
        (**self).write_attribute(endpoint, cluster, attribute, value)
    }
}
