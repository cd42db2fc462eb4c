//! Endpoint kinds served by the virtual network.

use std::sync::Arc;

use minivalve_app::ports::{Endpoint, TimerService};
use minivalve_app::services::valve_controller::ValveController;
use minivalve_domain::attribute::AttributeWrite;
use minivalve_domain::endpoint::EndpointDescriptor;
use minivalve_domain::error::ValveError;

use crate::cache::AttributeCache;

/// Valve controller wired to the virtual network's attribute cache.
pub type VirtualValve<T> = ValveController<Arc<AttributeCache>, T>;

/// Wrapper enum for the concrete endpoint kinds.
pub enum NetworkEndpoint<T> {
    Valve(Arc<VirtualValve<T>>),
}

impl<T> Clone for NetworkEndpoint<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Valve(valve) => Self::Valve(Arc::clone(valve)),
        }
    }
}

impl<T: TimerService + 'static> NetworkEndpoint<T> {
    fn endpoint(&self) -> &dyn Endpoint {
        match self {
            Self::Valve(valve) => &**valve,
        }
    }

    #[must_use]
    pub fn descriptor(&self) -> &EndpointDescriptor {
        self.endpoint().descriptor()
    }

    /// Forward an inbound write.
    ///
    /// # Errors
    ///
    /// Propagates the endpoint's error.
    pub fn on_attribute_write(&self, write: AttributeWrite) -> Result<(), ValveError> {
        self.endpoint().on_attribute_write(write)
    }
}

impl<T> From<Arc<VirtualValve<T>>> for NetworkEndpoint<T> {
    fn from(valve: Arc<VirtualValve<T>>) -> Self {
        Self::Valve(valve)
    }
}
