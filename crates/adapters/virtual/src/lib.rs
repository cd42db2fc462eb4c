//! # minivalve-adapter-virtual
//!
//! Simulated network layer standing in for the real protocol stack.
//!
//! ## Responsibilities
//!
//! | Concern | Behaviour |
//! |---------|-----------|
//! | Attribute cache | Seeded from each endpoint's declaration; local writes go through [`AttributeStore`](minivalve_app::ports::AttributeStore) |
//! | Remote writes | Stored in the cache, then dispatched to the addressed endpoint |
//! | Remote reads | Answered from the cache only |
//!
//! ## Dependency rule
//!
//! Depends on `minivalve-app` (port traits) and `minivalve-domain` only.

mod cache;
mod endpoints;
mod error;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use minivalve_app::ports::TimerService;
use minivalve_app::services::valve_controller::ValveController;
use minivalve_domain::attribute::{AttributeValue, AttributeWrite};
use minivalve_domain::id::{AttributeId, ClusterId, EndpointId};
use minivalve_domain::status::ZclStatus;
use minivalve_domain::valve::OnTime;

pub use cache::{AttributeCache, AttributeRecord};
pub use endpoints::{NetworkEndpoint, VirtualValve};
pub use error::NetworkError;

/// In-process network with one attribute cache and a registry of endpoints.
pub struct VirtualNetwork<T> {
    cache: Arc<AttributeCache>,
    endpoints: Mutex<HashMap<EndpointId, NetworkEndpoint<T>>>,
}

impl<T> Default for VirtualNetwork<T> {
    fn default() -> Self {
        Self {
            cache: Arc::new(AttributeCache::default()),
            endpoints: Mutex::new(HashMap::new()),
        }
    }
}

impl<T: TimerService + 'static> VirtualNetwork<T> {
    /// The attribute store endpoints mirror their state into.
    #[must_use]
    pub fn store(&self) -> Arc<AttributeCache> {
        Arc::clone(&self.cache)
    }

    /// Register an endpoint and seed its declared attributes.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError`] when the id is out of range or already taken.
    pub fn register(&self, endpoint: impl Into<NetworkEndpoint<T>>) -> Result<(), NetworkError> {
        let endpoint = endpoint.into();
        let id = endpoint.descriptor().endpoint;
        if !id.is_application() {
            return Err(NetworkError::InvalidEndpoint(id));
        }
        let mut endpoints = self.lock_endpoints();
        if endpoints.contains_key(&id) {
            return Err(NetworkError::DuplicateEndpoint(id));
        }
        self.cache.declare(endpoint.descriptor());
        endpoints.insert(id, endpoint);
        tracing::info!(endpoint = %id, "endpoint registered");
        Ok(())
    }

    /// Create a valve controller backed by this network and register it.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError`] when the endpoint cannot be registered.
    pub fn add_valve(
        &self,
        endpoint: EndpointId,
        on_time: OnTime,
        timers: T,
    ) -> Result<Arc<VirtualValve<T>>, NetworkError> {
        let valve = ValveController::new(endpoint, on_time, self.store(), timers);
        self.register(Arc::clone(&valve))?;
        Ok(valve)
    }

    /// Registered endpoint ids, in ascending order.
    #[must_use]
    pub fn endpoints(&self) -> Vec<EndpointId> {
        let mut ids: Vec<_> = self.lock_endpoints().keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Apply a write coming from a remote party.
    ///
    /// The value is stored first, then the endpoint is told about it.
    ///
    /// # Errors
    ///
    /// Returns [`ZclStatus::NotFound`] for an unknown endpoint, the cache's
    /// status for an undeclared or mistyped attribute, and
    /// [`ZclStatus::Failure`] when the endpoint could not apply the change.
    pub fn remote_write(&self, endpoint: EndpointId, write: AttributeWrite) -> Result<(), ZclStatus> {
        let target = self
            .lock_endpoints()
            .get(&endpoint)
            .cloned()
            .ok_or(ZclStatus::NotFound)?;

        self.cache
            .store(endpoint, write.cluster, write.attribute, write.value)
            .inspect_err(|status| {
                tracing::debug!(endpoint = %endpoint, cluster = %write.cluster, attribute = %write.attribute, %status, "remote write refused");
            })?;

        target.on_attribute_write(write).map_err(|err| {
            tracing::error!(endpoint = %endpoint, %err, "endpoint failed to apply remote write");
            ZclStatus::Failure
        })
    }

    /// Answer a remote read from the cache.
    ///
    /// # Errors
    ///
    /// Returns [`ZclStatus::UnsupportedAttribute`] for an undeclared attribute.
    pub fn read_attribute(
        &self,
        endpoint: EndpointId,
        cluster: ClusterId,
        attribute: AttributeId,
    ) -> Result<AttributeValue, ZclStatus> {
        self.cache
            .read(endpoint, cluster, attribute)
            .map(|record| record.value)
            .ok_or(ZclStatus::UnsupportedAttribute)
    }

    fn lock_endpoints(&self) -> MutexGuard<'_, HashMap<EndpointId, NetworkEndpoint<T>>> {
        self.endpoints
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use minivalve_adapter_timer_tokio::TokioTimerService;
    use minivalve_domain::valve::ValvePhase;

    type Network = VirtualNetwork<TokioTimerService>;

    fn network_with_valve(on_time: OnTime) -> (Network, Arc<VirtualValve<TokioTimerService>>) {
        let network = Network::default();
        let valve = network
            .add_valve(
                EndpointId::DEFAULT,
                on_time,
                TokioTimerService::current().unwrap(),
            )
            .unwrap();
        (network, valve)
    }

    fn on_off_value(network: &Network) -> AttributeValue {
        network
            .read_attribute(EndpointId::DEFAULT, ClusterId::ON_OFF, AttributeId::ON_OFF)
            .unwrap()
    }

    #[tokio::test]
    async fn should_seed_attributes_on_registration() {
        let (network, _valve) = network_with_valve(OnTime::from_tenths(50));
        assert_eq!(network.endpoints(), vec![EndpointId::DEFAULT]);
        assert_eq!(on_off_value(&network), AttributeValue::Bool(false));
        assert_eq!(
            network.read_attribute(EndpointId::DEFAULT, ClusterId::ON_OFF, AttributeId::ON_TIME),
            Ok(AttributeValue::U16(50))
        );
    }

    #[tokio::test]
    async fn should_reject_duplicate_endpoint() {
        let (network, _valve) = network_with_valve(OnTime::DEFAULT);
        let result = network.add_valve(
            EndpointId::DEFAULT,
            OnTime::DEFAULT,
            TokioTimerService::current().unwrap(),
        );
        assert!(matches!(result, Err(NetworkError::DuplicateEndpoint(_))));
    }

    #[tokio::test]
    async fn should_reject_reserved_endpoint() {
        let network = Network::default();
        let result = network.add_valve(
            EndpointId::new(0),
            OnTime::DEFAULT,
            TokioTimerService::current().unwrap(),
        );
        assert!(matches!(result, Err(NetworkError::InvalidEndpoint(_))));
        assert!(network.endpoints().is_empty());
    }

    #[tokio::test]
    async fn should_mirror_local_commands_into_cache() {
        let (network, valve) = network_with_valve(OnTime::DEFAULT);
        valve.set_valve(true).unwrap();
        assert_eq!(on_off_value(&network), AttributeValue::Bool(true));
    }

    #[tokio::test]
    async fn should_dispatch_remote_on_off_to_valve() {
        let (network, valve) = network_with_valve(OnTime::DEFAULT);
        let write = AttributeWrite::new(
            ClusterId::ON_OFF,
            AttributeId::ON_OFF,
            AttributeValue::Bool(true),
        );

        network.remote_write(EndpointId::DEFAULT, write).unwrap();

        assert!(valve.state());
        assert_eq!(on_off_value(&network), AttributeValue::Bool(true));
    }

    #[tokio::test]
    async fn should_dispatch_remote_on_time_to_valve() {
        let (network, valve) = network_with_valve(OnTime::DEFAULT);
        valve.set_valve(true).unwrap();
        let write = AttributeWrite::new(
            ClusterId::ON_OFF,
            AttributeId::ON_TIME,
            AttributeValue::U16(0),
        );

        network.remote_write(EndpointId::DEFAULT, write).unwrap();

        assert_eq!(valve.on_time(), OnTime::DISABLED);
        assert_eq!(valve.phase(), ValvePhase::OnNoTimeout);
    }

    #[tokio::test]
    async fn should_store_but_ignore_writes_to_other_clusters() {
        let (network, valve) = network_with_valve(OnTime::DEFAULT);
        let write = AttributeWrite::new(
            ClusterId::IDENTIFY,
            AttributeId::IDENTIFY_TIME,
            AttributeValue::U16(30),
        );

        network.remote_write(EndpointId::DEFAULT, write).unwrap();

        assert_eq!(
            network.read_attribute(
                EndpointId::DEFAULT,
                ClusterId::IDENTIFY,
                AttributeId::IDENTIFY_TIME
            ),
            Ok(AttributeValue::U16(30))
        );
        assert!(!valve.state());
    }

    #[tokio::test]
    async fn should_refuse_remote_write_to_unknown_endpoint() {
        let (network, _valve) = network_with_valve(OnTime::DEFAULT);
        let write = AttributeWrite::new(
            ClusterId::ON_OFF,
            AttributeId::ON_OFF,
            AttributeValue::Bool(true),
        );
        assert_eq!(
            network.remote_write(EndpointId::new(11), write),
            Err(ZclStatus::NotFound)
        );
    }

    #[tokio::test]
    async fn should_refuse_mistyped_remote_write_before_dispatch() {
        let (network, valve) = network_with_valve(OnTime::DEFAULT);
        let write = AttributeWrite::new(
            ClusterId::ON_OFF,
            AttributeId::ON_TIME,
            AttributeValue::Bool(true),
        );

        assert_eq!(
            network.remote_write(EndpointId::DEFAULT, write),
            Err(ZclStatus::InvalidDataType)
        );
        assert_eq!(valve.on_time(), OnTime::DEFAULT);
    }

    #[tokio::test]
    async fn should_surface_rejected_local_write() {
        let (network, valve) = network_with_valve(OnTime::DEFAULT);
        network
            .store()
            .reject_writes(EndpointId::DEFAULT, Some(ZclStatus::NotAuthorized));

        let result = valve.set_valve(true);

        assert!(result.is_err());
        assert!(valve.state());
        assert_eq!(on_off_value(&network), AttributeValue::Bool(false));
    }

    #[tokio::test(start_paused = true)]
    async fn should_publish_auto_off_to_cache() {
        let (network, valve) = network_with_valve(OnTime::from_tenths(20));
        valve.set_valve(true).unwrap();

        tokio::time::sleep(Duration::from_secs(3)).await;

        assert!(!valve.state());
        assert_eq!(on_off_value(&network), AttributeValue::Bool(false));
    }
}
