//! Network-side copy of every declared attribute.
//!
//! The cache is the single shared resource of the network layer: every
//! access goes through one lock, held only for the duration of the call.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use minivalve_app::ports::AttributeStore;
use minivalve_domain::attribute::AttributeValue;
use minivalve_domain::endpoint::EndpointDescriptor;
use minivalve_domain::id::{AttributeId, ClusterId, EndpointId};
use minivalve_domain::status::ZclStatus;
use minivalve_domain::time::{Timestamp, now};

type AttributeKey = (EndpointId, ClusterId, AttributeId);

/// A cached attribute value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttributeRecord {
    pub value: AttributeValue,
    pub last_updated: Timestamp,
}

#[derive(Default)]
struct CacheState {
    records: HashMap<AttributeKey, AttributeRecord>,
    /// Endpoints whose local writes are refused, with the status to report.
    rejecting: HashMap<EndpointId, ZclStatus>,
}

/// Attribute storage shared by all endpoints of the virtual network.
#[derive(Default)]
pub struct AttributeCache {
    state: Mutex<CacheState>,
}

impl AttributeCache {
    /// Seed the cache with the defaults of every declared attribute.
    pub(crate) fn declare(&self, descriptor: &EndpointDescriptor) {
        let mut state = self.lock_state();
        let ts = now();
        for cluster in &descriptor.clusters {
            for attr in &cluster.attributes {
                state.records.insert(
                    (descriptor.endpoint, cluster.id, attr.id),
                    AttributeRecord {
                        value: attr.default,
                        last_updated: ts,
                    },
                );
            }
        }
    }

    /// Store a value for a declared attribute, checking its type.
    pub(crate) fn store(
        &self,
        endpoint: EndpointId,
        cluster: ClusterId,
        attribute: AttributeId,
        value: AttributeValue,
    ) -> Result<(), ZclStatus> {
        let mut state = self.lock_state();
        let record = state
            .records
            .get_mut(&(endpoint, cluster, attribute))
            .ok_or(ZclStatus::UnsupportedAttribute)?;
        if record.value.value_type() != value.value_type() {
            return Err(ZclStatus::InvalidDataType);
        }
        record.value = value;
        record.last_updated = now();
        Ok(())
    }

    /// Read a cached attribute.
    #[must_use]
    pub fn read(
        &self,
        endpoint: EndpointId,
        cluster: ClusterId,
        attribute: AttributeId,
    ) -> Option<AttributeRecord> {
        self.lock_state()
            .records
            .get(&(endpoint, cluster, attribute))
            .copied()
    }

    /// Make local writes from `endpoint` fail with `status`, or accept them
    /// again with `None`.
    pub fn reject_writes(&self, endpoint: EndpointId, status: Option<ZclStatus>) {
        let mut state = self.lock_state();
        match status {
            Some(status) => state.rejecting.insert(endpoint, status),
            None => state.rejecting.remove(&endpoint),
        };
    }

    fn lock_state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AttributeStore for AttributeCache {
    fn write_attribute(
        &self,
        endpoint: EndpointId,
        cluster: ClusterId,
        attribute: AttributeId,
        value: AttributeValue,
    ) -> Result<(), ZclStatus> {
        if let Some(status) = self.lock_state().rejecting.get(&endpoint).copied() {
            return Err(status);
        }
        self.store(endpoint, cluster, attribute, value)
    }
}
