//! Endpoint declaration — what an endpoint advertises to the network layer.
//!
//! The declaration is handed to the network layer once, at registration. It
//! lists the clusters the endpoint serves and the default value of every
//! attribute, which is also where the attribute's type comes from.

use serde::{Deserialize, Serialize};

use crate::attribute::AttributeValue;
use crate::id::{AttributeId, ClusterId, DeviceTypeId, EndpointId, ProfileId};
use crate::valve::OnTime;

/// An attribute and its initial value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDescriptor {
    pub id: AttributeId,
    pub default: AttributeValue,
}

/// A server cluster and the attributes it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterDescriptor {
    pub id: ClusterId,
    pub attributes: Vec<AttributeDescriptor>,
}

impl ClusterDescriptor {
    #[must_use]
    pub fn new(id: ClusterId) -> Self {
        Self {
            id,
            attributes: Vec::new(),
        }
    }

    /// Add an attribute with its default value.
    #[must_use]
    pub fn with_attribute(mut self, id: AttributeId, default: AttributeValue) -> Self {
        self.attributes.push(AttributeDescriptor { id, default });
        self
    }
}

/// Full declaration of one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointDescriptor {
    pub endpoint: EndpointId,
    pub profile: ProfileId,
    pub device_type: DeviceTypeId,
    pub device_version: u8,
    pub clusters: Vec<ClusterDescriptor>,
}

impl EndpointDescriptor {
    /// Declare an on/off valve.
    ///
    /// The valve presents itself as a Home Automation on/off light whose
    /// On/Off cluster additionally carries the `ON_TIME` attribute.
    #[must_use]
    pub fn on_off_valve(endpoint: EndpointId, on_time: OnTime) -> Self {
        Self {
            endpoint,
            profile: ProfileId::HOME_AUTOMATION,
            device_type: DeviceTypeId::ON_OFF_LIGHT,
            device_version: 0,
            clusters: vec![
                ClusterDescriptor::new(ClusterId::BASIC)
                    .with_attribute(AttributeId::ZCL_VERSION, AttributeValue::U8(3))
                    // mains, single phase
                    .with_attribute(AttributeId::POWER_SOURCE, AttributeValue::Enum8(0x01)),
                ClusterDescriptor::new(ClusterId::IDENTIFY)
                    .with_attribute(AttributeId::IDENTIFY_TIME, AttributeValue::U16(0)),
                ClusterDescriptor::new(ClusterId::GROUPS),
                ClusterDescriptor::new(ClusterId::SCENES),
                ClusterDescriptor::new(ClusterId::ON_OFF)
                    .with_attribute(AttributeId::ON_OFF, AttributeValue::Bool(false))
                    .with_attribute(AttributeId::GLOBAL_SCENE_CONTROL, AttributeValue::Bool(true))
                    .with_attribute(AttributeId::ON_TIME, AttributeValue::U16(on_time.tenths()))
                    .with_attribute(AttributeId::OFF_WAIT_TIME, AttributeValue::U16(0)),
            ],
        }
    }

    #[must_use]
    pub fn cluster(&self, id: ClusterId) -> Option<&ClusterDescriptor> {
        self.clusters.iter().find(|c| c.id == id)
    }

    /// Look up an attribute declaration.
    #[must_use]
    pub fn attribute(&self, cluster: ClusterId, attribute: AttributeId) -> Option<&AttributeDescriptor> {
        self.cluster(cluster)?
            .attributes
            .iter()
            .find(|a| a.id == attribute)
    }
}
