//! Typed attribute values exchanged with the network layer.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::{AttributeId, ClusterId};

/// ZCL data type of an attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    Bool,
    U8,
    U16,
    Enum8,
}

impl AttributeType {
    /// The ZCL wire code of this type.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Bool => 0x10,
            Self::U8 => 0x20,
            Self::U16 => 0x21,
            Self::Enum8 => 0x30,
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::U8 => f.write_str("u8"),
            Self::U16 => f.write_str("u16"),
            Self::Enum8 => f.write_str("enum8"),
        }
    }
}

/// A single typed attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AttributeValue {
    Bool(bool),
    U8(u8),
    U16(u16),
    Enum8(u8),
}

impl AttributeValue {
    /// The ZCL type carried by this value.
    #[must_use]
    pub const fn value_type(&self) -> AttributeType {
        match self {
            Self::Bool(_) => AttributeType::Bool,
            Self::U8(_) => AttributeType::U8,
            Self::U16(_) => AttributeType::U16,
            Self::Enum8(_) => AttributeType::Enum8,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::U8(v) | Self::Enum8(v) => write!(f, "{v}"),
            Self::U16(v) => write!(f, "{v}"),
        }
    }
}

/// An attribute write addressed to an endpoint, as delivered by the network
/// layer after a remote party changed one of its attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeWrite {
    pub cluster: ClusterId,
    pub attribute: AttributeId,
    pub value: AttributeValue,
}

impl AttributeWrite {
    #[must_use]
    pub const fn new(cluster: ClusterId, attribute: AttributeId, value: AttributeValue) -> Self {
        Self {
            cluster,
            attribute,
            value,
        }
    }

    /// Shorthand for the type of the written value.
    #[must_use]
    pub const fn value_type(&self) -> AttributeType {
        self.value.value_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_report_type_of_each_variant() {
        assert_eq!(AttributeValue::Bool(true).value_type(), AttributeType::Bool);
        assert_eq!(AttributeValue::U16(3600).value_type(), AttributeType::U16);
        assert_eq!(AttributeValue::Enum8(1).value_type(), AttributeType::Enum8);
    }

    #[test]
    fn should_use_zcl_type_codes() {
        assert_eq!(AttributeType::Bool.code(), 0x10);
        assert_eq!(AttributeType::U16.code(), 0x21);
    }

    #[test]
    fn should_serialize_value_with_type_tag() {
        let json = serde_json::to_string(&AttributeValue::U16(50)).unwrap();
        assert_eq!(json, r#"{"type":"u16","value":50}"#);
    }

    #[test]
    fn should_distinguish_values_of_different_types() {
        assert_ne!(AttributeValue::U8(5), AttributeValue::U16(5));
        assert_ne!(AttributeValue::U8(1), AttributeValue::Enum8(1));
    }

    #[test]
    fn should_expose_type_on_write() {
        let write = AttributeWrite::new(
            ClusterId::ON_OFF,
            AttributeId::ON_OFF,
            AttributeValue::Bool(false),
        );
        assert_eq!(write.value_type(), AttributeType::Bool);
    }
}
