//! Typed numeric identifiers used on the wire by the network layer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident($inner:ty), $fmt:literal) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name($inner);

        impl $name {
            /// Wrap a raw identifier.
            #[must_use]
            pub const fn new(raw: $inner) -> Self {
                Self(raw)
            }

            /// Access the raw identifier.
            #[must_use]
            pub const fn get(self) -> $inner {
                self.0
            }
        }

        impl From<$inner> for $name {
            fn from(raw: $inner) -> Self {
                Self(raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, $fmt, self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                    Some(hex) => <$inner>::from_str_radix(hex, 16).map(Self),
                    None => s.parse().map(Self),
                }
            }
        }
    };
}

define_id!(
    /// Addressable unit on the network exposing one or more clusters.
    EndpointId(u8),
    "{}"
);

define_id!(
    /// Logical grouping of attributes and commands.
    ClusterId(u16),
    "0x{:04x}"
);

define_id!(
    /// Attribute identifier, scoped to a cluster.
    AttributeId(u16),
    "0x{:04x}"
);

define_id!(
    /// Application profile an endpoint belongs to.
    ProfileId(u16),
    "0x{:04x}"
);

define_id!(
    /// Device type advertised by an endpoint.
    DeviceTypeId(u16),
    "0x{:04x}"
);

impl EndpointId {
    /// Endpoint used when none is configured.
    pub const DEFAULT: Self = Self(10);

    /// Whether the id falls in the application endpoint range (`1..=240`).
    #[must_use]
    pub const fn is_application(self) -> bool {
        self.0 >= 1 && self.0 <= 240
    }
}

impl ClusterId {
    pub const BASIC: Self = Self(0x0000);
    pub const IDENTIFY: Self = Self(0x0003);
    pub const GROUPS: Self = Self(0x0004);
    pub const SCENES: Self = Self(0x0005);
    pub const ON_OFF: Self = Self(0x0006);
}

impl AttributeId {
    /// Basic cluster: ZCL version.
    pub const ZCL_VERSION: Self = Self(0x0000);
    /// Basic cluster: power source.
    pub const POWER_SOURCE: Self = Self(0x0007);
    /// Identify cluster: remaining identify time.
    pub const IDENTIFY_TIME: Self = Self(0x0000);
    /// On/Off cluster: current on/off value.
    pub const ON_OFF: Self = Self(0x0000);
    /// On/Off cluster: global scene control flag.
    pub const GLOBAL_SCENE_CONTROL: Self = Self(0x4000);
    /// On/Off cluster: auto-off duration in tenths of a second.
    pub const ON_TIME: Self = Self(0x4001);
    /// On/Off cluster: off wait time in tenths of a second.
    pub const OFF_WAIT_TIME: Self = Self(0x4002);
}

impl ProfileId {
    pub const HOME_AUTOMATION: Self = Self(0x0104);
}

impl DeviceTypeId {
    pub const ON_OFF_LIGHT: Self = Self(0x0100);
}
