//! ZCL status codes returned by the network layer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Result of an attribute operation as reported by the network layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", from = "u8")]
pub enum ZclStatus {
    Success,
    Failure,
    NotAuthorized,
    NotFound,
    UnsupportedAttribute,
    InvalidValue,
    ReadOnly,
    InvalidDataType,
    Other(u8),
}

impl ZclStatus {
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Success => 0x00,
            Self::Failure => 0x01,
            Self::NotAuthorized => 0x7e,
            Self::NotFound => 0x8b,
            Self::UnsupportedAttribute => 0x86,
            Self::InvalidValue => 0x87,
            Self::ReadOnly => 0x88,
            Self::InvalidDataType => 0x8d,
            Self::Other(code) => code,
        }
    }

    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        match code {
            0x00 => Self::Success,
            0x01 => Self::Failure,
            0x7e => Self::NotAuthorized,
            0x8b => Self::NotFound,
            0x86 => Self::UnsupportedAttribute,
            0x87 => Self::InvalidValue,
            0x88 => Self::ReadOnly,
            0x8d => Self::InvalidDataType,
            other => Self::Other(other),
        }
    }

    /// Symbolic name as printed by the protocol stack.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
            Self::NotAuthorized => "NOT_AUTHORIZED",
            Self::NotFound => "NOT_FOUND",
            Self::UnsupportedAttribute => "UNSUPPORTED_ATTRIBUTE",
            Self::InvalidValue => "INVALID_VALUE",
            Self::ReadOnly => "READ_ONLY",
            Self::InvalidDataType => "INVALID_DATA_TYPE",
            Self::Other(_) => "UNKNOWN",
        }
    }

    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl From<u8> for ZclStatus {
    fn from(code: u8) -> Self {
        Self::from_code(code)
    }
}

impl From<ZclStatus> for u8 {
    fn from(status: ZclStatus) -> Self {
        status.code()
    }
}

impl fmt::Display for ZclStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02x}: {}", self.code(), self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_map_known_codes_both_ways() {
        for status in [
            ZclStatus::Success,
            ZclStatus::Failure,
            ZclStatus::NotAuthorized,
            ZclStatus::NotFound,
            ZclStatus::UnsupportedAttribute,
            ZclStatus::InvalidValue,
            ZclStatus::ReadOnly,
            ZclStatus::InvalidDataType,
        ] {
            assert_eq!(ZclStatus::from_code(status.code()), status);
        }
    }

    #[test]
    fn should_keep_unknown_codes() {
        let status = ZclStatus::from_code(0xc3);
        assert_eq!(status, ZclStatus::Other(0xc3));
        assert_eq!(status.code(), 0xc3);
        assert_eq!(status.name(), "UNKNOWN");
    }

    #[test]
    fn should_only_treat_success_as_success() {
        assert!(ZclStatus::Success.is_success());
        assert!(!ZclStatus::ReadOnly.is_success());
    }

    #[test]
    fn should_display_code_and_name() {
        assert_eq!(ZclStatus::ReadOnly.to_string(), "0x88: READ_ONLY");
    }

    #[test]
    fn should_serialize_as_code() {
        let json = serde_json::to_string(&ZclStatus::UnsupportedAttribute).unwrap();
        assert_eq!(json, "134");
    }
}
