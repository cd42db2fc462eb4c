//! # minivalve-domain
//!
//! Pure domain model for a network-addressable valve with automatic shutoff.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Attributes** (typed values exposed to the network layer)
//! - Define **ZCL status codes** returned by the network layer
//! - Define the **endpoint declaration** (profile, device type, clusters)
//! - Contain the valve's pure logic: on-time arithmetic and the timer
//!   decision taken after every state change
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod attribute;
pub mod endpoint;
pub mod status;
pub mod valve;
