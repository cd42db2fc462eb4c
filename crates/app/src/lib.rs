//! # minivalve-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `AttributeStore` — mirror attribute values into the network layer
//!   - `TimerService` — one-shot timers that can be re-armed or cancelled
//! - Define the **endpoint capability** the network layer dispatches inbound
//!   attribute writes to (`Endpoint`)
//! - Provide the **valve controller** use-case, which owns the valve state
//!   machine and keeps the network attribute and the turn-off timer consistent
//!   with it
//!
//! ## Dependency rule
//! Depends on `minivalve-domain` only.
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod services;
