//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod endpoint;
pub mod network;
pub mod timer;

pub use endpoint::Endpoint;
pub use network::AttributeStore;
pub use timer::{Deadline, TimerCallback, TimerError, TimerHandle, TimerService};
