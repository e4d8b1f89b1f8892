//! Protocol runtime for the ihop validator harness.
//!
//! Hosts the session state machine, the per-case schema registry, the
//! validation adapter seam, the fault boundary around each `run`, the
//! known-issue skip policy and the NDJSON serve loop that ties them together.

pub mod adapter;
pub mod fault_boundary;
pub mod known_issues;
pub mod registry;
pub mod session;
pub mod smoke;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_support;

pub use adapter::*;
pub use fault_boundary::*;
pub use known_issues::*;
pub use registry::*;
pub use session::*;
pub use smoke::*;
pub use transport::*;
