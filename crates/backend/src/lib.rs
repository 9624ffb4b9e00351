//! # Backend
//!
//! Simulated search backends.
//!
//! Responsibilities:
//! - `BackendStub`: sleep for a simulated service time, then answer
//! - `BackendFactory`: build backend groups (one per category) from a `SearchPlan`

pub mod factory;
pub mod stub;

pub use factory::{new_backend, BackendFactory};
pub use stub::{BackendStub, LatencyModel};
