//! # Contracts
//!
//! Frozen interface contracts shared by every crate of the search dispatcher.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Data Model
//! - `Query` is opaque text, passed unchanged through every layer
//! - `Answer` is produced once per successful backend call
//! - `ResultCollection` keeps arrival order, never category order

mod error;
mod label;
mod plan;
mod result;
mod search;

pub use error::*;
pub use label::{Category, Query};
pub use plan::*;
pub use result::*;
pub use search::{BackendGroup, LocalSearchBackend, SearchBackend};
