//! Search session: repeated runs of one plan.

mod runner;
mod stats;

pub use runner::{Session, SessionConfig};
pub use stats::SessionStats;
