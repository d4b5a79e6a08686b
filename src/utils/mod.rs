//! Utility modules.
//!
//! Deterministic random numbers for the generated fields and running
//! statistics shared by the feature filters and the input neurons.

mod random;
mod stats;

pub use random::Random;
pub use stats::RunningStats;
