//! Core types for the encoding pipeline.
//!
//! This module contains primitive aliases, the [`Interval`] range type and the
//! neuron handle used to address input neurons.

mod interval;
mod primitives;

pub use interval::Interval;
pub use primitives::*;
