//! Patterned input: multi-variable time series and their unification.
//!
//! A pattern is one example made of several variables observed over time.
//! Before it reaches the input fields it is unified:
//!
//! 1. optional linear detrending of every variable
//! 2. optional amplitude unification (unit peak magnitude)
//! 3. detection of the active signal window by threshold crossing
//! 4. resampling of the window onto a fixed or automatically derived length

mod input_pattern;
pub mod signal;
mod unifier;

pub use input_pattern::{InputPattern, VariablesSchema};
pub use signal::ResamplingMethod;
pub use unifier::{PatternUnifier, ResamplingParams, SignalWindow, UnificationParams};
