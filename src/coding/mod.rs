//! Spike codes turning normalized analog values into binary spike patterns.
//!
//! # Components
//!
//! - **Signal**: the value's magnitude on an exponential [`ThresholdLadder`]
//! - **Delta**: the change since the previous value on the same ladder
//! - **Binary**: the magnitude quantized into `2^L` buckets, MSB first
//!
//! Every component occupies a positive-polarity half and a negative-polarity
//! half; the sign of the encoded quantity selects the half that may spike.
//!
//! # Example
//!
//! ```rust
//! use resin::coding::{SpikeCode, SpikeCodeParams};
//!
//! let mut coder = SpikeCode::new(&SpikeCodeParams {
//!     component_half_code_length: 4,
//!     signal_component: true,
//!     delta_component: true,
//!     ..Default::default()
//! }).unwrap();
//!
//! assert_eq!(coder.code_len(), 16);
//! coder.encode(0.5);
//! assert_eq!(coder.code().len(), 16);
//! ```

mod input_coder;
mod ladder;
mod spike_code;

pub use input_coder::{InputSpikesCoder, SpikingCoding};
pub use ladder::ThresholdLadder;
pub use spike_code::{
    CodeCombination, CodeComponent, SpikeCode, SpikeCodeParams, MAX_HALF_CODE_LENGTH,
};
