//! # Resin - Reservoir Input Encoding in Rust
//!
//! Resin turns raw multi-field numeric input into stimulation of the input
//! neurons of a spiking reservoir. It covers the whole input side of a
//! reservoir computer:
//!
//! ## Overview
//!
//! - **Feature filters**: Calibrated normalization of real, binary and enum fields
//! - **Spike coding**: Threshold-ladder population codes with optional delta and binary components
//! - **Pattern unification**: Detrending, amplitude unification and resampling of
//!   multi-variable time series
//! - **Input fields**: Filter, coder and neurons of one named input channel
//! - **Input encoder**: Calibration pass, continuous and patterned feeding,
//!   bidirectional replay and routing of raw values to the readout
//!
//! ## Quick Start
//!
//! ```rust
//! use resin::prelude::*;
//!
//! let params = InputEncoderParams {
//!     feeding: FeedingParams::Patterned(PatternedFeedingParams {
//!         slices: 2,
//!         ..Default::default()
//!     }),
//!     fields: vec![FieldParams::external("x"), FieldParams::external("y")],
//!     ..Default::default()
//! };
//! let mut encoder = InputEncoder::new(&params).unwrap();
//!
//! // Two variables with three time points each, grouped by variable
//! let samples = vec![
//!     vec![0.0, 1.0, 2.0, 5.0, 4.0, 3.0],
//!     vec![2.0, 1.0, 0.0, 3.0, 4.0, 5.0],
//! ];
//! encoder.initialize(&samples).unwrap();
//!
//! encoder.store_new_data(&samples[0]).unwrap();
//! let mut steps = 0;
//! while encoder.encode_next_input_data(true).unwrap() {
//!     steps += 1;
//! }
//! assert_eq!(steps, 3);
//! ```
//!
//! ## Feature Flags
//!
//! - `rayon` (default): Parallel calibration of the feature filters
//! - `serde`: Serialization of parameters and calibrated state
//!
//! ## Logging
//!
//! Resin emits [`tracing`] events and never installs a subscriber.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod coding;
pub mod filters;
pub mod input;
pub mod pattern;
pub mod types;
pub mod utils;

#[cfg(feature = "serde")]
pub mod serialization;

/// Re-export of commonly used types and traits for convenience.
pub mod prelude {
    pub use crate::types::{CodeBit, Interval, NeuronHandle, Real, AUTO_TIME_POINTS};
    pub use crate::filters::{
        FeatureFilter, FeatureFilterParams, FeatureKind,
        RealFilterParams, EnumFilterParams,
    };
    pub use crate::coding::{InputSpikesCoder, SpikeCode, SpikeCodeParams, SpikingCoding};
    pub use crate::pattern::{
        InputPattern, VariablesSchema,
        PatternUnifier, ResamplingMethod, ResamplingParams, UnificationParams,
    };
    pub use crate::input::{
        InputEncoder, InputEncoderParams, EncoderState,
        FieldParams, FieldSource, SteadyFieldParams,
        FeedingParams, FeedingType, ContinuousFeedingParams, PatternedFeedingParams,
        GeneratorParams, TransformerParams, PulseTiming,
        InputNeuron, PassThroughNeuron, RoutedValueDescriptor,
    };
    pub use crate::utils::Random;

    #[cfg(feature = "serde")]
    pub use crate::serialization::{Serializable, SerializableFormat};
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error types for the library.
pub mod error {
    use crate::types::Real;
    use thiserror::Error;

    /// Main error type for resin operations.
    #[derive(Error, Debug)]
    pub enum ResinError {
        /// Invalid or inconsistent parameter, detected at construction.
        #[error("Invalid parameter '{name}': {message}")]
        Configuration {
            /// Name of the invalid parameter.
            name: &'static str,
            /// Description of the error.
            message: String,
        },

        /// Value outside the representable set of a feature kind.
        #[error("Value {value} out of domain: {message}")]
        Domain {
            /// The offending value.
            value: Real,
            /// Description of the error.
            message: String,
        },

        /// Shape mismatch in runtime data.
        #[error("Invalid data: {0}")]
        Data(String),

        /// Operation not allowed in the current state.
        #[error("Invalid state: {0}")]
        State(String),

        /// Serialization error.
        #[cfg(feature = "serde")]
        #[error("Serialization error: {message}")]
        Serialization {
            /// Description of the serialization error.
            message: String,
        },

        /// I/O error.
        #[error("I/O error: {message}")]
        Io {
            /// Description of the I/O error.
            message: String,
        },
    }

    impl ResinError {
        /// Returns true for configuration errors.
        pub fn is_configuration(&self) -> bool {
            matches!(self, ResinError::Configuration { .. })
        }

        /// Returns true for domain errors.
        pub fn is_domain(&self) -> bool {
            matches!(self, ResinError::Domain { .. })
        }

        /// Returns true for data errors.
        pub fn is_data(&self) -> bool {
            matches!(self, ResinError::Data(_))
        }

        /// Returns true for state errors.
        pub fn is_state(&self) -> bool {
            matches!(self, ResinError::State(_))
        }
    }

    /// Result type alias using ResinError.
    pub type Result<T> = std::result::Result<T, ResinError>;
}

pub use error::{ResinError, Result};
