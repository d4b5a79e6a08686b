//! Input fields and the input encoder.
//!
//! An [`InputEncoder`] owns one [`InputField`] per configured channel.
//! External fields receive caller data, transformed and generated fields
//! are computed for every input vector, and steady fields (patterned
//! feeding only) carry per-pattern constants straight to the readout.

mod encoder;
mod field;
mod neuron;
mod params;
mod synthetic;

pub use encoder::{EncoderState, InputEncoder, RoutedValueDescriptor};
pub use field::{FieldOrigin, InputField};
pub use neuron::{InputNeuron, NeuronKind, NeuronPlacement, NeuronStatistics, PassThroughNeuron};
pub use params::{
    ContinuousFeedingParams, FeedingParams, FeedingType, FieldParams, FieldSource,
    InputEncoderParams, PatternedFeedingParams, SteadyFieldParams,
};
pub use synthetic::{Generator, GeneratorParams, PulseTiming, Transformer, TransformerParams};
