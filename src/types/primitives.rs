//! Primitive type definitions shared by every encoding stage.
//!
//! Analog values travel through the crate as [`Real`]; spike codes are stored
//! as one byte per bit so that they can be handed to neurons without unpacking.

/// 32-bit floating point number.
pub type Real32 = f32;

/// 64-bit floating point number.
pub type Real64 = f64;

/// Default floating point type used for all analog values.
pub type Real = Real64;

/// One element of a spike code. Always 0 or 1.
pub type CodeBit = u8;

/// Index of a variable inside an input pattern.
pub type VarIdx = usize;

/// Epsilon for floating point comparisons.
pub const EPSILON: Real = 1e-9;

/// Sentinel for "let the unifier derive the number of time points".
pub const AUTO_TIME_POINTS: i32 = -1;

/// Stable identifier of an input neuron.
///
/// The encoder assigns handles sequentially while it builds its fields;
/// beyond that the handle carries no meaning to the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NeuronHandle(pub u32);

impl NeuronHandle {
    /// Returns the raw handle value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for NeuronHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "n#{}", self.0)
    }
}

/// Returns true when two reals are equal within [`EPSILON`].
#[inline]
#[must_use]
pub fn approx_eq(a: Real, b: Real) -> bool {
    (a - b).abs() <= EPSILON
}
