//! Threshold/delta/binary spike code.

use smallvec::SmallVec;

use crate::coding::ThresholdLadder;
use crate::error::{ResinError, Result};
use crate::types::{CodeBit, Real};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum half-code length. Bounded by the binary component's bucket count.
pub const MAX_HALF_CODE_LENGTH: usize = 32;

/// Index set produced by [`SpikeCode::combinations`].
pub type CodeCombination = SmallVec<[usize; 2]>;

/// Parameters for creating a [`SpikeCode`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpikeCodeParams {
    /// Number of bits per polarity of one component.
    pub component_half_code_length: usize,

    /// Lowest non-zero threshold of the ladder, in `(0, 1)`.
    pub low_threshold: Real,

    /// Encode the value itself through the threshold ladder.
    pub signal_component: bool,

    /// Encode the change from the previous value through the threshold ladder.
    pub delta_component: bool,

    /// Encode the magnitude as an MSB-first binary number.
    pub binary_component: bool,

    /// Fire every exceeded threshold instead of only the highest one.
    pub full_spike_set: bool,
}

impl Default for SpikeCodeParams {
    fn default() -> Self {
        Self {
            component_half_code_length: 8,
            low_threshold: 1e-3,
            signal_component: true,
            delta_component: false,
            binary_component: false,
            full_spike_set: false,
        }
    }
}

/// One section of the code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CodeComponent {
    /// Value strength on the threshold ladder.
    Signal,
    /// Change since the previous value on the threshold ladder.
    Delta,
    /// Quantized magnitude as a binary number.
    Binary,
}

/// Converts values from `[-1, 1]` into a fixed-length binary code.
///
/// The code consists of one section per enabled component, in the order
/// signal, delta, binary. Each section is split into a positive-polarity
/// half followed by a negative-polarity half of
/// `component_half_code_length` bits each. The code length never changes
/// after construction.
///
/// # Example
///
/// ```rust
/// use resin::coding::{SpikeCode, SpikeCodeParams};
///
/// let mut coder = SpikeCode::new(&SpikeCodeParams {
///     component_half_code_length: 4,
///     ..Default::default()
/// }).unwrap();
///
/// assert_eq!(coder.code_len(), 8);
/// let code = coder.encode(1.0);
/// assert_eq!(code, &[1, 0, 0, 0, 0, 0, 0, 0]);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpikeCode {
    half_len: usize,
    ladder: ThresholdLadder,
    components: SmallVec<[CodeComponent; 3]>,
    full_spike_set: bool,
    previous: Option<Real>,
    code: Vec<CodeBit>,
}

impl SpikeCode {
    /// Creates a new spike code.
    pub fn new(params: &SpikeCodeParams) -> Result<Self> {
        let half_len = params.component_half_code_length;
        if half_len == 0 || half_len > MAX_HALF_CODE_LENGTH {
            return Err(ResinError::Configuration {
                name: "component_half_code_length",
                message: format!("Must be in 1..={MAX_HALF_CODE_LENGTH}, got {half_len}"),
            });
        }

        let mut components = SmallVec::new();
        if params.signal_component {
            components.push(CodeComponent::Signal);
        }
        if params.delta_component {
            components.push(CodeComponent::Delta);
        }
        if params.binary_component {
            components.push(CodeComponent::Binary);
        }
        if components.is_empty() {
            return Err(ResinError::Configuration {
                name: "components",
                message: "At least one spike code component must be enabled".to_string(),
            });
        }

        let ladder = ThresholdLadder::new(half_len, params.low_threshold)?;
        let code_len = components.len() * 2 * half_len;

        Ok(Self {
            half_len,
            ladder,
            components,
            full_spike_set: params.full_spike_set,
            previous: None,
            code: vec![0; code_len],
        })
    }

    /// Bits per polarity half.
    pub fn half_len(&self) -> usize {
        self.half_len
    }

    /// Total code length.
    pub fn code_len(&self) -> usize {
        self.code.len()
    }

    /// Enabled components in code order.
    pub fn components(&self) -> &[CodeComponent] {
        &self.components
    }

    /// The threshold ladder shared by the signal and delta components.
    pub fn thresholds(&self) -> &[Real] {
        self.ladder.thresholds()
    }

    /// The most recently computed code.
    pub fn code(&self) -> &[CodeBit] {
        &self.code
    }

    /// Number of set bits in the current code.
    pub fn num_spikes(&self) -> usize {
        self.code.iter().filter(|&&b| b != 0).count()
    }

    /// Offset of the component's section in the code.
    pub fn component_offset(&self, component: CodeComponent) -> Option<usize> {
        self.components
            .iter()
            .position(|&c| c == component)
            .map(|i| i * 2 * self.half_len)
    }

    /// Clears the code and the previous-value state.
    pub fn reset(&mut self) {
        self.code.iter_mut().for_each(|b| *b = 0);
        self.previous = None;
    }

    /// Encodes a value and returns the new code.
    ///
    /// The value is bounded to `[-1, 1]`; NaN encodes as zero.
    pub fn encode(&mut self, value: Real) -> &[CodeBit] {
        let value = if value.is_nan() { 0.0 } else { value.clamp(-1.0, 1.0) };
        let delta = match self.previous {
            Some(prev) => (value - prev) / 2.0,
            None => 0.0,
        };
        self.previous = Some(value);

        self.code.iter_mut().for_each(|b| *b = 0);
        let section_len = 2 * self.half_len;
        for (i, &component) in self.components.iter().enumerate() {
            let section = &mut self.code[i * section_len..(i + 1) * section_len];
            match component {
                CodeComponent::Signal => {
                    encode_ladder(&self.ladder, self.full_spike_set, value, section)
                }
                CodeComponent::Delta => {
                    encode_ladder(&self.ladder, self.full_spike_set, delta, section)
                }
                CodeComponent::Binary => encode_binary(self.half_len, value, section),
            }
        }
        &self.code
    }

    /// Enumerates up to `n` index sets of code bits.
    ///
    /// Single bits come first, then, when both the signal and the delta
    /// components are enabled, every signal bit paired with every delta bit.
    pub fn combinations(&self, n: usize) -> Vec<CodeCombination> {
        let mut result = Vec::with_capacity(n.min(self.code.len()));
        for i in 0..self.code.len() {
            if result.len() >= n {
                return result;
            }
            result.push(SmallVec::from_slice(&[i]));
        }

        if let (Some(signal), Some(delta)) = (
            self.component_offset(CodeComponent::Signal),
            self.component_offset(CodeComponent::Delta),
        ) {
            let section_len = 2 * self.half_len;
            for s in signal..signal + section_len {
                for d in delta..delta + section_len {
                    if result.len() >= n {
                        return result;
                    }
                    result.push(SmallVec::from_slice(&[s, d]));
                }
            }
        }
        result
    }
}

/// Splits the section into polarity halves and selects the half by sign.
fn polarity_half(half_len: usize, value: Real, section: &mut [CodeBit]) -> (&mut [CodeBit], Real) {
    let (positive, negative) = section.split_at_mut(half_len);
    if value < 0.0 {
        (negative, -value)
    } else {
        (positive, value)
    }
}

fn encode_ladder(ladder: &ThresholdLadder, full_set: bool, value: Real, section: &mut [CodeBit]) {
    let (half, magnitude) = polarity_half(ladder.len(), value, section);
    if full_set {
        for (bit, &t) in half.iter_mut().zip(ladder.thresholds()) {
            if magnitude > t {
                *bit = 1;
            }
        }
    } else if let Some(idx) = ladder.classify(magnitude) {
        half[idx] = 1;
    }
}

fn encode_binary(half_len: usize, value: Real, section: &mut [CodeBit]) {
    let (half, magnitude) = polarity_half(half_len, value, section);
    let buckets = (1u64 << half_len) as Real;
    let bucket = ((magnitude * buckets).floor() as u64).min((1u64 << half_len) - 1);
    for (i, bit) in half.iter_mut().enumerate() {
        *bit = ((bucket >> (half_len - 1 - i)) & 1) as CodeBit;
    }
}
