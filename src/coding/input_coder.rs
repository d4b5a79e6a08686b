//! Per-field spike coder honoring the encoder's spiking regime.

use crate::coding::{CodeCombination, SpikeCode, SpikeCodeParams};
use crate::error::Result;
use crate::types::{CodeBit, Real};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How analog inputs are presented to spiking input neurons.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SpikingCoding {
    /// No spiking input neurons; only the analog neuron is driven.
    Forbidden,
    /// One spiking neuron per code bit, all bits presented at once.
    Population(SpikeCodeParams),
}

impl Default for SpikingCoding {
    fn default() -> Self {
        SpikingCoding::Population(SpikeCodeParams::default())
    }
}

/// Spike coder owned by an input field.
///
/// In the forbidden regime the code is empty and every operation is a no-op.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InputSpikesCoder {
    code: Option<SpikeCode>,
}

impl InputSpikesCoder {
    /// Creates a coder for the given regime.
    pub fn new(coding: &SpikingCoding) -> Result<Self> {
        let code = match coding {
            SpikingCoding::Forbidden => None,
            SpikingCoding::Population(params) => Some(SpikeCode::new(params)?),
        };
        Ok(Self { code })
    }

    /// Returns true when spiking is disabled.
    pub fn is_forbidden(&self) -> bool {
        self.code.is_none()
    }

    /// Length of the code, which is also the number of spiking neurons.
    pub fn code_len(&self) -> usize {
        self.code.as_ref().map_or(0, SpikeCode::code_len)
    }

    /// The underlying spike code, if spiking is enabled.
    pub fn spike_code(&self) -> Option<&SpikeCode> {
        self.code.as_ref()
    }

    /// The current code.
    pub fn code(&self) -> &[CodeBit] {
        match &self.code {
            Some(code) => code.code(),
            None => &[],
        }
    }

    /// Encodes a value from `[-1, 1]`.
    pub fn encode(&mut self, value: Real) -> &[CodeBit] {
        match self.code.as_mut() {
            Some(code) => code.encode(value),
            None => &[],
        }
    }

    /// Clears the coder state.
    pub fn reset(&mut self) {
        if let Some(code) = self.code.as_mut() {
            code.reset();
        }
    }

    /// See [`SpikeCode::combinations`].
    pub fn combinations(&self, n: usize) -> Vec<CodeCombination> {
        self.code
            .as_ref()
            .map_or_else(Vec::new, |code| code.combinations(n))
    }
}
