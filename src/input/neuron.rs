//! The contract between input fields and the neurons they stimulate.

use crate::types::{NeuronHandle, Real};
use crate::utils::RunningStats;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Role of an input neuron within its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NeuronKind {
    /// Receives the filtered analog value.
    Analog,
    /// Receives one bit of the spike code.
    Spiking,
}

/// Where a neuron is attached, passed to the neuron factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeuronPlacement {
    /// Handle assigned by the encoder.
    pub handle: NeuronHandle,
    /// Index of the owning field.
    pub field_idx: usize,
    /// Role of the neuron.
    pub kind: NeuronKind,
    /// Code bit driving the neuron (spiking neurons only).
    pub code_bit: Option<usize>,
}

/// Push interface an input field drives once per encoded time point.
pub trait InputNeuron {
    /// Stable handle of this neuron.
    fn handle(&self) -> NeuronHandle;

    /// Role of this neuron.
    fn kind(&self) -> NeuronKind;

    /// Sets the stimulation for the next computation cycle.
    fn new_stimulation(&mut self, input: Real, bias: Real);

    /// Computes the neuron's output from the pending stimulation.
    ///
    /// Statistics are only updated when `collect_statistics` is true, so
    /// boot cycles leave no trace in them.
    fn recompute(&mut self, collect_statistics: bool);

    /// Current output signal.
    fn output(&self) -> Real;

    /// Clears the neuron state and optionally its statistics.
    fn reset(&mut self, reset_statistics: bool);
}

/// Statistics gathered by a [`PassThroughNeuron`].
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NeuronStatistics {
    /// Total stimulation received per recorded cycle.
    pub stimulation: RunningStats,
    /// Output signal per recorded cycle.
    pub output: RunningStats,
    /// Number of recorded cycles in which the neuron spiked.
    pub spikes: u64,
}

impl NeuronStatistics {
    /// Fraction of recorded cycles with a spike.
    pub fn firing_rate(&self) -> Real {
        let cycles = self.output.count();
        if cycles == 0 {
            return 0.0;
        }
        self.spikes as Real / cycles as Real
    }
}

/// Input neuron whose output follows its stimulation.
///
/// An analog neuron outputs `input + bias`. A spiking neuron fires (outputs 1)
/// when `input + bias >= 1` and is silent otherwise.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PassThroughNeuron {
    handle: NeuronHandle,
    kind: NeuronKind,
    stimulation: Real,
    output: Real,
    statistics: NeuronStatistics,
}

impl PassThroughNeuron {
    /// Creates a neuron for the given placement.
    pub fn new(placement: NeuronPlacement) -> Self {
        Self {
            handle: placement.handle,
            kind: placement.kind,
            stimulation: 0.0,
            output: 0.0,
            statistics: NeuronStatistics::default(),
        }
    }

    /// Collected statistics.
    pub fn statistics(&self) -> &NeuronStatistics {
        &self.statistics
    }

    /// Returns true if the last computation produced a spike.
    pub fn spiked(&self) -> bool {
        self.kind == NeuronKind::Spiking && self.output > 0.0
    }
}

impl InputNeuron for PassThroughNeuron {
    fn handle(&self) -> NeuronHandle {
        self.handle
    }

    fn kind(&self) -> NeuronKind {
        self.kind
    }

    fn new_stimulation(&mut self, input: Real, bias: Real) {
        self.stimulation = input + bias;
    }

    fn recompute(&mut self, collect_statistics: bool) {
        self.output = match self.kind {
            NeuronKind::Analog => self.stimulation,
            NeuronKind::Spiking => {
                if self.stimulation >= 1.0 {
                    1.0
                } else {
                    0.0
                }
            }
        };
        if collect_statistics {
            self.statistics.stimulation.add(self.stimulation);
            self.statistics.output.add(self.output);
            if self.spiked() {
                self.statistics.spikes += 1;
            }
        }
    }

    fn output(&self) -> Real {
        self.output
    }

    fn reset(&mut self, reset_statistics: bool) {
        self.stimulation = 0.0;
        self.output = 0.0;
        if reset_statistics {
            self.statistics = NeuronStatistics::default();
        }
    }
}
