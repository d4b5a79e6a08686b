//! A named input channel: filter, spike coder and input neurons.

use crate::coding::{CodeCombination, InputSpikesCoder, SpikingCoding};
use crate::error::Result;
use crate::filters::{FeatureFilter, FeatureFilterParams};
use crate::input::neuron::{InputNeuron, NeuronKind, NeuronPlacement};
use crate::types::{CodeBit, Interval, NeuronHandle, Real};

/// Where the values of a field come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldOrigin {
    /// Supplied by the caller in every input vector.
    External,
    /// Derived from preceding fields.
    Transformed,
    /// Produced by a generator.
    Generated,
}

/// One input channel of the encoder.
///
/// Every value pushed through the field is normalized by the feature
/// filter, presented to the analog neuron, rescaled onto `[-1, 1]` and
/// spike coded for the spiking neurons (one neuron per code bit).
#[derive(Debug)]
pub struct InputField<N: InputNeuron> {
    name: String,
    idx: usize,
    origin: FieldOrigin,
    route_to_readout: bool,
    data_range: Interval,
    filter: FeatureFilter,
    coder: InputSpikesCoder,
    analog: N,
    spiking: Vec<N>,
    last_value: Option<Real>,
}

impl<N: InputNeuron> InputField<N> {
    /// Creates the field and its neurons.
    ///
    /// `next_handle` is advanced past the handles given to the field's
    /// neurons.
    #[allow(clippy::too_many_arguments)]
    pub fn new<F>(
        name: impl Into<String>,
        idx: usize,
        origin: FieldOrigin,
        route_to_readout: bool,
        data_range: Interval,
        filter: &FeatureFilterParams,
        coding: &SpikingCoding,
        next_handle: &mut u32,
        make_neuron: &mut F,
    ) -> Result<Self>
    where
        F: FnMut(NeuronPlacement) -> N,
    {
        let filter = FeatureFilter::new(data_range, filter)?;
        let coder = InputSpikesCoder::new(coding)?;

        let mut place = |kind, code_bit| {
            let placement = NeuronPlacement {
                handle: NeuronHandle(*next_handle),
                field_idx: idx,
                kind,
                code_bit,
            };
            *next_handle += 1;
            make_neuron(placement)
        };
        let analog = place(NeuronKind::Analog, None);
        let spiking = (0..coder.code_len())
            .map(|bit| place(NeuronKind::Spiking, Some(bit)))
            .collect();

        Ok(Self {
            name: name.into(),
            idx,
            origin,
            route_to_readout,
            data_range,
            filter,
            coder,
            analog,
            spiking,
            last_value: None,
        })
    }

    /// Field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position of the field in the input vector.
    pub fn idx(&self) -> usize {
        self.idx
    }

    /// Where the field's values come from.
    pub fn origin(&self) -> FieldOrigin {
        self.origin
    }

    /// Returns true if raw values of the field are routed to the readout.
    pub fn route_to_readout(&self) -> bool {
        self.route_to_readout
    }

    /// The feature filter.
    pub fn filter(&self) -> &FeatureFilter {
        &self.filter
    }

    pub(crate) fn filter_mut(&mut self) -> &mut FeatureFilter {
        &mut self.filter
    }

    /// The spike coder.
    pub fn coder(&self) -> &InputSpikesCoder {
        &self.coder
    }

    /// Current spike code.
    pub fn code(&self) -> &[CodeBit] {
        self.coder.code()
    }

    /// The analog input neuron.
    pub fn analog_neuron(&self) -> &N {
        &self.analog
    }

    /// The spiking input neurons, one per code bit.
    pub fn spiking_neurons(&self) -> &[N] {
        &self.spiking
    }

    /// All neurons of the field, analog first.
    pub fn neurons(&self) -> impl Iterator<Item = &N> {
        std::iter::once(&self.analog).chain(self.spiking.iter())
    }

    /// Number of neurons owned by the field.
    pub fn num_neurons(&self) -> usize {
        1 + self.spiking.len()
    }

    /// Raw value of the last time point pushed through the field.
    pub fn last_value(&self) -> Option<Real> {
        self.last_value
    }

    /// Pushes one raw value through filter, coder and neurons.
    ///
    /// A value the filter rejects leaves coder and neurons untouched.
    pub fn set_new_data(&mut self, value: Real, collect_statistics: bool) -> Result<()> {
        let filtered = self.filter_value(value)?;
        self.stimulate(value, filtered, collect_statistics);
        Ok(())
    }

    /// Applies the field's filter without touching coder or neurons.
    pub fn filter_value(&self, value: Real) -> Result<Real> {
        self.filter.apply(value)
    }

    /// Stimulates the neurons with an already filtered value.
    pub(crate) fn stimulate(&mut self, value: Real, filtered: Real, collect_statistics: bool) {
        self.analog.new_stimulation(filtered, 0.0);
        self.analog.recompute(collect_statistics);

        let code = self.coder.encode(self.data_range.to_symmetric_unit(filtered));
        for (neuron, &bit) in self.spiking.iter_mut().zip(code) {
            neuron.new_stimulation(Real::from(bit), 0.0);
            neuron.recompute(collect_statistics);
        }

        self.last_value = Some(value);
    }

    /// Combinations of spiking neuron indices for downstream wiring.
    pub fn spiking_input_combinations(&self, n: usize) -> Vec<CodeCombination> {
        self.coder.combinations(n)
    }

    /// Forgets the filter calibration.
    pub fn reset_filter(&mut self) {
        self.filter.reset();
    }

    /// Clears coder history and neuron state.
    pub fn reset_neurons(&mut self, reset_statistics: bool) {
        self.coder.reset();
        self.analog.reset(reset_statistics);
        for neuron in &mut self.spiking {
            neuron.reset(reset_statistics);
        }
        self.last_value = None;
    }
}
