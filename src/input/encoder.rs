//! Input encoder: calibration pass and feeding state machine.
//!
//! The encoder owns every input field and drives them with the data of one
//! feeding cycle. A cycle starts with [`InputEncoder::store_new_data`] and
//! ends when [`InputEncoder::encode_next_input_data`] returns `false`.
//!
//! # Example
//!
//! ```rust
//! use resin::prelude::*;
//!
//! let params = InputEncoderParams {
//!     fields: vec![FieldParams::external("temperature").routed()],
//!     ..Default::default()
//! };
//! let mut encoder = InputEncoder::new(&params).unwrap();
//! encoder.initialize(&[vec![10.0], vec![30.0]]).unwrap();
//!
//! encoder.store_new_data(&[20.0]).unwrap();
//! assert!(encoder.encode_next_input_data(true).unwrap());
//! assert!(!encoder.encode_next_input_data(true).unwrap());
//!
//! let mut routed = vec![0.0; encoder.num_routed_values()];
//! assert_eq!(encoder.copy_routed_input_data_to(&mut routed, 0).unwrap(), 1);
//! assert_eq!(routed, vec![20.0]);
//! ```

use ahash::AHashMap;
use tracing::{debug, instrument, trace, warn};

use crate::error::{ResinError, Result};
use crate::filters::FeatureFilter;
use crate::input::field::{FieldOrigin, InputField};
use crate::input::neuron::{InputNeuron, NeuronPlacement, PassThroughNeuron};
use crate::input::params::{FeedingParams, FeedingType, FieldSource, InputEncoderParams};
use crate::input::synthetic::{Generator, Transformer};
use crate::pattern::{InputPattern, PatternUnifier, VariablesSchema};
use crate::types::{Interval, Real};

/// Lifecycle state of an [`InputEncoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderState {
    /// Filters are not calibrated yet.
    Uninitialized,
    /// Calibrated, no data stored.
    Initialized,
    /// Presenting stored data in forward order.
    Feeding(FeedingType),
    /// Presenting a stored pattern backward.
    ReverseFeeding,
}

/// Identifies one value copied by [`InputEncoder::copy_routed_input_data_to`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedValueDescriptor {
    /// Name of the source field.
    pub field_name: String,
    /// Index of the field among the input fields, or among the steady
    /// fields when `steady` is true.
    pub field_idx: usize,
    /// Time point of the value within a pattern (patterned feeding only).
    pub time_point: Option<usize>,
    /// The value comes from a steady field.
    pub steady: bool,
}

enum SyntheticSource {
    Transformer(Box<dyn Transformer>),
    Generator(Box<dyn Generator>),
}

impl SyntheticSource {
    fn next(&mut self, row: &[Real]) -> Real {
        match self {
            SyntheticSource::Transformer(t) => t.next(row),
            SyntheticSource::Generator(g) => g.next(),
        }
    }

    fn reset(&mut self) {
        match self {
            SyntheticSource::Transformer(t) => t.reset(),
            SyntheticSource::Generator(g) => g.reset(),
        }
    }
}

#[derive(Debug)]
struct SteadyField {
    name: String,
    filter: FeatureFilter,
}

#[derive(Debug)]
enum Regime {
    Continuous {
        boot_cycles: usize,
    },
    Patterned {
        slices: usize,
        bidir: bool,
        var_schema: VariablesSchema,
        unifier: PatternUnifier,
    },
}

/// Converts raw input vectors into stimulation of input neurons.
///
/// Field layout: external fields first (in declaration order), synthetic
/// fields after them. In the patterned regime a stored vector holds the
/// steady values first, followed by the pattern data.
pub struct InputEncoder<N: InputNeuron = PassThroughNeuron> {
    regime: Regime,
    data_range: Interval,
    fields: Vec<InputField<N>>,
    field_index: AHashMap<String, usize>,
    num_external: usize,
    synthetic: Vec<SyntheticSource>,
    steady: Vec<SteadyField>,
    auto_time_points: Option<usize>,
    fixed_ext_vector_length: Option<usize>,
    routed: Vec<RoutedValueDescriptor>,
    steady_values: Vec<Real>,
    buffer: Vec<Vec<Real>>,
    cursor: usize,
    reverse: bool,
    encoded_steps: u64,
    state: EncoderState,
}

impl InputEncoder<PassThroughNeuron> {
    /// Creates an encoder driving [`PassThroughNeuron`]s.
    pub fn new(params: &InputEncoderParams) -> Result<Self> {
        Self::with_neurons(params, PassThroughNeuron::new)
    }
}

impl<N: InputNeuron> InputEncoder<N> {
    /// Creates an encoder whose neurons are built by `make_neuron`.
    ///
    /// Neuron handles are assigned sequentially: per field the analog
    /// neuron first, then one spiking neuron per code bit.
    pub fn with_neurons<F>(params: &InputEncoderParams, mut make_neuron: F) -> Result<Self>
    where
        F: FnMut(NeuronPlacement) -> N,
    {
        params.validate()?;

        let (regime, steady_params) = match &params.feeding {
            FeedingParams::Continuous(p) => (
                Regime::Continuous {
                    boot_cycles: p.boot_cycles,
                },
                &[][..],
            ),
            FeedingParams::Patterned(p) => (
                Regime::Patterned {
                    slices: p.slices,
                    bidir: p.bidir,
                    var_schema: p.var_schema,
                    unifier: PatternUnifier::new(p.unification.clone())?,
                },
                p.steady_fields.as_slice(),
            ),
        };

        let ordered = params
            .fields
            .iter()
            .filter(|f| f.source.is_external())
            .chain(params.fields.iter().filter(|f| !f.source.is_external()));

        let mut fields = Vec::with_capacity(params.fields.len());
        let mut names: Vec<String> = Vec::with_capacity(params.fields.len());
        let mut synthetic = Vec::new();
        let mut next_handle = 0u32;
        for (idx, field_params) in ordered.enumerate() {
            let origin = match &field_params.source {
                FieldSource::External => FieldOrigin::External,
                FieldSource::Transformed(t) => {
                    synthetic.push(SyntheticSource::Transformer(t.build(&names)?));
                    FieldOrigin::Transformed
                }
                FieldSource::Generated(g) => {
                    synthetic.push(SyntheticSource::Generator(g.build()?));
                    FieldOrigin::Generated
                }
            };
            let coding = field_params
                .spiking_coding
                .as_ref()
                .unwrap_or(&params.spiking_coding);
            fields.push(InputField::new(
                field_params.name.clone(),
                idx,
                origin,
                field_params.route_to_readout,
                params.data_range,
                &field_params.filter,
                coding,
                &mut next_handle,
                &mut make_neuron,
            )?);
            names.push(field_params.name.clone());
        }

        let steady = steady_params
            .iter()
            .map(|s| {
                Ok(SteadyField {
                    name: s.name.clone(),
                    filter: FeatureFilter::new(params.data_range, &s.filter)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let field_index = names
            .into_iter()
            .enumerate()
            .map(|(idx, name)| (name, idx))
            .collect();

        debug!(
            fields = fields.len(),
            steady_fields = steady.len(),
            neurons = next_handle,
            feeding = %params.feeding.feeding_type(),
            "Input encoder created"
        );

        Ok(Self {
            regime,
            data_range: params.data_range,
            num_external: params.num_external_fields(),
            fields,
            field_index,
            synthetic,
            steady,
            auto_time_points: None,
            fixed_ext_vector_length: None,
            routed: Vec::new(),
            steady_values: Vec::new(),
            buffer: Vec::new(),
            cursor: 0,
            reverse: false,
            encoded_steps: 0,
            state: EncoderState::Uninitialized,
        })
    }

    /// Fully resets the encoder and calibrates every feature filter over
    /// the sample vectors. No neuron is stimulated.
    ///
    /// In the patterned regime this also latches the automatic number of
    /// time points and, when any value is routed to the readout, the
    /// length of external vectors.
    #[instrument(level = "debug", skip_all, fields(samples = samples.len()))]
    pub fn initialize(&mut self, samples: &[Vec<Real>]) -> Result<()> {
        self.reset_all();
        if samples.is_empty() {
            return Err(ResinError::Data(
                "At least one calibration sample is required".to_string(),
            ));
        }

        let num_external = self.num_external;
        let routes_anything = !self.steady.is_empty() || self.fields.iter().any(|f| f.route_to_readout());

        let (rows, steady_rows, time_points) = match &self.regime {
            Regime::Continuous { .. } => {
                let mut rows = Vec::with_capacity(samples.len());
                for sample in samples {
                    rows.push(augment_continuous(&mut self.synthetic, sample, num_external)?);
                }
                (rows, Vec::new(), 1)
            }
            Regime::Patterned {
                var_schema,
                unifier,
                ..
            } => {
                let split = samples
                    .iter()
                    .map(|s| split_patterned(s, self.steady.len(), num_external, *var_schema))
                    .collect::<Result<Vec<_>>>()?;

                if unifier.needs_auto_time_points() {
                    let n = unifier.auto_time_points(split.iter().map(|(_, p)| p))?;
                    debug!(time_points = n, "Latched automatic number of time points");
                    self.auto_time_points = Some(n);
                }

                if routes_anything {
                    let len = samples[0].len();
                    if let Some(other) = samples.iter().find(|s| s.len() != len) {
                        return Err(ResinError::Data(format!(
                            "Routing to readout needs equally long input vectors, got {len} and {}",
                            other.len()
                        )));
                    }
                    self.fixed_ext_vector_length = Some(len);
                }

                let mut rows = Vec::new();
                let mut steady_rows = Vec::with_capacity(split.len());
                let mut time_points = 0;
                for (steady, pattern) in split {
                    let expanded = expand_pattern(
                        unifier,
                        self.auto_time_points,
                        &mut self.synthetic,
                        &pattern,
                    )?;
                    if steady_rows.is_empty() {
                        time_points = expanded.len();
                    }
                    rows.extend(expanded);
                    steady_rows.push(steady);
                }
                (rows, steady_rows, time_points)
            }
        };

        self.calibrate(&rows, &steady_rows)?;
        for source in &mut self.synthetic {
            source.reset();
        }
        self.routed = self.routed_descriptors(time_points);
        self.state = EncoderState::Initialized;

        debug!(
            rows = rows.len(),
            routed_values = self.routed.len(),
            "Feature filters calibrated"
        );
        Ok(())
    }

    fn calibrate(&mut self, rows: &[Vec<Real>], steady_rows: &[Vec<Real>]) -> Result<()> {
        let filters: Vec<&mut FeatureFilter> =
            self.fields.iter_mut().map(InputField::filter_mut).collect();

        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;
            filters
                .into_par_iter()
                .enumerate()
                .try_for_each(|(idx, filter)| update_filter(filter, rows, idx))?;
        }
        #[cfg(not(feature = "rayon"))]
        filters
            .into_iter()
            .enumerate()
            .try_for_each(|(idx, filter)| update_filter(filter, rows, idx))?;

        for (idx, steady) in self.steady.iter_mut().enumerate() {
            update_filter(&mut steady.filter, steady_rows, idx)?;
        }

        let degenerate = self
            .fields
            .iter()
            .map(|f| (f.name(), f.filter()))
            .chain(self.steady.iter().map(|s| (s.name.as_str(), &s.filter)));
        for (name, filter) in degenerate {
            if let FeatureFilter::Real(real) = filter {
                if real.is_degenerate() {
                    warn!(field = name, "Calibration data of field has no variance");
                }
            }
        }
        Ok(())
    }

    fn routed_descriptors(&self, time_points: usize) -> Vec<RoutedValueDescriptor> {
        let steady = self
            .steady
            .iter()
            .enumerate()
            .map(|(idx, s)| RoutedValueDescriptor {
                field_name: s.name.clone(),
                field_idx: idx,
                time_point: None,
                steady: true,
            });
        let routed_fields = self.fields.iter().filter(|f| f.route_to_readout());
        let fields: Vec<RoutedValueDescriptor> = match self.regime {
            Regime::Continuous { .. } => routed_fields
                .map(|f| RoutedValueDescriptor {
                    field_name: f.name().to_string(),
                    field_idx: f.idx(),
                    time_point: None,
                    steady: false,
                })
                .collect(),
            Regime::Patterned { .. } => routed_fields
                .flat_map(|f| {
                    (0..time_points).map(move |t| RoutedValueDescriptor {
                        field_name: f.name().to_string(),
                        field_idx: f.idx(),
                        time_point: Some(t),
                        steady: false,
                    })
                })
                .collect(),
        };
        steady.chain(fields).collect()
    }

    /// Stores the data of a new feeding cycle.
    ///
    /// In the continuous regime the vector needs at least one value per
    /// external field; extra values are ignored. In the patterned regime the
    /// vector is split into steady values and a pattern, which is unified
    /// and expanded into one vector per time point. Synthetic fields are
    /// computed for every stored time point.
    ///
    /// Every stored value is checked against its field's filter here, so a
    /// value outside a binary or enumerated domain fails this call with
    /// [`ResinError::Domain`] rather than a later encode call. On error the
    /// previously stored data stays untouched.
    pub fn store_new_data(&mut self, vector: &[Real]) -> Result<()> {
        if self.state == EncoderState::Uninitialized {
            return Err(ResinError::State(
                "Encoder must be initialized before data is stored".to_string(),
            ));
        }

        let (steady_values, rows) = match &self.regime {
            Regime::Continuous { .. } => (
                Vec::new(),
                vec![augment_continuous(&mut self.synthetic, vector, self.num_external)?],
            ),
            Regime::Patterned {
                var_schema,
                unifier,
                ..
            } => {
                if let Some(len) = self.fixed_ext_vector_length {
                    if vector.len() != len {
                        return Err(ResinError::Data(format!(
                            "Expected an input vector of length {len}, got {}",
                            vector.len()
                        )));
                    }
                }
                let (steady, pattern) =
                    split_patterned(vector, self.steady.len(), self.num_external, *var_schema)?;
                let rows = expand_pattern(
                    unifier,
                    self.auto_time_points,
                    &mut self.synthetic,
                    &pattern,
                )?;
                (steady, rows)
            }
        };

        self.check_stored_values(&steady_values, &rows)?;

        trace!(len = vector.len(), time_points = rows.len(), "Stored input data");
        self.steady_values = steady_values;
        self.buffer = rows;
        self.cursor = 0;
        self.reverse = false;
        self.state = EncoderState::Feeding(self.feeding_type());
        Ok(())
    }

    fn check_stored_values(&self, steady_values: &[Real], rows: &[Vec<Real>]) -> Result<()> {
        for (steady, &value) in self.steady.iter().zip(steady_values) {
            steady.filter.apply(value)?;
        }
        for row in rows {
            for field in &self.fields {
                field.filter_value(row[field.idx()])?;
            }
        }
        Ok(())
    }

    /// Presents the next stored time point to every field.
    ///
    /// Returns `false` once the stored data is exhausted.
    pub fn encode_next_input_data(&mut self, collect_statistics: bool) -> Result<bool> {
        match self.state {
            EncoderState::Uninitialized => {
                return Err(ResinError::State(
                    "Encoder must be initialized before encoding".to_string(),
                ))
            }
            EncoderState::Initialized => return Ok(false),
            EncoderState::Feeding(_) | EncoderState::ReverseFeeding => {}
        }
        let len = self.buffer.len();
        if self.cursor >= len {
            return Ok(false);
        }

        let t = if self.reverse {
            len - 1 - self.cursor
        } else {
            self.cursor
        };
        let row = &self.buffer[t];
        let filtered = self
            .fields
            .iter()
            .map(|field| field.filter_value(row[field.idx()]))
            .collect::<Result<Vec<Real>>>()?;
        for (field, value) in self.fields.iter_mut().zip(filtered) {
            field.stimulate(row[field.idx()], value, collect_statistics);
        }
        self.cursor += 1;
        self.encoded_steps += 1;
        Ok(true)
    }

    /// Restarts presentation of the stored pattern in backward order.
    ///
    /// Allowed once per feeding cycle and only in the patterned regime.
    pub fn set_reverse_mode(&mut self) -> Result<()> {
        if matches!(self.regime, Regime::Continuous { .. }) {
            return Err(ResinError::State(
                "Reverse mode is not available in continuous feeding".to_string(),
            ));
        }
        match self.state {
            EncoderState::ReverseFeeding => Err(ResinError::State(
                "Reverse mode is already set for the current feeding cycle".to_string(),
            )),
            EncoderState::Feeding(_) => {
                self.reverse = true;
                self.cursor = 0;
                self.state = EncoderState::ReverseFeeding;
                Ok(())
            }
            EncoderState::Uninitialized | EncoderState::Initialized => Err(ResinError::State(
                "No pattern is stored".to_string(),
            )),
        }
    }

    /// Copies the raw values routed to the readout into `buffer` starting
    /// at `offset`, in the order of
    /// [`routed_values_descriptors`](Self::routed_values_descriptors).
    ///
    /// Returns the number of copied values.
    pub fn copy_routed_input_data_to(&self, buffer: &mut [Real], offset: usize) -> Result<usize> {
        if matches!(
            self.state,
            EncoderState::Uninitialized | EncoderState::Initialized
        ) {
            return Err(ResinError::State("No input data is stored".to_string()));
        }
        let count = self.routed.len();
        let Some(target) = offset
            .checked_add(count)
            .and_then(|end| buffer.get_mut(offset..end))
        else {
            return Err(ResinError::Data(format!(
                "Buffer of length {} cannot hold {count} values at offset {offset}",
                buffer.len()
            )));
        };

        for (slot, descriptor) in target.iter_mut().zip(&self.routed) {
            *slot = self.routed_value(descriptor)?;
        }
        Ok(count)
    }

    fn routed_value(&self, descriptor: &RoutedValueDescriptor) -> Result<Real> {
        let value = if descriptor.steady {
            self.steady_values.get(descriptor.field_idx)
        } else {
            self.buffer
                .get(descriptor.time_point.unwrap_or(0))
                .and_then(|row| row.get(descriptor.field_idx))
        };
        value.copied().ok_or_else(|| {
            ResinError::Data(format!(
                "Stored data has no value for routed field '{}'",
                descriptor.field_name
            ))
        })
    }

    /// Describes every routed value, in copy order.
    pub fn routed_values_descriptors(&self) -> &[RoutedValueDescriptor] {
        &self.routed
    }

    /// Number of values copied by
    /// [`copy_routed_input_data_to`](Self::copy_routed_input_data_to).
    pub fn num_routed_values(&self) -> usize {
        self.routed.len()
    }

    /// Returns true if the last encoded time point closes one of the equal
    /// segments a pattern is sliced into. In the continuous regime every
    /// encoded vector closes a segment.
    pub fn is_slice_end(&self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        match self.regime {
            Regime::Continuous { .. } => true,
            Regime::Patterned { slices, .. } => {
                let len = self.buffer.len();
                let slices = slices.min(len);
                (1..=slices).any(|k| k * len / slices == self.cursor)
            }
        }
    }

    /// Returns true if the next encoded time step is a boot cycle, whose
    /// neuron statistics should not be collected.
    pub fn is_booting(&self) -> bool {
        match self.regime {
            Regime::Continuous { boot_cycles } => self.encoded_steps < boot_cycles as u64,
            Regime::Patterned { .. } => false,
        }
    }

    /// Returns true if patterns are to be presented forward and backward.
    pub fn is_bidirectional(&self) -> bool {
        matches!(self.regime, Regime::Patterned { bidir: true, .. })
    }

    /// Drops the stored data and clears coders, synthetic sources and
    /// neurons. Filter calibration is kept.
    pub fn reset(&mut self, reset_statistics: bool) {
        for field in &mut self.fields {
            field.reset_neurons(reset_statistics);
        }
        for source in &mut self.synthetic {
            source.reset();
        }
        self.steady_values.clear();
        self.buffer.clear();
        self.cursor = 0;
        self.reverse = false;
        self.encoded_steps = 0;
        if self.state != EncoderState::Uninitialized {
            self.state = EncoderState::Initialized;
        }
    }

    fn reset_all(&mut self) {
        self.reset(true);
        for field in &mut self.fields {
            field.reset_filter();
        }
        for steady in &mut self.steady {
            steady.filter.reset();
        }
        self.auto_time_points = None;
        self.fixed_ext_vector_length = None;
        self.routed.clear();
        self.state = EncoderState::Uninitialized;
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EncoderState {
        self.state
    }

    /// Feeding regime.
    pub fn feeding_type(&self) -> FeedingType {
        match self.regime {
            Regime::Continuous { .. } => FeedingType::Continuous,
            Regime::Patterned { .. } => FeedingType::Patterned,
        }
    }

    /// Range the feature filters map onto.
    pub fn data_range(&self) -> Interval {
        self.data_range
    }

    /// All input fields, external first.
    pub fn fields(&self) -> &[InputField<N>] {
        &self.fields
    }

    /// Looks a field up by name.
    pub fn field(&self, name: &str) -> Option<&InputField<N>> {
        self.field_index.get(name).map(|&idx| &self.fields[idx])
    }

    /// Number of external fields.
    pub fn num_external_fields(&self) -> usize {
        self.num_external
    }

    /// Names of the steady fields.
    pub fn steady_field_names(&self) -> impl Iterator<Item = &str> {
        self.steady.iter().map(|s| s.name.as_str())
    }

    /// Total number of input neurons.
    pub fn num_input_neurons(&self) -> usize {
        self.fields.iter().map(InputField::num_neurons).sum()
    }

    /// Every input neuron in handle order.
    pub fn neurons(&self) -> impl Iterator<Item = &N> {
        self.fields.iter().flat_map(InputField::neurons)
    }

    /// Number of time points in the stored data.
    pub fn num_time_points(&self) -> usize {
        self.buffer.len()
    }

    /// Number of stored time points not yet encoded in the current direction.
    pub fn num_remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.cursor)
    }

    /// Latched automatic number of time points.
    pub fn auto_time_points(&self) -> Option<usize> {
        self.auto_time_points
    }

    /// Latched length of patterned input vectors.
    pub fn fixed_ext_vector_length(&self) -> Option<usize> {
        self.fixed_ext_vector_length
    }
}

impl<N: InputNeuron> std::fmt::Debug for InputEncoder<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputEncoder")
            .field("feeding", &self.feeding_type())
            .field("fields", &self.fields.len())
            .field("steady_fields", &self.steady.len())
            .field("state", &self.state)
            .field("time_points", &self.buffer.len())
            .field("cursor", &self.cursor)
            .finish_non_exhaustive()
    }
}

fn update_filter(filter: &mut FeatureFilter, rows: &[Vec<Real>], idx: usize) -> Result<()> {
    rows.iter().try_for_each(|row| filter.update(row[idx]))
}

fn augment(synthetic: &mut [SyntheticSource], row: &mut Vec<Real>) {
    for source in synthetic.iter_mut() {
        let value = source.next(row);
        row.push(value);
    }
}

fn augment_continuous(
    synthetic: &mut [SyntheticSource],
    vector: &[Real],
    num_external: usize,
) -> Result<Vec<Real>> {
    if vector.len() < num_external {
        return Err(ResinError::Data(format!(
            "Input vector of length {} is shorter than the {num_external} external fields",
            vector.len()
        )));
    }
    let mut row = Vec::with_capacity(num_external + synthetic.len());
    row.extend_from_slice(&vector[..num_external]);
    augment(synthetic, &mut row);
    Ok(row)
}

fn split_patterned(
    vector: &[Real],
    num_steady: usize,
    num_vars: usize,
    schema: VariablesSchema,
) -> Result<(Vec<Real>, InputPattern)> {
    if vector.len() <= num_steady {
        return Err(ResinError::Data(format!(
            "Input vector of length {} has no pattern data after {num_steady} steady values",
            vector.len()
        )));
    }
    let (steady, data) = vector.split_at(num_steady);
    Ok((steady.to_vec(), InputPattern::from_flat(data, num_vars, schema)?))
}

fn expand_pattern(
    unifier: &PatternUnifier,
    auto_time_points: Option<usize>,
    synthetic: &mut [SyntheticSource],
    pattern: &InputPattern,
) -> Result<Vec<Vec<Real>>> {
    let mut rows = unifier.unify(pattern, auto_time_points)?.to_time_points()?;
    for row in &mut rows {
        augment(synthetic, row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coding::SpikingCoding;
    use crate::filters::FeatureFilterParams;
    use crate::input::params::{
        ContinuousFeedingParams, FieldParams, PatternedFeedingParams, SteadyFieldParams,
    };
    use crate::input::synthetic::{GeneratorParams, TransformerParams};
    use crate::pattern::{ResamplingParams, UnificationParams};

    fn continuous(fields: Vec<FieldParams>, boot_cycles: usize) -> InputEncoderParams {
        InputEncoderParams {
            feeding: FeedingParams::Continuous(ContinuousFeedingParams { boot_cycles }),
            fields,
            ..Default::default()
        }
    }

    fn patterned(fields: Vec<FieldParams>, feeding: PatternedFeedingParams) -> InputEncoderParams {
        InputEncoderParams {
            feeding: FeedingParams::Patterned(feeding),
            fields,
            ..Default::default()
        }
    }

    fn ramp(len: usize) -> Vec<Real> {
        (0..len).map(|i| i as Real).collect()
    }

    fn count_steps(encoder: &mut InputEncoder) -> usize {
        let mut steps = 0;
        while encoder.encode_next_input_data(true).unwrap() {
            steps += 1;
        }
        steps
    }

    #[test]
    fn test_pattern_steps_ignore_slices() {
        let params = patterned(
            vec![FieldParams::external("x")],
            PatternedFeedingParams {
                slices: 2,
                ..Default::default()
            },
        );
        let mut encoder = InputEncoder::new(&params).unwrap();
        encoder.initialize(&[ramp(10)]).unwrap();
        encoder.store_new_data(&ramp(10)).unwrap();

        let mut slice_ends = Vec::new();
        let mut steps = 0;
        while encoder.encode_next_input_data(true).unwrap() {
            steps += 1;
            if encoder.is_slice_end() {
                slice_ends.push(steps);
            }
        }
        assert_eq!(steps, 10);
        assert_eq!(slice_ends, vec![5, 10]);
        assert!(!encoder.encode_next_input_data(true).unwrap());
    }

    #[test]
    fn test_reverse_mode_once_per_cycle() {
        let params = patterned(vec![FieldParams::external("x")], Default::default());
        let mut encoder = InputEncoder::new(&params).unwrap();
        encoder.initialize(&[ramp(4)]).unwrap();
        encoder.store_new_data(&ramp(4)).unwrap();

        encoder.set_reverse_mode().unwrap();
        assert_eq!(encoder.state(), EncoderState::ReverseFeeding);
        assert!(encoder.set_reverse_mode().unwrap_err().is_state());

        // A new cycle allows reverse mode again
        encoder.store_new_data(&ramp(4)).unwrap();
        assert!(encoder.set_reverse_mode().is_ok());
    }

    #[test]
    fn test_reverse_order() {
        let params = patterned(vec![FieldParams::external("x")], Default::default());
        let mut encoder = InputEncoder::new(&params).unwrap();
        encoder.initialize(&[ramp(3)]).unwrap();
        encoder.store_new_data(&ramp(3)).unwrap();
        assert_eq!(count_steps(&mut encoder), 3);

        encoder.set_reverse_mode().unwrap();
        let mut seen = Vec::new();
        while encoder.encode_next_input_data(true).unwrap() {
            seen.push(encoder.field("x").unwrap().last_value().unwrap());
        }
        assert_eq!(seen, vec![2.0, 1.0, 0.0]);
    }

    #[test]
    fn test_reverse_mode_rejected_in_continuous() {
        let params = continuous(vec![FieldParams::external("x")], 0);
        let mut encoder = InputEncoder::new(&params).unwrap();
        encoder.initialize(&[vec![0.0], vec![1.0]]).unwrap();
        encoder.store_new_data(&[0.5]).unwrap();
        assert!(encoder.set_reverse_mode().unwrap_err().is_state());
    }

    #[test]
    fn test_continuous_length_flexibility() {
        let fields = ["a", "b", "c", "d", "e"]
            .into_iter()
            .map(FieldParams::external)
            .collect();
        let mut encoder = InputEncoder::new(&continuous(fields, 0)).unwrap();
        encoder.initialize(&[vec![0.0; 5], vec![1.0; 5]]).unwrap();

        for len in [5, 5, 6] {
            encoder.store_new_data(&vec![0.5; len]).unwrap();
            assert_eq!(count_steps(&mut encoder), 1);
        }
        assert!(encoder.store_new_data(&[0.5; 4]).unwrap_err().is_data());
    }

    #[test]
    fn test_fixed_length_with_routing() {
        let params = patterned(vec![FieldParams::external("x").routed()], Default::default());
        let mut encoder = InputEncoder::new(&params).unwrap();
        encoder.initialize(&[ramp(4), ramp(4)]).unwrap();
        assert_eq!(encoder.fixed_ext_vector_length(), Some(4));
        assert_eq!(encoder.num_routed_values(), 4);

        encoder.store_new_data(&ramp(4)).unwrap();
        assert!(encoder.store_new_data(&ramp(5)).unwrap_err().is_data());

        // The previously stored pattern is still intact
        assert_eq!(encoder.num_remaining(), 4);
        let mut routed = vec![-1.0; 6];
        assert_eq!(encoder.copy_routed_input_data_to(&mut routed, 1).unwrap(), 4);
        assert_eq!(routed, vec![-1.0, 0.0, 1.0, 2.0, 3.0, -1.0]);
        assert!(encoder.copy_routed_input_data_to(&mut routed, 3).unwrap_err().is_data());
    }

    #[test]
    fn test_mixed_lengths_without_routing() {
        let params = patterned(vec![FieldParams::external("x")], Default::default());
        let mut encoder = InputEncoder::new(&params).unwrap();
        encoder.initialize(&[ramp(4), ramp(6)]).unwrap();
        assert_eq!(encoder.fixed_ext_vector_length(), None);
        encoder.store_new_data(&ramp(7)).unwrap();
        assert_eq!(count_steps(&mut encoder), 7);
    }

    #[test]
    fn test_steady_fields_routed() {
        let params = patterned(
            vec![FieldParams::external("x")],
            PatternedFeedingParams {
                steady_fields: vec![SteadyFieldParams::new("gain")],
                ..Default::default()
            },
        );
        let mut encoder = InputEncoder::new(&params).unwrap();
        encoder
            .initialize(&[vec![1.0, 0.0, 1.0, 2.0], vec![3.0, 2.0, 1.0, 0.0]])
            .unwrap();
        assert_eq!(encoder.steady_field_names().collect::<Vec<_>>(), vec!["gain"]);

        let descriptors = encoder.routed_values_descriptors();
        assert_eq!(descriptors.len(), 1);
        assert!(descriptors[0].steady);
        assert_eq!(descriptors[0].field_name, "gain");

        encoder.store_new_data(&[7.0, 1.0, 1.0, 1.0]).unwrap();
        assert_eq!(encoder.num_time_points(), 3);
        let mut routed = vec![0.0];
        encoder.copy_routed_input_data_to(&mut routed, 0).unwrap();
        assert_eq!(routed, vec![7.0]);
    }

    #[test]
    fn test_auto_time_points_latched() {
        let params = patterned(
            vec![FieldParams::external("x").routed()],
            PatternedFeedingParams {
                unification: UnificationParams {
                    resampling: Some(ResamplingParams {
                        signal_begin_threshold: 0.1,
                        signal_end_threshold: 0.1,
                        ..Default::default()
                    }),
                    ..Default::default()
                },
                ..Default::default()
            },
        );
        let mut encoder = InputEncoder::new(&params).unwrap();
        encoder
            .initialize(&[
                vec![0.0, 0.0, 1.0, 2.0, 0.0, 0.0],
                vec![0.0, 1.0, 2.0, 3.0, 4.0, 0.0],
            ])
            .unwrap();
        assert_eq!(encoder.auto_time_points(), Some(4));
        assert_eq!(encoder.num_routed_values(), 4);

        encoder.store_new_data(&[0.0, 0.0, 1.0, 2.0, 0.0, 0.0]).unwrap();
        assert_eq!(encoder.num_time_points(), 4);
        let descriptors = encoder.routed_values_descriptors();
        assert_eq!(descriptors[3].time_point, Some(3));
    }

    #[test]
    fn test_degenerate_window_keeps_stored_pattern() {
        let params = patterned(
            vec![FieldParams::external("x").routed()],
            PatternedFeedingParams {
                unification: UnificationParams {
                    resampling: Some(ResamplingParams {
                        signal_begin_threshold: 0.1,
                        signal_end_threshold: 0.1,
                        target_time_points: 4,
                        ..Default::default()
                    }),
                    ..Default::default()
                },
                ..Default::default()
            },
        );
        let mut encoder = InputEncoder::new(&params).unwrap();
        encoder.initialize(&[vec![0.0, 1.0, 2.0, 3.0, 4.0, 0.0]]).unwrap();

        encoder.store_new_data(&[0.0, 1.0, 2.0, 3.0, 4.0, 0.0]).unwrap();
        assert!(encoder.encode_next_input_data(true).unwrap());
        let mut before = vec![0.0; encoder.num_routed_values()];
        encoder.copy_routed_input_data_to(&mut before, 0).unwrap();

        assert!(encoder.store_new_data(&[0.0; 6]).unwrap_err().is_data());
        assert_eq!(encoder.num_remaining(), 3);
        let mut after = vec![0.0; encoder.num_routed_values()];
        encoder.copy_routed_input_data_to(&mut after, 0).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_binary_domain_checked_on_store() {
        let params = continuous(
            vec![
                FieldParams::external("a"),
                FieldParams::external("b").with_filter(FeatureFilterParams::Binary),
            ],
            0,
        );
        let mut encoder = InputEncoder::new(&params).unwrap();
        encoder.initialize(&[vec![0.0, 0.0], vec![1.0, 1.0]]).unwrap();

        encoder.store_new_data(&[0.5, 1.0]).unwrap();
        assert!(encoder.store_new_data(&[1.0, 0.5]).unwrap_err().is_domain());

        // Nothing from the rejected vector reached the neurons
        let a = encoder.field("a").unwrap();
        assert_eq!(a.last_value(), None);
        assert_eq!(a.analog_neuron().output(), 0.0);
        assert_eq!(encoder.num_remaining(), 1);

        assert!(encoder.encode_next_input_data(true).unwrap());
        assert_eq!(encoder.field("a").unwrap().last_value(), Some(0.5));
        assert_eq!(encoder.field("b").unwrap().last_value(), Some(1.0));
    }

    #[test]
    fn test_binary_calibration_rejects_non_flags() {
        let params = continuous(
            vec![FieldParams::external("b").with_filter(FeatureFilterParams::Binary)],
            0,
        );
        let mut encoder = InputEncoder::new(&params).unwrap();
        let err = encoder.initialize(&[vec![0.0], vec![0.3]]).unwrap_err();
        assert!(err.is_domain());
        assert_eq!(encoder.state(), EncoderState::Uninitialized);
    }

    #[test]
    fn test_steady_values_checked_against_kind() {
        let params = patterned(
            vec![FieldParams::external("x")],
            PatternedFeedingParams {
                steady_fields: vec![SteadyFieldParams {
                    name: "flag".to_string(),
                    filter: FeatureFilterParams::Binary,
                }],
                ..Default::default()
            },
        );
        let mut encoder = InputEncoder::new(&params).unwrap();
        encoder
            .initialize(&[vec![1.0, 0.0, 1.0, 2.0], vec![0.0, 2.0, 1.0, 0.0]])
            .unwrap();

        encoder.store_new_data(&[1.0, 0.0, 1.0, 2.0]).unwrap();
        assert!(encoder.store_new_data(&[0.5, 0.0, 1.0, 2.0]).unwrap_err().is_domain());
        let mut routed = vec![0.0];
        encoder.copy_routed_input_data_to(&mut routed, 0).unwrap();
        assert_eq!(routed, vec![1.0]);
    }

    #[test]
    fn test_routed_copy_offset_overflow() {
        let params = continuous(vec![FieldParams::external("x").routed()], 0);
        let mut encoder = InputEncoder::new(&params).unwrap();
        encoder.initialize(&[vec![0.0], vec![1.0]]).unwrap();
        encoder.store_new_data(&[0.5]).unwrap();

        let mut routed = vec![0.0; 2];
        let err = encoder
            .copy_routed_input_data_to(&mut routed, usize::MAX)
            .unwrap_err();
        assert!(err.is_data());
    }

    #[test]
    fn test_synthetic_fields() {
        let fields = vec![
            FieldParams::transformed(
                "diff",
                TransformerParams::Difference {
                    input_field: "x".to_string(),
                    interval: 1,
                },
            )
            .routed(),
            FieldParams::external("x"),
            FieldParams::generated("one", GeneratorParams::Constant { value: 1.0 }).routed(),
        ];
        let mut encoder = InputEncoder::new(&continuous(fields, 0)).unwrap();
        let names: Vec<&str> = encoder.fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["x", "diff", "one"]);
        assert_eq!(encoder.num_external_fields(), 1);

        encoder.initialize(&[vec![0.0], vec![4.0]]).unwrap();
        encoder.store_new_data(&[1.0]).unwrap();
        encoder.store_new_data(&[3.0]).unwrap();

        let mut routed = vec![0.0; 2];
        encoder.copy_routed_input_data_to(&mut routed, 0).unwrap();
        assert_eq!(routed, vec![2.0, 1.0]);
    }

    #[test]
    fn test_transformer_cannot_read_later_field() {
        let fields = vec![
            FieldParams::external("x"),
            FieldParams::transformed(
                "avg",
                TransformerParams::MovingAverage {
                    input_field: "sq".to_string(),
                    window: 2,
                },
            ),
            FieldParams::transformed(
                "sq",
                TransformerParams::Power {
                    input_field: "x".to_string(),
                    exponent: 2.0,
                    keep_sign: false,
                },
            ),
        ];
        let err = InputEncoder::new(&continuous(fields, 0)).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_requires_initialization() {
        let mut encoder = InputEncoder::new(&continuous(vec![FieldParams::external("x")], 0)).unwrap();
        assert_eq!(encoder.state(), EncoderState::Uninitialized);
        assert!(encoder.store_new_data(&[1.0]).unwrap_err().is_state());
        assert!(encoder.encode_next_input_data(true).unwrap_err().is_state());
        assert!(encoder.initialize(&[]).unwrap_err().is_data());
    }

    #[test]
    fn test_boot_cycles() {
        let mut encoder = InputEncoder::new(&continuous(vec![FieldParams::external("x")], 2)).unwrap();
        encoder.initialize(&[vec![0.0], vec![1.0]]).unwrap();

        let mut booting = Vec::new();
        for _ in 0..4 {
            booting.push(encoder.is_booting());
            encoder.store_new_data(&[0.5]).unwrap();
            let collect = !encoder.is_booting();
            encoder.encode_next_input_data(collect).unwrap();
        }
        assert_eq!(booting, vec![true, true, false, false]);

        let analog = encoder.field("x").unwrap().analog_neuron();
        assert_eq!(analog.statistics().output.count(), 2);
    }

    #[test]
    fn test_neuron_handles() {
        let params = InputEncoderParams {
            fields: vec![
                FieldParams::external("a"),
                FieldParams::external("b").with_spiking_coding(SpikingCoding::Forbidden),
            ],
            ..Default::default()
        };
        let encoder = InputEncoder::new(&params).unwrap();
        let spiking = encoder.field("a").unwrap().spiking_neurons().len();
        assert_eq!(encoder.num_input_neurons(), spiking + 2);

        let handles: Vec<u32> = encoder.neurons().map(|n| n.handle().raw()).collect();
        let expected: Vec<u32> = (0..handles.len() as u32).collect();
        assert_eq!(handles, expected);
    }

    #[test]
    fn test_reset_keeps_calibration() {
        let mut encoder = InputEncoder::new(&continuous(vec![FieldParams::external("x")], 0)).unwrap();
        encoder.initialize(&[vec![0.0], vec![1.0]]).unwrap();
        encoder.store_new_data(&[0.5]).unwrap();
        encoder.reset(true);

        assert_eq!(encoder.state(), EncoderState::Initialized);
        assert_eq!(encoder.num_time_points(), 0);
        assert!(encoder.field("x").unwrap().filter().is_calibrated());
        assert!(!encoder.encode_next_input_data(true).unwrap());
    }

    #[test]
    fn test_reinitialize_replaces_calibration() {
        let mut encoder = InputEncoder::new(&continuous(vec![FieldParams::external("x")], 0)).unwrap();
        encoder.initialize(&[vec![0.0], vec![1.0]]).unwrap();
        encoder.initialize(&[vec![5.0], vec![6.0], vec![7.0]]).unwrap();
        assert_eq!(encoder.field("x").unwrap().filter().num_samples(), 3);
    }
}
