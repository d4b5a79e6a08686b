//! Transformers and generators producing the synthetic input fields.
//!
//! A transformer derives a value from the fields already placed in the
//! current input vector; a generator produces a value on its own. Both are
//! pulled once per input vector, in field declaration order.

use std::collections::VecDeque;

use crate::error::{ResinError, Result};
use crate::types::{Interval, Real};
use crate::utils::Random;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Derives a value from the input vector built so far.
pub trait Transformer: Send {
    /// Computes the next value. `inputs` holds the values of every field
    /// preceding the transformed one, indexed by field index.
    fn next(&mut self, inputs: &[Real]) -> Real;

    /// Restores the initial state.
    fn reset(&mut self);
}

/// Produces a value sequence independent of the input data.
pub trait Generator: Send {
    /// Produces the next value.
    fn next(&mut self) -> Real;

    /// Restores the initial state; the sequence replays from the start.
    fn reset(&mut self);
}

/// Built-in transformer configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TransformerParams {
    /// `x[t] - x[t - interval]`, 0 until enough history exists.
    Difference {
        /// Source field name.
        input_field: String,
        /// Distance in time points.
        interval: usize,
    },
    /// `x_coeff * x + y_coeff * y`.
    Linear {
        /// First source field.
        x_field: String,
        /// Second source field.
        y_field: String,
        /// Weight of the first field.
        x_coeff: Real,
        /// Weight of the second field.
        y_coeff: Real,
    },
    /// `|x|^exponent`, optionally carrying the sign of `x`.
    Power {
        /// Source field name.
        input_field: String,
        /// Exponent applied to the magnitude.
        exponent: Real,
        /// Restore the sign of the input.
        keep_sign: bool,
    },
    /// Mean of the last `window` values.
    MovingAverage {
        /// Source field name.
        input_field: String,
        /// Number of values averaged.
        window: usize,
    },
}

impl TransformerParams {
    /// Names of the fields the transformer reads.
    pub fn input_fields(&self) -> Vec<&str> {
        match self {
            TransformerParams::Difference { input_field, .. }
            | TransformerParams::Power { input_field, .. }
            | TransformerParams::MovingAverage { input_field, .. } => vec![input_field.as_str()],
            TransformerParams::Linear { x_field, y_field, .. } => {
                vec![x_field.as_str(), y_field.as_str()]
            }
        }
    }

    /// Builds the transformer, resolving field names against the fields
    /// that precede it.
    pub fn build(&self, preceding_fields: &[String]) -> Result<Box<dyn Transformer>> {
        let resolve = |name: &str| -> Result<usize> {
            preceding_fields
                .iter()
                .position(|f| f == name)
                .ok_or_else(|| ResinError::Configuration {
                    name: "input_field",
                    message: format!(
                        "Transformer input '{name}' is not a field declared before the transformed field"
                    ),
                })
        };

        Ok(match self {
            TransformerParams::Difference {
                input_field,
                interval,
            } => {
                if *interval == 0 {
                    return Err(ResinError::Configuration {
                        name: "interval",
                        message: "Must be > 0".to_string(),
                    });
                }
                Box::new(DifferenceTransformer {
                    idx: resolve(input_field)?,
                    interval: *interval,
                    history: VecDeque::with_capacity(*interval + 1),
                })
            }
            TransformerParams::Linear {
                x_field,
                y_field,
                x_coeff,
                y_coeff,
            } => Box::new(LinearTransformer {
                x_idx: resolve(x_field)?,
                y_idx: resolve(y_field)?,
                x_coeff: *x_coeff,
                y_coeff: *y_coeff,
            }),
            TransformerParams::Power {
                input_field,
                exponent,
                keep_sign,
            } => {
                if !exponent.is_finite() {
                    return Err(ResinError::Configuration {
                        name: "exponent",
                        message: "Must be finite".to_string(),
                    });
                }
                Box::new(PowerTransformer {
                    idx: resolve(input_field)?,
                    exponent: *exponent,
                    keep_sign: *keep_sign,
                })
            }
            TransformerParams::MovingAverage {
                input_field,
                window,
            } => {
                if *window == 0 {
                    return Err(ResinError::Configuration {
                        name: "window",
                        message: "Must be > 0".to_string(),
                    });
                }
                Box::new(MovingAverageTransformer {
                    idx: resolve(input_field)?,
                    window: *window,
                    values: VecDeque::with_capacity(*window),
                })
            }
        })
    }
}

struct DifferenceTransformer {
    idx: usize,
    interval: usize,
    history: VecDeque<Real>,
}

impl Transformer for DifferenceTransformer {
    fn next(&mut self, inputs: &[Real]) -> Real {
        let x = inputs[self.idx];
        self.history.push_back(x);
        if self.history.len() > self.interval {
            let past = self.history.pop_front().unwrap_or(x);
            x - past
        } else {
            0.0
        }
    }

    fn reset(&mut self) {
        self.history.clear();
    }
}

struct LinearTransformer {
    x_idx: usize,
    y_idx: usize,
    x_coeff: Real,
    y_coeff: Real,
}

impl Transformer for LinearTransformer {
    fn next(&mut self, inputs: &[Real]) -> Real {
        self.x_coeff * inputs[self.x_idx] + self.y_coeff * inputs[self.y_idx]
    }

    fn reset(&mut self) {}
}

struct PowerTransformer {
    idx: usize,
    exponent: Real,
    keep_sign: bool,
}

impl Transformer for PowerTransformer {
    fn next(&mut self, inputs: &[Real]) -> Real {
        let x = inputs[self.idx];
        let magnitude = x.abs().powf(self.exponent);
        if self.keep_sign && x < 0.0 {
            -magnitude
        } else {
            magnitude
        }
    }

    fn reset(&mut self) {}
}

struct MovingAverageTransformer {
    idx: usize,
    window: usize,
    values: VecDeque<Real>,
}

impl Transformer for MovingAverageTransformer {
    fn next(&mut self, inputs: &[Real]) -> Real {
        if self.values.len() == self.window {
            self.values.pop_front();
        }
        self.values.push_back(inputs[self.idx]);
        self.values.iter().sum::<Real>() / self.values.len() as Real
    }

    fn reset(&mut self) {
        self.values.clear();
    }
}

/// Distribution of the gaps between two pulses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PulseTiming {
    /// Every `avg_period` time points.
    #[default]
    Constant,
    /// Uniform over `[1, 2 * avg_period - 1]`.
    Uniform,
    /// Normal around `avg_period`.
    Gaussian,
    /// Exponential with mean `avg_period`.
    Poisson,
}

/// Built-in generator configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GeneratorParams {
    /// The same value forever.
    Constant {
        /// Emitted value.
        value: Real,
    },
    /// `amplitude * sin(phase + t * frequency)`, angles in degrees.
    Sinusoidal {
        /// Initial angle in degrees.
        phase: Real,
        /// Angle increment per time point in degrees.
        frequency: Real,
        /// Peak value.
        amplitude: Real,
    },
    /// `signal` on pulse time points, 0 otherwise.
    Pulse {
        /// Value of a pulse.
        signal: Real,
        /// Mean distance between pulses in time points.
        avg_period: usize,
        /// Distribution of the distances.
        timing: PulseTiming,
        /// Seed for the random timings.
        seed: u64,
    },
    /// Uniformly distributed values.
    RandomValue {
        /// Range of the values.
        range: Interval,
        /// Seed of the sequence.
        seed: u64,
    },
}

impl GeneratorParams {
    /// Builds the generator.
    pub fn build(&self) -> Result<Box<dyn Generator>> {
        Ok(match self {
            GeneratorParams::Constant { value } => Box::new(ConstantGenerator { value: *value }),
            GeneratorParams::Sinusoidal {
                phase,
                frequency,
                amplitude,
            } => Box::new(SinusoidalGenerator {
                phase: *phase,
                frequency: *frequency,
                amplitude: *amplitude,
                step: 0,
            }),
            GeneratorParams::Pulse {
                signal,
                avg_period,
                timing,
                seed,
            } => {
                if *avg_period == 0 {
                    return Err(ResinError::Configuration {
                        name: "avg_period",
                        message: "Must be > 0".to_string(),
                    });
                }
                let mut generator = PulseGenerator {
                    signal: *signal,
                    avg_period: *avg_period,
                    timing: *timing,
                    rng: Random::new(*seed),
                    countdown: 0,
                };
                generator.reset();
                Box::new(generator)
            }
            GeneratorParams::RandomValue { range, seed } => Box::new(RandomValueGenerator {
                range: *range,
                rng: Random::new(*seed),
            }),
        })
    }
}

struct ConstantGenerator {
    value: Real,
}

impl Generator for ConstantGenerator {
    fn next(&mut self) -> Real {
        self.value
    }

    fn reset(&mut self) {}
}

struct SinusoidalGenerator {
    phase: Real,
    frequency: Real,
    amplitude: Real,
    step: u64,
}

impl Generator for SinusoidalGenerator {
    fn next(&mut self) -> Real {
        let angle = self.phase + self.step as Real * self.frequency;
        self.step += 1;
        self.amplitude * angle.to_radians().sin()
    }

    fn reset(&mut self) {
        self.step = 0;
    }
}

struct PulseGenerator {
    signal: Real,
    avg_period: usize,
    timing: PulseTiming,
    rng: Random,
    /// Time points left until the next pulse.
    countdown: usize,
}

impl PulseGenerator {
    fn next_gap(&mut self) -> usize {
        let avg = self.avg_period as Real;
        let gap = match self.timing {
            PulseTiming::Constant => avg,
            PulseTiming::Uniform => {
                let range = Interval::new(1.0, 2.0 * avg).unwrap_or(Interval::UNIT);
                self.rng.uniform(&range).floor()
            }
            PulseTiming::Gaussian => self.rng.normal(avg, avg / 4.0).round(),
            PulseTiming::Poisson => self.rng.exponential(avg).round(),
        };
        gap.max(1.0) as usize
    }
}

impl Generator for PulseGenerator {
    fn next(&mut self) -> Real {
        self.countdown -= 1;
        if self.countdown == 0 {
            self.countdown = self.next_gap();
            self.signal
        } else {
            0.0
        }
    }

    fn reset(&mut self) {
        self.rng.reseed();
        self.countdown = self.next_gap();
    }
}

struct RandomValueGenerator {
    range: Interval,
    rng: Random,
}

impl Generator for RandomValueGenerator {
    fn next(&mut self) -> Real {
        self.rng.uniform(&self.range)
    }

    fn reset(&mut self) {
        self.rng.reseed();
    }
}
