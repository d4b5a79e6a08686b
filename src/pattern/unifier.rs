//! Detrending, amplitude unification and resampling of input patterns.

use crate::error::{ResinError, Result};
use crate::pattern::signal::{self, ResamplingMethod};
use crate::pattern::InputPattern;
use crate::types::{Real, AUTO_TIME_POINTS};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters of the resampling stage.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResamplingParams {
    /// Relative magnitude (of the variable's peak) that opens the signal window.
    pub signal_begin_threshold: Real,

    /// Relative magnitude (of the variable's peak) that closes the signal window.
    pub signal_end_threshold: Real,

    /// Apply the widest window of a pattern to all of its variables.
    pub uniform_time_scale: bool,

    /// Number of output time points, or [`AUTO_TIME_POINTS`] to use the
    /// longest signal window found across the calibration patterns.
    pub target_time_points: i32,

    /// Interpolation method.
    pub method: ResamplingMethod,
}

impl Default for ResamplingParams {
    fn default() -> Self {
        Self {
            signal_begin_threshold: 0.0,
            signal_end_threshold: 0.0,
            uniform_time_scale: true,
            target_time_points: AUTO_TIME_POINTS,
            method: ResamplingMethod::Linear,
        }
    }
}

impl ResamplingParams {
    /// Validates the parameters.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("signal_begin_threshold", self.signal_begin_threshold),
            ("signal_end_threshold", self.signal_end_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ResinError::Configuration {
                    name,
                    message: format!("Must be in [0, 1], got {value}"),
                });
            }
        }
        if self.target_time_points <= 0 && self.target_time_points != AUTO_TIME_POINTS {
            return Err(ResinError::Configuration {
                name: "target_time_points",
                message: format!(
                    "Must be > 0 or {AUTO_TIME_POINTS} (auto), got {}",
                    self.target_time_points
                ),
            });
        }
        Ok(())
    }

    /// Returns true when the target is derived from the calibration data.
    pub fn is_auto(&self) -> bool {
        self.target_time_points == AUTO_TIME_POINTS
    }
}

/// Parameters of the whole unification pipeline.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UnificationParams {
    /// Subtract the linear trend of every variable.
    pub detrend: bool,

    /// Rescale every variable to unit peak magnitude.
    pub unify_amplitudes: bool,

    /// Trim to the signal window and resample. `None` keeps the series as is.
    pub resampling: Option<ResamplingParams>,
}

/// Active part `[begin, end]` (inclusive) of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalWindow {
    /// First sample of the window.
    pub begin: usize,
    /// Last sample of the window.
    pub end: usize,
}

impl SignalWindow {
    /// Number of samples in the window.
    pub fn len(&self) -> usize {
        self.end + 1 - self.begin
    }

    /// Always false; windows hold at least one sample.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Smallest window covering both.
    pub fn union(&self, other: &SignalWindow) -> SignalWindow {
        SignalWindow {
            begin: self.begin.min(other.begin),
            end: self.end.max(other.end),
        }
    }
}

/// Applies the unification pipeline to input patterns.
///
/// The stages run in order: detrend, amplitude unification, signal window
/// detection, resampling.
///
/// # Example
///
/// ```rust
/// use resin::pattern::{InputPattern, PatternUnifier, ResamplingParams, UnificationParams};
///
/// let unifier = PatternUnifier::new(UnificationParams {
///     resampling: Some(ResamplingParams {
///         target_time_points: 5,
///         ..Default::default()
///     }),
///     ..Default::default()
/// }).unwrap();
///
/// let pattern = InputPattern::new(vec![vec![0.0, 1.0, 2.0]]).unwrap();
/// let unified = unifier.unify(&pattern, None).unwrap();
/// assert_eq!(unified.variable(0), &[0.0, 0.5, 1.0, 1.5, 2.0]);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PatternUnifier {
    params: UnificationParams,
}

impl PatternUnifier {
    /// Creates a new unifier.
    pub fn new(params: UnificationParams) -> Result<Self> {
        if let Some(resampling) = &params.resampling {
            resampling.validate()?;
        }
        Ok(Self { params })
    }

    /// Returns the parameters.
    pub fn params(&self) -> &UnificationParams {
        &self.params
    }

    /// Returns true when the output length must be derived from calibration data.
    pub fn needs_auto_time_points(&self) -> bool {
        self.params
            .resampling
            .as_ref()
            .is_some_and(ResamplingParams::is_auto)
    }

    /// Detects the active window of a prepared series.
    pub fn detect_window(&self, series: &[Real]) -> Result<SignalWindow> {
        let (begin_threshold, end_threshold) = self
            .params
            .resampling
            .as_ref()
            .map_or((0.0, 0.0), |r| (r.signal_begin_threshold, r.signal_end_threshold));

        let peak = signal::peak_magnitude(series);
        let relative = |x: Real| if peak > 0.0 { x.abs() / peak } else { 0.0 };

        let begin = series.iter().position(|&x| relative(x) >= begin_threshold);
        let end = series.iter().rposition(|&x| relative(x) >= end_threshold);
        match (begin, end) {
            (Some(begin), Some(end)) if begin <= end => Ok(SignalWindow { begin, end }),
            _ => Err(ResinError::Data(
                "Degenerate signal: no active window above the thresholds".to_string(),
            )),
        }
    }

    /// Detrends and rescales the variables as configured.
    pub fn prepare(&self, pattern: &InputPattern) -> Vec<Vec<Real>> {
        pattern
            .variables()
            .iter()
            .map(|series| {
                let mut series = series.clone();
                if self.params.detrend {
                    signal::detrend(&mut series);
                }
                if self.params.unify_amplitudes {
                    signal::unify_amplitude(&mut series);
                }
                series
            })
            .collect()
    }

    /// Signal windows of every variable of a prepared pattern.
    ///
    /// With a uniform time scale all variables share the widest window.
    pub fn windows(&self, prepared: &[Vec<Real>]) -> Result<Vec<SignalWindow>> {
        let mut windows = prepared
            .iter()
            .map(|series| self.detect_window(series))
            .collect::<Result<Vec<_>>>()?;

        let uniform = self
            .params
            .resampling
            .as_ref()
            .is_some_and(|r| r.uniform_time_scale);
        if uniform {
            if let Some(widest) = windows.iter().copied().reduce(|a, b| a.union(&b)) {
                windows.iter_mut().for_each(|w| *w = widest);
            }
        }
        Ok(windows)
    }

    /// Longest active window across all patterns.
    pub fn auto_time_points<'a, I>(&self, patterns: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a InputPattern>,
    {
        let mut longest = 0;
        for pattern in patterns {
            let prepared = self.prepare(pattern);
            for window in self.windows(&prepared)? {
                longest = longest.max(window.len());
            }
        }
        if longest == 0 {
            return Err(ResinError::Data(
                "No patterns to derive the number of time points from".to_string(),
            ));
        }
        Ok(longest)
    }

    /// Runs the full pipeline on one pattern.
    ///
    /// `auto_time_points` is the latched automatic target; when it is `None`
    /// and the target is automatic, the pattern's own longest window is used.
    pub fn unify(&self, pattern: &InputPattern, auto_time_points: Option<usize>) -> Result<InputPattern> {
        let prepared = self.prepare(pattern);
        let Some(resampling) = &self.params.resampling else {
            return InputPattern::new(prepared);
        };

        let windows = self.windows(&prepared)?;
        let target = if resampling.is_auto() {
            match auto_time_points {
                Some(n) => n,
                None => windows.iter().map(SignalWindow::len).max().unwrap_or(0),
            }
        } else {
            resampling.target_time_points as usize
        };

        let variables = prepared
            .iter()
            .zip(&windows)
            .map(|(series, w)| signal::resample(&series[w.begin..=w.end], target, resampling.method))
            .collect::<Result<Vec<_>>>()?;
        InputPattern::new(variables)
    }
}
