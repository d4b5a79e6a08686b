//! Elementary operations on a single time series.

use crate::error::{ResinError, Result};
use crate::types::Real;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Interpolation used when mapping a window onto a new number of samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ResamplingMethod {
    /// Linear interpolation between the two neighbouring samples.
    #[default]
    Linear,
    /// Value of the nearest sample.
    Nearest,
}

/// Largest absolute value of the series, 0 for an empty series.
pub fn peak_magnitude(series: &[Real]) -> Real {
    series.iter().fold(0.0, |acc: Real, &x| acc.max(x.abs()))
}

/// Subtracts the least-squares linear trend in place.
pub fn detrend(series: &mut [Real]) {
    let n = series.len();
    if n == 0 {
        return;
    }
    let t_mean = (n - 1) as Real / 2.0;
    let x_mean = series.iter().sum::<Real>() / n as Real;

    let mut cov = 0.0;
    let mut var = 0.0;
    for (t, &x) in series.iter().enumerate() {
        let dt = t as Real - t_mean;
        cov += dt * (x - x_mean);
        var += dt * dt;
    }
    let slope = if var > 0.0 { cov / var } else { 0.0 };

    for (t, x) in series.iter_mut().enumerate() {
        *x -= x_mean + slope * (t as Real - t_mean);
    }
}

/// Scales the series so that its peak magnitude becomes 1.
///
/// A flat zero series is left untouched.
pub fn unify_amplitude(series: &mut [Real]) {
    let peak = peak_magnitude(series);
    if peak > 0.0 {
        series.iter_mut().for_each(|x| *x /= peak);
    }
}

/// Maps the series onto exactly `target` samples.
///
/// The first and last samples are preserved; inner samples are taken at
/// evenly spaced fractional positions.
pub fn resample(series: &[Real], target: usize, method: ResamplingMethod) -> Result<Vec<Real>> {
    if series.is_empty() {
        return Err(ResinError::Data("Cannot resample an empty series".to_string()));
    }
    if target == 0 {
        return Err(ResinError::Data("Resampling target must be > 0".to_string()));
    }
    let m = series.len();
    if m == 1 {
        return Ok(vec![series[0]; target]);
    }
    if target == 1 {
        return Ok(vec![series[0]]);
    }

    let scale = (m - 1) as Real / (target - 1) as Real;
    let out = (0..target)
        .map(|i| {
            let pos = i as Real * scale;
            match method {
                ResamplingMethod::Nearest => series[(pos.round() as usize).min(m - 1)],
                ResamplingMethod::Linear => {
                    let lo = (pos.floor() as usize).min(m - 1);
                    let hi = (lo + 1).min(m - 1);
                    let frac = pos - lo as Real;
                    series[lo] + (series[hi] - series[lo]) * frac
                }
            }
        })
        .collect();
    Ok(out)
}
