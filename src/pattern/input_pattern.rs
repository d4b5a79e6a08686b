//! Multi-variable time series submitted as one example.

use crate::error::{ResinError, Result};
use crate::types::{Real, VarIdx};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Layout of the variables inside a flat pattern vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum VariablesSchema {
    /// All samples of variable 0, then all samples of variable 1, ...
    #[default]
    Groupped,
    /// All variables at time 0, then all variables at time 1, ...
    VarSequence,
}

/// An ordered set of per-variable time series.
///
/// The series may have different lengths until the pattern is resampled.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InputPattern {
    variables: Vec<Vec<Real>>,
}

impl InputPattern {
    /// Creates a pattern from per-variable series.
    pub fn new(variables: Vec<Vec<Real>>) -> Result<Self> {
        if variables.is_empty() {
            return Err(ResinError::Data("Pattern has no variables".to_string()));
        }
        if let Some(idx) = variables.iter().position(Vec::is_empty) {
            return Err(ResinError::Data(format!("Variable {idx} has no samples")));
        }
        Ok(Self { variables })
    }

    /// Splits a flat vector into `num_vars` equally long series.
    pub fn from_flat(data: &[Real], num_vars: usize, schema: VariablesSchema) -> Result<Self> {
        if num_vars == 0 {
            return Err(ResinError::Data("Pattern must have at least one variable".to_string()));
        }
        if data.is_empty() || data.len() % num_vars != 0 {
            return Err(ResinError::Data(format!(
                "Pattern data length {} is not a positive multiple of {} variables",
                data.len(),
                num_vars
            )));
        }

        let len = data.len() / num_vars;
        let variables = match schema {
            VariablesSchema::Groupped => data.chunks(len).map(<[Real]>::to_vec).collect(),
            VariablesSchema::VarSequence => (0..num_vars)
                .map(|v| data.iter().skip(v).step_by(num_vars).copied().collect())
                .collect(),
        };
        Ok(Self { variables })
    }

    /// Number of variables.
    pub fn num_vars(&self) -> usize {
        self.variables.len()
    }

    /// The series of one variable.
    pub fn variable(&self, idx: VarIdx) -> &[Real] {
        &self.variables[idx]
    }

    /// All series.
    pub fn variables(&self) -> &[Vec<Real>] {
        &self.variables
    }

    /// Length of the longest series.
    pub fn max_len(&self) -> usize {
        self.variables.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Returns the common length if every series has the same length.
    pub fn uniform_len(&self) -> Option<usize> {
        let first = self.variables[0].len();
        self.variables
            .iter()
            .all(|v| v.len() == first)
            .then_some(first)
    }

    /// Transposes the pattern into one vector per time point.
    pub fn to_time_points(&self) -> Result<Vec<Vec<Real>>> {
        let len = self.uniform_len().ok_or_else(|| {
            ResinError::Data("Pattern variables have different lengths".to_string())
        })?;
        Ok((0..len)
            .map(|t| self.variables.iter().map(|v| v[t]).collect())
            .collect())
    }
}
