//! Axis permutation mapping

use serde::{Deserialize, Serialize};

use crate::error::WcsError;
use crate::Result;

/// Axis permutation: output axis `i` carries input axis `perm[i]`
///
/// `perm` must be a permutation of `0..n`, so the mapping is always
/// invertible (the inverse is the inverse permutation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermMap {
    perm: Vec<usize>,
    inverse: Vec<usize>,
}

impl PermMap {
    pub fn new(perm: Vec<usize>) -> Result<Self> {
        let n = perm.len();
        let mut inverse = vec![usize::MAX; n];
        for (i, &p) in perm.iter().enumerate() {
            if p >= n {
                return Err(WcsError::bad_attr_value(
                    "Perm",
                    format!("axis index {p} out of range for {n} axes"),
                ));
            }
            if inverse[p] != usize::MAX {
                return Err(WcsError::bad_attr_value(
                    "Perm",
                    format!("axis index {p} appears more than once"),
                ));
            }
            inverse[p] = i;
        }
        Ok(Self { perm, inverse })
    }

    pub fn perm(&self) -> &[usize] {
        &self.perm
    }

    /// True when the permutation leaves every axis in place
    pub fn is_identity(&self) -> bool {
        self.perm.iter().enumerate().all(|(i, &p)| i == p)
    }

    /// `second ∘ first` as a single permutation
    pub fn compose(first: &PermMap, second: &PermMap) -> Result<PermMap> {
        if first.perm.len() != second.perm.len() {
            return Err(WcsError::DimensionMismatch {
                context: "permutation composition".to_string(),
                expected: first.perm.len(),
                found: second.perm.len(),
            });
        }
        // z[i] = y[second[i]] = x[first[second[i]]]
        let perm = second.perm.iter().map(|&i| first.perm[i]).collect();
        PermMap::new(perm)
    }

    /// The inverse permutation as its own map
    pub fn inverted(&self) -> PermMap {
        PermMap {
            perm: self.inverse.clone(),
            inverse: self.perm.clone(),
        }
    }

    pub fn nin(&self) -> usize {
        self.perm.len()
    }

    pub fn nout(&self) -> usize {
        self.perm.len()
    }

    pub fn has_forward(&self) -> bool {
        true
    }

    pub fn has_inverse(&self) -> bool {
        true
    }

    pub fn is_linear(&self) -> bool {
        true
    }

    pub fn is_diagonal(&self) -> bool {
        self.is_identity()
    }

    pub fn class_name(&self) -> &'static str {
        "PermMap"
    }

    pub fn tran(&self, input: &[f64], output: &mut [f64], forward: bool) -> Result<()> {
        let perm = if forward { &self.perm } else { &self.inverse };
        for (i, &p) in perm.iter().enumerate() {
            output[i] = input[p];
        }
        Ok(())
    }

    pub fn eq_with(&self, other: &PermMap, _eps: f64) -> bool {
        self.perm == other.perm
    }
}
