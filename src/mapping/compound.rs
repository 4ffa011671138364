//! Compound mapping: series and parallel combination
//!
//! A `CmpMap` owns two child mappings. In series the second is applied to
//! the output of the first; in parallel each child handles its own block
//! of axes. Children are independent clones, so mutating one holder's
//! copy never leaks into a compound built from it.

use serde::{Deserialize, Serialize};

use crate::error::WcsError;
use crate::mapping::Mapping;
use crate::Result;

/// Two mappings combined in series or parallel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CmpMap {
    series: bool,
    map1: Mapping,
    map2: Mapping,
}

impl CmpMap {
    /// Series combination: `map2` applied after `map1`
    ///
    /// Fails with `DimensionMismatch` unless `map1.nout() == map2.nin()`.
    pub fn series(map1: Mapping, map2: Mapping) -> Result<Self> {
        if map1.nout() != map2.nin() {
            return Err(WcsError::DimensionMismatch {
                context: "series composition".to_string(),
                expected: map1.nout(),
                found: map2.nin(),
            });
        }
        Ok(Self {
            series: true,
            map1,
            map2,
        })
    }

    /// Parallel combination: axes of `map1` followed by axes of `map2`
    pub fn parallel(map1: Mapping, map2: Mapping) -> Self {
        Self {
            series: false,
            map1,
            map2,
        }
    }

    pub fn is_series(&self) -> bool {
        self.series
    }

    pub fn map1(&self) -> &Mapping {
        &self.map1
    }

    pub fn map2(&self) -> &Mapping {
        &self.map2
    }

    pub fn nin(&self) -> usize {
        if self.series {
            self.map1.nin()
        } else {
            self.map1.nin() + self.map2.nin()
        }
    }

    pub fn nout(&self) -> usize {
        if self.series {
            self.map2.nout()
        } else {
            self.map1.nout() + self.map2.nout()
        }
    }

    pub fn has_forward(&self) -> bool {
        self.map1.has_forward() && self.map2.has_forward()
    }

    pub fn has_inverse(&self) -> bool {
        self.map1.has_inverse() && self.map2.has_inverse()
    }

    pub fn is_linear(&self) -> bool {
        self.map1.is_linear() && self.map2.is_linear()
    }

    pub fn is_diagonal(&self) -> bool {
        self.map1.is_diagonal() && self.map2.is_diagonal()
    }

    pub fn class_name(&self) -> &'static str {
        "CmpMap"
    }

    pub fn tran(&self, input: &[f64], output: &mut [f64], forward: bool) -> Result<()> {
        if self.series {
            if forward {
                let mid = self.map1.transform_point(input, true)?;
                let out = self.map2.transform_point(&mid, true)?;
                output.copy_from_slice(&out);
            } else {
                let mid = self.map2.transform_point(input, false)?;
                let out = self.map1.transform_point(&mid, false)?;
                output.copy_from_slice(&out);
            }
        } else {
            // Parallel: split the point at the child boundary. The boundary
            // sits at map1's input count going forward and its output count
            // going back.
            let split_in = if forward {
                self.map1.nin()
            } else {
                self.map1.nout()
            };
            let out1 = self.map1.transform_point(&input[..split_in], forward)?;
            let out2 = self.map2.transform_point(&input[split_in..], forward)?;
            output[..out1.len()].copy_from_slice(&out1);
            output[out1.len()..].copy_from_slice(&out2);
        }
        Ok(())
    }

    pub fn eq_with(&self, other: &CmpMap, eps: f64) -> bool {
        self.series == other.series
            && self.map1.same_as_with(&other.map1, eps)
            && self.map2.same_as_with(&other.map2, eps)
    }
}
