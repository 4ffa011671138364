//! 1-D lookup-table mapping
//!
//! Maps `start + i·inc` to `table[i]` with linear interpolation between
//! entries. Inputs outside the tabulated range come out as the bad value.
//! The inverse exists when the table is strictly monotonic and is
//! evaluated by bisection over the bracketing pair.

use serde::{Deserialize, Serialize};

use crate::error::WcsError;
use crate::mapping::BAD;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum Monotone {
    Increasing,
    Decreasing,
    None,
}

/// 1-D lookup table with linear interpolation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LutMap {
    table: Vec<f64>,
    start: f64,
    inc: f64,
    monotone: Monotone,
}

impl LutMap {
    pub fn new(table: Vec<f64>, start: f64, inc: f64) -> Result<Self> {
        if table.len() < 2 {
            return Err(WcsError::bad_attr_value(
                "Lut",
                format!("table needs at least 2 entries, got {}", table.len()),
            ));
        }
        if inc == 0.0 || !inc.is_finite() {
            return Err(WcsError::bad_attr_value(
                "Lut",
                format!("invalid table spacing {inc}"),
            ));
        }
        let monotone = if table.windows(2).all(|w| w[1] > w[0]) {
            Monotone::Increasing
        } else if table.windows(2).all(|w| w[1] < w[0]) {
            Monotone::Decreasing
        } else {
            Monotone::None
        };
        Ok(Self {
            table,
            start,
            inc,
            monotone,
        })
    }

    pub fn table(&self) -> &[f64] {
        &self.table
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn inc(&self) -> f64 {
        self.inc
    }

    pub fn nin(&self) -> usize {
        1
    }

    pub fn nout(&self) -> usize {
        1
    }

    pub fn has_forward(&self) -> bool {
        true
    }

    pub fn has_inverse(&self) -> bool {
        self.monotone != Monotone::None
    }

    pub fn is_linear(&self) -> bool {
        false
    }

    pub fn is_diagonal(&self) -> bool {
        true
    }

    pub fn class_name(&self) -> &'static str {
        "LutMap"
    }

    pub fn tran(&self, input: &[f64], output: &mut [f64], forward: bool) -> Result<()> {
        output[0] = if forward {
            self.lookup(input[0])
        } else {
            if self.monotone == Monotone::None {
                return Err(WcsError::NoInverse {
                    class: "LutMap".to_string(),
                    direction: "inverse",
                });
            }
            self.reverse_lookup(input[0])
        };
        Ok(())
    }

    fn lookup(&self, x: f64) -> f64 {
        let t = (x - self.start) / self.inc;
        if t < 0.0 || t > (self.table.len() - 1) as f64 {
            return BAD;
        }
        let i = (t.floor() as usize).min(self.table.len() - 2);
        let frac = t - i as f64;
        self.table[i] + frac * (self.table[i + 1] - self.table[i])
    }

    fn reverse_lookup(&self, y: f64) -> f64 {
        let n = self.table.len();
        let increasing = self.monotone == Monotone::Increasing;
        let (lo_val, hi_val) = if increasing {
            (self.table[0], self.table[n - 1])
        } else {
            (self.table[n - 1], self.table[0])
        };
        if y < lo_val || y > hi_val {
            return BAD;
        }
        // Bisect for the bracketing segment
        let mut lo = 0usize;
        let mut hi = n - 1;
        while hi - lo > 1 {
            let mid = (lo + hi) / 2;
            let take_left = if increasing {
                y <= self.table[mid]
            } else {
                y >= self.table[mid]
            };
            if take_left {
                hi = mid;
            } else {
                lo = mid;
            }
        }
        let span = self.table[hi] - self.table[lo];
        let frac = if span == 0.0 {
            0.0
        } else {
            (y - self.table[lo]) / span
        };
        self.start + (lo as f64 + frac) * self.inc
    }

    pub fn eq_with(&self, other: &LutMap, eps: f64) -> bool {
        (self.start - other.start).abs() <= eps
            && (self.inc - other.inc).abs() <= eps
            && super::linear::slices_eq(&self.table, &other.table, eps)
    }
}
