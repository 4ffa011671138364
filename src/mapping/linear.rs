//! Linear mapping kinds
//!
//! `UnitMap`, `ShiftMap` and `ZoomMap` are the cheap special cases the
//! simplifier likes to produce; `AffineMap` is the general `A·x + b` form
//! every linear kind folds into. An affine inverse is computed once at
//! construction (Gauss-Jordan with partial pivoting) and reused per point.

use serde::{Deserialize, Serialize};

use crate::error::WcsError;
use crate::Result;

/// Identity over N axes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitMap {
    naxes: usize,
}

impl UnitMap {
    pub fn new(naxes: usize) -> Self {
        Self { naxes }
    }

    pub fn nin(&self) -> usize {
        self.naxes
    }

    pub fn nout(&self) -> usize {
        self.naxes
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
        true
    }

    pub fn class_name(&self) -> &'static str {
        "UnitMap"
    }

    pub fn tran(&self, input: &[f64], output: &mut [f64], _forward: bool) -> Result<()> {
        output.copy_from_slice(input);
        Ok(())
    }

    pub fn eq_with(&self, other: &UnitMap, _eps: f64) -> bool {
        self.naxes == other.naxes
    }
}

/// Per-axis additive offsets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftMap {
    shifts: Vec<f64>,
}

impl ShiftMap {
    pub fn new(shifts: Vec<f64>) -> Self {
        Self { shifts }
    }

    pub fn shifts(&self) -> &[f64] {
        &self.shifts
    }

    pub fn nin(&self) -> usize {
        self.shifts.len()
    }

    pub fn nout(&self) -> usize {
        self.shifts.len()
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
        true
    }

    pub fn class_name(&self) -> &'static str {
        "ShiftMap"
    }

    pub fn tran(&self, input: &[f64], output: &mut [f64], forward: bool) -> Result<()> {
        for (i, (v, s)) in input.iter().zip(&self.shifts).enumerate() {
            output[i] = if forward { v + s } else { v - s };
        }
        Ok(())
    }

    pub fn eq_with(&self, other: &ShiftMap, eps: f64) -> bool {
        slices_eq(&self.shifts, &other.shifts, eps)
    }
}

/// Uniform scale over N axes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoomMap {
    naxes: usize,
    factor: f64,
}

impl ZoomMap {
    pub fn new(naxes: usize, factor: f64) -> Self {
        Self { naxes, factor }
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    pub fn nin(&self) -> usize {
        self.naxes
    }

    pub fn nout(&self) -> usize {
        self.naxes
    }

    pub fn has_forward(&self) -> bool {
        true
    }

    pub fn has_inverse(&self) -> bool {
        self.factor != 0.0
    }

    pub fn is_linear(&self) -> bool {
        true
    }

    pub fn is_diagonal(&self) -> bool {
        true
    }

    pub fn class_name(&self) -> &'static str {
        "ZoomMap"
    }

    pub fn tran(&self, input: &[f64], output: &mut [f64], forward: bool) -> Result<()> {
        for (i, v) in input.iter().enumerate() {
            output[i] = if forward { v * self.factor } else { v / self.factor };
        }
        Ok(())
    }

    pub fn eq_with(&self, other: &ZoomMap, eps: f64) -> bool {
        self.naxes == other.naxes && (self.factor - other.factor).abs() <= eps
    }
}

/// General affine transform `out = matrix · in + offset`
///
/// The matrix is row-major, `nout × nin`. The inverse exists when the
/// matrix is square and non-singular; it is computed at construction and
/// stored, so inversion never recomputes per point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffineMap {
    nin: usize,
    nout: usize,
    matrix: Vec<f64>,
    offset: Vec<f64>,
    inverse: Option<(Vec<f64>, Vec<f64>)>,
}

impl AffineMap {
    pub fn new(nin: usize, nout: usize, matrix: Vec<f64>, offset: Vec<f64>) -> Result<Self> {
        if matrix.len() != nin * nout {
            return Err(WcsError::DimensionMismatch {
                context: "affine matrix".to_string(),
                expected: nin * nout,
                found: matrix.len(),
            });
        }
        if offset.len() != nout {
            return Err(WcsError::DimensionMismatch {
                context: "affine offset".to_string(),
                expected: nout,
                found: offset.len(),
            });
        }
        let inverse = if nin == nout {
            invert_matrix(nin, &matrix).map(|inv| {
                // x = A⁻¹ (y - b)  =  A⁻¹ y + (-A⁻¹ b)
                let mut inv_offset = vec![0.0; nin];
                for (r, item) in inv_offset.iter_mut().enumerate() {
                    let mut acc = 0.0;
                    for c in 0..nin {
                        acc += inv[r * nin + c] * offset[c];
                    }
                    *item = -acc;
                }
                (inv, inv_offset)
            })
        } else {
            None
        };
        Ok(Self {
            nin,
            nout,
            matrix,
            offset,
            inverse,
        })
    }

    /// Identity affine over `n` axes
    pub fn identity(n: usize) -> Self {
        let mut matrix = vec![0.0; n * n];
        for i in 0..n {
            matrix[i * n + i] = 1.0;
        }
        Self {
            nin: n,
            nout: n,
            matrix: matrix.clone(),
            offset: vec![0.0; n],
            inverse: Some((matrix, vec![0.0; n])),
        }
    }

    pub fn matrix(&self) -> &[f64] {
        &self.matrix
    }

    pub fn offset(&self) -> &[f64] {
        &self.offset
    }

    pub fn nin(&self) -> usize {
        self.nin
    }

    pub fn nout(&self) -> usize {
        self.nout
    }

    pub fn has_forward(&self) -> bool {
        true
    }

    pub fn has_inverse(&self) -> bool {
        self.inverse.is_some()
    }

    pub fn is_linear(&self) -> bool {
        true
    }

    pub fn is_diagonal(&self) -> bool {
        if self.nin != self.nout {
            return false;
        }
        for r in 0..self.nout {
            for c in 0..self.nin {
                if r != c && self.matrix[r * self.nin + c] != 0.0 {
                    return false;
                }
            }
        }
        true
    }

    pub fn class_name(&self) -> &'static str {
        "AffineMap"
    }

    /// True when the transform is exactly the identity within `eps`
    pub fn is_identity(&self, eps: f64) -> bool {
        if self.nin != self.nout {
            return false;
        }
        for r in 0..self.nout {
            for c in 0..self.nin {
                let expect = if r == c { 1.0 } else { 0.0 };
                if (self.matrix[r * self.nin + c] - expect).abs() > eps {
                    return false;
                }
            }
        }
        self.offset.iter().all(|v| v.abs() <= eps)
    }

    /// `second ∘ first` as a single affine
    pub fn compose(first: &AffineMap, second: &AffineMap) -> Result<AffineMap> {
        if first.nout != second.nin {
            return Err(WcsError::DimensionMismatch {
                context: "affine composition".to_string(),
                expected: first.nout,
                found: second.nin,
            });
        }
        let nin = first.nin;
        let nout = second.nout;
        let k = first.nout;
        let mut matrix = vec![0.0; nin * nout];
        for r in 0..nout {
            for c in 0..nin {
                let mut acc = 0.0;
                for j in 0..k {
                    acc += second.matrix[r * k + j] * first.matrix[j * nin + c];
                }
                matrix[r * nin + c] = acc;
            }
        }
        let mut offset = vec![0.0; nout];
        for (r, item) in offset.iter_mut().enumerate() {
            let mut acc = second.offset[r];
            for j in 0..k {
                acc += second.matrix[r * k + j] * first.offset[j];
            }
            *item = acc;
        }
        AffineMap::new(nin, nout, matrix, offset)
    }

    /// Block-diagonal combination: axes of `a` followed by axes of `b`
    pub fn block(a: &AffineMap, b: &AffineMap) -> Result<AffineMap> {
        let nin = a.nin + b.nin;
        let nout = a.nout + b.nout;
        let mut matrix = vec![0.0; nin * nout];
        for r in 0..a.nout {
            for c in 0..a.nin {
                matrix[r * nin + c] = a.matrix[r * a.nin + c];
            }
        }
        for r in 0..b.nout {
            for c in 0..b.nin {
                matrix[(a.nout + r) * nin + (a.nin + c)] = b.matrix[r * b.nin + c];
            }
        }
        let mut offset = a.offset.clone();
        offset.extend_from_slice(&b.offset);
        AffineMap::new(nin, nout, matrix, offset)
    }

    /// The inverse as its own affine, when it exists
    pub fn inverted(&self) -> Result<AffineMap> {
        match &self.inverse {
            Some((m, b)) => AffineMap::new(self.nout, self.nin, m.clone(), b.clone()),
            None => Err(WcsError::SingularMatrix {
                msg: format!("{}x{} affine has no inverse", self.nout, self.nin),
            }),
        }
    }

    pub fn tran(&self, input: &[f64], output: &mut [f64], forward: bool) -> Result<()> {
        let (matrix, offset, nin) = if forward {
            (&self.matrix, &self.offset, self.nin)
        } else {
            match &self.inverse {
                Some((m, b)) => (m, b, self.nout),
                None => {
                    return Err(WcsError::NoInverse {
                        class: "AffineMap".to_string(),
                        direction: "inverse",
                    })
                }
            }
        };
        for (r, out) in output.iter_mut().enumerate() {
            let mut acc = offset[r];
            for c in 0..nin {
                acc += matrix[r * nin + c] * input[c];
            }
            *out = acc;
        }
        Ok(())
    }

    pub fn eq_with(&self, other: &AffineMap, eps: f64) -> bool {
        self.nin == other.nin
            && self.nout == other.nout
            && slices_eq(&self.matrix, &other.matrix, eps)
            && slices_eq(&self.offset, &other.offset, eps)
    }
}

/// Invert a square row-major matrix by Gauss-Jordan elimination with
/// partial pivoting; `None` when the matrix is singular.
pub(crate) fn invert_matrix(n: usize, matrix: &[f64]) -> Option<Vec<f64>> {
    let mut a = matrix.to_vec();
    let mut inv = vec![0.0; n * n];
    for i in 0..n {
        inv[i * n + i] = 1.0;
    }
    for col in 0..n {
        // Pivot: largest magnitude in this column at or below the diagonal
        let mut pivot_row = col;
        let mut pivot_val = a[col * n + col].abs();
        for r in col + 1..n {
            let v = a[r * n + col].abs();
            if v > pivot_val {
                pivot_val = v;
                pivot_row = r;
            }
        }
        if pivot_val < f64::EPSILON {
            return None;
        }
        if pivot_row != col {
            for c in 0..n {
                a.swap(col * n + c, pivot_row * n + c);
                inv.swap(col * n + c, pivot_row * n + c);
            }
        }
        let pivot = a[col * n + col];
        for c in 0..n {
            a[col * n + c] /= pivot;
            inv[col * n + c] /= pivot;
        }
        for r in 0..n {
            if r == col {
                continue;
            }
            let factor = a[r * n + col];
            if factor == 0.0 {
                continue;
            }
            for c in 0..n {
                a[r * n + c] -= factor * a[col * n + c];
                inv[r * n + c] -= factor * inv[col * n + c];
            }
        }
    }
    Some(inv)
}

pub(crate) fn slices_eq(a: &[f64], b: &[f64], eps: f64) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() <= eps)
}
