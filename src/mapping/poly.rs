//! Polynomial mapping
//!
//! Each output axis is a multivariate polynomial of the inputs. An inverse
//! exists only when an explicit inverse coefficient set is supplied; there
//! is no iterative root-finding, so transforms stay deterministic.

use serde::{Deserialize, Serialize};

use crate::error::WcsError;
use crate::Result;

/// One polynomial term: `coeff · Π inᵢ^powersᵢ`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolyTerm {
    pub coeff: f64,
    /// One exponent per input axis
    pub powers: Vec<u32>,
}

impl PolyTerm {
    pub fn new(coeff: f64, powers: Vec<u32>) -> Self {
        Self { coeff, powers }
    }

    fn eval(&self, input: &[f64]) -> f64 {
        let mut acc = self.coeff;
        for (v, &p) in input.iter().zip(&self.powers) {
            if p > 0 {
                acc *= v.powi(p as i32);
            }
        }
        acc
    }
}

/// Polynomial transform, one term list per output axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolyMap {
    nin: usize,
    nout: usize,
    forward: Vec<Vec<PolyTerm>>,
    inverse: Option<Vec<Vec<PolyTerm>>>,
}

impl PolyMap {
    pub fn new(
        nin: usize,
        nout: usize,
        forward: Vec<Vec<PolyTerm>>,
        inverse: Option<Vec<Vec<PolyTerm>>>,
    ) -> Result<Self> {
        if forward.len() != nout {
            return Err(WcsError::DimensionMismatch {
                context: "polynomial output axes".to_string(),
                expected: nout,
                found: forward.len(),
            });
        }
        validate_terms(&forward, nin, "forward")?;
        if let Some(inv) = &inverse {
            if inv.len() != nin {
                return Err(WcsError::DimensionMismatch {
                    context: "inverse polynomial output axes".to_string(),
                    expected: nin,
                    found: inv.len(),
                });
            }
            validate_terms(inv, nout, "inverse")?;
        }
        Ok(Self {
            nin,
            nout,
            forward,
            inverse,
        })
    }

    pub fn nin(&self) -> usize {
        self.nin
    }

    pub fn nout(&self) -> usize {
        self.nout
    }

    /// Forward term lists, one per output axis
    pub fn forward_terms(&self) -> &[Vec<PolyTerm>] {
        &self.forward
    }

    /// Inverse term lists, when an explicit inverse was supplied
    pub fn inverse_terms(&self) -> Option<&[Vec<PolyTerm>]> {
        self.inverse.as_deref()
    }

    pub fn has_forward(&self) -> bool {
        true
    }

    pub fn has_inverse(&self) -> bool {
        self.inverse.is_some()
    }

    pub fn is_linear(&self) -> bool {
        // Linear only in the degenerate all-degree<=1 case; the simplifier
        // does not fold polynomials, so report false unconditionally.
        false
    }

    pub fn is_diagonal(&self) -> bool {
        false
    }

    pub fn class_name(&self) -> &'static str {
        "PolyMap"
    }

    pub fn tran(&self, input: &[f64], output: &mut [f64], forward: bool) -> Result<()> {
        let coeffs = if forward {
            &self.forward
        } else {
            match &self.inverse {
                Some(inv) => inv,
                None => {
                    return Err(WcsError::NoInverse {
                        class: "PolyMap".to_string(),
                        direction: "inverse",
                    })
                }
            }
        };
        for (out, terms) in output.iter_mut().zip(coeffs) {
            *out = terms.iter().map(|t| t.eval(input)).sum();
        }
        Ok(())
    }

    pub fn eq_with(&self, other: &PolyMap, eps: f64) -> bool {
        self.nin == other.nin
            && self.nout == other.nout
            && terms_eq(&self.forward, &other.forward, eps)
            && match (&self.inverse, &other.inverse) {
                (None, None) => true,
                (Some(a), Some(b)) => terms_eq(a, b, eps),
                _ => false,
            }
    }
}

fn validate_terms(axes: &[Vec<PolyTerm>], nin: usize, which: &str) -> Result<()> {
    for terms in axes {
        for term in terms {
            if term.powers.len() != nin {
                return Err(WcsError::DimensionMismatch {
                    context: format!("{which} polynomial term exponents"),
                    expected: nin,
                    found: term.powers.len(),
                });
            }
        }
    }
    Ok(())
}

fn terms_eq(a: &[Vec<PolyTerm>], b: &[Vec<PolyTerm>], eps: f64) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|(ta, tb)| {
            ta.len() == tb.len()
                && ta
                    .iter()
                    .zip(tb)
                    .all(|(x, y)| (x.coeff - y.coeff).abs() <= eps && x.powers == y.powers)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quadratic() -> PolyMap {
        // out = 2 + 3x + x^2
        PolyMap::new(
            1,
            1,
            vec![vec![
                PolyTerm::new(2.0, vec![0]),
                PolyTerm::new(3.0, vec![1]),
                PolyTerm::new(1.0, vec![2]),
            ]],
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_poly_eval() {
        let m = quadratic();
        let mut out = [0.0];
        m.tran(&[2.0], &mut out, true).unwrap();
        assert_eq!(out[0], 2.0 + 6.0 + 4.0);
    }

    #[test]
    fn test_poly_multivariate() {
        // out = x*y
        let m = PolyMap::new(2, 1, vec![vec![PolyTerm::new(1.0, vec![1, 1])]], None).unwrap();
        let mut out = [0.0];
        m.tran(&[3.0, 4.0], &mut out, true).unwrap();
        assert_eq!(out[0], 12.0);
    }

    #[test]
    fn test_poly_without_inverse() {
        let m = quadratic();
        assert!(!m.has_inverse());
        let mut out = [0.0];
        assert!(matches!(
            m.tran(&[1.0], &mut out, false),
            Err(WcsError::NoInverse { .. })
        ));
    }

    #[test]
    fn test_poly_with_explicit_inverse() {
        // forward: y = 2x + 1; inverse: x = (y - 1) / 2
        let m = PolyMap::new(
            1,
            1,
            vec![vec![PolyTerm::new(2.0, vec![1]), PolyTerm::new(1.0, vec![0])]],
            Some(vec![vec![
                PolyTerm::new(0.5, vec![1]),
                PolyTerm::new(-0.5, vec![0]),
            ]]),
        )
        .unwrap();
        assert!(m.has_inverse());
        let mut fwd = [0.0];
        m.tran(&[4.0], &mut fwd, true).unwrap();
        assert_eq!(fwd[0], 9.0);
        let mut back = [0.0];
        m.tran(&fwd, &mut back, false).unwrap();
        assert_eq!(back[0], 4.0);
    }

    #[test]
    fn test_poly_validation() {
        // exponent vector with the wrong arity
        let err = PolyMap::new(2, 1, vec![vec![PolyTerm::new(1.0, vec![1])]], None).unwrap_err();
        assert!(matches!(err, WcsError::DimensionMismatch { .. }));

        // wrong number of output axes
        let err = PolyMap::new(1, 2, vec![vec![PolyTerm::new(1.0, vec![1])]], None).unwrap_err();
        assert!(matches!(err, WcsError::DimensionMismatch { .. }));
    }
}
