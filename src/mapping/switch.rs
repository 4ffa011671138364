//! Piecewise (selector-routed) mapping
//!
//! A selector mapping reduces each input point to a single route number
//! (1-based, rounded to nearest); the point is then transformed by that
//! route. The inverse direction needs its own selector operating on
//! output-space points. Points whose selector value names no route come
//! out as the bad value.

use serde::{Deserialize, Serialize};

use crate::error::WcsError;
use crate::mapping::{Mapping, BAD};
use crate::Result;

/// Selector-driven piecewise mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchMap {
    fwd_selector: Option<Box<Mapping>>,
    inv_selector: Option<Box<Mapping>>,
    routes: Vec<Mapping>,
}

impl SwitchMap {
    pub fn new(
        fwd_selector: Option<Mapping>,
        inv_selector: Option<Mapping>,
        routes: Vec<Mapping>,
    ) -> Result<Self> {
        let first = routes.first().ok_or_else(|| {
            WcsError::bad_attr_value("Routes", "a switch needs at least one route")
        })?;
        let (nin, nout) = (first.nin(), first.nout());
        for (i, route) in routes.iter().enumerate() {
            if route.nin() != nin {
                return Err(WcsError::DimensionMismatch {
                    context: format!("switch route {} input", i + 1),
                    expected: nin,
                    found: route.nin(),
                });
            }
            if route.nout() != nout {
                return Err(WcsError::DimensionMismatch {
                    context: format!("switch route {} output", i + 1),
                    expected: nout,
                    found: route.nout(),
                });
            }
        }
        if let Some(sel) = &fwd_selector {
            if sel.nin() != nin {
                return Err(WcsError::DimensionMismatch {
                    context: "forward selector input".to_string(),
                    expected: nin,
                    found: sel.nin(),
                });
            }
            if sel.nout() != 1 {
                return Err(WcsError::DimensionMismatch {
                    context: "forward selector output".to_string(),
                    expected: 1,
                    found: sel.nout(),
                });
            }
        }
        if let Some(sel) = &inv_selector {
            if sel.nin() != nout {
                return Err(WcsError::DimensionMismatch {
                    context: "inverse selector input".to_string(),
                    expected: nout,
                    found: sel.nin(),
                });
            }
            if sel.nout() != 1 {
                return Err(WcsError::DimensionMismatch {
                    context: "inverse selector output".to_string(),
                    expected: 1,
                    found: sel.nout(),
                });
            }
        }
        Ok(Self {
            fwd_selector: fwd_selector.map(Box::new),
            inv_selector: inv_selector.map(Box::new),
            routes,
        })
    }

    pub fn routes(&self) -> &[Mapping] {
        &self.routes
    }

    pub fn fwd_selector(&self) -> Option<&Mapping> {
        self.fwd_selector.as_deref()
    }

    pub fn inv_selector(&self) -> Option<&Mapping> {
        self.inv_selector.as_deref()
    }

    pub fn nin(&self) -> usize {
        self.routes[0].nin()
    }

    pub fn nout(&self) -> usize {
        self.routes[0].nout()
    }

    pub fn has_forward(&self) -> bool {
        self.fwd_selector.is_some() && self.routes.iter().all(|r| r.has_forward())
    }

    pub fn has_inverse(&self) -> bool {
        self.inv_selector.is_some() && self.routes.iter().all(|r| r.has_inverse())
    }

    pub fn is_linear(&self) -> bool {
        false
    }

    pub fn is_diagonal(&self) -> bool {
        false
    }

    pub fn class_name(&self) -> &'static str {
        "SwitchMap"
    }

    pub fn tran(&self, input: &[f64], output: &mut [f64], forward: bool) -> Result<()> {
        let selector = if forward {
            self.fwd_selector.as_deref()
        } else {
            self.inv_selector.as_deref()
        };
        let selector = selector.ok_or_else(|| WcsError::NoInverse {
            class: "SwitchMap".to_string(),
            direction: if forward { "forward" } else { "inverse" },
        })?;
        let sel = selector.transform_point(input, true)?;
        let route = sel[0].round();
        if sel[0] == BAD || route < 1.0 || route > self.routes.len() as f64 {
            output.fill(BAD);
            return Ok(());
        }
        let out = self.routes[route as usize - 1].transform_point(input, forward)?;
        output.copy_from_slice(&out);
        Ok(())
    }

    pub fn eq_with(&self, other: &SwitchMap, eps: f64) -> bool {
        let sel_eq = |a: &Option<Box<Mapping>>, b: &Option<Box<Mapping>>| match (a, b) {
            (None, None) => true,
            (Some(x), Some(y)) => x.same_as_with(y, eps),
            _ => false,
        };
        sel_eq(&self.fwd_selector, &other.fwd_selector)
            && sel_eq(&self.inv_selector, &other.inv_selector)
            && self.routes.len() == other.routes.len()
            && self
                .routes
                .iter()
                .zip(&other.routes)
                .all(|(a, b)| a.same_as_with(b, eps))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::Mapping;

    /// Selector: route 1 for x < 0, route 2 otherwise, via a small lookup
    fn sign_switch() -> Mapping {
        let selector = Mapping::lut(vec![1.0, 1.0, 2.0, 2.0], -10.0, 5.0).unwrap();
        let negate = Mapping::zoom(1, -1.0);
        let double = Mapping::zoom(1, 2.0);
        Mapping::switch(Some(selector), None, vec![negate, double]).unwrap()
    }

    #[test]
    fn test_switch_routes_by_selector() {
        let m = sign_switch();
        // x = -4 selects route 1 (negate)
        let out = m.transform_point(&[-4.0], true).unwrap();
        assert_eq!(out, vec![4.0]);
        // x = 4 selects route 2 (double)
        let out = m.transform_point(&[4.0], true).unwrap();
        assert_eq!(out, vec![8.0]);
    }

    #[test]
    fn test_switch_without_inverse_selector() {
        let m = sign_switch();
        assert!(!m.has_inverse());
        assert!(matches!(
            m.transform_point(&[1.0], false),
            Err(WcsError::NoInverse { .. })
        ));
    }

    #[test]
    fn test_switch_selector_out_of_range_is_bad() {
        let m = sign_switch();
        // Outside the selector table the selector emits BAD
        let out = m.transform_point(&[100.0], true).unwrap();
        assert_eq!(out, vec![BAD]);
    }

    #[test]
    fn test_switch_route_dimension_check() {
        let selector = Mapping::zoom(1, 1.0);
        let err = Mapping::switch(
            Some(selector),
            None,
            vec![Mapping::zoom(1, 2.0), Mapping::zoom(2, 2.0)],
        )
        .unwrap_err();
        assert!(matches!(err, WcsError::DimensionMismatch { .. }));
    }
}
