//! Compound regions: boolean combinations
//!
//! A `CmpRegion` owns two child regions with the same axis count and a
//! combinator. Children evaluate independently in the shared space;
//! intersection and difference short-circuit on the first child as an
//! optimization, never a correctness requirement.

use serde::{Deserialize, Serialize};

use crate::error::WcsError;
use crate::region::Region;
use crate::Result;

/// How two child regions combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegionOper {
    Union,
    Intersection,
    Difference,
}

impl RegionOper {
    pub fn name(&self) -> &'static str {
        match self {
            RegionOper::Union => "Union",
            RegionOper::Intersection => "Intersection",
            RegionOper::Difference => "Difference",
        }
    }

    pub fn from_name(name: &str) -> Option<RegionOper> {
        match name {
            "Union" => Some(RegionOper::Union),
            "Intersection" => Some(RegionOper::Intersection),
            "Difference" => Some(RegionOper::Difference),
            _ => None,
        }
    }
}

/// Two regions joined by a boolean combinator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CmpRegion {
    oper: RegionOper,
    first: Region,
    second: Region,
}

impl CmpRegion {
    pub fn new(oper: RegionOper, first: Region, second: Region) -> Self {
        Self {
            oper,
            first,
            second,
        }
    }

    pub fn oper(&self) -> RegionOper {
        self.oper
    }

    pub fn first(&self) -> &Region {
        &self.first
    }

    pub fn second(&self) -> &Region {
        &self.second
    }

    /// Combined containment; `p` is a point in the shared space
    pub fn contains(&self, p: &[f64]) -> Result<bool> {
        match self.oper {
            RegionOper::Union => Ok(self.first.contains(p)? || self.second.contains(p)?),
            RegionOper::Intersection => {
                Ok(self.first.contains(p)? && self.second.contains(p)?)
            }
            RegionOper::Difference => {
                Ok(self.first.contains(p)? && !self.second.contains(p)?)
            }
        }
    }

    /// Combined bounding box
    pub fn bounds(&self) -> Result<Vec<(f64, f64)>> {
        match self.oper {
            RegionOper::Union => {
                let a = self.first.bounds()?;
                let b = self.second.bounds()?;
                Ok(a.iter()
                    .zip(&b)
                    .map(|((al, au), (bl, bu))| (al.min(*bl), au.max(*bu)))
                    .collect())
            }
            RegionOper::Intersection => {
                // An unbounded child constrains nothing; use the other
                match (self.first.bounds(), self.second.bounds()) {
                    (Ok(a), Ok(b)) => Ok(a
                        .iter()
                        .zip(&b)
                        .map(|((al, au), (bl, bu))| (al.max(*bl), au.min(*bu)))
                        .collect()),
                    (Ok(a), Err(e)) if e.is_signal() => Ok(a),
                    (Err(e), Ok(b)) if e.is_signal() => Ok(b),
                    (Err(e), _) => Err(e),
                    (_, Err(e)) => Err(e),
                }
            }
            // Subtraction can only shrink the first region
            RegionOper::Difference => self.first.bounds(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;

    fn unit_box(x0: f64, x1: f64) -> Region {
        Region::new_box(Frame::new(1), vec![x0], vec![x1]).unwrap()
    }

    #[test]
    fn test_union_contains() {
        let r = Region::combine(RegionOper::Union, unit_box(0.0, 1.0), unit_box(2.0, 3.0))
            .unwrap();
        assert!(r.contains(&[0.5]).unwrap());
        assert!(r.contains(&[2.5]).unwrap());
        assert!(!r.contains(&[1.5]).unwrap());
    }

    #[test]
    fn test_intersection_matches_pointwise_and() {
        let a = unit_box(0.0, 2.0);
        let b = unit_box(1.0, 3.0);
        let r = Region::combine(RegionOper::Intersection, a.clone(), b.clone()).unwrap();
        for x in [-0.5, 0.5, 1.5, 2.5, 3.5] {
            let expect = a.contains(&[x]).unwrap() && b.contains(&[x]).unwrap();
            assert_eq!(r.contains(&[x]).unwrap(), expect, "x = {x}");
        }
    }

    #[test]
    fn test_difference_contains() {
        let r = Region::combine(
            RegionOper::Difference,
            unit_box(0.0, 3.0),
            unit_box(1.0, 2.0),
        )
        .unwrap();
        assert!(r.contains(&[0.5]).unwrap());
        assert!(!r.contains(&[1.5]).unwrap());
        assert!(r.contains(&[2.5]).unwrap());
    }

    #[test]
    fn test_union_bounds() {
        let r = Region::combine(RegionOper::Union, unit_box(0.0, 1.0), unit_box(2.0, 3.0))
            .unwrap();
        assert_eq!(r.bounds().unwrap(), vec![(0.0, 3.0)]);
    }

    #[test]
    fn test_intersection_with_unbounded_child() {
        let half_line =
            Region::new_interval(Frame::new(1), vec![Some(0.0)], vec![None]).unwrap();
        let r = Region::combine(RegionOper::Intersection, half_line, unit_box(-1.0, 2.0))
            .unwrap();
        assert_eq!(r.bounds().unwrap(), vec![(-1.0, 2.0)]);
        assert!(r.contains(&[1.0]).unwrap());
        assert!(!r.contains(&[-0.5]).unwrap());
    }

    #[test]
    fn test_union_with_unbounded_child_is_unbounded() {
        let half_line =
            Region::new_interval(Frame::new(1), vec![Some(0.0)], vec![None]).unwrap();
        let r = Region::combine(RegionOper::Union, half_line, unit_box(-1.0, 2.0)).unwrap();
        assert!(matches!(r.bounds(), Err(WcsError::Unbounded { .. })));
    }

    #[test]
    fn test_axis_count_mismatch_rejected() {
        let a = unit_box(0.0, 1.0);
        let b = Region::new_box(Frame::new(2), vec![0.0, 0.0], vec![1.0, 1.0]).unwrap();
        let err = Region::combine(RegionOper::Union, a, b).unwrap_err();
        assert!(matches!(err, WcsError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_nested_compound() {
        let r = Region::combine(
            RegionOper::Difference,
            Region::combine(RegionOper::Union, unit_box(0.0, 1.0), unit_box(2.0, 3.0))
                .unwrap(),
            unit_box(0.4, 0.6),
        )
        .unwrap();
        assert!(r.contains(&[0.2]).unwrap());
        assert!(!r.contains(&[0.5]).unwrap());
        assert!(r.contains(&[2.5]).unwrap());
    }
}
