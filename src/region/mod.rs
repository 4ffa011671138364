//! Regions: sub-volumes of coordinate space
//!
//! A [`Region`] pairs a [`Frame`] (native axis semantics) with a geometric
//! predicate over that frame's space, plus an encoding [`Mapping`] from
//! native to external coordinates (the identity unless the region has been
//! carried into another space). Kinds: axis-aligned box, interval with
//! optionally open ends, circle, 2-D ellipse and polygon, point list, and
//! compound combinations (see [`compound`]).
//!
//! Containment is evaluated in the native frame: the query point is pulled
//! back through the encoding mapping's inverse first. The predicate itself
//! is a pure function of the point; repeated evaluation always agrees.

pub mod compound;

use serde::{Deserialize, Serialize};

use crate::error::WcsError;
use crate::frame::Frame;
use crate::mapping::{is_bad, Mapping};
use crate::object::{AttrKind, AttrValue, Object};
use crate::Result;

pub use compound::{CmpRegion, RegionOper};

/// Geometric predicate of a region, in its native frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RegionKind {
    /// Axis-aligned box with finite bounds
    Box { lbnd: Vec<f64>, ubnd: Vec<f64> },
    /// Axis-aligned interval; `None` leaves that end open
    Interval {
        lbnd: Vec<Option<f64>>,
        ubnd: Vec<Option<f64>>,
    },
    /// N-dimensional ball
    Circle { center: Vec<f64>, radius: f64 },
    /// 2-D ellipse: semi-axes `radii`, rotated by `angle` radians
    Ellipse {
        center: [f64; 2],
        radii: [f64; 2],
        angle: f64,
    },
    /// 2-D polygon, even-odd containment rule
    Polygon { vertices: Vec<[f64; 2]> },
    /// Finite point list; containment is proximity within the configured
    /// tolerance
    Points { points: Vec<Vec<f64>> },
    /// Boolean combination of two child regions
    Cmp(Box<CmpRegion>),
}

/// A sub-volume of coordinate space with frame semantics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    frame: Frame,
    map: Mapping,
    kind: RegionKind,
    negated: bool,
    closed: bool,
    pub(crate) id: Option<String>,
}

impl Region {
    fn build(frame: Frame, kind: RegionKind) -> Self {
        let naxes = frame.naxes();
        Self {
            frame,
            map: Mapping::unit(naxes),
            kind,
            negated: false,
            closed: true,
            id: None,
        }
    }

    /// Axis-aligned box `[lbnd, ubnd]` in the given frame
    pub fn new_box(frame: Frame, lbnd: Vec<f64>, ubnd: Vec<f64>) -> Result<Self> {
        check_axes(&frame, lbnd.len(), "box lower bounds")?;
        check_axes(&frame, ubnd.len(), "box upper bounds")?;
        for (axis, (lo, hi)) in lbnd.iter().zip(&ubnd).enumerate() {
            if lo > hi {
                return Err(WcsError::bad_attr_value(
                    "Box",
                    format!("lower bound exceeds upper bound on axis {}", axis + 1),
                ));
            }
        }
        Ok(Self::build(frame, RegionKind::Box { lbnd, ubnd }))
    }

    /// Axis-aligned interval; `None` bounds are open (unbounded) ends
    pub fn new_interval(
        frame: Frame,
        lbnd: Vec<Option<f64>>,
        ubnd: Vec<Option<f64>>,
    ) -> Result<Self> {
        check_axes(&frame, lbnd.len(), "interval lower bounds")?;
        check_axes(&frame, ubnd.len(), "interval upper bounds")?;
        Ok(Self::build(frame, RegionKind::Interval { lbnd, ubnd }))
    }

    /// Ball of the given radius
    pub fn new_circle(frame: Frame, center: Vec<f64>, radius: f64) -> Result<Self> {
        check_axes(&frame, center.len(), "circle center")?;
        if !(radius.is_finite() && radius >= 0.0) {
            return Err(WcsError::bad_attr_value(
                "Circle",
                format!("invalid radius {radius}"),
            ));
        }
        Ok(Self::build(frame, RegionKind::Circle { center, radius }))
    }

    /// 2-D ellipse with semi-axes `radii` rotated by `angle` radians
    pub fn new_ellipse(
        frame: Frame,
        center: [f64; 2],
        radii: [f64; 2],
        angle: f64,
    ) -> Result<Self> {
        check_axes(&frame, 2, "ellipse")?;
        if radii.iter().any(|r| !(r.is_finite() && *r > 0.0)) {
            return Err(WcsError::bad_attr_value(
                "Ellipse",
                format!("invalid semi-axes {radii:?}"),
            ));
        }
        Ok(Self::build(
            frame,
            RegionKind::Ellipse {
                center,
                radii,
                angle,
            },
        ))
    }

    /// 2-D polygon; needs at least three vertices
    pub fn new_polygon(frame: Frame, vertices: Vec<[f64; 2]>) -> Result<Self> {
        check_axes(&frame, 2, "polygon")?;
        if vertices.len() < 3 {
            return Err(WcsError::bad_attr_value(
                "Polygon",
                format!("needs at least 3 vertices, got {}", vertices.len()),
            ));
        }
        Ok(Self::build(frame, RegionKind::Polygon { vertices }))
    }

    /// Finite list of points
    pub fn new_points(frame: Frame, points: Vec<Vec<f64>>) -> Result<Self> {
        for (i, p) in points.iter().enumerate() {
            check_axes(&frame, p.len(), &format!("point {}", i + 1))?;
        }
        Ok(Self::build(frame, RegionKind::Points { points }))
    }

    /// Boolean combination of two regions sharing an axis count
    pub fn combine(oper: RegionOper, a: Region, b: Region) -> Result<Self> {
        if a.naxes() != b.naxes() {
            return Err(WcsError::DimensionMismatch {
                context: "compound region".to_string(),
                expected: a.naxes(),
                found: b.naxes(),
            });
        }
        let frame = a.frame.clone();
        Ok(Self::build(
            frame,
            RegionKind::Cmp(Box::new(CmpRegion::new(oper, a, b))),
        ))
    }

    pub(crate) fn from_parts(
        frame: Frame,
        map: Mapping,
        kind: RegionKind,
        negated: bool,
        closed: bool,
    ) -> Self {
        Self {
            frame,
            map,
            kind,
            negated,
            closed,
            id: None,
        }
    }

    /// Axis count of the region's native frame
    pub fn naxes(&self) -> usize {
        self.frame.naxes()
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn frame_mut(&mut self) -> &mut Frame {
        &mut self.frame
    }

    /// The native-to-external encoding mapping
    pub fn mapping(&self) -> &Mapping {
        &self.map
    }

    pub fn kind(&self) -> &RegionKind {
        &self.kind
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// Flip between the region and its complement
    pub fn negate(&mut self) {
        self.negated = !self.negated;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Carry the region into another coordinate space
    ///
    /// The supplied mapping converts current external coordinates to the
    /// new space; it composes onto the encoding mapping.
    pub fn remap(&mut self, mapping: &Mapping) -> Result<()> {
        self.map = Mapping::series(&self.map, mapping)?.simplify();
        Ok(())
    }

    /// Test whether a point (in external coordinates) lies in the region
    ///
    /// Fails with `PointOutOfDomain` when the encoding mapping lacks the
    /// inverse needed to reach the native frame. A point whose pullback
    /// lands outside the mapping's domain is simply not contained.
    pub fn contains(&self, point: &[f64]) -> Result<bool> {
        if point.len() != self.map.nout() {
            return Err(WcsError::DimensionMismatch {
                context: "containment query".to_string(),
                expected: self.map.nout(),
                found: point.len(),
            });
        }
        let native = if self.map.kind_class() == "UnitMap" && !self.map.is_inverted() {
            point.to_vec()
        } else {
            if !self.map.has_inverse() {
                return Err(WcsError::PointOutOfDomain {
                    msg: "region mapping has no inverse".to_string(),
                });
            }
            self.map.transform_point(point, false)?
        };
        if native.iter().any(|v| is_bad(*v)) {
            return Ok(self.negated);
        }
        let inside = self.predicate(&native)?;
        Ok(inside != self.negated)
    }

    /// Evaluate the raw geometric predicate in native coordinates
    fn predicate(&self, p: &[f64]) -> Result<bool> {
        let closed = self.closed;
        Ok(match &self.kind {
            RegionKind::Box { lbnd, ubnd } => p
                .iter()
                .zip(lbnd.iter().zip(ubnd))
                .all(|(v, (lo, hi))| within(*v, Some(*lo), Some(*hi), closed)),
            RegionKind::Interval { lbnd, ubnd } => p
                .iter()
                .zip(lbnd.iter().zip(ubnd))
                .all(|(v, (lo, hi))| within(*v, *lo, *hi, closed)),
            RegionKind::Circle { center, radius } => {
                let d2: f64 = p
                    .iter()
                    .zip(center)
                    .map(|(v, c)| (v - c) * (v - c))
                    .sum();
                if closed {
                    d2 <= radius * radius
                } else {
                    d2 < radius * radius
                }
            }
            RegionKind::Ellipse {
                center,
                radii,
                angle,
            } => {
                let dx = p[0] - center[0];
                let dy = p[1] - center[1];
                let (sin, cos) = angle.sin_cos();
                let u = dx * cos + dy * sin;
                let v = -dx * sin + dy * cos;
                let q = (u / radii[0]).powi(2) + (v / radii[1]).powi(2);
                if closed {
                    q <= 1.0
                } else {
                    q < 1.0
                }
            }
            RegionKind::Polygon { vertices } => point_in_polygon(p[0], p[1], vertices),
            RegionKind::Points { points } => {
                let eps = crate::config::default_epsilon();
                points.iter().any(|q| {
                    q.iter().zip(p).all(|(a, b)| (a - b).abs() <= eps)
                })
            }
            RegionKind::Cmp(cmp) => cmp.contains(p)?,
        })
    }

    /// Axis-aligned bounding box in external coordinates
    ///
    /// Signals `Unbounded` (with the first offending axis) when no finite
    /// box exists: open interval ends, negated regions, and compound
    /// combinations whose result is unbounded.
    pub fn bounds(&self) -> Result<Vec<(f64, f64)>> {
        if self.negated {
            return Err(WcsError::Unbounded { axis: 1 });
        }
        let native = self.native_bounds()?;
        if self.map.kind_class() == "UnitMap" && !self.map.is_inverted() {
            return Ok(native);
        }
        map_bounds(&self.map, &native)
    }

    /// Bounding box in the native frame
    fn native_bounds(&self) -> Result<Vec<(f64, f64)>> {
        match &self.kind {
            RegionKind::Box { lbnd, ubnd } => {
                Ok(lbnd.iter().zip(ubnd).map(|(l, u)| (*l, *u)).collect())
            }
            RegionKind::Interval { lbnd, ubnd } => {
                let mut out = Vec::with_capacity(lbnd.len());
                for (axis, (lo, hi)) in lbnd.iter().zip(ubnd).enumerate() {
                    match (lo, hi) {
                        (Some(l), Some(u)) => out.push((*l, *u)),
                        _ => return Err(WcsError::Unbounded { axis: axis + 1 }),
                    }
                }
                Ok(out)
            }
            RegionKind::Circle { center, radius } => Ok(center
                .iter()
                .map(|c| (c - radius, c + radius))
                .collect()),
            RegionKind::Ellipse {
                center,
                radii,
                angle,
            } => {
                // Extent of a rotated ellipse along each axis
                let (sin, cos) = angle.sin_cos();
                let ex = ((radii[0] * cos).powi(2) + (radii[1] * sin).powi(2)).sqrt();
                let ey = ((radii[0] * sin).powi(2) + (radii[1] * cos).powi(2)).sqrt();
                Ok(vec![
                    (center[0] - ex, center[0] + ex),
                    (center[1] - ey, center[1] + ey),
                ])
            }
            RegionKind::Polygon { vertices } => {
                let mut xs = (f64::INFINITY, f64::NEG_INFINITY);
                let mut ys = (f64::INFINITY, f64::NEG_INFINITY);
                for v in vertices {
                    xs = (xs.0.min(v[0]), xs.1.max(v[0]));
                    ys = (ys.0.min(v[1]), ys.1.max(v[1]));
                }
                Ok(vec![xs, ys])
            }
            RegionKind::Points { points } => {
                if points.is_empty() {
                    return Ok(vec![(0.0, 0.0); self.naxes()]);
                }
                let mut out = vec![(f64::INFINITY, f64::NEG_INFINITY); self.naxes()];
                for p in points {
                    for (axis, v) in p.iter().enumerate() {
                        out[axis] = (out[axis].0.min(*v), out[axis].1.max(*v));
                    }
                }
                Ok(out)
            }
            RegionKind::Cmp(cmp) => cmp.bounds(),
        }
    }

    /// Structural equality ignoring identity attributes
    pub fn same_as(&self, other: &Region) -> bool {
        self.frame.same_as(&other.frame)
            && self.map.same_as(&other.map)
            && self.negated == other.negated
            && self.closed == other.closed
            && kinds_same(&self.kind, &other.kind)
    }
}

fn kinds_same(a: &RegionKind, b: &RegionKind) -> bool {
    match (a, b) {
        (RegionKind::Cmp(x), RegionKind::Cmp(y)) => {
            x.oper() == y.oper() && x.first().same_as(y.first()) && x.second().same_as(y.second())
        }
        _ => a == b,
    }
}

fn check_axes(frame: &Frame, found: usize, context: &str) -> Result<()> {
    if frame.naxes() != found {
        return Err(WcsError::DimensionMismatch {
            context: context.to_string(),
            expected: frame.naxes(),
            found,
        });
    }
    Ok(())
}

fn within(v: f64, lo: Option<f64>, hi: Option<f64>, closed: bool) -> bool {
    let above = match lo {
        Some(l) => {
            if closed {
                v >= l
            } else {
                v > l
            }
        }
        None => true,
    };
    let below = match hi {
        Some(u) => {
            if closed {
                v <= u
            } else {
                v < u
            }
        }
        None => true,
    };
    above && below
}

/// Even-odd ray casting
fn point_in_polygon(x: f64, y: f64, vertices: &[[f64; 2]]) -> bool {
    let n = vertices.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = (vertices[i][0], vertices[i][1]);
        let (xj, yj) = (vertices[j][0], vertices[j][1]);
        if ((yi > y) != (yj > y)) && (x < (xj - xi) * (y - yi) / (yj - yi) + xi) {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Push a native bounding box through a mapping by transforming its
/// corners; signals `Unbounded` when a corner leaves the mapping's domain
fn map_bounds(map: &Mapping, native: &[(f64, f64)]) -> Result<Vec<(f64, f64)>> {
    let n = native.len();
    if !map.has_forward() || n >= 24 {
        return Err(WcsError::Unbounded { axis: 1 });
    }
    let corners = 1usize << n;
    let mut out = vec![(f64::INFINITY, f64::NEG_INFINITY); map.nout()];
    let mut corner = vec![0.0; n];
    for mask in 0..corners {
        for (axis, item) in corner.iter_mut().enumerate() {
            *item = if mask & (1 << axis) != 0 {
                native[axis].1
            } else {
                native[axis].0
            };
        }
        let mapped = map.transform_point(&corner, true)?;
        for (axis, v) in mapped.iter().enumerate() {
            if is_bad(*v) {
                return Err(WcsError::Unbounded { axis: axis + 1 });
            }
            out[axis] = (out[axis].0.min(*v), out[axis].1.max(*v));
        }
    }
    Ok(out)
}

impl Object for Region {
    fn class_name(&self) -> &'static str {
        match &self.kind {
            RegionKind::Box { .. } => "Box",
            RegionKind::Interval { .. } => "Interval",
            RegionKind::Circle { .. } => "Circle",
            RegionKind::Ellipse { .. } => "Ellipse",
            RegionKind::Polygon { .. } => "Polygon",
            RegionKind::Points { .. } => "PointList",
            RegionKind::Cmp(_) => "CmpRegion",
        }
    }

    fn get_attr(&self, name: &str) -> Result<AttrValue> {
        match name {
            "Class" => Ok(AttrValue::Str(self.class_name().to_string())),
            "ID" => Ok(AttrValue::Str(self.id.clone().unwrap_or_default())),
            "Negated" => Ok(AttrValue::Bool(self.negated)),
            "Closed" => Ok(AttrValue::Bool(self.closed)),
            _ => self.frame.get_attr(name).map_err(|e| match e {
                WcsError::UnknownAttribute { name, .. } => {
                    WcsError::unknown_attr(self.class_name(), name)
                }
                other => other,
            }),
        }
    }

    fn set_attr(&mut self, name: &str, value: &str) -> Result<()> {
        match name {
            "ID" => {
                self.id = Some(value.to_string());
                Ok(())
            }
            "Negated" => {
                let v = AttrValue::parse(name, AttrKind::Bool, value)?;
                self.negated = v.as_bool().unwrap_or(false);
                Ok(())
            }
            "Closed" => {
                let v = AttrValue::parse(name, AttrKind::Bool, value)?;
                self.closed = v.as_bool().unwrap_or(true);
                Ok(())
            }
            "Class" => Err(WcsError::ReadOnlyAttribute {
                class: self.class_name().to_string(),
                name: name.to_string(),
            }),
            _ => {
                let class = self.class_name();
                self.frame.set_attr(name, value).map_err(|e| match e {
                    WcsError::UnknownAttribute { name, .. } => {
                        WcsError::unknown_attr(class, name)
                    }
                    other => other,
                })
            }
        }
    }

    fn attr_is_set(&self, name: &str) -> bool {
        match name {
            "ID" => self.id.is_some(),
            "Negated" => self.negated,
            "Closed" => !self.closed,
            _ => self.frame.attr_is_set(name),
        }
    }

    fn clear_attr(&mut self, name: &str) -> Result<()> {
        match name {
            "ID" => {
                self.id = None;
                Ok(())
            }
            "Negated" => {
                self.negated = false;
                Ok(())
            }
            "Closed" => {
                self.closed = true;
                Ok(())
            }
            _ => self.frame.clear_attr(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_containment_inclusive() {
        let r = Region::new_box(Frame::new(2), vec![0.0, 0.0], vec![2.0, 3.0]).unwrap();
        assert!(r.contains(&[1.0, 1.0]).unwrap());
        assert!(r.contains(&[0.0, 0.0]).unwrap());
        assert!(r.contains(&[2.0, 3.0]).unwrap());
        assert!(!r.contains(&[2.1, 1.0]).unwrap());
        assert!(!r.contains(&[1.0, -0.1]).unwrap());
    }

    #[test]
    fn test_open_box_excludes_boundary() {
        let mut r = Region::new_box(Frame::new(1), vec![0.0], vec![1.0]).unwrap();
        r.set_attr("Closed", "0").unwrap();
        assert!(!r.contains(&[0.0]).unwrap());
        assert!(r.contains(&[0.5]).unwrap());
    }

    #[test]
    fn test_box_bounds() {
        let r = Region::new_box(Frame::new(2), vec![0.0, -1.0], vec![2.0, 1.0]).unwrap();
        assert_eq!(r.bounds().unwrap(), vec![(0.0, 2.0), (-1.0, 1.0)]);
    }

    #[test]
    fn test_box_rejects_inverted_bounds() {
        let err = Region::new_box(Frame::new(1), vec![2.0], vec![1.0]).unwrap_err();
        assert!(matches!(err, WcsError::InvalidAttributeValue { .. }));
    }

    #[test]
    fn test_interval_half_open_is_unbounded() {
        let r = Region::new_interval(Frame::new(1), vec![Some(0.0)], vec![None]).unwrap();
        assert!(r.contains(&[1e12]).unwrap());
        assert!(!r.contains(&[-0.5]).unwrap());
        let err = r.bounds().unwrap_err();
        assert!(matches!(err, WcsError::Unbounded { axis: 1 }));
        assert!(err.is_signal());
    }

    #[test]
    fn test_circle_containment_and_bounds() {
        let r = Region::new_circle(Frame::new(2), vec![1.0, 1.0], 2.0).unwrap();
        assert!(r.contains(&[1.0, 1.0]).unwrap());
        assert!(r.contains(&[3.0, 1.0]).unwrap());
        assert!(!r.contains(&[3.5, 1.0]).unwrap());
        assert_eq!(r.bounds().unwrap(), vec![(-1.0, 3.0), (-1.0, 3.0)]);
    }

    #[test]
    fn test_ellipse_containment() {
        // axis-aligned: semi-axes 2 along x, 1 along y
        let r = Region::new_ellipse(Frame::new(2), [0.0, 0.0], [2.0, 1.0], 0.0).unwrap();
        assert!(r.contains(&[1.9, 0.0]).unwrap());
        assert!(!r.contains(&[0.0, 1.5]).unwrap());

        // rotate by 90 degrees: long axis now along y
        let r = Region::new_ellipse(
            Frame::new(2),
            [0.0, 0.0],
            [2.0, 1.0],
            std::f64::consts::FRAC_PI_2,
        )
        .unwrap();
        assert!(r.contains(&[0.0, 1.5]).unwrap());
        assert!(!r.contains(&[1.5, 0.0]).unwrap());
    }

    #[test]
    fn test_polygon_containment() {
        let r = Region::new_polygon(
            Frame::new(2),
            vec![[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0]],
        )
        .unwrap();
        assert!(r.contains(&[2.0, 2.0]).unwrap());
        assert!(!r.contains(&[5.0, 2.0]).unwrap());
        assert_eq!(r.bounds().unwrap(), vec![(0.0, 4.0), (0.0, 4.0)]);
    }

    #[test]
    fn test_point_list_containment() {
        let r = Region::new_points(Frame::new(2), vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert!(r.contains(&[1.0, 2.0]).unwrap());
        assert!(!r.contains(&[1.0, 2.1]).unwrap());
    }

    #[test]
    fn test_negated_region() {
        let mut r = Region::new_box(Frame::new(1), vec![0.0], vec![1.0]).unwrap();
        r.negate();
        assert!(!r.contains(&[0.5]).unwrap());
        assert!(r.contains(&[2.0]).unwrap());
        assert!(matches!(r.bounds(), Err(WcsError::Unbounded { .. })));
    }

    #[test]
    fn test_remapped_region_pulls_queries_back() {
        // Box [0,1]² carried through a zoom by 10: external queries are in
        // the zoomed space
        let mut r = Region::new_box(Frame::new(2), vec![0.0, 0.0], vec![1.0, 1.0]).unwrap();
        r.remap(&Mapping::zoom(2, 10.0)).unwrap();
        assert!(r.contains(&[5.0, 5.0]).unwrap());
        assert!(!r.contains(&[15.0, 5.0]).unwrap());
        assert_eq!(r.bounds().unwrap(), vec![(0.0, 10.0), (0.0, 10.0)]);
    }

    #[test]
    fn test_contains_without_needed_inverse() {
        let mut r = Region::new_box(Frame::new(1), vec![0.0], vec![1.0]).unwrap();
        let one_way = Mapping::polynomial(
            1,
            1,
            vec![vec![crate::mapping::PolyTerm::new(1.0, vec![3])]],
            None,
        )
        .unwrap();
        r.remap(&one_way).unwrap();
        let err = r.contains(&[0.5]).unwrap_err();
        assert!(matches!(err, WcsError::PointOutOfDomain { .. }));
    }

    #[test]
    fn test_contains_dimension_check() {
        let r = Region::new_box(Frame::new(2), vec![0.0, 0.0], vec![1.0, 1.0]).unwrap();
        assert!(matches!(
            r.contains(&[0.5]),
            Err(WcsError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_region_attributes_delegate_to_frame() {
        let mut r = Region::new_box(Frame::new(2), vec![0.0, 0.0], vec![1.0, 1.0]).unwrap();
        r.set_attr("Label(1)", "RA").unwrap();
        assert_eq!(r.get_attr("Label(1)").unwrap().as_str(), Some("RA"));
        assert_eq!(r.get_attr("Class").unwrap().as_str(), Some("Box"));
        assert_eq!(r.get_attr("Negated").unwrap(), AttrValue::Bool(false));
    }

    #[test]
    fn test_contains_is_deterministic() {
        let r = Region::new_circle(Frame::new(2), vec![0.0, 0.0], 1.0).unwrap();
        let first = r.contains(&[0.3, 0.4]).unwrap();
        for _ in 0..10 {
            assert_eq!(r.contains(&[0.3, 0.4]).unwrap(), first);
        }
    }
}
