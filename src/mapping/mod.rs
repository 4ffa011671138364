//! Mapping algebra: composable coordinate transforms
//!
//! A [`Mapping`] converts points between two fixed-dimensional coordinate
//! spaces. Concrete kinds cover the common WCS building blocks:
//!
//! | Kind | Transform | Inverse |
//! |------|-----------|---------|
//! | [`UnitMap`](linear::UnitMap) | identity | always |
//! | [`ShiftMap`](linear::ShiftMap) | per-axis offset | always |
//! | [`ZoomMap`](linear::ZoomMap) | uniform scale | factor ≠ 0 |
//! | [`AffineMap`](linear::AffineMap) | `A·x + b` | square, non-singular |
//! | [`PermMap`](perm::PermMap) | axis permutation | always |
//! | [`PolyMap`](poly::PolyMap) | polynomial | explicit coefficients only |
//! | [`ProjMap`](proj::ProjMap) | spherical projection | per projection |
//! | [`LutMap`](lut::LutMap) | 1-D lookup table | monotone tables |
//! | [`SwitchMap`](switch::SwitchMap) | piecewise routing | per selector |
//! | [`CmpMap`](compound::CmpMap) | series/parallel pair | both children |
//!
//! Inversion is an O(1) state flip ([`Mapping::invert`]); the `NoInverse`
//! failure surfaces at transform time when the requested direction has no
//! definition. Points carrying the [`BAD`] sentinel on any input axis
//! propagate to all-`BAD` outputs without touching the numerics, so
//! missing coordinates survive projective and iterative kinds without
//! turning into NaNs.

pub mod compound;
pub mod linear;
pub mod lut;
pub mod perm;
pub mod poly;
pub mod proj;
pub mod simplify;
pub mod switch;

use serde::{Deserialize, Serialize};

use crate::error::WcsError;
use crate::object::{AttrKind, AttrValue, Object};
use crate::Result;

pub use compound::CmpMap;
pub use linear::{AffineMap, ShiftMap, UnitMap, ZoomMap};
pub use lut::LutMap;
pub use perm::PermMap;
pub use poly::{PolyMap, PolyTerm};
pub use proj::{ProjKind, ProjMap};
pub use simplify::RuleTable;
pub use switch::SwitchMap;

/// Sentinel marking an undefined coordinate value
///
/// Propagates through every transform without numeric evaluation: a point
/// with any `BAD` input coordinate yields all-`BAD` outputs.
pub const BAD: f64 = -f64::MAX;

/// True if a coordinate is the bad-value sentinel
#[inline]
pub fn is_bad(v: f64) -> bool {
    v == BAD
}

/// An ordered batch of N-dimensional points, stored axis-major
///
/// Axis `a` of point `p` lives at `values[a * npoint + p]`, which keeps
/// each axis contiguous for per-axis passes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointSet {
    naxes: usize,
    npoint: usize,
    values: Vec<f64>,
}

impl PointSet {
    /// Create a point set filled with the bad value
    pub fn new(naxes: usize, npoint: usize) -> Self {
        Self {
            naxes,
            npoint,
            values: vec![BAD; naxes * npoint],
        }
    }

    /// Build from per-axis coordinate slices; all axes must agree in length
    pub fn from_axes(axes: &[Vec<f64>]) -> Result<Self> {
        let naxes = axes.len();
        let npoint = axes.first().map(|a| a.len()).unwrap_or(0);
        for (i, axis) in axes.iter().enumerate() {
            if axis.len() != npoint {
                return Err(WcsError::DimensionMismatch {
                    context: format!("point set axis {}", i + 1),
                    expected: npoint,
                    found: axis.len(),
                });
            }
        }
        let mut values = Vec::with_capacity(naxes * npoint);
        for axis in axes {
            values.extend_from_slice(axis);
        }
        Ok(Self {
            naxes,
            npoint,
            values,
        })
    }

    /// Build a single-point set
    pub fn single(point: &[f64]) -> Self {
        Self {
            naxes: point.len(),
            npoint: 1,
            values: point.to_vec(),
        }
    }

    /// Number of axes per point
    pub fn naxes(&self) -> usize {
        self.naxes
    }

    /// Number of points
    pub fn npoint(&self) -> usize {
        self.npoint
    }

    /// Coordinates along one axis (0-based axis index)
    pub fn axis(&self, axis: usize) -> &[f64] {
        &self.values[axis * self.npoint..(axis + 1) * self.npoint]
    }

    /// Gather one point into a buffer
    pub fn read_point(&self, p: usize, buf: &mut [f64]) {
        for a in 0..self.naxes {
            buf[a] = self.values[a * self.npoint + p];
        }
    }

    /// Scatter one point from a buffer
    pub fn write_point(&mut self, p: usize, buf: &[f64]) {
        for a in 0..self.naxes {
            self.values[a * self.npoint + p] = buf[a];
        }
    }

    /// One point as an owned vector
    pub fn point(&self, p: usize) -> Vec<f64> {
        let mut buf = vec![0.0; self.naxes];
        self.read_point(p, &mut buf);
        buf
    }
}

/// The concrete transform behind a [`Mapping`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MapCore {
    Unit(UnitMap),
    Shift(ShiftMap),
    Zoom(ZoomMap),
    Affine(AffineMap),
    Perm(PermMap),
    Poly(PolyMap),
    Proj(ProjMap),
    Lut(LutMap),
    Switch(SwitchMap),
    Cmp(Box<CmpMap>),
}

macro_rules! core_dispatch {
    ($core:expr, $inner:ident => $body:expr) => {
        match $core {
            MapCore::Unit($inner) => $body,
            MapCore::Shift($inner) => $body,
            MapCore::Zoom($inner) => $body,
            MapCore::Affine($inner) => $body,
            MapCore::Perm($inner) => $body,
            MapCore::Poly($inner) => $body,
            MapCore::Proj($inner) => $body,
            MapCore::Lut($inner) => $body,
            MapCore::Switch($inner) => $body,
            MapCore::Cmp($inner) => $body,
        }
    };
}

impl MapCore {
    pub(crate) fn nin(&self) -> usize {
        core_dispatch!(self, m => m.nin())
    }

    pub(crate) fn nout(&self) -> usize {
        core_dispatch!(self, m => m.nout())
    }

    pub(crate) fn has_forward(&self) -> bool {
        core_dispatch!(self, m => m.has_forward())
    }

    pub(crate) fn has_inverse(&self) -> bool {
        core_dispatch!(self, m => m.has_inverse())
    }

    pub(crate) fn is_linear(&self) -> bool {
        core_dispatch!(self, m => m.is_linear())
    }

    pub(crate) fn is_diagonal(&self) -> bool {
        core_dispatch!(self, m => m.is_diagonal())
    }

    pub(crate) fn class_name(&self) -> &'static str {
        core_dispatch!(self, m => m.class_name())
    }

    /// Apply to one point in the given direction; `input`/`output` are
    /// sized by the caller to the core's own nin/nout for that direction.
    pub(crate) fn tran(&self, input: &[f64], output: &mut [f64], forward: bool) -> Result<()> {
        core_dispatch!(self, m => m.tran(input, output, forward))
    }

    /// Structural equality within a float tolerance
    pub(crate) fn eq_with(&self, other: &MapCore, eps: f64) -> bool {
        match (self, other) {
            (MapCore::Unit(a), MapCore::Unit(b)) => a.eq_with(b, eps),
            (MapCore::Shift(a), MapCore::Shift(b)) => a.eq_with(b, eps),
            (MapCore::Zoom(a), MapCore::Zoom(b)) => a.eq_with(b, eps),
            (MapCore::Affine(a), MapCore::Affine(b)) => a.eq_with(b, eps),
            (MapCore::Perm(a), MapCore::Perm(b)) => a.eq_with(b, eps),
            (MapCore::Poly(a), MapCore::Poly(b)) => a.eq_with(b, eps),
            (MapCore::Proj(a), MapCore::Proj(b)) => a.eq_with(b, eps),
            (MapCore::Lut(a), MapCore::Lut(b)) => a.eq_with(b, eps),
            (MapCore::Switch(a), MapCore::Switch(b)) => a.eq_with(b, eps),
            (MapCore::Cmp(a), MapCore::Cmp(b)) => a.eq_with(b, eps),
            _ => false,
        }
    }
}

/// A transform between two fixed-dimensional coordinate spaces
///
/// A `Mapping` is a concrete kind plus an inversion state. Inverting is
/// O(1) and total; whether a direction can actually be *applied* is
/// reported by [`Mapping::has_forward`]/[`Mapping::has_inverse`] and
/// enforced at transform time.
///
/// # Example
///
/// ```
/// use ferro_wcs::mapping::{Mapping, PointSet};
///
/// let zoom = Mapping::zoom(2, 2.0);
/// let out = zoom.transform_point(&[1.0, 3.0], true).unwrap();
/// assert_eq!(out, vec![2.0, 6.0]);
///
/// let back = zoom.invert().transform_point(&out, true).unwrap();
/// assert_eq!(back, vec![1.0, 3.0]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mapping {
    pub(crate) core: MapCore,
    pub(crate) inverted: bool,
    pub(crate) id: Option<String>,
}

impl Mapping {
    pub(crate) fn from_core(core: MapCore) -> Self {
        Self {
            core,
            inverted: false,
            id: None,
        }
    }

    /// Identity mapping over `naxes` axes
    pub fn unit(naxes: usize) -> Self {
        Self::from_core(MapCore::Unit(UnitMap::new(naxes)))
    }

    /// Per-axis additive offsets
    pub fn shift(shifts: Vec<f64>) -> Self {
        Self::from_core(MapCore::Shift(ShiftMap::new(shifts)))
    }

    /// Uniform scale over `naxes` axes
    pub fn zoom(naxes: usize, factor: f64) -> Self {
        Self::from_core(MapCore::Zoom(ZoomMap::new(naxes, factor)))
    }

    /// General affine transform `out = matrix · in + offset`
    ///
    /// `matrix` is row-major with `nout × nin` elements; `offset` has
    /// `nout` elements. Fails with `DimensionMismatch` on length errors.
    pub fn affine(
        nin: usize,
        nout: usize,
        matrix: Vec<f64>,
        offset: Vec<f64>,
    ) -> Result<Self> {
        Ok(Self::from_core(MapCore::Affine(AffineMap::new(
            nin, nout, matrix, offset,
        )?)))
    }

    /// Axis permutation: output axis `i` takes input axis `perm[i]`
    /// (0-based). Fails unless `perm` is a permutation of `0..n`.
    pub fn perm(perm: Vec<usize>) -> Result<Self> {
        Ok(Self::from_core(MapCore::Perm(PermMap::new(perm)?)))
    }

    /// Polynomial transform with optional explicit inverse coefficients
    pub fn polynomial(
        nin: usize,
        nout: usize,
        forward: Vec<Vec<PolyTerm>>,
        inverse: Option<Vec<Vec<PolyTerm>>>,
    ) -> Result<Self> {
        Ok(Self::from_core(MapCore::Poly(PolyMap::new(
            nin, nout, forward, inverse,
        )?)))
    }

    /// 2-D spherical projection
    pub fn projection(kind: ProjKind) -> Self {
        Self::from_core(MapCore::Proj(ProjMap::new(kind)))
    }

    /// 1-D lookup table mapping `start + i·inc` to `table[i]`, with
    /// linear interpolation between entries
    pub fn lut(table: Vec<f64>, start: f64, inc: f64) -> Result<Self> {
        Ok(Self::from_core(MapCore::Lut(LutMap::new(table, start, inc)?)))
    }

    /// Piecewise mapping: the selector picks one route per point
    pub fn switch(
        fwd_selector: Option<Mapping>,
        inv_selector: Option<Mapping>,
        routes: Vec<Mapping>,
    ) -> Result<Self> {
        Ok(Self::from_core(MapCore::Switch(SwitchMap::new(
            fwd_selector,
            inv_selector,
            routes,
        )?)))
    }

    /// Series composition: `second` applied after `first`
    ///
    /// Fails with `DimensionMismatch` unless `first.nout() == second.nin()`.
    pub fn series(first: &Mapping, second: &Mapping) -> Result<Self> {
        Ok(Self::from_core(MapCore::Cmp(Box::new(CmpMap::series(
            first.clone(),
            second.clone(),
        )?))))
    }

    /// Parallel composition: axes of `a` followed by axes of `b`
    pub fn parallel(a: &Mapping, b: &Mapping) -> Self {
        Self::from_core(MapCore::Cmp(Box::new(CmpMap::parallel(
            a.clone(),
            b.clone(),
        ))))
    }

    /// Number of input axes (accounting for inversion state)
    pub fn nin(&self) -> usize {
        if self.inverted {
            self.core.nout()
        } else {
            self.core.nin()
        }
    }

    /// Number of output axes (accounting for inversion state)
    pub fn nout(&self) -> usize {
        if self.inverted {
            self.core.nin()
        } else {
            self.core.nout()
        }
    }

    /// True if the forward transform is defined
    pub fn has_forward(&self) -> bool {
        if self.inverted {
            self.core.has_inverse()
        } else {
            self.core.has_forward()
        }
    }

    /// True if the inverse transform is defined
    pub fn has_inverse(&self) -> bool {
        if self.inverted {
            self.core.has_forward()
        } else {
            self.core.has_inverse()
        }
    }

    /// True if the mapping is linear (affine) in its inputs
    pub fn is_linear(&self) -> bool {
        self.core.is_linear()
    }

    /// True if each output axis depends on the matching input axis only
    pub fn is_diagonal(&self) -> bool {
        self.core.is_diagonal()
    }

    /// Current inversion state
    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    /// Class name of the concrete kind
    pub fn kind_class(&self) -> &'static str {
        self.core.class_name()
    }

    /// A new mapping with forward and inverse swapped (O(1))
    pub fn invert(&self) -> Mapping {
        Mapping {
            core: self.core.clone(),
            inverted: !self.inverted,
            id: self.id.clone(),
        }
    }

    /// Transform a batch of points
    ///
    /// Fails with `DimensionMismatch` if the point set's axis count does
    /// not match the mapping's input side for the requested direction, and
    /// with `NoInverse` if that direction has no definition. Points with
    /// any `BAD` coordinate map to all-`BAD` outputs.
    pub fn transform(&self, points: &PointSet, forward: bool) -> Result<PointSet> {
        let (nin, nout) = if forward {
            (self.nin(), self.nout())
        } else {
            (self.nout(), self.nin())
        };
        if points.naxes() != nin {
            return Err(WcsError::DimensionMismatch {
                context: "transform input".to_string(),
                expected: nin,
                found: points.naxes(),
            });
        }
        let available = if forward {
            self.has_forward()
        } else {
            self.has_inverse()
        };
        if !available {
            return Err(WcsError::NoInverse {
                class: self.kind_class().to_string(),
                direction: if forward { "forward" } else { "inverse" },
            });
        }

        // Direction seen by the core once the inversion flag is folded in.
        let core_forward = forward != self.inverted;
        let mut out = PointSet::new(nout, points.npoint());
        let mut in_buf = vec![0.0; nin];
        let mut out_buf = vec![0.0; nout];
        for p in 0..points.npoint() {
            points.read_point(p, &mut in_buf);
            if in_buf.iter().any(|v| is_bad(*v)) {
                out_buf.fill(BAD);
            } else {
                self.core.tran(&in_buf, &mut out_buf, core_forward)?;
            }
            out.write_point(p, &out_buf);
        }
        Ok(out)
    }

    /// Transform a single point; convenience over [`Mapping::transform`]
    pub fn transform_point(&self, point: &[f64], forward: bool) -> Result<Vec<f64>> {
        let out = self.transform(&PointSet::single(point), forward)?;
        Ok(out.point(0))
    }

    /// Structural equality within the configured default tolerance,
    /// ignoring identity attributes such as `ID`
    pub fn same_as(&self, other: &Mapping) -> bool {
        self.same_as_with(other, crate::config::default_epsilon())
    }

    /// Structural equality within an explicit float tolerance
    pub fn same_as_with(&self, other: &Mapping, eps: f64) -> bool {
        self.inverted == other.inverted && self.core.eq_with(&other.core, eps)
    }

    /// True when `other` undoes this mapping exactly: same core with the
    /// opposite inversion state
    pub fn is_inverse_of(&self, other: &Mapping, eps: f64) -> bool {
        self.inverted != other.inverted && self.core.eq_with(&other.core, eps)
    }
}

impl Object for Mapping {
    fn class_name(&self) -> &'static str {
        self.core.class_name()
    }

    fn get_attr(&self, name: &str) -> Result<AttrValue> {
        match name {
            "Class" => Ok(AttrValue::Str(self.class_name().to_string())),
            "ID" => Ok(AttrValue::Str(self.id.clone().unwrap_or_default())),
            "Nin" => Ok(AttrValue::Int(self.nin() as i64)),
            "Nout" => Ok(AttrValue::Int(self.nout() as i64)),
            "Invert" => Ok(AttrValue::Bool(self.inverted)),
            "TranForward" => Ok(AttrValue::Bool(self.has_forward())),
            "TranInverse" => Ok(AttrValue::Bool(self.has_inverse())),
            _ => Err(WcsError::unknown_attr(self.class_name(), name)),
        }
    }

    fn set_attr(&mut self, name: &str, value: &str) -> Result<()> {
        match name {
            "ID" => {
                self.id = Some(value.to_string());
                Ok(())
            }
            "Invert" => {
                let v = AttrValue::parse(name, AttrKind::Bool, value)?;
                self.inverted = v.as_bool().unwrap_or(false);
                Ok(())
            }
            "Class" | "Nin" | "Nout" | "TranForward" | "TranInverse" => {
                Err(WcsError::ReadOnlyAttribute {
                    class: self.class_name().to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(WcsError::unknown_attr(self.class_name(), name)),
        }
    }

    fn attr_is_set(&self, name: &str) -> bool {
        match name {
            "ID" => self.id.is_some(),
            "Invert" => self.inverted,
            _ => false,
        }
    }

    fn clear_attr(&mut self, name: &str) -> Result<()> {
        match name {
            "ID" => {
                self.id = None;
                Ok(())
            }
            "Invert" => {
                self.inverted = false;
                Ok(())
            }
            _ => Err(WcsError::unknown_attr(self.class_name(), name)),
        }
    }
}
