//! Spherical projection mappings
//!
//! Forward direction takes celestial coordinates `(lon, lat)` in radians
//! to native plane coordinates `(x, y)`; inverse goes back. Points outside
//! a projection's domain (e.g. the far hemisphere of an orthographic
//! projection) come out as the bad value rather than NaN.

use serde::{Deserialize, Serialize};

use crate::mapping::BAD;
use crate::Result;

/// Supported projection geometries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjKind {
    /// Gnomonic (tangent-plane): `r = cot(lat)`
    Gnomonic,
    /// Orthographic: `r = cos(lat)`, front hemisphere only
    Orthographic,
    /// Plate carrée: `x = lon`, `y = lat`
    PlateCarree,
}

impl ProjKind {
    /// Short code used by the channel encodings
    pub fn code(&self) -> &'static str {
        match self {
            ProjKind::Gnomonic => "TAN",
            ProjKind::Orthographic => "SIN",
            ProjKind::PlateCarree => "CAR",
        }
    }

    /// Parse a short projection code
    pub fn from_code(code: &str) -> Option<ProjKind> {
        match code {
            "TAN" => Some(ProjKind::Gnomonic),
            "SIN" => Some(ProjKind::Orthographic),
            "CAR" => Some(ProjKind::PlateCarree),
            _ => None,
        }
    }
}

/// 2-D spherical projection about the native pole
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjMap {
    kind: ProjKind,
}

impl ProjMap {
    pub fn new(kind: ProjKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> ProjKind {
        self.kind
    }

    pub fn nin(&self) -> usize {
        2
    }

    pub fn nout(&self) -> usize {
        2
    }

    pub fn has_forward(&self) -> bool {
        true
    }

    pub fn has_inverse(&self) -> bool {
        true
    }

    pub fn is_linear(&self) -> bool {
        matches!(self.kind, ProjKind::PlateCarree)
    }

    pub fn is_diagonal(&self) -> bool {
        matches!(self.kind, ProjKind::PlateCarree)
    }

    pub fn class_name(&self) -> &'static str {
        "ProjMap"
    }

    pub fn tran(&self, input: &[f64], output: &mut [f64], forward: bool) -> Result<()> {
        let (a, b) = (input[0], input[1]);
        let (x, y) = if forward {
            self.forward(a, b)
        } else {
            self.inverse(a, b)
        };
        output[0] = x;
        output[1] = y;
        Ok(())
    }

    /// `(lon, lat)` → `(x, y)`; out-of-domain points become `BAD`
    fn forward(&self, lon: f64, lat: f64) -> (f64, f64) {
        match self.kind {
            ProjKind::Gnomonic => {
                if lat <= 0.0 {
                    return (BAD, BAD);
                }
                let r = lat.cos() / lat.sin();
                (r * lon.sin(), -r * lon.cos())
            }
            ProjKind::Orthographic => {
                if lat < 0.0 {
                    return (BAD, BAD);
                }
                let r = lat.cos();
                (r * lon.sin(), -r * lon.cos())
            }
            ProjKind::PlateCarree => (lon, lat),
        }
    }

    /// `(x, y)` → `(lon, lat)`; points off the projected sphere become `BAD`
    fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        match self.kind {
            ProjKind::Gnomonic => {
                let r = x.hypot(y);
                let lat = if r == 0.0 {
                    std::f64::consts::FRAC_PI_2
                } else {
                    (1.0 / r).atan()
                };
                let lon = if r == 0.0 { 0.0 } else { x.atan2(-y) };
                (lon, lat)
            }
            ProjKind::Orthographic => {
                let r = x.hypot(y);
                if r > 1.0 {
                    return (BAD, BAD);
                }
                let lat = r.min(1.0).acos();
                let lon = if r == 0.0 { 0.0 } else { x.atan2(-y) };
                (lon, lat)
            }
            ProjKind::PlateCarree => (x, y),
        }
    }

    pub fn eq_with(&self, other: &ProjMap, _eps: f64) -> bool {
        self.kind == other.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    fn round_trip(kind: ProjKind, lon: f64, lat: f64) {
        let m = ProjMap::new(kind);
        let mut plane = [0.0; 2];
        m.tran(&[lon, lat], &mut plane, true).unwrap();
        assert_ne!(plane[0], BAD);
        let mut back = [0.0; 2];
        m.tran(&plane, &mut back, false).unwrap();
        assert!((back[0] - lon).abs() < 1e-10, "lon {} vs {}", back[0], lon);
        assert!((back[1] - lat).abs() < 1e-10, "lat {} vs {}", back[1], lat);
    }

    #[test]
    fn test_gnomonic_round_trip() {
        round_trip(ProjKind::Gnomonic, 0.3, FRAC_PI_4);
        round_trip(ProjKind::Gnomonic, -1.2, 1.1);
    }

    #[test]
    fn test_orthographic_round_trip() {
        round_trip(ProjKind::Orthographic, 0.5, FRAC_PI_4);
        round_trip(ProjKind::Orthographic, -2.0, 1.0);
    }

    #[test]
    fn test_plate_carree_is_identity() {
        let m = ProjMap::new(ProjKind::PlateCarree);
        let mut out = [0.0; 2];
        m.tran(&[0.7, -0.3], &mut out, true).unwrap();
        assert_eq!(out, [0.7, -0.3]);
    }

    #[test]
    fn test_gnomonic_pole() {
        let m = ProjMap::new(ProjKind::Gnomonic);
        let mut out = [0.0; 2];
        m.tran(&[0.0, FRAC_PI_2], &mut out, true).unwrap();
        assert!(out[0].abs() < 1e-15);
        assert!(out[1].abs() < 1e-15);
    }

    #[test]
    fn test_gnomonic_equator_is_out_of_domain() {
        let m = ProjMap::new(ProjKind::Gnomonic);
        let mut out = [0.0; 2];
        m.tran(&[0.0, 0.0], &mut out, true).unwrap();
        assert_eq!(out, [BAD, BAD]);
    }

    #[test]
    fn test_orthographic_outside_unit_disc() {
        let m = ProjMap::new(ProjKind::Orthographic);
        let mut out = [0.0; 2];
        m.tran(&[1.5, 0.0], &mut out, false).unwrap();
        assert_eq!(out, [BAD, BAD]);
    }

    #[test]
    fn test_proj_codes() {
        assert_eq!(ProjKind::Gnomonic.code(), "TAN");
        assert_eq!(ProjKind::from_code("SIN"), Some(ProjKind::Orthographic));
        assert_eq!(ProjKind::from_code("BOGUS"), None);
    }
}
