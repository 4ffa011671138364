//! Type registry for channel reconstruction
//!
//! A process-wide table mapping class tags to reader functions, built once
//! on first use and immutable afterwards. Writers consult it to reject
//! unregistered kinds (`UnsupportedType`); readers consult it to turn a
//! class tag into a reconstructor, reporting unknown tags as
//! `MalformedInput`.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::channel::codec::{self, ReadCtx};
use crate::channel::doc::Document;
use crate::object::WcsObject;
use crate::Result;

/// Reconstructor for one class
pub type ReaderFn = fn(&Document, &mut ReadCtx) -> Result<WcsObject>;

static REGISTRY: Lazy<HashMap<&'static str, ReaderFn>> = Lazy::new(|| {
    let mut table: HashMap<&'static str, ReaderFn> = HashMap::new();
    table.insert("UnitMap", codec::read_unit_map);
    table.insert("ShiftMap", codec::read_shift_map);
    table.insert("ZoomMap", codec::read_zoom_map);
    table.insert("AffineMap", codec::read_affine_map);
    table.insert("PermMap", codec::read_perm_map);
    table.insert("PolyMap", codec::read_poly_map);
    table.insert("ProjMap", codec::read_proj_map);
    table.insert("LutMap", codec::read_lut_map);
    table.insert("SwitchMap", codec::read_switch_map);
    table.insert("CmpMap", codec::read_cmp_map);
    table.insert("Frame", codec::read_frame);
    table.insert("FrameSet", codec::read_frameset);
    table.insert("Box", codec::read_region);
    table.insert("Interval", codec::read_region);
    table.insert("Circle", codec::read_region);
    table.insert("Ellipse", codec::read_region);
    table.insert("Polygon", codec::read_region);
    table.insert("PointList", codec::read_region);
    table.insert("CmpRegion", codec::read_region);
    table
});

/// Reader for a class tag, if one is registered
pub fn reader_for(class: &str) -> Option<ReaderFn> {
    REGISTRY.get(class).copied()
}

/// True when the class has a registered serializer
pub fn is_registered(class: &str) -> bool {
    REGISTRY.contains_key(class)
}

/// All registered class names, sorted; useful for diagnostics
pub fn registered_classes() -> Vec<&'static str> {
    let mut names: Vec<_> = REGISTRY.keys().copied().collect();
    names.sort_unstable();
    names
}
