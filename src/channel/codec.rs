//! Object ↔ document conversion
//!
//! Writers walk an object graph depth-first, emitting a [`Document`] per
//! object. A sub-object structurally equal to one already emitted in the
//! same top-level write is replaced by a cross-reference; the registration
//! order is post-order (descendants before their parent) on both the write
//! and read sides, so reference indices line up without a fixup pass.
//!
//! Readers reconstruct the concrete type named by the class tag; unknown
//! tags, missing required attributes and dangling references are
//! `MalformedInput`. A failed read returns the error alone: no partially
//! built object escapes.

use crate::channel::doc::{Document, Item};
use crate::channel::registry;
use crate::error::WcsError;
use crate::frame::frameset::Edge;
use crate::frame::{Frame, FrameSet, System};
use crate::mapping::{
    AffineMap, LutMap, MapCore, Mapping, PermMap, PolyMap, PolyTerm, ProjKind, ProjMap, ShiftMap,
    SwitchMap, UnitMap, ZoomMap,
};
use crate::object::{format_float, AttrValue, Object, WcsObject};
use crate::region::{CmpRegion, Region, RegionKind, RegionOper};
use crate::Result;

/// Tracks emitted sub-objects during one top-level write
pub(crate) struct WriteCtx {
    seen: Vec<WcsObject>,
}

impl WriteCtx {
    pub(crate) fn new() -> Self {
        Self { seen: Vec::new() }
    }

    /// Emit a sub-object: a cross-reference when an equal object already
    /// went out, otherwise an inline child document
    fn push_object(&mut self, parent: &mut Document, name: &str, obj: WcsObject) {
        if let Some(pos) = self.seen.iter().position(|o| o.same_as(&obj)) {
            parent.push_ref(name, pos + 1);
            return;
        }
        let doc = to_doc(&obj, self);
        self.seen.push(obj);
        parent.push_child(name, doc);
    }
}

/// Tracks reconstructed sub-objects during one top-level read
pub(crate) struct ReadCtx {
    seen: Vec<WcsObject>,
}

impl ReadCtx {
    pub(crate) fn new() -> Self {
        Self { seen: Vec::new() }
    }

    fn resolve(&mut self, item: &Item) -> Result<WcsObject> {
        match item {
            Item::Child { doc, .. } => {
                let obj = from_doc(doc, self)?;
                self.seen.push(obj.clone());
                Ok(obj)
            }
            Item::Ref { name, index } => self
                .seen
                .get(index.wrapping_sub(1))
                .cloned()
                .ok_or_else(|| {
                    WcsError::malformed(0, format!("unresolved reference @{index} for `{name}`"))
                }),
            Item::Attr { name, .. } => Err(WcsError::malformed(
                0,
                format!("`{name}` is an attribute, expected an object"),
            )),
        }
    }
}

/// Serialize one object (and transitively everything it owns)
pub(crate) fn to_doc(obj: &WcsObject, ctx: &mut WriteCtx) -> Document {
    match obj {
        WcsObject::Mapping(m) => mapping_to_doc(m, ctx),
        WcsObject::Frame(f) => frame_to_doc(f),
        WcsObject::FrameSet(fs) => frameset_to_doc(fs, ctx),
        WcsObject::Region(r) => region_to_doc(r, ctx),
    }
}

/// Reconstruct one object from its document
pub(crate) fn from_doc(doc: &Document, ctx: &mut ReadCtx) -> Result<WcsObject> {
    match registry::reader_for(&doc.class) {
        Some(reader) => reader(doc, ctx),
        None => Err(WcsError::malformed(
            doc.line,
            format!("unknown class tag `{}`", doc.class),
        )),
    }
}

// ---------------------------------------------------------------------------
// Mapping
// ---------------------------------------------------------------------------

fn mapping_to_doc(m: &Mapping, ctx: &mut WriteCtx) -> Document {
    let mut doc = Document::new(m.kind_class());
    match &m.core {
        MapCore::Unit(u) => {
            doc.push_attr("Naxes", u.nin() as i64);
        }
        MapCore::Shift(s) => {
            doc.push_attr("Naxes", s.nin() as i64);
            for (i, v) in s.shifts().iter().enumerate() {
                doc.push_attr(format!("Shift{}", i + 1), *v);
            }
        }
        MapCore::Zoom(z) => {
            doc.push_attr("Naxes", z.nin() as i64);
            doc.push_attr("Zoom", z.factor());
        }
        MapCore::Affine(a) => {
            doc.push_attr("Nin", a.nin() as i64);
            doc.push_attr("Nout", a.nout() as i64);
            for (k, v) in a.matrix().iter().enumerate() {
                doc.push_attr(format!("Mat{}", k + 1), *v);
            }
            for (r, v) in a.offset().iter().enumerate() {
                doc.push_attr(format!("Off{}", r + 1), *v);
            }
        }
        MapCore::Perm(p) => {
            doc.push_attr("Naxes", p.nin() as i64);
            for (i, src) in p.perm().iter().enumerate() {
                doc.push_attr(format!("Perm{}", i + 1), (*src + 1) as i64);
            }
        }
        MapCore::Poly(p) => {
            doc.push_attr("Nin", p.nin() as i64);
            doc.push_attr("Nout", p.nout() as i64);
            push_poly_terms(&mut doc, "NtermF", "TermF", p.forward_terms());
            if let Some(inv) = p.inverse_terms() {
                push_poly_terms(&mut doc, "NtermI", "TermI", inv);
            }
        }
        MapCore::Proj(p) => {
            doc.push_attr("Proj", p.kind().code());
        }
        MapCore::Lut(l) => {
            doc.push_attr("Nlut", l.table().len() as i64);
            doc.push_attr("Start", l.start());
            doc.push_attr("Incr", l.inc());
            for (i, v) in l.table().iter().enumerate() {
                doc.push_attr(format!("Lut{}", i + 1), *v);
            }
        }
        MapCore::Switch(sw) => {
            doc.push_attr("Nroute", sw.routes().len() as i64);
            if let Some(sel) = sw.fwd_selector() {
                ctx.push_object(&mut doc, "FwdSel", sel.clone().into());
            }
            if let Some(sel) = sw.inv_selector() {
                ctx.push_object(&mut doc, "InvSel", sel.clone().into());
            }
            for (i, route) in sw.routes().iter().enumerate() {
                ctx.push_object(&mut doc, &format!("Route{}", i + 1), route.clone().into());
            }
        }
        MapCore::Cmp(c) => {
            doc.push_attr("Series", c.is_series() as i64);
            ctx.push_object(&mut doc, "MapA", c.map1().clone().into());
            ctx.push_object(&mut doc, "MapB", c.map2().clone().into());
        }
    }
    if m.is_inverted() {
        doc.push_attr("Invert", 1i64);
    }
    if let Some(id) = &m.id {
        doc.push_attr("ID", id.as_str());
    }
    doc
}

fn push_poly_terms(doc: &mut Document, count_name: &str, prefix: &str, axes: &[Vec<PolyTerm>]) {
    let total: usize = axes.iter().map(|t| t.len()).sum();
    doc.push_attr(count_name, total as i64);
    let mut k = 0;
    for (axis, terms) in axes.iter().enumerate() {
        for term in terms {
            k += 1;
            let mut text = format!("{} {}", axis + 1, format_float(term.coeff));
            for p in &term.powers {
                text.push(' ');
                text.push_str(&p.to_string());
            }
            doc.push_attr(format!("{prefix}{k}"), text);
        }
    }
}

fn read_poly_terms(
    doc: &Document,
    count_name: &str,
    prefix: &str,
    naxes_out: usize,
    naxes_in: usize,
) -> Result<Vec<Vec<PolyTerm>>> {
    let total = doc.require_usize(count_name)?;
    let mut axes = vec![Vec::new(); naxes_out];
    for k in 1..=total {
        let name = format!("{prefix}{k}");
        let text = doc.require_str(&name)?;
        let mut tokens = text.split_whitespace();
        let bad = || WcsError::malformed(doc.line, format!("malformed polynomial term `{text}`"));
        let axis: usize = tokens.next().ok_or_else(bad)?.parse().map_err(|_| bad())?;
        if axis == 0 || axis > naxes_out {
            return Err(bad());
        }
        let coeff: f64 = tokens.next().ok_or_else(bad)?.parse().map_err(|_| bad())?;
        let mut powers = Vec::with_capacity(naxes_in);
        for _ in 0..naxes_in {
            powers.push(tokens.next().ok_or_else(bad)?.parse().map_err(|_| bad())?);
        }
        if tokens.next().is_some() {
            return Err(bad());
        }
        axes[axis - 1].push(PolyTerm::new(coeff, powers));
    }
    Ok(axes)
}

/// Apply trailing common attributes and wrap a core into a Mapping
fn finish_mapping(doc: &Document, core: MapCore) -> Result<WcsObject> {
    let mut m = Mapping::from_core(core);
    if doc.get_bool("Invert", false)? {
        m = m.invert();
    }
    if let Some(id) = doc.get_str("ID") {
        m.id = Some(id.to_string());
    }
    Ok(WcsObject::Mapping(m))
}

pub(crate) fn read_unit_map(doc: &Document, _ctx: &mut ReadCtx) -> Result<WcsObject> {
    let naxes = doc.require_usize("Naxes")?;
    finish_mapping(doc, MapCore::Unit(UnitMap::new(naxes)))
}

pub(crate) fn read_shift_map(doc: &Document, _ctx: &mut ReadCtx) -> Result<WcsObject> {
    let naxes = doc.require_usize("Naxes")?;
    let mut shifts = Vec::with_capacity(naxes);
    for i in 1..=naxes {
        shifts.push(doc.require_float(&format!("Shift{i}"))?);
    }
    finish_mapping(doc, MapCore::Shift(ShiftMap::new(shifts)))
}

pub(crate) fn read_zoom_map(doc: &Document, _ctx: &mut ReadCtx) -> Result<WcsObject> {
    let naxes = doc.require_usize("Naxes")?;
    let factor = doc.require_float("Zoom")?;
    finish_mapping(doc, MapCore::Zoom(ZoomMap::new(naxes, factor)))
}

pub(crate) fn read_affine_map(doc: &Document, _ctx: &mut ReadCtx) -> Result<WcsObject> {
    let nin = doc.require_usize("Nin")?;
    let nout = doc.require_usize("Nout")?;
    let mut matrix = Vec::with_capacity(nin * nout);
    for k in 1..=nin * nout {
        matrix.push(doc.require_float(&format!("Mat{k}"))?);
    }
    let mut offset = Vec::with_capacity(nout);
    for r in 1..=nout {
        offset.push(doc.require_float(&format!("Off{r}"))?);
    }
    let affine = AffineMap::new(nin, nout, matrix, offset)
        .map_err(|e| WcsError::malformed(doc.line, e.to_string()))?;
    finish_mapping(doc, MapCore::Affine(affine))
}

pub(crate) fn read_perm_map(doc: &Document, _ctx: &mut ReadCtx) -> Result<WcsObject> {
    let naxes = doc.require_usize("Naxes")?;
    let mut perm = Vec::with_capacity(naxes);
    for i in 1..=naxes {
        let axis = doc.require_usize(&format!("Perm{i}"))?;
        if axis == 0 {
            return Err(WcsError::malformed(doc.line, "permutation axes are 1-based"));
        }
        perm.push(axis - 1);
    }
    let perm = PermMap::new(perm).map_err(|e| WcsError::malformed(doc.line, e.to_string()))?;
    finish_mapping(doc, MapCore::Perm(perm))
}

pub(crate) fn read_poly_map(doc: &Document, _ctx: &mut ReadCtx) -> Result<WcsObject> {
    let nin = doc.require_usize("Nin")?;
    let nout = doc.require_usize("Nout")?;
    let forward = read_poly_terms(doc, "NtermF", "TermF", nout, nin)?;
    let inverse = if doc.attr("NtermI").is_some() {
        Some(read_poly_terms(doc, "NtermI", "TermI", nin, nout)?)
    } else {
        None
    };
    let poly = PolyMap::new(nin, nout, forward, inverse)
        .map_err(|e| WcsError::malformed(doc.line, e.to_string()))?;
    finish_mapping(doc, MapCore::Poly(poly))
}

pub(crate) fn read_proj_map(doc: &Document, _ctx: &mut ReadCtx) -> Result<WcsObject> {
    let code = doc.require_str("Proj")?;
    let kind = ProjKind::from_code(code).ok_or_else(|| {
        WcsError::malformed(doc.line, format!("unknown projection code `{code}`"))
    })?;
    finish_mapping(doc, MapCore::Proj(ProjMap::new(kind)))
}

pub(crate) fn read_lut_map(doc: &Document, _ctx: &mut ReadCtx) -> Result<WcsObject> {
    let nlut = doc.require_usize("Nlut")?;
    let start = doc.require_float("Start")?;
    let inc = doc.require_float("Incr")?;
    let mut table = Vec::with_capacity(nlut);
    for i in 1..=nlut {
        table.push(doc.require_float(&format!("Lut{i}"))?);
    }
    let lut =
        LutMap::new(table, start, inc).map_err(|e| WcsError::malformed(doc.line, e.to_string()))?;
    finish_mapping(doc, MapCore::Lut(lut))
}

pub(crate) fn read_switch_map(doc: &Document, ctx: &mut ReadCtx) -> Result<WcsObject> {
    let nroute = doc.require_usize("Nroute")?;
    let fwd = read_optional_mapping(doc, "FwdSel", ctx)?;
    let inv = read_optional_mapping(doc, "InvSel", ctx)?;
    let mut routes = Vec::with_capacity(nroute);
    for i in 1..=nroute {
        routes.push(read_mapping(doc, &format!("Route{i}"), ctx)?);
    }
    let sw = SwitchMap::new(fwd, inv, routes)
        .map_err(|e| WcsError::malformed(doc.line, e.to_string()))?;
    finish_mapping(doc, MapCore::Switch(sw))
}

pub(crate) fn read_cmp_map(doc: &Document, ctx: &mut ReadCtx) -> Result<WcsObject> {
    let series = doc.get_bool("Series", true)?;
    let map1 = read_mapping(doc, "MapA", ctx)?;
    let map2 = read_mapping(doc, "MapB", ctx)?;
    let cmp = if series {
        crate::mapping::CmpMap::series(map1, map2)
            .map_err(|e| WcsError::malformed(doc.line, e.to_string()))?
    } else {
        crate::mapping::CmpMap::parallel(map1, map2)
    };
    finish_mapping(doc, MapCore::Cmp(Box::new(cmp)))
}

fn read_mapping(doc: &Document, name: &str, ctx: &mut ReadCtx) -> Result<Mapping> {
    match read_optional_mapping(doc, name, ctx)? {
        Some(m) => Ok(m),
        None => Err(WcsError::malformed(
            doc.line,
            format!("{}: missing required object `{}`", doc.class, name),
        )),
    }
}

fn read_optional_mapping(
    doc: &Document,
    name: &str,
    ctx: &mut ReadCtx,
) -> Result<Option<Mapping>> {
    let item = match doc.object_item(name) {
        Some(item) => item,
        None => return Ok(None),
    };
    match ctx.resolve(item)? {
        WcsObject::Mapping(m) => Ok(Some(m)),
        other => Err(WcsError::malformed(
            doc.line,
            format!("`{name}` is a {}, expected a mapping", other.class_name()),
        )),
    }
}

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

fn frame_to_doc(f: &Frame) -> Document {
    let mut doc = Document::new("Frame");
    doc.push_attr("Naxes", f.naxes() as i64);
    if f.attr_is_set("Title") {
        doc.push_attr("Title", f.title());
    }
    if f.attr_is_set("Domain") {
        doc.push_attr("Domain", f.domain());
    }
    if f.attr_is_set("System") {
        doc.push_attr("System", f.system().name());
    }
    if let Some(epoch) = f.epoch() {
        doc.push_attr("Epoch", epoch);
    }
    if let Some(equinox) = f.equinox() {
        doc.push_attr("Equinox", equinox);
    }
    for axis in 1..=f.naxes() {
        if f.attr_is_set(&format!("Label({axis})")) {
            if let Ok(label) = f.label(axis) {
                doc.push_attr(format!("Lbl{axis}"), label);
            }
        }
        if f.attr_is_set(&format!("Unit({axis})")) {
            if let Ok(unit) = f.unit(axis) {
                doc.push_attr(format!("Uni{axis}"), unit);
            }
        }
        if f.attr_is_set(&format!("Symbol({axis})")) {
            if let Ok(symbol) = f.symbol(axis) {
                doc.push_attr(format!("Sym{axis}"), symbol);
            }
        }
        if f.attr_is_set(&format!("Direction({axis})")) {
            if let Ok(AttrValue::Bool(dir)) = f.get_attr(&format!("Direction({axis})")) {
                doc.push_attr(format!("Dir{axis}"), dir as i64);
            }
        }
    }
    if let Some(id) = &f.id {
        doc.push_attr("ID", id.as_str());
    }
    doc
}

pub(crate) fn read_frame(doc: &Document, _ctx: &mut ReadCtx) -> Result<WcsObject> {
    let frame = frame_from_doc(doc)?;
    Ok(WcsObject::Frame(frame))
}

fn frame_from_doc(doc: &Document) -> Result<Frame> {
    let naxes = doc.require_usize("Naxes")?;
    let mut frame = Frame::new(naxes);
    if let Some(title) = doc.get_str("Title") {
        frame.set_title(title);
    }
    if let Some(domain) = doc.get_str("Domain") {
        frame.set_domain(domain);
    }
    if let Some(system) = doc.get_str("System") {
        let system = System::from_name(system).ok_or_else(|| {
            WcsError::malformed(doc.line, format!("unknown system `{system}`"))
        })?;
        frame.set_system(system);
    }
    if let Some(epoch) = doc.get_float("Epoch")? {
        frame.set_epoch(epoch);
    }
    if let Some(equinox) = doc.get_float("Equinox")? {
        frame.set_equinox(equinox);
    }
    for axis in 1..=naxes {
        if let Some(label) = doc.get_str(&format!("Lbl{axis}")) {
            let _ = frame.set_label(axis, label);
        }
        if let Some(unit) = doc.get_str(&format!("Uni{axis}")) {
            let _ = frame.set_unit(axis, unit);
        }
        if let Some(symbol) = doc.get_str(&format!("Sym{axis}")) {
            let _ = frame.set_symbol(axis, symbol);
        }
        if doc.attr(&format!("Dir{axis}")).is_some() {
            let dir = doc.get_bool(&format!("Dir{axis}"), true)?;
            let _ = frame.set_attr(&format!("Direction({axis})"), if dir { "1" } else { "0" });
        }
    }
    if let Some(id) = doc.get_str("ID") {
        frame.id = Some(id.to_string());
    }
    Ok(frame)
}

// ---------------------------------------------------------------------------
// FrameSet
// ---------------------------------------------------------------------------

fn frameset_to_doc(fs: &FrameSet, ctx: &mut WriteCtx) -> Document {
    let mut doc = Document::new("FrameSet");
    doc.push_attr("Nslot", fs.arena_len() as i64);
    doc.push_attr("Base", fs.base() as i64);
    doc.push_attr("Current", fs.current() as i64);
    for i in 1..=fs.arena_len() {
        if let Some(frame) = fs.slot(i) {
            ctx.push_object(&mut doc, &format!("Frm{i}"), frame.clone().into());
        }
    }
    doc.push_attr("Nedge", fs.edges().len() as i64);
    for (e, edge) in fs.edges().iter().enumerate() {
        doc.push_attr(format!("From{}", e + 1), edge.from as i64);
        doc.push_attr(format!("To{}", e + 1), edge.to as i64);
        ctx.push_object(&mut doc, &format!("Map{}", e + 1), edge.mapping.clone().into());
    }
    if let Some(id) = &fs.id {
        doc.push_attr("ID", id.as_str());
    }
    doc
}

pub(crate) fn read_frameset(doc: &Document, ctx: &mut ReadCtx) -> Result<WcsObject> {
    let nslot = doc.require_usize("Nslot")?;
    let base = doc.require_usize("Base")?;
    let current = doc.require_usize("Current")?;
    let mut frames = Vec::with_capacity(nslot);
    for i in 1..=nslot {
        match doc.object_item(&format!("Frm{i}")) {
            Some(item) => match ctx.resolve(item)? {
                WcsObject::Frame(f) => frames.push(Some(f)),
                other => {
                    return Err(WcsError::malformed(
                        doc.line,
                        format!("`Frm{i}` is a {}, expected a frame", other.class_name()),
                    ))
                }
            },
            None => frames.push(None),
        }
    }
    let nedge = doc.require_usize("Nedge")?;
    let mut edges = Vec::with_capacity(nedge);
    for e in 1..=nedge {
        let from = doc.require_usize(&format!("From{e}"))?;
        let to = doc.require_usize(&format!("To{e}"))?;
        let mapping = read_mapping(doc, &format!("Map{e}"), ctx)?;
        edges.push(Edge { from, to, mapping });
    }
    let mut fs = FrameSet::from_parts(frames, edges, base, current)
        .map_err(|e| WcsError::malformed(doc.line, e.to_string()))?;
    if let Some(id) = doc.get_str("ID") {
        fs.id = Some(id.to_string());
    }
    Ok(WcsObject::FrameSet(fs))
}

// ---------------------------------------------------------------------------
// Region
// ---------------------------------------------------------------------------

fn region_to_doc(r: &Region, ctx: &mut WriteCtx) -> Document {
    let mut doc = Document::new(r.class_name());
    ctx.push_object(&mut doc, "Frm", r.frame().clone().into());
    let map = r.mapping();
    if map.kind_class() != "UnitMap" || map.is_inverted() {
        ctx.push_object(&mut doc, "Map", map.clone().into());
    }
    match r.kind() {
        RegionKind::Box { lbnd, ubnd } => {
            for (i, v) in lbnd.iter().enumerate() {
                doc.push_attr(format!("Lbnd{}", i + 1), *v);
            }
            for (i, v) in ubnd.iter().enumerate() {
                doc.push_attr(format!("Ubnd{}", i + 1), *v);
            }
        }
        RegionKind::Interval { lbnd, ubnd } => {
            for (i, v) in lbnd.iter().enumerate() {
                if let Some(v) = v {
                    doc.push_attr(format!("Lbnd{}", i + 1), *v);
                }
            }
            for (i, v) in ubnd.iter().enumerate() {
                if let Some(v) = v {
                    doc.push_attr(format!("Ubnd{}", i + 1), *v);
                }
            }
        }
        RegionKind::Circle { center, radius } => {
            for (i, v) in center.iter().enumerate() {
                doc.push_attr(format!("Cen{}", i + 1), *v);
            }
            doc.push_attr("Radius", *radius);
        }
        RegionKind::Ellipse {
            center,
            radii,
            angle,
        } => {
            doc.push_attr("Cen1", center[0]);
            doc.push_attr("Cen2", center[1]);
            doc.push_attr("Rad1", radii[0]);
            doc.push_attr("Rad2", radii[1]);
            doc.push_attr("Angle", *angle);
        }
        RegionKind::Polygon { vertices } => {
            doc.push_attr("Nvert", vertices.len() as i64);
            for (i, v) in vertices.iter().enumerate() {
                doc.push_attr(format!("Vx{}", i + 1), v[0]);
                doc.push_attr(format!("Vy{}", i + 1), v[1]);
            }
        }
        RegionKind::Points { points } => {
            doc.push_attr("Npnt", points.len() as i64);
            for (i, p) in points.iter().enumerate() {
                let text = p
                    .iter()
                    .map(|v| format_float(*v))
                    .collect::<Vec<_>>()
                    .join(" ");
                doc.push_attr(format!("Pnt{}", i + 1), text);
            }
        }
        RegionKind::Cmp(cmp) => {
            doc.push_attr("Oper", cmp.oper().name());
            ctx.push_object(&mut doc, "RegA", cmp.first().clone().into());
            ctx.push_object(&mut doc, "RegB", cmp.second().clone().into());
        }
    }
    if r.is_negated() {
        doc.push_attr("Negated", 1i64);
    }
    if !r.is_closed() {
        doc.push_attr("Closed", 0i64);
    }
    if let Some(id) = &r.id {
        doc.push_attr("ID", id.as_str());
    }
    doc
}

pub(crate) fn read_region(doc: &Document, ctx: &mut ReadCtx) -> Result<WcsObject> {
    let frame = match doc.object_item("Frm") {
        Some(item) => match ctx.resolve(item)? {
            WcsObject::Frame(f) => f,
            other => {
                return Err(WcsError::malformed(
                    doc.line,
                    format!("`Frm` is a {}, expected a frame", other.class_name()),
                ))
            }
        },
        None => {
            return Err(WcsError::malformed(
                doc.line,
                format!("{}: missing required object `Frm`", doc.class),
            ))
        }
    };
    let naxes = frame.naxes();
    let map = read_optional_mapping(doc, "Map", ctx)?.unwrap_or_else(|| Mapping::unit(naxes));
    let kind = match doc.class.as_str() {
        "Box" => {
            let mut lbnd = Vec::with_capacity(naxes);
            let mut ubnd = Vec::with_capacity(naxes);
            for i in 1..=naxes {
                lbnd.push(doc.require_float(&format!("Lbnd{i}"))?);
                ubnd.push(doc.require_float(&format!("Ubnd{i}"))?);
            }
            RegionKind::Box { lbnd, ubnd }
        }
        "Interval" => {
            let mut lbnd = Vec::with_capacity(naxes);
            let mut ubnd = Vec::with_capacity(naxes);
            for i in 1..=naxes {
                lbnd.push(doc.get_float(&format!("Lbnd{i}"))?);
                ubnd.push(doc.get_float(&format!("Ubnd{i}"))?);
            }
            RegionKind::Interval { lbnd, ubnd }
        }
        "Circle" => {
            let mut center = Vec::with_capacity(naxes);
            for i in 1..=naxes {
                center.push(doc.require_float(&format!("Cen{i}"))?);
            }
            RegionKind::Circle {
                center,
                radius: doc.require_float("Radius")?,
            }
        }
        "Ellipse" => RegionKind::Ellipse {
            center: [doc.require_float("Cen1")?, doc.require_float("Cen2")?],
            radii: [doc.require_float("Rad1")?, doc.require_float("Rad2")?],
            angle: doc.require_float("Angle")?,
        },
        "Polygon" => {
            let nvert = doc.require_usize("Nvert")?;
            let mut vertices = Vec::with_capacity(nvert);
            for i in 1..=nvert {
                vertices.push([
                    doc.require_float(&format!("Vx{i}"))?,
                    doc.require_float(&format!("Vy{i}"))?,
                ]);
            }
            RegionKind::Polygon { vertices }
        }
        "PointList" => {
            let npnt = doc.require_usize("Npnt")?;
            let mut points = Vec::with_capacity(npnt);
            for i in 1..=npnt {
                let text = doc.require_str(&format!("Pnt{i}"))?;
                let coords: std::result::Result<Vec<f64>, _> =
                    text.split_whitespace().map(str::parse).collect();
                let coords = coords.map_err(|_| {
                    WcsError::malformed(doc.line, format!("malformed point `{text}`"))
                })?;
                if coords.len() != naxes {
                    return Err(WcsError::malformed(
                        doc.line,
                        format!("point {i} has {} coords, expected {naxes}", coords.len()),
                    ));
                }
                points.push(coords);
            }
            RegionKind::Points { points }
        }
        "CmpRegion" => {
            let oper_name = doc.require_str("Oper")?;
            let oper = RegionOper::from_name(oper_name).ok_or_else(|| {
                WcsError::malformed(doc.line, format!("unknown combinator `{oper_name}`"))
            })?;
            let first = read_child_region(doc, "RegA", ctx)?;
            let second = read_child_region(doc, "RegB", ctx)?;
            RegionKind::Cmp(Box::new(CmpRegion::new(oper, first, second)))
        }
        other => {
            return Err(WcsError::malformed(
                doc.line,
                format!("unknown region class `{other}`"),
            ))
        }
    };
    let negated = doc.get_bool("Negated", false)?;
    let closed = doc.get_bool("Closed", true)?;
    let mut region = Region::from_parts(frame, map, kind, negated, closed);
    if let Some(id) = doc.get_str("ID") {
        region.id = Some(id.to_string());
    }
    Ok(WcsObject::Region(region))
}

fn read_child_region(doc: &Document, name: &str, ctx: &mut ReadCtx) -> Result<Region> {
    let item = doc.object_item(name).ok_or_else(|| {
        WcsError::malformed(
            doc.line,
            format!("{}: missing required object `{name}`", doc.class),
        )
    })?;
    match ctx.resolve(item)? {
        WcsObject::Region(r) => Ok(r),
        other => Err(WcsError::malformed(
            doc.line,
            format!("`{name}` is a {}, expected a region", other.class_name()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(obj: WcsObject) -> WcsObject {
        let mut wctx = WriteCtx::new();
        let doc = to_doc(&obj, &mut wctx);
        let mut rctx = ReadCtx::new();
        from_doc(&doc, &mut rctx).unwrap()
    }

    #[test]
    fn test_mapping_doc_round_trips() {
        let maps = vec![
            Mapping::unit(3),
            Mapping::shift(vec![1.5, -2.5]),
            Mapping::zoom(2, 0.25),
            Mapping::affine(2, 2, vec![1.0, 2.0, 3.0, 4.0], vec![0.5, -0.5]).unwrap(),
            Mapping::perm(vec![1, 0]).unwrap(),
            Mapping::projection(ProjKind::Gnomonic),
            Mapping::lut(vec![0.0, 1.0, 4.0], 0.0, 0.5).unwrap(),
            Mapping::series(&Mapping::zoom(2, 2.0), &Mapping::shift(vec![1.0, 1.0])).unwrap(),
            Mapping::zoom(2, 3.0).invert(),
        ];
        for m in maps {
            let back = round_trip(m.clone().into());
            assert!(back.same_as(&m.clone().into()), "{} did not round trip", m.kind_class());
        }
    }

    #[test]
    fn test_poly_mapping_doc_round_trips() {
        let poly = Mapping::polynomial(
            2,
            1,
            vec![vec![
                PolyTerm::new(1.0, vec![1, 0]),
                PolyTerm::new(-0.5, vec![0, 2]),
            ]],
            None,
        )
        .unwrap();
        let back = round_trip(poly.clone().into());
        assert!(back.same_as(&poly.into()));
    }

    #[test]
    fn test_frame_doc_round_trips() {
        let mut f = Frame::new(2);
        f.set_label(1, "RA").unwrap();
        f.set_label(2, "Dec").unwrap();
        f.set_unit(1, "deg").unwrap();
        f.set_domain("SKY");
        f.set_system(System::Equatorial);
        f.set_epoch(2000.0);
        let back = round_trip(f.clone().into());
        assert!(back.same_as(&f.into()));
    }

    #[test]
    fn test_frame_defaults_do_not_serialize() {
        let f = Frame::new(2);
        let mut ctx = WriteCtx::new();
        let doc = to_doc(&f.into(), &mut ctx);
        // only the axis count goes out for a default frame
        assert_eq!(doc.items.len(), 1);
    }

    #[test]
    fn test_frameset_doc_round_trips() {
        let mut fs = FrameSet::new(Frame::new(2));
        fs.add_frame(1, Mapping::zoom(2, 2.0), Frame::new(2)).unwrap();
        let back = round_trip(fs.clone().into());
        assert!(back.same_as(&fs.into()));
    }

    #[test]
    fn test_shared_subobject_becomes_reference() {
        // The same frame twice: the second occurrence must be a Ref
        let mut fs = FrameSet::new(Frame::new(2));
        fs.add_frame(1, Mapping::unit(2), Frame::new(2)).unwrap();
        let mut ctx = WriteCtx::new();
        let doc = to_doc(&fs.clone().into(), &mut ctx);
        let refs = doc
            .items
            .iter()
            .filter(|i| matches!(i, Item::Ref { .. }))
            .count();
        assert!(refs >= 1, "expected a cross-reference for the repeated frame");

        let mut rctx = ReadCtx::new();
        let back = from_doc(&doc, &mut rctx).unwrap();
        assert!(back.same_as(&fs.into()));
    }

    #[test]
    fn test_region_doc_round_trips() {
        let regions = vec![
            Region::new_box(Frame::new(2), vec![0.0, 0.0], vec![1.0, 2.0]).unwrap(),
            Region::new_interval(Frame::new(1), vec![Some(0.0)], vec![None]).unwrap(),
            Region::new_circle(Frame::new(2), vec![1.0, 1.0], 2.0).unwrap(),
            Region::new_ellipse(Frame::new(2), [0.0, 0.0], [2.0, 1.0], 0.3).unwrap(),
            Region::new_polygon(
                Frame::new(2),
                vec![[0.0, 0.0], [1.0, 0.0], [0.5, 1.0]],
            )
            .unwrap(),
            Region::new_points(Frame::new(2), vec![vec![1.0, 2.0]]).unwrap(),
        ];
        for r in regions {
            let back = round_trip(r.clone().into());
            assert!(back.same_as(&r.clone().into()), "{} did not round trip", r.class_name());
        }
    }

    #[test]
    fn test_compound_region_doc_round_trips() {
        let a = Region::new_box(Frame::new(1), vec![0.0], vec![2.0]).unwrap();
        let b = Region::new_box(Frame::new(1), vec![1.0], vec![3.0]).unwrap();
        let mut r = Region::combine(RegionOper::Intersection, a, b).unwrap();
        r.negate();
        let back = round_trip(r.clone().into());
        assert!(back.same_as(&r.into()));
    }

    #[test]
    fn test_unknown_class_is_malformed() {
        let doc = Document::new("FluxCapacitor");
        let mut ctx = ReadCtx::new();
        let err = from_doc(&doc, &mut ctx).unwrap_err();
        assert!(matches!(err, WcsError::MalformedInput { .. }));
    }

    #[test]
    fn test_missing_attribute_is_malformed() {
        let doc = Document::new("ZoomMap");
        let mut ctx = ReadCtx::new();
        let err = from_doc(&doc, &mut ctx).unwrap_err();
        assert!(matches!(err, WcsError::MalformedInput { .. }));
    }

    #[test]
    fn test_dangling_reference_is_malformed() {
        let mut doc = Document::new("CmpMap");
        doc.push_attr("Series", 1i64);
        doc.push_ref("MapA", 7);
        doc.push_ref("MapB", 8);
        let mut ctx = ReadCtx::new();
        let err = from_doc(&doc, &mut ctx).unwrap_err();
        assert!(matches!(err, WcsError::MalformedInput { .. }));
    }
}
