//! Structural simplification of mapping trees
//!
//! [`Mapping::simplify`] rewrites a mapping into an equivalent but reduced
//! form:
//!
//! - nested series/parallel compounds flatten associatively
//! - identity mappings drop out
//! - a mapping followed by its own inverse cancels to the identity
//! - adjacent linear kinds fold into a single [`AffineMap`], which is then
//!   reclassified down to the cheapest kind that represents it
//! - like diagonal kinds merge across a parallel combination
//!
//! Pairwise series rules live in a [`RuleTable`] keyed by kind pair. An
//! exact-kind rule (e.g. shift∘shift → shift) always outranks the generic
//! linear fold, so the most specific output class wins. Registering two
//! rules for the same kind pair is a construction-time `AmbiguousRule`
//! error, never a silent pick.
//!
//! Simplification is a fixed point: re-simplifying the result returns it
//! unchanged.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::error::WcsError;
use crate::mapping::linear::AffineMap;
use crate::mapping::perm::PermMap;
use crate::mapping::switch::SwitchMap;
use crate::mapping::{MapCore, Mapping};
use crate::Result;

/// Upper bound on fixed-point iterations; each pass either shrinks the
/// tree or leaves it unchanged, so this is never reached in practice.
const MAX_PASSES: usize = 16;

/// Identifies a concrete mapping kind for rule lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KindId {
    Unit,
    Shift,
    Zoom,
    Affine,
    Perm,
    Poly,
    Proj,
    Lut,
    Switch,
    Cmp,
}

impl KindId {
    pub fn name(&self) -> &'static str {
        match self {
            KindId::Unit => "UnitMap",
            KindId::Shift => "ShiftMap",
            KindId::Zoom => "ZoomMap",
            KindId::Affine => "AffineMap",
            KindId::Perm => "PermMap",
            KindId::Poly => "PolyMap",
            KindId::Proj => "ProjMap",
            KindId::Lut => "LutMap",
            KindId::Switch => "SwitchMap",
            KindId::Cmp => "CmpMap",
        }
    }
}

fn kind_of(m: &Mapping) -> KindId {
    match &m.core {
        MapCore::Unit(_) => KindId::Unit,
        MapCore::Shift(_) => KindId::Shift,
        MapCore::Zoom(_) => KindId::Zoom,
        MapCore::Affine(_) => KindId::Affine,
        MapCore::Perm(_) => KindId::Perm,
        MapCore::Poly(_) => KindId::Poly,
        MapCore::Proj(_) => KindId::Proj,
        MapCore::Lut(_) => KindId::Lut,
        MapCore::Switch(_) => KindId::Switch,
        MapCore::Cmp(_) => KindId::Cmp,
    }
}

/// A pairwise series rule: given `second ∘ first`, produce a single
/// replacement mapping, or `None` when the rule does not apply numerically
pub type SeriesRule = fn(&Mapping, &Mapping, f64) -> Option<Mapping>;

/// Registry of pairwise series simplification rules
///
/// Lookup is by exact kind pair; the generic linear fold applies only when
/// no exact rule is registered, which is the specificity tie-break.
#[derive(Debug)]
pub struct RuleTable {
    series: HashMap<(KindId, KindId), SeriesRule>,
}

impl RuleTable {
    /// Build a table, rejecting duplicate registrations
    pub fn try_new(rules: &[((KindId, KindId), SeriesRule)]) -> Result<RuleTable> {
        let mut series = HashMap::new();
        for ((a, b), rule) in rules {
            if series.insert((*a, *b), *rule).is_some() {
                return Err(WcsError::AmbiguousRule {
                    kind1: a.name(),
                    kind2: b.name(),
                });
            }
        }
        Ok(RuleTable { series })
    }

    /// The built-in rule set
    pub fn builtin() -> &'static RuleTable {
        static BUILTIN: Lazy<RuleTable> = Lazy::new(|| {
            RuleTable::try_new(BUILTIN_RULES).expect("built-in rule table is conflict-free")
        });
        &BUILTIN
    }

    fn lookup(&self, a: KindId, b: KindId) -> Option<&SeriesRule> {
        self.series.get(&(a, b))
    }
}

/// Built-in pairwise rules; each produces the smallest kind that
/// represents the combination
pub(crate) const BUILTIN_RULES: &[((KindId, KindId), SeriesRule)] = &[
    ((KindId::Shift, KindId::Shift), rule_shift_shift),
    ((KindId::Zoom, KindId::Zoom), rule_zoom_zoom),
    ((KindId::Perm, KindId::Perm), rule_perm_perm),
];

fn rule_shift_shift(a: &Mapping, b: &Mapping, _eps: f64) -> Option<Mapping> {
    let sa = effective_shifts(a)?;
    let sb = effective_shifts(b)?;
    if sa.len() != sb.len() {
        return None;
    }
    let combined = sa.iter().zip(&sb).map(|(x, y)| x + y).collect();
    Some(Mapping::shift(combined))
}

fn rule_zoom_zoom(a: &Mapping, b: &Mapping, _eps: f64) -> Option<Mapping> {
    let (na, fa) = effective_zoom(a)?;
    let (nb, fb) = effective_zoom(b)?;
    if na != nb {
        return None;
    }
    Some(Mapping::zoom(na, fa * fb))
}

fn rule_perm_perm(a: &Mapping, b: &Mapping, _eps: f64) -> Option<Mapping> {
    let pa = effective_perm(a)?;
    let pb = effective_perm(b)?;
    let composed = PermMap::compose(&pa, &pb).ok()?;
    if composed.is_identity() {
        Some(Mapping::unit(composed.nin()))
    } else {
        Some(Mapping::from_core(MapCore::Perm(composed)))
    }
}

fn effective_shifts(m: &Mapping) -> Option<Vec<f64>> {
    match &m.core {
        MapCore::Shift(s) => {
            let shifts = s.shifts().to_vec();
            Some(if m.inverted {
                shifts.iter().map(|v| -v).collect()
            } else {
                shifts
            })
        }
        _ => None,
    }
}

fn effective_zoom(m: &Mapping) -> Option<(usize, f64)> {
    match &m.core {
        MapCore::Zoom(z) => {
            if m.inverted {
                if z.factor() == 0.0 {
                    None
                } else {
                    Some((z.nin(), 1.0 / z.factor()))
                }
            } else {
                Some((z.nin(), z.factor()))
            }
        }
        _ => None,
    }
}

fn effective_perm(m: &Mapping) -> Option<PermMap> {
    match &m.core {
        MapCore::Perm(p) => Some(if m.inverted { p.inverted() } else { p.clone() }),
        _ => None,
    }
}

/// Express a linear mapping as a single affine, folding in its inversion
/// state; `None` when the mapping is not linear or the inversion needed
/// does not exist
fn as_affine(m: &Mapping) -> Option<AffineMap> {
    if !m.is_linear() {
        return None;
    }
    let aff = match &m.core {
        MapCore::Unit(u) => AffineMap::identity(u.nin()),
        MapCore::Shift(s) => {
            AffineMap::new(s.nin(), s.nin(), identity_matrix(s.nin()), s.shifts().to_vec()).ok()?
        }
        MapCore::Zoom(z) => {
            let n = z.nin();
            let mut matrix = vec![0.0; n * n];
            for i in 0..n {
                matrix[i * n + i] = z.factor();
            }
            AffineMap::new(n, n, matrix, vec![0.0; n]).ok()?
        }
        MapCore::Affine(a) => a.clone(),
        MapCore::Perm(p) => {
            let n = p.nin();
            let mut matrix = vec![0.0; n * n];
            for (i, &src) in p.perm().iter().enumerate() {
                matrix[i * n + src] = 1.0;
            }
            AffineMap::new(n, n, matrix, vec![0.0; n]).ok()?
        }
        MapCore::Proj(_) => AffineMap::identity(2),
        MapCore::Cmp(c) => {
            let a1 = as_affine(c.map1())?;
            let a2 = as_affine(c.map2())?;
            if c.is_series() {
                AffineMap::compose(&a1, &a2).ok()?
            } else {
                AffineMap::block(&a1, &a2).ok()?
            }
        }
        _ => return None,
    };
    if m.inverted {
        aff.inverted().ok()
    } else {
        Some(aff)
    }
}

fn identity_matrix(n: usize) -> Vec<f64> {
    let mut matrix = vec![0.0; n * n];
    for i in 0..n {
        matrix[i * n + i] = 1.0;
    }
    matrix
}

/// Rewrite an affine as the cheapest kind that represents it
fn reclassify(aff: AffineMap, eps: f64) -> Mapping {
    if aff.is_identity(eps) {
        return Mapping::unit(aff.nin());
    }
    if aff.nin() == aff.nout() {
        let n = aff.nin();
        let diagonal = aff.is_diagonal();
        if diagonal {
            let matrix_is_identity = (0..n).all(|i| (aff.matrix()[i * n + i] - 1.0).abs() <= eps);
            if matrix_is_identity {
                return Mapping::shift(aff.offset().to_vec());
            }
            let zero_offset = aff.offset().iter().all(|v| v.abs() <= eps);
            if zero_offset && n > 0 {
                let f = aff.matrix()[0];
                if (1..n).all(|i| (aff.matrix()[i * n + i] - f).abs() <= eps) {
                    return Mapping::zoom(n, f);
                }
            }
        }
    }
    Mapping::from_core(MapCore::Affine(aff))
}

/// Try to combine adjacent series terms `second ∘ first`
fn combine_series(
    first: &Mapping,
    second: &Mapping,
    rules: &RuleTable,
    eps: f64,
) -> Option<Mapping> {
    // Identities absorb
    if matches!(first.core, MapCore::Unit(_)) {
        return Some(second.clone());
    }
    if matches!(second.core, MapCore::Unit(_)) {
        return Some(first.clone());
    }
    // A mapping followed by its own inverse cancels
    if first.is_inverse_of(second, eps) && first.has_forward() && first.has_inverse() {
        return Some(Mapping::unit(first.nin()));
    }
    // Exact-kind rule outranks the generic linear fold
    if let Some(rule) = rules.lookup(kind_of(first), kind_of(second)) {
        if let Some(m) = rule(first, second, eps) {
            return Some(m);
        }
    }
    // Generic fold of adjacent linear mappings
    if first.is_linear() && second.is_linear() {
        let a1 = as_affine(first)?;
        let a2 = as_affine(second)?;
        let folded = AffineMap::compose(&a1, &a2).ok()?;
        return Some(reclassify(folded, eps));
    }
    None
}

/// Try to merge adjacent parallel blocks
fn combine_parallel(a: &Mapping, b: &Mapping, eps: f64) -> Option<Mapping> {
    match (&a.core, &b.core) {
        (MapCore::Unit(u1), MapCore::Unit(u2)) => Some(Mapping::unit(u1.nin() + u2.nin())),
        (MapCore::Shift(_), MapCore::Shift(_)) => {
            let mut shifts = effective_shifts(a)?;
            shifts.extend(effective_shifts(b)?);
            Some(Mapping::shift(shifts))
        }
        (MapCore::Zoom(_), MapCore::Zoom(_)) => {
            let (na, fa) = effective_zoom(a)?;
            let (nb, fb) = effective_zoom(b)?;
            if (fa - fb).abs() <= eps {
                Some(Mapping::zoom(na + nb, fa))
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Flatten a series chain, distributing inversion: `(A ∘ B)⁻¹ = B⁻¹ ∘ A⁻¹`
fn collect_series(m: &Mapping, out: &mut Vec<Mapping>) {
    if let MapCore::Cmp(c) = &m.core {
        if c.is_series() {
            if m.inverted {
                collect_series(&c.map2().invert(), out);
                collect_series(&c.map1().invert(), out);
            } else {
                collect_series(c.map1(), out);
                collect_series(c.map2(), out);
            }
            return;
        }
    }
    out.push(m.clone());
}

/// Flatten a parallel combination; inversion distributes child-wise
fn collect_parallel(m: &Mapping, out: &mut Vec<Mapping>) {
    if let MapCore::Cmp(c) = &m.core {
        if !c.is_series() {
            if m.inverted {
                collect_parallel(&c.map1().invert(), out);
                collect_parallel(&c.map2().invert(), out);
            } else {
                collect_parallel(c.map1(), out);
                collect_parallel(c.map2(), out);
            }
            return;
        }
    }
    out.push(m.clone());
}

fn rebuild_series(terms: Vec<Mapping>, fallback: &Mapping) -> Mapping {
    let mut iter = terms.into_iter();
    let first = match iter.next() {
        Some(t) => t,
        None => return Mapping::unit(fallback.nin()),
    };
    let mut acc = first;
    for t in iter {
        match Mapping::series(&acc, &t) {
            Ok(m) => acc = m,
            Err(_) => return fallback.clone(),
        }
    }
    acc
}

fn rebuild_parallel(terms: Vec<Mapping>, fallback: &Mapping) -> Mapping {
    let mut iter = terms.into_iter();
    let mut acc = match iter.next() {
        Some(t) => t,
        None => return fallback.clone(),
    };
    for t in iter {
        acc = Mapping::parallel(&acc, &t);
    }
    acc
}

fn reduce<F>(terms: Vec<Mapping>, mut combine: F) -> (Vec<Mapping>, bool)
where
    F: FnMut(&Mapping, &Mapping) -> Option<Mapping>,
{
    let mut changed = false;
    let mut stack: Vec<Mapping> = Vec::with_capacity(terms.len());
    for mut term in terms {
        while let Some(top) = stack.last() {
            match combine(top, &term) {
                Some(merged) => {
                    stack.pop();
                    term = merged;
                    changed = true;
                }
                None => break,
            }
        }
        stack.push(term);
    }
    (stack, changed)
}

pub(crate) fn simplify_mapping(m: &Mapping, rules: &RuleTable, eps: f64) -> Mapping {
    let mut current = m.clone();
    for _ in 0..MAX_PASSES {
        let next = simplify_once(&current, rules, eps);
        if next.same_as_with(&current, 0.0) {
            break;
        }
        current = next;
    }
    // Simplification preserves identity attributes of the root
    current.id = m.id.clone();
    current
}

fn simplify_once(m: &Mapping, rules: &RuleTable, eps: f64) -> Mapping {
    match &m.core {
        MapCore::Cmp(c) if c.is_series() => {
            let mut flat = Vec::new();
            collect_series(m, &mut flat);
            let mut terms = Vec::new();
            for t in flat {
                let simplified = simplify_once(&t, rules, eps);
                collect_series(&simplified, &mut terms);
            }
            let (terms, _) = reduce(terms, |a, b| combine_series(a, b, rules, eps));
            rebuild_series(terms, m)
        }
        MapCore::Cmp(_) => {
            let mut flat = Vec::new();
            collect_parallel(m, &mut flat);
            let mut terms = Vec::new();
            for t in flat {
                let simplified = simplify_once(&t, rules, eps);
                collect_parallel(&simplified, &mut terms);
            }
            let (terms, _) = reduce(terms, |a, b| combine_parallel(a, b, eps));
            rebuild_parallel(terms, m)
        }
        MapCore::Switch(sw) => simplify_switch(m, sw, rules, eps),
        MapCore::Affine(aff) if !m.inverted => reclassify(aff.clone(), eps),
        _ => m.clone(),
    }
}

fn simplify_switch(m: &Mapping, sw: &SwitchMap, rules: &RuleTable, eps: f64) -> Mapping {
    let fwd = sw
        .fwd_selector()
        .map(|s| simplify_mapping(s, rules, eps));
    let inv = sw
        .inv_selector()
        .map(|s| simplify_mapping(s, rules, eps));
    let routes = sw
        .routes()
        .iter()
        .map(|r| simplify_mapping(r, rules, eps))
        .collect();
    match SwitchMap::new(fwd, inv, routes) {
        Ok(simplified) => Mapping {
            core: MapCore::Switch(simplified),
            inverted: m.inverted,
            id: m.id.clone(),
        },
        Err(_) => m.clone(),
    }
}

impl Mapping {
    /// An equivalent mapping with redundant structure removed
    ///
    /// Uses the built-in rule table and the configured default tolerance.
    /// The result is a fixed point: simplifying it again is a no-op.
    pub fn simplify(&self) -> Mapping {
        self.simplify_with(RuleTable::builtin())
    }

    /// Simplify against a caller-supplied rule table
    pub fn simplify_with(&self, rules: &RuleTable) -> Mapping {
        simplify_mapping(self, rules, crate::config::default_epsilon())
    }
}
