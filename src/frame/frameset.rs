//! FrameSet: a graph of frames connected by mappings
//!
//! Frames are held in an arena and addressed by stable 1-based integer
//! indices; removing a frame leaves a tombstone so indices never shift.
//! Directed edges carry mappings between frame pairs. One frame is marked
//! base and one current (they may coincide), and every mutation preserves
//! the invariant that base and current stay connected given the current
//! availability of forward/inverse transforms.
//!
//! Path discovery is a breadth-first search preferring the shortest edge
//! chain; an edge is traversable along its direction when its mapping has
//! a forward transform, and against it when it has an inverse.

use serde::{Deserialize, Serialize};

use crate::error::WcsError;
use crate::frame::Frame;
use crate::mapping::Mapping;
use crate::object::{AttrKind, AttrValue, Object};
use crate::Result;

/// A directed mapping edge between two frame indices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
    pub mapping: Mapping,
}

/// A set of frames connected by mappings, with base and current markers
///
/// # Example
///
/// ```
/// use ferro_wcs::frame::{Frame, FrameSet};
/// use ferro_wcs::mapping::Mapping;
///
/// let mut fs = FrameSet::new(Frame::new(2));
/// let sky = fs.add_frame(1, Mapping::zoom(2, 0.5), Frame::new(2)).unwrap();
///
/// let path = fs.find_path(1, sky).unwrap();
/// assert_eq!(path.transform_point(&[2.0, 4.0], true).unwrap(), vec![1.0, 2.0]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSet {
    frames: Vec<Option<Frame>>,
    edges: Vec<Edge>,
    base: usize,
    current: usize,
    pub(crate) id: Option<String>,
}

impl FrameSet {
    /// A frameset holding one frame, which is both base and current
    pub fn new(frame: Frame) -> Self {
        Self {
            frames: vec![Some(frame)],
            edges: Vec::new(),
            base: 1,
            current: 1,
            id: None,
        }
    }

    /// Number of live frames
    pub fn nframe(&self) -> usize {
        self.frames.iter().filter(|f| f.is_some()).count()
    }

    /// Index of the base frame
    pub fn base(&self) -> usize {
        self.base
    }

    /// Index of the current frame
    pub fn current(&self) -> usize {
        self.current
    }

    /// Borrow a frame by index
    pub fn frame(&self, index: usize) -> Result<&Frame> {
        self.frames
            .get(index.wrapping_sub(1))
            .and_then(|slot| slot.as_ref())
            .ok_or(WcsError::UnknownFrameIndex {
                index,
                nframe: self.frames.len(),
            })
    }

    /// Mutably borrow a frame by index
    pub fn frame_mut(&mut self, index: usize) -> Result<&mut Frame> {
        let nframe = self.frames.len();
        self.frames
            .get_mut(index.wrapping_sub(1))
            .and_then(|slot| slot.as_mut())
            .ok_or(WcsError::UnknownFrameIndex { index, nframe })
    }

    /// The mapping edges, in insertion order
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn set_base(&mut self, index: usize) -> Result<()> {
        self.frame(index)?;
        self.base = index;
        Ok(())
    }

    pub fn set_current(&mut self, index: usize) -> Result<()> {
        self.frame(index)?;
        self.current = index;
        Ok(())
    }

    /// Insert a frame connected to an existing one; the new frame becomes
    /// current and its index is returned
    ///
    /// `mapping` converts coordinates of frame `existing` into coordinates
    /// of the new frame, so its dimensions must match both.
    pub fn add_frame(&mut self, existing: usize, mapping: Mapping, frame: Frame) -> Result<usize> {
        let anchor = self.frame(existing)?;
        if mapping.nin() != anchor.naxes() {
            return Err(WcsError::DimensionMismatch {
                context: format!("mapping into frame {existing}"),
                expected: anchor.naxes(),
                found: mapping.nin(),
            });
        }
        if mapping.nout() != frame.naxes() {
            return Err(WcsError::DimensionMismatch {
                context: "mapping into new frame".to_string(),
                expected: frame.naxes(),
                found: mapping.nout(),
            });
        }
        self.frames.push(Some(frame));
        let index = self.frames.len();
        self.edges.push(Edge {
            from: existing,
            to: index,
            mapping,
        });
        self.current = index;
        Ok(index)
    }

    /// Add a mapping edge between two existing frames
    ///
    /// Useful for shortcut routes in addition to the edges created by
    /// [`FrameSet::add_frame`].
    pub fn add_edge(&mut self, from: usize, to: usize, mapping: Mapping) -> Result<()> {
        let from_axes = self.frame(from)?.naxes();
        let to_axes = self.frame(to)?.naxes();
        if mapping.nin() != from_axes {
            return Err(WcsError::DimensionMismatch {
                context: format!("mapping out of frame {from}"),
                expected: from_axes,
                found: mapping.nin(),
            });
        }
        if mapping.nout() != to_axes {
            return Err(WcsError::DimensionMismatch {
                context: format!("mapping into frame {to}"),
                expected: to_axes,
                found: mapping.nout(),
            });
        }
        self.edges.push(Edge { from, to, mapping });
        Ok(())
    }

    /// The simplified mapping along the shortest available chain between
    /// two frames
    pub fn find_path(&self, from: usize, to: usize) -> Result<Mapping> {
        self.frame(from)?;
        let target = self.frame(to)?;
        if from == to {
            return Ok(Mapping::unit(target.naxes()));
        }
        let chain = self.search(from, to)?;
        log::debug!(
            "path from frame {from} to frame {to} uses {} edge(s)",
            chain.len()
        );
        let mut iter = chain.into_iter();
        let mut acc = match iter.next() {
            Some(m) => m,
            None => Mapping::unit(target.naxes()),
        };
        for m in iter {
            acc = Mapping::series(&acc, &m)?;
        }
        Ok(acc.simplify())
    }

    /// The mapping from the base frame to the current frame
    pub fn base_to_current(&self) -> Result<Mapping> {
        self.find_path(self.base, self.current)
    }

    /// Breadth-first search returning the chain of (possibly inverted)
    /// edge mappings from `from` to `to`
    fn search(&self, from: usize, to: usize) -> Result<Vec<Mapping>> {
        let n = self.frames.len();
        let mut visited = vec![false; n + 1];
        let mut parent: Vec<Option<(usize, Mapping)>> = vec![None; n + 1];
        let mut queue = std::collections::VecDeque::new();
        visited[from] = true;
        queue.push_back(from);
        'outer: while let Some(node) = queue.pop_front() {
            for edge in &self.edges {
                let step = if edge.from == node && edge.mapping.has_forward() {
                    Some((edge.to, edge.mapping.clone()))
                } else if edge.to == node && edge.mapping.has_inverse() {
                    Some((edge.from, edge.mapping.invert()))
                } else {
                    None
                };
                if let Some((next, mapping)) = step {
                    if visited[next] || self.frames[next - 1].is_none() {
                        continue;
                    }
                    visited[next] = true;
                    parent[next] = Some((node, mapping));
                    if next == to {
                        break 'outer;
                    }
                    queue.push_back(next);
                }
            }
        }
        if !visited[to] {
            return Err(WcsError::NoPath { from, to });
        }
        let mut chain = Vec::new();
        let mut node = to;
        while node != from {
            let (prev, mapping) = parent[node]
                .take()
                .ok_or(WcsError::NoPath { from, to })?;
            chain.push(mapping);
            node = prev;
        }
        chain.reverse();
        Ok(chain)
    }

    /// Redefine the coordinates of one frame
    ///
    /// `mapping` converts the frame's old coordinates into its new ones;
    /// every incident edge is recomposed to preserve all other frames'
    /// relationships. Edges leaving the frame need the mapping's inverse.
    pub fn remap_frame(&mut self, index: usize, mapping: Mapping) -> Result<()> {
        let naxes = self.frame(index)?.naxes();
        if mapping.nin() != naxes || mapping.nout() != naxes {
            return Err(WcsError::DimensionMismatch {
                context: format!("remapping frame {index}"),
                expected: naxes,
                found: mapping.nin(),
            });
        }
        let needs_inverse = self.edges.iter().any(|e| e.from == index);
        if needs_inverse && !mapping.has_inverse() {
            return Err(WcsError::NoInverse {
                class: mapping.kind_class().to_string(),
                direction: "inverse",
            });
        }
        let inverse = mapping.invert();
        for edge in &mut self.edges {
            if edge.to == index {
                edge.mapping = Mapping::series(&edge.mapping, &mapping)?;
            }
            if edge.from == index {
                edge.mapping = Mapping::series(&inverse, &edge.mapping)?;
            }
        }
        Ok(())
    }

    /// Remove a frame, rejecting removals that would break the
    /// base↔current invariant
    pub fn remove_frame(&mut self, index: usize) -> Result<()> {
        self.frame(index)?;
        if index == self.base || index == self.current {
            return Err(WcsError::WouldDisconnect { index });
        }
        // Try the removal on a scratch copy and verify connectivity
        let mut trial = self.clone();
        trial.frames[index - 1] = None;
        trial.edges.retain(|e| e.from != index && e.to != index);
        if trial.base != trial.current && trial.search(trial.base, trial.current).is_err() {
            return Err(WcsError::WouldDisconnect { index });
        }
        self.frames = trial.frames;
        self.edges = trial.edges;
        Ok(())
    }

    /// Structural equality ignoring identity attributes
    pub fn same_as(&self, other: &FrameSet) -> bool {
        if self.base != other.base
            || self.current != other.current
            || self.frames.len() != other.frames.len()
            || self.edges.len() != other.edges.len()
        {
            return false;
        }
        let frames_match = self
            .frames
            .iter()
            .zip(&other.frames)
            .all(|(a, b)| match (a, b) {
                (None, None) => true,
                (Some(fa), Some(fb)) => fa.same_as(fb),
                _ => false,
            });
        frames_match
            && self.edges.iter().zip(&other.edges).all(|(a, b)| {
                a.from == b.from && a.to == b.to && a.mapping.same_as(&b.mapping)
            })
    }

    /// Highest frame index ever allocated (tombstones included); used by
    /// the channel layer to reproduce the arena exactly
    pub fn arena_len(&self) -> usize {
        self.frames.len()
    }

    /// Slot access including tombstones, for serialization
    pub fn slot(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index.wrapping_sub(1)).and_then(|s| s.as_ref())
    }

    /// Rebuild from raw parts; used by the channel layer
    pub(crate) fn from_parts(
        frames: Vec<Option<Frame>>,
        edges: Vec<Edge>,
        base: usize,
        current: usize,
    ) -> Result<Self> {
        let fs = Self {
            frames,
            edges,
            base,
            current,
            id: None,
        };
        fs.frame(fs.base)?;
        fs.frame(fs.current)?;
        Ok(fs)
    }
}

impl Object for FrameSet {
    fn class_name(&self) -> &'static str {
        "FrameSet"
    }

    fn get_attr(&self, name: &str) -> Result<AttrValue> {
        match name {
            "Class" => Ok(AttrValue::Str(self.class_name().to_string())),
            "ID" => Ok(AttrValue::Str(self.id.clone().unwrap_or_default())),
            "Nframe" => Ok(AttrValue::Int(self.nframe() as i64)),
            "Base" => Ok(AttrValue::Int(self.base as i64)),
            "Current" => Ok(AttrValue::Int(self.current as i64)),
            // Frame attributes are served by the current frame
            _ => self.frame(self.current)?.get_attr(name).map_err(|e| match e {
                WcsError::UnknownAttribute { name, .. } => {
                    WcsError::unknown_attr("FrameSet", name)
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
            "Base" => {
                let v = AttrValue::parse(name, AttrKind::Int, value)?;
                let index = v.as_int().unwrap_or(0);
                self.set_base(index.try_into().unwrap_or(0))
            }
            "Current" => {
                let v = AttrValue::parse(name, AttrKind::Int, value)?;
                let index = v.as_int().unwrap_or(0);
                self.set_current(index.try_into().unwrap_or(0))
            }
            "Class" | "Nframe" => Err(WcsError::ReadOnlyAttribute {
                class: "FrameSet".to_string(),
                name: name.to_string(),
            }),
            _ => {
                let current = self.current;
                self.frame_mut(current)?.set_attr(name, value).map_err(|e| match e {
                    WcsError::UnknownAttribute { name, .. } => {
                        WcsError::unknown_attr("FrameSet", name)
                    }
                    other => other,
                })
            }
        }
    }

    fn attr_is_set(&self, name: &str) -> bool {
        match name {
            "ID" => self.id.is_some(),
            "Base" | "Current" | "Nframe" | "Class" => false,
            _ => self
                .frame(self.current)
                .map(|f| f.attr_is_set(name))
                .unwrap_or(false),
        }
    }

    fn clear_attr(&mut self, name: &str) -> Result<()> {
        match name {
            "ID" => {
                self.id = None;
                Ok(())
            }
            _ => {
                let current = self.current;
                self.frame_mut(current)?.clear_attr(name)
            }
        }
    }
}
