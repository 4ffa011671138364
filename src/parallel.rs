//! Parallel point-batch transforms (enabled by the `parallel` feature)
//!
//! Splits a point set into chunks and transforms them on the rayon thread
//! pool. Useful for the expensive kinds (projections, polynomials) on
//! large batches; the cheap linear kinds rarely benefit.

use rayon::prelude::*;

use crate::mapping::{Mapping, PointSet};
use crate::Result;

/// Minimum points per chunk; below this the split overhead dominates
const MIN_CHUNK: usize = 1024;

/// Transform a batch of points in parallel chunks
///
/// Semantics are identical to [`Mapping::transform`], including bad-value
/// propagation and the `NoInverse`/`DimensionMismatch` failures.
pub fn transform_parallel(
    mapping: &Mapping,
    points: &PointSet,
    forward: bool,
) -> Result<PointSet> {
    let npoint = points.npoint();
    if npoint <= MIN_CHUNK {
        return mapping.transform(points, forward);
    }
    let nin = points.naxes();
    let nchunk = npoint.div_ceil(MIN_CHUNK);

    let chunks: Vec<PointSet> = (0..nchunk)
        .map(|c| {
            let lo = c * MIN_CHUNK;
            let hi = ((c + 1) * MIN_CHUNK).min(npoint);
            let axes: Vec<Vec<f64>> = (0..nin)
                .map(|a| points.axis(a)[lo..hi].to_vec())
                .collect();
            PointSet::from_axes(&axes)
        })
        .collect::<Result<_>>()?;

    let results: Vec<PointSet> = chunks
        .par_iter()
        .map(|chunk| mapping.transform(chunk, forward))
        .collect::<Result<_>>()?;

    let nout = results[0].naxes();
    let axes: Vec<Vec<f64>> = (0..nout)
        .map(|a| {
            let mut axis = Vec::with_capacity(npoint);
            for r in &results {
                axis.extend_from_slice(r.axis(a));
            }
            axis
        })
        .collect();
    PointSet::from_axes(&axes)
}
