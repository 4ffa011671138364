// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! ferro-wcs: world coordinate system transformation engine
//!
//! Part of the ferro toolkit.
//!
//! A library for describing, composing, inverting, simplifying and
//! serializing mappings between multi-dimensional coordinate systems:
//!
//! - [`mapping`] — composable transforms with forward/inverse application,
//!   series/parallel combination and structural simplification
//! - [`frame`] — axis semantics and the frame-graph ([`frame::FrameSet`])
//!   with path discovery between any two frames
//! - [`region`] — sub-volumes of coordinate space with containment tests
//!   and boolean combination
//! - [`channel`] — serialization of whole object graphs to three
//!   encodings (native text, legacy header cards, markup)
//!
//! # Example
//!
//! ```
//! use ferro_wcs::frame::{Frame, FrameSet};
//! use ferro_wcs::mapping::Mapping;
//!
//! // A pixel frame connected to a sky frame by scale-then-offset
//! let mut fs = FrameSet::new(Frame::new(2));
//! let to_sky = Mapping::series(
//!     &Mapping::zoom(2, 0.5),
//!     &Mapping::shift(vec![82.0, -5.5]),
//! ).unwrap();
//! let sky = fs.add_frame(1, to_sky, Frame::new(2)).unwrap();
//!
//! let path = fs.find_path(1, sky).unwrap();
//! let coords = path.transform_point(&[100.0, 200.0], true).unwrap();
//! assert_eq!(coords, vec![132.0, 94.5]);
//! ```

pub mod cache;
pub mod channel;
pub mod config;
pub mod error;
pub mod frame;
pub mod mapping;
pub mod object;
#[cfg(feature = "parallel")]
pub mod parallel;
pub mod region;

// Re-export commonly used types
pub use channel::{Channel, Encoding};
pub use error::{ErrorCode, WcsError};
pub use frame::{Frame, FrameSet, System};
pub use mapping::{Mapping, PointSet, ProjKind, BAD};
pub use object::{AttrValue, Object, Shared, WcsObject};
pub use region::{Region, RegionOper};

/// Result type alias for ferro-wcs operations
pub type Result<T> = std::result::Result<T, WcsError>;
