//! # Rift
//!
//! Robust geometric predicates and flip-based Delaunay repair for 2D triangle meshes.
//!
//! # Features
//! * Filtered predicates: [Kernel] evaluates orientation, in-circle and preferred-direction
//!   tests with interval arithmetic and falls back to exact rational arithmetic whenever the
//!   interval result is ambiguous. Predicates never return a wrong sign.
//! * A half-edge mesh ([Dcel]) built from a vertex list and counterclockwise index triples.
//! * Edge flips that keep all handles valid ([Triangulation::flip_edge]).
//! * Repair of an arbitrary triangulation into a Delaunay triangulation
//!   ([Triangulation::make_delaunay]), optionally breaking co-circular ties with preferred
//!   directions to obtain a unique result.
//!
//! # Example
//! ```
//! use rift::{Point2, RepairParameters, Triangulation};
//!
//! let vertices = vec![
//!     Point2::new(-1.0, -1.0),
//!     Point2::new(1.0, -1.0),
//!     Point2::new(1.0, 1.0),
//!     Point2::new(-1.0, 1.0),
//!     Point2::new(0.2, -0.1),
//! ];
//! let faces = [[0, 2, 3], [0, 1, 4], [1, 2, 4], [2, 0, 4]];
//!
//! let mut triangulation = Triangulation::from_faces(vertices, &faces)?;
//! let result = triangulation.make_delaunay(&RepairParameters::new())?;
//! assert_eq!(result.flips, 1);
//!
//! let (_, repaired) = triangulation.dcel().to_face_list();
//! assert!(repaired.iter().all(|face| face.contains(&4)));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Statistics
//! Every [Kernel] counts how often each predicate was evaluated and how often the exact
//! fallback was required. The counters are plain [Cell](std::cell::Cell)s: a kernel, and thus
//! a [Triangulation], can be moved to another thread but not shared between threads.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod flip;
mod interval;
mod kernel;
mod mesh;
mod point;
mod triangulation;

#[cfg(test)]
mod test_utilities;

pub use crate::flip::{
    DelaunayCriterion, FlipEngine, FlipEngineState, FlipError, FlipResult, RepairParameters,
};
pub use crate::interval::{
    Filtered, Interval, IntervalCounts, IntervalReal, IntervalStatistics, Sign,
};
pub use crate::kernel::{
    Kernel, KernelCounts, KernelStatistics, Orientation, OrientedSide, PredicateCounts,
    PredicateError,
};
pub use crate::mesh::{
    Dcel, DirectedEdgeHandle, FixedDirectedEdgeHandle, FixedFaceHandle, FixedUndirectedEdgeHandle,
    FixedVertexHandle, MeshError, OUTER_FACE,
};
pub use crate::point::{HasPosition, Point2, RiftNum};
pub use crate::triangulation::Triangulation;

/// Handle types and their type tags.
///
/// The fixed handle type definitions are also exported at the crate root.
pub mod handles {
    pub use crate::mesh::{
        DirectedEdgeTag, FaceTag, FixedHandleImpl, UndirectedEdgeTag, VertexTag,
    };
}
