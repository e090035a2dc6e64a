//! A half-edge mesh for triangulated surfaces with a single outer boundary.

mod dcel;
pub(crate) mod dcel_operations;
mod handles;

pub use dcel::Dcel;
pub use handles::{
    DirectedEdgeHandle, DirectedEdgeTag, FaceTag, FixedDirectedEdgeHandle, FixedFaceHandle,
    FixedHandleImpl, FixedUndirectedEdgeHandle, FixedVertexHandle, UndirectedEdgeTag, VertexTag,
    OUTER_FACE,
};

use thiserror::Error;

use crate::PredicateError;

/// Errors that occur when building, checking or flipping a mesh.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MeshError {
    /// The face list is empty.
    #[error("the mesh has no faces")]
    EmptyMesh,
    /// A face references a vertex that does not exist.
    #[error("face {face} references vertex {index}, but the mesh has only {num_vertices} vertices")]
    IndexOutOfRange {
        /// The offending face.
        face: usize,
        /// The offending vertex index.
        index: usize,
        /// The number of vertices.
        num_vertices: usize,
    },
    /// A face lists the same vertex more than once.
    #[error("face {face} repeats a vertex")]
    RepeatedVertex {
        /// The offending face.
        face: usize,
    },
    /// A directed edge is used by two faces.
    ///
    /// Either two adjacent faces are oriented inconsistently or more than two faces share an
    /// edge.
    #[error("the directed edge {from} -> {to} is used by more than one face")]
    DuplicateEdge {
        /// The edge's tail vertex.
        from: usize,
        /// The edge's head vertex.
        to: usize,
    },
    /// The faces around a vertex do not form a single fan.
    #[error("vertex {vertex} is not manifold")]
    NonManifoldVertex {
        /// The offending vertex.
        vertex: usize,
    },
    /// A vertex is not referenced by any face.
    #[error("vertex {vertex} is not part of any face")]
    IsolatedVertex {
        /// The offending vertex.
        vertex: usize,
    },
    /// A vertex position is NaN or infinite.
    #[error("vertex {vertex} has a non-finite coordinate")]
    NonFiniteCoordinate {
        /// The offending vertex.
        vertex: usize,
    },
    /// A face is clockwise or degenerate.
    #[error("face {face} is not oriented counterclockwise")]
    NotCounterclockwise {
        /// The offending face.
        face: usize,
    },
    /// The mesh is closed and has no border edge.
    #[error("the mesh has no boundary")]
    MissingBoundary,
    /// The mesh is not a topological disk.
    #[error("expected an euler characteristic of 2, got {value}")]
    EulerCharacteristic {
        /// The computed value of `V - E + F`, with `F` counting the outer face.
        value: i64,
    },
    /// The mesh has more elements than a handle can address.
    #[error("the mesh exceeds the maximum number of elements")]
    TooManyElements,
    /// The mesh connectivity is corrupted.
    #[error("inconsistent mesh topology: {0}")]
    InconsistentTopology(String),
    /// A border edge cannot be flipped.
    #[error("cannot flip a border edge")]
    BorderEdge,
    /// The quadrilateral around an edge is not strictly convex.
    #[error("cannot flip an edge whose quadrilateral is not strictly convex")]
    NotConvex,
    /// A geometric predicate failed.
    #[error(transparent)]
    Predicate(#[from] PredicateError),
}
