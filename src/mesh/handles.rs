//! Handles referencing the elements of a [Dcel](super::Dcel).
//!
//! A *fixed* handle is a plain index into one of the mesh arenas. It is `Copy`, does not
//! borrow the mesh and stays valid across edge flips: flips rewire the connectivity but never
//! add, remove or renumber elements.
//!
//! A *dynamic* handle ([DirectedEdgeHandle]) additionally borrows the mesh and can be used
//! for chained navigation such as `edge.next().rev().next()`.

use std::fmt::Debug;

use super::Dcel;
use crate::{HasPosition, Point2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Returns a handle to the single outer face.
///
/// The outer face is the unbounded region around the mesh. All border half-edges reference it.
pub const OUTER_FACE: FixedFaceHandle = new_fixed_face_handle(0);

/// Internal type definition that is only exposed for documentation purposes.
///
/// Use the type definitions [FixedVertexHandle], [FixedDirectedEdgeHandle],
/// [FixedUndirectedEdgeHandle] and [FixedFaceHandle] instead.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde")
)]
pub struct FixedHandleImpl<Type> {
    index: u32,
    ty: Type,
}

impl<Type> Debug for FixedHandleImpl<Type> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixedHandle")
            .field("index", &self.index)
            .finish()
    }
}

const fn new_fixed_face_handle(index: u32) -> FixedFaceHandle {
    FixedHandleImpl { index, ty: FaceTag }
}

impl<Type: Default> FixedHandleImpl<Type> {
    /// Creates a handle from an arena index.
    ///
    /// The index must fit into an `u32`. Mesh construction ensures this for every handle it
    /// creates.
    pub(crate) fn new(index: usize) -> Self {
        debug_assert!(index <= u32::MAX as usize);
        Self {
            index: index as u32,
            ty: Type::default(),
        }
    }

    /// Returns the index of the referenced element.
    ///
    /// Indices are dense: a mesh with `n` vertices uses the vertex indices `0..n`.
    #[inline]
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde")
)]
/// Type tag of vertex handles.
pub struct VertexTag;
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde")
)]
/// Type tag of directed edge handles.
pub struct DirectedEdgeTag;
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde")
)]
/// Type tag of undirected edge handles.
pub struct UndirectedEdgeTag;
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde")
)]
/// Type tag of face handles.
pub struct FaceTag;

/// Fixed handle to a vertex.
pub type FixedVertexHandle = FixedHandleImpl<VertexTag>;

/// Fixed handle to a directed half-edge.
pub type FixedDirectedEdgeHandle = FixedHandleImpl<DirectedEdgeTag>;

/// Fixed handle to an undirected edge, i.e. a pair of opposite half-edges.
pub type FixedUndirectedEdgeHandle = FixedHandleImpl<UndirectedEdgeTag>;

/// Fixed handle to a face. Index 0 is always the [OUTER_FACE].
pub type FixedFaceHandle = FixedHandleImpl<FaceTag>;

impl FixedDirectedEdgeHandle {
    /// Returns the first half-edge of the given undirected edge.
    #[inline]
    pub(crate) fn new_normalized(index: usize) -> Self {
        Self::new(index << 1)
    }

    /// Returns if this edge is the normalized edge of a half-edge pair.
    ///
    /// Every undirected edge is represented by its normalized half-edge when iterating
    /// over edges.
    #[inline]
    pub fn is_normalized(self) -> bool {
        // The last bit stores the direction within the pair
        self.index & 0x1 == 0x0
    }

    #[inline]
    pub(crate) fn normalize_index(self) -> usize {
        self.index() & 0x1
    }

    /// Returns this half-edge with its direction reversed.
    ///
    /// Calling `rev` twice always returns the original half-edge.
    #[inline]
    pub fn rev(self) -> Self {
        Self::new(self.index() ^ 0x1)
    }

    /// Converts this half-edge into the undirected edge it belongs to.
    #[inline]
    pub fn as_undirected(self) -> FixedUndirectedEdgeHandle {
        FixedHandleImpl::new(self.index() >> 1)
    }
}

impl FixedUndirectedEdgeHandle {
    /// Returns the normalized half-edge of this edge.
    #[inline]
    pub fn as_directed(self) -> FixedDirectedEdgeHandle {
        FixedDirectedEdgeHandle::new_normalized(self.index())
    }
}

impl FixedFaceHandle {
    /// Returns `true` if this handle references the [OUTER_FACE].
    #[inline]
    pub fn is_outer(self) -> bool {
        self == OUTER_FACE
    }
}

/// A half-edge handle that borrows its mesh for navigation.
///
/// Obtained with [Dcel::directed_edge].
pub struct DirectedEdgeHandle<'a, V> {
    dcel: &'a Dcel<V>,
    handle: FixedDirectedEdgeHandle,
}

impl<'a, V> Clone for DirectedEdgeHandle<'a, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, V> Copy for DirectedEdgeHandle<'a, V> {}

impl<'a, V> PartialEq for DirectedEdgeHandle<'a, V> {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

impl<'a, V> Eq for DirectedEdgeHandle<'a, V> {}

impl<'a, V> Debug for DirectedEdgeHandle<'a, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "DirectedEdgeHandle - id: {:?} ({:?} -> {:?})",
            self.handle.index(),
            self.from().index(),
            self.to().index()
        )
    }
}

impl<'a, V> DirectedEdgeHandle<'a, V> {
    pub(super) fn new(dcel: &'a Dcel<V>, handle: FixedDirectedEdgeHandle) -> Self {
        Self { dcel, handle }
    }

    /// Converts this dynamic handle into its fixed counterpart.
    pub fn fix(&self) -> FixedDirectedEdgeHandle {
        self.handle
    }

    /// The tail vertex.
    pub fn from(&self) -> FixedVertexHandle {
        self.dcel.origin(self.handle)
    }

    /// The head vertex.
    pub fn to(&self) -> FixedVertexHandle {
        self.dcel.vertex(self.handle)
    }

    /// The opposite half-edge.
    pub fn rev(&self) -> Self {
        Self::new(self.dcel, self.handle.rev())
    }

    /// The next half-edge around the same face.
    pub fn next(&self) -> Self {
        Self::new(self.dcel, self.dcel.next(self.handle))
    }

    /// The previous half-edge around the same face.
    pub fn prev(&self) -> Self {
        Self::new(self.dcel, self.dcel.prev(self.handle))
    }

    /// The face to the left of this half-edge.
    pub fn face(&self) -> FixedFaceHandle {
        self.dcel.face(self.handle)
    }

    /// Returns `true` if this half-edge lies on the outer face.
    pub fn is_border(&self) -> bool {
        self.dcel.is_border(self.handle)
    }
}

impl<'a, V: HasPosition> DirectedEdgeHandle<'a, V> {
    /// Returns the tail and head positions.
    pub fn positions(&self) -> [Point2<f64>; 2] {
        [
            self.dcel.position(self.from()),
            self.dcel.position(self.to()),
        ]
    }
}
