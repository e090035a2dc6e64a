use smallvec::SmallVec;

use super::handles::*;
use super::MeshError;
use crate::{HasPosition, Point2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde")
)]
pub(super) struct FaceEntry {
    pub(super) adjacent_edge: FixedDirectedEdgeHandle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde")
)]
pub(super) struct VertexEntry<V> {
    pub(super) data: V,
    /// A half-edge pointing towards this vertex.
    pub(super) in_edge: FixedDirectedEdgeHandle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde")
)]
pub(super) struct EdgeEntry {
    pub(super) entries: [HalfEdgeEntry; 2],
}

impl EdgeEntry {
    pub(super) fn new(normalized: HalfEdgeEntry, not_normalized: HalfEdgeEntry) -> Self {
        EdgeEntry {
            entries: [normalized, not_normalized],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde")
)]
pub(super) struct HalfEdgeEntry {
    pub(super) next: FixedDirectedEdgeHandle,
    pub(super) prev: FixedDirectedEdgeHandle,
    pub(super) face: FixedFaceHandle,
    /// The head vertex
    pub(super) vertex: FixedVertexHandle,
}

/// A doubly connected edge list storing a triangulated surface.
///
/// Vertices, faces and half-edge pairs are stored in flat arenas and reference each other
/// through fixed handles. The two half-edges of an edge are stored next to each other: the
/// opposite of half-edge `h` is `h ^ 1`.
///
/// Every inner face is a triangle. Face `0` is the virtual [OUTER_FACE]; all border half-edges
/// reference it and form a single closed loop.
///
/// A `Dcel` is created with [Dcel::from_faces]. Afterwards its topology only changes through
/// edge flips (see [Triangulation::flip_edge](crate::Triangulation::flip_edge)).
#[derive(Clone, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde")
)]
pub struct Dcel<V> {
    pub(super) vertices: Vec<VertexEntry<V>>,
    pub(super) faces: Vec<FaceEntry>,
    pub(super) edges: Vec<EdgeEntry>,
}

impl<V> Dcel<V> {
    pub(super) fn half_edge(&self, handle: FixedDirectedEdgeHandle) -> &HalfEdgeEntry {
        &self.edges[handle.as_undirected().index()].entries[handle.normalize_index()]
    }

    pub(super) fn half_edge_mut(&mut self, handle: FixedDirectedEdgeHandle) -> &mut HalfEdgeEntry {
        &mut self.edges[handle.as_undirected().index()].entries[handle.normalize_index()]
    }

    /// Returns the number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the number of faces, including the outer face.
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Returns the number of triangles.
    pub fn num_inner_faces(&self) -> usize {
        self.faces.len() - 1
    }

    /// Returns the number of half-edges.
    pub fn num_directed_edges(&self) -> usize {
        self.edges.len() * 2
    }

    /// Returns the number of edges.
    pub fn num_undirected_edges(&self) -> usize {
        self.edges.len()
    }

    /// The head vertex of a half-edge.
    #[inline]
    pub fn vertex(&self, handle: FixedDirectedEdgeHandle) -> FixedVertexHandle {
        self.half_edge(handle).vertex
    }

    /// The tail vertex of a half-edge.
    #[inline]
    pub fn origin(&self, handle: FixedDirectedEdgeHandle) -> FixedVertexHandle {
        self.vertex(handle.rev())
    }

    /// The opposite half-edge.
    #[inline]
    pub fn opposite(&self, handle: FixedDirectedEdgeHandle) -> FixedDirectedEdgeHandle {
        handle.rev()
    }

    /// The next half-edge around the same face.
    #[inline]
    pub fn next(&self, handle: FixedDirectedEdgeHandle) -> FixedDirectedEdgeHandle {
        self.half_edge(handle).next
    }

    /// The previous half-edge around the same face.
    #[inline]
    pub fn prev(&self, handle: FixedDirectedEdgeHandle) -> FixedDirectedEdgeHandle {
        self.half_edge(handle).prev
    }

    /// The edge a half-edge belongs to. Both half-edges of a pair map to the same edge.
    #[inline]
    pub fn edge(&self, handle: FixedDirectedEdgeHandle) -> FixedUndirectedEdgeHandle {
        handle.as_undirected()
    }

    /// The face to the left of a half-edge.
    #[inline]
    pub fn face(&self, handle: FixedDirectedEdgeHandle) -> FixedFaceHandle {
        self.half_edge(handle).face
    }

    /// Returns `true` if the half-edge is part of the outer face.
    #[inline]
    pub fn is_border(&self, handle: FixedDirectedEdgeHandle) -> bool {
        self.face(handle).is_outer()
    }

    /// Returns `true` if either half-edge of the edge is part of the outer face.
    pub fn is_border_edge(&self, edge: FixedUndirectedEdgeHandle) -> bool {
        let handle = edge.as_directed();
        self.is_border(handle) || self.is_border(handle.rev())
    }

    /// Returns a half-edge pointing towards the given vertex.
    pub fn vertex_edge(&self, vertex: FixedVertexHandle) -> FixedDirectedEdgeHandle {
        self.vertices[vertex.index()].in_edge
    }

    /// Returns a half-edge of the given face.
    pub fn face_edge(&self, face: FixedFaceHandle) -> FixedDirectedEdgeHandle {
        self.faces[face.index()].adjacent_edge
    }

    /// Returns the payload of a vertex.
    pub fn vertex_data(&self, vertex: FixedVertexHandle) -> &V {
        &self.vertices[vertex.index()].data
    }

    /// Returns a dynamic handle for chained navigation.
    pub fn directed_edge(&self, handle: FixedDirectedEdgeHandle) -> DirectedEdgeHandle<'_, V> {
        DirectedEdgeHandle::new(self, handle)
    }

    /// Iterates over all vertices.
    pub fn fixed_vertices(&self) -> impl Iterator<Item = FixedVertexHandle> {
        (0..self.num_vertices()).map(FixedVertexHandle::new)
    }

    /// Iterates over all half-edges.
    pub fn fixed_directed_edges(&self) -> impl Iterator<Item = FixedDirectedEdgeHandle> {
        (0..self.num_directed_edges()).map(FixedDirectedEdgeHandle::new)
    }

    /// Iterates over all edges.
    pub fn fixed_undirected_edges(&self) -> impl Iterator<Item = FixedUndirectedEdgeHandle> {
        (0..self.num_undirected_edges()).map(FixedUndirectedEdgeHandle::new)
    }

    /// Iterates over all faces except the outer face.
    pub fn fixed_inner_faces(&self) -> impl Iterator<Item = FixedFaceHandle> {
        (1..self.num_faces()).map(FixedFaceHandle::new)
    }

    /// Returns all half-edges pointing towards the given vertex, in clockwise order.
    pub fn incident_edges(&self, vertex: FixedVertexHandle) -> SmallVec<[FixedDirectedEdgeHandle; 8]> {
        let start = self.vertex_edge(vertex);
        let mut result = SmallVec::new();
        let mut current = start;
        loop {
            result.push(current);
            current = self.next(current).rev();
            if current == start || result.len() > self.num_directed_edges() {
                break;
            }
        }
        result
    }

    /// Returns the three vertices of an inner face in counterclockwise order.
    ///
    /// The first vertex is the tail of [Dcel::face_edge].
    pub fn face_vertices(&self, face: FixedFaceHandle) -> [FixedVertexHandle; 3] {
        let edge = self.face_edge(face);
        [
            self.origin(edge),
            self.vertex(edge),
            self.vertex(self.next(edge)),
        ]
    }

    /// Returns `V - E + F`, counting the outer face.
    ///
    /// Equals 2 for every valid mesh.
    pub fn euler_characteristic(&self) -> i64 {
        self.num_vertices() as i64 - self.num_undirected_edges() as i64 + self.num_faces() as i64
    }

    /// Checks all topological invariants of the half-edge structure.
    ///
    /// Verifies that `next` and `prev` are inverse, that every inner face is a triangle, that
    /// the face and vertex references are consistent and that the euler characteristic is 2.
    pub fn check_invariants(&self) -> Result<(), MeshError> {
        let fail = |reason: String| Err(MeshError::InconsistentTopology(reason));

        for edge in self.fixed_directed_edges() {
            let next = self.next(edge);
            let prev = self.prev(edge);
            if self.prev(next) != edge || self.next(prev) != edge {
                return fail(format!("next and prev of half-edge {} disagree", edge.index()));
            }
            if next == edge {
                return fail(format!("half-edge {} is its own successor", edge.index()));
            }
            if self.face(next) != self.face(edge) {
                return fail(format!("half-edge {} leaves its face", edge.index()));
            }
            if self.origin(next) != self.vertex(edge) {
                return fail(format!("half-edge {} is not connected", edge.index()));
            }
            if self.vertex(edge) == self.origin(edge) {
                return fail(format!("half-edge {} is a loop", edge.index()));
            }
            if !self.is_border(edge) && self.next(next) != prev {
                return fail(format!("face of half-edge {} is not a triangle", edge.index()));
            }
            if self.face(edge) == self.face(edge.rev()) {
                return fail(format!("both sides of edge {} share a face", edge.index() >> 1));
            }
        }

        for face in self.fixed_inner_faces().chain(std::iter::once(OUTER_FACE)) {
            if self.face(self.face_edge(face)) != face {
                return fail(format!("face {} references a foreign half-edge", face.index()));
            }
        }

        for vertex in self.fixed_vertices() {
            if self.vertex(self.vertex_edge(vertex)) != vertex {
                return fail(format!("vertex {} references a foreign half-edge", vertex.index()));
            }
        }

        let value = self.euler_characteristic();
        if value != 2 {
            return Err(MeshError::EulerCharacteristic { value });
        }
        Ok(())
    }
}

impl<V: HasPosition> Dcel<V> {
    /// Builds a mesh from vertex payloads and counterclockwise index triples.
    ///
    /// The triangles must form a connected, orientable surface with a single boundary loop
    /// (a topological disk). Vertex `i` of the result is `vertices[i]` and inner face `i + 1`
    /// is `faces[i]`.
    ///
    /// The geometric orientation of the triangles is not checked.
    ///
    /// # Example
    /// ```
    /// use rift::{Dcel, Point2};
    ///
    /// let vertices = vec![
    ///     Point2::new(0.0, 0.0),
    ///     Point2::new(1.0, 0.0),
    ///     Point2::new(1.0, 1.0),
    ///     Point2::new(0.0, 1.0),
    /// ];
    /// let dcel = Dcel::from_faces(vertices, &[[0, 1, 2], [0, 2, 3]])?;
    /// assert_eq!(dcel.num_inner_faces(), 2);
    /// assert_eq!(dcel.num_undirected_edges(), 5);
    /// # Ok::<(), rift::MeshError>(())
    /// ```
    pub fn from_faces(vertices: Vec<V>, faces: &[[usize; 3]]) -> Result<Self, MeshError> {
        super::dcel_operations::from_faces(vertices, faces)
    }

    /// Returns the position of a vertex.
    #[inline]
    pub fn position(&self, vertex: FixedVertexHandle) -> Point2<f64> {
        self.vertices[vertex.index()].data.position()
    }

    /// Exports the vertex positions and the counterclockwise triangles.
    ///
    /// Vertex indices equal the vertex handle indices, hence the output can be fed back
    /// into [Dcel::from_faces].
    pub fn to_face_list(&self) -> (Vec<Point2<f64>>, Vec<[usize; 3]>) {
        let positions = self.fixed_vertices().map(|v| self.position(v)).collect();
        let faces = self
            .fixed_inner_faces()
            .map(|face| self.face_vertices(face).map(|v| v.index()))
            .collect();
        (positions, faces)
    }
}

#[cfg(test)]
mod test {
    use crate::test_utilities::square_with_center;
    use crate::{Dcel, FixedVertexHandle, MeshError, Point2, OUTER_FACE};

    #[test]
    fn test_counts() {
        let (vertices, faces) = square_with_center(Point2::new(0.0, 0.0));
        let dcel = Dcel::from_faces(vertices, &faces).unwrap();
        assert_eq!(dcel.num_vertices(), 5);
        assert_eq!(dcel.num_faces(), 5);
        assert_eq!(dcel.num_inner_faces(), 4);
        assert_eq!(dcel.num_undirected_edges(), 8);
        assert_eq!(dcel.num_directed_edges(), 16);
        assert_eq!(dcel.euler_characteristic(), 2);
        dcel.check_invariants().unwrap();
    }

    #[test]
    fn test_navigation() {
        let (vertices, faces) = square_with_center(Point2::new(0.0, 0.0));
        let dcel = Dcel::from_faces(vertices, &faces).unwrap();

        for edge in dcel.fixed_directed_edges() {
            assert_eq!(dcel.opposite(dcel.opposite(edge)), edge);
            assert_eq!(dcel.next(dcel.prev(edge)), edge);
            assert_eq!(dcel.prev(dcel.next(edge)), edge);
            assert_eq!(dcel.edge(edge), dcel.edge(edge.rev()));
            assert_eq!(dcel.origin(edge), dcel.vertex(edge.rev()));
            if !dcel.is_border(edge) {
                assert_eq!(dcel.next(dcel.next(dcel.next(edge))), edge);
            }

            let dynamic = dcel.directed_edge(edge);
            assert_eq!(dynamic.next().prev(), dynamic);
            assert_eq!(dynamic.rev().to(), dynamic.from());
            assert_eq!(dynamic.face(), dcel.face(edge));
        }

        let num_border = dcel
            .fixed_directed_edges()
            .filter(|edge| dcel.is_border(*edge))
            .count();
        assert_eq!(num_border, 4);
        let num_border_edges = dcel
            .fixed_undirected_edges()
            .filter(|edge| dcel.is_border_edge(*edge))
            .count();
        assert_eq!(num_border_edges, 4);
        assert!(dcel.is_border(dcel.face_edge(OUTER_FACE)));
    }

    #[test]
    fn test_incident_edges() {
        let (vertices, faces) = square_with_center(Point2::new(0.0, 0.0));
        let dcel = Dcel::from_faces(vertices, &faces).unwrap();
        let center = FixedVertexHandle::new(4);
        let incident = dcel.incident_edges(center);
        assert_eq!(incident.len(), 4);
        for edge in &incident {
            assert_eq!(dcel.vertex(*edge), center);
        }
        let corner = FixedVertexHandle::new(0);
        assert_eq!(dcel.incident_edges(corner).len(), 3);
    }

    #[test]
    fn test_face_list_round_trip() {
        let (vertices, faces) = square_with_center(Point2::new(0.25, -0.5));
        let dcel = Dcel::from_faces(vertices.clone(), &faces).unwrap();
        let (positions, exported) = dcel.to_face_list();
        assert_eq!(positions, vertices);
        assert_eq!(exported, faces);
    }

    #[test]
    fn test_corrupted_mesh_is_detected() {
        let (vertices, faces) = square_with_center(Point2::new(0.0, 0.0));
        let mut dcel = Dcel::from_faces(vertices, &faces).unwrap();
        let edge = dcel.face_edge(crate::FixedFaceHandle::new(1));
        let next = dcel.next(edge);
        dcel.half_edge_mut(edge).next = edge;
        assert!(matches!(
            dcel.check_invariants(),
            Err(MeshError::InconsistentTopology(_))
        ));
        dcel.half_edge_mut(edge).next = next;
        dcel.check_invariants().unwrap();
    }
}
