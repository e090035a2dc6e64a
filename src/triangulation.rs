use crate::flip::{DelaunayCriterion, FlipEngine, FlipError, FlipResult, RepairParameters};
use crate::mesh::dcel_operations;
use crate::{
    Dcel, FixedDirectedEdgeHandle, HasPosition, Kernel, MeshError, Orientation, Point2,
    PredicateError,
};

/// A triangle mesh together with the kernel used to evaluate its geometry.
///
/// The triangulation owns its [Dcel] and a [Kernel]. All geometric decisions, such as whether
/// an edge can be flipped, go through the kernel and are therefore exact. The kernel's
/// counters can be inspected with [Triangulation::kernel].
///
/// # Example
/// ```
/// use rift::{Point2, RepairParameters, Triangulation};
///
/// let vertices = vec![
///     Point2::new(-2.0, 0.0),
///     Point2::new(0.0, -0.5),
///     Point2::new(2.0, 0.0),
///     Point2::new(0.0, 0.5),
/// ];
/// // The long diagonal is not Delaunay
/// let mut triangulation = Triangulation::from_faces(vertices, &[[0, 1, 2], [0, 2, 3]])?;
/// let result = triangulation.make_delaunay(&RepairParameters::new())?;
/// assert_eq!(result.flips, 1);
///
/// let (_, faces) = triangulation.dcel().to_face_list();
/// assert!(faces.iter().all(|face| face.contains(&1) && face.contains(&3)));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct Triangulation<V = Point2<f64>> {
    dcel: Dcel<V>,
    kernel: Kernel,
}

impl<V: HasPosition> Triangulation<V> {
    /// Builds a triangulation from vertex payloads and counterclockwise index triples.
    ///
    /// See [Dcel::from_faces] for the topological requirements on the input. Additionally,
    /// every face must be a proper counterclockwise triangle. Clockwise or degenerate faces
    /// are rejected with [MeshError::NotCounterclockwise].
    pub fn from_faces(vertices: Vec<V>, faces: &[[usize; 3]]) -> Result<Self, MeshError> {
        Self::from_dcel(Dcel::from_faces(vertices, faces)?)
    }

    /// Wraps an existing mesh.
    ///
    /// Fails with [MeshError::NotCounterclockwise] if an inner face is not a proper
    /// counterclockwise triangle. The orientation tests are counted by the kernel's
    /// statistics.
    pub fn from_dcel(dcel: Dcel<V>) -> Result<Self, MeshError> {
        let triangulation = Self {
            dcel,
            kernel: Kernel::new(),
        };
        triangulation.check_face_orientations()?;
        Ok(triangulation)
    }

    fn check_face_orientations(&self) -> Result<(), MeshError> {
        for (index, face) in self.dcel.fixed_inner_faces().enumerate() {
            let [a, b, c] = self.dcel.face_vertices(face).map(|v| self.dcel.position(v));
            match self.kernel.orientation(a, b, c) {
                Ok(Orientation::LeftTurn) => {}
                Ok(_) | Err(PredicateError::CoincidentPoints) => {
                    return Err(MeshError::NotCounterclockwise { face: index });
                }
                Err(error) => return Err(error.into()),
            }
        }
        Ok(())
    }

    /// The underlying mesh.
    pub fn dcel(&self) -> &Dcel<V> {
        &self.dcel
    }

    /// The kernel evaluating all predicates of this triangulation.
    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    /// Consumes the triangulation and returns its mesh.
    pub fn into_dcel(self) -> Dcel<V> {
        self.dcel
    }

    /// Returns the counterclockwise quadrilateral around a half-edge.
    ///
    /// For the half-edge `p -> q` this returns `[p, s, q, r]`, where `r` is the third vertex of
    /// the triangle to the left and `s` the third vertex of the triangle to the right. The
    /// half-edge is the diagonal between the first and the third point.
    ///
    /// Returns `None` for border edges.
    pub fn quad(&self, edge: FixedDirectedEdgeHandle) -> Option<[Point2<f64>; 4]> {
        let dcel = &self.dcel;
        if dcel.is_border(edge) || dcel.is_border(edge.rev()) {
            return None;
        }
        let p = dcel.origin(edge);
        let q = dcel.vertex(edge);
        let r = dcel.vertex(dcel.next(edge));
        let s = dcel.vertex(dcel.next(edge.rev()));
        Some([p, s, q, r].map(|v| dcel.position(v)))
    }

    /// Returns `true` if the edge is an inner edge whose quadrilateral is strictly convex.
    pub fn is_flippable(&self, edge: FixedDirectedEdgeHandle) -> Result<bool, PredicateError> {
        match self.quad(edge) {
            Some([a, b, c, d]) => self.kernel.is_strictly_convex_quad(a, b, c, d),
            None => Ok(false),
        }
    }

    /// Evaluates the local test of a flippable edge.
    ///
    /// Border edges are always locally Delaunay. The result is meaningless if the edge's
    /// quadrilateral is not strictly convex.
    pub fn is_locally_delaunay(
        &self,
        edge: FixedDirectedEdgeHandle,
        criterion: &DelaunayCriterion,
    ) -> Result<bool, PredicateError> {
        let Some([a, b, c, d]) = self.quad(edge) else {
            return Ok(true);
        };
        match *criterion {
            DelaunayCriterion::Standard => self.kernel.is_locally_delaunay_edge(a, b, c, d),
            DelaunayCriterion::PreferredDirections { u, v } => {
                self.kernel.is_locally_pd_delaunay_edge(a, b, c, d, u, v)
            }
        }
    }

    /// Returns `true` if every flippable edge passes the local test.
    pub fn is_delaunay(&self, criterion: &DelaunayCriterion) -> Result<bool, PredicateError> {
        for edge in self.dcel.fixed_undirected_edges() {
            let edge = edge.as_directed();
            if self.is_flippable(edge)? && !self.is_locally_delaunay(edge, criterion)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Replaces an edge by the other diagonal of its quadrilateral.
    ///
    /// The flip keeps all handles valid: the returned half-edge reuses the handle of `edge`.
    /// Its `next` and `next.next` as well as the `next` and `next.next` of its opposite are
    /// the four sides of the quadrilateral.
    ///
    /// Fails with [MeshError::BorderEdge] for border edges and with [MeshError::NotConvex] if
    /// the quadrilateral is not strictly convex. The mesh is left unchanged in both cases.
    pub fn flip_edge(
        &mut self,
        edge: FixedDirectedEdgeHandle,
    ) -> Result<FixedDirectedEdgeHandle, MeshError> {
        let Some([a, b, c, d]) = self.quad(edge) else {
            return Err(MeshError::BorderEdge);
        };
        if !self.kernel.is_strictly_convex_quad(a, b, c, d)? {
            return Err(MeshError::NotConvex);
        }
        Ok(self.flip_flippable_edge(edge))
    }

    /// Flips an edge that [Self::is_flippable] has already accepted.
    pub(crate) fn flip_flippable_edge(
        &mut self,
        edge: FixedDirectedEdgeHandle,
    ) -> FixedDirectedEdgeHandle {
        dcel_operations::flip_edge(&mut self.dcel, edge)
    }

    /// Flips edges until every flippable edge passes the configured local test.
    ///
    /// Returns statistics about the run. On error, the mesh is left in a valid but only
    /// partially repaired state.
    pub fn make_delaunay(&mut self, params: &RepairParameters) -> Result<FlipResult, FlipError> {
        FlipEngine::new(self, params).run()
    }
}
