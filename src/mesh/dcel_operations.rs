use hashbrown::HashMap;
use smallvec::SmallVec;

use super::dcel::{Dcel, EdgeEntry, FaceEntry, HalfEdgeEntry, VertexEntry};
use super::handles::*;
use super::MeshError;
use crate::HasPosition;

fn placeholder_entry() -> HalfEdgeEntry {
    HalfEdgeEntry {
        next: FixedDirectedEdgeHandle::new(0),
        prev: FixedDirectedEdgeHandle::new(0),
        face: OUTER_FACE,
        vertex: FixedVertexHandle::new(0),
    }
}

fn validate_input<V: HasPosition>(vertices: &[V], faces: &[[usize; 3]]) -> Result<(), MeshError> {
    if faces.is_empty() {
        return Err(MeshError::EmptyMesh);
    }
    // Every half-edge index must fit into an u32.
    if faces.len().saturating_mul(6) > u32::MAX as usize || vertices.len() > u32::MAX as usize {
        return Err(MeshError::TooManyElements);
    }

    if let Some(vertex) = vertices.iter().position(|v| !v.position().is_finite()) {
        return Err(MeshError::NonFiniteCoordinate { vertex });
    }

    for (face, indices) in faces.iter().enumerate() {
        if let Some(index) = indices.iter().copied().find(|i| *i >= vertices.len()) {
            return Err(MeshError::IndexOutOfRange {
                face,
                index,
                num_vertices: vertices.len(),
            });
        }
        let [a, b, c] = *indices;
        if a == b || b == c || a == c {
            return Err(MeshError::RepeatedVertex { face });
        }
    }
    Ok(())
}

/// Builds a mesh from counterclockwise index triples.
///
/// Inner half-edges are created face by face. The first face to use a vertex pair creates the
/// half-edge pair, the opposite face claims the second half. Half-edges that are never
/// claimed form the border and are linked into the outer face's loop afterwards.
pub fn from_faces<V: HasPosition>(
    vertices: Vec<V>,
    faces: &[[usize; 3]],
) -> Result<Dcel<V>, MeshError> {
    validate_input(&vertices, faces)?;

    let mut edges: Vec<EdgeEntry> = Vec::with_capacity(faces.len() * 3 / 2 + 2);
    let mut claimed: Vec<[bool; 2]> = Vec::with_capacity(edges.capacity());
    let mut in_edges: Vec<Option<FixedDirectedEdgeHandle>> = vec![None; vertices.len()];
    let mut face_entries = Vec::with_capacity(faces.len() + 1);
    let mut half_edges_by_vertices: HashMap<(usize, usize), FixedDirectedEdgeHandle> =
        HashMap::with_capacity(faces.len() * 3);

    // Placeholder, the outer face is connected once the border is known
    face_entries.push(FaceEntry {
        adjacent_edge: FixedDirectedEdgeHandle::new(0),
    });

    for (face_index, indices) in faces.iter().enumerate() {
        let face = FixedFaceHandle::new(face_index + 1);
        let mut face_edges: SmallVec<[FixedDirectedEdgeHandle; 3]> = SmallVec::new();

        for k in 0..3 {
            let (from, to) = (indices[k], indices[(k + 1) % 3]);
            if half_edges_by_vertices.contains_key(&(from, to)) {
                return Err(MeshError::DuplicateEdge { from, to });
            }

            let handle = match half_edges_by_vertices.get(&(to, from)) {
                Some(opposite) => opposite.rev(),
                None => {
                    let handle = FixedDirectedEdgeHandle::new_normalized(edges.len());
                    let mut entry = placeholder_entry();
                    // The unclaimed half keeps pointing towards `from`
                    entry.vertex = FixedVertexHandle::new(from);
                    edges.push(EdgeEntry::new(placeholder_entry(), entry));
                    claimed.push([false; 2]);
                    handle
                }
            };
            half_edges_by_vertices.insert((from, to), handle);
            claimed[handle.as_undirected().index()][handle.normalize_index()] = true;
            face_edges.push(handle);
        }

        for k in 0..3 {
            let handle = face_edges[k];
            let entry = &mut edges[handle.as_undirected().index()].entries[handle.normalize_index()];
            entry.next = face_edges[(k + 1) % 3];
            entry.prev = face_edges[(k + 2) % 3];
            entry.face = face;
            entry.vertex = FixedVertexHandle::new(indices[(k + 1) % 3]);
            in_edges[indices[(k + 1) % 3]] = Some(handle);
        }

        face_entries.push(FaceEntry {
            adjacent_edge: face_edges[0],
        });
    }

    let mut dcel_vertices = Vec::with_capacity(vertices.len());
    for (index, (data, in_edge)) in vertices.into_iter().zip(in_edges).enumerate() {
        let in_edge = in_edge.ok_or(MeshError::IsolatedVertex { vertex: index })?;
        dcel_vertices.push(VertexEntry { data, in_edge });
    }

    let mut dcel = Dcel {
        vertices: dcel_vertices,
        faces: face_entries,
        edges,
    };

    connect_border(&mut dcel, &claimed)?;
    check_vertex_fans(&dcel)?;

    let value = dcel.euler_characteristic();
    if value != 2 {
        return Err(MeshError::EulerCharacteristic { value });
    }
    Ok(dcel)
}

/// Links all unclaimed half-edges into the loop of the outer face.
fn connect_border<V>(dcel: &mut Dcel<V>, claimed: &[[bool; 2]]) -> Result<(), MeshError> {
    let border: Vec<FixedDirectedEdgeHandle> = claimed
        .iter()
        .enumerate()
        .filter_map(|(index, [_, second_claimed])| {
            // The normalized half is always claimed by the face that created the pair
            (!second_claimed).then(|| FixedDirectedEdgeHandle::new_normalized(index).rev())
        })
        .collect();

    let first = *border.first().ok_or(MeshError::MissingBoundary)?;

    let mut border_by_origin: HashMap<FixedVertexHandle, FixedDirectedEdgeHandle> =
        HashMap::with_capacity(border.len());
    for edge in &border {
        let origin = dcel.origin(*edge);
        if border_by_origin.insert(origin, *edge).is_some() {
            return Err(MeshError::NonManifoldVertex {
                vertex: origin.index(),
            });
        }
    }

    for edge in &border {
        let head = dcel.vertex(*edge);
        let next = *border_by_origin
            .get(&head)
            .ok_or(MeshError::NonManifoldVertex {
                vertex: head.index(),
            })?;
        dcel.half_edge_mut(*edge).next = next;
        dcel.half_edge_mut(next).prev = *edge;
    }

    dcel.faces[OUTER_FACE.index()].adjacent_edge = first;
    Ok(())
}

/// Checks that the half-edges around every vertex form a single cycle.
fn check_vertex_fans<V>(dcel: &Dcel<V>) -> Result<(), MeshError> {
    let mut in_degree = vec![0usize; dcel.num_vertices()];
    for edge in dcel.fixed_directed_edges() {
        in_degree[dcel.vertex(edge).index()] += 1;
    }

    for vertex in dcel.fixed_vertices() {
        if dcel.incident_edges(vertex).len() != in_degree[vertex.index()] {
            return Err(MeshError::NonManifoldVertex {
                vertex: vertex.index(),
            });
        }
    }
    Ok(())
}

/// Replaces an edge by the other diagonal of its quadrilateral.
///
/// Given the half-edge `p -> q` with the triangles `p, q, r` to its left and `q, p, s` to its
/// right, the returned half-edge points from `r` to `s`. It keeps the handle of the flipped
/// half-edge and the face `p, q, r` now becomes `r, s, q`.
///
/// Neither the edge's border status nor the convexity of the quad are checked.
pub(crate) fn flip_edge<V>(
    dcel: &mut Dcel<V>,
    e: FixedDirectedEdgeHandle,
) -> FixedDirectedEdgeHandle {
    let e_entry = *dcel.half_edge(e);
    let en = e_entry.next;
    let ep = e_entry.prev;
    let e_face = e_entry.face;
    let e_vertex = e_entry.vertex;

    let t = e.rev();
    let t_entry = *dcel.half_edge(t);
    let tn = t_entry.next;
    let tp = t_entry.prev;
    let t_face = t_entry.face;
    let t_vertex = t_entry.vertex;

    dcel.half_edge_mut(en).next = e;
    dcel.half_edge_mut(en).prev = tp;
    dcel.half_edge_mut(e).next = tp;
    dcel.half_edge_mut(e).prev = en;
    dcel.half_edge_mut(e).vertex = dcel.half_edge(tn).vertex;
    dcel.half_edge_mut(tp).next = en;
    dcel.half_edge_mut(tp).prev = e;
    dcel.half_edge_mut(tp).face = e_face;

    dcel.half_edge_mut(tn).next = t;
    dcel.half_edge_mut(tn).prev = ep;
    dcel.half_edge_mut(t).next = ep;
    dcel.half_edge_mut(t).prev = tn;
    dcel.half_edge_mut(t).vertex = dcel.half_edge(en).vertex;
    dcel.half_edge_mut(ep).next = tn;
    dcel.half_edge_mut(ep).prev = t;
    dcel.half_edge_mut(ep).face = t_face;

    dcel.vertices[e_vertex.index()].in_edge = tp;
    dcel.vertices[t_vertex.index()].in_edge = ep;

    dcel.faces[e_face.index()].adjacent_edge = e;
    dcel.faces[t_face.index()].adjacent_edge = t;
    e
}
