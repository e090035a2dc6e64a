use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    FixedDirectedEdgeHandle, HasPosition, MeshError, Point2, PredicateError, Triangulation,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The local test an edge must pass to be kept.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde")
)]
pub enum DelaunayCriterion {
    /// An edge is kept unless the opposite vertex lies strictly inside the circumcircle of one
    /// of its triangles.
    ///
    /// Co-circular configurations are left as they are. The result is *a* Delaunay
    /// triangulation, which may not be unique.
    #[default]
    Standard,
    /// Like [DelaunayCriterion::Standard], but co-circular ties are broken in favor of the
    /// diagonal aligned more closely with `u`, then with `v`.
    ///
    /// If `u` and `v` are linearly independent, the result is unique.
    PreferredDirections {
        /// The primary direction.
        u: Point2<f64>,
        /// The secondary direction.
        v: Point2<f64>,
    },
}

/// Controls how [Triangulation::make_delaunay] repairs a mesh.
///
/// The following parameters will be used by `Self::default` and [Self::new]:
/// * `criterion`: [DelaunayCriterion::Standard]
/// * `max_flips`: disabled - the repair runs until no flippable edge violates the criterion
///
/// # Example
///
/// ```
/// use rift::{Point2, RepairParameters, Triangulation};
///
/// let vertices = vec![
///     Point2::new(-1.0, -1.0),
///     Point2::new(1.0, -1.0),
///     Point2::new(1.0, 1.0),
///     Point2::new(-1.0, 1.0),
/// ];
/// let mut triangulation = Triangulation::from_faces(vertices, &[[0, 1, 2], [0, 2, 3]])?;
///
/// let params = RepairParameters::new()
///     .with_preferred_directions(Point2::new(1.0, 0.0), Point2::new(1.0, 1.0))
///     .with_max_flips(100);
/// let result = triangulation.make_delaunay(&params)?;
/// assert_eq!(result.flips, 0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde")
)]
pub struct RepairParameters {
    criterion: DelaunayCriterion,
    max_flips: Option<u64>,
}

impl RepairParameters {
    /// Creates a new set of `RepairParameters`.
    ///
    /// Refer to the [struct definition](Self) for more information.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the local test used to decide if an edge gets flipped.
    pub fn with_criterion(mut self, criterion: DelaunayCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Breaks co-circular ties with the given preferred directions.
    ///
    /// Shorthand for [DelaunayCriterion::PreferredDirections].
    pub fn with_preferred_directions(self, u: Point2<f64>, v: Point2<f64>) -> Self {
        self.with_criterion(DelaunayCriterion::PreferredDirections { u, v })
    }

    /// Aborts the repair with [FlipError::FlipLimitExceeded] once more than `max_flips` flips
    /// would be required.
    ///
    /// A correct criterion always terminates. The limit guards against inputs for which this
    /// does not hold, such as meshes with geometrically inverted triangles.
    pub fn with_max_flips(mut self, max_flips: u64) -> Self {
        self.max_flips = Some(max_flips);
        self
    }

    /// Returns the configured criterion.
    pub fn criterion(&self) -> DelaunayCriterion {
        self.criterion
    }

    /// Returns the configured flip limit, if any.
    pub fn max_flips(&self) -> Option<u64> {
        self.max_flips
    }
}

/// Returned by [Triangulation::make_delaunay] if the repair could not be completed.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FlipError {
    /// A geometric predicate rejected its input.
    #[error(transparent)]
    Predicate(#[from] PredicateError),
    /// The mesh could not be modified.
    #[error(transparent)]
    Mesh(#[from] MeshError),
    /// More flips than allowed by [RepairParameters::with_max_flips] were required.
    #[error("the repair exceeded its limit of {limit} flips")]
    FlipLimitExceeded {
        /// The configured limit.
        limit: u64,
    },
}

/// Statistics of a completed repair.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde")
)]
pub struct FlipResult {
    /// The number of edges visited during the initial scan.
    pub edges_scanned: u64,
    /// The number of edges put onto the worklist by the initial scan.
    pub initial_candidates: u64,
    /// The number of edges taken from the worklist.
    pub worklist_pops: u64,
    /// The number of performed flips.
    pub flips: u64,
    /// The largest worklist length observed.
    pub max_worklist_len: u64,
}

/// The phase of a [FlipEngine].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FlipEngineState {
    /// Collecting the initial candidates. Holds the next edge index to visit.
    Scanning {
        /// Index of the next undirected edge to visit.
        next_edge: usize,
    },
    /// Flipping edges until the worklist is empty.
    Repairing,
    /// The triangulation satisfies the criterion.
    Done,
}

/// A resumable edge flip loop.
///
/// [Triangulation::make_delaunay] is the usual entry point. The engine can also be driven
/// manually with [FlipEngine::step], e.g. to inspect the mesh between flips.
///
/// Candidates are processed in last-in first-out order.
pub struct FlipEngine<'a, V> {
    triangulation: &'a mut Triangulation<V>,
    params: RepairParameters,
    worklist: Vec<FixedDirectedEdgeHandle>,
    state: FlipEngineState,
    result: FlipResult,
}

impl<'a, V: HasPosition> FlipEngine<'a, V> {
    /// Creates a new engine in the [FlipEngineState::Scanning] state.
    pub fn new(triangulation: &'a mut Triangulation<V>, params: &RepairParameters) -> Self {
        let capacity = triangulation.dcel().num_undirected_edges();
        Self {
            triangulation,
            params: *params,
            worklist: Vec::with_capacity(capacity),
            state: FlipEngineState::Scanning { next_edge: 0 },
            result: FlipResult::default(),
        }
    }

    /// The current phase.
    pub fn state(&self) -> FlipEngineState {
        self.state
    }

    /// The number of edges waiting to be checked.
    pub fn worklist_len(&self) -> usize {
        self.worklist.len()
    }

    /// Statistics collected so far.
    pub fn result(&self) -> FlipResult {
        self.result
    }

    /// The triangulation being repaired.
    pub fn triangulation(&self) -> &Triangulation<V> {
        self.triangulation
    }

    fn push(&mut self, edge: FixedDirectedEdgeHandle) {
        self.worklist.push(edge);
        self.result.max_worklist_len = self.result.max_worklist_len.max(self.worklist.len() as u64);
    }

    /// Performs a single unit of work.
    ///
    /// While scanning, this visits one edge. While repairing, this pops one edge and flips it
    /// if required. Returns the state after the step.
    pub fn step(&mut self) -> Result<FlipEngineState, FlipError> {
        match self.state {
            FlipEngineState::Scanning { next_edge } => self.scan(next_edge)?,
            FlipEngineState::Repairing => self.repair()?,
            FlipEngineState::Done => {}
        }
        Ok(self.state)
    }

    fn scan(&mut self, next_edge: usize) -> Result<(), FlipError> {
        let dcel = self.triangulation.dcel();
        if next_edge >= dcel.num_undirected_edges() {
            tracing::debug!(
                "[repair] scanned {} edges, {} candidates",
                self.result.edges_scanned,
                self.result.initial_candidates
            );
            self.state = FlipEngineState::Repairing;
            return Ok(());
        }

        let edge = FixedDirectedEdgeHandle::new_normalized(next_edge);
        self.result.edges_scanned += 1;
        if self.triangulation.is_flippable(edge)? {
            self.result.initial_candidates += 1;
            self.push(edge);
        }
        self.state = FlipEngineState::Scanning {
            next_edge: next_edge + 1,
        };
        Ok(())
    }

    fn repair(&mut self) -> Result<(), FlipError> {
        let Some(edge) = self.worklist.pop() else {
            self.state = FlipEngineState::Done;
            return Ok(());
        };
        self.result.worklist_pops += 1;

        if !self.triangulation.is_flippable(edge)?
            || self
                .triangulation
                .is_locally_delaunay(edge, &self.params.criterion)?
        {
            return Ok(());
        }

        if let Some(limit) = self.params.max_flips {
            if self.result.flips >= limit {
                tracing::warn!(
                    "[repair] flip limit of {} reached with {} edges left on the worklist",
                    limit,
                    self.worklist.len() + 1
                );
                return Err(FlipError::FlipLimitExceeded { limit });
            }
        }

        let flipped = self.triangulation.flip_flippable_edge(edge);
        self.result.flips += 1;

        let dcel = self.triangulation.dcel();
        tracing::trace!(
            "[repair] flip #{}: new diagonal {} -> {}",
            self.result.flips,
            dcel.origin(flipped).index(),
            dcel.vertex(flipped).index()
        );

        let rev = flipped.rev();
        let sides: SmallVec<[FixedDirectedEdgeHandle; 4]> = SmallVec::from_buf([
            dcel.next(flipped),
            dcel.next(dcel.next(flipped)),
            dcel.next(rev),
            dcel.next(dcel.next(rev)),
        ]);
        for side in sides {
            self.push(side);
        }
        Ok(())
    }

    /// Runs the engine until the worklist is exhausted.
    pub fn run(mut self) -> Result<FlipResult, FlipError> {
        tracing::debug!(
            "[repair] starting: vertices={}, edges={}, criterion={:?}",
            self.triangulation.dcel().num_vertices(),
            self.triangulation.dcel().num_undirected_edges(),
            self.params.criterion
        );
        while self.step()? != FlipEngineState::Done {}
        tracing::debug!(
            "[repair] finished: pops={}, flips={}, max_worklist_len={}",
            self.result.worklist_pops,
            self.result.flips,
            self.result.max_worklist_len
        );
        Ok(self.result)
    }
}
