//! Robust geometric predicates.
//!
//! Every predicate is evaluated in two stages. The defining determinant is first evaluated
//! with [Interval] arithmetic on the `f64` inputs. This is cheap and conclusive for almost all
//! inputs. If any sign along the way is [Filtered::Ambiguous], the very same determinant,
//! expanded in the same cofactor order, is recomputed with exact rational arithmetic. The
//! exact stage always yields a definite answer, hence no predicate ever reports "unknown".

use std::cell::Cell;
use std::ops::{Add, Mul, Neg, Sub};

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Signed;
use thiserror::Error;

use crate::interval::{Filtered, Interval, IntervalStatistics, Sign};
use crate::Point2;

/// Describes a violated predicate precondition.
///
/// Returned instead of an answer if a predicate is called with degenerate input. Ambiguous
/// floating point results are never reported as an error.
#[derive(Copy, Clone, Debug, Error, PartialEq, Eq, Hash)]
pub enum PredicateError {
    /// Two points that must be distinct have the same coordinates.
    #[error("points that must be distinct coincide")]
    CoincidentPoints,
    /// The three points defining a circle are collinear.
    #[error("the points defining a circle are collinear")]
    CollinearPoints,
    /// A direction vector is the zero vector.
    #[error("the direction vector is the zero vector")]
    ZeroVector,
    /// A coordinate was NaN or infinite.
    #[error("a coordinate is not finite")]
    NonFiniteCoordinate,
}

/// The possible outcomes of an orientation test.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Orientation {
    /// The query point lies to the right of the directed line.
    RightTurn,
    /// The query point lies on the line.
    Collinear,
    /// The query point lies to the left of the directed line.
    LeftTurn,
}

impl From<Sign> for Orientation {
    fn from(sign: Sign) -> Self {
        match sign {
            Sign::Negative => Orientation::RightTurn,
            Sign::Zero => Orientation::Collinear,
            Sign::Positive => Orientation::LeftTurn,
        }
    }
}

impl Neg for Orientation {
    type Output = Self;

    fn neg(self) -> Self {
        match self {
            Orientation::RightTurn => Orientation::LeftTurn,
            Orientation::Collinear => Orientation::Collinear,
            Orientation::LeftTurn => Orientation::RightTurn,
        }
    }
}

/// The possible outcomes of a side-of-oriented-circle test.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OrientedSide {
    /// Outside of a counterclockwise circle (inside of a clockwise one).
    OnNegativeSide,
    /// On the circle.
    OnBoundary,
    /// Inside of a counterclockwise circle (outside of a clockwise one).
    OnPositiveSide,
}

impl From<Sign> for OrientedSide {
    fn from(sign: Sign) -> Self {
        match sign {
            Sign::Negative => OrientedSide::OnNegativeSide,
            Sign::Zero => OrientedSide::OnBoundary,
            Sign::Positive => OrientedSide::OnPositiveSide,
        }
    }
}

/// Call counts of a single predicate kind.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct PredicateCounts {
    /// The total number of evaluations.
    pub total: u64,
    /// The number of evaluations that required exact arithmetic.
    pub exact: u64,
}

/// A snapshot of the counters kept by a [Kernel].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct KernelCounts {
    /// Counts of [Kernel::orientation], including the collinearity checks made by
    /// [Kernel::side_of_oriented_circle].
    pub orientation: PredicateCounts,
    /// Counts of [Kernel::side_of_oriented_circle].
    pub side_of_oriented_circle: PredicateCounts,
    /// Counts of [Kernel::preferred_direction].
    pub preferred_direction: PredicateCounts,
}

#[derive(Debug, Default)]
struct Counter {
    total: Cell<u64>,
    exact: Cell<u64>,
}

impl Counter {
    fn record(&self, evaluation: Evaluation) {
        self.total.set(self.total.get() + 1);
        if evaluation == Evaluation::Exact {
            self.exact.set(self.exact.get() + 1);
        }
    }

    fn get(&self) -> PredicateCounts {
        PredicateCounts {
            total: self.total.get(),
            exact: self.exact.get(),
        }
    }

    fn clear(&self) {
        self.total.set(0);
        self.exact.set(0);
    }
}

/// Per-predicate call counters.
#[derive(Debug, Default)]
pub struct KernelStatistics {
    orientation: Counter,
    side_of_oriented_circle: Counter,
    preferred_direction: Counter,
}

impl KernelStatistics {
    /// Returns the current counter values.
    pub fn snapshot(&self) -> KernelCounts {
        KernelCounts {
            orientation: self.orientation.get(),
            side_of_oriented_circle: self.side_of_oriented_circle.get(),
            preferred_direction: self.preferred_direction.get(),
        }
    }

    /// Resets all counters to zero.
    pub fn clear(&self) {
        self.orientation.clear();
        self.side_of_oriented_circle.clear();
        self.preferred_direction.clear();
    }
}

/// Which stage produced a predicate's answer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Evaluation {
    Filtered,
    Exact,
}

/// The arithmetic needed to expand a determinant.
///
/// Implemented by [Interval] (filter stage) and [BigRational] (exact stage).
trait Ring: Clone + Add<Output = Self> + Sub<Output = Self> + Mul<Output = Self> {}

impl<T> Ring for T where T: Clone + Add<Output = T> + Sub<Output = T> + Mul<Output = T> {}

fn determinant_3x3<R: Ring>(m: &[[R; 3]; 3]) -> R {
    let positive = m[0][0].clone() * m[1][1].clone() * m[2][2].clone()
        + m[0][1].clone() * m[1][2].clone() * m[2][0].clone()
        + m[0][2].clone() * m[1][0].clone() * m[2][1].clone();
    let negative = m[2][0].clone() * m[1][1].clone() * m[0][2].clone()
        + m[2][1].clone() * m[1][2].clone() * m[0][0].clone()
        + m[2][2].clone() * m[1][0].clone() * m[0][1].clone();
    positive - negative
}

/// Expands along the first column.
fn determinant_4x4<R: Ring>(m: &[[R; 4]; 4]) -> R {
    let row = |index: usize| [m[index][1].clone(), m[index][2].clone(), m[index][3].clone()];
    let minor = |skip: usize| {
        let [r0, r1, r2] = match skip {
            0 => [1, 2, 3],
            1 => [0, 2, 3],
            2 => [0, 1, 3],
            _ => [0, 1, 2],
        };
        determinant_3x3(&[row(r0), row(r1), row(r2)])
    };
    m[0][0].clone() * minor(0) - m[1][0].clone() * minor(1) + m[2][0].clone() * minor(2)
        - m[3][0].clone() * minor(3)
}

fn orientation_determinant<R: Ring>(a: [R; 2], b: [R; 2], c: [R; 2], one: R) -> R {
    let [ax, ay] = a;
    let [bx, by] = b;
    let [cx, cy] = c;
    determinant_3x3(&[[ax, bx, cx], [ay, by, cy], [one.clone(), one.clone(), one]])
}

fn in_circle_determinant<R: Ring>(a: [R; 2], b: [R; 2], c: [R; 2], d: [R; 2], one: R) -> R {
    let lift = |[x, y]: &[R; 2]| x.clone() * x.clone() + y.clone() * y.clone();
    let (ar, br, cr, dr) = (lift(&a), lift(&b), lift(&c), lift(&d));
    let [ax, ay] = a;
    let [bx, by] = b;
    let [cx, cy] = c;
    let [dx, dy] = d;
    determinant_4x4(&[
        [ax, bx, cx, dx],
        [ay, by, cy, dy],
        [ar, br, cr, dr],
        [one.clone(), one.clone(), one.clone(), one],
    ])
}

/// `(|cd|²)(ab·v)² − (|ab|²)(cd·v)²`
fn preferred_direction_polynomial<R: Ring>(
    a: [R; 2],
    b: [R; 2],
    c: [R; 2],
    d: [R; 2],
    v: [R; 2],
) -> R {
    let [ax, ay] = a;
    let [bx, by] = b;
    let [cx, cy] = c;
    let [dx, dy] = d;
    let [vx, vy] = v;
    let (abx, aby) = (bx - ax, by - ay);
    let (cdx, cdy) = (dx - cx, dy - cy);

    let cd_length_2 = cdx.clone() * cdx.clone() + cdy.clone() * cdy.clone();
    let ab_dot_v = abx.clone() * vx.clone() + aby.clone() * vy.clone();
    let ab_length_2 = abx.clone() * abx + aby.clone() * aby;
    let cd_dot_v = cdx * vx + cdy * vy;

    cd_length_2 * (ab_dot_v.clone() * ab_dot_v) - ab_length_2 * (cd_dot_v.clone() * cd_dot_v)
}

fn exact_sign(value: &BigRational) -> Sign {
    if value.is_negative() {
        Sign::Negative
    } else if value.is_positive() {
        Sign::Positive
    } else {
        Sign::Zero
    }
}

fn exact_coordinates(point: Point2<f64>) -> Result<[BigRational; 2], PredicateError> {
    let convert =
        |value: f64| BigRational::from_float(value).ok_or(PredicateError::NonFiniteCoordinate);
    Ok([convert(point.x)?, convert(point.y)?])
}

fn exact_one() -> BigRational {
    BigRational::from_integer(BigInt::from(1))
}

fn validate_finite(points: &[Point2<f64>]) -> Result<(), PredicateError> {
    if points.iter().all(Point2::is_finite) {
        Ok(())
    } else {
        Err(PredicateError::NonFiniteCoordinate)
    }
}

/// A geometry kernel with robust, filtered predicates for `f64` coordinates.
///
/// Besides its diagnostic counters the kernel is stateless. Counters are kept per kernel
/// instance; use [Kernel::statistics] and [Kernel::interval_statistics] to read or reset
/// them.
///
/// # Example
/// ```
/// use rift::{Kernel, Orientation, Point2};
///
/// let kernel = Kernel::new();
/// let a = Point2::new(0.0, 0.0);
/// let b = Point2::new(2.0, 2.0);
/// assert_eq!(kernel.orientation(a, b, Point2::new(2.0, 0.0)), Ok(Orientation::RightTurn));
/// assert_eq!(kernel.orientation(a, b, Point2::new(1.0, 1.0)), Ok(Orientation::Collinear));
/// assert_eq!(kernel.orientation(a, b, Point2::new(0.0, 2.0)), Ok(Orientation::LeftTurn));
/// ```
#[derive(Debug, Default)]
pub struct Kernel {
    statistics: KernelStatistics,
    interval_statistics: IntervalStatistics,
}

impl Kernel {
    /// Creates a new kernel with all counters set to zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Per-predicate call counters.
    pub fn statistics(&self) -> &KernelStatistics {
        &self.statistics
    }

    /// Counters of the interval arithmetic used by the filter stage.
    pub fn interval_statistics(&self) -> &IntervalStatistics {
        &self.interval_statistics
    }

    /// Resets both the predicate and the interval counters.
    pub fn clear_statistics(&self) {
        self.statistics.clear();
        self.interval_statistics.clear();
    }

    fn interval_coordinates(&self, point: Point2<f64>) -> [Interval<'_, f64>; 2] {
        [
            Interval::singleton(&self.interval_statistics, point.x),
            Interval::singleton(&self.interval_statistics, point.y),
        ]
    }

    fn interval_one(&self) -> Interval<'_, f64> {
        Interval::singleton(&self.interval_statistics, 1.0)
    }

    fn evaluate_orientation(
        &self,
        a: Point2<f64>,
        b: Point2<f64>,
        c: Point2<f64>,
    ) -> Result<(Sign, Evaluation), PredicateError> {
        let filtered = orientation_determinant(
            self.interval_coordinates(a),
            self.interval_coordinates(b),
            self.interval_coordinates(c),
            self.interval_one(),
        )
        .sign();
        if let Filtered::Definite(sign) = filtered {
            return Ok((sign, Evaluation::Filtered));
        }
        let determinant = orientation_determinant(
            exact_coordinates(a)?,
            exact_coordinates(b)?,
            exact_coordinates(c)?,
            exact_one(),
        );
        Ok((exact_sign(&determinant), Evaluation::Exact))
    }

    /// Determines how the point `c` is positioned relative to the directed line through
    /// `a` and `b` (in that order).
    ///
    /// Fails with [PredicateError::CoincidentPoints] if `a` and `b` are equal.
    pub fn orientation(
        &self,
        a: Point2<f64>,
        b: Point2<f64>,
        c: Point2<f64>,
    ) -> Result<Orientation, PredicateError> {
        validate_finite(&[a, b, c])?;
        if a == b {
            return Err(PredicateError::CoincidentPoints);
        }
        let (sign, evaluation) = self.evaluate_orientation(a, b, c)?;
        self.statistics.orientation.record(evaluation);
        Ok(sign.into())
    }

    /// Determines how the point `d` is positioned relative to the oriented circle passing
    /// through `a`, `b` and `c` (in that order).
    ///
    /// For a counterclockwise circle, [OrientedSide::OnPositiveSide] means that `d` lies
    /// strictly inside.
    ///
    /// Fails with [PredicateError::CollinearPoints] if `a`, `b` and `c` are collinear.
    /// This check is recorded as an orientation test in the kernel's statistics.
    pub fn side_of_oriented_circle(
        &self,
        a: Point2<f64>,
        b: Point2<f64>,
        c: Point2<f64>,
        d: Point2<f64>,
    ) -> Result<OrientedSide, PredicateError> {
        validate_finite(&[a, b, c, d])?;
        if a == b || b == c || a == c {
            return Err(PredicateError::CoincidentPoints);
        }
        let (orientation, evaluation) = self.evaluate_orientation(a, b, c)?;
        self.statistics.orientation.record(evaluation);
        if orientation == Sign::Zero {
            return Err(PredicateError::CollinearPoints);
        }

        let filtered = in_circle_determinant(
            self.interval_coordinates(a),
            self.interval_coordinates(b),
            self.interval_coordinates(c),
            self.interval_coordinates(d),
            self.interval_one(),
        )
        .sign();
        let (sign, evaluation) = match filtered {
            Filtered::Definite(sign) => (sign, Evaluation::Filtered),
            Filtered::Ambiguous => {
                let determinant = in_circle_determinant(
                    exact_coordinates(a)?,
                    exact_coordinates(b)?,
                    exact_coordinates(c)?,
                    exact_coordinates(d)?,
                    exact_one(),
                );
                (exact_sign(&determinant), Evaluation::Exact)
            }
        };
        self.statistics.side_of_oriented_circle.record(evaluation);
        Ok(sign.into())
    }

    /// Compares how closely the segments `ab` and `cd` follow the direction `v`.
    ///
    /// Returns [Sign::Positive], [Sign::Zero] or [Sign::Negative] if, compared to `cd`, the
    /// segment `ab` is more, equally or less closely aligned with `v`. The comparison is
    /// based on the sign of `(|cd|²)(ab·v)² − (|ab|²)(cd·v)²`.
    pub fn preferred_direction(
        &self,
        a: Point2<f64>,
        b: Point2<f64>,
        c: Point2<f64>,
        d: Point2<f64>,
        v: Point2<f64>,
    ) -> Result<Sign, PredicateError> {
        validate_finite(&[a, b, c, d, v])?;
        if a == b || c == d {
            return Err(PredicateError::CoincidentPoints);
        }
        if v.is_zero() {
            return Err(PredicateError::ZeroVector);
        }

        let filtered = preferred_direction_polynomial(
            self.interval_coordinates(a),
            self.interval_coordinates(b),
            self.interval_coordinates(c),
            self.interval_coordinates(d),
            self.interval_coordinates(v),
        )
        .sign();
        let (sign, evaluation) = match filtered {
            Filtered::Definite(sign) => (sign, Evaluation::Filtered),
            Filtered::Ambiguous => {
                let value = preferred_direction_polynomial(
                    exact_coordinates(a)?,
                    exact_coordinates(b)?,
                    exact_coordinates(c)?,
                    exact_coordinates(d)?,
                    exact_coordinates(v)?,
                );
                (exact_sign(&value), Evaluation::Exact)
            }
        };
        self.statistics.preferred_direction.record(evaluation);
        Ok(sign)
    }

    /// Tests if the quadrilateral `abcd` is strictly convex.
    ///
    /// The vertices are expected in counterclockwise order. Any reflex or straight corner
    /// makes the quad non-convex.
    pub fn is_strictly_convex_quad(
        &self,
        a: Point2<f64>,
        b: Point2<f64>,
        c: Point2<f64>,
        d: Point2<f64>,
    ) -> Result<bool, PredicateError> {
        for [p0, p1, p2] in [[a, b, c], [b, c, d], [c, d, a], [d, a, b]] {
            if self.orientation(p0, p1, p2)? != Orientation::LeftTurn {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Tests if the diagonal `ac` of the strictly convex, counterclockwise quad `abcd` is
    /// locally Delaunay.
    ///
    /// The diagonal separates the triangles `abc` and `acd`. It is locally Delaunay if `d`
    /// does not lie strictly inside the circumcircle of `abc`.
    pub fn is_locally_delaunay_edge(
        &self,
        a: Point2<f64>,
        b: Point2<f64>,
        c: Point2<f64>,
        d: Point2<f64>,
    ) -> Result<bool, PredicateError> {
        Ok(self.side_of_oriented_circle(a, b, c, d)? != OrientedSide::OnPositiveSide)
    }

    /// Tests if the diagonal `ac` of the strictly convex, counterclockwise quad `abcd` is
    /// locally Delaunay with respect to the preferred directions `u` and `v`.
    ///
    /// Equals [Self::is_locally_delaunay_edge] unless all four points are co-circular. In that
    /// case both diagonals are Delaunay and the tie is broken by direction: `ac` is kept
    /// unless `bd` is more closely aligned with `u`, or equally aligned with `u` and more
    /// closely aligned with `v`. Since a flipped diagonal always wins the same comparison
    /// against its predecessor, it will never be flipped back.
    pub fn is_locally_pd_delaunay_edge(
        &self,
        a: Point2<f64>,
        b: Point2<f64>,
        c: Point2<f64>,
        d: Point2<f64>,
        u: Point2<f64>,
        v: Point2<f64>,
    ) -> Result<bool, PredicateError> {
        match self.side_of_oriented_circle(a, b, c, d)? {
            OrientedSide::OnNegativeSide => Ok(true),
            OrientedSide::OnPositiveSide => Ok(false),
            OrientedSide::OnBoundary => match self.preferred_direction(a, c, b, d, u)? {
                Sign::Positive => Ok(true),
                Sign::Negative => Ok(false),
                Sign::Zero => Ok(self.preferred_direction(a, c, b, d, v)? != Sign::Negative),
            },
        }
    }
}

#[cfg(test)]
mod test {
    use num_rational::BigRational;

    use super::{
        exact_coordinates, exact_one, exact_sign, in_circle_determinant, orientation_determinant,
        preferred_direction_polynomial, Kernel, Orientation, OrientedSide, PredicateCounts,
        PredicateError,
    };
    use crate::interval::Sign;
    use crate::test_utilities::{random_points_in_range, SEED};
    use crate::Point2;

    fn p(x: f64, y: f64) -> Point2<f64> {
        Point2::new(x, y)
    }

    fn exact_orientation(a: Point2<f64>, b: Point2<f64>, c: Point2<f64>) -> Sign {
        let det: BigRational = orientation_determinant(
            exact_coordinates(a).unwrap(),
            exact_coordinates(b).unwrap(),
            exact_coordinates(c).unwrap(),
            exact_one(),
        );
        exact_sign(&det)
    }

    #[test]
    fn test_orientation() {
        let kernel = Kernel::new();
        let (a, b) = (p(0.0, 0.0), p(2.0, 2.0));
        assert_eq!(kernel.orientation(a, b, p(2.0, 0.0)), Ok(Orientation::RightTurn));
        assert_eq!(kernel.orientation(a, b, p(1.0, 1.0)), Ok(Orientation::Collinear));
        assert_eq!(kernel.orientation(a, b, p(0.0, 2.0)), Ok(Orientation::LeftTurn));
        assert_eq!(kernel.orientation(b, a, p(0.0, 2.0)), Ok(Orientation::RightTurn));

        let counts = kernel.statistics().snapshot().orientation;
        assert_eq!(counts, PredicateCounts { total: 4, exact: 0 });
    }

    #[test]
    fn test_orientation_is_antisymmetric() {
        let kernel = Kernel::new();
        let points = random_points_in_range(1.0, 300, SEED);
        for triple in points.chunks_exact(3) {
            let (a, b, c) = (triple[0], triple[1], triple[2]);
            let orientation = kernel.orientation(a, b, c).unwrap();
            assert_eq!(kernel.orientation(b, a, c), Ok(-orientation));
            assert_eq!(kernel.orientation(b, c, a), Ok(orientation));
        }
    }

    #[test]
    fn test_orientation_preconditions() {
        let kernel = Kernel::new();
        let a = p(1.0, 1.0);
        assert_eq!(
            kernel.orientation(a, a, p(0.0, 0.0)),
            Err(PredicateError::CoincidentPoints)
        );
        assert_eq!(
            kernel.orientation(a, p(f64::NAN, 0.0), p(0.0, 0.0)),
            Err(PredicateError::NonFiniteCoordinate)
        );
        assert_eq!(kernel.statistics().snapshot().orientation.total, 0);
    }

    #[test]
    fn test_near_degenerate_orientation() {
        let kernel = Kernel::new();
        let a = p(0.1, 0.1);
        let b = p(0.3, 0.3);
        for offset in [-1e-12, -1e-17, 0.0, 1e-17, 1e-12] {
            let c = p(0.2 + offset, 0.2);
            let expected = exact_orientation(a, b, c);
            assert_eq!(kernel.orientation(a, b, c), Ok(expected.into()));
        }
    }

    #[test]
    fn test_orientation_uses_exact_fallback() {
        let kernel = Kernel::new();
        // Exactly collinear, but none of the products is representable
        let (a, b, c) = (p(0.1, 0.1), p(0.3, 0.3), p(0.7, 0.7));
        assert_eq!(kernel.orientation(a, b, c), Ok(Orientation::Collinear));
        assert_eq!(kernel.orientation(c, a, b), Ok(Orientation::Collinear));

        let counts = kernel.statistics().snapshot().orientation;
        assert_eq!(counts, PredicateCounts { total: 2, exact: 2 });
        assert!(kernel.interval_statistics().snapshot().indeterminate_result_count >= 2);
    }

    #[test]
    fn test_side_of_oriented_circle() {
        let kernel = Kernel::new();
        let (a, b, c) = (p(0.0, 0.0), p(1.0, 0.0), p(0.0, 1.0));
        assert_eq!(
            kernel.side_of_oriented_circle(a, b, c, p(0.5, 0.5)),
            Ok(OrientedSide::OnPositiveSide)
        );
        assert_eq!(
            kernel.side_of_oriented_circle(a, b, c, p(1.0, 1.0)),
            Ok(OrientedSide::OnBoundary)
        );
        assert_eq!(
            kernel.side_of_oriented_circle(a, b, c, p(2.0, 2.0)),
            Ok(OrientedSide::OnNegativeSide)
        );
        // Reversing the circle orientation swaps the sides
        assert_eq!(
            kernel.side_of_oriented_circle(c, b, a, p(0.5, 0.5)),
            Ok(OrientedSide::OnNegativeSide)
        );
        assert_eq!(
            kernel.side_of_oriented_circle(a, b, p(2.0, 0.0), p(1.0, 1.0)),
            Err(PredicateError::CollinearPoints)
        );
    }

    #[test]
    fn test_side_of_oriented_circle_matches_exact_reference() {
        let kernel = Kernel::new();
        let (a, b, c) = (p(-1.0, 0.0), p(0.0, -1.0), p(1.0, 0.0));
        for offset in [-1e-12, -1e-16, 0.0, 1e-16, 1e-12] {
            let d = p(0.0, 1.0 + offset);
            let det: BigRational = in_circle_determinant(
                exact_coordinates(a).unwrap(),
                exact_coordinates(b).unwrap(),
                exact_coordinates(c).unwrap(),
                exact_coordinates(d).unwrap(),
                exact_one(),
            );
            let expected: OrientedSide = exact_sign(&det).into();
            assert_eq!(kernel.side_of_oriented_circle(a, b, c, d), Ok(expected));
        }
        assert_eq!(
            kernel.side_of_oriented_circle(a, b, c, p(0.0, 1.0)),
            Ok(OrientedSide::OnBoundary)
        );
    }

    #[test]
    fn test_side_of_oriented_circle_uses_exact_fallback() {
        let kernel = Kernel::new();
        let (a, b, c) = (p(0.1, 0.2), p(0.7, 0.3), p(0.4, 0.9));
        // The lifted matrix has two equal columns
        assert_eq!(
            kernel.side_of_oriented_circle(a, b, c, a),
            Ok(OrientedSide::OnBoundary)
        );
        let counts = kernel.statistics().snapshot().side_of_oriented_circle;
        assert_eq!(counts, PredicateCounts { total: 1, exact: 1 });
    }

    #[test]
    fn test_collinearity_check_is_counted() {
        let kernel = Kernel::new();
        // Exactly collinear, so only the exact fallback detects it
        let (a, b, c) = (p(0.1, 0.1), p(0.3, 0.3), p(0.7, 0.7));
        assert_eq!(
            kernel.side_of_oriented_circle(a, b, c, p(0.0, 1.0)),
            Err(PredicateError::CollinearPoints)
        );
        let counts = kernel.statistics().snapshot();
        assert_eq!(counts.orientation, PredicateCounts { total: 1, exact: 1 });
        assert_eq!(counts.side_of_oriented_circle, PredicateCounts::default());

        let (a, b, c) = (p(0.1, 0.2), p(0.7, 0.3), p(0.4, 0.9));
        assert_eq!(
            kernel.side_of_oriented_circle(a, b, c, a),
            Ok(OrientedSide::OnBoundary)
        );
        let counts = kernel.statistics().snapshot();
        assert_eq!(counts.orientation, PredicateCounts { total: 2, exact: 1 });
        assert_eq!(
            counts.side_of_oriented_circle,
            PredicateCounts { total: 1, exact: 1 }
        );

        // Every ambiguous filter result is accounted for by an exact evaluation
        let ambiguous = kernel.interval_statistics().snapshot().indeterminate_result_count;
        assert_eq!(
            ambiguous,
            counts.orientation.exact + counts.side_of_oriented_circle.exact
        );
    }

    #[test]
    fn test_preferred_direction() {
        let kernel = Kernel::new();
        let (a, b, c, d) = (p(0.0, 0.0), p(2.0, 2.0), p(2.0, 0.0), p(0.0, 2.0));
        // Both diagonals enclose 45° with the x axis
        assert_eq!(kernel.preferred_direction(a, b, c, d, p(1.0, 0.0)), Ok(Sign::Zero));
        // ab is parallel, cd orthogonal
        assert_eq!(
            kernel.preferred_direction(a, b, c, d, p(1.0, 1.0)),
            Ok(Sign::Positive)
        );
        assert_eq!(
            kernel.preferred_direction(c, d, a, b, p(1.0, 1.0)),
            Ok(Sign::Negative)
        );
        // Segment length does not matter
        assert_eq!(
            kernel.preferred_direction(a, p(10.0, 0.0), c, p(2.0, 0.5), p(1.0, 0.0)),
            Ok(Sign::Positive)
        );
        assert_eq!(
            kernel.preferred_direction(a, b, c, d, p(0.0, 0.0)),
            Err(PredicateError::ZeroVector)
        );
        assert_eq!(
            kernel.preferred_direction(a, a, c, d, p(1.0, 0.0)),
            Err(PredicateError::CoincidentPoints)
        );
    }

    #[test]
    fn test_preferred_direction_with_overflowing_terms() {
        let kernel = Kernel::new();
        let (a, b, c, d) = (p(0.0, 0.0), p(1.0, 0.0), p(0.0, 0.0), p(3.2e154, 0.0));
        let v = p(1.0e-153, 1.0);
        // |cd|² overflows, but both terms are exactly equal
        let value: BigRational = preferred_direction_polynomial(
            exact_coordinates(a).unwrap(),
            exact_coordinates(b).unwrap(),
            exact_coordinates(c).unwrap(),
            exact_coordinates(d).unwrap(),
            exact_coordinates(v).unwrap(),
        );
        assert_eq!(exact_sign(&value), Sign::Zero);
        assert_eq!(kernel.preferred_direction(a, b, c, d, v), Ok(Sign::Zero));
        assert_eq!(
            kernel.statistics().snapshot().preferred_direction,
            PredicateCounts { total: 1, exact: 1 }
        );
    }

    #[test]
    fn test_orientation_with_overflowing_terms() {
        let kernel = Kernel::new();
        let (a, b, c) = (p(-1.0e308, -1.0e308), p(1.0e308, 1.0e308), p(0.5e308, 0.5e308));
        assert_eq!(exact_orientation(a, b, c), Sign::Zero);
        assert_eq!(kernel.orientation(a, b, c), Ok(Orientation::Collinear));
        assert_eq!(
            kernel.orientation(a, b, p(0.5e308, 0.6e308)),
            Ok(exact_orientation(a, b, p(0.5e308, 0.6e308)).into())
        );
    }

    #[test]
    fn test_is_strictly_convex_quad() {
        let kernel = Kernel::new();
        assert_eq!(
            kernel.is_strictly_convex_quad(p(0.0, 0.0), p(1.0, 0.0), p(2.0, 2.0), p(1.0, 2.0)),
            Ok(true)
        );
        assert_eq!(
            kernel.is_strictly_convex_quad(p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0), p(2.0, 1.0)),
            Ok(false)
        );
        // Clockwise order is not convex in the counterclockwise sense
        assert_eq!(
            kernel.is_strictly_convex_quad(p(1.0, 2.0), p(2.0, 2.0), p(1.0, 0.0), p(0.0, 0.0)),
            Ok(false)
        );
        // Reflex corner at (0.5, 0.5)
        assert_eq!(
            kernel.is_strictly_convex_quad(p(0.0, 0.0), p(2.0, 0.0), p(0.5, 0.5), p(0.0, 2.0)),
            Ok(false)
        );
    }

    #[test]
    fn test_is_locally_delaunay_edge() {
        let kernel = Kernel::new();
        // A flat quad: the long diagonal is not Delaunay, the short one is.
        let (a, b, c, d) = (p(-2.0, 0.0), p(0.0, -0.5), p(2.0, 0.0), p(0.0, 0.5));
        assert_eq!(kernel.is_locally_delaunay_edge(a, b, c, d), Ok(false));
        assert_eq!(kernel.is_locally_delaunay_edge(b, c, d, a), Ok(true));

        // Co-circular points: both diagonals are Delaunay
        let (a, b, c, d) = (p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0));
        assert_eq!(kernel.is_locally_delaunay_edge(a, b, c, d), Ok(true));
        assert_eq!(kernel.is_locally_delaunay_edge(b, c, d, a), Ok(true));
    }

    #[test]
    fn test_is_locally_pd_delaunay_edge() {
        let kernel = Kernel::new();
        let (a, b, c, d) = (p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0));
        let (u, v) = (p(1.0, 0.0), p(1.0, 1.0));

        // Both diagonals are equally aligned with u. Along v, ac is preferred.
        assert_eq!(kernel.is_locally_pd_delaunay_edge(a, b, c, d, u, v), Ok(true));
        assert_eq!(kernel.is_locally_pd_delaunay_edge(b, c, d, a, u, v), Ok(false));

        // u decides before v
        let u = p(1.0, -1.0);
        assert_eq!(kernel.is_locally_pd_delaunay_edge(a, b, c, d, u, v), Ok(false));
        assert_eq!(kernel.is_locally_pd_delaunay_edge(b, c, d, a, u, v), Ok(true));

        // Non co-circular configurations ignore the directions
        let (a, b, c, d) = (p(-2.0, 0.0), p(0.0, -0.5), p(2.0, 0.0), p(0.0, 0.5));
        assert_eq!(
            kernel.is_locally_pd_delaunay_edge(a, b, c, d, p(1.0, 0.0), v),
            Ok(false)
        );
    }

    #[test]
    fn test_clear_statistics() {
        let kernel = Kernel::new();
        kernel
            .orientation(p(0.0, 0.0), p(1.0, 0.0), p(0.0, 1.0))
            .unwrap();
        assert_ne!(kernel.interval_statistics().snapshot().arithmetic_op_count, 0);
        kernel.clear_statistics();
        assert_eq!(kernel.statistics().snapshot(), Default::default());
        assert_eq!(
            kernel.interval_statistics().snapshot(),
            Default::default()
        );
    }
}
