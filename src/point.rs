use num_traits::{Num, Signed};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A coordinate type that can be stored in a [Point2].
///
/// All geometric predicates evaluate `f64` coordinates, hence every coordinate type must
/// convert losslessly into `f64`. This type should usually be either `f32` or `f64`.
pub trait RiftNum: Num + PartialOrd + Into<f64> + Copy + Signed + std::fmt::Debug {}

impl<T> RiftNum for T where T: Num + PartialOrd + Into<f64> + Copy + Signed + std::fmt::Debug {}

/// A two dimensional point.
///
/// Also used to represent direction vectors, e.g. the preferred directions of
/// [DelaunayCriterion::PreferredDirections](crate::DelaunayCriterion::PreferredDirections).
#[derive(Debug, PartialEq, PartialOrd, Clone, Copy, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde")
)]
pub struct Point2<S> {
    /// The point's x coordinate
    pub x: S,
    /// The point's y coordinate
    pub y: S,
}

impl<S> Point2<S> {
    /// Creates a new point.
    #[inline]
    pub const fn new(x: S, y: S) -> Self {
        Point2 { x, y }
    }
}

impl<S: RiftNum> Point2<S> {
    /// Returns the squared distance of this point and another point.
    #[inline]
    pub fn distance_2(&self, other: Self) -> S {
        self.sub(other).length2()
    }

    /// Converts this point into a point with `f64` coordinates.
    #[inline]
    pub fn to_f64(self) -> Point2<f64> {
        Point2::new(self.x.into(), self.y.into())
    }

    pub(crate) fn length2(&self) -> S {
        self.x * self.x + self.y * self.y
    }

    pub(crate) fn sub(&self, other: Self) -> Self {
        Point2 {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    pub(crate) fn is_zero(&self) -> bool {
        self.x == S::zero() && self.y == S::zero()
    }
}

impl Point2<f64> {
    /// Returns `true` if both coordinates are neither infinite nor NaN.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl<S: RiftNum> From<Point2<S>> for [S; 2] {
    #[inline]
    fn from(point: Point2<S>) -> Self {
        [point.x, point.y]
    }
}

impl<S: RiftNum> From<Point2<S>> for (S, S) {
    #[inline]
    fn from(point: Point2<S>) -> (S, S) {
        (point.x, point.y)
    }
}

impl<S: RiftNum> From<[S; 2]> for Point2<S> {
    #[inline]
    fn from(source: [S; 2]) -> Self {
        Self::new(source[0], source[1])
    }
}

impl<S: RiftNum> From<(S, S)> for Point2<S> {
    #[inline]
    fn from(source: (S, S)) -> Self {
        Self::new(source.0, source.1)
    }
}

/// An object with position.
///
/// Vertices need to implement this trait to be stored in a [Dcel](crate::Dcel).
pub trait HasPosition {
    /// Returns the position of this object.
    ///
    /// **Note**: It is assumed that the position doesn't change once the vertex is part of a
    /// mesh. Edge flips only rewire connectivity, they never move vertices.
    fn position(&self) -> Point2<f64>;
}

impl<S: RiftNum> HasPosition for Point2<S> {
    fn position(&self) -> Point2<f64> {
        self.to_f64()
    }
}
