//! Closed real intervals with directed rounding.
//!
//! An [Interval] encloses a real number that is only known to lie within `[lower, upper]`.
//! Arithmetic on intervals rounds the lower bound towards negative infinity and the upper
//! bound towards positive infinity, so the exact result of the same computation on any
//! values from the operand intervals is always enclosed.
//!
//! Rust offers no control over the floating point rounding mode. Directed rounding is
//! emulated per operation instead: the round-to-nearest result is compared with its exact
//! rounding error (obtained from an error-free transformation) and moved by one ulp in the
//! direction of the error. No global floating point state is ever modified.
//!
//! Sign and ordering queries can be *ambiguous* if an interval straddles the tested value.
//! They return a [Filtered] value instead of failing - deciding what to do with an ambiguous
//! result is up to the caller (usually: recompute with exact arithmetic).

use std::cell::Cell;
use std::fmt::{Debug, Display};
use std::ops::{Add, AddAssign, Mul, MulAssign, Sub, SubAssign};

use float_next_after::NextAfter;
use num_traits::Float;

/// A floating point type that can be used as interval bound.
///
/// Implemented for `f32` and `f64`.
pub trait IntervalReal: Float + Debug + Display {
    /// Returns the largest representable value strictly less than `self`.
    fn next_down(self) -> Self;

    /// Returns the smallest representable value strictly greater than `self`.
    fn next_up(self) -> Self;
}

macro_rules! impl_interval_real {
    ($t: ty) => {
        impl IntervalReal for $t {
            #[inline]
            fn next_down(self) -> Self {
                self.next_after(<$t>::NEG_INFINITY)
            }

            #[inline]
            fn next_up(self) -> Self {
                self.next_after(<$t>::INFINITY)
            }
        }
    };
}

impl_interval_real!(f32);
impl_interval_real!(f64);

/// The sign of a real number.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Sign {
    /// Strictly smaller than zero.
    Negative,
    /// Exactly zero.
    Zero,
    /// Strictly greater than zero.
    Positive,
}

impl Sign {
    /// Returns `-1`, `0` or `1`.
    pub fn to_i8(self) -> i8 {
        match self {
            Sign::Negative => -1,
            Sign::Zero => 0,
            Sign::Positive => 1,
        }
    }

    /// Returns the sign with the opposite orientation. `Zero` stays `Zero`.
    pub fn reversed(self) -> Self {
        match self {
            Sign::Negative => Sign::Positive,
            Sign::Zero => Sign::Zero,
            Sign::Positive => Sign::Negative,
        }
    }
}

impl From<Sign> for i8 {
    fn from(sign: Sign) -> i8 {
        sign.to_i8()
    }
}

/// The result of a query that can only be answered if the involved intervals are narrow
/// enough.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Filtered<T> {
    /// The query has a unique answer for every value enclosed by the involved intervals.
    Definite(T),
    /// Different enclosed values lead to different answers.
    Ambiguous,
}

impl<T> Filtered<T> {
    /// Returns the definite value or `None` if the result is ambiguous.
    pub fn definite(self) -> Option<T> {
        match self {
            Filtered::Definite(value) => Some(value),
            Filtered::Ambiguous => None,
        }
    }

    /// Returns `true` if the result is ambiguous.
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Filtered::Ambiguous)
    }
}

/// A snapshot of the counters kept by [IntervalStatistics].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct IntervalCounts {
    /// The total number of ambiguous sign or ordering results.
    pub indeterminate_result_count: u64,
    /// The total number of interval arithmetic and comparison operations.
    pub arithmetic_op_count: u64,
}

/// Diagnostic counters shared by all intervals created against them.
///
/// The counters use interior mutability and are not `Sync`: each thread must own its own
/// statistics object.
#[derive(Debug, Default)]
pub struct IntervalStatistics {
    indeterminate_result_count: Cell<u64>,
    arithmetic_op_count: Cell<u64>,
}

impl IntervalStatistics {
    /// Creates a new set of counters, all starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current counter values.
    pub fn snapshot(&self) -> IntervalCounts {
        IntervalCounts {
            indeterminate_result_count: self.indeterminate_result_count.get(),
            arithmetic_op_count: self.arithmetic_op_count.get(),
        }
    }

    /// Resets all counters to zero.
    pub fn clear(&self) {
        self.indeterminate_result_count.set(0);
        self.arithmetic_op_count.set(0);
    }

    #[inline]
    fn record_op(&self) {
        self.arithmetic_op_count.set(self.arithmetic_op_count.get() + 1);
    }

    #[inline]
    fn record_indeterminate(&self) {
        self.indeterminate_result_count
            .set(self.indeterminate_result_count.get() + 1);
    }
}

/// A closed interval `[lower, upper]` of real numbers.
///
/// Every interval borrows the [IntervalStatistics] it reports its operations to. Binary
/// operations report to the statistics of their left operand.
#[derive(Clone, Copy)]
pub struct Interval<'s, T> {
    lower: T,
    upper: T,
    statistics: &'s IntervalStatistics,
}

impl<'s, T: IntervalReal> Interval<'s, T> {
    /// Creates a new interval spanning the two given bounds.
    ///
    /// The bounds may be given in any order.
    pub fn new(statistics: &'s IntervalStatistics, a: T, b: T) -> Self {
        let (lower, upper) = if a > b { (b, a) } else { (a, b) };
        Self {
            lower,
            upper,
            statistics,
        }
    }

    /// Creates an interval that contains exactly one value.
    pub fn singleton(statistics: &'s IntervalStatistics, value: T) -> Self {
        Self::new(statistics, value, value)
    }

    /// The lower bound.
    #[inline]
    pub fn lower(&self) -> T {
        self.lower
    }

    /// The upper bound.
    #[inline]
    pub fn upper(&self) -> T {
        self.upper
    }

    /// Returns `true` if lower and upper bound are equal.
    pub fn is_singleton(&self) -> bool {
        self.lower == self.upper
    }

    /// Returns `true` if `value` lies within this interval.
    pub fn contains(&self, value: T) -> bool {
        self.lower <= value && value <= self.upper
    }

    /// The statistics this interval reports to.
    pub fn statistics(&self) -> &'s IntervalStatistics {
        self.statistics
    }

    /// Returns the sign of all values enclosed by this interval.
    ///
    /// The result is ambiguous if the interval contains zero and at least one other value.
    pub fn sign(&self) -> Filtered<Sign> {
        self.statistics.record_op();
        let zero = T::zero();
        if self.upper < zero {
            Filtered::Definite(Sign::Negative)
        } else if self.lower > zero {
            Filtered::Definite(Sign::Positive)
        } else if self.lower == zero && self.upper == zero {
            Filtered::Definite(Sign::Zero)
        } else {
            self.statistics.record_indeterminate();
            Filtered::Ambiguous
        }
    }

    /// Returns if every value of `self` is less than every value of `other`.
    ///
    /// Yields `false` if no value of `self` is less than any value of `other` and
    /// is ambiguous if the intervals overlap in any other way.
    pub fn less_than(&self, other: &Self) -> Filtered<bool> {
        self.statistics.record_op();
        if self.upper < other.lower {
            Filtered::Definite(true)
        } else if self.lower >= other.upper {
            Filtered::Definite(false)
        } else {
            self.statistics.record_indeterminate();
            Filtered::Ambiguous
        }
    }

    fn from_rounded_bounds(statistics: &'s IntervalStatistics, lower: T, upper: T) -> Self {
        statistics.record_op();
        Self::new(statistics, lower, upper)
    }
}

/// Exact rounding error of `a + b` given its rounded result `x`.
///
/// Returns `None` if the error cannot be determined (overflow or non-finite operands).
#[inline]
fn sum_error<T: IntervalReal>(a: T, b: T, x: T) -> Option<T> {
    if !x.is_finite() {
        return None;
    }
    let bvirt = x - a;
    let avirt = x - bvirt;
    let bround = b - bvirt;
    let around = a - avirt;
    let error = around + bround;
    error.is_finite().then_some(error)
}

/// Exact rounding error of `a * b` given its rounded result `x`.
///
/// Returns `None` if the error cannot be determined. This includes results close to the
/// subnormal range where the error itself is not representable.
#[inline]
fn product_error<T: IntervalReal>(a: T, b: T, x: T) -> Option<T> {
    if !x.is_finite() || x.abs() < T::min_positive_value() / T::epsilon() {
        return None;
    }
    let error = a.mul_add(b, -x);
    error.is_finite().then_some(error)
}

/// Rounds `x` towards negative infinity.
///
/// An overflow to `+inf` stands for a finite result above the largest finite value. The
/// largest finite value is therefore a valid lower bound, while `+inf` is not.
#[inline]
fn round_down<T: IntervalReal>(x: T, error: Option<T>) -> T {
    if x == T::infinity() {
        return T::max_value();
    }
    match error {
        Some(error) if error >= T::zero() => x,
        _ => x.next_down(),
    }
}

/// Rounds `x` towards positive infinity. Mirrors [round_down].
#[inline]
fn round_up<T: IntervalReal>(x: T, error: Option<T>) -> T {
    if x == T::neg_infinity() {
        return T::min_value();
    }
    match error {
        Some(error) if error <= T::zero() => x,
        _ => x.next_up(),
    }
}

#[inline]
fn add_down<T: IntervalReal>(a: T, b: T) -> T {
    let x = a + b;
    round_down(x, sum_error(a, b, x))
}

#[inline]
fn add_up<T: IntervalReal>(a: T, b: T) -> T {
    let x = a + b;
    round_up(x, sum_error(a, b, x))
}

// Bounds stand for finite values, so a zero factor yields zero even if the other bound
// overflowed to infinity.
#[inline]
fn mul_down<T: IntervalReal>(a: T, b: T) -> T {
    if a.is_zero() || b.is_zero() {
        return T::zero();
    }
    let x = a * b;
    round_down(x, product_error(a, b, x))
}

#[inline]
fn mul_up<T: IntervalReal>(a: T, b: T) -> T {
    if a.is_zero() || b.is_zero() {
        return T::zero();
    }
    let x = a * b;
    round_up(x, product_error(a, b, x))
}

impl<'s, T: IntervalReal> Add for Interval<'s, T> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        let lower = add_down(self.lower, rhs.lower);
        let upper = add_up(self.upper, rhs.upper);
        Self::from_rounded_bounds(self.statistics, lower, upper)
    }
}

impl<'s, T: IntervalReal> Sub for Interval<'s, T> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        let lower = add_down(self.lower, -rhs.upper);
        let upper = add_up(self.upper, -rhs.lower);
        Self::from_rounded_bounds(self.statistics, lower, upper)
    }
}

impl<'s, T: IntervalReal> Mul for Interval<'s, T> {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        // The operand signs are unknown in general, every endpoint product is a candidate
        let candidates = [
            (self.lower, rhs.lower),
            (self.lower, rhs.upper),
            (self.upper, rhs.lower),
            (self.upper, rhs.upper),
        ];
        let lower = candidates
            .iter()
            .map(|&(a, b)| mul_down(a, b))
            .fold(T::infinity(), T::min);
        let upper = candidates
            .iter()
            .map(|&(a, b)| mul_up(a, b))
            .fold(T::neg_infinity(), T::max);
        Self::from_rounded_bounds(self.statistics, lower, upper)
    }
}

impl<'s, T: IntervalReal> AddAssign for Interval<'s, T> {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<'s, T: IntervalReal> SubAssign for Interval<'s, T> {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl<'s, T: IntervalReal> MulAssign for Interval<'s, T> {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl<'s, T: IntervalReal> PartialEq for Interval<'s, T> {
    fn eq(&self, other: &Self) -> bool {
        self.lower == other.lower && self.upper == other.upper
    }
}

impl<'s, T: IntervalReal> Debug for Interval<'s, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interval")
            .field("lower", &self.lower)
            .field("upper", &self.upper)
            .finish()
    }
}

impl<'s, T: IntervalReal> Display for Interval<'s, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{},{}]", self.lower, self.upper)
    }
}
