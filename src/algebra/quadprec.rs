use crate::algebra::FloatT;
use std::ops::{AddAssign, MulAssign, SubAssign};

/// Extended precision value held as an unevaluated sum `hi + lo`.
///
/// Used for row activities and side updates, where long sums of
/// products of mixed magnitude would otherwise lose digits.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct QuadPrec<T> {
    hi: T,
    lo: T,
}

// error-free transformations (Knuth / Dekker)

#[inline]
fn two_sum<T: FloatT>(a: T, b: T) -> (T, T) {
    let s = a + b;
    let bb = s - a;
    let err = (a - (s - bb)) + (b - bb);
    (s, err)
}

#[inline]
fn quick_two_sum<T: FloatT>(a: T, b: T) -> (T, T) {
    let s = a + b;
    let err = b - (s - a);
    (s, err)
}

#[inline]
fn two_product<T: FloatT>(a: T, b: T) -> (T, T) {
    let p = a * b;
    let err = a.mul_add(b, -p);
    (p, err)
}

impl<T> QuadPrec<T>
where
    T: FloatT,
{
    pub fn new(x: T) -> Self {
        Self {
            hi: x,
            lo: T::zero(),
        }
    }

    /// Exact product of two values.
    pub fn product(a: T, b: T) -> Self {
        let (hi, lo) = two_product(a, b);
        Self { hi, lo }
    }

    /// Rounded value.
    pub fn value(&self) -> T {
        self.hi + self.lo
    }

    /// Add the product `a*b` without intermediate rounding of the product.
    pub fn add_product(&mut self, a: T, b: T) {
        let (p, perr) = two_product(a, b);
        *self += p;
        let lo = self.lo + perr;
        self.set_normalized(self.hi, lo);
    }

    // infinite or nan leading terms poison the error term
    fn set_normalized(&mut self, s: T, e: T) {
        if s.is_finite() {
            (self.hi, self.lo) = quick_two_sum(s, e);
        } else {
            (self.hi, self.lo) = (s, T::zero());
        }
    }
}

impl<T: FloatT> AddAssign<T> for QuadPrec<T> {
    fn add_assign(&mut self, x: T) {
        let (s, e) = two_sum(self.hi, x);
        let e = e + self.lo;
        self.set_normalized(s, e);
    }
}

impl<T: FloatT> SubAssign<T> for QuadPrec<T> {
    fn sub_assign(&mut self, x: T) {
        *self += -x;
    }
}

impl<T: FloatT> AddAssign<QuadPrec<T>> for QuadPrec<T> {
    fn add_assign(&mut self, x: QuadPrec<T>) {
        let (s, e) = two_sum(self.hi, x.hi);
        let e = e + self.lo + x.lo;
        self.set_normalized(s, e);
    }
}

impl<T: FloatT> MulAssign<T> for QuadPrec<T> {
    fn mul_assign(&mut self, x: T) {
        let (p, e) = two_product(self.hi, x);
        let e = e + self.lo * x;
        self.set_normalized(p, e);
    }
}
