#![allow(non_snake_case)]
use num_traits::{Float, FloatConst, FromPrimitive, NumAssign};
use std::fmt::{Debug, Display, LowerExp};

#[cfg(feature = "lapack")]
use crate::algebra::eigen::LapackFloatT;

/// Bounds shared by every floating point type the interface can hold.
pub trait CoreFloatT:
    'static + Send + Sync + Float + FloatConst + NumAssign + Default + FromPrimitive + Display + LowerExp + Debug
{
}

impl<T> CoreFloatT for T where
    T: 'static + Send + Sync + Float + FloatConst + NumAssign + Default + FromPrimitive + Display + LowerExp + Debug
{
}

cfg_if::cfg_if! {
    if #[cfg(feature = "lapack")] {
        /// Floating point type of problem data, bounds, tolerances and
        /// solutions.  Restricted to f32 and f64 when dense blocks are
        /// decomposed by LAPACK.
        pub trait FloatT: CoreFloatT + LapackFloatT {}
        impl<T> FloatT for T where T: CoreFloatT + LapackFloatT {}
    } else {
        /// Floating point type of problem data, bounds, tolerances and
        /// solutions.
        pub trait FloatT: CoreFloatT {}
        impl<T> FloatT for T where T: CoreFloatT {}
    }
}

/// Conversion of literals and counts into a [`FloatT`].
///
/// Lets settings defaults and penalty schedule constants be written as
/// `(1e-6).as_T()`.
pub trait AsFloatT<T>: 'static {
    fn as_T(&self) -> T;
}

macro_rules! impl_as_FloatT {
    ($($ty:ty => $conv:ident),+) => {
        $(
            impl<T: FromPrimitive + Float + 'static> AsFloatT<T> for $ty {
                #[inline]
                fn as_T(&self) -> T {
                    // out of range values saturate to the largest finite value
                    T::$conv(*self).unwrap_or_else(T::max_value)
                }
            }
        )+
    };
}
impl_as_FloatT!(u32 => from_u32, usize => from_usize, f32 => from_f32, f64 => from_f64);

#[test]
fn test_as_T() {
    let x: f64 = 3u32.as_T();
    assert_eq!(x, 3.0);
    let y: f32 = (1e-4).as_T();
    assert_eq!(y, 1e-4_f32);
}
