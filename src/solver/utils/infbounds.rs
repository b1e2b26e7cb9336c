use crate::algebra::*;
use crate::solver::utils::atomic::{AtomicF64, Ordering};
use crate::solver::_INFINITY_DEFAULT;
use lazy_static::lazy_static;
//
lazy_static! {
    static ref INFINITY: AtomicF64 = AtomicF64::new(_INFINITY_DEFAULT);
}

/// Revert the infinity sentinel to its default value.
pub fn default_infinity() {
    INFINITY.store(_INFINITY_DEFAULT, Ordering::Relaxed);
}
/// Set the infinity sentinel to a new value.
pub fn set_infinity(v: f64) {
    INFINITY.store(v, Ordering::Relaxed);
}
/// Get the current value of the infinity sentinel.
pub fn get_infinity() -> f64 {
    INFINITY.load(Ordering::Relaxed)
}

/// The infinity sentinel as a `FloatT`.
pub fn infinity<T: FloatT>() -> T {
    T::from_f64(get_infinity()).unwrap_or_else(T::max_value)
}

/// True if `v` is at or beyond the infinity sentinel in either direction.
pub fn is_infinity<T: FloatT>(v: T) -> bool {
    let inf = infinity::<T>();
    v >= inf || v <= -inf
}

#[test]
fn test_infinity_sentinel() {
    assert!(is_infinity(1e20_f64));
    assert!(is_infinity(-1e21_f64));
    assert!(is_infinity(f64::INFINITY));
    assert!(!is_infinity(1e19_f64));
    assert_eq!(infinity::<f64>(), get_infinity());
}
