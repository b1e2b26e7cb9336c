//! Internal utility functions and helpers.

pub(crate) mod atomic;
pub(crate) mod infbounds;

use crate::algebra::{FloatT, Triplets};
use crate::solver::SdpiError;

// array growth parameters
const GROW_INIT: usize = 4;
const GROW_FAC: f64 = 1.2;

/// Capacity for at least `num` entries, taken from the sequence
/// `s(0) = max(initsize, GROW_INIT)`, `s(k+1) = GROW_FAC * s(k) + s(0)`.
/// The sequence does not depend on `num`, so repeated growth of the same
/// array always visits the same sizes.
pub(crate) fn calc_grow_size(initsize: usize, num: usize) -> usize {
    let initsize = initsize.max(GROW_INIT);
    let mut size = initsize;
    let mut oldsize = size.saturating_sub(1);

    // second condition checks against overflow
    while size < num && size > oldsize {
        oldsize = size;
        let next = GROW_FAC * size as f64 + initsize as f64;
        size = if next >= usize::MAX as f64 {
            oldsize
        } else {
            next as usize
        };
    }

    if size <= oldsize {
        size = num;
    }
    size
}

/// Make room for `requested` entries in total.  Reallocates only if
/// the current capacity is too small and never shrinks.
pub(crate) fn ensure_capacity<V>(v: &mut Vec<V>, requested: usize) -> Result<(), SdpiError> {
    if requested <= v.capacity() {
        return Ok(());
    }
    let newsize = calc_grow_size(v.capacity(), requested);
    v.try_reserve_exact(newsize - v.len())?;
    Ok(())
}

/// As [`ensure_capacity`], for all three arrays of a triplet store.
pub(crate) fn ensure_triplets_capacity<T: FloatT>(
    t: &mut Triplets<T>,
    requested: usize,
) -> Result<(), SdpiError> {
    if requested <= t.capacity() {
        return Ok(());
    }
    let newsize = calc_grow_size(t.capacity(), requested);
    t.try_reserve_total(newsize)?;
    Ok(())
}

// -------------
// testing

#[test]
fn test_calc_grow_size() {
    assert_eq!(calc_grow_size(0, 0), 4);
    assert_eq!(calc_grow_size(0, 4), 4);
    // 4 -> 8 -> 13, truncating each step
    assert_eq!(calc_grow_size(0, 5), 8);
    assert_eq!(calc_grow_size(0, 9), 13);
    assert_eq!(calc_grow_size(10, 11), 22);

    for num in [1, 17, 1000, 123_457] {
        let size = calc_grow_size(7, num);
        assert!(size >= num);
    }
}

#[test]
fn test_ensure_capacity() {
    let mut v: Vec<f64> = Vec::new();
    ensure_capacity(&mut v, 5).unwrap();
    assert!(v.capacity() >= 5);

    let cap = v.capacity();
    ensure_capacity(&mut v, 2).unwrap();
    assert_eq!(v.capacity(), cap);

    v.extend([1.0; 5]);
    ensure_capacity(&mut v, 100).unwrap();
    assert!(v.capacity() >= 100);
    assert_eq!(v, vec![1.0; 5]);
}
