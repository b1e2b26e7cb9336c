#![allow(non_snake_case)]
use crate::algebra::*;
use itertools::izip;
use std::collections::TryReserveError;
use std::ops::Range;

/// Sparse symmetric matrix held as lower triangular `(row, col, val)`
/// triplets with `row >= col`.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Triplets<T> {
    pub row: Vec<usize>,
    pub col: Vec<usize>,
    pub val: Vec<T>,
}

/// Borrowed view of a run of triplets.
#[derive(Debug, Clone, Copy)]
pub struct TripletsRef<'a, T> {
    pub row: &'a [usize],
    pub col: &'a [usize],
    pub val: &'a [T],
}

impl<T> Triplets<T>
where
    T: FloatT,
{
    pub fn new() -> Self {
        Self {
            row: Vec::new(),
            col: Vec::new(),
            val: Vec::new(),
        }
    }

    /// Build from parallel arrays, checking lengths only.
    pub fn from_parts(
        row: Vec<usize>,
        col: Vec<usize>,
        val: Vec<T>,
    ) -> Result<Self, SparseFormatError> {
        if row.len() != col.len() || row.len() != val.len() {
            return Err(SparseFormatError::IncompatibleDimension);
        }
        Ok(Self { row, col, val })
    }

    pub fn nnz(&self) -> usize {
        self.val.len()
    }

    pub fn is_empty(&self) -> bool {
        self.val.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.val.capacity()
    }

    pub fn clear(&mut self) {
        self.row.clear();
        self.col.clear();
        self.val.clear();
    }

    pub fn truncate(&mut self, len: usize) {
        self.row.truncate(len);
        self.col.truncate(len);
        self.val.truncate(len);
    }

    pub fn push(&mut self, row: usize, col: usize, val: T) {
        self.row.push(row);
        self.col.push(col);
        self.val.push(val);
    }

    /// Reserve room for at least `capacity` entries in total.
    pub fn try_reserve_total(&mut self, capacity: usize) -> Result<(), TryReserveError> {
        let additional = capacity.saturating_sub(self.nnz());
        self.row.try_reserve_exact(additional)?;
        self.col.try_reserve_exact(additional)?;
        self.val.try_reserve_exact(additional)?;
        Ok(())
    }

    pub fn as_ref(&self) -> TripletsRef<'_, T> {
        TripletsRef {
            row: &self.row,
            col: &self.col,
            val: &self.val,
        }
    }

    pub fn slice(&self, range: Range<usize>) -> TripletsRef<'_, T> {
        TripletsRef {
            row: &self.row[range.clone()],
            col: &self.col[range.clone()],
            val: &self.val[range],
        }
    }

    /// Append `scale * other`.
    pub fn extend_scaled(&mut self, other: TripletsRef<'_, T>, scale: T) {
        self.row.extend_from_slice(other.row);
        self.col.extend_from_slice(other.col);
        self.val.extend(other.val.iter().map(|&v| v * scale));
    }

    /// Sort by `(row, col)`, sum duplicate positions and drop every
    /// entry whose magnitude does not exceed `epsilon`.
    pub fn merge_and_cancel(&mut self, epsilon: T) {
        if self.is_empty() {
            return;
        }

        let mut entries: Vec<(usize, usize, T)> =
            izip!(&self.row, &self.col, &self.val).map(|(&r, &c, &v)| (r, c, v)).collect();
        entries.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

        self.clear();
        let mut iter = entries.into_iter();
        let Some((mut r, mut c, mut sum)) = iter.next() else {
            return;
        };
        for (nr, nc, v) in iter {
            if (nr, nc) == (r, c) {
                sum += v;
            } else {
                if sum.abs() > epsilon {
                    self.push(r, c, sum);
                }
                (r, c, sum) = (nr, nc, v);
            }
        }
        if sum.abs() > epsilon {
            self.push(r, c, sum);
        }
    }
}

impl<'a, T> TripletsRef<'a, T>
where
    T: FloatT,
{
    pub fn nnz(&self) -> usize {
        self.val.len()
    }

    pub fn is_empty(&self) -> bool {
        self.val.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, T)> + 'a {
        izip!(self.row, self.col, self.val).map(|(&r, &c, &v)| (r, c, v))
    }

    /// Check that all entries are in the lower triangle of an `n x n` matrix.
    pub fn check_format(&self, n: usize) -> Result<(), SparseFormatError> {
        if self.row.len() != self.val.len() || self.col.len() != self.val.len() {
            return Err(SparseFormatError::IncompatibleDimension);
        }
        for (r, c, _) in self.iter() {
            if r >= n {
                return Err(SparseFormatError::IndexOutOfRange(r, n));
            }
            if c > r {
                return Err(SparseFormatError::NotLowerTriangular(r, c));
            }
        }
        Ok(())
    }

    /// Add `scale` times the symmetric matrix to the full dense `A`.
    pub fn add_to_dense(&self, A: &mut Matrix<T>, scale: T) {
        for (r, c, v) in self.iter() {
            A.add_symmetric(r, c, scale * v);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_merge_and_cancel() {
        let mut t = Triplets::<f64>::from_parts(
            vec![1, 0, 1, 2, 1, 2],
            vec![0, 0, 0, 2, 1, 2],
            vec![2.0, 1.0, -2.0, 1.0, 1e-12, 3.0],
        )
        .unwrap();
        t.merge_and_cancel(1e-9);

        assert_eq!(t.row, vec![0, 2]);
        assert_eq!(t.col, vec![0, 2]);
        assert_eq!(t.val, vec![1.0, 4.0]);
    }

    #[test]
    fn test_check_format() {
        let t = Triplets::<f64>::from_parts(vec![0, 1], vec![0, 1], vec![1.0, 1.0]).unwrap();
        assert!(t.as_ref().check_format(2).is_ok());
        assert_eq!(
            t.as_ref().check_format(1),
            Err(SparseFormatError::IndexOutOfRange(1, 1))
        );

        let t = Triplets::<f64>::from_parts(vec![0], vec![1], vec![1.0]).unwrap();
        assert_eq!(
            t.as_ref().check_format(2),
            Err(SparseFormatError::NotLowerTriangular(0, 1))
        );

        assert_eq!(
            Triplets::<f64>::from_parts(vec![0], vec![], vec![1.0]),
            Err(SparseFormatError::IncompatibleDimension)
        );
    }

    #[test]
    fn test_add_to_dense() {
        let t = Triplets::<f64>::from_parts(vec![0, 1], vec![0, 0], vec![1.0, 2.0]).unwrap();
        let mut A = Matrix::zeros(2);
        t.as_ref().add_to_dense(&mut A, -1.0);
        assert_eq!(A[(0, 0)], -1.0);
        assert_eq!(A[(1, 0)], -2.0);
        assert_eq!(A[(0, 1)], -2.0);
        assert_eq!(A[(1, 1)], 0.0);
    }
}
