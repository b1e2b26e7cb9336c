#![allow(non_snake_case)]
use crate::algebra::*;
use std::ops::{Index, IndexMut};

/// Dense square matrix in column major format.  Used for the fully
/// populated symmetric matrices handed to the eigen solvers.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    n: usize,
    data: Vec<T>,
}

impl<T> Matrix<T>
where
    T: FloatT,
{
    pub fn zeros(n: usize) -> Self {
        Self {
            n,
            data: vec![T::zero(); n * n],
        }
    }

    /// The matrix `s * v * v'`.
    pub fn rank_one(v: &[T], s: T) -> Self {
        let mut A = Self::zeros(v.len());
        for (j, &vj) in v.iter().enumerate() {
            for (i, &vi) in v.iter().enumerate() {
                A[(i, j)] = s * vi * vj;
            }
        }
        A
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn fill(&mut self, v: T) {
        self.data.iter_mut().for_each(|x| *x = v);
    }

    /// Add `v` at `(r,c)` and, off the diagonal, at `(c,r)`.
    pub fn add_symmetric(&mut self, r: usize, c: usize, v: T) {
        self[(r, c)] += v;
        if r != c {
            self[(c, r)] += v;
        }
    }

    /// Rayleigh quotient numerator `v' A v`.
    pub fn quad_form(&self, v: &[T]) -> T {
        let mut out = T::zero();
        for j in 0..self.n {
            for i in 0..self.n {
                out += v[i] * self[(i, j)] * v[j];
            }
        }
        out
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;
    fn index(&self, (i, j): (usize, usize)) -> &T {
        &self.data[i + j * self.n]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut T {
        &mut self.data[i + j * self.n]
    }
}
