#![allow(non_snake_case)]
//! Smallest eigenpair of dense symmetric matrices.
//!
//! Engines are chosen by matrix size.  1x1 and 2x2 matrices are handled
//! in closed form, larger ones with LAPACK `?syevr` when the "lapack"
//! feature is enabled, or otherwise with a cyclic Jacobi method.

use crate::algebra::*;
use enum_dispatch::*;
use std::marker::PhantomData;

mod jacobi;
#[cfg(feature = "lapack")]
mod lapack;

#[cfg(feature = "lapack")]
pub use self::lapack::LapackFloatT;

/// Smallest eigenvalue of a dense symmetric matrix, with an
/// optional unit eigenvector.  The input matrix may be overwritten.
#[enum_dispatch]
pub trait SmallestEigen<T>
where
    T: FloatT,
{
    fn smallest_eigenpair(
        &mut self,
        A: &mut Matrix<T>,
        want_vector: bool,
    ) -> Result<(T, Option<Vec<T>>), DenseFactorizationError>;
}

#[enum_dispatch(SmallestEigen<T>)]
pub enum EigenEngine<T>
where
    T: FloatT,
{
    ScalarEigen(ScalarEigen<T>),
    Sym2Eigen(Sym2Eigen<T>),
    DenseEigen(DenseEigen<T>),
}

impl<T> EigenEngine<T>
where
    T: FloatT,
{
    pub fn new(n: usize) -> Self {
        match n {
            0 | 1 => ScalarEigen::default().into(),
            2 => Sym2Eigen::default().into(),
            _ => DenseEigen::new(n).into(),
        }
    }
}

/// Compute the smallest eigenpair of `A` with an engine sized for it.
pub fn smallest_eigenpair<T: FloatT>(
    A: &mut Matrix<T>,
    want_vector: bool,
) -> Result<(T, Option<Vec<T>>), DenseFactorizationError> {
    EigenEngine::new(A.n()).smallest_eigenpair(A, want_vector)
}

// ---------------------------------
// 1x1
// ---------------------------------

#[derive(Default)]
pub struct ScalarEigen<T> {
    phantom: PhantomData<T>,
}

impl<T> SmallestEigen<T> for ScalarEigen<T>
where
    T: FloatT,
{
    fn smallest_eigenpair(
        &mut self,
        A: &mut Matrix<T>,
        want_vector: bool,
    ) -> Result<(T, Option<Vec<T>>), DenseFactorizationError> {
        if A.n() != 1 {
            return Err(DenseFactorizationError::IncompatibleDimension);
        }
        let v = want_vector.then(|| vec![T::one()]);
        Ok((A[(0, 0)], v))
    }
}

// ---------------------------------
// 2x2
// ---------------------------------

#[derive(Default)]
pub struct Sym2Eigen<T> {
    phantom: PhantomData<T>,
}

impl<T> SmallestEigen<T> for Sym2Eigen<T>
where
    T: FloatT,
{
    fn smallest_eigenpair(
        &mut self,
        A: &mut Matrix<T>,
        want_vector: bool,
    ) -> Result<(T, Option<Vec<T>>), DenseFactorizationError> {
        if A.n() != 2 {
            return Err(DenseFactorizationError::IncompatibleDimension);
        }
        let half: T = (0.5).as_T();
        let (a, b, d) = (A[(0, 0)], A[(1, 0)], A[(1, 1)]);

        let mean = (a + d) * half;
        let radius = T::hypot((a - d) * half, b);
        let λ = mean - radius;

        if !want_vector {
            return Ok((λ, None));
        }

        // two candidate null vectors of A - λI; keep the better scaled one
        let u = [b, λ - a];
        let w = [λ - d, b];
        let nu = T::hypot(u[0], u[1]);
        let nw = T::hypot(w[0], w[1]);

        let v = if nu.max(nw) <= T::epsilon() * (T::one() + a.abs() + d.abs()) {
            // A is a multiple of the identity
            if a <= d {
                vec![T::one(), T::zero()]
            } else {
                vec![T::zero(), T::one()]
            }
        } else if nu >= nw {
            vec![u[0] / nu, u[1] / nu]
        } else {
            vec![w[0] / nw, w[1] / nw]
        };
        Ok((λ, Some(v)))
    }
}

// ---------------------------------
// general dense
// ---------------------------------

cfg_if::cfg_if! {
    if #[cfg(feature="lapack")] {
        pub use self::lapack::DenseEigen;
    } else {
        pub use self::jacobi::JacobiEigen as DenseEigen;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn sym(n: usize, lower: &[(usize, usize, f64)]) -> Matrix<f64> {
        let mut A = Matrix::zeros(n);
        for &(r, c, v) in lower {
            A.add_symmetric(r, c, v);
        }
        A
    }

    fn check_pair(A: &Matrix<f64>, λ: f64, v: &[f64]) {
        // ‖Av - λv‖ small and v unit
        let n = A.n();
        let norm: f64 = v.iter().map(|x| x * x).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-10);
        for i in 0..n {
            let Av: f64 = (0..n).map(|j| A[(i, j)] * v[j]).sum();
            assert!((Av - λ * v[i]).abs() < 1e-8);
        }
    }

    #[test]
    fn test_eigen_1x1() {
        let mut A = sym(1, &[(0, 0, -3.0)]);
        let (λ, v) = smallest_eigenpair(&mut A, true).unwrap();
        assert_eq!(λ, -3.0);
        assert_eq!(v.unwrap(), vec![1.0]);
    }

    #[test]
    fn test_eigen_2x2() {
        let A0 = sym(2, &[(0, 0, 2.0), (1, 0, 1.0), (1, 1, 2.0)]);
        let mut A = A0.clone();
        let (λ, v) = smallest_eigenpair(&mut A, true).unwrap();
        assert!((λ - 1.0).abs() < 1e-12);
        check_pair(&A0, λ, &v.unwrap());

        // diagonal and identity cases
        let A0 = sym(2, &[(0, 0, 4.0), (1, 1, -1.0)]);
        let mut A = A0.clone();
        let (λ, v) = smallest_eigenpair(&mut A, true).unwrap();
        assert_eq!(λ, -1.0);
        check_pair(&A0, λ, &v.unwrap());

        let mut A = sym(2, &[(0, 0, 1.0), (1, 1, 1.0)]);
        let (λ, v) = smallest_eigenpair(&mut A, true).unwrap();
        assert_eq!(λ, 1.0);
        assert_eq!(v.unwrap(), vec![1.0, 0.0]);
    }

    #[test]
    fn test_eigen_dense() {
        // eigenvalues 2 - √2, 2 and 2 + √2
        let A0 = sym(
            3,
            &[(0, 0, 2.0), (1, 0, -1.0), (1, 1, 2.0), (2, 1, -1.0), (2, 2, 2.0)],
        );
        let mut A = A0.clone();
        let (λ, v) = smallest_eigenpair(&mut A, true).unwrap();
        assert!((λ - (2.0 - f64::sqrt(2.0))).abs() < 1e-10);
        check_pair(&A0, λ, &v.unwrap());

        let A0 = sym(
            4,
            &[
                (0, 0, 1.0),
                (1, 1, -2.0),
                (2, 2, 3.0),
                (3, 3, 0.5),
                (3, 0, 0.25),
                (2, 1, 0.1),
            ],
        );
        let mut A = A0.clone();
        let (λ, v) = smallest_eigenpair(&mut A, true).unwrap();
        assert!(λ < -2.0 && λ > -2.01);
        check_pair(&A0, λ, &v.unwrap());
    }

    #[test]
    fn test_eigen_dimension_check() {
        let mut A = Matrix::<f64>::zeros(3);
        let mut engine = ScalarEigen::<f64>::default();
        assert_eq!(
            engine.smallest_eigenpair(&mut A, false),
            Err(DenseFactorizationError::IncompatibleDimension)
        );
    }
}
