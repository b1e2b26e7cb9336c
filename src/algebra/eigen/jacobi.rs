#![allow(non_snake_case)]
#![cfg_attr(feature = "lapack", allow(dead_code))]

use super::SmallestEigen;
use crate::algebra::*;

// Cyclic Jacobi method for dense symmetric matrices.  See:
// Numerical recipes in C, 2nd edition, §11.1

const MAX_SWEEPS: usize = 100;

pub struct JacobiEigen<T> {
    /// accumulated rotations
    V: Matrix<T>,
}

impl<T> JacobiEigen<T>
where
    T: FloatT,
{
    pub fn new(n: usize) -> Self {
        Self { V: Matrix::zeros(n) }
    }
}

impl<T> SmallestEigen<T> for JacobiEigen<T>
where
    T: FloatT,
{
    fn smallest_eigenpair(
        &mut self,
        A: &mut Matrix<T>,
        want_vector: bool,
    ) -> Result<(T, Option<Vec<T>>), DenseFactorizationError> {
        let n = A.n();
        if n != self.V.n() || n == 0 {
            return Err(DenseFactorizationError::IncompatibleDimension);
        }

        let V = &mut self.V;
        V.fill(T::zero());
        (0..n).for_each(|i| V[(i, i)] = T::one());

        let frobsq: T = A.data().iter().fold(T::zero(), |acc, &x| acc + x * x);
        let tol = T::epsilon() * T::epsilon() * frobsq;

        for _ in 0..MAX_SWEEPS {
            if off_diagonal_sumsq(A) <= tol {
                break;
            }
            for p in 0..n {
                for q in (p + 1)..n {
                    if A[(q, p)] == T::zero() {
                        continue;
                    }
                    let (c, s) = compute_rotation(A, p, q);
                    apply_rotation(A, V, p, q, c, s);
                }
            }
        }

        // eigenvalues are on the diagonal of A
        let (imin, λ) = (0..n)
            .map(|i| (i, A[(i, i)]))
            .fold((0, A[(0, 0)]), |best, cur| if cur.1 < best.1 { cur } else { best });

        let v = want_vector.then(|| (0..n).map(|i| V[(i, imin)]).collect());
        Ok((λ, v))
    }
}

fn off_diagonal_sumsq<T: FloatT>(A: &Matrix<T>) -> T {
    let mut out = T::zero();
    for j in 0..A.n() {
        for i in (j + 1)..A.n() {
            out += A[(i, j)] * A[(i, j)];
        }
    }
    out + out
}

fn compute_rotation<T: FloatT>(A: &Matrix<T>, p: usize, q: usize) -> (T, T) {
    let Apq = A[(q, p)];
    let App = A[(p, p)];
    let Aqq = A[(q, q)];

    let diffdiag = Aqq - App;
    let d = App.abs().max(Aqq.abs());

    if d < T::epsilon() || diffdiag.abs() < T::epsilon() * d {
        // diagonal elements nearly equal, use 45 degrees
        return (T::FRAC_1_SQRT_2(), T::FRAC_1_SQRT_2());
    }

    let theta = diffdiag / (Apq * (2.0).as_T());

    // need caution here if theta^2 overflows
    let thetasq = theta * theta;
    let t = if thetasq.is_finite() {
        theta.signum() / (theta.abs() + T::sqrt(T::one() + thetasq))
    } else {
        let half: T = (0.5).as_T();
        half / theta
    };
    let c = T::recip(T::sqrt(T::one() + t * t));
    (c, t * c)
}

// A <- P'AP and V <- VP for the plane rotation P in (p,q)
fn apply_rotation<T: FloatT>(A: &mut Matrix<T>, V: &mut Matrix<T>, p: usize, q: usize, c: T, s: T) {
    let n = A.n();
    for k in 0..n {
        let (akp, akq) = (A[(k, p)], A[(k, q)]);
        A[(k, p)] = c * akp - s * akq;
        A[(k, q)] = s * akp + c * akq;
    }
    for k in 0..n {
        let (apk, aqk) = (A[(p, k)], A[(q, k)]);
        A[(p, k)] = c * apk - s * aqk;
        A[(q, k)] = s * apk + c * aqk;
    }
    // exact zero for the rotated pair
    A[(q, p)] = T::zero();
    A[(p, q)] = T::zero();

    for k in 0..n {
        let (vkp, vkq) = (V[(k, p)], V[(k, q)]);
        V[(k, p)] = c * vkp - s * vkq;
        V[(k, q)] = s * vkp + c * vkq;
    }
}
