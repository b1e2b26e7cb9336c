#![allow(non_snake_case)]
//! Problems with a single free variable and at most one SDP block.
//!
//! With one variable `y` the problem reads
//!
//! ```text
//! min  c y   s.t.  y A - C ⪰ 0,   lb <= y <= ub
//! ```
//!
//! and `f(y) = λ_min(y A - C)` is a concave function of `y` with
//! supergradient `v' A v`, `v` a unit eigenvector for `λ_min`.  Feasible
//! values of `y` form an interval, so the optimum is the end of that
//! interval favoured by the sign of `c`.

use crate::algebra::*;
use crate::solver::{infinity, SdpiError};

/// Input of a [`OneVarSolver`].
#[derive(Debug, Clone, Copy)]
pub struct OneVarProblem<'a, T> {
    pub obj: T,
    pub lb: T,
    pub ub: T,
    pub blocksize: usize,
    /// constant matrix with the fixed variables folded in
    pub constant: TripletsRef<'a, T>,
    /// coefficient matrix of the free variable
    pub matrix: TripletsRef<'a, T>,
    pub feastol: T,
    pub epsilon: T,
}

/// Output of a [`OneVarSolver`].
#[derive(Debug, Clone, PartialEq)]
pub struct OneVarSolution<T> {
    /// `obj * optval`, or the infinity sentinel if the problem is infeasible
    pub objval: T,
    pub optval: T,
    /// smallest eigenvector at the last iterate
    pub certvec: Vec<T>,
    /// supergradient `v' A v` at the last iterate
    pub certval: T,
}

impl<T: FloatT> OneVarSolution<T> {
    pub fn is_infeasible(&self) -> bool {
        self.objval >= infinity()
    }
}

/// Solver for one variable SDPs.  Returns `None` if the solver cannot
/// handle the instance, in which case the general backend is used.
pub trait OneVarSolver<T: FloatT>: Send {
    fn solve(&mut self, problem: &OneVarProblem<'_, T>)
        -> Result<Option<OneVarSolution<T>>, SdpiError>;
}

/// Newton's method on `λ_min(y A - C) = 0`, started at the bound favoured
/// by the objective.  Concavity keeps the iterates on the infeasible side
/// of the root, so they approach it monotonically.
#[derive(Debug, Clone)]
pub struct NewtonOneVar {
    pub maxiter: u32,
}

impl Default for NewtonOneVar {
    fn default() -> Self {
        Self { maxiter: 100 }
    }
}

impl<T: FloatT> OneVarSolver<T> for NewtonOneVar {
    fn solve(
        &mut self,
        problem: &OneVarProblem<'_, T>,
    ) -> Result<Option<OneVarSolution<T>>, SdpiError> {
        let inf = infinity::<T>();
        let n = problem.blocksize;

        // +1: move up from lb, -1: move down from ub
        let (dir, start, limit) = if problem.obj >= T::zero() {
            (T::one(), problem.lb, problem.ub)
        } else {
            (-T::one(), problem.ub, problem.lb)
        };
        if start.abs() >= inf {
            return Ok(None);
        }

        let mut A = Matrix::zeros(n);
        problem.matrix.add_to_dense(&mut A, T::one());

        let mut y = start;
        for iter in 0..self.maxiter {
            if n == 0 {
                return Ok(Some(optimal(problem.obj, y, Vec::new(), T::zero())));
            }

            let mut M = Matrix::zeros(n);
            problem.matrix.add_to_dense(&mut M, y);
            problem.constant.add_to_dense(&mut M, -T::one());
            let (f, v) = smallest_eigenpair(&mut M, true)?;
            let v = v.unwrap_or_else(|| vec![T::zero(); n]);
            let g = A.quad_form(&v);

            tracing::trace!(component = "onevar", iter, y = %y, f = %f, g = %g, "newton step");

            if f >= -problem.feastol {
                return Ok(Some(optimal(problem.obj, y, v, g)));
            }
            // f cannot be increased in the search direction
            if dir * g <= problem.epsilon {
                return Ok(Some(infeasible(y, v, g)));
            }
            y -= f / g;
            if dir * (y - limit) > T::zero() {
                return Ok(Some(infeasible(y, v, g)));
            }
        }

        tracing::warn!(component = "onevar", maxiter = self.maxiter, "newton method did not converge");
        Ok(None)
    }
}

fn optimal<T: FloatT>(obj: T, y: T, certvec: Vec<T>, certval: T) -> OneVarSolution<T> {
    OneVarSolution {
        objval: obj * y,
        optval: y,
        certvec,
        certval,
    }
}

fn infeasible<T: FloatT>(y: T, certvec: Vec<T>, certval: T) -> OneVarSolution<T> {
    OneVarSolution {
        objval: infinity(),
        optval: y,
        certvec,
        certval,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn triplets(r: Vec<usize>, c: Vec<usize>, v: Vec<f64>) -> Triplets<f64> {
        Triplets::from_parts(r, c, v).unwrap()
    }

    fn solve(obj: f64, lb: f64, ub: f64, C: &Triplets<f64>, A: &Triplets<f64>) -> Option<OneVarSolution<f64>> {
        let problem = OneVarProblem {
            obj,
            lb,
            ub,
            blocksize: 2,
            constant: C.as_ref(),
            matrix: A.as_ref(),
            feastol: 1e-8,
            epsilon: 1e-9,
        };
        NewtonOneVar::default().solve(&problem).unwrap()
    }

    #[test]
    fn test_identity_block_at_lower_bound() {
        let A = triplets(vec![0, 1], vec![0, 1], vec![1.0, 1.0]);
        let C = Triplets::new();
        let sol = solve(1.0, 0.0, 5.0, &C, &A).unwrap();
        assert_eq!(sol.optval, 0.0);
        assert_eq!(sol.objval, 0.0);
        assert!((sol.certval - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_newton_reaches_root() {
        // y [[1,0],[0,2]] - [[3,1],[1,2]] ⪰ 0
        let A = triplets(vec![0, 1], vec![0, 1], vec![1.0, 2.0]);
        let C = triplets(vec![0, 1, 1], vec![0, 0, 1], vec![3.0, 1.0, 2.0]);
        let sol = solve(2.0, 0.0, 10.0, &C, &A).unwrap();
        assert!(!sol.is_infeasible());

        // larger root of det(y A - C) = 2y^2 - 8y + 5
        let root = 2.0 + 6.0_f64.sqrt() / 2.0;
        assert!((sol.optval - root).abs() < 1e-6);
        assert!((sol.objval - 2.0 * sol.optval).abs() < 1e-12);
        assert!(sol.optval <= root + 1e-12);
    }

    #[test]
    fn test_infeasible_cases() {
        // root above the upper bound
        let A = triplets(vec![0, 1], vec![0, 1], vec![1.0, 1.0]);
        let C = triplets(vec![0, 1], vec![0, 1], vec![3.0, 3.0]);
        let sol = solve(1.0, 0.0, 2.0, &C, &A).unwrap();
        assert!(sol.is_infeasible());

        // A negative semidefinite, increasing y never helps
        let A = triplets(vec![0], vec![0], vec![-1.0]);
        let C = triplets(vec![0, 1], vec![0, 1], vec![1.0, 1.0]);
        let sol = solve(1.0, 0.0, 2.0, &C, &A).unwrap();
        assert!(sol.is_infeasible());
    }

    #[test]
    fn test_negative_objective_and_not_applicable() {
        // -y [[1,0],[0,1]] + [[4,0],[0,4]] ⪰ 0, maximize y
        let A = triplets(vec![0, 1], vec![0, 1], vec![-1.0, -1.0]);
        let C = triplets(vec![0, 1], vec![0, 1], vec![-4.0, -4.0]);
        let sol = solve(-1.0, 0.0, 10.0, &C, &A).unwrap();
        assert!((sol.optval - 4.0).abs() < 1e-8);
        assert!((sol.objval + 4.0).abs() < 1e-8);

        assert!(solve(-1.0, 0.0, 1e20, &C, &A).is_none());
    }
}
