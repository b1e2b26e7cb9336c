#![allow(non_snake_case)]
use super::WorkingData;
use crate::algebra::*;
use crate::solver::utils::{ensure_capacity, ensure_triplets_capacity};
use crate::solver::{SdpProblem, SdpiError, SdpiSettings};

impl<T> WorkingData<T>
where
    T: FloatT,
{
    /// Objective contribution `Σ obj[v] * lb[v]` of the fixed variables.
    pub fn fixed_objective(&self, problem: &SdpProblem<T>) -> T {
        let mut contr = QuadPrec::default();
        for (v, &c) in problem.obj().iter().enumerate() {
            if self.is_fixed(v) {
                contr.add_product(c, self.bounds.lb[v]);
            }
        }
        contr.value()
    }

    /// Move every fixed variable with a nonzero value into the constant
    /// matrix of its blocks, `A_0 - Σ lb[v] A_v`, summing entries at the same
    /// position and dropping those that cancel.
    pub fn fold_constants(&mut self, problem: &SdpProblem<T>) -> Result<(), SdpiError> {
        let nblocks = problem.nblocks();
        let eps = self.epsilon;
        ensure_capacity(&mut self.constants, nblocks)?;
        self.constants.resize_with(nblocks, Triplets::new);

        for b in 0..nblocks {
            let folded: Vec<(usize, T)> = problem
                .block_vars(b)
                .iter()
                .enumerate()
                .filter(|&(_, &v)| self.is_fixed(v) && self.bounds.lb[v].abs() > eps)
                .map(|(k, &v)| (k, self.bounds.lb[v]))
                .collect();

            let constant = problem.block_constant(b);
            let nnz = constant.nnz()
                + folded
                    .iter()
                    .map(|&(k, _)| problem.block_var_entries(b, k).nnz())
                    .sum::<usize>();

            let target = &mut self.constants[b];
            target.clear();
            ensure_triplets_capacity(target, nnz)?;
            target.extend_scaled(constant, T::one());
            for &(k, value) in folded.iter() {
                target.extend_scaled(problem.block_var_entries(b, k), -value);
            }
            target.merge_and_cancel(eps);
        }
        Ok(())
    }

    /// With every variable fixed, test `Σ lb[v] A_v - A_0 ⪰ 0` block by
    /// block through the smallest eigenvalue.  Stops at the first violated
    /// block.  The eigenvectors are kept if `allfixed_primal_ray` is set.
    pub fn check_fixed_feasibility(
        &mut self,
        problem: &SdpProblem<T>,
        settings: &SdpiSettings<T>,
    ) -> Result<bool, SdpiError> {
        let want_vectors = settings.allfixed_primal_ray;
        self.fixedvecs.clear();

        for b in 0..problem.nblocks() {
            let size = problem.block_size(b);
            if size == 0 {
                self.fixedvecs.push(None);
                continue;
            }

            let mut M = Matrix::zeros(size);
            problem.block_constant(b).add_to_dense(&mut M, -T::one());
            for (k, &v) in problem.block_vars(b).iter().enumerate() {
                let value = self.bounds.lb[v];
                if value.abs() < settings.epsilon {
                    continue;
                }
                problem.block_var_entries(b, k).add_to_dense(&mut M, value);
            }

            let (λ, vec) = smallest_eigenpair(&mut M, want_vectors)?;
            self.fixedvecs.push(vec);

            if λ < -settings.feastol {
                tracing::debug!(
                    component = "preprocess",
                    block = b,
                    eigenvalue = %λ,
                    "all variables fixed and block is not positive semidefinite"
                );
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::solver::*;

    fn problem() -> SdpProblem<f64> {
        // block 0: y0 * [[1,0],[0,2]] + y1 * [[0,1],[1,0]] - [[1,0],[0,0]]
        let data = ProblemData {
            obj: vec![1.0, -1.0],
            lb: vec![2.0, 0.5],
            ub: vec![2.0, 0.5],
            isintegral: None,
            blocks: vec![SdpBlock {
                size: 2,
                vars: vec![
                    BlockVar {
                        var: 0,
                        entries: Triplets::from_parts(vec![0, 1], vec![0, 1], vec![1.0, 2.0]).unwrap(),
                    },
                    BlockVar {
                        var: 1,
                        entries: Triplets::from_parts(vec![1], vec![0], vec![1.0]).unwrap(),
                    },
                ],
                constant: Triplets::from_parts(vec![0], vec![0], vec![1.0]).unwrap(),
            }],
            rows: vec![],
        };
        let mut p = SdpProblem::new();
        p.load(&data).unwrap();
        p
    }

    #[test]
    fn test_fold_constants() {
        let p = problem();
        let settings = SdpiSettings::default();
        let mut work = WorkingData::new();
        work.reset(&p, &settings).unwrap();
        work.fold_constants(&p).unwrap();

        // [[1,0],[0,0]] - 2 [[1,0],[0,2]] - 0.5 [[0,1],[1,0]]
        let c = &work.constants[0];
        assert_eq!(c.row, vec![0, 1, 1]);
        assert_eq!(c.col, vec![0, 0, 1]);
        assert_eq!(c.val, vec![-1.0, -0.5, -4.0]);

        assert_eq!(work.fixed_objective(&p), 1.5);
    }

    #[test]
    fn test_check_fixed_feasibility() {
        let mut p = problem();
        let settings = SdpiSettingsBuilder::default()
            .allfixed_primal_ray(true)
            .build()
            .unwrap();
        let mut work = WorkingData::new();

        // [[1,0.5],[0.5,4]] is positive definite
        work.reset(&p, &settings).unwrap();
        assert!(work.check_fixed_feasibility(&p, &settings).unwrap());
        assert!(work.fixedvecs[0].is_some());

        // [[-1,0.5],[0.5,0]] is not
        p.chg_bounds(&[0], &[0.0], &[0.0]).unwrap();
        work.reset(&p, &settings).unwrap();
        assert!(!work.check_fixed_feasibility(&p, &settings).unwrap());
        let v = work.fixedvecs[0].as_ref().unwrap();
        assert!((v[0] * v[0] + v[1] * v[1] - 1.0).abs() < 1e-12);
    }
}
