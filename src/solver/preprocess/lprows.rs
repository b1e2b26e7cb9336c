use super::{tighten_row_coefs, WorkingData};
use crate::algebra::*;
use crate::solver::utils::ensure_capacity;
use crate::solver::{infinity, LpRowsRef, SdpProblem, SdpiError, SdpiSettings};

/// LP rows left after preprocessing, in compressed row form.
#[derive(Debug, Clone)]
pub struct WorkingRows<T> {
    pub lhs: Vec<T>,
    pub rhs: Vec<T>,
    pub beg: Vec<usize>,
    pub ind: Vec<usize>,
    pub val: Vec<T>,
    /// position of each original row among the kept rows, or -1
    pub rowmap: Vec<isize>,
}

impl<T> Default for WorkingRows<T> {
    fn default() -> Self {
        Self {
            lhs: Vec::new(),
            rhs: Vec::new(),
            beg: vec![0],
            ind: Vec::new(),
            val: Vec::new(),
            rowmap: Vec::new(),
        }
    }
}

impl<T> WorkingRows<T>
where
    T: FloatT,
{
    pub fn nrows(&self) -> usize {
        self.lhs.len()
    }

    pub fn as_ref(&self) -> LpRowsRef<'_, T> {
        LpRowsRef {
            lhs: &self.lhs,
            rhs: &self.rhs,
            beg: &self.beg,
            ind: &self.ind,
            val: &self.val,
        }
    }

    fn clear(&mut self) {
        self.lhs.clear();
        self.rhs.clear();
        self.beg.clear();
        self.beg.push(0);
        self.ind.clear();
        self.val.clear();
        self.rowmap.clear();
    }
}

/// Summary of one pass over the LP rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LpPass {
    pub infeasible: bool,
    /// a singleton row fixed a variable, so another pass may find more
    pub fixingsfound: bool,
    pub nchgcoefs: usize,
    pub nboundchgs: usize,
}

impl<T> WorkingData<T>
where
    T: FloatT,
{
    /// One pass over the LP rows of `problem` against the working bounds.
    ///
    /// Fixed variables are moved into the sides.  Rows with at least two
    /// free variables are coefficient tightened and kept unless redundant,
    /// rows with one free variable become bounds on it and rows with no
    /// free variable are checked for violation.  The kept rows replace the
    /// working rows of the previous pass.
    pub fn prepare_lp(
        &mut self,
        problem: &SdpProblem<T>,
        settings: &SdpiSettings<T>,
    ) -> Result<LpPass, SdpiError> {
        let lp = problem.lp_rows();
        let eps = settings.epsilon;
        let feastol = settings.feastol;
        let inf = infinity::<T>();

        let rows = &mut self.lp;
        rows.clear();
        ensure_capacity(&mut rows.lhs, lp.nrows())?;
        ensure_capacity(&mut rows.rhs, lp.nrows())?;
        ensure_capacity(&mut rows.beg, lp.nrows() + 1)?;
        ensure_capacity(&mut rows.ind, lp.nnz())?;
        ensure_capacity(&mut rows.val, lp.nnz())?;
        ensure_capacity(&mut rows.rowmap, lp.nrows())?;

        let bounds = &mut self.bounds;
        let mut pass = LpPass::default();

        for i in 0..lp.nrows() {
            let (ind, val) = lp.row(i);
            let start = rows.ind.len();
            let mut rowconst = QuadPrec::default();
            let mut single = None;

            for (&j, &a) in ind.iter().zip(val) {
                // coefficients at or below epsilon are treated as absent
                if a.abs() <= eps {
                    continue;
                }
                if bounds.is_fixed(j, eps) {
                    rowconst.add_product(a, bounds.lb[j]);
                } else {
                    rows.ind.push(j);
                    rows.val.push(a);
                    single = Some((j, a));
                }
            }
            let nfree = rows.ind.len() - start;
            let lhs = shift_side(lp.lhs[i], rowconst, -inf);
            let rhs = shift_side(lp.rhs[i], rowconst, inf);

            match single {
                None => {
                    rows.rowmap.push(-1);
                    if lhs > feastol || rhs < -feastol {
                        tracing::debug!(component = "preprocess", row = i, lhs = %lhs, rhs = %rhs, "row without free variables is violated");
                        pass.infeasible = true;
                        return Ok(pass);
                    }
                }
                Some((j, a)) if nfree == 1 => {
                    rows.ind.truncate(start);
                    rows.val.truncate(start);
                    rows.rowmap.push(-1);
                    pass.nboundchgs += bounds.tighten_from_row(i, j, a, (lhs, rhs), eps);

                    if bounds.lb[j] > bounds.ub[j] + feastol {
                        tracing::debug!(
                            component = "preprocess",
                            var = j,
                            lb = %bounds.lb[j],
                            ub = %bounds.ub[j],
                            "bounds from singleton row are contradictory"
                        );
                        pass.infeasible = true;
                        return Ok(pass);
                    }
                    if bounds.is_fixed(j, eps) {
                        tracing::debug!(component = "preprocess", var = j, value = %bounds.lb[j], "fixed variable");
                        pass.fixingsfound = true;
                    }
                }
                Some(_) => {
                    let (mut lhs, mut rhs) = (lhs, rhs);
                    let tightened = tighten_row_coefs(
                        &mut rows.ind[start..],
                        &mut rows.val[start..],
                        &mut lhs,
                        &mut rhs,
                        &bounds.lb,
                        &bounds.ub,
                        problem.isintegral(),
                        eps,
                    );
                    pass.nchgcoefs += tightened.nchgcoefs;

                    if tightened.lhsredundant && tightened.rhsredundant {
                        tracing::debug!(component = "preprocess", row = i, "row is redundant");
                        rows.ind.truncate(start);
                        rows.val.truncate(start);
                        rows.rowmap.push(-1);
                    } else {
                        rows.ind.truncate(start + tightened.nnz);
                        rows.val.truncate(start + tightened.nnz);
                        rows.rowmap.push(rows.lhs.len() as isize);
                        rows.lhs.push(lhs);
                        rows.rhs.push(rhs);
                        rows.beg.push(rows.ind.len());
                    }
                }
            }
        }
        Ok(pass)
    }
}

// side minus the contribution of the fixed variables, infinite sides stay infinite
fn shift_side<T: FloatT>(side: T, rowconst: QuadPrec<T>, inf: T) -> T {
    if side.abs() >= infinity::<T>() {
        return inf;
    }
    let mut q = rowconst;
    q *= -T::one();
    q += side;
    q.value()
}
