#![allow(non_snake_case)]
use crate::algebra::*;
use crate::solver::utils::{ensure_capacity, ensure_triplets_capacity};
use crate::solver::{is_infinity, infinity, SdpiError};
use std::ops::Range;

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

// ---------------------------------
// user facing input types
// ---------------------------------

/// A linear row `lhs <= Σ val[k] * y[ind[k]] <= rhs`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
pub struct LpRow<T> {
    pub lhs: T,
    pub rhs: T,
    pub ind: Vec<usize>,
    pub val: Vec<T>,
}

impl<T> LpRow<T> {
    pub fn new(lhs: T, rhs: T, ind: Vec<usize>, val: Vec<T>) -> Self {
        Self { lhs, rhs, ind, val }
    }
}

/// The coefficient matrix of one variable inside an SDP block.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
pub struct BlockVar<T> {
    pub var: usize,
    pub entries: Triplets<T>,
}

/// An SDP block `Σ y_v A_v - A_0 ⪰ 0` of dimension `size`, with all
/// matrices given by their lower triangle.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
pub struct SdpBlock<T> {
    pub size: usize,
    pub vars: Vec<BlockVar<T>>,
    pub constant: Triplets<T>,
}

/// Complete problem description passed to [`SdpProblem::load`].
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
pub struct ProblemData<T> {
    pub obj: Vec<T>,
    pub lb: Vec<T>,
    pub ub: Vec<T>,
    /// all continuous if absent
    pub isintegral: Option<Vec<bool>>,
    pub blocks: Vec<SdpBlock<T>>,
    pub rows: Vec<LpRow<T>>,
}

// ---------------------------------
// internal storage
// ---------------------------------

#[derive(Debug, Clone, Default)]
struct BlockLayout {
    size: usize,
    vars: Vec<usize>,
    /// ranges into the shared variable triplet store, one per entry of `vars`
    ranges: Vec<Range<usize>>,
    /// range into the shared constant triplet store
    constant: Range<usize>,
}

/// Borrowed view of a set of LP rows in compressed row form.
#[derive(Debug, Clone, Copy)]
pub struct LpRowsRef<'a, T> {
    pub lhs: &'a [T],
    pub rhs: &'a [T],
    /// row `i` owns entries `beg[i]..beg[i+1]`
    pub beg: &'a [usize],
    pub ind: &'a [usize],
    pub val: &'a [T],
}

impl<'a, T> LpRowsRef<'a, T>
where
    T: FloatT,
{
    pub fn nrows(&self) -> usize {
        self.lhs.len()
    }

    pub fn nnz(&self) -> usize {
        self.ind.len()
    }

    pub fn row(&self, i: usize) -> (&'a [usize], &'a [T]) {
        let range = self.beg[i]..self.beg[i + 1];
        (&self.ind[range.clone()], &self.val[range])
    }
}

/// The mutable problem instance: variables, SDP blocks and LP rows.
///
/// Variable and constant matrices of all blocks live in two flat triplet
/// stores.  Each block records index ranges into them, so growing the
/// stores never invalidates a block.
#[derive(Debug, Clone)]
pub struct SdpProblem<T> {
    obj: Vec<T>,
    lb: Vec<T>,
    ub: Vec<T>,
    isintegral: Vec<bool>,

    blocks: Vec<BlockLayout>,
    sdp: Triplets<T>,
    sdpconst: Triplets<T>,

    lplhs: Vec<T>,
    lprhs: Vec<T>,
    lpbeg: Vec<usize>,
    lpind: Vec<usize>,
    lpval: Vec<T>,
}

impl<T> Default for SdpProblem<T>
where
    T: FloatT,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SdpProblem<T>
where
    T: FloatT,
{
    pub fn new() -> Self {
        Self {
            obj: Vec::new(),
            lb: Vec::new(),
            ub: Vec::new(),
            isintegral: Vec::new(),
            blocks: Vec::new(),
            sdp: Triplets::new(),
            sdpconst: Triplets::new(),
            lplhs: Vec::new(),
            lprhs: Vec::new(),
            lpbeg: vec![0],
            lpind: Vec::new(),
            lpval: Vec::new(),
        }
    }

    // ---------------------------------
    // getters
    // ---------------------------------

    pub fn nvars(&self) -> usize {
        self.obj.len()
    }
    pub fn nblocks(&self) -> usize {
        self.blocks.len()
    }
    pub fn nlprows(&self) -> usize {
        self.lplhs.len()
    }
    pub fn sdp_nnonz(&self) -> usize {
        self.sdp.nnz()
    }
    pub fn const_nnonz(&self) -> usize {
        self.sdpconst.nnz()
    }
    pub fn lp_nnonz(&self) -> usize {
        self.lpind.len()
    }
    pub fn obj(&self) -> &[T] {
        &self.obj
    }
    pub fn lb(&self) -> &[T] {
        &self.lb
    }
    pub fn ub(&self) -> &[T] {
        &self.ub
    }
    pub fn isintegral(&self) -> &[bool] {
        &self.isintegral
    }
    pub fn lhs(&self) -> &[T] {
        &self.lplhs
    }
    pub fn rhs(&self) -> &[T] {
        &self.lprhs
    }
    pub fn block_size(&self, b: usize) -> usize {
        self.blocks[b].size
    }
    /// Variables with a coefficient matrix in block `b`.
    pub fn block_vars(&self, b: usize) -> &[usize] {
        &self.blocks[b].vars
    }
    /// Coefficient matrix of the `k`-th variable of block `b`.
    pub fn block_var_entries(&self, b: usize, k: usize) -> TripletsRef<'_, T> {
        self.sdp.slice(self.blocks[b].ranges[k].clone())
    }
    pub fn block_constant(&self, b: usize) -> TripletsRef<'_, T> {
        self.sdpconst.slice(self.blocks[b].constant.clone())
    }
    pub fn lp_rows(&self) -> LpRowsRef<'_, T> {
        LpRowsRef {
            lhs: &self.lplhs,
            rhs: &self.lprhs,
            beg: &self.lpbeg,
            ind: &self.lpind,
            val: &self.lpval,
        }
    }

    /// Rebuild the user facing description of the stored problem.
    pub fn to_data(&self) -> ProblemData<T> {
        let blocks = (0..self.nblocks())
            .map(|b| SdpBlock {
                size: self.block_size(b),
                vars: (0..self.blocks[b].vars.len())
                    .map(|k| BlockVar {
                        var: self.blocks[b].vars[k],
                        entries: to_owned(self.block_var_entries(b, k)),
                    })
                    .collect(),
                constant: to_owned(self.block_constant(b)),
            })
            .collect();

        let lp = self.lp_rows();
        let rows = (0..lp.nrows())
            .map(|i| {
                let (ind, val) = lp.row(i);
                LpRow::new(lp.lhs[i], lp.rhs[i], ind.to_vec(), val.to_vec())
            })
            .collect();

        ProblemData {
            obj: self.obj.clone(),
            lb: self.lb.clone(),
            ub: self.ub.clone(),
            isintegral: Some(self.isintegral.clone()),
            blocks,
            rows,
        }
    }

    // ---------------------------------
    // mutators
    // ---------------------------------

    /// Replace the stored problem by `data`.  Nothing is modified if the
    /// data is malformed or memory cannot be reserved.
    pub fn load(&mut self, data: &ProblemData<T>) -> Result<(), SdpiError> {
        let nvars = data.obj.len();
        check_len(data.lb.len(), nvars, "lb")?;
        check_len(data.ub.len(), nvars, "ub")?;
        if let Some(ref isint) = data.isintegral {
            check_len(isint.len(), nvars, "isintegral")?;
        }
        for (&lb, &ub) in data.lb.iter().zip(data.ub.iter()) {
            check_bounds(lb, ub)?;
        }

        let mut sdpnnonz = 0;
        let mut constnnonz = 0;
        for (b, block) in data.blocks.iter().enumerate() {
            for bv in block.vars.iter() {
                if bv.var >= nvars {
                    return Err(SdpiError::BadInput(format!(
                        "variable {} in block {} exceeds number of variables {}",
                        bv.var, b, nvars
                    )));
                }
                bv.entries.as_ref().check_format(block.size)?;
                sdpnnonz += bv.entries.nnz();
            }
            block.constant.as_ref().check_format(block.size)?;
            constnnonz += block.constant.nnz();
        }
        for row in data.rows.iter() {
            check_row(row, nvars)?;
        }
        let lpnnonz: usize = data.rows.iter().map(|r| r.ind.len()).sum();

        // reserve first so that a failed allocation leaves the old data intact
        self.ensure_var_capacity(nvars)?;
        ensure_triplets_capacity(&mut self.sdp, sdpnnonz)?;
        ensure_triplets_capacity(&mut self.sdpconst, constnnonz)?;
        ensure_capacity(&mut self.blocks, data.blocks.len())?;
        self.ensure_lp_capacity(data.rows.len(), lpnnonz)?;

        self.obj.clear();
        self.obj.extend_from_slice(&data.obj);
        self.lb.clear();
        self.lb.extend_from_slice(&data.lb);
        self.ub.clear();
        self.ub.extend_from_slice(&data.ub);
        self.isintegral.clear();
        match data.isintegral {
            Some(ref isint) => self.isintegral.extend_from_slice(isint),
            None => self.isintegral.resize(nvars, false),
        }

        self.sdp.clear();
        self.sdpconst.clear();
        self.blocks.clear();
        for block in data.blocks.iter() {
            let mut layout = BlockLayout {
                size: block.size,
                ..Default::default()
            };
            for bv in block.vars.iter() {
                let start = self.sdp.nnz();
                self.sdp.extend_scaled(bv.entries.as_ref(), T::one());
                layout.vars.push(bv.var);
                layout.ranges.push(start..self.sdp.nnz());
            }
            let start = self.sdpconst.nnz();
            self.sdpconst.extend_scaled(block.constant.as_ref(), T::one());
            layout.constant = start..self.sdpconst.nnz();
            self.blocks.push(layout);
        }

        self.lplhs.clear();
        self.lprhs.clear();
        self.lpbeg.clear();
        self.lpbeg.push(0);
        self.lpind.clear();
        self.lpval.clear();
        self.push_rows(&data.rows);

        tracing::debug!(
            component = "problem",
            nvars,
            nblocks = self.nblocks(),
            nlprows = self.nlprows(),
            sdpnnonz,
            lpnnonz,
            "loaded problem"
        );
        Ok(())
    }

    /// Append LP rows.
    pub fn add_lp_rows(&mut self, rows: &[LpRow<T>]) -> Result<(), SdpiError> {
        for row in rows {
            check_row(row, self.nvars())?;
        }
        let nnz: usize = rows.iter().map(|r| r.ind.len()).sum();
        self.ensure_lp_capacity(self.nlprows() + rows.len(), self.lp_nnonz() + nnz)?;
        self.push_rows(rows);
        Ok(())
    }

    /// Delete rows `first..=last`, shifting all later rows and their entries.
    pub fn del_lp_rows(&mut self, first: usize, last: usize) -> Result<(), SdpiError> {
        if first > last || last >= self.nlprows() {
            return Err(SdpiError::BadInput(format!(
                "cannot delete LP rows {}..={} of {}",
                first,
                last,
                self.nlprows()
            )));
        }
        let nzstart = self.lpbeg[first];
        let nzend = self.lpbeg[last + 1];
        let nzdel = nzend - nzstart;

        self.lplhs.drain(first..=last);
        self.lprhs.drain(first..=last);
        self.lpind.drain(nzstart..nzend);
        self.lpval.drain(nzstart..nzend);
        self.lpbeg.drain(first + 1..=last + 1);
        self.lpbeg[first + 1..].iter_mut().for_each(|b| *b -= nzdel);
        Ok(())
    }

    /// Delete every row flagged in `mask`.  Returns the new position of
    /// each row, or -1 for deleted rows.
    pub fn del_lp_rowset(&mut self, mask: &[bool]) -> Result<Vec<isize>, SdpiError> {
        check_len(mask.len(), self.nlprows(), "row deletion mask")?;

        let mut newpos = Vec::with_capacity(mask.len());
        let mut ndeleted = 0;
        for (i, &delete) in mask.iter().enumerate() {
            if delete {
                self.del_lp_rows(i - ndeleted, i - ndeleted)?;
                newpos.push(-1);
                ndeleted += 1;
            } else {
                newpos.push((i - ndeleted) as isize);
            }
        }
        Ok(newpos)
    }

    pub fn clear(&mut self) {
        self.obj.clear();
        self.lb.clear();
        self.ub.clear();
        self.isintegral.clear();
        self.blocks.clear();
        self.sdp.clear();
        self.sdpconst.clear();
        self.lplhs.clear();
        self.lprhs.clear();
        self.lpbeg.clear();
        self.lpbeg.push(0);
        self.lpind.clear();
        self.lpval.clear();
    }

    pub fn chg_obj(&mut self, ind: &[usize], obj: &[T]) -> Result<(), SdpiError> {
        check_len(obj.len(), ind.len(), "objective values")?;
        self.check_var_indices(ind)?;
        for (&j, &c) in ind.iter().zip(obj) {
            self.obj[j] = c;
        }
        Ok(())
    }

    pub fn chg_bounds(&mut self, ind: &[usize], lb: &[T], ub: &[T]) -> Result<(), SdpiError> {
        check_len(lb.len(), ind.len(), "lower bounds")?;
        check_len(ub.len(), ind.len(), "upper bounds")?;
        self.check_var_indices(ind)?;
        for (&l, &u) in lb.iter().zip(ub) {
            check_bounds(l, u)?;
        }
        for (k, &j) in ind.iter().enumerate() {
            self.lb[j] = lb[k];
            self.ub[j] = ub[k];
        }
        Ok(())
    }

    pub fn chg_lp_sides(&mut self, ind: &[usize], lhs: &[T], rhs: &[T]) -> Result<(), SdpiError> {
        check_len(lhs.len(), ind.len(), "left hand sides")?;
        check_len(rhs.len(), ind.len(), "right hand sides")?;
        if let Some(&i) = ind.iter().find(|&&i| i >= self.nlprows()) {
            return Err(SdpiError::BadInput(format!("LP row {} does not exist", i)));
        }
        for (&l, &r) in lhs.iter().zip(rhs) {
            check_sides(l, r)?;
        }
        for (k, &i) in ind.iter().enumerate() {
            self.lplhs[i] = lhs[k];
            self.lprhs[i] = rhs[k];
        }
        Ok(())
    }

    // ---------------------------------
    // internals
    // ---------------------------------

    fn push_rows(&mut self, rows: &[LpRow<T>]) {
        for row in rows {
            self.lplhs.push(row.lhs);
            self.lprhs.push(row.rhs);
            self.lpind.extend_from_slice(&row.ind);
            self.lpval.extend_from_slice(&row.val);
            self.lpbeg.push(self.lpind.len());
        }
    }

    fn ensure_var_capacity(&mut self, nvars: usize) -> Result<(), SdpiError> {
        ensure_capacity(&mut self.obj, nvars)?;
        ensure_capacity(&mut self.lb, nvars)?;
        ensure_capacity(&mut self.ub, nvars)?;
        ensure_capacity(&mut self.isintegral, nvars)?;
        Ok(())
    }

    fn ensure_lp_capacity(&mut self, nrows: usize, nnonz: usize) -> Result<(), SdpiError> {
        ensure_capacity(&mut self.lplhs, nrows)?;
        ensure_capacity(&mut self.lprhs, nrows)?;
        ensure_capacity(&mut self.lpbeg, nrows + 1)?;
        ensure_capacity(&mut self.lpind, nnonz)?;
        ensure_capacity(&mut self.lpval, nnonz)?;
        Ok(())
    }

    fn check_var_indices(&self, ind: &[usize]) -> Result<(), SdpiError> {
        match ind.iter().find(|&&j| j >= self.nvars()) {
            Some(j) => Err(SdpiError::BadInput(format!("variable {} does not exist", j))),
            None => Ok(()),
        }
    }
}

fn to_owned<T: FloatT>(t: TripletsRef<'_, T>) -> Triplets<T> {
    let mut out = Triplets::new();
    out.extend_scaled(t, T::one());
    out
}

fn check_len(len: usize, expected: usize, what: &str) -> Result<(), SdpiError> {
    if len != expected {
        return Err(SdpiError::BadInput(format!(
            "{} has length {}, expected {}",
            what, len, expected
        )));
    }
    Ok(())
}

fn check_bounds<T: FloatT>(lb: T, ub: T) -> Result<(), SdpiError> {
    if lb.is_nan() || ub.is_nan() || lb >= infinity() || ub <= -infinity::<T>() {
        return Err(SdpiError::BadInput(format!("invalid bounds [{}, {}]", lb, ub)));
    }
    Ok(())
}

fn check_sides<T: FloatT>(lhs: T, rhs: T) -> Result<(), SdpiError> {
    if lhs.is_nan() || rhs.is_nan() || lhs >= infinity() || rhs <= -infinity::<T>() {
        return Err(SdpiError::BadInput(format!("invalid sides [{}, {}]", lhs, rhs)));
    }
    Ok(())
}

fn check_row<T: FloatT>(row: &LpRow<T>, nvars: usize) -> Result<(), SdpiError> {
    check_len(row.val.len(), row.ind.len(), "LP row values")?;
    check_sides(row.lhs, row.rhs)?;
    if let Some(&j) = row.ind.iter().find(|&&j| j >= nvars) {
        return Err(SdpiError::BadInput(format!("LP row uses unknown variable {}", j)));
    }
    if row.val.iter().any(|v| is_infinity(*v) || v.is_nan()) {
        return Err(SdpiError::BadInput("LP row has a non-finite coefficient".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn rows() -> Vec<LpRow<f64>> {
        vec![
            LpRow::new(0.0, 1.0, vec![0], vec![1.0]),
            LpRow::new(-1.0, 2.0, vec![0, 1], vec![1.0, 2.0]),
            LpRow::new(1.0, 1e20, vec![1], vec![3.0]),
            LpRow::new(-1e20, 4.0, vec![0, 1], vec![4.0, 5.0]),
        ]
    }

    fn problem() -> SdpProblem<f64> {
        let mut p = SdpProblem::new();
        let data = ProblemData {
            obj: vec![1.0, 2.0],
            lb: vec![0.0, -1e20],
            ub: vec![1.0, 1e20],
            isintegral: None,
            blocks: vec![SdpBlock {
                size: 2,
                vars: vec![BlockVar {
                    var: 1,
                    entries: Triplets::from_parts(vec![0, 1], vec![0, 0], vec![1.0, 0.5]).unwrap(),
                }],
                constant: Triplets::from_parts(vec![1], vec![1], vec![-1.0]).unwrap(),
            }],
            rows: rows(),
        };
        p.load(&data).unwrap();
        p
    }

    #[test]
    fn test_load_and_getters() {
        let p = problem();
        assert_eq!(p.nvars(), 2);
        assert_eq!(p.nblocks(), 1);
        assert_eq!(p.nlprows(), 4);
        assert_eq!(p.sdp_nnonz(), 2);
        assert_eq!(p.const_nnonz(), 1);
        assert_eq!(p.lp_nnonz(), 6);
        assert_eq!(p.isintegral(), &[false, false]);
        assert_eq!(p.block_vars(0), &[1]);
        assert_eq!(p.block_var_entries(0, 0).val, &[1.0, 0.5]);

        let data = p.to_data();
        let mut q = SdpProblem::new();
        q.load(&data).unwrap();
        assert_eq!(q.to_data(), data);
    }

    #[test]
    fn test_load_rejects_bad_data() {
        let mut p = problem();
        let mut data = p.to_data();
        data.blocks[0].vars[0].entries = Triplets::from_parts(vec![0], vec![1], vec![1.0]).unwrap();
        assert!(matches!(p.load(&data), Err(SdpiError::Format(_))));

        let mut data = p.to_data();
        data.lb[0] = 1e20;
        assert!(matches!(p.load(&data), Err(SdpiError::BadInput(_))));

        let mut data = p.to_data();
        data.rows[0].ind[0] = 7;
        assert!(matches!(p.load(&data), Err(SdpiError::BadInput(_))));

        // stored problem is untouched
        assert_eq!(p.nlprows(), 4);
        assert_eq!(p.lb(), &[0.0, -1e20]);
    }

    #[test]
    fn test_del_lp_rows() {
        let mut p = problem();
        p.del_lp_rows(1, 2).unwrap();
        assert_eq!(p.nlprows(), 2);
        assert_eq!(p.lhs(), &[0.0, -1e20]);
        let lp = p.lp_rows();
        assert_eq!(lp.row(0), (&[0usize][..], &[1.0][..]));
        assert_eq!(lp.row(1), (&[0usize, 1][..], &[4.0, 5.0][..]));
        assert_eq!(lp.nnz(), 3);

        assert!(p.del_lp_rows(1, 2).is_err());
    }

    #[test]
    fn test_del_lp_rowset() {
        let mut p = problem();
        let newpos = p.del_lp_rowset(&[true, false, true, false]).unwrap();
        assert_eq!(newpos, vec![-1, 0, -1, 1]);
        assert_eq!(p.rhs(), &[2.0, 4.0]);
        assert_eq!(p.lp_rows().row(1).1, &[4.0, 5.0]);
    }

    #[test]
    fn test_add_and_change() {
        let mut p = problem();
        p.add_lp_rows(&[LpRow::new(0.0, 0.0, vec![1], vec![1.0])]).unwrap();
        assert_eq!(p.nlprows(), 5);
        assert_eq!(p.lp_rows().row(4).0, &[1]);

        p.chg_obj(&[1], &[-3.0]).unwrap();
        assert_eq!(p.obj(), &[1.0, -3.0]);

        p.chg_bounds(&[0], &[0.5], &[0.75]).unwrap();
        assert_eq!((p.lb()[0], p.ub()[0]), (0.5, 0.75));
        assert!(p.chg_bounds(&[3], &[0.0], &[1.0]).is_err());

        p.chg_lp_sides(&[4], &[-1.0], &[1.0]).unwrap();
        assert_eq!((p.lhs()[4], p.rhs()[4]), (-1.0, 1.0));

        p.clear();
        assert_eq!((p.nvars(), p.nblocks(), p.nlprows(), p.lp_nnonz()), (0, 0, 0, 0));
    }
}
