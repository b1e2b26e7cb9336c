use super::{is_fixed, WorkingData};
use crate::algebra::*;
use crate::solver::utils::ensure_capacity;
use crate::solver::{SdpProblem, SdpiError};

/// Rows and columns of the SDP blocks that carry no nonzero after
/// fixing, and blocks that became empty altogether.
#[derive(Debug, Clone, Default)]
pub struct BlockIndexChanges {
    /// per block and index: -1 if removed, otherwise the number of
    /// removed indices before it
    pub indchanges: Vec<Vec<isize>>,
    pub nremovedinds: Vec<usize>,
    /// per block: -1 if removed, otherwise the number of removed blocks before it
    pub blockindchanges: Vec<isize>,
    pub nremovedblocks: usize,
}

impl BlockIndexChanges {
    /// Compacted index of `i` in block `b`, if it was kept.
    pub fn new_index(&self, b: usize, i: usize) -> Option<usize> {
        let shift = self.indchanges[b][i];
        (shift >= 0).then(|| i - shift as usize)
    }

    pub fn block_removed(&self, b: usize) -> bool {
        self.blockindchanges[b] < 0
    }

    fn clear(&mut self) {
        self.indchanges.iter_mut().for_each(|c| c.clear());
        self.nremovedinds.clear();
        self.blockindchanges.clear();
        self.nremovedblocks = 0;
    }
}

impl<T> WorkingData<T>
where
    T: FloatT,
{
    /// Mark every index of every block that is touched by a free variable
    /// or the folded constant matrix.  Untouched indices would force a zero
    /// row and column on the backend, so they are removed.  Must run after
    /// [`fold_constants`](WorkingData::fold_constants).
    pub fn find_empty_row_cols(&mut self, problem: &SdpProblem<T>) -> Result<(), SdpiError> {
        let nblocks = problem.nblocks();
        let (lb, ub, epsilon) = (&self.bounds.lb, &self.bounds.ub, self.epsilon);
        let changes = &mut self.blockchanges;
        changes.clear();
        if changes.indchanges.len() < nblocks {
            ensure_capacity(&mut changes.indchanges, nblocks)?;
            changes.indchanges.resize_with(nblocks, Vec::new);
        }
        ensure_capacity(&mut changes.nremovedinds, nblocks)?;
        ensure_capacity(&mut changes.blockindchanges, nblocks)?;

        for b in 0..nblocks {
            let size = problem.block_size(b);
            let map = &mut changes.indchanges[b];
            ensure_capacity(map, size)?;
            map.resize(size, -1);

            let mut nfound = 0;
            'vars: for (k, &v) in problem.block_vars(b).iter().enumerate() {
                if is_fixed(lb, ub, v, epsilon) {
                    continue;
                }
                for (r, c, _) in problem.block_var_entries(b, k).iter() {
                    nfound += mark(map, r) + mark(map, c);
                    if nfound == size {
                        break 'vars;
                    }
                }
            }
            if nfound < size {
                for (r, c, _) in self.constants[b].as_ref().iter() {
                    nfound += mark(map, r) + mark(map, c);
                    if nfound == size {
                        break;
                    }
                }
            }

            let mut nremoved = 0;
            for (i, shift) in map.iter_mut().enumerate() {
                if *shift == -1 {
                    tracing::debug!(component = "preprocess", block = b, index = i, "removing empty row and column");
                    nremoved += 1;
                } else {
                    *shift = nremoved as isize;
                }
            }
            changes.nremovedinds.push(nremoved);

            if nremoved == size {
                tracing::debug!(component = "preprocess", block = b, "removing empty block");
                changes.blockindchanges.push(-1);
                changes.nremovedblocks += 1;
            } else {
                changes.blockindchanges.push(changes.nremovedblocks as isize);
            }
        }
        Ok(())
    }
}

// flag index `i` as used, returning 1 if it was not flagged before
fn mark(map: &mut [isize], i: usize) -> usize {
    if map[i] == -1 {
        map[i] = 1;
        1
    } else {
        0
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::solver::*;

    #[test]
    fn test_empty_rows_and_blocks() {
        let entry = |i: usize, j: usize| Triplets::from_parts(vec![i], vec![j], vec![1.0]).unwrap();
        // y1 is fixed at zero, so it touches nothing after folding
        let data = ProblemData {
            obj: vec![1.0, 1.0],
            lb: vec![0.0, 0.0],
            ub: vec![1.0, 0.0],
            isintegral: None,
            blocks: vec![
                SdpBlock {
                    size: 4,
                    vars: vec![
                        BlockVar { var: 0, entries: entry(2, 0) },
                        BlockVar { var: 1, entries: entry(1, 1) },
                    ],
                    constant: Triplets::new(),
                },
                SdpBlock {
                    size: 1,
                    vars: vec![BlockVar { var: 1, entries: entry(0, 0) }],
                    constant: Triplets::new(),
                },
            ],
            rows: vec![],
        };
        let mut p = SdpProblem::new();
        p.load(&data).unwrap();

        let settings = SdpiSettings::default();
        let mut work = WorkingData::new();
        work.reset(&p, &settings).unwrap();
        work.fold_constants(&p).unwrap();
        work.find_empty_row_cols(&p).unwrap();

        let changes = &work.blockchanges;
        assert_eq!(changes.indchanges[0], vec![0, -1, 1, -1]);
        assert_eq!(changes.nremovedinds, vec![2, 1]);
        assert_eq!(changes.new_index(0, 2), Some(1));
        assert_eq!(changes.new_index(0, 3), None);
        assert!(!changes.block_removed(0));
        assert!(changes.block_removed(1));
        assert_eq!(changes.nremovedblocks, 1);

        // a nonzero fixed value puts the entry into the constant matrix
        p.chg_bounds(&[1], &[2.0], &[2.0]).unwrap();
        work.reset(&p, &settings).unwrap();
        work.fold_constants(&p).unwrap();
        work.find_empty_row_cols(&p).unwrap();
        assert_eq!(work.blockchanges.indchanges[0], vec![0, 0, 0, -1]);
        assert_eq!(work.blockchanges.nremovedblocks, 0);
    }
}
