#![allow(non_snake_case)]
mod common;

use common::*;
use sdpi::{algebra::*, solver::*};

// x0 and x1 free on the diagonal of a 3x3 block, x2 fixed at 1 off the
// diagonal; index 2 of the block is never used
fn folding_data() -> ProblemData<f64> {
    let mut data = block_problem(
        vec![1.0, 1.0, 4.0],
        vec![0.0, 0.0, 1.0],
        vec![10.0, 10.0, 1.0],
        vec![
            (0, diag(&[(0, 1.0)])),
            (1, diag(&[(1, 1.0)])),
            (2, Triplets::from_parts(vec![1], vec![0], vec![1.0]).unwrap()),
        ],
        Triplets::new(),
        3,
    );
    data.rows = vec![
        // becomes x0 >= 2 once x2 is fixed
        LpRow::new(3.0, f64::INFINITY, vec![0, 2], vec![1.0, 1.0]),
        LpRow::new(f64::NEG_INFINITY, 4.0, vec![0, 1], vec![1.0, 1.0]),
    ];
    data
}

#[test]
fn test_identity_block_one_variable() {
    let data = block_problem(
        vec![1.0],
        vec![0.0],
        vec![5.0],
        vec![(0, diag(&[(0, 1.0), (1, 1.0)]))],
        Triplets::new(),
        2,
    );
    let mut sdpi = Sdpi::<f64>::default();
    sdpi.load(&data).unwrap();
    sdpi.solve(None, SolverSetting::Unsolved, false, 10.0).unwrap();

    assert!(sdpi.was_solved());
    assert!(sdpi.is_optimal());
    assert_eq!(sdpi.objval().unwrap(), 0.0);
    let (objval, y) = sdpi.dual_sol().unwrap();
    assert_eq!(objval, 0.0);
    assert_eq!(y, vec![0.0]);
    assert_eq!(sdpi.statistics().nonevarsdp, 1);
    assert_eq!(sdpi.settings_used(), SolverSetting::Unsolved);
}

#[test]
fn test_fixed_variables_folded_and_rows_to_bounds() {
    let (mut sdpi, log) = mock_sdpi(vec![Response::optimal(3.0)]);
    sdpi.load(&folding_data()).unwrap();
    sdpi.solve(None, SolverSetting::Unsolved, false, 10.0).unwrap();

    let log = log.lock().unwrap();
    assert_eq!(log.calls.len(), 1);
    let call = &log.calls[0];

    // A_0 - 1 * A_2
    assert_eq!(call.constants[0], vec![(1, 0, -1.0)]);
    // singleton row turned into a bound
    assert_eq!(call.lb[0], 2.0);
    assert_eq!(call.rows.len(), 1);
    assert_eq!(call.rhs, vec![4.0]);
    // index 2 is empty
    assert_eq!(call.indchanges[0], vec![0, 0, -1]);
    assert_eq!(call.nremovedblocks, 0);

    assert!(sdpi.is_optimal());
    assert_eq!(sdpi.objval().unwrap(), 3.0);
    assert_eq!(sdpi.settings_used(), SolverSetting::Fast);
}

#[test]
fn test_primal_lp_sides_of_removed_rows() {
    let response = Response {
        bound_vars: (vec![0.7, 0.0, 0.0], vec![0.0, 0.0, 0.0]),
        lp_sides: (vec![0.0], vec![0.3]),
        ..Response::optimal(3.0)
    };
    let (mut sdpi, _log) = mock_sdpi(vec![response]);
    sdpi.load(&folding_data()).unwrap();
    sdpi.solve(None, SolverSetting::Unsolved, false, 10.0).unwrap();

    let (lhs, rhs) = sdpi.primal_lp_sides().unwrap().unwrap();
    // row 0 produced the lower bound of x0 through its left hand side
    assert_eq!(lhs, vec![0.7, 0.0]);
    assert_eq!(rhs, vec![0.0, 0.3]);
}

#[test]
fn test_repeated_solves_see_the_same_problem() {
    let (backend, log) = MockBackend::with_fallback(vec![], Response::optimal(3.0));
    let mut sdpi = Sdpi::new(SdpiSettings::default(), backend).unwrap();
    sdpi.load(&folding_data()).unwrap();

    sdpi.solve(None, SolverSetting::Unsolved, false, 10.0).unwrap();
    let first = sdpi.objval().unwrap();
    sdpi.solve(None, SolverSetting::Unsolved, false, 10.0).unwrap();
    assert_eq!(sdpi.objval().unwrap(), first);

    let log = log.lock().unwrap();
    let (a, b) = (&log.calls[0], &log.calls[1]);
    assert_eq!(a.lb, b.lb);
    assert_eq!(a.ub, b.ub);
    assert_eq!(a.lhs, b.lhs);
    assert_eq!(a.rhs, b.rhs);
    assert_eq!(a.constants, b.constants);
    assert_eq!(a.indchanges, b.indchanges);

    // the stored problem is untouched
    let data = folding_data();
    assert_eq!(sdpi.bounds(), (&data.lb[..], &data.ub[..]));
    assert_eq!(sdpi.lhs()[0], 3.0);
    assert_eq!(sdpi.problem().to_data().blocks, data.blocks);
}

#[test]
fn test_contradictory_bounds() {
    let (mut sdpi, log) = mock_sdpi(vec![]);
    let mut data = folding_data();
    data.lb[1] = 3.0;
    data.ub[1] = 2.0;
    sdpi.load(&data).unwrap();
    sdpi.solve(None, SolverSetting::Unsolved, false, 10.0).unwrap();

    assert!(sdpi.was_solved());
    assert!(sdpi.is_dual_infeasible());
    assert!(!sdpi.is_optimal());
    assert_eq!(sdpi.objval().unwrap(), infinity::<f64>());
    assert!(sdpi.primal_bound_vars().unwrap().is_none());
    assert_eq!(sdpi.statistics().ninfeasible, 1);

    let log = log.lock().unwrap();
    assert!(log.calls.is_empty());
    assert_eq!(log.counter, 1);
}

#[test]
fn test_violated_row_of_fixed_variables() {
    let (mut sdpi, log) = mock_sdpi(vec![]);
    let mut data = folding_data();
    data.rows.push(LpRow::new(5.0, f64::INFINITY, vec![2], vec![1.0]));
    sdpi.load(&data).unwrap();
    sdpi.solve(None, SolverSetting::Unsolved, false, 10.0).unwrap();

    assert!(sdpi.is_dual_infeasible());
    assert_eq!(sdpi.internal_status(), 0);
    assert!(log.lock().unwrap().calls.is_empty());
}

fn all_fixed_data(value: f64) -> ProblemData<f64> {
    // value * I - I
    block_problem(
        vec![3.0],
        vec![value],
        vec![value],
        vec![(0, diag(&[(0, 1.0), (1, 1.0)]))],
        diag(&[(0, 1.0), (1, 1.0)]),
        2,
    )
}

#[test]
fn test_all_fixed_feasible() {
    let mut sdpi = Sdpi::<f64>::default();
    sdpi.load(&all_fixed_data(2.0)).unwrap();
    sdpi.solve(None, SolverSetting::Unsolved, false, 10.0).unwrap();

    assert!(sdpi.is_optimal());
    assert!(sdpi.is_primal_feasible() && sdpi.is_dual_feasible());
    assert_eq!(sdpi.objval().unwrap(), 6.0);
    assert_eq!(sdpi.sol_feasibility().unwrap(), (true, true));
    assert_eq!(sdpi.statistics().nallfixed, 1);
    // eigenvectors were not kept
    assert!(sdpi.primal_solution_matrix().unwrap().is_none());
    let (lbvals, ubvals) = sdpi.primal_bound_vars().unwrap().unwrap();
    assert_eq!((lbvals, ubvals), (vec![0.0], vec![0.0]));
}

#[test]
fn test_all_fixed_infeasible_ray() {
    let settings = SdpiSettingsBuilder::default()
        .allfixed_primal_ray(true)
        .build()
        .unwrap();
    let mut sdpi = Sdpi::new(settings, Box::<NoBackend>::default()).unwrap();
    sdpi.load(&all_fixed_data(0.5)).unwrap();
    sdpi.solve(None, SolverSetting::Unsolved, false, 10.0).unwrap();

    assert!(sdpi.is_dual_infeasible());
    assert!(sdpi.is_primal_unbounded());
    assert_eq!(sdpi.sol_feasibility().unwrap(), (true, false));
    assert_eq!(sdpi.statistics().nallfixed, 1);

    // v vᵀ for a unit eigenvector v
    let X = sdpi.primal_solution_matrix().unwrap().unwrap();
    assert_eq!(X.len(), 1);
    let trace = X[0][(0, 0)] + X[0][(1, 1)];
    assert!((trace - 1.0).abs() < 1e-10);
}

#[test]
fn test_one_variable_lp() {
    let data = ProblemData {
        obj: vec![-2.0, 1.0],
        lb: vec![1.0, 2.0],
        ub: vec![3.0, 2.0],
        isintegral: None,
        blocks: vec![],
        rows: vec![],
    };
    let mut sdpi = Sdpi::<f64>::default();
    sdpi.load(&data).unwrap();
    sdpi.solve(None, SolverSetting::Unsolved, false, 10.0).unwrap();

    assert!(sdpi.is_optimal());
    assert_eq!(sdpi.objval().unwrap(), -4.0);
    assert_eq!(sdpi.dual_sol().unwrap().1, vec![3.0, 2.0]);
    // the upper bound is active with multiplier -obj
    let (lbvals, ubvals) = sdpi.primal_bound_vars().unwrap().unwrap();
    assert_eq!(lbvals, vec![0.0, 0.0]);
    assert_eq!(ubvals, vec![2.0, 0.0]);
}

fn one_variable_block(ub: f64) -> ProblemData<f64> {
    // y0 I + 1 * I - 3 I ⪰ 0 with y1 fixed at 1
    block_problem(
        vec![1.0, 5.0],
        vec![0.0, 1.0],
        vec![ub, 1.0],
        vec![
            (0, diag(&[(0, 1.0), (1, 1.0)])),
            (1, diag(&[(0, 1.0), (1, 1.0)])),
        ],
        diag(&[(0, 3.0), (1, 3.0)]),
        2,
    )
}

#[test]
fn test_one_variable_block_with_fixed_variable() {
    let mut sdpi = Sdpi::<f64>::default();
    sdpi.load(&one_variable_block(10.0)).unwrap();
    sdpi.solve(None, SolverSetting::Unsolved, false, 10.0).unwrap();

    assert!(sdpi.is_optimal());
    let (objval, y) = sdpi.dual_sol().unwrap();
    assert!((y[0] - 2.0).abs() < 1e-8);
    assert_eq!(y[1], 1.0);
    assert!((objval - 7.0).abs() < 1e-8);

    let X = sdpi.primal_solution_matrix().unwrap().unwrap();
    let trace = X[0][(0, 0)] + X[0][(1, 1)];
    assert!((trace - 1.0).abs() < 1e-8);
}

#[test]
fn test_one_variable_block_infeasible() {
    let mut sdpi = Sdpi::<f64>::default();
    sdpi.load(&one_variable_block(1.0)).unwrap();
    sdpi.solve(None, SolverSetting::Unsolved, false, 10.0).unwrap();

    assert!(sdpi.was_solved());
    assert!(!sdpi.is_optimal());
    assert!(sdpi.is_dual_infeasible());
    assert!(sdpi.is_primal_unbounded());
    assert_eq!(sdpi.objval().unwrap(), infinity::<f64>());
    assert_eq!(sdpi.sol_feasibility().unwrap(), (true, false));
}
