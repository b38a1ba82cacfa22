//! Tests of driver behavior that needs to observe or steer crate internals: the restriction
//! rollback of the refinement loop, and the transformation round trips.
use num::Zero;

use crate::algorithm::refinement::{RationalSolver, SolverOptions};
use crate::data::linear_program::elements::{BasisStatus, Objective, Status};
use crate::data::linear_program::general_form::RationalLp;
use crate::data::linear_program::solution::Solution;
use crate::data::number_types::rational::Rational;
use crate::RAT;
use crate::tests::scripted::{ScriptedSimplex, ScriptedSolve};

mod scripted;

/// min x subject to x >= 0 (as a row) and 0 <= x <= 1.
fn restriction_program() -> RationalLp {
    RationalLp::new(
        Objective::Minimize,
        vec![RAT!(1)],
        vec![RAT!(0)],
        vec![RAT!(1)],
        vec![vec![(0, RAT!(1))]],
        vec![RAT!(0)],
        vec![Rational::PlusInfinity],
    )
}

/// The floating-point solver first reports a dual value on an inequality that the refined,
/// side-restricted problem cannot support. The driver must roll the restriction back once and
/// then converge without it.
#[test]
fn restriction_rollback_converges() {
    let script = vec![
        // Initial solve: optimal value, but a spurious dual on the inequality row.
        ScriptedSolve {
            result: crate::algorithm::simplex::FloatResult::Optimal,
            primal: vec![0.0],
            dual: vec![0.5],
            farkas: vec![],
            rows: vec![BasisStatus::OnLower],
            columns: vec![BasisStatus::Basic],
            iterations: 3,
        },
        // The restricted correction problem is reported infeasible: not a real infeasibility.
        ScriptedSolve {
            result: crate::algorithm::simplex::FloatResult::Infeasible,
            primal: vec![],
            dual: vec![],
            farkas: vec![1.0],
            rows: vec![BasisStatus::OnLower],
            columns: vec![BasisStatus::Basic],
            iterations: 2,
        },
        // After the rollback, the unrestricted correction problem resolves the dual cleanly.
        ScriptedSolve {
            result: crate::algorithm::simplex::FloatResult::Optimal,
            primal: vec![0.0],
            dual: vec![0.0],
            farkas: vec![],
            rows: vec![BasisStatus::Basic],
            columns: vec![BasisStatus::OnLower],
            iterations: 1,
        },
    ];

    let mut solver = RationalSolver::new(
        restriction_program(),
        ScriptedSimplex::new(script),
        SolverOptions::default(),
    );

    assert_eq!(solver.optimize(), Status::Optimal);
    // All three scripted solves were needed: the rollback happened exactly once.
    assert_eq!(solver.solver.calls(), 3);
    assert_eq!(solver.statistics().refinements, 1);

    let solution = solver.solution();
    assert_eq!(solution.primal().unwrap()[0], RAT!(0));
    assert_eq!(solution.dual().unwrap()[0], RAT!(0));
    assert_eq!(solution.objective_value().unwrap(), &RAT!(0));
}

fn mixed_program() -> RationalLp {
    // min x - y
    // s.t.  1 <= x + y <= 4
    //             x - y  = 1
    //       2 <= 2x + 2048y
    //       0 <= x, -1 <= y <= 3
    RationalLp::new(
        Objective::Minimize,
        vec![RAT!(1), RAT!(-1)],
        vec![RAT!(0), RAT!(-1)],
        vec![Rational::PlusInfinity, RAT!(3)],
        vec![
            vec![(0, RAT!(1)), (1, RAT!(1)), (2, RAT!(2))],
            vec![(0, RAT!(1)), (1, RAT!(-1)), (2, RAT!(2048))],
        ],
        vec![RAT!(1), RAT!(1), RAT!(2)],
        vec![RAT!(4), RAT!(1), Rational::PlusInfinity],
    )
}

#[test]
fn equality_transform_round_trip() {
    let mut solver = RationalSolver::plain(mixed_program(), SolverOptions::default());
    let rational_before = solver.rational_lp.clone();
    let real_before = solver.real_lp.clone();

    solver.basis_rows = vec![BasisStatus::OnLower, BasisStatus::Fixed, BasisStatus::Basic];
    solver.basis_cols = vec![BasisStatus::Basic, BasisStatus::OnUpper];
    solver.has_basis = true;
    let basis_before = (solver.basis_rows.clone(), solver.basis_cols.clone());

    let record = solver.transform_equality();
    // Rows 0 and 2 are inequalities and received slacks; row 1 is an equation.
    assert_eq!(solver.rational_lp.nr_columns(), 4);
    assert_eq!(solver.rational_lp.lhs(0), &RAT!(0));
    assert_eq!(solver.rational_lp.rhs(0), &RAT!(0));
    assert_eq!(solver.basis_cols[2], BasisStatus::OnUpper);

    let mut solution = Solution::new();
    solver.untransform_equality(record, &mut solution);

    assert_eq!(solver.rational_lp, rational_before);
    assert_eq!(solver.real_lp, real_before);
    assert_eq!((solver.basis_rows.clone(), solver.basis_cols.clone()), basis_before);
    assert!(solver.has_basis);
}

#[test]
fn lifting_round_trip() {
    let mut solver = RationalSolver::plain(mixed_program(), SolverOptions::default());
    let rational_before = solver.rational_lp.clone();
    let real_before = solver.real_lp.clone();

    let record = solver.lift();
    // The 2048 entry exceeds the lifting bound of 1024 and was moved to an auxiliary column.
    assert_eq!(solver.rational_lp.nr_columns(), 3);
    assert_eq!(solver.rational_lp.nr_rows(), 4);
    assert!(solver.rational_lp.column(1).iter().all(|(_, value)| value.abs() <= RAT!(1024)));
    assert_eq!(solver.rational_lp.row(3), &[(1, RAT!(1024)), (2, RAT!(-1))]);

    let mut solution = Solution::new();
    solver.project(record, &mut solution);

    assert_eq!(solver.rational_lp, rational_before);
    assert_eq!(solver.real_lp, real_before);
}

#[test]
fn unbounded_transform_round_trip() {
    let mut solver = RationalSolver::plain(mixed_program(), SolverOptions::default());
    let rational_before = solver.rational_lp.clone();
    let real_before = solver.real_lp.clone();

    let record = solver.transform_unbounded();
    assert_eq!(solver.rational_lp.nr_columns(), 3);
    assert_eq!(solver.rational_lp.nr_rows(), 4);
    // All finite sides and bounds are homogenized.
    assert_eq!(solver.rational_lp.lhs(0), &RAT!(0));
    assert_eq!(solver.rational_lp.upper(1), &RAT!(0));
    assert!(solver.rational_lp.cost(0).is_zero());
    assert_eq!(solver.rational_lp.cost(2), &RAT!(-1));

    let mut solution = Solution::new();
    solution.primal = crate::data::linear_algebra::vector::DenseVector::constant(RAT!(0), 3);
    solver.untransform_unbounded(record, &mut solution, false);

    assert_eq!(solver.rational_lp, rational_before);
    assert_eq!(solver.real_lp, real_before);
}

#[test]
fn feasibility_transform_round_trip() {
    let mut solver = RationalSolver::plain(mixed_program(), SolverOptions::default());
    let rational_before = solver.rational_lp.clone();
    let real_before = solver.real_lp.clone();

    let record = solver.transform_feasibility();
    assert_eq!(solver.rational_lp.nr_columns(), 3);
    // The artificial column makes the origin feasible at tau = 1.
    assert_eq!(solver.rational_lp.lower(2), &RAT!(0));
    assert_eq!(solver.rational_lp.upper(2), &RAT!(1));
    assert_eq!(solver.rational_lp.cost(2), &RAT!(-1));
    assert!(solver.rational_lp.cost(0).is_zero());

    let mut solution = Solution::new();
    solver.untransform_feasibility(record, &mut solution, false);

    assert_eq!(solver.rational_lp, rational_before);
    assert_eq!(solver.real_lp, real_before);
}
