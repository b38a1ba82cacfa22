//! End-to-end solves through the public interface, with the plain simplex as the
//! floating-point collaborator.
use num::Zero;

use rilp::RAT;
use rilp::algorithm::refinement::{RationalSolver, SolverOptions};
use rilp::algorithm::refinement::farkas::FarkasBox;
use rilp::data::linear_algebra::vector::Vector;
use rilp::data::linear_program::elements::{BasisStatus, Objective, Status};
use rilp::data::linear_program::general_form::RationalLp;
use rilp::data::number_types::rational::Rational;

/// min x subject to 0 <= x <= 10.
#[test]
fn trivially_feasible_minimization() {
    let lp = RationalLp::new(
        Objective::Minimize,
        vec![RAT!(1)],
        vec![RAT!(0)],
        vec![RAT!(10)],
        vec![vec![]],
        vec![],
        vec![],
    );
    let mut solver = RationalSolver::plain(lp, SolverOptions::default());

    assert_eq!(solver.optimize(), Status::Optimal);

    let solution = solver.solution();
    assert_eq!(solution.primal().unwrap()[0], RAT!(0));
    assert_eq!(solution.objective_value().unwrap(), &RAT!(0));
    assert!(solution.dual().unwrap().is_empty());
}

/// min x subject to x = 5, expressed through coinciding bounds.
#[test]
fn fixed_variable() {
    let lp = RationalLp::new(
        Objective::Minimize,
        vec![RAT!(1)],
        vec![RAT!(5)],
        vec![RAT!(5)],
        vec![vec![]],
        vec![],
        vec![],
    );
    let mut solver = RationalSolver::plain(lp, SolverOptions::default());

    assert_eq!(solver.optimize(), Status::Optimal);

    let solution = solver.solution();
    assert_eq!(solution.primal().unwrap()[0], RAT!(5));
    assert_eq!(solution.objective_value().unwrap(), &RAT!(5));

    let (_, columns) = solver.basis().unwrap();
    assert_eq!(columns[0], BasisStatus::Fixed);
}

/// min 0 subject to x >= 1 (row) and x <= 0 (bound): infeasible with a verifiable proof.
#[test]
fn infeasible_with_certified_farkas_proof() {
    let lp = RationalLp::new(
        Objective::Minimize,
        vec![RAT!(0)],
        vec![Rational::MinusInfinity],
        vec![RAT!(0)],
        vec![vec![(0, RAT!(1))]],
        vec![RAT!(1)],
        vec![Rational::PlusInfinity],
    );
    let mut solver = RationalSolver::plain(lp, SolverOptions::default());

    assert_eq!(solver.optimize(), Status::Infeasible);

    let farkas = solver.solution().dual_farkas().unwrap();
    assert!(farkas[0] > Rational::zero());
    assert_eq!(solver.farkas_box(), Some(&FarkasBox::ProvedExactly));
}

/// min -x subject to x >= 0: unbounded, with the unit ray as certificate.
#[test]
fn unbounded_with_primal_ray() {
    let lp = RationalLp::new(
        Objective::Minimize,
        vec![RAT!(-1)],
        vec![RAT!(0)],
        vec![Rational::PlusInfinity],
        vec![vec![]],
        vec![],
        vec![],
    );
    let mut solver = RationalSolver::plain(lp, SolverOptions::default());

    assert_eq!(solver.optimize(), Status::Unbounded);

    let ray = solver.solution().primal_ray().unwrap();
    assert_eq!(ray[0], RAT!(1));
}

/// A lower bound of 1e-30 with a feasibility tolerance of 1e-40: far below what a double can
/// distinguish from zero, so only exact refinement can certify the optimum.
#[test]
fn refinement_beyond_float_precision() {
    let tiny = Rational::ten_pow(-30);
    let lp = RationalLp::new(
        Objective::Minimize,
        vec![RAT!(1)],
        vec![tiny.clone()],
        vec![Rational::PlusInfinity],
        vec![vec![]],
        vec![],
        vec![],
    );
    let mut options = SolverOptions::default();
    options.feastol = Rational::ten_pow(-40);
    options.opttol = Rational::ten_pow(-40);
    let mut solver = RationalSolver::plain(lp, options);

    assert_eq!(solver.optimize(), Status::Optimal);

    let solution = solver.solution();
    assert_eq!(solution.primal().unwrap()[0], tiny);
    assert_eq!(solution.objective_value().unwrap(), &tiny);
    // The answer is certified within at most two refinement rounds.
    assert!(solver.statistics().refinements <= 2);
}

/// A maximization problem with both constraint types, solved to an exact rational optimum.
#[test]
fn maximization_with_constraints() {
    // max x + 2y s.t. x + y <= 4, 2x + y >= 2, x >= 0, 0 <= y <= 3; optimum 7 at (1, 3).
    let lp = RationalLp::new(
        Objective::Maximize,
        vec![RAT!(1), RAT!(2)],
        vec![RAT!(0), RAT!(0)],
        vec![Rational::PlusInfinity, RAT!(3)],
        vec![
            vec![(0, RAT!(1)), (1, RAT!(2))],
            vec![(0, RAT!(1)), (1, RAT!(1))],
        ],
        vec![Rational::MinusInfinity, RAT!(2)],
        vec![RAT!(4), Rational::PlusInfinity],
    );
    let mut solver = RationalSolver::plain(lp, SolverOptions::default());

    assert_eq!(solver.optimize(), Status::Optimal);

    let solution = solver.solution();
    assert_eq!(solution.primal().unwrap()[0], RAT!(1));
    assert_eq!(solution.primal().unwrap()[1], RAT!(3));
    assert_eq!(solution.objective_value().unwrap(), &RAT!(7));

    // The row activities match the primal solution and respect the sides.
    let slacks = solution.slacks().unwrap();
    assert_eq!(slacks[0], RAT!(4));
    assert_eq!(slacks[1], RAT!(5));
}

/// A fractional optimum at 1/3 is certified to a tolerance no double can express: the basic
/// variable stays approximate, but its exact violations shrink below 1e-30.
#[test]
fn fractional_optimum_refined_beyond_float_precision() {
    // min x s.t. 3x >= 1: optimum 1/3.
    let lp = RationalLp::new(
        Objective::Minimize,
        vec![RAT!(1)],
        vec![RAT!(0)],
        vec![Rational::PlusInfinity],
        vec![vec![(0, RAT!(3))]],
        vec![RAT!(1)],
        vec![Rational::PlusInfinity],
    );
    let mut options = SolverOptions::default();
    options.feastol = Rational::ten_pow(-30);
    options.opttol = Rational::ten_pow(-30);
    let mut solver = RationalSolver::plain(lp, options);

    assert_eq!(solver.optimize(), Status::Optimal);

    let solution = solver.solution();
    let error = (solution.primal().unwrap()[0].clone() - RAT!(1, 3)).abs();
    assert!(error <= Rational::ten_pow(-30));

    // The row activity satisfies the side to the requested exact tolerance.
    let slack = solution.slacks().unwrap()[0].clone();
    assert!(slack >= RAT!(1) - Rational::ten_pow(-30));
}

/// The equality transform and lifting change the route, not the result.
#[test]
fn transforms_do_not_change_the_result() {
    let build = || RationalLp::new(
        Objective::Minimize,
        vec![RAT!(1), RAT!(-1)],
        vec![RAT!(0), RAT!(0)],
        vec![Rational::PlusInfinity, RAT!(2)],
        vec![
            vec![(0, RAT!(1)), (1, RAT!(4096))],
            vec![(0, RAT!(1))],
        ],
        vec![RAT!(1), RAT!(0)],
        vec![RAT!(4), RAT!(1)],
    );

    let mut plain_options = SolverOptions::default();
    plain_options.lifting = false;
    plain_options.equality_transform = false;
    let mut solver = RationalSolver::plain(build(), plain_options);
    assert_eq!(solver.optimize(), Status::Optimal);
    let reference = solver.solution().objective_value().unwrap().clone();

    let mut transformed_options = SolverOptions::default();
    transformed_options.lifting = true;
    transformed_options.equality_transform = true;
    let mut transformed = RationalSolver::plain(build(), transformed_options);
    assert_eq!(transformed.optimize(), Status::Optimal);

    assert_eq!(transformed.solution().objective_value().unwrap(), &reference);
    assert_eq!(
        transformed.solution().primal().unwrap(),
        solver.solution().primal().unwrap(),
    );
}

/// A refinement limit of zero stops the solve before it can certify anything.
#[test]
fn refinement_limit_stops() {
    let lp = RationalLp::new(
        Objective::Minimize,
        vec![RAT!(1)],
        vec![RAT!(0)],
        vec![RAT!(10)],
        vec![vec![]],
        vec![],
        vec![],
    );
    let mut options = SolverOptions::default();
    options.refinement_limit = Some(0);
    let mut solver = RationalSolver::plain(lp, options);

    assert_eq!(solver.optimize(), Status::AbortTime);
}
