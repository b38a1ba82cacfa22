//! # Solving linear programs exactly
//!
//! The `RationalSolver` owns an exact rational image and a floating-point image of the same
//! linear program, a floating-point simplex, and the basis bookkeeping shared between refinement
//! rounds. Calling [`RationalSolver::optimize`] runs the certification loop: optimize with
//! iterative refinement, and whenever the floating-point solver claims infeasibility or
//! unboundedness, prove or refute the claim with an auxiliary refinement solve before reporting
//! it.
//!
//! Both problem images are mutated through the `synced_*` helpers only, which keeps them in
//! lock-step: the rational program is changed first, the floating-point program immediately
//! after with the rounded values.
use std::time::{Duration, Instant};

use num::Zero;

use crate::algorithm::refinement::farkas::FarkasBox;
use crate::algorithm::simplex::FloatSimplex;
use crate::algorithm::simplex::plain::PlainSimplex;
use crate::data::linear_algebra::SparseTupleVec;
use crate::data::linear_algebra::vector::{DenseVector, Vector};
use crate::data::linear_program::elements::{BasisStatus, Objective, Status};
use crate::data::linear_program::general_form::{RationalLp, RealLp};
use crate::data::linear_program::solution::Solution;
use crate::data::number_types::rational::Rational;

pub mod farkas;
mod feasibility;
mod optimize;
mod recovery;
mod transform;
mod unbounded;

/// Tolerances, limits and feature switches of a solve.
///
/// The defaults ask for `1e-6` exact feasibility and optimality, solve the floating-point
/// subproblems at `1e-9`, and impose no limits.
#[derive(Debug, Clone)]
pub struct SolverOptions {
    /// Rational primal feasibility tolerance.
    pub feastol: Rational,
    /// Rational dual feasibility (optimality) tolerance.
    pub opttol: Rational,
    /// Working feasibility tolerance of the floating-point solver.
    pub fp_feastol: f64,
    /// Working optimality tolerance of the floating-point solver.
    pub fp_opttol: f64,
    /// Bound magnitudes at or above this value are treated as infinite.
    pub infinity: Rational,
    /// Cap on the growth of the primal and dual scaling factors per refinement round.
    pub max_scale_increment: Rational,
    /// Matrix entries larger than this in absolute value are lifted.
    pub lift_max_value: Rational,
    /// Nonzero matrix entries smaller than this in absolute value are lifted.
    pub lift_min_value: Rational,
    /// Maximum number of refinement rounds.
    pub refinement_limit: Option<u64>,
    /// Maximum number of refinement rounds in which the floating-point solver performed no
    /// iterations.
    pub stall_refinement_limit: Option<u64>,
    /// Maximum cumulative number of floating-point simplex iterations.
    pub iteration_limit: Option<u64>,
    /// Wall-clock limit for the whole solve.
    pub time_limit: Option<Duration>,
    /// Abort once a primal solution at least this good is certified. Deactivated while the
    /// refinement loop runs; applied to the final result only.
    pub objective_limit: Option<Rational>,
    /// Reformulate large and small matrix entries before solving.
    pub lifting: bool,
    /// Turn all inequality constraints into equations before solving.
    pub equality_transform: bool,
    /// When infeasibility is detected, additionally probe for dual infeasibility.
    pub test_dual_infeasibility: bool,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            feastol: Rational::ten_pow(-6),
            opttol: Rational::ten_pow(-6),
            fp_feastol: 1e-9,
            fp_opttol: 1e-9,
            infinity: Rational::ten_pow(100),
            max_scale_increment: Rational::ten_pow(25),
            lift_max_value: Rational::from(1024),
            lift_min_value: Rational::new(1, 1024),
            refinement_limit: None,
            stall_refinement_limit: None,
            iteration_limit: None,
            time_limit: None,
            objective_limit: None,
            lifting: false,
            equality_transform: false,
            test_dual_infeasibility: false,
        }
    }
}

/// Counters accumulated over a single `optimize` call.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    /// Number of refined floating-point solves.
    pub refinements: u64,
    /// Number of refined solves that took no simplex iterations.
    pub stall_refinements: u64,
    /// Cumulative floating-point simplex iterations.
    pub iterations: u64,
}

/// An exact linear program solver based on iterative refinement.
#[derive(Debug)]
pub struct RationalSolver<S> {
    pub(crate) rational_lp: RationalLp,
    pub(crate) real_lp: RealLp,
    pub(crate) solver: S,
    pub(crate) options: SolverOptions,
    pub(crate) statistics: Statistics,
    pub(crate) solution: Solution,

    pub(crate) basis_rows: Vec<BasisStatus>,
    pub(crate) basis_cols: Vec<BasisStatus>,
    pub(crate) has_basis: bool,
    pub(crate) stored_basis: Option<(Vec<BasisStatus>, Vec<BasisStatus>)>,

    pub(crate) status: Status,
    pub(crate) started: Instant,
    pub(crate) farkas_box: Option<FarkasBox>,
}

impl RationalSolver<PlainSimplex> {
    /// Create a solver using the plain bounded-variable simplex as the floating-point
    /// collaborator.
    pub fn plain(lp: RationalLp, options: SolverOptions) -> Self {
        Self::new(lp, PlainSimplex::new(), options)
    }
}

impl<S: FloatSimplex> RationalSolver<S> {
    /// Create a solver around a problem and a floating-point collaborator.
    ///
    /// Bound magnitudes at or above the configured infinity threshold are replaced by the
    /// infinity sentinels before the floating-point image is derived.
    pub fn new(mut rational_lp: RationalLp, solver: S, options: SolverOptions) -> Self {
        rational_lp.apply_infinity_threshold(&options.infinity);
        let real_lp = RealLp::from_rational(&rational_lp);

        Self {
            rational_lp,
            real_lp,
            solver,
            options,
            statistics: Statistics::default(),
            solution: Solution::new(),

            basis_rows: Vec::new(),
            basis_cols: Vec::new(),
            has_basis: false,
            stored_basis: None,

            status: Status::NoProblem,
            started: Instant::now(),
            farkas_box: None,
        }
    }

    /// Solve the problem to exact optimality, or produce an exact certificate of infeasibility
    /// or unboundedness.
    pub fn optimize(&mut self) -> Status {
        self.solution.invalidate();
        self.statistics = Statistics::default();
        self.started = Instant::now();
        self.farkas_box = None;

        if self.rational_lp.nr_columns() == 0 {
            self.status = Status::NoProblem;
            return self.status;
        }

        self.solve_rational();
        self.status
    }

    /// The status of the most recent `optimize` call.
    pub fn status(&self) -> Status {
        self.status
    }

    /// The solution bundle of the most recent `optimize` call.
    pub fn solution(&self) -> &Solution {
        &self.solution
    }

    /// The counters of the most recent `optimize` call.
    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// The exact verification outcome for the Farkas ray, when infeasibility was detected.
    pub fn farkas_box(&self) -> Option<&FarkasBox> {
        self.farkas_box.as_ref()
    }

    /// The basis statuses of the most recent solve, when one is available.
    pub fn basis(&self) -> Option<(&[BasisStatus], &[BasisStatus])> {
        self.has_basis.then(|| (self.basis_rows.as_slice(), self.basis_cols.as_slice()))
    }

    /// The exact problem as currently loaded.
    pub fn rational_lp(&self) -> &RationalLp {
        &self.rational_lp
    }

    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut SolverOptions {
        &mut self.options
    }

    /// Change the bounds of a column in both problem images.
    pub fn change_bounds(&mut self, j: usize, lower: Rational, upper: Rational) {
        self.solution.invalidate();
        self.synced_change_bounds(j, lower, upper);
    }

    /// Change the sides of a row in both problem images.
    pub fn change_range(&mut self, i: usize, lhs: Rational, rhs: Rational) {
        self.solution.invalidate();
        self.synced_change_range(i, lhs, rhs);
    }

    /// Change a cost coefficient in both problem images.
    ///
    /// The value is interpreted in the caller's optimization direction.
    pub fn change_objective(&mut self, j: usize, value: Rational) {
        self.solution.invalidate();
        let value = match self.rational_lp.objective() {
            Objective::Minimize => value,
            Objective::Maximize => -value,
        };
        self.synced_change_cost(j, value);
    }

    /// Change a matrix coefficient in both problem images.
    pub fn change_element(&mut self, i: usize, j: usize, value: Rational) {
        self.solution.invalidate();
        self.synced_change_element(i, j, value);
    }

    /// The certification loop around the refinement driver.
    fn solve_rational(&mut self) {
        let mut has_unbounded_ray = false;
        let mut infeasibility_not_certified = false;
        let mut unboundedness_not_certified = false;

        if self.options.objective_limit.is_some() {
            log::info!("Deactivating objective limit.");
        }

        let lift_record = self.options.lifting.then(|| self.lift());
        let equality_record = self.options.equality_transform.then(|| self.transform_equality());

        self.stored_basis = None;
        loop {
            let mut sol = std::mem::take(&mut self.solution);
            let outcome = self.perform_opt_ir(
                &mut sol,
                !unboundedness_not_certified,
                !infeasibility_not_certified,
                0,
            );
            self.solution = sol;

            if outcome.error {
                self.status = Status::Error;
                break;
            } else if outcome.stopped {
                self.status = Status::AbortTime;
                break;
            } else if outcome.unbounded && !unboundedness_not_certified {
                let mut sol_unbounded = Solution::new();
                let probe = self.perform_unbounded_ir(&mut sol_unbounded);

                debug_assert_eq!(probe.has_ray, sol_unbounded.primal_ray().is_some());

                if probe.error {
                    log::info!("Error while testing for unboundedness.");
                    self.status = Status::Error;
                    break;
                }

                if probe.has_ray {
                    log::info!("Dual infeasible.  Primal unbounded ray available.");
                } else {
                    log::info!("Dual feasible.  Rejecting primal unboundedness.");
                }
                unboundedness_not_certified = !probe.has_ray;

                if probe.stopped {
                    self.status = Status::AbortTime;
                    break;
                }

                let mut sol = std::mem::take(&mut self.solution);
                let feasibility = self.perform_feas_ir(&mut sol);
                self.solution = sol;

                if probe.has_ray {
                    self.solution.primal_ray = sol_unbounded.primal_ray;
                    self.solution.has_primal_ray = true;
                }

                if feasibility.error {
                    log::info!("Error while testing for feasibility.");
                    self.status = Status::Error;
                    break;
                } else if feasibility.stopped {
                    self.status = Status::AbortTime;
                    break;
                } else if feasibility.with_dual_farkas {
                    log::info!("Primal infeasible.  Dual Farkas ray available.");
                    self.status = Status::Infeasible;
                    break;
                } else if probe.has_ray {
                    log::info!("Primal feasible and unbounded.");
                    self.status = Status::Unbounded;
                    break;
                }
                log::info!("Primal feasible and bounded.");
            } else if outcome.infeasible && !infeasibility_not_certified {
                self.store_basis();

                let mut sol = std::mem::take(&mut self.solution);
                let feasibility = self.perform_feas_ir(&mut sol);
                self.solution = sol;

                if feasibility.error {
                    log::info!("Error while testing for infeasibility.");
                    self.status = Status::Error;
                    self.restore_basis();
                    break;
                }
                infeasibility_not_certified = !feasibility.with_dual_farkas;

                if feasibility.stopped {
                    self.status = Status::AbortTime;
                    self.restore_basis();
                    break;
                }

                if feasibility.with_dual_farkas && self.options.test_dual_infeasibility {
                    let mut sol_unbounded = Solution::new();
                    let probe = self.perform_unbounded_ir(&mut sol_unbounded);

                    if probe.error {
                        log::info!("Error while testing for dual infeasibility.");
                        self.status = Status::Error;
                        self.restore_basis();
                        break;
                    }

                    if probe.has_ray {
                        log::info!("Dual infeasible.  Primal unbounded ray available.");
                        self.solution.primal_ray = sol_unbounded.primal_ray;
                        self.solution.has_primal_ray = true;
                        has_unbounded_ray = true;
                    } else if sol_unbounded.has_dual {
                        log::info!("Dual feasible.  Storing dual multipliers.");
                        self.solution.dual = sol_unbounded.dual;
                        self.solution.red_cost = sol_unbounded.red_cost;
                        self.solution.has_dual = true;
                    }
                }

                self.restore_basis();

                if feasibility.with_dual_farkas {
                    log::info!("Primal infeasible.  Dual Farkas ray available.");
                    self.status = Status::Infeasible;
                    break;
                } else if has_unbounded_ray {
                    log::info!("Primal feasible and unbounded.");
                    self.status = Status::Unbounded;
                    break;
                }
                log::info!("Primal feasible.  Optimizing again.");
            } else if outcome.primal_feasible && outcome.dual_feasible {
                log::info!("Solved to optimality.");
                self.status = Status::Optimal;
                break;
            } else {
                log::info!("Terminating without success.");
                self.status = Status::Error;
                break;
            }

            if self.is_stopped() {
                break;
            }
        }

        if self.is_stopped() {
            self.status = Status::AbortTime;
        }

        // Restore the original problem, innermost transformation first.
        if let Some(record) = equality_record {
            let mut sol = std::mem::take(&mut self.solution);
            self.untransform_equality(record, &mut sol);
            self.solution = sol;
        }
        if let Some(record) = lift_record {
            let mut sol = std::mem::take(&mut self.solution);
            self.project(record, &mut sol);
            self.solution = sol;
        }

        if self.status == Status::Optimal {
            if let Some(limit) = &self.options.objective_limit {
                let reached = match self.rational_lp.objective() {
                    Objective::Minimize => self.solution.primal_objective <= *limit,
                    Objective::Maximize => self.solution.primal_objective >= *limit,
                };
                if reached {
                    self.status = Status::AbortValue;
                }
            }
        }

        // The floating-point solver keeps the restored problem and basis for later calls.
        if self.has_basis {
            self.solver.load(&self.real_lp);
            self.solver.set_basis(&self.basis_rows, &self.basis_cols);
        }
    }

    /// Whether any of the configured limits has been reached.
    pub(crate) fn is_stopped(&self) -> bool {
        self.options.time_limit.map_or(false, |limit| self.started.elapsed() >= limit)
            || self.options.iteration_limit
                .map_or(false, |limit| self.statistics.iterations >= limit)
            || self.options.refinement_limit
                .map_or(false, |limit| self.statistics.refinements >= limit)
            || self.options.stall_refinement_limit
                .map_or(false, |limit| self.statistics.stall_refinements >= limit)
    }

    /// Snapshot the basis, to be rolled back after a probe that may destroy it.
    pub(crate) fn store_basis(&mut self) {
        debug_assert!(self.stored_basis.is_none());

        self.stored_basis = self.has_basis
            .then(|| (self.basis_rows.clone(), self.basis_cols.clone()));
    }

    /// Roll the basis back to the most recent snapshot, if one was taken.
    pub(crate) fn restore_basis(&mut self) {
        if let Some((rows, cols)) = self.stored_basis.take() {
            self.has_basis = true;
            self.basis_rows = rows;
            self.basis_cols = cols;
        }
    }

    // The `synced_*` helpers apply a mutation to the rational program and immediately mirror it
    // onto the floating-point program.

    pub(crate) fn synced_change_lower(&mut self, j: usize, value: Rational) {
        self.real_lp.change_lower(j, value.to_f64());
        self.rational_lp.change_lower(j, value);
    }

    pub(crate) fn synced_change_upper(&mut self, j: usize, value: Rational) {
        self.real_lp.change_upper(j, value.to_f64());
        self.rational_lp.change_upper(j, value);
    }

    pub(crate) fn synced_change_bounds(&mut self, j: usize, lower: Rational, upper: Rational) {
        self.real_lp.change_bounds(j, lower.to_f64(), upper.to_f64());
        self.rational_lp.change_bounds(j, lower, upper);
    }

    pub(crate) fn synced_change_lhs(&mut self, i: usize, value: Rational) {
        self.real_lp.change_lhs(i, value.to_f64());
        self.rational_lp.change_lhs(i, value);
    }

    pub(crate) fn synced_change_rhs(&mut self, i: usize, value: Rational) {
        self.real_lp.change_rhs(i, value.to_f64());
        self.rational_lp.change_rhs(i, value);
    }

    pub(crate) fn synced_change_range(&mut self, i: usize, lhs: Rational, rhs: Rational) {
        self.real_lp.change_range(i, lhs.to_f64(), rhs.to_f64());
        self.rational_lp.change_range(i, lhs, rhs);
    }

    pub(crate) fn synced_change_cost(&mut self, j: usize, value: Rational) {
        self.real_lp.change_cost(j, value.to_f64());
        self.rational_lp.change_cost(j, value);
    }

    pub(crate) fn synced_change_element(&mut self, i: usize, j: usize, value: Rational) {
        self.real_lp.change_element(i, j, value.to_f64());
        self.rational_lp.change_element(i, j, value);
    }

    pub(crate) fn synced_add_row(&mut self, lhs: Rational, coefficients: SparseTupleVec<Rational>, rhs: Rational) {
        self.real_lp.add_row(
            lhs.to_f64(),
            coefficients.iter().map(|(j, value)| (*j, value.to_f64())).collect(),
            rhs.to_f64(),
        );
        self.rational_lp.add_row(lhs, coefficients, rhs);
    }

    pub(crate) fn synced_add_column(
        &mut self,
        cost: Rational,
        lower: Rational,
        coefficients: SparseTupleVec<Rational>,
        upper: Rational,
    ) {
        self.real_lp.add_column(
            cost.to_f64(),
            lower.to_f64(),
            coefficients.iter().map(|(i, value)| (*i, value.to_f64())).collect(),
            upper.to_f64(),
        );
        self.rational_lp.add_column(cost, lower, coefficients, upper);
    }

    pub(crate) fn synced_truncate_rows(&mut self, nr_rows: usize) {
        self.real_lp.truncate_rows(nr_rows);
        self.rational_lp.truncate_rows(nr_rows);
    }

    pub(crate) fn synced_truncate_columns(&mut self, nr_columns: usize) {
        self.real_lp.truncate_columns(nr_columns);
        self.rational_lp.truncate_columns(nr_columns);
    }

    pub(crate) fn synced_set_cost_vector(&mut self, cost: DenseVector<Rational>) {
        self.real_lp.set_cost_vector(cost.iter().map(Rational::to_f64).collect());
        self.rational_lp.set_cost_vector(cost);
    }

    pub(crate) fn synced_set_lower_vector(&mut self, lower: DenseVector<Rational>) {
        self.real_lp.set_lower_vector(lower.iter().map(Rational::to_f64).collect());
        self.rational_lp.set_lower_vector(lower);
    }

    pub(crate) fn synced_set_upper_vector(&mut self, upper: DenseVector<Rational>) {
        self.real_lp.set_upper_vector(upper.iter().map(Rational::to_f64).collect());
        self.rational_lp.set_upper_vector(upper);
    }

    pub(crate) fn synced_set_lhs_vector(&mut self, lhs: DenseVector<Rational>) {
        self.real_lp.set_lhs_vector(lhs.iter().map(Rational::to_f64).collect());
        self.rational_lp.set_lhs_vector(lhs);
    }

    pub(crate) fn synced_set_rhs_vector(&mut self, rhs: DenseVector<Rational>) {
        self.real_lp.set_rhs_vector(rhs.iter().map(Rational::to_f64).collect());
        self.rational_lp.set_rhs_vector(rhs);
    }
}

/// The floating-point image of an exact vector.
pub(crate) fn to_real(vector: &DenseVector<Rational>) -> Vec<f64> {
    vector.iter().map(Rational::to_f64).collect()
}

/// The exact image of a floating-point value, with NaN mapped to zero.
pub(crate) fn to_rational(value: f64) -> Rational {
    Rational::from_f64(value).unwrap_or_else(Rational::zero)
}
