//! # Certifying infeasibility
//!
//! A floating-point claim of infeasibility is verified on an auxiliary problem: the objective
//! is dropped, the primal space is shifted so that the origin satisfies all bounds, and an
//! artificial column `tau` in `[0, 1]` with cost `-1` closes the remaining gap to the sides. If
//! the optimum drives `tau` to one, scaling by `tau` recovers a feasible point of the original
//! problem; if `tau` stays below one, the dual of the auxiliary is a Farkas ray, which the
//! exact box verification then inspects.
use num::{One, Zero};

use crate::algorithm::refinement::{RationalSolver, farkas};
use crate::algorithm::simplex::FloatSimplex;
use crate::data::linear_algebra::vector::DenseVector;
use crate::data::linear_program::elements::BasisStatus;
use crate::data::linear_program::solution::Solution;
use crate::data::number_types::rational::Rational;

/// Saved problem data; consumed by [`RationalSolver::untransform_feasibility`].
#[must_use]
#[derive(Debug)]
pub(crate) struct FeasibilityRecord {
    cost: DenseVector<Rational>,
    lower: DenseVector<Rational>,
    upper: DenseVector<Rational>,
    lhs: DenseVector<Rational>,
    rhs: DenseVector<Rational>,
}

/// Outcome of the feasibility probe.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FeasibilityProbe {
    pub with_dual_farkas: bool,
    pub stopped: bool,
    pub error: bool,
}

impl<S: FloatSimplex> RationalSolver<S> {
    /// Decide floating-point infeasibility exactly.
    pub(crate) fn perform_feas_ir(&mut self, sol: &mut Solution) -> FeasibilityProbe {
        let record = self.transform_feasibility();

        sol.invalidate();

        let mut with_dual_farkas = false;
        let mut stopped;
        let mut error;
        let mut success = false;

        loop {
            let outcome = self.perform_opt_ir(sol, false, false, 0);
            stopped = outcome.stopped;
            error = outcome.error;

            if stopped {
                sol.invalidate();
                with_dual_farkas = false;
                error = false;
            } else if error
                || outcome.unbounded
                || outcome.infeasible
                || !outcome.primal_feasible
                || !outcome.dual_feasible
            {
                // The auxiliary problem is feasible and bounded by construction; anything but
                // an optimal outcome is a failure.
                sol.invalidate();
                with_dual_farkas = false;
                stopped = false;
                error = true;
            } else {
                let tau = sol.primal[self.rational_lp.nr_columns() - 1].clone();

                log::debug!("tau = {}", tau);

                let mut upper_limit = Rational::one();
                upper_limit += &self.options.feastol;
                error = tau < -&self.options.feastol || tau > upper_limit;
                with_dual_farkas = tau < Rational::one();

                if with_dual_farkas {
                    sol.dual_farkas = sol.dual.clone();
                    sol.has_dual_farkas = true;

                    // Check how strong the approximate proof is on the original bounds.
                    let verification = farkas::compute_infeas_box(
                        &self.rational_lp,
                        &sol.dual_farkas,
                        &record.lower,
                        &record.upper,
                        &record.lhs,
                        &record.rhs,
                        self.rational_lp.nr_columns() - 1,
                    );
                    self.farkas_box = Some(verification);

                    success = true;
                    sol.has_primal = false;
                } else {
                    sol.has_dual = false;
                    success = true;
                }
            }

            if error || success || stopped {
                break;
            }
        }

        self.untransform_feasibility(record, sol, with_dual_farkas);

        FeasibilityProbe { with_dual_farkas, stopped, error }
    }

    /// Rewrite the problem into the feasibility auxiliary.
    ///
    /// The objective is zeroed; columns with a strictly positive lower or strictly negative
    /// upper bound are shifted so that the origin satisfies all bounds; sides are homogenized;
    /// and the artificial column `tau` receives the negated homogenized sides as coefficients,
    /// so that `tau = 1` makes the origin feasible.
    pub(crate) fn transform_feasibility(&mut self) -> FeasibilityRecord {
        log::info!("Setting up LP to test for feasibility.");

        let record = FeasibilityRecord {
            cost: self.rational_lp.cost_vector().clone(),
            lower: self.rational_lp.lower_vector().clone(),
            upper: self.rational_lp.upper_vector().clone(),
            lhs: self.rational_lp.lhs_vector().clone(),
            rhs: self.rational_lp.rhs_vector().clone(),
        };

        for column in 0..self.rational_lp.nr_columns() {
            self.synced_change_cost(column, Rational::zero());

            let lower = self.rational_lp.lower(column).clone();
            let upper = self.rational_lp.upper(column).clone();

            if lower > Rational::zero() {
                self.shift_column(column, &lower);

                let new_upper = if upper < Rational::PlusInfinity {
                    let mut value = upper;
                    value -= &lower;
                    value
                } else {
                    upper
                };
                self.synced_change_bounds(column, Rational::zero(), new_upper);
            } else if upper < Rational::zero() {
                self.shift_column(column, &upper);

                let new_lower = if lower > Rational::MinusInfinity {
                    let mut value = lower;
                    value -= &upper;
                    value
                } else {
                    lower
                };
                self.synced_change_bounds(column, new_lower, Rational::zero());
            }
        }

        // Homogenize the sides; the displaced amounts accumulate in tau's coefficient vector.
        let mut tau_coefficients = Vec::new();
        for row in 0..self.rational_lp.nr_rows() {
            let lhs = self.rational_lp.lhs(row).clone();
            let rhs = self.rational_lp.rhs(row).clone();

            if lhs > Rational::zero() {
                tau_coefficients.push((row, -&lhs));
                if rhs < Rational::PlusInfinity {
                    let mut range = rhs;
                    range -= &lhs;
                    self.synced_change_range(row, Rational::zero(), range);
                } else {
                    self.synced_change_lhs(row, Rational::zero());
                }
            } else if rhs < Rational::zero() {
                tau_coefficients.push((row, -&rhs));
                if lhs > Rational::MinusInfinity {
                    let mut range = lhs;
                    range -= &rhs;
                    self.synced_change_range(row, range, Rational::zero());
                } else {
                    self.synced_change_rhs(row, Rational::zero());
                }
            }
        }

        if tau_coefficients.is_empty() {
            log::debug!("LP is trivially feasible.");
        }

        self.synced_add_column(
            -Rational::one(),
            Rational::zero(),
            tau_coefficients,
            Rational::one(),
        );

        if self.has_basis {
            self.basis_cols.push(BasisStatus::OnUpper);
        }

        record
    }

    /// Shift all sides touched by a column by `coefficient * amount`, so that the column's
    /// bound interval afterwards contains zero.
    fn shift_column(&mut self, column: usize, amount: &Rational) {
        let coefficients = self.rational_lp.column(column).to_vec();
        for (row, coefficient) in coefficients {
            let mut shift = coefficient;
            shift *= amount;

            if self.rational_lp.lhs(row) > &Rational::MinusInfinity {
                let mut new_lhs = self.rational_lp.lhs(row).clone();
                new_lhs -= &shift;
                self.synced_change_lhs(row, new_lhs);
            }
            if self.rational_lp.rhs(row) < &Rational::PlusInfinity {
                let mut new_rhs = self.rational_lp.rhs(row).clone();
                new_rhs -= &shift;
                self.synced_change_rhs(row, new_rhs);
            }
        }
    }

    /// Undo [`RationalSolver::transform_feasibility`], rescaling the feasible point or keeping
    /// the Farkas ray.
    pub(crate) fn untransform_feasibility(
        &mut self,
        record: FeasibilityRecord,
        sol: &mut Solution,
        infeasible: bool,
    ) {
        let columns_before = self.rational_lp.nr_columns() - 1;

        if infeasible {
            debug_assert!(sol.has_dual_farkas);

            sol.has_primal = false;
            sol.has_primal_ray = false;
            sol.has_dual = false;
            sol.has_dual_farkas = true;

            self.has_basis = false;
            self.basis_cols.truncate(columns_before);
        } else if sol.has_primal {
            let tau = sol.primal[columns_before].clone();
            debug_assert!(tau >= Rational::one() - &self.options.feastol);

            sol.has_primal_ray = false;
            sol.has_dual = false;
            sol.has_dual_farkas = false;

            if tau != Rational::one() {
                sol.primal.element_wise_divide(&tau);
            }
            for (row, coefficient) in self.rational_lp.column(columns_before) {
                sol.slacks[*row] -= coefficient;
            }
            sol.primal.truncate(columns_before);

            self.has_basis = self.basis_cols[columns_before] != BasisStatus::Basic;
            self.basis_cols.truncate(columns_before);
        } else {
            self.has_basis = false;
            self.basis_cols.truncate(columns_before);
        }

        for row in 0..self.rational_lp.nr_rows() {
            self.synced_change_range(row, record.lhs[row].clone(), record.rhs[row].clone());
        }
        for column in 0..columns_before {
            self.synced_change_bounds(
                column,
                record.lower[column].clone(),
                record.upper[column].clone(),
            );
            self.synced_change_cost(column, record.cost[column].clone());
        }

        self.synced_truncate_columns(columns_before);

        debug_assert!(
            !sol.has_primal
                || sol.slacks == self.rational_lp.compute_primal_activity(&sol.primal)
        );
    }
}
