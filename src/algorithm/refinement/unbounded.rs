//! # Certifying unboundedness
//!
//! A floating-point claim of unboundedness is verified on an auxiliary problem: the objective
//! becomes a constraint `c^T x + tau = 0` over the homogenized feasible cone, and `tau` is
//! pushed towards its upper bound of one. If the optimum reaches one, scaling the solution by
//! `tau` yields an exact primal ray of the original problem; if it stays at zero, the original
//! problem is dual feasible and the claim is refuted.
use num::{One, Zero};

use crate::algorithm::refinement::RationalSolver;
use crate::algorithm::simplex::FloatSimplex;
use crate::data::linear_algebra::vector::DenseVector;
use crate::data::linear_program::elements::BasisStatus;
use crate::data::linear_program::solution::Solution;
use crate::data::number_types::rational::Rational;

/// Saved problem data; consumed by [`RationalSolver::untransform_unbounded`].
#[must_use]
#[derive(Debug)]
pub(crate) struct UnboundedRecord {
    cost: DenseVector<Rational>,
    lower: DenseVector<Rational>,
    upper: DenseVector<Rational>,
    lhs: DenseVector<Rational>,
    rhs: DenseVector<Rational>,
}

/// Outcome of the unboundedness probe.
#[derive(Debug, Clone, Copy)]
pub(crate) struct UnboundedProbe {
    pub has_ray: bool,
    pub stopped: bool,
    pub error: bool,
}

impl<S: FloatSimplex> RationalSolver<S> {
    /// Decide floating-point unboundedness exactly.
    pub(crate) fn perform_unbounded_ir(&mut self, sol: &mut Solution) -> UnboundedProbe {
        let record = self.transform_unbounded();

        sol.invalidate();

        let outcome = self.perform_opt_ir(sol, false, false, 0);

        let mut has_ray = false;
        let mut stopped = outcome.stopped;
        let mut error = outcome.error;

        if stopped {
            sol.invalidate();
            error = false;
        } else if error
            || outcome.unbounded
            || outcome.infeasible
            || !outcome.primal_feasible
            || !outcome.dual_feasible
        {
            // The auxiliary problem is bounded and feasible by construction; anything but an
            // optimal outcome is a failure.
            sol.invalidate();
            stopped = false;
            error = true;
        } else {
            let tau = sol.primal[self.rational_lp.nr_columns() - 1].clone();

            log::debug!("tau = {}", tau);

            // The right-hand side and all bounds except tau's upper bound are zero, so tau is
            // either approximately zero or at its upper bound of one.
            error = !(tau >= Rational::one() || tau < self.options.feastol);
            debug_assert!(!error);

            has_ray = tau >= Rational::one();
        }

        self.untransform_unbounded(record, sol, has_ray);

        UnboundedProbe { has_ray, stopped, error }
    }

    /// Rewrite the problem into the unboundedness auxiliary.
    ///
    /// All finite sides and bounds become zero, the objective moves into a new equation
    /// `c^T x + tau = 0`, and the new variable `tau <= 1` gets cost `-1`, so that the solve
    /// pushes `tau` up as far as the homogenized problem allows.
    pub(crate) fn transform_unbounded(&mut self) -> UnboundedRecord {
        log::info!("Setting up LP to compute primal unbounded ray.");

        let record = UnboundedRecord {
            cost: self.rational_lp.cost_vector().clone(),
            lower: self.rational_lp.lower_vector().clone(),
            upper: self.rational_lp.upper_vector().clone(),
            lhs: self.rational_lp.lhs_vector().clone(),
            rhs: self.rational_lp.rhs_vector().clone(),
        };

        for row in 0..self.rational_lp.nr_rows() {
            if self.rational_lp.lhs(row) > &Rational::MinusInfinity {
                self.synced_change_lhs(row, Rational::zero());
            }
            if self.rational_lp.rhs(row) < &Rational::PlusInfinity {
                self.synced_change_rhs(row, Rational::zero());
            }
        }

        let columns_before = self.rational_lp.nr_columns();
        let tau = columns_before;

        self.synced_add_column(
            -Rational::one(),
            Rational::MinusInfinity,
            Vec::new(),
            Rational::one(),
        );

        let mut objective_row = (0..columns_before)
            .filter(|&j| !self.rational_lp.cost(j).is_zero())
            .map(|j| (j, self.rational_lp.cost(j).clone()))
            .collect::<Vec<_>>();
        objective_row.push((tau, Rational::one()));
        self.synced_add_row(Rational::zero(), objective_row, Rational::zero());

        for column in 0..columns_before {
            self.synced_change_cost(column, Rational::zero());
            if self.rational_lp.lower(column) > &Rational::MinusInfinity {
                self.synced_change_lower(column, Rational::zero());
            }
            if self.rational_lp.upper(column) < &Rational::PlusInfinity {
                self.synced_change_upper(column, Rational::zero());
            }
        }

        if self.has_basis {
            self.basis_cols.push(BasisStatus::OnUpper);
            self.basis_rows.push(BasisStatus::Basic);
        }

        record
    }

    /// Undo [`RationalSolver::transform_unbounded`], scaling the solution into a ray when one
    /// was found.
    pub(crate) fn untransform_unbounded(
        &mut self,
        record: UnboundedRecord,
        sol: &mut Solution,
        unbounded: bool,
    ) {
        let columns_before = self.rational_lp.nr_columns() - 1;
        let rows_before = self.rational_lp.nr_rows() - 1;

        if unbounded {
            let tau = sol.primal[columns_before].clone();
            debug_assert!(tau >= Rational::one());

            sol.has_primal = false;
            sol.has_primal_ray = true;
            sol.has_dual = false;
            sol.has_dual_farkas = false;

            if tau != Rational::one() {
                sol.primal.element_wise_divide(&tau);
            }
            sol.primal_ray = sol.primal.clone();
            sol.primal_ray.truncate(columns_before);

            self.has_basis = self.basis_cols[columns_before] != BasisStatus::Basic
                && self.basis_rows[rows_before] == BasisStatus::Basic;
        } else if self.options.test_dual_infeasibility
            && sol.has_primal
            && sol.primal[columns_before] < self.options.feastol
        {
            // A zero optimum proves dual feasibility of the original problem; the dual of the
            // objective row rescales the auxiliary duals into original ones.
            let alpha = sol.dual[rows_before].clone();
            debug_assert!(sol.has_dual);

            sol.has_primal = false;
            sol.has_primal_ray = false;
            sol.has_dual_farkas = false;

            if alpha != -Rational::one() {
                let scale = -alpha;
                sol.dual.element_wise_divide(&scale);
                sol.red_cost.element_wise_divide(&scale);
            }
            sol.dual.truncate(rows_before);
            sol.red_cost.truncate(columns_before);

            self.has_basis = false;
        } else {
            sol.invalidate();
            self.has_basis = false;
        }

        self.basis_cols.truncate(columns_before);
        self.basis_rows.truncate(rows_before);

        self.synced_truncate_rows(rows_before);
        self.synced_truncate_columns(columns_before);

        self.synced_set_cost_vector(record.cost);
        self.synced_set_lower_vector(record.lower);
        self.synced_set_upper_vector(record.upper);
        self.synced_set_lhs_vector(record.lhs);
        self.synced_set_rhs_vector(record.rhs);
    }
}
