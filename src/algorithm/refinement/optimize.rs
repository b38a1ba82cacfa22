//! # The refinement loop
//!
//! A floating-point solve gets the problem roughly right: the basis it ends on is usually the
//! optimal basis of the exact problem, while the numeric values carry rounding error. The loop
//! below exploits that: it snaps the approximate solution onto the exact bound values implied by
//! the basis, measures the remaining violations in exact arithmetic, and poses a correction
//! problem in which those violations are scaled up to a magnitude the floating-point solver
//! handles well. Each round multiplies the attainable precision rather than adding to it.
//!
//! Inequality rows whose dual multiplier is active are temporarily restricted to their active
//! side, which stabilizes the dual correction. When that restriction makes the correction
//! problem infeasible, it is rolled back and the round is retried without it.
use num::{One, Zero};

use crate::algorithm::refinement::{RationalSolver, to_rational, to_real};
use crate::algorithm::simplex::{FloatResult, FloatSimplex};
use crate::data::linear_algebra::vector::{DenseVector, SparseVector, Vector};
use crate::data::linear_program::elements::{BasisStatus, Objective};
use crate::data::linear_program::solution::Solution;
use crate::data::number_types::rational::Rational;

/// The factor by which the best violation seen so far must shrink for a round to count as
/// progress.
const IMPROVEMENT_NUMERATOR: i64 = 9;
const IMPROVEMENT_DENOMINATOR: i64 = 10;
/// Number of rounds without progress after which refinement gives up.
const MAX_FAILED_REFINEMENTS: u32 = 15;

/// Outcome flags of one refinement run. Exactly one of the decisive flags is set, except that
/// `primal_feasible` and `dual_feasible` together signal optimality.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct OptIr {
    pub primal_feasible: bool,
    pub dual_feasible: bool,
    pub infeasible: bool,
    pub unbounded: bool,
    pub stopped: bool,
    pub error: bool,
}

impl<S: FloatSimplex> RationalSolver<S> {
    /// Solve the current problem with iterative refinement.
    ///
    /// # Arguments
    ///
    /// * `sol`: Bundle to fill with the exact primal/dual solution, or with the approximate
    /// Farkas ray when the floating-point solver reports infeasibility.
    /// * `accept_unbounded`, `accept_infeasible`: Whether those floating-point outcomes are
    /// taken at face value; when `false`, the recovery ladder keeps fighting them.
    /// * `min_rounds`: Number of refinement rounds to perform even after the tolerances hold.
    pub(crate) fn perform_opt_ir(
        &mut self,
        sol: &mut Solution,
        accept_unbounded: bool,
        accept_infeasible: bool,
        mut min_rounds: i64,
    ) -> OptIr {
        let mut outcome = OptIr::default();

        let n = self.rational_lp.nr_columns();
        let m = self.rational_lp.nr_rows();

        self.solver.set_feasibility_tolerance(self.options.fp_feastol);
        self.solver.set_optimality_tolerance(self.options.fp_opttol);

        let mut mod_lower = DenseVector::constant(Rational::zero(), n);
        let mut mod_upper = DenseVector::constant(Rational::zero(), n);
        let mut mod_lhs = DenseVector::constant(Rational::zero(), m);
        let mut mod_rhs = DenseVector::constant(Rational::zero(), m);
        let mut mod_cost;

        let mut primal_real = Vec::with_capacity(n);
        let mut dual_real = Vec::with_capacity(m);

        log::info!("Initial floating-point solve . . .");

        self.solver.load(&self.real_lp);
        if self.has_basis {
            debug_assert_eq!(self.basis_rows.len(), m);
            debug_assert_eq!(self.basis_cols.len(), n);
            self.solver.set_basis(&self.basis_rows, &self.basis_cols);
        }

        let mut result =
            self.solve_real_stable(accept_unbounded, accept_infeasible, &mut primal_real, &mut dual_real);
        match result {
            FloatResult::Optimal => log::info!("Floating-point optimal."),
            FloatResult::Infeasible => {
                log::info!("Floating-point infeasible.");
                sol.dual_farkas = dual_real.iter().copied().map(to_rational).collect();
                sol.has_dual_farkas = true;
                outcome.infeasible = true;
                return outcome;
            },
            FloatResult::Unbounded => {
                log::info!("Floating-point unbounded.");
                outcome.unbounded = true;
                return outcome;
            },
            FloatResult::AbortTime | FloatResult::AbortIter => {
                outcome.stopped = true;
                return outcome;
            },
            FloatResult::Error => {
                outcome.error = true;
                return outcome;
            },
        }

        // Store the floating-point solution as the current exact solution, aligned with the
        // basis: nonbasic variables sit exactly on their bound, nonbasic rows carry no dual.
        sol.primal = DenseVector::constant(Rational::zero(), n);
        for c in 0..n {
            sol.primal[c] = match self.basis_cols[c] {
                BasisStatus::OnLower => self.rational_lp.lower(c).clone(),
                BasisStatus::OnUpper => self.rational_lp.upper(c).clone(),
                BasisStatus::Fixed => {
                    debug_assert_eq!(self.rational_lp.lower(c), self.rational_lp.upper(c));
                    self.rational_lp.lower(c).clone()
                },
                BasisStatus::Zero => Rational::zero(),
                BasisStatus::Basic | BasisStatus::Undefined => to_rational(primal_real[c]),
            };
        }
        sol.slacks = self.rational_lp.compute_primal_activity(&sol.primal);

        sol.dual = DenseVector::constant(Rational::zero(), m);
        let mut dual_size: i64 = 0;
        for r in 0..m {
            let status = self.basis_rows[r];
            let clipped = matches!(status, BasisStatus::Zero | BasisStatus::Basic)
                || (status == BasisStatus::OnLower && dual_real[r] < 0.0)
                || (status == BasisStatus::OnUpper && dual_real[r] > 0.0);
            if !clipped {
                sol.dual[r] = to_rational(dual_real[r]);
                if dual_real[r] != 0.0 {
                    dual_size += 1;
                }
            }

            debug_assert!(
                status != BasisStatus::Fixed || self.rational_lp.lhs(r) == self.rational_lp.rhs(r)
            );
        }

        sol.red_cost = self.rational_lp.cost_vector().clone();
        self.rational_lp.sub_dual_activity(&sol.dual, &mut sol.red_cost);

        sol.has_primal = true;
        sol.has_dual = true;
        self.has_basis = true;

        let mut primal_scale = Rational::one();
        let mut dual_scale = Rational::one();

        // Progress control.
        let mut best_violation = Rational::PlusInfinity;
        let improvement_factor = Rational::new(IMPROVEMENT_NUMERATOR, IMPROVEMENT_DENOMINATOR);
        let mut failed_refinements = 0_u32;
        let mut restrict_inequalities = true;

        let mut bounds_violation = Rational::zero();
        let mut side_violation = Rational::zero();
        let mut red_cost_violation;

        let mut primal_diff = SparseVector::new(Vec::new(), n);
        let mut dual_diff = SparseVector::new(Vec::new(), m);

        loop {
            if restrict_inequalities {
                min_rounds -= 1;

                log::debug!("Computing violations.");

                // The modified bounds become the bounds of the correction problem: the distance
                // from the current exact solution to each original bound.
                bounds_violation = Rational::zero();
                for c in 0..n {
                    mod_lower[c] = self.rational_lp.lower(c).clone();
                    if mod_lower[c] > Rational::MinusInfinity {
                        mod_lower[c] -= &sol.primal[c];
                        if mod_lower[c] > bounds_violation {
                            bounds_violation = mod_lower[c].clone();
                        }
                    }

                    mod_upper[c] = self.rational_lp.upper(c).clone();
                    if mod_upper[c] < Rational::PlusInfinity {
                        mod_upper[c] -= &sol.primal[c];
                        if -&mod_upper[c] > bounds_violation {
                            bounds_violation = -&mod_upper[c];
                        }
                    }
                }

                side_violation = Rational::zero();
                for r in 0..m {
                    mod_lhs[r] = self.rational_lp.lhs(r).clone();
                    if mod_lhs[r] > Rational::MinusInfinity {
                        mod_lhs[r] -= &sol.slacks[r];
                        if mod_lhs[r] > side_violation {
                            side_violation = mod_lhs[r].clone();
                        }
                    }

                    mod_rhs[r] = self.rational_lp.rhs(r).clone();
                    if mod_rhs[r] < Rational::PlusInfinity {
                        mod_rhs[r] -= &sol.slacks[r];
                        if -&mod_rhs[r] > side_violation {
                            side_violation = -&mod_rhs[r];
                        }
                    }
                }
            }

            red_cost_violation = Rational::zero();
            for c in 0..n {
                let status = self.basis_cols[c];
                if status != BasisStatus::OnUpper
                    && status != BasisStatus::Fixed
                    && sol.red_cost[c] < -&red_cost_violation
                {
                    red_cost_violation = -&sol.red_cost[c];
                }
                if status != BasisStatus::OnLower
                    && status != BasisStatus::Fixed
                    && sol.red_cost[c] > red_cost_violation
                {
                    red_cost_violation = sol.red_cost[c].clone();
                }
            }
            mod_cost = sol.red_cost.clone();

            // Restrict inequality rows with an active dual to the side they are resting on.
            // The basis status is deliberately not changed to `Fixed`: that would misdescribe
            // the original problem.
            if restrict_inequalities {
                for r in 0..m {
                    debug_assert!(
                        matches!(self.basis_rows[r], BasisStatus::OnUpper | BasisStatus::Fixed)
                            || sol.dual[r] >= Rational::zero()
                    );
                    debug_assert!(
                        matches!(self.basis_rows[r], BasisStatus::OnLower | BasisStatus::Fixed)
                            || sol.dual[r] <= Rational::zero()
                    );

                    if !sol.dual[r].is_zero() && self.rational_lp.lhs(r) != self.rational_lp.rhs(r) {
                        debug_assert!(matches!(
                            self.basis_rows[r],
                            BasisStatus::OnLower | BasisStatus::OnUpper,
                        ));

                        if self.basis_rows[r] == BasisStatus::OnLower {
                            mod_rhs[r] = mod_lhs[r].clone();
                        } else {
                            mod_lhs[r] = mod_rhs[r].clone();
                        }
                    }
                }

                log::info!("Restricted tight rows and columns.");
            }

            log::info!("Max. bound violation = {}", bounds_violation);
            log::info!("Max. row violation = {}", side_violation);
            log::info!("Max. reduced cost violation = {}", red_cost_violation);

            outcome.primal_feasible = bounds_violation <= self.options.feastol
                && side_violation <= self.options.feastol;
            outcome.dual_feasible = red_cost_violation <= self.options.opttol;
            if outcome.primal_feasible && outcome.dual_feasible {
                if min_rounds < 0 {
                    log::info!("Tolerances reached.");
                    break;
                }
                log::info!("Tolerances reached but additional refinement rounds forced.");
            }

            if self.is_stopped() {
                outcome.stopped = true;
                break;
            }

            // A round must shrink the total violation markedly, else it counts as failed.
            let mut sum_violation = bounds_violation.clone();
            sum_violation += &side_violation;
            sum_violation += &red_cost_violation;
            best_violation *= &improvement_factor;
            if sum_violation > best_violation {
                log::info!("Refinement failed to reduce violation significantly.");
                failed_refinements += 1;
            } else {
                best_violation = sum_violation;
            }

            if failed_refinements >= MAX_FAILED_REFINEMENTS {
                log::info!("Giving up refinement without significantly increased precision.");
                outcome.error = true;
                return outcome;
            }

            if restrict_inequalities {
                // The primal scaling factor inflates the bound residuals; its growth per round
                // is capped to keep the scaled problem representable in floating point.
                let mut max_scale = primal_scale.clone();
                max_scale *= &self.options.max_scale_increment;

                primal_scale = if bounds_violation > side_violation {
                    bounds_violation.clone()
                } else {
                    side_violation.clone()
                };
                debug_assert!(primal_scale >= Rational::zero());

                if primal_scale > Rational::zero() {
                    primal_scale.invert();
                    if primal_scale > max_scale {
                        primal_scale = max_scale;
                    }
                } else {
                    primal_scale = max_scale;
                }

                if primal_scale < Rational::one() {
                    primal_scale = Rational::one();
                } else {
                    log::info!("Scaling primal by {}.", primal_scale);

                    mod_lower.element_wise_multiply(&primal_scale);
                    mod_upper.element_wise_multiply(&primal_scale);
                    mod_lhs.element_wise_multiply(&primal_scale);
                    mod_rhs.element_wise_multiply(&primal_scale);
                }

                self.solver.change_bounds(&to_real(&mod_lower), &to_real(&mod_upper));
                self.solver.change_range(&to_real(&mod_lhs), &to_real(&mod_rhs));
            }

            // The dual scaling factor inflates the reduced cost residuals analogously.
            let mut max_scale = dual_scale.clone();
            max_scale *= &self.options.max_scale_increment;

            dual_scale = red_cost_violation.clone();
            debug_assert!(dual_scale >= Rational::zero());

            if dual_scale > Rational::zero() {
                dual_scale.invert();
                if dual_scale > max_scale {
                    dual_scale = max_scale;
                }
            } else {
                dual_scale = max_scale;
            }

            if dual_scale < Rational::one() {
                dual_scale = Rational::one();
            } else {
                log::info!("Scaling dual by {}.", dual_scale);
                mod_cost.element_wise_multiply(&dual_scale);
            }

            self.solver.change_cost(&to_real(&mod_cost));

            log::info!("Refined floating-point solve . . .");

            self.solver.set_basis(&self.basis_rows, &self.basis_cols);

            if restrict_inequalities {
                // The restriction may have made the correction problem infeasible even though
                // the original is not. Keep the old basis around so that outcome can be undone.
                let snapshot = (self.basis_rows.clone(), self.basis_cols.clone());

                result = self.solve_real_stable(accept_unbounded, true, &mut primal_real, &mut dual_real);
                if result != FloatResult::Optimal {
                    restrict_inequalities = false;
                    self.basis_rows = snapshot.0;
                    self.basis_cols = snapshot.1;

                    dual_diff.clear();
                    for r in 0..m {
                        if self.rational_lp.lhs(r) != self.rational_lp.rhs(r) {
                            if self.basis_rows[r] == BasisStatus::Fixed {
                                self.basis_rows[r] = if sol.dual[r] >= Rational::zero() {
                                    BasisStatus::OnLower
                                } else {
                                    BasisStatus::OnUpper
                                };
                            }

                            if !sol.dual[r].is_zero() {
                                dual_diff.push(r, sol.dual[r].clone());
                                sol.dual[r] = Rational::zero();
                                dual_size -= 1;
                                debug_assert!(dual_size >= 0);
                            }
                        }
                    }

                    for c in 0..n {
                        if self.rational_lp.lower(c) != self.rational_lp.upper(c)
                            && self.basis_cols[c] == BasisStatus::Fixed
                        {
                            self.basis_cols[c] = if sol.red_cost[c] >= Rational::zero() {
                                BasisStatus::OnLower
                            } else {
                                BasisStatus::OnUpper
                            };
                        }
                    }

                    // Update or recompute the reduced costs, whichever touches fewer entries;
                    // the `+ 1` accounts for the cost vector itself in the recomputation.
                    if (dual_diff.size() as i64) < dual_size + 1 {
                        self.rational_lp.add_dual_activity(&dual_diff, &mut sol.red_cost);
                    } else {
                        sol.red_cost = self.rational_lp.cost_vector().clone();
                        self.rational_lp.sub_dual_activity(&sol.dual, &mut sol.red_cost);
                    }

                    // The solver still holds the collapsed sides; give it back the unrestricted
                    // correction problem at the current scale.
                    for r in 0..m {
                        mod_lhs[r] = self.rational_lp.lhs(r).clone();
                        if mod_lhs[r] > Rational::MinusInfinity {
                            mod_lhs[r] -= &sol.slacks[r];
                            mod_lhs[r] *= &primal_scale;
                        }
                        mod_rhs[r] = self.rational_lp.rhs(r).clone();
                        if mod_rhs[r] < Rational::PlusInfinity {
                            mod_rhs[r] -= &sol.slacks[r];
                            mod_rhs[r] *= &primal_scale;
                        }
                    }
                    self.solver.change_range(&to_real(&mod_lhs), &to_real(&mod_rhs));

                    continue;
                }
            } else {
                result =
                    self.solve_real_stable(accept_unbounded, accept_infeasible, &mut primal_real, &mut dual_real);
            }

            self.statistics.refinements += 1;
            if self.solver.iterations() == 0 {
                self.statistics.stall_refinements += 1;
            }

            match result {
                FloatResult::Optimal => log::info!("Floating-point optimal."),
                FloatResult::Infeasible => {
                    log::info!("Floating-point infeasible.");
                    sol.dual_farkas = dual_real.iter().copied().map(to_rational).collect();
                    sol.has_dual_farkas = true;
                    outcome.infeasible = true;
                    return outcome;
                },
                FloatResult::Unbounded => {
                    log::info!("Floating-point unbounded.");
                    outcome.unbounded = true;
                    return outcome;
                },
                FloatResult::AbortTime | FloatResult::AbortIter => {
                    outcome.stopped = true;
                    return outcome;
                },
                FloatResult::Error => {
                    outcome.error = true;
                    return outcome;
                },
            }

            // Correct the primal solution by the scaled-back correction and align it with the
            // basis.
            log::debug!("Correcting primal solution.");

            let mut primal_size = 0_usize;
            let mut primal_scale_inverse = primal_scale.clone();
            primal_scale_inverse.invert();
            primal_diff.clear();
            for c in 0..n {
                match self.basis_cols[c] {
                    BasisStatus::OnLower | BasisStatus::Fixed => {
                        let bound = self.rational_lp.lower(c);
                        if &sol.primal[c] != bound {
                            let mut delta = bound.clone();
                            delta -= &sol.primal[c];
                            sol.primal[c] = bound.clone();
                            primal_diff.push(c, delta);
                        }
                    },
                    BasisStatus::OnUpper => {
                        let bound = self.rational_lp.upper(c);
                        if &sol.primal[c] != bound {
                            let mut delta = bound.clone();
                            delta -= &sol.primal[c];
                            sol.primal[c] = bound.clone();
                            primal_diff.push(c, delta);
                        }
                    },
                    BasisStatus::Zero => {
                        if !sol.primal[c].is_zero() {
                            let delta = -&sol.primal[c];
                            sol.primal[c] = Rational::zero();
                            primal_diff.push(c, delta);
                        }
                    },
                    BasisStatus::Basic | BasisStatus::Undefined => {
                        // The unit corrections are frequent enough to special-case: they avoid
                        // a float-to-rational conversion.
                        let delta = if primal_real[c] == 1.0 {
                            Some(primal_scale_inverse.clone())
                        } else if primal_real[c] == -1.0 {
                            Some(-&primal_scale_inverse)
                        } else if primal_real[c] != 0.0 {
                            let mut value = to_rational(primal_real[c]);
                            value *= &primal_scale_inverse;
                            Some(value)
                        } else {
                            None
                        };
                        if let Some(delta) = delta {
                            sol.primal[c] += &delta;
                            primal_diff.push(c, delta);
                        }
                    },
                }

                if !sol.primal[c].is_zero() {
                    primal_size += 1;
                }
            }

            // Update or recompute the row activities, whichever touches fewer entries.
            if primal_diff.size() < primal_size {
                self.rational_lp.add_primal_activity(&primal_diff, &mut sol.slacks);
                debug_assert_eq!(sol.slacks, self.rational_lp.compute_primal_activity(&sol.primal));
            } else {
                sol.slacks = self.rational_lp.compute_primal_activity(&sol.primal);
            }

            // Correct the dual solution analogously.
            log::debug!("Correcting dual solution.");

            let mut dual_scale_inverse_neg = dual_scale.clone();
            dual_scale_inverse_neg.invert();
            dual_scale_inverse_neg = -dual_scale_inverse_neg;
            dual_diff.clear();
            dual_size = 0;
            for r in 0..m {
                // Rows restricted to one side during this round report `Fixed` or the wrong
                // bound; their true status follows from the sign of the dual multiplier.
                if self.rational_lp.lhs(r) != self.rational_lp.rhs(r) {
                    if sol.dual[r] > Rational::zero()
                        && matches!(self.basis_rows[r], BasisStatus::OnUpper | BasisStatus::Fixed)
                    {
                        self.basis_rows[r] = BasisStatus::OnLower;
                    } else if sol.dual[r] < Rational::zero()
                        && matches!(self.basis_rows[r], BasisStatus::OnUpper | BasisStatus::Fixed)
                    {
                        self.basis_rows[r] = BasisStatus::OnUpper;
                    }
                }

                match self.basis_rows[r] {
                    BasisStatus::Zero | BasisStatus::Basic => {
                        if !sol.dual[r].is_zero() {
                            let old = sol.dual[r].clone();
                            sol.dual[r] = Rational::zero();
                            dual_diff.push(r, old);
                        }
                    },
                    _ => {
                        if dual_real[r] != 0.0 {
                            let mut value = to_rational(dual_real[r]);
                            value *= &dual_scale_inverse_neg;
                            sol.dual[r] -= &value;

                            let clipped = (self.basis_rows[r] == BasisStatus::OnLower
                                && sol.dual[r] < Rational::zero())
                                || (self.basis_rows[r] == BasisStatus::OnUpper
                                    && sol.dual[r] > Rational::zero());
                            if clipped {
                                value += &sol.dual[r];
                                sol.dual[r] = Rational::zero();
                            } else {
                                // The corrected value is most likely nonzero; counting it in
                                // either way overestimates the dual support, which is safe for
                                // the update heuristic below.
                                dual_size += 1;
                            }
                            dual_diff.push(r, value);
                        } else {
                            debug_assert!(
                                self.basis_rows[r] != BasisStatus::OnLower
                                    || sol.dual[r] >= Rational::zero()
                            );
                            debug_assert!(
                                self.basis_rows[r] != BasisStatus::OnUpper
                                    || sol.dual[r] <= Rational::zero()
                            );
                            dual_size += 1;
                        }
                    },
                }

                debug_assert!(
                    self.basis_rows[r] != BasisStatus::Fixed
                        || self.rational_lp.lhs(r) == self.rational_lp.rhs(r)
                );
            }

            if (dual_diff.size() as i64) < dual_size + 1 {
                self.rational_lp.add_dual_activity(&dual_diff, &mut sol.red_cost);
            } else {
                sol.red_cost = self.rational_lp.cost_vector().clone();
                self.rational_lp.sub_dual_activity(&sol.dual, &mut sol.red_cost);
            }

            if primal_diff.size() + dual_diff.size() > 0 {
                log::info!(
                    "Corrected {} primal variables and {} dual values.",
                    primal_diff.size(),
                    dual_diff.size(),
                );
            }

            // The refinement succeeded; try with restricted inequalities again next round.
            restrict_inequalities = true;
        }

        debug_assert_eq!(sol.has_primal, sol.has_dual);
        if sol.has_primal {
            let mut minimize_value = Rational::zero();
            for (j, value) in sol.primal.iter().enumerate() {
                minimize_value.add_product(self.rational_lp.cost(j), value);
            }
            sol.primal_objective = match self.rational_lp.objective() {
                Objective::Minimize => minimize_value,
                Objective::Maximize => -minimize_value,
            };
            sol.primal_objective += self.rational_lp.objective_offset();
            sol.dual_objective = sol.primal_objective.clone();
        }

        outcome
    }
}
