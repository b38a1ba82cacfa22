//! # Floating-point solves with a recovery ladder
//!
//! A single floating-point solve can fail in many numerical ways that say little about the
//! problem itself. Instead of giving up, the solve is wrapped in a deterministic escalation
//! ladder: each non-decisive outcome triggers the next perturbation of the solver setup, each
//! tried at most once, until the solve succeeds or the ladder is exhausted. The caller's solver
//! configuration is restored on exit, whatever happened.
use crate::algorithm::refinement::RationalSolver;
use crate::algorithm::simplex::{Algorithm, FloatResult, FloatSimplex, Scaler, Simplifier};

impl<S: FloatSimplex> RationalSolver<S> {
    /// One floating-point solve, with solution, Farkas and basis extraction.
    ///
    /// # Arguments
    ///
    /// * `from_scratch`: Discard the current basis before solving.
    /// * `primal_real`, `dual_real`: Output buffers; filled on `Optimal`, and `dual_real` with
    /// the approximate Farkas ray on `Infeasible`.
    pub(crate) fn solve_real_for_rational(
        &mut self,
        from_scratch: bool,
        primal_real: &mut Vec<f64>,
        dual_real: &mut Vec<f64>,
    ) -> FloatResult {
        if from_scratch {
            self.solver.reload();
        }

        self.solver.set_deadline(self.options.time_limit.map(|limit| self.started + limit));
        self.solver.set_iteration_limit(
            self.options.iteration_limit
                .map(|limit| limit.saturating_sub(self.statistics.iterations)),
        );

        let result = self.solver.solve();
        self.statistics.iterations += self.solver.iterations();

        match result {
            FloatResult::Optimal => {
                primal_real.clear();
                primal_real.extend_from_slice(self.solver.primal());
                dual_real.clear();
                dual_real.extend_from_slice(self.solver.dual());

                let (rows, cols) = self.solver.basis();
                self.basis_rows = rows;
                self.basis_cols = cols;
                self.has_basis = true;
            },
            FloatResult::Infeasible => {
                dual_real.clear();
                dual_real.extend_from_slice(self.solver.dual_farkas());

                let (rows, cols) = self.solver.basis();
                self.basis_rows = rows;
                self.basis_cols = cols;
                self.has_basis = true;
            },
            FloatResult::Error => {
                self.has_basis = false;
            },
            FloatResult::Unbounded | FloatResult::AbortTime | FloatResult::AbortIter => {},
        }

        result
    }

    /// Solve the floating-point problem, escalating through recovery steps on failure.
    ///
    /// The ladder, each step tried at most once: raise the factorization pivot threshold, solve
    /// from scratch, toggle scaling, toggle simplification, flip the algorithm while relaxing
    /// the tolerances, flip it back while tightening them, switch the ratio test, switch the
    /// pricer. `Infeasible` and `Unbounded` terminate the ladder only when the matching accept
    /// flag is set.
    pub(crate) fn solve_real_stable(
        &mut self,
        accept_unbounded: bool,
        accept_infeasible: bool,
        primal_real: &mut Vec<f64>,
        dual_real: &mut Vec<f64>,
    ) -> FloatResult {
        let mut result = FloatResult::Error;

        let mut solved_from_scratch = false;
        let mut initial_solve = true;
        let mut increased_markowitz = false;
        let mut relaxed_tolerances = false;
        let mut tightened_tolerances = false;
        let mut switched_scaler = false;
        let mut switched_simplifier = false;
        let mut switched_ratio_tester = false;
        let mut switched_pricer = false;

        let ratio_tester = self.solver.ratio_tester();
        let pricer = self.solver.pricer();
        let simplifier = self.solver.simplifier();
        let scaler = self.solver.scaler();

        self.solver.set_simplifier(Simplifier::Off);

        while !self.is_stopped() {
            result = self.solve_real_for_rational(false, primal_real, dual_real);

            let solved = result == FloatResult::Optimal
                || (result == FloatResult::Infeasible && accept_infeasible)
                || (result == FloatResult::Unbounded && accept_unbounded);
            if solved {
                break;
            }

            if initial_solve {
                log::info!("Numerical troubles during floating-point solve.");
                initial_solve = false;
            }

            if !increased_markowitz {
                log::info!("Increasing Markowitz threshold.");

                self.solver.set_markowitz(0.9);
                increased_markowitz = true;
                if self.solver.factorize().is_ok() {
                    continue;
                }
                log::debug!("Factorization failed.");
            }

            if !solved_from_scratch {
                log::info!("Solving from scratch.");

                self.solver.reload();
                solved_from_scratch = true;
                continue;
            }

            self.solver.set_ratio_tester(ratio_tester);
            self.solver.set_pricer(pricer);

            if !switched_scaler {
                log::info!("Switching scaling.");

                self.solver.set_scaler(match scaler {
                    Scaler::Off => Scaler::Equilibrium,
                    Scaler::Equilibrium => Scaler::Off,
                });
                self.solver.reload();
                solved_from_scratch = true;
                switched_scaler = true;
                continue;
            }

            if !switched_simplifier {
                log::info!("Switching simplification.");

                self.solver.set_simplifier(match simplifier {
                    Simplifier::Off => Simplifier::Auto,
                    Simplifier::Auto => Simplifier::Off,
                });
                self.solver.reload();
                solved_from_scratch = true;
                switched_simplifier = true;
                continue;
            }

            self.solver.set_simplifier(Simplifier::Off);

            if !relaxed_tolerances {
                log::info!("Relaxing tolerances.");

                self.flip_algorithm();
                let tolerance = (self.solver.feasibility_tolerance() * 1e3).min(1e-3);
                self.solver.set_feasibility_tolerance(tolerance);
                self.solver.set_optimality_tolerance(tolerance);
                relaxed_tolerances = tolerance >= 1e-3;
                solved_from_scratch = false;
                continue;
            }

            if !tightened_tolerances && result != FloatResult::Infeasible {
                log::info!("Tightening tolerances.");

                self.flip_algorithm();
                let tolerance = (self.solver.feasibility_tolerance() * 1e-3).max(1e-9);
                self.solver.set_feasibility_tolerance(tolerance);
                self.solver.set_optimality_tolerance(tolerance);
                tightened_tolerances = tolerance <= 1e-9;
                solved_from_scratch = false;
                continue;
            }

            if !switched_ratio_tester {
                log::info!("Switching ratio test.");

                self.flip_algorithm();
                self.solver.set_ratio_tester(toggle_ratio_tester(self.solver.ratio_tester()));
                switched_ratio_tester = true;
                solved_from_scratch = false;
                continue;
            }

            if !switched_pricer {
                log::info!("Switching pricer.");

                self.flip_algorithm();
                self.solver.set_pricer(toggle_pricer(self.solver.pricer()));
                switched_pricer = true;
                solved_from_scratch = false;
                continue;
            }

            log::info!("Giving up.");
            break;
        }

        self.solver.set_feasibility_tolerance(self.options.fp_feastol);
        self.solver.set_optimality_tolerance(self.options.fp_opttol);
        self.solver.set_ratio_tester(ratio_tester);
        self.solver.set_pricer(pricer);
        self.solver.set_simplifier(simplifier);
        self.solver.set_scaler(scaler);

        result
    }

    fn flip_algorithm(&mut self) {
        self.solver.set_algorithm(match self.solver.algorithm() {
            Algorithm::Enter => Algorithm::Leave,
            Algorithm::Leave => Algorithm::Enter,
        });
    }
}

fn toggle_ratio_tester(current: crate::algorithm::simplex::RatioTester) -> crate::algorithm::simplex::RatioTester {
    use crate::algorithm::simplex::RatioTester;

    match current {
        RatioTester::Textbook => RatioTester::Fast,
        RatioTester::Fast => RatioTester::Textbook,
    }
}

fn toggle_pricer(current: crate::algorithm::simplex::Pricer) -> crate::algorithm::simplex::Pricer {
    use crate::algorithm::simplex::Pricer;

    match current {
        Pricer::Devex => Pricer::Steep,
        Pricer::Steep => Pricer::Devex,
    }
}
