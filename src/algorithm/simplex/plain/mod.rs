//! # A plain bounded-variable simplex
//!
//! The default floating-point collaborator of the refinement driver: a two-phase primal simplex
//! over the slack formulation `A x - s = 0` with `s` ranged by the constraint sides. Phase one
//! drives artificial variables out of an always-feasible starting basis; phase two optimizes
//! with bound flips for boxed variables. The basis is refactorized densely every iteration,
//! which keeps the implementation small and predictable at the problem sizes the refinement
//! loop produces.
//!
//! The solver is deliberately plain: refinement does not need a fast inner solver, it needs one
//! whose behavior under the strategy switches of the recovery ladder is easy to reason about.
use std::time::Instant;

use crate::algorithm::simplex::{
    Algorithm, FloatResult, FloatSimplex, Pricer, RatioTester, Scaler, Simplifier, SingularBasis,
};
use crate::algorithm::simplex::plain::lower_upper::LowerUpper;
use crate::algorithm::simplex::plain::scale::Scaling;
use crate::data::linear_program::elements::BasisStatus;
use crate::data::linear_program::general_form::RealLp;

pub mod lower_upper;
pub mod scale;

/// Number of consecutive degenerate iterations after which pivot selection falls back to
/// smallest-index rule to break potential cycles.
const DEGENERACY_CUTOFF: u32 = 40;
/// Pivot elements smaller than this are treated as zero in the ratio test.
const PIVOT_EPSILON: f64 = 1e-11;

/// A dense two-phase primal simplex over `f64`.
#[derive(Debug)]
pub struct PlainSimplex {
    lp: Option<RealLp>,

    feastol: f64,
    opttol: f64,
    markowitz: f64,
    algorithm: Algorithm,
    pricer: Pricer,
    ratio_tester: RatioTester,
    scaler: Scaler,
    simplifier: Simplifier,
    iteration_limit: Option<u64>,
    deadline: Option<Instant>,

    row_status: Vec<BasisStatus>,
    column_status: Vec<BasisStatus>,
    basis_loaded: bool,

    primal: Vec<f64>,
    dual: Vec<f64>,
    farkas: Vec<f64>,
    iterations: u64,
}

impl Default for PlainSimplex {
    fn default() -> Self {
        Self {
            lp: None,

            feastol: 1e-9,
            opttol: 1e-9,
            markowitz: 0.1,
            algorithm: Algorithm::Enter,
            pricer: Pricer::Devex,
            ratio_tester: RatioTester::Textbook,
            scaler: Scaler::Equilibrium,
            simplifier: Simplifier::Off,
            iteration_limit: None,
            deadline: None,

            row_status: Vec::new(),
            column_status: Vec::new(),
            basis_loaded: false,

            primal: Vec::new(),
            dual: Vec::new(),
            farkas: Vec::new(),
            iterations: 0,
        }
    }
}

impl PlainSimplex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Status of a variable of the working problem (structural, slack or artificial).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum VarStatus {
    Basic,
    AtLower,
    AtUpper,
    /// Free and nonbasic, held at value zero.
    Free,
}

/// Outcome of a run of the pivoting loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LoopResult {
    Optimal,
    Unbounded,
    AbortTime,
    AbortIter,
    Singular,
}

/// The scaled working problem of a single solve: `n` structural variables, `m` slacks and
/// possibly `m` artificials, tied together by `[A | -I | +-I] z = 0`.
struct Work {
    m: usize,
    n: usize,
    columns: Vec<Vec<(usize, f64)>>,
    lower: Vec<f64>,
    upper: Vec<f64>,
    status: Vec<VarStatus>,
    /// Variable occupying each basis position.
    basic: Vec<usize>,
    /// Values of the basic variables, by basis position.
    x_basic: Vec<f64>,
    /// One-norms of the columns, used by the steepest pricer.
    norms: Vec<f64>,
}

impl Work {
    fn nr_vars(&self) -> usize {
        self.columns.len()
    }

    /// The value of a nonbasic variable.
    fn nonbasic_value(&self, k: usize) -> f64 {
        match self.status[k] {
            VarStatus::AtLower => self.lower[k],
            VarStatus::AtUpper => self.upper[k],
            VarStatus::Free => 0.0,
            VarStatus::Basic => unreachable!("basic variable has no fixed value"),
        }
    }

    /// The default nonbasic status of a variable: the nearest finite bound, or free at zero.
    fn default_nonbasic(&self, k: usize) -> VarStatus {
        if self.lower[k].is_finite() {
            VarStatus::AtLower
        } else if self.upper[k].is_finite() {
            VarStatus::AtUpper
        } else {
            VarStatus::Free
        }
    }

    /// Recompute the values of the basic variables from the nonbasic ones.
    fn recompute_basic_values(&mut self, factorization: &LowerUpper) {
        let mut rhs = vec![0.0; self.m];
        for k in 0..self.nr_vars() {
            if self.status[k] != VarStatus::Basic {
                let value = self.nonbasic_value(k);
                if value != 0.0 {
                    for &(i, coefficient) in &self.columns[k] {
                        rhs[i] -= coefficient * value;
                    }
                }
            }
        }
        factorization.solve(&mut rhs);
        self.x_basic = rhs;
    }

    fn factorize(&self, markowitz: f64) -> Result<LowerUpper, SingularBasis> {
        let columns = self.basic.iter()
            .map(|&k| self.columns[k].as_slice())
            .collect::<Vec<_>>();
        LowerUpper::decompose(&columns, markowitz)
    }

    /// The dual multipliers `y = B^-T c_B` for a cost vector.
    fn duals(&self, factorization: &LowerUpper, cost: &[f64]) -> Vec<f64> {
        let mut y = self.basic.iter().map(|&k| cost[k]).collect::<Vec<_>>();
        factorization.solve_transposed(&mut y);
        y
    }
}

impl PlainSimplex {
    fn run(&mut self, work: &mut Work, cost: &[f64]) -> LoopResult {
        let mut degenerate_streak = 0_u32;

        loop {
            if let Some(deadline) = self.deadline {
                if Instant::now() >= deadline {
                    return LoopResult::AbortTime;
                }
            }
            if let Some(limit) = self.iteration_limit {
                if self.iterations >= limit {
                    return LoopResult::AbortIter;
                }
            }

            let factorization = match work.factorize(self.markowitz) {
                Ok(factorization) => factorization,
                Err(SingularBasis) => return LoopResult::Singular,
            };
            work.recompute_basic_values(&factorization);
            let y = work.duals(&factorization, cost);

            let entering = self.price(work, cost, &y, degenerate_streak >= DEGENERACY_CUTOFF);
            let Some(q) = entering else {
                return LoopResult::Optimal;
            };

            let reduced_cost = cost[q] - work.columns[q].iter()
                .map(|&(i, v)| y[i] * v)
                .sum::<f64>();
            let direction = match work.status[q] {
                VarStatus::AtLower => 1.0,
                VarStatus::AtUpper => -1.0,
                VarStatus::Free => -reduced_cost.signum(),
                VarStatus::Basic => unreachable!("entering variable is nonbasic"),
            };

            let mut w = vec![0.0; work.m];
            for &(i, v) in &work.columns[q] {
                w[i] = v;
            }
            factorization.solve(&mut w);

            let slack = match self.ratio_tester {
                RatioTester::Textbook => 0.0,
                RatioTester::Fast => self.feastol,
            };
            let mut step = f64::INFINITY;
            let mut leaving: Option<(usize, f64)> = None;
            for position in 0..work.m {
                let delta = direction * w[position];
                let k = work.basic[position];
                let limit = if delta > PIVOT_EPSILON && work.lower[k].is_finite() {
                    (work.x_basic[position] - work.lower[k] + slack) / delta
                } else if delta < -PIVOT_EPSILON && work.upper[k].is_finite() {
                    (work.upper[k] - work.x_basic[position] + slack) / -delta
                } else {
                    continue;
                };
                let limit = limit.max(0.0);
                if limit < step {
                    step = limit;
                    leaving = Some((position, delta));
                }
            }

            let own_range = if work.lower[q].is_finite() && work.upper[q].is_finite() {
                work.upper[q] - work.lower[q]
            } else {
                f64::INFINITY
            };

            if step.is_infinite() && own_range.is_infinite() {
                return LoopResult::Unbounded;
            }

            self.iterations += 1;
            if own_range <= step {
                // A bound flip: the entering variable moves to its other bound, the basis stays.
                work.status[q] = match work.status[q] {
                    VarStatus::AtLower => VarStatus::AtUpper,
                    VarStatus::AtUpper => VarStatus::AtLower,
                    other => other,
                };
                degenerate_streak = 0;
                continue;
            }

            let (position, delta) = leaving.expect("a finite step implies a leaving variable");
            let k = work.basic[position];
            work.status[k] = if delta > 0.0 { VarStatus::AtLower } else { VarStatus::AtUpper };
            work.status[q] = VarStatus::Basic;
            work.basic[position] = q;

            if step <= PIVOT_EPSILON {
                degenerate_streak += 1;
            } else {
                degenerate_streak = 0;
            }
        }
    }

    /// Select the entering variable, or `None` when the current basis is optimal.
    fn price(&self, work: &Work, cost: &[f64], y: &[f64], bland: bool) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;

        let consider = |best: &mut Option<(usize, f64)>, k: usize, score: f64| {
            let better = match (self.algorithm, best.as_ref()) {
                (_, None) => true,
                (Algorithm::Enter, Some(&(_, best_score))) => score > best_score,
                (Algorithm::Leave, Some(&(_, best_score))) => score >= best_score,
            };
            if better {
                *best = Some((k, score));
            }
        };

        for k in 0..work.nr_vars() {
            if work.status[k] == VarStatus::Basic {
                continue;
            }
            if work.lower[k] == work.upper[k] {
                continue;
            }
            let reduced_cost = cost[k] - work.columns[k].iter()
                .map(|&(i, v)| y[i] * v)
                .sum::<f64>();
            let violation = match work.status[k] {
                VarStatus::AtLower => -reduced_cost,
                VarStatus::AtUpper => reduced_cost,
                VarStatus::Free => reduced_cost.abs(),
                VarStatus::Basic => continue,
            };
            if violation <= self.opttol {
                continue;
            }
            if bland {
                return Some(k);
            }
            let score = match self.pricer {
                Pricer::Devex => violation,
                Pricer::Steep => violation * violation / work.norms[k].max(1.0),
            };
            consider(&mut best, k, score);
        }

        best.map(|(k, _)| k)
    }

    /// Build the scaled working problem from the loaded one, without artificials.
    fn build_work(lp: &RealLp, scaling: &Scaling) -> Work {
        let m = lp.nr_rows();
        let n = lp.nr_columns();

        let mut columns = Vec::with_capacity(n + m);
        let mut lower = Vec::with_capacity(n + m);
        let mut upper = Vec::with_capacity(n + m);
        for j in 0..n {
            columns.push(lp.column(j).iter()
                .map(|&(i, value)| (i, value * scaling.rows[i] * scaling.columns[j]))
                .collect::<Vec<_>>());
            lower.push(lp.lower(j) / scaling.columns[j]);
            upper.push(lp.upper(j) / scaling.columns[j]);
        }
        for i in 0..m {
            columns.push(vec![(i, -1.0)]);
            lower.push(lp.lhs(i) * scaling.rows[i]);
            upper.push(lp.rhs(i) * scaling.rows[i]);
        }
        let norms = columns.iter()
            .map(|column| column.iter().map(|&(_, v)| v * v).sum::<f64>())
            .collect();

        Work {
            m,
            n,
            columns,
            lower,
            upper,
            status: vec![VarStatus::Free; n + m],
            basic: Vec::new(),
            x_basic: Vec::new(),
            norms,
        }
    }

    /// Map the stored external statuses onto the working problem.
    ///
    /// # Return value
    ///
    /// Whether the mapped basis is complete: exactly one basic variable per row.
    fn import_basis(&self, work: &mut Work) -> bool {
        if self.column_status.len() != work.n || self.row_status.len() != work.m {
            return false;
        }

        work.basic.clear();
        for k in 0..work.nr_vars() {
            let external = if k < work.n {
                self.column_status[k]
            } else {
                self.row_status[k - work.n]
            };
            work.status[k] = match external {
                BasisStatus::Basic => {
                    work.basic.push(k);
                    VarStatus::Basic
                },
                BasisStatus::OnLower | BasisStatus::Fixed if work.lower[k].is_finite() => {
                    VarStatus::AtLower
                },
                BasisStatus::OnUpper if work.upper[k].is_finite() => VarStatus::AtUpper,
                BasisStatus::Zero => VarStatus::Free,
                _ => work.default_nonbasic(k),
            };
        }

        work.basic.len() == work.m
    }

    /// Store the statuses of the working problem in the external representation.
    fn export_basis(&mut self, work: &Work) {
        let to_external = |work: &Work, k: usize| match work.status[k] {
            VarStatus::Basic => BasisStatus::Basic,
            VarStatus::Free => BasisStatus::Zero,
            VarStatus::AtLower => {
                if work.lower[k] == work.upper[k] { BasisStatus::Fixed } else { BasisStatus::OnLower }
            },
            VarStatus::AtUpper => {
                if work.lower[k] == work.upper[k] { BasisStatus::Fixed } else { BasisStatus::OnUpper }
            },
        };

        self.column_status = (0..work.n).map(|j| to_external(work, j)).collect();
        self.row_status = (work.n..work.n + work.m).map(|k| to_external(work, k)).collect();
        self.basis_loaded = true;
    }

    /// Append artificial variables forming a feasible starting basis, after resetting all
    /// variables to their default nonbasic status.
    fn install_artificial_basis(&self, work: &mut Work) {
        work.columns.truncate(work.n + work.m);
        work.lower.truncate(work.n + work.m);
        work.upper.truncate(work.n + work.m);
        work.status.truncate(work.n + work.m);
        work.norms.truncate(work.n + work.m);

        for k in 0..work.nr_vars() {
            work.status[k] = work.default_nonbasic(k);
        }

        let mut residual = vec![0.0; work.m];
        for k in 0..work.n + work.m {
            let value = work.nonbasic_value(k);
            if value != 0.0 {
                for &(i, coefficient) in &work.columns[k] {
                    residual[i] -= coefficient * value;
                }
            }
        }

        work.basic.clear();
        for (i, &value) in residual.iter().enumerate() {
            let sign = if value < 0.0 { -1.0 } else { 1.0 };
            let artificial = work.nr_vars();
            work.columns.push(vec![(i, sign)]);
            work.lower.push(0.0);
            work.upper.push(f64::INFINITY);
            work.status.push(VarStatus::Basic);
            work.norms.push(1.0);
            work.basic.push(artificial);
        }
    }

    /// Pivot basic artificials out of the basis where a real pivot column exists, and pin all
    /// artificials to zero.
    fn retire_artificials(&mut self, work: &mut Work) {
        for position in 0..work.m {
            let k = work.basic[position];
            if k < work.n + work.m {
                continue;
            }
            let Ok(factorization) = work.factorize(self.markowitz) else {
                break;
            };
            let replacement = (0..work.n + work.m).find(|&j| {
                if work.status[j] == VarStatus::Basic {
                    return false;
                }
                let mut w = vec![0.0; work.m];
                for &(i, v) in &work.columns[j] {
                    w[i] = v;
                }
                factorization.solve(&mut w);
                w[position].abs() > 1e-7
            });
            if let Some(j) = replacement {
                work.status[j] = VarStatus::Basic;
                work.status[k] = VarStatus::AtLower;
                work.basic[position] = j;
            }
        }

        for k in work.n + work.m..work.nr_vars() {
            work.lower[k] = 0.0;
            work.upper[k] = 0.0;
        }
    }
}

impl FloatSimplex for PlainSimplex {
    fn load(&mut self, lp: &RealLp) {
        self.lp = Some(lp.clone());
        self.basis_loaded = false;
        self.row_status.clear();
        self.column_status.clear();
    }

    fn reload(&mut self) {
        self.basis_loaded = false;
    }

    fn set_basis(&mut self, rows: &[BasisStatus], columns: &[BasisStatus]) {
        self.row_status = rows.to_vec();
        self.column_status = columns.to_vec();
        self.basis_loaded = true;
    }

    fn basis(&self) -> (Vec<BasisStatus>, Vec<BasisStatus>) {
        (self.row_status.clone(), self.column_status.clone())
    }

    fn has_basis(&self) -> bool {
        self.basis_loaded
    }

    fn change_bounds(&mut self, lower: &[f64], upper: &[f64]) {
        if let Some(lp) = &mut self.lp {
            for (j, (&low, &up)) in lower.iter().zip(upper).enumerate() {
                lp.change_bounds(j, low, up);
            }
        }
    }

    fn change_range(&mut self, lhs: &[f64], rhs: &[f64]) {
        if let Some(lp) = &mut self.lp {
            for (i, (&left, &right)) in lhs.iter().zip(rhs).enumerate() {
                lp.change_range(i, left, right);
            }
        }
    }

    fn change_cost(&mut self, cost: &[f64]) {
        if let Some(lp) = &mut self.lp {
            for (j, &value) in cost.iter().enumerate() {
                lp.change_cost(j, value);
            }
        }
    }

    fn feasibility_tolerance(&self) -> f64 {
        self.feastol
    }

    fn set_feasibility_tolerance(&mut self, tolerance: f64) {
        self.feastol = tolerance;
    }

    fn optimality_tolerance(&self) -> f64 {
        self.opttol
    }

    fn set_optimality_tolerance(&mut self, tolerance: f64) {
        self.opttol = tolerance;
    }

    fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    fn set_algorithm(&mut self, algorithm: Algorithm) {
        self.algorithm = algorithm;
    }

    fn pricer(&self) -> Pricer {
        self.pricer
    }

    fn set_pricer(&mut self, pricer: Pricer) {
        self.pricer = pricer;
    }

    fn ratio_tester(&self) -> RatioTester {
        self.ratio_tester
    }

    fn set_ratio_tester(&mut self, ratio_tester: RatioTester) {
        self.ratio_tester = ratio_tester;
    }

    fn scaler(&self) -> Scaler {
        self.scaler
    }

    fn set_scaler(&mut self, scaler: Scaler) {
        self.scaler = scaler;
    }

    fn simplifier(&self) -> Simplifier {
        self.simplifier
    }

    fn set_simplifier(&mut self, simplifier: Simplifier) {
        self.simplifier = simplifier;
    }

    fn set_markowitz(&mut self, threshold: f64) {
        self.markowitz = threshold.clamp(1e-4, 1.0);
    }

    fn set_iteration_limit(&mut self, limit: Option<u64>) {
        self.iteration_limit = limit;
    }

    fn set_deadline(&mut self, deadline: Option<Instant>) {
        self.deadline = deadline;
    }

    fn solve(&mut self) -> FloatResult {
        let Some(lp) = self.lp.take() else {
            return FloatResult::Error;
        };
        self.iterations = 0;

        let scaling = match self.scaler {
            Scaler::Equilibrium => Scaling::equilibrate(&lp),
            Scaler::Off => Scaling::identity(lp.nr_rows(), lp.nr_columns()),
        };
        let mut work = Self::build_work(&lp, &scaling);

        // A warm basis is used when it implies a feasible basic solution; otherwise the solve
        // falls back to the artificial phase one.
        let mut feasible_start = false;
        if self.basis_loaded && self.import_basis(&mut work) {
            if let Ok(factorization) = work.factorize(self.markowitz) {
                work.recompute_basic_values(&factorization);
                feasible_start = work.basic.iter().enumerate().all(|(position, &k)| {
                    work.x_basic[position] >= work.lower[k] - self.feastol
                        && work.x_basic[position] <= work.upper[k] + self.feastol
                });
            }
        }

        if !feasible_start {
            self.install_artificial_basis(&mut work);
            let phase_one_cost = (0..work.nr_vars())
                .map(|k| if k >= work.n + work.m { 1.0 } else { 0.0 })
                .collect::<Vec<_>>();

            let result = self.run(&mut work, &phase_one_cost);
            match result {
                LoopResult::Optimal => {},
                LoopResult::Unbounded | LoopResult::Singular => {
                    self.lp = Some(lp);
                    return FloatResult::Error;
                },
                LoopResult::AbortTime => {
                    self.lp = Some(lp);
                    return FloatResult::AbortTime;
                },
                LoopResult::AbortIter => {
                    self.lp = Some(lp);
                    return FloatResult::AbortIter;
                },
            }

            let infeasibility: f64 = work.basic.iter().enumerate()
                .filter(|&(_, &k)| k >= work.n + work.m)
                .map(|(position, _)| work.x_basic[position])
                .sum();
            if infeasibility > self.feastol {
                // The phase one duals certify infeasibility approximately.
                if let Ok(factorization) = work.factorize(self.markowitz) {
                    let y = work.duals(&factorization, &phase_one_cost);
                    self.farkas = y.iter().zip(&scaling.rows)
                        .map(|(&value, &factor)| value * factor)
                        .collect();
                } else {
                    self.farkas = vec![0.0; work.m];
                }
                self.export_basis(&work);
                self.lp = Some(lp);
                return FloatResult::Infeasible;
            }

            self.retire_artificials(&mut work);
        }

        let mut phase_two_cost = vec![0.0; work.nr_vars()];
        for j in 0..work.n {
            phase_two_cost[j] = lp.cost(j) * scaling.columns[j];
        }

        let result = self.run(&mut work, &phase_two_cost);
        let outcome = match result {
            LoopResult::Optimal => {
                let factorization = match work.factorize(self.markowitz) {
                    Ok(factorization) => factorization,
                    Err(SingularBasis) => {
                        self.lp = Some(lp);
                        return FloatResult::Error;
                    },
                };
                work.recompute_basic_values(&factorization);
                let y = work.duals(&factorization, &phase_two_cost);
                self.dual = y.iter().zip(&scaling.rows)
                    .map(|(&value, &factor)| value * factor)
                    .collect();

                let mut primal = vec![0.0; work.n];
                for (j, value) in primal.iter_mut().enumerate() {
                    if work.status[j] != VarStatus::Basic {
                        *value = work.nonbasic_value(j) * scaling.columns[j];
                    }
                }
                for (position, &k) in work.basic.iter().enumerate() {
                    if k < work.n {
                        primal[k] = work.x_basic[position] * scaling.columns[k];
                    }
                }
                self.primal = primal;
                self.export_basis(&work);
                FloatResult::Optimal
            },
            LoopResult::Unbounded => {
                self.export_basis(&work);
                FloatResult::Unbounded
            },
            LoopResult::AbortTime => FloatResult::AbortTime,
            LoopResult::AbortIter => FloatResult::AbortIter,
            LoopResult::Singular => FloatResult::Error,
        };

        self.lp = Some(lp);
        outcome
    }

    fn factorize(&mut self) -> Result<(), SingularBasis> {
        let Some(lp) = &self.lp else {
            return Err(SingularBasis);
        };
        let scaling = Scaling::identity(lp.nr_rows(), lp.nr_columns());
        let mut work = Self::build_work(lp, &scaling);
        if !self.basis_loaded || !self.import_basis(&mut work) {
            return Err(SingularBasis);
        }
        work.factorize(self.markowitz).map(|_| ())
    }

    fn primal(&self) -> &[f64] {
        &self.primal
    }

    fn dual(&self) -> &[f64] {
        &self.dual
    }

    fn dual_farkas(&self) -> &[f64] {
        &self.farkas
    }

    fn iterations(&self) -> u64 {
        self.iterations
    }
}

#[cfg(test)]
mod test {
    use approx::assert_abs_diff_eq;

    use crate::algorithm::simplex::{FloatResult, FloatSimplex, Scaler};
    use crate::algorithm::simplex::plain::PlainSimplex;
    use crate::data::linear_program::elements::{BasisStatus, Objective};
    use crate::data::linear_program::general_form::RealLp;

    /// max x + 2y s.t. x + y <= 4, 2x + y >= 2, x >= 0, 0 <= y <= 3.
    fn example() -> RealLp {
        RealLp::new(
            Objective::Maximize,
            vec![1.0, 2.0],
            vec![0.0, 0.0],
            vec![f64::INFINITY, 3.0],
            vec![
                vec![(0, 1.0), (1, 2.0)],
                vec![(0, 1.0), (1, 1.0)],
            ],
            vec![f64::NEG_INFINITY, 2.0],
            vec![4.0, f64::INFINITY],
        )
    }

    #[test]
    fn optimal_solve() {
        let mut solver = PlainSimplex::new();
        solver.load(&example());

        assert_eq!(solver.solve(), FloatResult::Optimal);
        let primal = solver.primal();
        assert_abs_diff_eq!(primal[0], 1.0, epsilon = 1e-7);
        assert_abs_diff_eq!(primal[1], 3.0, epsilon = 1e-7);
    }

    #[test]
    fn warm_start_takes_no_iterations() {
        let mut solver = PlainSimplex::new();
        solver.load(&example());
        assert_eq!(solver.solve(), FloatResult::Optimal);
        let (rows, columns) = solver.basis();

        solver.set_basis(&rows, &columns);
        assert_eq!(solver.solve(), FloatResult::Optimal);
        assert_eq!(solver.iterations(), 0);
    }

    #[test]
    fn unbounded() {
        let mut solver = PlainSimplex::new();
        solver.load(&RealLp::new(
            Objective::Minimize,
            vec![-1.0],
            vec![0.0],
            vec![f64::INFINITY],
            vec![vec![]],
            vec![],
            vec![],
        ));

        assert_eq!(solver.solve(), FloatResult::Unbounded);
    }

    #[test]
    fn infeasible_with_farkas() {
        // x >= 1 as a constraint row while x <= 0 as a bound.
        let mut solver = PlainSimplex::new();
        solver.load(&RealLp::new(
            Objective::Minimize,
            vec![0.0],
            vec![f64::NEG_INFINITY],
            vec![0.0],
            vec![vec![(0, 1.0)]],
            vec![1.0],
            vec![f64::INFINITY],
        ));

        assert_eq!(solver.solve(), FloatResult::Infeasible);
        // A positive multiplier on the >= row exhibits the contradiction.
        assert!(solver.dual_farkas()[0] > 0.0);
    }

    #[test]
    fn fixed_variables() {
        let mut solver = PlainSimplex::new();
        solver.load(&RealLp::new(
            Objective::Minimize,
            vec![1.0],
            vec![5.0],
            vec![5.0],
            vec![vec![]],
            vec![],
            vec![],
        ));

        assert_eq!(solver.solve(), FloatResult::Optimal);
        assert_abs_diff_eq!(solver.primal()[0], 5.0);
        let (_, columns) = solver.basis();
        assert_eq!(columns[0], BasisStatus::Fixed);
    }

    #[test]
    fn free_variable_with_zero_cost_rests_at_zero() {
        let mut solver = PlainSimplex::new();
        solver.load(&RealLp::new(
            Objective::Minimize,
            vec![0.0, 1.0],
            vec![f64::NEG_INFINITY, 0.0],
            vec![f64::INFINITY, f64::INFINITY],
            vec![vec![], vec![(0, 1.0)]],
            vec![0.0],
            vec![10.0],
        ));

        assert_eq!(solver.solve(), FloatResult::Optimal);
        assert_abs_diff_eq!(solver.primal()[0], 0.0);
        let (_, columns) = solver.basis();
        assert_eq!(columns[0], BasisStatus::Zero);
    }

    #[test]
    fn scaling_does_not_change_the_answer() {
        for scaler in [Scaler::Off, Scaler::Equilibrium] {
            let mut solver = PlainSimplex::new();
            solver.set_scaler(scaler);
            solver.load(&RealLp::new(
                Objective::Minimize,
                vec![1.0, 1000.0],
                vec![0.0, 0.0],
                vec![f64::INFINITY, f64::INFINITY],
                vec![
                    vec![(0, 1e4)],
                    vec![(0, 1e-3)],
                ],
                vec![2.0],
                vec![f64::INFINITY],
            ));

            assert_eq!(solver.solve(), FloatResult::Optimal);
            // Covering the row with x alone costs 1 * 2e-4, with y alone 1000 * 2000.
            assert_abs_diff_eq!(solver.primal()[0], 2e-4, epsilon = 1e-10);
            assert_abs_diff_eq!(solver.primal()[1], 0.0);
        }
    }
}
