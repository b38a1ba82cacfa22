//! # The floating-point simplex contract
//!
//! The refinement driver treats the floating-point solver as a collaborator with a fixed
//! interface: it loads a problem, optionally warm-starts from basis statuses, mutates bounds,
//! sides and costs in place between solves, and reports one of a small set of outcomes together
//! with solution vectors. The driver never inspects how the solver pivots; it only requires the
//! strategy switches below so that its recovery ladder can perturb a struggling solve.
use std::error::Error;
use std::fmt;
use std::time::Instant;

use crate::data::linear_program::elements::BasisStatus;
use crate::data::linear_program::general_form::RealLp;

pub mod plain;

/// Outcome of a floating-point solve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FloatResult {
    /// Solved to optimality within the floating-point tolerances.
    Optimal,
    /// The problem was detected infeasible; an approximate dual Farkas ray is available.
    Infeasible,
    /// The problem was detected unbounded.
    Unbounded,
    /// The deadline passed before a decisive outcome.
    AbortTime,
    /// The iteration limit was reached before a decisive outcome.
    AbortIter,
    /// The solver failed, for instance on a singular basis it could not recover from.
    Error,
}

/// Which side of the pivot drives the search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Algorithm {
    /// Select the entering variable first.
    Enter,
    /// Select the leaving variable first.
    Leave,
}

/// Pricing rule used to select the entering variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pricer {
    /// Largest reduced cost violation.
    Devex,
    /// Reduced cost violation normalized by the column norm.
    Steep,
}

/// Variant of the ratio test.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RatioTester {
    /// Plain minimum ratio.
    Textbook,
    /// Minimum ratio with a feasibility-tolerance slack on the numerator, trading a little bound
    /// violation for longer steps.
    Fast,
}

/// Whether the problem is scaled before solving.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scaler {
    Off,
    /// Row and column equilibration towards unit maximum magnitudes.
    Equilibrium,
}

/// Whether the problem is simplified before solving.
///
/// Simplification is a pluggable concern; the shipped implementation performs no reductions, the
/// setting exists so that callers replacing the collaborator can hook one in and so that the
/// recovery ladder can toggle it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Simplifier {
    Off,
    Auto,
}

/// The basis implied by the given statuses is singular or incomplete.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SingularBasis;

impl fmt::Display for SingularBasis {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "the current basis could not be factorized")
    }
}

impl Error for SingularBasis {}

/// A floating-point simplex solver, as used by the refinement driver.
///
/// Implementations own a copy of the loaded problem; mutations through `change_*` apply to that
/// copy only. Solution accessors return the vectors of the most recent solve and are only
/// meaningful for the outcome that produced them: `primal` and `dual` after `Optimal`,
/// `dual_farkas` after `Infeasible`.
pub trait FloatSimplex {
    /// Load a fresh problem, dropping any previous problem and basis.
    fn load(&mut self, lp: &RealLp);
    /// Forget the current basis, keeping the problem.
    fn reload(&mut self);
    /// Install a starting basis described by per-row and per-column statuses.
    fn set_basis(&mut self, rows: &[BasisStatus], columns: &[BasisStatus]);
    /// The basis statuses of the most recent solve.
    fn basis(&self) -> (Vec<BasisStatus>, Vec<BasisStatus>);
    /// Whether basis information is available.
    fn has_basis(&self) -> bool;

    /// Replace all variable bounds.
    fn change_bounds(&mut self, lower: &[f64], upper: &[f64]);
    /// Replace all constraint sides.
    fn change_range(&mut self, lhs: &[f64], rhs: &[f64]);
    /// Replace all cost coefficients.
    fn change_cost(&mut self, cost: &[f64]);

    fn feasibility_tolerance(&self) -> f64;
    fn set_feasibility_tolerance(&mut self, tolerance: f64);
    fn optimality_tolerance(&self) -> f64;
    fn set_optimality_tolerance(&mut self, tolerance: f64);

    fn algorithm(&self) -> Algorithm;
    fn set_algorithm(&mut self, algorithm: Algorithm);
    fn pricer(&self) -> Pricer;
    fn set_pricer(&mut self, pricer: Pricer);
    fn ratio_tester(&self) -> RatioTester;
    fn set_ratio_tester(&mut self, ratio_tester: RatioTester);
    fn scaler(&self) -> Scaler;
    fn set_scaler(&mut self, scaler: Scaler);
    fn simplifier(&self) -> Simplifier;
    fn set_simplifier(&mut self, simplifier: Simplifier);

    /// Set the pivot threshold of the basis factorization.
    fn set_markowitz(&mut self, threshold: f64);
    /// Limit the number of simplex iterations of a single solve.
    fn set_iteration_limit(&mut self, limit: Option<u64>);
    /// Abort a solve once this instant has passed.
    fn set_deadline(&mut self, deadline: Option<Instant>);

    /// Solve the currently loaded problem.
    fn solve(&mut self) -> FloatResult;
    /// Force a fresh factorization of the current basis.
    fn factorize(&mut self) -> Result<(), SingularBasis>;

    /// The primal solution of the most recent optimal solve, one value per column.
    fn primal(&self) -> &[f64];
    /// The dual solution of the most recent optimal solve, one multiplier per row.
    fn dual(&self) -> &[f64];
    /// The approximate Farkas ray of the most recent infeasible solve, one multiplier per row.
    fn dual_farkas(&self) -> &[f64];
    /// Number of simplex iterations of the most recent solve.
    fn iterations(&self) -> u64;
}
