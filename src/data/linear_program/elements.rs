//! # Building blocks to describe linear programs.
#![allow(missing_docs)]
use std::fmt;

/// Direction of optimization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Objective {
    Maximize,
    Minimize,
}

impl Default for Objective {
    fn default() -> Self {
        Objective::Minimize
    }
}

/// Status of a variable or constraint row with respect to the current basis.
///
/// A row's status is the status of its activity value: a row `OnLower` has its activity at the
/// left-hand side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BasisStatus {
    /// Nonbasic at the lower bound (left-hand side, for a row).
    OnLower,
    /// Nonbasic at the upper bound (right-hand side, for a row).
    OnUpper,
    /// Nonbasic with coinciding bounds.
    Fixed,
    /// Nonbasic free variable at value zero.
    Zero,
    /// Basic.
    Basic,
    /// No basis information available.
    Undefined,
}

/// Classification of a bound pair, derived from the values and the infinity sentinels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RangeType {
    /// Neither bound is finite.
    Free,
    /// Only the lower bound (left-hand side) is finite.
    LowerOnly,
    /// Only the upper bound (right-hand side) is finite.
    UpperOnly,
    /// Both bounds are finite and distinct.
    Boxed,
    /// Both bounds are finite and equal.
    Fixed,
}

/// Outcome of a solve, as reported to the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// An optimal primal-dual pair within the rational tolerances is available.
    Optimal,
    /// A dual Farkas ray certifying primal infeasibility is available.
    Infeasible,
    /// A primal ray certifying unboundedness is available.
    Unbounded,
    /// The time, refinement or stall limit was reached before a certified result.
    AbortTime,
    /// The cumulative simplex iteration limit was reached before a certified result.
    AbortIter,
    /// The objective limit was reached.
    AbortValue,
    /// The solver gave up: recovery was exhausted or refinement stopped making progress.
    Error,
    /// No problem has been loaded.
    NoProblem,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Status::Optimal => "optimal",
            Status::Infeasible => "infeasible",
            Status::Unbounded => "unbounded",
            Status::AbortTime => "time limit",
            Status::AbortIter => "iteration limit",
            Status::AbortValue => "objective limit",
            Status::Error => "error",
            Status::NoProblem => "no problem",
        };
        write!(f, "{}", name)
    }
}
