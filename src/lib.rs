//! # An exact linear program solver.
//!
//! Linear programs of the form `min/max c^T x` subject to `l <= Ax <= r` and `w <= x <= u` are
//! solved to provable optimality: the result is an optimal primal-dual pair, a Farkas proof of
//! infeasibility, or a primal ray certifying unboundedness.
//!
//! Exactness is not obtained by pivoting in rational arithmetic. Instead, a floating-point
//! simplex is driven through an iterative refinement loop: after each approximate solve, the
//! residual violations of the rational problem are computed exactly, the problem is shifted and
//! scaled so that those residuals become well-conditioned, and the floating-point solver is
//! invoked again on the corrected problem. The loop terminates once the exact violations meet
//! rational tolerances of arbitrary tightness.
//!
//! The crate consists of two main parts:
//!
//! * [`data`] holds the problem representations: an arbitrary precision rational scalar with
//!   infinity sentinels, dense and sparse vectors over it, and the exact and floating-point
//!   images of a linear program that are kept in lock-step.
//! * [`algorithm`] holds the refinement driver, the recovery wrapper around the floating-point
//!   solve, the reversible problem transformations, the Farkas box verification, and a plain
//!   bounded-variable simplex serving as the default floating-point collaborator.
pub mod algorithm;
pub mod data;

#[cfg(test)]
mod tests;
