//! # Representation of solve results
//!
//! The refinement driver populates a single bundle of optional vectors: a primal solution with
//! its row activities, a dual solution with its reduced costs, a primal ray for unbounded
//! problems and a dual Farkas ray for infeasible ones. Each part is gated by a flag, because
//! which parts are meaningful depends on the outcome of the solve.
use num::Zero;

use crate::data::linear_algebra::vector::{DenseVector, Vector};
use crate::data::number_types::rational::Rational;

/// The parts of a solve result, all in exact arithmetic.
///
/// Created empty, filled incrementally by the refinement driver, and invalidated whenever the
/// problem changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub(crate) primal: DenseVector<Rational>,
    pub(crate) slacks: DenseVector<Rational>,
    pub(crate) dual: DenseVector<Rational>,
    pub(crate) red_cost: DenseVector<Rational>,
    pub(crate) primal_ray: DenseVector<Rational>,
    pub(crate) dual_farkas: DenseVector<Rational>,
    pub(crate) primal_objective: Rational,
    pub(crate) dual_objective: Rational,

    pub(crate) has_primal: bool,
    pub(crate) has_dual: bool,
    pub(crate) has_primal_ray: bool,
    pub(crate) has_dual_farkas: bool,
}

impl Default for Solution {
    fn default() -> Self {
        Self {
            primal: DenseVector::new(Vec::new(), 0),
            slacks: DenseVector::new(Vec::new(), 0),
            dual: DenseVector::new(Vec::new(), 0),
            red_cost: DenseVector::new(Vec::new(), 0),
            primal_ray: DenseVector::new(Vec::new(), 0),
            dual_farkas: DenseVector::new(Vec::new(), 0),
            primal_objective: Rational::zero(),
            dual_objective: Rational::zero(),

            has_primal: false,
            has_dual: false,
            has_primal_ray: false,
            has_dual_farkas: false,
        }
    }
}

impl Solution {
    /// Create an empty bundle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all parts of the solution.
    ///
    /// The vectors keep their allocations; only the flags are cleared.
    pub fn invalidate(&mut self) {
        self.has_primal = false;
        self.has_dual = false;
        self.has_primal_ray = false;
        self.has_dual_farkas = false;
    }

    /// The primal solution values, if available.
    #[must_use]
    pub fn primal(&self) -> Option<&DenseVector<Rational>> {
        self.has_primal.then_some(&self.primal)
    }

    /// The row activities `A x` of the primal solution, if available.
    #[must_use]
    pub fn slacks(&self) -> Option<&DenseVector<Rational>> {
        self.has_primal.then_some(&self.slacks)
    }

    /// The dual multipliers, one per row, if available.
    #[must_use]
    pub fn dual(&self) -> Option<&DenseVector<Rational>> {
        self.has_dual.then_some(&self.dual)
    }

    /// The reduced costs, one per column, if available.
    #[must_use]
    pub fn reduced_costs(&self) -> Option<&DenseVector<Rational>> {
        self.has_dual.then_some(&self.red_cost)
    }

    /// A ray along which the objective improves without bound, if one was found.
    #[must_use]
    pub fn primal_ray(&self) -> Option<&DenseVector<Rational>> {
        self.has_primal_ray.then_some(&self.primal_ray)
    }

    /// A dual ray proving primal infeasibility, if one was found.
    #[must_use]
    pub fn dual_farkas(&self) -> Option<&DenseVector<Rational>> {
        self.has_dual_farkas.then_some(&self.dual_farkas)
    }

    /// The objective value of the primal solution, in the caller's optimization direction.
    #[must_use]
    pub fn objective_value(&self) -> Option<&Rational> {
        self.has_primal.then_some(&self.primal_objective)
    }
}

#[cfg(test)]
mod test {
    use crate::data::linear_algebra::vector::{DenseVector, Vector};
    use crate::data::linear_program::solution::Solution;
    use crate::RAT;

    #[test]
    fn flags_gate_access() {
        let mut solution = Solution::new();
        assert_eq!(solution.primal(), None);

        solution.primal = DenseVector::new(vec![RAT!(1)], 1);
        solution.has_primal = true;
        assert!(solution.primal().is_some());
        assert!(solution.dual().is_none());

        solution.invalidate();
        assert_eq!(solution.primal(), None);
    }
}
