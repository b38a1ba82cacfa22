//! # Linear programs in "general form"
//!
//! Data structure for manipulation of linear programs of the form `min c^T x` subject to
//! `lhs <= Ax <= rhs` and `lower <= x <= upper`. The matrix is kept in both orientations: the
//! column orientation drives primal activity computations, the row orientation dual activity
//! computations and row aggregation.
//!
//! The structure is generic in the number type. The exact problem is a `GeneralForm<Rational>`,
//! its floating-point image a `GeneralForm<f64>`; any mutation the refinement driver performs is
//! applied to both so that they never diverge structurally.
use std::fmt::Debug;

use num::Zero;

use crate::data::linear_algebra::{SparseTuple, SparseTupleVec};
use crate::data::linear_algebra::vector::{DenseVector, SparseVector, Vector};
use crate::data::linear_program::elements::{Objective, RangeType};
use crate::data::number_types::rational::Rational;

/// The exact image of the problem.
pub type RationalLp = GeneralForm<Rational>;
/// The floating-point image of the problem.
pub type RealLp = GeneralForm<f64>;

/// A linear program in general form.
///
/// The objective coefficients are always those of the minimization form; a `Maximize` sense is
/// normalized away at construction and only remembered for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneralForm<F> {
    /// Which direction the caller's objective function goes. The stored coefficients always
    /// minimize.
    objective: Objective,
    /// Constant offset in the caller's cost function.
    objective_offset: F,
    /// Minimization cost coefficients, one per column.
    cost: DenseVector<F>,
    /// Variable bounds, one pair per column.
    lower: DenseVector<F>,
    upper: DenseVector<F>,
    /// Constraint sides, one pair per row.
    lhs: DenseVector<F>,
    rhs: DenseVector<F>,
    /// All constraint coefficients, column major.
    columns: Vec<SparseTupleVec<F>>,
    /// The same coefficients, row major.
    rows: Vec<SparseTupleVec<F>>,
}

/// Check whether the dimensions of the `GeneralForm` are consistent.
///
/// This method might be expensive, use it in debugging only. It can be viewed as a piece of
/// documentation on the requirements of a `GeneralForm` struct.
fn is_consistent<F: PartialEq + Clone + Debug + Zero>(general_form: &GeneralForm<F>) -> bool {
    let nr_rows = general_form.nr_rows();
    let nr_columns = general_form.nr_columns();

    let dimensions = general_form.cost.len() == nr_columns
        && general_form.lower.len() == nr_columns
        && general_form.upper.len() == nr_columns
        && general_form.lhs.len() == nr_rows
        && general_form.rhs.len() == nr_rows
        && general_form.columns.len() == nr_columns
        && general_form.rows.len() == nr_rows;

    let sorted = general_form.columns.iter()
        .chain(general_form.rows.iter())
        .all(|vector| vector.windows(2).all(|w| w[0].0 < w[1].0));

    let in_range = general_form.columns.iter()
        .all(|column| column.iter().all(|&(i, _)| i < nr_rows))
        && general_form.rows.iter()
            .all(|row| row.iter().all(|&(j, _)| j < nr_columns));

    let mirrored = general_form.columns.iter().enumerate()
        .all(|(j, column)| column.iter().all(|(i, value)| {
            general_form.rows[*i].iter().any(|(jj, vv)| jj == &j && vv == value)
        }));

    dimensions && sorted && in_range && mirrored
}

impl<F> GeneralForm<F>
where
    F: Zero + Clone + PartialEq + Debug,
{
    /// Create a new linear program in general form.
    ///
    /// # Arguments
    ///
    /// * `objective`: Optimization direction of `cost`.
    /// * `cost`: Objective coefficients in the direction of `objective`; maximization is
    /// normalized to minimization here.
    /// * `lower`, `upper`: Variable bounds (infinities for absent bounds).
    /// * `columns`: Constraint coefficients, column major.
    /// * `lhs`, `rhs`: Constraint sides (infinities for absent sides).
    pub fn new(
        objective: Objective,
        cost: Vec<F>,
        lower: Vec<F>,
        upper: Vec<F>,
        columns: Vec<SparseTupleVec<F>>,
        lhs: Vec<F>,
        rhs: Vec<F>,
    ) -> Self
    where
        for<'r> &'r F: std::ops::Neg<Output = F>,
    {
        let nr_rows = lhs.len();
        let nr_columns = cost.len();

        let cost = match objective {
            Objective::Minimize => cost,
            Objective::Maximize => cost.iter().map(|value| -value).collect(),
        };

        let mut rows = vec![Vec::new(); nr_rows];
        for (j, column) in columns.iter().enumerate() {
            for (i, value) in column {
                rows[*i].push((j, value.clone()));
            }
        }

        let general_form = Self {
            objective,
            objective_offset: F::zero(),
            cost: DenseVector::new(cost, nr_columns),
            lower: DenseVector::new(lower, nr_columns),
            upper: DenseVector::new(upper, nr_columns),
            lhs: DenseVector::new(lhs, nr_rows),
            rhs: DenseVector::new(rhs, nr_rows),
            columns,
            rows,
        };

        debug_assert!(is_consistent(&general_form));

        general_form
    }

    /// Number of constraint rows.
    pub fn nr_rows(&self) -> usize {
        self.lhs.len()
    }

    /// Number of structural columns.
    pub fn nr_columns(&self) -> usize {
        self.cost.len()
    }

    /// The caller's optimization direction.
    pub fn objective(&self) -> Objective {
        self.objective
    }

    /// The constant offset in the caller's cost function.
    pub fn objective_offset(&self) -> &F {
        &self.objective_offset
    }

    pub fn set_objective_offset(&mut self, offset: F) {
        self.objective_offset = offset;
    }

    /// The minimization cost coefficient of a column.
    pub fn cost(&self, j: usize) -> &F {
        &self.cost[j]
    }

    /// All minimization cost coefficients.
    pub fn cost_vector(&self) -> &DenseVector<F> {
        &self.cost
    }

    pub fn lower(&self, j: usize) -> &F {
        &self.lower[j]
    }

    pub fn upper(&self, j: usize) -> &F {
        &self.upper[j]
    }

    pub fn lhs(&self, i: usize) -> &F {
        &self.lhs[i]
    }

    pub fn rhs(&self, i: usize) -> &F {
        &self.rhs[i]
    }

    pub fn lower_vector(&self) -> &DenseVector<F> {
        &self.lower
    }

    pub fn upper_vector(&self) -> &DenseVector<F> {
        &self.upper
    }

    pub fn lhs_vector(&self) -> &DenseVector<F> {
        &self.lhs
    }

    pub fn rhs_vector(&self) -> &DenseVector<F> {
        &self.rhs
    }

    /// The nonzero coefficients of a column, ordered by row index.
    pub fn column(&self, j: usize) -> &[SparseTuple<F>] {
        &self.columns[j]
    }

    /// The nonzero coefficients of a row, ordered by column index.
    pub fn row(&self, i: usize) -> &[SparseTuple<F>] {
        &self.rows[i]
    }

    pub fn change_cost(&mut self, j: usize, value: F) {
        self.cost[j] = value;
    }

    pub fn set_cost_vector(&mut self, cost: DenseVector<F>) {
        debug_assert_eq!(cost.len(), self.nr_columns());

        self.cost = cost;
    }

    pub fn change_lower(&mut self, j: usize, value: F) {
        self.lower[j] = value;
    }

    pub fn change_upper(&mut self, j: usize, value: F) {
        self.upper[j] = value;
    }

    pub fn change_bounds(&mut self, j: usize, lower: F, upper: F) {
        self.lower[j] = lower;
        self.upper[j] = upper;
    }

    pub fn change_lhs(&mut self, i: usize, value: F) {
        self.lhs[i] = value;
    }

    pub fn change_rhs(&mut self, i: usize, value: F) {
        self.rhs[i] = value;
    }

    pub fn change_range(&mut self, i: usize, lhs: F, rhs: F) {
        self.lhs[i] = lhs;
        self.rhs[i] = rhs;
    }

    pub fn set_lower_vector(&mut self, lower: DenseVector<F>) {
        debug_assert_eq!(lower.len(), self.nr_columns());

        self.lower = lower;
    }

    pub fn set_upper_vector(&mut self, upper: DenseVector<F>) {
        debug_assert_eq!(upper.len(), self.nr_columns());

        self.upper = upper;
    }

    pub fn set_lhs_vector(&mut self, lhs: DenseVector<F>) {
        debug_assert_eq!(lhs.len(), self.nr_rows());

        self.lhs = lhs;
    }

    pub fn set_rhs_vector(&mut self, rhs: DenseVector<F>) {
        debug_assert_eq!(rhs.len(), self.nr_rows());

        self.rhs = rhs;
    }

    /// Overwrite a single matrix coefficient in both orientations.
    ///
    /// A zero value removes the entry.
    pub fn change_element(&mut self, i: usize, j: usize, value: F) {
        debug_assert!(i < self.nr_rows() && j < self.nr_columns());

        set_sparse(&mut self.rows[i], j, value.clone());
        set_sparse(&mut self.columns[j], i, value);
    }

    /// Append a constraint row.
    ///
    /// # Arguments
    ///
    /// * `lhs`, `rhs`: Sides of the new row.
    /// * `coefficients`: Nonzeros of the new row, ordered by column index.
    pub fn add_row(&mut self, lhs: F, coefficients: SparseTupleVec<F>, rhs: F) {
        debug_assert!(coefficients.windows(2).all(|w| w[0].0 < w[1].0));
        debug_assert!(coefficients.iter().all(|&(j, _)| j < self.nr_columns()));

        let new_row = self.nr_rows();
        for (j, value) in &coefficients {
            self.columns[*j].push((new_row, value.clone()));
        }
        self.rows.push(coefficients);
        self.lhs.push(lhs);
        self.rhs.push(rhs);

        debug_assert!(is_consistent(self));
    }

    /// Append a structural column.
    ///
    /// # Arguments
    ///
    /// * `cost`: Minimization cost coefficient of the new column.
    /// * `lower`, `upper`: Bounds of the new column.
    /// * `coefficients`: Nonzeros of the new column, ordered by row index.
    pub fn add_column(&mut self, cost: F, lower: F, coefficients: SparseTupleVec<F>, upper: F) {
        debug_assert!(coefficients.windows(2).all(|w| w[0].0 < w[1].0));
        debug_assert!(coefficients.iter().all(|&(i, _)| i < self.nr_rows()));

        let new_column = self.nr_columns();
        for (i, value) in &coefficients {
            self.rows[*i].push((new_column, value.clone()));
        }
        self.columns.push(coefficients);
        self.cost.push(cost);
        self.lower.push(lower);
        self.upper.push(upper);

        debug_assert!(is_consistent(self));
    }

    /// Remove all rows with index at least `nr_rows`.
    pub fn truncate_rows(&mut self, nr_rows: usize) {
        debug_assert!(nr_rows <= self.nr_rows());

        self.rows.truncate(nr_rows);
        self.lhs.truncate(nr_rows);
        self.rhs.truncate(nr_rows);
        for column in &mut self.columns {
            while column.last().map_or(false, |&(i, _)| i >= nr_rows) {
                column.pop();
            }
        }

        debug_assert!(is_consistent(self));
    }

    /// Remove all columns with index at least `nr_columns`.
    pub fn truncate_columns(&mut self, nr_columns: usize) {
        debug_assert!(nr_columns <= self.nr_columns());

        self.columns.truncate(nr_columns);
        self.cost.truncate(nr_columns);
        self.lower.truncate(nr_columns);
        self.upper.truncate(nr_columns);
        for row in &mut self.rows {
            while row.last().map_or(false, |&(j, _)| j >= nr_columns) {
                row.pop();
            }
        }

        debug_assert!(is_consistent(self));
    }
}

/// Set, replace or remove a value in a sorted sparse tuple collection.
fn set_sparse<F: Zero>(data: &mut SparseTupleVec<F>, key: usize, value: F) {
    match data.binary_search_by_key(&key, |&(index, _)| index) {
        Ok(position) => {
            if value.is_zero() {
                data.remove(position);
            } else {
                data[position].1 = value;
            }
        },
        Err(position) => {
            if !value.is_zero() {
                data.insert(position, (key, value));
            }
        },
    }
}

impl GeneralForm<Rational> {
    /// Classification of a column's bound pair.
    pub fn column_range(&self, j: usize) -> RangeType {
        range_type(&self.lower[j], &self.upper[j])
    }

    /// Classification of a row's side pair.
    pub fn row_range(&self, i: usize) -> RangeType {
        range_type(&self.lhs[i], &self.rhs[i])
    }

    /// Compute the row activities `A x` exactly.
    pub fn compute_primal_activity(&self, primal: &DenseVector<Rational>) -> DenseVector<Rational> {
        debug_assert_eq!(primal.len(), self.nr_columns());

        let mut activity = DenseVector::constant(Rational::zero(), self.nr_rows());
        for (j, column) in self.columns.iter().enumerate() {
            let value = &primal[j];
            if !value.is_zero() {
                for (i, coefficient) in column {
                    activity[*i].add_product(coefficient, value);
                }
            }
        }

        activity
    }

    /// Update row activities by the effect `A diff` of a sparse primal change.
    pub fn add_primal_activity(
        &self,
        diff: &SparseVector<Rational>,
        activity: &mut DenseVector<Rational>,
    ) {
        debug_assert_eq!(diff.len(), self.nr_columns());
        debug_assert_eq!(activity.len(), self.nr_rows());

        for (j, value) in diff.iter() {
            for (i, coefficient) in &self.columns[*j] {
                activity[*i].add_product(coefficient, value);
            }
        }
    }

    /// Subtract the dual activities `A^T dual` from `values`, exactly.
    pub fn sub_dual_activity(&self, dual: &DenseVector<Rational>, values: &mut DenseVector<Rational>) {
        debug_assert_eq!(dual.len(), self.nr_rows());
        debug_assert_eq!(values.len(), self.nr_columns());

        for (i, row) in self.rows.iter().enumerate() {
            let multiplier = &dual[i];
            if !multiplier.is_zero() {
                for (j, coefficient) in row {
                    values[*j].sub_product(coefficient, multiplier);
                }
            }
        }
    }

    /// Add the dual activities `A^T diff` of a sparse dual change to `values`.
    pub fn add_dual_activity(&self, diff: &SparseVector<Rational>, values: &mut DenseVector<Rational>) {
        debug_assert_eq!(diff.len(), self.nr_rows());
        debug_assert_eq!(values.len(), self.nr_columns());

        for (i, multiplier) in diff.iter() {
            for (j, coefficient) in &self.rows[*i] {
                values[*j].add_product(coefficient, multiplier);
            }
        }
    }

    /// Replace bound magnitudes at or above the threshold by the infinity sentinels.
    pub fn apply_infinity_threshold(&mut self, threshold: &Rational) {
        for j in 0..self.nr_columns() {
            if self.lower[j] <= -threshold {
                self.lower[j] = Rational::MinusInfinity;
            }
            if self.upper[j] >= *threshold {
                self.upper[j] = Rational::PlusInfinity;
            }
        }
        for i in 0..self.nr_rows() {
            if self.lhs[i] <= -threshold {
                self.lhs[i] = Rational::MinusInfinity;
            }
            if self.rhs[i] >= *threshold {
                self.rhs[i] = Rational::PlusInfinity;
            }
        }
    }
}

fn range_type(lower: &Rational, upper: &Rational) -> RangeType {
    debug_assert!(lower <= upper);

    match (lower.is_finite(), upper.is_finite()) {
        (false, false) => RangeType::Free,
        (true, false) => RangeType::LowerOnly,
        (false, true) => RangeType::UpperOnly,
        (true, true) => if lower == upper { RangeType::Fixed } else { RangeType::Boxed },
    }
}

impl GeneralForm<f64> {
    /// The floating-point image of an exact problem.
    ///
    /// Dimensions and sparsity pattern are identical; every value is the rounded image of the
    /// exact value, with the sentinels becoming the float infinities.
    #[must_use]
    pub fn from_rational(exact: &GeneralForm<Rational>) -> Self {
        Self {
            objective: exact.objective,
            objective_offset: exact.objective_offset.to_f64(),
            cost: exact.cost.iter().map(Rational::to_f64).collect(),
            lower: exact.lower.iter().map(Rational::to_f64).collect(),
            upper: exact.upper.iter().map(Rational::to_f64).collect(),
            lhs: exact.lhs.iter().map(Rational::to_f64).collect(),
            rhs: exact.rhs.iter().map(Rational::to_f64).collect(),
            columns: exact.columns.iter()
                .map(|column| column.iter().map(|(i, v)| (*i, v.to_f64())).collect())
                .collect(),
            rows: exact.rows.iter()
                .map(|row| row.iter().map(|(j, v)| (*j, v.to_f64())).collect())
                .collect(),
        }
    }
}

#[cfg(test)]
mod test;
