//! # Reversible problem rewrites
//!
//! Two rewrites that improve the numerical behavior of the floating-point solves: lifting
//! compresses the magnitude range of the matrix coefficients, the equality transform replaces
//! inequality rows by equations with explicit slack columns. Both return a record that their
//! inverse consumes, so a transformation cannot be left applied or undone twice.
use itertools::repeat_n;
use num::{One, Zero};

use crate::algorithm::refinement::RationalSolver;
use crate::algorithm::simplex::FloatSimplex;
use crate::data::linear_program::elements::BasisStatus;
use crate::data::linear_program::solution::Solution;
use crate::data::number_types::rational::Rational;

/// Problem dimensions before lifting, and the displaced matrix entries; consumed by
/// [`RationalSolver::project`].
#[must_use]
#[derive(Debug)]
pub(crate) struct LiftRecord {
    columns_before: usize,
    rows_before: usize,
    displaced: Vec<(usize, usize, Rational)>,
}

/// Rows that received a slack column; consumed by [`RationalSolver::untransform_equality`].
#[must_use]
#[derive(Debug)]
pub(crate) struct EqualityRecord {
    slack_rows: Vec<usize>,
    columns_before: usize,
}

impl<S: FloatSimplex> RationalSolver<S> {
    /// Reduce the magnitude range of the matrix coefficients.
    ///
    /// Every column containing entries beyond the lifting bounds is split: an auxiliary free
    /// column `y` tied to the original column by a new row `bound * x - y = 0` takes over the
    /// extreme entries, divided by the bound. Auxiliary columns enter the basis `Basic`, the
    /// tie rows `Fixed`.
    pub(crate) fn lift(&mut self) -> LiftRecord {
        log::debug!("Reducing matrix coefficients by lifting.");

        let columns_before = self.rational_lp.nr_columns();
        let rows_before = self.rational_lp.nr_rows();
        let mut displaced = Vec::new();

        let max_value = self.options.lift_max_value.clone();
        self.lift_pass(&max_value, &mut displaced, |value, bound| value.abs() > *bound);
        let min_value = self.options.lift_min_value.clone();
        self.lift_pass(&min_value, &mut displaced, |value, bound| value.abs() < *bound);

        let added_columns = self.rational_lp.nr_columns() - columns_before;
        let added_rows = self.rational_lp.nr_rows() - rows_before;
        if self.has_basis {
            self.basis_cols.extend(repeat_n(BasisStatus::Basic, added_columns));
            self.basis_rows.extend(repeat_n(BasisStatus::Fixed, added_rows));
        }

        if added_columns > 0 || added_rows > 0 {
            log::info!(
                "Added {} columns and {} rows to reduce large matrix coefficients.",
                added_columns, added_rows,
            );
        }

        LiftRecord { columns_before, rows_before, displaced }
    }

    /// One lifting sweep over all columns, including the ones added by an earlier sweep.
    fn lift_pass(
        &mut self,
        bound: &Rational,
        displaced: &mut Vec<(usize, usize, Rational)>,
        lift_entry: impl Fn(&Rational, &Rational) -> bool,
    ) {
        let mut column = 0;
        while column < self.rational_lp.nr_columns() {
            let extreme = self.rational_lp.column(column).iter()
                .filter(|(_, value)| lift_entry(value, bound))
                .map(|(row, value)| (*row, value.clone()))
                .collect::<Vec<_>>();

            if !extreme.is_empty() {
                let lifting_column = self.rational_lp.nr_columns();
                self.synced_add_column(
                    Rational::zero(),
                    Rational::MinusInfinity,
                    Vec::new(),
                    Rational::PlusInfinity,
                );
                self.synced_add_row(
                    Rational::zero(),
                    vec![(column, bound.clone()), (lifting_column, -Rational::one())],
                    Rational::zero(),
                );

                for (row, value) in extreme {
                    log::debug!("Lifting entry of magnitude {} in row {}.", value, row);

                    self.synced_change_element(row, column, Rational::zero());
                    let mut new_value = value.clone();
                    new_value /= bound;
                    self.synced_change_element(row, lifting_column, new_value);
                    displaced.push((row, column, value));
                }
            }

            column += 1;
        }
    }

    /// Undo [`RationalSolver::lift`]: project the solution back and drop the auxiliaries.
    ///
    /// The primal solution survives unconditionally. The dual solution is lost when an
    /// auxiliary column carries a reduced cost beyond the optimality tolerance, the basis when
    /// an auxiliary column left the basis or a tie row entered it.
    pub(crate) fn project(&mut self, record: LiftRecord, sol: &mut Solution) {
        let LiftRecord { columns_before, rows_before, displaced } = record;
        let lifted_columns = self.rational_lp.nr_columns();
        let lifted_rows = self.rational_lp.nr_rows();

        debug_assert!(lifted_columns >= columns_before);
        debug_assert!(lifted_rows >= rows_before);

        self.synced_truncate_columns(columns_before);
        self.synced_truncate_rows(rows_before);
        for (row, column, value) in displaced {
            self.synced_change_element(row, column, value);
        }

        if sol.has_primal {
            sol.primal.truncate(columns_before);
            sol.slacks.truncate(rows_before);
        }
        if sol.has_primal_ray {
            sol.primal_ray.truncate(columns_before);
        }

        for column in columns_before..lifted_columns {
            if !sol.has_dual {
                break;
            }
            let mut scaled = self.options.lift_max_value.clone();
            scaled *= &sol.red_cost[column];
            if scaled.abs() > self.options.opttol {
                log::warn!("Lost dual solution during project phase.");
                sol.has_dual = false;
            }
        }
        if sol.has_dual {
            sol.red_cost.truncate(columns_before);
            sol.dual.truncate(rows_before);
        }
        if sol.has_dual_farkas {
            sol.dual_farkas.truncate(rows_before);
        }

        for column in columns_before..lifted_columns {
            if !self.has_basis {
                break;
            }
            if self.basis_cols[column] != BasisStatus::Basic {
                log::warn!("Lost basis during project phase because of nonbasic lifting column.");
                self.has_basis = false;
            }
        }
        for row in rows_before..lifted_rows {
            if !self.has_basis {
                break;
            }
            if self.basis_rows[row] == BasisStatus::Basic {
                log::warn!("Lost basis during project phase because of basic lifting row.");
                self.has_basis = false;
            }
        }
        self.basis_cols.truncate(columns_before);
        self.basis_rows.truncate(rows_before);
    }

    /// Turn every inequality row into an equation by introducing a slack column.
    ///
    /// A slack column with bounds `[-rhs, -lhs]` and a unit coefficient joins each inequality
    /// row, whose sides collapse to `[0, 0]`. A row resting on one of its sides maps onto the
    /// slack resting on the opposite bound.
    pub(crate) fn transform_equality(&mut self) -> EqualityRecord {
        log::debug!("Transforming rows to equation form.");

        let columns_before = self.rational_lp.nr_columns();
        let mut slack_rows = Vec::new();

        for row in 0..self.rational_lp.nr_rows() {
            if self.rational_lp.lhs(row) != self.rational_lp.rhs(row) {
                let lower = -self.rational_lp.rhs(row);
                let upper = -self.rational_lp.lhs(row);
                self.synced_add_column(
                    Rational::zero(),
                    lower,
                    vec![(row, Rational::one())],
                    upper,
                );
                self.synced_change_range(row, Rational::zero(), Rational::zero());
                slack_rows.push(row);
            }
        }

        if self.has_basis {
            for &row in &slack_rows {
                self.basis_cols.push(match self.basis_rows[row] {
                    BasisStatus::OnLower => BasisStatus::OnUpper,
                    BasisStatus::OnUpper => BasisStatus::OnLower,
                    other => other,
                });
                self.basis_rows[row] = BasisStatus::Fixed;
            }
        }

        if !slack_rows.is_empty() {
            log::info!(
                "Added {} slack columns to transform rows to equality form.",
                slack_rows.len(),
            );
        }

        EqualityRecord { slack_rows, columns_before }
    }

    /// Undo [`RationalSolver::transform_equality`]: restore the sides and drop the slacks.
    pub(crate) fn untransform_equality(&mut self, record: EqualityRecord, sol: &mut Solution) {
        let EqualityRecord { slack_rows, columns_before } = record;

        if sol.has_primal {
            for (offset, &row) in slack_rows.iter().enumerate() {
                let column = columns_before + offset;
                let slack_value = sol.primal[column].clone();
                sol.slacks[row] -= &slack_value;
            }
            sol.primal.truncate(columns_before);
        }
        if sol.has_primal_ray {
            sol.primal_ray.truncate(columns_before);
        }
        if sol.has_dual {
            sol.red_cost.truncate(columns_before);
        }

        if self.has_basis {
            for (offset, &row) in slack_rows.iter().enumerate() {
                let column = columns_before + offset;

                debug_assert!(matches!(
                    self.basis_rows[row],
                    BasisStatus::Fixed | BasisStatus::Basic,
                ));

                if self.basis_rows[row] == BasisStatus::Fixed {
                    self.basis_rows[row] = match self.basis_cols[column] {
                        BasisStatus::OnLower => BasisStatus::OnUpper,
                        BasisStatus::OnUpper => BasisStatus::OnLower,
                        other => other,
                    };
                }
            }
            self.basis_cols.truncate(columns_before);
        }

        for (offset, &row) in slack_rows.iter().enumerate() {
            let column = columns_before + offset;
            let lhs = -self.rational_lp.upper(column);
            let rhs = -self.rational_lp.lower(column);
            self.synced_change_range(row, lhs, rhs);
        }
        self.synced_truncate_columns(columns_before);
    }
}
