//! # Equilibration scaling
//!
//! Rows and columns of the constraint matrix are scaled towards unit maximum magnitude before a
//! solve. Scaling is computed fresh for every solve from the loaded problem; the solution
//! vectors are unscaled on extraction, so callers never observe scaled values.
use crate::data::linear_program::general_form::RealLp;

/// Multiplicative row and column factors.
///
/// The scaled matrix is `R A K` with `R = diag(rows)` and `K = diag(columns)`; all factors are
/// strictly positive and finite.
#[derive(Debug, Clone)]
pub struct Scaling {
    pub rows: Vec<f64>,
    pub columns: Vec<f64>,
}

impl Scaling {
    /// No scaling.
    #[must_use]
    pub fn identity(nr_rows: usize, nr_columns: usize) -> Self {
        Self {
            rows: vec![1.0; nr_rows],
            columns: vec![1.0; nr_columns],
        }
    }

    /// Equilibrate towards unit maximum magnitudes, rows first.
    #[must_use]
    pub fn equilibrate(lp: &RealLp) -> Self {
        let mut rows = vec![0.0_f64; lp.nr_rows()];
        for j in 0..lp.nr_columns() {
            for &(i, value) in lp.column(j) {
                rows[i] = rows[i].max(value.abs());
            }
        }
        for factor in &mut rows {
            *factor = if factor.is_normal() { 1.0 / *factor } else { 1.0 };
        }

        let mut columns = vec![0.0_f64; lp.nr_columns()];
        for (j, factor) in columns.iter_mut().enumerate() {
            for &(i, value) in lp.column(j) {
                *factor = factor.max((value * rows[i]).abs());
            }
            *factor = if factor.is_normal() { 1.0 / *factor } else { 1.0 };
        }

        Self { rows, columns }
    }
}

#[cfg(test)]
mod test {
    use approx::assert_abs_diff_eq;

    use crate::algorithm::simplex::plain::scale::Scaling;
    use crate::data::linear_program::elements::Objective;
    use crate::data::linear_program::general_form::RealLp;

    #[test]
    fn equilibrate() {
        let lp = RealLp::new(
            Objective::Minimize,
            vec![1.0, 1.0],
            vec![0.0, 0.0],
            vec![f64::INFINITY, f64::INFINITY],
            vec![
                vec![(0, 100.0)],
                vec![(0, 200.0), (1, 0.5)],
            ],
            vec![0.0, 0.0],
            vec![1.0, 1.0],
        );

        let scaling = Scaling::equilibrate(&lp);
        assert_abs_diff_eq!(scaling.rows[0], 1.0 / 200.0);
        assert_abs_diff_eq!(scaling.rows[1], 2.0);
        // Scaled column 1 has entries 1 and 1, so no further correction.
        assert_abs_diff_eq!(scaling.columns[1], 1.0);
        assert_abs_diff_eq!(scaling.columns[0], 2.0);
    }

    #[test]
    fn empty_rows_and_columns_stay_unscaled() {
        let lp = RealLp::new(
            Objective::Minimize,
            vec![1.0],
            vec![0.0],
            vec![1.0],
            vec![vec![]],
            vec![0.0],
            vec![1.0],
        );

        let scaling = Scaling::equilibrate(&lp);
        assert_abs_diff_eq!(scaling.rows[0], 1.0);
        assert_abs_diff_eq!(scaling.columns[0], 1.0);
    }
}
