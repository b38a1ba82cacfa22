//! # Dense LU factorization
//!
//! Factorization of the basis matrix with threshold partial pivoting. The threshold is the
//! Markowitz parameter of the solver: a pivot candidate is accepted when its magnitude is at
//! least the threshold times the largest magnitude in the remaining column, and among acceptable
//! candidates the topmost row is taken. Raising the threshold towards one degenerates into full
//! partial pivoting, which is more stable.
use crate::algorithm::simplex::SingularBasis;
use crate::data::linear_algebra::SparseTuple;

/// A dense LU factorization `P B = L U` of a square basis matrix.
#[derive(Debug, Clone)]
pub struct LowerUpper {
    /// Dimension of the factorized matrix.
    m: usize,
    /// `L` strictly below the diagonal (unit diagonal implied), `U` on and above it, row major.
    factors: Vec<f64>,
    /// Row permutation: row `k` of the permuted matrix is row `permutation[k]` of the original.
    permutation: Vec<usize>,
}

impl LowerUpper {
    /// Factorize the matrix given by its columns.
    ///
    /// # Arguments
    ///
    /// * `columns`: The `m` columns of the matrix, each a sorted sparse vector of length `m`.
    /// * `threshold`: Markowitz pivot threshold in `(0, 1]`.
    pub fn decompose(columns: &[&[SparseTuple<f64>]], threshold: f64) -> Result<Self, SingularBasis> {
        debug_assert!(0.0 < threshold && threshold <= 1.0);

        let m = columns.len();
        let mut factors = vec![0.0; m * m];
        for (k, column) in columns.iter().enumerate() {
            for &(i, value) in *column {
                debug_assert!(i < m);
                factors[i * m + k] = value;
            }
        }
        let mut permutation = (0..m).collect::<Vec<_>>();

        for k in 0..m {
            let largest = (k..m)
                .map(|i| factors[permutation[i] * m + k].abs())
                .fold(0.0, f64::max);
            if largest < 1e-13 {
                return Err(SingularBasis);
            }

            let acceptable = threshold * largest;
            let pivot_position = (k..m)
                .find(|&i| factors[permutation[i] * m + k].abs() >= acceptable)
                .unwrap_or(k);
            permutation.swap(k, pivot_position);

            let pivot_row = permutation[k];
            let pivot = factors[pivot_row * m + k];
            for i in (k + 1)..m {
                let row = permutation[i];
                let multiplier = factors[row * m + k] / pivot;
                if multiplier != 0.0 {
                    factors[row * m + k] = multiplier;
                    for j in (k + 1)..m {
                        factors[row * m + j] -= multiplier * factors[pivot_row * m + j];
                    }
                }
            }
        }

        Ok(Self { m, factors, permutation })
    }

    /// Solve `B x = b` in place.
    pub fn solve(&self, b: &mut [f64]) {
        debug_assert_eq!(b.len(), self.m);

        let m = self.m;
        let permuted = self.permutation.iter().map(|&i| b[i]).collect::<Vec<_>>();
        b.copy_from_slice(&permuted);

        // Forward substitution with the unit lower triangle.
        for k in 0..m {
            let row = self.permutation[k];
            for j in 0..k {
                b[k] -= self.factors[row * m + j] * b[j];
            }
        }
        // Back substitution with the upper triangle.
        for k in (0..m).rev() {
            let row = self.permutation[k];
            for j in (k + 1)..m {
                b[k] -= self.factors[row * m + j] * b[j];
            }
            b[k] /= self.factors[row * m + k];
        }
    }

    /// Solve `B^T x = b` in place.
    pub fn solve_transposed(&self, b: &mut [f64]) {
        debug_assert_eq!(b.len(), self.m);

        let m = self.m;
        // Forward substitution with the transposed upper triangle.
        for k in 0..m {
            let row = self.permutation[k];
            for j in 0..k {
                b[k] -= self.factors[self.permutation[j] * m + k] * b[j];
            }
            b[k] /= self.factors[row * m + k];
        }
        // Back substitution with the transposed unit lower triangle.
        for k in (0..m).rev() {
            for j in (k + 1)..m {
                b[k] -= self.factors[self.permutation[j] * m + k] * b[j];
            }
        }

        // Undo the row permutation: it acts on the result of the transposed system.
        let mut unpermuted = vec![0.0; m];
        for k in 0..m {
            unpermuted[self.permutation[k]] = b[k];
        }
        b.copy_from_slice(&unpermuted);
    }
}

#[cfg(test)]
mod test {
    use approx::assert_abs_diff_eq;

    use crate::algorithm::simplex::plain::lower_upper::LowerUpper;

    #[test]
    fn identity() {
        let columns: Vec<Vec<(usize, f64)>> = vec![vec![(0, 1.0)], vec![(1, 1.0)]];
        let column_refs = columns.iter().map(Vec::as_slice).collect::<Vec<_>>();
        let factorization = LowerUpper::decompose(&column_refs, 0.1).unwrap();

        let mut b = vec![3.0, -2.0];
        factorization.solve(&mut b);
        assert_abs_diff_eq!(b[0], 3.0);
        assert_abs_diff_eq!(b[1], -2.0);
    }

    #[test]
    fn small_system() {
        // B = [[2, 1], [1, 3]]
        let columns: Vec<Vec<(usize, f64)>> = vec![
            vec![(0, 2.0), (1, 1.0)],
            vec![(0, 1.0), (1, 3.0)],
        ];
        let column_refs = columns.iter().map(Vec::as_slice).collect::<Vec<_>>();
        let factorization = LowerUpper::decompose(&column_refs, 0.1).unwrap();

        // B x = [5, 10] has solution x = [1, 3].
        let mut b = vec![5.0, 10.0];
        factorization.solve(&mut b);
        assert_abs_diff_eq!(b[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(b[1], 3.0, epsilon = 1e-12);

        // B^T x = [4, 10] has solution x = [1, 3].
        let mut b = vec![4.0, 10.0];
        factorization.solve_transposed(&mut b);
        assert_abs_diff_eq!(b[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(b[1], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn requiring_pivoting() {
        // B = [[0, 1], [1, 0]] forces a row exchange.
        let columns: Vec<Vec<(usize, f64)>> = vec![vec![(1, 1.0)], vec![(0, 1.0)]];
        let column_refs = columns.iter().map(Vec::as_slice).collect::<Vec<_>>();
        let factorization = LowerUpper::decompose(&column_refs, 0.9).unwrap();

        let mut b = vec![7.0, 9.0];
        factorization.solve(&mut b);
        assert_abs_diff_eq!(b[0], 9.0);
        assert_abs_diff_eq!(b[1], 7.0);
    }

    #[test]
    fn singular() {
        let columns: Vec<Vec<(usize, f64)>> = vec![vec![(0, 1.0)], vec![(0, 2.0)]];
        let column_refs = columns.iter().map(Vec::as_slice).collect::<Vec<_>>();
        assert!(LowerUpper::decompose(&column_refs, 0.1).is_err());
    }
}
