//! # Exact verification of approximate Farkas proofs
//!
//! For constraints `lhs <= Ax <= rhs`, a Farkas proof `y` satisfies `y^T A = 0` and
//! `y_+^T lhs - y_-^T rhs > 0`. An approximate ray usually misses `y^T A = 0`, but the proof
//! remains valid as long as `y^T A x` stays below `y_+^T lhs - y_-^T rhs` for every `x` the
//! bounds admit. Both sides of that condition are computed exactly here. When the variable
//! bounds are too wide to settle it outright, a box radius `B` is derived instead: no feasible
//! point has a component of magnitude below `B`, which still localizes the infeasibility. The
//! radius is grown by absorbing variable bounds that already lie inside the current box, in the
//! spirit of Neumaier and Shcherbina's certified infeasibility bounds.
use num::Zero;

use crate::data::linear_algebra::vector::DenseVector;
use crate::data::linear_program::general_form::RationalLp;
use crate::data::number_types::rational::Rational;

/// Outcome of verifying an approximate Farkas proof in exact arithmetic.
#[derive(Debug, Clone, PartialEq)]
pub enum FarkasBox {
    /// The proof is valid as it stands: the problem is infeasible.
    ProvedExactly,
    /// All feasible points, if any, have a component of at least this magnitude.
    Box(Rational),
    /// The proof admits the origin and rules out nothing.
    TooWeak,
}

/// Verify an approximate Farkas ray against exact problem data.
///
/// # Arguments
///
/// * `lp`: Supplies the row vectors; its coefficients must be those the ray refers to.
/// * `y`: The approximate Farkas ray, one multiplier per row.
/// * `lower`, `upper`, `lhs`, `rhs`: The exact bounds and sides to verify against. Passed
/// separately from `lp` so that a caller holding a transformed problem can verify against the
/// original data.
/// * `nr_columns`: Columns beyond this index are ignored (artificial columns of a transformed
/// problem).
pub fn compute_infeas_box(
    lp: &RationalLp,
    y: &DenseVector<Rational>,
    lower: &DenseVector<Rational>,
    upper: &DenseVector<Rational>,
    lhs: &DenseVector<Rational>,
    rhs: &DenseVector<Rational>,
    nr_columns: usize,
) -> FarkasBox {
    let nr_rows = lp.nr_rows();

    // Aggregate the rows and sides with the multipliers of the ray, exactly.
    let mut ytrans_a = vec![Rational::zero(); nr_columns];
    let mut ytrans_b = Rational::zero();
    for r in 0..nr_rows {
        let multiplier = &y[r];
        if multiplier.is_zero() {
            continue;
        }
        for (j, coefficient) in lp.row(r) {
            if *j < nr_columns {
                ytrans_a[*j].add_product(coefficient, multiplier);
            }
        }
        let side = if multiplier > &Rational::zero() { &lhs[r] } else { &rhs[r] };
        if !side.is_finite() {
            log::info!("Farkas multiplier on a missing side.  Could not verify proof.");
            return FarkasBox::TooWeak;
        }
        ytrans_b.add_product(multiplier, side);
    }

    log::debug!("ytransb = {}", ytrans_b);

    // Aggregate the bounds against y^T A; if even the most favorable feasible point stays below
    // ytransb, the proof is already exact.
    let mut bound_activity = Rational::zero();
    let mut activity_finite = true;
    for (c, minus_red_cost) in ytrans_a.iter().enumerate() {
        if minus_red_cost > &Rational::zero() {
            if upper[c] < Rational::PlusInfinity {
                bound_activity.add_product(minus_red_cost, &upper[c]);
            } else {
                activity_finite = false;
                break;
            }
        } else if minus_red_cost < &Rational::zero() {
            if lower[c] > Rational::MinusInfinity {
                bound_activity.add_product(minus_red_cost, &lower[c]);
            } else {
                activity_finite = false;
                break;
            }
        }
    }

    if activity_finite && bound_activity < ytrans_b {
        log::info!("Farkas infeasibility proof verified exactly.");
        return FarkasBox::ProvedExactly;
    }

    // A negative ytransb admits the origin. Try to repair it with a single bound that pushes
    // the aggregated side to zero.
    if ytrans_b < Rational::zero() {
        for c in 0..nr_columns {
            if lower[c] > Rational::zero() {
                let mut correction = ytrans_b.clone();
                correction /= &lower[c];
                ytrans_a[c] -= &correction;
                ytrans_b = Rational::zero();
                break;
            } else if upper[c] < Rational::zero() {
                let mut correction = ytrans_b.clone();
                correction /= &upper[c];
                ytrans_a[c] -= &correction;
                ytrans_b = Rational::zero();
                break;
            }
        }
    }

    if ytrans_b < Rational::zero() {
        log::info!("Approximate Farkas proof too weak.  Could not compute Farkas box.");
        return FarkasBox::TooWeak;
    }

    let mut entries = ytrans_a.into_iter()
        .enumerate()
        .filter(|(_, value)| !value.is_zero())
        .collect::<Vec<_>>();

    // One-norm of y^T A; a zero aggregate with a positive side would have been caught above.
    let mut one_norm = Rational::zero();
    for (_, value) in &entries {
        one_norm += value.abs();
    }
    if one_norm.is_zero() {
        log::info!("Approximate Farkas proof too weak.  Could not compute Farkas box.");
        return FarkasBox::TooWeak;
    }

    let mut radius = ytrans_b.clone();
    radius /= &one_norm;

    log::debug!("Initial Farkas box radius = {}", radius);

    // Absorb finite bounds lying inside the current box; each absorption shrinks the one-norm
    // or grows the aggregated side, so the radius only grows. Keep sweeping until a full pass
    // absorbs nothing.
    let mut absorbed_any = false;
    let mut position = 0;
    loop {
        if position >= entries.len() {
            if !absorbed_any {
                break;
            }
            absorbed_any = false;
            position = 0;
            continue;
        }

        let (column, value) = entries[position].clone();
        if value < Rational::zero() && lower[column] > -&radius && lower[column] > Rational::MinusInfinity {
            entries.remove(position);
            ytrans_b.sub_product(&value, &lower[column]);
            one_norm += &value;
        } else if value > Rational::zero() && upper[column] < radius && upper[column] < Rational::PlusInfinity {
            entries.remove(position);
            ytrans_b.sub_product(&value, &upper[column]);
            one_norm -= &value;
        } else {
            position += 1;
            continue;
        }

        debug_assert!(ytrans_b >= Rational::zero());
        debug_assert!(one_norm >= Rational::zero());

        if one_norm.is_zero() && ytrans_b.is_zero() {
            log::info!("Approximate Farkas proof too weak.  Could not compute Farkas box.");
            return FarkasBox::TooWeak;
        } else if one_norm.is_zero() {
            debug_assert!(ytrans_b > Rational::zero());
            log::info!("Farkas infeasibility proof verified exactly.");
            return FarkasBox::ProvedExactly;
        }

        radius = ytrans_b.clone();
        radius /= &one_norm;
        log::debug!("Farkas box radius = {}", radius);
        absorbed_any = true;
    }

    if radius > Rational::zero() {
        log::info!(
            "Computed Farkas box: provably no feasible solutions with components less than {} \
             in absolute value.",
            radius,
        );
    }

    FarkasBox::Box(radius)
}

#[cfg(test)]
mod test {
    use crate::algorithm::refinement::farkas::{FarkasBox, compute_infeas_box};
    use crate::data::linear_algebra::vector::{DenseVector, Vector};
    use crate::data::linear_program::elements::Objective;
    use crate::data::linear_program::general_form::RationalLp;
    use crate::data::number_types::rational::Rational;
    use crate::RAT;

    /// x >= 1 and -x >= 0 cannot hold together; y = (1, 1) aggregates to 0^T x >= 1.
    #[test]
    fn proof_verified_exactly() {
        let lp = RationalLp::new(
            Objective::Minimize,
            vec![RAT!(0)],
            vec![Rational::MinusInfinity],
            vec![Rational::PlusInfinity],
            vec![vec![(0, RAT!(1)), (1, RAT!(-1))]],
            vec![RAT!(1), RAT!(0)],
            vec![Rational::PlusInfinity, Rational::PlusInfinity],
        );
        let y = DenseVector::new(vec![RAT!(1), RAT!(1)], 2);

        let result = compute_infeas_box(
            &lp,
            &y,
            lp.lower_vector(),
            lp.upper_vector(),
            lp.lhs_vector(),
            lp.rhs_vector(),
            1,
        );
        assert_eq!(result, FarkasBox::ProvedExactly);
    }

    /// x >= 1 with x free: an inexact ray y = 1 yields y^T A = 1 and a box of radius 1.
    #[test]
    fn box_radius() {
        let lp = RationalLp::new(
            Objective::Minimize,
            vec![RAT!(0)],
            vec![Rational::MinusInfinity],
            vec![Rational::PlusInfinity],
            vec![vec![(0, RAT!(1))]],
            vec![RAT!(1)],
            vec![Rational::PlusInfinity],
        );
        let y = DenseVector::new(vec![RAT!(1)], 1);

        let result = compute_infeas_box(
            &lp,
            &y,
            lp.lower_vector(),
            lp.upper_vector(),
            lp.lhs_vector(),
            lp.rhs_vector(),
            1,
        );
        assert_eq!(result, FarkasBox::Box(RAT!(1)));
    }

    /// With x <= 0 as a bound, the same ray becomes an exact proof after absorbing the bound.
    #[test]
    fn proof_after_absorbing_bound() {
        let lp = RationalLp::new(
            Objective::Minimize,
            vec![RAT!(0)],
            vec![Rational::MinusInfinity],
            vec![RAT!(0)],
            vec![vec![(0, RAT!(1))]],
            vec![RAT!(1)],
            vec![Rational::PlusInfinity],
        );
        let y = DenseVector::new(vec![RAT!(1)], 1);

        let result = compute_infeas_box(
            &lp,
            &y,
            lp.lower_vector(),
            lp.upper_vector(),
            lp.lhs_vector(),
            lp.rhs_vector(),
            1,
        );
        assert_eq!(result, FarkasBox::ProvedExactly);
    }
}
