use num::Zero;

use crate::data::linear_algebra::vector::{DenseVector, SparseVector, Vector};
use crate::data::linear_program::elements::{Objective, RangeType};
use crate::data::linear_program::general_form::{RationalLp, RealLp};
use crate::data::number_types::rational::Rational;
use crate::RAT;

fn small_program() -> RationalLp {
    // min x + 2y
    // s.t. 1 <= x + y <= 4
    //           2x    <= 6
    //      0 <= x, 0 <= y <= 3
    RationalLp::new(
        Objective::Minimize,
        vec![RAT!(1), RAT!(2)],
        vec![RAT!(0), RAT!(0)],
        vec![Rational::PlusInfinity, RAT!(3)],
        vec![
            vec![(0, RAT!(1)), (1, RAT!(2))],
            vec![(0, RAT!(1))],
        ],
        vec![RAT!(1), Rational::MinusInfinity],
        vec![RAT!(4), RAT!(6)],
    )
}

#[test]
fn dimensions_and_access() {
    let lp = small_program();

    assert_eq!(lp.nr_rows(), 2);
    assert_eq!(lp.nr_columns(), 2);
    assert_eq!(lp.cost(1), &RAT!(2));
    assert_eq!(lp.row(0), &[(0, RAT!(1)), (1, RAT!(1))]);
    assert_eq!(lp.column(0), &[(0, RAT!(1)), (1, RAT!(2))]);
    assert_eq!(lp.column_range(0), RangeType::LowerOnly);
    assert_eq!(lp.column_range(1), RangeType::Boxed);
    assert_eq!(lp.row_range(1), RangeType::UpperOnly);
}

#[test]
fn maximization_is_normalized() {
    let lp = RationalLp::new(
        Objective::Maximize,
        vec![RAT!(3)],
        vec![RAT!(0)],
        vec![RAT!(1)],
        vec![vec![]],
        vec![],
        vec![],
    );

    assert_eq!(lp.objective(), Objective::Maximize);
    assert_eq!(lp.cost(0), &RAT!(-3));
}

#[test]
fn primal_activity() {
    let lp = small_program();
    let primal = DenseVector::new(vec![RAT!(1), RAT!(2)], 2);

    let activity = lp.compute_primal_activity(&primal);
    assert_eq!(activity, DenseVector::new(vec![RAT!(3), RAT!(2)], 2));

    let mut updated = activity;
    let diff = SparseVector::new(vec![(0, RAT!(1, 2))], 2);
    lp.add_primal_activity(&diff, &mut updated);
    assert_eq!(updated, DenseVector::new(vec![RAT!(7, 2), RAT!(3)], 2));
}

#[test]
fn dual_activity() {
    let lp = small_program();
    let dual = DenseVector::new(vec![RAT!(1), RAT!(-1, 2)], 2);

    let mut red_cost = lp.cost_vector().clone();
    lp.sub_dual_activity(&dual, &mut red_cost);
    // x: 1 - (1 * 1 + 2 * -1/2) = 1, y: 2 - 1 = 1.
    assert_eq!(red_cost, DenseVector::new(vec![RAT!(1), RAT!(1)], 2));

    let diff = SparseVector::new(vec![(1, RAT!(1, 2))], 2);
    lp.add_dual_activity(&diff, &mut red_cost);
    assert_eq!(red_cost, DenseVector::new(vec![RAT!(2), RAT!(1)], 2));
}

#[test]
fn grow_and_truncate() {
    let mut lp = small_program();
    let original = lp.clone();

    lp.add_column(RAT!(-1), RAT!(0), vec![(1, RAT!(1))], RAT!(1));
    lp.add_row(RAT!(0), vec![(0, RAT!(1)), (2, RAT!(-1))], RAT!(0));
    assert_eq!(lp.nr_rows(), 3);
    assert_eq!(lp.nr_columns(), 3);
    assert_eq!(lp.row(2), &[(0, RAT!(1)), (2, RAT!(-1))]);

    lp.truncate_rows(2);
    lp.truncate_columns(2);
    assert_eq!(lp, original);
}

#[test]
fn change_element() {
    let mut lp = small_program();

    lp.change_element(1, 1, RAT!(5));
    assert_eq!(lp.row(1), &[(0, RAT!(2)), (1, RAT!(5))]);
    assert_eq!(lp.column(1), &[(0, RAT!(1)), (1, RAT!(5))]);

    lp.change_element(1, 0, Rational::zero());
    assert_eq!(lp.row(1), &[(1, RAT!(5))]);
    assert_eq!(lp.column(0), &[(0, RAT!(1))]);
}

#[test]
fn infinity_threshold() {
    let mut lp = small_program();
    lp.change_upper(1, Rational::ten_pow(101));
    lp.apply_infinity_threshold(&Rational::ten_pow(100));

    assert_eq!(lp.upper(1), &Rational::PlusInfinity);
    assert_eq!(lp.row_range(1), RangeType::UpperOnly);
}

#[test]
fn real_image() {
    let lp = small_program();
    let real = RealLp::from_rational(&lp);

    assert_eq!(real.nr_rows(), 2);
    assert_eq!(real.cost(1), &2.0);
    assert_eq!(real.upper(0), &f64::INFINITY);
    assert_eq!(real.column(0), &[(0, 1.0), (1, 2.0)]);
}
