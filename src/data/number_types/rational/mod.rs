//! # An arbitrary precision rational type with infinity sentinels
//!
//! Wrapping the `num::BigRational` type, following the newtype pattern. Besides finite values,
//! the type carries a distinguished `+inf` and `-inf`. Bounds and constraint sides of a linear
//! program are represented with these sentinels rather than with a separate "is present" flag,
//! which keeps comparisons against absent bounds branch-free.
//!
//! Arithmetic between a finite value and a sentinel yields the absorbing sentinel. Indeterminate
//! forms (`inf - inf`, `0 * inf`, `inf / inf`) are logic errors and panic, just like inverting
//! zero does.
use std::cmp::Ordering;
use std::fmt;

use num::{BigInt, BigRational, One, Signed, ToPrimitive, Zero};

mod macros;

/// An arbitrary precision rational number, extended with `-inf` and `+inf`.
///
/// The variant order makes the derived comparison total: `-inf` is smaller than every finite
/// value, `+inf` larger.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub enum Rational {
    /// Smaller than every finite value and `PlusInfinity`.
    MinusInfinity,
    /// A finite value.
    Finite(BigRational),
    /// Larger than every finite value and `MinusInfinity`.
    PlusInfinity,
}

impl Rational {
    /// Create a finite value from a numerator and denominator.
    ///
    /// # Arguments
    ///
    /// * `numer`: Numerator.
    /// * `denom`: Denominator, nonzero.
    #[must_use]
    pub fn new(numer: i64, denom: i64) -> Self {
        Self::Finite(BigRational::new(numer.into(), denom.into()))
    }

    /// The value `10^exp`, exactly.
    #[must_use]
    pub fn ten_pow(exp: i32) -> Self {
        let power = num::pow(BigInt::from(10), exp.unsigned_abs() as usize);
        if exp >= 0 {
            Self::Finite(BigRational::from_integer(power))
        } else {
            Self::Finite(BigRational::new(BigInt::one(), power))
        }
    }

    /// Convert a float into an exact rational.
    ///
    /// Finite floats convert without rounding; the float infinities map onto the sentinels.
    ///
    /// # Return value
    ///
    /// `None` if the value is NaN.
    #[must_use]
    pub fn from_f64(value: f64) -> Option<Self> {
        if value.is_nan() {
            None
        } else if value == f64::INFINITY {
            Some(Self::PlusInfinity)
        } else if value == f64::NEG_INFINITY {
            Some(Self::MinusInfinity)
        } else {
            BigRational::from_float(value).map(Self::Finite)
        }
    }

    /// The closest `f64`, with sentinels becoming the float infinities.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        match self {
            Self::MinusInfinity => f64::NEG_INFINITY,
            Self::PlusInfinity => f64::INFINITY,
            Self::Finite(value) => value.to_f64().unwrap_or_else(|| {
                if value.is_negative() { f64::NEG_INFINITY } else { f64::INFINITY }
            }),
        }
    }

    /// Whether this value is neither of the sentinels.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        matches!(self, Self::Finite(_))
    }

    /// Replace the value by its multiplicative inverse.
    ///
    /// Panics when called on zero. The inverse of either sentinel is zero.
    pub fn invert(&mut self) {
        *self = match &*self {
            Self::MinusInfinity | Self::PlusInfinity => Self::zero(),
            Self::Finite(value) => {
                assert!(!value.is_zero(), "attempt to invert zero");
                Self::Finite(value.recip())
            },
        };
    }

    /// The absolute value.
    #[must_use]
    pub fn abs(&self) -> Self {
        match self {
            Self::MinusInfinity | Self::PlusInfinity => Self::PlusInfinity,
            Self::Finite(value) => Self::Finite(value.abs()),
        }
    }

    /// Fused `self += a * b`, avoiding a temporary for the common all-finite case.
    pub fn add_product(&mut self, a: &Self, b: &Self) {
        match (&mut *self, a, b) {
            (Self::Finite(accumulator), Self::Finite(a), Self::Finite(b)) => {
                *accumulator += a * b;
            },
            _ => *self += a.mul_ref(b),
        }
    }

    /// Fused `self -= a * b`.
    pub fn sub_product(&mut self, a: &Self, b: &Self) {
        match (&mut *self, a, b) {
            (Self::Finite(accumulator), Self::Finite(a), Self::Finite(b)) => {
                *accumulator -= a * b;
            },
            _ => *self -= a.mul_ref(b),
        }
    }

    fn sign(&self) -> Ordering {
        match self {
            Self::MinusInfinity => Ordering::Less,
            Self::PlusInfinity => Ordering::Greater,
            Self::Finite(value) => value.cmp(&BigRational::zero()),
        }
    }

    fn add_ref(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Finite(a), Self::Finite(b)) => Self::Finite(a + b),
            (Self::PlusInfinity, Self::MinusInfinity) | (Self::MinusInfinity, Self::PlusInfinity) => {
                panic!("indeterminate sum of opposite infinities")
            },
            (Self::PlusInfinity, _) | (_, Self::PlusInfinity) => Self::PlusInfinity,
            (Self::MinusInfinity, _) | (_, Self::MinusInfinity) => Self::MinusInfinity,
        }
    }

    fn sub_ref(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Finite(a), Self::Finite(b)) => Self::Finite(a - b),
            (Self::PlusInfinity, Self::PlusInfinity) | (Self::MinusInfinity, Self::MinusInfinity) => {
                panic!("indeterminate difference of equal infinities")
            },
            (Self::PlusInfinity, _) | (_, Self::MinusInfinity) => Self::PlusInfinity,
            (Self::MinusInfinity, _) | (_, Self::PlusInfinity) => Self::MinusInfinity,
        }
    }

    fn mul_ref(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Finite(a), Self::Finite(b)) => Self::Finite(a * b),
            _ => {
                let sign = match (self.sign(), other.sign()) {
                    (Ordering::Equal, _) | (_, Ordering::Equal) => {
                        panic!("indeterminate product of zero and infinity")
                    },
                    (a, b) if a == b => Ordering::Greater,
                    _ => Ordering::Less,
                };
                match sign {
                    Ordering::Greater => Self::PlusInfinity,
                    _ => Self::MinusInfinity,
                }
            },
        }
    }

    fn div_ref(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Finite(a), Self::Finite(b)) => {
                assert!(!b.is_zero(), "attempt to divide by zero");
                Self::Finite(a / b)
            },
            (Self::Finite(_), _) => Self::zero(),
            (_, Self::Finite(b)) => {
                assert!(!b.is_zero(), "attempt to divide infinity by zero");
                if (self.sign() == Ordering::Greater) == b.is_positive() {
                    Self::PlusInfinity
                } else {
                    Self::MinusInfinity
                }
            },
            _ => panic!("indeterminate quotient of infinities"),
        }
    }

    fn neg_ref(&self) -> Self {
        match self {
            Self::MinusInfinity => Self::PlusInfinity,
            Self::PlusInfinity => Self::MinusInfinity,
            Self::Finite(value) => Self::Finite(-value),
        }
    }
}

impl From<i64> for Rational {
    fn from(value: i64) -> Self {
        Self::Finite(BigRational::from_integer(value.into()))
    }
}

impl From<i32> for Rational {
    fn from(value: i32) -> Self {
        Self::Finite(BigRational::from_integer(value.into()))
    }
}

impl Zero for Rational {
    fn zero() -> Self {
        Self::Finite(BigRational::zero())
    }

    fn is_zero(&self) -> bool {
        matches!(self, Self::Finite(value) if value.is_zero())
    }
}

impl One for Rational {
    fn one() -> Self {
        Self::Finite(BigRational::one())
    }
}

macro_rules! forward_binop {
    ($op_trait:ident, $op_method:ident, $inner:ident) => {
        impl std::ops::$op_trait<Rational> for Rational {
            type Output = Rational;

            fn $op_method(self, rhs: Rational) -> Self::Output {
                self.$inner(&rhs)
            }
        }

        impl std::ops::$op_trait<&Rational> for Rational {
            type Output = Rational;

            fn $op_method(self, rhs: &Rational) -> Self::Output {
                self.$inner(rhs)
            }
        }

        impl std::ops::$op_trait<&Rational> for &Rational {
            type Output = Rational;

            fn $op_method(self, rhs: &Rational) -> Self::Output {
                self.$inner(rhs)
            }
        }

        impl std::ops::$op_trait<Rational> for &Rational {
            type Output = Rational;

            fn $op_method(self, rhs: Rational) -> Self::Output {
                self.$inner(&rhs)
            }
        }
    };
}

macro_rules! forward_assign {
    ($op_trait:ident, $op_method:ident, $inner:ident) => {
        impl std::ops::$op_trait<Rational> for Rational {
            fn $op_method(&mut self, rhs: Rational) {
                *self = self.$inner(&rhs);
            }
        }

        impl std::ops::$op_trait<&Rational> for Rational {
            fn $op_method(&mut self, rhs: &Rational) {
                *self = self.$inner(rhs);
            }
        }
    };
}

forward_binop!(Add, add, add_ref);
forward_binop!(Sub, sub, sub_ref);
forward_binop!(Mul, mul, mul_ref);
forward_binop!(Div, div, div_ref);
forward_assign!(AddAssign, add_assign, add_ref);
forward_assign!(SubAssign, sub_assign, sub_ref);
forward_assign!(MulAssign, mul_assign, mul_ref);
forward_assign!(DivAssign, div_assign, div_ref);

impl std::ops::Neg for Rational {
    type Output = Rational;

    fn neg(self) -> Self::Output {
        self.neg_ref()
    }
}

impl std::ops::Neg for &Rational {
    type Output = Rational;

    fn neg(self) -> Self::Output {
        self.neg_ref()
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::MinusInfinity => write!(f, "-inf"),
            Self::PlusInfinity => write!(f, "inf"),
            Self::Finite(value) => write!(f, "{}", value),
        }
    }
}

#[cfg(test)]
mod test {
    use num::Zero;

    use crate::data::number_types::rational::Rational;
    use crate::RAT;

    #[test]
    fn field_identities() {
        for i in 1..10 {
            assert_eq!(RAT!(0, i), Rational::zero());
            assert_eq!(RAT!(i, i), RAT!(1));
        }
    }

    #[test]
    #[should_panic]
    fn panic_divide_by_zero() {
        let _result = RAT!(3, 2) / RAT!(0);
    }

    #[test]
    #[should_panic]
    fn panic_invert_zero() {
        let mut value = RAT!(0);
        value.invert();
    }

    #[test]
    fn arithmetic() {
        assert_eq!(RAT!(3, 2) + RAT!(6, 4), RAT!(3));
        assert_eq!(RAT!(3, 2) - RAT!(6, 4), RAT!(0));
        assert_eq!(RAT!(3, 2) * RAT!(6, 4), RAT!(9, 4));
        assert_eq!(RAT!(3, 2) / RAT!(6, 4), RAT!(1));
        assert_eq!(-RAT!(3, 2), RAT!(-3, 2));
    }

    #[test]
    fn fused_updates() {
        let mut value = RAT!(1);
        value.add_product(&RAT!(2), &RAT!(3, 2));
        assert_eq!(value, RAT!(4));
        value.sub_product(&RAT!(2), &RAT!(2));
        assert_eq!(value, RAT!(0));
    }

    #[test]
    fn sentinel_ordering() {
        assert!(Rational::MinusInfinity < RAT!(-1_000_000));
        assert!(RAT!(1_000_000) < Rational::PlusInfinity);
        assert!(Rational::MinusInfinity < Rational::PlusInfinity);
    }

    #[test]
    fn sentinel_arithmetic() {
        assert_eq!(Rational::PlusInfinity + RAT!(1), Rational::PlusInfinity);
        assert_eq!(Rational::MinusInfinity * RAT!(-2), Rational::PlusInfinity);
        assert_eq!(RAT!(1) / Rational::PlusInfinity, RAT!(0));
        assert_eq!((-&Rational::PlusInfinity), Rational::MinusInfinity);
    }

    #[test]
    fn ten_pow() {
        assert_eq!(Rational::ten_pow(3), RAT!(1000));
        assert_eq!(Rational::ten_pow(-3), RAT!(1, 1000));
        assert_eq!(Rational::ten_pow(0), RAT!(1));
    }

    #[test]
    fn float_round_trip() {
        assert_eq!(Rational::from_f64(0.5), Some(RAT!(1, 2)));
        assert_eq!(Rational::from_f64(f64::INFINITY), Some(Rational::PlusInfinity));
        assert_eq!(Rational::from_f64(f64::NAN), None);
        assert_eq!(RAT!(1, 2).to_f64(), 0.5);
        assert_eq!(Rational::MinusInfinity.to_f64(), f64::NEG_INFINITY);
    }
}
