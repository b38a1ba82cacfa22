/// Shorthand for creating a rational number in tests.
#[macro_export]
macro_rules! RAT {
    ($value:expr) => {
        $crate::data::number_types::rational::Rational::from($value as i64)
    };
    ($numer:expr, $denom:expr) => {
        $crate::data::number_types::rational::Rational::new($numer, $denom)
    };
}
