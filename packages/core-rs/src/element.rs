use crate::dtype::DType;
use core::fmt::{Debug, Display};
use num_traits::{One, Zero};

/// Numeric element stored in a [`crate::Matrix`].
///
/// Integer arithmetic wraps on overflow. Operations without an exact integer
/// result (division by zero, transcendental functions) are evaluated in `f64`
/// and cast back with saturating semantics, so NaN becomes zero.
pub trait Element:
    Copy + PartialOrd + Debug + Display + Default + Send + Sync + Zero + One + 'static
{
    const DTYPE: DType;

    fn to_f64(self) -> f64;
    fn from_f64(value: f64) -> Self;

    /// Hash key for frequency counting. Floats fold `-0.0` onto `0.0` and
    /// every NaN payload onto one key.
    fn key_bits(self) -> u64;

    fn is_nan(self) -> bool;
    fn is_infinite(self) -> bool;

    fn add_elem(self, rhs: Self) -> Self;
    fn sub_elem(self, rhs: Self) -> Self;
    fn mul_elem(self, rhs: Self) -> Self;
    fn div_elem(self, rhs: Self) -> Self;
    fn neg_elem(self) -> Self;

    #[inline]
    fn map_f64(self, f: impl Fn(f64) -> f64) -> Self {
        Self::from_f64(f(self.to_f64()))
    }
}

const CANONICAL_NAN: u64 = 0x7ff8_0000_0000_0000;

macro_rules! impl_int_element {
    ($t:ty, $dtype:expr) => {
        impl Element for $t {
            const DTYPE: DType = $dtype;

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_f64(value: f64) -> Self {
                value as $t
            }

            #[inline]
            fn key_bits(self) -> u64 {
                self as i64 as u64
            }

            #[inline]
            fn is_nan(self) -> bool {
                false
            }

            #[inline]
            fn is_infinite(self) -> bool {
                false
            }

            #[inline]
            fn add_elem(self, rhs: Self) -> Self {
                self.wrapping_add(rhs)
            }

            #[inline]
            fn sub_elem(self, rhs: Self) -> Self {
                self.wrapping_sub(rhs)
            }

            #[inline]
            fn mul_elem(self, rhs: Self) -> Self {
                self.wrapping_mul(rhs)
            }

            #[inline]
            fn div_elem(self, rhs: Self) -> Self {
                if rhs == 0 {
                    Self::from_f64(self as f64 / 0.0)
                } else {
                    self.wrapping_div(rhs)
                }
            }

            #[inline]
            fn neg_elem(self) -> Self {
                self.wrapping_neg()
            }
        }
    };
}

macro_rules! impl_float_element {
    ($t:ty, $dtype:expr) => {
        impl Element for $t {
            const DTYPE: DType = $dtype;

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_f64(value: f64) -> Self {
                value as $t
            }

            #[inline]
            fn key_bits(self) -> u64 {
                if self.is_nan() {
                    CANONICAL_NAN
                } else if self == 0.0 {
                    0
                } else {
                    (self as f64).to_bits()
                }
            }

            #[inline]
            fn is_nan(self) -> bool {
                <$t>::is_nan(self)
            }

            #[inline]
            fn is_infinite(self) -> bool {
                <$t>::is_infinite(self)
            }

            #[inline]
            fn add_elem(self, rhs: Self) -> Self {
                self + rhs
            }

            #[inline]
            fn sub_elem(self, rhs: Self) -> Self {
                self - rhs
            }

            #[inline]
            fn mul_elem(self, rhs: Self) -> Self {
                self * rhs
            }

            #[inline]
            fn div_elem(self, rhs: Self) -> Self {
                self / rhs
            }

            #[inline]
            fn neg_elem(self) -> Self {
                -self
            }
        }
    };
}

impl_int_element!(i32, DType::Int32);
impl_int_element!(i64, DType::Int64);
impl_float_element!(f32, DType::Float32);
impl_float_element!(f64, DType::Float64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_arithmetic_wraps() {
        assert_eq!(i32::MAX.add_elem(1), i32::MIN);
        assert_eq!(i64::MIN.neg_elem(), i64::MIN);
        assert_eq!(i32::MIN.div_elem(-1), i32::MIN);
    }

    #[test]
    fn integer_division_by_zero_saturates() {
        assert_eq!(7i32.div_elem(0), i32::MAX);
        assert_eq!((-7i64).div_elem(0), i64::MIN);
        assert_eq!(0i32.div_elem(0), 0);
    }

    #[test]
    fn float_keys_fold_signed_zero_and_nan() {
        assert_eq!((-0.0f64).key_bits(), 0.0f64.key_bits());
        assert_eq!(f32::NAN.key_bits(), (-f32::NAN).key_bits());
        assert_ne!(1.0f64.key_bits(), 2.0f64.key_bits());
    }

    #[test]
    fn transcendental_on_integers_goes_through_f64() {
        assert_eq!(9i32.map_f64(f64::sqrt), 3);
        assert_eq!(2i64.map_f64(|v| v.powf(0.5)), 1);
    }

    #[test]
    fn dtype_matches_width() {
        assert_eq!(<f32 as Element>::DTYPE.size_of(), core::mem::size_of::<f32>());
        assert_eq!(<i64 as Element>::DTYPE.size_of(), core::mem::size_of::<i64>());
    }
}
