use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    ops::{Add, Mul, Neg, Sub},
    str::FromStr,
};

use num_bigint::{BigInt, Sign};
use num_traits::ToPrimitive;

use crate::{IntError, IntRef, TaggedInt};

/// A normalized integer: every value that fits an `i32` is small, every
/// other value is a boxed [`BigInt`].
#[derive(Clone)]
pub struct Int(TaggedInt);

impl Int {
    pub fn from_bigint(big: BigInt) -> Self {
        match big.to_i32() {
            Some(x) => Self(TaggedInt::make_small(x)),
            None => Self(TaggedInt::from_box_unchecked(Box::new(big))),
        }
    }

    #[inline]
    pub fn get(&self) -> (i64, Option<&BigInt>) {
        self.0.get()
    }

    #[inline]
    pub fn as_int_ref(&self) -> IntRef<'_, BigInt> {
        self.0.as_int_ref()
    }

    pub fn as_tagged(&self) -> &TaggedInt {
        &self.0
    }

    pub fn into_tagged(self) -> TaggedInt {
        self.0
    }

    #[inline]
    pub fn to_i32(&self) -> Option<i32> {
        match self.as_int_ref() {
            IntRef::Small(x) => Some(x),
            IntRef::Big(_) => None,
        }
    }

    pub fn to_i64(&self) -> Option<i64> {
        match self.as_int_ref() {
            IntRef::Small(x) => Some(x.into()),
            IntRef::Big(big) => big.to_i64(),
        }
    }

    pub fn to_u64(&self) -> Option<u64> {
        match self.as_int_ref() {
            IntRef::Small(x) => u64::try_from(x).ok(),
            IntRef::Big(big) => big.to_u64(),
        }
    }

    /// Expensive for small values, which have no payload to borrow.
    pub fn to_bigint(&self) -> BigInt {
        match self.as_int_ref() {
            IntRef::Small(x) => BigInt::from(x),
            IntRef::Big(big) => big.clone(),
        }
    }

    pub fn sign(&self) -> Sign {
        match self.as_int_ref() {
            IntRef::Small(x) => match x.cmp(&0) {
                Ordering::Less => Sign::Minus,
                Ordering::Equal => Sign::NoSign,
                Ordering::Greater => Sign::Plus,
            },
            IntRef::Big(big) => big.sign(),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.to_i32() == Some(0)
    }

    fn binary_op(
        &self,
        rhs: &Int,
        small: fn(i64, i64) -> i64,
        big: fn(BigInt, BigInt) -> BigInt,
    ) -> Int {
        match (self.to_i32(), rhs.to_i32()) {
            // i32 operands cannot overflow i64 under add, sub or mul
            (Some(a), Some(b)) => Int::from(small(a.into(), b.into())),
            _ => Int::from_bigint(big(self.to_bigint(), rhs.to_bigint())),
        }
    }
}

impl Default for Int {
    fn default() -> Self {
        Int::from(0)
    }
}

impl From<i32> for Int {
    fn from(value: i32) -> Self {
        Self(TaggedInt::make_small(value))
    }
}

impl From<i64> for Int {
    fn from(value: i64) -> Self {
        match i32::try_from(value) {
            Ok(x) => Int::from(x),
            Err(_) => Self(TaggedInt::from_box_unchecked(Box::new(value.into()))),
        }
    }
}

impl From<u64> for Int {
    fn from(value: u64) -> Self {
        match i32::try_from(value) {
            Ok(x) => Int::from(x),
            Err(_) => Self(TaggedInt::from_box_unchecked(Box::new(value.into()))),
        }
    }
}

impl From<BigInt> for Int {
    fn from(value: BigInt) -> Self {
        Int::from_bigint(value)
    }
}

/// Decimal with an optional sign, or `0x`, `0o` and `0b` prefixed after
/// the sign.
impl FromStr for Int {
    type Err = IntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || IntError::Parse(s.to_string());
        let (negative, rest) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };
        let (radix, digits) = match rest.get(..2) {
            Some("0x" | "0X") => (16, &rest[2..]),
            Some("0o" | "0O") => (8, &rest[2..]),
            Some("0b" | "0B") => (2, &rest[2..]),
            _ => (10, rest),
        };
        // BigInt accepts its own sign and digit separators, we do not
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(err());
        }
        let magnitude = BigInt::parse_bytes(digits.as_bytes(), radix)
            .ok_or_else(err)?;
        Ok(Int::from_bigint(if negative { -magnitude } else { magnitude }))
    }
}

impl fmt::Display for Int {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_int_ref() {
            IntRef::Small(x) => fmt::Display::fmt(&x, f),
            IntRef::Big(big) => fmt::Display::fmt(big, f),
        }
    }
}

impl fmt::Debug for Int {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Int({self})")
    }
}

impl PartialEq for Int {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Int {}

impl PartialOrd for Int {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// normalization puts every big value strictly outside the small range,
// so a mixed comparison only depends on the sign of the big side
impl Ord for Int {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.as_int_ref(), other.as_int_ref()) {
            (IntRef::Small(a), IntRef::Small(b)) => a.cmp(&b),
            (IntRef::Big(a), IntRef::Big(b)) => a.cmp(b),
            (IntRef::Small(_), IntRef::Big(b)) => match b.sign() {
                Sign::Minus => Ordering::Greater,
                _ => Ordering::Less,
            },
            (IntRef::Big(a), IntRef::Small(_)) => match a.sign() {
                Sign::Minus => Ordering::Less,
                _ => Ordering::Greater,
            },
        }
    }
}

impl Hash for Int {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.as_int_ref() {
            IntRef::Small(x) => x.hash(state),
            IntRef::Big(big) => big.hash(state),
        }
    }
}

macro_rules! int_binary_op {
    ($trait:ident, $method:ident, $small:expr, $big:expr) => {
        impl $trait<&Int> for &Int {
            type Output = Int;

            fn $method(self, rhs: &Int) -> Int {
                self.binary_op(rhs, $small, $big)
            }
        }

        impl $trait for Int {
            type Output = Int;

            fn $method(self, rhs: Int) -> Int {
                (&self).$method(&rhs)
            }
        }
    };
}

int_binary_op!(Add, add, |a, b| a + b, |a, b| a + b);
int_binary_op!(Sub, sub, |a, b| a - b, |a, b| a - b);
int_binary_op!(Mul, mul, |a, b| a * b, |a, b| a * b);

impl Neg for &Int {
    type Output = Int;

    fn neg(self) -> Int {
        match self.as_int_ref() {
            IntRef::Small(x) => Int::from(-i64::from(x)),
            IntRef::Big(big) => Int::from_bigint(-big),
        }
    }
}

impl Neg for Int {
    type Output = Int;

    fn neg(self) -> Int {
        -&self
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashSet,
        hash::{BuildHasher, RandomState},
    };

    use super::*;

    fn int(s: &str) -> Int {
        s.parse().unwrap_or_else(|e| panic!("{s:?}: {e}"))
    }

    #[test]
    fn constructors_normalize_to_small() {
        assert_eq!(Int::from(5i64).get(), (5, None));
        assert_eq!(
            Int::from(u64::from(u32::MAX >> 1)).get(),
            (i64::from(i32::MAX), None)
        );
        assert_eq!(Int::from(BigInt::from(-9)).get(), (-9, None));
        assert_eq!(Int::default().get(), (0, None));
    }

    #[test]
    fn constructors_box_out_of_range_values() {
        let above = Int::from(i64::from(i32::MAX) + 1);
        let (_, big) = above.get();
        assert_eq!(big, Some(&BigInt::from(2_147_483_648i64)));
        assert_eq!(Int::from(u64::MAX).to_u64(), Some(u64::MAX));
        assert_eq!(Int::from(i64::MIN).to_i64(), Some(i64::MIN));
    }

    #[test]
    fn parse_accepts_signs_and_prefixes() {
        assert_eq!(int("42").to_i32(), Some(42));
        assert_eq!(int("-0x10").to_i32(), Some(-16));
        assert_eq!(int("+0b101").to_i32(), Some(5));
        assert_eq!(int("0o777").to_i32(), Some(511));
        assert_eq!(
            int("-170141183460469231731687303715884105728").to_bigint(),
            BigInt::from(i128::MIN)
        );
    }

    #[test]
    fn parse_rejects_malformed_literals() {
        for bad in ["", "-", "0x", "--1", "+-1", "1_000", "12a", " 1", "0x-f"] {
            assert_eq!(
                bad.parse::<Int>().err(),
                Some(IntError::Parse(bad.to_string())),
                "{bad:?} should not parse"
            );
        }
    }

    #[test]
    fn display_matches_decimal_value() {
        assert_eq!(int("-2147483648").to_string(), "-2147483648");
        assert_eq!(
            int("0xffffffffffffffffff").to_string(),
            "4722366482869645213695"
        );
        assert_eq!(format!("{:?}", Int::from(7)), "Int(7)");
    }

    #[test]
    fn ordering_across_representations() {
        let mut values = vec![
            int("99999999999"),
            Int::from(3),
            int("-99999999999"),
            Int::from(i32::MIN),
            Int::from(i32::MAX),
            int("-2147483649"),
        ];
        values.sort();
        let sorted: Vec<_> = values.iter().map(ToString::to_string).collect();
        assert_eq!(
            sorted,
            [
                "-99999999999",
                "-2147483649",
                "-2147483648",
                "3",
                "2147483647",
                "99999999999"
            ]
        );
    }

    #[test]
    fn equal_values_hash_alike() {
        let state = RandomState::new();
        let a = int("123456789012345");
        let b = Int::from(123_456_789_012_345i64);
        assert_eq!(a, b);
        assert_eq!(state.hash_one(&a), state.hash_one(&b));

        let set: HashSet<Int> = [Int::from(1), int("1"), Int::from(BigInt::from(1))]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn arithmetic_renormalizes_results() {
        let big = Int::from(i64::from(i32::MAX) + 10);
        let back = &big - &Int::from(20);
        assert_eq!(back.get(), (i64::from(i32::MAX) - 10, None));

        let overflow = Int::from(i32::MAX) + Int::from(1);
        assert_eq!(overflow.get().1, Some(&BigInt::from(2_147_483_648i64)));

        let product = Int::from(i32::MIN) * Int::from(i32::MIN);
        assert_eq!(product.to_i64(), Some(1 << 62));

        assert_eq!((-Int::from(i32::MIN)).to_i64(), Some(2_147_483_648));
        assert_eq!((-int("2147483648")).get(), (i64::from(i32::MIN), None));
    }

    #[test]
    fn sign_and_zero() {
        assert_eq!(Int::from(-4).sign(), Sign::Minus);
        assert_eq!(Int::from(0).sign(), Sign::NoSign);
        assert_eq!(int(&"9".repeat(40)).sign(), Sign::Plus);
        assert!(Int::default().is_zero());
        assert!(!int("-99999999999").is_zero());
    }

    #[test]
    fn into_tagged_keeps_the_payload() {
        let value = int("-99999999999");
        let payload = value.get().1.unwrap() as *const BigInt;
        let tagged = value.into_tagged();
        assert!(std::ptr::eq(tagged.get().1.unwrap(), payload));
    }
}
