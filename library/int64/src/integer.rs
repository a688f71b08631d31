use core::fmt;
use core::ops::{Add, AddAssign, Sub, SubAssign};
use core::str::FromStr;

use static_assertions::assert_eq_size;

use crate::raw;
use crate::Error;

// One word of the pair, as a double.
const WORD_BASE: f64 = 4294967296.0; // 2^32

// Exact integer range of a double; anything of greater magnitude has already
// lost low bits before reaching us.
const DOUBLE_EXACT_LIMIT: f64 = 9007199254740992.0; // 2^53

/// An exact 64-bit integer, stored as an ordered pair of 32-bit words.
///
/// The pair `(high, low)` denotes `high * 2^32 + low`. Both words always fit
/// in 32 bits; arithmetic wraps per word with an explicit carry and is modulo
/// 2^64 overall, with no overflow signaling.
///
/// Two usage disciplines share one decoding path and cannot diverge:
///
/// * treat values as immutable and use the value-returning operations
///   ([`try_add`](Int64::try_add), [`try_sub`](Int64::try_sub), the
///   `Add`/`Sub` operators), which copy before mutating; or
/// * keep a mutable accumulator and use the in-place operations
///   ([`add_in_place`](Int64::add_in_place),
///   [`sub_in_place`](Int64::sub_in_place), [`set_value`](Int64::set_value)).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Int64 {
    high: u32,
    low: u32,
}

assert_eq_size!(Int64, u64);

/// A decodable source for an [`Int64`].
///
/// The host constructor is polymorphic over its argument; this enum is that
/// argument made explicit, with a single exhaustive decode routine shared by
/// construction, reassignment, and the arithmetic operands.
#[derive(Debug, Clone, Copy)]
pub enum Source<'a> {
    /// An explicit word pair, stored directly without decoding.
    Raw { high: u32, low: u32 },
    /// A host numeric value.
    Number(f64),
    /// A `0x`-prefixed hex string of up to 16 digits.
    Hex(&'a str),
    /// The raw little-endian byte layout, up to 8 bytes.
    Bytes(&'a [u8]),
}

impl<'a> From<Int64> for Source<'a> {
    fn from(v: Int64) -> Self {
        Source::Raw {
            high: v.high,
            low: v.low,
        }
    }
}

impl<'a> From<f64> for Source<'a> {
    fn from(n: f64) -> Self {
        Source::Number(n)
    }
}

impl<'a> From<i32> for Source<'a> {
    fn from(n: i32) -> Self {
        Source::Number(n as f64)
    }
}

impl<'a> From<u32> for Source<'a> {
    fn from(n: u32) -> Self {
        Source::Number(n as f64)
    }
}

impl<'a> From<&'a str> for Source<'a> {
    fn from(s: &'a str) -> Self {
        Source::Hex(s)
    }
}

impl<'a> From<&'a [u8]> for Source<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Source::Bytes(bytes)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Source<'a> {
    fn from(bytes: &'a [u8; N]) -> Self {
        Source::Bytes(bytes.as_slice())
    }
}

/// Decode any accepted source into a `(high, low)` word pair.
///
/// This is the single decoding routine behind [`Int64::new`],
/// [`Int64::set_value`], and the polymorphic arithmetic operands.
fn decode(source: Source<'_>) -> Result<(u32, u32), Error> {
    match source {
        Source::Raw { high, low } => Ok((high, low)),
        Source::Number(n) => decode_number(n),
        Source::Hex(s) => decode_hex(s),
        Source::Bytes(bytes) => decode_bytes(bytes),
    }
}

fn fits_in_32(n: f64) -> bool {
    n >= -2147483648.0 && n < WORD_BASE
}

fn decode_number(n: f64) -> Result<(u32, u32), Error> {
    if !n.is_finite() {
        return Err(Error::UnsupportedArgument(format!("non-finite number {}", n)));
    }
    if n.abs() > DOUBLE_EXACT_LIMIT {
        return Err(Error::PrecisionLoss(n));
    }
    // Truncation toward zero, wrapped to the low 32 bits in two's complement.
    // Exact: |n| <= 2^53 fits an i64.
    let low = n.trunc() as i64 as u32;
    let high = if fits_in_32(n) {
        // Sign-extend 32-bit quantities.
        if n < 0.0 {
            u32::MAX
        } else {
            0
        }
    } else {
        ((n / WORD_BASE).floor() as i64) as u32
    };
    Ok((high, low))
}

fn decode_hex(s: &str) -> Result<(u32, u32), Error> {
    let digits = match s.strip_prefix("0x") {
        Some(digits) => digits,
        None => return Err(Error::UnsupportedArgument(s.to_string())),
    };
    if digits.len() > 16 {
        return Err(Error::HexStringTooLong(s.to_string()));
    }
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::UnsupportedArgument(s.to_string()));
    }
    let parse = |d: &str| {
        u32::from_str_radix(d, 16).map_err(|_| Error::UnsupportedArgument(s.to_string()))
    };
    if digits.len() <= 8 {
        Ok((0, parse(digits)?))
    } else {
        let (high, low) = digits.split_at(digits.len() - 8);
        Ok((parse(high)?, parse(low)?))
    }
}

fn decode_bytes(bytes: &[u8]) -> Result<(u32, u32), Error> {
    if bytes.len() > 8 {
        return Err(Error::UnsupportedArgument(format!(
            "byte sequence of {} bytes",
            bytes.len()
        )));
    }
    // Shorter sequences zero-extend toward the high bytes.
    let mut image = [0u8; 8];
    image[..bytes.len()].copy_from_slice(bytes);
    raw::words_from_view(&image)
}

impl Int64 {
    pub const ZERO: Self = Self::from_words(0, 0);
    pub const ONE: Self = Self::from_words(0, 1);

    /// Construct directly from an explicit word pair; no decoding.
    #[inline]
    pub const fn from_words(high: u32, low: u32) -> Self {
        Self { high, low }
    }

    /// Construct by decoding any accepted [`Source`]: an existing value, a
    /// host number, a `0x`-prefixed hex string of up to 16 digits, or up to
    /// 8 little-endian bytes.
    pub fn new<'a, S: Into<Source<'a>>>(source: S) -> Result<Self, Error> {
        let (high, low) = decode(source.into())?;
        Ok(Self { high, low })
    }

    /// The upper 32 bits.
    #[inline]
    pub const fn high(&self) -> u32 {
        self.high
    }

    /// The lower 32 bits.
    #[inline]
    pub const fn low(&self) -> u32 {
        self.low
    }

    /// Reassign this value in place, through the same decoding path as
    /// construction. Supports reusing one accumulator across a computation.
    pub fn set_value<'a, S: Into<Source<'a>>>(&mut self, source: S) -> Result<&mut Self, Error> {
        let (high, low) = decode(source.into())?;
        self.high = high;
        self.low = low;
        Ok(self)
    }

    // Word-level modular add: low words as unsigned 32-bit quantities, carry
    // into the high word when the unsigned sum exceeds 0xffffffff.
    fn add_words(&mut self, high: u32, low: u32) -> &mut Self {
        let (sum, carry) = self.low.overflowing_add(low);
        self.low = sum;
        self.high = self.high.wrapping_add(high).wrapping_add(carry as u32);
        self
    }

    // Subtraction as addition of the two's complement: invert both words,
    // add, then add one. Bit-identical to direct borrow subtraction.
    fn sub_words(&mut self, high: u32, low: u32) -> &mut Self {
        self.add_words(!high, !low).add_words(0, 1)
    }

    /// Add any decodable source into this value, modulo 2^64.
    pub fn add_in_place<'a, S: Into<Source<'a>>>(&mut self, v: S) -> Result<&mut Self, Error> {
        let (high, low) = decode(v.into())?;
        Ok(self.add_words(high, low))
    }

    /// Subtract any decodable source from this value, modulo 2^64.
    pub fn sub_in_place<'a, S: Into<Source<'a>>>(&mut self, v: S) -> Result<&mut Self, Error> {
        let (high, low) = decode(v.into())?;
        Ok(self.sub_words(high, low))
    }

    /// Value-returning addition: copies `self`, then mutates the copy.
    pub fn try_add<'a, S: Into<Source<'a>>>(&self, v: S) -> Result<Self, Error> {
        let mut out = *self;
        out.add_in_place(v)?;
        Ok(out)
    }

    /// Value-returning subtraction: copies `self`, then mutates the copy.
    pub fn try_sub<'a, S: Into<Source<'a>>>(&self, v: S) -> Result<Self, Error> {
        let mut out = *self;
        out.sub_in_place(v)?;
        Ok(out)
    }

    /// Typed modular addition.
    #[inline]
    pub fn wrapping_add(mut self, other: Self) -> Self {
        self.add_words(other.high, other.low);
        self
    }

    /// Typed modular subtraction.
    #[inline]
    pub fn wrapping_sub(mut self, other: Self) -> Self {
        self.sub_words(other.high, other.low);
        self
    }

    /// Reinterpret the word pair as the 64 bits of a double.
    ///
    /// This is a bit cast, not a numeric conversion; the round trip through
    /// [`from_double`](Int64::from_double) is exact for every pattern,
    /// including signaling/quiet NaNs, the infinities, and both zeros.
    #[inline]
    pub fn to_double(self) -> f64 {
        raw::words_to_double(self.high, self.low)
    }

    /// Inverse of [`to_double`](Int64::to_double).
    #[inline]
    pub fn from_double(d: f64) -> Self {
        let (high, low) = raw::double_to_words(d);
        Self { high, low }
    }

    /// Decode from a typed element view whose element count times element
    /// width totals 8 bytes.
    pub fn from_view<E: raw::Element>(view: &[E]) -> Result<Self, Error> {
        let (high, low) = raw::words_from_view(view)?;
        Ok(Self { high, low })
    }

    /// Write this value's bit pattern into a typed element view at the given
    /// element offset.
    ///
    /// # Panics
    ///
    /// Panics if the destination cannot hold the full value at `offset`.
    pub fn copy_into_view<E: raw::Element>(
        &self,
        view: &mut [E],
        offset: usize,
    ) -> Result<(), Error> {
        raw::words_into_view(self.high, self.low, view, offset)
    }
}

impl fmt::Display for Int64 {
    // Canonical form: `0x` + 16 zero-padded lowercase hex digits, high word
    // first; always 18 characters.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0x{:08x}{:08x}", self.high, self.low)
    }
}

impl FromStr for Int64 {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Add for Int64 {
    type Output = Int64;

    #[inline]
    fn add(self, rhs: Int64) -> Int64 {
        self.wrapping_add(rhs)
    }
}

impl AddAssign for Int64 {
    #[inline]
    fn add_assign(&mut self, rhs: Int64) {
        self.add_words(rhs.high, rhs.low);
    }
}

impl Sub for Int64 {
    type Output = Int64;

    #[inline]
    fn sub(self, rhs: Int64) -> Int64 {
        self.wrapping_sub(rhs)
    }
}

impl SubAssign for Int64 {
    #[inline]
    fn sub_assign(&mut self, rhs: Int64) {
        self.sub_words(rhs.high, rhs.low);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn int64_from_hex_string() {
        let v = Int64::new("0x123456789abcdef0").unwrap();
        assert_eq!(v.high(), 0x12345678);
        assert_eq!(v.low(), 0x9abcdef0);

        // 8 digits or fewer decode into the low word only
        assert_eq!(Int64::new("0x2a").unwrap(), Int64::from_words(0, 0x2a));
        assert_eq!(
            Int64::new("0xdeadbeef").unwrap(),
            Int64::from_words(0, 0xdeadbeef)
        );
        // 9 digits start splitting into the high word
        assert_eq!(
            Int64::new("0x100000000").unwrap(),
            Int64::from_words(1, 0)
        );
        assert_eq!(
            Int64::new("0xffffffffffffffff").unwrap(),
            Int64::from_words(0xffffffff, 0xffffffff)
        );
    }

    #[test]
    fn int64_from_hex_string_rejects_garbage() {
        assert!(matches!(
            Int64::new("0x12345678123456789"),
            Err(Error::HexStringTooLong(_))
        ));
        assert!(matches!(
            Int64::new("0xnope"),
            Err(Error::UnsupportedArgument(_))
        ));
        assert!(matches!(
            Int64::new("0x"),
            Err(Error::UnsupportedArgument(_))
        ));
        assert!(matches!(
            Int64::new("1234"),
            Err(Error::UnsupportedArgument(_))
        ));
    }

    #[test]
    fn int64_from_number() {
        assert_eq!(Int64::new(0.0).unwrap(), Int64::ZERO);
        assert_eq!(Int64::new(1.0).unwrap(), Int64::ONE);
        assert_eq!(Int64::new(0x2au32).unwrap(), Int64::from_words(0, 0x2a));

        // negative 32-bit quantities sign-extend into the high word
        assert_eq!(
            Int64::new(-1.0).unwrap(),
            Int64::from_words(0xffffffff, 0xffffffff)
        );
        assert_eq!(
            Int64::new(-2147483648.0).unwrap(),
            Int64::from_words(0xffffffff, 0x80000000)
        );
        assert_eq!(Int64::new(-1i32).unwrap(), Int64::new(-1.0).unwrap());

        // the 32-bit boundary
        assert_eq!(
            Int64::new(4294967295.0).unwrap(),
            Int64::from_words(0, 0xffffffff)
        );
        assert_eq!(Int64::new(4294967296.0).unwrap(), Int64::from_words(1, 0));

        // beyond the boundary the high word is the quotient by 2^32
        assert_eq!(
            Int64::new(-4294967301.0).unwrap(),
            Int64::from_words(0xfffffffe, 0xfffffffb)
        );

        // fractions truncate toward zero per word
        assert_eq!(Int64::new(1.75).unwrap(), Int64::ONE);
        assert_eq!(
            Int64::new(-0.5).unwrap(),
            Int64::from_words(0xffffffff, 0)
        );
    }

    #[test]
    fn int64_from_number_rejects_inexact() {
        // 2^53 itself is still exact
        assert_eq!(
            Int64::new(9007199254740992.0).unwrap(),
            Int64::from_words(0x00200000, 0)
        );
        assert!(matches!(
            Int64::new(1e16),
            Err(Error::PrecisionLoss(_))
        ));
        assert!(matches!(
            Int64::new(-1e16),
            Err(Error::PrecisionLoss(_))
        ));
        assert!(matches!(
            Int64::new(f64::NAN),
            Err(Error::UnsupportedArgument(_))
        ));
        assert!(matches!(
            Int64::new(f64::INFINITY),
            Err(Error::UnsupportedArgument(_))
        ));
    }

    #[test]
    fn int64_from_bytes() {
        assert_eq!(
            Int64::new(b"\xef\xbe\xad\xde").unwrap(),
            Int64::from_words(0, 0xdeadbeef)
        );
        assert_eq!(
            Int64::new(b"\xf0\xde\xbc\x9a\x78\x56\x34\x12").unwrap(),
            Int64::new("0x123456789abcdef0").unwrap()
        );
        // short sequences zero-extend
        assert_eq!(Int64::new(&[0x2a][..]).unwrap(), Int64::from_words(0, 0x2a));
        assert!(matches!(
            Int64::new(&[0u8; 9][..]),
            Err(Error::UnsupportedArgument(_))
        ));
    }

    #[test]
    fn int64_from_existing_value() {
        let v = Int64::from_words(0x12345678, 0x9abcdef0);
        assert_eq!(Int64::new(v).unwrap(), v);
    }

    #[test]
    fn int64_set_value_shares_decoding() {
        let mut acc = Int64::ZERO;
        acc.set_value("0x123456789abcdef0").unwrap();
        assert_eq!(acc, Int64::new("0x123456789abcdef0").unwrap());
        acc.set_value(-1.0).unwrap();
        assert_eq!(acc, Int64::new(-1.0).unwrap());
        acc.set_value(Int64::ONE).unwrap();
        assert_eq!(acc, Int64::ONE);
    }

    #[test]
    fn int64_add_carries_between_words() {
        let v = Int64::from_words(0, 0xffffffff).try_add(Int64::ONE).unwrap();
        assert_eq!(v, Int64::from_words(1, 0));

        // carry out of the high word wraps modulo 2^64
        let v = Int64::from_words(0xffffffff, 0xffffffff)
            .try_add(Int64::ONE)
            .unwrap();
        assert_eq!(v, Int64::ZERO);
    }

    #[test]
    fn int64_sub_wraps_on_borrow() {
        let v = Int64::ZERO.try_sub(Int64::ONE).unwrap();
        assert_eq!(v, Int64::from_words(0xffffffff, 0xffffffff));

        let v = Int64::from_words(1, 0).try_sub(Int64::ONE).unwrap();
        assert_eq!(v, Int64::from_words(0, 0xffffffff));
    }

    #[test]
    fn int64_sub_inverts_add() {
        let samples = [
            Int64::ZERO,
            Int64::ONE,
            Int64::from_words(0, 0xffffffff),
            Int64::from_words(0xffffffff, 0xffffffff),
            Int64::from_words(0x12345678, 0x9abcdef0),
            Int64::from_words(0x80000000, 0),
        ];
        for a in samples {
            for b in samples {
                assert_eq!(a.wrapping_add(b).wrapping_sub(b), a);
            }
        }
    }

    #[test]
    fn int64_add_commutes_and_associates() {
        let a = Int64::from_words(0xdeadbeef, 0xcafebabe);
        let b = Int64::from_words(0x12345678, 0x9abcdef0);
        let c = Int64::from_words(0xffffffff, 0xffffffff);
        assert_eq!(a + b, b + a);
        assert_eq!((a + b) + c, a + (b + c));
    }

    #[test]
    fn int64_polymorphic_operands() {
        let base = Int64::new("0x100000000").unwrap();
        assert_eq!(
            base.try_add("0x1").unwrap(),
            Int64::from_words(1, 1)
        );
        assert_eq!(base.try_sub(1.0).unwrap(), Int64::from_words(0, 0xffffffff));

        let mut acc = Int64::ZERO;
        acc.add_in_place(0x2au32).unwrap().add_in_place("0x10").unwrap();
        assert_eq!(acc, Int64::from_words(0, 0x3a));
        acc.sub_in_place(Int64::from_words(0, 0x3a)).unwrap();
        assert_eq!(acc, Int64::ZERO);
    }

    #[test]
    fn int64_operators() {
        let a = Int64::from_words(0, 0xffffffff);
        assert_eq!(a + Int64::ONE, Int64::from_words(1, 0));
        assert_eq!(Int64::ZERO - Int64::ONE, Int64::from_words(0xffffffff, 0xffffffff));

        let mut acc = a;
        acc += Int64::ONE;
        assert_eq!(acc, Int64::from_words(1, 0));
        acc -= Int64::ONE;
        assert_eq!(acc, a);
    }

    #[test]
    fn int64_display_is_canonical() {
        assert_eq!(
            Int64::new("0x123456789abcdef0").unwrap().to_string(),
            "0x123456789abcdef0"
        );
        assert_eq!(Int64::ZERO.to_string(), "0x0000000000000000");
        assert_eq!(
            Int64::from_words(0, 0x2a).to_string(),
            "0x000000000000002a"
        );
        assert_eq!(Int64::ZERO.to_string().len(), 18);
    }

    #[test]
    fn int64_string_round_trip() {
        let samples = [
            Int64::ZERO,
            Int64::ONE,
            Int64::from_words(0xffffffff, 0xffffffff),
            Int64::from_words(0x12345678, 0x9abcdef0),
            Int64::from_words(0, 0x2a),
        ];
        for v in samples {
            assert_eq!(v.to_string().parse::<Int64>().unwrap(), v);
        }
    }

    #[test]
    fn int64_double_round_trip_is_bit_exact() {
        let patterns = [
            (0u32, 0u32),                // +0.0
            (0x80000000, 0),             // -0.0
            (0x3ff00000, 0),             // 1.0
            (0x7ff00000, 0),             // +Inf
            (0xfff00000, 0),             // -Inf
            (0x7ff80000, 0),             // quiet NaN
            (0x7ff00000, 1),             // signaling NaN
            (0x7ff80000, 0xdeadbeef),    // NaN payload
            (0x12345678, 0x9abcdef0),
        ];
        for (high, low) in patterns {
            let v = Int64::from_words(high, low);
            assert_eq!(Int64::from_double(v.to_double()), v);
        }
        assert_eq!(Int64::from_words(0x3ff00000, 0).to_double(), 1.0);
    }

    #[test]
    fn int64_buffer_round_trip() {
        let v = Int64::new("0x123456789abcdef0").unwrap();

        let mut bytes = [0u8; 8];
        v.copy_into_view(&mut bytes, 0).unwrap();
        assert_eq!(Int64::from_view(&bytes).unwrap(), v);

        let mut words = [0u32; 2];
        v.copy_into_view(&mut words, 0).unwrap();
        assert_eq!(Int64::from_view(&words).unwrap(), v);

        let mut doubles = [0.0f64; 1];
        v.copy_into_view(&mut doubles, 0).unwrap();
        assert_eq!(Int64::from_view(&doubles).unwrap(), v);

        // offsets are in elements
        let mut words = [0u32; 4];
        v.copy_into_view(&mut words, 1).unwrap();
        assert_eq!(words, [0, 0x9abcdef0, 0x12345678, 0]);
        assert_eq!(Int64::from_view(&words[1..3]).unwrap(), v);

        let mut halves = [0u16; 4];
        assert_eq!(
            v.copy_into_view(&mut halves, 0),
            Err(Error::UnsupportedBufferWidth(2))
        );
    }
}
