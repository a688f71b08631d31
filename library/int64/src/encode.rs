//! Engine-specific value encodings.
//!
//! Two scripting engines pack integers and pointers into a 64-bit value slot
//! with conventions this module mimics bit-for-bit:
//!
//! * **V8** (pointer compression aside) stores a small integer, the Smi, with
//!   its 32-bit payload in the upper word of the slot and the low word zero.
//!   Heap pointers are distinguished by tag bit 0 of the low word, which is
//!   set on pointers and clear on Smis.
//! * **JavaScriptCore** NaN-boxes its JSValues: a genuine double is stored
//!   with 2^48 added to its bit pattern (0x10000 on the high word), which
//!   pushes every valid double out of the low 16-bit band reserved for
//!   pointers and integers and below the high band reserved for quiet NaN
//!   tags. Only bit patterns whose biased form stays between those bands can
//!   masquerade as a double.
//!
//! Each transform is a narrow, precondition-guarded bit rewrite; nothing here
//! allocates or mutates its receiver.

use crate::{Error, Int64};

// High-word bias JavaScriptCore applies when boxing a double
// (DoubleEncodeOffset = 1 << 48).
const JSVALUE_ENCODE_OFFSET_HIGH: u32 = 0x10000;

// High words at or above this land in the tag band reserved for immediates
// and quiet NaNs.
const JSVALUE_HIGH_CEILING: u32 = 0xffff0000;

impl Int64 {
    /// Encode this value as a V8 Smi, e.g. `0x2a` becomes
    /// `0x0000002a00000000`.
    ///
    /// Valid only when the high word is zero; anything wider does not fit the
    /// 32-bit Smi payload and fails with
    /// [`NotEncodable`](Error::NotEncodable).
    pub fn to_smi(self) -> Result<Int64, Error> {
        if self.high() != 0 {
            return Err(Error::NotEncodable(self.to_string()));
        }
        Ok(Int64::from_words(self.low(), 0))
    }

    /// Decode a V8 Smi back into the integer it carries, e.g.
    /// `0x0000002a00000000` becomes `0x2a`.
    ///
    /// Valid only when the low word is zero; otherwise the value is not an
    /// encoded Smi and this fails with [`NotEncoded`](Error::NotEncoded).
    pub fn from_smi(self) -> Result<Int64, Error> {
        if self.low() != 0 {
            return Err(Error::NotEncoded(self.to_string()));
        }
        Ok(Int64::from_words(0, self.high()))
    }

    /// Set the V8 heap-pointer tag bit (bit 0 of the low word).
    #[inline]
    pub fn tag_pointer(self) -> Int64 {
        Int64::from_words(self.high(), self.low() | 1)
    }

    /// Clear the V8 heap-pointer tag bit.
    #[inline]
    pub fn untag_pointer(self) -> Int64 {
        Int64::from_words(self.high(), self.low() & 0xfffffffe)
    }

    /// Encode this value as a JavaScriptCore NaN-boxed JSValue, returned as
    /// the double whose bit pattern the engine would store.
    ///
    /// Valid only when the high word lies in `[0x10000, 0xffff0000)`: below
    /// sits the band reserved for pointers and integers, at and above the
    /// ceiling the quiet-NaN tag band. Out-of-band values fail with
    /// [`NotEncodableAsBoxedValue`](Error::NotEncodableAsBoxedValue).
    ///
    /// The receiver is unchanged; the bias subtraction happens on a copy.
    pub fn to_jsvalue(self) -> Result<f64, Error> {
        let high = self.high();
        if high < JSVALUE_ENCODE_OFFSET_HIGH || high >= JSVALUE_HIGH_CEILING {
            return Err(Error::NotEncodableAsBoxedValue(self.to_string()));
        }
        let biased = self.wrapping_sub(Int64::from_words(JSVALUE_ENCODE_OFFSET_HIGH, 0));
        Ok(biased.to_double())
    }
}
