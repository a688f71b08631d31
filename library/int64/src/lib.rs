//! An exact 64-bit integer value type for hosts whose only numeric type is an
//! IEEE-754 double.
//!
//! A double carries 52 bits of mantissa, so integers of magnitude above 2^53
//! cannot be represented exactly by the host's native numbers. [`Int64`]
//! side-steps the problem by storing a 64-bit integer as an ordered pair of
//! 32-bit words `(high, low)` denoting `high * 2^32 + low`, with all
//! arithmetic performed modulo 2^64 in two's complement.
//!
//! On top of the word pair sit the bit-reinterpretation codecs such a value
//! exists to serve:
//!
//! * reading and writing the pair as the raw bits of a double
//!   ([`Int64::to_double`]/[`Int64::from_double`]), exact for every bit
//!   pattern including NaN payloads and the infinities;
//! * round-tripping through foreign typed buffers of 1-, 4-, or 8-byte
//!   elements ([`Int64::from_view`]/[`Int64::copy_into_view`]);
//! * canonical hex rendering and parsing (`Display`/`FromStr`);
//! * the engine value encodings: V8's tagged small integer
//!   ([`Int64::to_smi`]) and pointer tag bit, and JavaScriptCore's NaN-boxed
//!   JSValue ([`Int64::to_jsvalue`]).
//!
//! Construction is polymorphic over one [`Source`] argument, with a single
//! decode routine shared by every entry point that accepts one:
//!
//! ```rust,ignore
//! let a = Int64::new("0x123456789abcdef0")?;
//! let b = Int64::new(-1.0)?;
//! let c = a.try_add(b)?;
//! assert_eq!(c.to_string(), "0x123456789abcdeef");
//! ```
//!
//! There is no shared state anywhere in the crate: every operation is a pure
//! function, and `Int64` is `Copy + Send + Sync`.

mod encode;
mod integer;
pub mod raw;

pub use self::integer::{Int64, Source};
pub use self::raw::Element;

/// Errors produced by coercion, buffer reinterpretation, and the engine
/// encodings.
///
/// Every failure is local to the single requested operation and fails fast;
/// nothing is retried or recovered internally.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Coercion received a source it cannot decode.
    #[error("cannot convert to Int64: {0}")]
    UnsupportedArgument(String),
    /// More than 16 hex digits after the `0x` prefix.
    #[error("hex string too long: {0}")]
    HexStringTooLong(String),
    /// Buffer element width is not 1, 4, or 8 bytes.
    #[error("unsupported buffer element width: {0} bytes")]
    UnsupportedBufferWidth(usize),
    /// Smi encoding requires the high word to be zero.
    #[error("{0} cannot be encoded as an Smi")]
    NotEncodable(String),
    /// Smi decoding requires the low word to be zero.
    #[error("{0} is not an encoded Smi")]
    NotEncoded(String),
    /// The high word lies in one of the reserved JSValue tag bands.
    #[error("{0} cannot be encoded as a JSValue")]
    NotEncodableAsBoxedValue(String),
    /// A numeric source beyond the exact integer range of a double.
    #[error("{0} exceeds the exact integer range of a double")]
    PrecisionLoss(f64),
}
