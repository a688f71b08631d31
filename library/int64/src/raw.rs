//! Raw bit reinterpretation.
//!
//! Reinterpretation goes through `f64::to_bits`/`from_bits` and stack-local
//! byte images, never through shared scratch storage, so everything here is
//! a pure function over values and slices and nothing is reentrancy- or
//! thread-sensitive.
//!
//! Word order is fixed throughout: a word pair `(high, low)` maps onto the
//! little-endian word view of the 64-bit pattern, i.e. word index 0 holds
//! the low 32 bits and word index 1 the high 32 bits.

use byteorder::{ByteOrder, LittleEndian};

use crate::Error;

/// Reinterpret the 64 bits of a double as a `(high, low)` word pair.
///
/// This is a bit cast, not a numeric conversion; NaN payloads and the
/// infinities survive intact.
#[inline]
pub fn double_to_words(d: f64) -> (u32, u32) {
    let bits = d.to_bits();
    ((bits >> 32) as u32, bits as u32)
}

/// Inverse of [`double_to_words`].
#[inline]
pub fn words_to_double(high: u32, low: u32) -> f64 {
    f64::from_bits(((high as u64) << 32) | low as u64)
}

/// Reinterpret a signed 32-bit word as its unsigned equivalent, e.g. `-1`
/// becomes `0xffffffff`.
///
/// Host arithmetic hands words around as signed quantities; this is the seam
/// where they normalize back into unsigned words.
#[inline]
pub fn normalize_u32(x: i32) -> u32 {
    x as u32
}

mod private {
    pub trait Sealed {}
}

/// An element type of a foreign typed buffer.
///
/// A foreign buffer is described by its element width in bytes. The widths
/// with a 64-bit view are 1, 4, and 8; width-2 elements exist in the host
/// but have no such view, so the codec rejects them with
/// [`UnsupportedBufferWidth`](Error::UnsupportedBufferWidth).
pub trait Element: Copy + private::Sealed {
    /// Element width in bytes.
    const WIDTH: usize;

    #[doc(hidden)]
    fn read_bits(buf: &[u8]) -> Self;
    #[doc(hidden)]
    fn write_bits(self, buf: &mut [u8]);
}

impl private::Sealed for u8 {}
impl Element for u8 {
    const WIDTH: usize = 1;
    fn read_bits(buf: &[u8]) -> Self {
        buf[0]
    }
    fn write_bits(self, buf: &mut [u8]) {
        buf[0] = self;
    }
}

impl private::Sealed for i8 {}
impl Element for i8 {
    const WIDTH: usize = 1;
    fn read_bits(buf: &[u8]) -> Self {
        buf[0] as i8
    }
    fn write_bits(self, buf: &mut [u8]) {
        buf[0] = self as u8;
    }
}

macro_rules! impl_element {
    ($ty:ty, $width:literal, $read:ident, $write:ident) => {
        impl private::Sealed for $ty {}
        impl Element for $ty {
            const WIDTH: usize = $width;
            fn read_bits(buf: &[u8]) -> Self {
                LittleEndian::$read(buf)
            }
            fn write_bits(self, buf: &mut [u8]) {
                LittleEndian::$write(buf, self)
            }
        }
    };
}

impl_element!(u16, 2, read_u16, write_u16);
impl_element!(i16, 2, read_i16, write_i16);
impl_element!(u32, 4, read_u32, write_u32);
impl_element!(i32, 4, read_i32, write_i32);
impl_element!(f64, 8, read_f64, write_f64);

fn check_width<E: Element>() -> Result<(), Error> {
    match E::WIDTH {
        1 | 4 | 8 => Ok(()),
        w => Err(Error::UnsupportedBufferWidth(w)),
    }
}

/// Copy a typed view element-wise into an 8-byte image and read it back as a
/// `(high, low)` word pair.
///
/// The element count times the element width must total exactly 8 bytes.
pub fn words_from_view<E: Element>(view: &[E]) -> Result<(u32, u32), Error> {
    check_width::<E>()?;
    if view.len() * E::WIDTH != 8 {
        return Err(Error::UnsupportedArgument(format!(
            "view of {} elements with width {}, expected {}",
            view.len(),
            E::WIDTH,
            8 / E::WIDTH
        )));
    }
    let mut image = [0u8; 8];
    for (i, element) in view.iter().enumerate() {
        element.write_bits(&mut image[i * E::WIDTH..(i + 1) * E::WIDTH]);
    }
    Ok((
        LittleEndian::read_u32(&image[4..]),
        LittleEndian::read_u32(&image[..4]),
    ))
}

/// Write the bit pattern of a word pair into a typed view, starting at the
/// given element offset.
///
/// # Panics
///
/// Panics if the destination cannot hold all `8 / E::WIDTH` elements at
/// `offset`.
pub fn words_into_view<E: Element>(
    high: u32,
    low: u32,
    view: &mut [E],
    offset: usize,
) -> Result<(), Error> {
    check_width::<E>()?;
    let count = 8 / E::WIDTH;
    assert!(
        view.len() >= offset + count,
        "destination view holds {} elements, need {} at offset {}",
        view.len(),
        count,
        offset
    );
    let mut image = [0u8; 8];
    LittleEndian::write_u32(&mut image[..4], low);
    LittleEndian::write_u32(&mut image[4..], high);
    for i in 0..count {
        view[offset + i] = E::read_bits(&image[i * E::WIDTH..(i + 1) * E::WIDTH]);
    }
    Ok(())
}
