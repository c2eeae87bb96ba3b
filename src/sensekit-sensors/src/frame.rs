//! Decodes fixed-width, big-endian register frames.
//!
//! A frame of `N` bytes carries a `W = 8·N` bit integer, most-significant byte first.
//! Signed frames are two's complement: when bit `W-1` is set the value is `U − 2^W`.
//! Decoding is a pure bit-level reinterpretation and cannot fail.

/// A raw register frame of `N` bytes, as read off the bus.
///
/// Frames of 1 to 4 bytes are supported; wider frames are rejected at compile time.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawFrame<const N: usize> {
    bytes: [u8; N],
}

impl<const N: usize> RawFrame<N> {
    const WIDTH_CHECK: () = assert!(N >= 1 && N <= 4, "frames must be 1 to 4 bytes wide");

    /// Width of the frame in bits.
    #[allow(clippy::cast_possible_truncation)]
    pub const BITS: u32 = (N * 8) as u32;

    /// Wraps the bytes of a frame.
    #[must_use]
    pub const fn new(bytes: [u8; N]) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::WIDTH_CHECK;
        Self { bytes }
    }

    /// Returns the bytes of the frame.
    #[must_use]
    pub const fn bytes(&self) -> [u8; N] {
        self.bytes
    }

    /// Assembles the bytes into an unsigned integer, most-significant byte first.
    #[must_use]
    pub fn unsigned(&self) -> u32 {
        self.bytes
            .iter()
            .fold(0u32, |acc, byte| (acc << 8) | u32::from(*byte))
    }

    /// Interprets the frame as a two's complement integer of [`Self::BITS`] bits.
    #[must_use]
    pub fn signed(&self) -> i64 {
        let unsigned = i64::from(self.unsigned());
        if unsigned & (1 << (Self::BITS - 1)) != 0 {
            unsigned - (1 << Self::BITS)
        } else {
            unsigned
        }
    }

    /// Encodes a signed magnitude back into a frame.
    ///
    /// This is the inverse of [`RawFrame::signed()`]: only the low [`Self::BITS`] bits of
    /// `value` are kept.
    #[must_use]
    pub fn from_signed(value: i64) -> Self {
        let mut bytes = [0u8; N];
        let mut remaining = value;
        for byte in bytes.iter_mut().rev() {
            // Truncation to the low byte is the point here.
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            {
                *byte = (remaining & 0xff) as u8;
            }
            remaining >>= 8;
        }
        Self::new(bytes)
    }
}

impl<const N: usize> From<[u8; N]> for RawFrame<N> {
    fn from(bytes: [u8; N]) -> Self {
        Self::new(bytes)
    }
}
