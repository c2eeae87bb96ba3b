//! Building blocks for turning decoded register magnitudes into physical quantities.
//!
//! Device-specific transfer functions live next to their drivers; this module provides the
//! shared linear shape and the integer rounding they rely on.

use crate::{ConstructionError, MeasurementUnit, PhysicalValue};

/// A linear transfer function `physical = (raw >> shift) · step · 10^scale`.
///
/// `shift` drops don't-care least-significant bits (arithmetic shift, so negative magnitudes
/// keep their sign).
///
/// # Examples
///
/// A 12-bit left-justified temperature register with 0.0625 °C per count:
///
/// ```
/// # use sensekit_sensors::{scale::LinearScale, MeasurementUnit};
/// let scale = LinearScale::new(4, 625, -4, MeasurementUnit::Celsius);
/// // 0x1900 is 25 °C.
/// assert_eq!(scale.apply(0x1900).value(), 250_000);
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinearScale {
    shift: u8,
    step: i64,
    scale: i8,
    unit: MeasurementUnit,
}

impl LinearScale {
    /// Creates a new linear transfer function.
    #[must_use]
    pub const fn new(shift: u8, step: i64, scale: i8, unit: MeasurementUnit) -> Self {
        Self {
            shift,
            step,
            scale,
            unit,
        }
    }

    /// Checks that the transfer function is defined for every `bits`-wide two's-complement
    /// magnitude: `shift` must be below 64 and no scaled magnitude may overflow an `i64`.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::InvalidTransfer`] otherwise.
    pub fn check(&self, bits: u32) -> Result<(), ConstructionError> {
        let bits = bits.clamp(1, 64);
        // The most negative magnitude outweighs every other one once shifted.
        let extreme = -(1i128 << (bits - 1)) >> self.shift.min(127);
        let fits = self.shift < 64 && i64::try_from(extreme * i128::from(self.step)).is_ok();

        if fits {
            Ok(())
        } else {
            Err(ConstructionError::InvalidTransfer {
                shift: self.shift,
                step: self.step,
                bits,
            })
        }
    }

    /// Applies the transfer function to a decoded magnitude.
    ///
    /// Saturates if the transfer function does not pass [`LinearScale::check()`] for the width
    /// of `raw`.
    #[must_use]
    pub fn apply(&self, raw: i64) -> PhysicalValue {
        let counts = raw >> self.shift.min(63);
        PhysicalValue::new(counts.saturating_mul(self.step), self.scale, self.unit)
    }

    /// Returns the unit the transfer function produces.
    #[must_use]
    pub const fn unit(&self) -> MeasurementUnit {
        self.unit
    }
}

/// Divides and rounds half away from zero.
///
/// `denominator` must be strictly positive.
#[must_use]
pub const fn div_round(numerator: i64, denominator: i64) -> i64 {
    debug_assert!(denominator > 0);
    let half = denominator / 2;
    if numerator >= 0 {
        (numerator + half) / denominator
    } else {
        (numerator - half) / denominator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_dont_care_bits_before_scaling() {
        let vcell = LinearScale::new(4, 1250, -6, MeasurementUnit::Volt);
        // 0x981 counts of 1.25 mV.
        assert_eq!(vcell.apply(0x9810).value(), 3_041_250);
        assert_eq!(vcell.apply(0x981f).value(), 3_041_250);
    }

    #[test]
    fn keeps_the_sign_of_negative_magnitudes() {
        let celsius = LinearScale::new(4, 625, -4, MeasurementUnit::Celsius);
        // 0xe700 as a signed 16-bit value is -25 °C.
        assert_eq!(celsius.apply(-0x1900).value(), -250_000);
    }

    #[test]
    fn checks_the_range_of_the_transfer_function() {
        assert_eq!(LinearScale::new(4, 625, -4, MeasurementUnit::Celsius).check(16), Ok(()));
        assert_eq!(LinearScale::new(0, 1, 0, MeasurementUnit::Celsius).check(64), Ok(()));
        // -2^63 · -1 does not fit.
        assert!(LinearScale::new(0, -1, 0, MeasurementUnit::Celsius)
            .check(64)
            .is_err());
        // Shifting past the width leaves -1 for negative registers.
        assert!(LinearScale::new(20, i64::MIN, 0, MeasurementUnit::Celsius)
            .check(16)
            .is_err());

        assert_eq!(
            LinearScale::new(64, 1, 0, MeasurementUnit::Celsius).check(16),
            Err(ConstructionError::InvalidTransfer {
                shift: 64,
                step: 1,
                bits: 16,
            })
        );
        assert!(LinearScale::new(0, i64::MAX, 0, MeasurementUnit::Celsius)
            .check(16)
            .is_err());
        // -2^15 · 2^48 is exactly i64::MIN; the opposite step overflows.
        assert_eq!(
            LinearScale::new(0, 1 << 48, 0, MeasurementUnit::Celsius).check(16),
            Ok(())
        );
        assert!(LinearScale::new(0, -(1 << 48), 0, MeasurementUnit::Celsius)
            .check(16)
            .is_err());
        assert!(LinearScale::new(0, 1 << 49, 0, MeasurementUnit::Celsius)
            .check(16)
            .is_err());
    }

    #[test]
    fn saturates_instead_of_overflowing() {
        let shifted_out = LinearScale::new(64, 1, 0, MeasurementUnit::Celsius);
        assert_eq!(shifted_out.apply(5).value(), 0);
        assert_eq!(shifted_out.apply(-5).value(), -1);

        let steep = LinearScale::new(0, i64::MAX, 0, MeasurementUnit::Celsius);
        assert_eq!(steep.apply(2).value(), i64::MAX);
        assert_eq!(steep.apply(-2).value(), i64::MIN);
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(div_round(5, 2), 3);
        assert_eq!(div_round(-5, 2), -3);
        assert_eq!(div_round(4, 3), 1);
        assert_eq!(div_round(-4, 3), -1);
        assert_eq!(div_round(0, 7), 0);
    }
}
