use core::cmp::Ordering;

use crate::MeasurementUnit;

/// Represents a physical quantity obtained from a transducer.
///
/// The quantity equals the following, expressed in [`PhysicalValue::unit()`]:
///
/// <math xmlns="http://www.w3.org/1998/Math/MathML" display="block"><mrow><mi mathvariant="monospace">PhysicalValue::value()</mi></mrow><mo>·</mo><msup><mn>10</mn><mrow><mi mathvariant="monospace">scale</mi></mrow></msup></math>
///
/// For instance, a temperature with value `403_150_000`, scale `-6` and unit
/// [`MeasurementUnit::Kelvin`] is 403.15 K, that is 130 °C.
/// This is required to avoid handling floats.
// NOTE(derive): `PartialEq` compares the representation; use `PhysicalValue::compare()` to
// compare quantities expressed with different scales.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhysicalValue {
    value: i64,
    scale: i8,
    unit: MeasurementUnit,
}

impl PhysicalValue {
    /// Creates a new value.
    #[must_use]
    pub const fn new(value: i64, scale: i8, unit: MeasurementUnit) -> Self {
        Self { value, scale, unit }
    }

    /// Returns the scaled integer value.
    #[must_use]
    pub const fn value(&self) -> i64 {
        self.value
    }

    /// Returns the power of ten the value must be multiplied by.
    #[must_use]
    pub const fn scale(&self) -> i8 {
        self.scale
    }

    /// Returns the unit of measurement.
    #[must_use]
    pub const fn unit(&self) -> MeasurementUnit {
        self.unit
    }

    /// Compares two quantities of the same unit, whatever their scales.
    ///
    /// Returns `None` when the units differ.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        if self.unit != other.unit {
            return None;
        }

        let common = self.scale.min(other.scale);
        let ordering = match (self.rescaled(common), other.rescaled(common)) {
            (Some(this), Some(other)) => this.cmp(&other),
            // Only the coarser value can overflow, and it then outweighs any `i64` at the finer
            // scale: its sign decides.
            (None, _) => self.value.cmp(&0),
            (_, None) => 0.cmp(&other.value),
        };
        Some(ordering)
    }

    /// Returns the value expressed with a finer (or equal) scale, or `None` if it does not fit.
    fn rescaled(&self, scale: i8) -> Option<i128> {
        debug_assert!(scale <= self.scale);
        if self.value == 0 {
            return Some(0);
        }
        let steps = u32::from(self.scale.abs_diff(scale));
        10i128
            .checked_pow(steps)
            .and_then(|factor| i128::from(self.value).checked_mul(factor))
    }

    /// Returns an approximation of the quantity as a float, in its unit.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_f32(&self) -> f32 {
        let mut factor = 1.0f32;
        for _ in 0..self.scale.unsigned_abs() {
            factor *= 10.0;
        }
        if self.scale < 0 {
            self.value as f32 / factor
        } else {
            self.value as f32 * factor
        }
    }
}

impl core::fmt::Display for PhysicalValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.scale >= 0 {
            write!(f, "{}", self.value)?;
            for _ in 0..self.scale {
                write!(f, "0")?;
            }
        } else {
            let digits = usize::from(self.scale.unsigned_abs());
            let magnitude = self.value.unsigned_abs();
            let sign = if self.value < 0 { "-" } else { "" };
            match 10u64.checked_pow(u32::from(self.scale.unsigned_abs())) {
                Some(divisor) => write!(
                    f,
                    "{sign}{}.{:0digits$}",
                    magnitude / divisor,
                    magnitude % divisor,
                )?,
                // Any `u64` is below 10^20: the whole magnitude is fractional.
                None => write!(f, "{sign}0.{magnitude:0digits$}")?,
            }
        }

        match self.unit {
            MeasurementUnit::Dimensionless => Ok(()),
            unit => write!(f, " {unit}"),
        }
    }
}
