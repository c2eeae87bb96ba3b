//! Calibration bounds and the validation policy applied to every reading.

use core::cmp::Ordering;

use crate::{
    error::{Bound, ConstructionError, Error, OutOfRange},
    MeasurementUnit, PhysicalValue, Quantity,
};

/// Inclusive `[minimum, maximum]` window a reading must fall into to be considered valid.
///
/// Readings outside the window are unreliable and may indicate noisy communication or a
/// defective transducer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationRange {
    minimum: PhysicalValue,
    maximum: PhysicalValue,
}

impl CalibrationRange {
    /// Creates a new range.
    ///
    /// The range is checked by [`Channel::check()`] when the owning driver is constructed.
    #[must_use]
    pub const fn new(minimum: PhysicalValue, maximum: PhysicalValue) -> Self {
        Self { minimum, maximum }
    }

    /// Returns the lower bound.
    #[must_use]
    pub const fn minimum(&self) -> PhysicalValue {
        self.minimum
    }

    /// Returns the upper bound.
    #[must_use]
    pub const fn maximum(&self) -> PhysicalValue {
        self.maximum
    }

    /// Checks that both bounds are in `unit` and that `minimum < maximum`.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::UnitMismatch`] or [`ConstructionError::InvertedRange`].
    pub fn check(&self, unit: MeasurementUnit) -> Result<(), ConstructionError> {
        for bound in [self.minimum, self.maximum] {
            if bound.unit() != unit {
                return Err(ConstructionError::UnitMismatch {
                    expected: unit,
                    found: bound.unit(),
                });
            }
        }

        if self.minimum.compare(&self.maximum) != Some(Ordering::Less) {
            return Err(ConstructionError::InvertedRange {
                minimum: self.minimum,
                maximum: self.maximum,
            });
        }

        Ok(())
    }

    /// Returns the violated bound if `value` lies strictly outside the range.
    ///
    /// Equality with a bound is inside the range.
    #[must_use]
    pub fn violation(&self, value: &PhysicalValue) -> Option<Bound> {
        if value.compare(&self.minimum) == Some(Ordering::Less) {
            Some(Bound::Lower(self.minimum))
        } else if value.compare(&self.maximum) == Some(Ordering::Greater) {
            Some(Bound::Upper(self.maximum))
        } else {
            None
        }
    }
}

/// How a sensing channel of a device is configured.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    /// The quantity is not sensed; reads fail before any I/O.
    Disabled,
    /// The quantity is sensed without bounds enforcement.
    Unbounded,
    /// The quantity is sensed and every reading is checked against the range.
    Bounded(CalibrationRange),
}

impl Channel {
    /// Checks the calibration range, if any, against the unit the quantity is measured in.
    ///
    /// # Errors
    ///
    /// See [`CalibrationRange::check()`].
    pub fn check(&self, unit: MeasurementUnit) -> Result<(), ConstructionError> {
        match self {
            Self::Bounded(range) => range.check(unit),
            Self::Disabled | Self::Unbounded => Ok(()),
        }
    }

    /// Returns whether the quantity is sensed.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Disabled)
    }

    /// Fails if the channel is disabled.
    ///
    /// Drivers call this before touching the bus.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DisabledChannel`] if the channel is disabled.
    pub fn ensure_enabled<E>(
        &self,
        device: &'static str,
        quantity: Quantity,
    ) -> Result<(), Error<E>> {
        if self.is_enabled() {
            Ok(())
        } else {
            Err(Error::DisabledChannel { device, quantity })
        }
    }

    /// Validates a converted reading.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] when the reading lies outside a configured range, and
    /// [`Error::DisabledChannel`] if the channel is disabled.
    pub fn validate<E>(
        &self,
        device: &'static str,
        quantity: Quantity,
        measured: PhysicalValue,
    ) -> Result<PhysicalValue, Error<E>> {
        match self {
            Self::Disabled => Err(Error::DisabledChannel { device, quantity }),
            Self::Unbounded => Ok(measured),
            Self::Bounded(range) => match range.violation(&measured) {
                None => Ok(measured),
                Some(violated) => Err(Error::OutOfRange(OutOfRange {
                    device,
                    quantity,
                    measured,
                    violated,
                })),
            },
        }
    }
}
