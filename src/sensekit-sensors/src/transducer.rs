use crate::Quantity;

/// Describes a transducer driver.
pub trait Transducer {
    /// Error returned when halting the device.
    type Error;

    /// Returns the hardware part number.
    #[must_use]
    fn part_number(&self) -> &'static str;

    /// Returns a human-readable name of the transducer.
    #[must_use]
    fn display_name(&self) -> Option<&'static str>;

    /// Returns the quantities the driver is configured to sense.
    #[must_use]
    fn quantities(&self) -> &'static [Quantity];

    /// Stops any activity of the device that would outlive the driver.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the device cannot be halted.
    fn halt(&self) -> Result<(), Self::Error> {
        Ok(())
    }
}
