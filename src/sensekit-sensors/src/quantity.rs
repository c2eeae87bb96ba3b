/// Physical quantities a transducer driver can sense.
///
/// A driver can sense multiple quantities; each one is validated against its own bounds.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum Quantity {
    /// Temperature.
    Temperature,
    /// Pressure.
    Pressure,
    /// Battery cell voltage.
    CellVoltage,
    /// Battery state of charge.
    StateOfCharge,
    /// Opaque calibration coefficient written to or read from the device.
    CalibrationCoefficient,
}

impl core::fmt::Display for Quantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Temperature => write!(f, "temperature"),
            Self::Pressure => write!(f, "pressure"),
            Self::CellVoltage => write!(f, "cell voltage"),
            Self::StateOfCharge => write!(f, "state of charge"),
            Self::CalibrationCoefficient => write!(f, "calibration coefficient"),
        }
    }
}
