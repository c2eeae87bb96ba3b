//! Error types returned by transducer handles and drivers.
//!
//! Errors are returned to the immediate caller and never logged by this crate.

use crate::{
    power_mode::{PowerMode, Transition},
    MeasurementUnit, PhysicalValue, Quantity,
};

/// Driver operations, used to give context to transport errors.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum Operation {
    ReadTemperature,
    ReadPressure,
    ReadCellVoltage,
    ReadStateOfCharge,
    GetCalibrationCoefficient,
    SetCalibrationCoefficient,
    ReadVersion,
    Reset,
    QuickStart,
    EnterSleep,
    ExitSleep,
    TriggerOneShot,
    PollReady,
}

impl core::fmt::Display for Operation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ReadTemperature => write!(f, "read temperature"),
            Self::ReadPressure => write!(f, "read pressure"),
            Self::ReadCellVoltage => write!(f, "read cell voltage"),
            Self::ReadStateOfCharge => write!(f, "read state of charge"),
            Self::GetCalibrationCoefficient => write!(f, "get calibration coefficient"),
            Self::SetCalibrationCoefficient => write!(f, "set calibration coefficient"),
            Self::ReadVersion => write!(f, "read version"),
            Self::Reset => write!(f, "reset"),
            Self::QuickStart => write!(f, "quick start"),
            Self::EnterSleep => write!(f, "enter sleep"),
            Self::ExitSleep => write!(f, "exit sleep"),
            Self::TriggerOneShot => write!(f, "trigger one-shot conversion"),
            Self::PollReady => write!(f, "poll readiness"),
        }
    }
}

/// Invalid calibration configuration, detected before any transport I/O.
///
/// No handle is produced when construction fails.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConstructionError {
    /// The absolute `[minimum, maximum]` window (kPa) is narrower than the full-scale range,
    /// or not anchored consistently with it.
    InvalidWindow {
        range: i16,
        minimum: i16,
        maximum: i16,
    },
    /// A full-scale range cannot be negative.
    NegativeRange(i16),
    /// The minimum of an enabled calibration range is not strictly below its maximum.
    InvertedRange {
        minimum: PhysicalValue,
        maximum: PhysicalValue,
    },
    /// Calibration bounds were given in a unit the quantity is not measured in.
    UnitMismatch {
        expected: MeasurementUnit,
        found: MeasurementUnit,
    },
    /// A linear transfer function overflows for some register value of the given width.
    InvalidTransfer { shift: u8, step: i64, bits: u32 },
}

impl core::fmt::Display for ConstructionError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidWindow {
                range,
                minimum,
                maximum,
            } => write!(
                f,
                "pressure range {range} kPa does not fit within bounds [{minimum}, {maximum}] kPa"
            ),
            Self::NegativeRange(range) => write!(f, "negative pressure range {range} kPa"),
            Self::InvertedRange { minimum, maximum } => {
                write!(f, "calibration minimum {minimum} is not below maximum {maximum}")
            }
            Self::UnitMismatch { expected, found } => {
                write!(f, "calibration bounds in `{found}`, expected `{expected}`")
            }
            Self::InvalidTransfer { shift, step, bits } => write!(
                f,
                "transfer function (shift {shift}, step {step}) overflows on {bits}-bit registers"
            ),
        }
    }
}

impl core::error::Error for ConstructionError {}

/// Which bound of a [`CalibrationRange`](crate::CalibrationRange) a reading violated.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bound {
    /// The reading was below this minimum.
    Lower(PhysicalValue),
    /// The reading was above this maximum.
    Upper(PhysicalValue),
}

impl Bound {
    /// Returns the configured bound.
    #[must_use]
    pub fn value(&self) -> PhysicalValue {
        match self {
            Self::Lower(value) | Self::Upper(value) => *value,
        }
    }
}

/// A reading that was decoded and scaled successfully but fell outside its calibration range.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutOfRange {
    pub device: &'static str,
    pub quantity: Quantity,
    pub measured: PhysicalValue,
    pub violated: Bound,
}

impl core::fmt::Display for OutOfRange {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let (relation, bound) = match self.violated {
            Bound::Lower(bound) => ("below minimum", bound),
            Bound::Upper(bound) => ("above maximum", bound),
        };
        write!(
            f,
            "{} out of bounds. {} transducer measured {}, {relation} {bound}",
            self.quantity, self.device, self.measured
        )
    }
}

/// Error returned by transducer operations.
///
/// `E` is the error type of the underlying I2C transport.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// The register transaction failed; `source` is the transport error, unchanged.
    Transport {
        device: &'static str,
        operation: Operation,
        source: E,
    },
    /// The reading fell outside its calibration range.
    OutOfRange(OutOfRange),
    /// The quantity is not sensed by this device configuration; no I/O was attempted.
    DisabledChannel {
        device: &'static str,
        quantity: Quantity,
    },
    /// The power-mode transition is not allowed from the current mode; no I/O was attempted.
    InvalidState {
        device: &'static str,
        mode: PowerMode,
        transition: Transition,
    },
}

impl<E> Error<E> {
    /// Returns whether the error is an out-of-range reading, which callers may choose to treat
    /// as a soft warning.
    #[must_use]
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::OutOfRange(_))
    }

    /// Returns the out-of-range details, if that is what this error is.
    #[must_use]
    pub fn out_of_range(&self) -> Option<&OutOfRange> {
        match self {
            Self::OutOfRange(out_of_range) => Some(out_of_range),
            _ => None,
        }
    }

    /// Returns the name of the device the error originates from.
    #[must_use]
    pub fn device(&self) -> &'static str {
        match self {
            Self::Transport { device, .. }
            | Self::DisabledChannel { device, .. }
            | Self::InvalidState { device, .. } => device,
            Self::OutOfRange(out_of_range) => out_of_range.device,
        }
    }
}

impl<E: embedded_hal::i2c::Error> Error<E> {
    /// Returns the generic kind of the transport error, if this is one.
    #[must_use]
    pub fn transport_kind(&self) -> Option<embedded_hal::i2c::ErrorKind> {
        match self {
            Self::Transport { source, .. } => Some(source.kind()),
            _ => None,
        }
    }
}

impl<E> From<OutOfRange> for Error<E> {
    fn from(out_of_range: OutOfRange) -> Self {
        Self::OutOfRange(out_of_range)
    }
}

impl<E: core::fmt::Debug> core::fmt::Display for Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Transport {
                device,
                operation,
                source,
            } => write!(f, "failed to {operation} on {device}: {source:?}"),
            Self::OutOfRange(out_of_range) => write!(f, "{out_of_range}"),
            Self::DisabledChannel { device, quantity } => {
                write!(f, "{quantity} sensing is not enabled on {device}")
            }
            Self::InvalidState {
                device,
                mode,
                transition,
            } => write!(f, "{device} cannot {transition} while in {mode} mode"),
        }
    }
}

impl<E: core::fmt::Debug> core::error::Error for Error<E> {}

/// Result type of transducer operations.
pub type ReadingResult<T, E> = core::result::Result<T, Error<E>>;
