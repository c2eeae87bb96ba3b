//! Provides the decoding, validation and power-mode core shared by I2C transducer drivers.
//!
//! A read flows through the following steps:
//!
//! 1. [`TransducerHandle::with()`] grants exclusive access to the device.
//! 2. [`Bus::read_frame()`] reads a [`RawFrame`] into a call-local buffer.
//! 3. The driver's transfer function (for instance a [`scale::LinearScale`]) turns the decoded
//!    magnitude into a [`PhysicalValue`].
//! 4. [`Channel::validate()`] checks it against its [`CalibrationRange`].
//!
//! Devices with several acquisition modes keep a [`PowerModeController`] in their handle
//! state, so that mode checks and mode writes are atomic.

#![cfg_attr(not(test), no_std)]
#![deny(unused_must_use)]

pub(crate) use sensekit_log as log;

pub mod bounds;
pub mod error;
pub mod frame;
pub mod handle;
mod measurement_unit;
mod physical_value;
pub mod power_mode;
mod quantity;
pub mod scale;
mod transducer;

pub use bounds::{CalibrationRange, Channel};
pub use error::{Bound, ConstructionError, Error, Operation, OutOfRange, ReadingResult};
pub use frame::RawFrame;
pub use handle::{Bus, TransducerHandle};
pub use measurement_unit::MeasurementUnit;
pub use physical_value::PhysicalValue;
pub use power_mode::{PowerMode, PowerModeController, Transition};
pub use quantity::Quantity;
pub use transducer::Transducer;
