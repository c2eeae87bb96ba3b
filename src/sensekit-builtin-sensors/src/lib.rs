//! Drivers for the transducers bundled with SenseKit.
//!
//! - [`wnk`]: WNK series pressure/temperature transducers.
//! - [`max17040`]: MAX17040 battery fuel gauge.
//! - [`s5851a`]: S-5851A ambient temperature sensor, with sleep and one-shot modes.
//!
//! All drivers are blocking, take any [`embedded_hal::i2c::I2c`] transport and serialize
//! their operations through a [`TransducerHandle`](sensekit_sensors::TransducerHandle).
//! To share one bus between several drivers, hand each of them a shared-bus device such as
//! `embassy_embedded_hal::shared_bus::blocking::i2c::I2cDevice`.

#![cfg_attr(not(test), no_std)]

pub mod max17040;
pub mod s5851a;
pub mod wnk;

#[cfg(test)]
mod testing;
