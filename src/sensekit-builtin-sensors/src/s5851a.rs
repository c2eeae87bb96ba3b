//! Driver for the S-5851A ambient temperature sensor.
//!
//! The sensor converts continuously after power-up. It can be put into shutdown, from which
//! single conversions can be triggered; the last converted value stays readable in the
//! temperature register. See [`PowerModeController`] for the allowed transitions.
//!
//! ```text
//! enter_sleep() -> trigger_one_shot() -> is_ready() == true -> read_temperature()
//! ```

use core::fmt;

use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, RawMutex};
use embedded_hal::i2c::I2c;
use sensekit_log as log;
use sensekit_sensors::{
    scale::LinearScale, CalibrationRange, Channel, ConstructionError, Error, MeasurementUnit,
    Operation, PhysicalValue, PowerMode, PowerModeController, Quantity, RawFrame, Transducer,
    TransducerHandle, Transition,
};
use sensekit_utils::i16_from_env_or;

/// Default bus address.
pub const I2C_ADDR: u8 = 0x48;

const NAME: &str = "S-5851A";

mod reg {
    pub const TEMPERATURE: u8 = 0x00;
    pub const CONFIG: u8 = 0x01;
}

mod config_bits {
    /// Shutdown.
    pub const SD: u8 = 0x01;
    /// One-shot; reads as set while a conversion is in progress.
    pub const OS: u8 = 0x80;
}

const TEMP_MIN_CELSIUS: i16 = i16_from_env_or!("CONFIG_S5851A_TEMP_MIN_CELSIUS", -40);
const TEMP_MAX_CELSIUS: i16 = i16_from_env_or!("CONFIG_S5851A_TEMP_MAX_CELSIUS", 125);

/// 0.0625 °C per count, left-justified in the 16-bit register.
pub const DEFAULT_TRANSFER: LinearScale = LinearScale::new(4, 625, -4, MeasurementUnit::Celsius);

/// Driver configuration.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Bus address of the sensor.
    pub address: u8,
    /// Temperature channel; its bounds, if any, must be in the unit of `transfer`.
    pub temperature: Channel,
    /// Conversion from the temperature register to a temperature.
    pub transfer: LinearScale,
    /// Power mode the sensor is known to be in when the driver is created.
    pub initial_mode: PowerMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: I2C_ADDR,
            temperature: Channel::Bounded(CalibrationRange::new(
                PhysicalValue::new(i64::from(TEMP_MIN_CELSIUS), 0, MeasurementUnit::Celsius),
                PhysicalValue::new(i64::from(TEMP_MAX_CELSIUS), 0, MeasurementUnit::Celsius),
            )),
            transfer: DEFAULT_TRANSFER,
            initial_mode: PowerMode::Continuous,
        }
    }
}

/// An S-5851A temperature sensor.
pub struct S5851a<I2C, M: RawMutex = CriticalSectionRawMutex> {
    handle: TransducerHandle<M, I2C, PowerModeController>,
    temperature: Channel,
    transfer: LinearScale,
}

impl<I2C: I2c, M: RawMutex> S5851a<I2C, M> {
    /// Creates a driver for the sensor.
    ///
    /// No I/O is performed.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured range is inverted or not in the unit of the transfer
    /// function, or if the transfer function overflows on the 16-bit temperature register.
    pub fn new(i2c: I2C, config: Config) -> Result<Self, ConstructionError> {
        config.transfer.check(RawFrame::<2>::BITS)?;
        config.temperature.check(config.transfer.unit())?;

        let controller = PowerModeController::with_mode(config.initial_mode);
        Ok(Self {
            handle: TransducerHandle::new(NAME, config.address, i2c, controller),
            temperature: config.temperature,
            transfer: config.transfer,
        })
    }

    /// Reads the temperature register.
    ///
    /// Outside continuous mode this returns the result of the last conversion.
    ///
    /// # Errors
    ///
    /// - [`Error::Transport`] if the bus transaction fails.
    /// - [`Error::OutOfRange`] if the reading lies outside the configured bounds.
    /// - [`Error::DisabledChannel`] if the channel is disabled.
    pub fn read_temperature(&self) -> Result<PhysicalValue, Error<I2C::Error>> {
        self.temperature.ensure_enabled(NAME, Quantity::Temperature)?;

        self.handle.with(|bus| {
            let frame = bus.read_frame::<2>(Operation::ReadTemperature, reg::TEMPERATURE)?;
            let temperature = self.transfer.apply(frame.signed());
            log::trace!("{}: temperature {}", NAME, temperature);
            self.temperature.validate(NAME, Quantity::Temperature, temperature)
        })
    }

    /// Shuts the sensor down, returning the new mode.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidState`] while a one-shot conversion is pending.
    /// - [`Error::Transport`] if the bus transaction fails; the mode is then unchanged.
    pub fn enter_sleep(&self) -> Result<PowerMode, Error<I2C::Error>> {
        self.transition(Transition::EnterSleep, Operation::EnterSleep, config_bits::SD)
    }

    /// Returns the sensor to continuous conversion, returning the new mode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the bus transaction fails; the mode is then unchanged.
    pub fn exit_sleep(&self) -> Result<PowerMode, Error<I2C::Error>> {
        self.transition(Transition::ExitSleep, Operation::ExitSleep, 0)
    }

    /// Starts a single conversion, returning the new mode.
    ///
    /// Poll [`S5851a::is_ready()`] before reading the result.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidState`] unless the sensor is asleep; no I/O is performed then.
    /// - [`Error::Transport`] if the bus transaction fails; the mode is then unchanged.
    pub fn trigger_one_shot(&self) -> Result<PowerMode, Error<I2C::Error>> {
        self.transition(
            Transition::TriggerOneShot,
            Operation::TriggerOneShot,
            config_bits::OS | config_bits::SD,
        )
    }

    /// Returns whether no conversion is in progress.
    ///
    /// The device is queried in every mode. When a pending one-shot conversion has completed,
    /// the sensor is back asleep.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the bus transaction fails.
    pub fn is_ready(&self) -> Result<bool, Error<I2C::Error>> {
        self.handle.with(|bus| {
            let [flags] = bus.read_frame::<1>(Operation::PollReady, reg::CONFIG)?.bytes();
            let ready = flags & config_bits::OS == 0;

            let controller = bus.state();
            if ready && controller.mode() == PowerMode::OneShotPending {
                controller.perform::<I2C::Error>(NAME, Transition::ConversionComplete, || Ok(()))?;
            }
            Ok(ready)
        })
    }

    /// Returns the power mode the driver believes the sensor to be in.
    #[must_use]
    pub fn power_mode(&self) -> PowerMode {
        self.handle.with(|bus| bus.state().mode())
    }

    /// Dismantles the driver, returning the transport.
    pub fn release(self) -> I2C {
        self.handle.into_parts().0
    }

    fn transition(
        &self,
        transition: Transition,
        operation: Operation,
        flags: u8,
    ) -> Result<PowerMode, Error<I2C::Error>> {
        self.handle.with(|bus| {
            let mut controller = *bus.state();
            let mode = controller.perform(NAME, transition, || {
                bus.write(operation, &[reg::CONFIG, flags])
            })?;
            *bus.state() = controller;
            Ok(mode)
        })
    }
}

impl<I2C: I2c, M: RawMutex> Transducer for S5851a<I2C, M> {
    type Error = Error<I2C::Error>;

    fn part_number(&self) -> &'static str {
        NAME
    }

    fn display_name(&self) -> Option<&'static str> {
        Some("temperature sensor")
    }

    fn quantities(&self) -> &'static [Quantity] {
        &[Quantity::Temperature]
    }
}

impl<I2C, M: RawMutex> fmt::Display for S5851a<I2C, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(NAME)
    }
}
