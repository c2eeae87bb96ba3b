//! Driver for WNK series pressure/temperature transducers.
//!
//! Both quantities are read as 24-bit two's-complement frames. Temperature is reported in
//! kelvin with micro-kelvin resolution; pressure in pascal with milli-pascal resolution.
//!
//! Pressure sensing depends on the transducer's full-scale range, which is not discoverable
//! from the device and must be given at construction. A transducer constructed with
//! [`Wnk::temperature_only()`] (or a range of 0) only senses temperature.

use core::fmt;

use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, RawMutex};
use embedded_hal::i2c::I2c;
use sensekit_log as log;
use sensekit_sensors::{
    scale::div_round, CalibrationRange, Channel, ConstructionError, Error, MeasurementUnit,
    Operation, PhysicalValue, Quantity, Transducer, TransducerHandle,
};
use sensekit_utils::i16_from_env_or;

/// Default bus address.
pub const I2C_ADDR: u8 = 0x6d;

const NAME: &str = "WNK-Pressure";

mod reg {
    pub const PRESSURE: u8 = 0x06;
    pub const TEMPERATURE: u8 = 0x09;
}

const TEMP_MIN_CELSIUS: i16 = i16_from_env_or!("CONFIG_WNK_TEMP_MIN_CELSIUS", -40);
const TEMP_MAX_CELSIUS: i16 = i16_from_env_or!("CONFIG_WNK_TEMP_MAX_CELSIUS", 125);

/// 25 °C, the temperature a zero reading stands for, in µK.
const TEMP_OFFSET_MICROKELVIN: i64 = 298_150_000;
/// 0 °C in µK.
const ZERO_CELSIUS_MICROKELVIN: i64 = 273_150_000;

/// Converts a whole number of degrees Celsius to a temperature bound in kelvin.
#[must_use]
pub const fn kelvin_from_celsius(celsius: i16) -> PhysicalValue {
    PhysicalValue::new(
        celsius as i64 * 1_000_000 + ZERO_CELSIUS_MICROKELVIN,
        -6,
        MeasurementUnit::Kelvin,
    )
}

/// Driver configuration.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Bus address of the transducer.
    pub address: u8,
    /// Temperature channel; its bounds, if any, must be in kelvin.
    pub temperature: Channel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: I2C_ADDR,
            temperature: Channel::Bounded(CalibrationRange::new(
                kelvin_from_celsius(TEMP_MIN_CELSIUS),
                kelvin_from_celsius(TEMP_MAX_CELSIUS),
            )),
        }
    }
}

/// A WNK transducer.
pub struct Wnk<I2C, M: RawMutex = CriticalSectionRawMutex> {
    handle: TransducerHandle<M, I2C>,
    temperature: Channel,
    pressure: Channel,
    range_kpa: i16,
}

impl<I2C: I2c, M: RawMutex> Wnk<I2C, M> {
    /// Creates a driver for a transducer with a full-scale range of `range_kpa`, whose pressure
    /// readings must lie within `[min_kpa, max_kpa]`.
    ///
    /// A range of 0 disables pressure sensing; the bounds are then ignored.
    ///
    /// # Errors
    ///
    /// - [`ConstructionError::NegativeRange`] if `range_kpa` is negative.
    /// - [`ConstructionError::InvalidWindow`] if the bounds cannot hold the full-scale range.
    /// - [`ConstructionError::InvertedRange`] or [`ConstructionError::UnitMismatch`] if the
    ///   configured temperature bounds are unusable.
    pub fn new(
        i2c: I2C,
        range_kpa: i16,
        min_kpa: i16,
        max_kpa: i16,
        config: Config,
    ) -> Result<Self, ConstructionError> {
        let pressure = pressure_channel(range_kpa, min_kpa, max_kpa)?;
        config.temperature.check(MeasurementUnit::Kelvin)?;

        log::debug!(
            "{}: full-scale range {} kPa, pressure bounds [{}, {}] kPa",
            NAME,
            range_kpa,
            min_kpa,
            max_kpa
        );

        Ok(Self {
            handle: TransducerHandle::new(NAME, config.address, i2c, ()),
            temperature: config.temperature,
            pressure,
            range_kpa,
        })
    }

    /// Creates a driver that only senses temperature.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured temperature bounds are unusable.
    pub fn temperature_only(i2c: I2C, config: Config) -> Result<Self, ConstructionError> {
        Self::new(i2c, 0, 0, 0, config)
    }

    /// Returns the full-scale pressure range, if pressure sensing is enabled.
    #[must_use]
    pub fn range_kpa(&self) -> Option<i16> {
        self.pressure.is_enabled().then_some(self.range_kpa)
    }

    /// Reads the transducer temperature, in kelvin.
    ///
    /// # Errors
    ///
    /// - [`Error::Transport`] if the bus transaction fails.
    /// - [`Error::OutOfRange`] if the reading lies outside the configured bounds.
    /// - [`Error::DisabledChannel`] if temperature sensing was configured as disabled.
    pub fn read_temperature(&self) -> Result<PhysicalValue, Error<I2C::Error>> {
        self.temperature.ensure_enabled(NAME, Quantity::Temperature)?;

        self.handle.with(|bus| {
            let frame = bus.read_frame::<3>(Operation::ReadTemperature, reg::TEMPERATURE)?;
            let temperature = temperature_from_raw(frame.signed());
            log::trace!("{}: temperature {}", NAME, temperature);
            self.temperature.validate(NAME, Quantity::Temperature, temperature)
        })
    }

    /// Reads the pressure, in pascal.
    ///
    /// Fails without any I/O if pressure sensing is disabled.
    ///
    /// # Errors
    ///
    /// - [`Error::DisabledChannel`] if the transducer was constructed without a pressure range.
    /// - [`Error::Transport`] if the bus transaction fails.
    /// - [`Error::OutOfRange`] if the reading lies outside `[min_kpa, max_kpa]`.
    pub fn read_pressure(&self) -> Result<PhysicalValue, Error<I2C::Error>> {
        self.pressure.ensure_enabled(NAME, Quantity::Pressure)?;

        self.handle.with(|bus| {
            let frame = bus.read_frame::<3>(Operation::ReadPressure, reg::PRESSURE)?;
            let pressure = pressure_from_raw(frame.signed(), self.range_kpa);
            log::trace!("{}: pressure {}", NAME, pressure);
            self.pressure.validate(NAME, Quantity::Pressure, pressure)
        })
    }

    /// Dismantles the driver, returning the transport.
    pub fn release(self) -> I2C {
        self.handle.into_parts().0
    }
}

impl<I2C: I2c, M: RawMutex> Transducer for Wnk<I2C, M> {
    type Error = Error<I2C::Error>;

    fn part_number(&self) -> &'static str {
        NAME
    }

    fn display_name(&self) -> Option<&'static str> {
        Some("pressure transducer")
    }

    fn quantities(&self) -> &'static [Quantity] {
        if self.pressure.is_enabled() {
            &[Quantity::Temperature, Quantity::Pressure]
        } else {
            &[Quantity::Temperature]
        }
    }
}

impl<I2C, M: RawMutex> fmt::Display for Wnk<I2C, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(NAME)
    }
}

fn pressure_channel(
    range_kpa: i16,
    min_kpa: i16,
    max_kpa: i16,
) -> Result<Channel, ConstructionError> {
    if range_kpa < 0 {
        return Err(ConstructionError::NegativeRange(range_kpa));
    }
    if range_kpa == 0 {
        return Ok(Channel::Disabled);
    }

    let (range, min, max) = (i32::from(range_kpa), i32::from(min_kpa), i32::from(max_kpa));
    if max < min + range || min > max - range {
        return Err(ConstructionError::InvalidWindow {
            range: range_kpa,
            minimum: min_kpa,
            maximum: max_kpa,
        });
    }

    Ok(Channel::Bounded(CalibrationRange::new(
        kilopascals(min_kpa),
        kilopascals(max_kpa),
    )))
}

const fn kilopascals(kpa: i16) -> PhysicalValue {
    PhysicalValue::new(kpa as i64, 3, MeasurementUnit::Pascal)
}

/// 25 °C + raw / 65536 °C, in µK.
fn temperature_from_raw(raw: i64) -> PhysicalValue {
    PhysicalValue::new(
        TEMP_OFFSET_MICROKELVIN + div_round(raw * 15_625, 1_024),
        -6,
        MeasurementUnit::Kelvin,
    )
}

/// `range · (33 · raw / 2^23 − 5) / 20`, where `range` is in kPa, in mPa.
fn pressure_from_raw(raw: i64, range_kpa: i16) -> PhysicalValue {
    // 5 · 2^23 = 41_943_040, 10^6 / 20 = 50_000
    let numerator = i64::from(range_kpa) * (33 * raw - 41_943_040) * 50_000;
    PhysicalValue::new(div_round(numerator, 1 << 23), -3, MeasurementUnit::Pascal)
}
