//! Driver for the MAX17040 single-cell fuel gauge.
//!
//! The gauge reports the cell voltage (`VCELL`, 12 bits in 1.25 mV steps) and the relative state
//! of charge (`SOC`, in 1/256 %). Both registers are big-endian and decoded as unsigned.

use core::fmt;

use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, RawMutex};
use embedded_hal::i2c::I2c;
use sensekit_log as log;
use sensekit_sensors::{
    scale::LinearScale, CalibrationRange, Channel, ConstructionError, Error, MeasurementUnit,
    Operation, PhysicalValue, Quantity, Transducer, TransducerHandle,
};
use sensekit_utils::u16_from_env_or;

/// Default bus address.
pub const I2C_ADDR: u8 = 0x36;

const NAME: &str = "MAX17040";

mod reg {
    pub const VCELL: u8 = 0x02;
    pub const SOC: u8 = 0x04;
    pub const MODE: u8 = 0x06;
    pub const VERSION: u8 = 0x08;
    pub const RCOMP: u8 = 0x0c;
    pub const COMMAND: u8 = 0xfe;
}

const QUICK_START: [u8; 2] = [0x40, 0x00];
const POWER_ON_RESET: [u8; 2] = [0x00, 0x54];

const VCELL_MAX_MILLIVOLTS: u16 = u16_from_env_or!("CONFIG_MAX17040_VCELL_MAX_MILLIVOLTS", 5000);

/// 1.25 mV per count, in the 12 most significant bits.
const VCELL_SCALE: LinearScale = LinearScale::new(4, 1_250, -6, MeasurementUnit::Volt);
/// 1/256 % per count.
const SOC_SCALE: LinearScale = LinearScale::new(0, 390_625, -8, MeasurementUnit::Percent);

/// Driver configuration.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Bus address of the gauge.
    pub address: u8,
    /// Cell voltage channel; its bounds, if any, must be in volts.
    pub cell_voltage: Channel,
    /// State-of-charge channel; its bounds, if any, must be in percent.
    pub state_of_charge: Channel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: I2C_ADDR,
            cell_voltage: Channel::Bounded(CalibrationRange::new(
                PhysicalValue::new(0, 0, MeasurementUnit::Volt),
                PhysicalValue::new(i64::from(VCELL_MAX_MILLIVOLTS), -3, MeasurementUnit::Volt),
            )),
            state_of_charge: Channel::Bounded(CalibrationRange::new(
                PhysicalValue::new(0, 0, MeasurementUnit::Percent),
                PhysicalValue::new(100, 0, MeasurementUnit::Percent),
            )),
        }
    }
}

/// Production version of the gauge, as read from the `VERSION` register.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Version {
    pub msb: u8,
    pub lsb: u8,
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.msb, self.lsb)
    }
}

/// A MAX17040 fuel gauge.
pub struct Max17040<I2C, M: RawMutex = CriticalSectionRawMutex> {
    handle: TransducerHandle<M, I2C>,
    cell_voltage: Channel,
    state_of_charge: Channel,
}

impl<I2C: I2c, M: RawMutex> Max17040<I2C, M> {
    /// Creates a driver for the gauge.
    ///
    /// No I/O is performed.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured range is inverted or not expressed in the unit of its
    /// quantity.
    pub fn new(i2c: I2C, config: Config) -> Result<Self, ConstructionError> {
        config.cell_voltage.check(MeasurementUnit::Volt)?;
        config.state_of_charge.check(MeasurementUnit::Percent)?;

        Ok(Self {
            handle: TransducerHandle::new(NAME, config.address, i2c, ()),
            cell_voltage: config.cell_voltage,
            state_of_charge: config.state_of_charge,
        })
    }

    /// Reads the cell voltage, in volts with micro-volt resolution.
    ///
    /// # Errors
    ///
    /// - [`Error::Transport`] if the bus transaction fails.
    /// - [`Error::OutOfRange`] if the reading lies outside the configured bounds.
    /// - [`Error::DisabledChannel`] if the channel is disabled.
    pub fn read_cell_voltage(&self) -> Result<PhysicalValue, Error<I2C::Error>> {
        self.cell_voltage.ensure_enabled(NAME, Quantity::CellVoltage)?;

        self.handle.with(|bus| {
            let frame = bus.read_frame::<2>(Operation::ReadCellVoltage, reg::VCELL)?;
            let voltage = VCELL_SCALE.apply(i64::from(frame.unsigned()));
            log::trace!("{}: cell voltage {}", NAME, voltage);
            self.cell_voltage.validate(NAME, Quantity::CellVoltage, voltage)
        })
    }

    /// Reads the relative state of charge, in percent.
    ///
    /// # Errors
    ///
    /// - [`Error::Transport`] if the bus transaction fails.
    /// - [`Error::OutOfRange`] if the reading lies outside the configured bounds.
    /// - [`Error::DisabledChannel`] if the channel is disabled.
    pub fn read_state_of_charge(&self) -> Result<PhysicalValue, Error<I2C::Error>> {
        self.state_of_charge.ensure_enabled(NAME, Quantity::StateOfCharge)?;

        self.handle.with(|bus| {
            let frame = bus.read_frame::<2>(Operation::ReadStateOfCharge, reg::SOC)?;
            let charge = SOC_SCALE.apply(i64::from(frame.unsigned()));
            log::trace!("{}: state of charge {}", NAME, charge);
            self.state_of_charge.validate(NAME, Quantity::StateOfCharge, charge)
        })
    }

    /// Reads the `RCOMP` compensation coefficient.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the bus transaction fails.
    pub fn calibration_coefficient(&self) -> Result<u16, Error<I2C::Error>> {
        self.handle.with(|bus| {
            let frame = bus.read_frame::<2>(Operation::GetCalibrationCoefficient, reg::RCOMP)?;
            Ok(u16::from_be_bytes(frame.bytes()))
        })
    }

    /// Writes the `RCOMP` compensation coefficient.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the bus transaction fails.
    pub fn set_calibration_coefficient(&self, coefficient: u16) -> Result<(), Error<I2C::Error>> {
        let [msb, lsb] = coefficient.to_be_bytes();
        self.handle.with(|bus| {
            bus.write(Operation::SetCalibrationCoefficient, &[reg::RCOMP, msb, lsb])
        })?;
        log::debug!("{}: RCOMP set to {}", NAME, coefficient);
        Ok(())
    }

    /// Reads the production version.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the bus transaction fails.
    pub fn read_version(&self) -> Result<Version, Error<I2C::Error>> {
        self.handle.with(|bus| {
            let [msb, lsb] = bus.read_frame::<2>(Operation::ReadVersion, reg::VERSION)?.bytes();
            Ok(Version { msb, lsb })
        })
    }

    /// Issues a power-on reset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the bus transaction fails.
    pub fn reset(&self) -> Result<(), Error<I2C::Error>> {
        let [msb, lsb] = POWER_ON_RESET;
        self.handle
            .with(|bus| bus.write(Operation::Reset, &[reg::COMMAND, msb, lsb]))?;
        log::debug!("{}: reset", NAME);
        Ok(())
    }

    /// Restarts the fuel-gauge calculations, as if the cell had just been inserted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the bus transaction fails.
    pub fn quick_start(&self) -> Result<(), Error<I2C::Error>> {
        let [msb, lsb] = QUICK_START;
        self.handle
            .with(|bus| bus.write(Operation::QuickStart, &[reg::MODE, msb, lsb]))?;
        log::debug!("{}: quick start", NAME);
        Ok(())
    }

    /// Dismantles the driver, returning the transport.
    pub fn release(self) -> I2C {
        self.handle.into_parts().0
    }
}

impl<I2C: I2c, M: RawMutex> Transducer for Max17040<I2C, M> {
    type Error = Error<I2C::Error>;

    fn part_number(&self) -> &'static str {
        NAME
    }

    fn display_name(&self) -> Option<&'static str> {
        Some("fuel gauge")
    }

    fn quantities(&self) -> &'static [Quantity] {
        &[
            Quantity::CellVoltage,
            Quantity::StateOfCharge,
            Quantity::CalibrationCoefficient,
        ]
    }
}

impl<I2C, M: RawMutex> fmt::Display for Max17040<I2C, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(NAME)
    }
}

#[cfg(test)]
mod tests {
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
    use sensekit_sensors::Bound;

    use super::*;

    type TestMax17040 = Max17040<I2cMock, NoopRawMutex>;

    fn gauge(expectations: &[I2cTransaction]) -> TestMax17040 {
        Max17040::new(I2cMock::new(expectations), Config::default()).unwrap()
    }

    #[test]
    fn reset_writes_the_command_register() {
        let max = gauge(&[I2cTransaction::write(I2C_ADDR, vec![0xfe, 0x00, 0x54])]);
        max.reset().unwrap();
        max.release().done();
    }

    #[test]
    fn reset_surfaces_transport_failures() {
        let max = gauge(&[
            I2cTransaction::write(I2C_ADDR, vec![0xfe, 0x00, 0x54]).with_error(ErrorKind::Other),
        ]);

        let err = max.reset().unwrap_err();
        assert!(matches!(
            err,
            Error::Transport {
                device: "MAX17040",
                operation: Operation::Reset,
                ..
            }
        ));

        max.release().done();
    }

    #[test]
    fn quick_start_writes_the_mode_register() {
        let max = gauge(&[I2cTransaction::write(I2C_ADDR, vec![0x06, 0x40, 0x00])]);
        max.quick_start().unwrap();
        max.release().done();
    }

    #[test]
    fn calibration_coefficient() {
        let max = gauge(&[
            I2cTransaction::write(I2C_ADDR, vec![0x0c, 0x97, 0x00]),
            I2cTransaction::write_read(I2C_ADDR, vec![0x0c], vec![0x97, 0x00]),
        ]);

        max.set_calibration_coefficient(0x9700).unwrap();
        assert_eq!(max.calibration_coefficient().unwrap(), 0x9700);

        max.release().done();
    }

    #[test]
    fn version() {
        let max = gauge(&[I2cTransaction::write_read(
            I2C_ADDR,
            vec![0x08],
            vec![0x40, 0x50],
        )]);

        let version = max.read_version().unwrap();
        assert_eq!(version, Version { msb: 64, lsb: 80 });
        assert_eq!(version.to_string(), "64/80");

        max.release().done();
    }

    #[test]
    fn cell_voltage() {
        let max = gauge(&[I2cTransaction::write_read(
            I2C_ADDR,
            vec![0x02],
            vec![0x98, 0x10],
        )]);

        let voltage = max.read_cell_voltage().unwrap();
        assert_eq!(voltage, PhysicalValue::new(3_041_250, -6, MeasurementUnit::Volt));
        assert_eq!(voltage.to_string(), "3.041250 V");

        max.release().done();
    }

    #[test]
    fn state_of_charge() {
        let max = gauge(&[I2cTransaction::write_read(
            I2C_ADDR,
            vec![0x04],
            vec![0x60, 0x83],
        )]);

        let charge = max.read_state_of_charge().unwrap();
        assert_eq!(charge.value(), 9_651_171_875);
        assert_eq!(charge.scale(), -8);
        assert_eq!(charge.to_string(), "96.51171875 %");

        max.release().done();
    }

    #[test]
    fn state_of_charge_above_full() {
        // 101 %
        let max = gauge(&[I2cTransaction::write_read(
            I2C_ADDR,
            vec![0x04],
            vec![0x65, 0x00],
        )]);

        let err = max.read_state_of_charge().unwrap_err();
        let out_of_range = err.out_of_range().unwrap();
        assert_eq!(out_of_range.quantity, Quantity::StateOfCharge);
        assert_eq!(
            out_of_range.violated,
            Bound::Upper(PhysicalValue::new(100, 0, MeasurementUnit::Percent))
        );

        max.release().done();
    }

    #[test]
    fn disabled_channel_fails_without_io() {
        let config = Config {
            cell_voltage: Channel::Disabled,
            ..Config::default()
        };
        let max: TestMax17040 = Max17040::new(I2cMock::new(&[]), config).unwrap();

        assert!(matches!(
            max.read_cell_voltage(),
            Err(Error::DisabledChannel {
                quantity: Quantity::CellVoltage,
                ..
            })
        ));

        max.release().done();
    }

    #[test]
    fn bounds_must_match_the_quantity() {
        let config = Config {
            state_of_charge: Channel::Bounded(CalibrationRange::new(
                PhysicalValue::new(0, 0, MeasurementUnit::Volt),
                PhysicalValue::new(5, 0, MeasurementUnit::Volt),
            )),
            ..Config::default()
        };

        let mut i2c = I2cMock::new(&[]);
        let err = TestMax17040::new(i2c.clone(), config).err().unwrap();
        assert!(matches!(err, ConstructionError::UnitMismatch { .. }));

        i2c.done();
    }

    #[test]
    fn identification() {
        let max = gauge(&[]);

        assert_eq!(max.to_string(), "MAX17040");
        assert_eq!(max.display_name(), Some("fuel gauge"));
        assert_eq!(max.quantities().len(), 3);

        max.release().done();
    }
}
