//! Serialized access to a transducer over its transport.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::{raw::RawMutex, Mutex};
use embedded_hal::i2c::I2c;

use crate::{
    error::{Error, Operation},
    frame::RawFrame,
    log,
};

struct Session<I2C, S> {
    i2c: I2C,
    state: S,
}

/// Bundles the transport of one device with its mutable state behind a mutex.
///
/// Every driver operation runs as a single closure passed to [`TransducerHandle::with()`], so
/// the register-select write and the data read of one operation can never be interleaved with
/// those of another operation on the same handle. The lock is released on every exit path,
/// including errors.
///
/// The guard covers this handle only. Ordering between several handles sharing a physical bus
/// is the responsibility of the transport (e.g., a shared-bus device from
/// `embassy-embedded-hal`).
///
/// `S` is device-specific state that must change atomically with the bus conversation, such as
/// a [`PowerModeController`](crate::PowerModeController).
pub struct TransducerHandle<M: RawMutex, I2C, S = ()> {
    name: &'static str,
    address: u8,
    session: Mutex<M, RefCell<Session<I2C, S>>>,
}

impl<M: RawMutex, I2C: I2c, S> TransducerHandle<M, I2C, S> {
    /// Creates a handle for the device at `address`.
    #[must_use]
    pub fn new(name: &'static str, address: u8, i2c: I2C, state: S) -> Self {
        log::debug!("{}: handle created at address {}", name, address);
        Self {
            name,
            address,
            session: Mutex::new(RefCell::new(Session { i2c, state })),
        }
    }

    /// Returns the name of the device, used in errors.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the bus address of the device.
    #[must_use]
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Runs `operation` with exclusive access to the transport and device state.
    ///
    /// # Panics
    ///
    /// Panics if `operation` calls back into the same handle.
    pub fn with<R>(&self, operation: impl FnOnce(&mut Bus<'_, I2C, S>) -> R) -> R {
        self.session.lock(|session| {
            let mut session = session.borrow_mut();
            let Session { i2c, state } = &mut *session;
            let mut bus = Bus {
                name: self.name,
                address: self.address,
                i2c,
                state,
            };
            operation(&mut bus)
        })
    }

    /// Dismantles the handle, returning the transport and the device state.
    pub fn into_parts(self) -> (I2C, S) {
        let Session { i2c, state } = self.session.into_inner().into_inner();
        (i2c, state)
    }
}

/// Exclusive access to one device, valid for the duration of one operation.
pub struct Bus<'a, I2C, S> {
    name: &'static str,
    address: u8,
    i2c: &'a mut I2C,
    state: &'a mut S,
}

impl<I2C: I2c, S> Bus<'_, I2C, S> {
    /// Returns the name of the device.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the device state.
    pub fn state(&mut self) -> &mut S {
        self.state
    }

    /// Selects `register` and reads an `N`-byte frame from it, in one transaction.
    ///
    /// The frame is read into a buffer local to this call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the transaction fails.
    pub fn read_frame<const N: usize>(
        &mut self,
        operation: Operation,
        register: u8,
    ) -> Result<RawFrame<N>, Error<I2C::Error>> {
        let mut buf = [0u8; N];
        self.i2c
            .write_read(self.address, &[register], &mut buf)
            .map_err(|source| self.transport_error(operation, source))?;
        log::trace!("{}: read {} bytes from register {}", self.name, N, register);
        Ok(RawFrame::new(buf))
    }

    /// Writes `bytes`, starting with the register selector, in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the transaction fails.
    pub fn write(&mut self, operation: Operation, bytes: &[u8]) -> Result<(), Error<I2C::Error>> {
        self.i2c
            .write(self.address, bytes)
            .map_err(|source| self.transport_error(operation, source))?;
        log::trace!("{}: wrote {} bytes", self.name, bytes.len());
        Ok(())
    }

    fn transport_error(&self, operation: Operation, source: I2C::Error) -> Error<I2C::Error> {
        Error::Transport {
            device: self.name,
            operation,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, NoopRawMutex};
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    use super::*;

    const ADDRESS: u8 = 0x6d;

    #[test]
    fn reads_a_frame_in_one_transaction() {
        let i2c = I2cMock::new(&[I2cTransaction::write_read(
            ADDRESS,
            vec![0x09],
            vec![231, 0, 0],
        )]);
        let handle = TransducerHandle::<NoopRawMutex, _>::new("WNK-Pressure", ADDRESS, i2c, ());

        let frame = handle.with(|bus| bus.read_frame::<3>(Operation::ReadTemperature, 0x09));
        assert_eq!(frame, Ok(RawFrame::new([231, 0, 0])));

        let (mut i2c, ()) = handle.into_parts();
        i2c.done();
    }

    #[test]
    fn transport_errors_carry_context() {
        let i2c = I2cMock::new(&[
            I2cTransaction::write(ADDRESS, vec![0xfe, 0x00, 0x54]).with_error(ErrorKind::Other)
        ]);
        let handle = TransducerHandle::<NoopRawMutex, _>::new("MAX17040", ADDRESS, i2c, ());

        let result = handle.with(|bus| bus.write(Operation::Reset, &[0xfe, 0x00, 0x54]));
        let error = result.unwrap_err();
        assert_eq!(
            error,
            Error::Transport {
                device: "MAX17040",
                operation: Operation::Reset,
                source: ErrorKind::Other,
            }
        );
        assert_eq!(error.transport_kind(), Some(ErrorKind::Other));

        // The handle remains usable after a failed operation.
        assert_eq!(handle.with(|bus| bus.name()), "MAX17040");

        let (mut i2c, ()) = handle.into_parts();
        i2c.done();
    }

    #[test]
    fn state_is_guarded_with_the_bus() {
        let i2c = I2cMock::new(&[]);
        let handle = TransducerHandle::<NoopRawMutex, _, u32>::new("S-5851A", 0x48, i2c, 0);

        handle.with(|bus| *bus.state() += 1);
        handle.with(|bus| *bus.state() += 1);

        let (mut i2c, count) = handle.into_parts();
        assert_eq!(count, 2);
        i2c.done();
    }

    #[test]
    fn handle_is_shared_across_threads() {
        let read = I2cTransaction::write_read(ADDRESS, vec![0x09], vec![231, 0, 0]);
        let i2c = I2cMock::new(&[read.clone(), read]);
        let handle =
            TransducerHandle::<CriticalSectionRawMutex, _, u32>::new("WNK", ADDRESS, i2c, 0);

        std::thread::scope(|s| {
            for _ in 0..2 {
                s.spawn(|| {
                    let frame = handle.with(|bus| {
                        *bus.state() += 1;
                        bus.read_frame::<3>(Operation::ReadTemperature, 0x09)
                    });
                    assert_eq!(frame, Ok(RawFrame::new([231, 0, 0])));
                });
            }
        });

        let (mut i2c, reads) = handle.into_parts();
        assert_eq!(reads, 2);
        i2c.done();
    }
}
