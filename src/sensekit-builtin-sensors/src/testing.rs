//! Test transport that records the order of bus operations across threads.

use std::{
    sync::{Arc, Mutex},
    thread::ThreadId,
    vec::Vec,
};

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, Operation};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Access {
    Write(u8),
    Read(u8),
}

#[derive(Debug, Copy, Clone)]
pub struct Event {
    pub thread: ThreadId,
    pub access: Access,
}

/// Answers every register read with a fixed frame and logs each write and read.
///
/// The thread yields between the two halves of a transaction, which gives a concurrent caller
/// the chance to interleave if nothing serializes the callers.
#[derive(Clone)]
pub struct RecordingBus {
    responses: &'static [(u8, &'static [u8])],
    events: Arc<Mutex<Vec<Event>>>,
}

impl RecordingBus {
    pub fn new(responses: &'static [(u8, &'static [u8])]) -> Self {
        Self {
            responses,
            events: Arc::default(),
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    fn record(&self, access: Access) {
        self.events.lock().unwrap().push(Event {
            thread: std::thread::current().id(),
            access,
        });
    }
}

impl ErrorType for RecordingBus {
    type Error = ErrorKind;
}

impl I2c for RecordingBus {
    fn transaction(
        &mut self,
        _address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let mut selected = None;
        for operation in operations {
            match operation {
                Operation::Write(bytes) => {
                    let register = *bytes.first().ok_or(ErrorKind::Other)?;
                    selected = Some(register);
                    self.record(Access::Write(register));
                }
                Operation::Read(buf) => {
                    let register = selected.ok_or(ErrorKind::Other)?;
                    let (_, response) = self
                        .responses
                        .iter()
                        .find(|(r, _)| *r == register)
                        .ok_or(ErrorKind::Other)?;
                    buf.copy_from_slice(response);
                    self.record(Access::Read(register));
                }
            }
            std::thread::yield_now();
        }
        Ok(())
    }
}

/// Asserts that every register-select write is immediately followed by the read of the same
/// register, issued by the same thread.
pub fn assert_paired(events: &[Event]) {
    assert_eq!(events.len() % 2, 0, "unpaired bus access: {events:?}");
    for pair in events.chunks_exact(2) {
        let [select, read] = pair else { unreachable!() };
        let Access::Write(register) = select.access else {
            panic!("expected a register select, got {select:?}");
        };
        assert_eq!(read.access, Access::Read(register), "interleaved access: {pair:?}");
        assert_eq!(read.thread, select.thread, "interleaved access: {pair:?}");
    }
}
