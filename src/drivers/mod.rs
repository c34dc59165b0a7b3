//! Blocking I²C drivers for the supported sensor chips.
//!
//! All drivers own their bus handle and a delay provider. Share one physical
//! bus between them with a bus-sharing device (e.g. `embedded-hal-bus`).

pub mod aht10;
pub mod sensirion;
pub mod sgp30;
pub mod sht3x;

pub use aht10::Aht10;
pub use sgp30::Sgp30;
pub use sht3x::Sht3x;

/// Driver error, generic over the bus error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// Bus transaction failed (NACK, arbitration loss, ...)
    I2c(E),
    /// A data word failed its CRC check
    Crc,
    /// The chip reported a measurement still in progress
    Busy,
    /// The chip did not report a valid calibration after init
    NotCalibrated,
}

#[cfg(test)]
pub(crate) mod mock {
    //! Scripted I²C bus for driver tests.

    use embedded_hal::delay::DelayNs;
    use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};
    use std::collections::VecDeque;
    use std::vec::Vec;

    /// Records every write and answers reads from a queue.
    ///
    /// A read with an empty queue, or any transfer to a device marked absent,
    /// fails with a NACK.
    #[derive(Default)]
    pub struct ScriptedI2c {
        pub writes: Vec<(u8, Vec<u8>)>,
        reads: VecDeque<Vec<u8>>,
        absent: bool,
    }

    impl ScriptedI2c {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn absent() -> Self {
            Self {
                absent: true,
                ..Self::default()
            }
        }

        pub fn respond(mut self, bytes: &[u8]) -> Self {
            self.reads.push_back(bytes.to_vec());
            self
        }

        pub fn written(&self) -> Vec<Vec<u8>> {
            self.writes.iter().map(|(_, bytes)| bytes.clone()).collect()
        }
    }

    impl ErrorType for ScriptedI2c {
        type Error = ErrorKind;
    }

    impl I2c for ScriptedI2c {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if self.absent {
                return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
            }

            for operation in operations {
                match operation {
                    Operation::Write(bytes) => self.writes.push((address, bytes.to_vec())),
                    Operation::Read(buffer) => {
                        let data = self
                            .reads
                            .pop_front()
                            .ok_or(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data))?;
                        buffer.copy_from_slice(&data);
                    }
                }
            }
            Ok(())
        }
    }

    /// Delay that only accumulates the requested time.
    #[derive(Default)]
    pub struct NoopDelay {
        pub total_ns: u64,
    }

    impl DelayNs for NoopDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ns += u64::from(ns);
        }
    }
}
