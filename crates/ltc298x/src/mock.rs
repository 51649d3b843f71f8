//! In-memory stand-in for the chip, used by the driver tests.
//!
//! Writes land in a flat register file and reads are served from it, so a
//! test can preload results and inspect what the driver wrote. Every
//! transaction is recorded.

use embedded_hal::spi::{Error, ErrorKind, ErrorType, Operation, SpiDevice};

use crate::registers::{OP_READ, OP_WRITE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

impl Error for MockError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// One recorded register access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Access {
    pub op: u8,
    pub address: u16,
    pub data: Vec<u8>,
}

impl Access {
    pub fn write(address: u16, data: &[u8]) -> Self {
        Self {
            op: OP_WRITE,
            address,
            data: data.to_vec(),
        }
    }

    pub fn read(address: u16, data: &[u8]) -> Self {
        Self {
            op: OP_READ,
            address,
            data: data.to_vec(),
        }
    }
}

pub struct MockChip {
    pub memory: [u8; 0x400],
    pub log: Vec<Access>,
    /// Fail every transaction without touching memory.
    pub fail: bool,
}

impl MockChip {
    pub fn new() -> Self {
        Self {
            memory: [0; 0x400],
            log: Vec::new(),
            fail: false,
        }
    }

    pub fn set_u32(&mut self, address: u16, value: u32) {
        let address = address as usize;
        self.memory[address..address + 4].copy_from_slice(&value.to_be_bytes());
    }

    pub fn u32_at(&self, address: u16) -> u32 {
        let address = address as usize;
        u32::from_be_bytes([
            self.memory[address],
            self.memory[address + 1],
            self.memory[address + 2],
            self.memory[address + 3],
        ])
    }

    pub fn u24_at(&self, address: u16) -> u32 {
        let address = address as usize;
        u32::from_be_bytes([0, self.memory[address], self.memory[address + 1], self.memory[address + 2]])
    }
}

impl ErrorType for MockChip {
    type Error = MockError;
}

impl SpiDevice for MockChip {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
        if self.fail {
            return Err(MockError);
        }

        let mut header = Vec::new();
        let mut data = Vec::new();
        let mut cursor = 0usize;

        for operation in operations.iter_mut() {
            match operation {
                Operation::Write(words) => {
                    for &word in words.iter() {
                        if header.len() < 3 {
                            header.push(word);
                            if header.len() == 3 {
                                assert!(header[0] == OP_WRITE || header[0] == OP_READ, "bad op-code");
                                cursor = u16::from_be_bytes([header[1], header[2]]) as usize;
                            }
                        } else {
                            assert_eq!(header[0], OP_WRITE, "data sent during a read");
                            self.memory[cursor] = word;
                            cursor += 1;
                            data.push(word);
                        }
                    }
                }
                Operation::Read(words) => {
                    assert_eq!(header.len(), 3, "read before address");
                    assert_eq!(header[0], OP_READ, "data read during a write");
                    for word in words.iter_mut() {
                        *word = self.memory[cursor];
                        cursor += 1;
                        data.push(*word);
                    }
                }
                _ => panic!("Not an expected operation"),
            }
        }

        self.log.push(Access {
            op: header[0],
            address: u16::from_be_bytes([header[1], header[2]]),
            data,
        });

        Ok(())
    }
}
