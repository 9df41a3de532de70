/*++

Licensed under the Apache-2.0 license.

File Name:

    bus_logger.rs

Abstract:

    File contains the register transaction logger used by the stream
    adapter. Completed transactions are appended to an in-memory record and
    optionally to a human-readable log file.

--*/

use std::{
    cell::RefCell,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
    rc::Rc,
};

use ascon_emu_bus::BusError;
use ascon_emu_types::{ApbAddr, ApbData};

#[derive(Clone)]
pub struct LogFile(Rc<RefCell<BufWriter<File>>>);
impl LogFile {
    pub fn open(path: &Path) -> std::io::Result<Self> {
        Ok(Self(Rc::new(RefCell::new(BufWriter::new(File::create(
            path,
        )?)))))
    }
}
impl Write for LogFile {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.0.borrow_mut().flush()
    }
}

/// One completed register transaction
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ApbAccess {
    Read { addr: ApbAddr, val: ApbData },
    Write { addr: ApbAddr, val: ApbData },
}

pub struct BusLogger {
    pub log: Option<LogFile>,
    record: Vec<ApbAccess>,
}

impl BusLogger {
    pub fn new() -> Self {
        Self {
            log: None,
            record: Vec::new(),
        }
    }

    /// All transactions completed so far, in order
    pub fn accesses(&self) -> &[ApbAccess] {
        &self.record
    }

    pub fn clear(&mut self) {
        self.record.clear();
    }

    pub fn log_read(&mut self, addr: ApbAddr, result: Result<ApbData, BusError>) {
        match result {
            Ok(val) => {
                self.record.push(ApbAccess::Read { addr, val });
                if let Some(log) = &mut self.log {
                    writeln!(log, "APB  read *0x{addr:08x} -> 0x{val:x}").unwrap();
                }
            }
            Err(e) => {
                if let Some(log) = &mut self.log {
                    writeln!(log, "APB  read *0x{addr:08x} ***FAULT {e:?}").unwrap();
                }
            }
        }
    }

    pub fn log_write(&mut self, addr: ApbAddr, val: ApbData, result: Result<(), BusError>) {
        match result {
            Ok(()) => {
                self.record.push(ApbAccess::Write { addr, val });
                if let Some(log) = &mut self.log {
                    writeln!(log, "APB write *0x{addr:08x} <- 0x{val:x}").unwrap();
                }
            }
            Err(e) => {
                if let Some(log) = &mut self.log {
                    writeln!(log, "APB write *0x{addr:08x} <- 0x{val:x} ***FAULT {e:?}").unwrap();
                }
            }
        }
    }
}

impl Default for BusLogger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record() {
        let mut logger = BusLogger::new();
        logger.log_read(0x04, Ok(0x45));
        logger.log_write(0x00, 0x1, Ok(()));
        logger.log_read(0x48, Err(BusError::LoadAccessFault));
        assert_eq!(
            logger.accesses(),
            &[
                ApbAccess::Read {
                    addr: 0x04,
                    val: 0x45
                },
                ApbAccess::Write {
                    addr: 0x00,
                    val: 0x1
                },
            ]
        );
        logger.clear();
        assert!(logger.accesses().is_empty());
    }
}
