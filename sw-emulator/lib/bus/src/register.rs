/*++

Licensed under the Apache-2.0 license.

File Name:

    register.rs

Abstract:

    File contains implementation of register types used by peripherals.

--*/

use crate::BusError;
use ascon_emu_types::ApbData;
use tock_registers::interfaces::{Readable, Writeable};
use tock_registers::registers::InMemoryRegister;
use tock_registers::RegisterLongName;

pub trait Register {
    /// Read the register
    ///
    /// # Error
    ///
    /// * `BusError` - Exception with cause `BusError::LoadAccessFault`
    fn read(&self) -> Result<ApbData, BusError>;

    /// Write the register
    ///
    /// # Error
    ///
    /// * `BusError` - Exception with cause `BusError::StoreAccessFault`
    fn write(&mut self, val: ApbData) -> Result<(), BusError>;
}

/// Read Write Register
pub struct ReadWriteRegister<R: RegisterLongName = ()> {
    /// Register
    pub reg: InMemoryRegister<u32, R>,
}

impl<R: RegisterLongName> ReadWriteRegister<R> {
    /// Create an instance of Read Write Register
    pub fn new(val: u32) -> Self {
        Self {
            reg: InMemoryRegister::new(val),
        }
    }
}

impl<R: RegisterLongName> Register for ReadWriteRegister<R> {
    fn read(&self) -> Result<ApbData, BusError> {
        Ok(self.reg.get())
    }

    fn write(&mut self, val: ApbData) -> Result<(), BusError> {
        self.reg.set(val);
        Ok(())
    }
}

/// Read Only Register
pub struct ReadOnlyRegister<R: RegisterLongName = ()> {
    /// Register
    pub reg: InMemoryRegister<u32, R>,
}

impl<R: RegisterLongName> ReadOnlyRegister<R> {
    /// Create an instance of Read Only Register
    pub fn new(val: u32) -> Self {
        Self {
            reg: InMemoryRegister::new(val),
        }
    }
}

impl<R: RegisterLongName> Register for ReadOnlyRegister<R> {
    fn read(&self) -> Result<ApbData, BusError> {
        Ok(self.reg.get())
    }

    fn write(&mut self, _val: ApbData) -> Result<(), BusError> {
        Err(BusError::StoreAccessFault)
    }
}

/// Write Only Register
pub struct WriteOnlyRegister<R: RegisterLongName = ()> {
    pub reg: InMemoryRegister<u32, R>,
}

impl<R: RegisterLongName> WriteOnlyRegister<R> {
    /// Create an instance of Write Only Register
    pub fn new(val: u32) -> Self {
        Self {
            reg: InMemoryRegister::new(val),
        }
    }
}

impl<R: RegisterLongName> Register for WriteOnlyRegister<R> {
    fn read(&self) -> Result<ApbData, BusError> {
        Err(BusError::LoadAccessFault)
    }

    fn write(&mut self, val: ApbData) -> Result<(), BusError> {
        self.reg.set(val);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_write_reg() {
        let mut reg = ReadWriteRegister::<()>::new(0);

        assert_eq!(reg.read().ok(), Some(0));
        assert_eq!(reg.write(u32::MAX).ok(), Some(()));
        assert_eq!(reg.read().ok(), Some(u32::MAX));
    }

    #[test]
    fn test_readonly_reg() {
        let mut reg = ReadOnlyRegister::<()>::new(u32::MAX);

        assert_eq!(reg.read().ok(), Some(u32::MAX));
        assert_eq!(reg.write(0).err(), Some(BusError::StoreAccessFault));
        assert_eq!(reg.read().ok(), Some(u32::MAX));
    }

    #[test]
    fn test_writeonly_reg() {
        let mut reg = WriteOnlyRegister::<()>::new(0);

        assert_eq!(reg.write(u32::MAX).ok(), Some(()));
        assert_eq!(reg.reg.get(), u32::MAX);
        assert_eq!(reg.read().err(), Some(BusError::LoadAccessFault));
    }
}
