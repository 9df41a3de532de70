/*++

Licensed under the Apache-2.0 license.

File Name:

    bus.rs

Abstract:

    File contains definition of the Bus trait.

--*/

use ascon_emu_types::{ApbAddr, ApbData};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BusError {
    /// Load address misaligned exception
    LoadAddrMisaligned,

    /// Load access fault exception
    LoadAccessFault,

    /// Store address misaligned exception
    StoreAddrMisaligned,

    /// Store access fault exception
    StoreAccessFault,
}

/// Represents an abstract register bus. All transactions are word sized;
/// addresses are byte addresses and must be word aligned.
pub trait Bus {
    /// Read a word from the given address
    ///
    /// # Error
    ///
    /// * `BusError` - Exception with cause `BusError::LoadAccessFault`
    ///   or `BusError::LoadAddrMisaligned`
    fn read(&mut self, addr: ApbAddr) -> Result<ApbData, BusError>;

    /// Write a word to the given address
    ///
    /// # Error
    ///
    /// * `BusError` - Exception with cause `BusError::StoreAccessFault`
    ///   or `BusError::StoreAddrMisaligned`
    fn write(&mut self, addr: ApbAddr, val: ApbData) -> Result<(), BusError>;

    /// Called to notify the bus that time has passed
    fn poll(&mut self) {
        // By default, do nothing
    }

    /// Called to reset the bus
    fn warm_reset(&mut self) {
        // By default, do nothing
    }
}
