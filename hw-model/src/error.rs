/*++

Licensed under the Apache-2.0 license.

File Name:

    error.rs

Abstract:

    File contains the error type for model drivers.

--*/

use ascon_emu_bus::BusError;
use std::fmt;

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ModelError {
    /// A bounded wait on a status flag expired
    Timeout { flag: &'static str, trials: u32 },

    /// The device broke the streaming protocol
    ProtocolViolation(String),

    /// A register transaction faulted
    Bus(BusError),

    /// The operation cannot be expressed on the register interface
    MalformedInput(String),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::Timeout { flag, trials } => {
                write!(f, "{flag} timeout after {trials} trials")
            }
            ModelError::ProtocolViolation(msg) => write!(f, "protocol violation: {msg}"),
            ModelError::Bus(err) => write!(f, "bus fault: {err:?}"),
            ModelError::MalformedInput(msg) => write!(f, "malformed input: {msg}"),
        }
    }
}

impl std::error::Error for ModelError {}

impl From<BusError> for ModelError {
    fn from(err: BusError) -> Self {
        ModelError::Bus(err)
    }
}
