/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains the hardware model abstraction: a two-phase register port
    over the emulated (or otherwise simulated) Ascon core, to be driven from
    tests.

--*/

use std::error::Error;

use ascon_emu_bus::BusError;
use ascon_emu_crypto::{RoundSink, RATE};
use ascon_emu_types::{ApbAddr, ApbData};

mod bus_logger;
mod config;
mod error;
mod model_emulated;
mod stream;

pub use bus_logger::{ApbAccess, BusLogger, LogFile};
pub use config::{ByteOrder, CtrlFields, RegisterLayout, StatusBits, StatusFlags};
pub use error::ModelError;
pub use model_emulated::ModelEmulated;
pub use stream::{AdapterState, OpResult, Operation, StreamAdapter};

/// A register transaction request
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ApbRequest {
    Read { addr: ApbAddr },
    Write { addr: ApbAddr, val: ApbData },
}

/// A two-phase register port. A transaction is issued with [`ApbPort::setup`]
/// and completes on the first [`ApbPort::enable`] call that returns `Some`;
/// each `enable` call advances simulated time by one cycle.
pub trait ApbPort {
    /// Begin a transaction (select phase)
    fn setup(&mut self, req: ApbRequest);

    /// Advance one cycle of the enable phase. Returns `None` while the
    /// completer is not ready. A completed read yields its data; a completed
    /// write yields the written value.
    fn enable(&mut self) -> Option<Result<ApbData, BusError>>;
}

pub struct InitParams {
    /// Per-round trace tap passed to the core
    pub trace: Option<Box<dyn RoundSink>>,

    /// Capacity of each core data FIFO, in bytes
    pub fifo_depth: usize,

    /// Enable-phase wait states per register transaction
    pub pready_latency: u32,
}

impl Default for InitParams {
    fn default() -> Self {
        Self {
            trace: None,
            fifo_depth: RATE,
            pready_latency: 0,
        }
    }
}

/// Represents an emulator or simulation of the Ascon core hardware, to be
/// driven from tests.
pub trait HwModel {
    type TBus<'a>: ApbPort
    where
        Self: 'a;

    fn init(params: InitParams) -> Result<Self, Box<dyn Error>>
    where
        Self: Sized;

    /// The register port into the core
    fn apb_bus(&mut self) -> Self::TBus<'_>;

    /// Step execution ahead one clock cycle
    fn step(&mut self);

    /// Reset the core to its power-on register state, dropping any
    /// operation in flight
    fn warm_reset(&mut self);

    /// Execute until the result of `predicate` becomes true
    fn step_until(&mut self, mut predicate: impl FnMut(&mut Self) -> bool) {
        while !predicate(self) {
            self.step();
        }
    }
}
