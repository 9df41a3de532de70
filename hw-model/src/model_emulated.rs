/*++

Licensed under the Apache-2.0 license.

File Name:

    model_emulated.rs

Abstract:

    File contains the hardware model backed by the software emulator.

--*/

use std::error::Error;

use ascon_emu_bus::{Bus, BusError, Clock};
use ascon_emu_periph::{AsconCore, AsconCoreArgs};
use ascon_emu_types::ApbData;

use crate::{ApbPort, ApbRequest, HwModel, InitParams};

/// Emulated Ascon core hardware model.
///
/// Simulated time advances only inside [`HwModel::step`] and
/// [`ApbPort::enable`]; nothing happens between driver calls.
pub struct ModelEmulated {
    clock: Clock,
    core: AsconCore,

    /// Enable-phase wait states per register transaction
    pready_latency: u32,

    /// Transaction in flight and its remaining wait states
    pending: Option<(ApbRequest, u32)>,
}

impl HwModel for ModelEmulated {
    type TBus<'a> = EmulatedApbBus<'a>;

    fn init(params: InitParams) -> Result<Self, Box<dyn Error>> {
        let clock = Clock::new();
        let core = AsconCore::new(
            &clock,
            AsconCoreArgs {
                trace: params.trace,
                fifo_depth: params.fifo_depth,
            },
        );
        Ok(Self {
            clock,
            core,
            pready_latency: params.pready_latency,
            pending: None,
        })
    }

    fn apb_bus(&mut self) -> Self::TBus<'_> {
        EmulatedApbBus { model: self }
    }

    fn step(&mut self) {
        self.clock
            .increment_and_process_timer_actions(1, &mut self.core);
    }

    fn warm_reset(&mut self) {
        self.pending = None;
        self.core.warm_reset();
    }
}

pub struct EmulatedApbBus<'a> {
    model: &'a mut ModelEmulated,
}

impl ApbPort for EmulatedApbBus<'_> {
    fn setup(&mut self, req: ApbRequest) {
        self.model.pending = Some((req, self.model.pready_latency));
    }

    fn enable(&mut self) -> Option<Result<ApbData, BusError>> {
        self.model.step();
        match self.model.pending.take() {
            None => Some(Err(BusError::LoadAccessFault)),
            Some((req, wait)) if wait > 0 => {
                self.model.pending = Some((req, wait - 1));
                None
            }
            Some((req, _)) => Some(match req {
                ApbRequest::Read { addr } => self.model.core.read(addr),
                ApbRequest::Write { addr, val } => {
                    self.model.core.write(addr, val).map(|()| val)
                }
            }),
        }
    }
}
