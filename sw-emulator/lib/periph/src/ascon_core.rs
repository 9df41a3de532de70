/*++

Licensed under the Apache-2.0 license.

File Name:

    ascon_core.rs

Abstract:

    File contains the Ascon-AEAD128 core peripheral implementation.

--*/

use ascon_emu_bus::{
    ActionHandle, Bus, BusError, ByteFifo, Clock, ReadOnlyRegister, ReadWriteRegister, Register,
    Timer,
};
use ascon_emu_crypto::{AeadMode, AsconAead, RoundSink, KEY_SIZE, NONCE_SIZE, RATE, TAG_SIZE};
use ascon_emu_types::{ApbAddr, ApbData};
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use tock_registers::register_bitfields;

register_bitfields! [
    u32,

    /// Control Register Fields
    Control [
        START OFFSET(0) NUMBITS(1) [],
        DECRYPT OFFSET(1) NUMBITS(1) [],
        AD_SIZE OFFSET(8) NUMBITS(8) [],
        PT_SIZE OFFSET(16) NUMBITS(8) [],
        DELAY OFFSET(24) NUMBITS(8) [],
    ],

    /// Status Register Fields
    Status [
        READY OFFSET(0) NUMBITS(1) [],
        TAG_VALID OFFSET(1) NUMBITS(1) [],
        AD_EMPTY OFFSET(2) NUMBITS(1) [],
        AD_FULL OFFSET(3) NUMBITS(1) [],
        PT_EMPTY OFFSET(4) NUMBITS(1) [],
        PT_FULL OFFSET(5) NUMBITS(1) [],
        CT_EMPTY OFFSET(6) NUMBITS(1) [],
        CT_FULL OFFSET(7) NUMBITS(1) [],
    ],
];

/// Register offsets
const OFFSET_CTRL: ApbAddr = 0x00;
const OFFSET_STATUS: ApbAddr = 0x04;
const OFFSET_KEY: ApbAddr = 0x08;
const OFFSET_NONCE: ApbAddr = 0x18;
const OFFSET_TAG: ApbAddr = 0x28;
const OFFSET_AD: ApbAddr = 0x38;
const OFFSET_PT: ApbAddr = 0x40;
const OFFSET_CT: ApbAddr = 0x48;

/// Bytes per AD/PT/CT register window
const WINDOW_SIZE: usize = 8;

/// Configuration for [`AsconCore`]
pub struct AsconCoreArgs {
    /// Per-round trace tap. Receives one record per permutation round of
    /// every operation the core runs.
    pub trace: Option<Box<dyn RoundSink>>,

    /// Capacity of each data FIFO, in bytes. Must hold at least one rate
    /// block.
    pub fifo_depth: usize,
}

impl Default for AsconCoreArgs {
    fn default() -> Self {
        Self {
            trace: None,
            fifo_depth: RATE,
        }
    }
}

/// Ascon-AEAD128 core peripheral.
///
/// The core idles until the START control bit is written, then consumes
/// associated data and payload rate blocks from the input FIFOs on timer
/// ticks separated by the configured delay, producing output into the CT
/// FIFO and finally the tag.
pub struct AsconCore {
    /// Control register
    ctrl: ReadWriteRegister<Control::Register>,

    /// Status register
    status: ReadOnlyRegister<Status::Register>,

    /// Key registers
    key: [u32; KEY_SIZE / 4],

    /// Nonce registers
    nonce: [u32; NONCE_SIZE / 4],

    /// Tag registers
    tag: [u32; TAG_SIZE / 4],

    /// Associated data input FIFO
    ad_fifo: ByteFifo,

    /// Payload input FIFO
    pt_fifo: ByteFifo,

    /// Output FIFO
    ct_fifo: ByteFifo,

    /// AEAD engine for the operation in flight
    engine: Option<AsconAead>,

    /// Per-round trace tap
    trace: Option<Box<dyn RoundSink>>,

    /// Associated data bytes still to consume
    ad_remaining: usize,

    /// Payload bytes still to consume
    pt_remaining: usize,

    /// Cycles between processing steps
    delay: u64,

    timer: Timer,

    /// Processing step action
    op_step_action: Option<ActionHandle>,
}

impl AsconCore {
    /// Create a new instance of the Ascon core peripheral
    pub fn new(clock: &Clock, args: AsconCoreArgs) -> Self {
        assert!(args.fifo_depth >= RATE);
        Self {
            ctrl: ReadWriteRegister::new(0),
            status: ReadOnlyRegister::new(
                (Status::READY::SET + Status::AD_EMPTY::SET + Status::PT_EMPTY::SET
                    + Status::CT_EMPTY::SET)
                    .value,
            ),
            key: Default::default(),
            nonce: Default::default(),
            tag: Default::default(),
            ad_fifo: ByteFifo::new(args.fifo_depth),
            pt_fifo: ByteFifo::new(args.fifo_depth),
            ct_fifo: ByteFifo::new(args.fifo_depth),
            engine: None,
            trace: args.trace,
            ad_remaining: 0,
            pt_remaining: 0,
            delay: 0,
            timer: Timer::new(clock),
            op_step_action: None,
        }
    }

    /// On Write callback for the `ctrl` register
    fn on_write_control(&mut self, val: ApbData) -> Result<(), BusError> {
        self.ctrl.reg.set(val);

        if self.ctrl.reg.is_set(Control::START) {
            if self.engine.is_none() && self.status.reg.is_set(Status::READY) {
                self.start_operation();
            }
        } else {
            self.reset_operation();
        }
        Ok(())
    }

    /// Latch the operation parameters and run the initialization permutation
    fn start_operation(&mut self) {
        let mut key = [0u8; KEY_SIZE];
        for (i, word) in self.key.iter().enumerate() {
            key[i * 4..][..4].copy_from_slice(&word.to_le_bytes());
        }
        let mut nonce = [0u8; NONCE_SIZE];
        for (i, word) in self.nonce.iter().enumerate() {
            nonce[i * 4..][..4].copy_from_slice(&word.to_le_bytes());
        }
        let mode = if self.ctrl.reg.is_set(Control::DECRYPT) {
            AeadMode::Decrypt
        } else {
            AeadMode::Encrypt
        };
        self.ad_remaining = self.ctrl.reg.read(Control::AD_SIZE) as usize;
        self.pt_remaining = self.ctrl.reg.read(Control::PT_SIZE) as usize;
        self.delay = self.ctrl.reg.read(Control::DELAY) as u64;
        self.ad_fifo.clear();
        self.pt_fifo.clear();
        self.ct_fifo.clear();
        self.tag = Default::default();
        self.status
            .reg
            .modify(Status::READY::CLEAR + Status::TAG_VALID::CLEAR);

        self.engine = Some(AsconAead::new(&key, &nonce, mode, self.trace.as_deref_mut()));
        self.op_step_action = Some(self.timer.schedule_poll_in(self.delay + 1));
        self.update_fifo_status();
    }

    /// Abort any operation in flight and return to the idle state
    fn reset_operation(&mut self) {
        if let Some(action) = self.op_step_action.take() {
            self.timer.cancel(action);
        }
        self.engine = None;
        self.ad_remaining = 0;
        self.pt_remaining = 0;
        self.ad_fifo.clear();
        self.pt_fifo.clear();
        self.ct_fifo.clear();
        self.status
            .reg
            .modify(Status::READY::SET + Status::TAG_VALID::CLEAR);
        self.update_fifo_status();
    }

    /// Number of FIFO bytes backing a `len`-byte chunk; the driver always
    /// transfers whole windows.
    fn window_len(len: usize) -> usize {
        len.div_ceil(WINDOW_SIZE) * WINDOW_SIZE
    }

    /// One processing step: consume a rate-sized chunk of associated data or
    /// payload if available, or finalize the operation.
    fn op_step(&mut self) {
        if self.engine.is_none() {
            return;
        }

        if self.ad_remaining > 0 {
            let chunk = usize::min(RATE, self.ad_remaining);
            if let Some(bytes) = self.ad_fifo.pop_bytes(Self::window_len(chunk)) {
                if let Some(engine) = self.engine.as_mut() {
                    engine.update_ad(&bytes[..chunk], self.trace.as_deref_mut());
                }
                self.ad_remaining -= chunk;
            }
        } else if self.pt_remaining > 0 {
            let chunk = usize::min(RATE, self.pt_remaining);
            if self.ct_fifo.remaining() >= RATE {
                if let Some(bytes) = self.pt_fifo.pop_bytes(Self::window_len(chunk)) {
                    let mut out = Vec::new();
                    if let Some(engine) = self.engine.as_mut() {
                        out = engine.update_payload(&bytes[..chunk], self.trace.as_deref_mut());
                    }
                    self.pt_remaining -= chunk;
                    out.resize(Self::window_len(out.len()), 0);
                    // Space was checked above
                    let _ = self.ct_fifo.push_slice(&out);
                }
            }
        } else if self.ct_fifo.remaining() >= RATE {
            if let Some(engine) = self.engine.take() {
                let (mut tail, tag) = engine.finalize(self.trace.as_deref_mut());
                tail.resize(Self::window_len(tail.len()), 0);
                let _ = self.ct_fifo.push_slice(&tail);
                for (i, word) in self.tag.iter_mut().enumerate() {
                    *word = u32::from_le_bytes(tag[i * 4..][..4].try_into().unwrap());
                }
                self.status.reg.modify(Status::TAG_VALID::SET);
            }
        }

        self.update_fifo_status();
        if self.engine.is_some() {
            self.op_step_action = Some(self.timer.schedule_poll_in(self.delay + 1));
        }
    }

    /// Recompute the FIFO flow-control status bits
    fn update_fifo_status(&mut self) {
        self.status.reg.modify(
            Status::AD_EMPTY.val(self.ad_fifo.is_empty() as u32)
                + Status::AD_FULL.val((self.ad_fifo.remaining() < WINDOW_SIZE) as u32)
                + Status::PT_EMPTY.val(self.pt_fifo.is_empty() as u32)
                + Status::PT_FULL.val((self.pt_fifo.remaining() < WINDOW_SIZE) as u32)
                + Status::CT_EMPTY.val(self.ct_fifo.is_empty() as u32)
                + Status::CT_FULL.val((self.ct_fifo.remaining() < WINDOW_SIZE) as u32),
        );
    }
}

impl Bus for AsconCore {
    fn read(&mut self, addr: ApbAddr) -> Result<ApbData, BusError> {
        if addr % 4 != 0 {
            Err(BusError::LoadAddrMisaligned)?
        }
        match addr {
            OFFSET_CTRL => self.ctrl.read(),
            OFFSET_STATUS => self.status.read(),
            _ if (OFFSET_TAG..OFFSET_AD).contains(&addr) => {
                Ok(self.tag[((addr - OFFSET_TAG) / 4) as usize])
            }
            _ if (OFFSET_CT..OFFSET_CT + WINDOW_SIZE as ApbAddr).contains(&addr) => {
                let val = self.ct_fifo.pop_word()?;
                self.update_fifo_status();
                Ok(val)
            }
            _ => Err(BusError::LoadAccessFault),
        }
    }

    fn write(&mut self, addr: ApbAddr, val: ApbData) -> Result<(), BusError> {
        if addr % 4 != 0 {
            Err(BusError::StoreAddrMisaligned)?
        }
        match addr {
            OFFSET_CTRL => self.on_write_control(val),
            _ if (OFFSET_KEY..OFFSET_NONCE).contains(&addr) => {
                self.key[((addr - OFFSET_KEY) / 4) as usize] = val;
                Ok(())
            }
            _ if (OFFSET_NONCE..OFFSET_TAG).contains(&addr) => {
                self.nonce[((addr - OFFSET_NONCE) / 4) as usize] = val;
                Ok(())
            }
            _ if (OFFSET_AD..OFFSET_PT).contains(&addr) => {
                self.ad_fifo.push_word(val)?;
                self.update_fifo_status();
                Ok(())
            }
            _ if (OFFSET_PT..OFFSET_CT).contains(&addr) => {
                self.pt_fifo.push_word(val)?;
                self.update_fifo_status();
                Ok(())
            }
            _ => Err(BusError::StoreAccessFault),
        }
    }

    fn poll(&mut self) {
        if self.timer.fired(&mut self.op_step_action) {
            self.op_step();
        }
    }

    fn warm_reset(&mut self) {
        self.reset_operation();
        self.ctrl.reg.set(0);
        self.key = Default::default();
        self.nonce = Default::default();
        self.tag = Default::default();
    }
}
