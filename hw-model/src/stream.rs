/*++

Licensed under the Apache-2.0 license.

File Name:

    stream.rs

Abstract:

    File contains the stream adapter: drives a complete AEAD operation
    through the core register interface, obeying the FIFO flow-control
    status bits and bounding every wait.

--*/

use ascon_emu_crypto::{KEY_SIZE, NONCE_SIZE, TAG_SIZE};
use ascon_emu_types::{ApbAddr, ApbData};

use crate::{
    ApbPort, ApbRequest, BusLogger, ByteOrder, LogFile, ModelError, RegisterLayout, StatusFlags,
};

/// Default bound on every wait loop, in register transactions
const DEFAULT_TIMEOUT_TRIALS: u32 = 10_000;

/// One AEAD operation to drive through the core
#[derive(Clone)]
pub struct Operation {
    pub key: [u8; KEY_SIZE],
    pub nonce: [u8; NONCE_SIZE],
    pub ad: Vec<u8>,
    pub payload: Vec<u8>,
    pub decrypt: bool,

    /// Core cycles between processing steps
    pub delay: u32,
}

/// Output of a completed operation
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OpResult {
    /// Ciphertext when encrypting, recovered plaintext when decrypting
    pub output: Vec<u8>,
    pub tag: [u8; TAG_SIZE],
}

/// Adapter phase, visible to tests
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AdapterState {
    Idle,
    Configuring,
    Running,
    Draining,
    Done,
}

/// Drives AEAD operations over an [`ApbPort`].
///
/// All waits are bounded; a core that stops making progress surfaces as
/// [`ModelError::Timeout`] rather than a hang.
pub struct StreamAdapter {
    layout: RegisterLayout,
    logger: BusLogger,
    state: AdapterState,

    /// Bound on every wait loop, in register transactions
    pub timeout_trials: u32,
}

impl StreamAdapter {
    pub fn new(layout: RegisterLayout) -> Self {
        Self {
            layout,
            logger: BusLogger::new(),
            state: AdapterState::Idle,
            timeout_trials: DEFAULT_TIMEOUT_TRIALS,
        }
    }

    pub fn with_log(layout: RegisterLayout, log: LogFile) -> Self {
        let mut adapter = Self::new(layout);
        adapter.logger.log = Some(log);
        adapter
    }

    pub fn state(&self) -> AdapterState {
        self.state
    }

    pub fn layout(&self) -> &RegisterLayout {
        &self.layout
    }

    /// Register transactions completed so far
    pub fn accesses(&self) -> &[crate::ApbAccess] {
        self.logger.accesses()
    }

    pub fn clear_accesses(&mut self) {
        self.logger.clear();
    }

    /// Complete a register transaction, waiting out any enable-phase wait
    /// states.
    fn xact(
        &mut self,
        port: &mut impl ApbPort,
        req: ApbRequest,
    ) -> Result<ApbData, ModelError> {
        port.setup(req);
        for _ in 0..self.timeout_trials {
            if let Some(result) = port.enable() {
                match req {
                    ApbRequest::Read { addr } => self.logger.log_read(addr, result),
                    ApbRequest::Write { addr, val } => {
                        self.logger.log_write(addr, val, result.map(|_| ()))
                    }
                }
                return result.map_err(ModelError::from);
            }
        }
        Err(ModelError::Timeout {
            flag: "pready",
            trials: self.timeout_trials,
        })
    }

    fn read_reg(&mut self, port: &mut impl ApbPort, addr: ApbAddr) -> Result<ApbData, ModelError> {
        self.xact(port, ApbRequest::Read { addr })
    }

    fn write_reg(
        &mut self,
        port: &mut impl ApbPort,
        addr: ApbAddr,
        val: ApbData,
    ) -> Result<(), ModelError> {
        self.xact(port, ApbRequest::Write { addr, val })?;
        Ok(())
    }

    fn read_status(&mut self, port: &mut impl ApbPort) -> Result<StatusFlags, ModelError> {
        let val = self.read_reg(port, self.layout.status)?;
        Ok(self.layout.decode_status(val))
    }

    fn pack_word(&self, bytes: &[u8; 4]) -> ApbData {
        match self.layout.byte_order {
            ByteOrder::Little => u32::from_le_bytes(*bytes),
            ByteOrder::Big => u32::from_be_bytes(*bytes),
        }
    }

    fn unpack_word(&self, word: ApbData) -> [u8; 4] {
        match self.layout.byte_order {
            ByteOrder::Little => word.to_le_bytes(),
            ByteOrder::Big => word.to_be_bytes(),
        }
    }

    /// Write `data` to consecutive words starting at `addr`, zero-padding the
    /// final word.
    fn write_words(
        &mut self,
        port: &mut impl ApbPort,
        addr: ApbAddr,
        data: &[u8],
    ) -> Result<(), ModelError> {
        for (i, chunk) in data.chunks(4).enumerate() {
            let mut word = [0u8; 4];
            word[..chunk.len()].copy_from_slice(chunk);
            let val = self.pack_word(&word);
            self.write_reg(port, addr + (i * 4) as ApbAddr, val)?;
        }
        Ok(())
    }

    /// Write one input window, zero-padded to the window size. Returns the
    /// number of stream bytes consumed.
    fn write_window(
        &mut self,
        port: &mut impl ApbPort,
        addr: ApbAddr,
        data: &[u8],
    ) -> Result<usize, ModelError> {
        let window_size = self.layout.window_size;
        let n = usize::min(window_size, data.len());
        let mut window = vec![0u8; window_size];
        window[..n].copy_from_slice(&data[..n]);
        self.write_words(port, addr, &window)?;
        Ok(n)
    }

    /// Read one output window into `out`
    fn read_window(
        &mut self,
        port: &mut impl ApbPort,
        addr: ApbAddr,
        out: &mut Vec<u8>,
    ) -> Result<(), ModelError> {
        for _ in 0..self.layout.window_size / 4 {
            let word = self.read_reg(port, addr)?;
            out.extend_from_slice(&self.unpack_word(word));
        }
        Ok(())
    }

    fn encode_ctrl(&self, op: &Operation, start: bool) -> ApbData {
        let fields = &self.layout.ctrl_fields;
        ((start as u32) << fields.start_bit)
            | ((op.decrypt as u32) << fields.decrypt_bit)
            | ((op.ad.len() as u32) << fields.ad_size_offset)
            | ((op.payload.len() as u32) << fields.pt_size_offset)
            | (op.delay << fields.delay_offset)
    }

    /// Poll the status register until `flag` reads as `want`
    fn wait_for(
        &mut self,
        port: &mut impl ApbPort,
        flag: &'static str,
        want: bool,
        get: impl Fn(&StatusFlags) -> bool,
    ) -> Result<StatusFlags, ModelError> {
        for _ in 0..self.timeout_trials {
            let flags = self.read_status(port)?;
            if get(&flags) == want {
                return Ok(flags);
            }
        }
        Err(ModelError::Timeout {
            flag,
            trials: self.timeout_trials,
        })
    }

    fn check_op(&self, op: &Operation) -> Result<(), ModelError> {
        let max = self.layout.max_stream_size();
        if op.ad.len() > max {
            return Err(ModelError::MalformedInput(format!(
                "associated data length {} exceeds limit {max}",
                op.ad.len()
            )));
        }
        if op.payload.len() > max {
            return Err(ModelError::MalformedInput(format!(
                "payload length {} exceeds limit {max}",
                op.payload.len()
            )));
        }
        if op.delay > self.layout.max_delay() {
            return Err(ModelError::MalformedInput(format!(
                "delay {} exceeds limit {}",
                op.delay,
                self.layout.max_delay()
            )));
        }
        Ok(())
    }

    /// Drive one complete AEAD operation and return its output and tag
    pub fn run(
        &mut self,
        port: &mut impl ApbPort,
        op: &Operation,
    ) -> Result<OpResult, ModelError> {
        self.state = AdapterState::Idle;
        self.check_op(op)?;

        self.state = AdapterState::Configuring;
        // Clears out any operation a previous driver left in flight
        self.write_reg(port, self.layout.ctrl, 0)?;
        self.wait_for(port, "ready", true, |f| f.ready)?;
        self.write_words(port, self.layout.key, &op.key)?;
        self.write_words(port, self.layout.nonce, &op.nonce)?;
        self.write_reg(port, self.layout.ctrl, self.encode_ctrl(op, true))?;

        self.state = AdapterState::Running;
        let window_size = self.layout.window_size;
        let out_len = op.payload.len().div_ceil(window_size) * window_size;
        let mut ad_sent = 0;
        let mut pt_sent = 0;
        let mut output = Vec::with_capacity(out_len);
        let mut stalled = 0u32;
        while ad_sent < op.ad.len() || pt_sent < op.payload.len() {
            let flags = self.read_status(port)?;
            if flags.tag_valid {
                return Err(ModelError::ProtocolViolation(
                    "TAG_VALID asserted before the payload was consumed".into(),
                ));
            }

            let mut progress = false;
            if ad_sent < op.ad.len() && !flags.ad_full {
                ad_sent += self.write_window(port, self.layout.ad, &op.ad[ad_sent..])?;
                progress = true;
            } else if ad_sent == op.ad.len() && pt_sent < op.payload.len() && !flags.pt_full {
                pt_sent +=
                    self.write_window(port, self.layout.pt, &op.payload[pt_sent..])?;
                progress = true;
            }
            if !flags.ct_empty && output.len() < out_len {
                self.read_window(port, self.layout.ct, &mut output)?;
                progress = true;
            }

            if progress {
                stalled = 0;
            } else {
                stalled += 1;
                if stalled >= self.timeout_trials {
                    return Err(ModelError::Timeout {
                        flag: "stream",
                        trials: self.timeout_trials,
                    });
                }
            }
        }

        self.state = AdapterState::Draining;
        let mut stalled = 0u32;
        while output.len() < out_len {
            let flags = self.read_status(port)?;
            if !flags.ct_empty {
                self.read_window(port, self.layout.ct, &mut output)?;
                stalled = 0;
            } else {
                stalled += 1;
                if stalled >= self.timeout_trials {
                    return Err(ModelError::Timeout {
                        flag: "ct_empty",
                        trials: self.timeout_trials,
                    });
                }
            }
        }
        self.wait_for(port, "tag_valid", true, |f| f.tag_valid)?;

        let mut tag = [0u8; TAG_SIZE];
        for (i, chunk) in tag.chunks_mut(4).enumerate() {
            let word = self.read_reg(port, self.layout.tag + (i * 4) as ApbAddr)?;
            chunk.copy_from_slice(&self.unpack_word(word));
        }

        // Return the core to idle before reporting the result
        self.write_reg(port, self.layout.ctrl, 0)?;
        self.wait_for(port, "ready", true, |f| f.ready)?;

        self.state = AdapterState::Done;
        output.truncate(op.payload.len());
        Ok(OpResult { output, tag })
    }
}
