/*++

Licensed under the Apache-2.0 license.

File Name:

    config.rs

Abstract:

    File contains the register layout configuration consumed by the stream
    adapter. Every offset, field position and status bit the adapter touches
    comes from here; the defaults describe the standard core register map.

--*/

use ascon_emu_types::{ApbAddr, ApbData};

/// Byte order used when packing byte streams into register words
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ByteOrder {
    Little,
    Big,
}

/// Status register bit positions
#[derive(Debug, Clone)]
pub struct StatusBits {
    pub ready: u32,
    pub tag_valid: u32,
    pub ad_empty: u32,
    pub ad_full: u32,
    pub pt_empty: u32,
    pub pt_full: u32,
    pub ct_empty: u32,
    pub ct_full: u32,
}

/// Control register field positions and widths
#[derive(Debug, Clone)]
pub struct CtrlFields {
    pub start_bit: u32,
    pub decrypt_bit: u32,
    pub ad_size_offset: u32,
    pub ad_size_width: u32,
    pub pt_size_offset: u32,
    pub pt_size_width: u32,
    pub delay_offset: u32,
    pub delay_width: u32,
}

/// Core register map and transfer parameters
#[derive(Debug, Clone)]
pub struct RegisterLayout {
    pub ctrl: ApbAddr,
    pub status: ApbAddr,
    pub key: ApbAddr,
    pub nonce: ApbAddr,
    pub tag: ApbAddr,
    pub ad: ApbAddr,
    pub pt: ApbAddr,
    pub ct: ApbAddr,

    /// Bytes per AD/PT/CT window
    pub window_size: usize,

    pub byte_order: ByteOrder,

    pub status_bits: StatusBits,
    pub ctrl_fields: CtrlFields,
}

impl Default for RegisterLayout {
    fn default() -> Self {
        Self {
            ctrl: 0x00,
            status: 0x04,
            key: 0x08,
            nonce: 0x18,
            tag: 0x28,
            ad: 0x38,
            pt: 0x40,
            ct: 0x48,
            window_size: 8,
            byte_order: ByteOrder::Little,
            status_bits: StatusBits {
                ready: 0,
                tag_valid: 1,
                ad_empty: 2,
                ad_full: 3,
                pt_empty: 4,
                pt_full: 5,
                ct_empty: 6,
                ct_full: 7,
            },
            ctrl_fields: CtrlFields {
                start_bit: 0,
                decrypt_bit: 1,
                ad_size_offset: 8,
                ad_size_width: 8,
                pt_size_offset: 16,
                pt_size_width: 8,
                delay_offset: 24,
                delay_width: 8,
            },
        }
    }
}

/// A status register value decoded into named flags. Decoded once per poll;
/// all flow-control decisions within one poll iteration use the same
/// snapshot.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct StatusFlags {
    pub ready: bool,
    pub tag_valid: bool,
    pub ad_empty: bool,
    pub ad_full: bool,
    pub pt_empty: bool,
    pub pt_full: bool,
    pub ct_empty: bool,
    pub ct_full: bool,
}

impl RegisterLayout {
    /// Largest AD or payload stream expressible in the control register
    pub fn max_stream_size(&self) -> usize {
        (1usize << self.ctrl_fields.ad_size_width.min(self.ctrl_fields.pt_size_width)) - 1
    }

    /// Largest delay expressible in the control register
    pub fn max_delay(&self) -> u32 {
        (1u32 << self.ctrl_fields.delay_width) - 1
    }

    pub fn decode_status(&self, val: ApbData) -> StatusFlags {
        let bit = |pos: u32| (val >> pos) & 1 != 0;
        let bits = &self.status_bits;
        StatusFlags {
            ready: bit(bits.ready),
            tag_valid: bit(bits.tag_valid),
            ad_empty: bit(bits.ad_empty),
            ad_full: bit(bits.ad_full),
            pt_empty: bit(bits.pt_empty),
            pt_full: bit(bits.pt_full),
            ct_empty: bit(bits.ct_empty),
            ct_full: bit(bits.ct_full),
        }
    }
}
