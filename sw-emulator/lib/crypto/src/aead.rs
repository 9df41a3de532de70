/*++

Licensed under the Apache-2.0 license.

File Name:

    aead.rs

Abstract:

    File contains implementation of the Ascon-AEAD128 authenticated cipher
    (NIST SP 800-232) as a streaming engine.

--*/

use crate::permutation::{permute_traced, RoundSink, STATE_WORDS};

/// Ascon-AEAD128 Key Size
pub const KEY_SIZE: usize = 16;

/// Ascon-AEAD128 Nonce Size
pub const NONCE_SIZE: usize = 16;

/// Ascon-AEAD128 Tag Size
pub const TAG_SIZE: usize = 16;

/// Ascon-AEAD128 Rate (bytes absorbed per permutation)
pub const RATE: usize = 16;

/// Ascon-AEAD128 Initialization Vector
pub const IV: u64 = 0x0000_1000_808C_0001;

/// Rounds for the initialization and finalization permutations
const ROUNDS_A: usize = 12;

/// Rounds for the processing permutations
const ROUNDS_B: usize = 8;

/// Domain separation bit, added to the last state word after the
/// associated-data phase
const DSEP: u64 = 0x8000_0000_0000_0000;

/// AEAD Direction
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AeadMode {
    Encrypt,
    Decrypt,
}

fn word(bytes: &[u8]) -> u64 {
    u64::from_le_bytes(bytes.try_into().unwrap())
}

/// Ascon-AEAD128 streaming engine.
///
/// Data is staged internally until a full rate block is available; the
/// processing permutation for a payload block runs lazily before the next
/// block is absorbed, never after the last one. Every permutation forwards
/// its per-round state snapshots to the optional [`RoundSink`] supplied by
/// the caller.
pub struct AsconAead {
    /// Permutation state
    state: [u64; STATE_WORDS],

    /// Key words
    k0: u64,
    k1: u64,

    mode: AeadMode,

    /// Partial block to be processed
    partial: Vec<u8>,

    /// Total associated-data bytes absorbed
    ad_len: usize,

    /// Associated-data phase has been closed
    in_payload: bool,

    /// A payload block was absorbed and its permutation is still owed
    pending_permute: bool,

    /// Sequence number for the next round record
    trace_index: usize,
}

impl AsconAead {
    /// Create a new instance of the Ascon-AEAD128 engine and run the
    /// initialization permutation.
    pub fn new(
        key: &[u8; KEY_SIZE],
        nonce: &[u8; NONCE_SIZE],
        mode: AeadMode,
        sink: Option<&mut (dyn RoundSink + '_)>,
    ) -> Self {
        let k0 = word(&key[..8]);
        let k1 = word(&key[8..]);
        let mut engine = Self {
            state: [IV, k0, k1, word(&nonce[..8]), word(&nonce[8..])],
            k0,
            k1,
            mode,
            partial: vec![],
            ad_len: 0,
            in_payload: false,
            pending_permute: false,
            trace_index: 0,
        };
        engine.permute(ROUNDS_A, sink);
        engine.state[3] ^= k0;
        engine.state[4] ^= k1;
        engine
    }

    fn permute(&mut self, rounds: usize, sink: Option<&mut (dyn RoundSink + '_)>) {
        permute_traced(&mut self.state, rounds, &mut self.trace_index, sink);
    }

    /// Absorb associated data.
    ///
    /// # Panics
    ///
    /// Panics if payload processing has already started.
    pub fn update_ad(&mut self, data: &[u8], mut sink: Option<&mut (dyn RoundSink + '_)>) {
        assert!(!self.in_payload);
        self.ad_len += data.len();
        self.partial.extend_from_slice(data);
        while self.partial.len() >= RATE {
            self.state[0] ^= word(&self.partial[..8]);
            self.state[1] ^= word(&self.partial[8..RATE]);
            self.permute(ROUNDS_B, sink.as_deref_mut());
            self.partial.drain(..RATE);
        }
    }

    /// Close the associated-data phase: absorb the padded final block if any
    /// associated data was seen, then add the domain separation bit.
    fn close_ad(&mut self, mut sink: Option<&mut (dyn RoundSink + '_)>) {
        if self.ad_len > 0 {
            let mut block = [0u8; RATE];
            block[..self.partial.len()].copy_from_slice(&self.partial);
            block[self.partial.len()] = 0x01;
            self.partial.clear();
            self.state[0] ^= word(&block[..8]);
            self.state[1] ^= word(&block[8..]);
            self.permute(ROUNDS_B, sink.as_deref_mut());
        }
        self.state[4] ^= DSEP;
        self.in_payload = true;
    }

    /// Process one full rate block of payload and return the produced output
    /// words.
    fn process_block(&mut self, block: &[u8; RATE], sink: Option<&mut (dyn RoundSink + '_)>) -> [u8; RATE] {
        if self.pending_permute {
            self.permute(ROUNDS_B, sink);
        }
        self.pending_permute = true;

        let w0 = word(&block[..8]);
        let w1 = word(&block[8..]);
        let mut out = [0u8; RATE];
        match self.mode {
            AeadMode::Encrypt => {
                self.state[0] ^= w0;
                self.state[1] ^= w1;
                out[..8].copy_from_slice(&self.state[0].to_le_bytes());
                out[8..].copy_from_slice(&self.state[1].to_le_bytes());
            }
            AeadMode::Decrypt => {
                out[..8].copy_from_slice(&(self.state[0] ^ w0).to_le_bytes());
                out[8..].copy_from_slice(&(self.state[1] ^ w1).to_le_bytes());
                self.state[0] = w0;
                self.state[1] = w1;
            }
        }
        out
    }

    /// Absorb payload bytes (plaintext when encrypting, ciphertext when
    /// decrypting) and return the output produced by any full blocks.
    pub fn update_payload(&mut self, data: &[u8], mut sink: Option<&mut (dyn RoundSink + '_)>) -> Vec<u8> {
        if !self.in_payload {
            self.close_ad(sink.as_deref_mut());
        }
        self.partial.extend_from_slice(data);
        let mut out = Vec::new();
        while self.partial.len() >= RATE {
            let block: [u8; RATE] = self.partial[..RATE].try_into().unwrap();
            out.extend_from_slice(&self.process_block(&block, sink.as_deref_mut()));
            self.partial.drain(..RATE);
        }
        out
    }

    /// Process the final (padded) payload block and run the finalization
    /// permutation. Returns the remaining output bytes and the tag.
    pub fn finalize(mut self, mut sink: Option<&mut (dyn RoundSink + '_)>) -> (Vec<u8>, [u8; TAG_SIZE]) {
        if !self.in_payload {
            self.close_ad(sink.as_deref_mut());
        }

        // The padded final block always exists, even for an empty payload,
        // but no processing permutation follows it.
        let lastlen = self.partial.len();
        debug_assert!(lastlen < RATE);
        if self.pending_permute {
            self.permute(ROUNDS_B, sink.as_deref_mut());
            self.pending_permute = false;
        }
        let mut out = Vec::with_capacity(lastlen);
        match self.mode {
            AeadMode::Encrypt => {
                let mut block = [0u8; RATE];
                block[..lastlen].copy_from_slice(&self.partial);
                block[lastlen] = 0x01;
                self.state[0] ^= word(&block[..8]);
                self.state[1] ^= word(&block[8..]);
                let mut rate_bytes = [0u8; RATE];
                rate_bytes[..8].copy_from_slice(&self.state[0].to_le_bytes());
                rate_bytes[8..].copy_from_slice(&self.state[1].to_le_bytes());
                out.extend_from_slice(&rate_bytes[..lastlen]);
            }
            AeadMode::Decrypt => {
                let mut keystream = [0u8; RATE];
                keystream[..8].copy_from_slice(&self.state[0].to_le_bytes());
                keystream[8..].copy_from_slice(&self.state[1].to_le_bytes());
                let mut padded = [0u8; RATE];
                for i in 0..lastlen {
                    padded[i] = self.partial[i] ^ keystream[i];
                }
                out.extend_from_slice(&padded[..lastlen]);
                padded[lastlen] = 0x01;
                self.state[0] ^= word(&padded[..8]);
                self.state[1] ^= word(&padded[8..]);
            }
        }

        self.state[2] ^= self.k0;
        self.state[3] ^= self.k1;
        self.permute(ROUNDS_A, sink);
        let mut tag = [0u8; TAG_SIZE];
        tag[..8].copy_from_slice(&(self.state[3] ^ self.k0).to_le_bytes());
        tag[8..].copy_from_slice(&(self.state[4] ^ self.k1).to_le_bytes());
        (out, tag)
    }
}

/// One-shot Ascon-AEAD128 encryption. Returns the ciphertext and the tag.
pub fn encrypt(
    key: &[u8; KEY_SIZE],
    nonce: &[u8; NONCE_SIZE],
    ad: &[u8],
    plaintext: &[u8],
    mut sink: Option<&mut (dyn RoundSink + '_)>,
) -> (Vec<u8>, [u8; TAG_SIZE]) {
    let mut aead = AsconAead::new(key, nonce, AeadMode::Encrypt, sink.as_deref_mut());
    aead.update_ad(ad, sink.as_deref_mut());
    let mut out = aead.update_payload(plaintext, sink.as_deref_mut());
    let (tail, tag) = aead.finalize(sink);
    out.extend_from_slice(&tail);
    (out, tag)
}

/// One-shot Ascon-AEAD128 decryption. Returns the plaintext, or `None` if
/// tag verification fails.
pub fn decrypt(
    key: &[u8; KEY_SIZE],
    nonce: &[u8; NONCE_SIZE],
    ad: &[u8],
    ciphertext: &[u8],
    tag: &[u8; TAG_SIZE],
    mut sink: Option<&mut (dyn RoundSink + '_)>,
) -> Option<Vec<u8>> {
    let mut aead = AsconAead::new(key, nonce, AeadMode::Decrypt, sink.as_deref_mut());
    aead.update_ad(ad, sink.as_deref_mut());
    let mut out = aead.update_payload(ciphertext, sink.as_deref_mut());
    let (tail, computed_tag) = aead.finalize(sink);
    out.extend_from_slice(&tail);
    if &computed_tag != tag {
        return None;
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permutation::RoundTrace;

    fn test_key() -> [u8; KEY_SIZE] {
        let mut key = [0u8; KEY_SIZE];
        for (i, b) in key.iter_mut().enumerate() {
            *b = i as u8;
        }
        key
    }

    #[test]
    fn test_empty_empty_vector() {
        // First vector of the NIST LWC_AEAD_KAT_128_128 file: key and nonce
        // both 000102...0f, no associated data, no plaintext.
        let (ct, tag) = encrypt(&test_key(), &test_key(), b"", b"", None);
        assert!(ct.is_empty());
        assert_eq!(
            hex::encode_upper(tag),
            "4427D64B8E1E1451FC445960F0839BB0"
        );
    }

    #[test]
    fn test_round_trip() {
        let key = test_key();
        let mut nonce = test_key();
        nonce[0] = 0xA5;
        for (ad_len, pt_len) in [(0, 0), (1, 1), (15, 16), (16, 17), (33, 40), (0, 64)] {
            let ad: Vec<u8> = (0..ad_len).map(|i| i as u8).collect();
            let pt: Vec<u8> = (0..pt_len).map(|i| (i * 3) as u8).collect();
            let (ct, tag) = encrypt(&key, &nonce, &ad, &pt, None);
            assert_eq!(ct.len(), pt.len());
            let recovered = decrypt(&key, &nonce, &ad, &ct, &tag, None).unwrap();
            assert_eq!(recovered, pt);
        }
    }

    #[test]
    fn test_bad_tag_rejected() {
        let key = test_key();
        let (ct, mut tag) = encrypt(&key, &key, b"header", b"payload", None);
        tag[0] ^= 1;
        assert!(decrypt(&key, &key, b"header", &ct, &tag, None).is_none());
    }

    #[test]
    fn test_wrong_ad_rejected() {
        let key = test_key();
        let (ct, tag) = encrypt(&key, &key, b"header", b"payload", None);
        assert!(decrypt(&key, &key, b"laeder", &ct, &tag, None).is_none());
    }

    #[test]
    fn test_streaming_matches_one_shot() {
        let key = test_key();
        let ad: Vec<u8> = (0..37).map(|i| i as u8).collect();
        let pt: Vec<u8> = (0..53).map(|i| (i * 7) as u8).collect();
        let (expected_ct, expected_tag) = encrypt(&key, &key, &ad, &pt, None);

        let mut aead = AsconAead::new(&key, &key, AeadMode::Encrypt, None);
        for chunk in ad.chunks(3) {
            aead.update_ad(chunk, None);
        }
        let mut ct = Vec::new();
        for chunk in pt.chunks(5) {
            ct.extend_from_slice(&aead.update_payload(chunk, None));
        }
        let (tail, tag) = aead.finalize(None);
        ct.extend_from_slice(&tail);

        assert_eq!(ct, expected_ct);
        assert_eq!(tag, expected_tag);
    }

    #[test]
    fn test_streaming_trace_matches_one_shot() {
        // One sink, reborrowed across every engine call of the operation
        let key = test_key();
        let ad: Vec<u8> = (0..21).map(|i| i as u8).collect();
        let pt: Vec<u8> = (0..45).map(|i| (i * 11) as u8).collect();
        let mut expected = RoundTrace::new();
        let (expected_ct, expected_tag) = encrypt(&key, &key, &ad, &pt, Some(&mut expected));

        let mut trace = RoundTrace::new();
        let mut aead = AsconAead::new(&key, &key, AeadMode::Encrypt, Some(&mut trace));
        for chunk in ad.chunks(7) {
            aead.update_ad(chunk, Some(&mut trace));
        }
        let mut ct = Vec::new();
        for chunk in pt.chunks(9) {
            ct.extend_from_slice(&aead.update_payload(chunk, Some(&mut trace)));
        }
        let (tail, tag) = aead.finalize(Some(&mut trace));
        ct.extend_from_slice(&tail);

        assert_eq!(ct, expected_ct);
        assert_eq!(tag, expected_tag);
        assert_eq!(trace.rounds(), expected.rounds());
    }

    #[test]
    fn test_round_record_counts() {
        let key = test_key();
        for (ad_len, pt_len) in [(0usize, 0usize), (1, 0), (16, 0), (17, 0), (0, 16), (0, 17), (24, 40)] {
            let ad = vec![0xAAu8; ad_len];
            let pt = vec![0x55u8; pt_len];
            let mut trace = RoundTrace::new();
            encrypt(&key, &key, &ad, &pt, Some(&mut trace));

            let ad_permutes = if ad_len > 0 { ad_len / RATE + 1 } else { 0 };
            let pt_permutes = pt_len / RATE;
            let expected = 2 * 12 + 8 * (ad_permutes + pt_permutes);
            assert_eq!(
                trace.rounds().len(),
                expected,
                "ad_len={ad_len} pt_len={pt_len}"
            );
            // Records are numbered contiguously
            for (i, rec) in trace.rounds().iter().enumerate() {
                assert_eq!(rec.index, i);
            }
        }
    }

    #[test]
    fn test_decrypt_trace_matches_encrypt_trace() {
        let key = test_key();
        let ad = vec![1u8; 20];
        let pt = vec![2u8; 35];
        let mut enc_trace = RoundTrace::new();
        let (ct, tag) = encrypt(&key, &key, &ad, &pt, Some(&mut enc_trace));

        let mut dec_trace = RoundTrace::new();
        decrypt(&key, &key, &ad, &ct, &tag, Some(&mut dec_trace)).unwrap();

        assert_eq!(enc_trace.rounds(), dec_trace.rounds());
    }
}
