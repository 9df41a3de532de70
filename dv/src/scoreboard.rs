/*++

Licensed under the Apache-2.0 license.

File Name:

    scoreboard.rs

Abstract:

    File contains the differential scoreboards. The result scoreboard pairs
    whole-operation outputs against the reference model in order; the round
    scoreboard pairs per-round permutation snapshots collected from the
    core's trace tap against a reference trace.

--*/

use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, Sender};

use ascon_emu_crypto::{encrypt, RoundRecord, RoundSink, RoundTrace, KEY_SIZE, NONCE_SIZE};
use ascon_hw_model::OpResult;

use crate::VerifyError;

/// Pairs observed operation results against an in-order expected queue.
#[derive(Default)]
pub struct ResultScoreboard {
    expected: VecDeque<OpResult>,
}

impl ResultScoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the reference result for the next operation
    pub fn expect(&mut self, expected: OpResult) {
        self.expected.push_back(expected);
    }

    /// Check an observed result against the front of the expected queue
    pub fn observe(&mut self, actual: &OpResult) -> Result<(), VerifyError> {
        let expected = self
            .expected
            .pop_front()
            .ok_or(VerifyError::UnexpectedOperation)?;
        if actual.output != expected.output {
            return Err(VerifyError::Mismatch {
                field: "output",
                expected: hex::encode(&expected.output),
                actual: hex::encode(&actual.output),
            });
        }
        if actual.tag != expected.tag {
            return Err(VerifyError::Mismatch {
                field: "tag",
                expected: hex::encode(expected.tag),
                actual: hex::encode(actual.tag),
            });
        }
        Ok(())
    }

    /// Verify that every expected result was observed
    pub fn finish(self) -> Result<(), VerifyError> {
        if self.expected.is_empty() {
            Ok(())
        } else {
            Err(VerifyError::MissingOperation)
        }
    }
}

/// A trace tap handed to the core; forwards round records to the round
/// scoreboard's channel.
pub struct RoundTap(Sender<RoundRecord>);

impl RoundSink for RoundTap {
    fn record(&mut self, rec: RoundRecord) {
        // The scoreboard may be dropped before the core
        let _ = self.0.send(rec);
    }
}

/// Pairs round records observed through a [`RoundTap`] against a reference
/// trace, strictly in order.
pub struct RoundScoreboard {
    expected: VecDeque<RoundRecord>,
    observed: Receiver<RoundRecord>,

    /// Last observed record that matched, for mismatch diffs
    prev: Option<RoundRecord>,
}

impl RoundScoreboard {
    /// Create a scoreboard and the tap to hand to the core under test
    pub fn new() -> (Self, RoundTap) {
        let (tx, rx) = mpsc::channel();
        (
            Self {
                expected: VecDeque::new(),
                observed: rx,
                prev: None,
            },
            RoundTap(tx),
        )
    }

    /// Queue the reference trace for one operation. Decrypt traces are
    /// identical to the encrypt trace of the matching plaintext.
    pub fn expect_operation(
        &mut self,
        key: &[u8; KEY_SIZE],
        nonce: &[u8; NONCE_SIZE],
        ad: &[u8],
        plaintext: &[u8],
    ) {
        let mut trace = RoundTrace::new();
        encrypt(key, nonce, ad, plaintext, Some(&mut trace));
        self.expected.extend(trace.into_rounds());
    }

    pub fn expected_len(&self) -> usize {
        self.expected.len()
    }

    /// Pair every observed record received so far against the expected
    /// queue. Returns the number of records checked; both queues must run
    /// dry together.
    pub fn drain(&mut self) -> Result<usize, VerifyError> {
        let mut checked = 0;
        loop {
            match (self.expected.pop_front(), self.observed.try_recv()) {
                (None, Err(_)) => return Ok(checked),
                (Some(exp), Err(_)) => return Err(VerifyError::MissingRound { index: exp.index }),
                (None, Ok(obs)) => return Err(VerifyError::UnexpectedRound { index: obs.index }),
                (Some(exp), Ok(obs)) => {
                    self.check(&exp, &obs)?;
                    checked += 1;
                }
            }
        }
    }

    fn check(&mut self, exp: &RoundRecord, obs: &RoundRecord) -> Result<(), VerifyError> {
        if obs.index != exp.index || obs.round != exp.round {
            return Err(VerifyError::Mismatch {
                field: "round sequence",
                expected: format!("record {} round {}", exp.index, exp.round),
                actual: format!("record {} round {}", obs.index, obs.round),
            });
        }
        let layers = [
            ("addition", exp.add_state, obs.add_state),
            ("substitution", exp.sub_state, obs.sub_state),
            ("diffusion", exp.diff_state, obs.diff_state),
        ];
        for (layer, e, o) in layers {
            if e != o {
                let mut diff_expected = [0u64; 5];
                let mut diff_previous = [0u64; 5];
                let prev = self.prev.map(|p| match layer {
                    "addition" => p.add_state,
                    "substitution" => p.sub_state,
                    _ => p.diff_state,
                });
                for i in 0..5 {
                    diff_expected[i] = o[i] ^ e[i];
                    diff_previous[i] = o[i] ^ prev.map(|p| p[i]).unwrap_or(0);
                }
                return Err(VerifyError::RoundMismatch {
                    index: obs.index,
                    layer,
                    diff_expected,
                    diff_previous,
                });
            }
        }
        self.prev = Some(*obs);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> [u8; KEY_SIZE] {
        let mut key = [0u8; KEY_SIZE];
        for (i, b) in key.iter_mut().enumerate() {
            *b = i as u8;
        }
        key
    }

    #[test]
    fn test_result_scoreboard_pass() {
        let mut sb = ResultScoreboard::new();
        let result = OpResult {
            output: vec![1, 2, 3],
            tag: [0xAA; 16],
        };
        sb.expect(result.clone());
        sb.observe(&result).unwrap();
        sb.finish().unwrap();
    }

    #[test]
    fn test_result_scoreboard_tag_mismatch() {
        let mut sb = ResultScoreboard::new();
        sb.expect(OpResult {
            output: vec![],
            tag: [0xAA; 16],
        });
        let err = sb
            .observe(&OpResult {
                output: vec![],
                tag: [0xAB; 16],
            })
            .unwrap_err();
        assert!(matches!(err, VerifyError::Mismatch { field: "tag", .. }));
    }

    #[test]
    fn test_result_scoreboard_missing() {
        let mut sb = ResultScoreboard::new();
        sb.expect(OpResult {
            output: vec![],
            tag: [0; 16],
        });
        assert_eq!(sb.finish().unwrap_err(), VerifyError::MissingOperation);

        let mut sb = ResultScoreboard::new();
        let err = sb
            .observe(&OpResult {
                output: vec![],
                tag: [0; 16],
            })
            .unwrap_err();
        assert_eq!(err, VerifyError::UnexpectedOperation);
    }

    #[test]
    fn test_round_scoreboard_pass() {
        let (mut sb, mut tap) = RoundScoreboard::new();
        let key = test_key();
        sb.expect_operation(&key, &key, b"ad bytes", b"payload bytes");

        // Feed the tap from the same reference model
        encrypt(&key, &key, b"ad bytes", b"payload bytes", Some(&mut tap));
        let checked = sb.drain().unwrap();
        assert_eq!(checked, 2 * 12 + 8);
    }

    #[test]
    fn test_round_scoreboard_missing_round() {
        let (mut sb, _tap) = RoundScoreboard::new();
        let key = test_key();
        sb.expect_operation(&key, &key, b"", b"");
        assert_eq!(
            sb.drain().unwrap_err(),
            VerifyError::MissingRound { index: 0 }
        );
    }

    #[test]
    fn test_round_scoreboard_corrupt_state() {
        let (mut sb, mut tap) = RoundScoreboard::new();
        let key = test_key();
        sb.expect_operation(&key, &key, b"", b"");

        let mut trace = RoundTrace::new();
        encrypt(&key, &key, b"", b"", Some(&mut trace));
        for (i, mut rec) in trace.into_rounds().into_iter().enumerate() {
            if i == 15 {
                rec.sub_state[2] ^= 0x4000;
            }
            tap.record(rec);
        }
        match sb.drain().unwrap_err() {
            VerifyError::RoundMismatch {
                index,
                layer,
                diff_expected,
                ..
            } => {
                assert_eq!(index, 15);
                assert_eq!(layer, "substitution");
                assert_eq!(diff_expected, [0, 0, 0x4000, 0, 0]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
