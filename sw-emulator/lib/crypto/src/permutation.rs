/*++

Licensed under the Apache-2.0 license.

File Name:

    permutation.rs

Abstract:

    File contains implementation of the 320-bit Ascon permutation with
    optional per-round state tracing.

--*/

/// Number of words in the Ascon state
pub const STATE_WORDS: usize = 5;

/// Total rounds in the full permutation schedule
pub const MAX_ROUNDS: usize = 12;

/// Snapshot of the permutation state after each sub-layer of one round.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RoundRecord {
    /// Sequence number of this record within the current operation
    pub index: usize,

    /// Absolute round number in `0..12`
    pub round: usize,

    /// State after the round constant addition
    pub add_state: [u64; STATE_WORDS],

    /// State after the substitution layer
    pub sub_state: [u64; STATE_WORDS],

    /// State after the linear diffusion layer
    pub diff_state: [u64; STATE_WORDS],
}

/// Receives one [`RoundRecord`] per permutation round.
pub trait RoundSink {
    fn record(&mut self, rec: RoundRecord);
}

/// A [`RoundSink`] that collects records into a vector.
#[derive(Default)]
pub struct RoundTrace {
    rounds: Vec<RoundRecord>,
}

impl RoundTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rounds(&self) -> &[RoundRecord] {
        &self.rounds
    }

    pub fn into_rounds(self) -> Vec<RoundRecord> {
        self.rounds
    }
}

impl RoundSink for RoundTrace {
    fn record(&mut self, rec: RoundRecord) {
        self.rounds.push(rec);
    }
}

/// Apply `rounds` rounds of the Ascon permutation to `state`.
pub fn permute(state: &mut [u64; STATE_WORDS], rounds: usize) {
    permute_traced(state, rounds, &mut 0, None);
}

/// Apply `rounds` rounds of the Ascon permutation to `state`, reporting one
/// [`RoundRecord`] per round to `sink`. `index` numbers the records and is
/// advanced across calls, so a multi-permutation operation yields one
/// contiguous sequence.
///
/// # Panics
///
/// Panics if `rounds > 12`.
pub fn permute_traced(
    state: &mut [u64; STATE_WORDS],
    rounds: usize,
    index: &mut usize,
    mut sink: Option<&mut (dyn RoundSink + '_)>,
) {
    assert!(rounds <= MAX_ROUNDS);
    let s = state;
    for r in (MAX_ROUNDS - rounds)..MAX_ROUNDS {
        // Round constant addition
        s[2] ^= (0xF0 - r * 0x10 + r) as u64;
        let add_state = *s;

        // Substitution layer
        s[0] ^= s[4];
        s[4] ^= s[3];
        s[2] ^= s[1];
        let t = [
            !s[0] & s[1],
            !s[1] & s[2],
            !s[2] & s[3],
            !s[3] & s[4],
            !s[4] & s[0],
        ];
        for i in 0..STATE_WORDS {
            s[i] ^= t[(i + 1) % STATE_WORDS];
        }
        s[1] ^= s[0];
        s[0] ^= s[4];
        s[3] ^= s[2];
        s[2] = !s[2];
        let sub_state = *s;

        // Linear diffusion layer
        s[0] ^= s[0].rotate_right(19) ^ s[0].rotate_right(28);
        s[1] ^= s[1].rotate_right(61) ^ s[1].rotate_right(39);
        s[2] ^= s[2].rotate_right(1) ^ s[2].rotate_right(6);
        s[3] ^= s[3].rotate_right(10) ^ s[3].rotate_right(17);
        s[4] ^= s[4].rotate_right(7) ^ s[4].rotate_right(41);
        let diff_state = *s;

        if let Some(sink) = sink.as_deref_mut() {
            sink.record(RoundRecord {
                index: *index,
                round: r,
                add_state,
                sub_state,
                diff_state,
            });
            *index += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_does_not_change_state() {
        let mut plain = [0x0123456789abcdefu64, 0xfedcba9876543210, 0, 1, u64::MAX];
        let mut traced = plain;
        let mut trace = RoundTrace::new();

        permute(&mut plain, 12);
        permute_traced(&mut traced, 12, &mut 0, Some(&mut trace));

        assert_eq!(plain, traced);
        assert_eq!(trace.rounds().len(), 12);
    }

    #[test]
    fn test_round_numbering() {
        let mut state = [0u64; STATE_WORDS];
        let mut trace = RoundTrace::new();
        let mut index = 7;
        permute_traced(&mut state, 8, &mut index, Some(&mut trace));

        assert_eq!(index, 15);
        let rounds: Vec<usize> = trace.rounds().iter().map(|r| r.round).collect();
        assert_eq!(rounds, vec![4, 5, 6, 7, 8, 9, 10, 11]);
        let indices: Vec<usize> = trace.rounds().iter().map(|r| r.index).collect();
        assert_eq!(indices, (7..15).collect::<Vec<_>>());
    }

    #[test]
    fn test_add_state_touches_word_two_only() {
        let state_in = [5u64, 6, 7, 8, 9];
        let mut state = state_in;
        let mut trace = RoundTrace::new();
        permute_traced(&mut state, 1, &mut 0, Some(&mut trace));

        let rec = trace.rounds()[0];
        assert_eq!(rec.round, 11);
        assert_eq!(rec.add_state[0], state_in[0]);
        assert_eq!(rec.add_state[1], state_in[1]);
        assert_eq!(rec.add_state[2], state_in[2] ^ 0x4b);
        assert_eq!(rec.add_state[3], state_in[3]);
        assert_eq!(rec.add_state[4], state_in[4]);
        assert_eq!(rec.diff_state, state);
    }

    #[test]
    fn test_permutation_is_deterministic() {
        let mut a = [1u64, 2, 3, 4, 5];
        let mut b = [1u64, 2, 3, 4, 5];
        permute(&mut a, 6);
        permute(&mut b, 6);
        assert_eq!(a, b);
        // A 6-round schedule runs rounds 6..12
        let mut trace = RoundTrace::new();
        let mut c = [1u64, 2, 3, 4, 5];
        permute_traced(&mut c, 6, &mut 0, Some(&mut trace));
        assert_eq!(trace.rounds()[0].round, 6);
        assert_eq!(trace.rounds()[5].round, 11);
    }

    #[test]
    #[should_panic]
    fn test_too_many_rounds() {
        let mut state = [0u64; STATE_WORDS];
        permute(&mut state, 13);
    }
}
