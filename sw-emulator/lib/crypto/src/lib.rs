/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the Ascon Emulator Crypto library.

--*/

mod aead;
mod permutation;

pub use aead::{
    decrypt, encrypt, AeadMode, AsconAead, IV, KEY_SIZE, NONCE_SIZE, RATE, TAG_SIZE,
};
pub use permutation::{
    permute, permute_traced, RoundRecord, RoundSink, RoundTrace, MAX_ROUNDS, STATE_WORDS,
};
