/*++

Licensed under the Apache-2.0 license.

File Name:

    differential.rs

Abstract:

    File contains differential tests: the register-level stack against the
    reference model, at whole-operation granularity and at per-round
    granularity through the core trace tap.

--*/

use ascon_dv::{OpGenerator, ResultScoreboard, RoundScoreboard};
use ascon_emu_crypto::{encrypt, RATE};
use ascon_hw_model::{
    HwModel, InitParams, ModelEmulated, OpResult, Operation, RegisterLayout, StreamAdapter,
};

fn test_key() -> [u8; 16] {
    let mut key = [0u8; 16];
    for (i, b) in key.iter_mut().enumerate() {
        *b = i as u8;
    }
    key
}

fn make_op(ad: Vec<u8>, payload: Vec<u8>, delay: u32) -> Operation {
    Operation {
        key: test_key(),
        nonce: test_key(),
        ad,
        payload,
        decrypt: false,
        delay,
    }
}

/// Full cross product of AD and payload lengths over two rate blocks,
/// checked with the round scoreboard so a divergence is pinned to the first
/// bad round.
#[test]
fn test_length_sweep_per_round() {
    let (mut scoreboard, tap) = RoundScoreboard::new();
    let mut model = ModelEmulated::init(InitParams {
        trace: Some(Box::new(tap)),
        ..Default::default()
    })
    .unwrap();
    let mut adapter = StreamAdapter::new(RegisterLayout::default());
    let mut results = ResultScoreboard::new();

    for ad_len in 0..32usize {
        for pt_len in 0..32usize {
            let ad: Vec<u8> = (0..ad_len).map(|i| i as u8).collect();
            let pt: Vec<u8> = (0..pt_len).map(|i| (i * 7) as u8).collect();
            let op = make_op(ad.clone(), pt.clone(), 0);

            let (expected_ct, expected_tag) =
                encrypt(&op.key, &op.nonce, &ad, &pt, None);
            results.expect(OpResult {
                output: expected_ct,
                tag: expected_tag,
            });
            scoreboard.expect_operation(&op.key, &op.nonce, &ad, &pt);

            let result = adapter.run(&mut model.apb_bus(), &op).unwrap();
            results.observe(&result).unwrap();

            let ad_permutes = if ad_len > 0 { ad_len / RATE + 1 } else { 0 };
            let pt_permutes = pt_len / RATE;
            let checked = scoreboard.drain().unwrap();
            assert_eq!(
                checked,
                2 * 12 + 8 * (ad_permutes + pt_permutes),
                "ad={ad_len} pt={pt_len}"
            );
        }
    }
    results.finish().unwrap();
}

/// Empty associated data contributes no processing permutations at all
#[test]
fn test_round_count_without_ad() {
    let (mut scoreboard, tap) = RoundScoreboard::new();
    let mut model = ModelEmulated::init(InitParams {
        trace: Some(Box::new(tap)),
        ..Default::default()
    })
    .unwrap();
    let mut adapter = StreamAdapter::new(RegisterLayout::default());

    let op = make_op(vec![], vec![0x5A; 40], 0);
    scoreboard.expect_operation(&op.key, &op.nonce, &op.ad, &op.payload);
    adapter.run(&mut model.apb_bus(), &op).unwrap();
    assert_eq!(scoreboard.drain().unwrap(), 2 * 12 + 8 * (40 / RATE));
}

/// Seeded random operations through the full stack, compared against the
/// reference model.
#[test]
fn test_random_stimulus() {
    let mut gen = OpGenerator::new([0x42u8; 32]);
    let mut model = ModelEmulated::init(InitParams::default()).unwrap();
    let mut adapter = StreamAdapter::new(RegisterLayout::default());
    let mut results = ResultScoreboard::new();

    for _ in 0..25 {
        let op = gen.next_op();
        let (expected_ct, expected_tag) =
            encrypt(&op.key, &op.nonce, &op.ad, &op.payload, None);
        results.expect(OpResult {
            output: expected_ct,
            tag: expected_tag,
        });
        let result = adapter.run(&mut model.apb_bus(), &op).unwrap();
        results.observe(&result).unwrap();
    }
    results.finish().unwrap();
}

/// Decrypting the core's own ciphertext recovers the plaintext and the tag
#[test]
fn test_encrypt_decrypt_round_trip() {
    let mut model = ModelEmulated::init(InitParams::default()).unwrap();
    let mut adapter = StreamAdapter::new(RegisterLayout::default());

    let enc = make_op(b"round trip ad".to_vec(), b"round trip payload, over a block".to_vec(), 3);
    let encrypted = adapter.run(&mut model.apb_bus(), &enc).unwrap();

    let mut dec = enc.clone();
    dec.payload = encrypted.output;
    dec.decrypt = true;
    let decrypted = adapter.run(&mut model.apb_bus(), &dec).unwrap();
    assert_eq!(decrypted.output, enc.payload);
    assert_eq!(decrypted.tag, encrypted.tag);
}
