// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>
//! Proof-of-stake arithmetic: base target retargeting, generation signature
//! chaining, the signature-based VRF and the eligibility hit test.

use waves_hash::Hash;
use waves_models::amount::Amount;
use waves_models::block::BlockHeader;
use waves_models::config::{
    BASE_TARGET_MAX_ADJUST_PERCENT, BASE_TARGET_WINDOW, BLOCK_TARGET_INTERVAL,
};
use waves_signature::{PublicKey, Signature, WavesSignatureError};

/// Verify a VRF proof against the generator key and the parent generation
/// signature, returning the randomness output.
///
/// The proof is the generator's deterministic signature over the parent
/// generation signature; the output is the digest of the proof bytes.
pub fn verify_vrf(
    generator: &PublicKey,
    prev_gen_sig: &Hash,
    proof: &Signature,
) -> Result<Hash, WavesSignatureError> {
    generator.verify_signature(prev_gen_sig, proof)?;
    Ok(Hash::compute_from(&proof.to_bytes()))
}

/// Chain the generation signature: `H(prev_gen_sig || vrf_output)`.
pub fn next_generation_signature(prev_gen_sig: &Hash, vrf_output: &Hash) -> Hash {
    Hash::compute_from_tuple(&[prev_gen_sig.to_bytes(), vrf_output.to_bytes()])
}

/// Base target the next block must declare, derived from the trailing window
/// of block timings.
///
/// `recent` holds up to [`BASE_TARGET_WINDOW`] headers in ascending height
/// order, ending at the parent. The parent's target is scaled by the ratio of
/// the observed average interval to the 60 s target, clamped to
/// ±[`BASE_TARGET_MAX_ADJUST_PERCENT`] % per block and kept non-zero.
pub fn expected_base_target(recent: &[BlockHeader]) -> u64 {
    let parent = match recent.last() {
        Some(header) => header,
        None => return 1,
    };
    let parent_target = parent.base_target.max(1);
    let window = recent.len().min(BASE_TARGET_WINDOW as usize);
    if window < 2 {
        return parent_target;
    }
    let first = &recent[recent.len() - window];
    let span_ms = parent
        .timestamp
        .saturating_sub(first.timestamp)
        .to_millis();
    let intervals = (window - 1) as u64;
    let average_ms = span_ms / intervals;

    let scaled = (parent_target as u128)
        .saturating_mul(average_ms as u128)
        / (BLOCK_TARGET_INTERVAL.to_millis() as u128);
    let floor = (parent_target as u128) * (100 - BASE_TARGET_MAX_ADJUST_PERCENT) as u128 / 100;
    let ceiling = (parent_target as u128) * (100 + BASE_TARGET_MAX_ADJUST_PERCENT) as u128 / 100;
    scaled.clamp(floor.max(1), ceiling.max(1)) as u64
}

/// The hit: the first 8 bytes of the VRF output as a big-endian integer.
pub fn hit(vrf_output: &Hash) -> u64 {
    let bytes = vrf_output.to_bytes();
    u64::from_be_bytes([
        bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
    ])
}

/// The eligibility condition: `hit < base_target * balance_tokens * Δt`.
///
/// Balance enters in whole tokens and the time delta in milliseconds, scaled
/// back to seconds inside the product.
pub fn is_eligible(hit: u64, base_target: u64, generating_balance: Amount, delta_ms: u64) -> bool {
    let tokens = (generating_balance.to_raw() / 100_000_000) as u128;
    let target = (base_target as u128)
        .saturating_mul(tokens)
        .saturating_mul(delta_ms as u128)
        / 1000;
    (hit as u128) < target
}

/// Cumulative chain score contribution of one block: `2^64 / base_target`.
pub fn block_score(base_target: u64) -> u128 {
    (u64::MAX as u128 + 1) / (base_target.max(1) as u128)
}

#[cfg(test)]
mod tests {
    use super::*;
    use waves_models::block::BlockHeader;
    use waves_models::block_id::BlockId;
    use waves_models::config::BLOCK_REWARD;
    use waves_signature::KeyPair;
    use waves_time::WavesTime;

    fn headers_with_intervals(base_target: u64, interval_ms: u64, count: usize) -> Vec<BlockHeader> {
        let keypair = KeyPair::generate();
        let vrf_proof = keypair.sign(&Hash::compute_from(b"seed")).unwrap();
        (0..count)
            .map(|i| BlockHeader {
                height: i as u64 + 1,
                timestamp: WavesTime::from_millis(1_700_000_000_000 + i as u64 * interval_ms),
                parent_id: BlockId(Hash::compute_from(b"parent")),
                base_target,
                generation_signature: Hash::compute_from(b"gen"),
                vrf_proof,
                features: Vec::new(),
                reward: BLOCK_REWARD,
                generator: keypair.get_public_key(),
                state_root: None,
            })
            .collect()
    }

    #[test]
    fn on_schedule_timing_keeps_target() {
        let recent = headers_with_intervals(1000, 60_000, 10);
        assert_eq!(expected_base_target(&recent), 1000);
    }

    #[test]
    fn fast_blocks_lower_target_clamped() {
        // blocks coming twice as fast: raw retarget would halve, the clamp
        // limits the step to 10%
        let recent = headers_with_intervals(1000, 30_000, 10);
        assert_eq!(expected_base_target(&recent), 900);
    }

    #[test]
    fn slow_blocks_raise_target_clamped() {
        let recent = headers_with_intervals(1000, 120_000, 10);
        assert_eq!(expected_base_target(&recent), 1100);
    }

    #[test]
    fn vrf_round_trip_and_tamper() {
        let keypair = KeyPair::generate();
        let prev = Hash::compute_from(b"prev-gen-sig");
        let proof = keypair.sign(&prev).unwrap();
        let output = verify_vrf(&keypair.get_public_key(), &prev, &proof).unwrap();
        assert_eq!(output, Hash::compute_from(&proof.to_bytes()));

        let other = KeyPair::generate();
        assert!(verify_vrf(&other.get_public_key(), &prev, &proof).is_err());
    }

    #[test]
    fn eligibility_scales_with_balance() {
        let output = Hash::compute_from(b"vrf-output");
        let h = hit(&output);
        // an enormous balance passes, a zero balance cannot
        assert!(is_eligible(
            h,
            u64::MAX,
            Amount::from_raw(u64::MAX),
            60_000
        ));
        assert!(!is_eligible(h, 1000, Amount::ZERO, 60_000));
    }
}
