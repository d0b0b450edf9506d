// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use super::tools::ChainHarness;
use crate::{validate_block, TxValidationError, ValidationError};
use waves_hash::Hash;
use waves_models::address::Address;
use waves_models::amount::Amount;
use waves_signature::KeyPair;
use waves_state_exports::{BlockDiff, StateReader, StateStore};
use waves_time::WavesTime;

#[test]
fn linear_chain_validates_and_moves_funds() {
    let harness = ChainHarness::new();
    let recipient =
        Address::from_public_key(harness.scheme, &KeyPair::generate().get_public_key());
    let transfer = harness.transfer(recipient, 2_00000000, 100_000);

    let block2 = harness.build_child(&harness.genesis, vec![transfer]);
    harness.validate_and_commit(&block2).unwrap();
    let block3 = harness.build_child(&block2, Vec::new());
    harness.validate_and_commit(&block3).unwrap();

    let snapshot = harness.store.snapshot();
    assert_eq!(snapshot.tip().unwrap(), (3, block3.id));
    assert_eq!(snapshot.balance(&recipient), Amount::from_raw(2_00000000));
}

#[test]
fn verdict_is_deterministic() {
    let harness = ChainHarness::new();
    let block2 = harness.build_child(&harness.genesis, Vec::new());
    let snapshot = harness.store.snapshot();
    let first = validate_block(
        harness.scheme,
        &block2,
        snapshot.as_ref(),
        harness.far_now(),
    )
    .unwrap();
    let second = validate_block(
        harness.scheme,
        &block2,
        snapshot.as_ref(),
        harness.far_now(),
    )
    .unwrap();
    assert_eq!(first.transaction_ids, second.transaction_ids);
    assert_eq!(first.balances, second.balances);
}

#[test]
fn parent_mismatch_is_rejected() {
    let harness = ChainHarness::new();
    let block2 = harness.build_child(&harness.genesis, Vec::new());
    harness.validate_and_commit(&block2).unwrap();
    // a second child of genesis no longer matches the tip
    let stale = harness.build_child(&harness.genesis, Vec::new());
    let snapshot = harness.store.snapshot();
    assert!(matches!(
        validate_block(harness.scheme, &stale, snapshot.as_ref(), harness.far_now()),
        Err(ValidationError::ParentMismatch)
    ));
}

#[test]
fn tampered_producer_signature_is_rejected() {
    let harness = ChainHarness::new();
    let mut block2 = harness.build_child(&harness.genesis, Vec::new());
    block2.header.reward = Amount::from_raw(1);
    let snapshot = harness.store.snapshot();
    assert!(matches!(
        validate_block(harness.scheme, &block2, snapshot.as_ref(), harness.far_now()),
        Err(ValidationError::BadSignature)
    ));
}

#[test]
fn foreign_vrf_proof_is_rejected() {
    let harness = ChainHarness::new();
    let block2 = harness.build_child(&harness.genesis, Vec::new());
    let intruder = KeyPair::generate();
    // keep the header self-consistent but prove with the wrong key
    let mut header = block2.header.clone();
    header.vrf_proof = intruder
        .sign(&harness.genesis.header.generation_signature)
        .unwrap();
    let forged =
        waves_models::block::Block::new_signed(header, Vec::new(), &harness.keypair).unwrap();
    let snapshot = harness.store.snapshot();
    assert!(matches!(
        validate_block(harness.scheme, &forged, snapshot.as_ref(), harness.far_now()),
        Err(ValidationError::BadVrf)
    ));
}

#[test]
fn timestamp_window_is_enforced() {
    let harness = ChainHarness::new();
    let block2 = harness.build_child(&harness.genesis, Vec::new());
    let snapshot = harness.store.snapshot();

    // not a millisecond past the parent
    let mut header = block2.header.clone();
    header.timestamp = harness.genesis.header.timestamp;
    let too_old =
        waves_models::block::Block::new_signed(header, Vec::new(), &harness.keypair).unwrap();
    assert!(matches!(
        validate_block(
            harness.scheme,
            &too_old,
            snapshot.as_ref(),
            harness.far_now()
        ),
        Err(ValidationError::TimestampOutOfWindow)
    ));

    // beyond now + drift
    let now_before_block = WavesTime::from_millis(
        harness.genesis.header.timestamp.to_millis() + 1_000,
    );
    assert!(matches!(
        validate_block(harness.scheme, &block2, snapshot.as_ref(), now_before_block),
        Err(ValidationError::TimestampOutOfWindow)
    ));
}

#[test]
fn wrong_base_target_is_rejected() {
    let harness = ChainHarness::new();
    let block2 = harness.build_child(&harness.genesis, Vec::new());
    let mut header = block2.header.clone();
    header.base_target += 1;
    let forged =
        waves_models::block::Block::new_signed(header, Vec::new(), &harness.keypair).unwrap();
    let snapshot = harness.store.snapshot();
    assert!(matches!(
        validate_block(harness.scheme, &forged, snapshot.as_ref(), harness.far_now()),
        Err(ValidationError::BaseTargetWrong)
    ));
}

#[test]
fn generating_balance_boundary_is_exactly_one_thousand() {
    let harness = ChainHarness::new();
    let latecomer = KeyPair::generate();
    let latecomer_address =
        Address::from_public_key(harness.scheme, &latecomer.get_public_key());

    // the chain is committed straight through the store; only the candidates
    // below run the validator. Height 2 funds the latecomer, nothing else
    // touches its balance.
    let mut tip = harness.genesis.clone();
    for height in 2..=1000u64 {
        let block = harness.build_child(&tip, Vec::new());
        let mut diff = BlockDiff::default();
        if height == 2 {
            diff.balances
                .insert(latecomer_address, Amount::from_raw(10_000_00000000));
        }
        harness.commit_unchecked(&block, diff);
        tip = block;
    }

    // a candidate at height 1001 measures the balance at height 1, one block
    // before the funding arrived
    let too_early = harness.build_child_signed_by(&tip, Vec::new(), &latecomer);
    let snapshot = harness.store.snapshot();
    assert!(matches!(
        validate_block(
            harness.scheme,
            &too_early,
            snapshot.as_ref(),
            harness.far_now()
        ),
        Err(ValidationError::GeneratorIneligible)
    ));

    // one block later the candidate at height 1002 measures height 2 exactly
    let filler = harness.build_child(&tip, Vec::new());
    harness.commit_unchecked(&filler, BlockDiff::default());
    let on_time = harness.build_child_signed_by(&filler, Vec::new(), &latecomer);
    let snapshot = harness.store.snapshot();
    validate_block(
        harness.scheme,
        &on_time,
        snapshot.as_ref(),
        harness.far_now(),
    )
    .unwrap();
}

#[test]
fn unfunded_generator_is_ineligible() {
    let harness = ChainHarness::new();
    let pauper = KeyPair::generate();
    let block2 = harness.build_child_signed_by(&harness.genesis, Vec::new(), &pauper);
    let snapshot = harness.store.snapshot();
    assert!(matches!(
        validate_block(harness.scheme, &block2, snapshot.as_ref(), harness.far_now()),
        Err(ValidationError::GeneratorIneligible)
    ));
}

#[test]
fn overspending_transaction_poisons_the_block() {
    let harness = ChainHarness::new();
    let recipient =
        Address::from_public_key(harness.scheme, &KeyPair::generate().get_public_key());
    // fixture funds are 10_000 tokens
    let transfer = harness.transfer(recipient, 1_000_000_00000000, 100_000);
    let block2 = harness.build_child(&harness.genesis, vec![transfer]);
    let snapshot = harness.store.snapshot();
    assert!(matches!(
        validate_block(harness.scheme, &block2, snapshot.as_ref(), harness.far_now()),
        Err(ValidationError::TxRuleViolated {
            kind: TxValidationError::InsufficientFunds,
            ..
        })
    ));
}

#[test]
fn duplicated_transaction_in_block_is_rejected() {
    let harness = ChainHarness::new();
    let recipient =
        Address::from_public_key(harness.scheme, &KeyPair::generate().get_public_key());
    let transfer = harness.transfer(recipient, 1_00000000, 100_000);
    let block2 = harness.build_child(&harness.genesis, vec![transfer.clone(), transfer]);
    let snapshot = harness.store.snapshot();
    assert!(matches!(
        validate_block(harness.scheme, &block2, snapshot.as_ref(), harness.far_now()),
        Err(ValidationError::TxRuleViolated {
            kind: TxValidationError::AlreadyConfirmed,
            ..
        })
    ));
}

#[test]
fn declared_state_root_must_match() {
    let harness = ChainHarness::new();
    let block2 = harness.build_child(&harness.genesis, Vec::new());
    let mut header = block2.header.clone();
    header.state_root = Some(Hash::compute_from(b"not-the-root"));
    let forged =
        waves_models::block::Block::new_signed(header, Vec::new(), &harness.keypair).unwrap();
    let snapshot = harness.store.snapshot();
    assert!(matches!(
        validate_block(harness.scheme, &forged, snapshot.as_ref(), harness.far_now()),
        Err(ValidationError::StateRootMismatch)
    ));
}

#[test]
fn validation_never_writes() {
    let harness = ChainHarness::new();
    let recipient =
        Address::from_public_key(harness.scheme, &KeyPair::generate().get_public_key());
    let transfer = harness.transfer(recipient, 2_00000000, 100_000);
    let block2 = harness.build_child(&harness.genesis, vec![transfer]);
    let snapshot = harness.store.snapshot();
    validate_block(harness.scheme, &block2, snapshot.as_ref(), harness.far_now()).unwrap();
    // the store is untouched until the applier commits the diff
    let after = harness.store.snapshot();
    assert_eq!(after.tip().unwrap(), (1, harness.genesis.id));
    assert_eq!(after.balance(&recipient), Amount::ZERO);
}
