// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use crate::settings::GenesisSettings;
use std::str::FromStr;
use waves_hash::Hash;
use waves_models::address::Address;
use waves_models::amount::Amount;
use waves_models::block::{Block, BlockHeader};
use waves_models::block_id::BlockId;
use waves_models::config::BLOCK_REWARD;
use waves_models::scheme::Scheme;
use waves_models::ModelsError;
use waves_signature::KeyPair;
use waves_time::WavesTime;

/// Build the deterministic genesis block and the initial balance sheet from
/// the settings. Every node of a network derives the identical block.
pub fn build_genesis(
    scheme: Scheme,
    settings: &GenesisSettings,
) -> Result<(Block, Vec<(Address, Amount)>), ModelsError> {
    let keypair = KeyPair::from_str(&settings.secret)?;
    let seed = Hash::compute_from_tuple(&[
        b"waves-genesis".as_slice(),
        &[scheme.to_byte()],
        &settings.timestamp.to_be_bytes(),
    ]);
    let vrf_proof = keypair.sign(&seed)?;
    let header = BlockHeader {
        height: 1,
        timestamp: WavesTime::from_millis(settings.timestamp),
        parent_id: BlockId(Hash::compute_from(&[scheme.to_byte()])),
        base_target: settings.base_target,
        generation_signature: seed,
        vrf_proof,
        features: Vec::new(),
        reward: BLOCK_REWARD,
        generator: keypair.get_public_key(),
        state_root: None,
    };
    let genesis = Block::new_signed(header, Vec::new(), &keypair)?;

    let mut initial_balances = Vec::with_capacity(settings.initial_balances.len());
    for entry in &settings.initial_balances {
        let address = Address::from_str(&entry.address)?;
        let amount = Amount::from_str(&entry.amount)?;
        initial_balances.push((address, amount));
    }
    Ok((genesis, initial_balances))
}
