// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use std::collections::HashMap;
use tracing::debug;
use waves_chain_exports::{BlockGraphStatus, ChainError};
use waves_models::block::Block;
use waves_models::block_id::BlockId;
use waves_validator::pos::block_score;

pub(crate) struct DagEntry {
    pub block: Block,
    /// cumulative score of the chain ending here: sum of 2^64 / base_target
    pub score: u128,
    pub invalid: bool,
    pub children: Vec<BlockId>,
}

/// The fork-choice DAG of observed blocks.
///
/// Holds every observed block whose ancestry connects to the committed
/// chain, including the committed suffix itself. The canonical tip is the
/// highest-scoring non-invalid head; score ties break on the smallest id
/// bytes so every node picks the same winner.
pub(crate) struct ForkDag {
    max_rollback: u64,
    entries: HashMap<BlockId, DagEntry>,
    /// committed canonical suffix: id -> height
    committed: HashMap<BlockId, u64>,
    committed_tip: (u64, BlockId),
}

impl ForkDag {
    pub(crate) fn new(genesis: &Block, max_rollback: u64) -> Self {
        let mut entries = HashMap::new();
        entries.insert(
            genesis.id,
            DagEntry {
                block: genesis.clone(),
                score: block_score(genesis.header.base_target),
                invalid: false,
                children: Vec::new(),
            },
        );
        let mut committed = HashMap::new();
        committed.insert(genesis.id, genesis.header.height);
        ForkDag {
            max_rollback,
            entries,
            committed,
            committed_tip: (genesis.header.height, genesis.id),
        }
    }

    pub(crate) fn committed_tip(&self) -> (u64, BlockId) {
        self.committed_tip
    }

    pub(crate) fn contains(&self, id: &BlockId) -> bool {
        self.entries.contains_key(id)
    }

    /// Insert a block whose parent is already in the graph.
    ///
    /// Returns `false` when the block was already known.
    pub(crate) fn insert(&mut self, block: Block) -> Result<bool, ChainError> {
        if self.entries.contains_key(&block.id) {
            return Ok(false);
        }
        let (parent_score, parent_invalid) = match self.entries.get_mut(&block.header.parent_id) {
            Some(parent) => {
                parent.children.push(block.id);
                (parent.score, parent.invalid)
            }
            None => return Err(ChainError::ParentUnknown),
        };
        let id = block.id;
        let score = parent_score + block_score(block.header.base_target);
        self.entries.insert(
            id,
            DagEntry {
                block,
                score,
                // a child of an invalid block can never become tip
                invalid: parent_invalid,
                children: Vec::new(),
            },
        );
        Ok(true)
    }

    /// Head of the highest-scoring eligible chain.
    pub(crate) fn best_tip(&self) -> BlockId {
        let mut best_id = self.committed_tip.1;
        let mut best_score = self
            .entries
            .get(&best_id)
            .map(|entry| entry.score)
            .unwrap_or_default();
        for (id, entry) in &self.entries {
            if entry.invalid {
                continue;
            }
            if entry.score > best_score || (entry.score == best_score && *id < best_id) {
                best_score = entry.score;
                best_id = *id;
            }
        }
        best_id
    }

    /// Walk from `target` down to the committed chain.
    ///
    /// Returns the rollback depth from the committed tip to the fork point
    /// and the forward sequence of blocks to apply, oldest first. Branches
    /// that leave the pruned window are reported as too deep.
    pub(crate) fn path_from_committed(
        &self,
        target: BlockId,
    ) -> Result<(u64, Vec<Block>), ChainError> {
        let mut forward = Vec::new();
        let mut current = target;
        let fork_height = loop {
            if let Some(height) = self.committed.get(&current) {
                break *height;
            }
            let entry = self.entries.get(&current).ok_or(ChainError::RollbackTooDeep {
                depth: self.max_rollback + 1,
                max: self.max_rollback,
            })?;
            forward.push(entry.block.clone());
            current = entry.block.header.parent_id;
        };
        forward.reverse();
        let depth = self.committed_tip.0 - fork_height;
        if depth > self.max_rollback {
            return Err(ChainError::RollbackTooDeep {
                depth,
                max: self.max_rollback,
            });
        }
        Ok((depth, forward))
    }

    /// Mark a block and every descendant ineligible.
    pub(crate) fn mark_invalid(&mut self, id: BlockId) {
        let mut queue = vec![id];
        while let Some(current) = queue.pop() {
            if let Some(entry) = self.entries.get_mut(&current) {
                if entry.invalid {
                    continue;
                }
                entry.invalid = true;
                queue.extend(entry.children.iter().copied());
            }
        }
        debug!("marked {} and descendants invalid", id);
    }

    /// Record a committed reorganization step and prune stale entries.
    pub(crate) fn on_commit(&mut self, rolled_back: &[BlockId], applied: &[(u64, BlockId)]) {
        for id in rolled_back {
            self.committed.remove(id);
        }
        for (height, id) in applied {
            self.committed.insert(*id, *height);
            self.committed_tip = (*height, *id);
        }
        self.prune();
    }

    /// Record an administrative rollback. The removed blocks leave the graph
    /// entirely so fork choice does not re-apply them.
    pub(crate) fn on_admin_rollback(&mut self, removed: &[BlockId], new_tip: (u64, BlockId)) {
        for id in removed {
            self.committed.remove(id);
            if let Some(entry) = self.entries.remove(id) {
                for child in entry.children {
                    self.mark_invalid(child);
                }
            }
        }
        self.committed_tip = new_tip;
    }

    fn prune(&mut self) {
        // keep a margin past the reorganization window so a branch forking
        // right at the edge is still scored (and rejected) explicitly
        let threshold = self
            .committed_tip
            .0
            .saturating_sub(self.max_rollback.saturating_mul(2));
        self.entries
            .retain(|_, entry| entry.block.header.height >= threshold);
        self.committed.retain(|_, height| *height >= threshold);
    }

    pub(crate) fn status(&self, id: &BlockId) -> BlockGraphStatus {
        if self.committed.contains_key(id) {
            return BlockGraphStatus::Canonical;
        }
        match self.entries.get(id) {
            Some(entry) if entry.invalid => BlockGraphStatus::Invalid,
            Some(_) => BlockGraphStatus::Branch,
            None => BlockGraphStatus::Unknown,
        }
    }
}
