// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use std::collections::{HashSet, VecDeque};
use tracing::debug;
use waves_models::block::Block;
use waves_models::block_id::BlockId;

/// Bounded buffer of peer blocks waiting for their parent.
///
/// The oldest entry is evicted when the buffer is full; an evicted orphan is
/// simply re-fetched later if its branch matters.
pub(crate) struct OrphanBuffer {
    capacity: usize,
    blocks: VecDeque<Block>,
    ids: HashSet<BlockId>,
}

impl OrphanBuffer {
    pub(crate) fn new(capacity: usize) -> Self {
        OrphanBuffer {
            capacity,
            blocks: VecDeque::with_capacity(capacity),
            ids: HashSet::new(),
        }
    }

    pub(crate) fn contains(&self, id: &BlockId) -> bool {
        self.ids.contains(id)
    }

    pub(crate) fn push(&mut self, block: Block) {
        if self.ids.contains(&block.id) {
            return;
        }
        if self.blocks.len() == self.capacity {
            if let Some(evicted) = self.blocks.pop_front() {
                self.ids.remove(&evicted.id);
                debug!("orphan buffer full, evicted {}", evicted.id);
            }
        }
        self.ids.insert(block.id);
        self.blocks.push_back(block);
    }

    /// Remove and return every orphan whose parent is `parent_id`.
    pub(crate) fn take_children(&mut self, parent_id: &BlockId) -> Vec<Block> {
        let mut children = Vec::new();
        let mut kept = VecDeque::with_capacity(self.blocks.len());
        while let Some(block) = self.blocks.pop_front() {
            if block.header.parent_id == *parent_id {
                self.ids.remove(&block.id);
                children.push(block);
            } else {
                kept.push_back(block);
            }
        }
        self.blocks = kept;
        children
    }

    pub(crate) fn len(&self) -> usize {
        self.blocks.len()
    }
}
