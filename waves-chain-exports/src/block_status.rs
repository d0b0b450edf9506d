// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use serde::{Deserialize, Serialize};

/// Where a block currently sits in the fork-choice graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockGraphStatus {
    /// on the committed canonical chain
    Canonical,
    /// observed and valid so far, on a competing branch
    Branch,
    /// parked waiting for its parent
    Orphan,
    /// failed validation, or descends from a block that did
    Invalid,
    /// never observed
    Unknown,
}
