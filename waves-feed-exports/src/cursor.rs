// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use crate::error::FeedError;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use waves_models::block_id::BlockId;

/// The durable resumption anchor of the L2 feed.
///
/// Persisted with write-then-rename so a crash never leaves a torn cursor;
/// whatever height was last acknowledged survives the restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedCursor {
    /// last delivered and acknowledged height
    pub last_delivered_height: u64,
    /// id of the block at that height
    pub last_delivered_block_id: BlockId,
}

impl FeedCursor {
    /// Load the cursor, `None` when no subscriber ever acknowledged.
    pub fn load(path: &Path) -> Result<Option<FeedCursor>, FeedError> {
        match std::fs::read(path) {
            Ok(bytes) => {
                let cursor = serde_json::from_slice(&bytes)
                    .map_err(|err| FeedError::CursorPersistence(err.to_string()))?;
                Ok(Some(cursor))
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(FeedError::CursorPersistence(err.to_string())),
        }
    }

    /// Persist the cursor atomically.
    pub fn store(&self, path: &Path) -> Result<(), FeedError> {
        let bytes = serde_json::to_vec_pretty(self)
            .map_err(|err| FeedError::CursorPersistence(err.to_string()))?;
        let tmp_path = path.with_extension("tmp");
        let mut file = std::fs::File::create(&tmp_path)
            .map_err(|err| FeedError::CursorPersistence(err.to_string()))?;
        file.write_all(&bytes)
            .map_err(|err| FeedError::CursorPersistence(err.to_string()))?;
        file.sync_all()
            .map_err(|err| FeedError::CursorPersistence(err.to_string()))?;
        std::fs::rename(&tmp_path, path)
            .map_err(|err| FeedError::CursorPersistence(err.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waves_hash::Hash;

    #[test]
    fn cursor_round_trips_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cursor.json");
        assert_eq!(FeedCursor::load(&path).unwrap(), None);

        let cursor = FeedCursor {
            last_delivered_height: 100,
            last_delivered_block_id: BlockId(Hash::compute_from(b"b100")),
        };
        cursor.store(&path).unwrap();
        assert_eq!(FeedCursor::load(&path).unwrap(), Some(cursor));

        let updated = FeedCursor {
            last_delivered_height: 101,
            ..cursor
        };
        updated.store(&path).unwrap();
        assert_eq!(FeedCursor::load(&path).unwrap(), Some(updated));
    }
}
