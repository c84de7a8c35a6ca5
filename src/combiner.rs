//! @ai:module:intent Shard combination for previously recorded CSV files
//! @ai:module:layer application
//! @ai:module:public_api combine_shards, shard_paths
//! @ai:module:stateless true

use crate::recorder::{read_records, ResultRecord};
use anyhow::Result;
use std::path::{Path, PathBuf};

/// @ai:intent Concatenate shard files into one record sequence, keeping
///            caller order across shards and on-disk order within each.
///            An unreadable shard is warned about and skipped, never fatal.
///            conversation_id values are not resequenced across shards.
/// @ai:effects fs:read
pub fn combine_shards(paths: &[PathBuf]) -> Result<Vec<ResultRecord>> {
    let mut combined = Vec::new();

    for path in paths {
        match read_records(path) {
            Ok(records) => {
                tracing::info!("Read {}: {} rows", path.display(), records.len());
                combined.extend(records);
            }
            Err(e) => {
                tracing::warn!("Skipping shard {}: {:#}", path.display(), e);
            }
        }
    }

    tracing::info!("Combined total: {} rows", combined.len());
    Ok(combined)
}

/// @ai:intent Expand sequentially numbered shard names under a directory,
///            e.g. prefix "claude_b" and count 10 gives claude_b1.csv
///            through claude_b10.csv
/// @ai:effects pure
pub fn shard_paths(dir: &Path, prefix: &str, count: u32) -> Vec<PathBuf> {
    (1..=count)
        .map(|i| dir.join(format!("{prefix}{i}.csv")))
        .collect()
}
