use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::assemble::index::BatchIndexes;
use crate::assemble::record::CanonicalProductRecord;

pub const INDEX_FILE: &str = "_index.json";
pub const ASIN_MAP_FILE: &str = "_asin_map.json";
pub const CATEGORY_INDEX_FILE: &str = "_category_index.json";

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let body = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {:?}", path))?;
    fs::write(path, body).with_context(|| format!("Failed to write {:?}", path))
}

/// Write every record under its handle and its identifier, then the three
/// batch indexes. Returns the number of files written.
pub fn write_batch(
    out_dir: &Path,
    records: &[CanonicalProductRecord],
    indexes: &BatchIndexes,
) -> Result<usize> {
    fs::create_dir_all(out_dir).with_context(|| format!("Failed to create {:?}", out_dir))?;

    let mut written = 0;
    for r in records {
        write_json(&out_dir.join(format!("{}.json", r.handle)), r)?;
        write_json(&out_dir.join(format!("{}.json", r.asin)), r)?;
        written += 2;
    }

    write_json(&out_dir.join(INDEX_FILE), &indexes.products)?;
    write_json(&out_dir.join(ASIN_MAP_FILE), &indexes.asin_map)?;
    write_json(&out_dir.join(CATEGORY_INDEX_FILE), &indexes.categories)?;
    written += 3;

    info!(dir = ?out_dir, records = records.len(), files = written, "wrote batch");
    Ok(written)
}
