use crate::domain::EnrichedRecord;
use anyhow::Context;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub fn output_path_for(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "holdings".to_string());
    output_dir.join(format!("{stem}_enriched.csv"))
}

/// Output path for every input, in order. Two inputs that would write the
/// same file are rejected before anything runs.
pub fn output_paths(inputs: &[PathBuf], output_dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();
    let mut out = Vec::with_capacity(inputs.len());

    for input in inputs {
        let path = output_path_for(input, output_dir);
        if let Some(previous) = claimed.insert(path.clone(), input) {
            anyhow::bail!(
                "{} and {} would both write {}",
                previous.display(),
                input.display(),
                path.display()
            );
        }
        out.push(path);
    }
    Ok(out)
}

pub fn to_csv_bytes(records: &[EnrichedRecord]) -> anyhow::Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer
            .serialize(record)
            .with_context(|| format!("failed to serialize record for {}", record.isin))?;
    }
    writer
        .into_inner()
        .map_err(|err| anyhow::anyhow!("failed to flush csv writer: {err}"))
}

/// Writes all records at once. The file only appears under its final name
/// after it is fully written; a failed write leaves nothing behind.
pub fn write_enriched(path: &Path, records: &[EnrichedRecord]) -> anyhow::Result<()> {
    let bytes = to_csv_bytes(records)?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let res = std::fs::write(&tmp, &bytes)
        .with_context(|| format!("failed to write {}", tmp.display()))
        .and_then(|()| {
            std::fs::rename(&tmp, path)
                .with_context(|| format!("failed to move {} into place", path.display()))
        });

    if res.is_err() {
        if let Err(err) = std::fs::remove_file(&tmp) {
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %tmp.display(), error = %err, "failed to remove temp output");
            }
        }
    }
    res
}
