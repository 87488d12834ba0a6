use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    config::GridSpec,
    error::{StitchError, StitchResult},
};

/// Enumerates the `.png` files directly under `dir`, sorted lexicographically
/// by path. The sort order determines grid placement, so it must be stable
/// across runs on the same directory contents.
///
/// Fails with a configuration error if no file matches or if the count
/// exceeds the grid capacity. File contents are not opened here.
pub fn collect_images(dir: &Path, grid: &GridSpec) -> StitchResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("read input directory '{}'", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("scan input directory '{}'", dir.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        // Same filter as a `*.png` glob: the lowercase extension only.
        if path.extension().and_then(|e| e.to_str()) == Some("png") {
            files.push(path);
        }
    }
    files.sort();

    if files.is_empty() {
        return Err(StitchError::configuration(format!(
            "no input images found in '{}'",
            dir.display()
        )));
    }

    let capacity = grid.capacity();
    if files.len() as u64 > capacity {
        return Err(StitchError::configuration(format!(
            "{} images exceed the grid capacity of {} ({}x{})",
            files.len(),
            capacity,
            grid.rows,
            grid.cols
        )));
    }

    Ok(files)
}
