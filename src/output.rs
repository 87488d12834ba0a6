use std::{
    io::Write as _,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use anyhow::Context as _;
use image::RgbaImage;

use crate::error::{StitchError, StitchResult};

/// Intermediate artifact name, created in the working directory and removed
/// after the final output is in place.
pub const TEMP_FILE: &str = "temp.png";

#[derive(Clone, Debug)]
pub struct FinishOptions {
    pub out_path: PathBuf,
    /// Run pngquant on the temp artifact, capping the palette at 256 colors.
    pub reduce: bool,
}

/// Seam for the overwrite confirmation so the pipeline stays testable
/// without a terminal.
pub trait OverwritePrompt {
    /// Asked once when the output path already exists. `false` aborts the
    /// run cleanly with no filesystem changes.
    fn confirm_overwrite(&mut self, path: &Path) -> StitchResult<bool>;
}

/// Reads a y/n answer from stdin.
pub struct StdinPrompt;

impl OverwritePrompt for StdinPrompt {
    fn confirm_overwrite(&mut self, path: &Path) -> StitchResult<bool> {
        eprint!("File {} already exists. Overwrite? (y/n) ", path.display());
        std::io::stderr().flush().context("flush prompt")?;

        let mut answer = String::new();
        std::io::stdin()
            .read_line(&mut answer)
            .context("read overwrite answer")?;
        Ok(answer.trim().eq_ignore_ascii_case("y"))
    }
}

/// Persists the canvas at `opts.out_path`.
///
/// The canvas is always written to [`TEMP_FILE`] first and only then moved
/// (or pngquant-compressed) into place, so a failing post-process step never
/// leaves a partial file at the final path.
pub fn finish(
    canvas: &RgbaImage,
    opts: &FinishOptions,
    prompt: &mut dyn OverwritePrompt,
) -> StitchResult<()> {
    if opts.out_path.exists() {
        if !prompt.confirm_overwrite(&opts.out_path)? {
            return Err(StitchError::Cancelled);
        }
        std::fs::remove_file(&opts.out_path)
            .with_context(|| format!("remove existing '{}'", opts.out_path.display()))?;
    }

    ensure_parent_dir(&opts.out_path)?;

    let temp = PathBuf::from(TEMP_FILE);
    canvas
        .save_with_format(&temp, image::ImageFormat::Png)
        .map_err(|e| StitchError::decode(format!("write temp png '{}': {e}", temp.display())))?;

    if opts.reduce {
        tracing::info!("reducing file size with pngquant");
        // On failure the temp artifact is left behind as a diagnostic.
        run_pngquant(&temp, &opts.out_path)?;
    } else {
        move_into_place(&temp, &opts.out_path)?;
    }

    // Best-effort cleanup; the temp file is already gone on the no-reduce path.
    if temp.exists() {
        let _ = std::fs::remove_file(&temp);
    }

    Ok(())
}

pub fn ensure_parent_dir(path: &Path) -> StitchResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

fn run_pngquant(temp: &Path, out: &Path) -> StitchResult<()> {
    let output = Command::new("pngquant")
        .arg("256")
        .arg("-o")
        .arg(out)
        .arg(temp)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| {
            StitchError::post_process(format!(
                "failed to spawn pngquant (is it installed and on PATH?): {e}"
            ))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(StitchError::post_process(format!(
            "pngquant exited with status {}: {}",
            output.status,
            stderr.trim()
        )));
    }
    Ok(())
}

/// `rename` with a copy+remove fallback for cross-filesystem moves.
fn move_into_place(temp: &Path, out: &Path) -> StitchResult<()> {
    if std::fs::rename(temp, out).is_ok() {
        return Ok(());
    }
    std::fs::copy(temp, out)
        .with_context(|| format!("move '{}' to '{}'", temp.display(), out.display()))?;
    std::fs::remove_file(temp)
        .with_context(|| format!("remove temp file '{}'", temp.display()))?;
    Ok(())
}
