use std::path::{Path, PathBuf};

use anyhow::Context as _;
use image::{ImageReader, RgbaImage, imageops};

use crate::{
    composite,
    config::{ColorKey, DecodePolicy, GridSpec},
    error::{StitchError, StitchResult},
};

/// Compositor inputs. `color_key` is `Some` only when keying is both
/// configured and enabled.
#[derive(Clone, Debug)]
pub struct ComposeOptions<'a> {
    pub grid: GridSpec,
    pub fill: Option<&'a Path>,
    pub color_key: Option<ColorKey>,
    pub decode: DecodePolicy,
}

/// The uniform square cell size: max(width, height) over every input.
///
/// A single linear pass of header-only dimension probes; nothing is fully
/// decoded here.
pub fn cell_size(files: &[PathBuf]) -> StitchResult<u32> {
    let mut max_size = 0u32;
    for path in files {
        let (width, height) = probe_dimensions(path)?;
        max_size = max_size.max(width.max(height));
    }
    Ok(max_size)
}

/// Builds the full grid canvas: a transparent RGBA buffer of
/// (cols × cell, rows × cell), with each input pasted into its row-major
/// cell, fill layer first when configured.
pub fn compose_grid(files: &[PathBuf], opts: &ComposeOptions<'_>) -> StitchResult<RgbaImage> {
    let cell = cell_size(files)?;

    let width = opts.grid.cols.checked_mul(cell).ok_or_else(|| {
        StitchError::configuration(format!(
            "canvas width overflows: {} cols x {cell} px cells",
            opts.grid.cols
        ))
    })?;
    let height = opts.grid.rows.checked_mul(cell).ok_or_else(|| {
        StitchError::configuration(format!(
            "canvas height overflows: {} rows x {cell} px cells",
            opts.grid.rows
        ))
    })?;

    let mut canvas = RgbaImage::new(width, height);

    // The fill image is decoded and resized exactly once, then reused
    // read-only for every occupied cell.
    let fill = match opts.fill {
        Some(path) => {
            let img = decode_rgba(path, opts.decode)?;
            Some(imageops::resize(&img, cell, cell, imageops::FilterType::CatmullRom))
        }
        None => None,
    };

    for (i, path) in files.iter().enumerate() {
        let col = i as u32 % opts.grid.cols;
        let row = i as u32 / opts.grid.cols;
        let x = col * cell;
        let y = row * cell;

        tracing::info!("pasting {} at ({x}, {y})", path.display());

        // Decode handle is scoped to this iteration; at most one source
        // image is held alongside the canvas and fill at any time.
        let mut img = decode_rgba(path, opts.decode)?;
        if let Some(key) = opts.color_key {
            composite::key_out_color(&mut img, key);
        }

        if let Some(fill) = &fill {
            composite::paste_replace(&mut canvas, fill, x, y)?;
        }
        composite::paste_over(&mut canvas, &img, x, y)?;
    }

    Ok(canvas)
}

fn probe_dimensions(path: &Path) -> StitchResult<(u32, u32)> {
    let reader = ImageReader::open(path)
        .with_context(|| format!("open image '{}'", path.display()))?;
    reader.into_dimensions().map_err(|e| {
        StitchError::decode(format!("read dimensions of '{}': {e}", path.display()))
    })
}

fn decode_rgba(path: &Path, policy: DecodePolicy) -> StitchResult<RgbaImage> {
    let mut reader = ImageReader::open(path)
        .with_context(|| format!("open image '{}'", path.display()))?;
    if policy == DecodePolicy::Permissive {
        reader.no_limits();
    }
    let img = reader
        .decode()
        .map_err(|e| StitchError::decode(format!("decode '{}': {e}", path.display())))?;
    Ok(img.to_rgba8())
}
