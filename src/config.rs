use std::path::PathBuf;

use crate::error::{StitchError, StitchResult};

/// An RGB value treated as "make transparent" during composition.
///
/// Matching is exact equality on the RGB components; the source pixel's own
/// alpha is ignored for the comparison. There is no tolerance or fuzz.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorKey {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl ColorKey {
    /// The conventional magenta transparency key, (255, 0, 228).
    pub const MAGENTA: ColorKey = ColorKey {
        r: 255,
        g: 0,
        b: 228,
    };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn matches_rgb(&self, px: [u8; 4]) -> bool {
        px[0] == self.r && px[1] == self.g && px[2] == self.b
    }
}

impl Default for ColorKey {
    fn default() -> Self {
        Self::MAGENTA
    }
}

/// Grid geometry. Capacity (rows × cols) bounds how many images fit.
#[derive(Clone, Copy, Debug)]
pub struct GridSpec {
    pub rows: u32,
    pub cols: u32,
}

impl GridSpec {
    pub fn new(rows: u32, cols: u32) -> Self {
        Self { rows, cols }
    }

    pub fn validate(&self) -> StitchResult<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(StitchError::configuration(
                "grid rows/cols must be non-zero",
            ));
        }
        Ok(())
    }

    pub fn capacity(&self) -> u64 {
        u64::from(self.rows) * u64::from(self.cols)
    }
}

impl Default for GridSpec {
    fn default() -> Self {
        Self { rows: 10, cols: 10 }
    }
}

/// Per-decode leniency, passed explicitly into every decode call rather than
/// held as process-wide state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DecodePolicy {
    /// Lift the decoder's resource limits. Default, to accept inputs the
    /// stricter default limits would reject.
    #[default]
    Permissive,
    /// Keep the decoder's default resource limits.
    Strict,
}

/// Full configuration for one stitch run.
#[derive(Clone, Debug)]
pub struct StitchConfig {
    /// Directory scanned (non-recursively) for `.png` inputs.
    pub input_dir: PathBuf,
    /// Final output path, taken verbatim by the library.
    pub output: PathBuf,
    /// Optional background image, resized once to the cell size and painted
    /// behind every occupied cell.
    pub fill: Option<PathBuf>,
    /// Run pngquant on the result to cap the palette at 256 colors.
    pub reduce: bool,
    pub color_key: ColorKey,
    /// The key is only applied when this is set.
    pub apply_color_key: bool,
    pub grid: GridSpec,
    pub decode: DecodePolicy,
}

impl StitchConfig {
    pub fn validate(&self) -> StitchResult<()> {
        self.grid.validate()
    }
}

impl Default for StitchConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            output: PathBuf::from("output.png"),
            fill: None,
            reduce: false,
            color_key: ColorKey::default(),
            apply_color_key: false,
            grid: GridSpec::default(),
            decode: DecodePolicy::default(),
        }
    }
}
