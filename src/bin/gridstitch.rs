use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::Parser;
use gridstitch::{ColorKey, GridSpec, StdinPrompt, StitchConfig, StitchError};

#[derive(Parser, Debug)]
#[command(name = "gridstitch", version, about = "Tile a directory of PNGs into one grid sheet")]
struct Cli {
    /// Directory containing the input images.
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// Output file path. Relative paths resolve against the executable's
    /// directory.
    #[arg(long, default_value = "output.png")]
    out: PathBuf,

    /// Optional fill image, painted behind every cell.
    #[arg(long)]
    fill: Option<PathBuf>,

    /// Reduce the output file size with pngquant (requires `pngquant` on PATH).
    #[arg(long)]
    reduce: bool,

    /// Log each image placement.
    #[arg(long)]
    verbose: bool,

    /// RGB color key.
    #[arg(long, num_args = 3, value_names = ["R", "G", "B"], default_values_t = [255, 0, 228])]
    colorkey: Vec<u8>,

    /// Turn pixels matching the color key fully transparent.
    #[arg(long)]
    process_colorkey: bool,

    /// Number of grid rows.
    #[arg(long, default_value_t = 10)]
    grid_rows: u32,

    /// Number of grid columns.
    #[arg(long, default_value_t = 10)]
    grid_cols: u32,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::INFO
        } else {
            tracing::Level::WARN
        })
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(out) => {
            eprintln!("wrote {}", out.display());
            ExitCode::SUCCESS
        }
        Err(StitchError::Cancelled) => {
            eprintln!("Exiting without overwriting existing file.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<PathBuf, StitchError> {
    let output = resolve_out_path(&cli.out);

    let cfg = StitchConfig {
        input_dir: cli.dir,
        output: output.clone(),
        fill: cli.fill,
        reduce: cli.reduce,
        color_key: ColorKey::new(cli.colorkey[0], cli.colorkey[1], cli.colorkey[2]),
        apply_color_key: cli.process_colorkey,
        grid: GridSpec::new(cli.grid_rows, cli.grid_cols),
        decode: Default::default(),
    };

    gridstitch::stitch(&cfg, &mut StdinPrompt)?;
    Ok(output)
}

/// Relative output paths land next to the executable, not in the working
/// directory.
fn resolve_out_path(out: &Path) -> PathBuf {
    if out.is_absolute() {
        return out.to_path_buf();
    }
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(out)))
        .unwrap_or_else(|| out.to_path_buf())
}
