use crate::{
    collect::collect_images,
    compose::{ComposeOptions, compose_grid},
    config::StitchConfig,
    error::StitchResult,
    output::{FinishOptions, OverwritePrompt, finish},
};

/// Runs the whole pipeline: collect inputs, compose the grid canvas, persist
/// it. Data flows strictly forward; any failure aborts the run.
#[tracing::instrument(skip(cfg, prompt), fields(dir = %cfg.input_dir.display()))]
pub fn stitch(cfg: &StitchConfig, prompt: &mut dyn OverwritePrompt) -> StitchResult<()> {
    cfg.validate()?;

    let files = collect_images(&cfg.input_dir, &cfg.grid)?;

    let opts = ComposeOptions {
        grid: cfg.grid,
        fill: cfg.fill.as_deref(),
        color_key: cfg.apply_color_key.then_some(cfg.color_key),
        decode: cfg.decode,
    };
    let canvas = compose_grid(&files, &opts)?;

    finish(
        &canvas,
        &FinishOptions {
            out_path: cfg.output.clone(),
            reduce: cfg.reduce,
        },
        prompt,
    )
}
