use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use gridstitch::{
    ColorKey, GridSpec, OverwritePrompt, StitchConfig, StitchError, StitchResult,
    compose::{ComposeOptions, compose_grid},
};
use image::RgbaImage;

// `stitch` writes its temp artifact in the working directory, so tests that
// run the full pipeline are serialized.
static PIPELINE_LOCK: Mutex<()> = Mutex::new(());

struct Always(bool);

impl OverwritePrompt for Always {
    fn confirm_overwrite(&mut self, _path: &Path) -> StitchResult<bool> {
        Ok(self.0)
    }
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("pipeline_tests").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_png(path: &Path, width: u32, height: u32, rgba: [u8; 4]) {
    RgbaImage::from_pixel(width, height, image::Rgba(rgba))
        .save_with_format(path, image::ImageFormat::Png)
        .unwrap();
}

fn base_config(input_dir: &Path, output: &Path) -> StitchConfig {
    StitchConfig {
        input_dir: input_dir.to_path_buf(),
        output: output.to_path_buf(),
        ..StitchConfig::default()
    }
}

#[test]
fn three_images_on_a_2x2_grid_land_row_major() {
    let dir = scratch_dir("row_major");
    write_png(&dir.join("a.png"), 4, 4, [10, 0, 0, 255]);
    write_png(&dir.join("b.png"), 4, 4, [0, 20, 0, 255]);
    write_png(&dir.join("c.png"), 4, 4, [0, 0, 30, 255]);

    let files = vec![dir.join("a.png"), dir.join("b.png"), dir.join("c.png")];
    let opts = ComposeOptions {
        grid: GridSpec::new(2, 2),
        fill: None,
        color_key: None,
        decode: Default::default(),
    };
    let canvas = compose_grid(&files, &opts).unwrap();

    assert_eq!(canvas.dimensions(), (8, 8));
    assert_eq!(canvas.get_pixel(0, 0).0, [10, 0, 0, 255]);
    assert_eq!(canvas.get_pixel(4, 0).0, [0, 20, 0, 255]);
    assert_eq!(canvas.get_pixel(0, 4).0, [0, 0, 30, 255]);
    // The fourth cell of the sparse grid stays fully transparent.
    assert_eq!(canvas.get_pixel(4, 4).0, [0, 0, 0, 0]);
    assert_eq!(canvas.get_pixel(7, 7).0, [0, 0, 0, 0]);
}

#[test]
fn chroma_key_turns_exact_matches_transparent() {
    let dir = scratch_dir("chroma_key");
    let mut img = RgbaImage::from_pixel(2, 1, image::Rgba([255, 0, 228, 255]));
    img.put_pixel(1, 0, image::Rgba([255, 0, 227, 255]));
    img.save_with_format(dir.join("a.png"), image::ImageFormat::Png)
        .unwrap();

    let opts = ComposeOptions {
        grid: GridSpec::new(1, 1),
        fill: None,
        color_key: Some(ColorKey::MAGENTA),
        decode: Default::default(),
    };
    let canvas = compose_grid(&[dir.join("a.png")], &opts).unwrap();

    assert_eq!(canvas.get_pixel(0, 0).0, [0, 0, 0, 0]);
    // Off-by-one colors are not keyed out.
    assert_eq!(canvas.get_pixel(1, 0).0, [255, 0, 227, 255]);
}

#[test]
fn fill_shows_through_keyed_and_transparent_source_pixels() {
    let dir = scratch_dir("fill_layering");
    let mut img = RgbaImage::from_pixel(2, 2, image::Rgba([1, 2, 3, 255]));
    img.put_pixel(1, 0, image::Rgba([255, 0, 228, 255]));
    img.save_with_format(dir.join("a.png"), image::ImageFormat::Png)
        .unwrap();

    let fill_path = dir.join("fill.png");
    write_png(&fill_path, 2, 2, [40, 50, 60, 255]);

    let opts = ComposeOptions {
        grid: GridSpec::new(1, 2),
        fill: Some(&fill_path),
        color_key: Some(ColorKey::MAGENTA),
        decode: Default::default(),
    };
    let canvas = compose_grid(&[dir.join("a.png")], &opts).unwrap();

    // Opaque source pixels win over the fill.
    assert_eq!(canvas.get_pixel(0, 0).0, [1, 2, 3, 255]);
    // Keyed-out pixels expose the fill underneath.
    assert_eq!(canvas.get_pixel(1, 0).0, [40, 50, 60, 255]);
    // Fill is painted only for occupied indices; the empty trailing cell
    // stays transparent.
    assert_eq!(canvas.get_pixel(2, 0).0, [0, 0, 0, 0]);
    assert_eq!(canvas.get_pixel(3, 1).0, [0, 0, 0, 0]);
}

#[test]
fn stitched_output_reads_back_with_exact_canvas_dimensions() {
    let _guard = PIPELINE_LOCK.lock().unwrap();
    let dir = scratch_dir("round_trip");
    write_png(&dir.join("a.png"), 3, 7, [1, 1, 1, 255]);
    write_png(&dir.join("b.png"), 5, 2, [2, 2, 2, 255]);

    let out = dir.join("out").join("sheet.png");
    let mut cfg = base_config(&dir, &out);
    cfg.grid = GridSpec::new(3, 2);

    gridstitch::stitch(&cfg, &mut Always(true)).unwrap();

    // Cell size is 7, so the canvas is (2*7, 3*7).
    let written = image::open(&out).unwrap();
    assert_eq!(written.width(), 14);
    assert_eq!(written.height(), 21);
    assert!(!Path::new("temp.png").exists());
}

#[test]
fn empty_input_directory_is_rejected_before_any_output() {
    let _guard = PIPELINE_LOCK.lock().unwrap();
    let dir = scratch_dir("reject_empty");
    let out = dir.join("out.png");

    let err = gridstitch::stitch(&base_config(&dir, &out), &mut Always(true)).unwrap_err();
    assert!(matches!(err, StitchError::Configuration(_)));
    assert!(!out.exists());
}

#[test]
fn five_images_on_a_2x2_grid_are_rejected() {
    let _guard = PIPELINE_LOCK.lock().unwrap();
    let dir = scratch_dir("reject_capacity");
    for i in 0..5 {
        write_png(&dir.join(format!("{i}.png")), 2, 2, [1, 1, 1, 255]);
    }
    let out = dir.join("out.png");
    let mut cfg = base_config(&dir, &out);
    cfg.grid = GridSpec::new(2, 2);

    let err = gridstitch::stitch(&cfg, &mut Always(true)).unwrap_err();
    assert!(matches!(err, StitchError::Configuration(_)));
    assert!(!out.exists());
}

#[test]
fn declining_overwrite_leaves_the_first_output_byte_identical() {
    let _guard = PIPELINE_LOCK.lock().unwrap();
    let dir = scratch_dir("idempotent_decline");
    write_png(&dir.join("a.png"), 2, 2, [7, 7, 7, 255]);
    let out = dir.join("out.png");
    let cfg = base_config(&dir, &out);

    gridstitch::stitch(&cfg, &mut Always(true)).unwrap();
    let first = std::fs::read(&out).unwrap();

    let err = gridstitch::stitch(&cfg, &mut Always(false)).unwrap_err();
    assert!(matches!(err, StitchError::Cancelled));
    assert_eq!(std::fs::read(&out).unwrap(), first);
}

#[test]
fn undecodable_input_aborts_with_no_final_output() {
    let _guard = PIPELINE_LOCK.lock().unwrap();
    let dir = scratch_dir("reject_undecodable");
    write_png(&dir.join("a.png"), 2, 2, [1, 1, 1, 255]);
    std::fs::write(dir.join("b.png"), b"not a png").unwrap();

    let out = dir.join("out.png");
    let err = gridstitch::stitch(&base_config(&dir, &out), &mut Always(true)).unwrap_err();
    assert!(matches!(err, StitchError::Decode(_)));
    assert!(!out.exists());
}
