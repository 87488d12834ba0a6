use image::RgbaImage;

use crate::{
    config::ColorKey,
    error::{StitchError, StitchResult},
};

pub type Rgba8 = [u8; 4];

/// Source-over compositing for straight (non-premultiplied) RGBA8, the
/// representation PNG decode hands us and the canvas keeps.
pub fn over(dst: Rgba8, src: Rgba8) -> Rgba8 {
    let sa = u32::from(src[3]);
    if sa == 0 {
        return dst;
    }
    if sa == 255 {
        return src;
    }

    let da = u32::from(dst[3]);
    let inv = 255 - sa;

    // Alpha scaled by 255 so the color divide below stays in integers.
    let oa255 = sa * 255 + da * inv;
    if oa255 == 0 {
        return [0, 0, 0, 0];
    }

    let mut out = [0u8; 4];
    out[3] = ((oa255 + 127) / 255) as u8;
    for i in 0..3 {
        let sc = u32::from(src[i]);
        let dc = u32::from(dst[i]);
        out[i] = ((sc * sa * 255 + dc * da * inv + oa255 / 2) / oa255) as u8;
    }
    out
}

/// Replaces every pixel whose RGB components exactly equal `key` with a fully
/// transparent pixel. Existing alpha is ignored for the comparison; every
/// other pixel passes through unchanged.
pub fn key_out_color(img: &mut RgbaImage, key: ColorKey) {
    for px in img.pixels_mut() {
        if key.matches_rgb(px.0) {
            px.0 = [0, 0, 0, 0];
        }
    }
}

/// Copies `src` into `dst` at (x, y), overwriting whatever is there. Used for
/// the fill layer, which always covers its cell opaquely regardless of the
/// source image's own transparency.
pub fn paste_replace(dst: &mut RgbaImage, src: &RgbaImage, x: u32, y: u32) -> StitchResult<()> {
    check_bounds(dst, src, x, y)?;
    for (row, src_row) in src.rows().enumerate() {
        for (col, px) in src_row.enumerate() {
            dst.put_pixel(x + col as u32, y + row as u32, *px);
        }
    }
    Ok(())
}

/// Composites `src` onto `dst` at (x, y) using the source's own alpha as the
/// paste mask: alpha=0 pixels leave the canvas untouched, alpha=255 pixels
/// fully replace, anything between blends source-over.
pub fn paste_over(dst: &mut RgbaImage, src: &RgbaImage, x: u32, y: u32) -> StitchResult<()> {
    check_bounds(dst, src, x, y)?;
    for (row, src_row) in src.rows().enumerate() {
        for (col, px) in src_row.enumerate() {
            let d = dst.get_pixel_mut(x + col as u32, y + row as u32);
            d.0 = over(d.0, px.0);
        }
    }
    Ok(())
}

fn check_bounds(dst: &RgbaImage, src: &RgbaImage, x: u32, y: u32) -> StitchResult<()> {
    let fits_x = x.checked_add(src.width()).is_some_and(|end| end <= dst.width());
    let fits_y = y.checked_add(src.height()).is_some_and(|end| end <= dst.height());
    if !fits_x || !fits_y {
        return Err(StitchError::configuration(format!(
            "paste of {}x{} at ({x}, {y}) exceeds the {}x{} canvas",
            src.width(),
            src.height(),
            dst.width(),
            dst.height()
        )));
    }
    Ok(())
}
