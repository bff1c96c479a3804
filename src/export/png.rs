use std::io::Cursor;
use std::path::Path;

use anyhow::Context;

use crate::assets::decode::unpremultiply_rgba8_in_place;
use crate::foundation::error::{DpError, DpResult};
use crate::render::cpu::FrameRGBA;

/// Name prefix used when the attendee left their name empty.
pub const ANONYMOUS_PREFIX: &str = "My";

/// Download name for a composite: `{attendee}-DP-{frame}.png`.
///
/// Path separators are replaced so the result is always a single file name.
pub fn export_file_name(attendee_name: &str, frame_name: &str) -> String {
    let attendee = attendee_name.trim();
    let attendee = if attendee.is_empty() {
        ANONYMOUS_PREFIX
    } else {
        attendee
    };
    let name = format!("{attendee}-DP-{frame_name}.png");
    name.replace(['/', '\\'], "_")
}

/// Straight-alpha RGBA8 copy of `frame`.
pub fn straight_rgba8(frame: &FrameRGBA) -> DpResult<Vec<u8>> {
    let expected = (frame.width as usize)
        .saturating_mul(frame.height as usize)
        .saturating_mul(4);
    if frame.data.len() != expected {
        return Err(DpError::evaluation(format!(
            "frame byte length {} does not match {}x{} rgba8",
            frame.data.len(),
            frame.width,
            frame.height
        )));
    }
    let mut data = frame.data.clone();
    if frame.premultiplied {
        unpremultiply_rgba8_in_place(&mut data);
    }
    Ok(data)
}

#[tracing::instrument(skip(frame), fields(width = frame.width, height = frame.height))]
pub fn encode_png(frame: &FrameRGBA) -> DpResult<Vec<u8>> {
    let data = straight_rgba8(frame)?;
    let img = image::RgbaImage::from_raw(frame.width, frame.height, data)
        .ok_or_else(|| DpError::evaluation("frame buffer does not fit its dimensions"))?;
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .context("encode png")?;
    Ok(buf)
}

/// Write `frame` as a PNG, creating parent directories.
pub fn write_png(frame: &FrameRGBA, path: &Path) -> DpResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let data = straight_rgba8(frame)?;
    image::save_buffer_with_format(
        path,
        &data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/export/png.rs"]
mod tests;
