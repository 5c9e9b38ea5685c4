// Face crop math and persistence.

use anyhow::{bail, Result};
use opencv::{
    core::{self, Mat, Vector},
    imgcodecs, imgproc,
    prelude::*,
};
use std::path::Path;

/// Expands a detected face box by `relative_padding` of the frame height and
/// width on each side, clamped to the frame bounds. The result is never
/// negative and never exceeds the frame dimensions.
pub fn padded_face_box(
    face: core::Rect,
    frame_width: i32,
    frame_height: i32,
    relative_padding: f32,
) -> core::Rect {
    let pad_x = relative_padding * frame_width as f32;
    let pad_y = relative_padding * frame_height as f32;

    let left = (face.x as f32 - pad_x).max(0.0) as i32;
    let top = (face.y as f32 - pad_y).max(0.0) as i32;
    let right = ((face.x + face.width) as f32 + pad_x).min(frame_width as f32) as i32;
    let bottom = ((face.y + face.height) as f32 + pad_y).min(frame_height as f32) as i32;

    core::Rect::new(left, top, right - left, bottom - top)
}

/// Crops the padded face region out of an RGB frame and persists it as a PNG
/// at the given path.
pub fn write_face_crop(
    frame: &Mat,
    face: core::Rect,
    relative_padding: f32,
    path: &Path,
) -> Result<()> {
    let size = frame.size()?;
    let roi_rect = padded_face_box(face, size.width, size.height, relative_padding);
    if roi_rect.width <= 0 || roi_rect.height <= 0 {
        bail!("invalid crop dimensions for face box {:?}", face);
    }

    let roi = Mat::roi(frame, roi_rect)?;
    let mut cropped = Mat::default();
    roi.copy_to(&mut cropped)?;

    // The pipeline carries frames in the detector's RGB order; imwrite
    // expects BGR.
    let mut bgr = Mat::default();
    imgproc::cvt_color_def(&cropped, &mut bgr, imgproc::COLOR_RGB2BGR)?;

    let path_str = path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("non-utf8 output path: {:?}", path))?;
    if !imgcodecs::imwrite(path_str, &bgr, &Vector::new())? {
        bail!("failed to write face crop: {:?}", path);
    }

    Ok(())
}
