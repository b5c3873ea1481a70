use image::imageops::{self, FilterType};
use image::RgbImage;

use crate::types::Dimensions;

/// Scales `source` to `target_width` keeping the aspect ratio. Height is rounded and
/// neither side drops below one pixel.
pub fn display_dimensions(source: Dimensions, target_width: u32) -> Dimensions {
    let target_width = target_width.max(1);
    if source.width == 0 {
        return Dimensions::new(target_width, source.height.max(1));
    }
    let height = (target_width as f64 * source.height as f64 / source.width as f64).round() as u32;
    Dimensions::new(target_width, height.max(1))
}

/// Size of a side-by-side frame pair.
pub fn pair_dimensions(display: Dimensions) -> Dimensions {
    Dimensions::new(display.width * 2, display.height)
}

pub fn scale_to(frame: &RgbImage, dims: Dimensions) -> RgbImage {
    if frame.dimensions() == (dims.width, dims.height) {
        return frame.clone();
    }
    imageops::resize(frame, dims.width, dims.height, FilterType::Triangle)
}

/// `left | right`. Both halves must share a size.
pub fn concat_horizontal(left: &RgbImage, right: &RgbImage) -> RgbImage {
    debug_assert_eq!(left.dimensions(), right.dimensions());
    let (w, h) = left.dimensions();
    let mut out = RgbImage::new(w + right.width(), h.max(right.height()));
    imageops::replace(&mut out, left, 0, 0);
    imageops::replace(&mut out, right, w as i64, 0);
    out
}

/// Scales both frames to `display` and places the original on the left.
pub fn frame_pair(original: &RgbImage, annotated: &RgbImage, display: Dimensions) -> RgbImage {
    concat_horizontal(&scale_to(original, display), &scale_to(annotated, display))
}
