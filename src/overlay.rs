use image::{GrayImage, Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, BresenhamLineIter};
use imageproc::rect::Rect;

use crate::config::{parse_hex, StyleConfig};
use crate::font;
use crate::trail::{marker_center, marker_centers, trail_for_markers};
use crate::ttf::FontRenderer;
use crate::types::{Detections, Dimensions, Marker, PixelPoint, Segment, Trail};

/// Resolved drawing parameters.
pub struct OverlayStyle {
    pub trail_color: Rgb<u8>,
    pub trail_thickness: u32,
    pub border_color: Rgb<u8>,
    pub corner_color: Rgb<u8>,
    pub label_color: Rgb<u8>,
    pub label_scale: u32,
    pub font_size_pt: f32,
    font: Option<FontRenderer>,
}

impl OverlayStyle {
    pub fn from_config(cfg: &StyleConfig) -> Self {
        Self {
            trail_color: parse_hex(&cfg.trail_color_hex),
            trail_thickness: cfg.trail_thickness.max(1),
            border_color: parse_hex(&cfg.border_color_hex),
            corner_color: parse_hex(&cfg.corner_color_hex),
            label_color: parse_hex(&cfg.label_color_hex),
            label_scale: cfg.label_scale.max(1),
            font_size_pt: cfg.font_size_pt as f32,
            font: cfg.font_family.as_deref().and_then(FontRenderer::try_load),
        }
    }
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self::from_config(&StyleConfig::default())
    }
}

/// Output of annotating one frame.
pub struct AnnotatedFrame {
    pub image: RgbImage,
    pub centers: Vec<PixelPoint>,
    pub trail: Trail,
}

// =========================================================================
// Primitives
// =========================================================================

fn put_clipped(img: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

/// Bresenham walk stamped with a `thickness`-wide square brush. Points outside the image
/// are dropped.
pub fn draw_thick_line(img: &mut RgbImage, seg: Segment, color: Rgb<u8>, thickness: u32) {
    let t = thickness.max(1) as i32;
    let lo = -((t - 1) / 2);
    let hi = lo + t - 1;

    let start = (seg.from.x as f32, seg.from.y as f32);
    let end = (seg.to.x as f32, seg.to.y as f32);
    for (x, y) in BresenhamLineIter::new(start, end) {
        for dy in lo..=hi {
            for dx in lo..=hi {
                put_clipped(img, x + dx, y + dy, color);
            }
        }
    }
}

/// Label centered on `at`.
fn draw_label(img: &mut RgbImage, at: PixelPoint, text: &str, style: &OverlayStyle) {
    match &style.font {
        Some(fr) => {
            let (w, h) = fr.measure(text, style.font_size_pt);
            let (x, y) = (at.x - w as i32 / 2, at.y - h as i32 / 2);
            fr.draw_text(img, x, y, text, style.label_color, style.font_size_pt);
        }
        None => {
            let w = font::measure_text_width(text, style.label_scale) as i32;
            let h = font::text_height(style.label_scale) as i32;
            font::draw_text_line(img, at.x - w / 2, at.y - h / 2, text, style.label_color, style.label_scale);
        }
    }
}

// =========================================================================
// Markers and trail
// =========================================================================

/// Outline, first-corner box and `id=N` label.
pub fn draw_marker(img: &mut RgbImage, marker: &Marker, style: &OverlayStyle) {
    let pts = marker.corners.map(PixelPoint::from_f32);
    for i in 0..4 {
        draw_thick_line(img, Segment::new(pts[i], pts[(i + 1) % 4]), style.border_color, 1);
    }

    draw_hollow_rect_mut(img, Rect::at(pts[0].x - 3, pts[0].y - 3).of_size(7, 7), style.corner_color);

    draw_label(img, marker_center(marker), &format!("id={}", marker.id), style);
}

pub fn draw_markers(img: &mut RgbImage, markers: &[Marker], style: &OverlayStyle) {
    for m in markers {
        draw_marker(img, m, style);
    }
}

pub fn draw_trail(img: &mut RgbImage, trail: &Trail, style: &OverlayStyle) {
    for seg in &trail.segments {
        draw_thick_line(img, *seg, style.trail_color, style.trail_thickness);
    }
}

/// Marker overlay only, used for still images.
pub fn annotate_markers(frame: &RgbImage, detections: &Detections, style: &OverlayStyle) -> RgbImage {
    let mut out = frame.clone();
    draw_markers(&mut out, &detections.markers, style);
    out
}

/// Markers plus the anchor trail. With no markers the returned image is an untouched copy.
pub fn annotate_frame(frame: &RgbImage, detections: &Detections, style: &OverlayStyle) -> AnnotatedFrame {
    let mut image = frame.clone();
    if detections.is_empty() {
        return AnnotatedFrame {
            image,
            centers: Vec::new(),
            trail: Trail::default(),
        };
    }

    draw_markers(&mut image, &detections.markers, style);
    let centers = marker_centers(&detections.markers);
    let trail = trail_for_markers(&detections.markers, Dimensions::new(frame.width(), frame.height()));
    draw_trail(&mut image, &trail, style);

    AnnotatedFrame { image, centers, trail }
}

pub fn to_intensity(frame: &RgbImage) -> GrayImage {
    image::imageops::grayscale(frame)
}
