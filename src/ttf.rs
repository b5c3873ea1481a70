use image::{Rgb, RgbImage};
use rusttype::{point, Font, Scale};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// TrueType label renderer, used when a font family is configured and found on disk.
pub struct FontRenderer {
    font: Font<'static>,
}

impl FontRenderer {
    pub fn try_load(family: &str) -> Option<Self> {
        for path in candidate_paths(family) {
            if !path.exists() {
                continue;
            }
            match fs::read(&path).ok().and_then(Font::try_from_vec) {
                Some(font) => {
                    info!("Loaded label font from {}", path.display());
                    return Some(Self { font });
                }
                None => debug!("{} is not a usable font", path.display()),
            }
        }

        info!("Could not find font family '{}'. Falling back to bitmap labels.", family);
        None
    }

    pub fn draw_text(&self, img: &mut RgbImage, x: i32, y: i32, text: &str, color: Rgb<u8>, size_pt: f32) {
        let scale = Scale::uniform(size_pt);
        let v_metrics = self.font.v_metrics(scale);
        let start = point(x as f32, y as f32 + v_metrics.ascent);
        let (w, h) = (img.width() as i32, img.height() as i32);

        for glyph in self.font.layout(text, scale, start) {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, v| {
                // Hard threshold, labels are drawn without blending
                if v < 0.2 {
                    return;
                }
                let px = bb.min.x + gx as i32;
                let py = bb.min.y + gy as i32;
                if px >= 0 && px < w && py >= 0 && py < h {
                    img.put_pixel(px as u32, py as u32, color);
                }
            });
        }
    }

    /// Width and line height of `text` in pixels.
    pub fn measure(&self, text: &str, size_pt: f32) -> (u32, u32) {
        let scale = Scale::uniform(size_pt);
        let v_metrics = self.font.v_metrics(scale);
        let width = self
            .font
            .layout(text, scale, point(0.0, 0.0))
            .filter_map(|g| g.pixel_bounding_box().map(|bb| bb.max.x))
            .max()
            .unwrap_or(0);
        (width.max(0) as u32, (v_metrics.ascent - v_metrics.descent).max(0.0) as u32)
    }
}

fn candidate_paths(family: &str) -> Vec<PathBuf> {
    let direct = Path::new(family);
    let mut paths = Vec::new();
    if direct.extension().is_some() {
        paths.push(direct.to_path_buf());
    }
    for dir in [
        "/usr/share/fonts/truetype",
        "/usr/share/fonts/TTF",
        "/Library/Fonts",
        "/System/Library/Fonts",
        "/System/Library/Fonts/Supplemental",
        ".",
    ] {
        paths.push(Path::new(dir).join(format!("{}.ttf", family)));
    }
    paths
}
