use image::Rgb;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::dictionary::Dictionary;
use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub annotator: AnnotatorConfig,
    pub style: StyleConfig,
}

/// Run-level settings shared by both annotators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotatorConfig {
    pub dictionary: Dictionary,
    pub display_width: u32,
    pub save_output: bool,
    pub output_path: PathBuf,
    pub codec: String, // FOURCC, exactly four ASCII characters
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub trail_color_hex: String,
    pub trail_thickness: u32,
    pub border_color_hex: String,
    pub corner_color_hex: String,
    pub label_color_hex: String,
    pub label_scale: u32,
    pub font_family: Option<String>,
    pub font_size_pt: u32,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            dictionary: Dictionary::default(),
            display_width: 400,
            save_output: false,
            output_path: PathBuf::from("output.mp4"),
            codec: "mp4v".to_string(),
        }
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            trail_color_hex: "#00FF00".to_string(),
            trail_thickness: 2,
            border_color_hex: "#00FF00".to_string(),
            corner_color_hex: "#FF0000".to_string(),
            label_color_hex: "#0000FF".to_string(),
            label_scale: 2,
            font_family: None,
            font_size_pt: 14,
        }
    }
}

impl AnnotatorConfig {
    pub fn fourcc(&self) -> [char; 4] {
        let mut code = [' '; 4];
        for (slot, c) in code.iter_mut().zip(self.codec.chars()) {
            *slot = c;
        }
        code
    }
}

impl AppConfig {
    pub const DEFAULT_PATH: &'static str = "marker_trail.json";

    /// Loads `path`, or the defaults when the file is missing or cannot be parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("Configuration file {} not found. Using defaults.", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        // Missing fields come from Default thanks to #[serde(default)]
        let config = match serde_json::from_str::<AppConfig>(&content) {
            Ok(c) => {
                info!("Loaded configuration from {}", path.display());
                c.clamped()
            }
            Err(e) => {
                warn!("Error parsing config {}: {}. Using defaults.", path.display(), e);
                Self::default()
            }
        };
        Ok(config)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Self::load(Path::new(Self::DEFAULT_PATH)),
        }
    }

    fn clamped(mut self) -> Self {
        if self.annotator.display_width == 0 {
            warn!("display_width must be at least 1, using 1");
            self.annotator.display_width = 1;
        }
        self
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// `#RRGGBB` to a pixel. Malformed input falls back to red.
pub fn parse_hex(hex: &str) -> Rgb<u8> {
    let channel = |range: std::ops::Range<usize>| hex.get(range).and_then(|s| u8::from_str_radix(s, 16).ok());

    if hex.len() == 7 && hex.starts_with('#') {
        if let (Some(r), Some(g), Some(b)) = (channel(1..3), channel(3..5), channel(5..7)) {
            return Rgb([r, g, b]);
        }
    }
    Rgb([255, 0, 0])
}
