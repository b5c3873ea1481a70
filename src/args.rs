use clap::Parser;
use std::path::PathBuf;

use crate::config::AppConfig;
use crate::dictionary::Dictionary;

/// Detect ArUco markers in a video and draw a trail from the bottom of the frame
/// through every marker. Shows original and annotated frames side by side.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct VideoArgs {
    /// Input video file
    pub input: PathBuf,

    /// Output video (written only with --save)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Marker dictionary
    #[arg(short, long, value_enum)]
    pub dictionary: Option<Dictionary>,

    /// Width of each half of the side-by-side display
    #[arg(short = 'w', long)]
    pub display_width: Option<u32>,

    /// Save the side-by-side frames to the output video
    #[arg(short, long, default_value_t = false)]
    pub save: bool,

    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Run without a window
    #[arg(long, default_value_t = false)]
    pub headless: bool,

    /// Stop after this many frames
    #[arg(long)]
    pub max_frames: Option<usize>,

    /// Write the effective configuration (file plus flags) to this path
    #[arg(long)]
    pub save_config: Option<PathBuf>,
}

impl VideoArgs {
    /// Command line values win over the configuration file.
    pub fn apply(&self, config: &mut AppConfig) {
        let annotator = &mut config.annotator;
        if let Some(path) = &self.output {
            annotator.output_path = path.clone();
        }
        if let Some(dictionary) = self.dictionary {
            annotator.dictionary = dictionary;
        }
        if let Some(width) = self.display_width {
            annotator.display_width = width.max(1);
        }
        if self.save {
            annotator.save_output = true;
        }
    }
}

/// Detect ArUco markers in a still image and display them.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct ImageArgs {
    /// Input image file
    pub input: PathBuf,

    /// Marker dictionary
    #[arg(short, long, value_enum)]
    pub dictionary: Option<Dictionary>,

    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Also write the annotated image here
    #[arg(short, long)]
    pub save: Option<PathBuf>,

    /// Do not open a window
    #[arg(long, default_value_t = false)]
    pub headless: bool,
}

impl ImageArgs {
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(dictionary) = self.dictionary {
            config.annotator.dictionary = dictionary;
        }
    }
}
