use clap::Parser;
use colored::*;

use marker_trail::args::VideoArgs;
use marker_trail::backend::{ArucoDetector, OpenCvBackend};
use marker_trail::config::AppConfig;
use marker_trail::output::{NullPresenter, Presenter, WindowOutput};
use marker_trail::overlay::OverlayStyle;
use marker_trail::session::{StopReason, VideoSession};

const WINDOW_TITLE: &str = "Original and Detected ArUco markers";

fn main() -> anyhow::Result<()> {
    marker_trail::init_logging();
    let args = VideoArgs::parse();

    // 0. Config, then command line overrides
    let mut config = AppConfig::load_or_default(args.config.as_deref())?;
    args.apply(&mut config);
    if let Some(path) = &args.save_config {
        config.save(path)?;
        println!("{}", format!("Configuration written to {}", path.display()).cyan());
    }

    // 1. Detector and video backend
    let mut detector = ArucoDetector::new(config.annotator.dictionary)?;
    let mut backend = OpenCvBackend::new()?;

    // 2. Presentation
    let mut presenter: Box<dyn Presenter> = if args.headless {
        Box::new(NullPresenter::new())
    } else {
        Box::new(WindowOutput::new(WINDOW_TITLE))
    };

    let style = OverlayStyle::from_config(&config.style);
    let session = VideoSession::new(config.annotator.clone(), style).with_max_frames(args.max_frames);

    println!("Controls: [Q] or [Esc] to stop");

    // 3. Loop
    match session.run(&args.input, &mut backend, &mut detector, &mut presenter) {
        Ok(report) => {
            let summary = format!(
                "Processed {} frames ({} with markers)",
                report.frames_processed, report.frames_with_markers
            );
            match report.stop_reason {
                StopReason::NoFrames => {
                    println!("{}", format!("No frames could be decoded from {}", args.input.display()).yellow())
                }
                _ => println!("{}", summary.green()),
            }
            if config.annotator.save_output && report.frames_written > 0 {
                println!(
                    "{}",
                    format!(
                        "Saved {} frames to {}",
                        report.frames_written,
                        config.annotator.output_path.display()
                    )
                    .green()
                );
            }
            Ok(())
        }
        Err(e) if e.is_reportable() => {
            println!("{}", format!("Error: {}", e).red());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
