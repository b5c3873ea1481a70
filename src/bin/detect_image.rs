use clap::Parser;
use colored::*;
use tracing::info;

use marker_trail::args::ImageArgs;
use marker_trail::backend::ArucoDetector;
use marker_trail::config::AppConfig;
use marker_trail::output::{NullPresenter, Presenter, WindowOutput};
use marker_trail::overlay::OverlayStyle;
use marker_trail::still::annotate_image;

fn main() -> anyhow::Result<()> {
    marker_trail::init_logging();
    let args = ImageArgs::parse();

    let mut config = AppConfig::load_or_default(args.config.as_deref())?;
    args.apply(&mut config);

    let mut detector = ArucoDetector::new(config.annotator.dictionary)?;
    let style = OverlayStyle::from_config(&config.style);
    let mut presenter: Box<dyn Presenter> = if args.headless {
        Box::new(NullPresenter::new())
    } else {
        Box::new(WindowOutput::new("Detected ArUco markers"))
    };

    let report = match annotate_image(&args.input, &mut detector, &mut presenter, &style) {
        Ok(report) => report,
        Err(e) if e.is_reportable() => {
            println!("{}", format!("Error: {}", e).red());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let Some(annotated) = &report.annotated else {
        println!("{}", "No ArUco markers detected".yellow());
        return Ok(());
    };

    println!("{}", format!("Detected {} markers: {:?}", report.markers, report.ids).green());
    if let Some(path) = &args.save {
        annotated.save(path)?;
        info!("Annotated image written to {}", path.display());
    }
    Ok(())
}
