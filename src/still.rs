use std::path::Path;

use image::RgbImage;
use tracing::info;

use crate::detector::MarkerDetector;
use crate::error::{AnnotateError, Result};
use crate::output::Presenter;
use crate::overlay::{annotate_markers, to_intensity, OverlayStyle};

#[derive(Debug, Clone)]
pub struct StillReport {
    pub markers: usize,
    pub ids: Vec<i32>,
    /// The annotated copy, only when at least one marker was found
    pub annotated: Option<RgbImage>,
}

pub fn load_image(path: &Path) -> Result<RgbImage> {
    let img = image::open(path).map_err(|source| AnnotateError::Load {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(img.to_rgb8())
}

/// Detects markers in an already-loaded image and draws them on a copy.
pub fn annotate_still<D>(image: &RgbImage, detector: &mut D, style: &OverlayStyle) -> Result<StillReport>
where
    D: MarkerDetector + ?Sized,
{
    let detections = detector.detect(&to_intensity(image))?;
    let ids = detections.markers.iter().map(|m| m.id).collect();
    let annotated = (!detections.is_empty()).then(|| annotate_markers(image, &detections, style));

    Ok(StillReport {
        markers: detections.len(),
        ids,
        annotated,
    })
}

/// Loads `path`, annotates it and shows the result until dismissed. Nothing is shown
/// when no marker is found.
pub fn annotate_image<D, P>(
    path: &Path,
    detector: &mut D,
    presenter: &mut P,
    style: &OverlayStyle,
) -> Result<StillReport>
where
    D: MarkerDetector + ?Sized,
    P: Presenter + ?Sized,
{
    let image = load_image(path)?;
    info!("Loaded {} ({}x{})", path.display(), image.width(), image.height());

    let report = annotate_still(&image, detector, style)?;
    info!("Detected {} markers with dictionary {}", report.markers, detector.dictionary());

    if let Some(annotated) = &report.annotated {
        let shown = presenter.present(annotated).and_then(|()| presenter.hold());
        presenter.close();
        shown?;
    }
    Ok(report)
}
