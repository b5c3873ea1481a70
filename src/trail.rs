//! Marker centers and the anchor-to-marker trail.
//!
//! The trail follows detector order exactly. Detectors do not promise a stable
//! order between frames, so the drawn path can jump from one frame to the next.

use crate::types::{Dimensions, Marker, PixelPoint, Segment, Trail};

/// Mean of the four corners, rounded to the nearest pixel.
pub fn marker_center(marker: &Marker) -> PixelPoint {
    let (sx, sy) = marker
        .corners
        .iter()
        .fold((0.0f64, 0.0f64), |(sx, sy), p| (sx + p.x as f64, sy + p.y as f64));
    PixelPoint::new((sx / 4.0).round() as i32, (sy / 4.0).round() as i32)
}

pub fn marker_centers(markers: &[Marker]) -> Vec<PixelPoint> {
    markers.iter().map(marker_center).collect()
}

/// Midpoint of the bottom edge. `y == height` sits one row below the last pixel row,
/// so the first segment enters the frame from its bottom border.
pub fn anchor_point(frame: Dimensions) -> PixelPoint {
    PixelPoint::new((frame.width / 2) as i32, frame.height as i32)
}

/// Anchor to the first center, then each center to the next.
pub fn build_trail(anchor: PixelPoint, centers: &[PixelPoint]) -> Trail {
    let Some(first) = centers.first() else {
        return Trail::default();
    };

    let mut segments = Vec::with_capacity(centers.len());
    segments.push(Segment::new(anchor, *first));
    segments.extend(centers.windows(2).map(|w| Segment::new(w[0], w[1])));

    Trail { segments }
}

pub fn trail_for_markers(markers: &[Marker], frame: Dimensions) -> Trail {
    build_trail(anchor_point(frame), &marker_centers(markers))
}
