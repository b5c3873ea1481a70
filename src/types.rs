/// Sub-pixel image coordinate, as returned by a detector
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point2f {
    pub x: f32,
    pub y: f32,
}

impl Point2f {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Integer pixel coordinate used for drawing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn from_f32(p: Point2f) -> Self {
        Self {
            x: p.x.round() as i32,
            y: p.y.round() as i32,
        }
    }
}

/// A decoded fiducial marker. Corners are in detector order (clockwise starting top-left
/// for ArUco dictionaries).
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: i32,
    pub corners: [Point2f; 4],
}

impl Marker {
    pub fn new(id: i32, corners: [Point2f; 4]) -> Self {
        Self { id, corners }
    }

    /// Convenience constructor from `(x, y)` tuples
    pub fn from_corners(id: i32, corners: [(f32, f32); 4]) -> Self {
        Self {
            id,
            corners: corners.map(|(x, y)| Point2f::new(x, y)),
        }
    }
}

/// Everything a detector returns for one image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Detections {
    /// Accepted markers, in the order the detector produced them
    pub markers: Vec<Marker>,
    /// Candidate quads that failed to decode
    pub rejected: Vec<[Point2f; 4]>,
}

impl Detections {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_markers(markers: Vec<Marker>) -> Self {
        Self {
            markers,
            rejected: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }
}

/// One straight line of the trail overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub from: PixelPoint,
    pub to: PixelPoint,
}

impl Segment {
    pub fn new(from: PixelPoint, to: PixelPoint) -> Self {
        Self { from, to }
    }
}

/// Connected path from the frame anchor through every marker center.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trail {
    pub segments: Vec<Segment>,
}

impl Trail {
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}
