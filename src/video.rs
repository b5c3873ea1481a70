use std::path::Path;

use image::RgbImage;

use crate::error::Result;
use crate::types::Dimensions;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamInfo {
    pub dims: Dimensions,
    pub fps: f64,
}

/// A decoded video stream.
pub trait FrameSource {
    fn info(&self) -> StreamInfo;

    /// `Ok(None)` ends the stream. Backends report undecodable frames the same way.
    fn read_frame(&mut self) -> Result<Option<RgbImage>>;
}

/// Encoded video output. Dropping a sink must release it even if `finish` was never called.
pub trait FrameSink {
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()>;
    fn finish(&mut self) -> Result<()>;
    fn frames_written(&self) -> usize;
}

#[derive(Debug, Clone, PartialEq)]
pub struct SinkSpec {
    pub fourcc: [char; 4],
    pub fps: f64,
    pub dims: Dimensions,
}

/// Opens sources and sinks for a session.
pub trait VideoBackend {
    type Source: FrameSource;
    type Sink: FrameSink;

    fn open_source(&mut self, path: &Path) -> Result<Self::Source>;
    fn open_sink(&mut self, path: &Path, spec: &SinkSpec) -> Result<Self::Sink>;
}
