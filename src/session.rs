//! Video trail annotation: read, detect, draw, pair, write, present, repeat.

use std::path::Path;

use image::RgbImage;
use tracing::{debug, info, warn};

use crate::config::AnnotatorConfig;
use crate::detector::MarkerDetector;
use crate::error::Result;
use crate::layout::{display_dimensions, frame_pair, pair_dimensions};
use crate::output::Presenter;
use crate::overlay::{annotate_frame, to_intensity, OverlayStyle};
use crate::types::Dimensions;
use crate::video::{FrameSink, FrameSource, SinkSpec, VideoBackend};

const FALLBACK_FPS: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Opening,
    Streaming,
    Draining,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The source could not be opened
    OpenFailed,
    /// The source opened but not a single frame decoded
    NoFrames,
    EndOfStream,
    StopRequested,
    FrameLimit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    pub states: Vec<SessionState>,
    pub stop_reason: StopReason,
    pub display: Option<Dimensions>,
    pub frames_processed: usize,
    pub frames_with_markers: usize,
    pub segments_drawn: usize,
    /// Candidate quads the detector looked at and discarded
    pub candidates_rejected: usize,
    pub frames_written: usize,
}

impl SessionReport {
    fn new() -> Self {
        Self {
            states: vec![SessionState::Opening],
            stop_reason: StopReason::OpenFailed,
            display: None,
            frames_processed: 0,
            frames_with_markers: 0,
            segments_drawn: 0,
            candidates_rejected: 0,
            frames_written: 0,
        }
    }

    fn enter(&mut self, state: SessionState) {
        debug!("session {:?} -> {:?}", self.state(), state);
        self.states.push(state);
    }

    pub fn state(&self) -> SessionState {
        *self.states.last().unwrap_or(&SessionState::Opening)
    }
}

pub struct VideoSession {
    config: AnnotatorConfig,
    style: OverlayStyle,
    max_frames: Option<usize>,
}

impl VideoSession {
    pub fn new(config: AnnotatorConfig, style: OverlayStyle) -> Self {
        Self {
            config,
            style,
            max_frames: None,
        }
    }

    /// Stop after this many frames. The run then ends with `StopReason::FrameLimit`.
    pub fn with_max_frames(mut self, max_frames: Option<usize>) -> Self {
        self.max_frames = max_frames;
        self
    }

    /// Runs one session to completion. The presenter is closed and the source and sink
    /// are released on every return path, errors included.
    pub fn run<B, D, P>(
        &self,
        input: &Path,
        backend: &mut B,
        detector: &mut D,
        presenter: &mut P,
    ) -> Result<SessionReport>
    where
        B: VideoBackend,
        D: MarkerDetector + ?Sized,
        P: Presenter + ?Sized,
    {
        let mut report = SessionReport::new();
        let result = self.stream(input, backend, detector, presenter, &mut report);
        presenter.close();
        report.enter(SessionState::Closed);

        info!(
            "Session closed ({:?}): {} frames, {} with markers, {} written",
            report.stop_reason, report.frames_processed, report.frames_with_markers, report.frames_written
        );
        result.map(|()| report)
    }

    fn stream<B, D, P>(
        &self,
        input: &Path,
        backend: &mut B,
        detector: &mut D,
        presenter: &mut P,
        report: &mut SessionReport,
    ) -> Result<()>
    where
        B: VideoBackend,
        D: MarkerDetector + ?Sized,
        P: Presenter + ?Sized,
    {
        let mut source = backend.open_source(input)?;
        let info = source.info();
        info!(
            "Opened {} ({}x{} @ {:.2} fps), dictionary {} via {}",
            input.display(),
            info.dims.width,
            info.dims.height,
            info.fps,
            detector.dictionary(),
            detector.name()
        );

        // Read one frame before committing to an output file
        let Some(first) = source.read_frame()? else {
            warn!("No decodable frames in {}", input.display());
            report.stop_reason = StopReason::NoFrames;
            return Ok(());
        };

        let source_dims = if info.dims.width == 0 || info.dims.height == 0 {
            Dimensions::new(first.width(), first.height())
        } else {
            info.dims
        };
        let display = display_dimensions(source_dims, self.config.display_width);
        report.display = Some(display);

        let mut sink = if self.config.save_output {
            let fps = if info.fps.is_finite() && info.fps > 0.0 {
                info.fps
            } else {
                warn!("Source reports fps {}, writing at {}", info.fps, FALLBACK_FPS);
                FALLBACK_FPS
            };
            let spec = SinkSpec {
                fourcc: self.config.fourcc(),
                fps,
                dims: pair_dimensions(display),
            };
            info!(
                "Writing {}x{} frame pairs to {}",
                spec.dims.width,
                spec.dims.height,
                self.config.output_path.display()
            );
            Some(backend.open_sink(&self.config.output_path, &spec)?)
        } else {
            None
        };

        report.enter(SessionState::Streaming);
        let mut next = Some(first);
        let stop_reason = loop {
            let Some(frame) = next.take() else {
                break StopReason::EndOfStream;
            };

            self.process_frame(&frame, display, detector, presenter, sink.as_mut(), report)?;

            if presenter.stop_requested() {
                break StopReason::StopRequested;
            }
            if self.max_frames.is_some_and(|max| report.frames_processed >= max) {
                break StopReason::FrameLimit;
            }

            next = source.read_frame()?;
        };
        report.stop_reason = stop_reason;

        report.enter(SessionState::Draining);
        if let Some(sink) = sink.as_mut() {
            sink.finish()?;
            report.frames_written = sink.frames_written();
        }
        drop(sink);
        drop(source);
        Ok(())
    }

    fn process_frame<D, P, S>(
        &self,
        frame: &RgbImage,
        display: Dimensions,
        detector: &mut D,
        presenter: &mut P,
        sink: Option<&mut S>,
        report: &mut SessionReport,
    ) -> Result<()>
    where
        D: MarkerDetector + ?Sized,
        P: Presenter + ?Sized,
        S: FrameSink,
    {
        let gray = to_intensity(frame);
        let detections = detector.detect(&gray)?;
        let annotated = annotate_frame(frame, &detections, &self.style);
        let pair = frame_pair(frame, &annotated.image, display);

        if let Some(sink) = sink {
            sink.write_frame(&pair)?;
        }
        presenter.present(&pair)?;

        report.frames_processed += 1;
        if !detections.is_empty() {
            report.frames_with_markers += 1;
        }
        report.segments_drawn += annotated.trail.len();
        report.candidates_rejected += detections.rejected.len();
        debug!(
            "frame {}: {} markers, {} rejected candidates, {} trail segments",
            report.frames_processed,
            detections.len(),
            detections.rejected.len(),
            annotated.trail.len()
        );
        Ok(())
    }
}
