use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use image::{GrayImage, Rgb, RgbImage};
use marker_trail::config::AnnotatorConfig;
use marker_trail::output::Presenter;
use marker_trail::overlay::OverlayStyle;
use marker_trail::session::{SessionState, StopReason, VideoSession};
use marker_trail::types::Dimensions;
use marker_trail::video::{FrameSink, FrameSource, SinkSpec, StreamInfo, VideoBackend};
use marker_trail::{AnnotateError, Detections, Dictionary, Marker, MarkerDetector, ScriptedDetector};

// =========================================================================
// In-memory fakes
// =========================================================================

#[derive(Default)]
struct Log {
    sink_opened: Option<(PathBuf, SinkSpec)>,
    written: Vec<RgbImage>,
    sink_finished: bool,
    sink_dropped: bool,
    source_dropped: bool,
}

struct MemorySource {
    frames: Vec<RgbImage>,
    info: StreamInfo,
    log: Rc<RefCell<Log>>,
}

impl FrameSource for MemorySource {
    fn info(&self) -> StreamInfo {
        self.info
    }

    fn read_frame(&mut self) -> marker_trail::Result<Option<RgbImage>> {
        if self.frames.is_empty() {
            Ok(None)
        } else {
            Ok(Some(self.frames.remove(0)))
        }
    }
}

impl Drop for MemorySource {
    fn drop(&mut self) {
        self.log.borrow_mut().source_dropped = true;
    }
}

struct MemorySink {
    log: Rc<RefCell<Log>>,
}

impl FrameSink for MemorySink {
    fn write_frame(&mut self, frame: &RgbImage) -> marker_trail::Result<()> {
        self.log.borrow_mut().written.push(frame.clone());
        Ok(())
    }

    fn finish(&mut self) -> marker_trail::Result<()> {
        self.log.borrow_mut().sink_finished = true;
        Ok(())
    }

    fn frames_written(&self) -> usize {
        self.log.borrow().written.len()
    }
}

impl Drop for MemorySink {
    fn drop(&mut self) {
        self.log.borrow_mut().sink_dropped = true;
    }
}

struct MemoryBackend {
    frames: Option<Vec<RgbImage>>,
    info: StreamInfo,
    log: Rc<RefCell<Log>>,
}

impl MemoryBackend {
    fn new(frames: Vec<RgbImage>, fps: f64) -> Self {
        let dims = frames
            .first()
            .map(|f| Dimensions::new(f.width(), f.height()))
            .unwrap_or(Dimensions::new(640, 480));
        Self {
            frames: Some(frames),
            info: StreamInfo { dims, fps },
            log: Rc::default(),
        }
    }

    fn unopenable() -> Self {
        Self {
            frames: None,
            info: StreamInfo {
                dims: Dimensions::new(0, 0),
                fps: 0.0,
            },
            log: Rc::default(),
        }
    }
}

impl VideoBackend for MemoryBackend {
    type Source = MemorySource;
    type Sink = MemorySink;

    fn open_source(&mut self, path: &Path) -> marker_trail::Result<MemorySource> {
        let frames = self.frames.take().ok_or_else(|| AnnotateError::Open {
            path: path.to_path_buf(),
        })?;
        Ok(MemorySource {
            frames,
            info: self.info,
            log: self.log.clone(),
        })
    }

    fn open_sink(&mut self, path: &Path, spec: &SinkSpec) -> marker_trail::Result<MemorySink> {
        self.log.borrow_mut().sink_opened = Some((path.to_path_buf(), spec.clone()));
        Ok(MemorySink { log: self.log.clone() })
    }
}

#[derive(Default)]
struct RecordingPresenter {
    shown: Vec<(u32, u32)>,
    stop_after: Option<usize>,
    closed: bool,
}

impl Presenter for RecordingPresenter {
    fn present(&mut self, frame: &RgbImage) -> marker_trail::Result<()> {
        self.shown.push(frame.dimensions());
        Ok(())
    }

    fn stop_requested(&mut self) -> bool {
        self.stop_after.is_some_and(|n| self.shown.len() >= n)
    }

    fn hold(&mut self) -> marker_trail::Result<()> {
        Ok(())
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

struct FailingDetector;

impl MarkerDetector for FailingDetector {
    fn name(&self) -> String {
        "failing".into()
    }

    fn dictionary(&self) -> Dictionary {
        Dictionary::default()
    }

    fn detect(&mut self, _gray: &GrayImage) -> marker_trail::Result<Detections> {
        Err(AnnotateError::Detector("sensor on fire".into()))
    }
}

// =========================================================================
// Helpers
// =========================================================================

fn frames(n: usize, w: u32, h: u32) -> Vec<RgbImage> {
    (0..n)
        .map(|i| RgbImage::from_fn(w, h, |x, y| Rgb([(x + i as u32) as u8, y as u8, 40])))
        .collect()
}

fn square(id: i32, x: f32, y: f32) -> Marker {
    Marker::from_corners(id, [(x, y), (x + 40.0, y), (x + 40.0, y + 40.0), (x, y + 40.0)])
}

fn config(save: bool) -> AnnotatorConfig {
    AnnotatorConfig {
        save_output: save,
        output_path: PathBuf::from("processed_farm2.mp4"),
        ..AnnotatorConfig::default()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[test]
fn test_unopenable_source_is_reported() {
    let mut backend = MemoryBackend::unopenable();
    let mut detector = ScriptedDetector::new(vec![]);
    let mut presenter = RecordingPresenter::default();

    let session = VideoSession::new(config(true), OverlayStyle::default());
    let err = session
        .run(Path::new("missing.mp4"), &mut backend, &mut detector, &mut presenter)
        .unwrap_err();

    assert!(matches!(err, AnnotateError::Open { .. }));
    assert!(err.is_reportable());
    assert!(presenter.closed);
    assert!(backend.log.borrow().sink_opened.is_none());
    assert_eq!(detector.calls(), 0);
}

#[test]
fn test_undecodable_first_frame_goes_straight_to_closed() {
    let mut backend = MemoryBackend::new(vec![], 25.0);
    let mut detector = ScriptedDetector::new(vec![]);
    let mut presenter = RecordingPresenter::default();

    let session = VideoSession::new(config(true), OverlayStyle::default());
    let report = session
        .run(Path::new("broken.mp4"), &mut backend, &mut detector, &mut presenter)
        .unwrap();

    assert_eq!(report.states, vec![SessionState::Opening, SessionState::Closed]);
    assert_eq!(report.stop_reason, StopReason::NoFrames);
    assert_eq!(report.frames_processed, 0);
    assert!(backend.log.borrow().sink_opened.is_none());
    assert!(backend.log.borrow().source_dropped);
    assert!(presenter.shown.is_empty());
}

#[test]
fn test_full_stream_with_saving() {
    let mut backend = MemoryBackend::new(frames(3, 640, 480), 29.97);
    let mut detector = ScriptedDetector::new(vec![
        Detections::empty(),
        Detections::from_markers(vec![square(4, 100.0, 100.0)]),
        Detections::from_markers(vec![square(1, 10.0, 10.0), square(2, 300.0, 50.0), square(3, 500.0, 300.0)]),
    ]);
    let mut presenter = RecordingPresenter::default();

    let session = VideoSession::new(config(true), OverlayStyle::default());
    let report = session
        .run(Path::new("farm2.mp4"), &mut backend, &mut detector, &mut presenter)
        .unwrap();

    assert_eq!(
        report.states,
        vec![
            SessionState::Opening,
            SessionState::Streaming,
            SessionState::Draining,
            SessionState::Closed
        ]
    );
    assert_eq!(report.stop_reason, StopReason::EndOfStream);
    assert_eq!(report.frames_processed, 3);
    assert_eq!(report.frames_with_markers, 2);
    assert_eq!(report.segments_drawn, 4); // 0 + 1 + 3
    assert_eq!(report.frames_written, 3);
    assert_eq!(report.display, Some(Dimensions::new(400, 300)));

    let log = backend.log.borrow();
    let (path, spec) = log.sink_opened.clone().unwrap();
    assert_eq!(path, PathBuf::from("processed_farm2.mp4"));
    assert_eq!(spec.fourcc, ['m', 'p', '4', 'v']);
    assert_eq!(spec.fps, 29.97);
    assert_eq!(spec.dims, Dimensions::new(800, 300));
    assert!(log.written.iter().all(|f| f.dimensions() == (800, 300)));
    assert!(log.sink_finished);
    assert!(log.sink_dropped);
    assert!(log.source_dropped);
    assert!(presenter.closed);
    assert_eq!(presenter.shown, vec![(800, 300); 3]);
}

#[test]
fn test_frame_without_markers_has_identical_halves() {
    let mut backend = MemoryBackend::new(frames(1, 200, 100), 30.0);
    let mut detector = ScriptedDetector::new(vec![]);
    let mut presenter = RecordingPresenter::default();

    let mut cfg = config(true);
    cfg.display_width = 200;
    let session = VideoSession::new(cfg, OverlayStyle::default());
    session
        .run(Path::new("plain.mp4"), &mut backend, &mut detector, &mut presenter)
        .unwrap();

    let log = backend.log.borrow();
    let pair = &log.written[0];
    for y in 0..100 {
        for x in 0..200 {
            assert_eq!(pair.get_pixel(x, y), pair.get_pixel(x + 200, y));
        }
    }
}

#[test]
fn test_stop_request_ends_loop() {
    let mut backend = MemoryBackend::new(frames(10, 320, 240), 30.0);
    let mut detector = ScriptedDetector::new(vec![]);
    let mut presenter = RecordingPresenter {
        stop_after: Some(2),
        ..RecordingPresenter::default()
    };

    let session = VideoSession::new(config(true), OverlayStyle::default());
    let report = session
        .run(Path::new("farm2.mp4"), &mut backend, &mut detector, &mut presenter)
        .unwrap();

    assert_eq!(report.stop_reason, StopReason::StopRequested);
    assert_eq!(report.frames_processed, 2);
    assert_eq!(report.frames_written, 2);
    assert_eq!(detector.calls(), 2);
    assert!(backend.log.borrow().sink_finished);
}

#[test]
fn test_saving_disabled_never_opens_sink() {
    let mut backend = MemoryBackend::new(frames(2, 320, 240), 30.0);
    let mut detector = ScriptedDetector::new(vec![]);
    let mut presenter = RecordingPresenter::default();

    let session = VideoSession::new(config(false), OverlayStyle::default());
    let report = session
        .run(Path::new("farm2.mp4"), &mut backend, &mut detector, &mut presenter)
        .unwrap();

    assert_eq!(report.frames_processed, 2);
    assert_eq!(report.frames_written, 0);
    assert!(backend.log.borrow().sink_opened.is_none());
}

#[test]
fn test_frame_limit() {
    let mut backend = MemoryBackend::new(frames(5, 64, 48), 30.0);
    let mut detector = ScriptedDetector::new(vec![]);
    let mut presenter = RecordingPresenter::default();

    let session = VideoSession::new(config(false), OverlayStyle::default()).with_max_frames(Some(3));
    let report = session
        .run(Path::new("farm2.mp4"), &mut backend, &mut detector, &mut presenter)
        .unwrap();

    assert_eq!(report.stop_reason, StopReason::FrameLimit);
    assert_eq!(report.frames_processed, 3);
}

#[test]
fn test_rejected_candidates_are_counted() {
    let mut backend = MemoryBackend::new(frames(2, 64, 48), 30.0);
    let noisy = Detections {
        markers: vec![square(7, 5.0, 5.0)],
        rejected: vec![square(0, 20.0, 0.0).corners, square(0, 0.0, 20.0).corners],
    };
    let mut detector = ScriptedDetector::new(vec![noisy.clone(), noisy]);
    let mut presenter = RecordingPresenter::default();

    let session = VideoSession::new(config(false), OverlayStyle::default());
    let report = session
        .run(Path::new("farm2.mp4"), &mut backend, &mut detector, &mut presenter)
        .unwrap();

    assert_eq!(report.candidates_rejected, 4);
    assert_eq!(report.frames_with_markers, 2);
}

#[test]
fn test_zero_display_width_still_streams() {
    let mut backend = MemoryBackend::new(frames(1, 64, 48), 30.0);
    let mut detector = ScriptedDetector::new(vec![]);
    let mut presenter = RecordingPresenter::default();

    let mut cfg = config(true);
    cfg.display_width = 0;
    let session = VideoSession::new(cfg, OverlayStyle::default());
    let report = session
        .run(Path::new("farm2.mp4"), &mut backend, &mut detector, &mut presenter)
        .unwrap();

    assert_eq!(report.display, Some(Dimensions::new(1, 1)));
    let (_, spec) = backend.log.borrow().sink_opened.clone().unwrap();
    assert_eq!(spec.dims, Dimensions::new(2, 1));
}

#[test]
fn test_zero_fps_falls_back() {
    let mut backend = MemoryBackend::new(frames(1, 64, 48), 0.0);
    let mut detector = ScriptedDetector::new(vec![]);
    let mut presenter = RecordingPresenter::default();

    let session = VideoSession::new(config(true), OverlayStyle::default());
    session
        .run(Path::new("farm2.mp4"), &mut backend, &mut detector, &mut presenter)
        .unwrap();

    let (_, spec) = backend.log.borrow().sink_opened.clone().unwrap();
    assert_eq!(spec.fps, 30.0);
}

#[test]
fn test_detector_failure_still_releases_everything() {
    let mut backend = MemoryBackend::new(frames(3, 64, 48), 30.0);
    let mut detector = FailingDetector;
    let mut presenter = RecordingPresenter::default();

    let session = VideoSession::new(config(true), OverlayStyle::default());
    let err = session
        .run(Path::new("farm2.mp4"), &mut backend, &mut detector, &mut presenter)
        .unwrap_err();

    assert!(matches!(err, AnnotateError::Detector(_)));
    assert!(!err.is_reportable());
    assert!(presenter.closed);
    let log = backend.log.borrow();
    assert!(log.sink_dropped);
    assert!(log.source_dropped);
    assert!(log.written.is_empty());
}
