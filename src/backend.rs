//! OpenCV-backed marker detection and video I/O.
//!
//! Without the `opencv` feature the same types exist but every constructor reports
//! that support was not compiled in.

use std::path::Path;

use crate::dictionary::Dictionary;
use crate::error::{AnnotateError, Result};

#[cfg(feature = "opencv")]
mod imp {
    use super::*;
    use std::path::PathBuf;

    use image::{GrayImage, RgbImage};
    use opencv::core::{Mat, Point2f as CvPoint2f, Size, Vec3b, Vector};
    use opencv::objdetect::{self, PredefinedDictionaryType};
    use opencv::prelude::*;
    use opencv::{imgproc, videoio};
    use tracing::{debug, warn};

    use crate::detector::MarkerDetector;
    use crate::types::{Detections, Dimensions, Marker, Point2f};
    use crate::video::{FrameSink, FrameSource, SinkSpec, StreamInfo, VideoBackend};

    fn cv_err(e: opencv::Error) -> AnnotateError {
        AnnotateError::Detector(e.to_string())
    }

    fn video_err(e: opencv::Error) -> AnnotateError {
        AnnotateError::Video(e.to_string())
    }

    fn predefined(dictionary: Dictionary) -> PredefinedDictionaryType {
        use Dictionary::*;
        use PredefinedDictionaryType as P;
        match dictionary {
            Dict4x4_50 => P::DICT_4X4_50,
            Dict4x4_100 => P::DICT_4X4_100,
            Dict4x4_250 => P::DICT_4X4_250,
            Dict4x4_1000 => P::DICT_4X4_1000,
            Dict5x5_50 => P::DICT_5X5_50,
            Dict5x5_100 => P::DICT_5X5_100,
            Dict5x5_250 => P::DICT_5X5_250,
            Dict5x5_1000 => P::DICT_5X5_1000,
            Dict6x6_50 => P::DICT_6X6_50,
            Dict6x6_100 => P::DICT_6X6_100,
            Dict6x6_250 => P::DICT_6X6_250,
            Dict6x6_1000 => P::DICT_6X6_1000,
            Dict7x7_50 => P::DICT_7X7_50,
            Dict7x7_100 => P::DICT_7X7_100,
            Dict7x7_250 => P::DICT_7X7_250,
            Dict7x7_1000 => P::DICT_7X7_1000,
            ArucoOriginal => P::DICT_ARUCO_ORIGINAL,
            AprilTag16h5 => P::DICT_APRILTAG_16h5,
            AprilTag25h9 => P::DICT_APRILTAG_25h9,
            AprilTag36h10 => P::DICT_APRILTAG_36h10,
            AprilTag36h11 => P::DICT_APRILTAG_36h11,
            ArucoMip36h12 => P::DICT_ARUCO_MIP_36h12,
        }
    }

    fn quad(points: &Vector<CvPoint2f>) -> Option<[Point2f; 4]> {
        if points.len() != 4 {
            return None;
        }
        let mut out = [Point2f::default(); 4];
        for (slot, p) in out.iter_mut().zip(points.iter()) {
            *slot = Point2f::new(p.x, p.y);
        }
        Some(out)
    }

    // =========================================================================
    // Detector
    // =========================================================================

    pub struct ArucoDetector {
        inner: objdetect::ArucoDetector,
        dictionary: Dictionary,
    }

    impl ArucoDetector {
        /// Default detector parameters, default refinement.
        pub fn new(dictionary: Dictionary) -> Result<Self> {
            let dict = objdetect::get_predefined_dictionary(predefined(dictionary)).map_err(cv_err)?;
            let params = objdetect::DetectorParameters::default().map_err(cv_err)?;
            let refine = objdetect::RefineParameters::new(10.0, 3.0, true).map_err(cv_err)?;
            let inner = objdetect::ArucoDetector::new(&dict, &params, refine).map_err(cv_err)?;
            Ok(Self { inner, dictionary })
        }
    }

    impl MarkerDetector for ArucoDetector {
        fn name(&self) -> String {
            "OpenCV ArUco".to_string()
        }

        fn dictionary(&self) -> Dictionary {
            self.dictionary
        }

        fn detect(&mut self, gray: &GrayImage) -> Result<Detections> {
            let mat = Mat::from_slice_rows_cols(gray.as_raw(), gray.height() as usize, gray.width() as usize)
                .map_err(cv_err)?;

            let mut corners: Vector<Vector<CvPoint2f>> = Vector::new();
            let mut ids: Vector<i32> = Vector::new();
            let mut rejected: Vector<Vector<CvPoint2f>> = Vector::new();
            self.inner
                .detect_markers(&mat, &mut corners, &mut ids, &mut rejected)
                .map_err(cv_err)?;

            let markers = ids
                .iter()
                .zip(corners.iter())
                .filter_map(|(id, c)| quad(&c).map(|q| Marker::new(id, q)))
                .collect();
            let rejected = rejected.iter().filter_map(|c| quad(&c)).collect();
            Ok(Detections { markers, rejected })
        }
    }

    // =========================================================================
    // Video I/O
    // =========================================================================

    pub struct OpenCvSource {
        cap: videoio::VideoCapture,
        info: StreamInfo,
    }

    impl FrameSource for OpenCvSource {
        fn info(&self) -> StreamInfo {
            self.info
        }

        fn read_frame(&mut self) -> Result<Option<RgbImage>> {
            let mut bgr = Mat::default();
            match self.cap.read(&mut bgr) {
                Ok(true) if !bgr.empty() => {}
                Ok(_) => return Ok(None),
                Err(e) => {
                    // A broken frame ends the stream like EOF does
                    warn!("Frame decode failed: {}", e);
                    return Ok(None);
                }
            }

            let mut rgb = Mat::default();
            imgproc::cvt_color(&bgr, &mut rgb, imgproc::COLOR_BGR2RGB, 0).map_err(video_err)?;
            let (w, h) = (rgb.cols() as u32, rgb.rows() as u32);
            let data = rgb.data_bytes().map_err(video_err)?.to_vec();
            RgbImage::from_raw(w, h, data)
                .map(Some)
                .ok_or_else(|| AnnotateError::Video("frame buffer size mismatch".into()))
        }
    }

    impl Drop for OpenCvSource {
        fn drop(&mut self) {
            let _ = self.cap.release();
        }
    }

    pub struct OpenCvSink {
        path: PathBuf,
        writer: videoio::VideoWriter,
        written: usize,
        released: bool,
    }

    impl OpenCvSink {
        fn sink_err(&self, e: opencv::Error) -> AnnotateError {
            AnnotateError::Sink {
                path: self.path.clone(),
                reason: e.to_string(),
            }
        }
    }

    impl FrameSink for OpenCvSink {
        fn write_frame(&mut self, frame: &RgbImage) -> Result<()> {
            let bgr: Vec<Vec3b> = frame.pixels().map(|p| Vec3b::from_array([p[2], p[1], p[0]])).collect();
            let mat = Mat::from_slice_rows_cols(&bgr, frame.height() as usize, frame.width() as usize)
                .map_err(video_err)?;
            if let Err(e) = self.writer.write(&mat) {
                return Err(self.sink_err(e));
            }
            self.written += 1;
            Ok(())
        }

        fn finish(&mut self) -> Result<()> {
            if !self.released {
                if let Err(e) = self.writer.release() {
                    return Err(self.sink_err(e));
                }
                self.released = true;
            }
            Ok(())
        }

        fn frames_written(&self) -> usize {
            self.written
        }
    }

    impl Drop for OpenCvSink {
        fn drop(&mut self) {
            if !self.released {
                let _ = self.writer.release();
            }
        }
    }

    #[derive(Debug, Default)]
    pub struct OpenCvBackend;

    impl OpenCvBackend {
        pub fn new() -> Result<Self> {
            Ok(Self)
        }
    }

    impl VideoBackend for OpenCvBackend {
        type Source = OpenCvSource;
        type Sink = OpenCvSink;

        fn open_source(&mut self, path: &Path) -> Result<OpenCvSource> {
            let open_err = || AnnotateError::Open { path: path.to_path_buf() };
            let name = path.to_str().ok_or_else(open_err)?;
            let cap = videoio::VideoCapture::from_file(name, videoio::CAP_ANY).map_err(|_| open_err())?;
            if !cap.is_opened().unwrap_or(false) {
                return Err(open_err());
            }

            let width = cap.get(videoio::CAP_PROP_FRAME_WIDTH).unwrap_or(0.0);
            let height = cap.get(videoio::CAP_PROP_FRAME_HEIGHT).unwrap_or(0.0);
            let fps = cap.get(videoio::CAP_PROP_FPS).unwrap_or(0.0);
            debug!("VideoCapture {}: {}x{} @ {}", name, width, height, fps);

            Ok(OpenCvSource {
                cap,
                info: StreamInfo {
                    dims: Dimensions::new(width.max(0.0) as u32, height.max(0.0) as u32),
                    fps,
                },
            })
        }

        fn open_sink(&mut self, path: &Path, spec: &SinkSpec) -> Result<OpenCvSink> {
            let sink_err = |reason: String| AnnotateError::Sink {
                path: path.to_path_buf(),
                reason,
            };
            let name = path.to_str().ok_or_else(|| sink_err("path is not valid UTF-8".into()))?;
            let [a, b, c, d] = spec.fourcc;
            let fourcc = videoio::VideoWriter::fourcc(a, b, c, d).map_err(|e| sink_err(e.to_string()))?;
            let size = Size::new(spec.dims.width as i32, spec.dims.height as i32);
            let writer =
                videoio::VideoWriter::new(name, fourcc, spec.fps, size, true).map_err(|e| sink_err(e.to_string()))?;
            if !writer.is_opened().unwrap_or(false) {
                return Err(sink_err("writer did not open".into()));
            }
            Ok(OpenCvSink {
                path: path.to_path_buf(),
                writer,
                written: 0,
                released: false,
            })
        }
    }
}

#[cfg(not(feature = "opencv"))]
mod imp {
    use super::*;
    use image::{GrayImage, RgbImage};

    use crate::detector::MarkerDetector;
    use crate::types::Detections;
    use crate::video::{FrameSink, FrameSource, SinkSpec, StreamInfo, VideoBackend};

    const MISSING: &str = "built without OpenCV support; rebuild with `--features opencv`";

    pub struct ArucoDetector {
        dictionary: Dictionary,
    }

    impl ArucoDetector {
        pub fn new(_dictionary: Dictionary) -> Result<Self> {
            Err(AnnotateError::Detector(MISSING.into()))
        }
    }

    impl MarkerDetector for ArucoDetector {
        fn name(&self) -> String {
            "OpenCV ArUco (unavailable)".to_string()
        }

        fn dictionary(&self) -> Dictionary {
            self.dictionary
        }

        fn detect(&mut self, _gray: &GrayImage) -> Result<Detections> {
            Err(AnnotateError::Detector(MISSING.into()))
        }
    }

    /// Never constructed.
    pub enum Unsupported {}

    impl FrameSource for Unsupported {
        fn info(&self) -> StreamInfo {
            match *self {}
        }

        fn read_frame(&mut self) -> Result<Option<RgbImage>> {
            match *self {}
        }
    }

    impl FrameSink for Unsupported {
        fn write_frame(&mut self, _frame: &RgbImage) -> Result<()> {
            match *self {}
        }

        fn finish(&mut self) -> Result<()> {
            match *self {}
        }

        fn frames_written(&self) -> usize {
            match *self {}
        }
    }

    #[derive(Debug, Default)]
    pub struct OpenCvBackend;

    impl OpenCvBackend {
        pub fn new() -> Result<Self> {
            Err(AnnotateError::Video(MISSING.into()))
        }
    }

    impl VideoBackend for OpenCvBackend {
        type Source = Unsupported;
        type Sink = Unsupported;

        fn open_source(&mut self, _path: &Path) -> Result<Unsupported> {
            Err(AnnotateError::Video(MISSING.into()))
        }

        fn open_sink(&mut self, _path: &Path, _spec: &SinkSpec) -> Result<Unsupported> {
            Err(AnnotateError::Video(MISSING.into()))
        }
    }
}

pub use imp::{ArucoDetector, OpenCvBackend};
