use std::collections::VecDeque;

use image::GrayImage;

use crate::dictionary::Dictionary;
use crate::error::Result;
use crate::types::Detections;

/// A fiducial marker detector. Implementations receive a single-channel intensity
/// image and return every marker they decode, in their own order.
pub trait MarkerDetector {
    fn name(&self) -> String;
    fn dictionary(&self) -> Dictionary;
    fn detect(&mut self, gray: &GrayImage) -> Result<Detections>;
}

impl<D: MarkerDetector + ?Sized> MarkerDetector for Box<D> {
    fn name(&self) -> String {
        (**self).name()
    }

    fn dictionary(&self) -> Dictionary {
        (**self).dictionary()
    }

    fn detect(&mut self, gray: &GrayImage) -> Result<Detections> {
        (**self).detect(gray)
    }
}

// Deterministic detector that replays a fixed script, one entry per call.
// Once the script runs out every further call returns `fallback`.
pub struct ScriptedDetector {
    dictionary: Dictionary,
    script: VecDeque<Detections>,
    fallback: Detections,
    calls: usize,
}

impl ScriptedDetector {
    pub fn new(script: Vec<Detections>) -> Self {
        Self {
            dictionary: Dictionary::default(),
            script: script.into(),
            fallback: Detections::empty(),
            calls: 0,
        }
    }

    /// Returns the same detections for every frame
    pub fn constant(detections: Detections) -> Self {
        Self {
            dictionary: Dictionary::default(),
            script: VecDeque::new(),
            fallback: detections,
            calls: 0,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl MarkerDetector for ScriptedDetector {
    fn name(&self) -> String {
        "Scripted".to_string()
    }

    fn dictionary(&self) -> Dictionary {
        self.dictionary
    }

    fn detect(&mut self, _gray: &GrayImage) -> Result<Detections> {
        self.calls += 1;
        Ok(self.script.pop_front().unwrap_or_else(|| self.fallback.clone()))
    }
}
