use image::RgbImage;
use minifb::{Key, KeyRepeat};
use tracing::debug;

use crate::error::{AnnotateError, Result};

/// Where annotated frames are shown. Also the place the user asks to stop.
pub trait Presenter {
    fn present(&mut self, frame: &RgbImage) -> Result<()>;

    /// Polled once per frame after `present`.
    fn stop_requested(&mut self) -> bool;

    /// Keeps the last frame up until the user dismisses it.
    fn hold(&mut self) -> Result<()>;

    fn close(&mut self);
}

pub struct WindowOutput {
    title: String,
    window: Option<minifb::Window>,
    buffer: Vec<u32>,
    width: usize,
    height: usize,
}

impl WindowOutput {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            window: None,
            buffer: Vec::new(),
            width: 0,
            height: 0,
        }
    }

    fn ensure_window(&mut self, width: usize, height: usize) -> Result<&mut minifb::Window> {
        if self.window.is_none() {
            let mut window = minifb::Window::new(
                &self.title,
                width,
                height,
                minifb::WindowOptions {
                    resize: true,
                    ..minifb::WindowOptions::default()
                },
            )
            .map_err(|e| AnnotateError::Present(format!("Failed to create window: {}", e)))?;
            window.set_target_fps(60);
            debug!("Opened window '{}' ({}x{})", self.title, width, height);
            self.window = Some(window);
        }
        self.window
            .as_mut()
            .ok_or_else(|| AnnotateError::Present("window unavailable".into()))
    }

    fn is_stop_key(key: Key) -> bool {
        matches!(key, Key::Q | Key::Escape)
    }
}

impl Presenter for WindowOutput {
    fn present(&mut self, frame: &RgbImage) -> Result<()> {
        let (w, h) = (frame.width() as usize, frame.height() as usize);
        if self.window.is_some() && (w != self.width || h != self.height) {
            // Frame size changed, reopen at the new size
            self.close();
        }
        self.width = w;
        self.height = h;
        // RGB8 -> 0RGB u32
        self.buffer.clear();
        self.buffer.extend(
            frame
                .pixels()
                .map(|p| ((p[0] as u32) << 16) | ((p[1] as u32) << 8) | p[2] as u32),
        );

        let buffer = std::mem::take(&mut self.buffer);
        let result = self
            .ensure_window(w, h)?
            .update_with_buffer(&buffer, w, h)
            .map_err(|e| AnnotateError::Present(format!("Window update failed: {}", e)));
        self.buffer = buffer;
        result
    }

    fn stop_requested(&mut self) -> bool {
        match &self.window {
            Some(window) => {
                !window.is_open()
                    || window
                        .get_keys_pressed(KeyRepeat::No)
                        .into_iter()
                        .any(Self::is_stop_key)
                    || window.is_key_down(Key::Q)
                    || window.is_key_down(Key::Escape)
            }
            None => false,
        }
    }

    fn hold(&mut self) -> Result<()> {
        let Some(window) = self.window.as_mut() else {
            return Ok(());
        };
        while window.is_open() {
            window.update();
            if !window.get_keys_pressed(KeyRepeat::No).is_empty() {
                break;
            }
        }
        Ok(())
    }

    fn close(&mut self) {
        if self.window.take().is_some() {
            debug!("Closed window '{}'", self.title);
        }
    }
}

impl Drop for WindowOutput {
    fn drop(&mut self) {
        self.close();
    }
}

/// Headless presenter: shows nothing and never asks to stop.
#[derive(Debug, Default)]
pub struct NullPresenter {
    presented: usize,
}

impl NullPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn presented(&self) -> usize {
        self.presented
    }
}

impl Presenter for NullPresenter {
    fn present(&mut self, _frame: &RgbImage) -> Result<()> {
        self.presented += 1;
        Ok(())
    }

    fn stop_requested(&mut self) -> bool {
        false
    }

    fn hold(&mut self) -> Result<()> {
        Ok(())
    }

    fn close(&mut self) {}
}

impl<P: Presenter + ?Sized> Presenter for Box<P> {
    fn present(&mut self, frame: &RgbImage) -> Result<()> {
        (**self).present(frame)
    }

    fn stop_requested(&mut self) -> bool {
        (**self).stop_requested()
    }

    fn hold(&mut self) -> Result<()> {
        (**self).hold()
    }

    fn close(&mut self) {
        (**self).close()
    }
}
