// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Capturing frames from a playback source and saving them.

use crate::config::{Settings, KEY_AUTO_ANNOTATION, KEY_SAVE_DIRECTORY};
use crate::engine::AnnotationEngine;
use crate::events::{Event, EventSink};
use crate::render::RasterImage;
use crate::session::AnnotationSession;
use crate::util::{
    files::{is_video_file, safe_filename, unique_filename},
    time::{current_timestamp, ms_to_time_string},
};
use std::path::{Path, PathBuf};

/// What is currently loaded in the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoInfo {
    pub file_name: String,
    pub position_ms: i64,
    pub duration_ms: i64,
}

/// Where a captured frame came from, kept alongside an open session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameInfo {
    pub video_name: String,
    pub timestamp: String,
}

/// Anything that can hand over the frame currently on screen.
pub trait PlaybackSource {
    fn current_frame(&self) -> Option<RasterImage>;

    fn current_video_info(&self) -> Option<VideoInfo>;

    fn pause(&mut self) {}
}

pub struct ScreenshotManager {
    engine: AnnotationEngine,
    save_directory: PathBuf,
    auto_annotation: bool,
}

impl ScreenshotManager {
    pub fn new(settings: Settings, events: EventSink) -> Self {
        let save_directory: PathBuf = settings.get(KEY_SAVE_DIRECTORY, PathBuf::from("."));
        let auto_annotation = settings.get(KEY_AUTO_ANNOTATION, true);
        log::info!(
            "Screenshots go to {} (auto annotation {})",
            save_directory.display(),
            if auto_annotation { "on" } else { "off" }
        );
        Self {
            engine: AnnotationEngine::new(settings, events),
            save_directory,
            auto_annotation,
        }
    }

    pub fn engine(&self) -> &AnnotationEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut AnnotationEngine {
        &mut self.engine
    }

    pub fn save_directory(&self) -> &Path {
        &self.save_directory
    }

    pub fn set_save_directory(&mut self, dir: impl Into<PathBuf>) {
        self.save_directory = dir.into();
        self.engine
            .settings_mut()
            .set(KEY_SAVE_DIRECTORY, &self.save_directory);
    }

    pub fn auto_annotation(&self) -> bool {
        self.auto_annotation
    }

    pub fn set_auto_annotation(&mut self, enabled: bool) {
        self.auto_annotation = enabled;
        self.engine.settings_mut().set(KEY_AUTO_ANNOTATION, enabled);
    }

    /// Capture the current frame and save it in the background.
    ///
    /// Returns the target path as soon as the save has started.
    pub fn take_screenshot(&mut self, source: &dyn PlaybackSource) -> Option<PathBuf> {
        let (frame, info) = self.capture(source)?;
        let path = self.generate_filename(&info.video_name, &info.timestamp);
        let image = self.process_screenshot_image(&frame, &info.video_name, &info.timestamp);
        self.engine.save_image(&image, &path).then_some(path)
    }

    /// Add the info overlay when auto annotation is enabled.
    pub fn process_screenshot_image(
        &self,
        image: &RasterImage,
        video_name: &str,
        timestamp: &str,
    ) -> RasterImage {
        if self.auto_annotation {
            self.engine
                .create_screenshot_with_info(image, video_name, timestamp)
        } else {
            log::debug!("Auto annotation off, keeping raw frame");
            image.clone()
        }
    }

    /// `{video}_{HH-MM-SS}.png` in the save directory, with a numeric
    /// suffix if that name is taken. A video extension is dropped from the
    /// name; with no name at all the wall-clock time is used instead.
    pub fn generate_filename(&self, video_name: &str, timestamp: &str) -> PathBuf {
        let name = Path::new(video_name.trim());
        let stem = match name.file_stem().and_then(|s| s.to_str()) {
            Some(stem) if is_video_file(name) => stem,
            _ => video_name.trim(),
        };
        let base = if stem.is_empty() {
            format!("screenshot_{}", current_timestamp())
        } else {
            format!("{}_{}", safe_filename(stem), timestamp.replace(':', "-"))
        };
        unique_filename(&self.save_directory, &base, "png")
    }

    /// Pause playback and open an annotation session on the current frame.
    pub fn begin_annotation(
        &mut self,
        source: &mut dyn PlaybackSource,
    ) -> Option<(AnnotationSession, FrameInfo)> {
        source.pause();
        let (frame, info) = self.capture(source)?;
        match AnnotationSession::open(&frame, self.engine.config(), self.engine.events().clone()) {
            Ok(session) => Some((session, info)),
            Err(e) => {
                self.report(format!("Cannot annotate frame: {:#}", e));
                None
            }
        }
    }

    /// Flatten an accepted session and save it like a regular screenshot.
    /// The shapes are also written next to the image as a YAML document so
    /// they can be flattened again later.
    pub fn finish_annotation(
        &mut self,
        session: AnnotationSession,
        info: &FrameInfo,
    ) -> Option<PathBuf> {
        let path = self.generate_filename(&info.video_name, &info.timestamp);
        let shapes_path = path.with_extension("yaml");
        if let Err(e) = session.export(&info.video_name, &shapes_path) {
            log::warn!("Cannot write shapes to {}: {:#}", shapes_path.display(), e);
        }
        let annotated = session.accept();
        let image = self.process_screenshot_image(&annotated, &info.video_name, &info.timestamp);
        self.engine.save_image(&image, &path).then_some(path)
    }

    /// Wait for outstanding saves.
    pub fn cleanup(&mut self) {
        self.engine.cleanup();
    }

    fn capture(&self, source: &dyn PlaybackSource) -> Option<(RasterImage, FrameInfo)> {
        let Some(video) = source.current_video_info() else {
            self.report("No video loaded".to_string());
            return None;
        };
        let Some(frame) = source.current_frame() else {
            self.report("Current frame is unavailable".to_string());
            return None;
        };
        let info = FrameInfo {
            video_name: video.file_name,
            timestamp: ms_to_time_string(video.position_ms),
        };
        Some((frame, info))
    }

    fn report(&self, message: String) {
        log::warn!("Screenshot failed: {}", message);
        self.engine.events().emit(Event::ScreenshotFailed(message));
    }
}
