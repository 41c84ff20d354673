// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! One-shot annotation operations.
//!
//! Every operation takes an image, leaves it untouched and returns a new
//! one. Failures never reach the caller: they are logged, reported as a
//! `ShapeDrawingFailed` event, and the input image is returned as is.

use crate::config::{
    self, AnnotationConfig, Settings, KEY_ANNOTATION_COLOR, KEY_FONT_COLOR, KEY_FONT_SIZE,
    KEY_LINE_WIDTH,
};
use crate::events::{Event, EventSink};
use crate::io::save::SaveWorkers;
use crate::models::{
    annotation::{Point, Shape, ShapeKind},
    color::{Color, Palette},
};
use crate::render::{shapes, text, RasterImage, TextFace};
use anyhow::{ensure, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tiny_skia::{Pixmap, Transform};

/// Snapshot of the engine settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationInfo {
    pub font_size: u32,
    pub font_color: Color,
    pub annotation_color: Color,
    pub line_width: u32,
    pub arrow_size: u32,
    pub available_colors: BTreeMap<String, Color>,
}

/// Text overlays, shape compositing and background saving.
pub struct AnnotationEngine {
    settings: Settings,
    config: AnnotationConfig,
    face: TextFace,
    palette: Palette,
    events: EventSink,
    saves: SaveWorkers,
}

impl AnnotationEngine {
    /// Create an engine, reading its configuration from `settings`.
    pub fn new(settings: Settings, events: EventSink) -> Self {
        let config = AnnotationConfig::from_settings(&settings);
        let face = TextFace::load_or_default(config.font_path.as_deref());
        log::info!(
            "Annotation engine ready: font {}px {}, stroke {}px {}, arrow head {}px",
            config.font_size,
            config.font_color,
            config.line_width,
            config.annotation_color,
            config.arrow_size
        );
        Self {
            settings,
            config,
            face,
            palette: Palette::default(),
            saves: SaveWorkers::new(events.clone()),
            events,
        }
    }

    pub fn config(&self) -> &AnnotationConfig {
        &self.config
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn events(&self) -> &EventSink {
        &self.events
    }

    pub fn available_colors(&self) -> &Palette {
        &self.palette
    }

    /// Draw `lines` in the top-left corner, each on a dark plate.
    ///
    /// `font_size` overrides the configured size for this call only and is
    /// clamped to the same range.
    pub fn add_text_overlay<S: AsRef<str>>(
        &self,
        image: &RasterImage,
        lines: &[S],
        font_size: Option<u32>,
    ) -> RasterImage {
        let size = font_size.map_or(self.config.font_size, config::clamp_font_size);
        let result = (|| -> Result<RasterImage> {
            ensure!(!image.is_empty(), "image has no pixels");
            Ok(text::render_text_overlay(
                image,
                &self.face,
                lines,
                size,
                self.config.font_color,
            ))
        })();

        match result {
            Ok(output) => {
                log::info!("Added text overlay, {} line(s)", lines.len());
                output
            }
            Err(e) => self.fail(format!("Failed to add text overlay: {:#}", e), image),
        }
    }

    /// Overlay the video file name and playback position.
    pub fn create_screenshot_with_info(
        &self,
        image: &RasterImage,
        video_name: &str,
        timestamp: &str,
    ) -> RasterImage {
        let lines = [format!("File: {video_name}"), format!("Time: {timestamp}")];
        let output = self.add_text_overlay(image, &lines, None);
        log::debug!("Created screenshot info for {} @ {}", video_name, timestamp);
        output
    }

    pub fn draw_arrow(
        &self,
        image: &RasterImage,
        start: Point,
        end: Point,
        color: Option<Color>,
        width: Option<u32>,
    ) -> RasterImage {
        let color = color.unwrap_or(self.config.annotation_color);
        let width = width.unwrap_or(self.config.line_width);
        let head = self.config.arrow_size;
        self.composite(ShapeKind::Arrow, image, |pixmap| {
            shapes::draw_arrow(pixmap, start, end, color, width, head, Transform::identity());
        })
    }

    pub fn draw_rectangle(
        &self,
        image: &RasterImage,
        start: Point,
        end: Point,
        color: Option<Color>,
        width: Option<u32>,
        filled: bool,
    ) -> RasterImage {
        let color = color.unwrap_or(self.config.annotation_color);
        let width = width.unwrap_or(self.config.line_width);
        self.composite(ShapeKind::Rectangle, image, |pixmap| {
            shapes::draw_rectangle(pixmap, start, end, color, width, filled, Transform::identity());
        })
    }

    /// Connected segments through `points`. With fewer than two points the
    /// input is returned unchanged and nothing is reported.
    pub fn draw_freehand(
        &self,
        image: &RasterImage,
        points: &[Point],
        color: Option<Color>,
        width: Option<u32>,
    ) -> RasterImage {
        if points.len() < 2 {
            return image.clone();
        }
        let color = color.unwrap_or(self.config.annotation_color);
        let width = width.unwrap_or(self.config.line_width);
        self.composite(ShapeKind::Freehand, image, |pixmap| {
            shapes::draw_polyline(pixmap, points, color, width, Transform::identity());
        })
    }

    /// Composite a list of stored shapes in order.
    pub fn flatten_shapes(&self, image: &RasterImage, list: &[Shape]) -> RasterImage {
        match image.layer() {
            Ok(layer) => {
                log::info!("Flattened {} shape(s)", list.len());
                shapes::flatten(image, layer, list, self.config.arrow_size)
            }
            Err(e) => self.fail(format!("Failed to flatten shapes: {:#}", e), image),
        }
    }

    fn composite(
        &self,
        kind: ShapeKind,
        image: &RasterImage,
        draw: impl FnOnce(&mut Pixmap),
    ) -> RasterImage {
        match image.layer() {
            Ok(mut layer) => {
                draw(&mut layer);
                let mut output = image.clone();
                output.composite(&layer);
                log::info!("Drew {}", kind);
                self.events.emit(Event::ShapeAdded(kind));
                output
            }
            Err(e) => self.fail(format!("Failed to draw {}: {:#}", kind, e), image),
        }
    }

    fn fail(&self, message: String, image: &RasterImage) -> RasterImage {
        log::error!("{}", message);
        self.events.emit(Event::ShapeDrawingFailed(message));
        image.clone()
    }

    /// Save a copy of `image` as PNG in the background.
    ///
    /// Returns as soon as the worker is started; the result arrives later
    /// as `SaveSucceeded` or `SaveFailed`.
    pub fn save_image(&mut self, image: &RasterImage, path: impl Into<PathBuf>) -> bool {
        let path = path.into();
        log::debug!("Queueing save to {}", path.display());
        self.saves.submit(image.clone(), path)
    }

    /// Saves started but not yet joined.
    pub fn pending_saves(&self) -> usize {
        self.saves.pending()
    }

    /// Wait for every background save to finish.
    pub fn cleanup(&mut self) {
        self.saves.wait_all();
        log::info!("Annotation engine cleaned up");
    }

    pub fn set_font_size(&mut self, size: u32) {
        let size = config::clamp_font_size(size);
        self.config.font_size = size;
        self.settings.set(KEY_FONT_SIZE, size);
        log::info!("Font size set to {}", size);
    }

    pub fn set_font_color(&mut self, color: Color) {
        self.config.font_color = color;
        self.settings.set(KEY_FONT_COLOR, color.to_string());
        log::info!("Font color set to {}", color);
    }

    pub fn set_annotation_color(&mut self, color: Color) {
        self.config.annotation_color = color;
        self.settings.set(KEY_ANNOTATION_COLOR, color.to_string());
        log::info!("Annotation color set to {}", color);
    }

    pub fn set_line_width(&mut self, width: u32) {
        let width = config::clamp_line_width(width);
        self.config.line_width = width;
        self.settings.set(KEY_LINE_WIDTH, width);
        log::info!("Line width set to {}", width);
    }

    pub fn annotation_info(&self) -> AnnotationInfo {
        AnnotationInfo {
            font_size: self.config.font_size,
            font_color: self.config.font_color,
            annotation_color: self.config.annotation_color,
            line_width: self.config.line_width,
            arrow_size: self.config.arrow_size,
            available_colors: self
                .palette
                .iter()
                .map(|(id, color)| (id.to_string(), color))
                .collect(),
        }
    }
}

impl Drop for AnnotationEngine {
    fn drop(&mut self) {
        self.saves.wait_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::geometry::arrow_head;
    use std::sync::mpsc::Receiver;

    fn engine() -> (AnnotationEngine, Receiver<Event>) {
        let (sink, events) = EventSink::channel();
        (AnnotationEngine::new(Settings::in_memory(), sink), events)
    }

    fn white(width: u32, height: u32) -> RasterImage {
        RasterImage::filled(width, height, Color::WHITE)
    }

    fn is_marked(image: &RasterImage, x: u32, y: u32) -> bool {
        image.pixel(x, y) != Some(Color::WHITE)
    }

    #[test]
    fn test_arrow_scenario() {
        let (engine, events) = engine();
        let base = white(800, 600);
        let out = engine.draw_arrow(&base, Point::new(100, 100), Point::new(200, 200), Some(Color::RED), Some(3));

        for t in [100, 125, 150, 175, 199] {
            assert!(is_marked(&out, t, t), "shaft pixel {t} not drawn");
        }
        for wing in arrow_head(Point::new(100, 100), Point::new(200, 200), 10) {
            let mid_x = ((200 + wing.x) / 2) as u32;
            let mid_y = ((200 + wing.y) / 2) as u32;
            assert!(is_marked(&out, mid_x, mid_y));
        }
        assert!(!is_marked(&out, 400, 100));
        assert_eq!(base, white(800, 600));
        assert_eq!(events.try_recv().unwrap(), Event::ShapeAdded(ShapeKind::Arrow));
    }

    #[test]
    fn test_arrow_matches_reference_composite() {
        let (engine, _events) = engine();
        let base = white(120, 120);
        let start = Point::new(10, 90);
        let end = Point::new(100, 20);
        let out = engine.draw_arrow(&base, start, end, None, None);

        let [w1, w2] = arrow_head(start, end, 10);
        let mut reference = base.layer().unwrap();
        let segments = [vec![start, end], vec![end, w1], vec![end, w2]];
        let mut combined = tiny_skia::PathBuilder::new();
        for segment in &segments {
            combined.move_to(segment[0].x as f32, segment[0].y as f32);
            combined.line_to(segment[1].x as f32, segment[1].y as f32);
        }
        let path = combined.finish().unwrap();
        let mut paint = tiny_skia::Paint::default();
        paint.set_color_rgba8(255, 0, 0, 255);
        paint.anti_alias = true;
        let stroke = tiny_skia::Stroke {
            width: 3.0,
            line_cap: tiny_skia::LineCap::Round,
            line_join: tiny_skia::LineJoin::Round,
            ..Default::default()
        };
        reference.stroke_path(&path, &paint, &stroke, Transform::identity(), None);

        let mut expected = base.clone();
        expected.composite(&reference);
        assert_eq!(out, expected);
    }

    #[test]
    fn test_arrow_on_translucent_frame_keeps_far_pixels() {
        let (engine, _events) = engine();
        for (value, alpha) in [(37, 128), (1, 1), (200, 3), (90, 254)] {
            let base = RasterImage::filled(50, 50, Color::rgba(value, value, value, alpha));
            let out = engine.draw_arrow(&base, Point::new(1, 1), Point::new(5, 5), None, None);

            assert_eq!(out.pixel(45, 45), base.pixel(45, 45));
            assert_eq!(out.pixel(20, 40), base.pixel(20, 40));
            assert_eq!(out.pixel(3, 3), Some(Color::RED));
        }
    }

    #[test]
    fn test_freehand_short_input_is_identity() {
        let (engine, events) = engine();
        let base = white(50, 50);
        assert_eq!(engine.draw_freehand(&base, &[], None, None), base);
        assert_eq!(engine.draw_freehand(&base, &[Point::new(4, 4)], None, None), base);
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_freehand_draws_segments_in_order() {
        let (engine, events) = engine();
        let base = white(100, 100);
        let points = [Point::new(10, 10), Point::new(90, 10), Point::new(90, 90)];
        let out = engine.draw_freehand(&base, &points, Some(Color::RED), Some(3));

        assert_eq!(out.pixel(50, 10), Some(Color::RED));
        assert_eq!(out.pixel(90, 50), Some(Color::RED));
        assert_eq!(out.pixel(50, 50), Some(Color::WHITE));
        assert_eq!(events.try_recv().unwrap(), Event::ShapeAdded(ShapeKind::Freehand));
    }

    #[test]
    fn test_rectangle_uses_defaults() {
        let (engine, _events) = engine();
        let out = engine.draw_rectangle(&white(60, 60), Point::new(10, 10), Point::new(50, 50), None, None, false);
        assert_eq!(out.pixel(30, 10), Some(Color::RED));
        assert_eq!(out.pixel(30, 30), Some(Color::WHITE));

        let filled = engine.draw_rectangle(&white(60, 60), Point::new(10, 10), Point::new(50, 50), None, None, true);
        assert_eq!(filled.pixel(30, 30), Some(Color::RED));
    }

    #[test]
    fn test_font_size_override_is_clamped() {
        let (engine, events) = engine();
        let base = white(40, 40);
        let huge = engine.add_text_overlay(&base, &["File: demo.mp4"], Some(u32::MAX));
        let largest = engine.add_text_overlay(&base, &["File: demo.mp4"], Some(48));
        assert_eq!(huge, largest);

        let tiny = engine.add_text_overlay(&base, &["File: demo.mp4"], Some(4));
        let smallest = engine.add_text_overlay(&base, &["File: demo.mp4"], Some(12));
        assert_eq!(tiny, smallest);
        // Size 12: baseline 27, plate from y = 15 to 32.
        assert!(is_marked(&tiny, 6, 16));
        assert!(!is_marked(&tiny, 6, 33));
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_failure_returns_input_and_reports() {
        let (engine, events) = engine();
        let empty = RasterImage::new(0, 0);
        let out = engine.draw_arrow(&empty, Point::new(0, 0), Point::new(5, 5), None, None);
        assert_eq!(out, empty);
        assert!(matches!(events.try_recv().unwrap(), Event::ShapeDrawingFailed(_)));

        let out = engine.add_text_overlay(&empty, &["x"], None);
        assert_eq!(out, empty);
        assert!(matches!(events.try_recv().unwrap(), Event::ShapeDrawingFailed(_)));
    }

    #[test]
    fn test_screenshot_info_has_two_plates() {
        let (engine, _events) = engine();
        let out = engine.create_screenshot_with_info(&white(400, 300), "demo.mp4", "00:02:05");
        // Baselines at 31 and 52, plates start 16px above.
        assert!(is_marked(&out, 6, 20));
        assert!(is_marked(&out, 6, 40));
        assert!(!is_marked(&out, 6, 70));
    }

    #[test]
    fn test_setters_clamp_and_write_back() {
        let (mut engine, _events) = engine();
        engine.set_font_size(100);
        engine.set_line_width(0);
        engine.set_annotation_color(Color::rgb(0, 0, 255));

        assert_eq!(engine.config().font_size, 48);
        assert_eq!(engine.config().line_width, 1);
        assert_eq!(engine.settings().get(KEY_FONT_SIZE, 0), 48);
        assert_eq!(engine.settings().get(KEY_LINE_WIDTH, 0), 1);
        assert_eq!(engine.settings().get(KEY_ANNOTATION_COLOR, String::new()), "#0000ff");

        let info = engine.annotation_info();
        assert_eq!(info.annotation_color, Color::rgb(0, 0, 255));
        assert_eq!(info.available_colors.len(), 8);
    }

    #[test]
    fn test_save_reports_success_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let (mut engine, events) = engine();
        let path = dir.path().join("out").join("frame.png");
        let image = engine.draw_arrow(&white(64, 64), Point::new(5, 5), Point::new(60, 60), None, None);

        assert!(engine.save_image(&image, &path));
        engine.cleanup();
        assert_eq!(engine.pending_saves(), 0);

        let saved: Vec<_> = events.try_iter().collect();
        assert!(saved.contains(&Event::SaveSucceeded(path.clone())));
        assert_eq!(crate::io::media::load_image(&path).unwrap(), image);
    }
}
