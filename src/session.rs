// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! A single modal annotation pass over one image.
//!
//! The session owns a canvas for as long as the user is drawing. Accepting
//! produces the flattened image; cancelling produces nothing.

use crate::canvas::Canvas;
use crate::config::AnnotationConfig;
use crate::events::EventSink;
use crate::io::serialization;
use crate::models::{
    annotation::{Shape, Tool},
    color::{Color, Palette},
    project::ShapeDocument,
};
use crate::render::{shapes, RasterImage};
use anyhow::Result;
use std::path::Path;

pub struct AnnotationSession {
    canvas: Canvas,
    palette: Palette,
}

impl AnnotationSession {
    /// Start annotating a copy of `image`.
    pub fn open(image: &RasterImage, config: &AnnotationConfig, events: EventSink) -> Result<Self> {
        let canvas = Canvas::new(image, config, events)?;
        log::info!("Annotation session opened on {}x{} image", image.width(), image.height());
        Ok(Self {
            canvas,
            palette: Palette::default(),
        })
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.canvas.set_tool(tool);
    }

    pub fn set_color(&mut self, color: Color) {
        self.canvas.set_color(color);
    }

    /// Pick a palette color by id. Unknown ids leave the color unchanged.
    pub fn set_color_by_name(&mut self, id: &str) -> bool {
        match self.palette.get(id) {
            Some(color) => {
                self.canvas.set_color(color);
                true
            }
            None => {
                log::warn!("Unknown palette color: {}", id);
                false
            }
        }
    }

    pub fn set_width(&mut self, width: u32) {
        self.canvas.set_width(width);
    }

    pub fn undo(&mut self) -> Option<Shape> {
        self.canvas.undo()
    }

    pub fn can_undo(&self) -> bool {
        !self.canvas.shapes().is_empty()
    }

    pub fn fit_to_view(&mut self, max_width: u32, max_height: u32) {
        self.canvas.fit_to_size(max_width, max_height);
    }

    /// Base image with every committed shape at full resolution. The
    /// display scale and any unfinished shape play no part.
    pub fn finalize(&self) -> RasterImage {
        shapes::flatten(
            self.canvas.base(),
            self.canvas.blank_layer().clone(),
            self.canvas.shapes(),
            self.canvas.arrow_size(),
        )
    }

    /// Committed shapes with the frame size, ready to be written out.
    pub fn document(&self, media_file: &str) -> ShapeDocument {
        let (width, height) = self.canvas.base().dimensions();
        let mut document = ShapeDocument::new(media_file.to_string(), width, height);
        document.shapes = self.canvas.shapes().to_vec();
        document
    }

    /// Write the committed shapes as YAML or JSON, by extension.
    pub fn export(&self, media_file: &str, path: &Path) -> Result<()> {
        serialization::export_document(&self.document(media_file), path)
    }

    /// Close the session, keeping the annotations.
    pub fn accept(self) -> RasterImage {
        let image = self.finalize();
        log::info!("Annotation accepted with {} shape(s)", self.canvas.shapes().len());
        image
    }

    /// Close the session and drop the annotations.
    pub fn cancel(self) {
        log::info!("Annotation cancelled, {} shape(s) discarded", self.canvas.shapes().len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::AnnotationEngine;
    use crate::config::Settings;
    use crate::models::annotation::Point;

    fn white(width: u32, height: u32) -> RasterImage {
        RasterImage::filled(width, height, Color::WHITE)
    }

    fn session(image: &RasterImage) -> AnnotationSession {
        AnnotationSession::open(image, &AnnotationConfig::default(), EventSink::discard()).unwrap()
    }

    fn drag(session: &mut AnnotationSession, from: (f64, f64), to: (f64, f64)) {
        let canvas = session.canvas_mut();
        canvas.pointer_down(from.0, from.1);
        canvas.pointer_move(to.0, to.1);
        canvas.pointer_up(to.0, to.1);
    }

    #[test]
    fn test_finalize_matches_engine_arrow() {
        let base = white(200, 150);
        let mut session = session(&base);
        session.set_tool(Tool::Arrow);
        drag(&mut session, (20.0, 30.0), (160.0, 110.0));

        let engine = AnnotationEngine::new(Settings::in_memory(), EventSink::discard());
        let expected = engine.draw_arrow(&base, Point::new(20, 30), Point::new(160, 110), None, None);
        assert_eq!(session.finalize(), expected);
    }

    #[test]
    fn test_finalize_ignores_display_scale() {
        let base = white(200, 100);
        let mut session = session(&base);
        session.set_tool(Tool::Rectangle);
        session.fit_to_view(100, 100);
        drag(&mut session, (10.0, 10.0), (40.0, 40.0));

        let out = session.finalize();
        assert_eq!(out.dimensions(), (200, 100));
        assert_eq!(session.canvas().shapes()[0].points, vec![Point::new(20, 20), Point::new(80, 80)]);
        assert_eq!(out.pixel(50, 20), Some(Color::RED));
    }

    #[test]
    fn test_later_shapes_drawn_on_top() {
        let base = white(60, 60);
        let mut session = session(&base);
        session.set_tool(Tool::Freehand);
        session.set_width(6);
        drag(&mut session, (5.0, 30.0), (55.0, 30.0));
        assert!(session.set_color_by_name("blue"));
        drag(&mut session, (30.0, 5.0), (30.0, 55.0));

        assert_eq!(session.finalize().pixel(30, 30), Some(Color::rgb(0, 0, 255)));
        session.undo();
        assert_eq!(session.finalize().pixel(30, 30), Some(Color::RED));
    }

    #[test]
    fn test_unknown_palette_id_keeps_color() {
        let mut session = session(&white(10, 10));
        assert!(!session.set_color_by_name("chartreuse"));
        assert_eq!(session.canvas().color(), Color::RED);
    }

    #[test]
    fn test_accept_round_trips_through_png() {
        let base = white(40, 40);
        let mut session = session(&base);
        session.set_tool(Tool::Rectangle);
        drag(&mut session, (5.0, 5.0), (35.0, 35.0));
        assert!(session.can_undo());

        let image = session.accept();
        let decoded = RasterImage::decode(&image.encode_png().unwrap()).unwrap();
        assert_eq!(decoded, image);
        assert_ne!(image, base);
    }

    #[test]
    fn test_exported_shapes_flatten_the_same() {
        let dir = tempfile::tempdir().unwrap();
        let base = white(80, 60);
        let mut session = session(&base);
        session.set_tool(Tool::Arrow);
        drag(&mut session, (10.0, 50.0), (70.0, 10.0));
        session.set_tool(Tool::Freehand);
        drag(&mut session, (5.0, 5.0), (40.0, 30.0));

        let path = dir.path().join("marks").join("frame.yaml");
        session.export("clip.mp4", &path).unwrap();
        let document = serialization::import_document(&path).unwrap();
        assert_eq!((document.frame_width, document.frame_height), (80, 60));
        assert_eq!(document.shapes, session.canvas().shapes());

        let engine = AnnotationEngine::new(Settings::in_memory(), EventSink::discard());
        assert_eq!(engine.flatten_shapes(&base, &document.shapes), session.finalize());
    }

    #[test]
    fn test_unfinished_shape_is_not_flattened() {
        let base = white(40, 40);
        let mut session = session(&base);
        session.set_tool(Tool::Rectangle);
        session.canvas_mut().pointer_down(5.0, 5.0);
        session.canvas_mut().pointer_move(30.0, 30.0);
        assert_eq!(session.finalize(), base);
        session.cancel();
    }
}
