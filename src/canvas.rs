// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Interactive drawing surface.
//!
//! The canvas turns pointer gestures in display coordinates into shapes in
//! image coordinates. The base image is never modified; shapes are drawn on
//! top of it whenever the canvas is rendered.

use crate::config::{clamp_line_width, AnnotationConfig};
use crate::events::{Event, EventSink};
use crate::models::{
    annotation::{Point, Shape, ShapeKind, Tool},
    color::Color,
};
use crate::render::{shapes, RasterImage};
use crate::util::geometry::{self, display_to_image};
use anyhow::{bail, Result};
use image::imageops::{self, FilterType};
use tiny_skia::{Pixmap, Transform};

/// Scale changes smaller than this are ignored.
const SCALE_EPSILON: f32 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasState {
    Idle,
    Drawing,
}

pub struct Canvas {
    base: RasterImage,
    layer: Pixmap,
    shapes: Vec<Shape>,
    in_progress: Option<Shape>,
    preview_end: Option<Point>,
    tool: Tool,
    color: Color,
    width: u32,
    scale: f32,
    arrow_size: u32,
    events: EventSink,
    needs_redraw: bool,
}

impl Canvas {
    /// Create a canvas over a copy of `image`. Images with a zero dimension
    /// are rejected.
    pub fn new(image: &RasterImage, config: &AnnotationConfig, events: EventSink) -> Result<Self> {
        if image.is_empty() {
            bail!(
                "cannot annotate a {}x{} image",
                image.width(),
                image.height()
            );
        }
        let base = image.clone();
        let layer = base.layer()?;
        log::debug!("Canvas created for {}x{} image", base.width(), base.height());

        Ok(Self {
            base,
            layer,
            shapes: Vec::new(),
            in_progress: None,
            preview_end: None,
            tool: Tool::None,
            color: config.annotation_color,
            width: clamp_line_width(config.line_width),
            scale: 1.0,
            arrow_size: config.arrow_size,
            events,
            needs_redraw: true,
        })
    }

    pub fn base(&self) -> &RasterImage {
        &self.base
    }

    /// A transparent pixmap the size of the base image.
    pub(crate) fn blank_layer(&self) -> &Pixmap {
        &self.layer
    }

    /// Committed shapes, oldest first.
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn arrow_size(&self) -> u32 {
        self.arrow_size
    }

    pub fn state(&self) -> CanvasState {
        if self.in_progress.is_some() {
            CanvasState::Drawing
        } else {
            CanvasState::Idle
        }
    }

    pub fn set_tool(&mut self, tool: Tool) {
        if self.tool != tool {
            self.tool = tool;
            log::info!("Tool set to {}", tool);
            self.events.emit(Event::ToolChanged(tool));
        }
    }

    pub fn set_color(&mut self, color: Color) {
        if self.color != color {
            self.color = color;
            log::info!("Color set to {}", color);
            self.events.emit(Event::ColorChanged(color));
        }
    }

    /// Set the stroke width for new shapes, clamped to 1..=10.
    pub fn set_width(&mut self, width: u32) {
        let width = clamp_line_width(width);
        if self.width != width {
            self.width = width;
            log::info!("Width set to {}", width);
            self.events.emit(Event::WidthChanged(width));
        }
    }

    /// Start a shape at a display position. Ignored when no tool is active.
    /// A press while already drawing discards the unfinished shape.
    pub fn pointer_down(&mut self, x: f64, y: f64) {
        let Some(kind) = self.tool.shape_kind() else {
            return;
        };
        if self.in_progress.is_some() {
            log::debug!("Restarting unfinished shape");
        }
        let start = display_to_image(x, y, self.scale);
        self.in_progress = Some(Shape::begin(kind, start, self.color, self.width));
        self.preview_end = None;
        self.needs_redraw = true;
    }

    /// Extend a freehand path, or move the live end of an arrow or
    /// rectangle.
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        let point = display_to_image(x, y, self.scale);
        let Some(shape) = self.in_progress.as_mut() else {
            return;
        };
        match shape.kind {
            ShapeKind::Freehand => shape.push_point(point),
            ShapeKind::Arrow | ShapeKind::Rectangle => self.preview_end = Some(point),
        }
        self.needs_redraw = true;
    }

    /// Finish the gesture. The shape is kept only if it has at least two
    /// points.
    pub fn pointer_up(&mut self, x: f64, y: f64) {
        let point = display_to_image(x, y, self.scale);
        let Some(mut shape) = self.in_progress.take() else {
            return;
        };
        self.preview_end = None;

        if shape.kind.is_two_point() {
            shape.push_point(point);
        }
        if shape.is_complete() {
            log::debug!("Committed {} with {} points", shape.kind, shape.point_count());
            self.shapes.push(shape);
        } else {
            log::debug!("Discarded {} with a single point", shape.kind);
        }
        self.needs_redraw = true;
        self.events.emit(Event::DrawingCompleted);
    }

    /// Remove the most recent shape.
    pub fn undo(&mut self) -> Option<Shape> {
        let removed = self.shapes.pop();
        if removed.is_some() {
            self.needs_redraw = true;
        }
        removed
    }

    /// The shape being drawn, including its live end point.
    pub fn preview_shape(&self) -> Option<Shape> {
        let shape = self.in_progress.as_ref()?;
        Some(match self.preview_end {
            Some(end) => shape.with_end_point(end),
            None => shape.clone(),
        })
    }

    /// Set the display scale, clamped to [0.05, 8.0].
    pub fn set_scale_factor(&mut self, scale: f32) {
        let scale = geometry::clamp_scale(scale);
        if (scale - self.scale).abs() > SCALE_EPSILON {
            self.scale = scale;
            self.needs_redraw = true;
            log::debug!("Scale set to {:.3}", scale);
        }
    }

    pub fn display_size(&self) -> (u32, u32) {
        geometry::display_size(self.base.width(), self.base.height(), self.scale)
    }

    /// Shrink to fit within the given box. Never enlarges the image.
    pub fn fit_to_size(&mut self, max_width: u32, max_height: u32) {
        if let Some(scale) = geometry::fit_scale(self.base.width(), self.base.height(), max_width, max_height) {
            self.set_scale_factor(scale);
        }
    }

    /// Base image with committed shapes and the live preview, at display
    /// size. At scale 1 this matches the flattened result pixel for pixel.
    pub fn render(&self) -> Result<RasterImage> {
        let preview = self.preview_shape();
        let visible = self.shapes.iter().chain(preview.as_ref());
        if (self.scale - 1.0).abs() <= f32::EPSILON {
            return Ok(shapes::flatten(&self.base, self.layer.clone(), visible, self.arrow_size));
        }

        let (width, height) = self.display_size();
        let mut frame = RasterImage::from_rgba(imageops::resize(
            self.base.as_rgba(),
            width,
            height,
            FilterType::Triangle,
        ));
        let mut layer = frame.layer()?;
        let transform = Transform::from_scale(self.scale, self.scale);
        shapes::draw_shapes(&mut layer, visible, self.arrow_size, transform);
        frame.composite(&layer);
        Ok(frame)
    }

    /// Whether the view changed since the last call.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }
}
