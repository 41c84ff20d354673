// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation data structures.
//!
//! This module defines the drawing tools and the shapes they produce.
//! Shape geometry is always stored in image space (pixels of the full
//! resolution frame) so it stays valid when the view is rescaled.

use super::color::Color;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An integer point in image space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// The kind of a stored shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Arrow,
    Rectangle,
    Freehand,
}

impl ShapeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ShapeKind::Arrow => "arrow",
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Freehand => "freehand",
        }
    }

    /// Two-point shapes only commit their end point on release.
    pub fn is_two_point(self) -> bool {
        matches!(self, ShapeKind::Arrow | ShapeKind::Rectangle)
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current drawing tool selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Pointer events draw nothing.
    #[default]
    None,
    Arrow,
    Rectangle,
    Freehand,
}

impl Tool {
    /// The shape this tool builds, if any.
    pub fn shape_kind(self) -> Option<ShapeKind> {
        match self {
            Tool::None => None,
            Tool::Arrow => Some(ShapeKind::Arrow),
            Tool::Rectangle => Some(ShapeKind::Rectangle),
            Tool::Freehand => Some(ShapeKind::Freehand),
        }
    }
}

impl From<ShapeKind> for Tool {
    fn from(kind: ShapeKind) -> Self {
        match kind {
            ShapeKind::Arrow => Tool::Arrow,
            ShapeKind::Rectangle => Tool::Rectangle,
            ShapeKind::Freehand => Tool::Freehand,
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.shape_kind() {
            Some(kind) => f.write_str(kind.as_str()),
            None => f.write_str("none"),
        }
    }
}

/// One annotation stroke: an arrow, a rectangle or a freehand path.
///
/// Arrows and rectangles hold exactly two points (start, end) once
/// finished; freehand paths hold at least two.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub kind: ShapeKind,
    pub points: Vec<Point>,
    pub color: Color,
    pub stroke_width: u32,
}

impl Shape {
    /// Start a shape at `start`. The result is still under construction.
    pub fn begin(kind: ShapeKind, start: Point, color: Color, stroke_width: u32) -> Self {
        Self {
            kind,
            points: vec![start],
            color,
            stroke_width,
        }
    }

    /// Build a finished shape, or `None` when there are too few points.
    pub fn finished(
        kind: ShapeKind,
        points: Vec<Point>,
        color: Color,
        stroke_width: u32,
    ) -> Option<Self> {
        let shape = Self {
            kind,
            points,
            color,
            stroke_width,
        };
        shape.is_complete().then_some(shape)
    }

    /// Add a point while the shape is being built.
    pub fn push_point(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Whether the shape has enough points to be stored.
    pub fn is_complete(&self) -> bool {
        self.points.len() >= 2
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Copy of this shape with `end` appended, used for live previews.
    pub fn with_end_point(&self, end: Point) -> Self {
        let mut preview = self.clone();
        preview.points.push(end);
        preview
    }
}
