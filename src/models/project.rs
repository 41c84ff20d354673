// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Shape documents.
//!
//! A shape document records the annotations made on one captured frame so
//! they can be exported, reloaded and flattened again later.

use super::annotation::Shape;
use serde::{Deserialize, Serialize};

/// Complete annotation data for one frame, for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeDocument {
    pub media_file: String,
    pub frame_width: u32,
    pub frame_height: u32,
    #[serde(default)]
    pub shapes: Vec<Shape>,
}

impl ShapeDocument {
    /// Create a document with the given media file and dimensions.
    pub fn new(media_file: String, frame_width: u32, frame_height: u32) -> Self {
        Self {
            media_file,
            frame_width,
            frame_height,
            shapes: Vec::new(),
        }
    }

    /// Drop shapes that could never have been committed by a canvas.
    pub fn retain_complete(&mut self) -> usize {
        let before = self.shapes.len();
        self.shapes.retain(Shape::is_complete);
        before - self.shapes.len()
    }
}
