// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! FRAMEMARK - frame capture annotation for video review
//!
//! Burns file and position info into captured frames and lets the user mark
//! them up with arrows, rectangles and freehand strokes before saving.

pub mod canvas;
pub mod config;
pub mod engine;
pub mod events;
pub mod io;
pub mod models;
pub mod render;
pub mod screenshot;
pub mod session;
pub mod util;

pub use canvas::{Canvas, CanvasState};
pub use config::{AnnotationConfig, Settings};
pub use engine::{AnnotationEngine, AnnotationInfo};
pub use events::{Event, EventSink};
pub use models::{Color, Palette, Point, Shape, ShapeDocument, ShapeKind, Tool};
pub use render::RasterImage;
pub use screenshot::{FrameInfo, PlaybackSource, ScreenshotManager, VideoInfo};
pub use session::AnnotationSession;
