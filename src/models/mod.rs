// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data model: colors, tools, shapes and shape documents.

pub mod annotation;
pub mod color;
pub mod project;

pub use annotation::{Point, Shape, ShapeKind, Tool};
pub use color::{Color, Palette};
pub use project::ShapeDocument;
