// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Raster images and the compositing primitives drawn onto them.

pub mod raster;
pub mod shapes;
pub mod text;

pub use raster::RasterImage;
pub use text::TextFace;
