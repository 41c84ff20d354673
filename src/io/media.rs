// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image file loading and writing.
//!
//! Frames are read with the `image` crate and always written back as PNG.

use crate::render::RasterImage;
use anyhow::{Context, Result};
use std::path::Path;

/// Load an image file into an RGBA raster.
pub fn load_image(path: &Path) -> Result<RasterImage> {
    let image = image::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    log::debug!("Loaded {} ({}x{})", path.display(), image.width(), image.height());
    Ok(RasterImage::from_dynamic(image))
}

/// Encode `image` as PNG and write it, creating missing parent directories.
pub fn write_png(image: &RasterImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create directory {}", parent.display()))?;
    }
    let bytes = image.encode_png()?;
    std::fs::write(path, bytes).with_context(|| format!("cannot write {}", path.display()))?;
    Ok(())
}
