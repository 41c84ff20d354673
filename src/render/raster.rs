// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Owned RGBA raster images.
//!
//! Every drawing operation works on a copy; an image handed to a caller is
//! never changed behind its back.

use crate::models::color::Color;
use anyhow::{anyhow, Context, Result};
use image::{DynamicImage, ImageFormat, Pixel, Rgba, RgbaImage};
use tiny_skia::Pixmap;

/// A straight-alpha RGBA8 image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pixels: RgbaImage,
}

impl RasterImage {
    /// A fully transparent image.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
        }
    }

    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(width, height, Rgba(color.to_array())),
        }
    }

    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self {
            pixels: image.into_rgba8(),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Color at a pixel, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.pixels
            .get_pixel_checked(x, y)
            .map(|p| Color::from_array(p.0))
    }

    pub fn as_rgba(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn as_rgba_mut(&mut self) -> &mut RgbaImage {
        &mut self.pixels
    }

    pub fn into_rgba(self) -> RgbaImage {
        self.pixels
    }

    /// A transparent pixmap the size of this image, for drawing shapes on
    /// before they are composited.
    pub(crate) fn layer(&self) -> Result<Pixmap> {
        let (width, height) = self.dimensions();
        Pixmap::new(width, height).ok_or_else(|| anyhow!("cannot allocate {}x{} layer", width, height))
    }

    /// Blend a premultiplied layer over this image, source over. Pixels the
    /// layer leaves transparent are not touched, so translucent images keep
    /// their exact values outside the drawn shapes.
    pub(crate) fn composite(&mut self, layer: &Pixmap) {
        for (dst, src) in self.pixels.pixels_mut().zip(layer.pixels()) {
            if src.alpha() == 0 {
                continue;
            }
            let color = src.demultiply();
            dst.blend(&Rgba([color.red(), color.green(), color.blue(), color.alpha()]));
        }
    }

    /// Encode as PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut buffer = std::io::Cursor::new(Vec::new());
        self.pixels
            .write_to(&mut buffer, ImageFormat::Png)
            .context("cannot encode PNG")?;
        Ok(buffer.into_inner())
    }

    /// Decode any supported image format.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(bytes).context("cannot decode image")?;
        Ok(Self::from_dynamic(image))
    }
}

impl From<RgbaImage> for RasterImage {
    fn from(pixels: RgbaImage) -> Self {
        Self::from_rgba(pixels)
    }
}

impl From<DynamicImage> for RasterImage {
    fn from(image: DynamicImage) -> Self {
        Self::from_dynamic(image)
    }
}
