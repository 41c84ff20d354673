// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Info text overlays.
//!
//! Lines are stacked from the top-left corner. Each line sits on a
//! semi-transparent plate so it stays readable over any frame.

use crate::models::color::Color;
use ab_glyph::{FontArc, PxScale};
use anyhow::{Context, Result};
use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Pixel, Rgba, RgbaImage};
use std::path::Path;

use super::raster::RasterImage;

/// Distance of the text block from the top-left corner.
pub const TEXT_MARGIN: i32 = 10;
/// Extra space between consecutive baselines.
pub const LINE_GAP: i32 = 5;
/// Plate padding left and right of the text.
pub const PLATE_PAD_X: i32 = 5;
/// Plate padding below the baseline.
pub const PLATE_PAD_BOTTOM: i32 = 5;

/// The font used to render overlay text.
#[derive(Clone, Default)]
pub enum TextFace {
    /// Built-in 8x8 bitmap glyphs scaled to the font size.
    #[default]
    Bitmap,
    /// A TrueType/OpenType font.
    Outline(FontArc),
}

impl std::fmt::Debug for TextFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TextFace::Bitmap => f.write_str("TextFace::Bitmap"),
            TextFace::Outline(_) => f.write_str("TextFace::Outline"),
        }
    }
}

impl TextFace {
    /// Load an outline font from disk.
    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("cannot read font {}", path.display()))?;
        let font = FontArc::try_from_vec(bytes)
            .with_context(|| format!("cannot parse font {}", path.display()))?;
        Ok(TextFace::Outline(font))
    }

    /// Use the font at `path` if there is one and it loads, else the bitmap face.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return TextFace::Bitmap;
        };
        match Self::from_file(path) {
            Ok(face) => {
                log::info!("Using overlay font {}", path.display());
                face
            }
            Err(e) => {
                log::warn!("Falling back to bitmap font: {:#}", e);
                TextFace::Bitmap
            }
        }
    }

    /// Width and height of `text` at `size` pixels. The height is measured
    /// from the top of the text to its baseline.
    pub fn measure(&self, text: &str, size: u32) -> (u32, u32) {
        match self {
            TextFace::Bitmap => {
                let chars = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
                (chars.saturating_mul(size), size)
            }
            TextFace::Outline(font) => {
                imageproc::drawing::text_size(PxScale::from(size as f32), font, text)
            }
        }
    }

    /// Draw `text` with its left edge at `x` and its baseline at `baseline`.
    pub fn draw(
        &self,
        image: &mut RgbaImage,
        x: i32,
        baseline: i32,
        size: u32,
        color: Color,
        text: &str,
    ) {
        match self {
            TextFace::Bitmap => draw_bitmap_text(image, x, baseline, size, color, text),
            TextFace::Outline(font) => {
                let (_, height) = self.measure(text, size);
                imageproc::drawing::draw_text_mut(
                    image,
                    Rgba(color.to_array()),
                    x,
                    baseline.saturating_sub(to_i32(height)),
                    PxScale::from(size as f32),
                    font,
                    text,
                );
            }
        }
    }
}

fn draw_bitmap_text(image: &mut RgbaImage, x: i32, baseline: i32, size: u32, color: Color, text: &str) {
    let cell = i64::from(size.max(1));
    let top = i64::from(baseline) - cell;
    let (width, height) = (i64::from(image.width()), i64::from(image.height()));
    let ink = Rgba(color.to_array());

    // Only the part of each glyph cell that lands inside the image is visited.
    let rows = (-top).clamp(0, cell)..(height - top).clamp(0, cell);
    for (index, ch) in text.chars().enumerate() {
        let left = i64::from(x) + index as i64 * cell;
        if left >= width {
            break;
        }
        let Some(glyph) = BASIC_FONTS.get(ch).or_else(|| BASIC_FONTS.get('?')) else {
            continue;
        };
        for py in rows.clone() {
            let row = glyph[(py * 8 / cell) as usize];
            for px in (-left).clamp(0, cell)..(width - left).clamp(0, cell) {
                if (row >> (px * 8 / cell)) & 1 == 0 {
                    continue;
                }
                let pixel = image.get_pixel_mut((left + px) as u32, (top + py) as u32);
                pixel.blend(&ink);
            }
        }
    }
}

fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Alpha-blend a rectangle, clipped to the image.
fn fill_rect_alpha(image: &mut RgbaImage, x: i32, y: i32, width: u32, height: u32, color: Color) {
    let ink = Rgba(color.to_array());
    let x_end = x.saturating_add(to_i32(width)).min(to_i32(image.width()));
    let y_end = y.saturating_add(to_i32(height)).min(to_i32(image.height()));
    for py in y.max(0)..y_end {
        for px in x.max(0)..x_end {
            image.get_pixel_mut(px as u32, py as u32).blend(&ink);
        }
    }
}

/// Placement of one overlay line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinePlacement {
    /// Index of the line in the input, blank lines included.
    pub index: usize,
    pub baseline: i32,
    pub plate_x: i32,
    pub plate_y: i32,
    pub plate_width: u32,
    pub plate_height: u32,
}

/// Lay out overlay lines.
///
/// Blank lines get no placement but still take up their slot, so the
/// baseline of line `i` is always `margin + (i + 1) * (size + gap)`.
pub fn layout_lines<S: AsRef<str>>(face: &TextFace, lines: &[S], size: u32) -> Vec<LinePlacement> {
    let line_height = to_i32(size).saturating_add(LINE_GAP);
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| !line.as_ref().trim().is_empty())
        .map(|(index, line)| {
            let slot = i32::try_from(index + 1).unwrap_or(i32::MAX);
            let baseline = slot.saturating_mul(line_height).saturating_add(TEXT_MARGIN);
            let (width, height) = face.measure(line.as_ref(), size);
            LinePlacement {
                index,
                baseline,
                plate_x: TEXT_MARGIN - PLATE_PAD_X,
                plate_y: baseline.saturating_sub(to_i32(height)),
                plate_width: width.saturating_add(2 * PLATE_PAD_X as u32),
                plate_height: height.saturating_add(PLATE_PAD_BOTTOM as u32),
            }
        })
        .collect()
}

/// Copy of `image` with the lines drawn on their plates.
pub fn render_text_overlay<S: AsRef<str>>(
    image: &RasterImage,
    face: &TextFace,
    lines: &[S],
    size: u32,
    color: Color,
) -> RasterImage {
    let mut canvas = image.clone().into_rgba();
    for placement in layout_lines(face, lines, size) {
        fill_rect_alpha(
            &mut canvas,
            placement.plate_x,
            placement.plate_y,
            placement.plate_width,
            placement.plate_height,
            Color::TEXT_PLATE,
        );
        face.draw(
            &mut canvas,
            TEXT_MARGIN,
            placement.baseline,
            size,
            color,
            lines[placement.index].as_ref(),
        );
    }
    RasterImage::from_rgba(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_lines_keep_their_slot() {
        let lines = ["File: demo.mp4", "", "Time: 00:02:05"];
        let placements = layout_lines(&TextFace::Bitmap, &lines, 16);

        assert_eq!(placements.len(), 2);
        assert_eq!(placements[0].baseline, 31);
        assert_eq!(placements[1].index, 2);
        assert_eq!(placements[1].baseline, 73);
    }

    #[test]
    fn test_plate_geometry() {
        let placements = layout_lines(&TextFace::Bitmap, &["abc"], 16);
        let plate = &placements[0];
        assert_eq!((plate.plate_x, plate.plate_y), (5, 15));
        assert_eq!((plate.plate_width, plate.plate_height), (3 * 16 + 10, 21));
    }

    #[test]
    fn test_huge_size_layout_saturates() {
        let placements = layout_lines(&TextFace::Bitmap, &["File: demo.mp4", "Time: 00:00:01"], u32::MAX);
        assert_eq!(placements[0].plate_width, u32::MAX);
        assert_eq!(placements[1].baseline, i32::MAX);
    }

    #[test]
    fn test_whitespace_only_line_is_skipped() {
        assert!(layout_lines(&TextFace::Bitmap, &["   ", "\t"], 16).is_empty());
    }

    #[test]
    fn test_overlay_darkens_plate_and_leaves_rest() {
        let image = RasterImage::filled(400, 300, Color::WHITE);
        let result = render_text_overlay(&image, &TextFace::Bitmap, &["File: demo.mp4", "", "Time: 00:02:05"], 16, Color::WHITE);

        // Inside the first plate, left of the text.
        let plate = result.pixel(6, 20).unwrap();
        assert!(plate.r < 200 && plate.a == 255);
        // The skipped slot between the two plates.
        assert_eq!(result.pixel(6, 45), Some(Color::WHITE));
        // Inside the second plate.
        assert!(result.pixel(6, 65).unwrap().r < 200);
        // Far from any text.
        assert_eq!(result.pixel(390, 290), Some(Color::WHITE));
        // Input untouched.
        assert_eq!(image.pixel(6, 20), Some(Color::WHITE));
    }

    #[test]
    fn test_bitmap_text_draws_ink() {
        let image = RasterImage::filled(100, 40, Color::BLACK);
        let result = render_text_overlay(&image, &TextFace::Bitmap, &["H"], 16, Color::RED);
        let red_pixels = result
            .as_rgba()
            .pixels()
            .filter(|p| p.0 == [255, 0, 0, 255])
            .count();
        assert!(red_pixels > 0);
    }

    #[test]
    fn test_missing_font_falls_back_to_bitmap() {
        let face = TextFace::load_or_default(Some(Path::new("/definitely/not/a/font.ttf")));
        assert!(matches!(face, TextFace::Bitmap));
    }
}
