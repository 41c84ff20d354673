// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module provides coordinate transformations between the scaled
//! display and image space, the view scaling policy, and arrow head
//! geometry.

use crate::models::annotation::Point;
use std::f64::consts::FRAC_PI_6;

/// Smallest allowed view scale.
pub const MIN_SCALE: f32 = 0.05;
/// Largest allowed view scale.
pub const MAX_SCALE: f32 = 8.0;
/// Scale used by `fit_scale` when the computed scale is not positive.
pub const FALLBACK_FIT_SCALE: f32 = 0.1;

/// Half-angle between the shaft and each arrow head wing.
pub const ARROW_HEAD_ANGLE: f64 = FRAC_PI_6;

/// Convert a display position to image space. Fractions are truncated.
pub fn display_to_image(display_x: f64, display_y: f64, scale: f32) -> Point {
    let scale = f64::from(scale);
    Point {
        x: (display_x / scale) as i32,
        y: (display_y / scale) as i32,
    }
}

pub fn clamp_scale(scale: f32) -> f32 {
    if scale.is_nan() {
        return 1.0;
    }
    scale.clamp(MIN_SCALE, MAX_SCALE)
}

/// Display size of an image at the given scale, at least 1px per side.
pub fn display_size(width: u32, height: u32, scale: f32) -> (u32, u32) {
    let scaled = |side: u32| ((side as f32 * scale).round() as u32).max(1);
    (scaled(width), scaled(height))
}

/// Scale that fits an image into a box without ever enlarging it.
///
/// Returns `None` for images with a zero dimension.
pub fn fit_scale(image_width: u32, image_height: u32, max_width: u32, max_height: u32) -> Option<f32> {
    if image_width == 0 || image_height == 0 {
        return None;
    }
    let scale_w = max_width as f32 / image_width as f32;
    let scale_h = max_height as f32 / image_height as f32;
    let mut scale = scale_w.min(scale_h).min(1.0);
    if scale <= 0.0 {
        scale = FALLBACK_FIT_SCALE;
    }
    Some(scale)
}

/// The two wing points of an arrow head ending at `end`.
///
/// Each wing is `head_length` away from the tip, 30 degrees either side of
/// the shaft. Coordinates are truncated to whole pixels.
pub fn arrow_head(start: Point, end: Point, head_length: u32) -> [Point; 2] {
    let dx = f64::from(end.x - start.x);
    let dy = f64::from(end.y - start.y);
    let angle = dy.atan2(dx);
    let length = f64::from(head_length);

    let wing = |offset: f64| Point {
        x: (f64::from(end.x) - length * (angle + offset).cos()) as i32,
        y: (f64::from(end.y) - length * (angle + offset).sin()) as i32,
    };

    [wing(-ARROW_HEAD_ANGLE), wing(ARROW_HEAD_ANGLE)]
}

/// Normalised corners (min, max) of the rectangle spanned by two points.
pub fn rect_corners(a: Point, b: Point) -> (Point, Point) {
    (
        Point::new(a.x.min(b.x), a.y.min(b.y)),
        Point::new(a.x.max(b.x), a.y.max(b.y)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_to_image_at_half_scale() {
        assert_eq!(display_to_image(50.0, 75.0, 0.5), Point::new(100, 150));
    }

    #[test]
    fn test_display_to_image_truncates() {
        assert_eq!(display_to_image(10.0, 10.0, 3.0), Point::new(3, 3));
        assert_eq!(display_to_image(0.9, 1.9, 1.0), Point::new(0, 1));
    }

    #[test]
    fn test_clamp_scale_limits() {
        assert_eq!(clamp_scale(0.02), 0.05);
        assert_eq!(clamp_scale(12.0), 8.0);
        assert_eq!(clamp_scale(1.5), 1.5);
    }

    #[test]
    fn test_display_size_never_zero() {
        assert_eq!(display_size(800, 600, 0.5), (400, 300));
        assert_eq!(display_size(10, 3, 0.05), (1, 1));
    }

    #[test]
    fn test_fit_scale_never_upscales() {
        assert_eq!(fit_scale(200, 100, 1000, 1000), Some(1.0));
        assert_eq!(fit_scale(1600, 1200, 800, 800), Some(0.5));
        assert_eq!(fit_scale(1600, 1200, 0, 600), Some(FALLBACK_FIT_SCALE));
        assert_eq!(fit_scale(0, 1200, 800, 600), None);
    }

    #[test]
    fn test_arrow_head_horizontal() {
        let [w1, w2] = arrow_head(Point::new(0, 0), Point::new(100, 0), 10);
        // cos(30deg) * 10 = 8.66; the vertical offset sits right at 5 and
        // truncation may land on either side of it.
        assert_eq!((w1.x, w2.x), (91, 91));
        assert!((4..=5).contains(&w1.y));
        assert_eq!(w2.y, -w1.y);
    }

    #[test]
    fn test_arrow_head_diagonal_is_symmetric() {
        let end = Point::new(200, 200);
        let [w1, w2] = arrow_head(Point::new(100, 100), end, 10);
        // Mirror images across the 45 degree shaft.
        assert_eq!((end.x - w1.x, end.y - w1.y), (end.y - w2.y, end.x - w2.x));
    }

    #[test]
    fn test_rect_corners_normalise() {
        let (min, max) = rect_corners(Point::new(30, 5), Point::new(10, 25));
        assert_eq!(min, Point::new(10, 5));
        assert_eq!(max, Point::new(30, 25));
    }
}
