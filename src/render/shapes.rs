// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Anti-aliased shape strokes.
//!
//! The one-shot engine operations, the live canvas preview and session
//! flattening all go through these functions, so the same shape always
//! produces the same pixels.

use crate::models::{
    annotation::{Point, Shape, ShapeKind},
    color::Color,
};
use crate::util::geometry::{arrow_head, rect_corners};

use super::raster::RasterImage;
use tiny_skia::{LineCap, LineJoin, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

fn paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}

fn stroke(width: u32) -> Stroke {
    Stroke {
        width: width.max(1) as f32,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Default::default()
    }
}

fn xy(point: Point) -> (f32, f32) {
    (point.x as f32, point.y as f32)
}

/// Shaft plus two head segments of `head_length` at 30 degrees.
pub fn draw_arrow(
    pixmap: &mut Pixmap,
    start: Point,
    end: Point,
    color: Color,
    width: u32,
    head_length: u32,
    transform: Transform,
) {
    let [wing1, wing2] = arrow_head(start, end, head_length);
    let (ex, ey) = xy(end);

    let mut pb = PathBuilder::new();
    for (from, to) in [(start, end), (end, wing1), (end, wing2)] {
        let (fx, fy) = xy(from);
        let (tx, ty) = xy(to);
        pb.move_to(fx, fy);
        pb.line_to(tx, ty);
    }
    let Some(path) = pb.finish() else {
        log::debug!("Skipping degenerate arrow at ({}, {})", ex, ey);
        return;
    };
    pixmap.stroke_path(&path, &paint(color), &stroke(width), transform, None);
}

/// Rectangle spanned by two corners, stroked or filled.
pub fn draw_rectangle(
    pixmap: &mut Pixmap,
    corner_a: Point,
    corner_b: Point,
    color: Color,
    width: u32,
    filled: bool,
    transform: Transform,
) {
    let (min, max) = rect_corners(corner_a, corner_b);
    let Some(rect) = Rect::from_ltrb(min.x as f32, min.y as f32, max.x as f32, max.y as f32) else {
        return;
    };

    if filled {
        pixmap.fill_rect(rect, &paint(color), transform, None);
        return;
    }

    let mut pb = PathBuilder::new();
    pb.move_to(rect.left(), rect.top());
    pb.line_to(rect.right(), rect.top());
    pb.line_to(rect.right(), rect.bottom());
    pb.line_to(rect.left(), rect.bottom());
    pb.close();
    if let Some(path) = pb.finish() {
        pixmap.stroke_path(&path, &paint(color), &stroke(width), transform, None);
    }
}

/// Connected segments through `points` in order. Fewer than two points
/// draws nothing.
pub fn draw_polyline(
    pixmap: &mut Pixmap,
    points: &[Point],
    color: Color,
    width: u32,
    transform: Transform,
) {
    let [first, rest @ ..] = points else {
        return;
    };
    if rest.is_empty() {
        return;
    }

    let mut pb = PathBuilder::new();
    let (x, y) = xy(*first);
    pb.move_to(x, y);
    for point in rest {
        let (x, y) = xy(*point);
        pb.line_to(x, y);
    }
    if let Some(path) = pb.finish() {
        pixmap.stroke_path(&path, &paint(color), &stroke(width), transform, None);
    }
}

/// Draw a stored or preview shape. Shapes missing points draw nothing.
pub fn draw_shape(pixmap: &mut Pixmap, shape: &Shape, head_length: u32, transform: Transform) {
    match (shape.kind, shape.points.as_slice()) {
        (ShapeKind::Arrow, [start, end, ..]) => draw_arrow(
            pixmap,
            *start,
            *end,
            shape.color,
            shape.stroke_width,
            head_length,
            transform,
        ),
        (ShapeKind::Rectangle, [a, b, ..]) => {
            draw_rectangle(pixmap, *a, *b, shape.color, shape.stroke_width, false, transform)
        }
        (ShapeKind::Freehand, points) => {
            draw_polyline(pixmap, points, shape.color, shape.stroke_width, transform)
        }
        _ => {}
    }
}

/// Draw shapes oldest first, so later shapes end up on top.
pub fn draw_shapes<'a>(
    pixmap: &mut Pixmap,
    shapes: impl IntoIterator<Item = &'a Shape>,
    head_length: u32,
    transform: Transform,
) {
    for shape in shapes {
        draw_shape(pixmap, shape, head_length, transform);
    }
}

/// Draw `shapes` in list order onto `layer`, a transparent pixmap the size
/// of `base`, then composite the layer over a copy of `base`.
pub fn flatten<'a>(
    base: &RasterImage,
    mut layer: Pixmap,
    shapes: impl IntoIterator<Item = &'a Shape>,
    head_length: u32,
) -> RasterImage {
    draw_shapes(&mut layer, shapes, head_length, Transform::identity());
    let mut output = base.clone();
    output.composite(&layer);
    output
}
