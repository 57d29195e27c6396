// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rectangle helpers shared by the mask and the helper.

use kurbo::{Point, Rect, Size};

/// Expand a target's bounding rectangle by `padding` on all four sides.
///
/// ```rust
/// use kurbo::Rect;
/// use understory_placement::mask_rect;
///
/// let mask = mask_rect(Rect::new(10.0, 20.0, 60.0, 40.0), 5.0);
/// assert_eq!(mask, Rect::new(5.0, 15.0, 65.0, 45.0));
/// ```
pub fn mask_rect(target: Rect, padding: f64) -> Rect {
    target.inflate(padding, padding)
}

/// Edge-inclusive containment test.
///
/// Unlike [`Rect::contains`], points on the right and bottom edges count as inside.
pub fn contains_inclusive(rect: Rect, point: Point) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

/// The viewport as a rectangle anchored at the origin.
pub fn viewport_rect(viewport: Size) -> Rect {
    Rect::from_origin_size(Point::ZERO, viewport)
}

/// Clamp `value` into `[margin, extent - size - margin]`.
///
/// The lower bound wins when the range is empty, so a helper larger than the
/// viewport still starts `margin` away from the leading edge.
pub(crate) fn clamp_axis(value: f64, size: f64, extent: f64, margin: f64) -> f64 {
    margin.max((extent - size - margin).min(value))
}
