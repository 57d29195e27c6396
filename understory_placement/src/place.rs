// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Side selection and coordinate computation for the helper.

use kurbo::{Point, Rect, Size};

use crate::geometry::clamp_axis;
use crate::types::{Align, Side, SidePreference};

/// Distances the placement keeps from the mask and from the viewport edges.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlacementParams {
    /// Gap between the mask edge and the helper.
    pub mask_helper_distance: f64,
    /// Minimum gap between the helper and any viewport edge.
    pub screen_helper_distance: f64,
}

impl Default for PlacementParams {
    fn default() -> Self {
        Self {
            mask_helper_distance: 10.0,
            screen_helper_distance: 10.0,
        }
    }
}

/// Whether the helper fits against each side of the mask.
///
/// A side fits when the space between the mask edge and the matching viewport
/// edge is at least the helper's extent on that axis plus the mask distance.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Fit {
    /// Room to the left of the mask.
    pub left: bool,
    /// Room to the right of the mask.
    pub right: bool,
    /// Room above the mask.
    pub top: bool,
    /// Room below the mask.
    pub bottom: bool,
}

impl Fit {
    /// Compute fit flags for all four sides.
    pub fn compute(mask: Rect, helper: Size, viewport: Size, mask_helper_distance: f64) -> Self {
        let needed_x = helper.width + mask_helper_distance;
        let needed_y = helper.height + mask_helper_distance;
        Self {
            left: mask.x0 >= needed_x,
            right: viewport.width - mask.x1 >= needed_x,
            top: mask.y0 >= needed_y,
            bottom: viewport.height - mask.y1 >= needed_y,
        }
    }

    /// Look up the flag for `side`.
    pub const fn get(&self, side: Side) -> bool {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
            Side::Top => self.top,
            Side::Bottom => self.bottom,
        }
    }
}

/// The result of [`place`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Placement {
    /// The side the helper ended up on.
    pub side: Side,
    /// The cross-axis alignment that was applied.
    pub align: Align,
    /// Top-left corner of the helper, in viewport coordinates, after clamping.
    pub origin: Point,
}

impl Placement {
    /// The helper's rectangle for a helper of the given size.
    pub fn rect(&self, helper: Size) -> Rect {
        Rect::from_origin_size(self.origin, helper)
    }
}

/// Pick the side to use given the step's preference and the fit flags.
///
/// Explicit orders take the first side that fits. A single preferred side is
/// kept when it fits, otherwise its [`Side::fallbacks`] are tried in order.
/// When nothing fits the result is [`Side::Left`]; clamping in [`place`] keeps
/// the helper on screen regardless.
pub fn choose_side(preference: SidePreference, fit: &Fit) -> Side {
    match preference {
        SidePreference::Ordered(order) => order.into_iter().find(|s| fit.get(*s)),
        SidePreference::Single(side) if fit.get(side) => Some(side),
        SidePreference::Single(side) => side.fallbacks().into_iter().find(|s| fit.get(*s)),
    }
    .unwrap_or(Side::Left)
}

/// Compute where the helper goes relative to `mask`.
///
/// This is pure: it depends only on its inputs, so hosts re-run it whenever
/// the mask, the helper's measured size, the viewport, or the step changes.
///
/// ```rust
/// use kurbo::{Point, Rect, Size};
/// use understory_placement::{Align, PlacementParams, Side, SidePreference, place};
///
/// let viewport = Size::new(1000.0, 800.0);
/// // Mask hugging the left edge: "left" cannot fit, so its first fallback wins.
/// let mask = Rect::new(0.0, 100.0, 200.0, 200.0);
/// let helper = Size::new(100.0, 50.0);
///
/// let placement = place(
///     mask,
///     helper,
///     viewport,
///     SidePreference::Single(Side::Left),
///     Align::Start,
///     PlacementParams::default(),
/// );
/// assert_eq!(placement.side, Side::Right);
/// assert_eq!(placement.origin, Point::new(210.0, 100.0));
/// ```
pub fn place(
    mask: Rect,
    helper: Size,
    viewport: Size,
    preference: SidePreference,
    align: Align,
    params: PlacementParams,
) -> Placement {
    let distance = params.mask_helper_distance;
    let fit = Fit::compute(mask, helper, viewport, distance);
    let side = choose_side(preference, &fit);

    let (mut x, mut y) = match side {
        Side::Top => (mask.x0, mask.y0 - helper.height - distance),
        Side::Bottom => (mask.x0, mask.y1 + distance),
        Side::Left => (mask.x0 - helper.width - distance, mask.y0),
        Side::Right => (mask.x1 + distance, mask.y0),
    };

    if side.is_horizontal() {
        y = match align {
            Align::Start => y,
            Align::Center => y + mask.height() / 2.0 - helper.height / 2.0,
            Align::End => y + mask.height() - helper.height,
        };
    } else {
        x = match align {
            Align::Start => x,
            Align::Center => x + mask.width() / 2.0 - helper.width / 2.0,
            Align::End => x + mask.width() - helper.width,
        };
    }

    let margin = params.screen_helper_distance;
    Placement {
        side,
        align,
        origin: Point::new(
            clamp_axis(x, helper.width, viewport.width, margin),
            clamp_axis(y, helper.height, viewport.height, margin),
        ),
    }
}
