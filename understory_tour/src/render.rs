// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rendering seam.
//!
//! The engine never draws. A renderer implements [`RenderStrategy`], receives a
//! [`Frame`] with everything already measured and placed, and produces whatever
//! its toolkit needs. Closures taking a `&Frame` are strategies too.

use kurbo::{Rect, Size};
use understory_placement::Placement;

use crate::tour::TourSnapshot;

/// Geometry of one render pass.
#[derive(Debug)]
pub struct Frame<'a, E, D> {
    /// Navigation state at the time of the pass.
    pub snapshot: TourSnapshot<'a, E, D>,
    /// Last committed rectangle of the target, in viewport coordinates.
    pub focus_rect: Rect,
    /// The highlighted region: `focus_rect` grown by the mask padding.
    pub mask: Rect,
    /// Corner radius of the mask.
    pub mask_radius: f64,
    /// Viewport size used for placement.
    pub viewport: Size,
    /// Where the helper goes, when its size was supplied.
    pub helper: Option<Placement>,
}

impl<E, D> Frame<'_, E, D> {
    /// The helper's rectangle, when it was placed.
    pub fn helper_rect(&self, helper_size: Size) -> Option<Rect> {
        self.helper.map(|p| p.rect(helper_size))
    }
}

/// Turns a [`Frame`] into something a toolkit can show.
pub trait RenderStrategy<E, D> {
    /// What a render pass produces.
    type Output;

    /// Render one frame.
    fn render(&mut self, frame: &Frame<'_, E, D>) -> Self::Output;
}

impl<E, D, O, F> RenderStrategy<E, D> for F
where
    F: FnMut(&Frame<'_, E, D>) -> O,
{
    type Output = O;

    fn render(&mut self, frame: &Frame<'_, E, D>) -> O {
        self(frame)
    }
}
