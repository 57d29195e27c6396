// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Steps: one stop of a tour, identified by a selector.

use alloc::string::String;

use kurbo::Insets;
use understory_placement::{Align, SidePreference};

use crate::host::ElementRef;

/// Per-step overrides for the visibility observation used while scrolling.
///
/// Every field left as `None` falls back to what the engine derives itself: the
/// viewport as root, no margin, and a threshold computed from the target's and
/// container's geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct IntersectionOptions<E> {
    /// Reference area. Selectors that match nothing fall back to the viewport.
    pub root: Option<ElementRef<E>>,
    /// Outsets applied to the root.
    pub root_margin: Option<Insets>,
    /// Visible ratio that counts as arrived, in `[0, 1]`.
    pub threshold: Option<f64>,
}

impl<E> Default for IntersectionOptions<E> {
    fn default() -> Self {
        Self {
            root: None,
            root_margin: None,
            threshold: None,
        }
    }
}

/// One stop of a guided tour.
///
/// Steps are supplied by the caller and never mutated by the engine. `D` is an
/// opaque payload handed back to callbacks and renderers untouched.
///
/// ```rust
/// use understory_placement::{Align, Side};
/// use understory_tour::Step;
///
/// let step: Step<u32, &str> = Step {
///     align: Align::Center,
///     position: Side::Bottom.into(),
///     ..Step::with_data("#save-button", "Save your work here")
/// };
/// assert_eq!(step.selector, "#save-button");
/// assert!(step.scroll_into_view);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Step<E, D = ()> {
    /// Selector resolved through the host's document.
    pub selector: String,
    /// Cross-axis alignment of the helper.
    pub align: Align,
    /// Preferred helper side(s).
    pub position: SidePreference,
    /// Whether the engine scrolls the target into view. When `false` the
    /// target's geometry is read as-is.
    pub scroll_into_view: bool,
    /// Overrides for the arrival observation.
    pub intersection: IntersectionOptions<E>,
    /// Scroll container of the target; the viewport when `None`.
    pub container: Option<ElementRef<E>>,
    /// Caller payload.
    pub data: D,
}

impl<E, D> Step<E, D> {
    /// A step with default placement and the given payload.
    pub fn with_data(selector: impl Into<String>, data: D) -> Self {
        Self {
            selector: selector.into(),
            align: Align::default(),
            position: SidePreference::default(),
            scroll_into_view: true,
            intersection: IntersectionOptions::default(),
            container: None,
            data,
        }
    }

    /// The container selector, if the container is given as one.
    pub fn container_selector(&self) -> Option<&str> {
        match &self.container {
            Some(ElementRef::Selector(selector)) => Some(selector),
            _ => None,
        }
    }
}

impl<E, D: Default> Step<E, D> {
    /// A step with default placement and a default payload.
    pub fn new(selector: impl Into<String>) -> Self {
        Self::with_data(selector, D::default())
    }
}
