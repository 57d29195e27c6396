// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Placement: viewport-fit placement of a helper next to a highlighted region.
//!
//! Guided tours, coach marks, and popovers all need to answer the same question:
//! given a highlighted region (the *mask*) and an annotation box (the *helper*) of known
//! size, where should the helper go so that it neither covers the mask nor runs off the
//! screen?
//!
//! This crate answers it with a small, pure algorithm:
//!
//! 1. For each [`Side`], decide whether the helper fits between the mask edge and the
//!    matching viewport edge, keeping [`PlacementParams::mask_helper_distance`] of clearance
//!    ([`Fit`]).
//! 2. Pick a side from the step's [`SidePreference`]: an explicit order takes the first side
//!    that fits; a single side is kept if it fits, otherwise its fixed
//!    [`fallbacks`](Side::fallbacks) are tried. If nothing fits, [`Side::Left`] is used.
//! 3. Place the helper against that side and apply [`Align`] on the cross axis.
//! 4. Clamp both coordinates into
//!    `[screen_helper_distance, viewport - helper - screen_helper_distance]`.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Rect, Size};
//! use understory_placement::{Align, PlacementParams, Side, mask_rect, place};
//!
//! // A 100x40 target, highlighted with 5px of padding.
//! let mask = mask_rect(Rect::new(300.0, 200.0, 400.0, 240.0), 5.0);
//! let placement = place(
//!     mask,
//!     Size::new(120.0, 60.0),
//!     Size::new(1024.0, 768.0),
//!     Side::Bottom.into(),
//!     Align::Center,
//!     PlacementParams::default(),
//! );
//!
//! assert_eq!(placement.side, Side::Bottom);
//! assert_eq!(placement.side.as_str(), "bottom");
//! // Centered under the mask, 10px below its bottom edge.
//! assert_eq!(placement.origin.x, 290.0);
//! assert_eq!(placement.origin.y, 255.0);
//! ```
//!
//! All geometry is expressed with [`kurbo`] types in viewport coordinates
//! (origin at the top-left corner of the visible area).
//!
//! ## Features
//!
//! - `std` (default): enables `std` support for `kurbo`.
//! - `libm`: `no_std` builds relying on `libm` for floating-point math.
//! - `serde`: derives `Serialize`/`Deserialize` for [`Side`], [`Align`], and
//!   [`SidePreference`] using lower-case names.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod geometry;
mod place;
mod types;

pub use geometry::{contains_inclusive, mask_rect, viewport_rect};
pub use place::{Fit, Placement, PlacementParams, choose_side, place};
pub use types::{Align, Side, SidePreference};
