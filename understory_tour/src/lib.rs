// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Tour: a headless guided-tour engine.
//!
//! A tour walks the user through an ordered list of [`Step`]s, each naming a UI element by
//! selector. For the active step the engine:
//!
//! - resolves the selector to a live element, re-resolving when watched subtrees mutate
//!   ([`ElementCache`]);
//! - brings the element into view if it is not already visible, and only trusts its geometry
//!   once a visibility observation confirms the scroll arrived ([`ScrollSync`]);
//! - exposes the highlighted *mask* rectangle and places the *helper* annotation next to it
//!   using [`understory_placement`].
//!
//! It never draws and never reaches for a global document. Everything platform-specific goes
//! through the [`host`] traits, and everything visual goes through a
//! [`RenderStrategy`](render::RenderStrategy).
//!
//! ## Event flow
//!
//! Platform callbacks are not delivered by calling into the engine. The host turns them into
//! [`HostEvent`]s, and the tour processes them in order on its own queue
//! ([`Tour::post`] / [`Tour::process`], or [`Tour::handle`]). Callback code receives a read-only
//! [`TourSnapshot`] and a [`Commands`] buffer; commands run after the callback returns.
//!
//! While a scroll into view is in flight the tour suspends its own scroll listeners, so the
//! scroll it caused does not feed back into it, and [`Tour::is_scrolling`] reports `true`.
//! An observation that reports after a newer navigation superseded it is discarded.
//!
//! ## Example
//!
//! ```rust
//! use kurbo::{Rect, Size};
//! use understory_placement::{Align, Side};
//! use understory_tour::headless::{ElementId, HeadlessHost};
//! use understory_tour::render::Frame;
//! use understory_tour::{Step, Tour, TourConfig};
//!
//! let mut host = HeadlessHost::new(Size::new(1024.0, 768.0));
//! host.insert(None, "#search", Rect::new(400.0, 20.0, 620.0, 60.0));
//! host.insert(None, "#results", Rect::new(100.0, 1200.0, 900.0, 1500.0));
//!
//! let steps: Vec<Step<ElementId, &'static str>> = vec![
//!     Step {
//!         position: Side::Bottom.into(),
//!         align: Align::Center,
//!         ..Step::with_data("#search", "Type here to search.")
//!     },
//!     Step::with_data("#results", "Results show up here."),
//! ];
//! let mut tour = Tour::new(1, steps, TourConfig::default()).unwrap();
//! tour.mount(&mut host);
//!
//! let mut describe = |frame: &Frame<'_, ElementId, &'static str>| {
//!     let text = frame.snapshot.step.map(|s| s.data).unwrap_or_default();
//!     let side = frame.helper.map(|p| p.side.as_str()).unwrap_or("none");
//!     (text, side)
//! };
//! let helper = Some(Size::new(200.0, 80.0));
//! assert_eq!(tour.render(&host, helper, &mut describe), ("Type here to search.", "bottom"));
//!
//! // The results are off screen: the tour scrolls, then commits geometry on arrival.
//! tour.next(&mut host);
//! assert!(tour.is_scrolling());
//! host.pump(&mut tour);
//! assert!(!tour.is_scrolling());
//! assert_eq!(tour.focus_rect(), Rect::new(100.0, 468.0, 900.0, 768.0));
//! ```
//!
//! ## Features
//!
//! - `std` (default): enables `std` support for `kurbo` and `understory_placement`.
//! - `libm`: `no_std` builds relying on `libm` for floating-point math.
//!
//! Logging goes through [`tracing`]; no subscriber is installed by this crate.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod config;
mod elements;
pub mod headless;
pub mod host;
mod navigation;
pub mod render;
mod scroll;
mod step;
mod subscription;
mod tour;

pub use config::{ConfigError, MutationWatch, TourConfig};
pub use elements::ElementCache;
pub use host::{
    ElementRef, EventKind, EventTarget, Host, HostEvent, ListenerId, ObserverId, ScrollBehavior,
    TargetRef,
};
pub use navigation::{Direction, Move, Navigator};
pub use scroll::{
    FocusRequest, MIN_VISIBILITY_THRESHOLD, ScrollSync, SyncOutcome, halt_momentum, is_in_view,
    visibility_threshold, visible_region,
};
pub use step::{IntersectionOptions, Step};
pub use subscription::SubscriptionRegistry;
pub use tour::{CloseRequest, Command, Commands, Tour, TourCallbacks, TourSnapshot};
