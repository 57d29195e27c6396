// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll-to-visibility synchronization.
//!
//! Bringing a target into view is asynchronous: the host may animate the
//! scroll, and geometry read in the middle of it is meaningless. The protocol
//! therefore splits into a request and an arrival:
//!
//! - [`ScrollSync::update_focus`] reads the target's geometry right away when it
//!   is already inside its container's visible region (or the step opted out of
//!   scrolling). Otherwise it suspends the scroll-driven listeners, starts a
//!   one-shot intersection observation with a geometry-derived threshold, and
//!   asks the host to scroll.
//! - [`ScrollSync::on_intersection`] handles the observation firing. Stale
//!   observations (superseded by a newer request, or for an element that is no
//!   longer the current target) are discarded. On a genuine arrival it halts
//!   residual scrolling in every scrollable ancestor, re-reads the target's
//!   geometry, and resumes the suspended listeners.
//!
//! Between the two, [`ScrollSync::is_scrolling`] is `true`.

use core::fmt::Debug;
use core::hash::Hash;

use kurbo::{Insets, Rect, Size, Vec2};
use smallvec::SmallVec;
use tracing::{debug, trace};
use understory_placement::viewport_rect;

use crate::host::{Document, EventKind, Host, IntersectionInit, ObserverId, Scroll, ScrollBehavior};
use crate::subscription::SubscriptionRegistry;

/// Slack allowed when comparing edges, in viewport units.
const EDGE_TOLERANCE: f64 = 0.5;

/// Slack allowed when comparing an observed ratio with its threshold.
const RATIO_TOLERANCE: f64 = 1e-6;

/// Lowest derived threshold. A zero threshold would be met by a target that is
/// still entirely out of view.
pub const MIN_VISIBILITY_THRESHOLD: f64 = 1e-3;

/// The visible part of a scroll container: its box clipped to the viewport.
///
/// Without a container this is the viewport itself.
pub fn visible_region<D>(doc: &D, container: Option<&D::Element>) -> Rect
where
    D: Document + ?Sized,
{
    let viewport = viewport_rect(doc.viewport());
    match container {
        Some(container) => doc.bounding_rect(container).intersect(viewport),
        None => viewport,
    }
}

/// Whether `rect` lies entirely inside `region`, up to half a unit of slack.
pub fn is_in_view(rect: Rect, region: Rect) -> bool {
    rect.x0 >= region.x0 - EDGE_TOLERANCE
        && rect.y0 >= region.y0 - EDGE_TOLERANCE
        && rect.x1 <= region.x1 + EDGE_TOLERANCE
        && rect.y1 <= region.y1 + EDGE_TOLERANCE
}

/// Intersection ratio at which a target counts as "as visible as it can be".
///
/// Per axis the ratio is `region / content` when the region is the smaller of
/// the two and `content / region` otherwise; the threshold is the smaller of the
/// two axis ratios, clamped to `[MIN_VISIBILITY_THRESHOLD, 1]`. Degenerate
/// sizes, such as a container scrolled entirely out of the viewport, yield the
/// minimum.
///
/// ```rust
/// use kurbo::Size;
/// use understory_tour::visibility_threshold;
///
/// // A 400px-tall panel in a 200px-tall container can be at most half visible.
/// let t = visibility_threshold(Size::new(800.0, 400.0), Size::new(800.0, 200.0));
/// assert_eq!(t, 0.5);
/// ```
pub fn visibility_threshold(content: Size, region: Size) -> f64 {
    let threshold = axis_ratio(content.height, region.height).min(axis_ratio(content.width, region.width));
    if threshold.is_finite() {
        threshold.clamp(MIN_VISIBILITY_THRESHOLD, 1.0)
    } else {
        MIN_VISIBILITY_THRESHOLD
    }
}

fn axis_ratio(content: f64, region: f64) -> f64 {
    let content = content.max(0.0);
    let region = region.max(0.0);
    if region < content {
        region / content
    } else {
        content / region
    }
}

/// Stop inertial or smooth scrolling in every scrollable ancestor of `element`
/// by re-asserting its current offset, then do the same for the window.
///
/// Returns how many ancestor elements were touched; the window is not counted.
pub fn halt_momentum<H>(host: &mut H, element: &H::Element) -> usize
where
    H: Scroll + ?Sized,
{
    let mut scrollable: SmallVec<[(H::Element, Vec2); 8]> = SmallVec::new();
    let mut current = host.parent(element);
    while let Some(ancestor) = current {
        let state = host.scroll_state(&ancestor);
        current = host.parent(&ancestor);
        if state.is_scrollable() {
            scrollable.push((ancestor, state.offset));
        }
    }
    for (ancestor, offset) in &scrollable {
        host.set_scroll_offset(ancestor, *offset);
    }
    let window = host.window_offset();
    host.set_window_offset(window);
    scrollable.len()
}

/// What [`ScrollSync::update_focus`] needs to know about the step.
#[derive(Clone, Debug, PartialEq)]
pub struct FocusRequest<E> {
    /// Whether scrolling is allowed at all.
    pub scroll_into_view: bool,
    /// How to scroll.
    pub behavior: ScrollBehavior,
    /// The target's scroll container, already resolved. `None` is the viewport.
    pub container: Option<E>,
    /// Observation root override, already resolved.
    pub root: Option<E>,
    /// Observation margin override.
    pub root_margin: Option<Insets>,
    /// Threshold override.
    pub threshold: Option<f64>,
}

/// Result of [`ScrollSync::update_focus`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SyncOutcome {
    /// Geometry was read immediately.
    Committed(Rect),
    /// A scroll was requested; the geometry arrives through
    /// [`ScrollSync::on_intersection`].
    Scrolling,
}

#[derive(Clone, Debug)]
struct Pending<E> {
    observer: ObserverId,
    target: E,
    threshold: f64,
}

/// State of the scroll-to-visibility protocol for one tour.
#[derive(Clone, Debug)]
pub struct ScrollSync<E> {
    pending: Option<Pending<E>>,
    scrolling: bool,
}

impl<E> Default for ScrollSync<E> {
    fn default() -> Self {
        Self {
            pending: None,
            scrolling: false,
        }
    }
}

impl<E> ScrollSync<E>
where
    E: Clone + Eq + Hash + Debug,
{
    /// Create an idle synchronizer.
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` between a scroll request and its arrival.
    pub fn is_scrolling(&self) -> bool {
        self.scrolling
    }

    /// The observation currently awaited, if any.
    pub fn pending_observer(&self) -> Option<ObserverId> {
        self.pending.as_ref().map(|p| p.observer)
    }

    /// Bring `target` into view, or read its geometry if it already is.
    ///
    /// Any observation still pending from an earlier request is cancelled: a
    /// newer request always supersedes.
    pub fn update_focus<H>(
        &mut self,
        host: &mut H,
        target: &E,
        request: FocusRequest<E>,
        subscriptions: &mut SubscriptionRegistry<E>,
    ) -> SyncOutcome
    where
        H: Host<Element = E> + ?Sized,
    {
        if let Some(previous) = self.pending.take() {
            trace!(observer = ?previous.observer, "superseding pending observation");
            host.unobserve_intersection(previous.observer);
        }

        if !request.scroll_into_view {
            return self.commit_now(host, target, subscriptions);
        }

        let region = visible_region(&*host, request.container.as_ref());
        if is_in_view(host.bounding_rect(target), region) {
            return self.commit_now(host, target, subscriptions);
        }

        subscriptions.suspend(host, EventKind::Scroll);

        let threshold = match request.threshold {
            Some(threshold) => threshold.clamp(0.0, 1.0),
            None => visibility_threshold(host.content_size(target), region.size()),
        };
        let init = IntersectionInit {
            root: request.root,
            root_margin: request.root_margin.unwrap_or(Insets::ZERO),
            threshold,
        };
        let observer = host.observe_intersection(target, init);
        self.pending = Some(Pending {
            observer,
            target: target.clone(),
            threshold,
        });
        self.scrolling = true;

        debug!(?target, ?observer, threshold, behavior = ?request.behavior, "scrolling target into view");
        host.scroll_into_view(target, request.behavior);
        SyncOutcome::Scrolling
    }

    /// Handle an intersection observation firing.
    ///
    /// Returns the target's settled geometry on arrival, or `None` when the
    /// observation is stale, below threshold, or reports nothing visible.
    pub fn on_intersection<H>(
        &mut self,
        host: &mut H,
        observer: ObserverId,
        observed: &E,
        ratio: f64,
        current: Option<&E>,
        subscriptions: &mut SubscriptionRegistry<E>,
    ) -> Option<Rect>
    where
        H: Host<Element = E> + ?Sized,
    {
        let Some(pending) = &self.pending else {
            trace!(?observer, "no observation pending; discarding");
            return None;
        };
        if pending.observer != observer {
            trace!(?observer, awaited = ?pending.observer, "discarding stale observation");
            return None;
        }
        if pending.target != *observed || current != Some(observed) {
            trace!(?observed, ?current, "observed element is not the current target; discarding");
            return None;
        }
        if ratio <= 0.0 || ratio + RATIO_TOLERANCE < pending.threshold {
            trace!(ratio, threshold = pending.threshold, "below threshold");
            return None;
        }

        host.unobserve_intersection(observer);
        self.pending = None;
        let halted = halt_momentum(host, observed);
        let rect = host.bounding_rect(observed);
        self.scrolling = false;
        subscriptions.resume(host, EventKind::Scroll);
        debug!(?observed, ?rect, halted, "target arrived in view");
        Some(rect)
    }

    /// Drop any pending observation and resume suspended listeners.
    pub fn cancel<H>(&mut self, host: &mut H, subscriptions: &mut SubscriptionRegistry<E>)
    where
        H: Host<Element = E> + ?Sized,
    {
        if let Some(pending) = self.pending.take() {
            host.unobserve_intersection(pending.observer);
        }
        self.scrolling = false;
        subscriptions.resume(host, EventKind::Scroll);
    }

    fn commit_now<H>(
        &mut self,
        host: &mut H,
        target: &E,
        subscriptions: &mut SubscriptionRegistry<E>,
    ) -> SyncOutcome
    where
        H: Host<Element = E> + ?Sized,
    {
        self.scrolling = false;
        subscriptions.resume(host, EventKind::Scroll);
        SyncOutcome::Committed(host.bounding_rect(target))
    }
}
