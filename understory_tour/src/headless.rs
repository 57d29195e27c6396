// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An in-memory host for tests, demos, and non-visual drivers.
//!
//! [`HeadlessHost`] models a document as a flat arena of selector-tagged boxes.
//! Each box has a rectangle in page space; its viewport position is that rectangle
//! shifted by the window scroll and by the scroll offsets of its ancestors. Any box
//! can be turned into a scroll container by giving it a scroll extent.
//!
//! Scrolling uses nearest-edge alignment, innermost container first and the window
//! last. [`ScrollBehavior::Instant`] scrolls apply immediately; smooth ones stay
//! pending until [`HeadlessHost::finish_scroll`], which makes the window between a
//! scroll request and its arrival observable. A pending smooth scroll moves as one
//! unit: setting the offset of any scroller on its chain, the window included,
//! cancels it.
//!
//! Platform callbacks are modelled as an outgoing queue of [`HostEvent`]s. Feed them
//! to a tour with [`HeadlessHost::pump`]:
//!
//! ```rust
//! use kurbo::{Rect, Size};
//! use understory_tour::headless::HeadlessHost;
//! use understory_tour::{Step, Tour, TourConfig};
//!
//! let mut host = HeadlessHost::new(Size::new(800.0, 600.0));
//! host.insert(None, "#intro", Rect::new(40.0, 40.0, 240.0, 90.0));
//! host.insert(None, "#footer", Rect::new(40.0, 1500.0, 240.0, 1550.0));
//!
//! let steps = vec![Step::new("#intro"), Step::new("#footer")];
//! let mut tour: Tour<_> = Tour::new(1, steps, TourConfig::default()).unwrap();
//! tour.mount(&mut host);
//! tour.next(&mut host);
//! host.pump(&mut tour);
//!
//! assert!(!tour.is_scrolling());
//! assert_eq!(tour.focus_rect(), Rect::new(40.0, 550.0, 240.0, 600.0));
//! ```

use alloc::collections::VecDeque;
use alloc::string::String;
use alloc::vec::Vec;
use core::mem;

use kurbo::{Insets, Point, Rect, Size, Vec2};
use understory_placement::{contains_inclusive, viewport_rect};

use crate::host::{
    Document, EventKind, EventTarget, HostEvent, IntersectionInit, Listen, ListenerId,
    MutationOptions, Observe, ObserverId, PointerEvent, Scroll, ScrollBehavior, ScrollState,
};
use crate::tour::Tour;

/// Handle of a box in a [`HeadlessHost`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

impl ElementId {
    /// Slot index of this element.
    pub const fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug)]
struct Node {
    selector: String,
    parent: Option<ElementId>,
    rect: Rect,
    border: f64,
    scroll: Vec2,
    scroll_extent: Option<Size>,
}

#[derive(Clone, Debug)]
struct Intersection {
    id: ObserverId,
    target: ElementId,
    init: IntersectionInit<ElementId>,
}

/// Deterministic, in-memory implementation of [`Host`](crate::host::Host).
#[derive(Clone, Debug)]
pub struct HeadlessHost {
    viewport: Size,
    window_scroll: Vec2,
    nodes: Vec<Option<Node>>,
    next_handle: u64,
    listeners: Vec<(ListenerId, EventTarget<ElementId>, EventKind)>,
    intersections: Vec<Intersection>,
    watches: Vec<(ObserverId, EventTarget<ElementId>, MutationOptions)>,
    events: VecDeque<HostEvent<ElementId>>,
    scroll_requests: Vec<(ElementId, ScrollBehavior)>,
    smooth_pending: Vec<ElementId>,
    observations: Vec<(ObserverId, ElementId, f64)>,
    offset_writes: Vec<(ElementId, Vec2)>,
}

impl HeadlessHost {
    /// Create an empty document with the given viewport.
    pub fn new(viewport: Size) -> Self {
        Self {
            viewport,
            window_scroll: Vec2::ZERO,
            nodes: Vec::new(),
            next_handle: 1,
            listeners: Vec::new(),
            intersections: Vec::new(),
            watches: Vec::new(),
            events: VecDeque::new(),
            scroll_requests: Vec::new(),
            smooth_pending: Vec::new(),
            observations: Vec::new(),
            offset_writes: Vec::new(),
        }
    }

    /// Add a box tagged with `selector` under `parent`, at `rect` in page space.
    ///
    /// Child boxes are positioned in page space too; a parent only contributes its
    /// scroll offset. Matching mutation watches are notified.
    pub fn insert(&mut self, parent: Option<ElementId>, selector: &str, rect: Rect) -> ElementId {
        let id = ElementId(self.nodes.len());
        self.nodes.push(Some(Node {
            selector: selector.into(),
            parent,
            rect,
            border: 0.0,
            scroll: Vec2::ZERO,
            scroll_extent: None,
        }));
        self.notify_mutation(parent);
        self.evaluate_intersections();
        id
    }

    /// Remove a box and all of its descendants.
    ///
    /// Returns `false` if `id` was already gone.
    pub fn remove(&mut self, id: ElementId) -> bool {
        let Some(node) = self.node(id) else {
            return false;
        };
        let parent = node.parent;
        let doomed: Vec<usize> = (0..self.nodes.len())
            .filter(|&i| self.is_ancestor_or_self(id, ElementId(i)))
            .collect();
        for i in doomed {
            self.nodes[i] = None;
        }
        self.intersections.retain(|o| o.target != id);
        self.notify_mutation(parent);
        true
    }

    /// Move a box to `rect` in page space. Not a structural change.
    pub fn set_rect(&mut self, id: ElementId, rect: Rect) {
        if let Some(node) = self.node_mut(id) {
            node.rect = rect;
        }
        self.evaluate_intersections();
    }

    /// Give a box a uniform border width, which [`Document::content_size`] subtracts.
    pub fn set_border(&mut self, id: ElementId, border: f64) {
        if let Some(node) = self.node_mut(id) {
            node.border = border;
        }
    }

    /// Turn a box into a scroll container whose content measures `extent`.
    pub fn set_scroll_extent(&mut self, id: ElementId, extent: Size) {
        if let Some(node) = self.node_mut(id) {
            node.scroll_extent = Some(extent);
        }
    }

    /// Change the viewport size and fire window resize listeners.
    pub fn resize(&mut self, viewport: Size) {
        self.viewport = viewport;
        self.fire(&EventTarget::Window, EventKind::Resize);
        self.evaluate_intersections();
    }

    /// Scroll the window to `offset` as a user would, firing scroll listeners.
    pub fn scroll_window_to(&mut self, offset: Vec2) {
        let offset = Vec2::new(offset.x.max(0.0), offset.y.max(0.0));
        if offset != self.window_scroll {
            self.window_scroll = offset;
            self.fire(&EventTarget::Window, EventKind::Scroll);
            self.evaluate_intersections();
        }
    }

    /// Current window scroll offset.
    pub fn window_scroll(&self) -> Vec2 {
        self.window_scroll
    }

    /// Current scroll offset of a container.
    pub fn scroll_offset(&self, id: ElementId) -> Vec2 {
        self.node(id).map_or(Vec2::ZERO, |n| n.scroll)
    }

    /// Post a listener event for every listener registered on `(target, kind)`.
    pub fn fire(&mut self, target: &EventTarget<ElementId>, kind: EventKind) {
        let fired: Vec<ListenerId> = self
            .listeners
            .iter()
            .filter(|(_, t, k)| t == target && *k == kind)
            .map(|(id, _, _)| *id)
            .collect();
        self.events.extend(fired.into_iter().map(HostEvent::Listener));
    }

    /// Post an overlay click at `position`.
    pub fn click(&mut self, position: Point) {
        self.events
            .push_back(HostEvent::OverlayClick(PointerEvent { position }));
    }

    /// Complete every pending smooth scroll.
    ///
    /// Returns how many scrolls were completed.
    pub fn finish_scroll(&mut self) -> usize {
        let pending = mem::take(&mut self.smooth_pending);
        let count = pending.len();
        for id in pending {
            self.apply_scroll(id);
        }
        count
    }

    /// Take the next queued event.
    pub fn pop_event(&mut self) -> Option<HostEvent<ElementId>> {
        self.events.pop_front()
    }

    /// Take every queued event.
    pub fn drain_events(&mut self) -> Vec<HostEvent<ElementId>> {
        self.events.drain(..).collect()
    }

    /// Number of queued events.
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    /// Deliver queued events to `tour` until the queue is empty.
    ///
    /// Returns how many events were delivered.
    pub fn pump<D>(&mut self, tour: &mut Tour<ElementId, D>) -> usize {
        let mut delivered = 0;
        while let Some(event) = self.events.pop_front() {
            tour.handle(self, event);
            delivered += 1;
        }
        delivered
    }

    /// Number of live listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Number of live listeners on `(target, kind)`.
    pub fn listeners_on(&self, target: &EventTarget<ElementId>, kind: EventKind) -> usize {
        self.listeners
            .iter()
            .filter(|(_, t, k)| t == target && *k == kind)
            .count()
    }

    /// Number of live intersection observations.
    pub fn intersection_count(&self) -> usize {
        self.intersections.len()
    }

    /// Number of live mutation watches.
    pub fn watch_count(&self) -> usize {
        self.watches.len()
    }

    /// Every scroll request received, in order.
    pub fn scroll_requests(&self) -> &[(ElementId, ScrollBehavior)] {
        &self.scroll_requests
    }

    /// Every intersection observation started: id, target, and threshold.
    pub fn observations(&self) -> &[(ObserverId, ElementId, f64)] {
        &self.observations
    }

    /// Every explicit [`Scroll::set_scroll_offset`] call, in order.
    pub fn offset_writes(&self) -> &[(ElementId, Vec2)] {
        &self.offset_writes
    }

    /// Forget recorded offset writes.
    pub fn clear_offset_writes(&mut self) {
        self.offset_writes.clear();
    }

    fn node(&self, id: ElementId) -> Option<&Node> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: ElementId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index()).and_then(Option::as_mut)
    }

    fn handle(&mut self) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }

    fn is_ancestor_or_self(&self, ancestor: ElementId, mut id: ElementId) -> bool {
        loop {
            if id == ancestor {
                return true;
            }
            match self.node(id).and_then(|n| n.parent) {
                Some(parent) => id = parent,
                None => return false,
            }
        }
    }

    fn notify_mutation(&mut self, parent: Option<ElementId>) {
        let hits: Vec<ObserverId> = self
            .watches
            .iter()
            .filter(|(_, root, options)| {
                let deep = options.contains(MutationOptions::SUBTREE);
                match (root, parent) {
                    (EventTarget::Element(root), Some(parent)) => {
                        *root == parent || (deep && self.is_ancestor_or_self(*root, parent))
                    }
                    (EventTarget::Element(_), None) => false,
                    (EventTarget::Window | EventTarget::Document, parent) => {
                        deep || parent.is_none()
                    }
                }
            })
            .map(|(id, _, _)| *id)
            .collect();
        self.events.extend(hits.into_iter().map(HostEvent::Mutation));
    }

    /// Visible ratio of `target` against the observation's root.
    fn ratio(&self, target: ElementId, init: &IntersectionInit<ElementId>) -> f64 {
        let rect = self.bounding_rect(&target);
        let root = match init.root {
            Some(root) => self.bounding_rect(&root),
            None => viewport_rect(self.viewport),
        };
        let root = outset(root, init.root_margin);
        let area = rect.area();
        if area <= 0.0 {
            return if contains_inclusive(root, rect.origin()) {
                1.0
            } else {
                0.0
            };
        }
        rect.intersect(root).area() / area
    }

    /// Fire and retire every observation whose threshold is met by a visible target.
    fn evaluate_intersections(&mut self) {
        let mut fired = Vec::new();
        let mut index = 0;
        while index < self.intersections.len() {
            let o = &self.intersections[index];
            let ratio = self.ratio(o.target, &o.init);
            if ratio > 0.0 && ratio + 1e-9 >= o.init.threshold {
                let o = self.intersections.remove(index);
                fired.push(HostEvent::Intersection {
                    observer: o.id,
                    target: o.target,
                    ratio,
                });
            } else {
                index += 1;
            }
        }
        self.events.extend(fired);
    }

    fn apply_scroll(&mut self, id: ElementId) {
        if self.node(id).is_none() {
            return;
        }
        let mut scrolled = Vec::new();

        let mut current = self.node(id).and_then(|n| n.parent);
        while let Some(container) = current {
            let Some(node) = self.node(container) else {
                break;
            };
            current = node.parent;
            let Some(extent) = node.scroll_extent else {
                continue;
            };
            let client = node.rect.size();
            let offset = node.scroll;
            let delta = nearest_delta(self.bounding_rect(&id), self.bounding_rect(&container));
            let max = Vec2::new(
                (extent.width - client.width).max(0.0),
                (extent.height - client.height).max(0.0),
            );
            let next = Vec2::new(
                (offset.x + delta.x).clamp(0.0, max.x),
                (offset.y + delta.y).clamp(0.0, max.y),
            );
            if next != offset {
                if let Some(node) = self.node_mut(container) {
                    node.scroll = next;
                }
                scrolled.push(EventTarget::Element(container));
            }
        }

        let delta = nearest_delta(self.bounding_rect(&id), viewport_rect(self.viewport));
        let next = Vec2::new(
            (self.window_scroll.x + delta.x).max(0.0),
            (self.window_scroll.y + delta.y).max(0.0),
        );
        if next != self.window_scroll {
            self.window_scroll = next;
            scrolled.push(EventTarget::Window);
        }

        for target in &scrolled {
            self.fire(target, EventKind::Scroll);
        }
        self.evaluate_intersections();
    }
}

impl Document for HeadlessHost {
    type Element = ElementId;

    fn query(&self, selector: &str) -> Option<ElementId> {
        self.nodes
            .iter()
            .position(|n| n.as_ref().is_some_and(|n| n.selector == selector))
            .map(ElementId)
    }

    fn bounding_rect(&self, element: &ElementId) -> Rect {
        let Some(node) = self.node(*element) else {
            return Rect::ZERO;
        };
        let mut offset = self.window_scroll;
        let mut current = node.parent;
        while let Some(parent) = current.and_then(|p| self.node(p)) {
            offset += parent.scroll;
            current = parent.parent;
        }
        node.rect - offset
    }

    fn content_size(&self, element: &ElementId) -> Size {
        self.node(*element).map_or(Size::ZERO, |n| {
            let size = n.rect.size();
            Size::new(
                (size.width - 2.0 * n.border).max(0.0),
                (size.height - 2.0 * n.border).max(0.0),
            )
        })
    }

    fn viewport(&self) -> Size {
        self.viewport
    }

    fn parent(&self, element: &ElementId) -> Option<ElementId> {
        self.node(*element).and_then(|n| n.parent)
    }

    fn scroll_state(&self, element: &ElementId) -> ScrollState {
        self.node(*element).map_or(ScrollState::default(), |n| {
            let client_size = n.rect.size();
            ScrollState {
                offset: n.scroll,
                content_size: n.scroll_extent.unwrap_or(client_size),
                client_size,
            }
        })
    }
}

impl Scroll for HeadlessHost {
    fn scroll_into_view(&mut self, element: &ElementId, behavior: ScrollBehavior) {
        self.scroll_requests.push((*element, behavior));
        match behavior {
            ScrollBehavior::Instant => self.apply_scroll(*element),
            ScrollBehavior::Smooth => self.smooth_pending.push(*element),
        }
    }

    fn set_scroll_offset(&mut self, element: &ElementId, offset: Vec2) {
        self.offset_writes.push((*element, offset));
        let pending = mem::take(&mut self.smooth_pending);
        self.smooth_pending = pending
            .into_iter()
            .filter(|&target| !self.is_ancestor_or_self(*element, target))
            .collect();
        let changed = match self.node_mut(*element) {
            Some(node) if node.scroll != offset => {
                node.scroll = offset;
                true
            }
            _ => false,
        };
        if changed {
            self.fire(&EventTarget::Element(*element), EventKind::Scroll);
            self.evaluate_intersections();
        }
    }

    fn window_offset(&self) -> Vec2 {
        self.window_scroll
    }

    fn set_window_offset(&mut self, offset: Vec2) {
        // Every smooth scroll chain ends at the window.
        self.smooth_pending.clear();
        let offset = Vec2::new(offset.x.max(0.0), offset.y.max(0.0));
        if offset != self.window_scroll {
            self.window_scroll = offset;
            self.fire(&EventTarget::Window, EventKind::Scroll);
            self.evaluate_intersections();
        }
    }
}

impl Observe for HeadlessHost {
    fn observe_intersection(
        &mut self,
        target: &ElementId,
        init: IntersectionInit<ElementId>,
    ) -> ObserverId {
        let id = ObserverId(self.handle());
        self.observations.push((id, *target, init.threshold));
        self.intersections.push(Intersection {
            id,
            target: *target,
            init,
        });
        self.evaluate_intersections();
        id
    }

    fn unobserve_intersection(&mut self, id: ObserverId) {
        self.intersections.retain(|o| o.id != id);
    }

    fn observe_mutations(
        &mut self,
        root: &EventTarget<ElementId>,
        options: MutationOptions,
    ) -> ObserverId {
        let id = ObserverId(self.handle());
        self.watches.push((id, root.clone(), options));
        id
    }

    fn unobserve_mutations(&mut self, id: ObserverId) {
        self.watches.retain(|(w, _, _)| *w != id);
    }
}

impl Listen for HeadlessHost {
    fn listen(&mut self, target: &EventTarget<ElementId>, kind: EventKind) -> ListenerId {
        let id = ListenerId(self.handle());
        self.listeners.push((id, target.clone(), kind));
        id
    }

    fn unlisten(&mut self, id: ListenerId) {
        self.listeners.retain(|(l, _, _)| *l != id);
    }
}

/// Offset that brings `rect` inside `view` with the least movement, per axis.
fn nearest_delta(rect: Rect, view: Rect) -> Vec2 {
    Vec2::new(
        nearest_axis(rect.x0, rect.x1, view.x0, view.x1),
        nearest_axis(rect.y0, rect.y1, view.y0, view.y1),
    )
}

fn nearest_axis(start: f64, end: f64, view_start: f64, view_end: f64) -> f64 {
    if start >= view_start && end <= view_end {
        0.0
    } else if start < view_start || end - start > view_end - view_start {
        start - view_start
    } else {
        end - view_end
    }
}

fn outset(rect: Rect, margin: Insets) -> Rect {
    Rect::new(
        rect.x0 - margin.x0,
        rect.y0 - margin.y0,
        rect.x1 + margin.x1,
        rect.y1 + margin.y1,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> HeadlessHost {
        HeadlessHost::new(Size::new(800.0, 600.0))
    }

    #[test]
    fn nearest_alignment_moves_the_least() {
        // Below the view: align bottom edges.
        assert_eq!(nearest_axis(700.0, 750.0, 0.0, 600.0), 150.0);
        // Above the view: align top edges.
        assert_eq!(nearest_axis(-80.0, -30.0, 0.0, 600.0), -80.0);
        // Taller than the view: align top edges.
        assert_eq!(nearest_axis(100.0, 900.0, 0.0, 600.0), 100.0);
        // Already inside.
        assert_eq!(nearest_axis(10.0, 20.0, 0.0, 600.0), 0.0);
    }

    #[test]
    fn nested_container_scrolls_before_window() {
        let mut host = host();
        let pane = host.insert(None, "#pane", Rect::new(0.0, 100.0, 400.0, 400.0));
        host.set_scroll_extent(pane, Size::new(400.0, 2000.0));
        let row = host.insert(Some(pane), "#row", Rect::new(0.0, 1000.0, 400.0, 1040.0));

        host.scroll_into_view(&row, ScrollBehavior::Instant);
        assert_eq!(host.scroll_offset(pane), Vec2::new(0.0, 640.0));
        assert_eq!(host.window_scroll(), Vec2::ZERO);
        assert_eq!(host.bounding_rect(&row), Rect::new(0.0, 360.0, 400.0, 400.0));
    }

    #[test]
    fn smooth_scroll_waits_for_finish() {
        let mut host = host();
        let far = host.insert(None, "#far", Rect::new(0.0, 1000.0, 100.0, 1100.0));
        host.scroll_into_view(&far, ScrollBehavior::Smooth);
        assert_eq!(host.window_scroll(), Vec2::ZERO);
        assert_eq!(host.finish_scroll(), 1);
        assert_eq!(host.window_scroll(), Vec2::new(0.0, 500.0));
    }

    #[test]
    fn setting_an_offset_cancels_a_pending_smooth_scroll() {
        let mut host = host();
        let pane = host.insert(None, "#pane", Rect::new(0.0, 100.0, 400.0, 400.0));
        host.set_scroll_extent(pane, Size::new(400.0, 2000.0));
        let row = host.insert(Some(pane), "#row", Rect::new(0.0, 1000.0, 400.0, 1040.0));
        let other = host.insert(None, "#other", Rect::new(500.0, 1000.0, 600.0, 1040.0));

        host.scroll_into_view(&row, ScrollBehavior::Smooth);
        host.scroll_into_view(&other, ScrollBehavior::Smooth);
        host.set_scroll_offset(&pane, Vec2::ZERO);
        // Only the scroll whose chain contains the pane is cancelled.
        assert_eq!(host.finish_scroll(), 1);
        assert_eq!(host.scroll_offset(pane), Vec2::ZERO);
        assert_eq!(host.window_scroll(), Vec2::new(0.0, 440.0));
    }

    #[test]
    fn setting_the_window_offset_cancels_every_smooth_scroll() {
        let mut host = host();
        let far = host.insert(None, "#far", Rect::new(0.0, 1000.0, 100.0, 1100.0));
        host.scroll_into_view(&far, ScrollBehavior::Smooth);
        let offset = host.window_offset();
        host.set_window_offset(offset);
        assert_eq!(host.finish_scroll(), 0);
        assert_eq!(host.window_scroll(), Vec2::ZERO);
        assert_eq!(host.pending_events(), 0);
    }

    #[test]
    fn invisible_target_never_meets_a_zero_threshold() {
        let mut host = host();
        let far = host.insert(None, "#far", Rect::new(0.0, 1000.0, 100.0, 1100.0));
        host.observe_intersection(
            &far,
            IntersectionInit {
                root: None,
                root_margin: Insets::ZERO,
                threshold: 0.0,
            },
        );
        assert_eq!(host.pending_events(), 0);
        host.scroll_window_to(Vec2::new(0.0, 450.0));
        assert_eq!(host.pending_events(), 1);
    }

    #[test]
    fn intersection_fires_once_when_threshold_is_met() {
        let mut host = host();
        let far = host.insert(None, "#far", Rect::new(0.0, 1000.0, 100.0, 1100.0));
        let id = host.observe_intersection(
            &far,
            IntersectionInit {
                root: None,
                root_margin: Insets::ZERO,
                threshold: 1.0,
            },
        );
        assert_eq!(host.pending_events(), 0);

        // Half visible is not enough.
        host.scroll_window_to(Vec2::new(0.0, 450.0));
        assert!(host.drain_events().is_empty());

        host.scroll_window_to(Vec2::new(0.0, 600.0));
        assert_eq!(
            host.drain_events(),
            [HostEvent::Intersection {
                observer: id,
                target: far,
                ratio: 1.0
            }]
        );
        assert_eq!(host.intersection_count(), 0);
    }

    #[test]
    fn root_margin_grows_the_root() {
        let mut host = host();
        let below = host.insert(None, "#below", Rect::new(0.0, 600.0, 100.0, 650.0));
        host.observe_intersection(
            &below,
            IntersectionInit {
                root: None,
                root_margin: Insets::new(0.0, 0.0, 0.0, 50.0),
                threshold: 1.0,
            },
        );
        assert_eq!(host.pending_events(), 1);
    }

    #[test]
    fn mutations_match_child_list_and_subtree() {
        let mut host = host();
        let app = host.insert(None, "#app", Rect::new(0.0, 0.0, 800.0, 600.0));
        let list = host.insert(Some(app), "#list", Rect::new(0.0, 0.0, 800.0, 600.0));
        let shallow = host.observe_mutations(&EventTarget::Element(app), MutationOptions::CHILD_LIST);
        let deep = host.observe_mutations(
            &EventTarget::Element(app),
            MutationOptions::CHILD_LIST | MutationOptions::SUBTREE,
        );

        host.insert(Some(list), "#item", Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(host.drain_events(), [HostEvent::Mutation(deep)]);

        host.insert(Some(app), "#sibling", Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(
            host.drain_events(),
            [HostEvent::Mutation(shallow), HostEvent::Mutation(deep)]
        );
    }

    #[test]
    fn removal_takes_descendants() {
        let mut host = host();
        let app = host.insert(None, "#app", Rect::new(0.0, 0.0, 800.0, 600.0));
        host.insert(Some(app), "#child", Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!(host.remove(app));
        assert_eq!(host.query("#child"), None);
        assert!(!host.remove(app));
    }

    #[test]
    fn content_size_excludes_borders() {
        let mut host = host();
        let boxed = host.insert(None, "#boxed", Rect::new(0.0, 0.0, 100.0, 50.0));
        host.set_border(boxed, 2.0);
        assert_eq!(host.content_size(&boxed), Size::new(96.0, 46.0));
        assert_eq!(host.bounding_rect(&boxed).size(), Size::new(100.0, 50.0));
    }
}
