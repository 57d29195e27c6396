// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host environment: the capabilities a tour needs from the platform.
//!
//! The engine never touches a global document or window. Everything it reads or
//! requests goes through these traits, which a host implements over its real
//! platform (a web document, a native widget tree, a terminal UI) or over a test
//! double such as [`HeadlessHost`](crate::headless::HeadlessHost).
//!
//! Platform callbacks (listeners firing, observers reporting) are not delivered by
//! calling back into the engine. The host turns them into [`HostEvent`] values and
//! posts them to the tour, which processes them in order on its own queue.

use alloc::string::String;
use core::fmt::Debug;
use core::hash::Hash;

use kurbo::{Insets, Point, Rect, Size, Vec2};

/// Handle for an event listener registered through [`Listen::listen`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Handle for an intersection or mutation observation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObserverId(pub u64);

/// Events a tour listens for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The viewport changed size.
    Resize,
    /// The target scrolled.
    Scroll,
}

/// A resolved listener or observation target.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventTarget<E> {
    /// The global window (viewport).
    Window,
    /// The document root.
    Document,
    /// A specific element.
    Element(E),
}

/// A target given either as a live reference or as a selector resolved on use.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TargetRef<E> {
    /// Already resolved.
    Live(EventTarget<E>),
    /// Resolved through [`Document::query`] when the target is needed.
    Selector(String),
}

impl<E: Clone> TargetRef<E> {
    /// A selector target.
    pub fn selector(selector: impl Into<String>) -> Self {
        Self::Selector(selector.into())
    }

    /// Resolve to a live target. Selectors that match nothing yield `None`.
    pub fn resolve<D>(&self, doc: &D) -> Option<EventTarget<E>>
    where
        D: Document<Element = E> + ?Sized,
    {
        match self {
            Self::Live(target) => Some(target.clone()),
            Self::Selector(selector) => doc.query(selector).map(EventTarget::Element),
        }
    }
}

impl<E> From<EventTarget<E>> for TargetRef<E> {
    fn from(target: EventTarget<E>) -> Self {
        Self::Live(target)
    }
}

impl<E> From<&str> for TargetRef<E> {
    fn from(selector: &str) -> Self {
        Self::Selector(selector.into())
    }
}

/// An element given either as a live reference or as a selector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ElementRef<E> {
    /// Already resolved.
    Live(E),
    /// Resolved through [`Document::query`] when the element is needed.
    Selector(String),
}

impl<E: Clone> ElementRef<E> {
    /// Resolve to a live element. Selectors that match nothing yield `None`.
    pub fn resolve<D>(&self, doc: &D) -> Option<E>
    where
        D: Document<Element = E> + ?Sized,
    {
        match self {
            Self::Live(element) => Some(element.clone()),
            Self::Selector(selector) => doc.query(selector),
        }
    }
}

impl<E> From<&str> for ElementRef<E> {
    fn from(selector: &str) -> Self {
        Self::Selector(selector.into())
    }
}

/// How a requested scroll should be performed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScrollBehavior {
    /// Jump straight to the final position.
    #[default]
    Instant,
    /// Animate towards the final position.
    Smooth,
}

/// Scroll geometry of a single element.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ScrollState {
    /// Current scroll offset.
    pub offset: Vec2,
    /// Full size of the scrollable content.
    pub content_size: Size,
    /// Size of the visible scrollport.
    pub client_size: Size,
}

impl ScrollState {
    /// Whether the content overflows the scrollport on either axis.
    pub fn is_scrollable(&self) -> bool {
        self.content_size.width > self.client_size.width
            || self.content_size.height > self.client_size.height
    }
}

/// Parameters of a one-shot intersection observation.
#[derive(Clone, Debug, PartialEq)]
pub struct IntersectionInit<E> {
    /// Reference area; `None` means the viewport.
    pub root: Option<E>,
    /// Outsets applied to the root before intersecting. Positive values grow it.
    pub root_margin: Insets,
    /// Intersection ratio in `[0, 1]` at which the observation is satisfied.
    pub threshold: f64,
}

bitflags::bitflags! {
    /// Which structural changes a mutation watch reports.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct MutationOptions: u8 {
        /// Children added to or removed from the watched node.
        const CHILD_LIST = 0b0000_0001;
        /// Extend the watch to every descendant of the watched node.
        const SUBTREE    = 0b0000_0010;
    }
}

impl Default for MutationOptions {
    fn default() -> Self {
        Self::CHILD_LIST
    }
}

/// A pointer event as seen by the overlay.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointerEvent {
    /// Pointer position in viewport coordinates.
    pub position: Point,
}

/// Something the platform reported, queued for the tour to process.
#[derive(Clone, Debug, PartialEq)]
pub enum HostEvent<E> {
    /// A listener registered through [`Listen::listen`] fired.
    Listener(ListenerId),
    /// A one-shot intersection observation reached its threshold.
    Intersection {
        /// The observation that fired.
        observer: ObserverId,
        /// The observed element.
        target: E,
        /// Visible fraction of the target at the time of firing.
        ratio: f64,
    },
    /// A mutation watch saw a structural change.
    Mutation(ObserverId),
    /// The overlay was clicked.
    OverlayClick(PointerEvent),
}

/// Query and measurement surface.
pub trait Document {
    /// Live element handle. Equality is element identity.
    type Element: Clone + Eq + Hash + Debug;

    /// Resolve a selector to zero or one element.
    fn query(&self, selector: &str) -> Option<Self::Element>;

    /// Border-box rectangle of `element` in viewport coordinates.
    fn bounding_rect(&self, element: &Self::Element) -> Rect;

    /// Layout size of `element` without its borders.
    fn content_size(&self, element: &Self::Element) -> Size;

    /// Size of the viewport.
    fn viewport(&self) -> Size;

    /// Parent of `element`, if any.
    fn parent(&self, element: &Self::Element) -> Option<Self::Element>;

    /// Scroll geometry of `element`.
    fn scroll_state(&self, element: &Self::Element) -> ScrollState;
}

/// Scroll requests.
pub trait Scroll: Document {
    /// Scroll every relevant container so `element` is visible, using
    /// nearest-edge alignment on both axes.
    fn scroll_into_view(&mut self, element: &Self::Element, behavior: ScrollBehavior);

    /// Set the scroll offset of `element`, cancelling any scroll in progress.
    fn set_scroll_offset(&mut self, element: &Self::Element, offset: Vec2);

    /// Current scroll offset of the window.
    fn window_offset(&self) -> Vec2;

    /// Set the window's scroll offset, cancelling any window scroll in progress.
    ///
    /// The window is the outermost scroller and is never returned by
    /// [`Document::parent`].
    fn set_window_offset(&mut self, offset: Vec2);
}

/// Visibility and structure observation.
pub trait Observe: Document {
    /// Start a one-shot intersection observation of `target`.
    ///
    /// The host posts a single [`HostEvent::Intersection`] once the visible ratio
    /// reaches `init.threshold`, then stops observing.
    fn observe_intersection(
        &mut self,
        target: &Self::Element,
        init: IntersectionInit<Self::Element>,
    ) -> ObserverId;

    /// Stop an intersection observation. Unknown ids are ignored.
    fn unobserve_intersection(&mut self, id: ObserverId);

    /// Watch `root` for structural changes, posting [`HostEvent::Mutation`].
    fn observe_mutations(
        &mut self,
        root: &EventTarget<Self::Element>,
        options: MutationOptions,
    ) -> ObserverId;

    /// Stop a mutation watch. Unknown ids are ignored.
    fn unobserve_mutations(&mut self, id: ObserverId);
}

/// Event listener registration.
pub trait Listen: Document {
    /// Register a listener, posting [`HostEvent::Listener`] each time it fires.
    fn listen(&mut self, target: &EventTarget<Self::Element>, kind: EventKind) -> ListenerId;

    /// Remove a listener. Unknown ids are ignored.
    fn unlisten(&mut self, id: ListenerId);
}

/// Everything a [`Tour`](crate::Tour) needs from its host.
pub trait Host: Document + Scroll + Observe + Listen {}

impl<T> Host for T where T: Document + Scroll + Observe + Listen + ?Sized {}
