// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The tour engine.

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::fmt::{self, Debug};
use core::hash::Hash;

use kurbo::{Rect, Size};
use smallvec::SmallVec;
use tracing::{debug, trace};
use understory_placement::{Placement, contains_inclusive, mask_rect, place};

use crate::config::{ConfigError, TourConfig, validate_steps};
use crate::elements::ElementCache;
use crate::host::{
    Document, EventKind, EventTarget, Host, HostEvent, ObserverId, PointerEvent, ScrollBehavior,
    TargetRef,
};
use crate::navigation::{Direction, Move, Navigator};
use crate::render::{Frame, RenderStrategy};
use crate::scroll::{FocusRequest, ScrollSync, SyncOutcome};
use crate::step::Step;
use crate::subscription::SubscriptionRegistry;

/// Read-only view of a tour handed to callbacks and renderers.
#[derive(Debug)]
pub struct TourSnapshot<'a, E, D> {
    /// Tour identifier.
    pub id: u64,
    /// The step at [`current_index`](Self::current_index).
    pub step: Option<&'a Step<E, D>>,
    /// Externally visible index; lags behind the requested one while waiting
    /// for an element.
    pub current_index: usize,
    /// Index before the last move.
    pub previous_index: usize,
    /// Every step.
    pub steps: &'a [Step<E, D>],
    /// The requested step's element, if it resolved.
    pub target: Option<&'a E>,
    /// `true` while a scroll into view is in flight.
    pub is_scrolling: bool,
}

impl<E, D> Clone for TourSnapshot<'_, E, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E, D> Copy for TourSnapshot<'_, E, D> {}

/// Something a callback asks the tour to do once it returns.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// [`Tour::goto`].
    Goto(usize),
    /// [`Tour::next`].
    Next,
    /// [`Tour::prev`].
    Prev,
    /// [`Tour::focus`].
    Focus(Option<ScrollBehavior>),
    /// Ask the owner to close the tour.
    RequestClose,
}

/// Commands collected from a callback.
///
/// They are queued behind whatever the tour is processing, so a callback never
/// observes the tour changing underneath it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Commands {
    list: SmallVec<[Command; 2]>,
}

impl Commands {
    /// Queue a jump.
    pub fn goto(&mut self, index: usize) {
        self.list.push(Command::Goto(index));
    }

    /// Queue a step forward.
    pub fn next(&mut self) {
        self.list.push(Command::Next);
    }

    /// Queue a step back.
    pub fn prev(&mut self) {
        self.list.push(Command::Prev);
    }

    /// Queue a focus re-sync.
    pub fn focus(&mut self, behavior: Option<ScrollBehavior>) {
        self.list.push(Command::Focus(behavior));
    }

    /// Queue a close request.
    pub fn request_close(&mut self) {
        self.list.push(Command::RequestClose);
    }

    /// Queued commands, in order.
    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.list.iter()
    }

    /// Returns `true` if nothing was queued.
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

/// Why the tour asks to be closed.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CloseRequest {
    /// The originating pointer event, if any.
    pub event: Option<PointerEvent>,
    /// Whether the pointer was inside the mask (edges included).
    pub inside_mask: bool,
    /// Whether the request came from clicking the overlay.
    pub overlay_click: bool,
}

/// Notifications from a [`Tour`]. Every method defaults to doing nothing.
pub trait TourCallbacks<E, D> {
    /// After any navigation, and whenever the visible index changes on its own.
    fn on_move(&mut self, _snapshot: &TourSnapshot<'_, E, D>, _commands: &mut Commands) {}

    /// After [`Tour::next`], following `on_move`.
    fn on_next(&mut self, _snapshot: &TourSnapshot<'_, E, D>, _commands: &mut Commands) {}

    /// After [`Tour::prev`], following `on_move`.
    fn on_prev(&mut self, _snapshot: &TourSnapshot<'_, E, D>, _commands: &mut Commands) {}

    /// The overlay was clicked, or a callback asked to close.
    fn on_request_close(&mut self, _request: &CloseRequest) {}

    /// After [`Tour::mount`] finished its first focus sync.
    fn on_after_open(&mut self, _snapshot: &TourSnapshot<'_, E, D>, _commands: &mut Commands) {}

    /// During [`Tour::unmount`], after everything was revoked.
    fn on_before_close(&mut self, _snapshot: &TourSnapshot<'_, E, D>) {}
}

#[derive(Clone, Debug)]
enum Message<E> {
    Host(HostEvent<E>),
    Command(Command),
}

#[derive(Copy, Clone, Debug)]
enum Notify {
    Move(Direction),
    AfterOpen,
    BeforeClose,
}

/// A guided tour over a host document.
///
/// The tour owns its navigation state, element cache, listener registry and
/// scroll synchronization. It borrows the host only for the duration of a call,
/// and learns about platform activity from [`HostEvent`]s fed through
/// [`post`](Self::post) and [`process`](Self::process) (or [`handle`](Self::handle)).
///
/// ```rust
/// use kurbo::{Rect, Size};
/// use understory_tour::headless::HeadlessHost;
/// use understory_tour::{Step, Tour, TourConfig};
///
/// let mut host = HeadlessHost::new(Size::new(1000.0, 800.0));
/// host.insert(None, "#a", Rect::new(100.0, 100.0, 200.0, 150.0));
/// host.insert(None, "#b", Rect::new(300.0, 100.0, 400.0, 150.0));
///
/// let steps = vec![Step::new("#a"), Step::new("#b")];
/// let mut tour: Tour<_> = Tour::new(7, steps, TourConfig::default()).unwrap();
/// tour.mount(&mut host);
/// assert_eq!(tour.mask_rect(), Rect::new(95.0, 95.0, 205.0, 155.0));
///
/// tour.next(&mut host);
/// tour.next(&mut host);
/// assert_eq!(tour.current_index(), 1);
///
/// let helper = tour.place_helper(&host, Size::new(120.0, 40.0)).unwrap();
/// assert_eq!(helper.side.as_str(), "left");
/// ```
pub struct Tour<E, D = ()> {
    id: u64,
    config: TourConfig<E>,
    steps: Vec<Step<E, D>>,
    nav: Navigator,
    elements: ElementCache<E>,
    subscriptions: SubscriptionRegistry<E>,
    sync: ScrollSync<E>,
    focus_rect: Rect,
    target: Option<E>,
    container: Option<E>,
    mounted: bool,
    watchers: Vec<ObserverId>,
    callbacks: Option<Box<dyn TourCallbacks<E, D>>>,
    queue: VecDeque<Message<E>>,
}

impl<E: Debug, D> Debug for Tour<E, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tour")
            .field("id", &self.id)
            .field("steps", &self.steps.len())
            .field("nav", &self.nav)
            .field("focus_rect", &self.focus_rect)
            .field("target", &self.target)
            .field("sync", &self.sync)
            .field("mounted", &self.mounted)
            .field("queued", &self.queue.len())
            .finish_non_exhaustive()
    }
}

impl<E, D> Tour<E, D>
where
    E: Clone + Eq + Hash + Debug,
{
    /// Create an unmounted tour.
    pub fn new(id: u64, steps: Vec<Step<E, D>>, config: TourConfig<E>) -> Result<Self, ConfigError> {
        config.validate()?;
        validate_steps(&steps)?;
        let nav = Navigator::new(steps.len(), config.start_at);
        Ok(Self {
            id,
            config,
            steps,
            nav,
            elements: ElementCache::new(),
            subscriptions: SubscriptionRegistry::new(),
            sync: ScrollSync::new(),
            focus_rect: Rect::ZERO,
            target: None,
            container: None,
            mounted: false,
            watchers: Vec::new(),
            callbacks: None,
            queue: VecDeque::new(),
        })
    }

    /// Install callbacks, replacing any previous ones.
    pub fn set_callbacks(&mut self, callbacks: impl TourCallbacks<E, D> + 'static) {
        self.callbacks = Some(Box::new(callbacks));
    }

    /// Builder form of [`set_callbacks`](Self::set_callbacks).
    #[must_use]
    pub fn with_callbacks(mut self, callbacks: impl TourCallbacks<E, D> + 'static) -> Self {
        self.set_callbacks(callbacks);
        self
    }

    /// Start the tour: begin mutation watches, build the element cache,
    /// subscribe to window resize and scroll, and focus the start step.
    ///
    /// Mounting a mounted tour does nothing.
    pub fn mount<H>(&mut self, host: &mut H)
    where
        H: Host<Element = E> + ?Sized,
    {
        if self.mounted {
            return;
        }
        self.mounted = true;
        debug!(tour = self.id, steps = self.steps.len(), "mounting");

        self.elements
            .set_tracking(!self.config.mutation_watches.is_empty());
        for watch in &self.config.mutation_watches {
            match watch.target.resolve(&*host) {
                Some(root) => self.watchers.push(host.observe_mutations(&root, watch.options)),
                None => debug!(tour = self.id, target = ?watch.target, "mutation watch target not found; skipping"),
            }
        }
        self.elements.remap(&*host, &self.steps);

        let window = TargetRef::Live(EventTarget::Window);
        if self.config.resize_listener {
            self.subscriptions.subscribe(host, &window, EventKind::Resize);
        }
        if self.config.scroll_listener {
            self.subscriptions.subscribe(host, &window, EventKind::Scroll);
        }

        self.sync_focus(host, None);
        self.notify(Notify::AfterOpen);
        self.process(host);
    }

    /// Stop the tour: cancel any pending scroll observation and revoke every
    /// listener and watch.
    pub fn unmount<H>(&mut self, host: &mut H)
    where
        H: Host<Element = E> + ?Sized,
    {
        if !self.mounted {
            return;
        }
        self.sync.cancel(host, &mut self.subscriptions);
        self.subscriptions.unsubscribe_all(host);
        self.container = None;
        for id in self.watchers.drain(..) {
            host.unobserve_mutations(id);
        }
        self.mounted = false;
        debug!(tour = self.id, "unmounted");
        self.notify(Notify::BeforeClose);
        self.queue.clear();
    }

    /// Jump to `index`, clamped into range.
    pub fn goto<H>(&mut self, host: &mut H, index: usize)
    where
        H: Host<Element = E> + ?Sized,
    {
        self.apply(host, Command::Goto(index));
        self.process(host);
    }

    /// Step forward. At the last step this re-emits the same index.
    pub fn next<H>(&mut self, host: &mut H)
    where
        H: Host<Element = E> + ?Sized,
    {
        self.apply(host, Command::Next);
        self.process(host);
    }

    /// Step back. At the first step this re-emits the same index.
    pub fn prev<H>(&mut self, host: &mut H)
    where
        H: Host<Element = E> + ?Sized,
    {
        self.apply(host, Command::Prev);
        self.process(host);
    }

    /// Re-sync the current target without changing the index.
    ///
    /// `behavior` overrides the configured scroll behavior for this call.
    pub fn focus<H>(&mut self, host: &mut H, behavior: Option<ScrollBehavior>)
    where
        H: Host<Element = E> + ?Sized,
    {
        self.apply(host, Command::Focus(behavior));
        self.process(host);
    }

    /// Re-resolve every step selector, then re-sync focus.
    pub fn remap<H>(&mut self, host: &mut H)
    where
        H: Host<Element = E> + ?Sized,
    {
        self.remap_and_refocus(host);
        self.process(host);
    }

    /// Replace the step list. Indices are clamped to the new length.
    pub fn set_steps<H>(&mut self, host: &mut H, steps: Vec<Step<E, D>>) -> Result<(), ConfigError>
    where
        H: Host<Element = E> + ?Sized,
    {
        validate_steps(&steps)?;
        self.steps = steps;
        self.nav.set_len(self.steps.len());
        if self.mounted {
            self.elements.remap(&*host, &self.steps);
            self.sync_focus(host, None);
            self.process(host);
        }
        Ok(())
    }

    /// Queue a host event without processing it.
    pub fn post(&mut self, event: HostEvent<E>) {
        self.queue.push_back(Message::Host(event));
    }

    /// Process queued events and callback commands until the queue is empty.
    pub fn process<H>(&mut self, host: &mut H)
    where
        H: Host<Element = E> + ?Sized,
    {
        while let Some(message) = self.queue.pop_front() {
            match message {
                Message::Host(event) => self.dispatch(host, event),
                Message::Command(command) => self.apply(host, command),
            }
        }
    }

    /// [`post`](Self::post) followed by [`process`](Self::process).
    pub fn handle<H>(&mut self, host: &mut H, event: HostEvent<E>)
    where
        H: Host<Element = E> + ?Sized,
    {
        self.post(event);
        self.process(host);
    }

    /// Tour identifier.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The configuration the tour was created with.
    pub fn config(&self) -> &TourConfig<E> {
        &self.config
    }

    /// Every step.
    pub fn steps(&self) -> &[Step<E, D>] {
        &self.steps
    }

    /// Whether the tour is mounted.
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Externally visible step index.
    ///
    /// With `wait_for_element`, this stays on the last step whose element was
    /// found until the requested step's element appears.
    pub fn current_index(&self) -> usize {
        self.nav.visible_index(self.config.wait_for_element)
    }

    /// The most recently requested step index.
    pub fn requested_index(&self) -> usize {
        self.nav.current()
    }

    /// Index before the last move.
    pub fn previous_index(&self) -> usize {
        self.nav.previous()
    }

    /// The step at [`current_index`](Self::current_index).
    pub fn current_step(&self) -> Option<&Step<E, D>> {
        self.steps.get(self.current_index())
    }

    /// The requested step's element, as of the last sync.
    pub fn current_target(&self) -> Option<&E> {
        self.target.as_ref()
    }

    /// Last committed rectangle of the target.
    pub fn focus_rect(&self) -> Rect {
        self.focus_rect
    }

    /// The highlighted region: the focus rectangle grown by the mask padding.
    pub fn mask_rect(&self) -> Rect {
        mask_rect(self.focus_rect, self.config.mask_padding)
    }

    /// `true` while a scroll into view is in flight.
    pub fn is_scrolling(&self) -> bool {
        self.sync.is_scrolling()
    }

    /// Read-only view of the current state.
    pub fn snapshot(&self) -> TourSnapshot<'_, E, D> {
        TourSnapshot {
            id: self.id,
            step: self.current_step(),
            current_index: self.current_index(),
            previous_index: self.nav.previous(),
            steps: &self.steps,
            target: self.target.as_ref(),
            is_scrolling: self.sync.is_scrolling(),
        }
    }

    /// Place a helper of `helper_size` next to the mask.
    ///
    /// `None` when there is no current step.
    pub fn place_helper<H>(&self, host: &H, helper_size: Size) -> Option<Placement>
    where
        H: Document<Element = E> + ?Sized,
    {
        let step = self.current_step()?;
        Some(place(
            self.mask_rect(),
            helper_size,
            host.viewport(),
            step.position,
            step.align,
            self.config.placement_params(),
        ))
    }

    /// Everything a renderer needs for one pass.
    ///
    /// The helper is placed only when `helper_size` is known.
    pub fn frame<H>(&self, host: &H, helper_size: Option<Size>) -> Frame<'_, E, D>
    where
        H: Document<Element = E> + ?Sized,
    {
        Frame {
            snapshot: self.snapshot(),
            focus_rect: self.focus_rect,
            mask: self.mask_rect(),
            mask_radius: self.config.mask_radius,
            viewport: host.viewport(),
            helper: helper_size.and_then(|size| self.place_helper(host, size)),
        }
    }

    /// Build a [`Frame`] and hand it to `strategy`.
    pub fn render<H, R>(&self, host: &H, helper_size: Option<Size>, strategy: &mut R) -> R::Output
    where
        H: Document<Element = E> + ?Sized,
        R: RenderStrategy<E, D>,
    {
        strategy.render(&self.frame(host, helper_size))
    }

    fn apply<H>(&mut self, host: &mut H, command: Command)
    where
        H: Host<Element = E> + ?Sized,
    {
        if !self.mounted {
            trace!(tour = self.id, ?command, "not mounted; ignoring");
            return;
        }
        let moved = match command {
            Command::Goto(index) => self.nav.goto(index),
            Command::Next => self.nav.next(),
            Command::Prev => self.nav.prev(),
            Command::Focus(behavior) => {
                self.sync_focus(host, behavior);
                return;
            }
            Command::RequestClose => {
                self.request_close(CloseRequest {
                    event: None,
                    inside_mask: false,
                    overlay_click: false,
                });
                return;
            }
        };
        self.after_move(host, moved);
    }

    fn after_move<H>(&mut self, host: &mut H, moved: Move)
    where
        H: Host<Element = E> + ?Sized,
    {
        debug!(
            tour = self.id,
            from = moved.from,
            to = moved.to,
            direction = ?moved.direction,
            "navigated"
        );
        self.sync_focus(host, None);
        self.notify(Notify::Move(moved.direction));
    }

    fn dispatch<H>(&mut self, host: &mut H, event: HostEvent<E>)
    where
        H: Host<Element = E> + ?Sized,
    {
        match event {
            HostEvent::Listener(id) => {
                let fired = self.subscriptions.lookup(id).map(|(_, kind)| kind);
                match fired {
                    Some(kind) => {
                        trace!(tour = self.id, ?kind, "listener fired");
                        self.refresh_focus(host);
                    }
                    None => trace!(tour = self.id, ?id, "revoked listener fired; ignoring"),
                }
            }
            HostEvent::Intersection {
                observer,
                target,
                ratio,
            } => {
                if let Some(rect) = self.sync.on_intersection(
                    host,
                    observer,
                    &target,
                    ratio,
                    self.target.as_ref(),
                    &mut self.subscriptions,
                ) {
                    self.focus_rect = rect;
                }
            }
            HostEvent::Mutation(id) => {
                if self.watchers.contains(&id) {
                    debug!(tour = self.id, "mutation observed; remapping");
                    self.remap_and_refocus(host);
                } else {
                    trace!(tour = self.id, ?id, "mutation from an unknown watch; ignoring");
                }
            }
            HostEvent::OverlayClick(event) => {
                let inside_mask = contains_inclusive(self.mask_rect(), event.position);
                self.request_close(CloseRequest {
                    event: Some(event),
                    inside_mask,
                    overlay_click: true,
                });
            }
        }
    }

    /// Resize and scroll listeners: re-sync focus, which reads geometry in
    /// place when the target is still in view and scrolls it back otherwise.
    ///
    /// While the requested step is waited for, the pinned step's rectangle is
    /// re-read instead.
    fn refresh_focus<H>(&mut self, host: &mut H)
    where
        H: Host<Element = E> + ?Sized,
    {
        if !self.mounted || self.sync.is_scrolling() {
            return;
        }
        self.sync_focus(host, None);
        if self.target.is_some() {
            return;
        }
        let visible = self.current_index();
        if visible == self.nav.current() {
            return;
        }
        let Some(step) = self.steps.get(visible) else {
            return;
        };
        if let Some(pinned) = self.elements.resolve(&*host, &step.selector) {
            self.focus_rect = host.bounding_rect(&pinned);
        }
    }

    fn remap_and_refocus<H>(&mut self, host: &mut H)
    where
        H: Host<Element = E> + ?Sized,
    {
        if !self.mounted {
            return;
        }
        let resolved = self.elements.remap(&*host, &self.steps);
        trace!(tour = self.id, resolved, "element cache rebuilt");

        let visible = self.current_index();
        let selector = self.steps.get(self.nav.current()).map(|s| s.selector.as_str());
        let unchanged = selector
            .and_then(|s| self.elements.resolve(&*host, s))
            .is_some_and(|t| self.target.as_ref() == Some(&t));
        if !(unchanged && self.sync.is_scrolling()) {
            self.sync_focus(host, None);
        }
        if self.current_index() != visible {
            debug!(tour = self.id, from = visible, to = self.current_index(), "waited-for element appeared");
            self.notify(Notify::Move(Direction::Jump));
        }
    }

    /// Resolve the requested step's element and bring it into view.
    fn sync_focus<H>(&mut self, host: &mut H, behavior: Option<ScrollBehavior>)
    where
        H: Host<Element = E> + ?Sized,
    {
        let Some(step) = self.steps.get(self.nav.current()) else {
            self.target = None;
            return;
        };
        let target = self.elements.resolve(&*host, &step.selector);
        let container = step
            .container
            .as_ref()
            .and_then(|c| self.elements.resolve_ref(&*host, c));
        let root = step.intersection.root.as_ref().and_then(|r| {
            let root = self.elements.resolve_ref(&*host, r);
            if root.is_none() {
                debug!(tour = self.id, "intersection root not found; using the viewport");
            }
            root
        });
        let request = FocusRequest {
            scroll_into_view: step.scroll_into_view,
            behavior: behavior.unwrap_or(self.config.scroll_behavior),
            container: container.clone(),
            root,
            root_margin: step.intersection.root_margin,
            threshold: step.intersection.threshold,
        };
        if target.is_none() {
            debug!(tour = self.id, selector = %step.selector, "step target not found");
        }

        self.nav.settle(target.is_some());
        self.target = target.clone();
        self.watch_container(host, container);

        match target {
            Some(target) => {
                if let SyncOutcome::Committed(rect) =
                    self.sync
                        .update_focus(host, &target, request, &mut self.subscriptions)
                {
                    self.focus_rect = rect;
                }
            }
            None => self.sync.cancel(host, &mut self.subscriptions),
        }
    }

    /// Keep exactly one scroll listener on the current step's container.
    fn watch_container<H>(&mut self, host: &mut H, container: Option<E>)
    where
        H: Host<Element = E> + ?Sized,
    {
        if !self.config.scroll_listener || self.container == container {
            return;
        }
        if let Some(old) = self.container.take() {
            self.subscriptions
                .unsubscribe(host, &EventTarget::Element(old), EventKind::Scroll);
        }
        if let Some(new) = &container {
            let target = TargetRef::Live(EventTarget::Element(new.clone()));
            self.subscriptions.subscribe(host, &target, EventKind::Scroll);
        }
        self.container = container;
    }

    fn request_close(&mut self, request: CloseRequest) {
        debug!(tour = self.id, ?request, "close requested");
        if let Some(callbacks) = self.callbacks.as_mut() {
            callbacks.on_request_close(&request);
        }
    }

    fn notify(&mut self, what: Notify) {
        let Some(mut callbacks) = self.callbacks.take() else {
            return;
        };
        let mut commands = Commands::default();
        {
            let snapshot = self.snapshot();
            match what {
                Notify::Move(direction) => {
                    callbacks.on_move(&snapshot, &mut commands);
                    match direction {
                        Direction::Next => callbacks.on_next(&snapshot, &mut commands),
                        Direction::Prev => callbacks.on_prev(&snapshot, &mut commands),
                        Direction::Jump => {}
                    }
                }
                Notify::AfterOpen => callbacks.on_after_open(&snapshot, &mut commands),
                Notify::BeforeClose => callbacks.on_before_close(&snapshot),
            }
        }
        self.callbacks = Some(callbacks);
        self.queue
            .extend(commands.list.into_iter().map(Message::Command));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MutationWatch;
    use crate::headless::{ElementId, HeadlessHost};
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::RefCell;
    use kurbo::{Point, Size};
    use understory_placement::Side;

    #[derive(Clone, Debug, PartialEq)]
    enum Seen {
        Move(usize, bool),
        Next(usize),
        Prev(usize),
        Close(CloseRequest),
        Open(usize),
        BeforeClose,
    }

    struct Recorder {
        seen: Rc<RefCell<Vec<Seen>>>,
        next_on_open: bool,
    }

    impl TourCallbacks<ElementId, ()> for Recorder {
        fn on_move(&mut self, s: &TourSnapshot<'_, ElementId, ()>, _: &mut Commands) {
            self.seen
                .borrow_mut()
                .push(Seen::Move(s.current_index, s.is_scrolling));
        }

        fn on_next(&mut self, s: &TourSnapshot<'_, ElementId, ()>, _: &mut Commands) {
            self.seen.borrow_mut().push(Seen::Next(s.current_index));
        }

        fn on_prev(&mut self, s: &TourSnapshot<'_, ElementId, ()>, _: &mut Commands) {
            self.seen.borrow_mut().push(Seen::Prev(s.current_index));
        }

        fn on_request_close(&mut self, request: &CloseRequest) {
            self.seen.borrow_mut().push(Seen::Close(*request));
        }

        fn on_after_open(&mut self, s: &TourSnapshot<'_, ElementId, ()>, c: &mut Commands) {
            self.seen.borrow_mut().push(Seen::Open(s.current_index));
            if self.next_on_open {
                c.next();
            }
        }

        fn on_before_close(&mut self, _: &TourSnapshot<'_, ElementId, ()>) {
            self.seen.borrow_mut().push(Seen::BeforeClose);
        }
    }

    fn recorded(tour: &mut Tour<ElementId>) -> Rc<RefCell<Vec<Seen>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        tour.set_callbacks(Recorder {
            seen: seen.clone(),
            next_on_open: false,
        });
        seen
    }

    fn host() -> HeadlessHost {
        HeadlessHost::new(Size::new(1000.0, 800.0))
    }

    fn three_visible(host: &mut HeadlessHost) -> Vec<Step<ElementId>> {
        host.insert(None, "#a", Rect::new(40.0, 40.0, 240.0, 90.0));
        host.insert(None, "#b", Rect::new(40.0, 200.0, 240.0, 250.0));
        host.insert(None, "#c", Rect::new(40.0, 400.0, 240.0, 450.0));
        vec![Step::new("#a"), Step::new("#b"), Step::new("#c")]
    }

    #[test]
    fn navigation_clamps_and_reemits_at_the_ends() {
        let mut host = host();
        let steps = three_visible(&mut host);
        let mut tour = Tour::new(1, steps, TourConfig::default()).unwrap();
        let seen = recorded(&mut tour);
        tour.mount(&mut host);

        tour.prev(&mut host);
        for _ in 0..5 {
            tour.next(&mut host);
        }
        tour.goto(&mut host, 99);
        assert_eq!(tour.current_index(), 2);
        assert_eq!(tour.previous_index(), 2);

        let seen = seen.borrow();
        assert_eq!(seen[0], Seen::Open(0));
        assert_eq!(seen[1], Seen::Move(0, false));
        assert_eq!(seen[2], Seen::Prev(0));
        // The last next() at index 2 still notifies.
        assert_eq!(seen[seen.len() - 2], Seen::Next(2));
        assert_eq!(seen[seen.len() - 1], Seen::Move(2, false));
    }

    #[test]
    fn waits_for_element_until_a_mutation_reveals_it() {
        let mut host = host();
        let app = host.insert(None, "#app", Rect::new(0.0, 0.0, 1000.0, 800.0));
        host.insert(Some(app), "#a", Rect::new(40.0, 40.0, 240.0, 90.0));
        host.insert(Some(app), "#c", Rect::new(40.0, 400.0, 240.0, 450.0));
        let steps = vec![Step::new("#a"), Step::new("#b"), Step::new("#c")];
        let config = TourConfig {
            wait_for_element: true,
            mutation_watches: vec![MutationWatch::new("#app").subtree()],
            ..TourConfig::default()
        };
        let mut tour = Tour::new(1, steps, config).unwrap();
        let seen = recorded(&mut tour);
        tour.mount(&mut host);
        assert_eq!(host.watch_count(), 1);

        tour.goto(&mut host, 1);
        assert_eq!(tour.current_index(), 0);
        assert_eq!(tour.requested_index(), 1);
        assert_eq!(tour.current_target(), None);
        assert_eq!(tour.current_step().unwrap().selector, "#a");

        let b = host.insert(Some(app), "#b", Rect::new(40.0, 200.0, 240.0, 250.0));
        host.pump(&mut tour);
        assert_eq!(tour.current_index(), 1);
        assert_eq!(tour.current_target(), Some(&b));
        assert_eq!(tour.focus_rect(), Rect::new(40.0, 200.0, 240.0, 250.0));

        let moves: Vec<Seen> = seen
            .borrow()
            .iter()
            .filter(|s| matches!(s, Seen::Move(..)))
            .cloned()
            .collect();
        assert_eq!(moves, [Seen::Move(0, false), Seen::Move(1, false)]);
    }

    #[test]
    fn without_waiting_the_index_moves_immediately() {
        let mut host = host();
        host.insert(None, "#a", Rect::new(40.0, 40.0, 240.0, 90.0));
        let steps: Vec<Step<ElementId>> = vec![Step::new("#a"), Step::new("#missing")];
        let mut tour = Tour::new(1, steps, TourConfig::default()).unwrap();
        tour.mount(&mut host);
        let before = tour.focus_rect();

        tour.next(&mut host);
        assert_eq!(tour.current_index(), 1);
        assert_eq!(tour.current_target(), None);
        assert!(!tour.is_scrolling());
        // No geometry update for a missing target.
        assert_eq!(tour.focus_rect(), before);
    }

    #[test]
    fn listeners_are_never_stacked() {
        let mut host = host();
        let steps = three_visible(&mut host);
        let mut tour = Tour::new(1, steps, TourConfig::default()).unwrap();
        tour.mount(&mut host);
        tour.mount(&mut host);
        assert_eq!(host.listeners_on(&EventTarget::Window, EventKind::Resize), 1);
        assert_eq!(host.listeners_on(&EventTarget::Window, EventKind::Scroll), 1);

        tour.unmount(&mut host);
        tour.mount(&mut host);
        assert_eq!(host.listener_count(), 2);

        host.resize(Size::new(900.0, 700.0));
        assert_eq!(host.pending_events(), 1);
    }

    #[test]
    fn disabled_listeners_are_not_registered() {
        let mut host = host();
        let steps = three_visible(&mut host);
        let config = TourConfig {
            resize_listener: false,
            scroll_listener: false,
            ..TourConfig::default()
        };
        let mut tour = Tour::new(1, steps, config).unwrap();
        tour.mount(&mut host);
        assert_eq!(host.listener_count(), 0);
    }

    #[test]
    fn in_view_target_is_never_scrolled() {
        let mut host = host();
        let steps = three_visible(&mut host);
        let mut tour = Tour::new(1, steps, TourConfig::default()).unwrap();
        let seen = recorded(&mut tour);
        tour.mount(&mut host);
        tour.next(&mut host);
        tour.next(&mut host);
        tour.focus(&mut host, Some(ScrollBehavior::Smooth));

        assert!(host.scroll_requests().is_empty());
        assert!(!tour.is_scrolling());
        assert!(
            seen.borrow()
                .iter()
                .all(|s| !matches!(s, Seen::Move(_, true)))
        );
        assert_eq!(tour.focus_rect(), Rect::new(40.0, 400.0, 240.0, 450.0));
    }

    #[test]
    fn superseded_scroll_cannot_overwrite_focus() {
        let mut host = host();
        let start = host.insert(None, "#start", Rect::new(40.0, 40.0, 240.0, 90.0));
        let a = host.insert(None, "#a", Rect::new(10.0, 2000.0, 110.0, 2050.0));
        host.insert(None, "#b", Rect::new(10.0, 4000.0, 110.0, 4050.0));
        let steps = vec![Step::new("#start"), Step::new("#a"), Step::new("#b")];
        let config = TourConfig {
            scroll_behavior: ScrollBehavior::Smooth,
            ..TourConfig::default()
        };
        let mut tour = Tour::new(1, steps, config).unwrap();
        let seen = recorded(&mut tour);
        tour.mount(&mut host);
        let start_rect = host.bounding_rect(&start);
        assert_eq!(tour.focus_rect(), start_rect);

        tour.goto(&mut host, 1);
        assert!(tour.is_scrolling());
        let (stale, observed, _) = host.observations()[0];
        assert_eq!(observed, a);

        tour.goto(&mut host, 2);
        // A's observation reports late, with A fully visible.
        tour.handle(
            &mut host,
            HostEvent::Intersection {
                observer: stale,
                target: a,
                ratio: 1.0,
            },
        );
        assert_eq!(tour.focus_rect(), start_rect);
        assert!(tour.is_scrolling());

        host.finish_scroll();
        host.pump(&mut tour);
        assert!(!tour.is_scrolling());
        assert_eq!(tour.focus_rect(), Rect::new(10.0, 750.0, 110.0, 800.0));
        assert!(seen.borrow().contains(&Seen::Move(1, true)));
    }

    #[test]
    fn scroll_listener_is_suspended_while_scrolling() {
        let mut host = host();
        host.insert(None, "#start", Rect::new(40.0, 40.0, 240.0, 90.0));
        host.insert(None, "#far", Rect::new(10.0, 2000.0, 110.0, 2050.0));
        let steps: Vec<Step<ElementId>> = vec![Step::new("#start"), Step::new("#far")];
        let config = TourConfig {
            scroll_behavior: ScrollBehavior::Smooth,
            ..TourConfig::default()
        };
        let mut tour = Tour::new(1, steps, config).unwrap();
        tour.mount(&mut host);

        tour.next(&mut host);
        assert_eq!(host.listeners_on(&EventTarget::Window, EventKind::Scroll), 0);
        host.finish_scroll();
        // Only the arrival is queued; the engine's own scroll fired no listener.
        assert_eq!(host.pending_events(), 1);
        host.pump(&mut tour);
        assert_eq!(host.listeners_on(&EventTarget::Window, EventKind::Scroll), 1);
    }

    #[test]
    fn listeners_refresh_geometry_in_place() {
        let mut host = host();
        let a = host.insert(None, "#a", Rect::new(40.0, 40.0, 240.0, 90.0));
        let mut tour = Tour::<ElementId>::new(1, vec![Step::new("#a")], TourConfig::default())
            .unwrap();
        tour.mount(&mut host);

        host.set_rect(a, Rect::new(60.0, 40.0, 260.0, 90.0));
        host.resize(Size::new(1200.0, 800.0));
        host.pump(&mut tour);
        assert_eq!(tour.focus_rect(), Rect::new(60.0, 40.0, 260.0, 90.0));

        host.scroll_window_to(kurbo::Vec2::new(0.0, 20.0));
        host.pump(&mut tour);
        assert_eq!(tour.focus_rect(), Rect::new(60.0, 20.0, 260.0, 70.0));
        assert!(host.scroll_requests().is_empty());
    }

    #[test]
    fn scrolling_the_target_away_brings_it_back() {
        let mut host = host();
        let a = host.insert(None, "#a", Rect::new(40.0, 400.0, 240.0, 450.0));
        host.insert(None, "#tail", Rect::new(0.0, 3000.0, 10.0, 3010.0));
        let mut tour = Tour::<ElementId>::new(1, vec![Step::new("#a")], TourConfig::default())
            .unwrap();
        tour.mount(&mut host);
        assert!(host.scroll_requests().is_empty());

        // The user scrolls the target off the top of the viewport.
        host.scroll_window_to(kurbo::Vec2::new(0.0, 1000.0));
        host.pump(&mut tour);
        assert_eq!(host.scroll_requests(), &[(a, ScrollBehavior::Instant)]);
        assert!(!tour.is_scrolling());
        assert_eq!(tour.focus_rect(), Rect::new(40.0, 0.0, 240.0, 50.0));
        assert_eq!(host.listeners_on(&EventTarget::Window, EventKind::Scroll), 1);
    }

    #[test]
    fn pinned_step_follows_listeners_while_waiting() {
        let mut host = host();
        let a = host.insert(None, "#a", Rect::new(40.0, 40.0, 240.0, 90.0));
        let steps: Vec<Step<ElementId>> = vec![Step::new("#a"), Step::new("#later")];
        let config = TourConfig {
            wait_for_element: true,
            ..TourConfig::default()
        };
        let mut tour = Tour::new(1, steps, config).unwrap();
        tour.mount(&mut host);
        tour.next(&mut host);
        assert_eq!(tour.current_index(), 0);

        host.set_rect(a, Rect::new(80.0, 40.0, 280.0, 90.0));
        host.resize(Size::new(1200.0, 800.0));
        host.pump(&mut tour);
        assert_eq!(tour.focus_rect(), Rect::new(80.0, 40.0, 280.0, 90.0));
    }

    #[test]
    fn offscreen_container_keeps_scrolling_until_arrival() {
        let mut host = host();
        host.insert(None, "#start", Rect::new(40.0, 40.0, 240.0, 90.0));
        let pane = host.insert(None, "#pane", Rect::new(0.0, 1000.0, 400.0, 1400.0));
        host.set_scroll_extent(pane, Size::new(400.0, 2400.0));
        host.insert(Some(pane), "#row", Rect::new(0.0, 2000.0, 400.0, 2040.0));
        let mut row = Step::<ElementId>::new("#row");
        row.container = Some("#pane".into());
        let config = TourConfig {
            scroll_behavior: ScrollBehavior::Smooth,
            ..TourConfig::default()
        };
        let mut tour = Tour::new(1, vec![Step::new("#start"), row], config).unwrap();
        tour.mount(&mut host);

        tour.next(&mut host);
        host.pump(&mut tour);
        assert!(tour.is_scrolling());
        assert_eq!(tour.focus_rect(), Rect::new(40.0, 40.0, 240.0, 90.0));

        host.finish_scroll();
        host.pump(&mut tour);
        assert!(!tour.is_scrolling());
        assert_eq!(tour.focus_rect(), Rect::new(0.0, 760.0, 400.0, 800.0));
    }

    #[test]
    fn container_scroll_listener_follows_the_step() {
        let mut host = host();
        let pane = host.insert(None, "#pane", Rect::new(0.0, 0.0, 500.0, 500.0));
        host.set_scroll_extent(pane, Size::new(500.0, 1500.0));
        host.insert(Some(pane), "#row", Rect::new(0.0, 100.0, 500.0, 140.0));
        host.insert(None, "#plain", Rect::new(600.0, 100.0, 700.0, 140.0));
        let mut in_pane = Step::<ElementId>::new("#row");
        in_pane.container = Some("#pane".into());
        let steps = vec![in_pane, Step::new("#plain")];
        let mut tour = Tour::new(1, steps, TourConfig::default()).unwrap();
        tour.mount(&mut host);

        let pane_scroll = EventTarget::Element(pane);
        assert_eq!(host.listeners_on(&pane_scroll, EventKind::Scroll), 1);
        tour.focus(&mut host, None);
        assert_eq!(host.listeners_on(&pane_scroll, EventKind::Scroll), 1);
        tour.next(&mut host);
        assert_eq!(host.listeners_on(&pane_scroll, EventKind::Scroll), 0);
    }

    #[test]
    fn overlay_clicks_request_close() {
        let mut host = host();
        let steps = three_visible(&mut host);
        let mut tour = Tour::new(1, steps, TourConfig::default()).unwrap();
        let seen = recorded(&mut tour);
        tour.mount(&mut host);
        assert_eq!(tour.mask_rect(), Rect::new(35.0, 35.0, 245.0, 95.0));

        host.click(Point::new(35.0, 35.0));
        host.click(Point::new(500.0, 500.0));
        host.pump(&mut tour);

        let closes: Vec<(bool, bool)> = seen
            .borrow()
            .iter()
            .filter_map(|s| match s {
                Seen::Close(r) => Some((r.inside_mask, r.overlay_click)),
                _ => None,
            })
            .collect();
        assert_eq!(closes, [(true, true), (false, true)]);
    }

    #[test]
    fn callback_commands_run_after_the_callback() {
        let mut host = host();
        let steps = three_visible(&mut host);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut tour = Tour::new(1, steps, TourConfig::default())
            .unwrap()
            .with_callbacks(Recorder {
                seen: seen.clone(),
                next_on_open: true,
            });
        tour.mount(&mut host);
        assert_eq!(tour.current_index(), 1);
        assert_eq!(
            seen.borrow()[..3],
            [Seen::Open(0), Seen::Move(1, false), Seen::Next(1)]
        );
    }

    #[test]
    fn unmount_revokes_everything() {
        let mut host = host();
        let app = host.insert(None, "#app", Rect::new(0.0, 0.0, 1000.0, 800.0));
        host.insert(Some(app), "#start", Rect::new(40.0, 40.0, 240.0, 90.0));
        host.insert(Some(app), "#far", Rect::new(10.0, 2000.0, 110.0, 2050.0));
        let config = TourConfig {
            scroll_behavior: ScrollBehavior::Smooth,
            mutation_watches: vec![
                MutationWatch::new("#app"),
                MutationWatch::new("#not-there"),
            ],
            ..TourConfig::default()
        };
        let steps = vec![Step::new("#start"), Step::new("#far")];
        let mut tour = Tour::new(1, steps, config).unwrap();
        let seen = recorded(&mut tour);
        tour.mount(&mut host);
        // The unresolvable watch is skipped.
        assert_eq!(host.watch_count(), 1);
        tour.next(&mut host);
        assert_eq!(host.intersection_count(), 1);

        tour.unmount(&mut host);
        assert_eq!(host.listener_count(), 0);
        assert_eq!(host.watch_count(), 0);
        assert_eq!(host.intersection_count(), 0);
        assert!(!tour.is_scrolling());
        assert_eq!(seen.borrow().last(), Some(&Seen::BeforeClose));

        // Navigation is ignored once unmounted.
        tour.goto(&mut host, 0);
        assert_eq!(tour.requested_index(), 1);
    }

    #[test]
    fn set_steps_clamps_and_resyncs() {
        let mut host = host();
        let steps = three_visible(&mut host);
        let mut tour = Tour::new(1, steps, TourConfig::default()).unwrap();
        tour.mount(&mut host);
        tour.goto(&mut host, 2);

        tour.set_steps(&mut host, vec![Step::new("#a")]).unwrap();
        assert_eq!(tour.current_index(), 0);
        assert_eq!(tour.focus_rect(), Rect::new(40.0, 40.0, 240.0, 90.0));

        let mut bad = Step::new("#a");
        bad.intersection.threshold = Some(-0.5);
        assert!(tour.set_steps(&mut host, vec![bad]).is_err());
        assert_eq!(tour.steps().len(), 1);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = TourConfig::<ElementId> {
            mask_padding: f64::NAN,
            ..TourConfig::default()
        };
        assert!(Tour::<ElementId>::new(1, Vec::new(), config).is_err());
    }

    #[test]
    fn frames_carry_placement() {
        let mut host = host();
        // Flush against the left edge, so the preferred left side cannot fit.
        host.insert(None, "#edge", Rect::new(5.0, 300.0, 105.0, 400.0));
        let mut step = Step::new("#edge");
        step.position = Side::Left.into();
        let mut tour = Tour::new(1, vec![step], TourConfig::default()).unwrap();
        tour.mount(&mut host);

        let helper = Size::new(100.0, 50.0);
        let frame = tour.frame(&host, Some(helper));
        assert_eq!(frame.mask, Rect::new(0.0, 295.0, 110.0, 405.0));
        assert_eq!(frame.mask_radius, 5.0);
        let placement = frame.helper.unwrap();
        assert_eq!(placement.side, Side::Right);
        assert_eq!(frame.helper_rect(helper), Some(Rect::new(120.0, 295.0, 220.0, 345.0)));

        let mut strategy = |f: &Frame<'_, ElementId, ()>| f.snapshot.current_index;
        assert_eq!(tour.render(&host, None, &mut strategy), 0);
        assert!(tour.frame(&host, None).helper.is_none());
    }
}
