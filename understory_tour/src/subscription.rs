// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! De-duplicated listener bookkeeping.
//!
//! The registry holds at most one live listener per `(target, kind)` pair.
//! Subscribing again revokes the previous listener first, so a handler never
//! stacks. Listeners can also be suspended as a group and later resumed, which
//! scroll synchronization uses to keep engine-initiated scrolls from feeding
//! back into the engine.

use alloc::vec::Vec;

use hashbrown::{HashMap, HashSet};

use crate::host::{EventKind, EventTarget, Listen, ListenerId, TargetRef};

type Key<E> = (EventTarget<E>, EventKind);

/// Live and suspended listeners, keyed by target identity and event kind.
#[derive(Clone, Debug)]
pub struct SubscriptionRegistry<E> {
    active: HashMap<Key<E>, ListenerId>,
    suspended: HashSet<Key<E>>,
}

impl<E> Default for SubscriptionRegistry<E> {
    fn default() -> Self {
        Self {
            active: HashMap::new(),
            suspended: HashSet::new(),
        }
    }
}

impl<E> SubscriptionRegistry<E>
where
    E: Clone + Eq + core::hash::Hash,
{
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen for `kind` on `target`, replacing any existing listener for the pair.
    ///
    /// Selector targets are resolved now; a selector that matches nothing is a
    /// no-op and returns `None`.
    pub fn subscribe<H>(
        &mut self,
        host: &mut H,
        target: &TargetRef<E>,
        kind: EventKind,
    ) -> Option<ListenerId>
    where
        H: Listen<Element = E> + ?Sized,
    {
        let target = target.resolve(&*host)?;
        let key = (target, kind);
        if let Some(previous) = self.active.remove(&key) {
            host.unlisten(previous);
        }
        self.suspended.remove(&key);
        let id = host.listen(&key.0, kind);
        self.active.insert(key, id);
        Some(id)
    }

    /// Revoke the listener for `(target, kind)`, live or suspended.
    ///
    /// Returns `true` if anything was removed.
    pub fn unsubscribe<H>(&mut self, host: &mut H, target: &EventTarget<E>, kind: EventKind) -> bool
    where
        H: Listen<Element = E> + ?Sized,
    {
        let key = (target.clone(), kind);
        let was_suspended = self.suspended.remove(&key);
        match self.active.remove(&key) {
            Some(id) => {
                host.unlisten(id);
                true
            }
            None => was_suspended,
        }
    }

    /// Revoke every listener and forget suspended ones.
    pub fn unsubscribe_all<H>(&mut self, host: &mut H)
    where
        H: Listen<Element = E> + ?Sized,
    {
        for (_, id) in self.active.drain() {
            host.unlisten(id);
        }
        self.suspended.clear();
    }

    /// Revoke every live listener of `kind`, remembering them for [`resume`](Self::resume).
    ///
    /// Returns how many listeners were suspended by this call.
    pub fn suspend<H>(&mut self, host: &mut H, kind: EventKind) -> usize
    where
        H: Listen<Element = E> + ?Sized,
    {
        let keys: Vec<Key<E>> = self
            .active
            .keys()
            .filter(|(_, k)| *k == kind)
            .cloned()
            .collect();
        for key in &keys {
            if let Some(id) = self.active.remove(key) {
                host.unlisten(id);
            }
        }
        let count = keys.len();
        self.suspended.extend(keys);
        count
    }

    /// Re-register every suspended listener of `kind` with a fresh id.
    ///
    /// Returns how many listeners were resumed.
    pub fn resume<H>(&mut self, host: &mut H, kind: EventKind) -> usize
    where
        H: Listen<Element = E> + ?Sized,
    {
        let keys: Vec<Key<E>> = self
            .suspended
            .iter()
            .filter(|(_, k)| *k == kind)
            .cloned()
            .collect();
        for key in &keys {
            self.suspended.remove(key);
            let id = host.listen(&key.0, kind);
            self.active.insert(key.clone(), id);
        }
        keys.len()
    }

    /// Whether a live listener exists for `(target, kind)`.
    pub fn is_active(&self, target: &EventTarget<E>, kind: EventKind) -> bool {
        self.active.contains_key(&(target.clone(), kind))
    }

    /// Whether `(target, kind)` is currently suspended.
    pub fn is_suspended(&self, target: &EventTarget<E>, kind: EventKind) -> bool {
        self.suspended.contains(&(target.clone(), kind))
    }

    /// Map a fired listener id back to what it was registered for.
    ///
    /// Ids of revoked listeners return `None`.
    pub fn lookup(&self, id: ListenerId) -> Option<(&EventTarget<E>, EventKind)> {
        self.active
            .iter()
            .find(|(_, live)| **live == id)
            .map(|((target, kind), _)| (target, *kind))
    }

    /// Number of live listeners.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Returns `true` if there are no live listeners.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
