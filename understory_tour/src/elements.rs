// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Selector → element cache.

use alloc::string::String;

use hashbrown::HashMap;

use crate::host::{Document, ElementRef};
use crate::step::Step;

/// Cache of resolved step targets and step containers.
///
/// The cache is never authoritative. A selector missing from it, or cached as
/// unresolved, is always re-queried from the document, and misses are not
/// stored. When tracking is off (no mutation watches) every lookup goes to the
/// document.
///
/// [`remap`](Self::remap) builds a complete new map before swapping it in, so a
/// reader never observes a half-rebuilt cache.
#[derive(Clone, Debug)]
pub struct ElementCache<E> {
    map: HashMap<String, Option<E>>,
    tracking: bool,
}

impl<E> Default for ElementCache<E> {
    fn default() -> Self {
        Self {
            map: HashMap::new(),
            tracking: false,
        }
    }
}

impl<E: Clone> ElementCache<E> {
    /// Create an empty, non-tracking cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable caching. Disabling also drops cached entries.
    pub fn set_tracking(&mut self, tracking: bool) {
        self.tracking = tracking;
        if !tracking {
            self.map.clear();
        }
    }

    /// Whether lookups are served from the cache.
    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    /// Resolve `selector`, preferring a cached element.
    pub fn resolve<D>(&self, doc: &D, selector: &str) -> Option<E>
    where
        D: Document<Element = E> + ?Sized,
    {
        if self.tracking
            && let Some(Some(element)) = self.map.get(selector)
        {
            return Some(element.clone());
        }
        doc.query(selector)
    }

    /// Resolve an element given as a live reference or a selector.
    pub fn resolve_ref<D>(&self, doc: &D, element: &ElementRef<E>) -> Option<E>
    where
        D: Document<Element = E> + ?Sized,
    {
        match element {
            ElementRef::Live(element) => Some(element.clone()),
            ElementRef::Selector(selector) => self.resolve(doc, selector),
        }
    }

    /// Re-query every step target and container selector and swap the result in.
    ///
    /// Returns how many selectors resolved. A no-op when tracking is off.
    pub fn remap<D, T>(&mut self, doc: &D, steps: &[Step<E, T>]) -> usize
    where
        D: Document<Element = E> + ?Sized,
    {
        if !self.tracking {
            return 0;
        }
        let mut next = HashMap::with_capacity(steps.len());
        let selectors = steps
            .iter()
            .flat_map(|step| core::iter::once(step.selector.as_str()).chain(step.container_selector()));
        for selector in selectors {
            if !next.contains_key(selector) {
                next.insert(String::from(selector), doc.query(selector));
            }
        }
        let resolved = next.values().filter(|e| e.is_some()).count();
        self.map = next;
        resolved
    }

    /// Number of cached selectors, resolved or not.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
