// SPDX-License-Identifier: LGPL-3.0-only
//! Structural change notifications and their coalescing.
//!
//! Mutating operations never call observers directly. They return a
//! [`PendingChanges`] batch; the event loop decides when to flush it, usually
//! through a [`Coalescer`].

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// `items_changed(position, removed, added)` on the model `model`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemsChanged<M> {
    /// The model whose item list changed.
    pub model: M,
    /// First affected position.
    pub position: usize,
    /// Number of items removed at `position`.
    pub removed: usize,
    /// Number of items added at `position`.
    pub added: usize,
}

impl<M> ItemsChanged<M> {
    pub fn new(model: M, position: usize, removed: usize, added: usize) -> Self {
        Self {
            model,
            position,
            removed,
            added,
        }
    }
}

/// How a batch produced by the import side should be emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// Flush at once.
    Immediate,
    /// Flush on the next poll of the event loop.
    Deferred,
    /// Full layout replacement; batched over the debounce window.
    Full,
}

/// A queue of change notifications.
///
/// Notifications pushed into one batch are deduplicated on
/// `(model, removed, added, position)`; [`merge`](Self::merge) keeps
/// duplicates across batches.
/// Within one batch they are emitted last-in-first-out: a reconciliation pass
/// pushes per-item changes first and the structural section change last, so
/// the structural change reaches observers before the details depending on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChanges<M> {
    queue: VecDeque<ItemsChanged<M>>,
}

impl<M> Default for PendingChanges<M> {
    fn default() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }
}

impl<M: PartialEq> PendingChanges<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a notification unless an identical one is already queued.
    pub fn push(&mut self, change: ItemsChanged<M>) {
        if !self.queue.contains(&change) {
            self.queue.push_front(change);
        }
    }

    /// Shorthand for [`push`](Self::push).
    pub fn add(&mut self, model: M, position: usize, removed: usize, added: usize) {
        self.push(ItemsChanged::new(model, position, removed, added));
    }

    /// Append a newer batch behind this one.
    ///
    /// Notifications of `self` are still emitted first. Every notification of
    /// `newer` is kept: equal notifications from separate batches describe
    /// separate changes.
    pub fn merge(&mut self, newer: PendingChanges<M>) {
        self.queue.extend(newer.queue);
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Notifications in emission order.
    pub fn iter(&self) -> impl Iterator<Item = &ItemsChanged<M>> {
        self.queue.iter()
    }

    /// Consume the batch, yielding notifications in emission order.
    pub fn into_vec(self) -> Vec<ItemsChanged<M>> {
        self.queue.into()
    }
}

impl<M: PartialEq> IntoIterator for PendingChanges<M> {
    type Item = ItemsChanged<M>;
    type IntoIter = std::collections::vec_deque::IntoIter<ItemsChanged<M>>;

    fn into_iter(self) -> Self::IntoIter {
        self.queue.into_iter()
    }
}

/// Timing policy for change batches.
///
/// The first [`UpdateMode::Full`] batch opens a debounce window; later batches
/// of any mode join the in-flight batch and are emitted with it when the window
/// closes. Without a batch in flight, [`UpdateMode::Immediate`] flushes at once
/// and [`UpdateMode::Deferred`] waits for the next [`poll`](Coalescer::poll).
#[derive(Debug)]
pub struct Coalescer<M> {
    delay: Duration,
    pending: Option<(PendingChanges<M>, Instant)>,
}

impl<M: PartialEq> Coalescer<M> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Offer a batch. Returns the notifications that are due right now.
    pub fn offer(
        &mut self,
        changes: PendingChanges<M>,
        mode: UpdateMode,
        now: Instant,
    ) -> Option<PendingChanges<M>> {
        if changes.is_empty() {
            return None;
        }
        if let Some((pending, _)) = self.pending.as_mut() {
            pending.merge(changes);
            return None;
        }
        match mode {
            UpdateMode::Immediate => Some(changes),
            UpdateMode::Deferred => {
                self.pending = Some((changes, now));
                None
            },
            UpdateMode::Full => {
                self.pending = Some((changes, now + self.delay));
                None
            },
        }
    }

    /// Take the in-flight batch if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<PendingChanges<M>> {
        match &self.pending {
            Some((_, deadline)) if *deadline <= now => self.pending.take().map(|(c, _)| c),
            _ => None,
        }
    }

    /// When the in-flight batch becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    /// Take the in-flight batch regardless of its deadline.
    pub fn flush(&mut self) -> Option<PendingChanges<M>> {
        self.pending.take().map(|(changes, _)| changes)
    }
}
