// SPDX-License-Identifier: LGPL-3.0-only
//! Drives an [`Importer`] against a [`LayoutTransport`].

use std::collections::VecDeque;
use std::time::Instant;

use futures::{Stream, StreamExt};
use indexmap::IndexMap;
use log::warn;

use appmenu_core::{Coalescer, ItemsChanged, PendingChanges, UpdateMode, Variant};
use appmenu_services::ImportPolicy;

use crate::importer::{FetchRequest, FollowUp, Importer, RemoteCall};
use crate::model::ModelId;
use crate::transport::{LayoutTransport, MenuSignal, TransportError};
use crate::view::ImportModel;

/// An import engine bound to one remote menu.
///
/// Change notifications become available through
/// [`take_changes`](Self::take_changes) once the [`Coalescer`] releases them.
pub struct ImportSession<T> {
    importer: Importer,
    transport: T,
    coalescer: Coalescer<ImportModel>,
    preloads: Vec<(Instant, ModelId)>,
    ready: Vec<ItemsChanged<ImportModel>>,
}

impl<T: LayoutTransport> ImportSession<T> {
    pub fn new(transport: T, policy: ImportPolicy) -> Self {
        let coalescer = Coalescer::new(policy.coalesce_delay);
        Self {
            importer: Importer::new(policy),
            transport,
            coalescer,
            preloads: Vec::new(),
            ready: Vec::new(),
        }
    }

    pub fn importer(&self) -> &Importer {
        &self.importer
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Notifications released so far, in emission order.
    pub fn take_changes(&mut self) -> Vec<ItemsChanged<ImportModel>> {
        std::mem::take(&mut self.ready)
    }

    /// Fetch the root menu level.
    pub async fn refresh(&mut self) {
        let root = self.importer.root();
        self.refresh_model(root).await;
    }

    /// Fetch one menu level, following up on updates requested meanwhile.
    pub async fn refresh_model(&mut self, model: ModelId) {
        if let Some(request) = self.importer.update_layout(model) {
            self.fetch(request).await;
        }
    }

    async fn fetch(&mut self, request: FetchRequest) {
        let mut next = Some(request);
        while let Some(request) = next.take() {
            let result = self
                .transport
                .get_layout(request.parent_id, request.depth, request.properties)
                .await;
            let outcome = self.importer.complete_layout(request.model, result);
            let now = Instant::now();
            self.offer(outcome.changes, outcome.mode, now);
            let at = now + self.importer.policy().preload_delay;
            self.preloads
                .extend(outcome.preload.into_iter().map(|model| (at, model)));
            next = outcome.retry;
        }
    }

    pub async fn handle_signal(&mut self, signal: MenuSignal) -> Result<(), TransportError> {
        match signal {
            MenuSignal::LayoutUpdated { revision, parent } => {
                self.handle_layout_updated(revision, parent).await;
                Ok(())
            },
            MenuSignal::ItemsPropertiesUpdated { updated, removed } => {
                self.handle_items_properties_updated(&updated, &removed);
                Ok(())
            },
            MenuSignal::ItemActivationRequested { id, timestamp } => {
                let calls = self.importer.item_activation_requested(id, timestamp)?;
                self.send(calls).await
            },
            MenuSignal::NameOwnerChanged { present } => {
                if let Some(request) = self.importer.name_owner_changed(present) {
                    self.fetch(request).await;
                }
                Ok(())
            },
        }
    }

    pub async fn handle_layout_updated(&mut self, revision: u32, parent: i32) {
        for follow_up in self.importer.layout_updated(revision, parent) {
            match follow_up {
                FollowUp::Layout(request) => self.fetch(request).await,
                FollowUp::Item(request) => {
                    let result = self
                        .transport
                        .get_layout(request.id, request.depth, request.properties)
                        .await;
                    let set = self.importer.complete_item_fetch(&request, result);
                    self.offer(set.changes, set.mode, Instant::now());
                },
            }
        }
    }

    pub fn handle_items_properties_updated(
        &mut self,
        updated: &[(i32, IndexMap<String, Variant>)],
        removed: &[(i32, Vec<String>)],
    ) {
        let set = self.importer.items_properties_updated(updated, removed);
        self.offer(set.changes, set.mode, Instant::now());
    }

    /// Activate an imported action on the remote side.
    pub async fn activate(&mut self, name: &str) -> Result<(), TransportError> {
        let calls = self.importer.activate_action(name)?;
        self.send(calls).await
    }

    /// Change the state of an imported action on the remote side.
    pub async fn change_state(&mut self, name: &str, value: &Variant) -> Result<(), TransportError> {
        let calls = self.importer.change_action_state(name, value)?;
        self.send(calls).await
    }

    async fn send(&mut self, calls: Vec<RemoteCall>) -> Result<(), TransportError> {
        let mut queue: VecDeque<RemoteCall> = calls.into();
        while let Some(call) = queue.pop_front() {
            match call {
                RemoteCall::Event {
                    id,
                    event,
                    data,
                    timestamp,
                } => self.transport.event(id, event, data, timestamp).await?,
                RemoteCall::AboutToShow { id } => {
                    let need_update = match self.transport.about_to_show(id).await {
                        Ok(need_update) => need_update,
                        Err(TransportError::Cancelled) => return Ok(()),
                        Err(err) => {
                            warn!("AboutToShow({}) failed: {}", id, err);
                            false
                        },
                    };
                    let opened = self.importer.submenu_opened(id, need_update);
                    if let Some(request) = opened.fetch {
                        self.fetch(request).await;
                    }
                    queue.push_front(opened.event);
                },
            }
        }
        Ok(())
    }

    fn offer(&mut self, changes: PendingChanges<ImportModel>, mode: UpdateMode, now: Instant) {
        if let Some(due) = self.coalescer.offer(changes, mode, now) {
            self.ready.extend(due);
        }
    }

    /// The next instant at which [`poll`](Self::poll) has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.preloads
            .iter()
            .map(|(at, _)| *at)
            .chain(self.coalescer.deadline())
            .min()
    }

    /// Release due notifications and run due preloads.
    pub async fn poll(&mut self, now: Instant) {
        if let Some(due) = self.coalescer.poll(now) {
            self.ready.extend(due);
        }
        self.run_due_preloads(now).await;
    }

    pub async fn run_due_preloads(&mut self, now: Instant) {
        let (due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.preloads)
            .into_iter()
            .partition(|(at, _)| *at <= now);
        self.preloads = waiting;
        for (_, model) in due {
            self.refresh_model(model).await;
        }
    }

    /// Release everything the coalescer holds, regardless of its deadline.
    pub fn flush(&mut self) {
        if let Some(pending) = self.coalescer.flush() {
            self.ready.extend(pending);
        }
    }

    /// Wait out every pending timer.
    pub async fn settle(&mut self) {
        while let Some(deadline) = self.next_deadline() {
            tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;
            self.poll(Instant::now()).await;
        }
    }

    /// Fetch the root level, then follow `signals` until the stream ends.
    ///
    /// `on_changes` receives every released batch together with the importer
    /// state it describes.
    pub async fn run<S, F>(&mut self, mut signals: S, mut on_changes: F)
    where
        S: Stream<Item = MenuSignal> + Unpin,
        F: FnMut(&Importer, Vec<ItemsChanged<ImportModel>>),
    {
        self.refresh().await;
        loop {
            self.deliver(&mut on_changes);
            let next = signals.next();
            let signal = match self.next_deadline() {
                Some(deadline) => {
                    match tokio::time::timeout_at(tokio::time::Instant::from_std(deadline), next).await {
                        Ok(signal) => signal,
                        Err(_) => {
                            self.poll(Instant::now()).await;
                            continue;
                        },
                    }
                },
                None => next.await,
            };
            let Some(signal) = signal else {
                break;
            };
            if let Err(err) = self.handle_signal(signal).await {
                warn!("failed to handle menu signal: {}", err);
            }
        }
        self.settle().await;
        self.deliver(&mut on_changes);
    }

    fn deliver<F>(&mut self, on_changes: &mut F)
    where
        F: FnMut(&Importer, Vec<ItemsChanged<ImportModel>>),
    {
        let ready = self.take_changes();
        if !ready.is_empty() {
            on_changes(&self.importer, ready);
        }
    }
}
