// SPDX-License-Identifier: LGPL-3.0-only
//! The bus side of the import engine.

use async_trait::async_trait;
use indexmap::IndexMap;

use appmenu_core::{MenuError, Variant};

use crate::layout::LayoutNode;

/// Errors returned by a [`LayoutTransport`].
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The call was cancelled before it completed. Not a failure.
    #[error("Operation was cancelled")]
    Cancelled,

    /// The remote menu is gone.
    #[error("Remote menu disconnected")]
    Disconnected,

    /// The remote side replied with an error.
    #[error("Remote error: {0}")]
    Remote(String),

    /// The reply could not be used, or referred to an unknown action.
    #[error(transparent)]
    Shape(#[from] MenuError),

    /// Bus level failure.
    #[cfg(feature = "global-menu")]
    #[error("DBus error: {0}")]
    Bus(#[from] zbus::Error),
}

/// Access to one remote `com.canonical.dbusmenu` object.
#[async_trait]
pub trait LayoutTransport: Send + Sync {
    /// `GetLayout(parent, depth, properties)`.
    async fn get_layout(
        &self,
        parent: i32,
        depth: i32,
        properties: &[&str],
    ) -> Result<(u32, LayoutNode), TransportError>;

    /// `Event(id, event, data, timestamp)`.
    async fn event(&self, id: i32, event: &str, data: Variant, timestamp: u32) -> Result<(), TransportError>;

    /// `AboutToShow(id)`; returns whether the remote wants the layout refreshed.
    async fn about_to_show(&self, id: i32) -> Result<bool, TransportError>;
}

/// Signals of a remote `com.canonical.dbusmenu` object.
#[derive(Debug, Clone, PartialEq)]
pub enum MenuSignal {
    /// `LayoutUpdated(revision, parent)`
    LayoutUpdated { revision: u32, parent: i32 },
    /// `ItemsPropertiesUpdated(updated, removed)`
    ItemsPropertiesUpdated {
        updated: Vec<(i32, IndexMap<String, Variant>)>,
        removed: Vec<(i32, Vec<String>)>,
    },
    /// `ItemActivationRequested(id, timestamp)`
    ItemActivationRequested { id: i32, timestamp: u32 },
    /// The bus name of the remote menu gained or lost its owner.
    NameOwnerChanged { present: bool },
}
