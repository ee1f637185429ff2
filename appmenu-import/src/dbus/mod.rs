// SPDX-License-Identifier: LGPL-3.0-only
//! `com.canonical.dbusmenu` client.
//!
//! [`DbusMenuProxy`] implements [`LayoutTransport`] over a zbus proxy for one
//! remote menu object and exposes its signals as a [`MenuSignal`] stream.

mod convert;

use std::collections::HashMap;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use log::warn;
use zbus::zvariant::OwnedValue;
use zbus::{Connection, Proxy};

use appmenu_core::Variant;

use crate::layout::{parse_layout, LayoutNode};
use crate::transport::{LayoutTransport, MenuSignal, TransportError};

pub use convert::{from_variant, to_variant};

pub const DBUSMENU_INTERFACE: &str = "com.canonical.dbusmenu";

/// The `(ia{sv}av)` layout node as sent on the wire.
#[derive(Debug, serde::Deserialize, zbus::zvariant::Type)]
struct LayoutWire {
    id: i32,
    properties: HashMap<String, OwnedValue>,
    children: Vec<OwnedValue>,
}

impl LayoutWire {
    fn into_variant(self) -> Variant {
        Variant::Tuple(vec![
            Variant::Int32(self.id),
            Variant::Dict(convert::properties(&self.properties)),
            Variant::Array(self.children.iter().map(|child| to_variant(child)).collect()),
        ])
    }
}

type PropertiesUpdated = (Vec<(i32, HashMap<String, OwnedValue>)>, Vec<(i32, Vec<String>)>);

/// Client of one remote menu object.
#[derive(Clone, Debug)]
pub struct DbusMenuProxy {
    proxy: Proxy<'static>,
}

impl DbusMenuProxy {
    pub async fn new(connection: &Connection, destination: String, path: String) -> zbus::Result<Self> {
        let proxy = Proxy::new(connection, destination, path, DBUSMENU_INTERFACE).await?;
        Ok(Self { proxy })
    }

    /// The `Version` property of the remote menu.
    pub async fn version(&self) -> zbus::Result<u32> {
        self.proxy.get_property("Version").await
    }

    /// All menu signals, merged into one stream.
    ///
    /// Signals whose body does not decode are logged and dropped.
    pub async fn signals(&self) -> zbus::Result<BoxStream<'static, MenuSignal>> {
        let layout = self
            .proxy
            .receive_signal("LayoutUpdated")
            .await?
            .filter_map(|message| async move {
                match message.body().deserialize::<(u32, i32)>() {
                    Ok((revision, parent)) => Some(MenuSignal::LayoutUpdated { revision, parent }),
                    Err(err) => {
                        warn!("malformed LayoutUpdated signal: {}", err);
                        None
                    },
                }
            });

        let properties = self
            .proxy
            .receive_signal("ItemsPropertiesUpdated")
            .await?
            .filter_map(|message| async move {
                match message.body().deserialize::<PropertiesUpdated>() {
                    Ok((updated, removed)) => Some(MenuSignal::ItemsPropertiesUpdated {
                        updated: updated
                            .iter()
                            .map(|(id, properties)| (*id, convert::properties(properties)))
                            .collect(),
                        removed,
                    }),
                    Err(err) => {
                        warn!("malformed ItemsPropertiesUpdated signal: {}", err);
                        None
                    },
                }
            });

        let activation = self
            .proxy
            .receive_signal("ItemActivationRequested")
            .await?
            .filter_map(|message| async move {
                match message.body().deserialize::<(i32, u32)>() {
                    Ok((id, timestamp)) => Some(MenuSignal::ItemActivationRequested { id, timestamp }),
                    Err(err) => {
                        warn!("malformed ItemActivationRequested signal: {}", err);
                        None
                    },
                }
            });

        Ok(stream::select(stream::select(layout, properties), activation).boxed())
    }

    /// Owner changes of the remote bus name as
    /// [`MenuSignal::NameOwnerChanged`].
    pub async fn presence(&self) -> zbus::Result<BoxStream<'static, MenuSignal>> {
        let owners = self.proxy.receive_owner_changed().await?;
        Ok(owners
            .map(|owner| MenuSignal::NameOwnerChanged {
                present: owner.is_some(),
            })
            .boxed())
    }
}

#[async_trait]
impl LayoutTransport for DbusMenuProxy {
    async fn get_layout(
        &self,
        parent: i32,
        depth: i32,
        properties: &[&str],
    ) -> Result<(u32, LayoutNode), TransportError> {
        let (revision, layout): (u32, LayoutWire) = self
            .proxy
            .call("GetLayout", &(parent, depth, properties))
            .await?;
        Ok((revision, parse_layout(&layout.into_variant())?))
    }

    async fn event(&self, id: i32, event: &str, data: Variant, timestamp: u32) -> Result<(), TransportError> {
        let _: () = self
            .proxy
            .call("Event", &(id, event, from_variant(&data), timestamp))
            .await?;
        Ok(())
    }

    async fn about_to_show(&self, id: i32) -> Result<bool, TransportError> {
        let need_update: bool = self.proxy.call("AboutToShow", &(id,)).await?;
        Ok(need_update)
    }
}
