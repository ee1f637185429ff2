use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use appmenu_core::{ItemsChanged, MenuModel, Variant};
use appmenu_import::{
    ImportModel, ImportSession, LayoutNode, LayoutTransport, MenuSignal, TransportError,
};
use appmenu_services::ImportPolicy;
use async_trait::async_trait;

#[derive(Default)]
struct ScriptedTransport {
    layouts: Mutex<HashMap<i32, (u32, LayoutNode)>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    fn set_layout(&self, parent: i32, revision: u32, layout: LayoutNode) {
        self.layouts.lock().unwrap().insert(parent, (revision, layout));
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl LayoutTransport for ScriptedTransport {
    async fn get_layout(
        &self,
        parent: i32,
        depth: i32,
        _properties: &[&str],
    ) -> Result<(u32, LayoutNode), TransportError> {
        self.record(format!("GetLayout({parent}, {depth})"));
        let layouts = self.layouts.lock().unwrap();
        if let Some(layout) = layouts.get(&parent) {
            return Ok(layout.clone());
        }
        layouts
            .values()
            .find_map(|(revision, layout)| {
                layout
                    .children
                    .iter()
                    .find(|child| child.id == parent)
                    .map(|child| (*revision, child.clone()))
            })
            .ok_or_else(|| TransportError::Remote(format!("no node {parent}")))
    }

    async fn event(&self, id: i32, event: &str, data: Variant, timestamp: u32) -> Result<(), TransportError> {
        self.record(format!("Event({id}, {event}, {data}, {timestamp})"));
        Ok(())
    }

    async fn about_to_show(&self, id: i32) -> Result<bool, TransportError> {
        self.record(format!("AboutToShow({id})"));
        Ok(false)
    }
}

fn policy() -> ImportPolicy {
    ImportPolicy {
        preload_delay: Duration::from_millis(10),
        coalesce_delay: Duration::from_millis(30),
        ..ImportPolicy::default()
    }
}

fn root_layout() -> LayoutNode {
    LayoutNode::new(0)
        .child(
            LayoutNode::new(1)
                .with("label", "_File")
                .with("children-display", "submenu"),
        )
        .child(LayoutNode::new(2).with("type", "separator"))
        .child(LayoutNode::new(3).with("label", "_Help"))
}

fn file_layout() -> LayoutNode {
    LayoutNode::new(1)
        .child(LayoutNode::new(10).with("label", "_Open"))
        .child(LayoutNode::new(11).with("label", "_Quit"))
}

fn session() -> ImportSession<ScriptedTransport> {
    let transport = ScriptedTransport::default();
    transport.set_layout(0, 1, root_layout());
    transport.set_layout(1, 1, file_layout());
    ImportSession::new(transport, policy())
}

#[tokio::test]
async fn test_full_update_waits_for_debounce_window() {
    let mut session = session();
    session.refresh().await;
    assert!(session.take_changes().is_empty());
    assert!(session.next_deadline().is_some());

    session.settle().await;
    let root = session.importer().root();
    let changes = session.take_changes();
    assert_eq!(changes.first(), Some(&ItemsChanged::new(ImportModel::Menu(root), 1, 0, 1)));

    let child = session.importer().model_for_parent(1).unwrap();
    assert!(changes.contains(&ItemsChanged::new(ImportModel::Section(child, 0), 0, 0, 2)));
    assert_eq!(
        session.transport().calls(),
        vec!["GetLayout(0, 1)".to_string(), "GetLayout(1, 1)".to_string()]
    );
    assert!(session.next_deadline().is_none());
}

#[tokio::test]
async fn test_opening_populated_submenu_skips_fetch() {
    let mut session = session();
    session.refresh().await;
    session.settle().await;

    session.change_state("submenu-1", &Variant::from(true)).await.unwrap();
    let calls = session.transport().calls();
    assert_eq!(
        &calls[2..],
        &["AboutToShow(1)".to_string(), "Event(1, opened, 0, 0)".to_string()]
    );

    session.activate("id-11").await.unwrap();
    assert_eq!(session.transport().calls().last().map(String::as_str), Some("Event(11, clicked, 0, 0)"));
    assert!(session.activate("id-99").await.is_err());
}

#[tokio::test]
async fn test_property_updates_flush_on_next_poll() {
    let mut session = session();
    session.refresh().await;
    session.settle().await;
    session.take_changes();

    let mut label = indexmap::IndexMap::new();
    label.insert("label".to_string(), Variant::from("_Manual"));
    session.handle_items_properties_updated(&[(3, label)], &[]);
    assert!(session.take_changes().is_empty());

    session.poll(std::time::Instant::now()).await;
    let root = session.importer().root();
    assert_eq!(session.take_changes(), vec![ItemsChanged::new(ImportModel::Section(root, 1), 0, 1, 1)]);
}

#[tokio::test]
async fn test_run_follows_layout_signals() {
    let mut session = session();
    let signals = futures::stream::iter(vec![MenuSignal::LayoutUpdated { revision: 2, parent: 0 }]);
    session.transport().set_layout(
        0,
        2,
        root_layout().child(LayoutNode::new(4).with("label", "_About")),
    );

    let mut batches = Vec::new();
    session
        .run(signals, |_, changes| batches.push(changes))
        .await;

    assert!(!batches.is_empty());
    let root = session.importer().root();
    let view = session.importer().view(ImportModel::Section(root, 1));
    assert_eq!(view.item_count(), 2);
    assert_eq!(view.item_attribute_str(1, "label").as_deref(), Some("_About"));
    assert_eq!(session.importer().model(root).map(|model| model.current_revision()), Some(2));
}
