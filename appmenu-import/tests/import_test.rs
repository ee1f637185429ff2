use appmenu_core::model::{ATTRIBUTE_LABEL, LINK_SECTION, LINK_SUBMENU};
use std::time::{Duration, Instant};

use appmenu_core::{ActionEvent, Coalescer, ItemsChanged, MenuError, MenuModel, UpdateMode, Variant};
use appmenu_import::{
    FollowUp, ImportModel, Importer, LayoutNode, RemoteCall, RemoteItem, TransportError,
};
use appmenu_services::ImportPolicy;
use indexmap::IndexMap;

fn normal(id: i32, label: &str) -> LayoutNode {
    LayoutNode::new(id).with("label", label)
}

fn separator(id: i32) -> LayoutNode {
    LayoutNode::new(id).with("type", "separator")
}

fn submenu(id: i32, label: &str) -> LayoutNode {
    normal(id, label).with("children-display", "submenu")
}

fn menu(children: Vec<LayoutNode>) -> LayoutNode {
    children.into_iter().fold(LayoutNode::new(0), LayoutNode::child)
}

fn apply(importer: &mut Importer, revision: u32, layout: LayoutNode) -> Vec<ItemsChanged<ImportModel>> {
    let root = importer.root();
    let request = importer.update_layout(root).expect("no fetch in flight");
    importer
        .complete_layout(request.model, Ok((revision, layout)))
        .changes
        .into_vec()
}

fn labels(importer: &Importer, section: u32) -> Vec<String> {
    let view = importer.view(ImportModel::Section(importer.root(), section));
    (0..view.item_count())
        .filter_map(|position| view.item_attribute_str(position, ATTRIBUTE_LABEL))
        .collect()
}

fn serials(importer: &Importer) -> Vec<u64> {
    importer
        .model(importer.root())
        .map(|model| model.items().iter().map(RemoteItem::serial).collect())
        .unwrap_or_default()
}

fn file_edit() -> LayoutNode {
    menu(vec![normal(1, "File"), separator(2), normal(3, "Edit")])
}

#[test]
fn test_separator_splits_fresh_model() {
    let mut importer = Importer::new(ImportPolicy::default());
    let root = importer.root();

    let changes = apply(&mut importer, 1, file_edit());
    assert_eq!(
        changes,
        vec![
            ItemsChanged::new(ImportModel::Menu(root), 1, 0, 1),
            ItemsChanged::new(ImportModel::Section(root, 1), 0, 0, 1),
            ItemsChanged::new(ImportModel::Section(root, 0), 0, 0, 1),
        ]
    );

    assert_eq!(importer.view(ImportModel::Menu(root)).item_count(), 2);
    assert_eq!(labels(&importer, 0), vec!["File"]);
    assert_eq!(labels(&importer, 1), vec!["Edit"]);

    let mut shell = importer.view(ImportModel::Menu(root));
    assert_eq!(
        shell.item_links(1).get(LINK_SECTION),
        Some(&ImportModel::Section(root, 1))
    );
}

#[test]
fn test_same_snapshot_twice_is_silent() {
    let mut importer = Importer::new(ImportPolicy::default());
    apply(&mut importer, 1, file_edit());
    let before = serials(&importer);

    let changes = apply(&mut importer, 1, file_edit());
    assert!(changes.is_empty());
    assert_eq!(serials(&importer), before);
}

#[test]
fn test_label_change_keeps_identity() {
    let mut importer = Importer::new(ImportPolicy::default());
    let root = importer.root();
    apply(&mut importer, 1, file_edit());
    let before = serials(&importer);

    let renamed = menu(vec![normal(1, "File"), separator(2), normal(3, "Editor")]);
    let changes = apply(&mut importer, 2, renamed);

    assert_eq!(changes, vec![ItemsChanged::new(ImportModel::Section(root, 1), 0, 1, 1)]);
    assert_eq!(serials(&importer), before);
    assert_eq!(labels(&importer, 1), vec!["Editor"]);
}

#[test]
fn test_insert_reports_single_range() {
    let mut importer = Importer::new(ImportPolicy::default());
    let root = importer.root();
    apply(
        &mut importer,
        1,
        menu(vec![normal(1, "A"), normal(2, "B"), normal(3, "C"), separator(4), normal(5, "D")]),
    );

    let changes = apply(
        &mut importer,
        2,
        menu(vec![
            normal(1, "A"),
            normal(6, "X"),
            normal(2, "B"),
            normal(3, "C"),
            separator(4),
            normal(5, "D"),
        ]),
    );

    assert_eq!(changes, vec![ItemsChanged::new(ImportModel::Section(root, 0), 1, 0, 1)]);
    assert_eq!(labels(&importer, 0), vec!["A", "X", "B", "C"]);
    let places: Vec<i32> = importer
        .model(root)
        .map(|model| model.section(0).iter().map(RemoteItem::place).collect())
        .unwrap_or_default();
    assert_eq!(places, vec![0, 1, 2, 3]);
}

#[test]
fn test_removed_item_reports_single_range() {
    let mut importer = Importer::new(ImportPolicy::default());
    let root = importer.root();
    apply(&mut importer, 1, menu(vec![normal(1, "A"), normal(2, "B"), normal(3, "C")]));

    let changes = apply(&mut importer, 2, menu(vec![normal(1, "A"), normal(3, "C")]));
    assert_eq!(changes, vec![ItemsChanged::new(ImportModel::Section(root, 0), 1, 1, 0)]);
}

#[test]
fn test_second_update_while_fetching_retries_once() {
    let mut importer = Importer::new(ImportPolicy::default());
    let root = importer.root();

    let first = importer.update_layout(root).expect("first fetch");
    assert!(importer.update_layout(root).is_none());
    assert!(importer.update_layout(root).is_none());
    assert!(importer.model(root).is_some_and(|model| model.layout_update_required()));

    let outcome = importer.complete_layout(first.model, Ok((1, file_edit())));
    let retry = outcome.retry.expect("one retry");
    assert_eq!(retry.parent_id, 0);
    assert_eq!(retry.depth, 1);

    let outcome = importer.complete_layout(retry.model, Ok((1, file_edit())));
    assert!(outcome.retry.is_none());
    assert!(outcome.changes.is_empty());
}

#[test]
fn test_cancelled_fetch_changes_nothing() {
    let mut importer = Importer::new(ImportPolicy::default());
    let root = importer.root();
    apply(&mut importer, 1, file_edit());
    let before = serials(&importer);

    let request = importer.update_layout(root).unwrap();
    importer.update_layout(root);
    let outcome = importer.complete_layout(request.model, Err(TransportError::Cancelled));

    assert!(outcome.changes.is_empty());
    assert!(outcome.retry.is_none());
    assert_eq!(serials(&importer), before);
    assert!(importer.model(root).is_some_and(|model| !model.layout_update_in_progress()));
}

#[test]
fn test_malformed_layout_keeps_stale_model() {
    let mut importer = Importer::new(ImportPolicy::default());
    let root = importer.root();
    apply(&mut importer, 1, file_edit());

    let request = importer.update_layout(root).unwrap();
    let error = MenuError::LayoutShape {
        expected: "(ia{sv}av)".into(),
        found: "(s)".into(),
    };
    let outcome = importer.complete_layout(request.model, Err(TransportError::Shape(error)));

    assert!(outcome.changes.is_empty());
    assert_eq!(labels(&importer, 0), vec!["File"]);
    assert_eq!(labels(&importer, 1), vec!["Edit"]);
}

#[test]
fn test_completion_for_released_model_is_ignored() {
    let mut importer = Importer::new(ImportPolicy::default());
    apply(&mut importer, 1, menu(vec![submenu(1, "_File"), normal(2, "Quit")]));
    let child = importer.model_for_parent(1).expect("submenu model");
    let request = importer.update_layout(child).expect("child fetch");

    apply(&mut importer, 2, menu(vec![normal(2, "Quit")]));
    assert!(importer.model(child).is_none());

    let outcome = importer.complete_layout(request.model, Ok((1, LayoutNode::new(1).child(normal(10, "Open")))));
    assert!(outcome.changes.is_empty());
    assert!(outcome.preload.is_empty());
    assert!(importer.model(child).is_none());
}

#[test]
fn test_submenu_links_child_model() {
    let mut importer = Importer::new(ImportPolicy::default());
    let root = importer.root();
    apply(&mut importer, 1, menu(vec![submenu(1, "_File")]));
    let child = importer.model_for_parent(1).unwrap();

    let request = importer.update_layout(child).unwrap();
    assert_eq!(request.parent_id, 1);
    let changes = importer
        .complete_layout(child, Ok((3, LayoutNode::new(1).child(normal(10, "_Open")))))
        .changes
        .into_vec();
    assert_eq!(changes, vec![ItemsChanged::new(ImportModel::Section(child, 0), 0, 0, 1)]);

    let mut section = importer.view(ImportModel::Section(root, 0));
    assert_eq!(section.item_links(0).get(LINK_SUBMENU), Some(&ImportModel::Menu(child)));
    assert_eq!(
        section.item_attribute_str(0, "submenu-action").as_deref(),
        Some("dbusmenu.submenu-1")
    );
}

#[test]
fn test_property_signal_updates_one_item() {
    let mut importer = Importer::new(ImportPolicy::default());
    let root = importer.root();
    apply(&mut importer, 1, file_edit());

    let mut label = IndexMap::new();
    label.insert("label".to_string(), Variant::from("Editor"));
    let set = importer.items_properties_updated(&[(3, label)], &[(1, vec!["label".to_string()])]);

    assert_eq!(set.mode, UpdateMode::Deferred);
    assert_eq!(
        set.changes.into_vec(),
        vec![
            ItemsChanged::new(ImportModel::Section(root, 0), 0, 1, 1),
            ItemsChanged::new(ImportModel::Section(root, 1), 0, 1, 1),
        ]
    );
    assert!(labels(&importer, 0).is_empty());
    assert_eq!(labels(&importer, 1), vec!["Editor"]);
}

#[test]
fn test_property_signal_ignored_during_layout_update() {
    let mut importer = Importer::new(ImportPolicy::default());
    let root = importer.root();
    apply(&mut importer, 1, file_edit());
    importer.update_layout(root);

    let mut label = IndexMap::new();
    label.insert("label".to_string(), Variant::from("Editor"));
    let set = importer.items_properties_updated(&[(3, label)], &[]);
    assert!(set.changes.is_empty());
    assert_eq!(labels(&importer, 1), vec!["Edit"]);
}

#[test]
fn test_layout_updated_signal() {
    let mut importer = Importer::new(ImportPolicy::default());
    let root = importer.root();
    apply(&mut importer, 4, file_edit());

    assert!(importer.layout_updated(4, 0).is_empty());

    match importer.layout_updated(5, 0).as_slice() {
        [FollowUp::Layout(request)] => {
            assert_eq!(request.model, root);
            importer.complete_layout(root, Ok((5, file_edit())));
        },
        other => panic!("expected layout fetch, got {other:?}"),
    }

    let request = match importer.layout_updated(6, 3).as_slice() {
        [FollowUp::Item(request)] => request.clone(),
        other => panic!("expected item fetch, got {other:?}"),
    };
    assert_eq!(request.id, 3);
    assert_eq!(request.depth, 0);

    let set = importer.complete_item_fetch(&request, Ok((6, normal(3, "Edit").with("enabled", false))));
    assert!(set.changes.is_empty());
    assert_eq!(importer.query_action("id-3").map(|info| info.enabled), Some(false));

    let set = importer.complete_item_fetch(&request, Ok((7, normal(3, "_Edit"))));
    assert_eq!(set.mode, UpdateMode::Deferred);
    assert_eq!(set.changes.into_vec(), vec![ItemsChanged::new(ImportModel::Section(root, 1), 0, 1, 1)]);
    assert!(importer.layout_updated(1, 99).is_empty());
}

#[test]
fn test_radio_actions() {
    let mut importer = Importer::new(ImportPolicy::default());
    apply(
        &mut importer,
        1,
        menu(vec![
            normal(10, "Small").with("toggle-type", "radio").with("toggle-state", 1),
            normal(11, "Large").with("toggle-type", "radio").with("toggle-state", 0),
        ]),
    );

    assert_eq!(importer.list_actions(), vec!["id-10".to_string(), "id-11".to_string()]);
    assert_eq!(
        importer.query_action("id-10").and_then(|info| info.state),
        Some(Variant::from("+"))
    );
    assert_eq!(
        importer.take_action_events(),
        vec![ActionEvent::Added("id-10".into()), ActionEvent::Added("id-11".into())]
    );

    let calls = importer.change_action_state("id-11", &Variant::from("+")).unwrap();
    assert_eq!(
        calls,
        vec![RemoteCall::Event {
            id: 11,
            event: "clicked",
            data: Variant::Int32(0),
            timestamp: 0,
        }]
    );
    assert!(importer.change_action_state("id-11", &Variant::from("-")).unwrap().is_empty());
    assert!(matches!(
        importer.change_action_state("id-11", &Variant::from(true)),
        Err(MenuError::InvalidState { .. })
    ));

    let mut state = IndexMap::new();
    state.insert("toggle-state".to_string(), Variant::from(1));
    importer.items_properties_updated(&[(11, state)], &[]);
    assert_eq!(
        importer.take_action_events(),
        vec![ActionEvent::StateChanged("id-11".into(), Some(Variant::from("+")))]
    );
}

#[test]
fn test_submenu_open_and_close() {
    let mut importer = Importer::new(ImportPolicy::default());
    apply(&mut importer, 1, menu(vec![submenu(1, "_File")]));

    let calls = importer.change_action_state("submenu-1", &Variant::from(true)).unwrap();
    assert_eq!(calls, vec![RemoteCall::AboutToShow { id: 1 }]);

    let opened = importer.submenu_opened(1, false);
    let fetch = opened.fetch.expect("never populated submenu is fetched");
    assert_eq!(fetch.parent_id, 1);
    assert_eq!(
        opened.event,
        RemoteCall::Event {
            id: 1,
            event: "opened",
            data: Variant::Int32(0),
            timestamp: 0,
        }
    );
    importer.complete_layout(fetch.model, Ok((1, LayoutNode::new(1).child(normal(10, "_Open")))));

    assert!(importer.submenu_opened(1, false).fetch.is_none());
    assert!(importer.submenu_opened(1, true).fetch.is_some());

    let calls = importer.change_action_state("submenu-1", &Variant::from(false)).unwrap();
    assert!(matches!(calls.as_slice(), [RemoteCall::Event { id: 1, event: "closed", .. }]));
    assert_eq!(
        importer.query_action("submenu-1").and_then(|info| info.state),
        Some(Variant::from(false))
    );
}

#[test]
fn test_activation_request_clicks_item() {
    let mut importer = Importer::new(ImportPolicy::default());
    apply(&mut importer, 1, file_edit());

    let calls = importer.item_activation_requested(3, 42).unwrap();
    assert_eq!(
        calls,
        vec![RemoteCall::Event {
            id: 3,
            event: "clicked",
            data: Variant::Int32(0),
            timestamp: 42,
        }]
    );
    assert_eq!(
        importer.item_activation_requested(77, 0),
        Err(MenuError::UnknownAction("id-77".into()))
    );
}

#[test]
fn test_provisional_enable() {
    let disabled = || menu(vec![normal(1, "Undo").with("enabled", false)]);

    let mut importer = Importer::new(ImportPolicy::default());
    apply(&mut importer, 1, disabled());
    assert_eq!(importer.query_action("id-1").map(|info| info.enabled), Some(true));
    importer.take_action_events();

    assert!(apply(&mut importer, 2, disabled()).is_empty());
    assert_eq!(
        importer.take_action_events(),
        vec![ActionEvent::EnabledChanged("id-1".into(), false)]
    );

    let mut strict = Importer::new(ImportPolicy {
        provisional_enable: false,
        ..ImportPolicy::default()
    });
    apply(&mut strict, 1, disabled());
    assert_eq!(strict.query_action("id-1").map(|info| info.enabled), Some(false));
}

#[test]
fn test_hidden_item_points_at_disabled_action() {
    let mut importer = Importer::new(ImportPolicy::default());
    apply(&mut importer, 1, menu(vec![normal(1, "Print").with("visible", false)]));

    let view = importer.view(ImportModel::Section(importer.root(), 0));
    assert_eq!(view.item_count(), 1);
    assert_eq!(view.item_attribute_str(0, "hidden-when").as_deref(), Some("action-missing"));
    assert_eq!(view.item_attribute_str(0, "action").as_deref(), Some("ls.disabled"));
}

#[test]
fn test_new_name_owner_restarts_revisions() {
    let mut importer = Importer::new(ImportPolicy::default());
    let root = importer.root();
    apply(&mut importer, 40, file_edit());

    assert_eq!(importer.name_owner_changed(false), None);
    assert_eq!(labels(&importer, 0), vec!["File".to_string()]);

    let request = importer.name_owner_changed(true).expect("root refetch");
    assert_eq!(request.model, root);
    importer.complete_layout(root, Ok((1, file_edit())));

    assert!(matches!(importer.layout_updated(2, 0).as_slice(), [FollowUp::Layout(_)]));
}

#[test]
fn test_repeated_inserts_in_one_window_are_all_reported() {
    let mut importer = Importer::new(ImportPolicy::default());
    let root = importer.root();
    let mut coalescer = Coalescer::new(Duration::from_millis(350));
    let start = Instant::now();

    let mut offer = |importer: &mut Importer, layout: LayoutNode, at: Instant| {
        let request = importer.update_layout(root).expect("no fetch in flight");
        let outcome = importer.complete_layout(request.model, Ok((1, layout)));
        assert!(coalescer.offer(outcome.changes, outcome.mode, at).is_none());
    };
    offer(&mut importer, menu(vec![normal(1, "One")]), start);
    offer(&mut importer, menu(vec![normal(2, "Two"), normal(1, "One")]), start + Duration::from_millis(100));
    offer(
        &mut importer,
        menu(vec![normal(3, "Three"), normal(2, "Two"), normal(1, "One")]),
        start + Duration::from_millis(200),
    );

    let emitted = coalescer
        .poll(start + Duration::from_millis(350))
        .expect("window elapsed")
        .into_vec();
    let section = ImportModel::Section(root, 0);
    let added: usize = emitted
        .iter()
        .filter(|change| change.model == section)
        .map(|change| change.added - change.removed)
        .sum();
    assert_eq!(added, 3);
    assert_eq!(labels(&importer, 0), vec!["Three".to_string(), "Two".to_string(), "One".to_string()]);
}

#[test]
fn test_submenu_layout_update_also_refreshes_its_item() {
    let mut importer = Importer::new(ImportPolicy::default());
    let root = importer.root();
    apply(&mut importer, 1, menu(vec![submenu(5, "_File")]));
    let child = importer.model_for_parent(5).expect("submenu model");
    let request = importer.update_layout(child).expect("child fetch");
    importer.complete_layout(request.model, Ok((1, LayoutNode::new(5).child(normal(50, "Open")))));

    let follow_ups = importer.layout_updated(2, 5);
    assert_eq!(follow_ups.len(), 2);
    match &follow_ups[0] {
        FollowUp::Layout(request) => assert_eq!(request.model, child),
        other => panic!("expected child layout fetch, got {other:?}"),
    }
    let FollowUp::Item(item) = &follow_ups[1] else {
        panic!("expected item fetch, got {:?}", follow_ups[1]);
    };
    assert_eq!((item.model, item.id, item.depth), (root, 5, 0));

    let set = importer.complete_item_fetch(item, Ok((2, submenu(5, "_Archive"))));
    assert_eq!(set.changes.into_vec(), vec![ItemsChanged::new(ImportModel::Section(root, 0), 0, 1, 1)]);
    assert_eq!(labels(&importer, 0), vec!["_Archive".to_string()]);
    assert!(importer.layout_updated(2, 5).iter().all(|follow_up| matches!(follow_up, FollowUp::Item(_))));
}
