//! Integration tests for the tree store operations on page and menu snapshots.

use rstest::{fixture, rstest};
use serde_json::json;

use cmstree::config::Settings;
use cmstree::domain::{
    AllowAll, Breakpoint, Direction, DomainError, ElementType, Field, Node, NodeData, NodeField, NodeId,
    ParentRef, Shifted, Tree, Width,
};

fn id(s: &str) -> NodeId {
    NodeId::new(s)
}

fn element(uuid: &str, tag: &str) -> Node {
    let data = NodeData::from_parts(&ElementType::element(tag), Default::default()).unwrap();
    Node::new(id(uuid), data)
}

/// s1 Section > r1 Row > [a Column(sm=6) > [t1 Text], b Column(sm=6)]; s2 Section
#[fixture]
fn page() -> Tree {
    serde_json::from_value(json!({
        "aggregate": "page",
        "version": 4,
        "nodes": [
            {"uuid": "s1", "elementName": "Section", "data": {"title": "Intro"}, "children": [
                {"uuid": "r1", "elementName": "Row", "children": [
                    {"uuid": "a", "elementName": "Column", "data": {"widthSM": 6}, "children": [
                        {"uuid": "t1", "elementName": "Text", "data": {"content": "<p>hi</p>"}}
                    ]},
                    {"uuid": "b", "elementName": "Column", "data": {"widthSM": 6}}
                ]}
            ]},
            {"uuid": "s2", "elementName": "Section"}
        ]
    }))
    .unwrap()
}

fn sibling_ids(tree: &Tree, parent: &ParentRef) -> Vec<String> {
    tree.children_of(parent)
        .unwrap()
        .iter()
        .map(|n| n.uuid.to_string())
        .collect()
}

#[rstest]
#[case("s1", "Section")]
#[case("r1", "Row")]
#[case("t1", "Text")]
#[case("s2", "Section")]
fn given_uuid_when_finding_node_then_exact_node(page: Tree, #[case] uuid: &str, #[case] tag: &str) {
    let node = page.find_node(&id(uuid)).unwrap();
    assert_eq!(node.uuid, id(uuid));
    assert_eq!(node.element_type().name, tag);
}

#[rstest]
#[case("s1", ParentRef::Root, 0)]
#[case("s2", ParentRef::Root, 1)]
#[case("b", ParentRef::Node(NodeId::new("r1")), 1)]
#[case("t1", ParentRef::Node(NodeId::new("a")), 0)]
fn given_uuid_when_finding_parent_then_parent_and_index(
    page: Tree,
    #[case] uuid: &str,
    #[case] parent: ParentRef,
    #[case] index: usize,
) {
    assert_eq!(page.find_parent(&id(uuid)).unwrap(), (parent, index));
}

#[rstest]
fn given_unknown_uuid_when_finding_then_not_found(page: Tree) {
    assert_eq!(page.find_node(&id("zz")), Err(DomainError::NotFound(id("zz"))));
    assert!(page.find_parent(&id("zz")).is_err());
}

#[rstest]
#[case(0, vec!["new", "a", "b"])]
#[case(1, vec!["a", "new", "b"])]
#[case(2, vec!["a", "b", "new"])]
#[case(99, vec!["a", "b", "new"])]
fn given_index_when_inserting_then_clamped_position(page: Tree, #[case] at: usize, #[case] expected: Vec<&str>) {
    let parent = ParentRef::Node(id("r1"));
    let next = page.insert_child(&parent, element("new", "Column"), at, &AllowAll).unwrap();
    assert_eq!(sibling_ids(&next, &parent), expected);
    // input snapshot untouched
    assert_eq!(sibling_ids(&page, &parent), vec!["a", "b"]);
}

#[rstest]
fn given_default_rules_when_inserting_text_into_row_then_invalid_parent(page: Tree) {
    let policy = Settings::default().policy();
    let result = page.insert_child(&ParentRef::Node(id("r1")), element("x", "Text"), 0, policy.as_ref());
    assert_eq!(
        result,
        Err(DomainError::InvalidParent {
            parent: "Row".into(),
            child: "Text".into()
        })
    );

    let ok = page.insert_child(&ParentRef::Node(id("a")), element("x", "Text"), 0, policy.as_ref());
    assert!(ok.is_ok());
}

#[rstest]
fn given_menu_item_when_inserting_into_page_then_invalid_parent(page: Tree) {
    let link = Node::new(
        id("l"),
        NodeData::from_parts(&ElementType::menu_item("Link"), Default::default()).unwrap(),
    );
    let result = page.insert_child(&ParentRef::Root, link, 0, &AllowAll);
    assert!(matches!(result, Err(DomainError::InvalidParent { .. })));
}

#[rstest]
fn given_existing_uuid_when_inserting_then_duplicate_id(page: Tree) {
    let result = page.insert_child(&ParentRef::Root, element("t1", "Section"), 0, &AllowAll);
    assert_eq!(result, Err(DomainError::DuplicateId(id("t1"))));
}

#[rstest]
fn given_subtree_when_removing_then_all_descendants_gone(page: Tree) {
    let (next, removed) = page.remove_node(&id("r1")).unwrap();
    assert_eq!(removed.uuid, id("r1"));
    for uuid in ["r1", "a", "t1", "b"] {
        assert_eq!(next.find_node(&id(uuid)), Err(DomainError::NotFound(id(uuid))));
    }
    assert!(next.contains(&id("s1")));
    assert_eq!(next.len(), page.len() - 4);
}

#[rstest]
#[case("a", Direction::Up)]
#[case("b", Direction::Down)]
#[case("s1", Direction::Up)]
#[case("t1", Direction::Down)]
fn given_boundary_when_shifting_then_noop(page: Tree, #[case] uuid: &str, #[case] direction: Direction) {
    assert_eq!(page.shift_sibling(&id(uuid), direction).unwrap(), Shifted::NoOp);
}

#[rstest]
fn given_shift_down_then_up_when_applied_then_original_order(page: Tree) {
    let Shifted::Moved(down) = page.shift_sibling(&id("a"), Direction::Down).unwrap() else {
        panic!("expected a move");
    };
    assert_eq!(sibling_ids(&down, &ParentRef::Node(id("r1"))), vec!["b", "a"]);

    let Shifted::Moved(back) = down.shift_sibling(&id("a"), Direction::Up).unwrap() else {
        panic!("expected a move");
    };
    assert_eq!(back, page);
}

#[rstest]
fn given_width_when_setting_field_then_only_that_field_changes(page: Tree) {
    let next = page
        .set_field(&id("b"), NodeField::Width(Breakpoint::Md, Field::Set(Width::Default)))
        .unwrap();

    let before = serde_json::to_value(page.find_node(&id("b")).unwrap()).unwrap();
    let after = serde_json::to_value(next.find_node(&id("b")).unwrap()).unwrap();
    assert_eq!(after["data"], json!({"widthSM": 6, "widthMD": "default"}));
    assert_eq!(before["uuid"], after["uuid"]);
    assert_eq!(
        serde_json::to_value(next.find_node(&id("a")).unwrap()).unwrap(),
        serde_json::to_value(page.find_node(&id("a")).unwrap()).unwrap()
    );
}

#[rstest]
fn given_explicit_null_width_when_round_tripping_then_null_preserved(page: Tree) {
    let next = page
        .set_field(&id("a"), NodeField::Width(Breakpoint::Lg, Field::Null))
        .unwrap();
    let text = serde_json::to_string(&next).unwrap();
    let back: Tree = serde_json::from_str(&text).unwrap();
    assert_eq!(back, next);
    assert_eq!(
        serde_json::to_value(back.find_node(&id("a")).unwrap()).unwrap()["data"],
        json!({"widthSM": 6, "widthLG": null})
    );
}

#[rstest]
fn given_width_on_section_when_setting_field_then_invalid_field(page: Tree) {
    let result = page.set_field(&id("s1"), NodeField::Width(Breakpoint::Sm, Field::Set(Width::Default)));
    assert!(matches!(result, Err(DomainError::InvalidField { .. })));
}

#[rstest]
fn given_disable_when_setting_field_then_flag_serialized(page: Tree) {
    let next = page.set_field(&id("s2"), NodeField::Enabled(false)).unwrap();
    let value = serde_json::to_value(&next).unwrap();
    assert_eq!(value["nodes"][1]["enabled"], json!(false));
    assert!(value["nodes"][0].get("enabled").is_none());
}

#[rstest]
fn given_snapshot_when_round_tripping_then_identical(page: Tree) {
    let text = serde_json::to_string(&page).unwrap();
    let back: Tree = serde_json::from_str(&text).unwrap();
    assert_eq!(back, page);
    assert_eq!(back.version, 4);
}

/// Canonical page document with an explicit `null` in every tri-state position.
fn page_document() -> serde_json::Value {
    json!({
        "aggregate": "page",
        "version": 7,
        "nodes": [
            {"uuid": "s1", "elementName": "Section", "enabled": false,
             "data": {"title": "Intro", "cssClass": null},
             "settings": {"paddings": null, "margins": [
                 {"breakpoint": "md", "top": "0", "right": "auto", "left": null}
             ]},
             "children": [
                {"uuid": "r1", "elementName": "Row", "data": {}, "settings": null, "children": [
                    {"uuid": "a", "elementName": "Column",
                     "data": {"widthXS": "default", "widthSM": 6, "widthLG": null},
                     "settings": {"paddings": [{"breakpoint": "xs", "top": 2, "bottom": null}], "margins": null},
                     "children": []},
                    {"uuid": "w", "elementName": "Widget",
                     "data": {"config": {"nested": [1, null]}, "caption": null},
                     "children": []}
                ]}
             ]}
        ]
    })
}

#[test]
fn given_page_document_with_nulls_when_round_tripping_then_identical_json() {
    let raw = page_document();
    let tree: Tree = serde_json::from_value(raw.clone()).unwrap();
    assert_eq!(serde_json::to_value(&tree).unwrap(), raw);
}

#[test]
fn given_menu_document_with_nulls_when_round_tripping_then_identical_json() {
    let raw = json!({
        "aggregate": "menu",
        "version": 0,
        "nodes": [
            {"uuid": "m1", "itemType": "Link", "data": {"title": "Docs", "url": null, "target": "_blank"},
             "children": [
                {"uuid": "m2", "itemType": "Page", "enabled": false,
                 "data": {"title": "Home", "pageUuid": "p-1", "icon": null}, "children": []}
             ]}
        ]
    });
    let tree: Tree = serde_json::from_value(raw.clone()).unwrap();
    assert_eq!(serde_json::to_value(&tree).unwrap(), raw);
}

#[test]
fn given_null_settings_list_when_removed_then_node_fields_differ() {
    let tree: Tree = serde_json::from_value(page_document()).unwrap();
    let before = cmstree::domain::node_fields(tree.find_node(&id("s1")).unwrap());

    let next = tree.set_field(&id("s1"), NodeField::Paddings(Field::Absent)).unwrap();
    let after = cmstree::domain::node_fields(next.find_node(&id("s1")).unwrap());

    let changed = cmstree::domain::diff(&before, &after);
    assert_eq!(changed.keys().collect::<Vec<_>>(), vec!["settings"]);
    assert_eq!(
        changed["settings"],
        json!({"margins": [{"breakpoint": "md", "top": "0", "right": "auto", "left": null}]})
    );
}

/// `enabled: true`, `data` and `children` are written in their normalized form.
#[test]
fn given_default_node_keys_when_round_tripping_then_normalized() {
    let tree: Tree = serde_json::from_value(json!({
        "aggregate": "menu",
        "nodes": [{"uuid": "m1", "itemType": "Link", "enabled": true}]
    }))
    .unwrap();

    assert_eq!(
        serde_json::to_value(&tree).unwrap(),
        json!({
            "aggregate": "menu",
            "version": 0,
            "nodes": [{"uuid": "m1", "itemType": "Link", "data": {}, "children": []}]
        })
    );
}
