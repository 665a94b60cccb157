use super::*;

use crate::dom::contract;

const PAGE: &str = r##"{
    "scroll_y": 40,
    "viewport_height": 600,
    "body": [
        {
            "tag": "header",
            "classes": ["header"],
            "height": 80,
            "children": [
                { "tag": "button", "id": "nav-toggle" },
                { "tag": "nav", "id": "nav-menu", "children": [
                    { "tag": "a", "classes": ["nav-link"], "attributes": { "href": "#features" }, "text": "Features" }
                ]}
            ]
        },
        { "tag": "section", "id": "features", "offset_top": 900 },
        { "tag": "img", "classes": ["lazy"], "data": { "src": "/img/a.png" }, "offset_top": 1200 }
    ]
}"##;

#[test]
fn builds_tree_with_layout_and_attributes() {
    let doc = PageFixture::from_json(PAGE).expect("fixture").build().expect("document");

    assert_eq!(doc.scroll_y(), 40);
    assert_eq!(doc.viewport_height(), 600);

    let header = doc.elements_by_class(contract::HEADER_CLASS)[0];
    assert_eq!(doc.rendered_height(header), 80);

    let toggle = doc.get_element_by_id(contract::NAV_TOGGLE_ID).expect("toggle");
    assert!(doc.contains(header, toggle));

    let section = doc.get_element_by_id("features").expect("section");
    assert_eq!(doc.offset_top(section), Some(900));

    let img = doc.elements_by_tag("img")[0];
    assert_eq!(doc.data(img, contract::DEFERRED_SRC_DATA), Some("/img/a.png"));
    assert!(doc.has_class(img, contract::LAZY_CLASS));
}

#[test]
fn viewport_defaults_when_omitted() {
    let doc = PageFixture::from_json(r#"{ "body": [] }"#)
        .expect("fixture")
        .build()
        .expect("document");
    assert_eq!(doc.viewport_height(), DEFAULT_VIEWPORT_HEIGHT);
}

#[test]
fn rejects_duplicate_ids() {
    let fixture = PageFixture::from_json(
        r#"{ "body": [ { "tag": "div", "id": "x" }, { "tag": "p", "id": "x" } ] }"#,
    )
    .expect("fixture");
    assert!(matches!(fixture.build(), Err(FixtureError::DuplicateId(id)) if id == "x"));
}

#[test]
fn rejects_blank_tags_and_bad_json() {
    let fixture = PageFixture::from_json(r#"{ "body": [ { "tag": " " } ] }"#).expect("fixture");
    assert!(matches!(fixture.build(), Err(FixtureError::MissingTag)));
    assert!(matches!(
        PageFixture::from_json("{ not json"),
        Err(FixtureError::Json(_))
    ));
}
