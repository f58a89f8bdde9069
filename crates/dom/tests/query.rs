use dom::{Document, Id};

fn watch_page() -> (Document, Id, Id) {
    let mut doc = Document::new();
    let body = doc.body();
    let metadata = doc.append_element(body, "ytd-watch-metadata", &[("class", "style-scope")]);
    let h1 = doc.append_element(metadata, "h1", &[("class", "style-scope ytd-watch-metadata")]);
    let title = doc.append_element(h1, "yt-formatted-string", &[("class", "style-scope")]);
    doc.append_text(title, "Titre traduit");

    let expander = doc.append_element(metadata, "ytd-text-inline-expander", &[]);
    let inner = doc.append_element(expander, "div", &[("id", "description-inline-expander")]);
    let desc = doc.append_element(inner, "yt-attributed-string", &[]);
    doc.append_text(desc, "Description traduite");
    (doc, title, desc)
}

#[test]
fn descendant_selectors_find_nested_title() {
    let (doc, title, _) = watch_page();
    let found = doc
        .query_selector_all("h1.ytd-watch-metadata yt-formatted-string")
        .unwrap();
    assert_eq!(found, vec![title]);
}

#[test]
fn selector_lists_union_in_document_order() {
    let (doc, title, desc) = watch_page();
    let found = doc
        .query_selector_all("#description-inline-expander yt-attributed-string, h1 yt-formatted-string")
        .unwrap();
    assert_eq!(found, vec![title, desc]);
}

#[test]
fn child_combinator_requires_direct_parent() {
    let (doc, title, _) = watch_page();
    assert!(doc.query_selector_all("ytd-watch-metadata > yt-formatted-string").unwrap().is_empty());
    assert_eq!(doc.query_selector_all("h1 > yt-formatted-string").unwrap(), vec![title]);
}

#[test]
fn scoped_queries_stay_inside_scope() {
    let (mut doc, _, _) = watch_page();
    let menu = doc.append_element(doc.body(), "div", &[("class", "ytp-settings-menu")]);
    let item = doc.append_element(menu, "div", &[("class", "ytp-menuitem"), ("aria-checked", "true")]);
    let label = doc.append_element(item, "div", &[("class", "ytp-menuitem-label")]);
    doc.append_text(label, "Piste audio");

    assert_eq!(doc.query_selector_all_within(item, ".ytp-menuitem-label").unwrap(), vec![label]);
    assert_eq!(doc.query_selector_all_within(label, ".ytp-menuitem").unwrap(), Vec::<Id>::new());
    assert_eq!(
        doc.query_selector_all(r#".ytp-menuitem[aria-checked="true"]"#).unwrap(),
        vec![item]
    );
    assert_eq!(doc.text_content(menu), "Piste audio");
}

#[test]
fn meta_tags_are_selectable_by_attribute() {
    let mut doc = Document::new();
    let head = doc.head();
    let name = doc.append_element(head, "meta", &[("itemprop", "name"), ("content", "Original")]);
    doc.append_element(head, "meta", &[("itemprop", "description"), ("content", "Desc")]);

    let found = doc.query_selector_all(r#"meta[itemprop="name"]"#).unwrap();
    assert_eq!(found, vec![name]);
    assert_eq!(doc.attribute(name, "content"), Some("Original"));
}
