//! Construction of rendered emote and suggestion markup.

use chat_dom::{DomTree, NodeId};
use seventv_client::{EmoteRecord, EmoteRef};

use crate::config::RenderStyle;

/// Build the replacement node for a resolved emote.
pub fn create_emote_node(tree: &mut DomTree, emote: &EmoteRef, style: RenderStyle) -> NodeId {
    match style {
        RenderStyle::Image => create_emote_image(tree, emote),
        RenderStyle::Span => create_emote_span(tree, emote),
    }
}

fn create_emote_image(tree: &mut DomTree, emote: &EmoteRef) -> NodeId {
    let img = tree.create_element("img");
    tree.set_attr(img, "src", &emote.image_url);
    tree.set_attr(img, "title", &emote.name);
    img
}

fn create_emote_span(tree: &mut DomTree, emote: &EmoteRef) -> NodeId {
    let span = tree.create_element("span");
    for class in ["rcx-message__emoji", "emoji", "rcx-message__emoji--big"] {
        tree.add_class(span, class);
    }
    tree.set_attr(
        span,
        "style",
        format!("background-image: url(\"{}\")", emote.image_url),
    );
    tree.set_attr(span, "title", &emote.name);
    let label = tree.create_text(format!(":{}:", emote.name));
    let _ = tree.append_child(span, label);
    span
}

/// Build a replacement suggestion-list body from deduplicated directory
/// records. Records without a usable image are dropped.
pub fn create_suggestion_list(tree: &mut DomTree, records: &[EmoteRecord]) -> NodeId {
    let list = tree.create_element("div");
    tree.add_class(list, "rcx-box");
    tree.add_class(list, "rcx-box--full");
    for record in records {
        if let Some(item) = create_suggestion_item(tree, record) {
            if let Err(e) = tree.append_child(list, item) {
                tracing::warn!(error = %e, "Failed to append suggestion item");
            }
        }
    }
    list
}

fn create_suggestion_item(tree: &mut DomTree, record: &EmoteRecord) -> Option<NodeId> {
    let image_url = record.display_url()?;

    let li = tree.create_element("li");
    tree.add_class(li, "rcx-option");
    tree.set_attr(li, "id", format!("popup-item-:{}:", record.name));
    tree.set_attr(li, "data-name", &record.name);

    let wrapper = tree.create_element("div");
    tree.add_class(wrapper, "rcx-option__wrapper");

    let column = tree.create_element("div");
    tree.add_class(column, "rcx-option__column");

    let img = tree.create_element("img");
    tree.set_attr(img, "src", image_url);
    tree.set_attr(img, "style", "width: 24px; height: 24px");
    tree.add_class(img, "rcx-css-0");

    let content = tree.create_element("div");
    tree.add_class(content, "rcx-option__content");
    let label = tree.create_text(format!(":{}:", record.name));

    let links = [
        (column, img),
        (wrapper, column),
        (li, wrapper),
        (content, label),
        (li, content),
    ];
    for (parent, child) in links {
        if let Err(e) = tree.append_child(parent, child) {
            tracing::warn!(error = %e, "Failed to assemble suggestion item");
            return None;
        }
    }
    Some(li)
}

/// Read back the emote name a suggestion item was built for.
pub fn suggestion_name(tree: &DomTree, item: NodeId) -> Option<&str> {
    tree.attr(item, "data-name")
}
