//! HTML rendering for rich documents.
//!
//! The renderer walks the node tree once and appends straight into an output
//! buffer. Every failure mode degrades to rendering nothing for the node in
//! question: unknown node types, non-image assets, and unresolved asset
//! links all vanish while their siblings render normally.

use std::borrow::Cow;

use crate::models::{AssetNode, Block, ImageAsset, LinkNode, Mark, Node, RichDocument, TextNode};

/// Renders a document to an HTML fragment.
pub fn render_html(doc: &RichDocument) -> String {
    let mut out = String::with_capacity(256);
    render_nodes(&doc.content, &mut out);
    out
}

fn render_nodes(nodes: &[Node], out: &mut String) {
    for node in nodes {
        render_node(node, out);
    }
}

fn render_node(node: &Node, out: &mut String) {
    match node {
        Node::Paragraph(block) => wrap_block(out, "p", block),
        Node::Heading1(block) => wrap_block(out, "h1", block),
        Node::Heading2(block) => wrap_block(out, "h2", block),
        Node::Heading3(block) => wrap_block(out, "h3", block),
        Node::Heading4(block) => wrap_block(out, "h4", block),
        Node::Heading5(block) => wrap_block(out, "h5", block),
        Node::Heading6(block) => wrap_block(out, "h6", block),
        Node::UnorderedList(block) => wrap_block(out, "ul", block),
        Node::OrderedList(block) => wrap_block(out, "ol", block),
        Node::ListItem(block) => wrap_block(out, "li", block),
        Node::Blockquote(block) => wrap_block(out, "blockquote", block),
        Node::Hr => out.push_str("<hr>"),
        Node::Text(text) => render_text(text, out),
        Node::Hyperlink(link) => render_link(link, out),
        Node::EmbeddedAsset(asset) => render_asset(asset, out),
        Node::Unknown => {}
    }
}

fn wrap_block(out: &mut String, tag: &str, block: &Block) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    render_nodes(&block.content, out);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn mark_tag(mark: Mark) -> Option<&'static str> {
    match mark {
        Mark::Bold => Some("strong"),
        Mark::Italic => Some("em"),
        Mark::Underline => Some("u"),
        Mark::Code => Some("code"),
        Mark::Other => None,
    }
}

/// Marks wrap the escaped text in their listed order; closing tags mirror
/// in reverse so the nesting is always well-formed.
fn render_text(text: &TextNode, out: &mut String) {
    let tags: Vec<&str> = text.marks.iter().filter_map(|mark| mark_tag(*mark)).collect();
    for tag in &tags {
        out.push('<');
        out.push_str(tag);
        out.push('>');
    }
    out.push_str(&escape_html(&text.value));
    for tag in tags.iter().rev() {
        out.push_str("</");
        out.push_str(tag);
        out.push('>');
    }
}

fn render_link(link: &LinkNode, out: &mut String) {
    let uri = link.data.uri.as_str();
    out.push_str("<a href=\"");
    out.push_str(&escape_html(uri));
    out.push('"');
    if is_external(uri) {
        out.push_str(" target=\"_blank\" rel=\"noopener noreferrer\"");
    }
    out.push('>');
    render_nodes(&link.content, out);
    out.push_str("</a>");
}

/// Site-relative URIs start with `/`; everything else opens in a new tab.
fn is_external(uri: &str) -> bool {
    !uri.starts_with('/')
}

fn render_asset(node: &AssetNode, out: &mut String) {
    let asset = match &node.data.target {
        Some(asset) => asset,
        None => return,
    };
    if !asset.is_image() {
        return;
    }
    render_figure(asset, out);
}

fn render_figure(asset: &ImageAsset, out: &mut String) {
    out.push_str("<figure><img src=\"");
    out.push_str(&escape_html(&asset.https_url()));
    out.push_str("\" alt=\"");
    out.push_str(&escape_html(asset.alt_text()));
    out.push('"');
    if let Some(dimensions) = asset.dimensions {
        out.push_str(&format!(
            " width=\"{}\" height=\"{}\"",
            dimensions.width, dimensions.height
        ));
    }
    out.push_str(" loading=\"lazy\">");
    if let Some(description) = &asset.description {
        if !description.is_empty() {
            out.push_str("<figcaption>");
            out.push_str(&escape_html(description));
            out.push_str("</figcaption>");
        }
    }
    out.push_str("</figure>");
}

/// Text of the first paragraph that has any non-whitespace direct text
/// child. Runs are joined with single spaces; text nested inside links or
/// other inline nodes is not collected.
pub fn first_paragraph_text(doc: &RichDocument) -> Option<String> {
    for node in &doc.content {
        if let Node::Paragraph(block) = node {
            let runs: Vec<&str> = block
                .content
                .iter()
                .filter_map(|child| match child {
                    Node::Text(text) => Some(text.value.as_str()),
                    _ => None,
                })
                .collect();
            if runs.iter().any(|run| !run.trim().is_empty()) {
                return Some(runs.join(" ").trim().to_string());
            }
        }
    }
    None
}

/// Flattens a document to plain text for terminal display.
pub fn plain_text(doc: &RichDocument) -> String {
    let mut out = String::new();
    collect_text(&doc.content, &mut out);
    out.trim_end().to_string()
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(&text.value),
            Node::Hyperlink(link) => collect_text(&link.content, out),
            Node::Paragraph(block)
            | Node::Heading1(block)
            | Node::Heading2(block)
            | Node::Heading3(block)
            | Node::Heading4(block)
            | Node::Heading5(block)
            | Node::Heading6(block)
            | Node::Blockquote(block) => {
                collect_text(&block.content, out);
                out.push_str("\n\n");
            }
            Node::UnorderedList(block) | Node::OrderedList(block) => {
                collect_text(&block.content, out);
                out.push('\n');
            }
            Node::ListItem(block) => {
                out.push_str("- ");
                collect_text(&block.content, out);
                out.push('\n');
            }
            Node::Hr => out.push('\n'),
            Node::EmbeddedAsset(_) | Node::Unknown => {}
        }
    }
}

/// Escapes text for HTML element and attribute positions.
pub fn escape_html(input: &str) -> Cow<'_, str> {
    if !input.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(input);
    }
    let mut escaped = String::with_capacity(input.len() + 8);
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    Cow::Owned(escaped)
}
