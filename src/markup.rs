// minimal semantic markup for a rendered selection tree
use std::borrow::Cow;
use std::fmt::Write;

use crate::config::defaults::TaxonomyConfig;
use crate::core::render::RenderNode;

pub const DESCRIPTION_LIMIT: usize = 40;
const ELLIPSIS: char = '…';

/// Shorten a description for display: at most `DESCRIPTION_LIMIT`
/// characters, followed by an ellipsis when something was cut.
pub fn short_description(description: &str) -> Cow<'_, str> {
    match description.char_indices().nth(DESCRIPTION_LIMIT) {
        Some((cut, _)) => {
            let mut short = description[..cut].to_string();
            short.push(ELLIPSIS);
            Cow::Owned(short)
        }
        None => Cow::Borrowed(description),
    }
}

pub fn escape(raw: &str) -> Cow<'_, str> {
    if !raw.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(raw);
    }
    let mut out = String::with_capacity(raw.len() + 8);
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}

/// Checklist markup: nested lists, branches in `<details>` (`open` when
/// expanded) with their own checkbox in `<summary>`. An empty tree renders
/// the taxonomy's `not_found` label.
///
/// Like [`render`](crate::core::render::render), this recurses once per
/// tree level, so stack use grows with the depth of the hierarchy.
pub fn render_checklist(config: &TaxonomyConfig, tree: &[RenderNode]) -> String {
    if tree.is_empty() {
        return format!("<p>{}</p>", escape(&config.labels.not_found));
    }
    let mut out = String::new();
    out.push_str("<ul class=\"nested-term-select\">");
    for node in tree {
        write_node(&mut out, &config.slug, node);
    }
    out.push_str("</ul>");
    out
}

//one frame per level of the rendered tree
fn write_node(out: &mut String, taxonomy: &str, r: &RenderNode) {
    out.push_str("<li>");
    if r.is_leaf() {
        write_label(out, taxonomy, r);
    } else {
        out.push_str(if r.expanded { "<details open><summary>" } else { "<details><summary>" });
        write_label(out, taxonomy, r);
        out.push_str("</summary><ul>");
        for child in &r.children {
            write_node(out, taxonomy, child);
        }
        out.push_str("</ul></details>");
    }
    out.push_str("</li>");
}

fn write_label(out: &mut String, taxonomy: &str, r: &RenderNode) {
    let taxonomy = escape(taxonomy);
    let id = r.node.id;
    //fmt::Write into a String never errors, so the write! results below are discarded
    let _ = write!(
        out,
        "<label class=\"selectit\" id=\"{taxonomy}-{id}\" for=\"in-{taxonomy}-{id}\">\
         <input type=\"checkbox\" name=\"tax_input[{taxonomy}][]\" id=\"in-{taxonomy}-{id}\" value=\"{}\"",
        escape(&r.node.slug),
    );
    for (on, attr) in [(r.checked, " checked"), (r.disabled, " disabled"), (r.readonly, " readonly")] {
        if on {
            out.push_str(attr);
        }
    }
    let _ = write!(out, " /><b>{}</b>", escape(&r.node.label));
    if !r.node.description.is_empty() {
        let _ = write!(
            out,
            " - <span title=\"{}\">{}</span>",
            escape(&r.node.description),
            escape(&short_description(&r.node.description)),
        );
    }
    out.push_str("</label>");
}
