use crate::models::ChapterNode;

/// Appends `node` and its subtree as nested `<section>` elements.
///
/// Names and bodies are written verbatim, without XML escaping.
pub fn render_section(node: &ChapterNode, out: &mut String) {
    out.push_str("<section>\n");
    out.push_str("<title><p>");
    out.push_str(&node.name);
    out.push_str("</p></title>\n");

    if let Some(content) = &node.content {
        out.push_str(content);
        out.push('\n');
    }

    for child in &node.children {
        render_section(child, out);
    }

    out.push_str("</section>\n");
}
