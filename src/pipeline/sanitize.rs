//! Sanitize stage: strip script elements from converted markup.
//!
//! The conversion engine's output is treated as untrusted — a crafted
//! document could smuggle markup through the converter. The pass runs
//! unconditionally on every result, even when the converter is trusted, and
//! removes every `<script>` element at any nesting depth along with its
//! entire subtree. Non-script content, including elements adjacent to or
//! surrounding a removed script, is preserved untouched.

use crate::pipeline::dom::{Fragment, Node};
use tracing::debug;

/// Remove all `<script>` elements from the fragment. Returns how many were
/// removed.
pub fn strip_scripts(fragment: &mut Fragment) -> usize {
    let mut removed = 0;
    retain_non_scripts(&mut fragment.nodes, &mut removed);
    if removed > 0 {
        debug!("Stripped {} script element(s) from converted markup", removed);
    }
    removed
}

fn retain_non_scripts(nodes: &mut Vec<Node>, removed: &mut usize) {
    nodes.retain(|n| {
        if n.is_element("script") {
            *removed += 1;
            false
        } else {
            true
        }
    });
    for node in nodes.iter_mut() {
        retain_non_scripts(&mut node.children, removed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_top_level_script() {
        let mut frag = Fragment::parse("<p>before</p><script>alert(1)</script><p>after</p>");
        let removed = strip_scripts(&mut frag);
        assert_eq!(removed, 1);
        assert_eq!(frag.to_html(), "<p>before</p><p>after</p>");
    }

    #[test]
    fn removes_nested_scripts() {
        let mut frag =
            Fragment::parse("<div><p>keep</p><div><script>x()</script></div></div>");
        let removed = strip_scripts(&mut frag);
        assert_eq!(removed, 1);
        assert!(!frag.to_html().contains("script"));
        assert!(frag.to_html().contains("<p>keep</p>"));
    }

    #[test]
    fn script_subtree_removed_entirely() {
        let mut frag = Fragment::parse("<script><span>payload</span></script><p>ok</p>");
        strip_scripts(&mut frag);
        let html = frag.to_html();
        assert!(!html.contains("payload"));
        assert!(html.contains("<p>ok</p>"));
    }

    #[test]
    fn clean_fragment_untouched() {
        let mut frag = Fragment::parse("<h1>Title</h1><p>Body</p>");
        assert_eq!(strip_scripts(&mut frag), 0);
        assert_eq!(frag.to_html(), "<h1>Title</h1><p>Body</p>");
    }
}
