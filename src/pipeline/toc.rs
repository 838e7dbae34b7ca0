//! TOC stage: assign heading anchors and derive the table of contents.
//!
//! Only the two top heading levels (`h1`, `h2`) participate; finer levels are
//! intentionally ignored to keep the navigation shallow. Anchor identifiers
//! are slugs derived from the heading text, disambiguated per render with a
//! `-N` suffix on repeats. A heading that already carries an `id` keeps it —
//! the derived slug is only assigned when the element has none, and the TOC
//! link always targets whatever identifier the element ends up with.
//!
//! The builder is pure with respect to prior runs: each call produces a
//! complete entry list from scratch, so re-rendering replaces rather than
//! appends.

use crate::pipeline::dom::Fragment;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Maximum slug length, in characters.
const MAX_SLUG_LEN: usize = 60;

/// One table-of-contents entry, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Trimmed heading text.
    pub text: String,
    /// The heading element's effective identifier.
    pub id: String,
    /// Heading level: 1 or 2.
    pub level: u8,
}

impl TocEntry {
    /// In-page link target for this entry.
    pub fn href(&self) -> String {
        format!("#{}", self.id)
    }
}

static RE_DISALLOWED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9\s-]").unwrap());
static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static RE_HYPHEN_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").unwrap());

/// Derive an anchor slug from heading text.
///
/// Lower-case, strip everything outside `[a-z0-9 \s -]`, turn whitespace runs
/// into single hyphens, collapse hyphen runs, trim hyphens at the ends, cap
/// the length, and fall back to `"section"` when nothing survives.
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let trimmed = lowered.trim();
    let stripped = RE_DISALLOWED.replace_all(trimmed, "");
    let hyphenated = RE_WHITESPACE.replace_all(&stripped, "-");
    let collapsed = RE_HYPHEN_RUNS.replace_all(&hyphenated, "-");
    let mut slug = collapsed.trim_matches('-').to_string();
    slug.truncate(MAX_SLUG_LEN);
    if slug.is_empty() {
        "section".to_string()
    } else {
        slug
    }
}

/// Walk the fragment, assign anchors to `h1`/`h2` headings, and return the
/// TOC entries in document order.
///
/// Headings whose text is empty after trimming are skipped entirely. A
/// pre-existing `id` is never overwritten, but the derived slug still counts
/// toward disambiguation so later duplicates stay stable.
pub fn build_toc(fragment: &mut Fragment) -> Vec<TocEntry> {
    let mut entries = Vec::new();
    let mut used: HashMap<String, usize> = HashMap::new();

    fragment.walk_elements_mut(|node| {
        let level = match node.name() {
            Some("h1") => 1,
            Some("h2") => 2,
            _ => return,
        };

        let text = node.text_content().trim().to_string();
        if text.is_empty() {
            return;
        }

        let base = slugify(&text);
        let count = *used.get(&base).unwrap_or(&0);
        used.insert(base.clone(), count + 1);
        let derived = if count > 0 {
            format!("{base}-{}", count + 1)
        } else {
            base
        };

        if node.attr("id").is_none() {
            node.set_attr("id", &derived);
        }
        // The link must resolve to the element, so target its actual id.
        let effective = node
            .attr("id")
            .map(str::to_string)
            .unwrap_or(derived);

        entries.push(TocEntry {
            text,
            id: effective,
            level,
        });
    });

    entries
}

/// Render TOC entries as an HTML fragment for the navigation surface.
///
/// An empty entry list renders an explicit placeholder rather than nothing.
pub fn render_toc_html(entries: &[TocEntry]) -> String {
    if entries.is_empty() {
        return r#"<span class="toc-empty">No headings detected in the document.</span>"#
            .to_string();
    }

    let mut html = String::new();
    for entry in entries {
        html.push_str(&format!(
            r#"<a class="toc-link toc-link--h{}" href="{}">{}</a>"#,
            entry.level,
            entry.href(),
            escape_text(&entry.text)
        ));
    }
    html
}

/// Placeholder written to the TOC surface when the render fails outright.
pub fn toc_unavailable_html() -> String {
    r#"<span class="toc-empty">TOC unavailable.</span>"#.to_string()
}

fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::dom::Fragment;

    #[test]
    fn slugify_basic() {
        assert_eq!(slugify("Introduction"), "introduction");
        assert_eq!(slugify("  Our Research Group  "), "our-research-group");
    }

    #[test]
    fn slugify_strips_punctuation() {
        assert_eq!(slugify("R&D: Results (2024)!!"), "rd-results-2024");
    }

    #[test]
    fn slugify_collapses_hyphen_runs() {
        assert_eq!(slugify("state -- of -- the art"), "state-of-the-art");
        assert_eq!(slugify("--edge--"), "edge");
    }

    #[test]
    fn slugify_empty_falls_back_to_section() {
        assert_eq!(slugify("???"), "section");
        assert_eq!(slugify("   "), "section");
        assert_eq!(slugify("§§§"), "section");
    }

    #[test]
    fn slugify_truncates_long_text() {
        let long = "a".repeat(100);
        assert_eq!(slugify(&long).len(), 60);
    }

    #[test]
    fn build_toc_collects_h1_and_h2_only() {
        let mut frag =
            Fragment::parse("<h1>One</h1><h2>Two</h2><h3>Three</h3><p>body</p><h2>Four</h2>");
        let entries = build_toc(&mut frag);
        let texts: Vec<&str> = entries.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["One", "Two", "Four"]);
        assert_eq!(entries[0].level, 1);
        assert_eq!(entries[1].level, 2);
    }

    #[test]
    fn build_toc_assigns_ids_to_headings() {
        let mut frag = Fragment::parse("<h1>Research Areas</h1>");
        build_toc(&mut frag);
        assert_eq!(frag.nodes[0].attr("id"), Some("research-areas"));
    }

    #[test]
    fn duplicate_headings_get_numeric_suffixes() {
        let mut frag = Fragment::parse(
            "<h2>Introduction</h2><h2>Methods</h2><h2>Introduction</h2><h2>Introduction</h2>",
        );
        let entries = build_toc(&mut frag);
        let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["introduction", "methods", "introduction-2", "introduction-3"]
        );
    }

    #[test]
    fn pre_existing_id_wins() {
        let mut frag = Fragment::parse(r#"<h1 id="custom">Overview</h1>"#);
        let entries = build_toc(&mut frag);
        assert_eq!(frag.nodes[0].attr("id"), Some("custom"));
        assert_eq!(entries[0].id, "custom");
        assert_eq!(entries[0].href(), "#custom");
    }

    #[test]
    fn empty_heading_text_skipped() {
        let mut frag = Fragment::parse("<h1>   </h1><h2>Real</h2>");
        let entries = build_toc(&mut frag);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].text, "Real");
    }

    #[test]
    fn build_toc_is_idempotent() {
        let mut frag = Fragment::parse("<h1>Alpha</h1><h2>Alpha</h2>");
        let first = build_toc(&mut frag);
        let second = build_toc(&mut frag);
        assert_eq!(first, second);
        // ids stay stable because pre-existing ids are kept and still counted
        assert_eq!(second[0].id, "alpha");
        assert_eq!(second[1].id, "alpha-2");
    }

    #[test]
    fn render_toc_empty_placeholder() {
        let html = render_toc_html(&[]);
        assert!(html.contains("No headings detected"));
    }

    #[test]
    fn render_toc_links_in_order() {
        let entries = vec![
            TocEntry {
                text: "One".into(),
                id: "one".into(),
                level: 1,
            },
            TocEntry {
                text: "A & B".into(),
                id: "a-b".into(),
                level: 2,
            },
        ];
        let html = render_toc_html(&entries);
        assert!(html.contains(r##"href="#one""##));
        assert!(html.contains("A &amp; B"));
        let one_pos = html.find("#one").unwrap();
        let ab_pos = html.find("#a-b").unwrap();
        assert!(one_pos < ab_pos);
    }
}
