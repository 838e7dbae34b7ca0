//! # docx-engine
//!
//! Minimal DOCX-to-HTML conversion: read `word/document.xml` out of the OOXML
//! zip container and translate its block structure into an HTML fragment.
//!
//! ## Scope
//!
//! The engine covers the constructs a prose document actually uses —
//! headings, paragraphs, bold/italic runs, bullet and numbered lists, and
//! tables. Anything it does not understand is *skipped, never dropped
//! silently*: each skipped construct produces an [`EngineMessage`] so callers
//! can surface "loaded with N warning(s)" style feedback.
//!
//! ## Mapping
//!
//! | DOCX | HTML |
//! |------|------|
//! | `Title` / `Heading1` style | `<h1>` |
//! | `Heading2` style | `<h2>` |
//! | `Heading3`–`Heading6` styles | `<h3>`–`<h6>` |
//! | plain paragraph | `<p>` |
//! | `w:b` / `w:i` run properties | `<strong>` / `<em>` |
//! | `ListBullet*` / `ListNumber*` styles | `<ul>` / `<ol>` |
//! | `w:tbl` | `<table>` |
//!
//! All text content is HTML-escaped; the output contains no attributes and no
//! script-capable elements by construction.

use std::collections::HashSet;
use std::io::{Cursor, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;
use zip::ZipArchive;

/// Errors returned by the conversion engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The payload does not start with the zip local-file-header magic.
    #[error("Input is not a DOCX container\nFirst bytes: {magic:?}")]
    NotADocx { magic: [u8; 4] },

    /// The zip container could not be opened or read.
    #[error("Failed to read DOCX container: {0}")]
    Container(String),

    /// The container has no `word/document.xml` part.
    #[error("DOCX container has no word/document.xml part")]
    MissingDocumentPart,

    /// `word/document.xml` is not well-formed XML.
    #[error("Failed to parse word/document.xml: {0}")]
    MalformedDocument(String),
}

/// Severity of an [`EngineMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Warning,
    Info,
}

/// A diagnostic emitted while converting — typically "something was skipped".
#[derive(Debug, Clone)]
pub struct EngineMessage {
    pub kind: MessageKind,
    pub text: String,
}

impl EngineMessage {
    fn warning(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Warning,
            text: text.into(),
        }
    }
}

/// The converted document: an HTML fragment plus conversion diagnostics.
#[derive(Debug, Clone)]
pub struct EngineOutput {
    /// HTML fragment (no surrounding `<html>`/`<body>`).
    pub html: String,
    /// Diagnostics accumulated during conversion, in occurrence order.
    pub messages: Vec<EngineMessage>,
}

/// Convert DOCX bytes into an HTML fragment.
///
/// # Errors
/// Fails when the payload is not a zip container, the container has no
/// `word/document.xml` part, or that part is not well-formed XML. Unsupported
/// *content* never fails — it is skipped with a warning message instead.
pub fn convert(bytes: &[u8]) -> Result<EngineOutput, EngineError> {
    if bytes.len() < 4 || &bytes[..4] != b"PK\x03\x04" {
        let mut magic = [0u8; 4];
        let n = bytes.len().min(4);
        magic[..n].copy_from_slice(&bytes[..n]);
        return Err(EngineError::NotADocx { magic });
    }

    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| EngineError::Container(e.to_string()))?;

    let xml = {
        let mut entry = archive
            .by_name("word/document.xml")
            .map_err(|_| EngineError::MissingDocumentPart)?;
        let mut buf = String::new();
        entry
            .read_to_string(&mut buf)
            .map_err(|e| EngineError::Container(e.to_string()))?;
        buf
    };

    convert_document_xml(&xml)
}

// ── Inline segments ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct RunProps {
    bold: bool,
    italic: bool,
}

#[derive(Debug, Clone)]
enum Segment {
    Text { text: String, props: RunProps },
    Break,
}

fn render_inline(segments: &[Segment]) -> String {
    let mut html = String::new();
    for seg in segments {
        match seg {
            Segment::Break => html.push_str("<br>"),
            Segment::Text { text, props } => {
                let escaped = escape_html(text);
                match (props.bold, props.italic) {
                    (true, true) => {
                        html.push_str("<strong><em>");
                        html.push_str(&escaped);
                        html.push_str("</em></strong>");
                    }
                    (true, false) => {
                        html.push_str("<strong>");
                        html.push_str(&escaped);
                        html.push_str("</strong>");
                    }
                    (false, true) => {
                        html.push_str("<em>");
                        html.push_str(&escaped);
                        html.push_str("</em>");
                    }
                    (false, false) => html.push_str(&escaped),
                }
            }
        }
    }
    html
}

fn segments_text(segments: &[Segment]) -> String {
    segments
        .iter()
        .filter_map(|s| match s {
            Segment::Text { text, .. } => Some(text.as_str()),
            Segment::Break => None,
        })
        .collect()
}

// ── Block assembly ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Bullet,
    Numbered,
}

#[derive(Default)]
struct BlockWriter {
    blocks: Vec<String>,
    list_kind: Option<ListKind>,
    list_items: Vec<String>,
}

impl BlockWriter {
    fn flush_list(&mut self) {
        if self.list_items.is_empty() {
            self.list_kind = None;
            return;
        }
        let tag = match self.list_kind {
            Some(ListKind::Numbered) => "ol",
            _ => "ul",
        };
        let mut html = format!("<{tag}>");
        for item in self.list_items.drain(..) {
            html.push_str("<li>");
            html.push_str(&item);
            html.push_str("</li>");
        }
        html.push_str(&format!("</{tag}>"));
        self.blocks.push(html);
        self.list_kind = None;
    }

    fn push_block(&mut self, html: String) {
        self.flush_list();
        self.blocks.push(html);
    }

    fn push_list_item(&mut self, kind: ListKind, inline: String) {
        if self.list_kind != Some(kind) {
            self.flush_list();
            self.list_kind = Some(kind);
        }
        self.list_items.push(inline);
    }

    fn finish(mut self) -> String {
        self.flush_list();
        self.blocks.join("\n")
    }
}

// ── Style classification ─────────────────────────────────────────────────────

fn heading_level(style: &str) -> Option<u8> {
    let lowered = style.trim().to_ascii_lowercase();
    if lowered == "title" {
        return Some(1);
    }
    let digits = lowered.strip_prefix("heading")?;
    let level: u8 = digits.trim_start_matches(|c: char| !c.is_ascii_digit())
        .parse()
        .ok()?;
    if (1..=6).contains(&level) {
        Some(level)
    } else {
        None
    }
}

fn list_kind(style: &str) -> Option<ListKind> {
    let lowered = style.trim().to_ascii_lowercase();
    if lowered.starts_with("listbullet") {
        Some(ListKind::Bullet)
    } else if lowered.starts_with("listnumber") {
        Some(ListKind::Numbered)
    } else {
        None
    }
}

/// Styles that are neither headings nor lists but need no warning.
fn is_known_plain_style(style: &str) -> bool {
    matches!(
        style.trim().to_ascii_lowercase().as_str(),
        "normal" | "bodytext" | "subtitle" | "quote" | "caption" | "listparagraph"
    )
}

// ── XML helpers ──────────────────────────────────────────────────────────────

fn local_name(qname: &[u8]) -> &[u8] {
    match qname.iter().position(|&b| b == b':') {
        Some(i) => &qname[i + 1..],
        None => qname,
    }
}

fn attr_val(e: &BytesStart<'_>) -> Option<String> {
    for attr in e.attributes().flatten() {
        if local_name(attr.key.as_ref()) == b"val" {
            return attr
                .unescape_value()
                .ok()
                .map(|v| v.into_owned());
        }
    }
    None
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

// ── Document walk ────────────────────────────────────────────────────────────

/// Translate the `word/document.xml` event stream into HTML blocks.
///
/// One forward pass. Paragraph content is collected as [`Segment`]s with the
/// run properties active at the time; block type is decided at `</w:p>` from
/// the paragraph style seen inside `w:pPr`.
fn convert_document_xml(xml: &str) -> Result<EngineOutput, EngineError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut writer = BlockWriter::default();
    let mut messages: Vec<EngineMessage> = Vec::new();
    let mut warned_styles: HashSet<String> = HashSet::new();
    let mut skipped_objects = 0usize;

    let mut segments: Vec<Segment> = Vec::new();
    let mut para_style: Option<String> = None;
    let mut run_props = RunProps::default();
    let mut in_run_props = false;
    let mut in_text = false;

    // Table state. Cells hold full inline HTML; nested tables are flattened.
    let mut in_table = false;
    let mut cells: Vec<String> = Vec::new();
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut cell_html = String::new();

    loop {
        match reader.read_event() {
            Ok(ev @ Event::Start(_)) | Ok(ev @ Event::Empty(_)) => {
                let is_start = matches!(ev, Event::Start(_));
                let e = match &ev {
                    Event::Start(e) | Event::Empty(e) => e,
                    _ => unreachable!(),
                };
                match local_name(e.name().as_ref()) {
                    b"p" => {
                        segments.clear();
                        para_style = None;
                    }
                    b"pStyle" => {
                        if let Some(v) = attr_val(e) {
                            para_style = Some(v);
                        }
                    }
                    b"r" => {
                        run_props = RunProps::default();
                    }
                    b"rPr" => in_run_props = true,
                    b"b" => {
                        if in_run_props && attr_val(e).as_deref() != Some("false")
                            && attr_val(e).as_deref() != Some("0")
                        {
                            run_props.bold = true;
                        }
                    }
                    b"i" => {
                        if in_run_props && attr_val(e).as_deref() != Some("false")
                            && attr_val(e).as_deref() != Some("0")
                        {
                            run_props.italic = true;
                        }
                    }
                    b"t" => in_text = is_start,
                    b"br" => segments.push(Segment::Break),
                    b"tab" => segments.push(Segment::Text {
                        text: " ".to_string(),
                        props: run_props,
                    }),
                    b"tbl" => {
                        in_table = true;
                        rows.clear();
                    }
                    b"tr" => cells.clear(),
                    b"tc" => cell_html.clear(),
                    b"drawing" | b"pict" | b"object" => {
                        skipped_objects += 1;
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(t)) => {
                if in_text {
                    let text = t
                        .unescape()
                        .map_err(|e| EngineError::MalformedDocument(e.to_string()))?;
                    segments.push(Segment::Text {
                        text: text.into_owned(),
                        props: run_props,
                    });
                }
            }
            Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                b"t" => in_text = false,
                b"rPr" => in_run_props = false,
                b"p" => {
                    let inline = render_inline(&segments);
                    let text = segments_text(&segments);
                    segments.clear();
                    if text.trim().is_empty() {
                        continue;
                    }
                    if in_table {
                        if !cell_html.is_empty() {
                            cell_html.push_str("<br>");
                        }
                        cell_html.push_str(&inline);
                        continue;
                    }
                    let style = para_style.take();
                    match style.as_deref() {
                        Some(s) if heading_level(s).is_some() => {
                            let level = heading_level(s).unwrap_or(1);
                            writer.push_block(format!("<h{level}>{inline}</h{level}>"));
                        }
                        Some(s) if list_kind(s).is_some() => {
                            let kind = list_kind(s).unwrap_or(ListKind::Bullet);
                            writer.push_list_item(kind, inline);
                        }
                        Some(s) => {
                            if !is_known_plain_style(s) && warned_styles.insert(s.to_string()) {
                                messages.push(EngineMessage::warning(format!(
                                    "Unrecognised paragraph style '{s}' treated as plain text"
                                )));
                            }
                            writer.push_block(format!("<p>{inline}</p>"));
                        }
                        None => writer.push_block(format!("<p>{inline}</p>")),
                    }
                }
                b"tc" => cells.push(std::mem::take(&mut cell_html)),
                b"tr" => {
                    if !cells.is_empty() {
                        rows.push(std::mem::take(&mut cells));
                    }
                }
                b"tbl" => {
                    in_table = false;
                    if !rows.is_empty() {
                        let mut html = String::from("<table>");
                        for row in rows.drain(..) {
                            html.push_str("<tr>");
                            for cell in row {
                                html.push_str("<td>");
                                html.push_str(&cell);
                                html.push_str("</td>");
                            }
                            html.push_str("</tr>");
                        }
                        html.push_str("</table>");
                        writer.push_block(html);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(EngineError::MalformedDocument(e.to_string())),
            _ => {}
        }
    }

    if skipped_objects > 0 {
        messages.push(EngineMessage::warning(format!(
            "{skipped_objects} embedded object(s) skipped"
        )));
    }

    Ok(EngineOutput {
        html: writer.finish(),
        messages,
    })
}

// ── Tests ────────────────────────────────────────────────────────────────────
