//! CLI binary for docx2page.
//!
//! A thin shim over the library crate that maps CLI flags to `RenderConfig`
//! and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use docx2page::{
    render, render_to_file, RenderConfig, Severity, SharedStatusSink, StatusSink,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI status sink using indicatif ──────────────────────────────────────────

/// Terminal status sink: shows the pipeline's single status line on a
/// spinner. Last write wins, matching the library's status contract.
struct SpinnerSink {
    bar: ProgressBar,
}

impl SpinnerSink {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_message("Starting…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl StatusSink for SpinnerSink {
    fn on_status(&self, text: &str, severity: Severity) {
        match severity {
            Severity::Info => self.bar.set_message(text.to_string()),
            Severity::Error => self.bar.set_message(red(text)),
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Render to stdout
  docx2page report.docx

  # Render to a file (atomic write)
  docx2page report.docx -o report.html

  # Render from a URL (cache bypassed, single attempt)
  docx2page https://example.org/paper.docx -o paper.html

  # Structured JSON: content, TOC entries, diagnostics, stats
  docx2page --json report.docx > report.json

  # Print the table of contents only
  docx2page --toc report.docx

EXIT STATUS:
  0  rendered successfully (warnings allowed; see stderr)
  1  fatal error: fetch failed, not a DOCX, converter unavailable, or
     conversion failed
"#;

/// Render DOCX documents into sanitized HTML with a table of contents.
#[derive(Parser, Debug)]
#[command(
    name = "docx2page",
    version,
    about = "Render DOCX files and URLs into sanitized HTML with a table of contents",
    long_about = "Render a DOCX document (local file or URL) into a sanitized HTML fragment, \
with heading anchors assigned and a table of contents derived from h1/h2 headings.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local DOCX file path or HTTP/HTTPS URL.
    input: String,

    /// Write HTML to this file instead of stdout.
    #[arg(short, long, env = "DOCX2PAGE_OUTPUT")]
    output: Option<PathBuf>,

    /// Output structured JSON (RenderOutput) instead of HTML.
    #[arg(long, env = "DOCX2PAGE_JSON")]
    json: bool,

    /// Print the table of contents instead of the content HTML.
    #[arg(long)]
    toc: bool,

    /// HTTP fetch timeout in seconds.
    #[arg(long, env = "DOCX2PAGE_FETCH_TIMEOUT", default_value_t = 30)]
    fetch_timeout: u64,

    /// Converter availability poll interval in milliseconds.
    #[arg(long, env = "DOCX2PAGE_POLL_INTERVAL", default_value_t = 50)]
    poll_interval: u64,

    /// Maximum converter availability polls before giving up.
    #[arg(long, env = "DOCX2PAGE_POLL_ATTEMPTS", default_value_t = 60)]
    poll_attempts: u32,

    /// Disable the status spinner.
    #[arg(long, env = "DOCX2PAGE_NO_STATUS")]
    no_status: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOCX2PAGE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the rendered result.
    #[arg(short, long, env = "DOCX2PAGE_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the spinner is active; the
    // status line provides the feedback that matters to the user.
    let show_status = !cli.quiet && !cli.no_status && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_status {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Register the conversion engine ───────────────────────────────────
    // With `--features bundled`, the in-process engine is registered up
    // front; without it, some other component must register one before the
    // poll window closes.
    #[cfg(feature = "bundled")]
    docx2page::register_bundled_converter();

    // ── Build config ─────────────────────────────────────────────────────
    let spinner = if show_status { Some(SpinnerSink::new()) } else { None };

    let mut builder = RenderConfig::builder()
        .fetch_timeout_secs(cli.fetch_timeout)
        .poll_interval_ms(cli.poll_interval)
        .poll_max_attempts(cli.poll_attempts);

    if let Some(ref sink) = spinner {
        builder = builder.status_sink(Arc::clone(sink) as SharedStatusSink);
    }

    let config = builder.build().context("Invalid configuration")?;

    // ── Run the render ───────────────────────────────────────────────────
    let result = if let Some(ref output_path) = cli.output {
        render_to_file(&cli.input, output_path, &config).await
    } else {
        render(&cli.input, &config).await
    };

    if let Some(ref sink) = spinner {
        sink.finish();
    }

    let output = result.context("Render failed")?;

    // ── Print results ────────────────────────────────────────────────────
    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else if cli.toc {
        for entry in &output.toc {
            let indent = if entry.level == 2 { "  " } else { "" };
            println!("{indent}{}  {}", entry.text, dim(&entry.href()));
        }
        if output.toc.is_empty() {
            eprintln!("{}", dim("No headings detected in the document."));
        }
    } else if cli.output.is_none() {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(output.content_html.as_bytes())
            .context("Failed to write to stdout")?;
        if !output.content_html.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
    }

    // ── Summary ──────────────────────────────────────────────────────────
    if !cli.quiet {
        let tick = if output.stats.warning_count == 0 {
            green("✔")
        } else {
            red("⚠")
        };
        let target = cli
            .output
            .as_ref()
            .map(|p| format!("  →  {}", bold(&p.display().to_string())))
            .unwrap_or_default();
        eprintln!(
            "{tick}  {} TOC entr(ies)  {} warning(s)  {}ms{target}",
            output.toc.len(),
            output.stats.warning_count,
            output.stats.total_ms,
        );
        for diagnostic in &output.diagnostics {
            eprintln!("   {} {}", dim("•"), diagnostic.message);
        }
    }

    Ok(())
}
