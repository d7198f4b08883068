//! CLI binary for pdf2docs.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2docs::{
    convert, extract_paragraphs, ConversionConfig, ConversionOutput, ConversionProgressCallback,
    DocumentTarget, PageSelection, ProgressCallback, TemplateProfile,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner at the bottom of the terminal plus one log line per stage.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }

    fn step(&self, line: String) {
        self.bar.println(format!("  {} {}", green("✓"), line));
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, input: &str) {
        self.bar.println(format!("{} {}", cyan("◆"), bold(&format!("Converting {input}"))));
        self.bar.set_prefix("Extracting");
        self.bar.set_message("reading text layer…");
    }

    fn on_extraction_complete(&self, pages: usize, lines: usize, filtered: usize) {
        self.step(format!(
            "Read {pages} pages  {}",
            dim(&format!("{lines} lines kept, {filtered} boilerplate"))
        ));
        self.bar.set_prefix("Grouping");
        self.bar.set_message("");
    }

    fn on_grouping_complete(&self, paragraphs: usize) {
        self.step(format!("Grouped into {paragraphs} paragraphs"));
        self.bar.set_prefix("Uploading");
        self.bar.set_message("reading document…");
    }

    fn on_upload_start(&self, document_id: &str, requests: usize) {
        self.bar
            .set_message(format!("{requests} requests → {}", dim(document_id)));
    }

    fn on_upload_complete(&self, document_id: &str, inserted_units: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} Document {} updated  {}",
            green("✔"),
            bold(document_id),
            dim(&format!("{inserted_units} characters inserted"))
        );
    }

    fn on_upload_skipped(&self, reason: &str) {
        self.bar.finish_and_clear();
        eprintln!("{} Upload skipped: {}", cyan("⚠"), reason);
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Replace the body of an existing document
  pdf2docs datasheet.pdf --document 1AbC_dEf

  # A full document URL works too
  pdf2docs datasheet.pdf --document https://docs.google.com/document/d/1AbC_dEf/edit

  # Create a new document
  pdf2docs datasheet.pdf --create "TDS - Epoxy Primer"

  # Preview what would be inserted, no remote call
  pdf2docs datasheet.pdf --dry-run

  # Template with company boilerplate, only the first two pages
  pdf2docs datasheet.pdf --template templates/datasheet.json --pages 1-2 --document 1AbC_dEf

  # Prompted for the path when it is omitted
  pdf2docs --document 1AbC_dEf

ENVIRONMENT VARIABLES:
  PDF2DOCS_ACCESS_TOKEN   Bearer token; skips the credentials file
  PDF2DOCS_CREDENTIALS    Authorized-user JSON file (default: token.json)
  PDF2DOCS_DOCUMENT       Target document id or URL
  PDF2DOCS_TEMPLATE       Template profile JSON
  PDFIUM_LIB_PATH         Path to libpdfium
  RUST_LOG                Log filter, overrides --verbose/--quiet

TEMPLATE PROFILE:
  {
    "ignore_phrases":   ["ACME Coatings Ltd.", "Tel.:"],
    "heading_keywords": ["Description", "Physical Data"],
    "bold_font_pattern": "(?i)bold|black"
  }
"#;

/// Write the text of a PDF into a Google Doc as styled paragraphs.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2docs",
    version,
    about = "Write the text of a PDF into a Google Doc as styled paragraphs",
    long_about = "Extract the text of a PDF (local file or URL), classify lines as headings or \
body text by font size, weight and keywords, merge adjacent lines into paragraphs, and replace \
the content of a Google Docs document with the result in one atomic batch update.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path or HTTP/HTTPS URL. Prompted for when omitted.
    input: Option<String>,

    /// Target document id or docs.google.com URL. Ignored with --create.
    #[arg(short, long, env = "PDF2DOCS_DOCUMENT")]
    document: Option<String>,

    /// Create a new document with this title instead of updating one.
    #[arg(long, value_name = "TITLE")]
    create: Option<String>,

    /// Template profile JSON (ignore phrases, heading keywords, bold pattern).
    #[arg(short, long, env = "PDF2DOCS_TEMPLATE")]
    template: Option<PathBuf>,

    /// Font size (pt) above which a line is HEADING_1.
    #[arg(long, env = "PDF2DOCS_HEADING_SIZE", default_value_t = 12.0)]
    heading_size: f32,

    /// Font size (pt) above which a line is HEADING_2. Off by default.
    #[arg(long, env = "PDF2DOCS_SUBHEADING_SIZE")]
    subheading_size: Option<f32>,

    /// Vertical distance (pt) at which lines start a new paragraph.
    #[arg(long, env = "PDF2DOCS_PARAGRAPH_GAP", default_value_t = 5.0)]
    paragraph_gap: f32,

    /// Insert text only, without heading/bold styling.
    #[arg(long)]
    plain: bool,

    /// Skip the revision check (overwrite even if the document changed meanwhile).
    #[arg(long)]
    no_revision_check: bool,

    /// Page selection: all, 5, 3-15, or 1,3,5,7.
    #[arg(long, env = "PDF2DOCS_PAGES", default_value = "all")]
    pages: String,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF2DOCS_PASSWORD")]
    password: Option<String>,

    /// Authorized-user credentials JSON.
    #[arg(long, env = "PDF2DOCS_CREDENTIALS", default_value = "token.json")]
    credentials: PathBuf,

    /// Path to the pdfium shared library.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Print the text that would be inserted; no remote call.
    #[arg(long)]
    dry_run: bool,

    /// Output structured JSON (ConversionOutput).
    #[arg(long, env = "PDF2DOCS_JSON")]
    json: bool,

    /// Disable progress spinner.
    #[arg(long, env = "PDF2DOCS_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2DOCS_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2DOCS_QUIET")]
    quiet: bool,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "PDF2DOCS_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner carries the stage messages, so INFO logs are muted while
    // it is active.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
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

    let input = match cli.input.clone() {
        Some(input) => input,
        None => prompt_for_input()?,
    };

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    if cli.dry_run {
        let output = extract_paragraphs(&input, &config)
            .await
            .context("Extraction failed")?;
        if let Some(ref cb) = config.progress_callback {
            cb.on_upload_skipped("dry run");
        }
        return print_output(&cli, &output, true);
    }

    let output = convert(&input, &config)
        .await
        .context("Conversion failed")?;
    print_output(&cli, &output, false)
}

fn prompt_for_input() -> Result<String> {
    eprint!("Enter path to PDF: ");
    io::stderr().flush().ok();

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read PDF path from stdin")?;

    let path = line.trim().trim_matches('"').to_string();
    if path.is_empty() {
        anyhow::bail!("No PDF path given");
    }
    Ok(path)
}

fn print_output(cli: &Cli, output: &ConversionOutput, dry_run: bool) -> Result<()> {
    if cli.json {
        let json = serde_json::to_string_pretty(output).context("Failed to serialise output")?;
        println!("{json}");
        return Ok(());
    }

    if dry_run {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(output.text.as_bytes())
            .context("Failed to write to stdout")?;
    }

    if !cli.quiet {
        let stats = &output.stats;
        eprintln!(
            "{} pages  {} lines ({} boilerplate)  {} paragraphs ({} headings)  {}ms",
            stats.pages,
            stats.lines,
            stats.filtered_lines,
            stats.paragraphs,
            stats.headings,
            stats.total_duration_ms.max(stats.extract_duration_ms),
        );
        match output.document_id {
            Some(ref id) if output.uploaded() => {
                eprintln!("   https://docs.google.com/document/d/{id}/edit");
            }
            _ if !dry_run => eprintln!("   nothing uploaded: no text extracted"),
            _ => {}
        }
    }
    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let pages = parse_pages(&cli.pages)?;

    let mut builder = ConversionConfig::builder()
        .heading_font_size(cli.heading_size)
        .subheading_font_size(cli.subheading_size)
        .paragraph_gap(cli.paragraph_gap)
        .apply_styles(!cli.plain)
        .require_revision(!cli.no_revision_check)
        .credentials_path(&cli.credentials)
        .pages(pages)
        .download_timeout_secs(cli.download_timeout);

    if let Some(ref path) = cli.template {
        let template = TemplateProfile::from_json_file(path)
            .with_context(|| format!("Failed to load template {:?}", path))?;
        builder = builder.template(template);
    }

    if let Some(ref title) = cli.create {
        builder = builder.target(DocumentTarget::New {
            title: title.clone(),
        });
    } else if let Some(ref document) = cli.document {
        builder = builder.target(
            DocumentTarget::parse_existing(document).context("Invalid --document value")?,
        );
    } else if !cli.dry_run {
        anyhow::bail!("No target document: pass --document <ID|URL>, --create <TITLE> or --dry-run");
    }

    if let Some(ref password) = cli.password {
        builder = builder.password(password);
    }
    if let Some(ref lib) = cli.pdfium_lib {
        builder = builder.pdfium_library_path(lib);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Parse `--pages` string into `PageSelection`.
fn parse_pages(s: &str) -> Result<PageSelection> {
    let s = s.trim().to_lowercase();

    if s == "all" {
        return Ok(PageSelection::All);
    }

    // Range: "3-15"
    if let Some((start, end)) = s.split_once('-') {
        let start: usize = start
            .trim()
            .parse()
            .context("Invalid start page in range")?;
        let end: usize = end.trim().parse().context("Invalid end page in range")?;

        if start < 1 {
            anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", start);
        }
        if start > end {
            anyhow::bail!(
                "Invalid page range '{}-{}': start must be <= end",
                start,
                end
            );
        }

        return Ok(PageSelection::Range(start, end));
    }

    // Set: "1,3,5,7"
    if s.contains(',') {
        let pages: Vec<usize> = s
            .split(',')
            .map(|p| {
                p.trim()
                    .parse::<usize>()
                    .context(format!("Invalid page number: '{}'", p.trim()))
            })
            .collect::<Result<Vec<_>>>()?;

        if let Some(&p) = pages.iter().find(|&&p| p < 1) {
            anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", p);
        }

        return Ok(PageSelection::Set(pages));
    }

    // Single page: "5"
    let page: usize = s.parse().context("Invalid page number")?;
    if page < 1 {
        anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", page);
    }

    Ok(PageSelection::Single(page))
}
