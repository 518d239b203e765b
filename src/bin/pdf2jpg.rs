//! CLI binary for pdf2jpg.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionOptions` and reports results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{HumanBytes, ProgressBar, ProgressStyle};
use pdf2jpg::pipeline::input::{archive_name_for, base_name, file_name_of};
use pdf2jpg::{
    convert_to_file, inspect, preview_to_file, ConversionOptions, ConversionProgressCallback,
    ProgressCallback, Rgb,
};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
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
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live bar plus one log line per page.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Per-page wall-clock start times for elapsed reporting.
    start_times: Mutex<HashMap<usize, Instant>>,
}

impl CliProgressCallback {
    /// Spinner until `on_conversion_start` tells us how many pages to expect.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Converting");
        self.bar.reset_eta();
    }

    fn elapsed_secs(&self, page_num: usize) -> f64 {
        self.start_times
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&page_num)
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_pages: usize) {
        self.activate_bar(total_pages);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Exporting {total_pages} pages…"))
        ));
    }

    fn on_page_start(&self, page_num: usize, _total: usize) {
        self.start_times
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(page_num, Instant::now());
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, page_num: usize, total: usize, jpeg_len: usize) {
        let elapsed = self.elapsed_secs(page_num);
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {:<10}  {}",
            green("✓"),
            page_num,
            total,
            dim(&format!("{:>9}", HumanBytes(jpeg_len as u64).to_string())),
            dim(&format!("{elapsed:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_conversion_error(&self, error: &str) {
        self.bar.abandon();
        eprintln!("{} {}", red("✘"), red(error));
    }

    fn on_conversion_complete(&self, total_pages: usize, archive_len: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} pages exported  {}",
            green("✔"),
            bold(&total_pages.to_string()),
            dim(&HumanBytes(archive_len as u64).to_string()),
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # All pages at the default scale (2.0) and quality (0.92)
  pdf2jpg Report.pdf                      # → ./Report_jpg.zip

  # Explicit output path
  pdf2jpg Report.pdf -o out/report.zip

  # Selected pages, higher resolution, smaller files
  pdf2jpg --pages 1-3,5,8-12 --scale 3 --quality 0.8 Report.pdf

  # Transparent pages composited onto a dark background
  pdf2jpg --background '#202020' slides.pdf

  # First page only, as a single JPEG
  pdf2jpg --preview-only --preview cover.jpg Report.pdf

  # Inspect PDF metadata (no rendering)
  pdf2jpg --inspect-only --json Report.pdf

PAGE SPEC:
  Comma-separated tokens, each a page "N" or a range "A-B". Pages outside
  the document are dropped and ranges are clamped to it ("8-99" on a
  10-page file is 8-10). "B-A" reads as "A-B". Duplicates collapse and
  malformed tokens are ignored. An empty spec selects every page.

OUTPUT:
  Entries are named {base}_p001.jpg, {base}_p002.jpg, … in ascending page
  order, where {base} is the input file name without its extension.

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         Path to libpdfium (file or directory)
  RUST_LOG                Override log filter (e.g. pdf2jpg=debug)
  PDF2JPG_*               Default for each flag (see --help)
"#;

/// Convert PDF pages to JPEG images packed in a ZIP archive.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2jpg",
    version,
    about = "Convert PDF pages to JPEG images packed in a ZIP archive",
    long_about = "Render selected pages of a PDF with pdfium, composite them onto a background \
colour, encode each as JPEG and store them in a single ZIP archive named after the input file.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF file to convert.
    input: PathBuf,

    /// Write the archive here instead of ./{base}_jpg.zip.
    #[arg(short, long, env = "PDF2JPG_OUTPUT")]
    output: Option<PathBuf>,

    /// Render scale relative to 72 DPI (0.75–4.0).
    #[arg(long, env = "PDF2JPG_SCALE", default_value_t = 2.0)]
    scale: f32,

    /// JPEG quality as a fraction (0.5–1.0).
    #[arg(long, env = "PDF2JPG_QUALITY", default_value_t = 0.92)]
    quality: f32,

    /// Page spec, e.g. "1-3,5,8". Empty selects all pages.
    #[arg(long, env = "PDF2JPG_PAGES", default_value = "")]
    pages: String,

    /// Background colour for transparent areas (#rrggbb or #rgb).
    #[arg(long, env = "PDF2JPG_BACKGROUND", default_value = "#ffffff")]
    background: Rgb,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF2JPG_PASSWORD")]
    password: Option<String>,

    /// Also write a first-page preview JPEG to this path.
    #[arg(long, env = "PDF2JPG_PREVIEW")]
    preview: Option<PathBuf>,

    /// Write only the preview (./{base}_preview.jpg unless --preview is set).
    #[arg(long)]
    preview_only: bool,

    /// Print PDF metadata only, no conversion.
    #[arg(long)]
    inspect_only: bool,

    /// Print a JSON summary on stdout.
    #[arg(long, env = "PDF2JPG_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2JPG_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2JPG_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2JPG_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs; -v brings them back.
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

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let meta = inspect(&cli.input).await.context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&meta).context("Failed to serialize metadata")?
            );
        } else {
            println!("File:         {}", cli.input.display());
            if let Some(ref t) = meta.title {
                println!("Title:        {}", t);
            }
            if let Some(ref a) = meta.author {
                println!("Author:       {}", a);
            }
            if let Some(ref s) = meta.subject {
                println!("Subject:      {}", s);
            }
            println!("Pages:        {}", meta.page_count);
            println!("PDF Version:  {}", meta.pdf_version);
            if let Some(ref p) = meta.producer {
                println!("Producer:     {}", p);
            }
            if let Some(ref c) = meta.creator {
                println!("Creator:      {}", c);
            }
        }
        return Ok(());
    }

    let progress_cb: Option<ProgressCallback> = if show_progress && !cli.preview_only {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };

    let options = build_options(&cli, progress_cb)?;

    // ── Preview ──────────────────────────────────────────────────────────
    let preview_path = match (&cli.preview, cli.preview_only) {
        (Some(path), _) => Some(path.clone()),
        (None, true) => Some(default_preview_path(&cli.input)),
        (None, false) => None,
    };

    let mut preview_summary = None;
    if let Some(ref path) = preview_path {
        let preview = preview_to_file(&cli.input, path, &options)
            .await
            .context("Preview failed")?;
        if !cli.quiet && !cli.json {
            eprintln!(
                "{}  preview {}x{}  {}  →  {}",
                green("✔"),
                preview.width,
                preview.height,
                dim(&HumanBytes(preview.jpeg.len() as u64).to_string()),
                bold(&path.display().to_string()),
            );
        }
        preview_summary = Some(serde_json::json!({
            "path": path,
            "width": preview.width,
            "height": preview.height,
            "bytes": preview.jpeg.len(),
        }));
    }

    if cli.preview_only {
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({ "preview": preview_summary }))
                    .context("Failed to serialise output")?
            );
        }
        return Ok(());
    }

    // ── Run conversion ───────────────────────────────────────────────────
    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(archive_name_for(&cli.input)));

    let stats = convert_to_file(&cli.input, &output_path, &options)
        .await
        .context("Conversion failed")?;

    if cli.json {
        let summary = serde_json::json!({
            "archive": output_path,
            "stats": stats,
            "preview": preview_summary,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialise output")?
        );
    } else if !cli.quiet {
        // Per-page lines were already printed by the callback.
        eprintln!(
            "{}  {}/{} pages  {}  {}ms  →  {}",
            green("✔"),
            stats.exported_pages,
            stats.total_pages,
            HumanBytes(stats.archive_bytes as u64),
            stats.total_duration_ms,
            bold(&output_path.display().to_string()),
        );
        if cli.verbose {
            eprintln!(
                "   {} render  /  {} encode",
                dim(&format!("{}ms", stats.render_duration_ms)),
                dim(&format!("{}ms", stats.encode_duration_ms)),
            );
        }
    }

    Ok(())
}

/// Map CLI args to `ConversionOptions`.
fn build_options(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionOptions> {
    let mut builder = ConversionOptions::builder()
        .scale(cli.scale)
        .quality(cli.quality)
        .background(cli.background)
        .pages(cli.pages.clone());

    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn default_preview_path(input: &Path) -> PathBuf {
    let name = file_name_of(input);
    PathBuf::from(format!("{}_preview.jpg", base_name(name.as_deref())))
}
