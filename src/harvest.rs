//! The sequential harvest pipeline: change gate, link source, then one
//! entry at a time through fetch → sanitize → cache → convert.

use std::fs::OpenOptions;
use std::io::{BufWriter, Write as _};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use reqwest::blocking::Client;
use url::Url;

use crate::cli::{CheckArgs, HarvestArgs, ImportArgs, LinksArgs};
use crate::convert;
use crate::errors::{ConversionError, EntryError};
use crate::fetch;
use crate::gate;
use crate::links::{self, LinkEntry, LinkSource};
use crate::sanitize::{self, SanitizeOptions};
use crate::store::{self, CacheOutcome};

/// Cumulative per-run counters; reported once at the end. The process
/// always exits zero — partial failure lives here, not in the exit code.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub attempted: usize,
    pub saved: usize,
    pub unchanged: usize,
    pub converted: usize,
    pub failed: usize,
}

impl RunSummary {
    fn print(&self) {
        println!(
            "Processed {} entries: {} saved ({} converted), {} unchanged, {} failed.",
            self.attempted, self.saved, self.converted, self.unchanged, self.failed
        );
    }
}

struct PipelineConfig {
    out_dir: PathBuf,
    delay: Duration,
    limit: Option<usize>,
    sanitize: SanitizeOptions,
    pandoc: String,
}

enum EntryOutcome {
    Saved { converted: bool },
    Unchanged,
}

pub fn harvest(args: HarvestArgs) -> anyhow::Result<()> {
    let base = parse_base(&args.base_url)?;
    let client = fetch::client()?;

    if !args.force {
        let history = history_url(&base, &args.title)?;
        if !gate::should_proceed(&client, &history, Path::new(&args.marker)) {
            println!("Remote revision unchanged; nothing to do.");
            return Ok(());
        }
    }

    let listing = links::article_url(&base, &args.title)?;
    tracing::info!(url = %listing, "harvest: collect law links");

    let source = LinkSource::Listing { url: listing };
    let config = PipelineConfig {
        out_dir: PathBuf::from(&args.out),
        delay: Duration::from_millis(args.delay_ms),
        limit: args.limit,
        sanitize: SanitizeOptions {
            demote_law_refs: args.demote_law_refs,
        },
        pandoc: args.pandoc,
    };

    let summary = run_pipeline(&client, &base, &source, &config)?;
    summary.print();
    Ok(())
}

pub fn import(args: ImportArgs) -> anyhow::Result<()> {
    let base = parse_base(&args.base_url)?;
    let client = fetch::client()?;

    let source = LinkSource::Table {
        path: PathBuf::from(&args.list),
    };
    let config = PipelineConfig {
        out_dir: PathBuf::from(&args.out),
        delay: Duration::from_millis(args.delay_ms),
        limit: args.limit,
        sanitize: SanitizeOptions {
            demote_law_refs: !args.keep_law_refs,
        },
        pandoc: args.pandoc,
    };

    let summary = run_pipeline(&client, &base, &source, &config)?;
    summary.print();
    Ok(())
}

pub fn links(args: LinksArgs) -> anyhow::Result<()> {
    let base = parse_base(&args.base_url)?;
    let client = fetch::client()?;

    let listing = links::article_url(&base, &args.title)?;
    let source = LinkSource::Listing { url: listing };
    let entries = source.entries(&client, &base)?;

    for (index, entry) in entries.iter().enumerate() {
        println!("{:3}. {}", index + 1, entry.url);
        if !entry.text.is_empty() {
            println!("     Text: {}", entry.text);
        }
        println!("     Origin: {}", entry.origin);
    }
    println!("\nFound {} law rule links", entries.len());

    if let Some(report) = &args.report
        && let Err(err) = write_link_report(Path::new(report), &entries)
    {
        tracing::error!(%err, "could not write link report");
    }

    Ok(())
}

pub fn check(args: CheckArgs) -> anyhow::Result<()> {
    let base = parse_base(&args.base_url)?;
    let client = fetch::client()?;

    let history = history_url(&base, &args.title)?;
    if gate::should_proceed(&client, &history, Path::new(&args.marker)) {
        println!("Update available.");
    } else {
        println!("Up to date.");
    }
    Ok(())
}

fn run_pipeline(
    client: &Client,
    base: &Url,
    source: &LinkSource,
    config: &PipelineConfig,
) -> anyhow::Result<RunSummary> {
    std::fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("create output dir: {}", config.out_dir.display()))?;
    copy_stylesheet_if_present(&config.out_dir);

    let entries = source.entries(client, base)?;
    let entries = match config.limit {
        Some(limit) => &entries[..entries.len().min(limit)],
        None => &entries[..],
    };

    if let Err(err) = write_link_report(&config.out_dir.join("links.jsonl"), entries) {
        tracing::error!(%err, "could not write link report");
    }

    let reference = Path::new("reference.docx");
    let reference = reference.exists().then_some(reference);

    let mut summary = RunSummary::default();
    for (index, entry) in entries.iter().enumerate() {
        if index > 0 && !config.delay.is_zero() {
            std::thread::sleep(config.delay);
        }

        summary.attempted += 1;
        match process_entry(client, entry, config, reference) {
            Ok(EntryOutcome::Saved { converted }) => {
                summary.saved += 1;
                if converted {
                    summary.converted += 1;
                }
            }
            Ok(EntryOutcome::Unchanged) => summary.unchanged += 1,
            Err(err) => {
                summary.failed += 1;
                tracing::error!(url = %entry.url, %err, "entry failed; continuing");
            }
        }
    }

    Ok(summary)
}

fn process_entry(
    client: &Client,
    entry: &LinkEntry,
    config: &PipelineConfig,
    reference: Option<&Path>,
) -> Result<EntryOutcome, EntryError> {
    let url = Url::parse(&entry.url)
        .with_context(|| format!("parse entry url: {}", entry.url))
        .map_err(EntryError::Write)?;

    let html = fetch::fetch_html(client, &url)?;
    let sanitized = sanitize::sanitize(&html, &config.sanitize)?;

    match store::write_if_changed(&config.out_dir, &entry.key, &sanitized)? {
        CacheOutcome::Unchanged => {
            tracing::info!(key = %entry.key, "content unchanged; skipping conversion");
            Ok(EntryOutcome::Unchanged)
        }
        CacheOutcome::Written => {
            tracing::info!(key = %entry.key, "saved html");
            let converted = run_conversion(config, &entry.key, reference);
            Ok(EntryOutcome::Saved { converted })
        }
    }
}

/// Conversion never fails an entry: the HTML artifact is already on disk
/// and counts as saved.
fn run_conversion(config: &PipelineConfig, key: &str, reference: Option<&Path>) -> bool {
    let html_path = store::html_path(&config.out_dir, key);
    let docx_path = store::docx_path(&config.out_dir, key);

    match convert::to_docx(&config.pandoc, &html_path, &docx_path, reference) {
        Ok(()) => {
            tracing::info!(key = %key, "saved docx");
            true
        }
        Err(ConversionError::MissingConverter { program }) => {
            tracing::warn!(%program, "converter not installed; keeping html only");
            false
        }
        Err(err) => {
            tracing::warn!(key = %key, %err, "conversion failed; keeping html");
            false
        }
    }
}

fn write_link_report(path: &Path, entries: &[LinkEntry]) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .with_context(|| format!("create link report: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    for entry in entries {
        serde_json::to_writer(&mut writer, entry).context("write link record")?;
        writer.write_all(b"\n").context("write link record newline")?;
    }
    writer.flush().context("flush link report")?;

    Ok(())
}

/// The exported HTML references `style.css`; ship a local copy next to the
/// artifacts when one exists.
fn copy_stylesheet_if_present(out_dir: &Path) {
    let source = Path::new("style.css");
    if !source.exists() {
        return;
    }
    let target = out_dir.join("style.css");
    match std::fs::copy(source, &target) {
        Ok(_) => tracing::debug!(target = %target.display(), "copied stylesheet"),
        Err(err) => tracing::warn!(%err, "could not copy stylesheet"),
    }
}

fn parse_base(base_url: &str) -> anyhow::Result<Url> {
    let base = Url::parse(base_url).context("parse --base-url")?;
    if base.scheme() != "http" && base.scheme() != "https" {
        anyhow::bail!("--base-url must be http/https: {base}");
    }
    Ok(base)
}

fn history_url(base: &Url, title: &str) -> anyhow::Result<Url> {
    let article = title.split_whitespace().collect::<Vec<_>>().join("_");
    let mut url = base.join("/w/index.php").context("build history url")?;
    url.query_pairs_mut()
        .append_pair("title", &article)
        .append_pair("action", "history");
    Ok(url)
}
