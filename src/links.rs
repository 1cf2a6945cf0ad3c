//! Candidate link production: scrape-and-classify, or a pre-vetted table.

use std::fs::File;
use std::io::{BufRead as _, BufReader};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::Context as _;
use reqwest::blocking::Client;
use scraper::{Html, Selector};
use serde::Serialize;
use url::Url;

use crate::classify;
use crate::fetch;
use crate::store;

static ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("anchor selector parses"));

/// One candidate law page. `key` names the on-disk artifacts; `origin` is
/// the raw href or the table row label it came from.
#[derive(Debug, Clone, Serialize)]
pub struct LinkEntry {
    pub key: String,
    pub url: String,
    pub text: String,
    pub origin: String,
}

/// Where candidate entries come from. Chosen by the caller; the downstream
/// pipeline is identical for both strategies.
#[derive(Debug, Clone)]
pub enum LinkSource {
    /// Scrape one listing page and keep the links classified as law rules.
    Listing { url: Url },
    /// Read a two-column table (output key, page title). Rows are trusted:
    /// no classification, and a title that resolves to no page surfaces
    /// later as a per-entry fetch failure.
    Table { path: PathBuf },
}

impl LinkSource {
    pub fn entries(&self, client: &Client, base: &Url) -> anyhow::Result<Vec<LinkEntry>> {
        match self {
            Self::Listing { url } => {
                let html = fetch::fetch_html(client, url)
                    .with_context(|| format!("fetch listing page: {url}"))?;
                Ok(collect_law_links(&html, base))
            }
            Self::Table { path } => read_link_table(path, base),
        }
    }
}

/// Filters a listing page down to law-rule links, in document order.
/// Empty hrefs never reach classification; they are dropped here outright.
pub fn collect_law_links(html: &str, base: &Url) -> Vec<LinkEntry> {
    let document = Html::parse_document(html);
    let mut entries = Vec::new();

    for anchor in document.select(&ANCHOR) {
        let href = anchor.value().attr("href").unwrap_or_default().trim();
        if href.is_empty() {
            continue;
        }
        if classify::is_internal_navigation(href) {
            continue;
        }

        // Resolve site-relative hrefs against the base origin; anything
        // neither absolute nor site-relative (mailto:, bare fragments,
        // protocol-relative oddities) is dropped.
        let url = if href.starts_with('/') {
            match base.join(href) {
                Ok(url) => url,
                Err(_) => continue,
            }
        } else if href.starts_with("http") {
            match Url::parse(href) {
                Ok(url) => url,
                Err(_) => continue,
            }
        } else {
            continue;
        };

        let text = anchor.text().collect::<String>().trim().to_owned();
        if !classify::is_law_rule(href, &text) {
            continue;
        }

        let key = match store::output_key(&url) {
            Ok(key) => key,
            Err(err) => {
                tracing::warn!(url = %url, %err, "skip link without usable output key");
                continue;
            }
        };

        entries.push(LinkEntry {
            key,
            url: url.to_string(),
            text,
            origin: href.to_owned(),
        });
    }

    tracing::info!(count = entries.len(), "classified law links");
    entries
}

/// Reads the pre-vetted table: one row per page, `key<TAB>page title`.
/// Blank lines and `#` comments are skipped; malformed rows are logged and
/// skipped, never fatal.
fn read_link_table(path: &Path, base: &Url) -> anyhow::Result<Vec<LinkEntry>> {
    let file =
        File::open(path).with_context(|| format!("open link table: {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut entries = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("read link table: {}", path.display()))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((label, title)) = line.split_once('\t') else {
            tracing::warn!(line = index + 1, "skip table row without two columns");
            continue;
        };
        let label = label.trim();
        let title = title.trim();
        if label.is_empty() || title.is_empty() {
            tracing::warn!(line = index + 1, "skip table row with an empty column");
            continue;
        }

        let url = article_url(base, title)
            .with_context(|| format!("build article url for {title:?}"))?;

        entries.push(LinkEntry {
            key: label.to_owned(),
            url: url.to_string(),
            text: title.to_owned(),
            origin: label.to_owned(),
        });
    }

    tracing::info!(count = entries.len(), table = %path.display(), "read link table");
    Ok(entries)
}

/// Builds an article URL from a page title: whitespace runs become the
/// wiki's word joiner, then the title goes under the article path.
pub fn article_url(base: &Url, title: &str) -> anyhow::Result<Url> {
    let article = title.split_whitespace().collect::<Vec<_>>().join("_");
    base.join(&format!("/wiki/{article}"))
        .with_context(|| format!("join article path for {title:?}"))
}
