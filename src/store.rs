//! Content-addressed output cache for sanitized documents.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use sha2::Digest as _;
use url::Url;

/// Outcome of a cache write attempt. `Unchanged` short-circuits the
/// expensive downstream conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    Written,
    Unchanged,
}

/// Hex sha256 of the exact bytes. The sanitizer is deterministic, so byte
/// equality is the staleness test; no semantic diffing.
pub fn fingerprint(content: &str) -> String {
    let mut hasher = sha2::Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn html_path(out_dir: &Path, key: &str) -> PathBuf {
    out_dir.join(format!("{key}.htm"))
}

pub fn docx_path(out_dir: &Path, key: &str) -> PathBuf {
    out_dir.join(format!("{key}.docx"))
}

/// Stable output key for a scraped entry: the decoded final non-empty path
/// segment of its URL.
pub fn output_key(url: &Url) -> anyhow::Result<String> {
    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.rfind(|segment| !segment.is_empty()))
        .ok_or_else(|| anyhow::anyhow!("url has no usable path segment: {url}"))?;

    let decoded = urlencoding::decode(segment)
        .with_context(|| format!("decode path segment: {segment}"))?;
    Ok(decoded.into_owned())
}

/// Writes the sanitized HTML unless an identical artifact already exists
/// under the same key.
pub fn write_if_changed(out_dir: &Path, key: &str, html: &str) -> anyhow::Result<CacheOutcome> {
    let path = html_path(out_dir, key);
    let new_fingerprint = fingerprint(html);

    if path.exists() {
        let existing = std::fs::read_to_string(&path)
            .with_context(|| format!("read cached html: {}", path.display()))?;
        if fingerprint(&existing) == new_fingerprint {
            return Ok(CacheOutcome::Unchanged);
        }
    }

    std::fs::write(&path, html).with_context(|| format!("write html: {}", path.display()))?;
    Ok(CacheOutcome::Written)
}
