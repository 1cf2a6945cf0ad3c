//! Run/skip decision based on the remote revision history.

use std::path::Path;
use std::sync::LazyLock;

use reqwest::blocking::Client;
use scraper::{Html, Selector};
use url::Url;

use crate::dates;
use crate::fetch;

static CHANGE_DATE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".mw-changeslist-date").expect("changes-list selector parses")
});

/// Decides whether a harvest run is needed at all.
///
/// Every failure path fails open: a spurious extra run is cheap, a missed
/// revision is not. The marker is only touched once a date actually parsed.
pub fn should_proceed(client: &Client, history_url: &Url, marker_path: &Path) -> bool {
    let latest = match fetch_latest_revision_date(client, history_url) {
        Ok(date) => date,
        Err(err) => {
            tracing::warn!(url = %history_url, %err, "could not determine latest revision; proceeding");
            return true;
        }
    };

    marker_allows(marker_path, &latest)
}

/// Compares the parsed revision date against the persisted marker,
/// verbatim. First run and any mismatch overwrite the marker and proceed;
/// an exact match skips the run.
fn marker_allows(marker_path: &Path, latest: &str) -> bool {
    let stored = match std::fs::read_to_string(marker_path) {
        Ok(contents) => Some(contents.trim().to_owned()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
        Err(err) => {
            tracing::warn!(marker = %marker_path.display(), %err, "could not read revision marker; proceeding");
            None
        }
    };

    if stored.as_deref() == Some(latest) {
        tracing::info!(date = %latest, "remote revision unchanged");
        return false;
    }

    if let Err(err) = std::fs::write(marker_path, latest) {
        tracing::warn!(marker = %marker_path.display(), %err, "could not write revision marker");
    }
    tracing::info!(date = %latest, "remote revision changed; proceeding");
    true
}

fn fetch_latest_revision_date(client: &Client, history_url: &Url) -> anyhow::Result<String> {
    let html = fetch::fetch_html(client, history_url)?;
    let document = Html::parse_document(&html);
    let element = document
        .select(&CHANGE_DATE)
        .next()
        .ok_or_else(|| anyhow::anyhow!("no changes-list date element on history page"))?;
    let text = element.text().collect::<String>();
    Ok(dates::parse_revision_timestamp(text.trim())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_run_writes_the_marker_and_proceeds() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("last_updated.txt");

        assert!(marker_allows(&marker, "28/03/2025"));
        assert_eq!(std::fs::read_to_string(&marker).unwrap(), "28/03/2025");
    }

    #[test]
    fn matching_marker_skips_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("last_updated.txt");
        std::fs::write(&marker, "28/03/2025").unwrap();

        assert!(!marker_allows(&marker, "28/03/2025"));
        assert_eq!(std::fs::read_to_string(&marker).unwrap(), "28/03/2025");
    }

    #[test]
    fn changed_date_overwrites_the_marker() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("last_updated.txt");
        std::fs::write(&marker, "28/03/2025").unwrap();

        assert!(marker_allows(&marker, "29/03/2025"));
        assert_eq!(std::fs::read_to_string(&marker).unwrap(), "29/03/2025");
    }

    #[test]
    fn comparison_is_verbatim_not_calendar() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("last_updated.txt");
        std::fs::write(&marker, "28/3/2025").unwrap();

        // Same day, different formatting: treated as changed.
        assert!(marker_allows(&marker, "28/03/2025"));
    }

    #[test]
    fn trailing_whitespace_in_the_marker_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("last_updated.txt");
        std::fs::write(&marker, "28/03/2025\n").unwrap();

        assert!(!marker_allows(&marker, "28/03/2025"));
    }
}
