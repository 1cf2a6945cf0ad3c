//! Typed errors for the harvest pipeline.
//!
//! Per-entry failures use `thiserror` so the pipeline loop can match on the
//! failure class; command-level plumbing stays on `anyhow`.

use thiserror::Error;

/// HTTP fetch failures. Logged with the offending URL; the entry is skipped.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed for {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected status {status} for {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

/// A revision timestamp that could not be reduced to `dd/MM/yyyy`.
#[derive(Debug, Error)]
pub enum DateParseError {
    #[error("no day/month/year triple in {0:?}")]
    MissingTriple(String),

    #[error("unknown Hebrew month name: {0:?}")]
    UnknownMonth(String),

    #[error("not a calendar date: {day:02}/{month:02}/{year}")]
    OutOfRange { day: u32, month: u32, year: i32 },
}

/// The fetched page has no primary content container.
#[derive(Debug, Error)]
#[error("page has no primary content container")]
pub struct NoContentError;

/// External converter failures. The HTML artifact is kept either way.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("converter binary not found: {program}")]
    MissingConverter { program: String },

    #[error("converter exited with {status}: {stderr}")]
    Failed {
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("converter timed out after {0:?}")]
    TimedOut(std::time::Duration),

    #[error("converter io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything that can take down a single entry. Caught at the pipeline
/// loop boundary; never aborts the run.
#[derive(Debug, Error)]
pub enum EntryError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    NoContent(#[from] NoContentError),

    #[error("{0}")]
    Write(anyhow::Error),
}

impl From<anyhow::Error> for EntryError {
    fn from(err: anyhow::Error) -> Self {
        Self::Write(err)
    }
}
