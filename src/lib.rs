#![forbid(unsafe_code)]

//! Scraper for the Hebrew Wikisource open book of laws: classifies listing
//! links, sanitizes law pages into standalone HTML, caches them by content
//! fingerprint, and converts new artifacts to docx.

pub mod classify;
pub mod cli;
pub mod convert;
pub mod dates;
pub mod errors;
pub mod fetch;
pub mod gate;
pub mod harvest;
pub mod links;
pub mod logging;
pub mod sanitize;
pub mod store;
