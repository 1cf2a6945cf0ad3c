use clap::{Args, Parser, Subcommand};

pub const DEFAULT_BASE_URL: &str = "https://he.wikisource.org";
pub const DEFAULT_LISTING_TITLE: &str = "ספר החוקים הפתוח";

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Full pipeline: change gate, listing scrape, save and convert.
    Harvest(HarvestArgs),
    /// Classify the listing page and print its law links.
    Links(LinksArgs),
    /// Process a pre-vetted two-column table of pages.
    Import(ImportArgs),
    /// Report whether the remote listing changed since the last run.
    Check(CheckArgs),
}

#[derive(Debug, Args)]
pub struct HarvestArgs {
    /// Site origin hosting the wiki.
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Listing page title to scrape for law links.
    #[arg(long, default_value = DEFAULT_LISTING_TITLE)]
    pub title: String,

    /// Output directory for HTML and converted documents.
    #[arg(long, default_value = "extracted_rules")]
    pub out: String,

    /// Revision marker file consulted by the change gate.
    #[arg(long, default_value = "last_updated.txt")]
    pub marker: String,

    /// Delay between successive page fetches.
    #[arg(long, default_value_t = 500)]
    pub delay_ms: u64,

    /// Maximum entries to process.
    #[arg(long)]
    pub limit: Option<usize>,

    /// Replace cross-reference links inside law-number containers with
    /// inert labels.
    #[arg(long)]
    pub demote_law_refs: bool,

    /// Converter binary used for the word-processor artifact.
    #[arg(long, default_value = "pandoc")]
    pub pandoc: String,

    /// Skip the change gate and always harvest.
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct LinksArgs {
    /// Site origin hosting the wiki.
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Listing page title to scrape for law links.
    #[arg(long, default_value = DEFAULT_LISTING_TITLE)]
    pub title: String,

    /// Optional JSONL report path.
    #[arg(long)]
    pub report: Option<String>,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Site origin hosting the wiki.
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Input table: one row per page, `key<TAB>page title`.
    #[arg(long)]
    pub list: String,

    /// Output directory for HTML and converted documents.
    #[arg(long, default_value = "extracted_rules")]
    pub out: String,

    /// Delay between successive page fetches.
    #[arg(long, default_value_t = 500)]
    pub delay_ms: u64,

    /// Maximum entries to process.
    #[arg(long)]
    pub limit: Option<usize>,

    /// Keep cross-reference links inside law-number containers instead of
    /// demoting them to inert labels.
    #[arg(long)]
    pub keep_law_refs: bool,

    /// Converter binary used for the word-processor artifact.
    #[arg(long, default_value = "pandoc")]
    pub pandoc: String,
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Site origin hosting the wiki.
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Listing page title whose history is checked.
    #[arg(long, default_value = DEFAULT_LISTING_TITLE)]
    pub title: String,

    /// Revision marker file consulted by the change gate.
    #[arg(long, default_value = "last_updated.txt")]
    pub marker: String,
}
