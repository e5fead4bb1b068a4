use clap::{Parser, ValueEnum};
use retl_threads::{ExportFormat, DEFAULT_FILE_PATTERN, DEFAULT_SITE_ORIGIN};
use std::path::PathBuf;

pub const DATA_ROOT: &str = "./reddit_jsons";
pub const OUTPUT_FILE: &str = "reddit_combined.csv";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Csv,
    Jsonl,
    Json,
    JsonPretty,
    Zst,
}

impl From<FormatArg> for ExportFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Csv => ExportFormat::Csv,
            FormatArg::Jsonl => ExportFormat::Jsonl,
            FormatArg::Json => ExportFormat::Json { pretty: false },
            FormatArg::JsonPretty => ExportFormat::Json { pretty: true },
            FormatArg::Zst => ExportFormat::Zst,
        }
    }
}

/// Flatten a folder of archived Reddit thread documents into one table.
#[derive(Debug, Parser)]
#[command(name = "retl-threads", version, about)]
pub struct Args {
    /// Folder holding the thread documents
    #[arg(default_value = DATA_ROOT)]
    pub input_dir: PathBuf,

    /// Output file; the format follows the extension unless --format is given
    #[arg(default_value = OUTPUT_FILE)]
    pub output: PathBuf,

    /// Descend into subfolders
    #[arg(short, long)]
    pub recursive: bool,

    /// Regex matched against file names
    #[arg(long, default_value = DEFAULT_FILE_PATTERN)]
    pub pattern: String,

    /// Origin prefixed to comment permalinks
    #[arg(long, default_value = DEFAULT_SITE_ORIGIN)]
    pub site_origin: String,

    /// Write created_utc as RFC 3339 instead of epoch seconds
    #[arg(long)]
    pub human_timestamps: bool,

    /// Output format (overrides the extension)
    #[arg(short, long, value_enum)]
    pub format: Option<FormatArg>,

    /// Worker threads (default: available cores)
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,

    /// Normalize documents one at a time
    #[arg(long)]
    pub sequential: bool,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

impl Args {
    pub fn export_format(&self) -> Option<ExportFormat> {
        self.format.map(ExportFormat::from)
    }
}
