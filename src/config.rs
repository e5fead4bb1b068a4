use crate::normalize::DEFAULT_SITE_ORIGIN;
use std::path::{Path, PathBuf};

pub const DEFAULT_FILE_PATTERN: &str = r"(?i)\.json$";

/// User-facing options with sensible defaults and builder chaining.
#[derive(Clone, Debug)]
pub struct FlattenOptions {
    pub input_dir: PathBuf,
    pub file_pattern: String,         // regex matched against file names
    pub recursive: bool,              // descend into subdirectories
    pub parallelism: Option<usize>,   // Some(N) to set rayon threads, None to use default
    pub parallel_documents: bool,     // normalize documents on the rayon pool
    pub progress: bool,               // show progress bar
    pub progress_label: Option<String>,

    // IO tuning
    pub read_buffer_bytes: usize,
    pub write_buffer_bytes: usize,

    // output formatting
    pub human_readable_timestamps: bool, // created_utc as RFC3339 strings
    pub site_origin: String,             // prefix for comment permalinks
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("./reddit_jsons"),
            file_pattern: DEFAULT_FILE_PATTERN.to_string(),
            recursive: false,
            parallelism: None,
            parallel_documents: true,
            progress: true,
            progress_label: None,

            read_buffer_bytes: 256 * 1024,
            write_buffer_bytes: 256 * 1024,

            human_readable_timestamps: false,
            site_origin: DEFAULT_SITE_ORIGIN.to_string(),
        }
    }
}

impl FlattenOptions {
    pub fn with_input_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.input_dir = dir.as_ref().to_path_buf();
        self
    }
    pub fn with_file_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.file_pattern = pattern.into();
        self
    }
    pub fn with_recursive(mut self, yes: bool) -> Self {
        self.recursive = yes;
        self
    }
    pub fn with_parallelism(mut self, threads: usize) -> Self {
        self.parallelism = Some(threads);
        self
    }
    pub fn with_parallel_documents(mut self, yes: bool) -> Self {
        self.parallel_documents = yes;
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }
    pub fn with_progress_label(mut self, label: impl Into<String>) -> Self {
        self.progress_label = Some(label.into());
        self
    }
    pub fn with_io_read_buffer(mut self, bytes: usize) -> Self {
        self.read_buffer_bytes = bytes.max(8 * 1024);
        self
    }
    pub fn with_io_write_buffer(mut self, bytes: usize) -> Self {
        self.write_buffer_bytes = bytes.max(8 * 1024);
        self
    }
    pub fn with_human_timestamps(mut self, yes: bool) -> Self {
        self.human_readable_timestamps = yes;
        self
    }
    pub fn with_site_origin(mut self, origin: impl Into<String>) -> Self {
        self.site_origin = origin.into();
        self
    }
}
