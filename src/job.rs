use crate::config::SliceConfig;
use std::path::{Path, PathBuf};

// File name scanning
// -----------------------------------------------------------------------------
// Both `/` and `\` count as separators regardless of platform, so a batch built
// on one OS names its outputs the same way on another.

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Byte range `[start, end)` of the base name inside `path`.
///
/// The name starts just after the last separator and stops at the last `.`
/// that follows it, or at the end of the string when there is none.
pub fn split_file_name(path: &str) -> (usize, usize) {
    let start = path.rfind(is_separator).map_or(0, |i| i + 1);
    let end = path[start..].rfind('.').map_or(path.len(), |i| start + i);
    (start, end)
}

pub fn base_name(path: &str) -> &str {
    let (start, end) = split_file_name(path);
    &path[start..end]
}

/// Text after the base name's dot; empty when there is no dot.
pub fn extension(path: &str) -> &str {
    let (_, end) = split_file_name(path);
    path.get(end + 1..).unwrap_or("")
}

// Jobs
// -----------------------------------------------------------------------------

/// Where one source image's slices go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageJob {
    pub source_path: PathBuf,
    pub base_name: String,
    pub output_directory: PathBuf,
    /// `output_directory/base_name_`; slice `i` is written to `{output_prefix}{i}.png`.
    pub output_prefix: PathBuf,
}

impl ImageJob {
    pub fn new(source_path: &Path, config: &SliceConfig) -> Self {
        let path_text = source_path.to_string_lossy();
        let base = base_name(&path_text).to_string();

        let output_directory = if config.per_image_subdir {
            config.destination_root.join(&base)
        } else {
            config.destination_root.clone()
        };
        let output_prefix = output_directory.join(format!("{base}_"));

        Self {
            source_path: source_path.to_path_buf(),
            base_name: base,
            output_directory,
            output_prefix,
        }
    }

    pub fn slice_path(&self, index: usize) -> PathBuf {
        let mut path = self.output_prefix.clone().into_os_string();
        path.push(format!("{index}.png"));
        PathBuf::from(path)
    }
}
