use anyhow::{Context, Result};
use log::{info, warn};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: Output directory and file naming utilities

/// Extension of subtitle outputs; also the marker used for the existing-ID scan
pub const VTT_EXTENSION: &str = "vtt";

/// Extension of plain-text outputs
pub const TXT_EXTENSION: &str = "txt";

// @const: Byte budget for the sanitized title part of a file name
const MAX_TITLE_BYTES: usize = 200;

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
        }
        Ok(())
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    // @generates: "<id:04> <sanitized title>" base name shared by both outputs
    pub fn output_base_name(id: u32, title: &str) -> String {
        format!("{:04} {}", id, sanitize_filename(title))
    }

    // @generates: Output path for one artifact of a video
    pub fn generate_output_path<P: AsRef<Path>>(output_dir: P, id: u32, title: &str, extension: &str) -> PathBuf {
        let mut file_name = Self::output_base_name(id, title);
        file_name.push('.');
        file_name.push_str(extension);
        output_dir.as_ref().join(file_name)
    }

    /// Collect the IDs of videos whose subtitle file is already in `dir`
    ///
    /// A missing directory yields an empty index. Files whose leading token is
    /// not a number are reported and skipped.
    pub fn scan_existing_ids<P: AsRef<Path>>(dir: P) -> Result<BTreeSet<u32>> {
        let dir = dir.as_ref();
        let mut existing_ids = BTreeSet::new();

        if !Self::dir_exists(dir) {
            return Ok(existing_ids);
        }

        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.context("Failed to read directory entry")?;
            if !entry.file_type().is_file() {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy();
            if !file_name.ends_with(&format!(".{}", VTT_EXTENSION)) {
                continue;
            }

            match parse_leading_id(&file_name) {
                Some(id) => {
                    existing_ids.insert(id);
                }
                None => warn!("Skipped {}.", file_name),
            }
        }

        if !existing_ids.is_empty() {
            info!("Found {} already existing videos. Will skip them.", existing_ids.len());
        }

        Ok(existing_ids)
    }
}

/// Parse the ID at the start of an output file name
///
/// The name is split on the first run of whitespace; the token before it must
/// consist of ASCII digits only.
pub fn parse_leading_id(file_name: &str) -> Option<u32> {
    let token = file_name.split_whitespace().next()?;
    if !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

/// Make a title safe to use as part of a file name
///
/// Path separators, NUL and control characters are removed, trailing dots and
/// whitespace are trimmed and the result is cut to a fixed byte budget.
pub fn sanitize_filename(title: &str) -> String {
    let cleaned: String = title.chars()
        .filter(|c| !matches!(c, '/' | '\\' | '\0' | ':' | '*' | '?' | '"' | '<' | '>') && !c.is_control())
        .collect();

    let mut end = cleaned.len().min(MAX_TITLE_BYTES);
    while !cleaned.is_char_boundary(end) {
        end -= 1;
    }

    let trimmed = cleaned[..end].trim_end_matches(|c: char| c == '.' || c.is_whitespace());
    if trimmed.trim().is_empty() {
        "untitled".to_string()
    } else {
        trimmed.to_string()
    }
}
