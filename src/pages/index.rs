use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageArtifact {
    pub ordinal: u64,
    pub file_name: String,
    pub path: PathBuf,
}

/// Numeric value of the first run of ASCII digits in `file_name`.
///
/// `None` when the name has no digits; `Some(Err(_))` when the run does not
/// fit in a `u64`.
pub fn page_ordinal(file_name: &str) -> Option<Result<u64, std::num::ParseIntError>> {
    let start = file_name.find(|ch: char| ch.is_ascii_digit())?;
    let rest = &file_name[start..];
    let len = rest
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(rest.len());
    Some(rest[..len].parse::<u64>())
}

fn has_page_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|known| known.eq_ignore_ascii_case(ext)))
}

/// Page images in `dir`, ascending by the ordinal embedded in each name.
pub fn list_ordered(dir: &Path, extensions: &[String]) -> AppResult<Vec<PageArtifact>> {
    let entries = fs::read_dir(dir).map_err(|source| {
        AppError::io_with_context(source, format!("failed to list {}", dir.display()))
    })?;

    let mut pages = Vec::new();
    let mut seen = HashSet::new();
    for entry in entries {
        let entry = entry.map_err(|source| {
            AppError::io_with_context(source, format!("failed to list {}", dir.display()))
        })?;
        let path = entry.path();
        if !has_page_extension(&path, extensions) {
            continue;
        }
        if !entry.file_type().is_ok_and(|kind| kind.is_file()) {
            continue;
        }

        let raw_name = entry.file_name();
        let Some(file_name) = raw_name.to_str() else {
            return Err(AppError::parse(
                raw_name.to_string_lossy(),
                "file name is not valid UTF-8",
            ));
        };
        let ordinal = match page_ordinal(file_name) {
            None => return Err(AppError::parse(file_name, "no page number in file name")),
            Some(Err(err)) => {
                return Err(AppError::parse(
                    file_name,
                    format!("page number out of range: {err}"),
                ));
            }
            Some(Ok(ordinal)) => ordinal,
        };
        if !seen.insert(ordinal) {
            return Err(AppError::parse(
                file_name,
                format!("page number {ordinal} appears more than once"),
            ));
        }

        pages.push(PageArtifact {
            ordinal,
            file_name: file_name.to_string(),
            path,
        });
    }

    pages.sort_by_key(|page| page.ordinal);
    Ok(pages)
}
