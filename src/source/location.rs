use std::fmt;
use std::path::PathBuf;

use url::Url;

use crate::error::{AppError, AppResult};

/// Where a document lives: a path on this machine or a URI that only the
/// host can read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    Local(PathBuf),
    Remote(Url),
}

impl SourceLocation {
    /// Accepts bare paths, `file:` URIs and any other absolute URI.
    ///
    /// Single-letter schemes are treated as Windows drive letters, so
    /// `C:\notes\a.xopp` stays a local path.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(AppError::invalid_argument("resource location must not be empty"));
        }

        match Url::parse(raw) {
            Ok(url) if url.scheme() == "file" => {
                let path = url.to_file_path().map_err(|()| {
                    AppError::invalid_argument(format!("file URI has no local path: {raw}"))
                })?;
                Ok(Self::Local(path))
            }
            Ok(url) if url.scheme().len() > 1 => Ok(Self::Remote(url)),
            _ => Ok(Self::Local(PathBuf::from(raw))),
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }

    pub fn scheme(&self) -> &str {
        match self {
            Self::Local(_) => "file",
            Self::Remote(url) => url.scheme(),
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(path) => write!(f, "{}", path.display()),
            Self::Remote(url) => write!(f, "{url}"),
        }
    }
}
