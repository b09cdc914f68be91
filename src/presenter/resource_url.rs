use url::Url;

use crate::document::DocumentHandle;
use crate::error::{AppError, AppResult};
use crate::pages::PageArtifact;

/// Maps a page image to the URL a sandboxed display surface can load.
pub trait ResourceUrlMapper {
    fn page_url(&self, handle: &DocumentHandle, page: &PageArtifact) -> AppResult<String>;
}

/// `<base><cache dir name>/<file name>`, percent-encoded.
#[derive(Debug, Clone)]
pub struct VirtualUrlMapper {
    base: Url,
}

impl VirtualUrlMapper {
    pub fn new(base: &str) -> AppResult<Self> {
        let mut base = Url::parse(base).map_err(|err| {
            AppError::invalid_argument(format!("invalid resource base URL '{base}': {err}"))
        })?;
        if base.cannot_be_a_base() {
            return Err(AppError::invalid_argument(format!(
                "resource base URL cannot hold paths: {base}"
            )));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { base })
    }

    pub fn base(&self) -> &str {
        self.base.as_str()
    }
}

impl ResourceUrlMapper for VirtualUrlMapper {
    fn page_url(&self, handle: &DocumentHandle, page: &PageArtifact) -> AppResult<String> {
        let (Some(dir), Some(dir_name)) = (handle.cache_dir(), handle.cache_dir_name()) else {
            return Err(AppError::invalid_argument("document has no rendered pages"));
        };
        if page.path.parent() != Some(dir) {
            return Err(AppError::invalid_argument(format!(
                "page {} is outside the document cache",
                page.path.display()
            )));
        }
        let name = page.file_name.as_str();
        let names_match = page
            .path
            .file_name()
            .and_then(|raw| raw.to_str())
            .is_some_and(|raw| raw == name);
        if name.is_empty()
            || name == "."
            || name == ".."
            || name.contains(['/', '\\'])
            || !names_match
        {
            return Err(AppError::invalid_argument(format!(
                "page file name cannot be mapped: {name:?}"
            )));
        }

        Ok(format!(
            "{}{}/{}",
            self.base,
            urlencoding::encode(dir_name),
            urlencoding::encode(name)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::VirtualUrlMapper;

    #[test]
    fn base_gets_a_trailing_slash() {
        let mapper = VirtualUrlMapper::new("xpv-resource://cache").expect("base should parse");
        assert_eq!(mapper.base(), "xpv-resource://cache/");

        let nested = VirtualUrlMapper::new("https://host/ext/cache").expect("base should parse");
        assert_eq!(nested.base(), "https://host/ext/cache/");
    }

    #[test]
    fn invalid_bases_are_rejected() {
        assert!(VirtualUrlMapper::new("not a url").is_err());
        assert!(VirtualUrlMapper::new("mailto:someone@example.com").is_err());
    }
}
