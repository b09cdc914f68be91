use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub renderer: RendererConfig,
    pub cache: CacheConfig,
    pub zoom: ZoomConfig,
    pub view: ViewConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RendererConfig {
    pub program: String,
    /// Arguments placed before the source path on every invocation.
    pub args: Vec<String>,
    pub output_file_name: String,
    pub temp_source_name: String,
    pub timeout_ms: u64,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            program: "xournalpp".to_string(),
            args: Vec::new(),
            output_file_name: "page.png".to_string(),
            temp_source_name: "temp.xopp".to_string(),
            timeout_ms: 120_000,
        }
    }
}

impl RendererConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CacheConfig {
    pub root: Option<PathBuf>,
    pub page_extensions: Vec<String>,
    pub orphan_min_age_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            root: None,
            page_extensions: vec!["png".to_string()],
            orphan_min_age_secs: 24 * 60 * 60,
        }
    }
}

impl CacheConfig {
    pub fn root_path(&self) -> PathBuf {
        self.root.clone().unwrap_or_else(default_cache_root)
    }

    pub fn orphan_min_age(&self) -> Duration {
        Duration::from_secs(self.orphan_min_age_secs)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(default)]
pub struct ZoomConfig {
    pub min: f32,
    pub max: f32,
    pub magnify_step: f32,
    pub minimize_step: f32,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min: 0.2,
            max: 3.0,
            magnify_step: 0.5,
            minimize_step: 0.1,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ViewConfig {
    pub resource_base_url: String,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            resource_base_url: "xpv-resource://cache/".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> AppResult<Self> {
        let Some(path) = default_config_path() else {
            return Ok(Self::default());
        };
        Self::load_from_path(path)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        if !path.is_file() {
            return Err(AppError::invalid_argument(format!(
                "config path is not a regular file: {}",
                path.display()
            )));
        }

        let raw = fs::read_to_string(path).map_err(|source| {
            AppError::io_with_context(source, format!("failed to read config: {}", path.display()))
        })?;
        let parsed = toml::from_str::<Self>(&raw).map_err(|source| {
            AppError::invalid_argument(format!(
                "failed to parse config {}: {source}",
                path.display()
            ))
        })?;
        Ok(parsed.sanitized())
    }

    fn sanitized(mut self) -> Self {
        let renderer_defaults = RendererConfig::default();
        if self.renderer.program.trim().is_empty() {
            self.renderer.program = renderer_defaults.program;
        }
        if !is_plain_file_name(&self.renderer.output_file_name) {
            self.renderer.output_file_name = renderer_defaults.output_file_name;
        }
        if !is_plain_file_name(&self.renderer.temp_source_name) {
            self.renderer.temp_source_name = renderer_defaults.temp_source_name;
        }
        self.renderer.timeout_ms = self.renderer.timeout_ms.max(1);

        let mut extensions: Vec<String> = self
            .cache
            .page_extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        extensions.dedup();
        if extensions.is_empty() {
            extensions = CacheConfig::default().page_extensions;
        }
        self.cache.page_extensions = extensions;

        let zoom_defaults = ZoomConfig::default();
        if !self.zoom.min.is_finite() || self.zoom.min <= 0.0 {
            self.zoom.min = zoom_defaults.min;
        }
        if !self.zoom.max.is_finite() || self.zoom.max < self.zoom.min {
            self.zoom.max = zoom_defaults.max.max(self.zoom.min);
        }
        if !self.zoom.magnify_step.is_finite() || self.zoom.magnify_step <= 0.0 {
            self.zoom.magnify_step = zoom_defaults.magnify_step;
        }
        if !self.zoom.minimize_step.is_finite() || self.zoom.minimize_step <= 0.0 {
            self.zoom.minimize_step = zoom_defaults.minimize_step;
        }

        if self.view.resource_base_url.trim().is_empty() {
            self.view.resource_base_url = ViewConfig::default().resource_base_url;
        }
        self
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

pub fn default_config_path() -> Option<PathBuf> {
    if let Some(explicit) = std::env::var_os("XPV_CONFIG_PATH")
        && !explicit.is_empty()
    {
        return Some(PathBuf::from(explicit));
    }

    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME")
        && !xdg.is_empty()
    {
        return Some(PathBuf::from(xdg).join("xpv").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME")
        && !home.is_empty()
    {
        return Some(
            PathBuf::from(home)
                .join(".config")
                .join("xpv")
                .join("config.toml"),
        );
    }
    if let Some(appdata) = std::env::var_os("APPDATA")
        && !appdata.is_empty()
    {
        return Some(PathBuf::from(appdata).join("xpv").join("config.toml"));
    }
    None
}

pub fn default_cache_root() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_CACHE_HOME")
        && !xdg.is_empty()
    {
        return PathBuf::from(xdg).join("xpv");
    }
    if let Some(home) = std::env::var_os("HOME")
        && !home.is_empty()
    {
        return PathBuf::from(home).join(".cache").join("xpv");
    }
    std::env::temp_dir().join("xpv")
}
