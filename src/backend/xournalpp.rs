use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use futures_util::future::BoxFuture;
use tokio::process::Command;

use crate::config::RendererConfig;
use crate::error::{AppError, AppResult};

use super::traits::{Rasterizer, RenderRequest};

/// Runs the `xournalpp` command line exporter:
/// `xournalpp <source> -i <dir>/page.png`, which writes one PNG per page.
#[derive(Debug, Clone)]
pub struct XournalppRasterizer {
    program: String,
    leading_args: Vec<String>,
    output_file_name: String,
    timeout: Duration,
}

impl XournalppRasterizer {
    pub fn from_config(config: &RendererConfig) -> Self {
        Self {
            program: config.program.clone(),
            leading_args: config.args.clone(),
            output_file_name: config.output_file_name.clone(),
            timeout: config.timeout(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn command_args(&self, source: &Path, output_dir: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.leading_args.iter().map(OsString::from).collect();
        args.push(source.as_os_str().to_os_string());
        args.push(OsString::from("-i"));
        args.push(output_dir.join(&self.output_file_name).into_os_string());
        args
    }

    async fn run(&self, request: RenderRequest<'_>) -> AppResult<()> {
        if request.cancel.is_canceled() {
            return Err(AppError::Canceled);
        }

        let mut command = Command::new(&self.program);
        command
            .args(self.command_args(request.source, request.output_dir))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = command.spawn().map_err(|source| {
            AppError::io_with_context(
                source,
                format!("failed to start renderer '{}'", self.program),
            )
        })?;
        tracing::debug!(
            program = %self.program,
            source = %request.source.display(),
            output_dir = %request.output_dir.display(),
            "renderer started"
        );

        let started = Instant::now();
        // Dropping the wait future drops the child, which kills it.
        let output = tokio::select! {
            biased;
            () = request.cancel.canceled() => {
                tracing::info!(
                    source = %request.source.display(),
                    "render canceled, renderer killed"
                );
                return Err(AppError::Canceled);
            }
            waited = tokio::time::timeout(self.timeout, child.wait_with_output()) => match waited {
                Ok(output) => output.map_err(|source| {
                    AppError::io_with_context(source, "failed to wait for renderer")
                })?,
                Err(_) => {
                    tracing::warn!(
                        source = %request.source.display(),
                        timeout_ms = self.timeout.as_millis() as u64,
                        "renderer timed out, killed"
                    );
                    return Err(AppError::RenderTimeout { limit: self.timeout });
                }
            },
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            return Err(AppError::render(output.status.code(), stderr));
        }

        tracing::debug!(
            source = %request.source.display(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "renderer finished"
        );
        Ok(())
    }
}

impl Rasterizer for XournalppRasterizer {
    fn name(&self) -> &str {
        "xournalpp"
    }

    fn render<'a>(&'a self, request: RenderRequest<'a>) -> BoxFuture<'a, AppResult<()>> {
        Box::pin(self.run(request))
    }
}
