use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;

use xpv::app::Previewer;
use xpv::backend::CancelToken;
use xpv::config::Config;
use xpv::document::{DocumentHandle, OpenContext};
use xpv::error::{AppError, AppResult};
use xpv::logging::init_tracing;
use xpv::pages::PageArtifact;

#[derive(Debug, Parser)]
#[command(name = "xpv", version, about = "Render Xournal++ notes into cached page images")]
struct Cli {
    /// Config file (defaults to $XPV_CONFIG_PATH or ~/.config/xpv/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Render a document and list its pages in order.
    Render {
        uri: String,
        /// Backup revision to render instead of URI.
        #[arg(long)]
        backup: Option<String>,
        /// Leave the cache directory in place after listing.
        #[arg(long)]
        keep: bool,
        #[arg(long)]
        json: bool,
    },
    /// Render a document and emit its HTML page view. The cache is kept.
    View {
        uri: String,
        #[arg(long)]
        backup: Option<String>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Remove cache directories left behind by earlier runs.
    Reap {
        #[arg(long)]
        min_age_secs: Option<u64>,
    },
}

#[derive(Serialize)]
struct RenderReport<'a> {
    source: String,
    cache_dir: Option<PathBuf>,
    pages: &'a [PageArtifact],
}

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if let Err(err) = run(cli).await {
        eprintln!("{err}");
        std::process::exit(exit_code(&err));
    }
}

/// 2 when the exporter rejected or hung on the document, 1 otherwise.
fn exit_code(err: &AppError) -> i32 {
    if err.is_render_failure() { 2 } else { 1 }
}

async fn run(cli: Cli) -> AppResult<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };

    match cli.command {
        CliCommand::Render {
            uri,
            backup,
            keep,
            json,
        } => {
            let previewer = Previewer::new(config);
            let handle = open_with_interrupt(&previewer, &uri, backup).await?;
            let pages = match previewer.pages(&handle) {
                Ok(pages) => pages,
                Err(err) => {
                    handle.dispose().await;
                    return Err(err);
                }
            };
            print_pages(&handle, &pages, json)?;
            if keep {
                if let Some(dir) = handle.keep() {
                    eprintln!("pages kept in {}", dir.display());
                }
            } else {
                handle.release().await?;
            }
            Ok(())
        }
        CliCommand::View { uri, backup, out } => {
            let previewer = Previewer::new(config);
            let handle = open_with_interrupt(&previewer, &uri, backup).await?;
            let mapper = previewer.url_mapper()?;
            let html = match previewer.page_view(&handle, &mapper) {
                Ok(html) => html,
                Err(err) => {
                    handle.dispose().await;
                    return Err(err);
                }
            };
            match out {
                Some(path) => tokio::fs::write(&path, html).await.map_err(|source| {
                    AppError::io_with_context(source, format!("failed to write {}", path.display()))
                })?,
                None => println!("{html}"),
            }
            if let Some(dir) = handle.keep() {
                eprintln!("pages kept in {}", dir.display());
            }
            Ok(())
        }
        CliCommand::Reap { min_age_secs } => {
            if let Some(min_age_secs) = min_age_secs {
                config.cache.orphan_min_age_secs = min_age_secs;
            }
            let previewer = Previewer::new(config);
            let report = previewer.reap_orphans()?;
            println!(
                "removed {} cache directories ({} failed)",
                report.removed, report.failed
            );
            Ok(())
        }
    }
}

async fn open_with_interrupt(
    previewer: &Previewer,
    uri: &str,
    backup: Option<String>,
) -> AppResult<DocumentHandle> {
    let cancel = CancelToken::new();
    let interrupt = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });
    let context = OpenContext { backup_id: backup };
    let opened = previewer.open(uri, &context, &cancel).await;
    interrupt.abort();
    opened
}

fn print_pages(handle: &DocumentHandle, pages: &[PageArtifact], json: bool) -> AppResult<()> {
    if json {
        let report = RenderReport {
            source: handle.source().to_string(),
            cache_dir: handle.cache_dir().map(|dir| dir.to_path_buf()),
            pages,
        };
        let encoded = serde_json::to_string_pretty(&report)
            .map_err(|err| AppError::invalid_argument(format!("failed to encode pages: {err}")))?;
        println!("{encoded}");
        return Ok(());
    }

    if pages.is_empty() {
        println!("{}: no pages", handle.source());
    }
    for page in pages {
        println!("{}\t{}", page.ordinal, page.path.display());
    }
    Ok(())
}
