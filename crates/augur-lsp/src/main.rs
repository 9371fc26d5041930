//! Augur Language Server Protocol (LSP) server
//!
//! Speaks JSON-RPC over stdio by default, or serves a single TCP client
//! with `--listen`. Diagnostics, completion, hover, go-to-definition,
//! signature help, and formatting for Augur source files.

use std::path::PathBuf;

use anyhow::Context;
use augur_lsp::server::AugurLspServer;
use clap::Parser;
use tower_lsp::{LspService, Server};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "augur-lsp", version, about = "Language server for Augur")]
struct Args {
    /// TCP address to listen on (e.g. 127.0.0.1:7777); stdio when absent
    #[arg(long)]
    listen: Option<String>,

    /// Append logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Keep the appender guard alive for the life of the process
    let _guard = init_tracing(args.log_file.as_deref())?;

    match args.listen {
        Some(addr) => serve_tcp(&addr).await,
        None => {
            tracing::info!("serving over stdio");
            let stdin = tokio::io::stdin();
            let stdout = tokio::io::stdout();
            let (service, socket) = LspService::new(AugurLspServer::new);
            Server::new(stdin, stdout, socket).serve(service).await;
            Ok(())
        }
    }
}

/// Serve one editor connection over TCP
async fn serve_tcp(addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "listening for an editor connection");

    let (stream, peer) = listener.accept().await.context("accept failed")?;
    tracing::info!(%peer, "editor connected");

    let (read, write) = tokio::io::split(stream);
    let (service, socket) = LspService::new(AugurLspServer::new);
    Server::new(read, write, socket).serve(service).await;
    Ok(())
}

/// Stderr logging by default; `--log-file` switches to a non-blocking
/// file writer (stdio transport owns stdout, and some editors treat
/// stderr output as noise).
fn init_tracing(
    log_file: Option<&std::path::Path>,
) -> anyhow::Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("augur_lsp=info,augur_syntax=info"));

    let (writer, guard) = match log_file {
        Some(path) => {
            if let Some(dir) = path.parent() {
                if !dir.as_os_str().is_empty() {
                    std::fs::create_dir_all(dir)
                        .with_context(|| format!("failed to create {}", dir.display()))?;
                }
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            (BoxMakeWriter::new(non_blocking), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stderr), None),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(guard)
}
