//! `geowl serve` - Answer reverse-proxy subrequests.

use anyhow::{Context as _, Result};
use geowl::Gatekeeper;
use tokio::net::TcpListener;
use tracing::{error, info};

use super::Context;
use crate::cli::args::ServeArgs;
use crate::server;

pub async fn execute(ctx: Context, args: ServeArgs) -> Result<()> {
    let engine = ctx.engine_config()?;
    let gate = ctx.gatekeeper(&engine).await?;

    let addr = args.listen.unwrap_or(engine.listen);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    #[cfg(unix)]
    tokio::spawn(reload_on_hangup(ctx, gate.clone()));

    server::serve(listener, gate, shutdown_signal()).await?;
    info!("stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "unable to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

/// Re-read the whitelist file on SIGHUP
#[cfg(unix)]
async fn reload_on_hangup(ctx: Context, gate: Gatekeeper) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangups = match signal(SignalKind::hangup()) {
        Ok(stream) => stream,
        Err(e) => {
            error!(error = %e, "unable to listen for SIGHUP, whitelist reload disabled");
            return;
        }
    };

    while hangups.recv().await.is_some() {
        let reloaded = ctx
            .whitelist()
            .and_then(|whitelist| gate.reload(&whitelist).map_err(Into::into));
        match reloaded {
            Ok(()) => info!(path = %ctx.whitelist_path.display(), "whitelist reloaded"),
            Err(e) => error!(error = %e, "whitelist reload failed, keeping current policy"),
        }
    }
}
