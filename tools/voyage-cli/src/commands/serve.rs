//! Serve a site over HTTP.

use std::sync::Arc;

use anyhow::{Context as _, Result};
use tokio::net::TcpListener;
use voyage_observability::init_logging;
use voyage_server::{serve_listener, PipelineController};

use super::ServeArgs;
use crate::context::Context;

/// Run the serve command.
pub async fn run(args: ServeArgs, ctx: &Context) -> Result<()> {
    let registered = ctx.site()?;
    let config = ctx.site_config(&registered);
    let server = &ctx.config.server;

    let mode = args.mode.unwrap_or(server.mode);
    let host = args.host.unwrap_or_else(|| server.host.clone());
    let port = args.port.unwrap_or(server.port);

    init_logging(&ctx.config.log_config(mode)).context("Failed to initialize logging")?;

    ctx.output.header(&format!("Serving {}", config.name));
    ctx.output.kv("Mode", mode.as_str());
    ctx.output.kv("Root", &config.root.display().to_string());
    ctx.output.debug(&format!("Render timeout: {:?}", config.render_timeout));

    let controller = Arc::new(PipelineController::new(config, Arc::clone(&registered.site)));
    controller
        .boot(mode)
        .await
        .with_context(|| format!("Failed to boot the pipeline in {} mode", mode))?;

    let listener = TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", host, port))?;
    let local = listener.local_addr().context("Failed to read listener address")?;
    ctx.output.success(&format!("Listening on http://{}", local));

    serve_listener(controller, listener, async {
        // A failed signal handler just means we run until killed.
        let _ = tokio::signal::ctrl_c().await;
    })
    .await?;

    ctx.output.info("Server stopped");
    Ok(())
}
