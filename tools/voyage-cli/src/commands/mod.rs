//! CLI command implementations.

pub mod build;
pub mod check;
pub mod routes;
pub mod serve;

use clap::Args;
use voyage_core::RenderMode;

/// Arguments for the serve command.
#[derive(Args)]
pub struct ServeArgs {
    /// Render mode (`development` or `production`). Overrides VOYAGE_MODE.
    #[arg(short, long)]
    pub mode: Option<RenderMode>,

    /// Port to listen on. Overrides PORT.
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Host to bind.
    #[arg(long)]
    pub host: Option<String>,
}

/// Arguments for the build command.
#[derive(Args)]
pub struct BuildArgs {
    /// Output directory (default: `<site root>/dist`).
    #[arg(short, long)]
    pub dist_dir: Option<String>,
}

/// Arguments for the routes command.
#[derive(Args)]
pub struct RoutesArgs {
    /// Show which route a URL resolves to.
    #[arg(short, long)]
    pub resolve: Option<String>,
}

/// Arguments for the check command.
#[derive(Args)]
pub struct CheckArgs {
    /// URLs to check (default: every static route).
    pub urls: Vec<String>,
}
