//! Voyage CLI - command line tool for the render pipeline.
//!
//! Commands:
//! - `voyage serve` - Serve a site in development or production mode
//! - `voyage build` - Build the render bundle and client assets
//! - `voyage routes` - Print the route table
//! - `voyage check` - Render every static route and verify it hydrates

mod commands;
mod config;
mod context;
mod output;
mod sites;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{BuildArgs, CheckArgs, RoutesArgs, ServeArgs};

/// Voyage CLI - Serve, build and verify server-rendered sites
#[derive(Parser)]
#[command(name = "voyage")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the site over HTTP
    Serve(ServeArgs),

    /// Build the site for production
    Build(BuildArgs),

    /// Print the route table
    Routes(RoutesArgs),

    /// Render static routes and verify they hydrate
    Check(CheckArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let output = output::Output::new(cli.verbose, cli.json);

    let ctx = match context::Context::load(cli.config.as_deref(), output.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            output.error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Serve(args) => commands::serve::run(args, &ctx).await,
        Commands::Build(args) => commands::build::run(args, &ctx).await,
        Commands::Routes(args) => commands::routes::run(args, &ctx).await,
        Commands::Check(args) => commands::check::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
