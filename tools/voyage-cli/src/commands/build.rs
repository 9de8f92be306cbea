//! Build the site for production.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context as _, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use voyage_server::{build_site, BuildReport};

use super::BuildArgs;
use crate::context::Context;
use crate::output::{format_bytes, format_duration};

/// Machine-readable build result.
#[derive(Serialize)]
struct BuildSummary {
    #[serde(flatten)]
    report: BuildReport,
    built_at: DateTime<Utc>,
    elapsed_ms: u128,
}

/// Run the build command.
pub async fn run(args: BuildArgs, ctx: &Context) -> Result<()> {
    let registered = ctx.site()?;
    let mut config = ctx.site_config(&registered);
    if let Some(dist) = args.dist_dir {
        // `join` keeps absolute paths as they are.
        config = config.with_dist_dir(ctx.cwd.join(PathBuf::from(dist)));
    }

    ctx.output.header(&format!("Building {}", config.name));
    ctx.output.step(1, 2, "Compiling modules and hashing assets");

    let spinner = ctx.output.spinner("Building...");
    let started = Instant::now();
    let site = Arc::clone(&registered.site);
    let build_config = config.clone();
    let result = tokio::task::spawn_blocking(move || build_site(site.as_ref(), &build_config))
        .await
        .context("Build task failed")?;
    spinner.finish_and_clear();
    let report = result.context("Build failed")?;
    let elapsed = started.elapsed();

    if ctx.output.is_json() {
        ctx.output.json(&BuildSummary {
            report,
            built_at: Utc::now(),
            elapsed_ms: elapsed.as_millis(),
        });
        return Ok(());
    }

    ctx.output.step(2, 2, "Wrote build output");
    ctx.output.kv("Fingerprint", &report.fingerprint);
    ctx.output.kv("Routes", &report.routes.to_string());
    ctx.output.kv("Pages", &report.pages.to_string());
    ctx.output.kv("Data modules", &report.data.to_string());
    ctx.output.kv("Assets", &report.assets.to_string());
    let bundle_size = std::fs::metadata(&report.bundle).map(|m| m.len()).unwrap_or_default();
    ctx.output.kv(
        "Bundle",
        &format!("{} ({})", report.bundle.display(), format_bytes(bundle_size)),
    );
    ctx.output.kv("Shell", &report.template.display().to_string());

    ctx.output.success(&format!("Build complete in {}", format_duration(elapsed)));
    Ok(())
}
