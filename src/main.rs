// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Set up logging (stderr, so JSON on stdout stays clean)
// 2. Parse command-line arguments using clap
// 3. Build the configuration (defaults < --config file < flags)
// 4. Dispatch to the appropriate subcommand handler
// 5. Exit with proper code (0 = success, 1 = broken links, 2 = error)
// =============================================================================

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::{CheckOptions, Cli, Commands};
use md_link_guardian::report::{
    broken_links_json, describe_outcome, print_broken_table, print_json, print_report, write_report,
};
use md_link_guardian::{source, CheckerConfig, LinkChecker};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("md_link_guardian=info")),
        )
        .init();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // If an unexpected error occurred, print it and exit with code 2
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = no broken links
//   Ok(1) = broken links found
//   Err   = fatal error (exit code 2)
async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            path,
            json,
            report,
            options,
        } => handle_check(&path, json, &report, &options).await,
        Commands::Url { url, options } => handle_url(&url, &options).await,
        Commands::Urls { urls, json, options } => handle_urls(&urls, json, &options).await,
    }
}

fn build_checker(options: &CheckOptions) -> Result<LinkChecker> {
    let config = match &options.config {
        Some(path) => CheckerConfig::load(path)?,
        None => CheckerConfig::default(),
    };
    let config = options.apply(config);
    Ok(LinkChecker::new(config)?)
}

// Handles the 'check' subcommand
async fn handle_check(
    target: &Path,
    json: bool,
    report_path: &Path,
    options: &CheckOptions,
) -> Result<i32> {
    let checker = build_checker(options)?;
    let target = std::fs::canonicalize(target)
        .with_context(|| format!("cannot access {}", target.display()))?;

    info!(target = %target.display(), "🔍 Starting link check");
    if checker.config().ignore_auth_walls {
        info!("🔐 Skipping GitHub pages behind a login");
    }
    if checker.config().explicit_links_only {
        info!("📝 Checking explicit links only");
    }

    let corpus = source::load_corpus(&target)
        .with_context(|| format!("cannot scan {}", target.display()))?;
    info!(files = corpus.files.len(), "📄 Found markdown files");

    let report = checker.check_corpus(&corpus).await?;

    if json {
        print_json(&report)?;
    } else {
        print_report(&report);
    }

    if report.success {
        return Ok(0);
    }

    write_report(&report, report_path)?;
    info!(path = %report_path.display(), "📝 Report saved");
    Ok(1)
}

// Handles the 'url' subcommand
async fn handle_url(url: &str, options: &CheckOptions) -> Result<i32> {
    let checker = build_checker(options)?;
    let outcome = checker.check_url(url).await;
    println!("{}", describe_outcome(&outcome));
    Ok(if outcome.is_broken() { 1 } else { 0 })
}

// Handles the 'urls' subcommand
async fn handle_urls(urls: &[String], json: bool, options: &CheckOptions) -> Result<i32> {
    let checker = build_checker(options)?;
    info!(count = urls.len(), "🌐 Checking links");

    let broken = checker.check_urls(urls).await?;

    if json {
        println!("{}", broken_links_json(&broken)?);
    } else if broken.is_empty() {
        println!("🎉 All links are working!");
    } else {
        print_broken_table(&broken);
    }

    Ok(if broken.is_empty() { 0 } else { 1 })
}
