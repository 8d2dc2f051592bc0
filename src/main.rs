// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments and set up logging
// 2. Validate the configuration (bad seeds fail before any request)
// 3. Crawl from the seed; Ctrl-C stops the crawl early but keeps results
// 4. Write the report file and print the results
// 5. Exit with proper code (0 = success, 1 = broken links, 2 = error)
// =============================================================================

mod checker; // src/checker/ - fetching pages and extracting links
mod cli; // src/cli.rs - command-line parsing
mod config; // src/config.rs - validated crawl settings
mod crawl; // src/crawl/ - the concurrent crawl engine
mod report; // src/report.rs - report file and console output

use anyhow::{Context, Result};
use checker::HttpFetcher;
use clap::Parser;
use cli::Cli;
use crawl::Crawler;
use log::{error, warn};
use report::{ReportSink, TextFileSink};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = no broken links
//   Ok(1) = broken links found
//   Ok(2) = crawl finished but the report couldn't be written
//   Err = configuration or setup error
async fn run() -> Result<i32> {
    let cli = Cli::parse();

    // RUST_LOG, when set, wins over the -v flags
    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    let config = cli.crawl_config().context("invalid configuration")?;

    println!("🔍 Crawling website: {}", config.seed);
    println!(
        "📊 Max depth: {}, scope: {:?}, workers: {}, deadline: {:?}",
        config.max_depth, config.scope, config.workers, config.deadline
    );

    let fetcher = HttpFetcher::from_config(&config).context("failed to create HTTP client")?;
    let crawler = Crawler::new(config.clone(), Arc::new(fetcher));

    let deadline = crawler.deadline();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, stopping crawl");
            deadline.cancel();
        }
    });

    let summary = crawler.run().await;

    println!(
        "📄 Checked {} URL(s) in {:.1?}",
        summary.entries.len(),
        summary.elapsed
    );

    let mut exit_code = if summary.error_count() > 0 { 1 } else { 0 };

    let mut sink = TextFileSink::new(&cli.output);
    match sink.write_report(&summary.entries) {
        Ok(()) => println!("💾 Result saved to file: {}", sink.path().display()),
        Err(e) => {
            // The crawl itself succeeded; still show what we found
            error!("{}", e);
            exit_code = 2;
        }
    }

    report::print_results(&summary, &config, cli.json)?;

    Ok(exit_code)
}
