use std::process::ExitCode;

use clap::Parser;
use log::{error, info, warn};

use tax_ranking_lib::{logger, Config, HttpClient, Pipeline};

/// Scrape the cafef.vn top-200 taxpayer ranking and merge company financials.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Ignore the cached ranking and fetch it again
    #[arg(long)]
    force_fetch: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    logger::init();
    info!("Starting tax ranking scraper...");

    let config = match Config::from_env() {
        Ok(c) => c.with_force_fetch(args.force_fetch),
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let client = match HttpClient::new() {
        Ok(c) => c,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match Pipeline::new(&config, &client).run() {
        Ok(report) => {
            if report.export_failures > 0 {
                warn!("{} export(s) failed; see errors above.", report.export_failures);
            }
            info!("Done. {} companies merged.", report.merged.len());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Run aborted: {}", e);
            ExitCode::FAILURE
        }
    }
}
