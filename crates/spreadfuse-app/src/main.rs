// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// spreadfuse — merge two-page spreads in comic archives
//
// Entry point. Initialises logging, resolves settings and runs the batch
// driver over the given file or folder.

mod cli;

use std::process::ExitCode;

use clap::Parser;
use spreadfuse_archive::{ArchiveStatus, BatchDriver, BatchReport};
use spreadfuse_core::human_errors::humanize_error;

use cli::Cli;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::info!(input = %cli.input.display(), "spreadfuse starting");

    let report = match cli
        .resolve_config()
        .and_then(BatchDriver::new)
        .and_then(|driver| driver.run(&cli.input))
    {
        Ok(report) => report,
        Err(err) => {
            let help = humanize_error(&err);
            tracing::error!(error = %err, "run aborted");
            eprintln!("{}\n  {}", help.message, help.suggestion);
            return ExitCode::from(2);
        }
    };

    if cli.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                tracing::error!(error = %err, "could not serialise report");
                return ExitCode::FAILURE;
            }
        }
    } else {
        print_summary(&report);
    }

    if report.failed() > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn print_summary(report: &BatchReport) {
    if report.archives.is_empty() {
        println!("No .cbz files found.");
        return;
    }

    for outcome in &report.archives {
        match &outcome.status {
            ArchiveStatus::Fused {
                output,
                pages_in,
                pages_out,
                merged,
                undecodable,
                ..
            } => {
                println!(
                    "ok    {} -> {} ({pages_in} pages in, {pages_out} out, {merged} spreads)",
                    outcome.input.display(),
                    output.display()
                );
                for name in undecodable {
                    println!("      could not read page {name}, copied unchanged");
                }
            }
            ArchiveStatus::Failed { help, .. } => {
                println!("FAIL  {}: {}", outcome.input.display(), help.message);
                println!("      {}", help.suggestion);
            }
        }
    }
    println!(
        "\n{} archive(s) fused, {} failed",
        report.succeeded(),
        report.failed()
    );
}
