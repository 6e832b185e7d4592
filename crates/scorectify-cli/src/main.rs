// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scorectify — deskew scanned music score pages.
//
// Entry point. Initialises logging, loads the input score, rectifies every
// page and writes one PNG per page, optionally reporting as JSON.

mod cli;
mod report;

use std::process::ExitCode;

use clap::Parser;
use scorectify_core::error::Result;
use scorectify_document::{ImageProcessor, Loader, Rectifier};

use cli::Cli;
use report::{PageReport, RunReport, page_output_path};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::info!(input = %cli.input.display(), "scorectify starting");

    match run(&cli).and_then(|report| emit(&cli, &report)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "scorectify failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Load, rectify and write every page. Stops at the first failing page.
fn run(cli: &Cli) -> Result<RunReport> {
    let loader = Loader::with_rasterizer(cli.loader_config(), cli.rasterizer())?;
    let rectifier = Rectifier::new(cli.rectify_config())?;

    let pages = loader.load(&cli.input)?;
    if !cli.dry_run {
        std::fs::create_dir_all(&cli.output_dir)?;
    }

    let mut reports = Vec::with_capacity(pages.len());
    for (index, page) in pages.into_iter().enumerate() {
        let number = index + 1;
        let (width, height) = (page.width(), page.height());

        let report = if cli.dry_run {
            let gray = ImageProcessor::from_dynamic(page);
            let skew = rectifier.estimate_skew(gray.as_gray())?;
            PageReport {
                page: number,
                width,
                height,
                skew_degrees: skew.degrees(),
                candidates: None,
                rotated: skew.exceeds(rectifier.config().rotation_threshold_degrees),
                output: None,
            }
        } else {
            let rectified = rectifier.rectify_with_report(page)?;
            let output = page_output_path(&cli.output_dir, &cli.input, number);
            ImageProcessor::from_gray(rectified.image).save(&output)?;
            tracing::info!(page = number, output = %output.display(), "page written");
            PageReport {
                page: number,
                width,
                height,
                skew_degrees: rectified.skew.degrees(),
                candidates: Some(rectified.candidates),
                rotated: rectified.rotated,
                output: Some(output),
            }
        };
        reports.push(report);
    }

    Ok(RunReport {
        input: cli.input.clone(),
        dry_run: cli.dry_run,
        pages: reports,
    })
}

/// Print the JSON report when asked for.
fn emit(cli: &Cli, report: &RunReport) -> Result<()> {
    if cli.json {
        println!("{}", serde_json::to_string_pretty(report)?);
    }
    Ok(())
}
