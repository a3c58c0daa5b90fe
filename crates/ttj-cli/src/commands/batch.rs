//! Batch command - parse a corpus of transcription files, grouping
//! multipage issues so header context carries across page boundaries.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use ttj_core::format;
use ttj_core::{CargoItem, CargoSegmenter, Document, ParseContext, RecordParser, ShipRecord};

use crate::source;

use super::parse::{format_cargo_csv, segment_all, write_record_header, write_record_row};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern (e.g. "scans/*.txt")
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long, default_value = "out")]
    output_dir: PathBuf,

    /// Also write segmented cargo items to cargo_items.csv
    #[arg(long)]
    cargo: bool,

    /// Give every page a fresh context instead of threading it across an
    /// issue's pages
    #[arg(long)]
    isolate_pages: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// One parsed issue (page group) or the reason it failed.
struct GroupResult {
    issue: String,
    records: Vec<ShipRecord>,
    error: Option<String>,
}

pub fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("txt"))
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    let file_count = files.len();
    let groups = source::group_pages(files);

    println!(
        "{} Found {} files in {} issues",
        style("ℹ").blue(),
        file_count,
        groups.len()
    );

    fs::create_dir_all(&args.output_dir)?;

    let pb = ProgressBar::new(groups.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} issues")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mut results = Vec::with_capacity(groups.len());

    for (issue, pages) in groups {
        match parse_group(&issue, &pages, &config, args.isolate_pages) {
            Ok(records) => {
                debug!(issue = %issue, records = records.len(), "parsed issue");
                results.push(GroupResult {
                    issue,
                    records,
                    error: None,
                });
            }
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to parse {}: {}", issue, error_msg);
                    results.push(GroupResult {
                        issue,
                        records: Vec::new(),
                        error: Some(error_msg),
                    });
                } else {
                    error!("Failed to parse {}: {}", issue, error_msg);
                    anyhow::bail!("Batch parse failed on {}: {}", issue, error_msg);
                }
            }
        }
        pb.inc(1);
    }

    pb.finish_with_message("Complete");

    let records: Vec<&ShipRecord> = results.iter().flat_map(|r| r.records.iter()).collect();

    let shipments_path = args.output_dir.join("shipments.csv");
    write_shipments(&shipments_path, &results)?;
    println!(
        "{} {} records written to {}",
        style("✓").green(),
        records.len(),
        shipments_path.display()
    );

    let mut cargo_items = 0;
    if args.cargo {
        let segmenter = CargoSegmenter::new(config.cargo.clone());
        let mut items: Vec<(&ShipRecord, CargoItem)> = Vec::new();
        for result in &results {
            items.extend(segment_all(&result.records, &segmenter));
        }
        cargo_items = items.len();

        let cargo_path = args.output_dir.join("cargo_items.csv");
        fs::write(&cargo_path, format_cargo_csv(&items)?)?;
        println!(
            "{} {} cargo items written to {}",
            style("✓").green(),
            cargo_items,
            cargo_path.display()
        );
    }

    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();
    write_stats(&args, &results, file_count, cargo_items)?;

    println!();
    println!(
        "{} Parsed {} issues in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(results.len() - failed.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed issues:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.issue,
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

/// Parse one issue's pages in order. By default a single context is
/// threaded through the whole group, so a port header on one page governs
/// continuation lines on the next.
fn parse_group(
    issue: &str,
    pages: &[PathBuf],
    config: &ttj_core::ExtractionConfig,
    isolate_pages: bool,
) -> anyhow::Result<Vec<ShipRecord>> {
    let meta = source::derive_meta(std::path::Path::new(issue));

    let first_text = fs::read_to_string(&pages[0])?;
    let family = format::classify(meta.year, Some(&first_text));
    let parser = RecordParser::new(config.parser.clone()).with_format(family);

    let mut ctx = ParseContext::new();
    let mut records = Vec::new();

    for (i, page) in pages.iter().enumerate() {
        let text = if i == 0 {
            first_text.clone()
        } else {
            fs::read_to_string(page)?
        };

        if isolate_pages {
            ctx = ParseContext::new();
        }

        let doc = Document::from_text(&text, meta.clone());
        records.extend(parser.parse_document(&doc, &mut ctx));
    }

    Ok(records)
}

fn write_shipments(path: &PathBuf, results: &[GroupResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_field("issue")?;
    write_record_header(&mut wtr)?;

    for result in results {
        for record in &result.records {
            wtr.write_field(&result.issue)?;
            write_record_row(&mut wtr, record)?;
        }
    }

    fs::write(path, String::from_utf8(wtr.into_inner()?)?)?;
    Ok(())
}

fn write_stats(
    args: &BatchArgs,
    results: &[GroupResult],
    file_count: usize,
    cargo_items: usize,
) -> anyhow::Result<()> {
    let all: Vec<&ShipRecord> = results.iter().flat_map(|r| r.records.iter()).collect();
    let records = all.len();

    let mut by_grammar: std::collections::BTreeMap<&'static str, usize> =
        std::collections::BTreeMap::new();
    for record in &all {
        *by_grammar.entry(record.matched_grammar.as_str()).or_default() += 1;
    }
    let with_destination = all.iter().filter(|r| r.destination_port.is_some()).count();
    let with_date = all
        .iter()
        .filter(|r| r.day.is_some() && r.month.is_some())
        .count();

    let failures: Vec<_> = results
        .iter()
        .filter_map(|r| r.error.as_ref().map(|e| (r.issue.as_str(), e.as_str())))
        .map(|(issue, error)| serde_json::json!({ "issue": issue, "error": error }))
        .collect();

    let stats = serde_json::json!({
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "files": file_count,
        "issues": results.len(),
        "records": records,
        "records_by_grammar": by_grammar,
        "records_with_destination": with_destination,
        "records_with_date": with_date,
        "cargo_items": cargo_items,
        "context_threading": !args.isolate_pages,
        "failures": failures,
    });

    let stats_path = args.output_dir.join("stats.json");
    fs::write(&stats_path, serde_json::to_string_pretty(&stats)?)?;
    debug!("Wrote stats to {}", stats_path.display());
    Ok(())
}
