//! Parse command - extract records from a single transcription file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use ttj_core::format;
use ttj_core::{CargoItem, CargoSegmenter, Document, ParseContext, RecordParser, ShipRecord};

use crate::source;

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Input transcription file
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Publication year, overriding the filename-derived value
    #[arg(long)]
    year: Option<i32>,

    /// Publication month name, overriding the filename-derived value
    #[arg(long)]
    month: Option<String>,

    /// Publication day, overriding the filename-derived value
    #[arg(long)]
    day: Option<u32>,

    /// Also write segmented cargo items as CSV to this path
    #[arg(long)]
    cargo_out: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
}

pub fn run(args: ParseArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let text = fs::read_to_string(&args.input)?;

    let mut meta = source::derive_meta(&args.input);
    if args.year.is_some() {
        meta.year = args.year;
    }
    if args.month.is_some() {
        meta.month = args.month.clone();
    }
    if args.day.is_some() {
        meta.day = args.day;
    }

    let family = format::classify(meta.year, Some(&text));
    info!("Processing {} as {:?}", args.input.display(), family);

    let doc = Document::from_text(&text, meta);
    let parser = RecordParser::new(config.parser.clone()).with_format(family);
    let mut ctx = ParseContext::new();
    let records = parser.parse_document(&doc, &mut ctx);

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&records)?,
        OutputFormat::Csv => format_records_csv(&records)?,
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} {} records written to {}",
            style("✓").green(),
            records.len(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if let Some(cargo_path) = &args.cargo_out {
        let segmenter = CargoSegmenter::new(config.cargo.clone());
        let items = segment_all(&records, &segmenter);
        fs::write(cargo_path, format_cargo_csv(&items)?)?;
        println!(
            "{} {} cargo items written to {}",
            style("✓").green(),
            items.len(),
            cargo_path.display()
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Decompose every record's cargo field, keeping the record linkage.
pub fn segment_all<'a>(
    records: &'a [ShipRecord],
    segmenter: &CargoSegmenter,
) -> Vec<(&'a ShipRecord, CargoItem)> {
    records
        .iter()
        .filter_map(|r| r.cargo_raw.as_deref().map(|c| (r, segmenter.segment(c))))
        .flat_map(|(r, items)| items.into_iter().map(move |i| (r, i)))
        .collect()
}

pub fn format_records_csv(records: &[ShipRecord]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    write_record_header(&mut wtr)?;
    for record in records {
        write_record_row(&mut wtr, record)?;
    }
    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

pub fn write_record_header<W: std::io::Write>(wtr: &mut csv::Writer<W>) -> anyhow::Result<()> {
    wtr.write_record([
        "ship_name",
        "origin_port_raw",
        "destination_port",
        "cargo_raw",
        "merchant",
        "day",
        "month",
        "year",
        "publication_year",
        "publication_month",
        "publication_day",
        "is_steamship",
        "matched_grammar",
        "confidence",
        "line_number",
        "raw_line",
    ])?;
    Ok(())
}

pub fn write_record_row<W: std::io::Write>(
    wtr: &mut csv::Writer<W>,
    record: &ShipRecord,
) -> anyhow::Result<()> {
    wtr.write_record([
        record.ship_name.as_str(),
        record.origin_port_raw.as_deref().unwrap_or(""),
        record.destination_port.as_deref().unwrap_or(""),
        record.cargo_raw.as_deref().unwrap_or(""),
        record.merchant.as_deref().unwrap_or(""),
        &record.day.map(|d| d.to_string()).unwrap_or_default(),
        record.month.as_deref().unwrap_or(""),
        &record.year.map(|y| y.to_string()).unwrap_or_default(),
        &record
            .publication_year
            .map(|y| y.to_string())
            .unwrap_or_default(),
        record.publication_month.as_deref().unwrap_or(""),
        &record
            .publication_day
            .map(|d| d.to_string())
            .unwrap_or_default(),
        if record.is_steamship { "true" } else { "false" },
        record.matched_grammar.as_str(),
        &format!("{:.2}", record.confidence),
        &record.line_number.to_string(),
        record.raw_line.as_str(),
    ])?;
    Ok(())
}

pub fn format_cargo_csv(items: &[(&ShipRecord, CargoItem)]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "ship_name",
        "line_number",
        "quantity",
        "unit",
        "commodity",
        "merchant",
        "raw_segment",
    ])?;

    for (record, item) in items {
        wtr.write_record([
            record.ship_name.as_str(),
            &record.line_number.to_string(),
            item.quantity.as_deref().unwrap_or(""),
            item.unit.as_deref().unwrap_or(""),
            item.commodity.as_str(),
            item.merchant.as_deref().unwrap_or(""),
            item.raw_segment.as_str(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}
