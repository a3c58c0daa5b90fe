//! Normalize command - resolve extracted entity names against authority
//! lists and annotate the shipments CSV with the outcome.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use serde::Deserialize;
use tracing::{info, warn};

use ttj_core::{Category, EntityNormalizer, NormalizationResult, ReferenceSet, Tier};

/// Arguments for the normalize command.
#[derive(Args)]
pub struct NormalizeArgs {
    /// Input shipments CSV (as written by `ttj parse` or `ttj batch`)
    #[arg(required = true)]
    input: PathBuf,

    /// Directory holding the authority lists (origin_ports.json,
    /// destination_ports.json)
    #[arg(short, long)]
    reference_dir: PathBuf,

    /// Output CSV (default: <input stem>_normalized.csv)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// On-disk shape of one authority list.
#[derive(Debug, Deserialize)]
struct ReferenceFile {
    canonical: Vec<String>,
    #[serde(default)]
    variants: HashMap<String, String>,
}

pub fn run(args: NormalizeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let mut normalizer = EntityNormalizer::new(config.normalizer.clone());
    let mut configured = 0;
    for (category, file) in [
        (Category::OriginPort, "origin_ports.json"),
        (Category::DestinationPort, "destination_ports.json"),
    ] {
        if let Some(set) = load_reference(&args.reference_dir, file)? {
            normalizer.set_reference(category, set);
            configured += 1;
        }
    }
    if configured == 0 {
        anyhow::bail!(
            "No authority lists found in {}",
            args.reference_dir.display()
        );
    }

    let output_path = args.output.clone().unwrap_or_else(|| {
        let stem = args
            .input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("shipments");
        args.input.with_file_name(format!("{}_normalized.csv", stem))
    });

    let mut rdr = csv::Reader::from_path(&args.input)?;
    let headers = rdr.headers()?.clone();

    let origin_idx = headers.iter().position(|h| h == "origin_port_raw");
    let dest_idx = headers.iter().position(|h| h == "destination_port");
    if origin_idx.is_none() && dest_idx.is_none() {
        anyhow::bail!("Input CSV has neither origin_port_raw nor destination_port columns");
    }

    let mut wtr = csv::Writer::from_path(&output_path)?;

    let mut out_headers: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    for prefix in ["origin", "destination"] {
        out_headers.push(format!("{}_normalized", prefix));
        out_headers.push(format!("{}_tier", prefix));
        out_headers.push(format!("{}_confidence", prefix));
    }
    wtr.write_record(&out_headers)?;

    let mut tier_counts: HashMap<&'static str, usize> = HashMap::new();
    let mut rows = 0usize;

    for record in rdr.records() {
        let record = record?;
        let mut row: Vec<String> = record.iter().map(|f| f.to_string()).collect();

        for (idx, category) in [
            (origin_idx, Category::OriginPort),
            (dest_idx, Category::DestinationPort),
        ] {
            let raw = idx.and_then(|i| record.get(i)).unwrap_or("");
            if raw.is_empty() {
                row.extend(["".to_string(), "".to_string(), "".to_string()]);
                continue;
            }

            let result = normalizer.normalize(raw, category);
            *tier_counts.entry(result.tier.as_str()).or_default() += 1;
            row.extend(annotation(&result));
        }

        wtr.write_record(&row)?;
        rows += 1;
    }

    wtr.flush()?;
    info!("Annotated {} rows", rows);

    println!(
        "{} {} rows normalized, written to {}",
        style("✓").green(),
        rows,
        output_path.display()
    );
    println!();
    println!("Resolution tiers:");
    for tier in [
        Tier::Exact,
        Tier::KnownVariant,
        Tier::FuzzyHigh,
        Tier::FuzzyMedium,
        Tier::FuzzyLow,
        Tier::Error,
        Tier::Unmapped,
    ] {
        let count = tier_counts.get(tier.as_str()).copied().unwrap_or(0);
        if count > 0 {
            println!("  {:<14} {}", tier.as_str(), count);
        }
    }

    Ok(())
}

/// The three annotation columns for one normalization outcome. Review
/// tiers surface the best candidate in the normalized column, marked by
/// their tier.
fn annotation(result: &NormalizationResult) -> [String; 3] {
    let name = result
        .normalized
        .as_deref()
        .or(result.best_candidate.as_deref())
        .unwrap_or("");
    [
        name.to_string(),
        result.tier.as_str().to_string(),
        format!("{:.2}", result.confidence),
    ]
}

fn load_reference(dir: &Path, file: &str) -> anyhow::Result<Option<ReferenceSet>> {
    let path = dir.join(file);
    if !path.exists() {
        warn!("Authority list {} not found, skipping", path.display());
        return Ok(None);
    }

    let parsed: ReferenceFile = serde_json::from_str(&fs::read_to_string(&path)?)?;
    let set = ReferenceSet::new(parsed.canonical, parsed.variants.into_iter().collect())?;
    Ok(Some(set))
}
