use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use formats::{CountryAttributes, attributes_from_str, boundaries_from_str, builtin_countries};
use reconcile::{ALIAS_GROUPS, Confidence, MatchTier, ReconciledCountry, reconcile, tier_counts};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Offline tools for the globe country datasets")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reconcile a boundary file against an attributes file and report match confidence.
    Reconcile {
        /// GeoJSON FeatureCollection or TopoJSON Topology.
        boundaries: PathBuf,
        /// REST Countries JSON; the built-in list when omitted.
        #[arg(long)]
        attributes: Option<PathBuf>,
        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
        /// Only list boundaries below exact confidence.
        #[arg(long)]
        weak_only: bool,
    },
    /// Print the alias table, one group per line.
    Aliases,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main(Args::parse()) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main(args: Args) -> Result<(), String> {
    match args.command {
        Command::Reconcile {
            boundaries,
            attributes,
            json,
            weak_only,
        } => cmd_reconcile(&boundaries, attributes.as_deref(), json, weak_only),
        Command::Aliases => {
            for group in ALIAS_GROUPS {
                println!("{}", group.join(" | "));
            }
            Ok(())
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct ReportRow {
    id: usize,
    boundary_name: String,
    common_name: String,
    tier: MatchTier,
    confidence: Confidence,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    alternatives: Vec<String>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct Report {
    boundaries: usize,
    attributes: usize,
    tiers: BTreeMap<MatchTier, usize>,
    rows: Vec<ReportRow>,
}

fn build_report(countries: &[ReconciledCountry], attributes: usize, weak_only: bool) -> Report {
    let rows = countries
        .iter()
        .filter(|c| !weak_only || c.confidence() != Confidence::Exact)
        .map(|c| ReportRow {
            id: c.id.as_usize(),
            boundary_name: c.boundary_name.clone(),
            common_name: c.common_name().to_string(),
            tier: c.tier,
            confidence: c.confidence(),
            alternatives: c.alternatives.clone(),
        })
        .collect();
    Report {
        boundaries: countries.len(),
        attributes,
        tiers: tier_counts(countries),
        rows,
    }
}

fn read_attributes(path: Option<&Path>) -> Result<Vec<CountryAttributes>, String> {
    let Some(path) = path else {
        info!("no attributes file given, using the built-in list");
        return Ok(builtin_countries());
    };
    let text = fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))?;
    attributes_from_str(&text).map_err(|e| format!("decode {path:?}: {e}"))
}

fn cmd_reconcile(boundaries: &Path, attributes: Option<&Path>, json: bool, weak_only: bool) -> Result<(), String> {
    let text = fs::read_to_string(boundaries).map_err(|e| format!("read {boundaries:?}: {e}"))?;
    let features = boundaries_from_str(&text).map_err(|e| format!("decode {boundaries:?}: {e}"))?;
    let records = read_attributes(attributes)?;

    let countries = reconcile(&features, &records);
    let report = build_report(&countries, records.len(), weak_only);

    if json {
        let out = serde_json::to_string_pretty(&report).map_err(|e| format!("encode report: {e}"))?;
        println!("{out}");
        return Ok(());
    }

    for row in &report.rows {
        let mut line = format!(
            "{:>4}  {:<32} -> {:<32} [{:?}]",
            row.id, row.boundary_name, row.common_name, row.confidence
        );
        if !row.alternatives.is_empty() {
            line.push_str(&format!("  also: {}", row.alternatives.join(", ")));
        }
        println!("{line}");
    }
    println!();
    println!("{} boundaries, {} attribute records", report.boundaries, report.attributes);
    for (tier, count) in &report.tiers {
        println!("  {tier:?}: {count}");
    }
    Ok(())
}
