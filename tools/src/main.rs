// tools/src/main.rs
//
// Compile a TSV dictionary table into the FST + bincode lexicon artifacts
// loaded by libjapanese-core.
//
// Input line format: reading<TAB>surface<TAB>cost[<TAB>lid<TAB>rid]

use anyhow::{Context, Result};
use clap::Parser;
use fst::MapBuilder;
use libjapanese_core::lexicon::LexEntry;
use std::collections::BTreeMap;
use std::fs::{create_dir_all, File};
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "build-lexicon", about = "Build lexicon.fst + lexicon.bincode from a TSV table")]
struct Args {
    /// TSV table: reading<TAB>surface<TAB>cost[<TAB>lid<TAB>rid]
    #[arg(long)]
    input: PathBuf,

    /// Output directory for lexicon.fst and lexicon.bincode
    #[arg(long, default_value = "data")]
    out_dir: PathBuf,
}

fn parse_table_line(line: &str) -> Option<(String, LexEntry)> {
    let parts: Vec<&str> = line.split('\t').collect();
    if parts.len() < 3 {
        return None;
    }
    let reading = parts[0].to_string();
    let surface = parts[1].to_string();
    let cost = parts[2].trim().parse::<i32>().unwrap_or(0);
    let lid = parts
        .get(3)
        .and_then(|s| s.trim().parse::<u16>().ok())
        .unwrap_or(0);
    let rid = parts
        .get(4)
        .and_then(|s| s.trim().parse::<u16>().ok())
        .unwrap_or(0);
    Some((reading, LexEntry::with_pos(surface, cost, lid, rid)))
}

fn build_artifacts(args: &Args) -> Result<()> {
    // Group entries by reading; BTreeMap keeps the sorted order MapBuilder
    // requires.
    let mut grouped: BTreeMap<String, Vec<LexEntry>> = BTreeMap::new();

    let f = File::open(&args.input)
        .with_context(|| format!("open table {}", args.input.display()))?;
    let reader = BufReader::new(f);
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((reading, entry)) = parse_table_line(&line) {
            grouped.entry(reading).or_default().push(entry);
        }
    }

    create_dir_all(&args.out_dir)?;
    let fst_path = args.out_dir.join("lexicon.fst");
    let bin_path = args.out_dir.join("lexicon.bincode");

    let mut w = File::create(&fst_path)?;
    let mut map_builder = MapBuilder::new(&mut w)?;

    let mut payloads: Vec<Vec<LexEntry>> = Vec::with_capacity(grouped.len());
    for (i, (reading, entries)) in grouped.into_iter().enumerate() {
        map_builder.insert(&reading, i as u64)?;
        payloads.push(entries);
    }
    map_builder.finish()?;

    let binf = File::create(&bin_path)?;
    bincode::serialize_into(binf, &payloads)?;

    println!(
        "Wrote {} readings, fst={} bincode={}",
        payloads.len(),
        fst_path.display(),
        bin_path.display()
    );
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    build_artifacts(&args)
}
