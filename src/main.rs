// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::env;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::Level;

use cantus::config::Settings;
use cantus::search::builder::CantusFirmusBuilder;

fn print_usage() {
    println!("CANTUS - Cantus Firmus Generator");
    println!();
    println!("Usage: cantus [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --config <FILE>     Load generation settings from a TOML file");
    println!("  --tonic <PITCH>     Starting pitch, e.g. D4 (default: random)");
    println!("  --mode <MODE>       major, minor, or dorian (default: random)");
    println!("  --length <N>        Total note count (default: random 8-16)");
    println!("  --seed <N>          RNG seed for a reproducible run");
    println!("  --verbose           Show the search as it runs");
    println!("  --help              Show this help message");
}

fn parse_args() -> Result<Option<(Settings, bool)>> {
    let args: Vec<String> = env::args().collect();
    let mut settings = Settings::default();
    let mut verbose = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" => {
                print_usage();
                return Ok(None);
            }
            "--verbose" => {
                verbose = true;
            }
            "--config" => {
                i += 1;
                let path = args
                    .get(i)
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                let loaded = Settings::load(path)?;
                // Flags given before --config still win below
                settings = merge(loaded, settings);
            }
            "--tonic" => {
                i += 1;
                let value = args
                    .get(i)
                    .ok_or_else(|| anyhow::anyhow!("--tonic requires a pitch, e.g. D4"))?;
                settings.tonic = Some(value.clone());
            }
            "--mode" => {
                i += 1;
                let value = args
                    .get(i)
                    .ok_or_else(|| anyhow::anyhow!("--mode requires a mode name"))?;
                settings.mode = Some(value.clone());
            }
            "--length" => {
                i += 1;
                let value = args
                    .get(i)
                    .ok_or_else(|| anyhow::anyhow!("--length requires a number"))?;
                settings.length = Some(value.parse().map_err(|_| {
                    anyhow::anyhow!("Invalid length: {}", value)
                })?);
            }
            "--seed" => {
                i += 1;
                let value = args
                    .get(i)
                    .ok_or_else(|| anyhow::anyhow!("--seed requires a number"))?;
                settings.seed = Some(value.parse().map_err(|_| {
                    anyhow::anyhow!("Invalid seed: {}", value)
                })?);
            }
            other => {
                print_usage();
                return Err(anyhow::anyhow!("Unknown option: {}", other));
            }
        }
        i += 1;
    }

    Ok(Some((settings, verbose)))
}

// Command-line flags override file-loaded settings field by field.
fn merge(base: Settings, overrides: Settings) -> Settings {
    Settings {
        tonic: overrides.tonic.or(base.tonic),
        mode: overrides.mode.or(base.mode),
        length: overrides.length.or(base.length),
        climax: overrides.climax.or(base.climax),
        climax_position: overrides.climax_position.or(base.climax_position),
        max_range: overrides.max_range.or(base.max_range),
        quota: overrides.quota.or(base.quota),
        seed: overrides.seed.or(base.seed),
    }
}

fn main() -> Result<()> {
    let Some((settings, verbose)) = parse_args()? else {
        return Ok(());
    };

    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();

    let options = settings.builder_options()?;
    let rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut builder = CantusFirmusBuilder::new(rng);
    if let Some(quota) = settings.quota {
        builder = builder.with_success_quota(quota);
    }
    let composition = builder.build(&options)?;

    let line = &composition.line;
    println!("cantus firmus: {}", line);
    println!("  length: {} notes (goal {})", line.len(), composition.config.goal_length);
    if let Some(range) = line.range() {
        println!("  range:  {}", range);
    }
    println!("  leaps:  {}", line.leap_count());
    println!("  rank:   {:.3}", line.rank());

    if composition.is_complete() {
        println!("  cadence closed on {}", composition.config.tonic);
    } else {
        println!("  incomplete: frontier exhausted before the cadence");
        for violation in line.validate() {
            println!("    - {}", violation);
        }
    }

    Ok(())
}
