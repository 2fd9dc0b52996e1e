use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use rater::logic_data::{LogicData, build_table, supplementary_definitions};
use rater::progression::{Outcome, Simulator};
use rater::seed::SeedDescription;
use rater::settings::RaterSettings;
use rater_logic::helpers::seed_score;

#[derive(Parser)]
struct Args {
    #[arg(long)]
    logic: PathBuf,

    #[arg(long)]
    seed: PathBuf,

    #[arg(long)]
    settings: Option<PathBuf>,

    // Treat negative difficulty tiers in the logic as tier 0 instead of failing.
    #[arg(long)]
    ignore_bad_difficulty: bool,

    #[arg(long)]
    no_supplementary_logic: bool,

    #[arg(long)]
    output_progression_log: Option<PathBuf>,

    #[arg(long)]
    verbose: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args = Args::parse();
    let mut settings = match &args.settings {
        Some(path) => RaterSettings::load(path)?,
        None => RaterSettings::hollow_knight()?,
    };
    if args.ignore_bad_difficulty {
        settings.clamp_negative_tiers = true;
    }

    let logic = LogicData::load(&args.logic)?;
    let supplementary = if args.no_supplementary_logic {
        vec![]
    } else {
        supplementary_definitions()?
    };
    let table = build_table(&logic.definitions, &supplementary, &settings)?;

    let seed = SeedDescription::load(&args.seed)?;
    let items = seed.get_items(&settings)?;
    let starting_items = seed.get_starting_items(&settings)?;
    info!(
        "Seed: {} items, starting with {:?}, goal {}",
        items.len(),
        starting_items,
        seed.goal
    );

    let simulator = Simulator::new(&table, &settings);
    let progression = simulator
        .rate(&items, &starting_items, &seed.goal)
        .with_context(|| format!("Unable to rate seed at {}", args.seed.display()))?;

    if args.verbose {
        for line in progression.log.summary() {
            println!("{line}");
        }
        if let Some(step) = progression.log.hardest_step() {
            println!(
                "Hardest step: {} at {} in round {} [{:.2}]",
                step.item,
                step.location,
                step.round,
                seed_score(step.rating)
            );
        }
    }
    if let Some(path) = &args.output_progression_log {
        let log_str = serde_json::to_string_pretty(&progression.log)?;
        std::fs::write(path, log_str)
            .with_context(|| format!("Unable to write progression log at {}", path.display()))?;
        info!("Wrote progression log to {}", path.display());
    }

    match progression.outcome {
        Outcome::Rated(cost) => {
            println!("Seed rating: {:.4} (raw rating: {cost})", seed_score(cost));
        }
        Outcome::Unreachable => {
            println!(
                "Seed rating: unreachable ({} could not be reached)",
                seed.goal
            );
        }
    }
    Ok(())
}
