use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use tafelplan::model::entity::Round;
use tafelplan::{csv, report, solver};

/// Builds a three-round seating plan from the organizers' CSV export.
#[derive(Parser)]
#[command(name = "tafelplan", version)]
struct Cli {
    /// Input CSV (`;`-separated) with Persoon/aantal/MC/Ronde columns
    input: PathBuf,

    /// Where to write the completed plan
    #[arg(long, short = 'o', default_value = "tafelindeling_resultaat.csv")]
    output: PathBuf,

    /// RNG seed for a reproducible run; omit for a fresh one every time
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let roster = csv::load_roster(&cli.input)
        .with_context(|| format!("failed to load {}", cli.input.display()))?;
    tracing::info!(people = roster.len(), "roster loaded");

    let mut rng = match cli.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };

    let plan = solver::solve(&roster, &mut rng)?;

    for round in Round::SOLVED {
        print!("{}", report::render(&roster, &plan, round));
    }

    csv::save_plan(&roster, &plan, &cli.output)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;
    println!("Resultaten opgeslagen in {}", cli.output.display());

    Ok(())
}
