//! Synthetic Passenger Dataset Generator
//!
//! Writes a Titanic-shaped CSV for local demos and training smoke runs.
//! Survival odds follow sex, class and age so the trained model has signal.

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "generate_dataset", about = "Generate a synthetic Titanic CSV")]
struct Args {
    /// Output CSV path
    #[arg(long, default_value = "data/titanic.csv")]
    output: PathBuf,

    /// Number of passengers
    #[arg(long, default_value_t = 891)]
    rows: usize,

    /// Share of rows with a missing age
    #[arg(long, default_value_t = 0.2)]
    missing_rate: f64,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// One CSV row; `None` cells are written empty
#[derive(Debug, Serialize)]
struct PassengerRow {
    #[serde(rename = "PassengerId")]
    passenger_id: usize,
    #[serde(rename = "Survived")]
    survived: u8,
    #[serde(rename = "Pclass")]
    pclass: u8,
    #[serde(rename = "Sex")]
    sex: &'static str,
    #[serde(rename = "Age")]
    age: Option<f64>,
    #[serde(rename = "SibSp")]
    sibsp: u32,
    #[serde(rename = "Parch")]
    parch: u32,
    #[serde(rename = "Fare")]
    fare: f64,
    #[serde(rename = "Embarked")]
    embarked: Option<&'static str>,
}

struct PassengerGenerator {
    rng: StdRng,
    missing_rate: f64,
    counter: usize,
}

impl PassengerGenerator {
    fn new(seed: u64, missing_rate: f64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            missing_rate: missing_rate.clamp(0.0, 1.0),
            counter: 0,
        }
    }

    fn generate(&mut self) -> PassengerRow {
        self.counter += 1;

        let pclass = match self.rng.gen_range(0..100) {
            0..=23 => 1,
            24..=44 => 2,
            _ => 3,
        };
        let sex = if self.rng.gen_bool(0.35) { "female" } else { "male" };
        let age = (self.rng.gen_range(1.0..75.0_f64) * 2.0).round() / 2.0;
        let fare = match pclass {
            1 => self.rng.gen_range(30.0..260.0),
            2 => self.rng.gen_range(10.0..40.0),
            _ => self.rng.gen_range(5.0..20.0),
        };
        let embarked = match self.rng.gen_range(0..100) {
            0..=71 => "S",
            72..=90 => "C",
            _ => "Q",
        };

        let mut odds: f64 = if sex == "female" { 0.75 } else { 0.2 };
        odds += match pclass {
            1 => 0.15,
            2 => 0.0,
            _ => -0.12,
        };
        if age < 12.0 {
            odds += 0.2;
        }
        let survived = u8::from(self.rng.gen_bool(odds.clamp(0.02, 0.98)));

        PassengerRow {
            passenger_id: self.counter,
            survived,
            pclass,
            sex,
            age: (!self.rng.gen_bool(self.missing_rate)).then_some(age),
            sibsp: self.rng.gen_range(0..=2),
            parch: self.rng.gen_range(0..=2),
            fare: (fare * 10_000.0_f64).round() / 10_000.0,
            // Embarkation is rarely missing
            embarked: (!self.rng.gen_bool(self.missing_rate / 50.0)).then_some(embarked),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("generate_dataset=info".parse()?),
        )
        .init();

    let args = Args::parse();
    info!(
        output = %args.output.display(),
        rows = args.rows,
        missing_rate = args.missing_rate,
        seed = args.seed,
        "Generating dataset"
    );

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("Failed to open {}", args.output.display()))?;

    let mut generator = PassengerGenerator::new(args.seed, args.missing_rate);
    let mut survivors = 0;
    for _ in 0..args.rows {
        let row = generator.generate();
        survivors += usize::from(row.survived);
        writer.serialize(&row)?;
    }
    writer.flush()?;

    info!(
        "Completed! Wrote {} passengers ({} survived, {} did not)",
        args.rows,
        survivors,
        args.rows - survivors
    );
    Ok(())
}
