//! fixedrnn command-line runner
//!
//! # Usage
//!
//! ```bash
//! # Run an exported model over an input sequence
//! fixedrnn run --model weights.json --config config.json --inputs inputs.json
//!
//! # Random seeded cell over random inputs
//! fixedrnn demo --cell tf_gru --input-size 4 --hidden 8 --steps 10 --seed 42
//! ```
//!
//! `FIXEDRNN_LOG` sets the log filter; `FIXEDRNN_PRECISION` and
//! `FIXEDRNN_CELL_TYPE` override the model config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use fixedrnn_fixed_point::{ops, Precision, DEFAULT_PRECISION};
use fixedrnn_layers::{run, CellType, ModelConfig, ModelWeights, RnnCell, SequenceModel};
use fixedrnn_matrix::Matrix;

#[derive(Parser)]
#[command(name = "fixedrnn")]
#[command(version)]
#[command(about = "Fixed-point GRU inference")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an exported model over an input sequence
    Run {
        /// Model weights (JSON)
        #[arg(short, long)]
        model: PathBuf,

        /// Model config (JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// Input sequence: a JSON list of steps, each a list of features
        #[arg(short, long)]
        inputs: PathBuf,
    },

    /// Run a random seeded cell over random inputs
    Demo {
        /// Cell type (gru or tf_gru)
        #[arg(long, default_value = "gru")]
        cell: String,

        /// Features per step
        #[arg(long, default_value = "4")]
        input_size: usize,

        /// Hidden state size
        #[arg(long, default_value = "8")]
        hidden: usize,

        /// Sequence length
        #[arg(long, default_value = "10")]
        steps: usize,

        /// Seed for weights and inputs
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Fractional bits
        #[arg(short, long, default_value_t = DEFAULT_PRECISION)]
        precision: u8,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("FIXEDRNN_LOG")
                .unwrap_or_else(|_| "fixedrnn=info,fixedrnn_layers=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            model,
            config,
            inputs,
        } => run_model(&model, &config, &inputs),
        Commands::Demo {
            cell,
            input_size,
            hidden,
            steps,
            seed,
            precision,
        } => run_demo(&cell, input_size, hidden, steps, seed, precision),
    }
}

fn run_model(model: &Path, config: &Path, inputs: &Path) -> Result<()> {
    let config = ModelConfig::from_json_file(config)
        .with_context(|| format!("loading config {}", config.display()))?
        .with_env_overrides()?;
    let weights = ModelWeights::from_json_file(model)
        .with_context(|| format!("loading weights {}", model.display()))?;
    let model = SequenceModel::from_parts(config, &weights)?;

    let content = std::fs::read_to_string(inputs)
        .with_context(|| format!("reading inputs {}", inputs.display()))?;
    let steps: Vec<Vec<f64>> = serde_json::from_str(&content).context("parsing inputs")?;
    let sequence = model.quantize_inputs(&steps)?;

    tracing::info!(
        name = %model.config().name,
        cell = %model.cell().cell_type(),
        precision = %model.config().precision,
        steps = sequence.len(),
        "Running model"
    );

    let result = model.predict(&sequence)?;
    let precision = model.config().precision_bits();

    println!("Prediction: {}", result.prediction);
    print_column("Logits", &result.logits, precision);
    print_column("State", &result.state, precision);
    Ok(())
}

fn run_demo(
    cell: &str,
    input_size: usize,
    hidden: usize,
    steps: usize,
    seed: u64,
    precision: u8,
) -> Result<()> {
    let cell_type: CellType = cell.parse()?;
    let precision = Precision::new(precision)?;
    let bits = precision.bits();

    let cell = RnnCell::random_seeded(cell_type, input_size, hidden, bits, seed);

    let mut rng = ChaCha20Rng::seed_from_u64(seed.wrapping_add(1));
    let inputs = (0..steps)
        .map(|_| {
            let values: Vec<f64> = (0..input_size).map(|_| rng.gen_range(-1.0..1.0)).collect();
            Matrix::from_f64(&values, input_size, 1, bits)
        })
        .collect::<fixedrnn_matrix::Result<Vec<_>>>()?;

    tracing::info!(
        cell = %cell_type,
        input_size,
        hidden,
        steps,
        seed,
        precision = %precision,
        "Running demo"
    );

    let state = run(&inputs, &cell, bits)?;
    print_column("State", &state, bits);
    Ok(())
}

fn print_column(label: &str, m: &Matrix, precision: u8) {
    println!("{} ({} values):", label, m.len());
    for (i, &raw) in m.as_slice().iter().enumerate() {
        println!("  [{:3}] {:>6}  {:>9.5}", i, raw, ops::to_f64(raw, precision));
    }
}
