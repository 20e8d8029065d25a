use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use quizrank_ai::{Predictor, TreeParams, heuristic};
use quizrank_cli::{MODEL_ENV, display, logging, train};
use quizrank_core::{DEFAULT_MODEL_PATH, PredictionRequest, builtin_samples};

#[derive(Parser)]
#[command(name = "quizrank")]
#[command(about = "Train, inspect, and query the quiz difficulty model", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit the decision tree and write the model artifact
    Train {
        /// Artifact output path
        #[arg(long, env = MODEL_ENV, default_value = DEFAULT_MODEL_PATH)]
        output: PathBuf,

        /// JSON array of {score, time_taken, difficulty} to train on instead of the built-in set
        #[arg(long)]
        samples: Option<PathBuf>,

        /// Maximum tree depth (unlimited by default)
        #[arg(long)]
        max_depth: Option<usize>,

        /// Minimum samples a node needs before it may split
        #[arg(long, default_value_t = 2)]
        min_samples_split: usize,

        /// Minimum samples on each side of a split
        #[arg(long, default_value_t = 1)]
        min_samples_leaf: usize,
    },

    /// Show model metadata and decision rules
    Inspect {
        /// Artifact path
        #[arg(long, env = MODEL_ENV, default_value = DEFAULT_MODEL_PATH)]
        model: PathBuf,

        /// Request JSON to trace: prints the class distribution it lands in
        #[arg(long)]
        probe: Option<String>,
    },

    /// Rule-based recommendation, no model needed
    Assess {
        /// JSON object with numeric `score` and `time_taken`
        request: String,
    },
}

fn main() -> anyhow::Result<()> {
    logging::init("info");
    let cli = Cli::parse();

    match cli.command {
        Commands::Train {
            output,
            samples,
            max_depth,
            min_samples_split,
            min_samples_leaf,
        } => {
            let samples = match samples {
                Some(path) => train::load_samples(&path)?,
                None => builtin_samples(),
            };
            let params = TreeParams {
                max_depth,
                min_samples_split,
                min_samples_leaf,
            };

            let stats = train::run_train_pipeline(&samples, &params, &output)?;
            println!("Model trained and saved as {}", output.display());
            println!(
                "  {} samples (Easy {}, Medium {}, Hard {}), {} nodes, {} leaves, depth {}",
                stats.total_samples,
                stats.per_class[0],
                stats.per_class[1],
                stats.per_class[2],
                stats.nodes,
                stats.leaves,
                stats.depth,
            );
            println!(
                "  training accuracy {:.1}% in {:.3}s",
                stats.training_accuracy * 100.0,
                stats.elapsed_secs
            );
        }

        Commands::Inspect { model, probe } => {
            let predictor = Predictor::load(&model)
                .with_context(|| format!("loading model from {}", model.display()))?;
            let artifact = predictor.artifact();

            print!("{}", display::render_card(artifact, predictor.source()));
            println!("── Rules ──");
            print!(
                "{}",
                display::render_tree(&artifact.tree, &artifact.feature_names)
            );

            if let Some(raw) = probe {
                let features = PredictionRequest::parse(&raw)?;
                let predicted = predictor.predict(&features)?;
                println!("── Probe ──");
                println!(
                    "  score={} time_taken={} → {predicted}",
                    features.score, features.time_taken
                );
                for (label, p) in predictor.predict_proba(&features)? {
                    println!("  {:<8}{:.3}", label.as_str(), p);
                }
            }
        }

        Commands::Assess { request } => {
            let json = match heuristic::assess_json(&request) {
                Ok(assessment) => serde_json::to_string(&assessment)?,
                Err(e) => serde_json::json!({ "error": e.to_string() }).to_string(),
            };
            println!("{json}");
        }
    }

    Ok(())
}
