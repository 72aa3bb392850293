//! ASL Recognizer CLI
//!
//! Command-line interface for state-count selection and sign recognition

use anyhow::{Context, Result};
use asl_recognizer::{
    config::Config,
    data::{SequenceCorpus, TestSet},
    models::{GaussianHMM, GaussianHmmFitter, SequenceModel},
    recognizer::recognize,
    selectors::{train_all_words, StrategyKind},
    synthetic::{SyntheticGenerator, WordSpec},
};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "asl_recognizer")]
#[command(version = asl_recognizer::VERSION)]
#[command(about = "HMM state-count selection and isolated sign recognition")]
struct Cli {
    /// TOML configuration file (defaults to ./asl_recognizer.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Seed for every model fit (overrides the configuration file)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Selection strategy (overrides the configuration file)
    #[arg(short, long, global = true, value_enum)]
    strategy: Option<StrategyKind>,

    /// Log every model fit
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Select a state count for every word of a training CSV
    Select {
        /// Training CSV (word,sequence,frame,features...)
        #[arg(short, long)]
        train: PathBuf,
    },

    /// Train word models and recognise a test CSV
    Recognize {
        /// Training CSV
        #[arg(short, long)]
        train: PathBuf,

        /// Test CSV (sequence column holds the item id)
        #[arg(short = 'T', long)]
        test: PathBuf,

        /// Print the score table of every item
        #[arg(long)]
        show_scores: bool,
    },

    /// Run selection and recognition on a synthetic vocabulary
    Demo {
        /// Vocabulary size
        #[arg(short, long, default_value = "4")]
        words: usize,

        /// Training sequences per word
        #[arg(short = 'n', long, default_value = "10")]
        sequences: usize,

        /// Test items per word
        #[arg(long, default_value = "3")]
        test_per_word: usize,

        /// Frames per sequence
        #[arg(short, long, default_value = "20")]
        length: usize,

        /// Features per frame
        #[arg(short, long, default_value = "3")]
        features: usize,

        /// Data generation seed
        #[arg(long, default_value = "42")]
        data_seed: u64,

        /// Emission variance of the generating word models
        #[arg(long, default_value = "0.5")]
        variance: f64,

        /// Directory to write train.csv and test.csv to
        #[arg(short, long)]
        export: Option<PathBuf>,
    },
}

const DEFAULT_CONFIG_PATH: &str = "asl_recognizer.toml";

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::load_or_default(DEFAULT_CONFIG_PATH),
    };
    if cli.verbose {
        config.selector.verbose = true;
    }
    if let Some(seed) = cli.seed {
        config.selector = config.selector.with_seed(seed);
    }
    let strategy = cli.strategy.unwrap_or(config.strategy);

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("asl_recognizer={}", config.logging.level)))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Select { train } => {
            select_states(&train, strategy, &config)?;
        }
        Commands::Recognize {
            train,
            test,
            show_scores,
        } => {
            let corpus = SequenceCorpus::from_csv(&train)
                .with_context(|| format!("failed to read {}", train.display()))?;
            let test_set = TestSet::from_csv(&test)
                .with_context(|| format!("failed to read {}", test.display()))?;
            run_recognition(&corpus, &test_set, strategy, &config, show_scores)?;
        }
        Commands::Demo {
            words,
            sequences,
            test_per_word,
            length,
            features,
            data_seed,
            variance,
            export,
        } => {
            let generator = SyntheticGenerator::new(features, length, data_seed).with_variance(variance);
            run_demo(
                generator,
                words,
                sequences,
                test_per_word,
                export.as_deref(),
                strategy,
                &config,
            )?;
        }
    }

    Ok(())
}

fn train_models(
    corpus: &SequenceCorpus,
    strategy: StrategyKind,
    config: &Config,
) -> Result<IndexMap<String, Option<GaussianHMM>>> {
    println!(
        "{}",
        format!(
            "Selecting states with {} over {}..={} for {} words...",
            strategy,
            config.selector.min_n_components,
            config.selector.max_n_components,
            corpus.len()
        )
        .cyan()
    );

    let fitter = GaussianHmmFitter::from(&config.fitter);
    let models = train_all_words(corpus, &strategy, &config.selector, &fitter)?;
    Ok(models)
}

fn print_selection(models: &IndexMap<String, Option<GaussianHMM>>) {
    println!("\n{}", "=== Selected State Counts ===".bold());
    for (word, model) in models {
        match model {
            Some(model) if model.converged() => println!("  {:<16} {}", word, model.n_states()),
            Some(model) => println!(
                "  {:<16} {} {}",
                word,
                model.n_states(),
                "(EM hit the iteration cap)".yellow()
            ),
            None => println!("  {:<16} {}", word, "no model".red()),
        }
    }
}

fn select_states(train: &Path, strategy: StrategyKind, config: &Config) -> Result<()> {
    let corpus = SequenceCorpus::from_csv(train)
        .with_context(|| format!("failed to read {}", train.display()))?;
    info!("Loaded {} words with {} features", corpus.len(), corpus.n_features());

    let models = train_models(&corpus, strategy, config)?;
    print_selection(&models);
    Ok(())
}

fn run_recognition(
    corpus: &SequenceCorpus,
    test_set: &TestSet,
    strategy: StrategyKind,
    config: &Config,
    show_scores: bool,
) -> Result<()> {
    for label in test_set.labels() {
        if !corpus.contains(label) {
            warn!("test label {} is not in the training vocabulary", label);
        }
    }

    let models = train_models(corpus, strategy, config)?;
    print_selection(&models);

    println!("\n{}", format!("Recognising {} test items...", test_set.len()).cyan());
    let output = recognize(&models, test_set);

    if show_scores {
        println!("\n{}", "=== Scores ===".bold());
        for ((id, table), guess) in output.item_ids.iter().zip(&output.probabilities).zip(&output.guesses) {
            let scores: Vec<String> = table
                .iter()
                .map(|(word, score)| format!("{}={:.1}", word, score))
                .collect();
            println!(
                "  {:>4} {:<12} {}",
                id,
                guess.as_deref().unwrap_or("<unknown>"),
                scores.join(" ")
            );
        }
    }

    println!();
    output.print_report(test_set);
    Ok(())
}

fn run_demo(
    mut generator: SyntheticGenerator,
    n_words: usize,
    n_sequences: usize,
    test_per_word: usize,
    export: Option<&Path>,
    strategy: StrategyKind,
    config: &Config,
) -> Result<()> {
    println!("{}", "=== Synthetic Sign Demo ===".bold());

    // True state counts cycle through 2, 3, 4; words sit far apart
    let specs: Vec<WordSpec> = (0..n_words)
        .map(|i| WordSpec::new(format!("WORD{}", i), 2 + i % 3, 25.0 * i as f64))
        .collect();

    let corpus = generator.corpus(&specs, n_sequences)?;
    let test_set = generator.test_set(&specs, test_per_word)?;
    println!(
        "Generated {} training sequences and {} test items",
        n_words * n_sequences,
        test_set.len()
    );

    if let Some(dir) = export {
        std::fs::create_dir_all(dir)?;
        corpus.to_csv(dir.join("train.csv"))?;
        test_set.to_csv(dir.join("test.csv"))?;
        println!("Exported data to {}", dir.display().to_string().green());
    }

    let models = train_models(&corpus, strategy, config)?;

    println!("\n{}", "=== True vs Selected States ===".bold());
    for spec in &specs {
        let selected = models
            .get(&spec.word)
            .and_then(Option::as_ref)
            .map_or_else(|| "-".to_string(), |model| model.n_states().to_string());
        let line = format!("  {:<10} true={} selected={}", spec.word, spec.n_states, selected);
        if selected == spec.n_states.to_string() {
            println!("{}", line.green());
        } else {
            println!("{}", line.yellow());
        }
    }

    println!();
    let output = recognize(&models, &test_set);
    output.print_report(&test_set);
    Ok(())
}
