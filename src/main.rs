use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use captionset::{
    FeatureSettings, Settings, WavLoader, count_split_files, create_dataset,
    extract_dataset_features, load_vocabularies, validate_dataset, vocabulary_report,
    words_with_frequency, write_word_list,
};

#[derive(Parser)]
#[command(name = "captionset")]
#[command(author, version, about = "Audio captioning dataset builder", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build, validate and optionally featurize the dataset
    Process {
        /// Dataset settings file (JSON)
        #[arg(short, long)]
        settings: PathBuf,

        /// Feature extraction settings file (JSON)
        #[arg(short, long)]
        features: Option<PathBuf>,

        /// Number of worker threads, overrides `nb_workers`
        #[arg(short, long)]
        workers: Option<usize>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Report vocabulary and split statistics of a built dataset
    Analyze {
        /// Dataset settings file (JSON)
        #[arg(short, long)]
        settings: PathBuf,

        /// List the words occurring exactly this many times
        #[arg(long)]
        frequency: Option<u64>,

        /// Write the listed words here, one per line
        #[arg(short, long, requires = "frequency")]
        output: Option<PathBuf>,

        /// Number of most frequent words to show
        #[arg(long, default_value = "10")]
        top: usize,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            settings,
            features,
            workers,
            verbose,
        } => {
            setup_logging(verbose);
            process_dataset(settings, features, workers)
        }
        Commands::Analyze {
            settings,
            frequency,
            output,
            top,
            verbose,
        } => {
            setup_logging(verbose);
            analyze_dataset(settings, frequency, output, top)
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn process_dataset(
    settings_path: PathBuf,
    features_path: Option<PathBuf>,
    workers: Option<usize>,
) -> Result<()> {
    info!("Loading settings from {:?}", settings_path);
    let settings = Settings::load(&settings_path).context("Failed to load settings")?;
    let workers = workers.unwrap_or(settings.nb_workers);
    let loader = WavLoader;

    if settings.workflow.create_dataset {
        info!("Creating dataset...");
        let summary =
            create_dataset(&settings, &loader, workers).context("Dataset creation failed")?;
        info!(
            "Vocabularies: {} words, {} characters",
            summary.word_vocabulary_size, summary.character_vocabulary_size
        );
        info!(
            "Records: {} development, {} evaluation",
            summary.development.records_written, summary.evaluation.records_written
        );
    }

    if settings.workflow.validate_dataset {
        info!("Validating dataset...");
        let summary =
            validate_dataset(&settings, &loader, workers).context("Dataset validation failed")?;
        info!(
            "Validated {} development and {} evaluation records",
            summary.development.records_checked, summary.evaluation.records_checked
        );
    }

    if settings.workflow.extract_features {
        let feature_settings = match features_path {
            Some(path) => {
                FeatureSettings::load(&path).context("Failed to load feature settings")?
            }
            None => FeatureSettings::default(),
        };
        info!("Extracting features with {}...", feature_settings.extractor);
        let result = extract_dataset_features(&settings, &feature_settings, workers)
            .context("Feature extraction failed")?;
        info!(
            "Features written for {} development and {} evaluation records",
            result.development_records, result.evaluation_records
        );
    }

    info!("Complete");
    Ok(())
}

fn analyze_dataset(
    settings_path: PathBuf,
    frequency: Option<u64>,
    output: Option<PathBuf>,
    top: usize,
) -> Result<()> {
    info!("Analyzing dataset from {:?}", settings_path);
    let settings = Settings::load(&settings_path).context("Failed to load settings")?;
    let vocabularies = load_vocabularies(&settings.directories.root_dir, &settings.counters)
        .context("Failed to load vocabularies")?;
    let report = vocabulary_report(&vocabularies, top);

    println!("Dataset Analysis");
    println!("================");
    println!("Word vocabulary: {}", report.word_count);
    println!("Character vocabulary: {}", report.character_count);
    println!("Word occurrences: {}", report.word_occurrences);
    println!();

    println!("Most Frequent Words");
    println!("-------------------");
    for (word, count) in &report.most_frequent {
        println!("{:>8}  {}", count, word);
    }
    println!();

    println!("Splits");
    println!("------");
    let splits = [
        (
            "development",
            settings.audio_dir_development(),
            settings.data_dir_development(),
        ),
        (
            "evaluation",
            settings.audio_dir_evaluation(),
            settings.data_dir_evaluation(),
        ),
    ];
    for (name, audio_dir, data_dir) in &splits {
        let counts = count_split_files(audio_dir, data_dir)
            .with_context(|| format!("Failed to count {} files", name))?;
        println!(
            "{}: {} audio files, {} records",
            name, counts.audio_files, counts.record_files
        );
    }

    if let Some(frequency) = frequency {
        let words = words_with_frequency(&vocabularies.words, frequency);
        println!();
        println!("Words occurring {} times: {}", frequency, words.len());
        match output {
            Some(path) => {
                write_word_list(&path, &words).context("Failed to write word list")?;
                info!("Word list written to {:?}", path);
            }
            None => {
                for word in &words {
                    println!("  {}", word);
                }
            }
        }
    }

    Ok(())
}
