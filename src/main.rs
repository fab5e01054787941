use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};

use holdout_eda::{EdaReport, NzvConfig, Threshold, binarize, missing_summary};
use holdout_eval::{
    FailurePolicy, LabeledSet, QdaClassifier, RandomForestClassifier, ResamplingConfig, ResamplingResult,
    ResamplingSummary, Summary,
};
use holdout_io::{
    CompareArtifact, Dataset, DatasetReader, DroppedFeature, ExperimentName, ExploreArtifact, MissingEntry,
    PairedEntry, ResultWriter, SummaryEntry, VarianceEntry,
};
use holdout_qda::QdaConfig;
use holdout_rf::{MaxFeatures, RandomForestConfig};

#[derive(Parser)]
#[command(name = "holdout")]
#[command(about = "Covariate screening and repeated hold-out comparison of QDA and Random Forest")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for reproducibility
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Dataset location and column roles shared by every command.
#[derive(Args, Debug, Clone)]
struct DataArgs {
    /// Path to the input CSV file
    #[arg(long)]
    data: PathBuf,

    /// Name of the continuous target column
    #[arg(long)]
    target: String,

    /// Columns to leave out of the covariates (repeatable)
    #[arg(long)]
    exclude: Vec<String>,

    /// Experiment name for output files (must match [a-zA-Z0-9_-]+)
    #[arg(long)]
    experiment: String,

    /// Output directory for result files
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
}

/// Covariate screening thresholds.
#[derive(Args, Debug, Clone)]
struct ScreenArgs {
    /// Absolute correlation above which one covariate of a pair is dropped
    #[arg(long, default_value_t = 0.9)]
    cutoff: f64,

    /// Near-zero-variance frequency-ratio cutoff
    #[arg(long, default_value_t = 95.0 / 5.0)]
    freq_cut: f64,

    /// Near-zero-variance percent-unique cutoff
    #[arg(long, default_value_t = 10.0)]
    unique_cut: f64,
}

impl ScreenArgs {
    fn nzv(&self) -> NzvConfig {
        NzvConfig::new()
            .with_freq_cut(self.freq_cut)
            .with_unique_cut(self.unique_cut)
    }
}

#[derive(Subcommand)]
enum Command {
    /// Report missing values, near-zero variance and correlated covariates
    Explore {
        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        screen: ScreenArgs,
    },

    /// Compare QDA and Random Forest over repeated random train/test splits
    Compare {
        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        screen: ScreenArgs,

        /// Skip covariate screening and use every covariate
        #[arg(long, default_value_t = false)]
        no_filter: bool,

        /// Target cut point (defaults to the median)
        #[arg(long)]
        threshold: Option<f64>,

        /// Number of random train/test splits
        #[arg(long, default_value_t = ResamplingConfig::DEFAULT_N_TRIALS)]
        trials: usize,

        /// Fraction of observations held out per split
        #[arg(long, default_value_t = 0.2)]
        test_fraction: f64,

        /// Confidence level of the summary intervals
        #[arg(long, default_value_t = 0.95)]
        confidence: f64,

        /// Number of trees in the Random Forest
        #[arg(long, default_value_t = RandomForestConfig::DEFAULT_N_TREES)]
        n_trees: usize,

        /// Features drawn per split (defaults to floor(sqrt(p)))
        #[arg(long)]
        max_features: Option<usize>,

        /// Per-trial classifier failure handling: "abort" or "nan"
        #[arg(long, default_value = "abort")]
        failure_policy: String,

        /// Run trials in parallel
        #[arg(long, default_value_t = false)]
        parallel: bool,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct ExploreOutput {
    experiment: String,
    n_rows: usize,
    n_covariates: usize,
    has_missing: bool,
    near_zero_variance: Vec<String>,
    highly_correlated: Vec<String>,
    retained: Vec<String>,
    artifact: PathBuf,
}

#[derive(Serialize)]
struct CompareOutput {
    experiment: String,
    n_rows: usize,
    n_features: usize,
    n_trials: usize,
    summaries: Vec<SummaryEntry>,
    paired: PairedEntry,
    artifact: PathBuf,
}

fn parse_failure_policy(s: &str) -> Result<FailurePolicy> {
    match s {
        "abort" => Ok(FailurePolicy::Abort),
        "nan" => Ok(FailurePolicy::RecordNan),
        other => anyhow::bail!("unknown failure policy: {other} (expected abort or nan)"),
    }
}

fn load(args: &DataArgs) -> Result<(Dataset, Vec<String>)> {
    let dataset = DatasetReader::new(&args.data)
        .read()
        .context("failed to read input CSV")?;
    info!(n_rows = dataset.n_rows(), n_columns = dataset.n_columns(), "dataset loaded");

    dataset
        .require_column(&args.target)
        .context("target column not found")?;
    for name in &args.exclude {
        dataset
            .require_column(name)
            .with_context(|| format!("excluded column {name} not found"))?;
    }
    let covariates = dataset
        .column_names()
        .iter()
        .filter(|&n| n != &args.target && !args.exclude.contains(n))
        .cloned()
        .collect();
    Ok((dataset, covariates))
}

fn summary_entry(classifier: &str, summary: &Summary) -> SummaryEntry {
    SummaryEntry {
        classifier: classifier.to_string(),
        n_trials: summary.n_trials,
        n_failed: summary.n_failed,
        mean: summary.mean,
        std_dev: summary.std_dev,
        ci_lower: summary.ci_lower,
        ci_upper: summary.ci_upper,
    }
}

fn summary_entries(result: &ResamplingResult, summary: &ResamplingSummary) -> (Vec<SummaryEntry>, PairedEntry) {
    let [first, second] = result.classifier_names();
    let entries = vec![
        summary_entry(first, &summary.first),
        summary_entry(second, &summary.second),
    ];
    let paired = PairedEntry {
        mean_difference: summary.paired.difference.mean,
        std_dev: summary.paired.difference.std_dev,
        ci_lower: summary.paired.difference.ci_lower,
        ci_upper: summary.paired.difference.ci_upper,
        first_better: summary.paired.first_better,
        second_better: summary.paired.second_better,
        ties: summary.paired.ties,
    };
    (entries, paired)
}

fn explore(args: &DataArgs, screen: &ScreenArgs) -> Result<()> {
    let experiment_name = ExperimentName::new(args.experiment.clone())?;
    let (dataset, covariates) = load(args)?;

    let report = EdaReport::build(&dataset, &covariates, &screen.nzv(), screen.cutoff)
        .context("covariate screening failed")?;

    let artifact = ExploreArtifact {
        experiment: args.experiment.clone(),
        n_rows: dataset.n_rows(),
        n_columns: dataset.n_columns(),
        target: args.target.clone(),
        missing: missing_summary(&dataset)
            .into_iter()
            .map(|m| MissingEntry {
                column: m.column,
                n_missing: m.n_missing,
                fraction: m.fraction,
            })
            .collect(),
        variance: report
            .variance
            .iter()
            .map(|d| VarianceEntry {
                column: d.column.clone(),
                freq_ratio: d.freq_ratio,
                percent_unique: d.percent_unique,
                zero_var: d.zero_var,
                nzv: d.nzv,
            })
            .collect(),
        correlation_cutoff: report.correlation_cutoff,
        correlation_columns: report.correlation.names().to_vec(),
        correlation_matrix: report.correlation.as_rows().to_vec(),
        highly_correlated: report.highly_correlated.clone(),
    };

    let writer = ResultWriter::new(&args.output_dir, experiment_name)?;
    let path = writer.write_explore(&artifact)?;

    let output = ExploreOutput {
        experiment: args.experiment.clone(),
        n_rows: dataset.n_rows(),
        n_covariates: covariates.len(),
        has_missing: report.has_missing(),
        near_zero_variance: report.near_zero_variance_columns(),
        highly_correlated: report.highly_correlated.clone(),
        retained: report.retained(),
        artifact: path,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Drop rows with a missing cell in any of `columns`.
fn complete_cases(dataset: Dataset, columns: &[String]) -> Result<Dataset> {
    let complete = dataset.complete_rows(columns)?;
    let n_dropped = dataset.n_rows() - complete.len();
    if n_dropped == 0 {
        return Ok(dataset);
    }
    warn!(n_dropped, n_kept = complete.len(), "dropping rows with missing values");
    Ok(dataset.subset(&complete)?)
}

fn compare(
    args: &DataArgs,
    screen: &ScreenArgs,
    no_filter: bool,
    threshold: Option<f64>,
    resampling: ResamplingConfig,
    forest: RandomForestConfig,
) -> Result<()> {
    let experiment_name = ExperimentName::new(args.experiment.clone())?;
    let (dataset, covariates) = load(args)?;

    // 1. Screen covariates
    let (features, dropped) = if no_filter {
        (covariates, Vec::new())
    } else {
        let report = EdaReport::build(&dataset, &covariates, &screen.nzv(), screen.cutoff)
            .context("covariate screening failed")?;
        let dropped: Vec<DroppedFeature> = report
            .dropped()
            .into_iter()
            .map(|(name, reason)| DroppedFeature {
                name,
                reason: reason.as_str().to_string(),
            })
            .collect();
        (report.retained(), dropped)
    };
    anyhow::ensure!(!features.is_empty(), "no covariates left after screening");
    info!(n_features = features.len(), n_dropped = dropped.len(), "covariates selected");

    // 2. Complete cases over the columns actually used
    let mut used = features.clone();
    used.push(args.target.clone());
    let dataset = complete_cases(dataset, &used)?;

    // 3. Binarize the target
    let threshold = threshold.map_or(Threshold::Median, Threshold::Value);
    let target = dataset.numeric_column(&args.target).context("target must be numeric")?;
    let binarized = binarize(target, threshold).context("failed to binarize target")?;

    // 4. Design matrix
    let design = dataset.design_matrix(&features)?;
    let n_features = design.feature_names.len();
    let data = LabeledSet::new(design, binarized.labels).context("failed to assemble labeled set")?;

    // 5. Resample
    let qda = QdaClassifier::new(QdaConfig::new(2)?);
    let rf = RandomForestClassifier::new(forest);
    let result = resampling
        .evaluate(&data, &qda, &rf)
        .context("resampling evaluation failed")?;

    let summary = result.summarize();
    info!(
        qda_mean = summary.first.mean,
        forest_mean = summary.second.mean,
        mean_difference = summary.paired.difference.mean,
        "comparison complete"
    );

    // 6. Write artifact
    let (summaries, paired) = summary_entries(&result, &summary);
    let artifact = CompareArtifact {
        experiment: args.experiment.clone(),
        seed: result.seed(),
        n_rows: result.n_samples(),
        n_trials: result.n_trials(),
        train_size: result.train_size(),
        test_size: result.test_size(),
        confidence: result.confidence(),
        target: args.target.clone(),
        threshold: binarized.threshold,
        n_above: binarized.n_above,
        n_below: binarized.n_below,
        features: data.feature_names().to_vec(),
        dropped,
        classifiers: result.classifier_names().iter().map(|s| s.to_string()).collect(),
        error_series: vec![result.first_errors(), result.second_errors()],
        summaries: summaries.clone(),
        paired: Some(paired.clone()),
    };
    let writer = ResultWriter::new(&args.output_dir, experiment_name)?;
    let path = writer.write_compare(&artifact)?;

    // 7. Print summary
    let output = CompareOutput {
        experiment: args.experiment.clone(),
        n_rows: result.n_samples(),
        n_features,
        n_trials: result.n_trials(),
        summaries,
        paired,
        artifact: path,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Configure Rayon thread pool
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Explore { data, screen } => explore(&data, &screen)?,

        Command::Compare {
            data,
            screen,
            no_filter,
            threshold,
            trials,
            test_fraction,
            confidence,
            n_trees,
            max_features,
            failure_policy,
            parallel,
        } => {
            let resampling = ResamplingConfig::new(trials)?
                .with_test_fraction(test_fraction)
                .with_seed(cli.seed)
                .with_failure_policy(parse_failure_policy(&failure_policy)?)
                .with_confidence(confidence)
                .with_parallel(parallel);

            let mut forest = RandomForestConfig::new(n_trees)?;
            if let Some(m) = max_features {
                forest = forest.with_max_features(MaxFeatures::Fixed(m));
            }

            compare(&data, &screen, no_filter, threshold, resampling, forest)?;
        }
    }

    Ok(())
}
