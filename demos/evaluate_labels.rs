//! Evaluate a predictions file against a directory of label records.
//!
//! ```text
//! cargo run --example evaluate_labels -- \
//!     --labels data/labels --names data/classes.txt \
//!     --predictions preds.json --classes bird,cat
//! ```
//!
//! Set `RUST_LOG=det_eval=debug` for per-image logging.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};

use det_eval::loader::{load_label_file, load_predictions_from_file, ClassNames};
use det_eval::{DatasetEvaluator, EvalConfig, ImageSample};

#[derive(Debug, Parser)]
#[command(name = "evaluate_labels", about = "Detection metrics and uncertainty analysis")]
struct Cli {
    /// Directory holding one `<image_id>.txt` label record per image
    #[arg(long)]
    labels: PathBuf,

    /// Class-name table, one name per line or a JSON array
    #[arg(long)]
    names: PathBuf,

    /// Predictions JSON keyed by image identifier
    #[arg(long)]
    predictions: PathBuf,

    /// Evaluation config JSON
    #[arg(long)]
    config: Option<PathBuf>,

    /// Classes of interest, overriding the config
    #[arg(long, value_delimiter = ',')]
    classes: Vec<String>,
}

fn load_config(cli: &Cli) -> Result<EvalConfig> {
    let config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str::<EvalConfig>(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None if cli.classes.is_empty() => bail!("either --config or --classes is required"),
        None => EvalConfig::new(Vec::<String>::new()),
    };

    let config = if cli.classes.is_empty() {
        config
    } else {
        EvalConfig {
            classes: cli.classes.iter().cloned().collect(),
            ..config
        }
    };
    config.validate().context("invalid evaluation config")?;
    Ok(config)
}

/// Image identifiers from label record file stems.
fn labelled_images(dir: &Path) -> Result<BTreeSet<String>> {
    let mut ids = BTreeSet::new();
    for entry in fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("txt") {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            ids.insert(stem.to_string());
        }
    }
    Ok(ids)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let names = ClassNames::from_file(&cli.names)
        .with_context(|| format!("reading class names {}", cli.names.display()))?;
    let mut predictions = load_predictions_from_file(&cli.predictions)
        .with_context(|| format!("reading predictions {}", cli.predictions.display()))?;

    let mut image_ids = labelled_images(&cli.labels)?;
    image_ids.extend(predictions.keys().cloned());
    info!(images = image_ids.len(), classes = config.classes.len(), "loaded inputs");

    let mut samples = Vec::with_capacity(image_ids.len());
    for image_id in image_ids {
        let path = cli.labels.join(format!("{image_id}.txt"));
        let record = match load_label_file(&path, &names) {
            Ok(record) => record,
            Err(e) => {
                warn!(image_id = %image_id, error = %e, "skipping image with unreadable labels");
                continue;
            }
        };
        let detections = predictions.remove(&image_id).unwrap_or_default();
        samples.push(ImageSample::new(image_id, detections, record.boxes));
    }

    let mut evaluator = DatasetEvaluator::new(config)?;
    evaluator.process_parallel(samples);

    let report = evaluator.report();
    info!("{}", report.stats.summary_string());
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
