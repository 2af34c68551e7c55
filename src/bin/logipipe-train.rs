//! Train the pipeline, write metrics and save the model artifact.

use std::path::PathBuf;

use logipipe::data::BuiltinDataset;
use logipipe::{config, logging, training};

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1).collect())?;
    let loaded =
        config::load_or_default(options.config.as_deref()).map_err(|err| err.to_string())?;
    let config = loaded
        .config
        .clone()
        .with_overrides(|config| {
            if let Some(dataset) = options.dataset {
                config.data.dataset = dataset;
            }
            if let Some(max_iter) = options.max_iter {
                config.model.max_iter = max_iter;
            }
            if let Some(out) = options.model_out {
                config.paths.model_path = out;
            }
            if options.track {
                config.tracking.enabled = true;
            }
        })
        .map_err(|err| err.to_string())?;

    let _log_guard = match logging::init(&config.paths.logs_dir, logging::TRAINING_LOG_FILE) {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("Logging disabled: {err}");
            None
        }
    };
    loaded.log_source();

    let report = training::run(&config).map_err(|err| {
        tracing::error!("Training failed: {err}");
        err.to_string()
    })?;

    println!("Test accuracy: {:.4}", report.accuracy);
    if let Some(run_id) = report.run_id {
        println!("Tracking run: {run_id}");
    }
    Ok(())
}

#[derive(Debug, Default)]
struct CliOptions {
    config: Option<PathBuf>,
    dataset: Option<BuiltinDataset>,
    max_iter: Option<u64>,
    model_out: Option<PathBuf>,
    track: bool,
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => return Err(help_text()),
            "--config" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--config requires a value".to_string())?;
                options.config = Some(PathBuf::from(value));
            }
            "--dataset" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--dataset requires a value".to_string())?;
                options.dataset = Some(match value.as_str() {
                    "iris" => BuiltinDataset::Iris,
                    "wine_quality" => BuiltinDataset::WineQuality,
                    other => return Err(format!("Unknown --dataset value: {other}")),
                });
            }
            "--max-iter" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--max-iter requires a value".to_string())?;
                options.max_iter = Some(
                    value
                        .parse::<u64>()
                        .map_err(|_| format!("Invalid --max-iter value: {value}"))?,
                );
            }
            "--out" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--out requires a value".to_string())?;
                options.model_out = Some(PathBuf::from(value));
            }
            "--track" => {
                options.track = true;
            }
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }
    Ok(options)
}

fn help_text() -> String {
    [
        "logipipe-train",
        "",
        "Fits StandardScaler + LogisticRegression on a built-in dataset.",
        "",
        "Usage:",
        "  logipipe-train [--config configs/config.toml] [options]",
        "",
        "Options:",
        "  --config <file>     Config file (default: $LOGIPIPE_CONFIG or configs/config.toml).",
        "  --dataset <name>    iris | wine_quality (default: data.dataset).",
        "  --max-iter <n>      Solver iteration cap (default: model.max_iter).",
        "  --out <file>        Artifact path (default: paths.model_path).",
        "  --track             Record the run with the local experiment tracker.",
    ]
    .join("\n")
}
