//! Predict one sample from the command line using a saved artifact.

use std::path::PathBuf;

use logipipe::{app_dirs, config, inference};

fn main() {
    if let Err(err) = run() {
        eprintln!("Error while predicting: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1).collect())?;
    let model_path = match options.model {
        Some(path) => path,
        None => {
            let loaded = config::load_or_default(options.config.as_deref())
                .map_err(|err| err.to_string())?;
            if !loaded.from_file {
                eprintln!(
                    "No config file at {}; using defaults",
                    loaded.path.display()
                );
            }
            loaded.config.paths.model_path
        }
    };
    let model_path = app_dirs::resolve(&model_path).map_err(|err| err.to_string())?;
    let prediction =
        inference::predict(&model_path, &options.features).map_err(|err| err.to_string())?;
    println!("Prediction: {prediction}");
    Ok(())
}

#[derive(Debug)]
struct CliOptions {
    config: Option<PathBuf>,
    model: Option<PathBuf>,
    features: Vec<f64>,
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut config = None;
    let mut model = None;
    let mut features = None;
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => return Err(help_text()),
            "--config" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--config requires a value".to_string())?;
                config = Some(PathBuf::from(value));
            }
            "--model" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--model requires a value".to_string())?;
                model = Some(PathBuf::from(value));
            }
            "--features" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--features requires a value".to_string())?;
                features = Some(parse_features(value)?);
            }
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }
    let features = features.ok_or_else(help_text)?;
    Ok(CliOptions {
        config,
        model,
        features,
    })
}

fn parse_features(value: &str) -> Result<Vec<f64>, String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<f64>()
                .map_err(|_| format!("Invalid feature value: {part}"))
        })
        .collect()
}

fn help_text() -> String {
    [
        "logipipe-predict",
        "",
        "Loads the trained pipeline and predicts a single sample.",
        "",
        "Usage:",
        "  logipipe-predict --features 5.1,3.5,1.4,0.2 [--model models/model.json]",
        "",
        "Options:",
        "  --features <list>  Comma-separated feature values (required).",
        "  --model <file>     Artifact path (default: paths.model_path from config).",
        "  --config <file>    Config file used to find the artifact.",
    ]
    .join("\n")
}
