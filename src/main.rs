//! Prediction server entry point.

use std::path::PathBuf;

use logipipe::{app_dirs, config, logging, server};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1).collect())?;
    let loaded =
        config::load_or_default(options.config.as_deref()).map_err(|err| err.to_string())?;
    let config = loaded
        .config
        .clone()
        .with_overrides(|config| {
            if let Some(host) = options.host {
                config.server.host = host;
            }
            if let Some(port) = options.port {
                config.server.port = port;
            }
            if let Some(model) = options.model {
                config.paths.model_path = model;
            }
        })
        .map_err(|err| err.to_string())?;

    let _log_guard = match logging::init(&config.paths.logs_dir, logging::SERVING_LOG_FILE) {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("Logging disabled: {err}");
            None
        }
    };
    loaded.log_source();

    let model_path = app_dirs::resolve(&config.paths.model_path).map_err(|err| err.to_string())?;
    let state = server::AppState::new(model_path);
    server::serve(&config.server, state)
        .await
        .map_err(|err| err.to_string())
}

#[derive(Debug, Default)]
struct CliOptions {
    config: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
    model: Option<PathBuf>,
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
            "--host" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--host requires a value".to_string())?;
                options.host = Some(value.clone());
            }
            "--port" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--port requires a value".to_string())?;
                options.port = Some(
                    value
                        .parse::<u16>()
                        .map_err(|_| format!("Invalid --port value: {value}"))?,
                );
            }
            "--model" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--model requires a value".to_string())?;
                options.model = Some(PathBuf::from(value));
            }
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }
    Ok(options)
}

fn help_text() -> String {
    [
        "logipipe",
        "",
        "Serves predictions from a trained pipeline artifact.",
        "",
        "Usage:",
        "  logipipe [--config configs/config.toml] [options]",
        "",
        "Options:",
        "  --config <file>  Config file (default: $LOGIPIPE_CONFIG or configs/config.toml).",
        "  --host <host>    Listen host (default: server.host).",
        "  --port <port>    Listen port (default: server.port).",
        "  --model <file>   Artifact path (default: paths.model_path).",
        "",
        "Endpoints:",
        "  GET  /health   Health check.",
        "  POST /predict  {\"features\": [f64, ...]} -> {\"prediction\": int}",
    ]
    .join("\n")
}
