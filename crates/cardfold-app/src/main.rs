use std::path::{Path, PathBuf};

use anyhow::Context;
use cardfold_core::config::load_config;
use cardfold_pipeline::run;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt::layer().with_target(true))
        .init();

    tracing::info!("Starting contact reconciliation");

    let config = load_config()?;

    tracing::info!(config = ?config, "Configuration loaded");

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping info");
    }

    let google = config
        .inputs
        .google
        .as_deref()
        .and_then(read_export)
        .transpose()?;
    let apple = config
        .inputs
        .apple
        .as_deref()
        .and_then(read_export)
        .transpose()?;

    let output = run(google.as_deref(), apple.as_deref())?;

    let date = chrono::Local::now().format("%Y-%m-%d");
    let google_path = PathBuf::from(&config.output.dir).join(format!("contacts_google_{date}.vcf"));
    let apple_path = PathBuf::from(&config.output.dir).join(format!("contacts_apple_{date}.vcf"));

    std::fs::write(&google_path, &output.google_export)
        .with_context(|| format!("failed to write {}", google_path.display()))?;
    std::fs::write(&apple_path, &output.apple_export)
        .with_context(|| format!("failed to write {}", apple_path.display()))?;

    let stats = &output.stats;
    tracing::info!(
        read_google = stats.read_google,
        read_apple = stats.read_apple,
        discarded = stats.discarded,
        merged = stats.merged,
        final_count = stats.final_count,
        "Reconciliation complete"
    );
    for (reason, count) in &stats.discard_reasons {
        tracing::info!(reason, count, "discard summary");
    }
    for (record, reason) in &output.discarded {
        tracing::debug!(uid = %record.uid, name = %record.full_name, reason, "discarded");
    }
    tracing::info!(
        google = %google_path.display(),
        apple = %apple_path.display(),
        "Outputs written"
    );

    Ok(())
}

/// Reads one export file. A missing file is treated as an absent input,
/// not an error; anything else (permissions, encoding) aborts the run.
fn read_export(path: &str) -> Option<anyhow::Result<String>> {
    match std::fs::read_to_string(Path::new(path)) {
        Ok(contents) => Some(Ok(contents)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path, "input file not found, skipping");
            None
        }
        Err(e) => Some(Err(
            anyhow::Error::new(e).context(format!("failed to read {path}"))
        )),
    }
}
