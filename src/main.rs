use anyhow::Result;
use clap::Parser;
use streamscribe::cli::Cli;
use streamscribe::config::Config;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// The receive loop is the only async work; everything else runs on the
// dedicated worker thread.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.quiet, cli.verbose);

    let config = load_config(&cli)?;
    config.validate()?;

    info!(
        version = %streamscribe::version_string(),
        channel = %cli.channel_id,
        endpoint = %config.stream.endpoint,
        "starting streamscribe"
    );

    streamscribe::app::run(config, cli.channel_id).await?;
    Ok(())
}

/// Load configuration and apply override layers.
///
/// Priority order (lowest to highest):
/// 1. Built-in defaults
/// 2. Config file (--config path, or the default location)
/// 3. Environment variables (STREAMSCRIBE_*)
/// 4. CLI flags
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(path) = cli.config.as_deref() {
        Config::load(path)?
    } else {
        Config::load_or_default(&Config::default_path())?
    }
    .with_env_overrides();

    if let Some(endpoint) = &cli.endpoint {
        config.stream.endpoint = endpoint.clone();
    }
    if let Some(language) = &cli.language {
        config.speech.language = language.clone();
    }
    if let Some(dir) = &cli.output_dir {
        config.output.directory = dir.clone();
    }
    if let Some(step) = cli.step_bytes {
        config.buffer.step_bytes = step;
    }
    if let Some(credentials) = &cli.credentials {
        config.speech.credentials = Some(credentials.clone());
    }

    Ok(config)
}

/// Initialize console logging.
///
/// The demo logs at debug by default; `--quiet` keeps only warnings and
/// `-v` turns on trace. `RUST_LOG` overrides all of it.
fn init_tracing(quiet: bool, verbose: u8) {
    let default_filter = if quiet {
        "streamscribe=warn"
    } else if verbose > 0 {
        "streamscribe=trace"
    } else {
        "streamscribe=debug"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
