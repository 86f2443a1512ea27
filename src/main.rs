use retro_concierge_lib::config::load_json_config;
use retro_concierge_lib::EngineConfig;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config: EngineConfig = match std::env::args_os().nth(1) {
        Some(path) => load_json_config(&PathBuf::from(path), "Config"),
        None => EngineConfig::default(),
    };

    retro_concierge_lib::run(config).await
}
