use govgraph::app;
use govgraph::config::ServerConfig;
use std::env;

/// Main entry point for the GovGraph web server
///
/// Settings come from the environment (see [`ServerConfig::from_env`]); an
/// optional first argument overrides the bind address.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = ServerConfig::from_env()?;

    let args: Vec<String> = env::args().collect();
    if let Some(addr) = args.get(1) {
        config.addr = addr.clone();
    }

    log::info!(
        "Starting web server on {} with data in {}",
        config.addr,
        config.data_dir.display()
    );
    app::run(config).await
}
