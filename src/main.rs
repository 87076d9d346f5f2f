use clap::Parser;
use std::sync::Arc;

use eth_tx_parser::api::ApiServer;
use eth_tx_parser::blockchain::{BlockMonitor, BlockMonitorConfig, RpcClient};
use eth_tx_parser::config::AppConfig;
use eth_tx_parser::logging::init_logging;
use eth_tx_parser::notification::{LogNotifier, Notifier, WebhookNotifier};
use eth_tx_parser::storage::MemoryStorage;

#[derive(Parser)]
#[command(name = "parser")]
#[command(about = "Watches an Ethereum node for transactions touching subscribed addresses")]
#[command(version)]
struct Args {
    /// Configuration file (defaults to $CONFIG_FILE or ./config.toml)
    #[arg(long)]
    config: Option<String>,

    /// JSON-RPC endpoint, overrides the configuration
    #[arg(long)]
    rpc_url: Option<String>,

    /// API server port, overrides the configuration
    #[arg(long)]
    port: Option<u16>,

    /// Print a sample configuration file and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if args.print_config {
        println!("{}", AppConfig::generate_sample_config()?);
        return Ok(());
    }

    let mut config = AppConfig::load(args.config.as_deref())?;
    config.apply_cli_overrides(args.rpc_url, args.port);
    config.validate()?;

    init_logging(&config.logging)?;
    log::info!("Starting Ethereum transaction parser against {}", config.rpc.endpoint);

    let gateway = Arc::new(RpcClient::new(config.rpc.endpoint.clone(), config.rpc.timeout_seconds)?);
    let storage = Arc::new(MemoryStorage::new());
    let notifier: Arc<dyn Notifier> = match &config.notification.webhook_url {
        Some(url) => Arc::new(WebhookNotifier::new(url.clone(), config.notification.timeout_seconds)?),
        None => Arc::new(LogNotifier::new()),
    };

    let monitor = Arc::new(BlockMonitor::new(
        gateway,
        storage,
        notifier,
        Some(BlockMonitorConfig::from(&config.polling)),
    ));

    let poller = {
        let monitor = Arc::clone(&monitor);
        tokio::spawn(async move { monitor.start().await })
    };

    let shutdown = {
        let monitor = Arc::clone(&monitor);
        async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => log::info!("Received shutdown signal"),
                Err(e) => {
                    log::error!("Unable to listen for shutdown signal: {}", e);
                    std::future::pending::<()>().await;
                }
            }
            monitor.shutdown();
        }
    };

    let server = ApiServer::new(Arc::clone(&monitor), config.api.host.clone(), config.api.port);
    let served = server.start(shutdown).await;

    // bind failures end up here without a ctrl-c
    monitor.shutdown();
    if let Err(e) = poller.await {
        log::error!("Poll task ended abnormally: {}", e);
    }

    served?;
    log::info!("Shutdown complete");
    Ok(())
}
