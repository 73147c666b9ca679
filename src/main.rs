//! Deployer binary entry point.

use clap::Parser;
use dotenvy::dotenv;
use tokenswap_deployer::{
    setup_signal_handler, ArtifactStore, ChainClientConfig, Cli, Deployer, DeployerConfig,
    HttpChainClient,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenv().ok();
    let cli = Cli::parse();
    init_logging(&cli);

    if let Err(e) = run(cli).await {
        error!(error = %e, "deployment failed");
        std::process::exit(1);
    }
}

fn init_logging(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.to_string()));

    if cli.log_format.eq_ignore_ascii_case("json") {
        tracing_subscriber::fmt().json().with_env_filter(filter).with_ansi(false).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = DeployerConfig::from_env()?;
    let network = config.network(&cli.network)?.clone();
    info!(
        version = env!("CARGO_PKG_VERSION"),
        network = %network.name,
        chain_id = network.chain_id,
        rpc = %network.rpc_url,
        sender = %config.sender(),
        "deployer starting"
    );

    let artifact = ArtifactStore::new(&cli.artifacts_dir).load(&cli.contract)?;
    artifact.check_compiler(&config.solc);

    let chain = HttpChainClient::new(
        ChainClientConfig::new(network.rpc_url.clone())
            .with_rpc_timeout(cli.rpc_timeout)
            .with_confirm_timeout(cli.confirm_timeout),
        config.signer.clone(),
    )?;

    let cancel = CancellationToken::new();
    setup_signal_handler(cancel.clone());

    let deployer = Deployer::new(chain, network);
    let outcome = deployer.deploy(&artifact, &cancel).await?;

    println!("{} deployed at {}", artifact.contract_name, outcome.contract_address);
    Ok(())
}
