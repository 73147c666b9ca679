//! CLI argument definitions.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::Level;

/// Deploys a compiled contract to a Base network.
///
/// Secrets (`PRIVATE_KEY`, RPC URLs, `ETHERSCAN_API_KEY`) are read from the
/// environment or a `.env` file, never from flags.
#[derive(Debug, Clone, Parser)]
#[command(name = "tokenswap-deployer")]
#[command(version, about = "Deploys the TokenSwap contract to a Base network")]
pub struct Cli {
    /// Target network profile (`base` or `base-sepolia`).
    #[arg(long, env = "DEPLOY_NETWORK", default_value = "base-sepolia")]
    pub network: String,

    /// Name of the contract artifact to deploy.
    #[arg(long, env = "DEPLOY_CONTRACT", default_value = "TokenSwap")]
    pub contract: String,

    /// Directory containing compiled contract artifacts.
    #[arg(long = "artifacts-dir", env = "DEPLOY_ARTIFACTS_DIR", default_value = "artifacts")]
    pub artifacts_dir: PathBuf,

    /// Timeout for individual RPC requests (e.g. "30s", "1m").
    #[arg(
        long = "rpc-timeout",
        env = "DEPLOY_RPC_TIMEOUT",
        default_value = "30s",
        value_parser = parse_duration
    )]
    pub rpc_timeout: Duration,

    /// Overall timeout for transaction confirmation (e.g. "5m").
    #[arg(
        long = "confirm-timeout",
        env = "DEPLOY_CONFIRM_TIMEOUT",
        default_value = "5m",
        value_parser = parse_duration
    )]
    pub confirm_timeout: Duration,

    /// Log level.
    #[arg(long = "log-level", env = "DEPLOY_LOG_LEVEL", default_value = "info")]
    pub log_level: Level,

    /// Format for logs, can be json or text.
    #[arg(long = "log-format", env = "DEPLOY_LOG_FORMAT", default_value = "text")]
    pub log_format: String,
}

/// Parse a duration string like "30s", "5m", "1h".
fn parse_duration(s: &str) -> Result<Duration, humantime::DurationError> {
    humantime::parse_duration(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_valid() {
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("5m").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
    }

    #[test]
    fn test_parse_duration_invalid() {
        assert!(parse_duration("soon").is_err());
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "tokenswap-deployer",
            "--network",
            "base",
            "--contract",
            "TokenSwapV2",
            "--rpc-timeout",
            "10s",
        ])
        .unwrap();

        assert_eq!(cli.network, "base");
        assert_eq!(cli.contract, "TokenSwapV2");
        assert_eq!(cli.rpc_timeout, Duration::from_secs(10));
    }
}
