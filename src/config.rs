//! Configuration loading and validation.
//!
//! All secrets arrive through the environment (or a `.env` file loaded by the
//! binary); the rest of the crate only ever sees the validated
//! [`DeployerConfig`]. Secret values are never printed: the `Debug`
//! implementations show the derived sender address and redact everything
//! else.

use std::fmt;

use alloy_primitives::Address;
use alloy_signer_local::PrivateKeySigner;
use thiserror::Error;
use url::Url;

/// Environment variable holding the hex-encoded deployer private key.
pub const PRIVATE_KEY_VAR: &str = "PRIVATE_KEY";
/// Environment variable holding the Base mainnet RPC endpoint.
pub const BASE_RPC_URL_VAR: &str = "BASE_RPC_URL";
/// Environment variable holding the Base Sepolia RPC endpoint.
pub const BASE_SEPOLIA_RPC_URL_VAR: &str = "BASE_SEPOLIA_RPC_URL";
/// Environment variable holding the Etherscan verification API key.
pub const ETHERSCAN_API_KEY_VAR: &str = "ETHERSCAN_API_KEY";

/// Chain id of Base mainnet.
pub const BASE_CHAIN_ID: u64 = 8453;
/// Chain id of Base Sepolia.
pub const BASE_SEPOLIA_CHAIN_ID: u64 = 84532;

/// Fixed gas price used for Base mainnet deployments, in wei.
pub const BASE_GAS_PRICE: u128 = 6_000_000;
/// Fixed gas price used for Base Sepolia deployments, in wei.
pub const BASE_SEPOLIA_GAS_PRICE: u128 = 1_000_000_000;

const BASE_EXPLORER_API_URL: &str = "https://api.etherscan.io/v2/api?chainid=8453";
const BASE_SEPOLIA_EXPLORER_API_URL: &str = "https://api.etherscan.io/v2/api?chainid=84532";
const BASE_EXPLORER_BROWSER_URL: &str = "https://basescan.org";
const BASE_SEPOLIA_EXPLORER_BROWSER_URL: &str = "https://sepolia.basescan.org";

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is absent or empty.
    #[error("required environment variable {0} is not set; add it to your .env file")]
    MissingVar(&'static str),

    /// A variable is present but its value could not be parsed.
    #[error("invalid {field}: {reason}")]
    Invalid {
        /// The variable that failed validation.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// The requested network profile does not exist.
    #[error("unknown network `{0}` (expected `base` or `base-sepolia`)")]
    UnknownNetwork(String),
}

/// Block-explorer verification endpoint for one network.
#[derive(Clone)]
pub struct VerifierConfig {
    /// Etherscan-compatible API key.
    pub api_key: String,
    /// Verification API endpoint.
    pub api_url: Url,
    /// Explorer browser URL for humans.
    pub browser_url: Url,
    /// Whether Sourcify verification is enabled for this network.
    pub sourcify_enabled: bool,
}

impl VerifierConfig {
    /// Returns the explorer page for a deployed contract address.
    pub fn contract_url(&self, address: Address) -> String {
        format!("{}/address/{address:#x}", self.browser_url.as_str().trim_end_matches('/'))
    }
}

impl fmt::Debug for VerifierConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerifierConfig")
            .field("api_key", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("browser_url", &self.browser_url)
            .field("sourcify_enabled", &self.sourcify_enabled)
            .finish()
    }
}

/// A deployable network target: endpoint, pricing, and verification mapping.
#[derive(Debug, Clone)]
pub struct NetworkProfile {
    /// Profile name used for selection (`base`, `base-sepolia`).
    pub name: &'static str,
    /// HTTP JSON-RPC endpoint.
    pub rpc_url: Url,
    /// Numeric chain identifier.
    pub chain_id: u64,
    /// Fixed gas price for submitted transactions, in wei.
    pub gas_price: u128,
    /// Block-explorer verification endpoint.
    pub verifier: VerifierConfig,
}

/// Solidity compiler settings the consumed artifacts are expected to match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolcConfig {
    /// Compiler version.
    pub version: &'static str,
    /// Whether the optimizer was enabled.
    pub optimizer_enabled: bool,
    /// Optimizer run count.
    pub optimizer_runs: u32,
    /// Whether compilation went through the Yul IR pipeline.
    pub via_ir: bool,
}

impl Default for SolcConfig {
    fn default() -> Self {
        Self { version: "0.8.26", optimizer_enabled: true, optimizer_runs: 200, via_ir: true }
    }
}

/// Validated deployment configuration.
///
/// Built once at startup, never mutated. The deploy routine receives this
/// (or pieces of it) explicitly; nothing below `main` reads the process
/// environment.
#[derive(Clone)]
pub struct DeployerConfig {
    /// Local signer derived from `PRIVATE_KEY`.
    pub signer: PrivateKeySigner,
    /// Available network profiles.
    pub networks: Vec<NetworkProfile>,
    /// Compiler settings the artifacts are expected to match.
    pub solc: SolcConfig,
}

impl fmt::Debug for DeployerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeployerConfig")
            .field("sender", &self.signer.address())
            .field("networks", &self.networks)
            .field("solc", &self.solc)
            .finish_non_exhaustive()
    }
}

impl DeployerConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds configuration from an arbitrary variable lookup.
    ///
    /// Validation is all-or-nothing: the first missing or malformed variable
    /// aborts construction and no profile is produced.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let private_key = require(&lookup, PRIVATE_KEY_VAR)?;
        let base_rpc_url = require(&lookup, BASE_RPC_URL_VAR)?;
        let base_sepolia_rpc_url = require(&lookup, BASE_SEPOLIA_RPC_URL_VAR)?;
        let etherscan_api_key = require(&lookup, ETHERSCAN_API_KEY_VAR)?;

        let signer: PrivateKeySigner = private_key
            .parse()
            .map_err(|e| ConfigError::Invalid { field: PRIVATE_KEY_VAR, reason: format!("{e}") })?;

        let networks = vec![
            NetworkProfile {
                name: "base",
                rpc_url: parse_url(BASE_RPC_URL_VAR, &base_rpc_url)?,
                chain_id: BASE_CHAIN_ID,
                gas_price: BASE_GAS_PRICE,
                verifier: verifier(&etherscan_api_key, BASE_EXPLORER_API_URL, BASE_EXPLORER_BROWSER_URL),
            },
            NetworkProfile {
                name: "base-sepolia",
                rpc_url: parse_url(BASE_SEPOLIA_RPC_URL_VAR, &base_sepolia_rpc_url)?,
                chain_id: BASE_SEPOLIA_CHAIN_ID,
                gas_price: BASE_SEPOLIA_GAS_PRICE,
                verifier: verifier(
                    &etherscan_api_key,
                    BASE_SEPOLIA_EXPLORER_API_URL,
                    BASE_SEPOLIA_EXPLORER_BROWSER_URL,
                ),
            },
        ];

        Ok(Self { signer, networks, solc: SolcConfig::default() })
    }

    /// Looks up a network profile by name.
    pub fn network(&self, name: &str) -> Result<&NetworkProfile, ConfigError> {
        self.networks
            .iter()
            .find(|n| n.name == name)
            .ok_or_else(|| ConfigError::UnknownNetwork(name.to_string()))
    }

    /// Address of the deploying account.
    pub fn sender(&self) -> Address {
        self.signer.address()
    }
}

fn require<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).filter(|v| !v.is_empty()).ok_or(ConfigError::MissingVar(name))
}

fn parse_url(field: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|e| ConfigError::Invalid { field, reason: e.to_string() })
}

fn verifier(api_key: &str, api_url: &'static str, browser_url: &'static str) -> VerifierConfig {
    VerifierConfig {
        api_key: api_key.to_string(),
        // Both URLs are compile-time literals.
        api_url: Url::parse(api_url).expect("static explorer API URL"),
        browser_url: Url::parse(browser_url).expect("static explorer browser URL"),
        sourcify_enabled: false,
    }
}
