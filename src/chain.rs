//! Chain access: a narrow client trait plus the alloy HTTP implementation.
//!
//! The deployment workflow is written against [`ChainClient`] so that it can
//! be exercised against a scripted chain in tests. The production
//! implementation signs locally and talks JSON-RPC over HTTP with a
//! per-request timeout.

use std::fmt;
use std::time::Duration;

use alloy_eips::Encodable2718;
use alloy_network::{Ethereum, EthereumWallet, NetworkWallet, TransactionBuilder};
use alloy_primitives::{Address, Bytes, TxHash};
use alloy_provider::{Provider, RootProvider};
use alloy_rpc_client::RpcClient;
use alloy_rpc_types_eth::{TransactionReceipt, TransactionRequest};
use alloy_signer_local::PrivateKeySigner;
use alloy_transport_http::{reqwest::Client, Http};
use async_trait::async_trait;
use url::Url;

use crate::error::DeployError;

/// Default timeout applied to individual RPC requests.
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(30);
/// Default overall timeout for confirmation waiting.
pub const DEFAULT_CONFIRM_TIMEOUT: Duration = Duration::from_secs(300);
/// Default receipt polling interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Confirmation details extracted from a mined transaction receipt.
#[derive(Debug, Clone)]
pub struct Confirmation {
    /// Hash of the mined transaction.
    pub tx_hash: TxHash,
    /// Whether the transaction succeeded.
    pub status: bool,
    /// Address of the created contract, when the transaction was a create.
    pub contract_address: Option<Address>,
    /// Block the transaction was included in.
    pub block_number: Option<u64>,
    /// Gas actually consumed.
    pub gas_used: u64,
}

impl Confirmation {
    fn from_receipt(receipt: &TransactionReceipt) -> Self {
        Self {
            tx_hash: receipt.transaction_hash,
            status: receipt.status(),
            contract_address: receipt.contract_address,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
        }
    }
}

/// Minimal chain interface consumed by the deployment workflow.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Address the client signs and sends from.
    fn sender(&self) -> Address;

    /// Returns the current nonce for `address`.
    async fn transaction_count(&self, address: Address) -> Result<u64, DeployError>;

    /// Asks the node for a gas estimate on `tx`.
    async fn estimate_gas(&self, tx: TransactionRequest) -> Result<u64, DeployError>;

    /// Signs and broadcasts `tx`, returning its hash.
    async fn submit_transaction(&self, tx: TransactionRequest) -> Result<TxHash, DeployError>;

    /// Waits until `tx_hash` is mined, bounded by the client's confirmation
    /// timeout.
    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> Result<Confirmation, DeployError>;
}

/// Configuration for [`HttpChainClient`].
#[derive(Debug, Clone)]
pub struct ChainClientConfig {
    /// JSON-RPC endpoint URL.
    pub endpoint: Url,
    /// Per-request timeout.
    pub rpc_timeout: Duration,
    /// Overall timeout for confirmation waiting.
    pub confirm_timeout: Duration,
    /// Receipt polling interval.
    pub poll_interval: Duration,
}

impl ChainClientConfig {
    /// Creates a configuration with default timeouts.
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            rpc_timeout: DEFAULT_RPC_TIMEOUT,
            confirm_timeout: DEFAULT_CONFIRM_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Sets the per-request timeout.
    pub const fn with_rpc_timeout(mut self, timeout: Duration) -> Self {
        self.rpc_timeout = timeout;
        self
    }

    /// Sets the confirmation timeout.
    pub const fn with_confirm_timeout(mut self, timeout: Duration) -> Self {
        self.confirm_timeout = timeout;
        self
    }

    /// Sets the receipt polling interval.
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

/// HTTP JSON-RPC chain client with local signing.
pub struct HttpChainClient {
    provider: RootProvider<Ethereum>,
    wallet: EthereumWallet,
    endpoint: Url,
    confirm_timeout: Duration,
    poll_interval: Duration,
}

impl fmt::Debug for HttpChainClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpChainClient")
            .field("endpoint", &self.endpoint)
            .field("sender", &self.sender())
            .finish_non_exhaustive()
    }
}

impl HttpChainClient {
    /// Creates a client for `config.endpoint`, signing with `signer`.
    pub fn new(config: ChainClientConfig, signer: PrivateKeySigner) -> Result<Self, DeployError> {
        let client = Client::builder().timeout(config.rpc_timeout).build().map_err(|e| {
            DeployError::Rpc { call: "HTTP client setup", reason: e.to_string() }
        })?;

        let http = Http::with_client(client, config.endpoint.clone());
        let rpc_client = RpcClient::new(http, false);
        // No fillers: the deployer fills nonce, gas, and fees itself so the
        // estimated request and the submitted request stay identical.
        let provider = RootProvider::<Ethereum>::new(rpc_client);

        Ok(Self {
            provider,
            wallet: EthereumWallet::from(signer),
            endpoint: config.endpoint,
            confirm_timeout: config.confirm_timeout,
            poll_interval: config.poll_interval,
        })
    }
}

#[async_trait]
impl ChainClient for HttpChainClient {
    fn sender(&self) -> Address {
        NetworkWallet::<Ethereum>::default_signer_address(&self.wallet)
    }

    async fn transaction_count(&self, address: Address) -> Result<u64, DeployError> {
        self.provider.get_transaction_count(address).await.map_err(|e| DeployError::Rpc {
            call: "eth_getTransactionCount",
            reason: e.to_string(),
        })
    }

    async fn estimate_gas(&self, tx: TransactionRequest) -> Result<u64, DeployError> {
        self.provider
            .estimate_gas(tx)
            .await
            .map_err(|e| DeployError::Rpc { call: "eth_estimateGas", reason: e.to_string() })
    }

    async fn submit_transaction(&self, tx: TransactionRequest) -> Result<TxHash, DeployError> {
        let envelope = <TransactionRequest as TransactionBuilder<Ethereum>>::build(tx, &self.wallet)
            .await
            .map_err(|e| DeployError::Signing(e.to_string()))?;
        let encoded = Bytes::from(Encodable2718::encoded_2718(&envelope));

        let pending = self.provider.send_raw_transaction(&encoded).await.map_err(|e| {
            DeployError::Rpc { call: "eth_sendRawTransaction", reason: e.to_string() }
        })?;
        Ok(*pending.tx_hash())
    }

    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> Result<Confirmation, DeployError> {
        let poll = async {
            loop {
                match self.provider.get_transaction_receipt(tx_hash).await {
                    Ok(Some(receipt)) => return Ok(Confirmation::from_receipt(&receipt)),
                    Ok(None) => tokio::time::sleep(self.poll_interval).await,
                    Err(e) => {
                        return Err(DeployError::Rpc {
                            call: "eth_getTransactionReceipt",
                            reason: e.to_string(),
                        })
                    }
                }
            }
        };

        tokio::time::timeout(self.confirm_timeout, poll).await.map_err(|_| {
            DeployError::Timeout { call: "transaction confirmation", timeout: self.confirm_timeout }
        })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ChainClientConfig::new(Url::parse("https://sepolia.base.org").unwrap());
        assert_eq!(config.rpc_timeout, Duration::from_secs(30));
        assert_eq!(config.confirm_timeout, Duration::from_secs(300));
        assert_eq!(config.poll_interval, Duration::from_secs(2));
    }

    #[test]
    fn test_config_builders() {
        let config = ChainClientConfig::new(Url::parse("https://sepolia.base.org").unwrap())
            .with_rpc_timeout(Duration::from_secs(5))
            .with_confirm_timeout(Duration::from_secs(60))
            .with_poll_interval(Duration::from_millis(500));
        assert_eq!(config.rpc_timeout, Duration::from_secs(5));
        assert_eq!(config.confirm_timeout, Duration::from_secs(60));
        assert_eq!(config.poll_interval, Duration::from_millis(500));
    }

    #[test]
    fn test_client_debug_redacts_wallet() {
        let signer: PrivateKeySigner =
            "0xac0974bec39a697d7497c29ac9edcae786ea7b241bafbd1b7856ee9c3b687a46".parse().unwrap();
        let config = ChainClientConfig::new(Url::parse("https://sepolia.base.org").unwrap());
        let client = HttpChainClient::new(config, signer).unwrap();

        let rendered = format!("{client:?}");
        assert!(!rendered.contains("ac0974bec39a697d"));
        assert!(rendered.contains("sepolia.base.org"));
    }
}
