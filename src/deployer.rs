//! The sequential deployment workflow.
//!
//! One transaction request is built up front and used for both gas
//! estimation and submission; only the gas limit is set between the two, so
//! the estimate always refers to the exact bytes that go on chain.

use std::future::Future;

use alloy_network::TransactionBuilder;
use alloy_primitives::{Address, TxHash, TxKind};
use alloy_rpc_types_eth::{TransactionInput, TransactionRequest};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::artifacts::ContractArtifact;
use crate::chain::ChainClient;
use crate::config::NetworkProfile;
use crate::error::DeployError;

/// Multiplier applied to the node's gas estimate to form the gas limit.
const GAS_LIMIT_MULTIPLIER: u64 = 2;

/// Doubles a gas estimate to form the submission gas limit, saturating at
/// `u64::MAX`.
const fn deployment_gas_limit(estimate: u64) -> u64 {
    estimate.saturating_mul(GAS_LIMIT_MULTIPLIER)
}

/// Result of a completed deployment.
#[derive(Debug, Clone)]
pub struct DeploymentOutcome {
    /// On-chain address of the deployed contract.
    pub contract_address: Address,
    /// Hash of the deployment transaction.
    pub tx_hash: TxHash,
    /// Gas estimate returned by the node.
    pub gas_estimate: u64,
    /// Gas limit actually submitted (twice the estimate).
    pub gas_limit: u64,
    /// Block the deployment was mined in.
    pub block_number: Option<u64>,
    /// Gas consumed by the deployment.
    pub gas_used: u64,
}

/// Deploys contract artifacts to a single network.
#[derive(Debug)]
pub struct Deployer<C> {
    chain: C,
    network: NetworkProfile,
}

impl<C: ChainClient> Deployer<C> {
    /// Creates a deployer targeting `network` through `chain`.
    pub fn new(chain: C, network: NetworkProfile) -> Self {
        Self { chain, network }
    }

    /// Deploys `artifact` with no constructor arguments.
    ///
    /// Steps, strictly in sequence: fetch the sender nonce, build the
    /// deployment request, estimate gas, submit with a doubled gas limit,
    /// wait for confirmation, extract the contract address. Any failure
    /// propagates unchanged; `cancel` aborts between and during steps.
    pub async fn deploy(
        &self,
        artifact: &ContractArtifact,
        cancel: &CancellationToken,
    ) -> Result<DeploymentOutcome, DeployError> {
        let sender = self.chain.sender();
        info!(
            contract = %artifact.contract_name,
            network = %self.network.name,
            chain_id = self.network.chain_id,
            %sender,
            "starting deployment"
        );

        let nonce = race(cancel, self.chain.transaction_count(sender)).await?;

        let mut tx = TransactionRequest::default()
            .from(sender)
            .input(TransactionInput::new(artifact.bytecode.clone()))
            .nonce(nonce);
        tx.set_kind(TxKind::Create);
        tx.set_chain_id(self.network.chain_id);
        tx.set_gas_price(self.network.gas_price);

        let gas_estimate = race(cancel, self.chain.estimate_gas(tx.clone())).await?;
        let gas_limit = deployment_gas_limit(gas_estimate);
        info!(gas_estimate, gas_limit, "gas estimated");

        tx.set_gas_limit(gas_limit);
        let tx_hash = race(cancel, self.chain.submit_transaction(tx)).await?;
        info!(%tx_hash, "deployment transaction submitted, waiting for confirmation");

        let confirmation = race(cancel, self.chain.wait_for_confirmation(tx_hash)).await?;
        if !confirmation.status {
            return Err(DeployError::Reverted { tx_hash });
        }
        let contract_address = confirmation
            .contract_address
            .ok_or(DeployError::MissingContractAddress { tx_hash })?;

        info!(
            address = %contract_address,
            block_number = ?confirmation.block_number,
            gas_used = confirmation.gas_used,
            explorer = %self.network.verifier.contract_url(contract_address),
            "contract deployed"
        );

        Ok(DeploymentOutcome {
            contract_address,
            tx_hash,
            gas_estimate,
            gas_limit,
            block_number: confirmation.block_number,
            gas_used: confirmation.gas_used,
        })
    }
}

/// Races a deployment step against the cancellation token.
async fn race<T, F>(cancel: &CancellationToken, step: F) -> Result<T, DeployError>
where
    F: Future<Output = Result<T, DeployError>>,
{
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(DeployError::Cancelled),
        result = step => result,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use alloy_primitives::{Bytes, B256};
    use async_trait::async_trait;

    use super::*;
    use crate::chain::Confirmation;

    const ESTIMATE: u64 = 100_000;

    fn deployed_address() -> Address {
        "0x0000000000000000000000000000000000000abc".parse().unwrap()
    }

    fn tx_hash() -> TxHash {
        B256::repeat_byte(0x11)
    }

    fn network() -> NetworkProfile {
        let config = crate::config::DeployerConfig::from_lookup(|name| {
            Some(match name {
                "PRIVATE_KEY" => {
                    "0xac0974bec39a697d7497c29ac9edcae786ea7b241bafbd1b7856ee9c3b687a46"
                }
                "BASE_RPC_URL" => "https://mainnet.base.org",
                "BASE_SEPOLIA_RPC_URL" => "https://sepolia.base.org",
                _ => "test-api-key",
            }
            .to_string())
        })
        .unwrap();
        config.network("base-sepolia").unwrap().clone()
    }

    fn artifact() -> ContractArtifact {
        ContractArtifact {
            contract_name: "TokenSwap".to_string(),
            abi: serde_json::json!([]),
            bytecode: Bytes::from(vec![0x60, 0x80, 0x60, 0x40]),
            solc_version: None,
        }
    }

    /// Scripted chain that records the requests it receives.
    struct MockChain {
        sender: Address,
        nonce: u64,
        fail_estimate: bool,
        confirmation: Confirmation,
        estimated: Mutex<Option<TransactionRequest>>,
        submitted: Mutex<Option<TransactionRequest>>,
    }

    impl MockChain {
        fn new() -> Self {
            Self {
                sender: Address::repeat_byte(0x42),
                nonce: 7,
                fail_estimate: false,
                confirmation: Confirmation {
                    tx_hash: tx_hash(),
                    status: true,
                    contract_address: Some(deployed_address()),
                    block_number: Some(1234),
                    gas_used: 95_000,
                },
                estimated: Mutex::new(None),
                submitted: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl ChainClient for MockChain {
        fn sender(&self) -> Address {
            self.sender
        }

        async fn transaction_count(&self, _address: Address) -> Result<u64, DeployError> {
            Ok(self.nonce)
        }

        async fn estimate_gas(&self, tx: TransactionRequest) -> Result<u64, DeployError> {
            *self.estimated.lock().unwrap() = Some(tx);
            if self.fail_estimate {
                return Err(DeployError::Rpc {
                    call: "eth_estimateGas",
                    reason: "simulated RPC failure".to_string(),
                });
            }
            Ok(ESTIMATE)
        }

        async fn submit_transaction(&self, tx: TransactionRequest) -> Result<TxHash, DeployError> {
            *self.submitted.lock().unwrap() = Some(tx);
            Ok(tx_hash())
        }

        async fn wait_for_confirmation(&self, _tx_hash: TxHash) -> Result<Confirmation, DeployError> {
            Ok(self.confirmation.clone())
        }
    }

    #[tokio::test]
    async fn test_deploy_submits_double_the_estimate() {
        let deployer = Deployer::new(MockChain::new(), network());
        let outcome =
            deployer.deploy(&artifact(), &CancellationToken::new()).await.unwrap();

        assert_eq!(outcome.contract_address, deployed_address());
        assert_eq!(outcome.gas_estimate, 100_000);
        assert_eq!(outcome.gas_limit, 200_000);
        assert_eq!(outcome.block_number, Some(1234));

        let submitted = deployer.chain.submitted.lock().unwrap().clone().unwrap();
        assert_eq!(submitted.gas, Some(200_000));
    }

    #[tokio::test]
    async fn test_estimated_and_submitted_requests_are_the_same_bytes() {
        let deployer = Deployer::new(MockChain::new(), network());
        deployer.deploy(&artifact(), &CancellationToken::new()).await.unwrap();

        let estimated = deployer.chain.estimated.lock().unwrap().clone().unwrap();
        let submitted = deployer.chain.submitted.lock().unwrap().clone().unwrap();

        // Identical except for the gas limit set after estimation.
        assert_eq!(estimated.input, submitted.input);
        assert_eq!(estimated.nonce, submitted.nonce);
        assert_eq!(estimated.chain_id, submitted.chain_id);
        assert_eq!(estimated.gas_price, submitted.gas_price);
        assert_eq!(estimated.to, submitted.to);
        assert_eq!(estimated.to, Some(TxKind::Create));
        assert_eq!(estimated.gas, None);
        assert_eq!(estimated.nonce, Some(7));
        assert_eq!(estimated.chain_id, Some(84532));
        assert_eq!(estimated.gas_price, Some(1_000_000_000));
    }

    #[tokio::test]
    async fn test_estimate_failure_skips_submission() {
        let mut chain = MockChain::new();
        chain.fail_estimate = true;
        let deployer = Deployer::new(chain, network());

        let err = deployer.deploy(&artifact(), &CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, DeployError::Rpc { call: "eth_estimateGas", .. }));
        assert!(deployer.chain.submitted.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reverted_deployment_is_an_error() {
        let mut chain = MockChain::new();
        chain.confirmation.status = false;
        let deployer = Deployer::new(chain, network());

        let err = deployer.deploy(&artifact(), &CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, DeployError::Reverted { .. }));
    }

    #[tokio::test]
    async fn test_missing_contract_address_is_an_error() {
        let mut chain = MockChain::new();
        chain.confirmation.contract_address = None;
        let deployer = Deployer::new(chain, network());

        let err = deployer.deploy(&artifact(), &CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, DeployError::MissingContractAddress { .. }));
    }

    #[tokio::test]
    async fn test_cancellation_aborts_before_submission() {
        let deployer = Deployer::new(MockChain::new(), network());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = deployer.deploy(&artifact(), &cancel).await.unwrap_err();
        assert!(matches!(err, DeployError::Cancelled));
        assert!(deployer.chain.submitted.lock().unwrap().is_none());
    }

    #[test]
    fn test_gas_limit_doubles() {
        assert_eq!(deployment_gas_limit(100_000), 200_000);
        assert_eq!(deployment_gas_limit(0), 0);
    }

    #[test]
    fn test_gas_limit_saturates() {
        assert_eq!(deployment_gas_limit(u64::MAX), u64::MAX);
    }
}
