//! Error types for the deployment workflow.

use std::path::PathBuf;
use std::time::Duration;

use alloy_primitives::TxHash;
use thiserror::Error;

/// Main error type for deployment operations.
#[derive(Debug, Error)]
pub enum DeployError {
    /// The compiled artifact for the requested contract does not exist.
    #[error("contract artifact for `{name}` not found under {}; compile the contracts first", dir.display())]
    ArtifactNotFound {
        /// Name of the contract that was requested.
        name: String,
        /// Directory that was searched.
        dir: PathBuf,
    },

    /// The artifact exists but carries no deployable bytecode.
    #[error("artifact for `{0}` has no deployable bytecode (abstract contract or interface?)")]
    EmptyBytecode(String),

    /// An artifact file could not be read.
    #[error("failed to read artifact {}: {source}", path.display())]
    ArtifactRead {
        /// Path of the artifact file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An artifact file could not be parsed.
    #[error("failed to parse artifact {}: {source}", path.display())]
    ArtifactParse {
        /// Path of the artifact file.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// An RPC call failed.
    #[error("RPC error during {call}: {reason}")]
    Rpc {
        /// The RPC call that failed.
        call: &'static str,
        /// Error detail from the transport or node.
        reason: String,
    },

    /// Transaction signing failed.
    #[error("transaction signing failed: {0}")]
    Signing(String),

    /// A network call did not complete within its timeout.
    #[error("timed out after {timeout:?} waiting for {call}")]
    Timeout {
        /// The call that timed out.
        call: &'static str,
        /// The configured timeout.
        timeout: Duration,
    },

    /// The deployment transaction was mined but reverted.
    #[error("deployment transaction {tx_hash} reverted (out of gas or constructor failure)")]
    Reverted {
        /// Hash of the reverted transaction.
        tx_hash: TxHash,
    },

    /// The receipt carries no contract address.
    #[error("receipt for {tx_hash} is missing a contract address")]
    MissingContractAddress {
        /// Hash of the confirmed transaction.
        tx_hash: TxHash,
    },

    /// Deployment was cancelled by a shutdown signal.
    #[error("deployment cancelled before completion")]
    Cancelled,
}

/// Result type alias for deployment operations.
pub type DeployResult<T> = Result<T, DeployError>;
