//! Deployment tool for the TokenSwap contract on Base networks.
//!
//! The workflow is a single sequential pipeline: load and validate
//! configuration from the environment, look up the compiled contract
//! artifact by name, estimate the deployment gas on the exact transaction
//! request that will be submitted, submit it with a gas limit of twice the
//! estimate, wait for confirmation, and report the deployed address.
//!
//! There is deliberately no retry or rollback logic: any failure propagates
//! to the binary, which logs it and exits non-zero so the operator can fix
//! the cause and rerun.

#![warn(missing_docs)]
#![deny(rust_2018_idioms)]

pub mod artifacts;
pub mod chain;
pub mod cli;
pub mod config;
pub mod deployer;
pub mod error;
pub mod signal;

pub use artifacts::{ArtifactStore, ContractArtifact};
pub use chain::{ChainClient, ChainClientConfig, Confirmation, HttpChainClient};
pub use cli::Cli;
pub use config::{ConfigError, DeployerConfig, NetworkProfile, SolcConfig, VerifierConfig};
pub use deployer::{Deployer, DeploymentOutcome};
pub use error::{DeployError, DeployResult};
pub use signal::setup_signal_handler;
