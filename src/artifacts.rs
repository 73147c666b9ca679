//! Compiled contract artifact lookup.
//!
//! Artifacts are produced by an external compiler toolchain; this module only
//! locates and parses them. Both a flat layout (`artifacts/TokenSwap.json`)
//! and the common nested layout
//! (`artifacts/contracts/TokenSwap.sol/TokenSwap.json`) are supported.

use std::path::{Path, PathBuf};

use alloy_primitives::Bytes;
use serde::Deserialize;
use tracing::warn;

use crate::config::SolcConfig;
use crate::error::DeployError;

/// A compiled contract: init bytecode plus interface metadata.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractArtifact {
    /// Contract name as emitted by the compiler.
    pub contract_name: String,
    /// Contract ABI.
    pub abi: serde_json::Value,
    /// Deployment (init) bytecode, 0x-prefixed hex.
    pub bytecode: Bytes,
    /// Compiler version recorded by the toolchain, if any.
    #[serde(default)]
    pub solc_version: Option<String>,
}

impl ContractArtifact {
    /// Warns when the artifact was built with a different compiler than the
    /// one the configuration expects. Advisory only: the artifact is still
    /// deployable.
    pub fn check_compiler(&self, expected: &SolcConfig) {
        if let Some(version) = &self.solc_version {
            if version != expected.version {
                warn!(
                    artifact_version = %version,
                    expected_version = %expected.version,
                    contract = %self.contract_name,
                    "artifact was compiled with a different solc version"
                );
            }
        }
    }
}

/// Locates compiled artifacts by contract name under a base directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Creates a store rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Loads the artifact for `name`.
    ///
    /// Fails with [`DeployError::ArtifactNotFound`] when no artifact file
    /// exists, and with [`DeployError::EmptyBytecode`] when the artifact
    /// carries no init code (abstract contracts and interfaces).
    pub fn load(&self, name: &str) -> Result<ContractArtifact, DeployError> {
        let path = self
            .candidate_paths(name)
            .into_iter()
            .find(|p| p.is_file())
            .ok_or_else(|| DeployError::ArtifactNotFound {
                name: name.to_string(),
                dir: self.dir.clone(),
            })?;

        let artifact = Self::read_artifact(&path)?;
        if artifact.bytecode.is_empty() {
            return Err(DeployError::EmptyBytecode(name.to_string()));
        }
        Ok(artifact)
    }

    fn candidate_paths(&self, name: &str) -> [PathBuf; 2] {
        [
            self.dir.join(format!("{name}.json")),
            self.dir.join("contracts").join(format!("{name}.sol")).join(format!("{name}.json")),
        ]
    }

    fn read_artifact(path: &Path) -> Result<ContractArtifact, DeployError> {
        let contents = std::fs::read_to_string(path).map_err(|source| {
            DeployError::ArtifactRead { path: path.to_path_buf(), source }
        })?;
        serde_json::from_str(&contents).map_err(|source| DeployError::ArtifactParse {
            path: path.to_path_buf(),
            source,
        })
    }
}
