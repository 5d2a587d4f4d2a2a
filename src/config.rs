use serde::{Deserialize, Serialize};
use solana_sdk::commitment_config::{CommitmentConfig, CommitmentLevel};
use std::{env, path::PathBuf, str::FromStr};

use crate::constants::ORCA_RPC_URL;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub rpc_url: String,
    pub commitment: CommitmentLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyConfig {
    /// owner whose LP balance is reported
    pub lp_owner_path: PathBuf,
    /// signer for swaps
    pub swap_owner_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleConfig {
    pub network: NetworkConfig,
    pub keys: KeyConfig,
}

impl SampleConfig {
    /// Defaults, overridable through `ORCA_RPC_URL`, `ORCA_COMMITMENT`,
    /// `LP_OWNER_KEYPAIR` and `SWAP_OWNER_KEYPAIR`
    pub fn load_default() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let rpc_url = lookup("ORCA_RPC_URL").unwrap_or_else(|| ORCA_RPC_URL.to_string());
        let commitment = lookup("ORCA_COMMITMENT")
            .and_then(|v| CommitmentLevel::from_str(&v).ok())
            .unwrap_or(CommitmentLevel::Confirmed);
        let lp_owner_path = lookup("LP_OWNER_KEYPAIR").unwrap_or_else(|| "pub.json".to_string());
        let swap_owner_path = lookup("SWAP_OWNER_KEYPAIR").unwrap_or_else(|| "p1.json".to_string());

        SampleConfig {
            network: NetworkConfig {
                rpc_url,
                commitment,
            },
            keys: KeyConfig {
                lp_owner_path: PathBuf::from(lp_owner_path),
                swap_owner_path: PathBuf::from(swap_owner_path),
            },
        }
    }

    pub fn commitment_config(&self) -> CommitmentConfig {
        CommitmentConfig {
            commitment: self.network.commitment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = SampleConfig::from_lookup(|_| None);
        assert_eq!(config.network.rpc_url, ORCA_RPC_URL);
        assert_eq!(config.network.commitment, CommitmentLevel::Confirmed);
        assert_eq!(config.keys.lp_owner_path, PathBuf::from("pub.json"));
        assert_eq!(config.keys.swap_owner_path, PathBuf::from("p1.json"));
    }

    #[test]
    fn test_overrides() {
        let vars = HashMap::from([
            ("ORCA_RPC_URL", "https://api.mainnet-beta.solana.com"),
            ("ORCA_COMMITMENT", "finalized"),
            ("SWAP_OWNER_KEYPAIR", "/keys/swap.json"),
        ]);
        let config = SampleConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.network.rpc_url, "https://api.mainnet-beta.solana.com");
        assert_eq!(config.commitment_config(), CommitmentConfig::finalized());
        assert_eq!(config.keys.swap_owner_path, PathBuf::from("/keys/swap.json"));
    }

    #[test]
    fn test_unknown_commitment_falls_back() {
        let config = SampleConfig::from_lookup(|key| {
            (key == "ORCA_COMMITMENT").then(|| "fastest".to_string())
        });
        assert_eq!(config.network.commitment, CommitmentLevel::Confirmed);
    }
}
