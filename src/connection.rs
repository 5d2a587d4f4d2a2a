use crate::{
    constants::ORCA_RPC_URL,
    error::{Error, Result},
};
use solana_rpc_client::nonblocking::rpc_client::RpcClient;
use solana_rpc_client_api::response::RpcVersionInfo;
use solana_sdk::commitment_config::CommitmentConfig;
use std::{fmt, sync::Arc};
use tokio::sync::OnceCell;

/// An open RPC session to a cluster endpoint
pub struct Connection {
    pub rpc_client: RpcClient,
    pub url: String,
    pub commitment: CommitmentConfig,
    pub version: RpcVersionInfo,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("url", &self.url)
            .field("commitment", &self.commitment.commitment)
            .field("version", &self.version.solana_core)
            .finish_non_exhaustive()
    }
}

/// Lazily established, shared connection to a single endpoint.
///
/// The first successful `get` opens the client and checks liveness by asking
/// the node for its version. Every later call returns the same handle. A failed
/// liveness check leaves the cache empty so the next call tries again.
pub struct ConnectionCache {
    url: String,
    commitment: CommitmentConfig,
    connection: OnceCell<Arc<Connection>>,
}

impl Default for ConnectionCache {
    fn default() -> Self {
        Self::new(ORCA_RPC_URL, CommitmentConfig::confirmed())
    }
}

impl ConnectionCache {
    pub fn new(url: &str, commitment: CommitmentConfig) -> Self {
        Self {
            url: url.to_string(),
            commitment,
            connection: OnceCell::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_established(&self) -> bool {
        self.connection.initialized()
    }

    /// Get the shared connection, establishing it on first use
    pub async fn get(&self) -> Result<Arc<Connection>> {
        self.get_with(RpcClient::new_with_commitment).await
    }

    /// Same as `get` but with a custom client constructor, used to swap in a
    /// mock transport.
    pub async fn get_with<F>(&self, open: F) -> Result<Arc<Connection>>
    where
        F: FnOnce(String, CommitmentConfig) -> RpcClient,
    {
        let connection = self
            .connection
            .get_or_try_init(|| async move {
                let rpc_client = open(self.url.clone(), self.commitment);
                let version = rpc_client
                    .get_version()
                    .await
                    .map_err(|e| Error::Connection {
                        url: self.url.clone(),
                        source: Box::new(e),
                    })?;

                log::info!(
                    "Connection to cluster established: {} {}",
                    self.url,
                    version.solana_core
                );

                Ok::<_, Error>(Arc::new(Connection {
                    rpc_client,
                    url: self.url.clone(),
                    commitment: self.commitment,
                    version,
                }))
            })
            .await?;

        Ok(connection.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;
    use solana_rpc_client_api::request::RpcRequest;
    use std::{
        collections::HashMap,
        sync::atomic::{AtomicUsize, Ordering},
    };

    fn counting_mock(
        opened: &AtomicUsize,
        healthy: bool,
    ) -> impl FnOnce(String, CommitmentConfig) -> RpcClient + '_ {
        move |_, _| {
            opened.fetch_add(1, Ordering::SeqCst);
            if healthy {
                let mocks = HashMap::from([(
                    RpcRequest::GetVersion,
                    json!({ "solana-core": "2.1.0", "feature-set": null }),
                )]);
                RpcClient::new_mock_with_mocks("succeeds".to_string(), mocks)
            } else {
                RpcClient::new_mock("fails".to_string())
            }
        }
    }

    #[tokio::test]
    async fn test_connection_is_cached() {
        let cache = ConnectionCache::default();
        let opened = AtomicUsize::new(0);

        let first = cache
            .get_with(counting_mock(&opened, true))
            .await
            .unwrap();
        let second = cache
            .get_with(counting_mock(&opened, true))
            .await
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(opened.load(Ordering::SeqCst), 1);
        assert_eq!(first.url, ORCA_RPC_URL);
        assert_eq!(first.version.solana_core, "2.1.0");
        assert!(cache.is_established());
    }

    #[tokio::test]
    async fn test_concurrent_first_callers_share_one_connection() {
        let cache = ConnectionCache::default();
        let opened = AtomicUsize::new(0);

        let (first, second) = tokio::join!(
            cache.get_with(counting_mock(&opened, true)),
            cache.get_with(counting_mock(&opened, true)),
        );

        assert!(Arc::ptr_eq(&first.unwrap(), &second.unwrap()));
        assert_eq!(opened.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_liveness_check_is_retried() {
        let cache = ConnectionCache::new("http://localhost:8899", CommitmentConfig::confirmed());
        let opened = AtomicUsize::new(0);

        let result = cache.get_with(counting_mock(&opened, false)).await;
        assert_matches!(result, Err(Error::Connection { .. }));
        assert!(!cache.is_established());

        let connection = cache
            .get_with(counting_mock(&opened, true))
            .await
            .unwrap();
        assert_eq!(opened.load(Ordering::SeqCst), 2);
        assert_eq!(connection.url, "http://localhost:8899");
        assert!(cache.is_established());
    }
}
