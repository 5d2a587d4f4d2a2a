use solana_rpc_client_api::client_error::Error as ClientError;
use solana_sdk::pubkey::Pubkey;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read key file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("key file is not a JSON byte array: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid key material: {0}")]
    InvalidKey(String),

    #[error("failed to connect to {url}: {source}")]
    Connection {
        url: String,
        #[source]
        source: Box<ClientError>,
    },

    #[error("rpc request failed: {0}")]
    Rpc(#[from] Box<ClientError>),

    #[error("pool {0} not found")]
    PoolNotFound(Pubkey),

    #[error("invalid pool {key}: {reason}")]
    InvalidPool { key: Pubkey, reason: String },

    #[error("token {0} is not part of the pool")]
    TokenNotInPool(Pubkey),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("math overflow in {0}")]
    Math(&'static str),
}

impl From<ClientError> for Error {
    fn from(err: ClientError) -> Self {
        Error::Rpc(Box::new(err))
    }
}
