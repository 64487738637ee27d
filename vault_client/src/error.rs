use solana_sdk::pubkey::Pubkey;
use vault_core::LayoutError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("rpc request for {address} failed: {source}")]
    Rpc {
        address: Pubkey,
        #[source]
        source: Box<solana_client::client_error::ClientError>,
    },

    #[error("account {0} not found")]
    AccountNotFound(Pubkey),

    #[error("account {address}: {source}")]
    Layout {
        address: Pubkey,
        #[source]
        source: LayoutError,
    },

    #[error("failed to read token list {location}: {source}")]
    TokenListIo {
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch token list {location}: {source}")]
    TokenListHttp {
        location: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid token list {location}: {source}")]
    TokenListJson {
        location: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type ClientResult<T> = Result<T, ClientError>;
