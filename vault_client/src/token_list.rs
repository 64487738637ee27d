// Token metadata list: a JSON array of `TokenInfo`, served over HTTP by the
// portfolio API or kept as a local file.

use tracing::info;
use vault_core::TokenInfo;

use crate::error::{ClientError, ClientResult};

fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

pub async fn load_token_list(location: &str) -> ClientResult<Vec<TokenInfo>> {
    let tokens = if is_url(location) {
        fetch_token_list(location).await?
    } else {
        read_token_list(location).await?
    };
    info!(location, count = tokens.len(), "loaded token list");
    Ok(tokens)
}

async fn fetch_token_list(url: &str) -> ClientResult<Vec<TokenInfo>> {
    let http_err = |source: reqwest::Error| ClientError::TokenListHttp {
        location: url.to_string(),
        source,
    };
    reqwest::get(url)
        .await
        .and_then(|response| response.error_for_status())
        .map_err(http_err)?
        .json()
        .await
        .map_err(http_err)
}

async fn read_token_list(path: &str) -> ClientResult<Vec<TokenInfo>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ClientError::TokenListIo { location: path.to_string(), source })?;
    parse_token_list(path, &raw)
}

fn parse_token_list(location: &str, raw: &str) -> ClientResult<Vec<TokenInfo>> {
    serde_json::from_str(raw)
        .map_err(|source| ClientError::TokenListJson { location: location.to_string(), source })
}
